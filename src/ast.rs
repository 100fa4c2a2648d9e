//! Parsed representation of a format string.

use crate::table::{Kind, OrderSpec, TypeSpec};

/// One `(count, code)` unit of a format string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatItem {
    /// Number of repetitions, or the byte length for a text item.
    pub count: usize,
    pub spec: &'static TypeSpec,
}

impl FormatItem {
    /// Bytes this item occupies in a packed buffer.
    pub fn byte_len(&self) -> usize {
        self.count * self.spec.width
    }

    /// Values this item consumes on pack and produces on unpack.
    pub fn value_count(&self) -> usize {
        match self.spec.kind {
            Kind::Text => 1,
            Kind::Pad => 0,
            _ => self.count,
        }
    }
}

/// Root of a parsed format: order/alignment plus items in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub order: OrderSpec,
    pub items: Vec<FormatItem>,
}

impl FormatDescriptor {
    /// Size in bytes of one packed record.
    pub fn size(&self) -> usize {
        self.items.iter().map(FormatItem::byte_len).sum()
    }

    /// Number of values one record packs from / unpacks to.
    pub fn value_count(&self) -> usize {
        self.items.iter().map(FormatItem::value_count).sum()
    }
}
