//! Static lookup tables: format codes and order/alignment prefixes.

/// Value semantics of a format code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Integer { signed: bool },
    Float,
    Bool,
    /// Fixed-length text: the repeat count is the byte length of one value.
    Text,
    /// Zero byte on encode, skipped on decode; carries no value.
    Pad,
}

/// One supported format code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSpec {
    pub code: char,
    /// Width in bytes of a single repetition.
    pub width: usize,
    pub kind: Kind,
}

impl TypeSpec {
    const fn new(code: char, width: usize, kind: Kind) -> Self {
        TypeSpec { code, width, kind }
    }

    /// Short name used in error messages.
    pub fn describe(&self) -> &'static str {
        match self.kind {
            Kind::Integer { .. } => "integer",
            Kind::Float => "float",
            Kind::Bool => "bool",
            Kind::Text => "text",
            Kind::Pad => "pad byte",
        }
    }
}

const SIGNED: Kind = Kind::Integer { signed: true };
const UNSIGNED: Kind = Kind::Integer { signed: false };

pub static TYPE_TABLE: [TypeSpec; 15] = [
    TypeSpec::new('x', 1, Kind::Pad),
    TypeSpec::new('b', 1, SIGNED),
    TypeSpec::new('B', 1, UNSIGNED),
    TypeSpec::new('?', 1, Kind::Bool),
    TypeSpec::new('h', 2, SIGNED),
    TypeSpec::new('H', 2, UNSIGNED),
    TypeSpec::new('i', 4, SIGNED),
    TypeSpec::new('I', 4, UNSIGNED),
    TypeSpec::new('l', 4, SIGNED),
    TypeSpec::new('L', 4, UNSIGNED),
    TypeSpec::new('q', 8, SIGNED),
    TypeSpec::new('Q', 8, UNSIGNED),
    TypeSpec::new('f', 4, Kind::Float),
    TypeSpec::new('d', 8, Kind::Float),
    TypeSpec::new('s', 1, Kind::Text),
];

/// Look up the spec for a format code.
pub fn type_spec(code: char) -> Option<&'static TypeSpec> {
    TYPE_TABLE.iter().find(|t| t.code == code)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Native,
    Little,
    Big,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    NativePadded,
    Tight,
}

/// Byte order and alignment selected by the optional leading prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSpec {
    /// `None` when the format string had no prefix.
    pub prefix: Option<char>,
    pub order: ByteOrder,
    pub alignment: Alignment,
}

impl OrderSpec {
    const fn new(prefix: char, order: ByteOrder, alignment: Alignment) -> Self {
        OrderSpec { prefix: Some(prefix), order, alignment }
    }
}

impl Default for OrderSpec {
    fn default() -> Self {
        OrderSpec {
            prefix: None,
            order: ByteOrder::Native,
            alignment: Alignment::NativePadded,
        }
    }
}

pub static ORDER_TABLE: [OrderSpec; 5] = [
    OrderSpec::new('@', ByteOrder::Native, Alignment::NativePadded),
    OrderSpec::new('=', ByteOrder::Native, Alignment::Tight),
    OrderSpec::new('<', ByteOrder::Little, Alignment::Tight),
    OrderSpec::new('>', ByteOrder::Big, Alignment::Tight),
    OrderSpec::new('!', ByteOrder::Big, Alignment::Tight),
];

pub fn order_spec(prefix: char) -> Option<&'static OrderSpec> {
    ORDER_TABLE.iter().find(|o| o.prefix == Some(prefix))
}
