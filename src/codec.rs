//! Pack/unpack values against a parsed format descriptor.
//!
//! Integers are two's-complement, floats IEEE-754, booleans one byte (zero/nonzero),
//! text items raw bytes, pad items zero bytes. Byte order comes from the format prefix.

use crate::ast::{FormatDescriptor, FormatItem};
use crate::parser::parse;
use crate::table::{ByteOrder, Kind, TypeSpec};
use crate::value::Value;
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read, Write};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Endianness {
    Big,
    Little,
}

impl Endianness {
    /// Byte order of the host.
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }
}

impl From<ByteOrder> for Endianness {
    fn from(order: ByteOrder) -> Self {
        match order {
            ByteOrder::Native => Endianness::native(),
            ByteOrder::Little => Endianness::Little,
            ByteOrder::Big => Endianness::Big,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("bad char ('{0}') in struct format")]
    BadChar(char),
    #[error("repeat count {0} is not followed by a format character")]
    MissingTypeCode(String),
    #[error("invalid repeat count {0}")]
    InvalidRepeatCount(String),
    #[error("format syntax: {0}")]
    Syntax(String),
    #[error("unpack requires a buffer of {expected} bytes (got {actual})")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("iter_unpack requires a buffer of a multiple of {record} bytes (got {actual})")]
    NotMultiple { record: usize, actual: usize },
    #[error("iter_unpack cannot be used with a zero-sized format")]
    EmptyRecord,
    #[error("pack expected {expected} items for packing (got {got})")]
    InsufficientArguments { expected: usize, got: usize },
    #[error("found {0} extra items that wouldn't be packed")]
    ExtraArguments(usize),
    #[error("argument for '{code}' must be {expected} (got {found})")]
    TypeMismatch {
        code: char,
        expected: &'static str,
        found: &'static str,
    },
    #[error("argument {value} out of range for format '{code}'")]
    ValueOutOfRange { code: char, value: i128 },
    #[error("offset {offset} is out of range for buffer of {len} bytes")]
    OffsetOutOfRange { offset: usize, len: usize },
    #[error("data truncated: need {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}

/// Packer/unpacker bound to one parsed descriptor.
#[derive(Debug)]
pub struct Codec {
    pub endianness: Endianness,
    descriptor: FormatDescriptor,
}

impl Codec {
    pub fn new(descriptor: FormatDescriptor) -> Self {
        let endianness = Endianness::from(descriptor.order.order);
        Codec { endianness, descriptor }
    }

    /// Parse `format` and bind a codec to it.
    pub fn from_format(format: &str) -> Result<Self, CodecError> {
        Ok(Codec::new(parse(format)?))
    }

    pub fn descriptor(&self) -> &FormatDescriptor {
        &self.descriptor
    }

    /// Size of one packed record.
    pub fn size(&self) -> usize {
        self.descriptor.size()
    }

    /// Pack `values` into a fresh buffer. Fails without output if too few values are given.
    pub fn encode(&self, values: &[Value]) -> Result<Vec<u8>, CodecError> {
        let expected = self.descriptor.value_count();
        if values.len() < expected {
            return Err(CodecError::InsufficientArguments { expected, got: values.len() });
        }
        // Grows with what is actually written; pad runs reserve fallibly.
        let mut out = Vec::new();
        let mut args = values.iter();
        for item in &self.descriptor.items {
            let mut next = || {
                args.next()
                    .ok_or(CodecError::InsufficientArguments { expected, got: values.len() })
            };
            match item.spec.kind {
                Kind::Text => {
                    let v = next()?;
                    let bytes = v.as_bytes().ok_or_else(|| mismatch(item.spec, v))?;
                    // Copied verbatim: neither padded nor truncated to the declared length.
                    out.write_all(bytes)?;
                }
                Kind::Pad => {
                    out.try_reserve(item.count)
                        .map_err(|_| CodecError::InvalidRepeatCount(item.count.to_string()))?;
                    out.resize(out.len() + item.count, 0);
                }
                _ => {
                    for _ in 0..item.count {
                        let v = next()?;
                        match self.endianness {
                            Endianness::Big => write_scalar::<BigEndian>(&mut out, item.spec, v)?,
                            Endianness::Little => {
                                write_scalar::<LittleEndian>(&mut out, item.spec, v)?
                            }
                        }
                    }
                }
            }
        }
        let surplus = args.len();
        if surplus > 0 {
            return Err(CodecError::ExtraArguments(surplus));
        }
        tracing::debug!(values = values.len(), bytes = out.len(), "packed record");
        Ok(out)
    }

    /// Unpack exactly one record; `bytes` must be exactly [`Codec::size`] long.
    pub fn decode(&self, bytes: &[u8]) -> Result<Vec<Value>, CodecError> {
        let expected = self.size();
        if bytes.len() != expected {
            return Err(CodecError::SizeMismatch { expected, actual: bytes.len() });
        }
        let mut cursor = Cursor::new(bytes);
        let mut out = Vec::with_capacity(self.descriptor.value_count());
        self.decode_record(&mut cursor, &mut out)?;
        tracing::debug!(values = out.len(), bytes = bytes.len(), "unpacked record");
        Ok(out)
    }

    /// Decode one record at the cursor, appending its values to `out`.
    pub(crate) fn decode_record(
        &self,
        r: &mut Cursor<&[u8]>,
        out: &mut Vec<Value>,
    ) -> Result<(), CodecError> {
        for item in &self.descriptor.items {
            self.decode_item(r, item, out)?;
        }
        Ok(())
    }

    fn decode_item(
        &self,
        r: &mut Cursor<&[u8]>,
        item: &FormatItem,
        out: &mut Vec<Value>,
    ) -> Result<(), CodecError> {
        match item.spec.kind {
            Kind::Text => {
                ensure_remaining(r, item.count)?;
                let mut buf = vec![0u8; item.count];
                r.read_exact(&mut buf)?;
                out.push(Value::Text(buf));
            }
            Kind::Pad => {
                ensure_remaining(r, item.count)?;
                r.set_position(r.position() + item.count as u64);
            }
            _ => {
                for _ in 0..item.count {
                    ensure_remaining(r, item.spec.width)?;
                    let v = match self.endianness {
                        Endianness::Big => read_scalar::<BigEndian>(r, item.spec)?,
                        Endianness::Little => read_scalar::<LittleEndian>(r, item.spec)?,
                    };
                    out.push(v);
                }
            }
        }
        Ok(())
    }
}

fn read_scalar<E: byteorder::ByteOrder>(
    r: &mut Cursor<&[u8]>,
    spec: &TypeSpec,
) -> Result<Value, CodecError> {
    Ok(match (spec.kind, spec.width) {
        (Kind::Integer { signed: true }, 1) => Value::I8(r.read_i8()?),
        (Kind::Integer { signed: false }, 1) => Value::U8(r.read_u8()?),
        (Kind::Integer { signed: true }, 2) => Value::I16(r.read_i16::<E>()?),
        (Kind::Integer { signed: false }, 2) => Value::U16(r.read_u16::<E>()?),
        (Kind::Integer { signed: true }, 4) => Value::I32(r.read_i32::<E>()?),
        (Kind::Integer { signed: false }, 4) => Value::U32(r.read_u32::<E>()?),
        (Kind::Integer { signed: true }, 8) => Value::I64(r.read_i64::<E>()?),
        (Kind::Integer { signed: false }, 8) => Value::U64(r.read_u64::<E>()?),
        (Kind::Float, 4) => Value::Float(r.read_f32::<E>()?),
        (Kind::Float, 8) => Value::Double(r.read_f64::<E>()?),
        (Kind::Bool, 1) => Value::Bool(r.read_u8()? != 0),
        _ => return Err(CodecError::BadChar(spec.code)),
    })
}

fn write_scalar<E: byteorder::ByteOrder>(
    w: &mut Vec<u8>,
    spec: &TypeSpec,
    v: &Value,
) -> Result<(), CodecError> {
    match spec.kind {
        Kind::Integer { signed } => {
            let n = v.as_i128().ok_or_else(|| mismatch(spec, v))?;
            let bits = 8 * spec.width as u32;
            let (min, max) = if signed {
                (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
            } else {
                (0, (1i128 << bits) - 1)
            };
            if n < min || n > max {
                return Err(CodecError::ValueOutOfRange { code: spec.code, value: n });
            }
            match (signed, spec.width) {
                (true, 1) => w.write_i8(n as i8)?,
                (false, 1) => w.write_u8(n as u8)?,
                (true, 2) => w.write_i16::<E>(n as i16)?,
                (false, 2) => w.write_u16::<E>(n as u16)?,
                (true, 4) => w.write_i32::<E>(n as i32)?,
                (false, 4) => w.write_u32::<E>(n as u32)?,
                (true, 8) => w.write_i64::<E>(n as i64)?,
                (false, 8) => w.write_u64::<E>(n as u64)?,
                _ => return Err(CodecError::BadChar(spec.code)),
            }
        }
        Kind::Float => match spec.width {
            4 => w.write_f32::<E>(v.as_f32().ok_or_else(|| mismatch(spec, v))?)?,
            8 => w.write_f64::<E>(v.as_f64().ok_or_else(|| mismatch(spec, v))?)?,
            _ => return Err(CodecError::BadChar(spec.code)),
        },
        Kind::Bool => {
            let b = v.as_bool().ok_or_else(|| mismatch(spec, v))?;
            w.write_u8(u8::from(b))?;
        }
        Kind::Text | Kind::Pad => return Err(CodecError::BadChar(spec.code)),
    }
    Ok(())
}

fn mismatch(spec: &TypeSpec, v: &Value) -> CodecError {
    CodecError::TypeMismatch {
        code: spec.code,
        expected: spec.describe(),
        found: v.type_name(),
    }
}

fn ensure_remaining(r: &Cursor<&[u8]>, needed: usize) -> Result<(), CodecError> {
    let len = r.get_ref().len() as u64;
    let remaining = len.saturating_sub(r.position()) as usize;
    if remaining < needed {
        return Err(CodecError::Truncated { needed, remaining });
    }
    Ok(())
}

/// Pack `values` according to `format`.
pub fn pack(format: &str, values: &[Value]) -> Result<Vec<u8>, CodecError> {
    Codec::from_format(format)?.encode(values)
}

/// Pack `values` and write them into `buffer` at `offset`, growing the buffer
/// (zero-filled) as needed. Returns the number of bytes written.
pub fn pack_into(
    format: &str,
    buffer: &mut Vec<u8>,
    offset: usize,
    values: &[Value],
) -> Result<usize, CodecError> {
    let part = pack(format, values)?;
    let end = offset
        .checked_add(part.len())
        .ok_or(CodecError::OffsetOutOfRange { offset, len: buffer.len() })?;
    if end > buffer.len() {
        buffer
            .try_reserve(end - buffer.len())
            .map_err(|_| CodecError::OffsetOutOfRange { offset, len: buffer.len() })?;
        buffer.resize(end, 0);
    }
    buffer[offset..end].copy_from_slice(&part);
    Ok(part.len())
}

/// Unpack one record; `buffer` must be exactly `calcsize(format)` bytes.
pub fn unpack(format: &str, buffer: &[u8]) -> Result<Vec<Value>, CodecError> {
    Codec::from_format(format)?.decode(buffer)
}

/// Unpack one record from `buffer[offset..]`, which must be exactly `calcsize(format)` bytes.
pub fn unpack_from(format: &str, buffer: &[u8], offset: usize) -> Result<Vec<Value>, CodecError> {
    if offset >= buffer.len() {
        return Err(CodecError::OffsetOutOfRange { offset, len: buffer.len() });
    }
    unpack(format, &buffer[offset..])
}
