//! # structfmt — struct-style binary packing
//!
//! Compile a compact format string into a plan for converting between a list of
//! typed scalar values and a flat byte buffer, in either direction.
//!
//! ## Format strings
//!
//! An optional order prefix followed by `(count?)(code)` items:
//!
//! - Prefix: `@` native order/native alignment (default), `=` native, `<` little-endian,
//!   `>` big-endian, `!` network (big-endian). Alignment is recorded; no padding is inserted.
//! - Codes: `x` pad byte, `b`/`B` 8-bit, `h`/`H` 16-bit, `i`/`I` and `l`/`L` 32-bit,
//!   `q`/`Q` 64-bit integers (lowercase signed), `f`/`d` 32/64-bit floats, `?` bool,
//!   `s` text.
//! - `count` repeats the item, except for `s` where it is the byte length of a single
//!   text value.
//!
//! ## Example
//!
//! ```
//! use structfmt::{calcsize, pack, unpack, Value};
//!
//! let bytes = pack(">hi", &[Value::I16(1), Value::I32(2)]).unwrap();
//! assert_eq!(bytes, vec![0, 1, 0, 0, 0, 2]);
//! assert_eq!(calcsize(">hi").unwrap(), 6);
//! assert_eq!(unpack(">hi", &bytes).unwrap(), vec![Value::I16(1), Value::I32(2)]);
//! ```

pub mod ast;
pub mod codec;
pub mod compiled;
pub mod dump;
pub mod parser;
pub mod stream;
pub mod table;
pub mod value;

pub use ast::{FormatDescriptor, FormatItem};
pub use codec::{pack, pack_into, unpack, unpack_from, Codec, CodecError, Endianness};
pub use compiled::Struct;
pub use parser::{calcsize, parse};
pub use stream::{iter_unpack, spawn_iter_unpack, IterUnpack, ValueStream};
pub use table::{Alignment, ByteOrder, Kind, OrderSpec, TypeSpec};
pub use value::Value;
