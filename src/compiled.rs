//! A format string bound once and reused across calls.

use crate::codec::{self, CodecError};
use crate::parser;
use crate::stream::{self, IterUnpack, ValueStream};
use crate::value::Value;
use std::fmt;
use std::str::FromStr;

/// Compiled format. Holds only the format string; every call re-parses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Struct {
    format: String,
}

impl Struct {
    /// Bind `format`, rejecting it early if it does not parse.
    pub fn new(format: impl Into<String>) -> Result<Self, CodecError> {
        let format = format.into();
        parser::parse(&format)?;
        Ok(Struct { format })
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn size(&self) -> Result<usize, CodecError> {
        parser::calcsize(&self.format)
    }

    pub fn pack(&self, values: &[Value]) -> Result<Vec<u8>, CodecError> {
        codec::pack(&self.format, values)
    }

    pub fn pack_into(
        &self,
        buffer: &mut Vec<u8>,
        offset: usize,
        values: &[Value],
    ) -> Result<usize, CodecError> {
        codec::pack_into(&self.format, buffer, offset, values)
    }

    pub fn unpack(&self, buffer: &[u8]) -> Result<Vec<Value>, CodecError> {
        codec::unpack(&self.format, buffer)
    }

    pub fn unpack_from(&self, buffer: &[u8], offset: usize) -> Result<Vec<Value>, CodecError> {
        codec::unpack_from(&self.format, buffer, offset)
    }

    pub fn iter_unpack<'a>(&self, buffer: &'a [u8]) -> IterUnpack<'a> {
        stream::iter_unpack(&self.format, buffer)
    }

    pub fn spawn_iter_unpack(&self, buffer: Vec<u8>) -> Result<ValueStream, CodecError> {
        stream::spawn_iter_unpack(self.format.clone(), buffer)
    }
}

impl FromStr for Struct {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Struct::new(s)
    }
}

impl fmt::Display for Struct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format)
    }
}
