//! Record-by-record unpacking of buffers holding several consecutive records.
//!
//! [`IterUnpack`] decodes lazily on the caller's thread. [`ValueStream`] runs the same
//! decoding on a producer thread behind a bounded channel; dropping the stream stops
//! the producer.

use crate::codec::{Codec, CodecError};
use crate::value::Value;
use std::io::Cursor;
use std::iter::FusedIterator;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

/// Lazy sequence of values from consecutive fixed-size records.
///
/// Yields each record's values in declaration order, then the next record's. A buffer
/// whose length is not a multiple of the record size yields a single error and nothing else.
#[derive(Debug)]
pub struct IterUnpack<'a> {
    codec: Option<Codec>,
    buffer: &'a [u8],
    offset: usize,
    pending: std::vec::IntoIter<Value>,
    error: Option<CodecError>,
}

impl<'a> IterUnpack<'a> {
    pub fn new(format: &str, buffer: &'a [u8]) -> Self {
        let (codec, error) = match prepare(format, buffer.len()) {
            Ok(codec) => (Some(codec), None),
            Err(e) => (None, Some(e)),
        };
        IterUnpack {
            codec,
            buffer,
            offset: 0,
            pending: Vec::new().into_iter(),
            error,
        }
    }

    /// Records not yet decoded.
    pub fn remaining_records(&self) -> usize {
        match &self.codec {
            Some(codec) => (self.buffer.len() - self.offset) / codec.size(),
            None => 0,
        }
    }
}

/// Parse once and check the whole buffer against the record size.
fn prepare(format: &str, len: usize) -> Result<Codec, CodecError> {
    let codec = Codec::from_format(format)?;
    let record = codec.size();
    if record == 0 {
        return Err(CodecError::EmptyRecord);
    }
    if len % record != 0 {
        return Err(CodecError::NotMultiple { record, actual: len });
    }
    Ok(codec)
}

impl Iterator for IterUnpack<'_> {
    type Item = Result<Value, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(v) = self.pending.next() {
                return Some(Ok(v));
            }
            if let Some(e) = self.error.take() {
                return Some(Err(e));
            }
            let codec = self.codec.as_ref()?;
            if self.offset >= self.buffer.len() {
                self.codec = None;
                return None;
            }
            let end = self.offset + codec.size();
            let mut cursor = Cursor::new(&self.buffer[self.offset..end]);
            let mut values = Vec::new();
            if let Err(e) = codec.decode_record(&mut cursor, &mut values) {
                self.codec = None;
                return Some(Err(e));
            }
            tracing::trace!(offset = self.offset, values = values.len(), "decoded record");
            self.offset = end;
            self.pending = values.into_iter();
        }
    }
}

impl FusedIterator for IterUnpack<'_> {}

/// Unpack every record of `buffer` lazily.
pub fn iter_unpack<'a>(format: &str, buffer: &'a [u8]) -> IterUnpack<'a> {
    IterUnpack::new(format, buffer)
}

/// Values produced by a decoding thread, handed over one at a time.
///
/// Ends after the last record or after the first error. Dropping the stream
/// disconnects the channel, which stops the producer, and joins it.
#[derive(Debug)]
pub struct ValueStream {
    rx: Option<Receiver<Result<Value, CodecError>>>,
    handle: Option<JoinHandle<()>>,
}

impl ValueStream {
    /// Spawn a producer that decodes `buffer` record by record.
    pub fn spawn(format: impl Into<String>, buffer: Vec<u8>) -> Result<Self, CodecError> {
        let format = format.into();
        // Rendezvous: each send blocks until the consumer asks for the value.
        let (tx, rx) = mpsc::sync_channel::<Result<Value, CodecError>>(0);
        let handle = thread::Builder::new()
            .name("structfmt-unpack".into())
            .spawn(move || {
                for item in IterUnpack::new(&format, &buffer) {
                    if tx.send(item).is_err() {
                        tracing::debug!("value stream dropped; stopping producer");
                        return;
                    }
                }
            })?;
        Ok(ValueStream {
            rx: Some(rx),
            handle: Some(handle),
        })
    }
}

impl Iterator for ValueStream {
    type Item = Result<Value, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.rx.as_ref()?.recv().ok();
        if item.is_none() {
            self.rx = None;
        }
        item
    }
}

impl Drop for ValueStream {
    fn drop(&mut self) {
        // Disconnect first so a producer parked on send returns.
        self.rx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("value stream producer panicked");
            }
        }
    }
}

/// Unpack every record of `buffer` on a producer thread.
pub fn spawn_iter_unpack(
    format: impl Into<String>,
    buffer: Vec<u8>,
) -> Result<ValueStream, CodecError> {
    ValueStream::spawn(format, buffer)
}
