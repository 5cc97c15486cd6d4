//! Tag-length-value body format
//!
//! # Format
//!
//! ```text
//! Null      'N'
//! Bool      'T' | 'F'
//! Int       'I' [i32 BE]
//! Long      'L' [i64 BE]
//! Double    'D' [f64 BE]
//! String    'S' [u32 BE len] [UTF-8]
//! Binary    'B' [u32 BE len] [bytes]
//! List      'V' [u32 BE count] [value]*
//! Map       'H' [u32 BE count] [key value]*
//! Object    'O' [string class] [u32 BE count] [string name, value]*
//! Throwable 'X' [string class] [string message]
//! ```
//!
//! A body ends with a trailing `'N'` so readers that expect one more value
//! never hit end of input.

use bytes::{BufMut, BytesMut};

use super::{Decoder, Encoder, SerializeError, Serialization};
use crate::value::{Throwable, Value};

const TAG_NULL: u8 = b'N';
const TAG_TRUE: u8 = b'T';
const TAG_FALSE: u8 = b'F';
const TAG_INT: u8 = b'I';
const TAG_LONG: u8 = b'L';
const TAG_DOUBLE: u8 = b'D';
const TAG_STRING: u8 = b'S';
const TAG_BINARY: u8 = b'B';
const TAG_LIST: u8 = b'V';
const TAG_MAP: u8 = b'H';
const TAG_OBJECT: u8 = b'O';
const TAG_THROWABLE: u8 = b'X';

/// Maximum nesting depth for lists, maps and objects.
pub const MAX_DEPTH: usize = 64;

/// The bundled tag-length-value serialization.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tlv;

impl Serialization for Tlv {
    const ID: u8 = 2;

    type Encoder = TlvEncoder;
    type Decoder<'a> = TlvDecoder<'a>;

    fn encoder(capacity: usize) -> TlvEncoder {
        TlvEncoder {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    fn decoder(body: &[u8]) -> TlvDecoder<'_> {
        TlvDecoder { buf: body, pos: 0 }
    }
}

/// Encoder half of [`Tlv`].
#[derive(Debug)]
pub struct TlvEncoder {
    buf: BytesMut,
}

impl TlvEncoder {
    fn write(&mut self, value: &Value, depth: usize) -> Result<(), SerializeError> {
        if depth > MAX_DEPTH {
            return Err(SerializeError::DepthExceeded(MAX_DEPTH));
        }

        match value {
            Value::Null => self.buf.put_u8(TAG_NULL),
            Value::Bool(true) => self.buf.put_u8(TAG_TRUE),
            Value::Bool(false) => self.buf.put_u8(TAG_FALSE),
            Value::Int(v) => {
                self.buf.put_u8(TAG_INT);
                self.buf.put_i32(*v);
            }
            Value::Long(v) => {
                self.buf.put_u8(TAG_LONG);
                self.buf.put_i64(*v);
            }
            Value::Double(v) => {
                self.buf.put_u8(TAG_DOUBLE);
                self.buf.put_f64(*v);
            }
            Value::String(v) => {
                self.buf.put_u8(TAG_STRING);
                self.write_blob(v.as_bytes())?;
            }
            Value::Binary(v) => {
                self.buf.put_u8(TAG_BINARY);
                self.write_blob(v)?;
            }
            Value::List(items) => {
                self.buf.put_u8(TAG_LIST);
                self.write_len(items.len())?;
                for item in items {
                    self.write(item, depth + 1)?;
                }
            }
            Value::Map(pairs) => {
                self.buf.put_u8(TAG_MAP);
                self.write_len(pairs.len())?;
                for (key, value) in pairs {
                    self.write(key, depth + 1)?;
                    self.write(value, depth + 1)?;
                }
            }
            Value::Object { class, fields } => {
                self.buf.put_u8(TAG_OBJECT);
                self.write_blob(class.as_bytes())?;
                self.write_len(fields.len())?;
                for (name, value) in fields {
                    self.write_blob(name.as_bytes())?;
                    self.write(value, depth + 1)?;
                }
            }
            Value::Throwable(t) => {
                self.buf.put_u8(TAG_THROWABLE);
                self.write_blob(t.class().as_bytes())?;
                self.write_blob(t.message().as_bytes())?;
            }
        }
        Ok(())
    }

    fn write_len(&mut self, len: usize) -> Result<(), SerializeError> {
        let len = u32::try_from(len).map_err(|_| SerializeError::TooLarge(len))?;
        self.buf.put_u32(len);
        Ok(())
    }

    fn write_blob(&mut self, bytes: &[u8]) -> Result<(), SerializeError> {
        self.write_len(bytes.len())?;
        self.buf.put_slice(bytes);
        Ok(())
    }
}

impl Encoder for TlvEncoder {
    fn append(&mut self, raw: &[u8]) {
        self.buf.put_slice(raw);
    }

    fn encode(&mut self, value: &Value) -> Result<(), SerializeError> {
        let mark = self.buf.len();
        let result = self.write(value, 0);
        if result.is_err() {
            self.buf.truncate(mark);
        }
        result
    }

    fn finish(mut self) -> BytesMut {
        self.buf.put_u8(TAG_NULL);
        self.buf
    }
}

/// Decoder half of [`Tlv`].
#[derive(Debug)]
pub struct TlvDecoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> TlvDecoder<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], SerializeError> {
        let remaining = self.buf.len() - self.pos;
        if n > remaining {
            return Err(SerializeError::UnexpectedEnd {
                needed: n,
                remaining,
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], SerializeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn read_len(&mut self) -> Result<usize, SerializeError> {
        Ok(u32::from_be_bytes(self.take_array()?) as usize)
    }

    fn read_string(&mut self) -> Result<String, SerializeError> {
        let len = self.read_len()?;
        let offset = self.pos;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| SerializeError::InvalidUtf8 { offset })
    }

    fn read(&mut self, depth: usize) -> Result<Value, SerializeError> {
        if depth > MAX_DEPTH {
            return Err(SerializeError::DepthExceeded(MAX_DEPTH));
        }

        let offset = self.pos;
        let [tag] = self.take_array::<1>()?;
        let value = match tag {
            TAG_NULL => Value::Null,
            TAG_TRUE => Value::Bool(true),
            TAG_FALSE => Value::Bool(false),
            TAG_INT => Value::Int(i32::from_be_bytes(self.take_array()?)),
            TAG_LONG => Value::Long(i64::from_be_bytes(self.take_array()?)),
            TAG_DOUBLE => Value::Double(f64::from_be_bytes(self.take_array()?)),
            TAG_STRING => Value::String(self.read_string()?),
            TAG_BINARY => {
                let len = self.read_len()?;
                Value::Binary(self.take(len)?.to_vec())
            }
            TAG_LIST => {
                let count = self.read_len()?;
                // Every element needs at least one byte.
                let mut items = Vec::with_capacity(count.min(self.buf.len() - self.pos));
                for _ in 0..count {
                    items.push(self.read(depth + 1)?);
                }
                Value::List(items)
            }
            TAG_MAP => {
                let count = self.read_len()?;
                let mut pairs = Vec::with_capacity(count.min(self.buf.len() - self.pos));
                for _ in 0..count {
                    let key = self.read(depth + 1)?;
                    let value = self.read(depth + 1)?;
                    pairs.push((key, value));
                }
                Value::Map(pairs)
            }
            TAG_OBJECT => {
                let class = self.read_string()?;
                let count = self.read_len()?;
                let mut fields = Vec::with_capacity(count.min(self.buf.len() - self.pos));
                for _ in 0..count {
                    let name = self.read_string()?;
                    let value = self.read(depth + 1)?;
                    fields.push((name, value));
                }
                Value::Object { class, fields }
            }
            TAG_THROWABLE => {
                let class = self.read_string()?;
                let message = self.read_string()?;
                Value::Throwable(Throwable::with_class(class, message))
            }
            tag => return Err(SerializeError::InvalidTag { tag, offset }),
        };
        Ok(value)
    }
}

impl Decoder for TlvDecoder<'_> {
    fn decode(&mut self) -> Result<Value, SerializeError> {
        self.read(0)
    }

    fn position(&self) -> usize {
        self.pos
    }
}
