use std::str;

use paste::paste;

use crate::error::{Error, Result};
use crate::raw::MAX_DEPTH;
use crate::value::{
    Array, Binary, BsonType, DbPointer, Decimal128, Document, JavaScriptWithScope, ObjectId,
    Regex, Timestamp, Value,
};

struct Reader<'de> {
    buf: &'de [u8],
    pos: usize,
}

macro_rules! read_impl {
    ($($t:ty),*) => {
        impl<'de> Reader<'de> {
            $(paste! {
                fn [<read_ $t>](&mut self) -> Result<$t> {
                    let bytes = self.take(std::mem::size_of::<$t>())?;
                    let mut a = [0u8; std::mem::size_of::<$t>()];
                    a.copy_from_slice(bytes);
                    Ok(<$t>::from_le_bytes(a))
                }
            })*
        }
    };
}

read_impl!(u8, i32, i64, u64, f64);

impl<'de> Reader<'de> {
    fn new(buf: &'de [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    fn take(&mut self, length: usize) -> Result<&'de [u8]> {
        let end = self
            .pos
            .checked_add(length)
            .filter(|end| *end <= self.buf.len())
            .ok_or_else(|| Error::decoding("unexpected end of input"))?;
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Reads bytes until a NUL terminator and validates them as UTF-8.
    fn read_cstring(&mut self) -> Result<&'de str> {
        let rest = &self.buf[self.pos..];
        let end = rest
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| Error::decoding("unterminated cstring"))?;
        let s = str::from_utf8(&rest[..end])
            .map_err(|e| Error::decoding(format!("invalid utf-8 in cstring: {}", e)))?;
        self.pos += end + 1;
        Ok(s)
    }

    fn read_string(&mut self) -> Result<String> {
        let length = self.read_i32()?;
        if length < 1 {
            return Err(Error::decoding(format!("invalid string length '{}'", length)));
        }
        let bytes = self.take(length as usize - 1)?;
        let s = str::from_utf8(bytes)
            .map_err(|e| Error::decoding(format!("invalid utf-8 in string: {}", e)))?;
        if self.read_u8()? != 0 {
            return Err(Error::decoding("string is missing its NUL terminator"));
        }
        Ok(s.to_owned())
    }

    fn read_binary(&mut self) -> Result<Binary> {
        let mut size = self.read_i32()?;
        if size < 0 {
            return Err(Error::decoding(format!("invalid binary data size '{}'", size)));
        }
        let subtype = self.read_u8()?;
        if subtype == Binary::OLD_BINARY {
            let repeated = self.read_i32()?;
            if repeated != size - 4 {
                return Err(Error::decoding(
                    "binary subtype OldBinary has inconsistent sizes",
                ));
            }
            size -= 4;
        }
        Ok(Binary::new(subtype, self.take(size as usize)?))
    }

    fn read_object_id(&mut self) -> Result<ObjectId> {
        let mut bytes = [0u8; 12];
        bytes.copy_from_slice(self.take(12)?);
        Ok(ObjectId::from_bytes(bytes))
    }

    fn read_boolean(&mut self) -> Result<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            byte => Err(Error::decoding(format!("invalid boolean byte 0x{:02x}", byte))),
        }
    }

    fn read_decimal128(&mut self) -> Result<Decimal128> {
        let low = self.read_u64()?;
        let high = self.read_u64()?;
        Ok(Decimal128::from_bid(high, low))
    }

    fn read_document(&mut self, depth: usize) -> Result<Document> {
        if depth > MAX_DEPTH {
            return Err(Error::decoding("nesting depth limit exceeded"));
        }
        let start = self.pos;
        let length = self.read_i32()?;
        if length < 5 {
            return Err(Error::decoding(format!("invalid document length '{}'", length)));
        }
        let end = start + length as usize;
        let mut doc = Document::new();
        loop {
            if self.pos >= end {
                return Err(Error::decoding("unterminated document"));
            }
            let tag = self.read_u8()?;
            if tag == 0 {
                if self.pos != end {
                    return Err(Error::decoding("document length mismatch"));
                }
                return Ok(doc);
            }
            let ty = BsonType::from_tag(tag)
                .ok_or_else(|| Error::decoding(format!("unknown bson element type 0x{:02x}", tag)))?;
            let key = self.read_cstring()?.to_owned();
            let value = self.read_payload(ty, depth)?;
            if doc.contains_key(&key) {
                return Err(Error::decoding(format!("duplicate key '{}'", key)));
            }
            doc.insert(key, value);
        }
    }

    fn read_payload(&mut self, ty: BsonType, depth: usize) -> Result<Value> {
        Ok(match ty {
            BsonType::Double => Value::Double(self.read_f64()?),
            BsonType::String => Value::String(self.read_string()?),
            BsonType::Document => Value::Document(self.read_document(depth + 1)?),
            BsonType::Array => {
                let doc = self.read_document(depth + 1)?;
                Value::Array(Array::from_document(&doc)?)
            }
            BsonType::Binary => Value::Binary(self.read_binary()?),
            BsonType::Undefined => Value::Undefined,
            BsonType::ObjectId => Value::ObjectId(self.read_object_id()?),
            BsonType::Boolean => Value::Boolean(self.read_boolean()?),
            BsonType::DateTime => Value::DateTime(self.read_i64()?),
            BsonType::Null => Value::Null,
            BsonType::RegularExpression => {
                let pattern = self.read_cstring()?.to_owned();
                let options = self.read_cstring()?;
                Value::RegularExpression(Regex::from_parts(pattern, options)?)
            }
            BsonType::DbPointer => Value::DbPointer(DbPointer {
                namespace: self.read_string()?,
                id: self.read_object_id()?,
            }),
            BsonType::JavaScript => Value::JavaScript(self.read_string()?),
            BsonType::Symbol => Value::Symbol(self.read_string()?),
            BsonType::JavaScriptWithScope => {
                let start = self.pos;
                let total = self.read_i32()?;
                let code = self.read_string()?;
                let scope = self.read_document(depth + 1)?;
                if self.pos - start != total as usize {
                    return Err(Error::decoding("inconsistent code-with-scope length"));
                }
                Value::JavaScriptWithScope(JavaScriptWithScope { code, scope })
            }
            BsonType::Int32 => Value::Int32(self.read_i32()?),
            BsonType::Timestamp => {
                let packed = self.read_u64()?;
                Value::Timestamp(Timestamp {
                    time: (packed >> 32) as u32,
                    increment: packed as u32,
                })
            }
            BsonType::Int64 => Value::Int64(self.read_i64()?),
            BsonType::Decimal128 => Value::Decimal128(self.read_decimal128()?),
            BsonType::MinKey => Value::MinKey,
            BsonType::MaxKey => Value::MaxKey,
        })
    }

    fn finish(&self) -> Result<()> {
        if self.pos != self.buf.len() {
            return Err(Error::decoding("trailing bytes after value"));
        }
        Ok(())
    }
}

pub(crate) fn read_document(bytes: &[u8]) -> Result<Document> {
    let mut reader = Reader::new(bytes);
    let doc = reader.read_document(0)?;
    reader.finish()?;
    Ok(doc)
}

pub(crate) fn read_array(bytes: &[u8]) -> Result<Array> {
    let doc = read_document(bytes)?;
    Array::from_document(&doc)
}

/// Reads the bare payload form of one of the twelve primitive kinds that
/// have one; every other kind is an error.
pub(crate) fn read_primitive(bytes: &[u8], ty: BsonType) -> Result<Value> {
    let mut reader = Reader::new(bytes);
    let value = match ty {
        BsonType::Double
        | BsonType::String
        | BsonType::Binary
        | BsonType::ObjectId
        | BsonType::Boolean
        | BsonType::DateTime
        | BsonType::Null
        | BsonType::RegularExpression
        | BsonType::JavaScript
        | BsonType::Int32
        | BsonType::Int64
        | BsonType::Decimal128 => reader.read_payload(ty, 0)?,
        _ => return Err(Error::decoding(format!("unexpected bson type '{:?}'", ty))),
    };
    reader.finish()?;
    Ok(value)
}
