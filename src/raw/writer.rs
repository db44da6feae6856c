use paste::paste;

use crate::error::{Error, Result};
use crate::raw::MAX_DEPTH;
use crate::value::{Array, Binary, Document, Fold, Value};

struct Writer {
    out: Vec<u8>,
}

macro_rules! write_impl {
    ($($t:ty),*) => {
        impl Writer {
            $(paste! {
                fn [<write_ $t>](&mut self, value: $t) {
                    self.out.extend_from_slice(&value.to_le_bytes());
                }
            })*
        }
    };
}

write_impl!(u8, i32, i64, u64, f64);

impl Writer {
    fn new() -> Self {
        Writer { out: Vec::new() }
    }

    /// A name on the wire has no length prefix, so it cannot contain NUL.
    fn write_cstring(&mut self, s: &str) -> Result<()> {
        if s.bytes().any(|b| b == 0) {
            return Err(Error::encoding(format!("'{}' contains a NUL byte", s)));
        }
        self.out.extend_from_slice(s.as_bytes());
        self.write_u8(0);
        Ok(())
    }

    fn write_string(&mut self, s: &str) {
        self.write_i32(s.len() as i32 + 1);
        self.out.extend_from_slice(s.as_bytes());
        self.write_u8(0);
    }

    fn write_binary(&mut self, binary: &Binary) {
        let mut total = binary.bytes.len() as i32;
        if binary.subtype == Binary::OLD_BINARY {
            total += 4;
        }
        self.write_i32(total);
        self.write_u8(binary.subtype);
        if binary.subtype == Binary::OLD_BINARY {
            self.write_i32(total - 4);
        }
        self.out.extend_from_slice(&binary.bytes);
    }

    fn write_document(&mut self, doc: &Document, depth: usize) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(Error::encoding("nesting depth limit exceeded"));
        }
        let start = self.out.len();
        self.write_i32(0);
        for (key, value) in doc.iter() {
            self.write_u8(value.bson_type().tag());
            self.write_cstring(key)?;
            self.write_payload(value, depth)?;
        }
        self.write_u8(0);
        let len = (self.out.len() - start) as i32;
        self.out[start..start + 4].copy_from_slice(&len.to_le_bytes());
        Ok(())
    }

    fn write_payload(&mut self, value: &Value, depth: usize) -> Result<()> {
        match value {
            Value::Double(v) => self.write_f64(*v),
            Value::String(v) | Value::JavaScript(v) | Value::Symbol(v) => self.write_string(v),
            Value::Binary(v) => self.write_binary(v),
            Value::ObjectId(v) => self.out.extend_from_slice(&v.bytes()),
            Value::Boolean(v) => self.write_u8(*v as u8),
            Value::DateTime(v) | Value::Int64(v) => self.write_i64(*v),
            Value::Null | Value::MaxKey | Value::MinKey | Value::Undefined => {}
            Value::RegularExpression(v) => {
                self.write_cstring(v.pattern())?;
                self.write_cstring(v.options())?;
            }
            Value::Int32(v) => self.write_i32(*v),
            Value::Decimal128(v) => {
                self.write_u64(v.low());
                self.write_u64(v.high());
            }
            Value::Document(v) => self.write_document(v, depth + 1)?,
            Value::Array(v) => self.write_document(&v.to_document(), depth + 1)?,
            Value::DbPointer(v) => {
                self.write_string(&v.namespace);
                self.out.extend_from_slice(&v.id.bytes());
            }
            Value::JavaScriptWithScope(v) => {
                let start = self.out.len();
                self.write_i32(0);
                self.write_string(&v.code);
                self.write_document(&v.scope, depth + 1)?;
                let len = (self.out.len() - start) as i32;
                self.out[start..start + 4].copy_from_slice(&len.to_le_bytes());
            }
            Value::Timestamp(v) => {
                self.write_u64(((v.time as u64) << 32) | v.increment as u64)
            }
        }
        Ok(())
    }
}

pub(crate) fn write_document(doc: &Document) -> Result<Vec<u8>> {
    let mut writer = Writer::new();
    writer.write_document(doc, 0)?;
    Ok(writer.out)
}

pub(crate) fn write_array(array: &Array) -> Result<Vec<u8>> {
    write_document(&array.to_document())
}

/// Serializes a whole value: documents and arrays in their framed form,
/// primitives as a bare payload. Deprecated and internal kinds have no
/// top-level form.
pub(crate) fn write_value(value: &Value) -> Result<Vec<u8>> {
    match value.fold() {
        Fold::Document(doc) => write_document(doc),
        Fold::Array(array) => write_array(array),
        Fold::Primitive(v) => write_primitive(v),
        Fold::Unexpected(v) => Err(unexpected(v)),
    }
}

/// Bare payload form of a primitive value, without an enclosing document.
pub(crate) fn write_primitive(value: &Value) -> Result<Vec<u8>> {
    match value {
        Value::Double(_)
        | Value::String(_)
        | Value::Binary(_)
        | Value::ObjectId(_)
        | Value::Boolean(_)
        | Value::DateTime(_)
        | Value::Null
        | Value::RegularExpression(_)
        | Value::JavaScript(_)
        | Value::Int32(_)
        | Value::Int64(_)
        | Value::Decimal128(_) => {
            let mut writer = Writer::new();
            writer.write_payload(value, 0)?;
            Ok(writer.out)
        }
        _ => Err(unexpected(value)),
    }
}

fn unexpected(value: &Value) -> Error {
    Error::encoding(format!("unexpected bson type '{:?}'", value.bson_type()))
}
