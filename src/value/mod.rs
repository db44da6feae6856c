//! In-memory representation of a BSON value.
//!
//! [`Value`] is the currency every other module trades in: the tree encoder
//! produces one, the tree decoder consumes one, and the raw reader/writer
//! convert it from and to wire bytes.

mod array;
mod decimal;
mod document;
mod types;

pub use self::array::Array;
pub use self::decimal::Decimal128;
pub use self::document::Document;
pub use self::types::{
    Binary, DateTime, DbPointer, JavaScript, JavaScriptWithScope, MaxKey, MinKey, ObjectId, Regex,
    RegexFlags, Symbol, Timestamp, Undefined,
};

use crate::error::{Error, Result};

/// BSON element type, carrying the exact wire tag byte of each kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BsonType {
    Double = 0x01,
    String = 0x02,
    Document = 0x03,
    Array = 0x04,
    Binary = 0x05,
    Undefined = 0x06,
    ObjectId = 0x07,
    Boolean = 0x08,
    DateTime = 0x09,
    Null = 0x0A,
    RegularExpression = 0x0B,
    DbPointer = 0x0C,
    JavaScript = 0x0D,
    Symbol = 0x0E,
    JavaScriptWithScope = 0x0F,
    Int32 = 0x10,
    Timestamp = 0x11,
    Int64 = 0x12,
    Decimal128 = 0x13,
    MinKey = 0xFF,
    MaxKey = 0x7F,
}

impl BsonType {
    /// The element tag byte written before each document entry.
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<BsonType> {
        Some(match tag {
            0x01 => BsonType::Double,
            0x02 => BsonType::String,
            0x03 => BsonType::Document,
            0x04 => BsonType::Array,
            0x05 => BsonType::Binary,
            0x06 => BsonType::Undefined,
            0x07 => BsonType::ObjectId,
            0x08 => BsonType::Boolean,
            0x09 => BsonType::DateTime,
            0x0A => BsonType::Null,
            0x0B => BsonType::RegularExpression,
            0x0C => BsonType::DbPointer,
            0x0D => BsonType::JavaScript,
            0x0E => BsonType::Symbol,
            0x0F => BsonType::JavaScriptWithScope,
            0x10 => BsonType::Int32,
            0x11 => BsonType::Timestamp,
            0x12 => BsonType::Int64,
            0x13 => BsonType::Decimal128,
            0xFF => BsonType::MinKey,
            0x7F => BsonType::MaxKey,
            _ => return None,
        })
    }
}

/// Any BSON value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Double(f64),
    String(String),
    Binary(Binary),
    ObjectId(ObjectId),
    Boolean(bool),
    /// Signed epoch milliseconds.
    DateTime(i64),
    Null,
    RegularExpression(Regex),
    JavaScript(String),
    Int32(i32),
    Int64(i64),
    Decimal128(Decimal128),
    Document(Document),
    Array(Array),
    DbPointer(DbPointer),
    JavaScriptWithScope(JavaScriptWithScope),
    MaxKey,
    MinKey,
    Symbol(String),
    Timestamp(Timestamp),
    Undefined,
}

impl Default for Value {
    /// The default value is null.
    fn default() -> Self {
        Value::Null
    }
}

/// Classification of a [`Value`] produced by [`Value::fold`].
///
/// Array must be handled before document wherever both could apply: any
/// array is representable as a document, but a document is not an array.
pub enum Fold<'a> {
    Primitive(&'a Value),
    Document(&'a Document),
    Array(&'a Array),
    /// A deprecated or internal kind the caller may not want to handle
    /// (symbol, timestamp, undefined).
    Unexpected(&'a Value),
}

impl Value {
    pub fn bson_type(&self) -> BsonType {
        match self {
            Value::Double(_) => BsonType::Double,
            Value::String(_) => BsonType::String,
            Value::Binary(_) => BsonType::Binary,
            Value::ObjectId(_) => BsonType::ObjectId,
            Value::Boolean(_) => BsonType::Boolean,
            Value::DateTime(_) => BsonType::DateTime,
            Value::Null => BsonType::Null,
            Value::RegularExpression(_) => BsonType::RegularExpression,
            Value::JavaScript(_) => BsonType::JavaScript,
            Value::Int32(_) => BsonType::Int32,
            Value::Int64(_) => BsonType::Int64,
            Value::Decimal128(_) => BsonType::Decimal128,
            Value::Document(_) => BsonType::Document,
            Value::Array(_) => BsonType::Array,
            Value::DbPointer(_) => BsonType::DbPointer,
            Value::JavaScriptWithScope(_) => BsonType::JavaScriptWithScope,
            Value::MaxKey => BsonType::MaxKey,
            Value::MinKey => BsonType::MinKey,
            Value::Symbol(_) => BsonType::Symbol,
            Value::Timestamp(_) => BsonType::Timestamp,
            Value::Undefined => BsonType::Undefined,
        }
    }

    /// Dispatch exactly one of the four structural classes of this value.
    pub fn fold(&self) -> Fold<'_> {
        match self {
            Value::Array(a) => Fold::Array(a),
            Value::Document(d) => Fold::Document(d),
            Value::Symbol(_) | Value::Timestamp(_) | Value::Undefined => Fold::Unexpected(self),
            _ => Fold::Primitive(self),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Value::Double(v) => Ok(*v),
            _ => Err(mismatch(BsonType::Double, self)),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::String(v) => Ok(v),
            _ => Err(mismatch(BsonType::String, self)),
        }
    }

    pub fn as_binary(&self) -> Result<&Binary> {
        match self {
            Value::Binary(v) => Ok(v),
            _ => Err(mismatch(BsonType::Binary, self)),
        }
    }

    pub fn as_object_id(&self) -> Result<ObjectId> {
        match self {
            Value::ObjectId(v) => Ok(*v),
            _ => Err(mismatch(BsonType::ObjectId, self)),
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Boolean(v) => Ok(*v),
            _ => Err(mismatch(BsonType::Boolean, self)),
        }
    }

    pub fn as_date_time(&self) -> Result<i64> {
        match self {
            Value::DateTime(v) => Ok(*v),
            _ => Err(mismatch(BsonType::DateTime, self)),
        }
    }

    pub fn as_regex(&self) -> Result<&Regex> {
        match self {
            Value::RegularExpression(v) => Ok(v),
            _ => Err(mismatch(BsonType::RegularExpression, self)),
        }
    }

    pub fn as_javascript(&self) -> Result<&str> {
        match self {
            Value::JavaScript(v) => Ok(v),
            _ => Err(mismatch(BsonType::JavaScript, self)),
        }
    }

    pub fn as_i32(&self) -> Result<i32> {
        match self {
            Value::Int32(v) => Ok(*v),
            _ => Err(mismatch(BsonType::Int32, self)),
        }
    }

    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Value::Int64(v) => Ok(*v),
            _ => Err(mismatch(BsonType::Int64, self)),
        }
    }

    pub fn as_decimal128(&self) -> Result<Decimal128> {
        match self {
            Value::Decimal128(v) => Ok(*v),
            _ => Err(mismatch(BsonType::Decimal128, self)),
        }
    }

    pub fn as_document(&self) -> Result<&Document> {
        match self {
            Value::Document(v) => Ok(v),
            _ => Err(mismatch(BsonType::Document, self)),
        }
    }

    pub fn as_array(&self) -> Result<&Array> {
        match self {
            Value::Array(v) => Ok(v),
            _ => Err(mismatch(BsonType::Array, self)),
        }
    }

    pub fn as_db_pointer(&self) -> Result<&DbPointer> {
        match self {
            Value::DbPointer(v) => Ok(v),
            _ => Err(mismatch(BsonType::DbPointer, self)),
        }
    }

    pub fn as_js_with_scope(&self) -> Result<&JavaScriptWithScope> {
        match self {
            Value::JavaScriptWithScope(v) => Ok(v),
            _ => Err(mismatch(BsonType::JavaScriptWithScope, self)),
        }
    }

    pub fn as_symbol(&self) -> Result<&str> {
        match self {
            Value::Symbol(v) => Ok(v),
            _ => Err(mismatch(BsonType::Symbol, self)),
        }
    }

    pub fn as_timestamp(&self) -> Result<Timestamp> {
        match self {
            Value::Timestamp(v) => Ok(*v),
            _ => Err(mismatch(BsonType::Timestamp, self)),
        }
    }

    pub fn as_max_key(&self) -> Result<()> {
        match self {
            Value::MaxKey => Ok(()),
            _ => Err(mismatch(BsonType::MaxKey, self)),
        }
    }

    pub fn as_min_key(&self) -> Result<()> {
        match self {
            Value::MinKey => Ok(()),
            _ => Err(mismatch(BsonType::MinKey, self)),
        }
    }

    pub fn as_undefined(&self) -> Result<()> {
        match self {
            Value::Undefined => Ok(()),
            _ => Err(mismatch(BsonType::Undefined, self)),
        }
    }
}

fn mismatch(expected: BsonType, actual: &Value) -> Error {
    Error::decoding(format!(
        "value expected to be of type {:?} is of unexpected type {:?}",
        expected,
        actual.bson_type()
    ))
}
