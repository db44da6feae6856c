use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::descriptor::Descriptor;
use crate::error::{Error, Result};
use crate::ser::{Encode, Encoder};
use crate::value::{
    Array, Binary, BsonType, DateTime, DbPointer, Decimal128, Document, JavaScript,
    JavaScriptWithScope, MaxKey, MinKey, ObjectId, Regex, Symbol, Timestamp, Undefined, Value,
};

impl Encode for () {
    fn descriptor() -> Descriptor {
        Descriptor::primitive("Unit", BsonType::Null)
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.encode_null()
    }
}

impl Encode for bool {
    fn descriptor() -> Descriptor {
        Descriptor::primitive("Boolean", BsonType::Boolean)
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.encode_bool(*self)
    }
}

macro_rules! int32 {
    ($($ty:ident),*) => {
        $(impl Encode for $ty {
            fn descriptor() -> Descriptor {
                Descriptor::primitive(stringify!($ty), BsonType::Int32)
            }

            fn encode(&self, encoder: &mut Encoder) -> Result<()> {
                encoder.encode_i32(*self as i32)
            }
        })*
    };
}
int32!(i8, i16, i32, u8, u16);

impl Encode for i64 {
    fn descriptor() -> Descriptor {
        Descriptor::primitive("i64", BsonType::Int64)
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.encode_i64(*self)
    }
}

impl Encode for u32 {
    fn descriptor() -> Descriptor {
        Descriptor::primitive("u32", BsonType::Int64)
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.encode_i64(*self as i64)
    }
}

macro_rules! int64_checked {
    ($($ty:ident),*) => {
        $(impl Encode for $ty {
            fn descriptor() -> Descriptor {
                Descriptor::primitive(stringify!($ty), BsonType::Int64)
            }

            fn encode(&self, encoder: &mut Encoder) -> Result<()> {
                let value = i64::try_from(*self).map_err(|_| {
                    Error::encoding(format!(
                        "{} value '{}' does not fit in a bson int64",
                        stringify!($ty),
                        self
                    ))
                })?;
                encoder.encode_i64(value)
            }
        })*
    };
}
int64_checked!(u64, usize, isize);

impl Encode for f32 {
    fn descriptor() -> Descriptor {
        Descriptor::primitive("f32", BsonType::Double)
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.encode_f64(*self as f64)
    }
}

impl Encode for f64 {
    fn descriptor() -> Descriptor {
        Descriptor::primitive("f64", BsonType::Double)
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.encode_f64(*self)
    }
}

impl Encode for char {
    fn descriptor() -> Descriptor {
        Descriptor::primitive("char", BsonType::String)
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        let mut buf = [0u8; 4];
        encoder.encode_string(self.encode_utf8(&mut buf))
    }
}

impl Encode for str {
    fn descriptor() -> Descriptor {
        Descriptor::primitive("String", BsonType::String)
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.encode_string(self)
    }
}

impl Encode for String {
    fn descriptor() -> Descriptor {
        Descriptor::primitive("String", BsonType::String)
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.encode_string(self)
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn descriptor() -> Descriptor {
        T::descriptor()
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        (**self).encode(encoder)
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn descriptor() -> Descriptor {
        T::descriptor()
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        (**self).encode(encoder)
    }
}

impl<T: ToOwned + Encode + ?Sized> Encode for Cow<'_, T> {
    fn descriptor() -> Descriptor {
        T::descriptor()
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        (**self).encode(encoder)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn descriptor() -> Descriptor {
        T::descriptor().nullable()
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        match self {
            Some(value) => value.encode(encoder),
            None => encoder.encode_null(),
        }
    }
}

impl<T: Encode> Encode for [T] {
    fn descriptor() -> Descriptor {
        Descriptor::list("List")
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        let d = Self::descriptor();
        encoder.begin(&d)?;
        for (index, element) in self.iter().enumerate() {
            encoder.encode_element(&d, index, element)?;
        }
        encoder.end(&d)
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn descriptor() -> Descriptor {
        <[T]>::descriptor()
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        self.as_slice().encode(encoder)
    }
}

macro_rules! map {
    ($ty:ident <K, V $(, $extra:ident : $bound:path)?>) => {
        impl<K: Encode, V: Encode $(, $extra: $bound)?> Encode for $ty<K, V $(, $extra)?> {
            fn descriptor() -> Descriptor {
                Descriptor::map("Map")
            }

            fn encode(&self, encoder: &mut Encoder) -> Result<()> {
                let d = Self::descriptor();
                encoder.begin(&d)?;
                for (index, (key, value)) in self.iter().enumerate() {
                    encoder.encode_element(&d, 2 * index, key)?;
                    encoder.encode_element(&d, 2 * index + 1, value)?;
                }
                encoder.end(&d)
            }
        }
    };
}
map!(HashMap<K, V, H: BuildHasher>);
map!(BTreeMap<K, V>);

impl Encode for Binary {
    fn descriptor() -> Descriptor {
        Descriptor::primitive("Binary", BsonType::Binary)
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.encode_binary(self)
    }
}

impl Encode for ObjectId {
    fn descriptor() -> Descriptor {
        Descriptor::primitive("ObjectId", BsonType::ObjectId)
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.encode_object_id(*self)
    }
}

impl Encode for Decimal128 {
    fn descriptor() -> Descriptor {
        Descriptor::primitive("Decimal128", BsonType::Decimal128)
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.encode_decimal128(*self)
    }
}

impl Encode for Regex {
    fn descriptor() -> Descriptor {
        Descriptor::primitive("RegularExpression", BsonType::RegularExpression)
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.encode_regex(self)
    }
}

impl Encode for DbPointer {
    fn descriptor() -> Descriptor {
        Descriptor::primitive("DbPointer", BsonType::DbPointer)
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.encode_db_pointer(self)
    }
}

impl Encode for JavaScriptWithScope {
    fn descriptor() -> Descriptor {
        Descriptor::primitive("JavaScriptWithScope", BsonType::JavaScriptWithScope)
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.encode_js_with_scope(self)
    }
}

impl Encode for Timestamp {
    fn descriptor() -> Descriptor {
        Descriptor::primitive("Timestamp", BsonType::Timestamp)
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.encode_timestamp(*self)
    }
}

impl Encode for DateTime {
    fn descriptor() -> Descriptor {
        Descriptor::primitive("DateTime", BsonType::DateTime)
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.encode_date_time(self.0)
    }
}

impl Encode for JavaScript {
    fn descriptor() -> Descriptor {
        Descriptor::primitive("JavaScript", BsonType::JavaScript)
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.encode_javascript(&self.0)
    }
}

impl Encode for Symbol {
    fn descriptor() -> Descriptor {
        Descriptor::primitive("Symbol", BsonType::Symbol)
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.encode_symbol(&self.0)
    }
}

impl Encode for MaxKey {
    fn descriptor() -> Descriptor {
        Descriptor::primitive("MaxKey", BsonType::MaxKey)
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.encode_max_key()
    }
}

impl Encode for MinKey {
    fn descriptor() -> Descriptor {
        Descriptor::primitive("MinKey", BsonType::MinKey)
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.encode_min_key()
    }
}

impl Encode for Undefined {
    fn descriptor() -> Descriptor {
        Descriptor::primitive("Undefined", BsonType::Undefined)
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.encode_undefined()
    }
}

impl Encode for SystemTime {
    fn descriptor() -> Descriptor {
        Descriptor::primitive("SystemTime", BsonType::DateTime)
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        let millis = match self.duration_since(UNIX_EPOCH) {
            Ok(elapsed) => i64::try_from(elapsed.as_millis())
                .map_err(|_| Error::encoding("system time is out of the date-time range"))?,
            Err(before_epoch) => {
                let millis = i64::try_from(before_epoch.duration().as_millis())
                    .map_err(|_| Error::encoding("system time is out of the date-time range"))?;
                -millis
            }
        };
        encoder.encode_date_time(millis)
    }
}

impl Encode for Value {
    fn descriptor() -> Descriptor {
        Descriptor::structure("BsonValue", &[])
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.encode_value(self)
    }
}

impl Encode for Document {
    fn descriptor() -> Descriptor {
        Descriptor::structure("BsonDocument", &[])
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.encode_value(&Value::Document(self.clone()))
    }
}

impl Encode for Array {
    fn descriptor() -> Descriptor {
        Descriptor::list("BsonArray")
    }

    fn encode(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.encode_value(&Value::Array(self.clone()))
    }
}
