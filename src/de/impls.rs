use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::de::{Decode, Decoder};
use crate::descriptor::Descriptor;
use crate::error::{Error, Result};
use crate::ser::Encode;
use crate::value::{
    Array, Binary, DateTime, DbPointer, Decimal128, Document, JavaScript, JavaScriptWithScope,
    MaxKey, MinKey, ObjectId, Regex, Symbol, Timestamp, Undefined, Value,
};

impl Decode for () {
    fn descriptor() -> Descriptor {
        <() as Encode>::descriptor()
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.decode_null()
    }
}

impl Decode for bool {
    fn descriptor() -> Descriptor {
        <bool as Encode>::descriptor()
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.decode_bool()
    }
}

macro_rules! int32 {
    ($($ty:ident),*) => {
        $(impl Decode for $ty {
            fn descriptor() -> Descriptor {
                <$ty as Encode>::descriptor()
            }

            fn decode(decoder: &mut Decoder) -> Result<Self> {
                let value = decoder.decode_i32()?;
                $ty::try_from(value).map_err(|_| {
                    Error::decoding(format!(
                        "int32 value '{}' does not fit in {}",
                        value,
                        stringify!($ty)
                    ))
                })
            }
        })*
    };
}
int32!(i8, i16, u8, u16);

impl Decode for i32 {
    fn descriptor() -> Descriptor {
        <i32 as Encode>::descriptor()
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.decode_i32()
    }
}

impl Decode for i64 {
    fn descriptor() -> Descriptor {
        <i64 as Encode>::descriptor()
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.decode_i64()
    }
}

macro_rules! int64 {
    ($($ty:ident),*) => {
        $(impl Decode for $ty {
            fn descriptor() -> Descriptor {
                <$ty as Encode>::descriptor()
            }

            fn decode(decoder: &mut Decoder) -> Result<Self> {
                let value = decoder.decode_i64()?;
                $ty::try_from(value).map_err(|_| {
                    Error::decoding(format!(
                        "int64 value '{}' does not fit in {}",
                        value,
                        stringify!($ty)
                    ))
                })
            }
        })*
    };
}
int64!(u32, u64, usize, isize);

impl Decode for f32 {
    fn descriptor() -> Descriptor {
        <f32 as Encode>::descriptor()
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        Ok(decoder.decode_f64()? as f32)
    }
}

impl Decode for f64 {
    fn descriptor() -> Descriptor {
        <f64 as Encode>::descriptor()
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.decode_f64()
    }
}

impl Decode for char {
    fn descriptor() -> Descriptor {
        <char as Encode>::descriptor()
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        let s = decoder.decode_string()?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(Error::decoding(format!(
                "string '{}' is not a single character",
                s
            ))),
        }
    }
}

impl Decode for String {
    fn descriptor() -> Descriptor {
        <String as Encode>::descriptor()
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.decode_string()
    }
}

impl<T: Decode> Decode for Box<T> {
    fn descriptor() -> Descriptor {
        T::descriptor()
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        T::decode(decoder).map(Box::new)
    }
}

impl<T: Decode> Decode for Option<T> {
    fn descriptor() -> Descriptor {
        T::descriptor().nullable()
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        if decoder.is_null()? {
            decoder.decode_null()?;
            Ok(None)
        } else {
            T::decode(decoder).map(Some)
        }
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn descriptor() -> Descriptor {
        Descriptor::list("List")
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        let d = Self::descriptor();
        decoder.begin(&d)?;
        let mut elements = Vec::new();
        while decoder.next_element(&d)?.is_some() {
            elements.push(T::decode(decoder)?);
        }
        decoder.end(&d)?;
        Ok(elements)
    }
}

/// Key-side contract for typed maps: every implementor can be rebuilt from
/// the canonical string the encoder turns map keys into, so typed maps
/// round-trip.
pub trait MapKey: Encode + Sized {
    fn from_key(key: &str) -> Result<Self>;
}

impl MapKey for String {
    fn from_key(key: &str) -> Result<Self> {
        Ok(key.to_owned())
    }
}

impl MapKey for bool {
    fn from_key(key: &str) -> Result<Self> {
        match key {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(invalid_key(key, "bool")),
        }
    }
}

impl MapKey for char {
    fn from_key(key: &str) -> Result<Self> {
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(invalid_key(key, "char")),
        }
    }
}

macro_rules! parsed_key {
    ($($ty:ident),*) => {
        $(impl MapKey for $ty {
            fn from_key(key: &str) -> Result<Self> {
                key.parse().map_err(|_| invalid_key(key, stringify!($ty)))
            }
        })*
    };
}
parsed_key!(i32, i64, f64, ObjectId);

fn invalid_key(key: &str, ty: &str) -> Error {
    Error::decoding(format!("map key '{}' is not a valid {}", key, ty))
}

macro_rules! map {
    ($ty:ident <K, V $(, $extra:ident : $bound:path)?> $(, K: $($kbound:path),*)?) => {
        impl<K: MapKey $($(+ $kbound)*)?, V: Decode $(, $extra: $bound + Default)?> Decode
            for $ty<K, V $(, $extra)?>
        {
            fn descriptor() -> Descriptor {
                Descriptor::map("Map")
            }

            fn decode(decoder: &mut Decoder) -> Result<Self> {
                let d = Self::descriptor();
                decoder.begin(&d)?;
                let mut map = Self::default();
                let mut key = None;
                while let Some(index) = decoder.next_element(&d)? {
                    if index % 2 == 0 {
                        key = Some(K::from_key(&decoder.decode_string()?)?);
                    } else if let Some(key) = key.take() {
                        map.insert(key, V::decode(decoder)?);
                    }
                }
                decoder.end(&d)?;
                Ok(map)
            }
        }
    };
}
map!(HashMap<K, V, H: BuildHasher>, K: Eq, Hash);
map!(BTreeMap<K, V>, K: Ord);

macro_rules! extraction {
    ($($ty:ty => $method:ident),* $(,)?) => {
        $(impl Decode for $ty {
            fn descriptor() -> Descriptor {
                <$ty as Encode>::descriptor()
            }

            fn decode(decoder: &mut Decoder) -> Result<Self> {
                decoder.$method()
            }
        })*
    };
}
extraction! {
    Binary => decode_binary,
    ObjectId => decode_object_id,
    Decimal128 => decode_decimal128,
    Regex => decode_regex,
    DbPointer => decode_db_pointer,
    JavaScriptWithScope => decode_js_with_scope,
    Timestamp => decode_timestamp,
}

impl Decode for DateTime {
    fn descriptor() -> Descriptor {
        <DateTime as Encode>::descriptor()
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.decode_date_time().map(DateTime)
    }
}

impl Decode for JavaScript {
    fn descriptor() -> Descriptor {
        <JavaScript as Encode>::descriptor()
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.decode_javascript().map(JavaScript)
    }
}

impl Decode for Symbol {
    fn descriptor() -> Descriptor {
        <Symbol as Encode>::descriptor()
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.decode_symbol().map(Symbol)
    }
}

impl Decode for MaxKey {
    fn descriptor() -> Descriptor {
        <MaxKey as Encode>::descriptor()
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.decode_max_key().map(|_| MaxKey)
    }
}

impl Decode for MinKey {
    fn descriptor() -> Descriptor {
        <MinKey as Encode>::descriptor()
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.decode_min_key().map(|_| MinKey)
    }
}

impl Decode for Undefined {
    fn descriptor() -> Descriptor {
        <Undefined as Encode>::descriptor()
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.decode_undefined().map(|_| Undefined)
    }
}

impl Decode for SystemTime {
    fn descriptor() -> Descriptor {
        <SystemTime as Encode>::descriptor()
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        let millis = decoder.decode_date_time()?;
        let out_of_range = || Error::decoding("date-time is out of the system time range");
        if millis >= 0 {
            UNIX_EPOCH
                .checked_add(Duration::from_millis(millis as u64))
                .ok_or_else(out_of_range)
        } else {
            UNIX_EPOCH
                .checked_sub(Duration::from_millis(millis.unsigned_abs()))
                .ok_or_else(out_of_range)
        }
    }
}

impl Decode for Value {
    fn descriptor() -> Descriptor {
        <Value as Encode>::descriptor()
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.decode_value()
    }
}

impl Decode for Document {
    fn descriptor() -> Descriptor {
        <Document as Encode>::descriptor()
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        match decoder.decode_value()? {
            Value::Document(doc) => Ok(doc),
            value => Err(Error::decoding(format!(
                "value expected to be of type Document is of unexpected type {:?}",
                value.bson_type()
            ))),
        }
    }
}

impl Decode for Array {
    fn descriptor() -> Descriptor {
        <Array as Encode>::descriptor()
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        match decoder.decode_value()? {
            Value::Array(array) => Ok(array),
            value => Err(Error::decoding(format!(
                "value expected to be of type Array is of unexpected type {:?}",
                value.bson_type()
            ))),
        }
    }
}
