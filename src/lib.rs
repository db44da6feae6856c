//! Bidirectional codec between typed values and the BSON binary format.
//!
//! Types describe their own shape with a [`Descriptor`] and drive the tree
//! [`Encoder`]/[`Decoder`] pair through the [`Encode`] and [`Decode`]
//! traits; a [`Bson`] instance turns that into value trees
//! ([`Bson::to_value`]/[`Bson::from_value`]) or wire bytes
//! ([`Bson::dump`]/[`Bson::load`]).
//!
//! # Records
//!
//! ```rust
//! use bsonic::{Bson, Decode, Decoder, Descriptor, Encode, Encoder, Error, Result};
//!
//! #[derive(Debug, PartialEq)]
//! struct Example {
//!     code: i32,
//!     message: String,
//! }
//!
//! impl Encode for Example {
//!     fn descriptor() -> Descriptor {
//!         Descriptor::structure("Example", &["code", "message"])
//!     }
//!
//!     fn encode(&self, encoder: &mut Encoder) -> Result<()> {
//!         let d = <Example as Encode>::descriptor();
//!         encoder.begin(&d)?;
//!         encoder.encode_element(&d, 0, &self.code)?;
//!         encoder.encode_element(&d, 1, &self.message)?;
//!         encoder.end(&d)
//!     }
//! }
//!
//! impl Decode for Example {
//!     fn descriptor() -> Descriptor {
//!         <Example as Encode>::descriptor()
//!     }
//!
//!     fn decode(decoder: &mut Decoder) -> Result<Self> {
//!         let d = <Example as Decode>::descriptor();
//!         decoder.begin(&d)?;
//!         let mut code = None;
//!         let mut message = None;
//!         while let Some(index) = decoder.next_element(&d)? {
//!             match index {
//!                 0 => code = Some(decoder.decode_i32()?),
//!                 1 => message = Some(decoder.decode_string()?),
//!                 _ => unreachable!(),
//!             }
//!         }
//!         decoder.end(&d)?;
//!         Ok(Example {
//!             code: code.ok_or_else(|| Error::decoding("missing field 'code'"))?,
//!             message: message.ok_or_else(|| Error::decoding("missing field 'message'"))?,
//!         })
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     let bson = Bson::default();
//!     let example = Example {
//!         code: 200,
//!         message: "reminiscent of a driver".to_owned(),
//!     };
//!
//!     let bytes = bson.dump(&example)?;
//!     let out: Example = bson.load(&bytes)?;
//!     assert_eq!(example, out);
//!     Ok(())
//! }
//! ```
//!
//! # Bare primitives
//!
//! A primitive at top level has no enclosing document; it is written as its
//! bare payload and read back by inferring the wire kind from the target's
//! descriptor.
//!
//! ```rust
//! use bsonic::Bson;
//!
//! let bson = Bson::default();
//! assert_eq!(bson.dump(&10i32).unwrap(), [0x0A, 0x00, 0x00, 0x00]);
//! assert_eq!(bson.load::<i32>(&[0x0A, 0x00, 0x00, 0x00]).unwrap(), 10);
//! ```

mod config;
mod descriptor;
mod error;
mod raw;
mod registry;

pub mod de;
pub mod ser;
pub mod value;

pub use crate::config::BsonConfiguration;
#[doc(inline)]
pub use crate::de::{Decode, Decoder, MapKey};
pub use crate::descriptor::{Descriptor, Kind};
pub use crate::error::{Error, Result};
pub use crate::registry::{Registry, RegistryBuilder};
#[doc(inline)]
pub use crate::ser::{Encode, Encoder};
pub use crate::value::{
    Array, Binary, BsonType, DateTime, DbPointer, Decimal128, Document, Fold, JavaScript,
    JavaScriptWithScope, MaxKey, MinKey, ObjectId, Regex, RegexFlags, Symbol, Timestamp,
    Undefined, Value,
};

/// Main entry point: an immutable pairing of configuration and polymorphic
/// registry, shareable across threads.
pub struct Bson {
    configuration: BsonConfiguration,
    registry: Registry,
}

impl Default for Bson {
    fn default() -> Self {
        Bson::new(BsonConfiguration::default())
    }
}

impl Bson {
    pub fn new(configuration: BsonConfiguration) -> Self {
        Bson::with_registry(configuration, Registry::empty())
    }

    pub fn with_registry(configuration: BsonConfiguration, registry: Registry) -> Self {
        Bson {
            configuration,
            registry,
        }
    }

    pub fn configuration(&self) -> &BsonConfiguration {
        &self.configuration
    }

    pub(crate) fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Transforms a typed value into a [`Value`] tree.
    pub fn to_value<T: Encode + ?Sized>(&self, value: &T) -> Result<Value> {
        let mut encoder = Encoder::new(self);
        value.encode(&mut encoder)?;
        encoder.finish()
    }

    /// Transforms a [`Value`] tree into a typed value.
    pub fn from_value<T: Decode>(&self, value: &Value) -> Result<T> {
        // Deprecated and internal kinds never start a decode.
        if let Fold::Unexpected(value) = value.fold() {
            return Err(Error::decoding(format!(
                "unexpected bson type '{:?}'",
                value.bson_type()
            )));
        }
        let mut decoder = Decoder::new(self, value);
        T::decode(&mut decoder)
    }

    /// Encodes a typed value straight to wire bytes.
    pub fn dump<T: Encode + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        let value = self.to_value(value)?;
        raw::write_value(&value)
    }

    /// Parses wire bytes into a typed value.
    ///
    /// The target descriptor selects the parse: lists read an array,
    /// records/maps/polymorphic types read a document, enums and
    /// primitives read the bare payload of their wire kind. Nullable
    /// targets accept empty input as null.
    pub fn load<T: Decode>(&self, bytes: &[u8]) -> Result<T> {
        let descriptor = T::descriptor();
        let value = if descriptor.is_nullable() && bytes.is_empty() {
            Value::Null
        } else {
            match descriptor.kind() {
                Kind::List => Value::Array(raw::read_array(bytes)?),
                Kind::Struct | Kind::Map | Kind::Open => {
                    Value::Document(raw::read_document(bytes)?)
                }
                Kind::Enum => raw::read_primitive(bytes, BsonType::String)?,
                Kind::Primitive(ty) => raw::read_primitive(bytes, *ty)?,
            }
        };
        self.from_value(&value)
    }
}

/// Serializes a document to wire bytes, bypassing the typed layer.
pub fn dump_document(doc: &Document) -> Result<Vec<u8>> {
    raw::write_document(doc)
}

/// Serializes an array to wire bytes, bypassing the typed layer.
pub fn dump_array(array: &Array) -> Result<Vec<u8>> {
    raw::write_array(array)
}

/// Parses wire bytes as a document, bypassing the typed layer.
pub fn load_document(bytes: &[u8]) -> Result<Document> {
    raw::read_document(bytes)
}

/// Parses wire bytes as an array: the document form with the key sequence
/// "0", "1", ... verified.
pub fn load_array(bytes: &[u8]) -> Result<Array> {
    raw::read_array(bytes)
}
