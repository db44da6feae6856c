//! Deserialization: from the BSON value tree back to typed values.
//!
//! The [`Decoder`] walks a borrowed value tree one level at a time. A
//! record codec opens its document with [`Decoder::begin`], pulls declared
//! field indices out of [`Decoder::next_element`] (fields absent from the
//! input are skipped), extracts each field with the type-checked accessors,
//! and closes the level with [`Decoder::end`], which is where unknown input
//! keys are rejected unless the configuration tolerates them.
//!
//! ## A record
//!
//! ```rust
//! use bsonic::{Decode, Decoder, Descriptor, Error, Result};
//!
//! struct Demo {
//!     code: i32,
//!     message: String,
//! }
//!
//! impl Decode for Demo {
//!     fn descriptor() -> Descriptor {
//!         Descriptor::structure("Demo", &["code", "message"])
//!     }
//!
//!     fn decode(decoder: &mut Decoder) -> Result<Self> {
//!         let d = Self::descriptor();
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
//!         Ok(Demo {
//!             code: code.ok_or_else(|| Error::decoding("missing field 'code'"))?,
//!             message: message.ok_or_else(|| Error::decoding("missing field 'message'"))?,
//!         })
//!     }
//! }
//! ```

mod impls;

pub use self::impls::MapKey;

use std::any::Any;

use crate::descriptor::{Descriptor, Kind};
use crate::error::{Error, Result};
use crate::value::{Array, Document, Value};
use crate::Bson;

/// Trait for types that can be deserialized from a BSON value.
pub trait Decode: Sized {
    /// Shape of this type; must agree with what [`Decode::decode`] does.
    fn descriptor() -> Descriptor;

    fn decode(decoder: &mut Decoder<'_>) -> Result<Self>;
}

/// Tree decoder: one cursor per open structural level over a borrowed
/// value tree.
pub struct Decoder<'a> {
    bson: &'a Bson,
    root: &'a Value,
    stack: Vec<Level<'a>>,
}

enum Level<'a> {
    Document {
        doc: &'a Document,
        position: usize,
        tag: Option<&'a str>,
    },
    List {
        arr: &'a Array,
        index: Option<usize>,
    },
    Map {
        doc: &'a Document,
        position: Option<usize>,
        /// String form of the current key, handed out at key positions.
        synthetic: Value,
    },
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(bson: &'a Bson, root: &'a Value) -> Self {
        Decoder {
            bson,
            root,
            stack: Vec::new(),
        }
    }

    /// Current element inside the borrowed tree. Map key positions have no
    /// tree element and are rejected here.
    fn current_tree(&self) -> Result<&'a Value> {
        match self.stack.last() {
            None => Ok(self.root),
            Some(Level::Document { doc, tag, .. }) => tag
                .and_then(|tag| doc.get(tag))
                .ok_or_else(no_element),
            Some(Level::List { arr, index }) => index
                .and_then(|index| arr.get(index))
                .ok_or_else(no_element),
            Some(Level::Map { doc, position, .. }) => match position {
                Some(position) if position % 2 == 1 => doc
                    .get_index(position / 2)
                    .map(|(_, value)| value)
                    .ok_or_else(no_element),
                Some(_) => Err(Error::decoding(
                    "a map key position holds no structural value",
                )),
                None => Err(no_element()),
            },
        }
    }

    /// Current element as the accessors see it, including the synthetic
    /// string standing in for a map key.
    fn current(&self) -> Result<&Value> {
        if let Some(Level::Map {
            position: Some(position),
            synthetic,
            ..
        }) = self.stack.last()
        {
            if position % 2 == 0 {
                return Ok(synthetic);
            }
        }
        self.current_tree()
    }

    /// Opens the structural level selected by the descriptor kind,
    /// narrowing the current value.
    pub fn begin(&mut self, descriptor: &Descriptor) -> Result<()> {
        let value = self.current_tree()?;
        let level = match descriptor.kind() {
            Kind::List => Level::List {
                arr: value.as_array()?,
                index: None,
            },
            Kind::Map => Level::Map {
                doc: value.as_document()?,
                position: None,
                synthetic: Value::Null,
            },
            _ => Level::Document {
                doc: value.as_document()?,
                position: 0,
                tag: None,
            },
        };
        self.stack.push(level);
        Ok(())
    }

    /// Closes the current level. At document level every input key must
    /// match a declared field, unless the configuration ignores unknown
    /// keys; maps are open by definition and never checked.
    pub fn end(&mut self, descriptor: &Descriptor) -> Result<()> {
        let level = self
            .stack
            .pop()
            .ok_or_else(|| Error::decoding("end called with no open structure"))?;
        if let Level::Document { doc, .. } = level {
            if !self.bson.configuration().ignore_unknown_keys {
                for key in doc.keys() {
                    if !descriptor.contains_element(key) {
                        return Err(Error::decoding(format!("unknown key '{}'", key)));
                    }
                }
            }
        }
        Ok(())
    }

    /// Index of the next element to process, or `None` when the level is
    /// exhausted. Document level walks the declared field list and skips
    /// fields absent from the input; list level counts elements; map level
    /// alternates key and value positions.
    pub fn next_element(&mut self, descriptor: &Descriptor) -> Result<Option<usize>> {
        match self.stack.last_mut() {
            None => Err(Error::decoding("next_element with no open structure")),
            Some(Level::Document { doc, position, tag }) => {
                while *position < descriptor.elements().len() {
                    let name = descriptor.element(*position);
                    *position += 1;
                    if doc.contains_key(name) {
                        *tag = Some(name);
                        return Ok(Some(*position - 1));
                    }
                }
                Ok(None)
            }
            Some(Level::List { arr, index }) => {
                let next = index.map_or(0, |index| index + 1);
                if next < arr.len() {
                    *index = Some(next);
                    Ok(Some(next))
                } else {
                    Ok(None)
                }
            }
            Some(Level::Map {
                doc,
                position,
                synthetic,
            }) => {
                let next = position.map_or(0, |position| position + 1);
                if next < doc.len() * 2 {
                    *position = Some(next);
                    if next % 2 == 0 {
                        let (key, _) = doc.get_index(next / 2).ok_or_else(no_element)?;
                        *synthetic = Value::String(key.to_owned());
                    }
                    Ok(Some(next))
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// Whether the current element is null, without consuming it.
    pub fn is_null(&self) -> Result<bool> {
        Ok(self.current()?.is_null())
    }

    pub fn decode_null(&mut self) -> Result<()> {
        let value = self.current()?;
        if value.is_null() {
            Ok(())
        } else {
            Err(Error::decoding(format!(
                "value expected to be of type Null is of unexpected type {:?}",
                value.bson_type()
            )))
        }
    }

    pub fn decode_bool(&mut self) -> Result<bool> {
        self.current()?.as_bool()
    }

    pub fn decode_i32(&mut self) -> Result<i32> {
        self.current()?.as_i32()
    }

    pub fn decode_i64(&mut self) -> Result<i64> {
        self.current()?.as_i64()
    }

    pub fn decode_f64(&mut self) -> Result<f64> {
        self.current()?.as_f64()
    }

    pub fn decode_string(&mut self) -> Result<String> {
        self.current()?.as_str().map(str::to_owned)
    }

    /// Variant index of an enum encoded as its variant name.
    pub fn decode_enum(&mut self, descriptor: &Descriptor) -> Result<usize> {
        let name = self.current()?.as_str()?;
        descriptor.element_index(name).ok_or_else(|| {
            Error::decoding(format!(
                "'{}' is not a valid variant of enum '{}'",
                name,
                descriptor.serial_name()
            ))
        })
    }

    pub fn decode_binary(&mut self) -> Result<crate::value::Binary> {
        Ok(self.current()?.as_binary()?.clone())
    }

    pub fn decode_object_id(&mut self) -> Result<crate::value::ObjectId> {
        self.current()?.as_object_id()
    }

    /// Epoch milliseconds.
    pub fn decode_date_time(&mut self) -> Result<i64> {
        self.current()?.as_date_time()
    }

    pub fn decode_javascript(&mut self) -> Result<String> {
        self.current()?.as_javascript().map(str::to_owned)
    }

    pub fn decode_decimal128(&mut self) -> Result<crate::value::Decimal128> {
        self.current()?.as_decimal128()
    }

    pub fn decode_regex(&mut self) -> Result<crate::value::Regex> {
        Ok(self.current()?.as_regex()?.clone())
    }

    pub fn decode_db_pointer(&mut self) -> Result<crate::value::DbPointer> {
        Ok(self.current()?.as_db_pointer()?.clone())
    }

    pub fn decode_js_with_scope(&mut self) -> Result<crate::value::JavaScriptWithScope> {
        Ok(self.current()?.as_js_with_scope()?.clone())
    }

    pub fn decode_max_key(&mut self) -> Result<()> {
        self.current()?.as_max_key()
    }

    pub fn decode_min_key(&mut self) -> Result<()> {
        self.current()?.as_min_key()
    }

    pub fn decode_symbol(&mut self) -> Result<String> {
        self.current()?.as_symbol().map(str::to_owned)
    }

    pub fn decode_timestamp(&mut self) -> Result<crate::value::Timestamp> {
        self.current()?.as_timestamp()
    }

    pub fn decode_undefined(&mut self) -> Result<()> {
        self.current()?.as_undefined()
    }

    /// Clones the current element out of the tree.
    pub fn decode_value(&mut self) -> Result<Value> {
        Ok(self.current()?.clone())
    }

    /// Decodes a polymorphic value: reads and strips the class
    /// discriminator field, resolves the variant codec registered under
    /// (base serial name, discriminator), and decodes the remaining fields
    /// against it.
    pub fn decode_open<T: 'static>(&mut self, descriptor: &Descriptor) -> Result<T> {
        let doc = self.current_tree()?.as_document()?;
        let discriminator = &self.bson.configuration().class_discriminator;
        let mut wire = None;
        let mut stripped = Document::new();
        for (key, value) in doc.iter() {
            if key == discriminator {
                wire = Some(value.as_str()?.to_owned());
            } else {
                stripped.insert(key, value.clone());
            }
        }
        let wire = wire.ok_or_else(|| Error::decoding("class discriminator is missing"))?;
        let variant = self
            .bson
            .registry()
            .variant(descriptor.serial_name(), &wire)
            .ok_or_else(|| {
                Error::decoding(format!(
                    "no codec registered for discriminator '{}' of '{}'",
                    wire,
                    descriptor.serial_name()
                ))
            })?;
        let decoded: Box<dyn Any> = (variant.decode)(self.bson, &Value::Document(stripped))?;
        decoded.downcast::<T>().map(|value| *value).map_err(|_| {
            Error::decoding(format!(
                "codec registered for discriminator '{}' of '{}' produced an unexpected type",
                wire,
                descriptor.serial_name()
            ))
        })
    }
}

fn no_element() -> Error {
    Error::decoding("no element is selected")
}
