//! Serialization: from typed values to the BSON value tree.
//!
//! A type describes its shape through [`Encode::descriptor`] and drives the
//! [`Encoder`] from [`Encode::encode`]. Structured shapes open a level with
//! [`Encoder::begin`], write their elements, and close it with
//! [`Encoder::end`]; the finished node is handed to the enclosing level
//! under the tag that was current when the level was opened.
//!
//! ## A record
//!
//! ```rust
//! use bsonic::{Descriptor, Encode, Encoder, Result};
//!
//! struct Demo {
//!     code: i32,
//!     message: String,
//! }
//!
//! impl Encode for Demo {
//!     fn descriptor() -> Descriptor {
//!         Descriptor::structure("Demo", &["code", "message"])
//!     }
//!
//!     fn encode(&self, encoder: &mut Encoder) -> Result<()> {
//!         let d = Self::descriptor();
//!         encoder.begin(&d)?;
//!         encoder.encode_element(&d, 0, &self.code)?;
//!         encoder.encode_element(&d, 1, &self.message)?;
//!         encoder.end(&d)
//!     }
//! }
//! ```

mod impls;

use crate::descriptor::{Descriptor, Kind};
use crate::error::{Error, Result};
use crate::value::{Array, Document, Value};
use crate::Bson;

/// Trait for types that can be serialized into a BSON value.
pub trait Encode {
    /// Shape of this type; must agree with what [`Encode::encode`] does.
    fn descriptor() -> Descriptor;

    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()>;
}

/// Tree encoder: accumulates one node per open structural level and folds
/// each finished node into its parent.
///
/// The bottom of the stack is a single-value slot for the bare top-level
/// value; recording it twice, or finishing without recording it, is an
/// error.
pub struct Encoder<'a> {
    bson: &'a Bson,
    stack: Vec<Level>,
    root: Option<Value>,
    /// Tag the next recorded value is stored under.
    pending: Option<String>,
    /// Discriminator wire name awaiting injection into the next document.
    discriminator: Option<String>,
}

enum Level {
    Document { content: Document, tag: Option<String> },
    List { content: Array, tag: Option<String> },
    Map { content: Document, key: Option<String>, tag: Option<String> },
}

impl<'a> Encoder<'a> {
    pub(crate) fn new(bson: &'a Bson) -> Self {
        Encoder {
            bson,
            stack: Vec::new(),
            root: None,
            pending: None,
            discriminator: None,
        }
    }

    pub(crate) fn finish(self) -> Result<Value> {
        if !self.stack.is_empty() {
            return Err(Error::encoding(
                "structure was left open; does the codec call end?",
            ));
        }
        self.root.ok_or_else(|| {
            Error::encoding("no value captured; does the codec record a value?")
        })
    }

    /// Whether fields equal to their declared default should be written.
    pub fn should_encode_default(&self) -> bool {
        self.bson.configuration().encode_defaults
    }

    /// Opens the structural level selected by the descriptor kind.
    pub fn begin(&mut self, descriptor: &Descriptor) -> Result<()> {
        let tag = self.pending.take();
        let mut level = match descriptor.kind() {
            Kind::List => Level::List {
                content: Array::new(),
                tag,
            },
            Kind::Map => Level::Map {
                content: Document::new(),
                key: None,
                tag,
            },
            _ => Level::Document {
                content: Document::new(),
                tag,
            },
        };
        if let Some(name) = self.discriminator.take() {
            match &mut level {
                Level::Document { content, .. } => {
                    content.insert(
                        self.bson.configuration().class_discriminator.clone(),
                        Value::String(name),
                    );
                }
                _ => {
                    return Err(Error::encoding(
                        "polymorphic value must encode as a document",
                    ))
                }
            }
        }
        self.stack.push(level);
        Ok(())
    }

    /// Closes the current level and reports it to its parent.
    pub fn end(&mut self, _descriptor: &Descriptor) -> Result<()> {
        let level = self
            .stack
            .pop()
            .ok_or_else(|| Error::encoding("end called with no open structure"))?;
        let (value, tag) = match level {
            Level::Document { content, tag } => (Value::Document(content), tag),
            Level::List { content, tag } => (Value::Array(content), tag),
            Level::Map { content, key, tag } => {
                if key.is_some() {
                    return Err(Error::encoding("map key was written without a value"));
                }
                (Value::Document(content), tag)
            }
        };
        self.pending = tag;
        self.put(value)
    }

    /// Selects the element the next recorded value belongs to.
    pub fn element(&mut self, descriptor: &Descriptor, index: usize) -> Result<()> {
        let tag = match self.stack.last() {
            Some(Level::List { .. }) | Some(Level::Map { .. }) => {
                itoa::Buffer::new().format(index).to_owned()
            }
            _ => descriptor.element(index).to_owned(),
        };
        self.pending = Some(tag);
        Ok(())
    }

    /// Selects element `index` and encodes `value` under it.
    pub fn encode_element<T: Encode + ?Sized>(
        &mut self,
        descriptor: &Descriptor,
        index: usize,
        value: &T,
    ) -> Result<()> {
        self.element(descriptor, index)?;
        value.encode(self)
    }

    pub fn encode_null(&mut self) -> Result<()> {
        self.put(Value::Null)
    }

    pub fn encode_bool(&mut self, value: bool) -> Result<()> {
        self.put(Value::Boolean(value))
    }

    pub fn encode_i32(&mut self, value: i32) -> Result<()> {
        self.put(Value::Int32(value))
    }

    pub fn encode_i64(&mut self, value: i64) -> Result<()> {
        self.put(Value::Int64(value))
    }

    pub fn encode_f64(&mut self, value: f64) -> Result<()> {
        self.put(Value::Double(value))
    }

    pub fn encode_string(&mut self, value: &str) -> Result<()> {
        self.put(Value::String(value.to_owned()))
    }

    /// Writes the variant name of an enum as a string.
    pub fn encode_enum(&mut self, descriptor: &Descriptor, ordinal: usize) -> Result<()> {
        self.put(Value::String(descriptor.element(ordinal).to_owned()))
    }

    pub fn encode_binary(&mut self, value: &crate::value::Binary) -> Result<()> {
        self.put(Value::Binary(value.clone()))
    }

    pub fn encode_object_id(&mut self, value: crate::value::ObjectId) -> Result<()> {
        self.put(Value::ObjectId(value))
    }

    /// Epoch milliseconds.
    pub fn encode_date_time(&mut self, value: i64) -> Result<()> {
        self.put(Value::DateTime(value))
    }

    pub fn encode_javascript(&mut self, code: &str) -> Result<()> {
        self.put(Value::JavaScript(code.to_owned()))
    }

    pub fn encode_decimal128(&mut self, value: crate::value::Decimal128) -> Result<()> {
        self.put(Value::Decimal128(value))
    }

    pub fn encode_regex(&mut self, value: &crate::value::Regex) -> Result<()> {
        self.put(Value::RegularExpression(value.clone()))
    }

    pub fn encode_db_pointer(&mut self, value: &crate::value::DbPointer) -> Result<()> {
        self.put(Value::DbPointer(value.clone()))
    }

    pub fn encode_js_with_scope(
        &mut self,
        value: &crate::value::JavaScriptWithScope,
    ) -> Result<()> {
        self.put(Value::JavaScriptWithScope(value.clone()))
    }

    pub fn encode_max_key(&mut self) -> Result<()> {
        self.put(Value::MaxKey)
    }

    pub fn encode_min_key(&mut self) -> Result<()> {
        self.put(Value::MinKey)
    }

    pub fn encode_symbol(&mut self, value: &str) -> Result<()> {
        self.put(Value::Symbol(value.to_owned()))
    }

    pub fn encode_timestamp(&mut self, value: crate::value::Timestamp) -> Result<()> {
        self.put(Value::Timestamp(value))
    }

    pub fn encode_undefined(&mut self) -> Result<()> {
        self.put(Value::Undefined)
    }

    /// Records an already built value at the current position.
    pub fn encode_value(&mut self, value: &Value) -> Result<()> {
        self.put(value.clone())
    }

    /// Encodes the resolved concrete variant of a polymorphic value,
    /// scheduling the class discriminator for injection.
    ///
    /// The wire name comes from the registry when the concrete type was
    /// registered, and from the variant's own serial name otherwise (the
    /// closed-union default).
    pub fn encode_open<V: Encode + 'static>(&mut self, value: &V) -> Result<()> {
        let descriptor = V::descriptor();
        if *descriptor.kind() == Kind::Open {
            return Err(Error::encoding(
                "actual codec for a polymorphic value cannot be polymorphic itself",
            ));
        }
        let config = self.bson.configuration();
        if descriptor.contains_element(&config.class_discriminator) {
            return Err(Error::encoding(format!(
                "class discriminator '{}' conflict at '{}'",
                config.class_discriminator,
                descriptor.serial_name()
            )));
        }
        let wire = self
            .bson
            .registry()
            .wire_name::<V>()
            .unwrap_or(descriptor.serial_name())
            .to_owned();
        self.discriminator = Some(wire);
        value.encode(self)
    }

    fn put(&mut self, value: Value) -> Result<()> {
        if self.discriminator.is_some() {
            return Err(Error::encoding(
                "polymorphic value must encode as a document",
            ));
        }
        let allow_duplicate_key = self.bson.configuration().allow_duplicate_key;
        match self.stack.last_mut() {
            None => {
                if self.pending.take().is_some() {
                    return Err(Error::encoding("tagged value with no open structure"));
                }
                if self.root.is_some() {
                    return Err(Error::encoding(
                        "value was already recorded; does the codec record more than once?",
                    ));
                }
                self.root = Some(value);
            }
            Some(Level::Document { content, .. }) => {
                let tag = self
                    .pending
                    .take()
                    .ok_or_else(|| Error::encoding("value recorded without an element tag"))?;
                if !allow_duplicate_key && content.contains_key(&tag) {
                    return Err(Error::encoding(format!("duplicate key '{}'", tag)));
                }
                content.insert(tag, value);
            }
            Some(Level::List { content, .. }) => {
                let tag = self
                    .pending
                    .take()
                    .ok_or_else(|| Error::encoding("value recorded without an element tag"))?;
                let index: usize = tag.parse().map_err(|_| {
                    Error::encoding(format!("array key '{}' is not an integer", tag))
                })?;
                content.insert(index, value)?;
            }
            Some(Level::Map { content, key, .. }) => {
                self.pending.take();
                match key.take() {
                    // Key position: the value itself becomes the key.
                    None => *key = Some(stringify_key(&value)?),
                    Some(k) => {
                        if !allow_duplicate_key && content.contains_key(&k) {
                            return Err(Error::encoding(format!("duplicate key '{}'", k)));
                        }
                        content.insert(k, value);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Canonical string form of a value used as a map key.
fn stringify_key(value: &Value) -> Result<String> {
    Ok(match value {
        Value::String(s) => s.clone(),
        Value::Int32(v) => itoa::Buffer::new().format(*v).to_owned(),
        Value::Int64(v) | Value::DateTime(v) => itoa::Buffer::new().format(*v).to_owned(),
        Value::Double(v) => ryu::Buffer::new().format(*v).to_owned(),
        Value::ObjectId(id) => id.to_hex(),
        Value::Boolean(v) => if *v { "true" } else { "false" }.to_owned(),
        Value::Null => "null".to_owned(),
        Value::RegularExpression(r) => r.pattern().to_owned(),
        Value::JavaScript(code) => code.clone(),
        Value::Decimal128(d) => d.to_string(),
        other => {
            return Err(Error::encoding(format!(
                "bson type '{:?}' cannot be used as a document key",
                other.bson_type()
            )))
        }
    })
}
