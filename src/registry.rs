//! Polymorphic variant registry.
//!
//! Maps (base serial name, discriminator wire name) to a variant decoder,
//! and concrete Rust types to the wire name they encode under. Built once
//! through [`RegistryBuilder`] and immutable afterwards, so a [`Bson`]
//! instance can be shared freely across threads.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::de::Decode;
use crate::error::{Error, Result};
use crate::ser::Encode;
use crate::value::Value;
use crate::Bson;

type VariantDecodeFn = Arc<dyn Fn(&Bson, &Value) -> Result<Box<dyn Any>> + Send + Sync>;

pub(crate) struct VariantCodec {
    pub(crate) decode: VariantDecodeFn,
}

/// Immutable lookup table for polymorphic dispatch.
#[derive(Default)]
pub struct Registry {
    // base serial name -> wire name -> variant codec
    variants: HashMap<String, HashMap<String, VariantCodec>>,
    wire_names: HashMap<TypeId, String>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("bases", &self.variants.keys().collect::<Vec<_>>())
            .field("wire_names", &self.wire_names)
            .finish()
    }
}

impl std::fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("registry", &self.registry)
            .finish()
    }
}

impl Registry {
    pub fn empty() -> Self {
        Registry::default()
    }

    pub(crate) fn wire_name<V: 'static>(&self) -> Option<&str> {
        self.wire_names.get(&TypeId::of::<V>()).map(String::as_str)
    }

    pub(crate) fn variant(&self, base: &str, wire: &str) -> Option<&VariantCodec> {
        self.variants.get(base)?.get(wire)
    }
}

/// Builder for a [`Registry`].
///
/// Conflicting registrations are rejected on the spot: the same
/// (base, wire name) pair twice, or one concrete type under two different
/// wire names.
#[derive(Default)]
pub struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        RegistryBuilder::default()
    }

    /// Registers `V` as a variant of the polymorphic base `B` under the
    /// variant's own serial name; `into` injects a decoded variant into
    /// the base type.
    pub fn variant<B, V>(self, into: fn(V) -> B) -> Result<Self>
    where
        B: Decode + 'static,
        V: Encode + Decode + 'static,
    {
        let wire = <V as Decode>::descriptor().serial_name();
        self.variant_named(wire, into)
    }

    /// Like [`RegistryBuilder::variant`], but under a caller-chosen wire
    /// name overriding the variant's serial name.
    pub fn variant_named<B, V>(mut self, wire: &str, into: fn(V) -> B) -> Result<Self>
    where
        B: Decode + 'static,
        V: Encode + Decode + 'static,
    {
        let base = B::descriptor().serial_name();
        if let Some(existing) = self.registry.wire_names.get(&TypeId::of::<V>()) {
            if existing != wire {
                return Err(Error::encoding(format!(
                    "type is already registered under discriminator '{}', cannot also register it as '{}'",
                    existing, wire
                )));
            }
        }
        let of_base = self.registry.variants.entry(base.to_owned()).or_default();
        if of_base.contains_key(wire) {
            return Err(Error::encoding(format!(
                "conflicting registration for discriminator '{}' of '{}'",
                wire, base
            )));
        }
        let decode: VariantDecodeFn = Arc::new(move |bson, value| {
            let variant: V = bson.from_value(value)?;
            Ok(Box::new(into(variant)) as Box<dyn Any>)
        });
        of_base.insert(wire.to_owned(), VariantCodec { decode });
        self.registry
            .wire_names
            .insert(TypeId::of::<V>(), wire.to_owned());
        Ok(self)
    }

    pub fn build(self) -> Registry {
        self.registry
    }
}
