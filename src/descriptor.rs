//! Structural description of an encodable or decodable type.
//!
//! A [`Descriptor`] is the fixed protocol between a type and the tree
//! encoder/decoder: it names the type on the wire, states its structural
//! kind, and lists its declared element names. The codec never inspects a
//! Rust type directly; everything it knows about a shape comes from here.

use crate::value::BsonType;

/// Structural kind of a described type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Kind {
    /// A scalar with an exact wire kind.
    Primitive(BsonType),
    /// A closed set of named unit variants, encoded as a string.
    Enum,
    /// A record of named fields, encoded as a document.
    Struct,
    /// A homogeneous sequence, encoded as an array.
    List,
    /// An open string-keyed mapping, encoded as a document.
    Map,
    /// A polymorphic sum type, encoded as a document carrying a class
    /// discriminator field.
    Open,
}

/// Shape of one type: wire name, structural kind, declared element names.
///
/// `serial_name` is the stable name used on the wire (notably as the
/// discriminator value of polymorphic variants); it is independent of the
/// Rust type name. `elements` holds field names for [`Kind::Struct`] and
/// variant names for [`Kind::Enum`], in declaration order.
#[derive(Clone, Debug)]
pub struct Descriptor {
    serial_name: &'static str,
    kind: Kind,
    elements: &'static [&'static str],
    nullable: bool,
}

impl Descriptor {
    pub fn primitive(serial_name: &'static str, ty: BsonType) -> Self {
        Descriptor {
            serial_name,
            kind: Kind::Primitive(ty),
            elements: &[],
            nullable: false,
        }
    }

    pub fn structure(serial_name: &'static str, fields: &'static [&'static str]) -> Self {
        Descriptor {
            serial_name,
            kind: Kind::Struct,
            elements: fields,
            nullable: false,
        }
    }

    pub fn enumeration(serial_name: &'static str, variants: &'static [&'static str]) -> Self {
        Descriptor {
            serial_name,
            kind: Kind::Enum,
            elements: variants,
            nullable: false,
        }
    }

    pub fn list(serial_name: &'static str) -> Self {
        Descriptor {
            serial_name,
            kind: Kind::List,
            elements: &[],
            nullable: false,
        }
    }

    pub fn map(serial_name: &'static str) -> Self {
        Descriptor {
            serial_name,
            kind: Kind::Map,
            elements: &[],
            nullable: false,
        }
    }

    pub fn open(serial_name: &'static str) -> Self {
        Descriptor {
            serial_name,
            kind: Kind::Open,
            elements: &[],
            nullable: false,
        }
    }

    /// Marks the described value as nullable (the Option wrapper).
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn serial_name(&self) -> &'static str {
        self.serial_name
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn elements(&self) -> &'static [&'static str] {
        self.elements
    }

    /// Declared name of element `index`.
    ///
    /// Panics when the index is out of range, which is a bug in the
    /// calling codec rather than an input error.
    pub fn element(&self, index: usize) -> &'static str {
        self.elements[index]
    }

    pub fn element_index(&self, name: &str) -> Option<usize> {
        self.elements.iter().position(|e| *e == name)
    }

    pub fn contains_element(&self, name: &str) -> bool {
        self.elements.contains(&name)
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
}
