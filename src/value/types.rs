use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::value::Document;

/// Binary payload plus its one-byte subtype.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binary {
    pub subtype: u8,
    pub bytes: Vec<u8>,
}

impl Binary {
    pub const GENERIC: u8 = 0x00;
    pub const FUNCTION: u8 = 0x01;
    /// Legacy subtype with a redundant extra length on the wire.
    pub const OLD_BINARY: u8 = 0x02;
    pub const UUID_LEGACY: u8 = 0x03;
    pub const UUID: u8 = 0x04;
    pub const MD5: u8 = 0x05;

    pub fn new(subtype: u8, bytes: impl Into<Vec<u8>>) -> Self {
        Binary {
            subtype,
            bytes: bytes.into(),
        }
    }

    pub fn generic(bytes: impl Into<Vec<u8>>) -> Self {
        Binary::new(Binary::GENERIC, bytes)
    }
}

/// 12-byte BSON object identifier.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        ObjectId(bytes)
    }

    pub fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// 24 character hexadecimal rendering.
    pub fn to_hex(&self) -> String {
        bintext::hex::encode(&self.0)
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = bintext::hex::decode(s)
            .map_err(|_| Error::decoding(format!("invalid object id hex string '{}'", s)))?;
        let bytes: [u8; 12] = bytes
            .try_into()
            .map_err(|_| Error::decoding("object id must be exactly 12 bytes"))?;
        Ok(ObjectId(bytes))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

/// Regular expression flag set.
///
/// Only a subset has a wire representation; the rest exists so runtime-only
/// flags can be carried around and silently dropped when encoding.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RegexFlags(u8);

impl RegexFlags {
    pub const NONE: RegexFlags = RegexFlags(0);
    pub const IGNORE_CASE: RegexFlags = RegexFlags(1 << 0); // i
    pub const MULTILINE: RegexFlags = RegexFlags(1 << 1); // m
    pub const DOT_ALL: RegexFlags = RegexFlags(1 << 2); // s
    pub const UNICODE: RegexFlags = RegexFlags(1 << 3); // u
    pub const COMMENTS: RegexFlags = RegexFlags(1 << 4); // x
    /// Runtime-only, no wire representation.
    pub const GLOBAL: RegexFlags = RegexFlags(1 << 5); // g
    /// Runtime-only, no wire representation.
    pub const LITERAL: RegexFlags = RegexFlags(1 << 6); // t

    // Wire flags in their canonical (alphabetical) order.
    const WIRE: [(RegexFlags, char); 5] = [
        (RegexFlags::IGNORE_CASE, 'i'),
        (RegexFlags::MULTILINE, 'm'),
        (RegexFlags::DOT_ALL, 's'),
        (RegexFlags::UNICODE, 'u'),
        (RegexFlags::COMMENTS, 'x'),
    ];

    pub fn contains(self, other: RegexFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Canonical options string: wire-representable flags only, sorted.
    pub(crate) fn to_options(self) -> String {
        let mut options = String::new();
        for (flag, c) in RegexFlags::WIRE {
            if self.contains(flag) {
                options.push(c);
            }
        }
        options
    }

    pub(crate) fn from_char(c: char) -> Result<RegexFlags> {
        Ok(match c {
            'i' => RegexFlags::IGNORE_CASE,
            'm' => RegexFlags::MULTILINE,
            's' => RegexFlags::DOT_ALL,
            'u' => RegexFlags::UNICODE,
            'x' => RegexFlags::COMMENTS,
            'g' => RegexFlags::GLOBAL,
            't' => RegexFlags::LITERAL,
            _ => return Err(Error::decoding(format!("unrecognized regex flag '{}'", c))),
        })
    }
}

impl BitOr for RegexFlags {
    type Output = RegexFlags;

    fn bitor(self, rhs: RegexFlags) -> RegexFlags {
        RegexFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for RegexFlags {
    fn bitor_assign(&mut self, rhs: RegexFlags) {
        self.0 |= rhs.0
    }
}

/// Regular expression value: pattern text plus its canonical options string.
///
/// The options string is always normalized: wire-representable flags only,
/// alphabetically sorted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Regex {
    pattern: String,
    options: String,
}

impl Regex {
    pub fn new(pattern: impl Into<String>, flags: RegexFlags) -> Self {
        Regex {
            pattern: pattern.into(),
            options: flags.to_options(),
        }
    }

    /// Builds a regex from wire parts, validating and normalizing the
    /// options string. Unknown flag characters are an error; known
    /// runtime-only flags are accepted and dropped.
    pub fn from_parts(pattern: impl Into<String>, options: &str) -> Result<Self> {
        let mut flags = RegexFlags::NONE;
        for c in options.chars() {
            flags |= RegexFlags::from_char(c)?;
        }
        Ok(Regex::new(pattern, flags))
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn options(&self) -> &str {
        &self.options
    }

    pub fn flags(&self) -> RegexFlags {
        let mut flags = RegexFlags::NONE;
        for c in self.options.chars() {
            // The stored string only ever holds known wire flags.
            if let Ok(flag) = RegexFlags::from_char(c) {
                flags |= flag;
            }
        }
        flags
    }
}

/// Deprecated database pointer: namespace plus object id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DbPointer {
    pub namespace: String,
    pub id: ObjectId,
}

/// Internal replication timestamp, packed into a u64 on the wire.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Timestamp {
    pub time: u32,
    pub increment: u32,
}

/// JavaScript code paired with its scope document.
#[derive(Clone, Debug, PartialEq)]
pub struct JavaScriptWithScope {
    pub code: String,
    pub scope: Document,
}

/// Epoch milliseconds wrapper so date-times stay distinct from plain i64
/// in the typed layer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateTime(pub i64);

/// JavaScript code wrapper, distinct from plain strings in the typed layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JavaScript(pub String);

/// Deprecated symbol kind wrapper.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Symbol(pub String);

/// Greater than every other BSON value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MaxKey;

/// Less than every other BSON value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MinKey;

/// Deprecated undefined kind.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Undefined;
