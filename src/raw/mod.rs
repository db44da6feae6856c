//! Conversion between the value tree and the BSON wire format.
//!
//! The writer emits each document as a placeholder length, the elements as
//! (type tag, C-string key, payload) triples, the end marker, and then
//! backpatches the length. The reader is the inverse and validates
//! everything it touches: lengths, terminators, boolean bytes, UTF-8,
//! element type tags. Unknown or inconsistent input always fails, it is
//! never skipped.

mod reader;
mod writer;

pub(crate) use self::reader::{read_array, read_document, read_primitive};
pub(crate) use self::writer::{write_array, write_document, write_value};

/// Nesting limit applied by both the reader and the writer, so adversarial
/// input cannot exhaust the call stack.
pub(crate) const MAX_DEPTH: usize = 100;
