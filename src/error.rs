use thiserror::Error;

/// Error raised by any encode or decode operation.
///
/// Every failure is one of two categories: the value (or configuration)
/// could not be turned into BSON, or some BSON could not be turned back
/// into a value. Byte-level failures surface through the same two
/// categories.
#[derive(Error, Debug)]
pub enum Error {
    /// A problem in the serialization process.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A problem in the deserialization process.
    #[error("decoding error: {0}")]
    Decoding(String),
}

/// Result type returned by every fallible operation of this crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn encoding(message: impl Into<String>) -> Self {
        Error::Encoding(message.into())
    }

    pub fn decoding(message: impl Into<String>) -> Self {
        Error::Decoding(message.into())
    }
}
