/// Knobs of a [`Bson`](crate::Bson) instance.
///
/// Constructed once, read-only afterwards; every encode and decode call on
/// the owning instance observes the same configuration.
#[derive(Clone, Debug)]
pub struct BsonConfiguration {
    /// Emit fields whose value equals their declared default.
    pub encode_defaults: bool,
    /// Tolerate document keys that no declared field matches while decoding.
    pub ignore_unknown_keys: bool,
    /// Tolerate a key being written twice while building a document.
    pub allow_duplicate_key: bool,
    /// Field name reserved for polymorphic type tags.
    pub class_discriminator: String,
}

impl Default for BsonConfiguration {
    fn default() -> Self {
        BsonConfiguration {
            encode_defaults: false,
            ignore_unknown_keys: false,
            allow_duplicate_key: false,
            class_discriminator: "type".to_owned(),
        }
    }
}
