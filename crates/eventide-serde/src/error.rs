use thiserror::Error;

/// The closed error taxonomy shared by every `Serializer`/`Deserializer`
/// back-end in this framework.
///
/// There is deliberately no "none"/success variant — absence of an error is
/// `Result::Ok`, not a variant of this enum. All variants are unit variants
/// so the type stays `Copy`, which matters on the sticky-error path where a
/// serializer session stores one of these in a `Cell` and returns it from
/// every subsequent call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SerdeError {
    /// Catch-all for a failure that does not fit any other variant.
    #[error("unknown serialization error")]
    Unknown,
    /// The call is not legal in the session's current state (e.g. a second
    /// root value, a value without a preceding key, or any call after the
    /// session has already failed).
    #[error("operation is invalid in the current session state")]
    InvalidState,
    /// The byte buffer is not a well-formed encoding for this format.
    #[error("buffer is not a valid encoding for this format")]
    InvalidBuffer,
    /// The value at the cursor does not have the tag the caller asked for.
    #[error("value's tag does not match the requested type")]
    InvalidType,
    /// The value would not fit the requested numeric width.
    #[error("numeric value does not fit the requested type")]
    NumberOutOfRange,
    /// A string was requested as a single `char` but is not exactly one.
    #[error("value is not a single valid character")]
    InvalidChar,
    /// A map or struct frame expected a key and got a value, or vice versa.
    #[error("expected a key but found a value, or a value but found a key")]
    InvalidKey,
    /// The deserializer session ended without the root value being fully
    /// consumed.
    #[error("deserializer session ended without consuming the root value")]
    RootNotConsumed,
    /// A map or struct contains two entries under the same key.
    #[error("map or struct has two entries with the same key")]
    DuplicateKeys,
}

impl SerdeError {
    /// Stable machine-readable tag, used in log fields and test assertions.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::InvalidState => "invalid_state",
            Self::InvalidBuffer => "invalid_buffer",
            Self::InvalidType => "invalid_type",
            Self::NumberOutOfRange => "number_out_of_range",
            Self::InvalidChar => "invalid_char",
            Self::InvalidKey => "invalid_key",
            Self::RootNotConsumed => "root_not_consumed",
            Self::DuplicateKeys => "duplicate_keys",
        }
    }
}
