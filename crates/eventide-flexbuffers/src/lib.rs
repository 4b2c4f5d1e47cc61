//! eventide-flexbuffers
//!
//! A concrete [`eventide_serde::Serializer`]/[`eventide_serde::Deserializer`]
//! pair over Google's FlexBuffers binary format: self-describing tagged
//! values, a trailing root pointer, and maps stored as parallel sorted
//! key/value arrays. Byte-level encode/decode is delegated entirely to the
//! [`flexbuffers`] crate's builder and reader; this crate supplies the
//! contract on top — single-root enforcement, open-container tracking, and
//! duplicate-key detection, with a sticky first error per write session.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod de;
mod ser;
mod session;

pub use de::{from_slice, FlexDeserializer, FlexMapCursor, FlexSeqCursor};
pub use ser::{FlexMap, FlexSeq, FlexSerializer};
pub use session::Session;

use eventide_serde::{SerdeError, Serialize};

/// Serialize `value` into a complete FlexBuffers document.
///
/// # Errors
/// Returns whatever [`SerdeError`] `value`'s [`Serialize`] impl produced, or
/// [`SerdeError::InvalidState`] if `value` wrote no root value at all (an
/// empty [`Serialize`] impl).
pub fn to_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, SerdeError> {
    let session = Session::new();
    value.serialize(FlexSerializer::root(&session))?;
    session.finalize()
}

impl Session {
    /// A [`FlexSerializer`] handle for this session's one root slot.
    ///
    /// Kept separate from [`to_bytes`] for callers (mainly tests) that want
    /// to drive the low-level frame methods directly, e.g. to observe
    /// [`SerdeError::InvalidState`] from [`Session::finalize`] on a
    /// deliberately unclosed container.
    #[must_use]
    pub fn serializer(&self) -> FlexSerializer<'_> {
        FlexSerializer::root(self)
    }
}
