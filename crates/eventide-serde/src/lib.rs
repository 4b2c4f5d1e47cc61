//! eventide-serde
//!
//! Format-agnostic visitor contracts: [`Serializer`]/[`Serialize`] on the
//! write side, [`Deserializer`]/[`Deserialize`] on the read side. A
//! concrete back-end (`eventide-flexbuffers`, `eventide-json`) implements
//! the two traits; a Rust type implements [`Serialize`]/[`Deserialize`] by
//! calling the trait's methods in the shape its fields need — there is no
//! derive macro in scope, so that impl is hand-written, the same way the
//! original serde-style customization point works before a derive macro
//! sugars over it.
//!
//! Field-level annotations (rename/skip/skip-if-empty) are not enforced by
//! this crate; they live as data in [`eventide_value::FieldAnnotation`] and
//! the impl consults [`eventide_value::write_name`]/[`eventide_value::read_names`]
//! at the point it would otherwise call `serialize_field`/check a key name.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bytes;
mod de;
mod error;
mod in_memory;
mod ser;
mod value;

pub use bytes::{ByteBuf, Bytes};
pub use de::{
    Deserialize, Deserializer, Introspect, MapAccess, SeqAccess, StructAccess, TupleAccess,
};
pub use error::SerdeError;
pub use in_memory::{ValueDeserializer, ValueMapCursor, ValueSeqCursor, ValueSerializer};
pub use ser::{
    Serialize, SerializeMap, SerializeSeq, SerializeStruct, SerializeTuple, Serializer,
};
pub use value::Value;
