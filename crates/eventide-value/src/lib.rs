//! eventide-value
//!
//! Closed value-kind taxonomy and field-annotation metadata shared by
//! [`eventide-serde`](https://docs.rs/eventide-serde)'s `Serializer`/`Deserializer`
//! contracts and their concrete back-ends.
//!
//! This crate carries no serialization logic of its own — it is the
//! vocabulary component B/C backends and generated (well, hand-written;
//! there is no derive macro in scope) `Serialize`/`Deserialize` impls build
//! on top of.

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// The closed set of value shapes the framework understands.
///
/// Every value any back-end handles belongs to exactly one of these. `Seq`,
/// `Map` may or may not have a known length up front (`len: Option<usize>`
/// lives on the call that announces them, not here); `Tuple` and `Struct`
/// always have a declared length since it comes from the type, not the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// The absent/none marker (the target of `Option::None`).
    None,
    /// A boolean leaf.
    Bool,
    /// A signed integer leaf, widened internally to `i64`.
    Int,
    /// An unsigned integer leaf, widened internally to `u64`.
    Uint,
    /// A double-precision float leaf.
    Float,
    /// A single character leaf.
    Char,
    /// A UTF-8 string leaf.
    Str,
    /// An opaque byte-span leaf.
    Bytes,
    /// A homogeneous sequence, length possibly unknown up front.
    Seq,
    /// A fixed-length heterogeneous sequence.
    Tuple,
    /// A key/value container, length possibly unknown up front.
    Map,
    /// A named record with a declared field count.
    Struct,
    /// A tagged union: a discriminant plus one inner value.
    Variant,
}

impl ValueKind {
    /// Stable lowercase name, used in error messages and test output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
            Self::Char => "char",
            Self::Str => "str",
            Self::Bytes => "bytes",
            Self::Seq => "seq",
            Self::Tuple => "tuple",
            Self::Map => "map",
            Self::Struct => "struct",
            Self::Variant => "variant",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata attached to a single record field, orthogonal to its
/// [`ValueKind`].
///
/// A field with no annotation is written and read under its declared name
/// unconditionally; that's simply the absence of any variant here rather
/// than a variant of its own (callers use `Option<FieldAnnotation>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldAnnotation {
    /// Field appears on the wire under `to` instead of its declared name.
    ///
    /// On read, `to` and (if given) `from` are both accepted; `to` wins if
    /// both are present in the same object.
    Rename {
        /// Wire name to write and prefer on read.
        to: &'static str,
        /// Additional wire name accepted on read, for migrations.
        from: Option<&'static str>,
    },
    /// Field is never transmitted. Readers default-construct it.
    Skip,
    /// Field is written only when its value is present (not the none-state);
    /// absent on read defaults it to the none-state.
    SkipIfEmpty,
}

/// Decide what name (if any) a field should be written under.
///
/// Returns `None` when the field must not be written at all, either
/// because it is [`FieldAnnotation::Skip`] or because it is
/// [`FieldAnnotation::SkipIfEmpty`] and `is_present` is `false`.
#[must_use]
pub fn write_name<'a>(
    declared: &'a str,
    annotation: Option<&'a FieldAnnotation>,
    is_present: bool,
) -> Option<&'a str> {
    match annotation {
        None => Some(declared),
        Some(FieldAnnotation::Rename { to, .. }) => Some(to),
        Some(FieldAnnotation::Skip) => None,
        Some(FieldAnnotation::SkipIfEmpty) => is_present.then_some(declared),
    }
}

/// Decide which wire names a reader should accept for a field, in priority
/// order (first match wins).
///
/// For [`FieldAnnotation::Skip`] this returns an empty slice: the field must
/// never be read off the wire, and the caller default-constructs it.
#[must_use]
pub fn read_names<'a>(declared: &'a str, annotation: Option<&'a FieldAnnotation>) -> Vec<&'a str> {
    match annotation {
        None => vec![declared],
        Some(FieldAnnotation::Rename { to, from }) => {
            let mut names = vec![*to];
            if let Some(from) = from {
                names.push(from);
            }
            names
        }
        Some(FieldAnnotation::Skip) => Vec::new(),
        Some(FieldAnnotation::SkipIfEmpty) => vec![declared],
    }
}
