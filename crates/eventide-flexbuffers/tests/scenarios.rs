//! End-to-end scenarios against the FlexBuffers back-end.

use eventide_flexbuffers::{from_slice, to_bytes, Session};
use eventide_serde::{
    Deserialize, Deserializer, SerdeError, Serialize, SerializeMap, SerializeStruct, Serializer,
    StructAccess,
};
use eventide_value::FieldAnnotation;

#[test]
fn vector_round_trip() {
    let original = vec![1i64, 2, 3, 5, 8];
    let bytes = to_bytes(&original).unwrap();
    let decoded: Vec<i64> = from_slice(&bytes).unwrap();
    assert_eq!(decoded, original);
}

#[test]
fn map_round_trip() {
    let mut original = std::collections::BTreeMap::new();
    original.insert("a".to_string(), vec![1i64, 2]);
    original.insert("b".to_string(), vec![3i64]);
    let bytes = to_bytes(&original).unwrap();
    let decoded: std::collections::BTreeMap<String, Vec<i64>> = from_slice(&bytes).unwrap();
    assert_eq!(decoded, original);
}

struct PersonWithExtra {
    id: i64,
    name: String,
    scores: Vec<i64>,
    extra: i64,
}

impl Serialize for PersonWithExtra {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, SerdeError> {
        let mut s = serializer.serialize_struct("PersonWithExtra", 4)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("scores", &self.scores)?;
        s.serialize_field("extra", &self.extra)?;
        s.end()
    }
}

#[derive(Debug, PartialEq)]
struct Person {
    id: i64,
    name: String,
    scores: Vec<i64>,
}

impl<D: Deserializer> Deserialize<D> for Person {
    fn deserialize(deserializer: &D) -> Result<Self, SerdeError> {
        let mut fields = deserializer.deserialize_struct("Person", 3)?;
        let mut id = None;
        let mut name = None;
        let mut scores = None;
        while let Some(key) = fields.next_key()? {
            match key.as_str() {
                "id" => id = Some(fields.deserialize_value()?),
                "name" => name = Some(fields.deserialize_value()?),
                "scores" => scores = Some(fields.deserialize_value()?),
                _ => fields.skip_value()?,
            }
        }
        Ok(Person {
            id: id.ok_or(SerdeError::InvalidState)?,
            name: name.ok_or(SerdeError::InvalidState)?,
            scores: scores.ok_or(SerdeError::InvalidState)?,
        })
    }
}

#[test]
fn forward_compatible_struct_drops_unknown_field() {
    let written = PersonWithExtra {
        id: 7,
        name: "alice".to_string(),
        scores: vec![10, 20, 30],
        extra: 99,
    };
    let bytes = to_bytes(&written).unwrap();
    let read: Person = from_slice(&bytes).unwrap();
    assert_eq!(
        read,
        Person {
            id: 7,
            name: "alice".to_string(),
            scores: vec![10, 20, 30],
        }
    );
}

struct AnnotatedSource {
    id: i64,
    name: String,
    internal_id: i64,
    note: Option<String>,
}

impl Serialize for AnnotatedSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, SerdeError> {
        let rename = FieldAnnotation::Rename {
            to: "displayName",
            from: None,
        };
        let mut s = serializer.serialize_struct("AnnotatedSource", 4)?;
        s.serialize_field("id", &self.id)?;
        if let Some(wire_name) = eventide_value::write_name("name", Some(&rename), true) {
            debug_assert_eq!(wire_name, "displayName");
            s.serialize_field("displayName", &self.name)?;
        }
        // internal_id is annotated Skip: write_name returns None, so it never hits the wire.
        debug_assert!(
            eventide_value::write_name("internal_id", Some(&FieldAnnotation::Skip), true).is_none()
        );
        if let Some(note) = &self.note {
            if eventide_value::write_name("note", Some(&FieldAnnotation::SkipIfEmpty), true).is_some()
            {
                s.serialize_field("note", note)?;
            }
        }
        s.end()
    }
}

#[derive(Debug, PartialEq)]
struct PublicRecord {
    id: i64,
    display_name: String,
}

impl<D: Deserializer> Deserialize<D> for PublicRecord {
    fn deserialize(deserializer: &D) -> Result<Self, SerdeError> {
        let mut fields = deserializer.deserialize_struct("PublicRecord", 2)?;
        let mut id = None;
        let mut display_name = None;
        while let Some(key) = fields.next_key()? {
            match key.as_str() {
                "id" => id = Some(fields.deserialize_value()?),
                "displayName" => display_name = Some(fields.deserialize_value()?),
                _ => fields.skip_value()?,
            }
        }
        Ok(PublicRecord {
            id: id.ok_or(SerdeError::InvalidState)?,
            display_name: display_name.ok_or(SerdeError::InvalidState)?,
        })
    }
}

#[test]
fn annotated_fields_rename_skip_and_skip_if_empty() {
    let source = AnnotatedSource {
        id: 1,
        name: "alice".to_string(),
        internal_id: 42,
        note: None,
    };
    let bytes = to_bytes(&source).unwrap();
    let read: PublicRecord = from_slice(&bytes).unwrap();
    assert_eq!(
        read,
        PublicRecord {
            id: 1,
            display_name: "alice".to_string(),
        }
    );
}

#[test]
fn unclosed_container_fails_finalize() {
    let session = Session::new();
    let mut s = session.serializer().serialize_struct("Partial", 1).unwrap();
    s.serialize_field("a", &1i64).unwrap();
    // `s` is dropped here without calling `end()`.
    assert_eq!(session.finalize(), Err(SerdeError::InvalidState));
}

#[test]
fn duplicate_keys_fail_at_end() {
    struct Dup;
    impl Serialize for Dup {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, SerdeError> {
            let mut s = serializer.serialize_struct("Dup", 2)?;
            s.serialize_field("id", &1i64)?;
            s.serialize_field("id", &2i64)?;
            s.end()
        }
    }
    let err = to_bytes(&Dup).unwrap_err();
    assert_eq!(err, SerdeError::DuplicateKeys);
}

#[test]
fn duplicate_map_keys_fail() {
    struct DupMap;
    impl Serialize for DupMap {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, SerdeError> {
            let mut m = serializer.serialize_map(Some(2))?;
            m.serialize_entry("a", &1i64)?;
            m.serialize_entry("a", &2i64)?;
            m.end()
        }
    }
    let err = to_bytes(&DupMap).unwrap_err();
    assert_eq!(err, SerdeError::DuplicateKeys);
}

#[test]
fn nan_and_infinity_decode_as_none() {
    for v in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let bytes = to_bytes(&v).unwrap();
        let decoded: Option<f64> = from_slice(&bytes).unwrap();
        assert_eq!(decoded, None);
    }
}

#[test]
fn second_root_value_is_rejected() {
    let session = Session::new();
    1i64.serialize(session.serializer()).unwrap();
    let err = 2i64.serialize(session.serializer()).unwrap_err();
    assert_eq!(err, SerdeError::InvalidState);
}
