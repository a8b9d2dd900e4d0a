//! Turns loosely typed moodle json into the typed entities
//!
//! Every entity declares its fields through `serde::Deserialize`. Keys that are
//! not declared are dropped, `Option` fields may be absent (or `null`) and
//! everything else is required. Nested entities are built depth first, so a
//! broken `Module` fails the `Section` it belongs to.

use std::fmt;

use serde::de::{
    self, DeserializeOwned, IntoDeserializer, Visitor,
    value::{MapDeserializer, SeqDeserializer},
};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// A typed shape of a moodle response
pub trait Entity: DeserializeOwned {
    /// Name used in error messages
    const NAME: &'static str;
}

#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("{entity}: missing required field `{field}`")]
    MissingRequiredField {
        entity: &'static str,
        field: &'static str,
    },
    #[error("{entity}: {detail}")]
    TypeMismatch { entity: &'static str, detail: String },
    #[error("{entity}: {detail}")]
    Malformed { entity: &'static str, detail: String },
}

/// What to do with a record that does not fit its entity
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Fail the whole batch
    #[default]
    Abort,
    /// Drop the record and keep going
    Skip,
}

/// Records of a batch, together with the ones that had to be dropped
#[derive(Debug)]
pub struct Parsed<T> {
    pub records: Vec<T>,
    pub skipped: Vec<DeserializeError>,
}

/// Builds a single entity from a raw json object
pub fn deserialize<T: Entity>(raw: &Value) -> Result<T, DeserializeError> {
    if !raw.is_object() {
        return Err(DeserializeError::Malformed {
            entity: T::NAME,
            detail: format!("expected an object, found {}", kind(raw)),
        });
    }
    T::deserialize(Raw(raw)).map_err(|e| e.for_entity(T::NAME))
}

/// Builds every entity of a json array, honoring `policy` for broken records
pub fn deserialize_all<T: Entity>(
    raw: &Value,
    policy: MalformedPolicy,
) -> Result<Parsed<T>, DeserializeError> {
    let items = raw.as_array().ok_or_else(|| DeserializeError::Malformed {
        entity: T::NAME,
        detail: format!("expected a list, found {}", kind(raw)),
    })?;

    let mut parsed = Parsed {
        records: Vec::with_capacity(items.len()),
        skipped: Vec::new(),
    };
    for item in items {
        match (deserialize::<T>(item), policy) {
            (Ok(record), _) => parsed.records.push(record),
            (Err(e), MalformedPolicy::Abort) => return Err(e),
            (Err(e), MalformedPolicy::Skip) => {
                warn!("Skipping malformed record: {}", e);
                parsed.skipped.push(e);
            }
        }
    }
    Ok(parsed)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

// Error raised while walking a value, the entity name is attached afterwards
#[derive(Debug, Error)]
enum ShapeError {
    #[error("missing field `{0}`")]
    Missing(&'static str),
    #[error("{0}")]
    Type(String),
    #[error("{0}")]
    Other(String),
}

impl ShapeError {
    fn for_entity(self, entity: &'static str) -> DeserializeError {
        match self {
            ShapeError::Missing(field) => DeserializeError::MissingRequiredField { entity, field },
            ShapeError::Type(detail) => DeserializeError::TypeMismatch { entity, detail },
            ShapeError::Other(detail) => DeserializeError::Malformed { entity, detail },
        }
    }
}

impl de::Error for ShapeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        ShapeError::Other(msg.to_string())
    }

    fn invalid_type(unexp: de::Unexpected<'_>, exp: &dyn de::Expected) -> Self {
        ShapeError::Type(format!("invalid type: {}, expected {}", unexp, exp))
    }

    fn invalid_value(unexp: de::Unexpected<'_>, exp: &dyn de::Expected) -> Self {
        ShapeError::Type(format!("invalid value: {}, expected {}", unexp, exp))
    }

    fn missing_field(field: &'static str) -> Self {
        ShapeError::Missing(field)
    }
}

/// Borrowing deserializer over a parsed json value
struct Raw<'a>(&'a Value);

impl<'de, 'a> IntoDeserializer<'de, ShapeError> for Raw<'a> {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

impl<'de, 'a> de::Deserializer<'de> for Raw<'a> {
    type Error = ShapeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ShapeError> {
        match self.0 {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(*b),
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    visitor.visit_u64(u)
                } else if let Some(i) = n.as_i64() {
                    visitor.visit_i64(i)
                } else {
                    visitor.visit_f64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => visitor.visit_str(s),
            Value::Array(items) => {
                let mut seq = SeqDeserializer::<_, ShapeError>::new(items.iter().map(Raw));
                let value = visitor.visit_seq(&mut seq)?;
                seq.end()?;
                Ok(value)
            }
            Value::Object(entries) => {
                let mut map = MapDeserializer::<_, ShapeError>::new(
                    entries.iter().map(|(key, value)| (key.as_str(), Raw(value))),
                );
                let value = visitor.visit_map(&mut map)?;
                map.end()?;
                Ok(value)
            }
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ShapeError> {
        match self.0 {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::course_contents::{Content, Module, Section};
    use crate::api::recent_courses::RecentCourse;

    fn module_json(id: u64) -> Value {
        json!({
            "id": id,
            "name": "Lecture slides",
            "instance": 11,
            "contextid": 12,
            "visible": 1,
            "uservisible": true,
            "visibleoncoursepage": 1,
            "modicon": "https://x.test/icon.svg",
            "modname": "resource",
            "completion": 0,
            "noviewlink": false,
            "contents": [{
                "type": "file",
                "filename": "slides.pdf",
                "filepath": "/",
                "filesize": 1024,
                "fileurl": "https://x.test/slides.pdf",
                "timemodified": 1700000000,
                "author": "Someone"
            }]
        })
    }

    #[test]
    fn drops_unknown_fields() {
        let content: Content = deserialize(&json!({
            "fileurl": "https://x.test/a.pdf",
            "filename": "a.pdf",
            "filepath": "/",
            "filesize": 3,
            "timemodified": 5,
            "sortorder": 0,
            "license": "allrightsreserved"
        }))
        .unwrap();
        assert_eq!(content.filename, "a.pdf");
        assert_eq!(content.filesize, 3);
        assert_eq!(content.mimetype, None);
        assert_eq!(content.isexternalfile, None);
    }

    #[test]
    fn builds_nested_entities() {
        let section: Section = deserialize(&json!({
            "id": 1,
            "name": "Week 1",
            "visible": 1,
            "summary": "<p>ignored</p>",
            "section": 0,
            "uservisible": true,
            "modules": [module_json(7)]
        }))
        .unwrap();
        assert_eq!(section.modules.len(), 1);
        assert_eq!(section.modules[0].id, 7);
        assert_eq!(section.modules[0].url, None);
        assert_eq!(section.modules[0].contents[0].filename, "slides.pdf");
    }

    #[test]
    fn missing_required_field_fails_closed() {
        let err = deserialize::<Section>(&json!({
            "name": "Week 1",
            "visible": 1,
            "section": 0,
            "uservisible": true,
            "modules": []
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            DeserializeError::MissingRequiredField {
                entity: "Section",
                field: "id"
            }
        ));
    }

    #[test]
    fn wrong_type_is_a_mismatch() {
        let mut module = module_json(1);
        module["id"] = json!("one");
        let err = deserialize::<Module>(&module).unwrap_err();
        assert!(matches!(err, DeserializeError::TypeMismatch { entity: "Module", .. }));
    }

    #[test]
    fn null_optional_fields_are_none() {
        let mut module = module_json(1);
        module["completiondata"] = json!({
            "state": 1,
            "timecompleted": 1700000000,
            "overrideby": null,
            "valueused": false,
            "hascompletion": true,
            "isautomatic": false,
            "istrackeduser": true,
            "uservisible": true
        });
        let module: Module = deserialize(&module).unwrap();
        let completion = module.completiondata.unwrap();
        assert_eq!(completion.overrideby, None);
        assert_eq!(completion.state, 1);
    }

    #[test]
    fn non_object_is_malformed() {
        let err = deserialize::<Content>(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, DeserializeError::Malformed { entity: "Content", .. }));
    }

    #[test]
    fn deserialize_all_aborts_by_default() {
        let raw = json!([
            { "id": 1, "fullname": "CS101", "shortname": "cs", "hidden": false },
            { "fullname": "No id", "shortname": "x", "hidden": false }
        ]);
        assert!(deserialize_all::<RecentCourse>(&raw, MalformedPolicy::Abort).is_err());
    }

    #[test]
    fn deserialize_all_can_skip() {
        let raw = json!([
            { "id": 1, "fullname": "CS101", "shortname": "cs", "hidden": false },
            { "fullname": "No id", "shortname": "x", "hidden": false },
            { "id": 3, "fullname": "CS103", "shortname": "cs3", "hidden": true }
        ]);
        let parsed = deserialize_all::<RecentCourse>(&raw, MalformedPolicy::Skip).unwrap();
        let ids: Vec<u64> = parsed.records.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(parsed.skipped.len(), 1);
    }

    #[test]
    fn deserialize_all_needs_a_list() {
        let err = deserialize_all::<RecentCourse>(&json!({"exception": "x"}), MalformedPolicy::Skip)
            .unwrap_err();
        assert!(err.to_string().contains("expected a list"));
    }
}
