//! Record — a row of application data, as seen by the engine.
//!
//! Records belong to the external record store. The engine only reads
//! typed fields from them and sends patches back through the data port.

mod value;

pub use value::FieldValue;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::id::RecordId;

/// Field key → value map used for records and update patches.
pub type Fields = BTreeMap<String, FieldValue>;

/// Field holding a record's identity.
pub const ID_FIELD: &str = "id";

/// Fields stripped when a record is duplicated.
pub const IDENTITY_FIELDS: [&str; 3] = [ID_FIELD, "created_at", "updated_at"];

/// A typed record: an ordered mapping from field key to [`FieldValue`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Fields,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing field map.
    #[must_use]
    pub fn from_fields(fields: Fields) -> Self {
        Self { fields }
    }

    /// Resolve a record from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not a JSON object.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Look up a field. Absent fields yield `None`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Set a single field, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// The record's identity, when it has a non-empty `id` field.
    #[must_use]
    pub fn id(&self) -> Option<RecordId> {
        self.get(ID_FIELD)
            .filter(|value| !value.is_empty())
            .map(|value| RecordId::new(value.as_text()))
    }

    /// Apply a patch: every key in `updates` overwrites the current value.
    pub fn merge(&mut self, updates: &Fields) {
        for (key, value) in updates {
            self.fields.insert(key.clone(), value.clone());
        }
    }

    /// A copy of the fields without identity and timestamp fields.
    #[must_use]
    pub fn without_identity(&self) -> Fields {
        self.fields
            .iter()
            .filter(|(key, _)| !IDENTITY_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Borrow every field.
    #[must_use]
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Consume the record, returning its fields.
    #[must_use]
    pub fn into_fields(self) -> Fields {
        self.fields
    }

    /// Convert to a plain JSON object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_read_identity_from_id_field() {
        let record = Record::from_iter([("id", "t1"), ("status", "open")]);
        assert_eq!(record.id(), Some(RecordId::new("t1")));
    }

    #[test]
    fn should_read_numeric_identity_as_text() {
        let record = Record::from_json(json!({"id": 7})).unwrap();
        assert_eq!(record.id(), Some(RecordId::new("7")));
    }

    #[test]
    fn should_have_no_identity_when_id_is_missing_or_empty() {
        assert!(Record::new().id().is_none());
        assert!(Record::from_iter([("id", "")]).id().is_none());
    }

    #[test]
    fn should_overwrite_fields_when_merging_patch() {
        let mut record = Record::from_iter([("id", "t1"), ("status", "open")]);
        let patch: Fields = [("status".to_string(), FieldValue::from("done"))]
            .into_iter()
            .collect();
        record.merge(&patch);
        assert_eq!(record.get("status"), Some(&FieldValue::from("done")));
        assert_eq!(record.id(), Some(RecordId::new("t1")));
    }

    #[test]
    fn should_strip_identity_and_timestamps() {
        let record = Record::from_json(json!({
            "id": "t1",
            "title": "Write docs",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z"
        }))
        .unwrap();
        let copy = record.without_identity();
        assert_eq!(copy.len(), 1);
        assert!(copy.contains_key("title"));
    }

    #[test]
    fn should_reject_non_object_json() {
        assert!(Record::from_json(json!([1, 2])).is_err());
    }

    #[test]
    fn should_convert_to_plain_json_object() {
        let record = Record::from_iter([("score", FieldValue::from(95.0))]);
        assert_eq!(record.to_json(), json!({"score": 95}));
    }

    #[test]
    fn should_round_trip_json_unchanged_when_fields_are_dates_and_big_integers() {
        let original = json!({
            "id": "t1",
            "note": "2024-03-01T12:00:00+02:00",
            "big": 12_345_678_901_234_567_u64
        });
        let record = Record::from_json(original.clone()).unwrap();
        assert_eq!(record.to_json(), original);
        assert_eq!(serde_json::to_value(&record).unwrap(), original);
    }
}
