use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

use crate::{
    error::{FormError, Result},
    schema::FormSchema,
};

/// Immutable snapshot of every field's current string value.
///
/// The key set is fixed when the state is created from a schema. An edit
/// yields a new snapshot that differs from the old one in exactly one key,
/// so a snapshot handed to an in-flight request never changes underneath it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormState {
    entries: Arc<Vec<(String, String)>>,
}

impl FormState {
    /// Every schema field, in schema order, set to the empty string
    pub fn empty(schema: &FormSchema) -> Self {
        Self {
            entries: Arc::new(
                schema
                    .field_names()
                    .map(|name| (name.to_string(), String::new()))
                    .collect(),
            ),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Copy of this snapshot with `name` overwritten
    pub fn with_value(&self, name: &str, value: impl Into<String>) -> Result<Self> {
        let index = self
            .entries
            .iter()
            .position(|(key, _)| key == name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;

        let mut entries = self.entries.as_ref().clone();
        entries[index].1 = value.into();
        Ok(Self {
            entries: Arc::new(entries),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FormState {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in self.entries.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn starts_with_every_field_empty() {
        let state = FormState::empty(&FormSchema::listing());
        assert_eq!(state.len(), 4);
        assert!(state.iter().all(|(_, v)| v.is_empty()));
    }

    #[test]
    fn edit_replaces_only_the_named_key() {
        let before = FormState::empty(&FormSchema::listing());
        let after = before.with_value("sqft", "1200").unwrap();

        assert_eq!(after.get("sqft"), Some("1200"));
        assert_eq!(before.get("sqft"), Some(""));
        for (name, value) in after.iter().filter(|(name, _)| *name != "sqft") {
            assert_eq!(before.get(name), Some(value));
        }
    }

    #[test]
    fn unknown_field_is_rejected_and_keys_stay_fixed() {
        let state = FormState::empty(&FormSchema::listing());
        let err = state.with_value("garage", "2").unwrap_err();
        assert!(matches!(err, FormError::UnknownField(name) if name == "garage"));
        assert_eq!(state.len(), 4);
    }

    #[test]
    fn serializes_to_a_flat_object_of_strings() {
        let state = FormState::empty(&FormSchema::listing())
            .with_value("bedrooms", "3")
            .unwrap()
            .with_value("location", "Austin")
            .unwrap();

        let body = serde_json::to_value(&state).unwrap();
        assert_eq!(
            body,
            json!({"bedrooms": "3", "bathrooms": "", "sqft": "", "location": "Austin"})
        );
    }
}
