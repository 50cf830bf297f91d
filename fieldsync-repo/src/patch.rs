//! Validated partial updates.

use fieldsync_core::models::DELETED_FIELD;
use fieldsync_fetch::SyncError;
use serde::Serialize;
use serde_json::{Map, Value};

/// Fields the server assigns; a patch may not touch them.
const RESERVED_FIELDS: &[&str] = &["_id", "created_date", "modified_date"];

/// A non-empty set of field changes sent as a PATCH body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PatchSet(Map<String, Value>);

impl PatchSet {
    /// Starts an empty builder.
    pub fn builder() -> PatchSetBuilder {
        PatchSetBuilder::default()
    }

    /// The patch that soft-deletes an object.
    pub fn soft_delete() -> Self {
        let mut fields = Map::new();
        fields.insert(DELETED_FIELD.to_string(), Value::Bool(true));
        Self(fields)
    }

    /// The changed fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Number of changed fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a built patch.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Builder for a [`PatchSet`].
///
/// The first invalid change is remembered and reported by [`build`].
///
/// [`build`]: PatchSetBuilder::build
#[derive(Debug, Default)]
pub struct PatchSetBuilder {
    fields: Map<String, Value>,
    error: Option<String>,
}

impl PatchSetBuilder {
    /// Sets `key` to `value`.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if self.error.is_some() {
            return self;
        }
        let key = key.into();
        if let Some(problem) = check_key(&key) {
            self.error = Some(problem);
            return self;
        }
        match serde_json::to_value(value) {
            Ok(value) => {
                self.fields.insert(key, value);
            }
            Err(e) => self.error = Some(format!("field '{key}': {e}")),
        }
        self
    }

    /// Clears `key` on the server.
    #[must_use]
    pub fn clear(self, key: impl Into<String>) -> Self {
        self.set(key, Value::Null)
    }

    /// Validates and returns the patch.
    pub fn build(self) -> Result<PatchSet, SyncError> {
        if let Some(problem) = self.error {
            return Err(SyncError::InvalidRequest(problem));
        }
        if self.fields.is_empty() {
            return Err(SyncError::InvalidRequest("patch has no fields".into()));
        }
        Ok(PatchSet(self.fields))
    }
}

fn check_key(key: &str) -> Option<String> {
    if key.trim().is_empty() {
        Some("patch field name is empty".into())
    } else if RESERVED_FIELDS.contains(&key) {
        Some(format!("field '{key}' is assigned by the server"))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build() {
        let patch = PatchSet::builder()
            .set("title", "Replace filter")
            .set("priority", 3)
            .clear("assignee")
            .build()
            .unwrap();

        assert_eq!(patch.len(), 3);
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"title": "Replace filter", "priority": 3, "assignee": null})
        );
    }

    #[test]
    fn test_empty_patch_is_rejected() {
        assert!(matches!(
            PatchSet::builder().build(),
            Err(SyncError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_bad_keys_are_rejected() {
        for key in ["", "  ", "_id", "created_date"] {
            let result = PatchSet::builder().set("title", "x").set(key, 1).build();
            assert!(
                matches!(result, Err(SyncError::InvalidRequest(_))),
                "accepted {key:?}"
            );
        }
    }

    #[test]
    fn test_soft_delete_patch() {
        assert_eq!(
            serde_json::to_value(PatchSet::soft_delete()).unwrap(),
            json!({"deleted": true})
        );
    }
}
