//! Category entity, its unsaved form, and the inbound request payload.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;
use crate::validation::{FieldLimits, Violations};

/// A stored category. The id only exists once the row has been written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub description: String,
}

/// Category fields before an id has been assigned.
///
/// Used for inserts, full replacements, and the inline payload of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub description: String,
}

impl NewCategory {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Raw category body as received from a client.
///
/// Fields are optional so that absent values surface as validation messages
/// instead of deserialization failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CategoryRequest {
    /// Validate all fields and produce the unsaved category.
    pub fn validate(self, limits: &FieldLimits) -> Result<NewCategory, CoreError> {
        let mut violations = Violations::new();
        self.collect_violations(limits, &mut violations);
        violations.into_result()?;
        Ok(self.into_unchecked())
    }

    /// Record this payload's violations into `violations`.
    ///
    /// Shared with task validation, where the category is nested.
    pub(crate) fn collect_violations(&self, limits: &FieldLimits, violations: &mut Violations) {
        let name = self.name.as_deref();
        let description = self.description.as_deref();

        violations.require_not_blank("Category name", name);
        violations.limit_bytes("Category name", name, limits.category_name_max_bytes);
        violations.require_not_blank("Category description", description);
        violations.limit_bytes(
            "Category description",
            description,
            limits.category_description_max_bytes,
        );
    }

    /// Conversion after [`Self::collect_violations`] found nothing.
    pub(crate) fn into_unchecked(self) -> NewCategory {
        NewCategory {
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn request(name: Option<&str>, description: Option<&str>) -> CategoryRequest {
        CategoryRequest {
            name: name.map(str::to_string),
            description: description.map(str::to_string),
        }
    }

    #[test]
    fn valid_request_produces_new_category() {
        let category = request(Some("cat"), Some("d"))
            .validate(&FieldLimits::default())
            .unwrap();
        assert_eq!(category, NewCategory::new("cat", "d"));
    }

    #[test]
    fn missing_fields_report_both_messages() {
        let result = request(None, Some("   ")).validate(&FieldLimits::default());
        assert_matches!(result, Err(CoreError::Validation(m)) => {
            assert_eq!(m, vec![
                "Category name cannot be blank".to_string(),
                "Category description cannot be blank".to_string(),
            ]);
        });
    }

    #[test]
    fn oversized_name_rejected_with_configured_limit() {
        let limits = FieldLimits {
            category_name_max_bytes: 4,
            ..FieldLimits::default()
        };
        let result = request(Some("abcde"), Some("d")).validate(&limits);
        assert_matches!(result, Err(CoreError::Validation(m)) => {
            assert_eq!(m, vec!["Category name byte size should not exceed 4 bytes".to_string()]);
        });
    }

    #[test]
    fn oversized_description_rejected() {
        let long = "x".repeat(501);
        let result = request(Some("cat"), Some(&long)).validate(&FieldLimits::default());
        assert_matches!(result, Err(CoreError::Validation(m)) => {
            assert_eq!(m, vec![
                "Category description byte size should not exceed 500 bytes".to_string()
            ]);
        });
    }

    #[test]
    fn absent_json_fields_deserialize_as_none() {
        let parsed: CategoryRequest = serde_json::from_str(r#"{"name":"cat"}"#).unwrap();
        assert_eq!(parsed.name.as_deref(), Some("cat"));
        assert!(parsed.description.is_none());
    }
}
