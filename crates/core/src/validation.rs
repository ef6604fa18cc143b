//! Field-level validation shared by category and task requests.
//!
//! Lengths are measured in UTF-8 bytes, not characters. Violations are
//! collected rather than reported first-failure, so a single response can
//! list every problem with the submitted payload.

use crate::error::CoreError;

/// Default cap for entity names, in bytes.
pub const DEFAULT_NAME_MAX_BYTES: usize = 100;

/// Default cap for entity descriptions, in bytes.
pub const DEFAULT_DESCRIPTION_MAX_BYTES: usize = 500;

/// Per-field byte maxima applied at the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLimits {
    pub category_name_max_bytes: usize,
    pub category_description_max_bytes: usize,
    pub task_name_max_bytes: usize,
    pub task_description_max_bytes: usize,
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            category_name_max_bytes: DEFAULT_NAME_MAX_BYTES,
            category_description_max_bytes: DEFAULT_DESCRIPTION_MAX_BYTES,
            task_name_max_bytes: DEFAULT_NAME_MAX_BYTES,
            task_description_max_bytes: DEFAULT_DESCRIPTION_MAX_BYTES,
        }
    }
}

/// Accumulator for field violations.
#[derive(Debug, Default)]
pub struct Violations {
    messages: Vec<String>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a raw message.
    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Reject a missing value or one that is empty after trimming.
    pub fn require_not_blank(&mut self, field: &str, value: Option<&str>) {
        if is_blank(value) {
            self.push(format!("{field} cannot be blank"));
        }
    }

    /// Reject a value whose UTF-8 encoding exceeds `max` bytes.
    ///
    /// A missing value passes; presence is checked separately.
    pub fn limit_bytes(&mut self, field: &str, value: Option<&str>, max: usize) {
        if value.is_some_and(|v| v.len() > max) {
            self.push(format!("{field} byte size should not exceed {max} bytes"));
        }
    }

    /// `Ok(())` when nothing was recorded, otherwise [`CoreError::Validation`].
    pub fn into_result(self) -> Result<(), CoreError> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(self.messages))
        }
    }
}

/// `true` for `None`, the empty string, or whitespace only.
pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}
