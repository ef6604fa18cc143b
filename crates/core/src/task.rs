//! Task entity, its persisted form, and the inbound request payload.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::category::{Category, CategoryRequest, NewCategory};
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};
use crate::validation::{FieldLimits, Violations};

/// A stored task with its category resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub deadline: Timestamp,
    pub category: Category,
}

/// Validated task fields with the category still given by value.
///
/// The rule engine resolves `category` by name before anything is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub name: String,
    pub description: Option<String>,
    pub deadline: Timestamp,
    pub category: NewCategory,
}

/// Task columns as handed to the gateway, category already resolved to an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub name: String,
    pub description: Option<String>,
    pub deadline: Timestamp,
    pub category_id: DbId,
}

impl TaskRecord {
    pub fn new(task: &NewTask, category_id: DbId) -> Self {
        Self {
            name: task.name.clone(),
            description: task.description.clone(),
            deadline: task.deadline,
            category_id,
        }
    }
}

/// Raw task body as received from a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_deadline")]
    pub deadline: Option<Timestamp>,
    pub category: Option<CategoryRequest>,
}

impl TaskRequest {
    /// Validate all fields, including the nested category, against `now`.
    ///
    /// The deadline must be strictly after `now`.
    pub fn validate(self, limits: &FieldLimits, now: Timestamp) -> Result<NewTask, CoreError> {
        let mut violations = Violations::new();
        let name = self.name.as_deref();

        violations.require_not_blank("Task name", name);
        violations.limit_bytes("Task name", name, limits.task_name_max_bytes);
        violations.limit_bytes(
            "Task description",
            self.description.as_deref(),
            limits.task_description_max_bytes,
        );

        match self.deadline {
            None => violations.push("Task deadline cannot be null"),
            Some(deadline) if deadline <= now => {
                violations.push("Task deadline should be in the future")
            }
            Some(_) => {}
        }

        match &self.category {
            None => violations.push("Task category cannot be null"),
            Some(category) => category.collect_violations(limits, &mut violations),
        }

        violations.into_result()?;

        let (Some(deadline), Some(category)) = (self.deadline, self.category) else {
            return Err(CoreError::Internal(
                "task request passed validation without deadline or category".into(),
            ));
        };

        Ok(NewTask {
            name: self.name.unwrap_or_default(),
            description: self.description,
            deadline,
            category: category.into_unchecked(),
        })
    }
}

/// Parse a deadline given either as RFC 3339 or as a zone-less ISO date-time.
///
/// Zone-less values are taken to be UTC.
pub fn parse_deadline(raw: &str) -> Result<Timestamp, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(_) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|n| n.and_utc()),
    }
}

fn deserialize_deadline<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    raw.map(|s| parse_deadline(&s).map_err(serde::de::Error::custom))
        .transpose()
}
