use crate::store::StoreError;
use crate::types::DbId;

/// Business-rule failures returned by the rule engines.
///
/// Every variant except [`CoreError::Store`] and [`CoreError::Internal`] is
/// a terminal, caller-visible outcome with a descriptive message.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Cannot find category with id : {id}")]
    CategoryNotFound { id: DbId },

    #[error("Cannot find category with name : {name}")]
    CategoryNameNotFound { name: String },

    #[error("Category with name : {name} already exist")]
    CategoryAlreadyExists { name: String },

    #[error("Category with id : {id} has associated tasks")]
    CategoryHasAssociatedTasks { id: DbId },

    #[error("Cannot find task with id : {id}")]
    TaskNotFound { id: DbId },

    /// Reserved: no operation currently produces it.
    #[error("Task with id : {id} already exist")]
    TaskAlreadyExists { id: DbId },

    /// One or more field-level violations, in field order.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Human-readable messages for the error payload.
    ///
    /// Validation failures expand to one message per violated field; every
    /// other variant yields its display string.
    pub fn messages(&self) -> Vec<String> {
        match self {
            CoreError::Validation(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}
