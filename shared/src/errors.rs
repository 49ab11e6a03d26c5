//! Error types for the calorie tracking engine

use crate::validation::get_field_display_label;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One offending entry inside a rejected batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryIssue {
    /// Position of the entry in the batch handed to the engine
    pub index: usize,
    pub field: String,
    pub message: String,
}

impl EntryIssue {
    pub fn new(index: usize, field: &str, message: impl Into<String>) -> Self {
        Self {
            index,
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for EntryIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry {}: {}: {}", self.index, self.field, self.message)
    }
}

/// Engine error taxonomy
///
/// Neither variant is fatal: callers are expected to present the message
/// to the user and carry on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NutritionError {
    /// The caller supplied an invalid profile field, an unrecognized
    /// category, or a non-positive calorie target.
    #[error("Precondition violation: {field}: {message}")]
    PreconditionViolation { field: String, message: String },

    /// One or more entries in a batch were malformed. The whole batch is
    /// rejected and every offending entry is listed.
    #[error("Malformed entries: {}", format_issues(.0))]
    MalformedEntry(Vec<EntryIssue>),
}

impl NutritionError {
    pub fn precondition(field: &str, message: impl Into<String>) -> Self {
        NutritionError::PreconditionViolation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Totals of an otherwise valid batch do not fit in a `Decimal`
    pub fn totals_out_of_range() -> Self {
        NutritionError::precondition("entries", "Totals exceed the supported range")
    }

    /// Message for end users, with display labels in place of field names
    pub fn user_message(&self) -> String {
        match self {
            NutritionError::PreconditionViolation { field, message } => {
                format!("{}: {}", get_field_display_label(field), message)
            }
            NutritionError::MalformedEntry(issues) => issues
                .iter()
                .map(|issue| {
                    format!(
                        "Entry {}: {}: {}",
                        issue.index + 1,
                        get_field_display_label(&issue.field),
                        issue.message
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Issues carried by a `MalformedEntry` error, empty otherwise
    pub fn issues(&self) -> &[EntryIssue] {
        match self {
            NutritionError::MalformedEntry(issues) => issues,
            NutritionError::PreconditionViolation { .. } => &[],
        }
    }
}

fn format_issues(issues: &[EntryIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result alias used across the engine
pub type NutritionResult<T> = Result<T, NutritionError>;
