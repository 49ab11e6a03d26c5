//! Error handling for the tracker layer
//!
//! Wraps engine errors together with the I/O, serialization and
//! configuration failures that only occur outside the pure engine.

use calorie_tracker_shared::NutritionError;
use thiserror::Error;

/// Tracker error type
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error(transparent)]
    Nutrition(#[from] NutritionError),

    #[error("No profile set for this session")]
    MissingProfile,

    #[error("Food not found: {0}")]
    FoodNotFound(u32),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Export encoding error: {0}")]
    Encoding(String),
}

impl TrackerError {
    /// True when the caller supplied bad input rather than the environment failing
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            TrackerError::Nutrition(_) | TrackerError::MissingProfile | TrackerError::FoodNotFound(_)
        )
    }

    /// Message shown to the user on the command line
    pub fn user_message(&self) -> String {
        match self {
            TrackerError::Nutrition(err) => err.user_message(),
            TrackerError::MissingProfile => "Set a profile first with `calorie-tracker init`".to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for tracker operations
pub type TrackerResult<T> = Result<T, TrackerError>;
