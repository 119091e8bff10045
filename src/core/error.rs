use thiserror::Error;

use crate::grouping::validation::{ConfigIssue, ValidationReport};

#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("Configuration error: {0}")]
    Configuration(ConfigIssue),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(ValidationReport),

    #[error("No source collection supplied to [{group}]")]
    NullInput { group: String },

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Attribute [{attribute}] value [{value}] cannot be read as {expected}")]
    AttributeType {
        attribute: String,
        value: String,
        expected: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ConfigIssue> for SelectionError {
    fn from(issue: ConfigIssue) -> Self {
        SelectionError::Configuration(issue)
    }
}

pub type Result<T> = std::result::Result<T, SelectionError>;
