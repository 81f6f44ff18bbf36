//! Error types for trellis-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from loading and validating a plan document.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("failed to read plan at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parse error from serde_json.
    #[error("failed to parse plan at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// YAML parse error from serde_yaml.
    #[error("failed to parse plan at {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// File extension is neither `.json`, `.yaml`, nor `.yml`.
    #[error("unsupported plan format '{extension}' for {path}; expected .json, .yaml or .yml")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// The `team` field was missing or empty.
    #[error("plan has no team; set the top-level \"team\" field")]
    MissingTeam,

    /// The `issues` array was empty.
    #[error("plan has no issues")]
    NoIssues,

    /// An issue node (at any depth) has an empty or whitespace-only title.
    #[error("issue at {at} has an empty title")]
    EmptyTitle { at: String },

    /// A priority was outside the 0..=4 range the remote accepts.
    #[error("issue at {at} has priority {value}; expected 0..=4")]
    PriorityOutOfRange { at: String, value: u8 },
}
