// SPDX-License-Identifier: MIT

//! Typed error handling for neuroflow
//!
//! `GraphError` covers everything that can go wrong while assembling a
//! workflow graph; `NeuroflowError` is the crate-wide error that wraps it
//! together with configuration, data lookup and I/O failures.

use thiserror::Error;

/// Top-level error type for neuroflow
#[derive(Debug, Error)]
pub enum NeuroflowError {
    /// Graph construction errors
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Configuration errors (bad env vars, invalid config files)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A template file could not be resolved locally
    #[error("Template '{template}' has no file for '{suffix}' (looked in {path})")]
    TemplateNotFound {
        template: String,
        suffix: String,
        path: String,
    },

    /// A sample dataset is not present in the data home
    #[error("Dataset '{name}' not found under {path}")]
    DataNotFound { name: String, path: String },

    /// Remote download failures
    #[error("Fetch of {url} failed: {message}")]
    Fetch { url: String, message: String },

    /// HTTP client errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors raised while adding nodes or connections to a workflow
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// Two nodes with the same name in one workflow
    #[error("Node '{0}' already exists in workflow")]
    DuplicateNode(String),

    /// Connection or lookup referenced a node that was never added
    #[error("Node '{0}' not found")]
    NodeNotFound(String),

    /// A field that the node's interface does not declare
    #[error("Node '{node}' has no {direction} field '{field}'")]
    UnknownField {
        node: String,
        field: String,
        direction: FieldDirection,
    },

    /// Each input accepts a single upstream connection
    #[error("Input '{node}.{field}' is already connected")]
    InputAlreadyConnected { node: String, field: String },

    /// The connection would close a cycle
    #[error("Circular dependency detected: {0:?}")]
    CircularDependency(Vec<String>),

    /// Map nodes need at least one field to iterate over
    #[error("Map node '{0}' declares no iterfield")]
    EmptyIterfield(String),
}

/// Which side of an interface a field lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDirection {
    Input,
    Output,
}

impl std::fmt::Display for FieldDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldDirection::Input => write!(f, "input"),
            FieldDirection::Output => write!(f, "output"),
        }
    }
}

impl NeuroflowError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a fetch error
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }
}

impl GraphError {
    pub(crate) fn unknown_input(node: &str, field: &str) -> Self {
        Self::UnknownField {
            node: node.to_string(),
            field: field.to_string(),
            direction: FieldDirection::Input,
        }
    }

    pub(crate) fn unknown_output(node: &str, field: &str) -> Self {
        Self::UnknownField {
            node: node.to_string(),
            field: field.to_string(),
            direction: FieldDirection::Output,
        }
    }
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, NeuroflowError>;
