//! Domain-specific errors.

use std::io;

use thiserror::Error;

/// Failures while turning an input source into a [`TreeDocument`](super::model::TreeDocument).
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("cannot read tree listing {source_name}")]
    ResourceNotFound {
        source_name: String,
        #[source]
        source: io::Error,
    },
    #[error("tree listing is not valid JSON")]
    MalformedInput(#[source] serde_json::Error),
    #[error("tree listing has an unexpected shape")]
    SchemaViolation(#[from] SchemaViolation),
}

#[derive(Debug, Error)]
pub enum SchemaViolation {
    #[error("top-level value is {found}, expected an object")]
    NotAnObject { found: &'static str },
    #[error("missing `tree` field")]
    MissingTree,
    #[error("`tree` is {found}, expected an array")]
    TreeNotArray { found: &'static str },
    #[error("entry {index} needs string `path` and `sha` fields")]
    InvalidEntry {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl TreeError {
    /// Process exit code reported by the command line tool.
    pub fn exit_code(&self) -> u8 {
        match self {
            TreeError::ResourceNotFound { .. } => 3,
            TreeError::MalformedInput(_) => 4,
            TreeError::SchemaViolation(_) => 5,
        }
    }
}
