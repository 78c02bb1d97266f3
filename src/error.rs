use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a graph, loading a membership, or running the audit.
///
/// Every variant is fatal: the audit never reports results computed against a
/// partially ingested graph or membership.
#[derive(Debug, Error)]
pub enum AuditError {
    /// A required option is missing or an option value is not supported.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A graph or membership line could not be understood.
    #[error("parse error in {input} at line {line}: {message}")]
    Parse {
        input: String,
        line: usize,
        message: String,
    },

    /// A membership entry refers to a vertex the graph does not contain.
    #[error("membership line {line} refers to vertex {vertex}, outside the graph span {span}")]
    Range {
        line: usize,
        vertex: u64,
        span: usize,
    },

    /// A vertex of the graph received no community from the membership file.
    #[error("vertex {vertex} has no community assigned")]
    UndefinedCommunity { vertex: u64 },

    /// A file could not be opened or created.
    #[error("cannot access {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("cannot build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, AuditError>;

impl AuditError {
    /// Builds a [`AuditError::Parse`] for the given input name and 1-based line number.
    pub fn parse(input: &str, line: usize, message: impl Into<String>) -> Self {
        AuditError::Parse {
            input: input.to_string(),
            line,
            message: message.into(),
        }
    }
}
