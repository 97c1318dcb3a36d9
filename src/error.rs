//! Error types for cbconv.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for cbconv operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A token does not have the expected numeric or subnet form
    #[error("malformed field {position}: {token:?} (expected {expected})")]
    MalformedField {
        token: String,
        position: usize,
        expected: &'static str,
    },

    /// A line has fewer fields than the active mode requires
    #[error("expected at least {expected} fields ({shape}), got {actual}")]
    FieldCountMismatch {
        expected: usize,
        actual: usize,
        shape: &'static str,
    },

    /// A parsed rule does not have exactly the mode's number of atoms
    #[error("rule has {actual} atoms, corpus requires exactly {expected}")]
    AtomCountMismatch { expected: usize, actual: usize },

    /// Merge input keys are not non-decreasing
    #[error("unsorted {side} input: key {key} follows {previous}")]
    UnsortedInput {
        side: &'static str,
        previous: u64,
        key: u64,
    },

    /// Positional rule merge over files of different length
    #[error("rule files differ in length: {left} lines vs {right} lines")]
    LineCountMismatch { left: usize, right: usize },

    /// An error located at a specific line of an input file
    #[error("{}:{line}: {source}", path.display())]
    AtLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: Box<Error>,
    },

    /// IO error on a named file
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build a [`Error::MalformedField`].
    pub fn malformed(token: &str, position: usize, expected: &'static str) -> Self {
        Error::MalformedField {
            token: token.to_string(),
            position,
            expected,
        }
    }

    /// Attach file and 1-based line context to this error.
    pub fn at_line(self, path: impl Into<PathBuf>, line: usize) -> Self {
        Error::AtLine {
            path: path.into(),
            line,
            source: Box::new(self),
        }
    }

    /// Strip any [`Error::AtLine`] wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Error::AtLine { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias for cbconv operations.
pub type Result<T> = std::result::Result<T, Error>;
