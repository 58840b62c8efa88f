//! Error types.
//!
//! - [`QueryError`] is what a failed query reports to its caller.  Both
//!   variants become a `{"success": false, ...}` envelope; neither is fatal
//!   to the process.
//! - [`ConsistencyError`] is raised by the raw-text member scan when the
//!   source text does not match the parsed tree.
//! - [`ConfigError`] covers loading the TOML configuration.
//!
//! "No invocation found" is not an error: it is a normal query outcome and
//! is modelled as [`crate::query::QueryOutput::NoInvocation`].

use std::path::PathBuf;

use thiserror::Error;

use crate::syntax::AccessOperator;

/// Process exit code for a successful query.
pub const EXIT_SUCCESS: i32 = 0;
/// Process exit code when the response envelope reports a failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueryError {
    /// A required request field is missing or unusable.
    #[error("{0}")]
    Input(String),

    #[error("Inconsistent source text: {0}")]
    Consistency(#[from] ConsistencyError),
}

/// The source text between a receiver and a dynamic member does not match
/// what the parser reported.  Offsets are byte offsets into the source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    #[error("operator character `{found}` repeated at offset {offset}")]
    RepeatedOperator { found: char, offset: u32 },

    #[error("operator character `{found}` out of order at offset {offset}, expected `{operator}`")]
    MisplacedOperator {
        found: char,
        offset: u32,
        operator: AccessOperator,
    },

    #[error("unexpected `{found}` at offset {offset} before the access operator")]
    UnexpectedToken { found: char, offset: u32 },

    #[error("expected member `{expected}` at offset {offset}")]
    NameMismatch { expected: String, offset: u32 },

    #[error("source ended at offset {offset} before member `{member}`")]
    UnexpectedEnd { offset: u32, member: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
