//! Error types surfaced by the engine.
//!
//! Only malformed input produces errors. Unresolvable completions are not
//! errors: they yield an empty candidate list instead.

use thiserror::Error;

/// Failure of a reformat request. No partial text is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The input contains a token that could not be lexed
    #[error("cannot format a script containing an invalid token at offset {offset}")]
    BadToken { offset: usize },

    /// A `}` was found with no matching `{` open
    #[error("unbalanced '}}' at offset {offset}")]
    UnbalancedBrace { offset: usize },

    /// Regenerated whitespace changed the meaning of the token stream
    #[error("reformatted text no longer tokenizes like the original (first difference at offset {offset})")]
    Retokenize { offset: usize },
}

impl FormatError {
    /// Byte offset in the input where the failure was detected.
    pub fn offset(&self) -> usize {
        match self {
            FormatError::BadToken { offset }
            | FormatError::UnbalancedBrace { offset }
            | FormatError::Retokenize { offset } => *offset,
        }
    }
}

/// A function or method prototype that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed prototype at offset {offset}: {message}")]
pub struct PrototypeError {
    pub offset: usize,
    pub message: String,
}

impl PrototypeError {
    pub fn new(offset: usize, message: impl Into<String>) -> Self {
        Self { offset, message: message.into() }
    }
}

/// Failure to load an engine configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
