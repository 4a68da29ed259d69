//! Script formatting.
//!
//! Two modes are offered. [`Mode::Prettyprint`] only rewrites the whitespace
//! that starts a line. [`Mode::FullReformat`] regenerates all whitespace in a
//! canonical style first, checks that the result still lexes to the same
//! tokens, and then reindents it.

pub mod indent;
pub mod prettyprint;
pub mod regenerate;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::FormatError;
use crate::script::lexer::tokenize;
use crate::script::token::{significant, Token, TokenKind};

pub use indent::{indent_level, IndentStack};
pub use prettyprint::prettyprint;
pub use regenerate::regenerate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Prettyprint,
    FullReformat,
}

/// Output settings shared by both modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Text emitted once per indent level.
    pub indent: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self { indent: "\t".to_string() }
    }
}

/// Reformat a token stream with the default options.
pub fn reformat(tokens: &[Token], mode: Mode) -> Result<String, FormatError> {
    reformat_with(tokens, mode, &FormatOptions::default())
}

pub fn reformat_with(tokens: &[Token], mode: Mode, options: &FormatOptions) -> Result<String, FormatError> {
    if let Some(bad) = tokens.iter().find(|t| t.kind == TokenKind::Bad) {
        return Err(FormatError::BadToken { offset: bad.start });
    }

    match mode {
        Mode::Prettyprint => prettyprint(tokens, options),
        Mode::FullReformat => {
            let regenerated = regenerate(tokens);
            let retokenized = tokenize(&regenerated);
            check_same_tokens(tokens, &retokenized)?;
            debug!("regenerated {} bytes", regenerated.len());
            prettyprint(&retokenized, options)
        }
    }
}

/// Tokenize and reformat source text.
pub fn reformat_source(source: &str, mode: Mode, options: &FormatOptions) -> Result<String, FormatError> {
    reformat_with(&tokenize(source), mode, options)
}

fn check_same_tokens(original: &[Token], regenerated: &[Token]) -> Result<(), FormatError> {
    let mut before = significant(original);
    let mut after = significant(regenerated);
    loop {
        match (before.next(), after.next()) {
            (None, None) => return Ok(()),
            (Some(a), Some(b)) if a.kind == b.kind && a.text == b.text => {}
            (Some(a), _) => {
                warn!("regenerated script diverges at offset {}", a.start);
                return Err(FormatError::Retokenize { offset: a.start });
            }
            (None, Some(_)) => {
                let offset = original.last().map(|t| t.end).unwrap_or(0);
                warn!("regenerated script has extra tokens");
                return Err(FormatError::Retokenize { offset });
            }
        }
    }
}
