//! Code completion.
//!
//! A request lexes the text before the cursor, decides the completion site,
//! builds the type table that is in effect there, gathers candidates and
//! ranks them against the typed prefix.

pub mod blocks;
pub mod candidates;
pub mod context;
pub mod key_path;
pub mod ranking;
pub mod scope;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::EngineConfig;
use crate::script::lexer::tokenize;
use crate::types::builtins::builtin_registry;
use crate::types::registry::SignatureRegistry;
use crate::types::type_table::TypeTable;

pub use context::{completion_site, CompletionSite};
pub use ranking::{rank, RankingCriteria};
pub use scope::{build_type_table, TypeContext};

/// Where the text being completed comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestContext {
    /// A SLiM script made of callback and function blocks
    SlimScript,
    /// A plain Eidos script
    EidosScript,
    /// A console line, analyzed on top of the session's variables
    Console,
}

/// Everything a completion request reads besides the text.
#[derive(Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub context: RequestContext,
    /// Variables of a live session, used as the global scope
    pub session: Option<&'a TypeTable>,
    pub registry: &'a dyn SignatureRegistry,
    pub config: &'a EngineConfig,
}

impl<'a> CompletionRequest<'a> {
    /// A request against the built-in signatures with no session.
    pub fn new(context: RequestContext, config: &'a EngineConfig) -> Self {
        Self { context, session: None, registry: builtin_registry(), config }
    }

    pub fn with_session(self, session: &'a TypeTable) -> Self {
        Self { session: Some(session), ..self }
    }

    pub fn with_registry(self, registry: &'a dyn SignatureRegistry) -> Self {
        Self { registry, ..self }
    }
}

/// The answer to a completion request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Completions {
    /// `(start, length)` of the text a chosen candidate replaces
    pub replacement_range: Option<(usize, usize)>,
    /// Candidates, best first
    pub candidates: Vec<String>,
}

impl Completions {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

fn clamp_to_char_boundary(text: &str, cursor: usize) -> usize {
    let mut cursor = cursor.min(text.len());
    while !text.is_char_boundary(cursor) {
        cursor -= 1;
    }
    cursor
}

/// Completions for the byte offset `cursor` in `text`.
///
/// Only the text before the cursor is looked at. A position where nothing
/// can be completed yields an empty result with no replacement range.
#[instrument(level = "debug", skip(text, request), fields(context = ?request.context))]
pub fn completions_at(text: &str, cursor: usize, request: &CompletionRequest<'_>) -> Completions {
    let cursor = clamp_to_char_boundary(text, cursor);
    let tokens = tokenize(&text[..cursor]);

    let Some(site) = completion_site(&tokens, cursor) else {
        debug!("no completion site at {}", cursor);
        return Completions::default();
    };

    let context = build_type_table(&tokens, site.start, request);
    let registry = request.registry;
    let config = request.config;

    let gathered = match site.member_of {
        Some(dot) => key_path::resolve_key_path(
            &tokens,
            dot,
            &context.table,
            &context.functions,
            &context.call_types,
            registry,
        ),
        None if context.is_fallback() => blocks::block_starters(),
        None => {
            let mut gathered = Vec::new();
            if config.completion.include_argument_names {
                gathered.extend(candidates::argument_names(&tokens, site.token_index, &context, registry));
            }
            gathered.extend(candidates::global_candidates(&context, &config.completion));
            gathered
        }
    };

    let ranked = rank(&gathered, &site.prefix, &config.ranking);
    debug!("{} of {} candidates kept for {:?}", ranked.len(), gathered.len(), site.prefix);
    Completions { replacement_range: Some(site.range()), candidates: ranked }
}
