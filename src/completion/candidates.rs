//! Candidate gathering for completions that are not member accesses.

use rustc_hash::FxHashSet;
use tracing::trace;

use super::key_path::{key_path, resolve_class};
use super::scope::TypeContext;
use crate::config::CompletionConfig;
use crate::script::token::{Token, TokenKind, KEYWORDS};
use crate::types::registry::SignatureRegistry;
use crate::types::signatures::ParamSignature;
use crate::types::type_table::TypeScope;

/// Symbols, functions with `()` appended, and keywords.
pub fn global_candidates(context: &TypeContext<'_>, config: &CompletionConfig) -> Vec<String> {
    let mut candidates = context.table.symbol_names();
    candidates.extend(context.functions.names().into_iter().map(|name| format!("{name}()")));
    if config.include_keywords {
        candidates.extend(KEYWORDS.iter().map(|k| k.to_string()));
    }
    candidates
}

/// The call whose argument list holds token `at`, if `at` starts an argument.
///
/// Returns the index of the call's `(`.
fn enclosing_call(tokens: &[Token], at: usize) -> Option<usize> {
    let previous = tokens[..at].iter().rposition(|t| t.is_significant())?;
    if !matches!(tokens[previous].kind, TokenKind::LParen | TokenKind::Comma) {
        return None;
    }

    let mut depth = 0usize;
    for index in (0..=previous).rev() {
        match tokens[index].kind {
            TokenKind::RParen | TokenKind::RBracket => depth += 1,
            TokenKind::LBracket => depth = depth.checked_sub(1)?,
            TokenKind::LParen if depth == 0 => return Some(index),
            TokenKind::LParen => depth -= 1,
            TokenKind::LBrace | TokenKind::RBrace | TokenKind::Semicolon => return None,
            _ => {}
        }
    }
    None
}

/// Names given as `name=` at the top level of the argument list opened at `open`.
fn named_arguments(tokens: &[Token], open: usize, end: usize) -> FxHashSet<String> {
    let significant: Vec<&Token> = tokens[open + 1..end].iter().filter(|t| t.is_significant()).collect();
    let mut depth = 0usize;
    let mut names = FxHashSet::default();
    for (i, token) in significant.iter().enumerate() {
        match token.kind {
            TokenKind::LParen | TokenKind::LBracket => depth += 1,
            TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
            TokenKind::Identifier if depth == 0 => {
                if significant.get(i + 1).is_some_and(|t| t.kind == TokenKind::Assign) {
                    names.insert(token.text.clone());
                }
            }
            _ => {}
        }
    }
    names
}

/// Parameters of the function or method called at the `(` at `open`.
fn called_parameters<'c>(
    tokens: &[Token],
    open: usize,
    context: &'c TypeContext<'_>,
    registry: &'c dyn SignatureRegistry,
) -> Option<&'c [ParamSignature]> {
    let name_index = tokens[..open].iter().rposition(|t| t.is_significant())?;
    let name = &tokens[name_index];
    if name.kind != TokenKind::Identifier {
        return None;
    }

    let dot_index = tokens[..name_index].iter().rposition(|t| t.is_significant());
    match dot_index {
        Some(dot) if tokens[dot].kind == TokenKind::Dot => {
            let path = key_path(tokens, dot)?;
            let class = resolve_class(&path, &context.table, &context.functions, &context.call_types, registry)?;
            registry.method(class, &name.text).map(|m| m.params.as_slice())
        }
        _ => context.functions.get(&name.text).map(|f| f.params.as_slice()),
    }
}

/// `name=` completions for the parameters of the enclosing call that have
/// not been given by name yet. `at` is the index of the token being typed.
pub fn argument_names(
    tokens: &[Token],
    at: usize,
    context: &TypeContext<'_>,
    registry: &dyn SignatureRegistry,
) -> Vec<String> {
    let Some(open) = enclosing_call(tokens, at) else {
        return Vec::new();
    };
    let Some(params) = called_parameters(tokens, open, context, registry) else {
        return Vec::new();
    };
    let given = named_arguments(tokens, open, at);
    let names: Vec<String> = params
        .iter()
        .filter(|p| !p.is_variadic() && !given.contains(&p.name))
        .map(|p| format!("{}=", p.name))
        .collect();
    trace!("{} argument names offered", names.len());
    names
}
