//! Top-level block structure of SLiM scripts.
//!
//! A SLiM script is a flat sequence of blocks. Each block has a header that
//! runs up to its `{` (an optional `s1` id, an optional `species`/`ticks`
//! specifier, an optional tick range, then a callback or a `function`
//! declaration) and a body that runs to the matching `}`.

use tracing::trace;

use crate::script::token::{Token, TokenKind};

/// Kind of a top-level block, from its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Initialize,
    First,
    Early,
    Late,
    MutationEffect,
    FitnessEffect,
    Interaction,
    MateChoice,
    ModifyChild,
    Recombination,
    Mutation,
    Survival,
    Reproduction,
    /// A user `function` declaration
    Function,
    /// A header that names no known callback
    Untyped,
}

/// Callback names in the order they are offered between blocks.
pub const CALLBACK_NAMES: &[(&str, BlockKind)] = &[
    ("initialize", BlockKind::Initialize),
    ("first", BlockKind::First),
    ("early", BlockKind::Early),
    ("late", BlockKind::Late),
    ("mutationEffect", BlockKind::MutationEffect),
    ("fitnessEffect", BlockKind::FitnessEffect),
    ("interaction", BlockKind::Interaction),
    ("mateChoice", BlockKind::MateChoice),
    ("modifyChild", BlockKind::ModifyChild),
    ("recombination", BlockKind::Recombination),
    ("mutation", BlockKind::Mutation),
    ("survival", BlockKind::Survival),
    ("reproduction", BlockKind::Reproduction),
];

impl BlockKind {
    pub fn from_callback(name: &str) -> Option<BlockKind> {
        CALLBACK_NAMES.iter().find(|(n, _)| *n == name).map(|(_, kind)| *kind)
    }

    pub fn is_callback(self) -> bool {
        !matches!(self, BlockKind::Function | BlockKind::Untyped)
    }
}

/// Words that can start a new top-level block.
pub fn block_starters() -> Vec<String> {
    let mut starters: Vec<String> = CALLBACK_NAMES.iter().map(|(name, _)| format!("{name}()")).collect();
    starters.extend(["function", "species", "ticks"].map(String::from));
    starters
}

/// A top-level block located by token indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBlock {
    pub kind: BlockKind,
    /// First header token
    pub start: usize,
    /// The opening `{`, once typed
    pub open: Option<usize>,
    /// The matching `}`, once typed
    pub close: Option<usize>,
}

impl ScriptBlock {
    /// Whether the body has been opened but not closed.
    pub fn is_open(&self) -> bool {
        self.open.is_some() && self.close.is_none()
    }

    pub fn is_complete(&self) -> bool {
        self.close.is_some()
    }

    pub fn header<'t>(&self, tokens: &'t [Token]) -> &'t [Token] {
        &tokens[self.start..self.open.unwrap_or(tokens.len())]
    }

    /// Tokens strictly inside the braces; up to the end when unclosed.
    pub fn body<'t>(&self, tokens: &'t [Token]) -> &'t [Token] {
        match self.open {
            Some(open) => &tokens[open + 1..self.close.unwrap_or(tokens.len())],
            None => &[],
        }
    }

    /// The whole block, header included.
    pub fn span<'t>(&self, tokens: &'t [Token]) -> &'t [Token] {
        match self.close {
            Some(close) => &tokens[self.start..=close],
            None => &tokens[self.start..],
        }
    }
}

/// Classify a block header.
pub fn header_kind(header: &[Token]) -> BlockKind {
    let significant: Vec<&Token> = header.iter().filter(|t| t.is_significant()).collect();
    if significant.first().is_some_and(|t| t.kind == TokenKind::Function) {
        return BlockKind::Function;
    }
    significant
        .windows(2)
        .find_map(|pair| match (pair[0].kind, pair[1].kind) {
            (TokenKind::Identifier, TokenKind::LParen) => BlockKind::from_callback(&pair[0].text),
            _ => None,
        })
        .unwrap_or(BlockKind::Untyped)
}

#[derive(Debug, Clone, Copy)]
enum ScanState {
    Between,
    Header { start: usize },
    Body { start: usize, open: usize, depth: usize },
}

/// Split a SLiM script into its top-level blocks.
pub fn scan_blocks(tokens: &[Token]) -> Vec<ScriptBlock> {
    let mut blocks = Vec::new();
    let mut state = ScanState::Between;

    let finish = |start: usize, open: Option<usize>, close: Option<usize>| {
        let kind = header_kind(&tokens[start..open.unwrap_or(tokens.len())]);
        ScriptBlock { kind, start, open, close }
    };

    for (index, token) in tokens.iter().enumerate() {
        if !token.is_significant() {
            continue;
        }
        state = match (state, token.kind) {
            (ScanState::Between, TokenKind::LBrace) => ScanState::Body { start: index, open: index, depth: 1 },
            (ScanState::Between, TokenKind::RBrace) => ScanState::Between,
            (ScanState::Between, _) => ScanState::Header { start: index },
            (ScanState::Header { start }, TokenKind::LBrace) => ScanState::Body { start, open: index, depth: 1 },
            (ScanState::Header { start }, _) => ScanState::Header { start },
            (ScanState::Body { start, open, depth }, TokenKind::LBrace) => {
                ScanState::Body { start, open, depth: depth + 1 }
            }
            (ScanState::Body { start, open, depth: 1 }, TokenKind::RBrace) => {
                blocks.push(finish(start, Some(open), Some(index)));
                ScanState::Between
            }
            (ScanState::Body { start, open, depth }, TokenKind::RBrace) => {
                ScanState::Body { start, open, depth: depth - 1 }
            }
            (body @ ScanState::Body { .. }, _) => body,
        };
    }

    match state {
        ScanState::Between => {}
        ScanState::Header { start } => blocks.push(finish(start, None, None)),
        ScanState::Body { start, open, .. } => blocks.push(finish(start, Some(open), None)),
    }

    trace!("scanned {} blocks", blocks.len());
    blocks
}

/// The top-level `function` declaration whose body is still open at the
/// end of `tokens`, as a block. Used for plain Eidos scripts.
pub fn open_function(tokens: &[Token]) -> Option<ScriptBlock> {
    let mut depth = 0usize;
    let mut candidate: Option<ScriptBlock> = None;

    for (index, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Function if depth == 0 => {
                candidate = Some(ScriptBlock { kind: BlockKind::Function, start: index, open: None, close: None });
            }
            TokenKind::LBrace => {
                if depth == 0 {
                    if let Some(block) = candidate.as_mut().filter(|b| b.open.is_none()) {
                        block.open = Some(index);
                    }
                }
                depth += 1;
            }
            TokenKind::RBrace => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    candidate = None;
                }
            }
            TokenKind::Semicolon if depth == 0 => candidate = None,
            _ => {}
        }
    }

    candidate.filter(ScriptBlock::is_open)
}
