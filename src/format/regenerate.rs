//! Canonical whitespace regeneration for full reformatting.
//!
//! All original whitespace is discarded and regenerated from the token
//! sequence alone. Indentation is not produced here; the output is meant to
//! be passed through the prettyprinter afterwards.

use tracing::trace;

use crate::script::token::{Token, TokenKind};

/// Separation required between two emitted tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gap {
    None,
    Space,
}

/// Tracks the two parenthesized groups that follow `function`:
/// the return type, then the parameter list.
#[derive(Debug, Clone, Copy, Default)]
struct Declaration {
    groups_done: u8,
    depth: usize,
}

impl Declaration {
    fn in_group(&self) -> bool {
        self.depth > 0
    }

    fn in_parameters(&self) -> bool {
        self.groups_done == 1 && self.depth > 0
    }

    fn name_is_next(&self) -> bool {
        self.groups_done == 1 && self.depth == 0
    }
}

struct Regenerator<'t> {
    tokens: &'t [Token],
    out: String,
    paren_nest: usize,
    brace_nest: usize,
    /// Line breaks owed after the last emitted token.
    pending_breaks: usize,
    previous: Option<TokenKind>,
    previous_unary: bool,
    previous_standalone_comment: bool,
    /// Whether the original source had a line break since the last emitted token.
    break_in_source: bool,
    declaration: Option<Declaration>,
}

/// Regenerate the whitespace of a token stream.
///
/// The result always ends with exactly one newline unless it is empty.
pub fn regenerate(tokens: &[Token]) -> String {
    let mut regenerator = Regenerator {
        tokens,
        out: String::new(),
        paren_nest: 0,
        brace_nest: 0,
        pending_breaks: 0,
        previous: None,
        previous_unary: false,
        previous_standalone_comment: false,
        break_in_source: false,
        declaration: None,
    };
    regenerator.run();

    let mut out = regenerator.out;
    let trimmed = out.trim_end_matches([' ', '\n']).len();
    out.truncate(trimmed);
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

impl Regenerator<'_> {
    fn run(&mut self) {
        let tokens = self.tokens;
        for (index, token) in tokens.iter().enumerate() {
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Whitespace => {
                    if token.text.contains(['\n', '\r', '\u{2029}']) {
                        self.break_in_source = true;
                    }
                }
                TokenKind::Comment | TokenKind::CommentLong => self.comment(token),
                _ => self.significant(index),
            }
        }
    }

    fn next_significant(&self, from: usize) -> TokenKind {
        self.tokens[from..]
            .iter()
            .find(|t| t.is_significant())
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn push_breaks(&mut self, count: usize) {
        for _ in 0..count {
            self.out.push('\n');
        }
    }

    fn comment(&mut self, token: &Token) {
        let trailing = !self.out.is_empty() && !self.break_in_source;
        if trailing {
            // Keeps its line; whatever was owed moves after the comment
            self.out.push(' ');
            self.out.push_str(&token.text);
            self.pending_breaks = self.pending_breaks.max(1);
            self.previous_standalone_comment = false;
        } else {
            if !self.out.is_empty() {
                let after_brace = matches!(self.previous, Some(TokenKind::LBrace | TokenKind::RBrace))
                    && !self.previous_standalone_comment;
                let wanted = if after_brace || self.previous_standalone_comment { 1 } else { 2 };
                let breaks = self.pending_breaks.max(wanted);
                self.push_breaks(breaks);
            }
            self.out.push_str(&token.text);
            self.pending_breaks = 1;
            self.previous_standalone_comment = true;
        }
        self.break_in_source = false;
    }

    fn significant(&mut self, index: usize) {
        let tokens = self.tokens;
        let token = &tokens[index];
        let kind = token.kind;

        let breaks_before = match kind {
            TokenKind::LBrace | TokenKind::RBrace => 1,
            _ => 0,
        };
        let breaks = self.pending_breaks.max(breaks_before);
        let unary = matches!(kind, TokenKind::Plus | TokenKind::Minus | TokenKind::Not)
            && !self.previous.is_some_and(TokenKind::ends_operand);

        if !self.out.is_empty() {
            if breaks > 0 {
                self.push_breaks(breaks);
            } else if self.gap_before(kind) == Gap::Space {
                self.out.push(' ');
            }
        }
        self.out.push_str(&token.text);

        self.pending_breaks = 0;
        self.previous_standalone_comment = false;
        self.break_in_source = false;
        self.track_declaration(kind);

        match kind {
            TokenKind::LParen | TokenKind::LBracket => self.paren_nest += 1,
            TokenKind::RParen | TokenKind::RBracket => self.paren_nest = self.paren_nest.saturating_sub(1),
            TokenKind::Semicolon if self.paren_nest == 0 => self.pending_breaks = 1,
            TokenKind::LBrace => {
                self.brace_nest += 1;
                self.pending_breaks = 1;
            }
            TokenKind::RBrace => {
                self.brace_nest = self.brace_nest.saturating_sub(1);
                let next = self.next_significant(index + 1);
                self.pending_breaks = if self.brace_nest == 0
                    && self.paren_nest == 0
                    && !matches!(next, TokenKind::Else | TokenKind::While)
                {
                    2
                } else {
                    1
                };
            }
            _ => {}
        }

        self.previous = Some(kind);
        self.previous_unary = unary;
    }

    fn track_declaration(&mut self, kind: TokenKind) {
        if kind == TokenKind::Function {
            self.declaration = Some(Declaration::default());
            return;
        }
        let Some(declaration) = self.declaration.as_mut() else {
            return;
        };
        match kind {
            TokenKind::LParen => declaration.depth += 1,
            TokenKind::RParen => {
                declaration.depth = declaration.depth.saturating_sub(1);
                if declaration.depth == 0 {
                    declaration.groups_done += 1;
                    if declaration.groups_done == 2 {
                        trace!("function declaration header complete");
                        self.declaration = None;
                    }
                }
            }
            TokenKind::LBrace | TokenKind::Semicolon if declaration.depth == 0 => self.declaration = None,
            _ => {}
        }
    }

    /// Spacing between the previous token and a token of `kind` on the same line.
    fn gap_before(&self, kind: TokenKind) -> Gap {
        use TokenKind::*;

        let Some(previous) = self.previous else {
            return Gap::None;
        };
        if matches!(kind, Comma | Semicolon | RParen | RBracket | Dot) {
            return Gap::None;
        }
        if matches!(previous, LParen | LBracket | Dot) || self.previous_unary {
            return Gap::None;
        }
        if matches!(kind, Colon | Exp | Singleton) || matches!(previous, Colon | Exp) {
            return Gap::None;
        }
        if let Some(declaration) = self.declaration {
            if declaration.in_group() && (matches!(kind, Lt | Gt) || previous == Lt) {
                return Gap::None;
            }
            if declaration.name_is_next() && previous == RParen && kind == Identifier {
                return Gap::None;
            }
            if declaration.in_parameters() && (kind == Assign || previous == Assign) {
                return Gap::Space;
            }
        }
        if matches!(kind, LParen | LBracket) {
            return if previous.ends_operand() && previous != Number && previous != String {
                Gap::None
            } else {
                Gap::Space
            };
        }
        if (kind == Assign || previous == Assign) && self.paren_nest > 0 {
            return Gap::None;
        }
        Gap::Space
    }
}
