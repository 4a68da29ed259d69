//! Indent computation from a stack of indent-generating tokens.
//!
//! The stack holds the `{`, `if`, `else`, `do`, `while`, `for` and `?`
//! tokens that are still open at the current point of a scan. A control-flow
//! keyword directly followed by `{` counts as a single level, and `?` entries
//! only exist so that a later `else` can be matched to them.

use tracing::trace;

use crate::errors::FormatError;
use crate::script::token::{Token, TokenKind};

/// Indent level for the line whose first token has kind `next`.
///
/// # Arguments
/// * `stack` - Kinds of the open indent-generating tokens, outermost first
/// * `starting_new_statement` - Whether the last significant token was `;`, `{` or `}`
/// * `next` - Kind of the token that will follow the indentation
pub fn indent_level(stack: &[TokenKind], starting_new_statement: bool, next: TokenKind) -> usize {
    let mut indent: isize = 0;
    let mut previous_was_control_flow = false;

    for &kind in stack {
        if kind == TokenKind::Conditional {
            continue;
        }
        if !(previous_was_control_flow && kind == TokenKind::LBrace) {
            indent += 1;
        }
        previous_was_control_flow = kind != TokenKind::LBrace;
    }
    let top_is_control_flow = previous_was_control_flow;

    // Continuation lines of a statement get one extra level
    if !starting_new_statement && !top_is_control_flow {
        indent += 1;
    }
    // `{` on its own line sits at the level of its header
    if (top_is_control_flow || !starting_new_statement) && next == TokenKind::LBrace {
        indent -= 1;
    }
    if next == TokenKind::RBrace {
        indent -= 1;
    }

    indent.max(0) as usize
}

/// The indent stack maintained while scanning a token stream.
#[derive(Debug, Default)]
pub struct IndentStack<'t> {
    entries: Vec<&'t Token>,
}

impl<'t> IndentStack<'t> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn kinds(&self) -> Vec<TokenKind> {
        self.entries.iter().map(|t| t.kind).collect()
    }

    fn top_kind(&self) -> Option<TokenKind> {
        self.entries.last().map(|t| t.kind)
    }

    pub fn level(&self, starting_new_statement: bool, next: TokenKind) -> usize {
        indent_level(&self.kinds(), starting_new_statement, next)
    }

    /// Update the stack for a significant token.
    ///
    /// `next_significant` is the kind of the following significant token; an
    /// `if` ended by `;` only unwinds the statement when no `else` follows.
    pub fn apply(&mut self, token: &'t Token, next_significant: TokenKind) -> Result<(), FormatError> {
        match token.kind {
            TokenKind::Semicolon => {
                while let Some(top) = self.top_kind() {
                    if top == TokenKind::LBrace {
                        break;
                    }
                    self.entries.pop();
                    if top == TokenKind::If && next_significant == TokenKind::Else {
                        break;
                    }
                }
            }
            TokenKind::LBrace => self.entries.push(token),
            TokenKind::RBrace => {
                if self.top_kind() != Some(TokenKind::LBrace) {
                    trace!("unbalanced brace at {}", token.start);
                    return Err(FormatError::UnbalancedBrace { offset: token.start });
                }
                self.entries.pop();
                while let Some(top) = self.top_kind() {
                    if top == TokenKind::LBrace {
                        break;
                    }
                    self.entries.pop();
                }
            }
            TokenKind::If => {
                if self.top_kind() == Some(TokenKind::Else) {
                    self.entries.pop();
                }
                self.entries.push(token);
            }
            TokenKind::Do | TokenKind::While | TokenKind::For | TokenKind::Conditional => {
                self.entries.push(token);
            }
            TokenKind::Else => {
                if self.top_kind() == Some(TokenKind::Conditional) {
                    self.entries.pop();
                } else {
                    self.entries.push(token);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    #[test]
    fn test_empty_stack() {
        assert_eq!(indent_level(&[], true, Identifier), 0);
        assert_eq!(indent_level(&[], false, Identifier), 1);
        assert_eq!(indent_level(&[], true, RBrace), 0);
    }

    #[test]
    fn test_control_flow_with_brace_counts_once() {
        assert_eq!(indent_level(&[If, LBrace], true, Identifier), 1);
        assert_eq!(indent_level(&[LBrace, LBrace], true, Identifier), 2);
    }

    #[test]
    fn test_outdent_before_brace_after_control_flow() {
        assert_eq!(indent_level(&[If], false, LBrace), 0);
        assert_eq!(indent_level(&[If], false, Identifier), 1);
        assert_eq!(indent_level(&[LBrace, For], false, LBrace), 1);
    }

    #[test]
    fn test_continuation_line() {
        assert_eq!(indent_level(&[LBrace], false, Identifier), 2);
        assert_eq!(indent_level(&[If], false, Identifier), 1);
    }

    #[test]
    fn test_conditional_adds_nothing() {
        assert_eq!(indent_level(&[LBrace, Conditional], false, Identifier), 2);
        assert_eq!(indent_level(&[Conditional], true, Identifier), 0);
    }

    #[test]
    fn test_never_negative() {
        assert_eq!(indent_level(&[], true, RBrace), 0);
        assert_eq!(indent_level(&[], false, LBrace), 0);
    }

    #[test]
    fn test_semicolon_keeps_if_when_else_follows() {
        let tokens = [Token::new(LBrace, "{", 0), Token::new(If, "if", 1), Token::new(Semicolon, ";", 9)];
        let mut stack = IndentStack::new();
        stack.apply(&tokens[0], If).unwrap();
        stack.apply(&tokens[1], LParen).unwrap();
        stack.apply(&tokens[2], Else).unwrap();
        assert_eq!(stack.kinds(), vec![LBrace]);
    }

    #[test]
    fn test_unbalanced_brace() {
        let token = Token::new(RBrace, "}", 7);
        let mut stack = IndentStack::new();
        assert_eq!(stack.apply(&token, Eof), Err(FormatError::UnbalancedBrace { offset: 7 }));
    }

    #[test]
    fn test_else_completes_conditional() {
        let tokens = [Token::new(Conditional, "?", 0), Token::new(Else, "else", 2)];
        let mut stack = IndentStack::new();
        stack.apply(&tokens[0], Number).unwrap();
        stack.apply(&tokens[1], Number).unwrap();
        assert_eq!(stack.depth(), 0);
    }
}
