//! Completion site detection
//!
//! The last token before the cursor decides whether completion is offered,
//! which text it replaces, and whether it completes a member after a `.`.

use tracing::trace;

use crate::script::token::{Token, TokenKind};

/// Where and how a completion applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSite {
    /// Byte offset of the replaced text
    pub start: usize,
    /// Length of the replaced text; zero inserts at the cursor
    pub len: usize,
    /// The partially typed word being replaced
    pub prefix: String,
    /// Index of the `.` token when completing a member
    pub member_of: Option<usize>,
    /// Index of the first token at or after `start`
    pub token_index: usize,
}

impl CompletionSite {
    fn insert_at(cursor: usize, token_index: usize) -> Self {
        Self { start: cursor, len: 0, prefix: String::new(), member_of: None, token_index }
    }

    pub fn range(&self) -> (usize, usize) {
        (self.start, self.len)
    }
}

fn previous_significant(tokens: &[Token], before: usize) -> Option<usize> {
    tokens[..before].iter().rposition(|t| t.is_significant())
}

/// Whether the `)` at `close` ends the header of an `if`, `while` or `for`.
fn closes_control_header(tokens: &[Token], close: usize) -> bool {
    let mut depth = 0usize;
    for (index, token) in tokens[..=close].iter().enumerate().rev() {
        match token.kind {
            TokenKind::RParen => depth += 1,
            TokenKind::LParen => {
                depth -= 1;
                if depth == 0 {
                    return previous_significant(tokens, index).is_some_and(|i| {
                        matches!(tokens[i].kind, TokenKind::If | TokenKind::While | TokenKind::For)
                    });
                }
            }
            _ => {}
        }
    }
    false
}

/// Decide the completion site for `tokens`, the lexed text up to `cursor`.
///
/// Returns `None` where nothing can be completed: inside or right after a
/// string, comment, number or invalid token, after `]`, after a `)` that
/// does not close a control-flow header, and after whitespace that follows
/// an operand.
pub fn completion_site(tokens: &[Token], cursor: usize) -> Option<CompletionSite> {
    let end = tokens.iter().rposition(|t| t.kind != TokenKind::Eof).map(|i| i + 1).unwrap_or(0);
    let Some(last_index) = end.checked_sub(1) else {
        return Some(CompletionSite::insert_at(cursor, 0));
    };
    let last = &tokens[last_index];

    let site = match last.kind {
        kind if kind.is_word() => {
            let member_of = previous_significant(tokens, last_index).filter(|&i| tokens[i].kind == TokenKind::Dot);
            Some(CompletionSite {
                start: last.start,
                len: last.len(),
                prefix: last.text.clone(),
                member_of,
                token_index: last_index,
            })
        }
        TokenKind::Dot => Some(CompletionSite { member_of: Some(last_index), ..CompletionSite::insert_at(cursor, end) }),
        TokenKind::String
        | TokenKind::Number
        | TokenKind::Comment
        | TokenKind::CommentLong
        | TokenKind::Bad
        | TokenKind::RBracket => None,
        TokenKind::RParen => closes_control_header(tokens, last_index).then(|| CompletionSite::insert_at(cursor, end)),
        TokenKind::Whitespace => {
            let after_operand = previous_significant(tokens, last_index).is_some_and(|i| match tokens[i].kind {
                TokenKind::Identifier | TokenKind::Number | TokenKind::String | TokenKind::RBracket => true,
                TokenKind::RParen => !closes_control_header(tokens, i),
                _ => false,
            });
            (!after_operand).then(|| CompletionSite::insert_at(cursor, end))
        }
        _ => Some(CompletionSite::insert_at(cursor, end)),
    };

    trace!("completion site at {}: {:?}", cursor, site);
    site
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::lexer::tokenize;

    fn site(text: &str) -> Option<CompletionSite> {
        completion_site(&tokenize(text), text.len())
    }

    #[test]
    fn test_word_is_replaced() {
        let site = site("x = siz").unwrap();
        assert_eq!(site.range(), (4, 3));
        assert_eq!(site.prefix, "siz");
        assert_eq!(site.member_of, None);

        let keyword = self::site("whi").unwrap();
        assert_eq!(keyword.range(), (0, 3));
    }

    #[test]
    fn test_member_after_dot() {
        let text = "sim.";
        let site = site(text).unwrap();
        assert_eq!(site.range(), (4, 0));
        assert_eq!(site.member_of, Some(1));

        let partial = self::site("sim.sub").unwrap();
        assert_eq!(partial.range(), (4, 3));
        assert_eq!(partial.member_of, Some(1));
    }

    #[test]
    fn test_empty_range_positions() {
        for text in ["", "x = ", "f(", "{", "a;", "x,", "return ", "if (x) ", "if (x)", "c(1, 2) + ", "// note\n"] {
            let site = site(text).unwrap_or_else(|| panic!("expected a site for {text:?}"));
            assert_eq!(site.range(), (text.len(), 0), "{text:?}");
        }
    }

    #[test]
    fn test_no_completion() {
        for text in ["x = \"abc", "x = 'a' ", "x = 12", "// note", "/* open", "x[1]", "f(x)", "foo ", "f(x) ", "x = @"] {
            assert_eq!(site(text), None, "{text:?}");
        }
    }

    #[test]
    fn test_control_headers() {
        assert!(closes_control_header(&tokenize("while (f(x))"), 7));
        assert!(!closes_control_header(&tokenize("while (f(x))"), 6));
        assert!(!closes_control_header(&tokenize("g(f(x))"), 6));
    }
}
