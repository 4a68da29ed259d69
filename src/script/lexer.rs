//! Lexical analysis for Eidos script text using logos.
//!
//! Tokenization never fails: anything that cannot be lexed becomes a `Bad`
//! token, whitespace and comments are kept, and the stream always ends with
//! an `Eof` token positioned at the end of the input.
//!
//! ```
//! use eidos_assist::script::lexer::tokenize;
//! use eidos_assist::script::token::TokenKind;
//!
//! let tokens = tokenize("x = 1;");
//! assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
//! ```

use logos::{Lexer, Logos};
use tracing::trace;

use super::token::{Token, TokenKind};

/// Whether a string or block comment found its closing delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closure {
    Closed,
    Open,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum RawToken {
    #[regex(r"[ \t\r\n\x{2029}]+")]
    Whitespace,

    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(".")]
    Dot,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("%")]
    Mod,
    #[token("*")]
    Mult,
    #[token("^")]
    Exp,
    #[token("&")]
    And,
    #[token("|")]
    Or,
    #[token("/")]
    Div,
    #[token("?")]
    Conditional,
    #[token("=")]
    Assign,
    #[token("==")]
    Eq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("!")]
    Not,
    #[token("!=")]
    NotEq,
    #[token("$")]
    Singleton,

    #[regex(r"//[^\n\r\x{2029}]*")]
    Comment,
    #[token("/*", block_comment)]
    CommentLong(Closure),

    #[regex(r"[0-9]+(\.[0-9]*)?([eE][-+]?[0-9]+)?")]
    Number,

    #[regex(r#""([^"\\\n\r]|\\[^\n\r])*""#)]
    #[regex(r#"'([^'\\\n\r]|\\[^\n\r])*'"#)]
    String,

    /// A string cut off by a line break or the end of input
    #[regex(r#""([^"\\\n\r]|\\[^\n\r])*"#)]
    #[regex(r#"'([^'\\\n\r]|\\[^\n\r])*"#)]
    OpenString,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Word,
}

/// Consumes a block comment body, honouring nested `/* */` pairs.
fn block_comment(lex: &mut Lexer<RawToken>) -> Closure {
    let rest = lex.remainder().as_bytes();
    let mut depth = 1usize;
    let mut i = 0;
    while i < rest.len() {
        if rest[i..].starts_with(b"/*") {
            depth += 1;
            i += 2;
        } else if rest[i..].starts_with(b"*/") {
            depth -= 1;
            i += 2;
            if depth == 0 {
                lex.bump(i);
                return Closure::Closed;
            }
        } else {
            i += 1;
        }
    }
    lex.bump(rest.len());
    Closure::Open
}

impl RawToken {
    fn kind(self, text: &str) -> TokenKind {
        match self {
            RawToken::Whitespace => TokenKind::Whitespace,
            RawToken::Semicolon => TokenKind::Semicolon,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Comma => TokenKind::Comma,
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::Dot => TokenKind::Dot,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Mod => TokenKind::Mod,
            RawToken::Mult => TokenKind::Mult,
            RawToken::Exp => TokenKind::Exp,
            RawToken::And => TokenKind::And,
            RawToken::Or => TokenKind::Or,
            RawToken::Div => TokenKind::Div,
            RawToken::Conditional => TokenKind::Conditional,
            RawToken::Assign => TokenKind::Assign,
            RawToken::Eq => TokenKind::Eq,
            RawToken::Lt => TokenKind::Lt,
            RawToken::LtEq => TokenKind::LtEq,
            RawToken::Gt => TokenKind::Gt,
            RawToken::GtEq => TokenKind::GtEq,
            RawToken::Not => TokenKind::Not,
            RawToken::NotEq => TokenKind::NotEq,
            RawToken::Singleton => TokenKind::Singleton,
            RawToken::Comment => TokenKind::Comment,
            RawToken::CommentLong(Closure::Closed) => TokenKind::CommentLong,
            RawToken::CommentLong(Closure::Open) => TokenKind::Bad,
            RawToken::Number => TokenKind::Number,
            RawToken::String => TokenKind::String,
            RawToken::OpenString => TokenKind::Bad,
            RawToken::Word => TokenKind::keyword(text).unwrap_or(TokenKind::Identifier),
        }
    }
}

/// Tokenize Eidos source text.
///
/// Adjacent unlexable characters are merged into a single `Bad` token.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut lexer = RawToken::lexer(source);
    let mut tokens: Vec<Token> = Vec::new();

    while let Some(result) = lexer.next() {
        let kind = match result {
            Ok(raw) => raw.kind(lexer.slice()),
            Err(()) => {
                // Keep error spans on character boundaries
                let mut end = lexer.span().end;
                while end < source.len() && !source.is_char_boundary(end) {
                    end += 1;
                }
                lexer.bump(end - lexer.span().end);
                TokenKind::Bad
            }
        };
        let span = lexer.span();

        if kind == TokenKind::Bad {
            if let Some(last) = tokens.last_mut() {
                if last.kind == TokenKind::Bad && last.end == span.start {
                    last.text.push_str(&source[span.clone()]);
                    last.end = span.end;
                    continue;
                }
            }
        }
        tokens.push(Token::new(kind, &source[span.clone()], span.start));
    }

    tokens.push(Token::new(TokenKind::Eof, "", source.len()));
    trace!("tokenized {} bytes into {} tokens", source.len(), tokens.len());
    tokens
}

/// True when the stream contains no `Bad` token.
pub fn is_clean(tokens: &[Token]) -> bool {
    tokens.iter().all(|t| t.kind != TokenKind::Bad)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_statement_tokens() {
        use TokenKind::*;
        assert_eq!(
            kinds("x = c(1, 2.5e3);"),
            vec![
                Identifier, Whitespace, Assign, Whitespace, Identifier, LParen, Number, Comma,
                Whitespace, Number, RParen, Semicolon, Eof
            ]
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        use TokenKind::*;
        assert_eq!(kinds("if iffy"), vec![If, Whitespace, Identifier, Eof]);
        assert_eq!(kinds("function"), vec![Function, Eof]);
    }

    #[test]
    fn test_two_character_operators() {
        use TokenKind::*;
        assert_eq!(
            kinds("a<=b!=c==d>=e"),
            vec![Identifier, LtEq, Identifier, NotEq, Identifier, Eq, Identifier, GtEq, Identifier, Eof]
        );
    }

    #[test]
    fn test_strings_keep_raw_text() {
        let tokens = tokenize(r#"'a\'b' "c""#);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, r"'a\'b'");
        assert_eq!(tokens[2].text, "\"c\"");
    }

    #[test]
    fn test_unterminated_string_is_bad() {
        let tokens = tokenize("x = \"abc\ny");
        assert_eq!(tokens[4].kind, TokenKind::Bad);
        assert_eq!(tokens[4].text, "\"abc");
        assert_eq!(tokens[6].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_nested_block_comment() {
        let tokens = tokenize("/* a /* b */ c */x");
        assert_eq!(tokens[0].kind, TokenKind::CommentLong);
        assert_eq!(tokens[0].text, "/* a /* b */ c */");
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_unterminated_block_comment_is_bad() {
        let tokens = tokenize("x /* never closed");
        assert_eq!(tokens[2].kind, TokenKind::Bad);
        assert_eq!(tokens[2].end, 17);
        assert!(!is_clean(&tokens));
    }

    #[test]
    fn test_line_comment_stops_at_newline() {
        use TokenKind::*;
        assert_eq!(kinds("// note\nx"), vec![Comment, Whitespace, Identifier, Eof]);
    }

    #[test]
    fn test_bad_characters_merge() {
        let tokens = tokenize("x @#é y");
        assert_eq!(tokens[2].kind, TokenKind::Bad);
        assert_eq!(tokens[2].text, "@#é");
        assert_eq!(tokens[4].text, "y");
    }

    #[test]
    fn test_eof_offset() {
        let tokens = tokenize("abc ");
        let eof = tokens.last().unwrap();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.start, 4);
        assert!(eof.is_empty());
    }
}
