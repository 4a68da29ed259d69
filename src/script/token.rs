//! Token model for Eidos script text
//!
//! Tokens carry their raw source text and byte offsets into the snapshot that
//! was tokenized. Whitespace and comments are real tokens so that formatting
//! and completion can reason about layout.

use std::fmt;

/// Kind of an Eidos token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Text that could not be lexed (stray characters, unterminated strings or comments)
    Bad,
    /// End of input; always the last token of a stream
    Eof,
    Whitespace,

    Semicolon,
    Colon,
    Comma,
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Dot,
    Plus,
    Minus,
    Mod,
    Mult,
    Exp,
    And,
    Or,
    Div,
    /// `?` of the ternary conditional
    Conditional,
    /// `// ...` line comment
    Comment,
    /// `/* ... */` block comment, possibly nested
    CommentLong,
    Assign,
    Eq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Not,
    NotEq,
    /// `$` singleton marker in type specifiers
    Singleton,

    Number,
    String,
    Identifier,

    If,
    Else,
    Do,
    While,
    For,
    In,
    Next,
    Break,
    Return,
    Function,
}

impl TokenKind {
    /// Whitespace, comments and the end marker carry no syntax.
    pub fn is_significant(self) -> bool {
        !matches!(
            self,
            TokenKind::Whitespace | TokenKind::Comment | TokenKind::CommentLong | TokenKind::Eof
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::Comment | TokenKind::CommentLong)
    }

    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::If
                | TokenKind::Else
                | TokenKind::Do
                | TokenKind::While
                | TokenKind::For
                | TokenKind::In
                | TokenKind::Next
                | TokenKind::Break
                | TokenKind::Return
                | TokenKind::Function
        )
    }

    /// Identifiers and keywords: the tokens a completion can extend.
    pub fn is_word(self) -> bool {
        self == TokenKind::Identifier || self.is_keyword()
    }

    /// Tokens after which a `+`, `-` or `(` continues an operand.
    pub fn ends_operand(self) -> bool {
        matches!(
            self,
            TokenKind::Number
                | TokenKind::String
                | TokenKind::Identifier
                | TokenKind::RParen
                | TokenKind::RBracket
        )
    }

    /// Control-flow keywords that open an indentation level.
    pub fn is_control_flow(self) -> bool {
        matches!(
            self,
            TokenKind::If | TokenKind::Else | TokenKind::Do | TokenKind::While | TokenKind::For
        )
    }

    /// Keyword lookup for a word already matched as an identifier.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "do" => TokenKind::Do,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "in" => TokenKind::In,
            "next" => TokenKind::Next,
            "break" => TokenKind::Break,
            "return" => TokenKind::Return,
            "function" => TokenKind::Function,
            _ => return None,
        };
        Some(kind)
    }
}

/// All language keywords, in the order they are offered as completions.
pub const KEYWORDS: &[&str] = &[
    "break", "do", "else", "for", "function", "if", "in", "next", "return", "while",
];

/// A lexed token with its raw text and byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, start: usize) -> Self {
        let text = text.into();
        let end = start + text.len();
        Self { kind, text, start, end }
    }

    pub fn is_significant(&self) -> bool {
        self.kind.is_significant()
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?}) @{}..{}", self.kind, self.text, self.start, self.end)
    }
}

/// Significant tokens of a stream, without the end marker.
pub fn significant(tokens: &[Token]) -> impl Iterator<Item = &Token> {
    tokens.iter().filter(|t| t.is_significant())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(TokenKind::keyword("while"), Some(TokenKind::While));
        assert_eq!(TokenKind::keyword("whileLoop"), None);
        for word in KEYWORDS {
            assert!(TokenKind::keyword(word).is_some(), "{word} should be a keyword");
        }
    }

    #[test]
    fn test_token_span() {
        let token = Token::new(TokenKind::Identifier, "sim", 10);
        assert_eq!(token.end, 13);
        assert_eq!(token.len(), 3);
        assert!(token.is_significant());
        assert!(!Token::new(TokenKind::Comment, "// x", 0).is_significant());
    }
}
