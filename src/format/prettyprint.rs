//! Whitespace-only reindentation.
//!
//! Every non-whitespace token is emitted verbatim. Whitespace runs that
//! contain line breaks are replaced by the same number of line breaks
//! followed by the indent computed from the open block structure.

use tracing::debug;

use super::indent::IndentStack;
use super::FormatOptions;
use crate::errors::FormatError;
use crate::script::token::{Token, TokenKind};

/// Number of line breaks in a whitespace run.
///
/// `\r\n` and `\n\r` pairs count once, as does the Unicode paragraph separator.
pub fn count_line_breaks(text: &str) -> usize {
    let mut count = 0;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                count += 1;
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' => {
                count += 1;
                if chars.peek() == Some(&'\r') {
                    chars.next();
                }
            }
            '\u{2029}' => count += 1,
            _ => {}
        }
    }
    count
}

fn next_significant(tokens: &[Token], from: usize) -> TokenKind {
    tokens[from..]
        .iter()
        .find(|t| t.is_significant())
        .map(|t| t.kind)
        .unwrap_or(TokenKind::Eof)
}

/// Reindent a token stream, leaving all other text untouched.
pub fn prettyprint(tokens: &[Token], options: &FormatOptions) -> Result<String, FormatError> {
    let mut out = String::new();
    let mut stack = IndentStack::new();
    let mut starting_new_statement = true;

    for (index, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Eof => break,
            TokenKind::Bad => return Err(FormatError::BadToken { offset: token.start }),
            TokenKind::Whitespace => {
                let breaks = count_line_breaks(&token.text);
                if breaks == 0 {
                    // Leading horizontal whitespace is dropped
                    if index > 0 {
                        out.push_str(&token.text);
                    }
                    continue;
                }
                let next = tokens.get(index + 1).map(|t| t.kind).unwrap_or(TokenKind::Eof);
                // The end of the script carries no indent
                let level = match next {
                    TokenKind::Eof => 0,
                    _ => stack.level(starting_new_statement, next),
                };
                for _ in 0..breaks {
                    out.push('\n');
                    for _ in 0..level {
                        out.push_str(&options.indent);
                    }
                }
            }
            TokenKind::Comment | TokenKind::CommentLong => out.push_str(&token.text),
            _ => {
                stack.apply(token, next_significant(tokens, index + 1))?;
                out.push_str(&token.text);
                starting_new_statement = matches!(
                    token.kind,
                    TokenKind::Semicolon | TokenKind::LBrace | TokenKind::RBrace
                );
            }
        }
    }

    debug!("prettyprinted {} tokens into {} bytes", tokens.len(), out.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::lexer::tokenize;

    fn pretty(source: &str) -> String {
        prettyprint(&tokenize(source), &FormatOptions::default()).unwrap()
    }

    #[test]
    fn test_count_line_breaks() {
        assert_eq!(count_line_breaks("  "), 0);
        assert_eq!(count_line_breaks("\n\n"), 2);
        assert_eq!(count_line_breaks("\r\n"), 1);
        assert_eq!(count_line_breaks("\n\r"), 1);
        assert_eq!(count_line_breaks("\r\n\r\n"), 2);
        assert_eq!(count_line_breaks("\u{2029}"), 1);
    }

    #[test]
    fn test_block_body_is_indented() {
        assert_eq!(pretty("{\nx = 1;\n}\n"), "{\n\tx = 1;\n}\n");
    }

    #[test]
    fn test_brace_on_its_own_line_after_if() {
        let source = "if (x)\n{\ny = 1;\n}\nelse\n{\ny = 2;\n}\n";
        assert_eq!(pretty(source), "if (x)\n{\n\ty = 1;\n}\nelse\n{\n\ty = 2;\n}\n");
    }

    #[test]
    fn test_braceless_if_body() {
        assert_eq!(pretty("if (x)\ny = 1;\nz = 2;"), "if (x)\n\ty = 1;\nz = 2;");
    }

    #[test]
    fn test_continuation_line() {
        assert_eq!(pretty("{\nx = 1 +\n2;\n}"), "{\n\tx = 1 +\n\t\t2;\n}");
    }

    #[test]
    fn test_existing_indent_is_replaced() {
        assert_eq!(pretty("{\n        x = 1;\n  }"), "{\n\tx = 1;\n}");
    }

    #[test]
    fn test_blank_lines_are_kept() {
        assert_eq!(pretty("{\nx = 1;\n\n\ny = 2;\n}"), "{\n\tx = 1;\n\t\n\t\n\ty = 2;\n}");
    }

    #[test]
    fn test_blank_line_takes_the_indent_of_the_next_line() {
        assert_eq!(pretty("{\nx = 1;\n\ny = 2;\n}"), "{\n\tx = 1;\n\t\n\ty = 2;\n}");
        assert_eq!(pretty("x = 1;\n\ny = 2;\n"), "x = 1;\n\ny = 2;\n");
        assert_eq!(pretty("{\n{\nx;\n\n}\n}"), "{\n\t{\n\t\tx;\n\t\n\t}\n}");
    }

    #[test]
    fn test_comments_are_verbatim() {
        assert_eq!(pretty("{\n// note\nx = 1; /* a */\n}"), "{\n\t// note\n\tx = 1; /* a */\n}");
    }

    #[test]
    fn test_leading_spaces_dropped() {
        assert_eq!(pretty("   x = 1;"), "x = 1;");
    }

    #[test]
    fn test_custom_indent_unit() {
        let options = FormatOptions { indent: "    ".to_string() };
        let out = prettyprint(&tokenize("{\n{\nx;\n}\n}"), &options).unwrap();
        assert_eq!(out, "{\n    {\n        x;\n    }\n}");
    }

    #[test]
    fn test_unbalanced_brace_is_an_error() {
        let err = prettyprint(&tokenize("x = 1;\n}"), &FormatOptions::default()).unwrap_err();
        assert_eq!(err, FormatError::UnbalancedBrace { offset: 7 });
    }

    #[test]
    fn test_bad_token_is_an_error() {
        let err = prettyprint(&tokenize("x = @;"), &FormatOptions::default()).unwrap_err();
        assert_eq!(err, FormatError::BadToken { offset: 4 });
    }
}
