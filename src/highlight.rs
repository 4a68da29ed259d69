//! Line-by-line syntax classification.
//!
//! Editors highlight one line at a time, top to bottom. Each call returns a
//! [`HighlightCheckpoint`] that the next call passes back, so consecutive
//! lines do not rescan the token stream from the start.

use serde::Serialize;
use tracing::trace;

use crate::script::token::{Token, TokenKind};

/// What a highlighted span is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightCategory {
    Number,
    String,
    Comment,
    Keyword,
    /// Built-in constants, the SLiM globals and entity ids like `p1` or `m2`
    SpecialIdentifier,
}

/// A classified range, relative to the start of its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub len: usize,
    pub category: HighlightCategory,
}

/// Where the next line's scan can resume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightCheckpoint {
    token_index: usize,
}

impl HighlightCheckpoint {
    /// A checkpoint that scans from the first token.
    pub fn start() -> Self {
        Self::default()
    }
}

const SPECIAL_IDENTIFIERS: &[&str] = &["T", "F", "NULL", "PI", "E", "INF", "NAN", "sim", "community"];

/// `p1`, `m2`, `g3`, `i4`, `s5` and the like.
fn is_entity_id(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some('p' | 'm' | 'g' | 'i' | 's'))
        && text.len() >= 2
        && chars.all(|c| c.is_ascii_digit())
}

pub fn category(token: &Token) -> Option<HighlightCategory> {
    match token.kind {
        TokenKind::Number => Some(HighlightCategory::Number),
        TokenKind::String => Some(HighlightCategory::String),
        TokenKind::Comment | TokenKind::CommentLong => Some(HighlightCategory::Comment),
        kind if kind.is_keyword() => Some(HighlightCategory::Keyword),
        TokenKind::Identifier
            if SPECIAL_IDENTIFIERS.contains(&token.text.as_str()) || is_entity_id(&token.text) =>
        {
            Some(HighlightCategory::SpecialIdentifier)
        }
        _ => None,
    }
}

/// Classify the tokens overlapping the line `[line_start, line_start + line_len)`.
///
/// A checkpoint from a line further down than this one is ignored and the
/// scan starts over.
pub fn classify_line(
    tokens: &[Token],
    line_start: usize,
    line_len: usize,
    checkpoint: HighlightCheckpoint,
) -> (Vec<Span>, HighlightCheckpoint) {
    let line_end = line_start + line_len;

    let resumable = checkpoint.token_index <= tokens.len()
        && (checkpoint.token_index == 0 || tokens[checkpoint.token_index - 1].end <= line_start);
    let mut index = if resumable { checkpoint.token_index } else { 0 };

    let mut spans = Vec::new();
    let mut next = HighlightCheckpoint { token_index: index };

    while let Some(token) = tokens.get(index) {
        if token.start >= line_end {
            break;
        }
        if token.end <= line_start {
            next.token_index = index + 1;
            index += 1;
            continue;
        }
        // Tokens running past this line are looked at again on the next one
        if token.end <= line_end {
            next.token_index = index + 1;
        }

        if let Some(category) = category(token) {
            let start = token.start.max(line_start);
            let end = token.end.min(line_end);
            spans.push(Span { start: start - line_start, len: end - start, category });
        }
        index += 1;
    }

    trace!("line at {} has {} spans", line_start, spans.len());
    (spans, next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::lexer::tokenize;

    fn lines(text: &str) -> Vec<(usize, usize)> {
        let mut start = 0;
        text.split_inclusive('\n')
            .map(|line| {
                let range = (start, line.len());
                start += line.len();
                range
            })
            .collect()
    }

    fn classify_all(text: &str) -> Vec<Vec<Span>> {
        let tokens = tokenize(text);
        let mut checkpoint = HighlightCheckpoint::start();
        lines(text)
            .into_iter()
            .map(|(start, len)| {
                let (spans, next) = classify_line(&tokens, start, len, checkpoint);
                checkpoint = next;
                spans
            })
            .collect()
    }

    #[test]
    fn test_categories() {
        let spans = classify_all("if (x == 3) print(\"hi\"); // done\n");
        let categories: Vec<HighlightCategory> = spans[0].iter().map(|s| s.category).collect();
        assert_eq!(
            categories,
            vec![
                HighlightCategory::Keyword,
                HighlightCategory::Number,
                HighlightCategory::String,
                HighlightCategory::Comment,
            ]
        );
        assert_eq!(spans[0][0], Span { start: 0, len: 2, category: HighlightCategory::Keyword });
    }

    #[test]
    fn test_special_identifiers() {
        let spans = classify_all("sim.addSubpop(p1, m22 + T);\nx = p1x + g;\n");
        let texts: Vec<(usize, usize)> = spans[0]
            .iter()
            .filter(|s| s.category == HighlightCategory::SpecialIdentifier)
            .map(|s| (s.start, s.len))
            .collect();
        assert_eq!(texts, vec![(0, 3), (14, 2), (18, 3), (24, 1)]);
        assert!(spans[1].iter().all(|s| s.category != HighlightCategory::SpecialIdentifier));
    }

    #[test]
    fn test_block_comment_spans_lines() {
        let spans = classify_all("x = 1; /* one\ntwo\nthree */ y = 2;\n");
        assert_eq!(spans[0].last().map(|s| (s.start, s.len, s.category)), Some((7, 7, HighlightCategory::Comment)));
        assert_eq!(spans[1], vec![Span { start: 0, len: 4, category: HighlightCategory::Comment }]);
        assert_eq!(spans[2][0], Span { start: 0, len: 8, category: HighlightCategory::Comment });
        assert_eq!(spans[2][1].category, HighlightCategory::Number);
    }

    #[test]
    fn test_checkpoint_matches_fresh_scan() {
        let text = "initialize() {\n\tinitializeMutationRate(1e-7);\n}\n1 early() { sim.addSubpop(\"p1\", 10); }\n";
        let tokens = tokenize(text);
        let incremental = classify_all(text);
        for (line, (start, len)) in lines(text).into_iter().enumerate() {
            let (fresh, _) = classify_line(&tokens, start, len, HighlightCheckpoint::start());
            assert_eq!(fresh, incremental[line], "line {line}");
        }
    }

    #[test]
    fn test_stale_checkpoint_restarts() {
        let text = "a = 1;\nb = 2;\n";
        let tokens = tokenize(text);
        let (_, after_second) = classify_line(&tokens, 7, 7, HighlightCheckpoint::start());
        let (spans, _) = classify_line(&tokens, 0, 7, after_second);
        assert_eq!(spans, vec![Span { start: 4, len: 1, category: HighlightCategory::Number }]);
    }
}
