//! Ranking and sorting of completion candidates
//!
//! Each candidate is scored by walking the typed prefix one character at a
//! time and greedily matching it against the candidate, starting after the
//! previous match:
//!
//! 1. An uppercase prefix character must match an uppercase candidate
//!    character (the first prefix character matches case-insensitively)
//! 2. A lowercase prefix character prefers the very next candidate character
//!    (contiguous), then an uppercase occurrence (a camel-case jump), then any
//!    later occurrence, which is refused for the first prefix character
//! 3. A match at position zero earns a flat bonus; later matches cost a
//!    penalty proportional to their position
//!
//! A prefix character that cannot be matched removes the candidate. Argument
//! name completions, which end in `=`, outrank everything else.

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Criteria for ranking completion candidates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingCriteria {
    /// Bonus for a match at candidate position zero (default: 100000)
    pub first_position_bonus: i64,

    /// Bonus for a match right after the previous one (default: 10000)
    pub contiguous_bonus: i64,

    /// Bonus for a lowercase prefix character matching an uppercase one (default: 1000)
    pub camel_case_bonus: i64,

    /// Penalty per candidate position of a match (default: 10)
    pub offset_penalty: i64,

    /// Bonus for argument name candidates (default: 1000000000)
    /// Must dominate every other term so that argument names come first
    pub argument_name_bonus: i64,

    /// Maximum results to return (default: 100)
    pub max_results: usize,
}

impl Default for RankingCriteria {
    fn default() -> Self {
        Self {
            first_position_bonus: 100_000,
            contiguous_bonus: 10_000,
            camel_case_bonus: 1_000,
            offset_penalty: 10,
            argument_name_bonus: 1_000_000_000,
            max_results: 100,
        }
    }
}

impl RankingCriteria {
    /// Default weights with no limit on the number of results
    pub fn unlimited() -> Self {
        Self { max_results: usize::MAX, ..Self::default() }
    }
}

/// A candidate with its computed score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionCandidate {
    pub text: String,
    pub score: i64,
}

/// Rank candidates against a prefix
///
/// # Arguments
/// * `candidates` - Candidate texts in their gathering order
/// * `prefix` - The partially typed word
/// * `criteria` - Ranking weights
///
/// # Returns
/// Matching candidates, best first, limited to `max_results`. Candidates
/// with equal scores keep their input order.
pub fn rank(candidates: &[String], prefix: &str, criteria: &RankingCriteria) -> Vec<String> {
    score_candidates(candidates, prefix, criteria)
        .into_iter()
        .map(|candidate| candidate.text)
        .collect()
}

/// Like [`rank`], keeping the scores.
pub fn score_candidates(
    candidates: &[String],
    prefix: &str,
    criteria: &RankingCriteria,
) -> Vec<CompletionCandidate> {
    let mut scored: Vec<CompletionCandidate> = candidates
        .iter()
        .filter_map(|text| {
            score(text, prefix, criteria).map(|score| CompletionCandidate { text: text.clone(), score })
        })
        .collect();

    // `sort_by` is stable
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(criteria.max_results);

    trace!("ranked {} of {} candidates for {:?}", scored.len(), candidates.len(), prefix);
    scored
}

/// Score one candidate, or `None` when the prefix cannot be matched.
pub fn score(candidate: &str, prefix: &str, criteria: &RankingCriteria) -> Option<i64> {
    let chars: Vec<char> = candidate.chars().collect();
    let mut total: i64 = 0;
    let mut from = 0;

    for (index, wanted) in prefix.chars().enumerate() {
        let first = index == 0;
        let (position, bonus) = if wanted.is_uppercase() {
            let position = (from..chars.len()).find(|&i| {
                if first {
                    chars[i].to_lowercase().eq(wanted.to_lowercase())
                } else {
                    chars[i] == wanted
                }
            })?;
            let bonus = if position == from { criteria.contiguous_bonus } else { criteria.camel_case_bonus };
            (position, bonus)
        } else {
            match_lowercase(&chars, from, wanted, first, criteria)?
        };

        total += bonus;
        if position == 0 {
            total += criteria.first_position_bonus;
        } else {
            total -= criteria.offset_penalty * position as i64;
        }
        from = position + 1;
    }

    if candidate.ends_with('=') {
        total += criteria.argument_name_bonus;
    }
    Some(total)
}

fn match_lowercase(
    chars: &[char],
    from: usize,
    wanted: char,
    first: bool,
    criteria: &RankingCriteria,
) -> Option<(usize, i64)> {
    let contiguous = chars.get(from).is_some_and(|&c| {
        if first {
            c.to_lowercase().eq(wanted.to_lowercase())
        } else {
            c == wanted
        }
    });
    if contiguous {
        return Some((from, criteria.contiguous_bonus));
    }

    let upper: Vec<char> = wanted.to_uppercase().collect();
    if upper.len() == 1 && upper[0] != wanted {
        if let Some(position) = (from..chars.len()).find(|&i| chars[i] == upper[0]) {
            return Some((position, criteria.camel_case_bonus));
        }
    }

    if first {
        return None;
    }
    (from..chars.len()).find(|&i| chars[i] == wanted).map(|position| (position, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_rank_camel_case_jump() {
        let candidates = names(&["initializeRecombinationRate", "initializeTreeSeq"]);
        let ranked = rank(&candidates, "iTr", &RankingCriteria::default());
        assert_eq!(ranked.first().map(String::as_str), Some("initializeTreeSeq"));
        let tree = ranked.iter().position(|c| c == "initializeTreeSeq");
        let recombination = ranked.iter().position(|c| c == "initializeRecombinationRate");
        assert!(recombination.is_none() || tree < recombination);
    }

    #[test]
    fn test_rank_contiguous_prefix_first() {
        let candidates = names(&["subsetIndividuals", "size"]);
        let ranked = rank(&candidates, "si", &RankingCriteria::default());
        assert_eq!(ranked, names(&["size", "subsetIndividuals"]));
    }

    #[test]
    fn test_rank_removes_unmatched() {
        let candidates = names(&["sim", "community", "max"]);
        assert_eq!(rank(&candidates, "x", &RankingCriteria::default()), Vec::<String>::new());
        assert_eq!(rank(&candidates, "co", &RankingCriteria::default()), names(&["community"]));
    }

    #[test]
    fn test_first_character_is_case_insensitive() {
        let criteria = RankingCriteria::default();
        assert!(score("Individual", "i", &criteria).is_some());
        assert!(score("individual", "I", &criteria).is_some());
        // Later uppercase characters must match uppercase
        assert!(score("subpopulation", "sP", &criteria).is_none());
        assert!(score("subPopulation", "sP", &criteria).is_some());
    }

    #[test]
    fn test_settle_match_needs_earlier_match() {
        let criteria = RankingCriteria::default();
        assert!(score("ab", "b", &criteria).is_none());
        assert!(score("axb", "ab", &criteria).is_some());
    }

    #[test]
    fn test_argument_names_come_first() {
        let candidates = names(&["size", "sexRatio=", "sample"]);
        let ranked = rank(&candidates, "s", &RankingCriteria::default());
        assert_eq!(ranked[0], "sexRatio=");
    }

    #[test]
    fn test_empty_prefix_keeps_order() {
        let candidates = names(&["b", "a", "c"]);
        assert_eq!(rank(&candidates, "", &RankingCriteria::default()), candidates);
    }

    #[test]
    fn test_max_results() {
        let candidates = names(&["aa", "ab", "ac"]);
        let criteria = RankingCriteria { max_results: 2, ..RankingCriteria::default() };
        assert_eq!(rank(&candidates, "a", &criteria).len(), 2);
    }

    #[test]
    fn test_scores_are_deterministic() {
        let criteria = RankingCriteria::default();
        let a = score("initializeMutationRate", "iMR", &criteria);
        let b = score("initializeMutationRate", "iMR", &criteria);
        assert_eq!(a, b);
        assert!(a.is_some());
    }
}
