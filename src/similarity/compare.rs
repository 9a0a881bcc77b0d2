//! Word-frequency comparison
//!
//! Scores a candidate text against a reference by matching token
//! occurrences, ignoring word order. OCR engines often reorder text across
//! columns and lines, so only the counts of each word are compared. A
//! substituted word and a missing word look the same under this model and
//! both end up in `incorrect_word_count`.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::multiset::TokenMultiset;
use super::normalize::{normalize, Token};
use super::{InputError, TextSource};

/// A word together with how many of its occurrences are involved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: Token,
    pub count: usize,
}

/// Degenerate inputs that still produce a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonWarning {
    /// Reference has no tokens; score is defined as 0
    EmptyReference,
    /// Candidate has no tokens
    EmptyCandidate,
}

impl ComparisonWarning {
    pub fn label(&self) -> &'static str {
        match self {
            ComparisonWarning::EmptyReference => "empty reference",
            ComparisonWarning::EmptyCandidate => "empty candidate",
        }
    }
}

/// A missing reference word paired with the closest extra candidate word
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Substitution {
    pub expected: Token,
    pub found: Token,
    /// Normalized Levenshtein similarity (0.0 - 1.0)
    pub similarity: f64,
}

/// Outcome of one comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    similarity_score: f64,
    total_reference_words: usize,
    total_candidate_words: usize,
    correct_words: usize,
    incorrect_word_count: usize,
    missing_words: Vec<WordCount>,
    extra_words: Vec<WordCount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<ComparisonWarning>,
}

impl ComparisonResult {
    /// Percentage of reference word occurrences found in the candidate (0 - 100)
    pub fn similarity_score(&self) -> f64 {
        self.similarity_score
    }

    pub fn total_reference_words(&self) -> usize {
        self.total_reference_words
    }

    pub fn total_candidate_words(&self) -> usize {
        self.total_candidate_words
    }

    pub fn correct_words(&self) -> usize {
        self.correct_words
    }

    /// Reference occurrences not matched (missing or substituted)
    pub fn incorrect_word_count(&self) -> usize {
        self.incorrect_word_count
    }

    /// Reference words not fully accounted for, with multiplicity
    pub fn missing_words(&self) -> &[WordCount] {
        &self.missing_words
    }

    /// Candidate words beyond what the reference contains, with multiplicity
    pub fn extra_words(&self) -> &[WordCount] {
        &self.extra_words
    }

    pub fn warnings(&self) -> &[ComparisonWarning] {
        &self.warnings
    }

    pub fn has_warning(&self, warning: ComparisonWarning) -> bool {
        self.warnings.contains(&warning)
    }

    /// Missing words expanded to one entry per occurrence
    pub fn missing_word_occurrences(&self) -> Vec<&str> {
        expand(&self.missing_words)
    }

    /// Extra words expanded to one entry per occurrence
    pub fn extra_word_occurrences(&self) -> Vec<&str> {
        expand(&self.extra_words)
    }

    pub fn extra_word_count(&self) -> usize {
        self.extra_words.iter().map(|w| w.count).sum()
    }

    /// Pair each missing word with its most similar extra word.
    ///
    /// Diagnostic only: counts and score never depend on it. Pairs below
    /// `min_similarity` are dropped.
    pub fn likely_substitutions(&self, min_similarity: f64) -> Vec<Substitution> {
        self.missing_words
            .iter()
            .filter_map(|missing| {
                self.extra_words
                    .iter()
                    .map(|extra| {
                        let similarity = strsim::normalized_levenshtein(
                            missing.word.as_str(),
                            extra.word.as_str(),
                        );
                        (extra, similarity)
                    })
                    .filter(|(_, similarity)| *similarity >= min_similarity)
                    .max_by(|a, b| a.1.total_cmp(&b.1))
                    .map(|(extra, similarity)| Substitution {
                        expected: missing.word.clone(),
                        found: extra.word.clone(),
                        similarity,
                    })
            })
            .collect()
    }
}

/// Compare candidate text against reference text
pub fn compare(reference: &str, candidate: &str) -> ComparisonResult {
    let reference = TokenMultiset::from_tokens(normalize(reference));
    let candidate = TokenMultiset::from_tokens(normalize(candidate));
    compare_multisets(&reference, &candidate)
}

/// Compare two labelled text sources
pub fn compare_sources(reference: &TextSource, candidate: &TextSource) -> ComparisonResult {
    trace!(
        reference = reference.label(),
        candidate = candidate.label(),
        "comparing text sources"
    );
    compare(reference.content(), candidate.content())
}

/// Compare raw bytes, failing when either side is not UTF-8 text
pub fn compare_bytes(reference: &[u8], candidate: &[u8]) -> Result<ComparisonResult, InputError> {
    let reference = TextSource::from_bytes("reference", reference)?;
    let candidate = TextSource::from_bytes("candidate", candidate)?;
    Ok(compare_sources(&reference, &candidate))
}

/// Compare two prepared multisets
pub fn compare_multisets(reference: &TokenMultiset, candidate: &TokenMultiset) -> ComparisonResult {
    let mut correct_words = 0;
    let mut missing_words = Vec::new();

    for (token, ref_count) in reference.iter() {
        let cand_count = candidate.count(token.as_str());
        correct_words += ref_count.min(cand_count);
        if ref_count > cand_count {
            missing_words.push(WordCount {
                word: token.clone(),
                count: ref_count - cand_count,
            });
        }
    }

    let extra_words = candidate
        .iter()
        .filter_map(|(token, cand_count)| {
            let ref_count = reference.count(token.as_str());
            (cand_count > ref_count).then(|| WordCount {
                word: token.clone(),
                count: cand_count - ref_count,
            })
        })
        .collect();

    let total_reference_words = reference.total();
    let similarity_score = if total_reference_words > 0 {
        round_score(correct_words as f64 / total_reference_words as f64 * 100.0)
    } else {
        0.0
    };

    let mut warnings = Vec::new();
    if reference.is_empty() {
        warnings.push(ComparisonWarning::EmptyReference);
    }
    if candidate.is_empty() {
        warnings.push(ComparisonWarning::EmptyCandidate);
    }

    ComparisonResult {
        similarity_score,
        total_reference_words,
        total_candidate_words: candidate.total(),
        correct_words,
        incorrect_word_count: total_reference_words - correct_words,
        missing_words,
        extra_words,
        warnings,
    }
}

/// Round to three decimals
fn round_score(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}

fn expand(words: &[WordCount]) -> Vec<&str> {
    words
        .iter()
        .flat_map(|w| std::iter::repeat(w.word.as_str()).take(w.count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listed(words: &[WordCount]) -> Vec<(&str, usize)> {
        words.iter().map(|w| (w.word.as_str(), w.count)).collect()
    }

    #[test]
    fn test_exact_match_ignores_case() {
        let result = compare("Invoice Amount Due", "invoice amount due");
        assert_eq!(result.similarity_score(), 100.0);
        assert_eq!(result.correct_words(), 3);
        assert!(result.missing_words().is_empty());
        assert!(result.extra_words().is_empty());
        assert!(result.warnings().is_empty());
    }

    #[test]
    fn test_partial_match() {
        let result = compare("Invoice Amount Due", "Invoice Amount");
        assert_eq!(result.total_reference_words(), 3);
        assert_eq!(result.correct_words(), 2);
        assert_eq!(result.incorrect_word_count(), 1);
        assert!((result.similarity_score() - 66.67).abs() < 0.01);
        assert_eq!(result.missing_word_occurrences(), vec!["due"]);
    }

    #[test]
    fn test_duplicate_handling() {
        let result = compare("cat cat dog", "cat dog dog");
        assert_eq!(result.correct_words(), 2);
        assert_eq!(listed(result.missing_words()), vec![("cat", 1)]);
        assert_eq!(listed(result.extra_words()), vec![("dog", 1)]);
        assert!((result.similarity_score() - 66.67).abs() < 0.01);
    }

    #[test]
    fn test_missing_multiplicity_reported() {
        let result = compare("the the the end", "the end");
        assert_eq!(listed(result.missing_words()), vec![("the", 2)]);
        assert_eq!(result.missing_word_occurrences(), vec!["the", "the"]);
        assert_eq!(result.incorrect_word_count(), 2);
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let result = compare("Hello, World!", "hello world");
        assert_eq!(result.similarity_score(), 100.0);
    }

    #[test]
    fn test_empty_reference_scores_zero() {
        let result = compare("", "anything");
        assert_eq!(result.similarity_score(), 0.0);
        assert_eq!(result.total_reference_words(), 0);
        assert_eq!(result.incorrect_word_count(), 0);
        assert!(result.has_warning(ComparisonWarning::EmptyReference));
        assert_eq!(listed(result.extra_words()), vec![("anything", 1)]);
    }

    #[test]
    fn test_both_empty() {
        let result = compare("  ", "");
        assert_eq!(result.similarity_score(), 0.0);
        assert!(result.has_warning(ComparisonWarning::EmptyReference));
        assert!(result.has_warning(ComparisonWarning::EmptyCandidate));
    }

    #[test]
    fn test_compare_keeps_reference_words_around_comparison_signs() {
        let reference = "Qty < 10 units\nship by friday\nTotal > 500 dollars";
        let result = compare(reference, "qty 500 dollars");
        assert_eq!(result.total_reference_words(), 9);
        assert_eq!(result.correct_words(), 3);
        assert_eq!(result.similarity_score(), 33.333);
        assert_eq!(result.incorrect_word_count(), 6);
    }

    #[test]
    fn test_warning_labels() {
        assert_eq!(ComparisonWarning::EmptyReference.label(), "empty reference");
        assert_eq!(ComparisonWarning::EmptyCandidate.label(), "empty candidate");
    }

    #[test]
    fn test_empty_candidate() {
        let result = compare("one two", "");
        assert_eq!(result.similarity_score(), 0.0);
        assert_eq!(result.incorrect_word_count(), 2);
        assert_eq!(result.warnings(), &[ComparisonWarning::EmptyCandidate]);
    }

    #[test]
    fn test_self_compare_is_full_score() {
        let text = "Total due: $1,250.00 by 15/09/2024";
        assert_eq!(compare(text, text).similarity_score(), 100.0);
    }

    #[test]
    fn test_reference_role_is_asymmetric() {
        let forward = compare("a b c d", "a b");
        let backward = compare("a b", "a b c d");
        assert_eq!(forward.similarity_score(), 50.0);
        assert_eq!(backward.similarity_score(), 100.0);
        assert_eq!(listed(backward.extra_words()), vec![("c", 1), ("d", 1)]);
    }

    #[test]
    fn test_order_insensitive() {
        let result = compare("first second third", "third first second");
        assert_eq!(result.similarity_score(), 100.0);
    }

    #[test]
    fn test_no_partial_credit_for_near_misses() {
        let result = compare("receipt", "reciept");
        assert_eq!(result.correct_words(), 0);
        assert_eq!(result.similarity_score(), 0.0);
    }

    #[test]
    fn test_score_rounded_to_three_decimals() {
        let result = compare("a b c", "a");
        assert_eq!(result.similarity_score(), 33.333);
    }

    #[test]
    fn test_compare_bytes_rejects_invalid_utf8() {
        let err = compare_bytes(b"valid", &[0x66, 0x6f, 0xff]).unwrap_err();
        match err {
            InputError::InvalidUtf8 { label, offset } => {
                assert_eq!(label, "candidate");
                assert_eq!(offset, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_compare_bytes_valid() {
        let result = compare_bytes(b"Amount Due", b"amount due").unwrap();
        assert_eq!(result.similarity_score(), 100.0);
    }

    #[test]
    fn test_likely_substitutions() {
        let result = compare("total receipt amount", "total reciept amount xyz");
        let subs = result.likely_substitutions(0.5);
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].expected.as_str(), "receipt");
        assert_eq!(subs[0].found.as_str(), "reciept");
        assert!(subs[0].similarity > 0.7);
        // diagnostics leave the score untouched
        assert!((result.similarity_score() - 66.667).abs() < 1e-9);
    }

    #[test]
    fn test_likely_substitutions_threshold() {
        let result = compare("invoice", "zebra");
        assert!(result.likely_substitutions(0.6).is_empty());
    }

    #[test]
    fn test_result_serializes_stable_field_names() {
        let result = compare("cat cat dog", "cat dog dog");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["total_reference_words"], 3);
        assert_eq!(json["correct_words"], 2);
        assert_eq!(json["incorrect_word_count"], 1);
        assert_eq!(json["missing_words"][0]["word"], "cat");
        assert_eq!(json["extra_words"][0]["count"], 1);
        assert!(json.get("warnings").is_none());
    }
}
