//! Token multiset (bag of words with occurrence counts)

use std::collections::HashMap;

use super::normalize::Token;

/// Occurrence counts per token type.
///
/// Distinct tokens are also kept in first-appearance order so that reports
/// list words in the order a reader meets them. The original token sequence
/// is retained as well.
#[derive(Debug, Clone, Default)]
pub struct TokenMultiset {
    counts: HashMap<Token, usize>,
    order: Vec<Token>,
    tokens: Vec<Token>,
}

impl TokenMultiset {
    /// Build from a normalized token sequence
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        let mut counts: HashMap<Token, usize> = HashMap::with_capacity(tokens.len());
        let mut order = Vec::new();

        for token in &tokens {
            match counts.get_mut(token) {
                Some(count) => *count += 1,
                None => {
                    counts.insert(token.clone(), 1);
                    order.push(token.clone());
                }
            }
        }

        Self {
            counts,
            order,
            tokens,
        }
    }

    /// Occurrences of `token`, zero when absent
    pub fn count(&self, token: &str) -> usize {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Total occurrences (sum of all counts)
    pub fn total(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Distinct tokens with their counts, in first-appearance order
    pub fn iter(&self) -> impl Iterator<Item = (&Token, usize)> + '_ {
        self.order.iter().map(move |token| (token, self.count(token.as_str())))
    }

    /// The token sequence as it appeared in the source
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

impl FromIterator<Token> for TokenMultiset {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self::from_tokens(iter.into_iter().collect())
    }
}
