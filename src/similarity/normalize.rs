//! Text normalization
//!
//! Turns raw text into the canonical token sequence used for scoring.
//! The policy is fixed:
//! - HTML tags and entities are replaced by whitespace; a tag must start
//!   with a letter right after `<` and stay on one line, so comparison
//!   signs like `Qty < 10` are plain separators
//! - text is lowercased
//! - every character that is neither alphanumeric nor one of
//!   [`PRESERVED_SYMBOLS`] separates tokens, hyphens and apostrophes
//!   included (`co-op` gives `co`, `op`)
//! - empty tokens are dropped

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::{Borrow, Cow};
use std::fmt;
use std::sync::LazyLock;

/// Symbols kept inside tokens so amounts and identifiers like `$500`,
/// `#123` or `20%` survive as one word.
pub const PRESERVED_SYMBOLS: &[char] = &['$', '#', '@', '%', '₹', '€', '£', '¥'];

static HTML_MARKUP: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"</?[A-Za-z][A-Za-z0-9-]*(?:[ \t][^<>\n]*)?/?>|&[a-zA-Z]+;|&#\d+;").ok()
});

/// A normalized word
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Token text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Token {
    fn borrow(&self) -> &str {
        &self.0
    }
}

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || PRESERVED_SYMBOLS.contains(&c)
}

/// Normalize text into an ordered token sequence.
///
/// Empty or whitespace-only input gives an empty sequence.
pub fn normalize(text: &str) -> Vec<Token> {
    let lowered = strip_markup(text).to_lowercase();
    lowered
        .split(|c: char| !is_token_char(c))
        .filter(|word| !word.is_empty())
        .map(|word| Token(word.to_owned()))
        .collect()
}

/// Render tokens back to text, one space between tokens
pub fn normalize_to_text(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(Token::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_markup(text: &str) -> Cow<'_, str> {
    match HTML_MARKUP.as_ref() {
        Some(re) => re.replace_all(text, " "),
        None => Cow::Borrowed(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        normalize(text).into_iter().map(Token::into_string).collect()
    }

    #[test]
    fn test_lowercases_and_strips_punctuation() {
        assert_eq!(words("Hello, World!"), vec!["hello", "world"]);
        assert_eq!(words("INVOICE: No. 42."), vec!["invoice", "no", "42"]);
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert!(normalize("").is_empty());
        assert!(normalize("   \n\t  ").is_empty());
        assert!(normalize("... -- !!").is_empty());
    }

    #[test]
    fn test_hyphen_and_apostrophe_split_words() {
        assert_eq!(words("co-operate"), vec!["co", "operate"]);
        assert_eq!(words("don't"), vec!["don", "t"]);
        assert_eq!(words("INV-10234"), vec!["inv", "10234"]);
    }

    #[test]
    fn test_preserved_symbols() {
        assert_eq!(words("Total: $500 (20%)"), vec!["total", "$500", "20%"]);
        assert_eq!(words("Ref #123 @acme €40"), vec!["ref", "#123", "@acme", "€40"]);
    }

    #[test]
    fn test_html_markup_removed() {
        assert_eq!(words("<b>Amount</b>&nbsp;Due"), vec!["amount", "due"]);
        assert_eq!(words("a&#160;b<br/>c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_comparison_signs_are_not_markup() {
        assert_eq!(words("a < b and c > d"), vec!["a", "b", "and", "c", "d"]);
        assert_eq!(words("<b>x</b>"), vec!["x"]);
        assert_eq!(words("<p class=\"total\">Sum</p>"), vec!["sum"]);
    }

    #[test]
    fn test_words_between_brackets_across_lines_kept() {
        let tokens = normalize("Qty < 10 units\nship by friday\nTotal > 500 dollars");
        assert_eq!(
            normalize_to_text(&tokens),
            "qty 10 units ship by friday total 500 dollars"
        );
    }

    #[test]
    fn test_unicode_letters_kept() {
        assert_eq!(words("Straße ÉTÉ"), vec!["straße", "été"]);
    }

    #[test]
    fn test_deterministic() {
        let text = "Same input, same tokens.";
        assert_eq!(normalize(text), normalize(text));
    }

    #[test]
    fn test_normalize_to_text() {
        let tokens = normalize("  Line one\nLINE two ");
        assert_eq!(normalize_to_text(&tokens), "line one line two");
        assert_eq!(normalize_to_text(&[]), "");
    }

    #[test]
    fn test_idempotent_on_sample() {
        let first = normalize("<p>Café &amp; Bar -- Tél: +33 (0)1 23</p>");
        let second = normalize(&normalize_to_text(&first));
        assert_eq!(first, second);
    }
}
