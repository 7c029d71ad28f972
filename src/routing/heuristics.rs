//! Language and length heuristics.
//!
//! Two cheap signals drive routing: the whitespace token count and an
//! approximate language tag.
//!
//! ## Detection order
//!
//! 1. Any character in the Arabic Unicode block → [`Language::Ar`]
//! 2. Any French marker word as a lower-cased substring → [`Language::Fr`]
//! 3. Otherwise → [`Language::En`]
//!
//! The Arabic check always wins over the French markers. Marker matching is
//! substring-based, not word-boundary-based: "aide" inside a longer token
//! still counts. That is deliberately crude - these signals pick a backend,
//! they do not identify languages.

use serde::{Deserialize, Serialize};

/// Common French support-ticket words used as language markers.
///
/// Matched as substrings of the lower-cased text.
const FRENCH_MARKERS: &[&str] = &[
    "bonjour",
    "merci",
    "problème",
    "erreur",
    "compte",
    "mot",
    "passe",
    "assistance",
    "aide",
    "facture",
    "commande",
];

/// Approximate language of a ticket text.
///
/// Extensible: adding a variant requires a new detection rule in
/// [`detect_language`] and nothing else.
///
/// # Panics
///
/// This type never panics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English (the default when nothing else matches).
    En,
    /// French, detected via marker words.
    Fr,
    /// Arabic, detected via the Arabic Unicode block.
    Ar,
}

impl Language {
    /// Return the language's lowercase tag (`"en"`, `"fr"`, `"ar"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
            Language::Ar => "ar",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Both heuristic signals for a ticket text.
///
/// # Panics
///
/// This type never panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSignals {
    /// Detected approximate language.
    pub language: Language,
    /// Number of whitespace-delimited tokens.
    pub token_count: usize,
}

impl TextSignals {
    /// Compute both signals in one pass over the text.
    ///
    /// # Panics
    ///
    /// This function never panics.
    pub fn analyze(text: &str) -> Self {
        Self {
            language: detect_language(text),
            token_count: token_count(text),
        }
    }
}

/// Count whitespace-delimited tokens. Empty string → 0.
///
/// Locale-naive by design: `split_whitespace` over Unicode whitespace.
///
/// # Panics
///
/// This function never panics.
pub fn token_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Detect the approximate language of a ticket text.
///
/// # Panics
///
/// This function never panics.
pub fn detect_language(text: &str) -> Language {
    if text.chars().any(is_arabic_char) {
        return Language::Ar;
    }

    let lower = text.to_lowercase();
    if FRENCH_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return Language::Fr;
    }

    Language::En
}

/// True for characters in the Arabic Unicode block (U+0600..=U+06FF).
fn is_arabic_char(c: char) -> bool {
    ('\u{0600}'..='\u{06FF}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- token counting ---------------------------------------------------

    #[test]
    fn test_token_count_empty_string_is_zero() {
        assert_eq!(token_count(""), 0);
    }

    #[test]
    fn test_token_count_whitespace_only_is_zero() {
        assert_eq!(token_count("   \t\n  "), 0);
    }

    #[test]
    fn test_token_count_splits_on_any_whitespace() {
        assert_eq!(token_count("my  password\tdoes\nnot work"), 5);
    }

    #[test]
    fn test_token_count_punctuation_stays_attached() {
        // Naive split: punctuation does not create extra tokens.
        assert_eq!(token_count("Bonjour, j'ai un problème"), 4);
    }

    // -- language detection -----------------------------------------------

    #[test]
    fn test_detect_language_defaults_to_english() {
        assert_eq!(detect_language("my account is locked"), Language::En);
        assert_eq!(detect_language(""), Language::En);
    }

    #[test]
    fn test_detect_language_french_markers() {
        assert_eq!(detect_language("Bonjour, j'ai un souci"), Language::Fr);
        assert_eq!(detect_language("MERCI pour votre retour"), Language::Fr);
        assert_eq!(detect_language("une erreur de facturation"), Language::Fr);
    }

    #[test]
    fn test_detect_language_arabic_block() {
        assert_eq!(detect_language("مرحبا، لدي مشكلة"), Language::Ar);
    }

    #[test]
    fn test_arabic_wins_over_french_markers() {
        // Text containing both an Arabic character and a French marker.
        assert_eq!(detect_language("bonjour مرحبا"), Language::Ar);
    }

    #[test]
    fn test_french_marker_matches_as_substring() {
        // "aide" inside "raided" still triggers FR. Documented crude behavior.
        assert_eq!(detect_language("the server was raided"), Language::Fr);
    }

    #[test]
    fn test_detect_language_is_case_insensitive_for_markers() {
        assert_eq!(detect_language("PROBLÈME with my order"), Language::Fr);
    }

    // -- combined signals -------------------------------------------------

    #[test]
    fn test_analyze_combines_both_signals() {
        let signals = TextSignals::analyze("Bonjour, j'ai un problème");
        assert_eq!(signals.language, Language::Fr);
        assert_eq!(signals.token_count, 4);
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let text = "merci pour votre aide rapide";
        assert_eq!(TextSignals::analyze(text), TextSignals::analyze(text));
    }

    #[test]
    fn test_language_tags_are_lowercase() {
        assert_eq!(Language::En.as_str(), "en");
        assert_eq!(Language::Fr.as_str(), "fr");
        assert_eq!(Language::Ar.as_str(), "ar");
    }

    #[test]
    fn test_language_serializes_lowercase() {
        let json = serde_json::to_string(&Language::Ar).expect("must serialize");
        assert_eq!(json, "\"ar\"");
    }
}
