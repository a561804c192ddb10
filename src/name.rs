//! Normalizes raw person names into the tokens used for email construction.

use deunicode::deunicode;
use once_cell::sync::Lazy;
use regex::Regex;

static PARENTHETICAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(.*?\)").expect("parenthetical regex must compile"));

/// Generational suffixes: Jr./Sr. and roman numerals II through VI,
/// with an optional trailing dot.
static SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(jr|sr|ii|iii|iv|v|vi)\b\.?").expect("suffix regex must compile")
});

/// A normalized person name. Tokens are lowercase, accent-folded and free of
/// parenthetical annotations and generational suffixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PersonName {
    /// Always present and non-empty.
    pub first: String,
    /// Present only when the raw name had at least three tokens.
    pub middle: Option<String>,
    /// Present only when the raw name had at least two tokens.
    pub last: Option<String>,
}

impl PersonName {
    /// Parses a raw full name. Returns `None` when nothing usable remains
    /// after cleanup (empty or whitespace-only input).
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        let without_parens = PARENTHETICAL_RE.replace_all(raw, "");
        let folded = deunicode(&without_parens);
        let stripped = SUFFIX_RE.replace_all(&folded, "");

        let tokens: Vec<String> = stripped
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();

        let first = tokens.first()?.clone();
        let last = (tokens.len() >= 2).then(|| tokens.last().cloned()).flatten();
        let middle = (tokens.len() >= 3).then(|| tokens[1].clone());

        Some(Self {
            first,
            middle,
            last,
        })
    }

    pub(crate) fn first_initial(&self) -> char {
        self.first.chars().next().unwrap_or_default()
    }

    pub(crate) fn middle_initial(&self) -> Option<char> {
        self.middle.as_deref().and_then(|m| m.chars().next())
    }

    pub(crate) fn last_initial(&self) -> Option<char> {
        self.last.as_deref().and_then(|l| l.chars().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_token_name() {
        let name = PersonName::parse("Jane Doe").unwrap();
        assert_eq!(name.first, "jane");
        assert_eq!(name.middle, None);
        assert_eq!(name.last.as_deref(), Some("doe"));
        assert_eq!(name.first_initial(), 'j');
        assert_eq!(name.last_initial(), Some('d'));
    }

    #[test]
    fn test_three_token_name() {
        let name = PersonName::parse("Anna Maria Schmidt").unwrap();
        assert_eq!(name.first, "anna");
        assert_eq!(name.middle.as_deref(), Some("maria"));
        assert_eq!(name.last.as_deref(), Some("schmidt"));
        assert_eq!(name.middle_initial(), Some('m'));
    }

    #[test]
    fn test_single_token_name() {
        let name = PersonName::parse("Plato").unwrap();
        assert_eq!(name.first, "plato");
        assert!(name.middle.is_none());
        assert!(name.last.is_none());
        assert!(name.last_initial().is_none());
    }

    #[test]
    fn test_parenthetical_removed() {
        let name = PersonName::parse("Mary (she/her) Watson").unwrap();
        assert_eq!(name.first, "mary");
        assert_eq!(name.last.as_deref(), Some("watson"));
        assert!(name.middle.is_none());
    }

    #[test]
    fn test_accents_folded() {
        let name = PersonName::parse("José Müller").unwrap();
        assert_eq!(name.first, "jose");
        assert_eq!(name.last.as_deref(), Some("muller"));
    }

    #[test]
    fn test_suffix_stripped() {
        let name = PersonName::parse("John Smith Jr.").unwrap();
        assert_eq!(name.first, "john");
        assert_eq!(name.last.as_deref(), Some("smith"));
        assert!(name.middle.is_none());

        let name = PersonName::parse("Henry Ford II").unwrap();
        assert_eq!(name.last.as_deref(), Some("ford"));
    }

    #[test]
    fn test_empty_input() {
        assert!(PersonName::parse("").is_none());
        assert!(PersonName::parse("   ").is_none());
        assert!(PersonName::parse("(she/her)").is_none());
    }
}
