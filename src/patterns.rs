//! Ordered catalogs of local-part templates and candidate generation.
//!
//! Catalog order is significant: earlier templates are tried first by the
//! verifier and the first accepted mailbox wins, so the order encodes a
//! prior over common corporate naming conventions.

use crate::name::PersonName;

/// One building block of a local-part template.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Piece {
    First,
    Middle,
    Last,
    FirstInitial,
    MiddleInitial,
    LastInitial,
    Text(&'static str),
}

use Piece::*;

/// Templates applied to every name. None of these reference the middle name,
/// so for a two-token name every entry renders.
pub(crate) const BASE_TEMPLATES: &[&[Piece]] = &[
    &[First, Text("."), Last],
    &[Last, Text("."), First],
    &[FirstInitial, Text("."), Last],
    &[FirstInitial, Text("_"), Last],
    &[FirstInitial, Text("-"), Last],
    &[FirstInitial, Last],
    &[First, Text("_"), Last],
    &[First, Text("-"), Last],
    &[First, Last],
    &[Last, Text("_"), First],
    &[Last, Text("-"), First],
    &[Last, First],
    &[Last],
    &[Last, Text("."), FirstInitial],
    &[Last, Text("_"), FirstInitial],
    &[Last, Text("-"), FirstInitial],
    &[First, LastInitial],
    &[LastInitial, First],
    &[Last, Text("."), FirstInitial, Text("123")],
];

/// Templates unioned in only when a middle name exists, appended after the
/// base set.
pub(crate) const MIDDLE_TEMPLATES: &[&[Piece]] = &[
    &[Middle, First],
    &[Middle, Text("."), First],
    &[Middle, Text("_"), First],
    &[Middle, Last],
    &[Middle, Text("_"), Last],
    &[Middle, Text("."), Last],
    &[First, Text("."), Middle],
    &[First, Text("_"), Middle],
    &[First, Middle],
    &[First, Text("."), Middle, Text("."), Last],
    &[First, Text("."), Middle, Text("_"), Last],
    &[First, Text("."), Middle, Text("-"), Last],
    &[Middle],
    &[First, Text("."), LastInitial, Middle],
    &[First, Text("."), MiddleInitial, Text("."), Last],
    &[Last, Text("-"), Middle, Text("."), First],
    &[First, MiddleInitial, Last],
    &[MiddleInitial, Text("."), Last, Text("."), First],
    &[FirstInitial, Text("."), MiddleInitial, Text("."), Last],
    &[FirstInitial, Text("-"), MiddleInitial, Text("-"), Last],
    &[FirstInitial, Text("_"), MiddleInitial, Text("_"), Last],
];

/// Renders one template against a name. Returns `None` when the template
/// references a field absent on this name.
fn render(template: &[Piece], name: &PersonName) -> Option<String> {
    let mut local = String::new();
    for piece in template {
        match piece {
            First => local.push_str(&name.first),
            Middle => local.push_str(name.middle.as_deref()?),
            Last => local.push_str(name.last.as_deref()?),
            FirstInitial => local.push(name.first_initial()),
            MiddleInitial => local.push(name.middle_initial()?),
            LastInitial => local.push(name.last_initial()?),
            Text(s) => local.push_str(s),
        }
    }
    Some(local)
}

/// Generates the ordered candidate list for a name and domain.
///
/// Deterministic: the same inputs always yield the same sequence. Templates
/// referencing absent name fields are skipped, so a malformed domain or a
/// single-token name degrades to a short (possibly empty) list rather than
/// an error.
pub(crate) fn generate(name: &PersonName, domain: &str) -> Vec<String> {
    if domain.is_empty() || !domain.contains('.') {
        tracing::warn!(
            "Cannot generate candidates for invalid domain '{}'",
            domain
        );
        return Vec::new();
    }

    let mut candidates = Vec::new();
    for template in BASE_TEMPLATES {
        if let Some(local) = render(template, name) {
            candidates.push(format!("{}@{}", local, domain));
        }
    }
    if name.middle.is_some() {
        for template in MIDDLE_TEMPLATES {
            if let Some(local) = render(template, name) {
                candidates.push(format!("{}@{}", local, domain));
            }
        }
    }

    tracing::debug!(
        "Generated {} candidates for {} @ {}",
        candidates.len(),
        name.first,
        domain
    );
    candidates
}

/// Appends externally sourced candidate strings, skipping exact duplicates
/// of entries already present. Template order stays the primary preference.
pub(crate) fn merge_candidates(candidates: &mut Vec<String>, extras: &[String]) {
    for extra in extras {
        let extra = extra.trim();
        if extra.is_empty() {
            continue;
        }
        if candidates.iter().any(|c| c == extra) {
            continue;
        }
        candidates.push(extra.to_string());
    }
}

/// Builds the role-based company addresses tried as a last resort.
pub(crate) fn company_candidates(roles: &[String], domain: &str) -> Vec<String> {
    roles
        .iter()
        .map(|role| format!("{}@{}", role, domain))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(raw: &str) -> PersonName {
        PersonName::parse(raw).unwrap()
    }

    #[test]
    fn test_two_token_count_and_order() {
        let candidates = generate(&name("Jane Doe"), "example.com");
        assert_eq!(candidates.len(), BASE_TEMPLATES.len());
        assert_eq!(candidates[0], "jane.doe@example.com");
        assert_eq!(candidates[1], "doe.jane@example.com");
        assert!(candidates.contains(&"jdoe@example.com".to_string()));
        assert!(candidates.contains(&"doe.j123@example.com".to_string()));
    }

    #[test]
    fn test_three_token_count() {
        let candidates = generate(&name("Anna Maria Schmidt"), "example.com");
        assert_eq!(
            candidates.len(),
            BASE_TEMPLATES.len() + MIDDLE_TEMPLATES.len()
        );
        // Base catalog stays the primary preference.
        assert_eq!(candidates[0], "anna.schmidt@example.com");
        assert!(candidates.contains(&"anna.maria.schmidt@example.com".to_string()));
        assert!(candidates.contains(&"a.m.schmidt@example.com".to_string()));
    }

    #[test]
    fn test_idempotent() {
        let first = generate(&name("Jane Doe"), "example.com");
        let second = generate(&name("Jane Doe"), "example.com");
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_domain_yields_empty() {
        assert!(generate(&name("Jane Doe"), "").is_empty());
        assert!(generate(&name("Jane Doe"), "nodot").is_empty());
    }

    #[test]
    fn test_single_token_name_skips_last_templates() {
        // Every base template references the last name, so nothing renders.
        assert!(generate(&name("Plato"), "example.com").is_empty());
    }

    #[test]
    fn test_merge_skips_duplicates() {
        let mut candidates = generate(&name("Jane Doe"), "example.com");
        let template_count = candidates.len();
        let extras = vec![
            "jane.doe@example.com".to_string(),
            "jd.special@example.com".to_string(),
            "".to_string(),
        ];
        merge_candidates(&mut candidates, &extras);
        assert_eq!(candidates.len(), template_count + 1);
        assert_eq!(candidates.last().unwrap(), "jd.special@example.com");

        let unique: std::collections::HashSet<_> = candidates.iter().collect();
        assert_eq!(unique.len(), candidates.len());
    }

    #[test]
    fn test_company_candidates() {
        let roles = vec!["info".to_string(), "sales".to_string()];
        assert_eq!(
            company_candidates(&roles, "example.com"),
            vec!["info@example.com", "sales@example.com"]
        );
    }
}
