//! Strict mailbox-grammar check applied before any network call.

use once_cell::sync::Lazy;
use regex::Regex;

/// RFC-5321-style mailbox grammar: dotted-atom or quoted-string local part,
/// dot-separated domain labels or a bracketed IPv4 address literal.
static MAILBOX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"^(?:[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+)*"#,
        r#"|"(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21\x23-\x5b\x5d-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*")"#,
        r#"@"#,
        r#"(?:(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?\.)+[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?"#,
        r#"|\[(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\])$"#,
    ))
    .expect("mailbox grammar regex must compile")
});

/// Checks whether a candidate string is a syntactically plausible mailbox.
/// Pure function, no I/O. Length limits the grammar cannot express (64-octet
/// local part, 63-octet domain labels) are enforced explicitly.
pub(crate) fn is_well_formed(candidate: &str) -> bool {
    if !MAILBOX_RE.is_match(candidate) {
        return false;
    }
    // The grammar guarantees an unquoted '@' separating local part and
    // domain; a quoted local part may itself contain '@', so split from the
    // right.
    let Some((local, domain)) = candidate.rsplit_once('@') else {
        return false;
    };
    if local.len() > 64 {
        return false;
    }
    if !domain.starts_with('[') && domain.split('.').any(|label| label.len() > 63) {
        return false;
    }
    true
}
