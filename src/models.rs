//! Defines the core data structures used in the lead-sleuth application.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The tri-state outcome of verifying one name+domain pair.
///
/// `DomainDead` is terminal for the whole domain: the MX lookup failed, so
/// every candidate on that domain is futile and the dependent record should
/// be purged rather than retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Verdict {
    /// A mailbox accepted the trial recipient; this is the confirmed address.
    Valid(String),
    /// Every candidate was rejected; the record is left untouched downstream.
    Invalid,
    /// MX resolution failed for the domain; the record should be deleted.
    DomainDead,
}

impl Verdict {
    pub(crate) fn as_status(&self) -> &'static str {
        match self {
            Verdict::Valid(_) => "valid",
            Verdict::Invalid => "invalid",
            Verdict::DomainDead => "domain_dead",
        }
    }
}

/// Outcome of a single mailbox probe against one mail exchanger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProbeOutcome {
    /// The server answered 250 to the trial RCPT command.
    Accepted,
    /// The server answered with any other reply code.
    Rejected,
    /// Connection or protocol failure before a verdict reply was received.
    /// Treated as a soft rejection by the aggregator.
    TransportError,
}

/// Represents the input contact record read from the JSON file.
/// Allows for flexibility if some fields are missing.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct Contact {
    /// The contact's full name.
    pub full_name: Option<String>,
    /// The company domain (e.g., "example.com") or a full URL ("https://example.com").
    pub domain: Option<String>,
    /// Previously stored or externally sourced candidate addresses to merge in.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_candidates: Vec<String>,
    // Allow capturing other fields from the input JSON
    #[serde(flatten)]
    pub other_fields: HashMap<String, serde_json::Value>,
}

/// Final output structure for each record, combining input and verdict.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct ContactOutcome {
    // Include all fields from the original Contact input
    #[serde(flatten)]
    pub contact_input: Contact,

    /// "valid", "invalid" or "domain_dead"; "skipped" when the record never
    /// reached the verifier.
    pub status: String,
    /// The confirmed email address, present only on a "valid" verdict.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Directive for the CRM-sync layer: purge this record.
    /// Set exactly when the domain's MX lookup failed.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    #[serde(default)]
    pub delete_record: bool,

    /// Flag indicating the record was skipped before verification.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    #[serde(default)]
    pub skipped: bool,
    /// Reason why the record was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
}

impl ContactOutcome {
    /// Builds an outcome for a record that never reached the verifier.
    pub(crate) fn skipped(contact: Contact, reason: String) -> Self {
        Self {
            contact_input: contact,
            status: "skipped".to_string(),
            email: None,
            delete_record: false,
            skipped: true,
            skip_reason: Some(reason),
        }
    }

    /// Builds an outcome from a final verdict.
    pub(crate) fn from_verdict(contact: Contact, verdict: Verdict) -> Self {
        let status = verdict.as_status().to_string();
        let (email, delete_record) = match verdict {
            Verdict::Valid(email) => (Some(email), false),
            Verdict::Invalid => (None, false),
            Verdict::DomainDead => (None, true),
        };
        Self {
            contact_input: contact,
            status,
            email,
            delete_record,
            skipped: false,
            skip_reason: None,
        }
    }
}
