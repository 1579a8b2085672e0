//! Identifier grammar for UBML elements
//!
//! Identifiers are workspace-global strings of the form `PREFIX` followed
//! by at least three digits (`AC001`, `ST1024`). Each prefix is bound to
//! exactly one element type. This module also owns the fixed allowlist of
//! structural field names that carry identifier references.
//!
//! Copyright (c) 2025 UBML Contributors
//! Licensed under the MIT OR Apache-2.0 license

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Element types modeled by UBML, 1:1 with identifier prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ElementType {
    /// Actors and organizational roles (`AC`)
    #[serde(rename = "AC")]
    Actor,
    /// Process steps (`ST`)
    #[serde(rename = "ST")]
    Step,
    /// Processes (`PR`)
    #[serde(rename = "PR")]
    Process,
    /// Business entities (`EN`)
    #[serde(rename = "EN")]
    Entity,
    /// Metrics and indicators (`MT`)
    #[serde(rename = "MT")]
    Metric,
    /// Glossary terms (`TR`)
    #[serde(rename = "TR")]
    Term,
    /// Policies (`PL`)
    #[serde(rename = "PL")]
    Policy,
}

impl ElementType {
    /// All element types, in prefix-table order
    pub const ALL: [ElementType; 7] = [
        ElementType::Actor,
        ElementType::Step,
        ElementType::Process,
        ElementType::Entity,
        ElementType::Metric,
        ElementType::Term,
        ElementType::Policy,
    ];

    /// The identifier prefix bound to this element type
    pub fn prefix(&self) -> &'static str {
        match self {
            ElementType::Actor => "AC",
            ElementType::Step => "ST",
            ElementType::Process => "PR",
            ElementType::Entity => "EN",
            ElementType::Metric => "MT",
            ElementType::Term => "TR",
            ElementType::Policy => "PL",
        }
    }

    /// Look up an element type by its identifier prefix
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.prefix() == prefix)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Structural field names whose values carry identifier references
pub const REFERENCE_FIELDS: &[&str] = &[
    "responsible",
    "accountable",
    "consulted",
    "informed",
    "owner",
    "actor",
    "from",
    "to",
    "skills",
    "uses",
    "produces",
    "measures",
    "parent",
    "next",
];

/// Check whether a map key is on the reference-field allowlist
pub fn is_reference_field(key: &str) -> bool {
    REFERENCE_FIELDS.contains(&key)
}

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(AC|ST|PR|EN|MT|TR|PL)(\d{3,})$").expect("identifier pattern is valid")
    })
}

/// Check whether a string is a well-formed UBML identifier
pub fn is_identifier(text: &str) -> bool {
    id_pattern().is_match(text)
}

/// Split an identifier into its element type and numeric suffix
pub fn parse_identifier(text: &str) -> Option<(ElementType, u64)> {
    let captures = id_pattern().captures(text)?;
    let element = ElementType::from_prefix(&captures[1])?;
    let number = captures[2].parse::<u64>().ok()?;
    Some((element, number))
}

/// Format an identifier, zero-padding the number to at least three digits
///
/// Width grows naturally past 999: `format_identifier(Actor, 1020)` is
/// `AC1020`.
pub fn format_identifier(element: ElementType, number: u64) -> String {
    format!("{}{:03}", element.prefix(), number)
}
