//! Document types and detection heuristics
//!
//! Every UBML file carries its type in its name (`orders.process.ubml.yaml`)
//! or reveals it through a characteristic top-level key (`processes:`).
//! Detection is best-effort: a document that matches neither contract simply
//! has no detected type, which is not an error.
//!
//! Copyright (c) 2025 UBML Contributors
//! Licensed under the MIT OR Apache-2.0 license

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The closed set of UBML document types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Workspace root configuration
    Workspace,
    /// Actor catalog
    Actors,
    /// Business-entity catalog
    Entities,
    /// Metric catalog
    Metrics,
    /// Terminology / glossary
    Glossary,
    /// Strategic context
    Strategy,
    /// A single business process
    Process,
    /// Policy definitions
    Policy,
}

/// How many documents of a given type a workspace is expected to hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    /// Exactly one expected per workspace
    Singleton,
    /// Shared catalog, may be split across files
    Catalog,
    /// One per modeled unit (the default)
    Multiple,
}

/// Detection order for content signatures: first present key wins.
const SIGNATURE_KEYS: &[(&str, DocumentType)] = &[
    ("workspace", DocumentType::Workspace),
    ("processes", DocumentType::Process),
    ("actors", DocumentType::Actors),
    ("entities", DocumentType::Entities),
    ("metrics", DocumentType::Metrics),
    ("terms", DocumentType::Glossary),
    ("strategy", DocumentType::Strategy),
    ("policies", DocumentType::Policy),
];

impl DocumentType {
    /// All document types, in detection-priority order
    pub const ALL: [DocumentType; 8] = [
        DocumentType::Workspace,
        DocumentType::Actors,
        DocumentType::Entities,
        DocumentType::Metrics,
        DocumentType::Glossary,
        DocumentType::Strategy,
        DocumentType::Process,
        DocumentType::Policy,
    ];

    /// The filename stem used in the `*.{name}.ubml.yaml` contract
    pub fn name(&self) -> &'static str {
        match self {
            DocumentType::Workspace => "workspace",
            DocumentType::Actors => "actors",
            DocumentType::Entities => "entities",
            DocumentType::Metrics => "metrics",
            DocumentType::Glossary => "glossary",
            DocumentType::Strategy => "strategy",
            DocumentType::Process => "process",
            DocumentType::Policy => "policy",
        }
    }

    /// The top-level key that marks this document type in content
    pub fn signature_key(&self) -> &'static str {
        match self {
            DocumentType::Workspace => "workspace",
            DocumentType::Actors => "actors",
            DocumentType::Entities => "entities",
            DocumentType::Metrics => "metrics",
            DocumentType::Glossary => "terms",
            DocumentType::Strategy => "strategy",
            DocumentType::Process => "processes",
            DocumentType::Policy => "policies",
        }
    }

    /// How many documents of this type a workspace is expected to hold
    pub fn multiplicity(&self) -> Multiplicity {
        match self {
            DocumentType::Workspace | DocumentType::Glossary | DocumentType::Strategy => {
                Multiplicity::Singleton
            }
            DocumentType::Actors | DocumentType::Entities | DocumentType::Metrics => {
                Multiplicity::Catalog
            }
            DocumentType::Process | DocumentType::Policy => Multiplicity::Multiple,
        }
    }

    /// Detect a document type from a filename
    ///
    /// Matches `{name}.ubml.yaml` or `*.{name}.ubml.yaml`; the first type
    /// in declaration order wins.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let basename = filename
            .rsplit(|c| c == '/' || c == '\\')
            .next()
            .unwrap_or(filename);
        Self::ALL.iter().copied().find(|doc_type| {
            let exact = format!("{}.ubml.yaml", doc_type.name());
            basename == exact || basename.ends_with(&format!(".{}", exact))
        })
    }

    /// Detect a document type from a content tree's top-level keys
    ///
    /// Inspects the fixed, ordered signature-key list; the first key present
    /// wins. Non-mapping roots have no signature.
    pub fn from_signature(content: &Value) -> Option<Self> {
        let map = content.as_object()?;
        SIGNATURE_KEYS
            .iter()
            .find(|(key, _)| map.contains_key(*key))
            .map(|(_, doc_type)| *doc_type)
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
