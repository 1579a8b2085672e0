//! Whole-workspace validation orchestration
//!
//! Callers parse each file with [`crate::parser::parse`] and hand the
//! surviving documents here. Each document is schema-checked independently
//! (one bad document never blocks the others), then the cross-document
//! reference rules and the structure heuristics run over the full set, and
//! everything merges into one report.
//!
//! Copyright (c) 2025 UBML Contributors
//! Licensed under the MIT OR Apache-2.0 license

use crate::diagnostics::ValidationReport;
use crate::parser::ParsedDocument;
use crate::refgraph::{validate_documents, DefinedIds, ReferenceCheckOptions, ReferencedIds};
use crate::schema::SchemaEngine;
use crate::workspace::analyze_structure;
use std::collections::BTreeMap;

/// Options for a validation run
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateOptions {
    /// Skip unused-id warnings
    pub suppress_unused_warnings: bool,
}

/// The merged outcome of a whole-workspace validation
#[derive(Debug)]
pub struct WorkspaceValidation {
    /// Schema, reference, and structure findings in one report
    pub report: ValidationReport,
    /// Detected type name → filenames, from the structure analysis
    pub document_types: BTreeMap<String, Vec<String>>,
    /// Every definition seen by the reference check
    pub defined_ids: DefinedIds,
    /// Every reference seen by the reference check
    pub referenced_ids: ReferencedIds,
}

/// Validate a document set: schemas per document, references and structure
/// across the set
pub fn validate_workspace(
    documents: &[ParsedDocument],
    engine: Option<&dyn SchemaEngine>,
    options: &ValidateOptions,
) -> WorkspaceValidation {
    let mut report = ValidationReport::new();

    if let Some(engine) = engine {
        for document in documents {
            let Some(doc_type) = document.meta().detected_type else {
                continue;
            };
            let schema_report = engine.validate(document.content(), doc_type);
            for error in schema_report.errors {
                report.push_error(error.with_filepath(document.filepath()));
            }
        }
    }

    let check = validate_documents(
        documents,
        &ReferenceCheckOptions {
            suppress_unused_warnings: options.suppress_unused_warnings,
        },
    );
    report.merge(check.report);

    let structure = analyze_structure(documents);
    for warning in structure.warnings {
        report.push_warning(warning.into_diagnostic());
    }

    WorkspaceValidation {
        report,
        document_types: structure.document_types,
        defined_ids: check.defined_ids,
        referenced_ids: check.referenced_ids,
    }
}
