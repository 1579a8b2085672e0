//! Workspace structure analysis
//!
//! Purely advisory heuristics over the set of detected document types.
//! Nothing here ever makes a workspace invalid; the findings are
//! [`WorkspaceWarning`]s a caller may render, ignore, or promote under
//! its own strict policy.
//!
//! Copyright (c) 2025 UBML Contributors
//! Licensed under the MIT OR Apache-2.0 license

use crate::diagnostics::{DiagnosticCode, WorkspaceWarning};
use crate::doctype::{DocumentType, Multiplicity};
use crate::parser::ParsedDocument;
use std::collections::BTreeMap;

/// Documents grown past this without a glossary earn a suggestion.
const GLOSSARY_SUGGESTION_THRESHOLD: usize = 5;

/// The outcome of a structure analysis; advisory only
#[derive(Debug, Default)]
pub struct StructureReport {
    /// Organizational findings, never errors
    pub warnings: Vec<WorkspaceWarning>,
    /// Detected type name → filenames of that type
    pub document_types: BTreeMap<String, Vec<String>>,
}

/// Apply the organizational heuristics to a document set
pub fn analyze_structure(documents: &[ParsedDocument]) -> StructureReport {
    let mut report = StructureReport::default();

    let mut by_type: BTreeMap<DocumentType, Vec<String>> = BTreeMap::new();
    for document in documents {
        if let Some(doc_type) = document.meta().detected_type {
            by_type
                .entry(doc_type)
                .or_default()
                .push(document.filepath().to_string());
        }
    }
    for (doc_type, files) in &by_type {
        report
            .document_types
            .insert(doc_type.name().to_string(), files.clone());
    }

    if !by_type.contains_key(&DocumentType::Workspace) {
        report.warnings.push(
            WorkspaceWarning::new(
                DiagnosticCode::MissingWorkspace,
                "No workspace root document found",
            )
            .with_suggestion("create a 'workspace.ubml.yaml' describing the workspace"),
        );
    }

    for (doc_type, files) in &by_type {
        if doc_type.multiplicity() == Multiplicity::Singleton && files.len() > 1 {
            report.warnings.push(
                WorkspaceWarning::new(
                    DiagnosticCode::MultipleSingleton,
                    format!(
                        "Expected a single '{}' document but found {}",
                        doc_type,
                        files.len()
                    ),
                )
                .with_suggestion(format!("consolidate into one '{}' document", doc_type))
                .with_files(files.clone()),
            );
        }
    }

    if by_type.contains_key(&DocumentType::Process) && !by_type.contains_key(&DocumentType::Actors)
    {
        report.warnings.push(
            WorkspaceWarning::new(
                DiagnosticCode::MissingActors,
                "Process documents exist but no actor catalog does",
            )
            .with_suggestion("add an 'actors.ubml.yaml' defining the responsible actors"),
        );
    }

    if documents.len() >= GLOSSARY_SUGGESTION_THRESHOLD
        && !by_type.contains_key(&DocumentType::Glossary)
    {
        report.warnings.push(
            WorkspaceWarning::new(
                DiagnosticCode::SuggestGlossary,
                format!(
                    "Workspace has {} documents and no glossary",
                    documents.len()
                ),
            )
            .with_suggestion("add a 'glossary.ubml.yaml' to pin down shared terminology"),
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn doc(text: &str, filename: &str) -> ParsedDocument {
        parse(text, Some(filename)).document.unwrap()
    }

    fn codes(report: &StructureReport) -> Vec<DiagnosticCode> {
        report.warnings.iter().map(|w| w.code).collect()
    }

    #[test]
    fn test_empty_workspace_warns_missing_workspace() {
        let report = analyze_structure(&[]);
        assert_eq!(codes(&report), vec![DiagnosticCode::MissingWorkspace]);
    }

    #[test]
    fn test_complete_small_workspace_is_quiet() {
        let docs = vec![
            doc("workspace:\n  name: acme\n", "workspace.ubml.yaml"),
            doc("actors:\n  AC001: {}\n", "team.actors.ubml.yaml"),
            doc("processes:\n  PR010: {}\n", "orders.process.ubml.yaml"),
        ];
        let report = analyze_structure(&docs);
        assert!(report.warnings.is_empty());
        assert_eq!(
            report.document_types["process"],
            vec!["orders.process.ubml.yaml"]
        );
    }

    #[test]
    fn test_multiple_singleton() {
        let docs = vec![
            doc("workspace: {}\n", "workspace.ubml.yaml"),
            doc("terms: {}\n", "a.glossary.ubml.yaml"),
            doc("terms: {}\n", "b.glossary.ubml.yaml"),
        ];
        let report = analyze_structure(&docs);
        let warning = report
            .warnings
            .iter()
            .find(|w| w.code == DiagnosticCode::MultipleSingleton)
            .unwrap();
        assert_eq!(warning.files.as_ref().unwrap().len(), 2);
        assert!(warning.suggestion.is_some());
    }

    #[test]
    fn test_process_without_actors() {
        let docs = vec![
            doc("workspace: {}\n", "workspace.ubml.yaml"),
            doc("processes: {}\n", "orders.process.ubml.yaml"),
        ];
        let report = analyze_structure(&docs);
        assert!(codes(&report).contains(&DiagnosticCode::MissingActors));
    }

    #[test]
    fn test_glossary_suggested_for_grown_workspace() {
        let mut docs = vec![
            doc("workspace: {}\n", "workspace.ubml.yaml"),
            doc("actors: {}\n", "team.actors.ubml.yaml"),
        ];
        for name in ["a", "b", "c"] {
            docs.push(doc(
                "processes: {}\n",
                &format!("{}.process.ubml.yaml", name),
            ));
        }
        let report = analyze_structure(&docs);
        assert!(codes(&report).contains(&DiagnosticCode::SuggestGlossary));

        // A glossary silences the suggestion at the same size.
        docs.push(doc("terms: {}\n", "glossary.ubml.yaml"));
        let report = analyze_structure(&docs);
        assert!(!codes(&report).contains(&DiagnosticCode::SuggestGlossary));
    }
}
