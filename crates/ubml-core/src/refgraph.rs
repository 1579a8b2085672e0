//! Reference graph: defined/referenced identifier extraction and checks
//!
//! Definitions are identifiers appearing as map keys anywhere in a content
//! tree. References are identifiers appearing as values of allowlisted
//! fields — plus, deliberately, any string item of any sequence that
//! matches the identifier grammar, whatever key the sequence hangs under.
//! That broad net is the documented behavior and is pinned by test.
//!
//! [`validate_documents`] aggregates both maps over a document set and
//! runs the cross-document consistency rules: duplicate definitions,
//! dangling references, unused identifiers.
//!
//! Copyright (c) 2025 UBML Contributors
//! Licensed under the MIT OR Apache-2.0 license

use crate::diagnostics::{Diagnostic, DiagnosticCode, ValidationReport};
use crate::ids::{is_identifier, is_reference_field};
use crate::parser::ParsedDocument;
use crate::paths::TreePath;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// One attributed occurrence of an identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdOccurrence {
    /// File the occurrence lives in
    pub filepath: String,
    /// Structural path of the occurrence
    pub path: TreePath,
}

/// Identifier → its (single, first-wins) definition site
pub type DefinedIds = BTreeMap<String, IdOccurrence>;

/// Identifier → every attributed reference to it
pub type ReferencedIds = BTreeMap<String, Vec<IdOccurrence>>;

/// Options for [`validate_documents`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceCheckOptions {
    /// Skip the unused-id rule entirely
    pub suppress_unused_warnings: bool,
}

/// The outcome of a cross-document reference check
#[derive(Debug)]
pub struct ReferenceCheck {
    /// Errors and warnings from the consistency rules
    pub report: ValidationReport,
    /// All definitions seen, first writer wins
    pub defined_ids: DefinedIds,
    /// All references seen
    pub referenced_ids: ReferencedIds,
}

/// Walk a content tree, calling `visit` for every map key matching the
/// identifier grammar, with the path including that key.
///
/// Shared between definition extraction and the allocator's scan.
pub fn walk_defined_keys<F>(content: &Value, visit: &mut F)
where
    F: FnMut(&str, &TreePath),
{
    fn walk<F: FnMut(&str, &TreePath)>(value: &Value, path: &TreePath, visit: &mut F) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    let child_path = path.child_key(key);
                    if is_identifier(key) {
                        visit(key, &child_path);
                    }
                    walk(child, &child_path, visit);
                }
            }
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    walk(item, &path.child_index(index), visit);
                }
            }
            _ => {}
        }
    }
    walk(content, &TreePath::root(), visit);
}

/// Extract every identifier defined (as a map key) in a content tree
///
/// Within one document the first definition wins; later keys with the same
/// identifier are kept out of the map (the cross-document duplicate rule in
/// [`validate_documents`] reports them).
pub fn extract_defined_ids(content: &Value, filepath: &str) -> DefinedIds {
    let mut defined = DefinedIds::new();
    walk_defined_keys(content, &mut |id, path| {
        defined.entry(id.to_string()).or_insert_with(|| IdOccurrence {
            filepath: filepath.to_string(),
            path: path.clone(),
        });
    });
    defined
}

/// Extract every identifier referenced in a content tree
pub fn extract_referenced_ids(content: &Value, filepath: &str) -> ReferencedIds {
    let mut referenced = ReferencedIds::new();
    walk_references(content, &TreePath::root(), filepath, &mut referenced);
    referenced
}

fn walk_references(
    value: &Value,
    path: &TreePath,
    filepath: &str,
    referenced: &mut ReferencedIds,
) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = path.child_key(key);
                if is_reference_field(key) {
                    if let Value::String(text) = child {
                        if is_identifier(text) {
                            record_reference(referenced, text, filepath, &child_path);
                        }
                    }
                }
                // Sequences are handled below regardless of the key, which
                // also covers allowlisted fields holding identifier arrays.
                walk_references(child, &child_path, filepath, referenced);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                let item_path = path.child_index(index);
                if let Value::String(text) = item {
                    if is_identifier(text) {
                        record_reference(referenced, text, filepath, &item_path);
                    }
                } else {
                    walk_references(item, &item_path, filepath, referenced);
                }
            }
        }
        _ => {}
    }
}

fn record_reference(referenced: &mut ReferencedIds, id: &str, filepath: &str, path: &TreePath) {
    referenced
        .entry(id.to_string())
        .or_default()
        .push(IdOccurrence {
            filepath: filepath.to_string(),
            path: path.clone(),
        });
}

/// Run the cross-document consistency rules over a document set
///
/// Documents are visited in input order, which decides first-vs-later for
/// the duplicate rule. Unused-id warnings resolve line/column through the
/// defining document's `locate`.
pub fn validate_documents(
    documents: &[ParsedDocument],
    options: &ReferenceCheckOptions,
) -> ReferenceCheck {
    let mut report = ValidationReport::new();
    let mut defined = DefinedIds::new();
    let mut referenced = ReferencedIds::new();

    for document in documents {
        let filepath = document.filepath();
        walk_defined_keys(document.content(), &mut |id, path| {
            match defined.get(id) {
                Some(first) => {
                    report.push_error(
                        Diagnostic::new(
                            DiagnosticCode::DuplicateId,
                            format!(
                                "Identifier '{}' is already defined in '{}'",
                                id, first.filepath
                            ),
                        )
                        .with_filepath(filepath)
                        .with_path(path.pointer()),
                    );
                }
                None => {
                    defined.insert(
                        id.to_string(),
                        IdOccurrence {
                            filepath: filepath.to_string(),
                            path: path.clone(),
                        },
                    );
                }
            }
        });
        for (id, occurrences) in extract_referenced_ids(document.content(), filepath) {
            referenced.entry(id).or_default().extend(occurrences);
        }
    }

    for (id, occurrences) in &referenced {
        if defined.contains_key(id) {
            continue;
        }
        // One error per distinct referencing file, at its first occurrence.
        let mut seen_files = BTreeSet::new();
        for occurrence in occurrences {
            if !seen_files.insert(occurrence.filepath.as_str()) {
                continue;
            }
            report.push_error(
                Diagnostic::new(
                    DiagnosticCode::UndefinedReference,
                    format!("Reference to undefined identifier '{}'", id),
                )
                .with_filepath(occurrence.filepath.clone())
                .with_path(occurrence.path.pointer()),
            );
        }
    }

    if !options.suppress_unused_warnings {
        let by_filepath: BTreeMap<&str, &ParsedDocument> = documents
            .iter()
            .map(|document| (document.filepath(), document))
            .collect();
        for (id, definition) in &defined {
            if referenced.contains_key(id) {
                continue;
            }
            let mut diagnostic = Diagnostic::new(
                DiagnosticCode::UnusedId,
                format!("Identifier '{}' is defined but never referenced", id),
            )
            .with_filepath(definition.filepath.clone())
            .with_path(definition.path.pointer());
            if let Some(location) = by_filepath
                .get(definition.filepath.as_str())
                .and_then(|document| document.locate_pointer(&definition.path.pointer()))
            {
                diagnostic = diagnostic.with_position(location.line, location.column);
            }
            report.push_warning(diagnostic);
        }
    }

    ReferenceCheck {
        report,
        defined_ids: defined,
        referenced_ids: referenced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use serde_json::json;

    fn doc(text: &str, filename: &str) -> ParsedDocument {
        let outcome = parse(text, Some(filename));
        assert!(outcome.is_ok(), "fixture must parse: {:?}", outcome.errors);
        outcome.document.unwrap()
    }

    #[test]
    fn test_extract_defined_ids_paths() {
        let content = json!({
            "processes": {
                "PR010": {
                    "steps": {
                        "ST001": {"name": "Receive"}
                    }
                }
            }
        });
        let defined = extract_defined_ids(&content, "orders.process.ubml.yaml");
        assert_eq!(defined["PR010"].path.pointer(), "/processes/PR010");
        assert_eq!(
            defined["ST001"].path.pointer(),
            "/processes/PR010/steps/ST001"
        );
    }

    #[test]
    fn test_extract_references_allowlisted_string() {
        let content = json!({
            "processes": {
                "PR010": {"responsible": "AC001", "label": "AC002"}
            }
        });
        let referenced = extract_referenced_ids(&content, "f");
        assert!(referenced.contains_key("AC001"));
        assert!(
            !referenced.contains_key("AC002"),
            "non-allowlisted scalar fields are not references"
        );
    }

    #[test]
    fn test_sequence_items_counted_as_references_outside_allowlist() {
        // Sequence items match regardless of the owning key. This asymmetry
        // is deliberate and must not be "fixed" silently.
        let content = json!({
            "whatever": ["AC003", "plain text"],
            "skills": ["AC004"]
        });
        let referenced = extract_referenced_ids(&content, "f");
        assert_eq!(referenced["AC003"][0].path.pointer(), "/whatever/0");
        assert_eq!(referenced["AC004"][0].path.pointer(), "/skills/0");
    }

    #[test]
    fn test_allowlisted_array_items_recorded_once() {
        let content = json!({"responsible": ["AC001", "AC002"]});
        let referenced = extract_referenced_ids(&content, "f");
        assert_eq!(referenced["AC001"].len(), 1);
        assert_eq!(referenced["AC002"].len(), 1);
    }

    #[test]
    fn test_duplicate_rule_order_dependence() {
        let a = doc("actors:\n  PR001: {}\n", "a.actors.ubml.yaml");
        let b = doc("processes:\n  PR001: {}\n", "b.process.ubml.yaml");
        let options = ReferenceCheckOptions {
            suppress_unused_warnings: true,
        };

        let check = validate_documents(&[a.clone(), b.clone()], &options);
        assert_eq!(check.report.errors.len(), 1);
        let error = &check.report.errors[0];
        assert_eq!(error.code, DiagnosticCode::DuplicateId);
        assert_eq!(error.filepath.as_deref(), Some("b.process.ubml.yaml"));
        assert!(error.message.contains("a.actors.ubml.yaml"));

        // Reversing the input order flips the attribution.
        let check = validate_documents(&[b, a], &options);
        let error = &check.report.errors[0];
        assert_eq!(error.filepath.as_deref(), Some("a.actors.ubml.yaml"));
        assert!(error.message.contains("b.process.ubml.yaml"));
    }

    #[test]
    fn test_undefined_reference_deduplicated_by_file() {
        let a = doc(
            "processes:\n  PR001:\n    responsible: AC999\n    steps:\n      - responsible: AC999\n",
            "a.process.ubml.yaml",
        );
        let b = doc(
            "processes:\n  PR002:\n    responsible: AC999\n",
            "b.process.ubml.yaml",
        );
        let check = validate_documents(
            &[a, b],
            &ReferenceCheckOptions {
                suppress_unused_warnings: true,
            },
        );
        let undefined: Vec<_> = check
            .report
            .errors
            .iter()
            .filter(|e| e.code == DiagnosticCode::UndefinedReference)
            .collect();
        assert_eq!(undefined.len(), 2, "one per distinct referencing file");
    }

    #[test]
    fn test_unused_id_warning_with_position() {
        let actors = doc("actors:\n  AC001:\n    name: Clerk\n", "t.actors.ubml.yaml");
        let process = doc(
            "processes:\n  PR001:\n    responsible: AC001\n    steps:\n      ST001:\n        name: Idle\n",
            "t.process.ubml.yaml",
        );
        let check = validate_documents(&[actors, process], &ReferenceCheckOptions::default());
        assert!(check.report.valid());

        let unused: Vec<_> = check
            .report
            .warnings
            .iter()
            .filter(|w| w.code == DiagnosticCode::UnusedId)
            .collect();
        assert_eq!(unused.len(), 2, "ST001 and PR001 are unreferenced");
        let st = unused
            .iter()
            .find(|w| w.message.contains("ST001"))
            .unwrap();
        assert_eq!(st.filepath.as_deref(), Some("t.process.ubml.yaml"));
        assert!(st.line.is_some() && st.column.is_some());
    }

    #[test]
    fn test_unused_suppression() {
        let actors = doc("actors:\n  AC001: {}\n  AC002: {}\n", "t.actors.ubml.yaml");
        let check = validate_documents(
            &[actors],
            &ReferenceCheckOptions {
                suppress_unused_warnings: true,
            },
        );
        assert!(check.report.warnings.is_empty());
    }
}
