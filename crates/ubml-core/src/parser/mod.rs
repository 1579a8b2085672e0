//! Source-mapped YAML parsing
//!
//! [`parse`] turns YAML text into a [`ParsedDocument`]: a content tree
//! (`serde_json::Value`, object keys in declaration order) plus a retained
//! syntax skeleton that answers `locate` queries. Parsing follows the
//! YAML → JSON value conversion used across the engine; malformed input
//! yields positioned parse diagnostics, never a panic.
//!
//! Copyright (c) 2025 UBML Contributors
//! Licensed under the MIT OR Apache-2.0 license

pub mod source_map;

pub use source_map::{SourceLocation, SyntaxNode};

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::doctype::DocumentType;
use crate::paths::TreePath;
use serde_json::Value;
use source_map::{build_syntax_tree, offset_to_location};

/// Metadata detected while parsing a document
#[derive(Debug, Clone, Default)]
pub struct DocumentMeta {
    /// Declared UBML language version (top-level `ubml` key), if present
    pub version: Option<String>,
    /// Detected document type, if any contract matched
    pub detected_type: Option<DocumentType>,
    /// The filename the document was parsed under, if known
    pub filename: Option<String>,
}

/// One parsed UBML document, immutable after construction
///
/// The source text and the syntax skeleton are retained for the lifetime
/// of the document purely to answer [`ParsedDocument::locate`] queries.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    content: Value,
    source_text: String,
    meta: DocumentMeta,
    syntax: Option<SyntaxNode>,
}

impl ParsedDocument {
    /// The document's content tree
    pub fn content(&self) -> &Value {
        &self.content
    }

    /// The original source text
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    /// Metadata detected at parse time
    pub fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    /// The filename this document was parsed under, or a placeholder
    pub fn filepath(&self) -> &str {
        self.meta.filename.as_deref().unwrap_or("<in-memory>")
    }

    /// Resolve a structural path to a source location
    ///
    /// The empty path addresses the document root. `None` means "no
    /// location available" and is not an error.
    pub fn locate(&self, path: &TreePath) -> Option<SourceLocation> {
        let root = self.syntax.as_ref()?;
        let node = root.resolve(path)?;
        Some(offset_to_location(&self.source_text, node.start()))
    }

    /// [`ParsedDocument::locate`] for a JSON-Pointer-like path string
    pub fn locate_pointer(&self, pointer: &str) -> Option<SourceLocation> {
        self.locate(&TreePath::from_pointer(pointer))
    }
}

/// The result of parsing one document
#[derive(Debug, Default)]
pub struct ParseOutcome {
    /// The parsed document, absent when parsing failed
    pub document: Option<ParsedDocument>,
    /// Parse errors, each positioned where the YAML grammar gave up
    pub errors: Vec<Diagnostic>,
    /// Non-fatal findings, e.g. an unrecognized filename
    pub warnings: Vec<Diagnostic>,
}

impl ParseOutcome {
    /// True iff parsing produced a document without errors
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse YAML text into a source-mapped document
///
/// `filename` drives document-type detection and diagnostic attribution;
/// content-signature detection is the fallback when the filename is absent
/// or matches no pattern. An undetectable type is left as `None`.
pub fn parse(text: &str, filename: Option<&str>) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();

    let yaml_value: serde_yaml::Value = match serde_yaml::from_str(text) {
        Ok(value) => value,
        Err(error) => {
            outcome.errors.push(parse_error(&error, filename));
            return outcome;
        }
    };
    let content = match serde_json::to_value(yaml_value) {
        Ok(value) => value,
        Err(error) => {
            let mut diagnostic = Diagnostic::new(
                DiagnosticCode::ParseError,
                format!("Cannot represent document as a content tree: {}", error),
            );
            if let Some(filename) = filename {
                diagnostic = diagnostic.with_filepath(filename);
            }
            outcome.errors.push(diagnostic);
            return outcome;
        }
    };

    // The scanner accepted this text above, so a scan failure here is not
    // expected; surface it as a positioned parse error if it happens.
    let syntax = match build_syntax_tree(text) {
        Ok(tree) => tree,
        Err(scan_error) => {
            let marker = *scan_error.marker();
            let mut diagnostic = Diagnostic::new(
                DiagnosticCode::ParseError,
                format!("YAML parse error: {}", scan_error),
            )
            .with_position(marker.line(), marker.col() + 1);
            if let Some(filename) = filename {
                diagnostic = diagnostic.with_filepath(filename);
            }
            outcome.errors.push(diagnostic);
            return outcome;
        }
    };

    let detected_type = detect_type(filename, &content, &mut outcome.warnings);
    let version = content
        .get("ubml")
        .and_then(Value::as_str)
        .map(str::to_string);

    outcome.document = Some(ParsedDocument {
        content,
        source_text: text.to_string(),
        meta: DocumentMeta {
            version,
            detected_type,
            filename: filename.map(str::to_string),
        },
        syntax,
    });
    outcome
}

fn detect_type(
    filename: Option<&str>,
    content: &Value,
    warnings: &mut Vec<Diagnostic>,
) -> Option<DocumentType> {
    if let Some(filename) = filename {
        match DocumentType::from_filename(filename) {
            Some(doc_type) => return Some(doc_type),
            None => {
                log::debug!("filename '{}' matches no document-type pattern", filename);
                warnings.push(
                    Diagnostic::new(
                        DiagnosticCode::UnrecognizedFilename,
                        format!(
                            "Filename '{}' matches no '*.{{type}}.ubml.yaml' pattern",
                            filename
                        ),
                    )
                    .with_filepath(filename),
                );
            }
        }
    }
    DocumentType::from_signature(content)
}

fn parse_error(error: &serde_yaml::Error, filename: Option<&str>) -> Diagnostic {
    let mut diagnostic = Diagnostic::new(
        DiagnosticCode::ParseError,
        format!("YAML parse error: {}", error),
    );
    if let Some(location) = error.location() {
        diagnostic = diagnostic.with_position(location.line(), location.column());
    }
    if let Some(filename) = filename {
        diagnostic = diagnostic.with_filepath(filename);
    }
    diagnostic
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_document() {
        let outcome = parse(
            "ubml: \"1.0\"\nactors:\n  AC001:\n    name: Clerk\n",
            Some("team.actors.ubml.yaml"),
        );
        assert!(outcome.is_ok());
        let document = outcome.document.unwrap();
        assert_eq!(document.meta().version.as_deref(), Some("1.0"));
        assert_eq!(document.meta().detected_type, Some(DocumentType::Actors));
        assert_eq!(document.content()["actors"]["AC001"]["name"], "Clerk");
    }

    #[test]
    fn test_parse_malformed_yaml() {
        let outcome = parse("actors:\n  AC001: [unclosed\n", Some("x.actors.ubml.yaml"));
        assert!(!outcome.is_ok());
        assert!(outcome.document.is_none());
        let error = &outcome.errors[0];
        assert_eq!(error.code, DiagnosticCode::ParseError);
        assert!(error.line.is_some());
    }

    #[test]
    fn test_filename_detection_beats_signature() {
        // The content says "actors" but the filename says process.
        let outcome = parse("actors: {}\n", Some("weird.process.ubml.yaml"));
        let document = outcome.document.unwrap();
        assert_eq!(document.meta().detected_type, Some(DocumentType::Process));
    }

    #[test]
    fn test_unrecognized_filename_warns_then_falls_back() {
        let outcome = parse("processes:\n  PR010:\n    name: Orders\n", Some("stuff.yaml"));
        assert!(outcome.is_ok());
        assert!(outcome
            .warnings
            .iter()
            .any(|w| w.code == DiagnosticCode::UnrecognizedFilename));
        let document = outcome.document.unwrap();
        assert_eq!(document.meta().detected_type, Some(DocumentType::Process));
    }

    #[test]
    fn test_undetectable_type_is_none_not_error() {
        let outcome = parse("notes:\n  - hello\n", None);
        assert!(outcome.is_ok());
        assert_eq!(outcome.document.unwrap().meta().detected_type, None);
    }

    #[test]
    fn test_locate_round_trip() {
        let text = "processes:\n  PR010:\n    name: Orders\n    steps:\n      - responsible: AC001\n";
        let outcome = parse(text, None);
        let document = outcome.document.unwrap();

        let location = document.locate_pointer("/processes/PR010/name").unwrap();
        assert_eq!(&text[location.offset..location.offset + 6], "Orders");

        let location = document
            .locate_pointer("/processes/PR010/steps/0/responsible")
            .unwrap();
        assert_eq!(&text[location.offset..location.offset + 5], "AC001");

        assert!(document.locate_pointer("/processes/PR999").is_none());
    }

    #[test]
    fn test_locate_root() {
        let outcome = parse("actors: {}\n", None);
        let document = outcome.document.unwrap();
        let location = document.locate(&TreePath::root()).unwrap();
        assert_eq!(location.line, 1);
        assert_eq!(location.column, 1);
        assert_eq!(location.offset, 0);
    }

    #[test]
    fn test_empty_document_parses_to_null() {
        let outcome = parse("", None);
        assert!(outcome.is_ok());
        let document = outcome.document.unwrap();
        assert!(document.content().is_null());
        assert!(document.locate(&TreePath::root()).is_none());
    }
}
