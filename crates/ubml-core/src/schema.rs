//! Schema-engine collaborator seam
//!
//! The engine treats per-document schema checking as an opaque, swappable
//! dependency: anything implementing [`SchemaEngine`] can sit behind the
//! orchestrator. [`JsonSchemaEngine`] is the bundled adapter over the
//! `jsonschema` crate, holding one compiled validator per document type
//! and projecting violations into `schema-error` diagnostics with
//! JSON-Pointer paths.
//!
//! Copyright (c) 2025 UBML Contributors
//! Licensed under the MIT OR Apache-2.0 license

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::doctype::DocumentType;
use crate::error::{Error, Result};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Per-document schema check result
#[derive(Debug, Default)]
pub struct SchemaReport {
    /// Schema violations as positioned diagnostics
    pub errors: Vec<Diagnostic>,
}

impl SchemaReport {
    /// True iff the document satisfied its schema
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Opaque schema-checking collaborator
pub trait SchemaEngine {
    /// Validate a content tree against the schema for a document type
    ///
    /// A document type the engine has no schema for validates vacuously.
    fn validate(&self, content: &Value, doc_type: DocumentType) -> SchemaReport;
}

/// `jsonschema`-backed engine with one compiled validator per type
pub struct JsonSchemaEngine {
    validators: HashMap<DocumentType, jsonschema::Validator>,
}

impl JsonSchemaEngine {
    /// Compile the built-in structural schemas for every document type
    pub fn new() -> Result<Self> {
        let mut engine = Self {
            validators: HashMap::new(),
        };
        for doc_type in DocumentType::ALL {
            engine.register(doc_type, &builtin_schema(doc_type))?;
        }
        Ok(engine)
    }

    /// Compile and register a schema, replacing any previous one
    pub fn register(&mut self, doc_type: DocumentType, schema: &Value) -> Result<()> {
        let validator = jsonschema::validator_for(schema).map_err(|e| Error::SchemaCompile {
            document_type: doc_type.to_string(),
            reason: e.to_string(),
        })?;
        self.validators.insert(doc_type, validator);
        Ok(())
    }
}

impl SchemaEngine for JsonSchemaEngine {
    fn validate(&self, content: &Value, doc_type: DocumentType) -> SchemaReport {
        let mut report = SchemaReport::default();
        let Some(validator) = self.validators.get(&doc_type) else {
            return report;
        };
        for violation in validator.iter_errors(content) {
            report.errors.push(
                Diagnostic::new(DiagnosticCode::SchemaError, violation.to_string())
                    .with_path(violation.instance_path.to_string()),
            );
        }
        report
    }
}

/// Minimal structural schema for one document type: a mapping carrying the
/// type's signature key and, optionally, a `ubml` version string.
fn builtin_schema(doc_type: DocumentType) -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "required": [doc_type.signature_key()],
        "properties": {
            "ubml": {"type": "string"},
            doc_type.signature_key(): {"type": "object"}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_document_passes() {
        let engine = JsonSchemaEngine::new().unwrap();
        let content = json!({"ubml": "1.0", "actors": {"AC001": {"name": "Clerk"}}});
        assert!(engine.validate(&content, DocumentType::Actors).valid());
    }

    #[test]
    fn test_missing_signature_key_fails() {
        let engine = JsonSchemaEngine::new().unwrap();
        let content = json!({"ubml": "1.0"});
        let report = engine.validate(&content, DocumentType::Process);
        assert!(!report.valid());
        assert_eq!(report.errors[0].code, DiagnosticCode::SchemaError);
    }

    #[test]
    fn test_violation_carries_pointer_path() {
        let engine = JsonSchemaEngine::new().unwrap();
        let content = json!({"ubml": 2, "actors": {}});
        let report = engine.validate(&content, DocumentType::Actors);
        assert!(report
            .errors
            .iter()
            .any(|e| e.path.as_deref() == Some("/ubml")));
    }

    #[test]
    fn test_custom_schema_registration() {
        let mut engine = JsonSchemaEngine::new().unwrap();
        engine
            .register(
                DocumentType::Metrics,
                &json!({"type": "object", "required": ["metrics", "owner"]}),
            )
            .unwrap();
        let report = engine.validate(&json!({"metrics": {}}), DocumentType::Metrics);
        assert!(!report.valid(), "custom schema demands an owner field");
    }
}
