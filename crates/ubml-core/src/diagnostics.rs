//! Diagnostic types shared by every check in the engine
//!
//! A [`Diagnostic`] is one finding: a message, a machine-readable code, and
//! optional file/path/position attribution. Findings are grouped into a
//! [`ValidationReport`]; only errors affect validity, warnings never do.
//!
//! Copyright (c) 2025 UBML Contributors
//! Licensed under the MIT OR Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable diagnostic codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticCode {
    /// Malformed YAML in a single document
    ParseError,
    /// A schema-engine violation in a single document
    SchemaError,
    /// The same identifier defined more than once across the workspace
    DuplicateId,
    /// A reference to an identifier no document defines
    UndefinedReference,
    /// A defined identifier nothing references
    UnusedId,
    /// No workspace root document present
    MissingWorkspace,
    /// More than one document of a singleton type
    MultipleSingleton,
    /// Process documents exist but no actor catalog does
    MissingActors,
    /// A grown workspace without a glossary
    SuggestGlossary,
    /// A filename that matches no known document-type pattern
    UnrecognizedFilename,
}

impl DiagnosticCode {
    /// The kebab-case wire form of this code
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::ParseError => "parse-error",
            DiagnosticCode::SchemaError => "schema-error",
            DiagnosticCode::DuplicateId => "duplicate-id",
            DiagnosticCode::UndefinedReference => "undefined-reference",
            DiagnosticCode::UnusedId => "unused-id",
            DiagnosticCode::MissingWorkspace => "missing-workspace",
            DiagnosticCode::MultipleSingleton => "multiple-singleton",
            DiagnosticCode::MissingActors => "missing-actors",
            DiagnosticCode::SuggestGlossary => "suggest-glossary",
            DiagnosticCode::UnrecognizedFilename => "unrecognized-filename",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validation finding with optional source attribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Human-readable description of the finding
    pub message: String,
    /// Machine-readable code
    pub code: DiagnosticCode,
    /// File the finding is attributed to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,
    /// JSON-Pointer-like path inside the file, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// 1-indexed source line, if resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// 1-indexed source column, if resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl Diagnostic {
    /// Create a diagnostic with a message and code
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            filepath: None,
            path: None,
            line: None,
            column: None,
        }
    }

    /// Attribute this diagnostic to a file
    pub fn with_filepath(mut self, filepath: impl Into<String>) -> Self {
        self.filepath = Some(filepath.into());
        self
    }

    /// Attribute this diagnostic to a path inside its file
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach a resolved source position
    pub fn with_position(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(filepath) = &self.filepath {
            write!(f, " ({}", filepath)?;
            if let (Some(line), Some(column)) = (self.line, self.column) {
                write!(f, ":{}:{}", line, column)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// The outcome of a validation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Findings that make the workspace invalid
    pub errors: Vec<Diagnostic>,
    /// Advisory findings; never affect validity
    pub warnings: Vec<Diagnostic>,
}

impl ValidationReport {
    /// Create an empty (valid) report
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff no errors were recorded; warnings never affect validity
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record an error
    pub fn push_error(&mut self, diagnostic: Diagnostic) {
        self.errors.push(diagnostic);
    }

    /// Record a warning
    pub fn push_warning(&mut self, diagnostic: Diagnostic) {
        self.warnings.push(diagnostic);
    }

    /// Fold another report into this one
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// An advisory finding about workspace organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceWarning {
    /// Human-readable description
    pub message: String,
    /// Machine-readable code
    pub code: DiagnosticCode,
    /// A suggested remedy, if one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// The files involved, if the finding concerns specific files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
}

impl WorkspaceWarning {
    /// Create a workspace warning
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            suggestion: None,
            files: None,
        }
    }

    /// Attach a suggested remedy
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach the files involved
    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.files = Some(files);
        self
    }

    /// Project into a plain diagnostic for report merging
    pub fn into_diagnostic(self) -> Diagnostic {
        let message = match &self.suggestion {
            Some(suggestion) => format!("{} ({})", self.message, suggestion),
            None => self.message.clone(),
        };
        let mut diagnostic = Diagnostic::new(self.code, message);
        if let Some(files) = self.files {
            if let Some(first) = files.first() {
                diagnostic = diagnostic.with_filepath(first.clone());
            }
        }
        diagnostic
    }
}
