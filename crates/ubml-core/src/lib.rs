//! UBML Core - validation and identifier management for UBML workspaces
//!
//! UBML models business processes as a set of interlinked YAML documents.
//! This crate is the engine underneath the tooling:
//!
//! - **Source-Mapped Parser**: YAML text into a content tree plus a
//!   queryable path → source-location index
//! - **Reference Graph**: defined/referenced identifier extraction and
//!   cross-document consistency checks
//! - **Structure Analyzer**: advisory heuristics over workspace layout
//! - **Identifier Allocator**: gap-friendly, collision-free ID generation
//!   with cached stats and a full-scan fallback
//!
//! The crate returns structured diagnostics only; rendering, file-system
//! scaffolding, and the CLI live elsewhere.
//!
//! # Example
//!
//! ```
//! use ubml_core::{parse, validate_workspace, ValidateOptions};
//!
//! let actors = parse("actors:\n  AC001:\n    name: Clerk\n", Some("team.actors.ubml.yaml"));
//! let process = parse(
//!     "processes:\n  PR010:\n    responsible: AC001\n",
//!     Some("orders.process.ubml.yaml"),
//! );
//! let documents = vec![actors.document.unwrap(), process.document.unwrap()];
//!
//! let result = validate_workspace(&documents, None, &ValidateOptions::default());
//! assert!(result.report.valid());
//! ```

pub mod allocator;
pub mod diagnostics;
pub mod doctype;
pub mod error;
pub mod ids;
pub mod parser;
pub mod paths;
pub mod refgraph;
pub mod schema;
pub mod validate;
pub mod workspace;

// Re-export the main surface for convenience
pub use allocator::{
    Allocation, AllocationOptions, FileStatsStore, IdAllocator, MemoryStatsStore, StatsStore,
    WorkspaceIdStats,
};
pub use diagnostics::{Diagnostic, DiagnosticCode, ValidationReport, WorkspaceWarning};
pub use doctype::{DocumentType, Multiplicity};
pub use error::{Error, Result};
pub use ids::{format_identifier, is_identifier, parse_identifier, ElementType};
pub use parser::{parse, DocumentMeta, ParseOutcome, ParsedDocument, SourceLocation};
pub use paths::{PathSegment, TreePath};
pub use refgraph::{
    extract_defined_ids, extract_referenced_ids, validate_documents, IdOccurrence,
    ReferenceCheck, ReferenceCheckOptions,
};
pub use schema::{JsonSchemaEngine, SchemaEngine, SchemaReport};
pub use validate::{validate_workspace, ValidateOptions, WorkspaceValidation};
pub use workspace::{analyze_structure, StructureReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
