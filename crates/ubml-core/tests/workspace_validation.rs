//! End-to-end validation scenarios over small multi-file workspaces

use ubml_core::{
    parse, validate_workspace, AllocationOptions, DiagnosticCode, ElementType, IdAllocator,
    MemoryStatsStore, ParsedDocument, ValidateOptions,
};

fn doc(text: &str, filename: &str) -> ParsedDocument {
    let outcome = parse(text, Some(filename));
    assert!(outcome.is_ok(), "fixture must parse: {:?}", outcome.errors);
    outcome.document.unwrap()
}

const ACTORS: &str = "\
ubml: \"1.0\"
actors:
  AC001:
    name: Clerk
";

const PROCESS_REFERENCING_AC001: &str = "\
ubml: \"1.0\"
processes:
  PR001:
    name: Order handling
    responsible: AC001
    steps:
      ST001:
        name: Receive order
";

#[test]
fn valid_workspace_with_one_unused_step() {
    let documents = vec![
        doc(ACTORS, "team.actors.ubml.yaml"),
        doc(PROCESS_REFERENCING_AC001, "orders.process.ubml.yaml"),
    ];
    let result = validate_workspace(&documents, None, &ValidateOptions::default());

    assert!(result.report.valid());
    assert!(result.report.errors.is_empty());

    let unused: Vec<_> = result
        .report
        .warnings
        .iter()
        .filter(|w| w.code == DiagnosticCode::UnusedId)
        .collect();
    // AC001 is referenced; ST001 and PR001 are not.
    assert!(unused.iter().any(|w| w.message.contains("ST001")));
    assert!(!unused.iter().any(|w| w.message.contains("AC001")));
}

#[test]
fn two_files_defining_the_same_id() {
    let documents = vec![
        doc("processes:\n  PR001: {}\n", "a.process.ubml.yaml"),
        doc("processes:\n  PR001: {}\n", "b.process.ubml.yaml"),
    ];
    let result = validate_workspace(
        &documents,
        None,
        &ValidateOptions {
            suppress_unused_warnings: true,
        },
    );
    let duplicates: Vec<_> = result
        .report
        .errors
        .iter()
        .filter(|e| e.code == DiagnosticCode::DuplicateId)
        .collect();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].filepath.as_deref(), Some("b.process.ubml.yaml"));
}

#[test]
fn reference_to_an_actor_nobody_defines() {
    let documents = vec![doc(
        "processes:\n  PR001:\n    responsible: AC999\n",
        "orders.process.ubml.yaml",
    )];
    let result = validate_workspace(
        &documents,
        None,
        &ValidateOptions {
            suppress_unused_warnings: true,
        },
    );
    assert!(!result.report.valid());
    let error = result
        .report
        .errors
        .iter()
        .find(|e| e.code == DiagnosticCode::UndefinedReference)
        .unwrap();
    assert!(error.message.contains("AC999"));
    assert_eq!(error.filepath.as_deref(), Some("orders.process.ubml.yaml"));
}

#[test]
fn empty_workspace_is_valid_with_a_warning() {
    let result = validate_workspace(&[], None, &ValidateOptions::default());
    assert!(result.report.valid());
    assert!(result
        .report
        .warnings
        .iter()
        .any(|w| w.code == DiagnosticCode::MissingWorkspace));
}

#[test]
fn location_round_trip_through_validation_warnings() {
    let documents = vec![
        doc(ACTORS, "team.actors.ubml.yaml"),
        doc(PROCESS_REFERENCING_AC001, "orders.process.ubml.yaml"),
    ];
    let result = validate_workspace(&documents, None, &ValidateOptions::default());
    let st_warning = result
        .report
        .warnings
        .iter()
        .find(|w| w.message.contains("ST001"))
        .unwrap();
    // The warning's position must land on ST001's value node in the text.
    let line = st_warning.line.unwrap();
    let column = st_warning.column.unwrap();
    let source_line = PROCESS_REFERENCING_AC001.lines().nth(line - 1).unwrap();
    assert!(source_line[column - 1..].starts_with("name: Receive order"));
}

#[test]
fn allocation_after_validation_avoids_existing_ids() {
    let documents = vec![
        doc(ACTORS, "team.actors.ubml.yaml"),
        doc(PROCESS_REFERENCING_AC001, "orders.process.ubml.yaml"),
    ];
    let mut allocator = IdAllocator::new(MemoryStatsStore::default());
    let allocation = allocator
        .next_available_id(ElementType::Actor, &documents, &AllocationOptions::default())
        .unwrap();
    assert_eq!(allocation.id, "AC010");
    assert!(!allocator.check_id_conflict(&allocation.id, &documents));
    assert!(allocator.check_id_conflict("AC001", &documents));
}
