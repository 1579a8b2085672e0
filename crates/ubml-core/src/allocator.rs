//! Identifier sequence allocation
//!
//! New identifiers come from a two-tier strategy: a persisted per-prefix
//! high-water mark (the `id_stats` side field of the workspace document)
//! when one exists, otherwise a full scan of every document's defined
//! identifiers. Numbering is gap-friendly — generated numbers land on
//! multiples of 10 so hand-authored identifiers fit between them — and the
//! persisted stats are monotonic: merges only ever raise values.
//!
//! Persistence sits behind the [`StatsStore`] trait. The bundled
//! [`FileStatsStore`] assumes a single process per workspace; concurrent
//! allocators against the same directory can race the read-merge-write and
//! hand out the same number. Writes are temp-file + rename so a crashed
//! writer never leaves a torn workspace document.
//!
//! Copyright (c) 2025 UBML Contributors
//! Licensed under the MIT OR Apache-2.0 license

use crate::doctype::DocumentType;
use crate::error::{Error, Result};
use crate::ids::{format_identifier, parse_identifier, ElementType};
use crate::parser::ParsedDocument;
use crate::refgraph::walk_defined_keys;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Default lowest generated number; 001–009 stay free for hand-authored IDs.
pub const DEFAULT_MIN_START: u64 = 10;

/// The field of the workspace document holding the persisted stats
pub const STATS_FIELD: &str = "id_stats";

/// Per-prefix high-water marks, persisted across runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceIdStats {
    counters: BTreeMap<ElementType, u64>,
}

impl WorkspaceIdStats {
    /// The stored high-water mark for a prefix, if any
    pub fn get(&self, element: ElementType) -> Option<u64> {
        self.counters.get(&element).copied()
    }

    /// Raise the stored value for a prefix; never lowers it
    pub fn merge_max(&mut self, element: ElementType, number: u64) {
        let entry = self.counters.entry(element).or_insert(0);
        *entry = (*entry).max(number);
    }

    /// Iterate the stored (prefix, high-water mark) pairs
    pub fn iter(&self) -> impl Iterator<Item = (ElementType, u64)> + '_ {
        self.counters.iter().map(|(element, number)| (*element, *number))
    }

    /// True when no prefix has a stored value
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

impl FromIterator<(ElementType, u64)> for WorkspaceIdStats {
    fn from_iter<I: IntoIterator<Item = (ElementType, u64)>>(iter: I) -> Self {
        Self {
            counters: iter.into_iter().collect(),
        }
    }
}

/// Persistence collaborator for [`WorkspaceIdStats`]
pub trait StatsStore {
    /// Read the persisted stats; `None` when nothing is stored yet
    fn read(&self) -> Result<Option<WorkspaceIdStats>>;
    /// Persist the given stats
    fn write(&mut self, stats: &WorkspaceIdStats) -> Result<()>;
}

/// In-memory store for tests and embedders with their own persistence
#[derive(Debug, Default)]
pub struct MemoryStatsStore {
    stats: Option<WorkspaceIdStats>,
}

impl StatsStore for MemoryStatsStore {
    fn read(&self) -> Result<Option<WorkspaceIdStats>> {
        Ok(self.stats.clone())
    }

    fn write(&mut self, stats: &WorkspaceIdStats) -> Result<()> {
        self.stats = Some(stats.clone());
        Ok(())
    }
}

/// File-backed store on the workspace document's `id_stats` side field
///
/// Single-process assumption: there is no cross-process locking between
/// read and write.
#[derive(Debug)]
pub struct FileStatsStore {
    dir: PathBuf,
}

impl FileStatsStore {
    /// Create a store rooted at a workspace directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Find the workspace root document in the directory, if present
    fn workspace_file(&self) -> Result<Option<PathBuf>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| Error::io(&self.dir, e))?;
        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .and_then(DocumentType::from_filename)
                    == Some(DocumentType::Workspace)
            })
            .collect();
        candidates.sort();
        Ok(candidates.into_iter().next())
    }
}

impl StatsStore for FileStatsStore {
    fn read(&self) -> Result<Option<WorkspaceIdStats>> {
        let Some(path) = self.workspace_file()? else {
            return Ok(None);
        };
        let text = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let root: serde_yaml::Value = serde_yaml::from_str(&text).map_err(|source| {
            Error::YamlParse {
                path: path.clone(),
                source,
            }
        })?;
        let Some(field) = root.get(STATS_FIELD) else {
            return Ok(None);
        };
        let stats: WorkspaceIdStats = serde_yaml::from_value(field.clone())
            .map_err(|e| Error::stats(&path, format!("malformed '{}' field: {}", STATS_FIELD, e)))?;
        Ok(Some(stats))
    }

    fn write(&mut self, stats: &WorkspaceIdStats) -> Result<()> {
        let path = match self.workspace_file()? {
            Some(path) => path,
            None => self.dir.join("workspace.ubml.yaml"),
        };
        let mut root: serde_yaml::Value = if path.exists() {
            let text = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
            serde_yaml::from_str(&text).map_err(|source| Error::YamlParse {
                path: path.clone(),
                source,
            })?
        } else {
            serde_yaml::Value::Mapping(serde_yaml::Mapping::new())
        };

        let mapping = match &mut root {
            serde_yaml::Value::Mapping(mapping) => mapping,
            _ => {
                return Err(Error::stats(
                    &path,
                    "workspace document root is not a mapping",
                ))
            }
        };
        let stats_value = serde_yaml::to_value(stats)
            .map_err(|e| Error::stats(&path, format!("cannot serialize stats: {}", e)))?;
        mapping.insert(serde_yaml::Value::String(STATS_FIELD.to_string()), stats_value);

        let text = serde_yaml::to_string(&root)
            .map_err(|e| Error::stats(&path, format!("cannot serialize workspace: {}", e)))?;
        let tmp = path.with_extension("yaml.tmp");
        fs::write(&tmp, text).map_err(|e| Error::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| Error::io(&path, e))?;
        Ok(())
    }
}

/// Options for a single allocation
#[derive(Debug, Clone, Copy)]
pub struct AllocationOptions {
    /// Round generated numbers up to the next multiple of 10
    pub use_gaps: bool,
    /// Lowest number the allocator will ever hand out
    pub min_start: u64,
    /// Merge the allocated number back into the persisted stats
    pub update_stats: bool,
}

impl Default for AllocationOptions {
    fn default() -> Self {
        Self {
            use_gaps: true,
            min_start: DEFAULT_MIN_START,
            update_stats: true,
        }
    }
}

/// One allocated identifier and how its starting point was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// The freshly generated identifier
    pub id: String,
    /// True when the cached stats supplied the high-water mark
    pub used_cached_stats: bool,
}

/// Scan every document's defined identifiers, grouped by prefix
///
/// Reuses the same key-matching traversal as definition extraction.
pub fn scan_id_maxima(documents: &[ParsedDocument]) -> BTreeMap<ElementType, u64> {
    let mut maxima: BTreeMap<ElementType, u64> = BTreeMap::new();
    for document in documents {
        walk_defined_keys(document.content(), &mut |id, _path| {
            if let Some((element, number)) = parse_identifier(id) {
                let entry = maxima.entry(element).or_insert(0);
                *entry = (*entry).max(number);
            }
        });
    }
    maxima
}

/// Gap-friendly identifier allocator over a [`StatsStore`]
#[derive(Debug)]
pub struct IdAllocator<S: StatsStore> {
    store: S,
}

impl<S: StatsStore> IdAllocator<S> {
    /// Create an allocator over a persistence store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Allocate the next available identifier for a prefix
    ///
    /// Fast path: the persisted stats already track the prefix. Fallback:
    /// a full scan over `documents`, the same traversal the reference
    /// graph uses for definitions.
    pub fn next_available_id(
        &mut self,
        element: ElementType,
        documents: &[ParsedDocument],
        options: &AllocationOptions,
    ) -> Result<Allocation> {
        let mut stats = self.store.read()?.unwrap_or_default();
        let (max, used_cached_stats) = match stats.get(element) {
            Some(number) => (number, true),
            None => {
                log::debug!(
                    "no cached stats for prefix '{}'; falling back to a full scan",
                    element
                );
                let scanned = scan_id_maxima(documents)
                    .get(&element)
                    .copied()
                    .unwrap_or(0);
                (scanned, false)
            }
        };

        let number = next_number(max, options);
        if options.update_stats {
            stats.merge_max(element, number);
            self.store.write(&stats)?;
        }
        Ok(Allocation {
            id: format_identifier(element, number),
            used_cached_stats,
        })
    }

    /// Allocate several identifiers in one pass
    ///
    /// The starting point is computed once per prefix; within a prefix the
    /// values advance by 10 (gapped) or 1. Only the final, largest number
    /// per prefix is persisted.
    pub fn next_available_ids(
        &mut self,
        requests: &[(ElementType, usize)],
        documents: &[ParsedDocument],
        options: &AllocationOptions,
    ) -> Result<Vec<Allocation>> {
        let mut stats = self.store.read()?.unwrap_or_default();
        let mut scanned: Option<BTreeMap<ElementType, u64>> = None;
        let step = if options.use_gaps { 10 } else { 1 };

        // Per-prefix cursor: (next number to hand out, cached-stats flag).
        let mut cursors: BTreeMap<ElementType, (u64, bool)> = BTreeMap::new();
        let mut allocations = Vec::new();

        for &(element, count) in requests {
            for _ in 0..count {
                let (cursor, used_cached_stats) =
                    match cursors.get(&element) {
                        Some(&state) => state,
                        None => {
                            let (max, cached) = match stats.get(element) {
                                Some(number) => (number, true),
                                None => {
                                    let maxima = scanned
                                        .get_or_insert_with(|| scan_id_maxima(documents));
                                    (maxima.get(&element).copied().unwrap_or(0), false)
                                }
                            };
                            (next_number(max, options), cached)
                        }
                    };
                allocations.push(Allocation {
                    id: format_identifier(element, cursor),
                    used_cached_stats,
                });
                cursors.insert(element, (cursor + step, used_cached_stats));
            }
        }

        if options.update_stats && !cursors.is_empty() {
            for (element, (next, _)) in &cursors {
                // The cursor points one step past the last handed-out value.
                stats.merge_max(*element, next - step);
            }
            self.store.write(&stats)?;
        }
        Ok(allocations)
    }

    /// Recompute the stats from a full scan and overwrite the stored value
    ///
    /// A repair/bootstrap operation, not part of normal allocation: the
    /// result is exactly the scanned maxima, per prefix.
    pub fn sync_id_stats(&mut self, documents: &[ParsedDocument]) -> Result<WorkspaceIdStats> {
        let stats: WorkspaceIdStats = scan_id_maxima(documents).into_iter().collect();
        self.store.write(&stats)?;
        Ok(stats)
    }

    /// True iff a full scan finds the literal identifier already defined
    ///
    /// Used when an identifier is supplied by hand instead of generated.
    pub fn check_id_conflict(&self, id: &str, documents: &[ParsedDocument]) -> bool {
        let mut found = false;
        for document in documents {
            walk_defined_keys(document.content(), &mut |defined, _path| {
                if defined == id {
                    found = true;
                }
            });
        }
        found
    }
}

/// Numbering policy: `min_start` from a cold start, otherwise gap-rounded
/// (next multiple of 10 above the maximum) or plain increment, clamped to
/// at least `min_start`.
fn next_number(max: u64, options: &AllocationOptions) -> u64 {
    if max == 0 {
        return options.min_start;
    }
    let next = if options.use_gaps {
        (max / 10 + 1) * 10
    } else {
        max + 1
    };
    next.max(options.min_start)
}
