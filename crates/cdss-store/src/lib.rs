//! cdss-store
//!
//! The durable patient-protocol-fit table: one JSON file, rows unique on
//! (patient, protocol), merged on write with last-writer-wins per key. The
//! rewrite is whole-table and atomic — a temp file in the same directory is
//! renamed over the old one, so the prior table stays authoritative on any
//! failure. Callers serialize access; the store itself holds no lock.

pub mod error;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use cdss_core::models::{PpfRecord, PpfTable};

use crate::error::StoreError;

/// Result of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// Empty input; the file was not touched.
    NoOp,
    Written {
        total: usize,
        replaced: usize,
        inserted: usize,
    },
}

pub struct PpfStore {
    path: PathBuf,
}

impl PpfStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the whole table; `None` when the store has never been written.
    pub fn load(&self) -> Result<Option<PpfTable>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        let table = serde_json::from_slice(&bytes).map_err(|source| StoreError::Malformed {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(table))
    }

    /// Merge `new` into the table: existing rows whose (patient, protocol)
    /// key collides with a new row are discarded, everything else is kept,
    /// and the new rows are appended. Duplicate keys within `new` collapse
    /// to the last row. The written table's declared subscale
    /// columns are always those of the current write, even when kept rows
    /// were computed under an older column set.
    pub fn upsert(&self, new: PpfTable) -> Result<UpsertOutcome, StoreError> {
        if new.rows.is_empty() {
            debug!(path = %self.path.display(), "upsert with no rows, leaving store untouched");
            return Ok(UpsertOutcome::NoOp);
        }

        // Collapse duplicate keys within the batch first, last writer wins,
        // so the written table stays unique on (patient, protocol).
        let mut incoming: Vec<PpfRecord> = Vec::with_capacity(new.rows.len());
        for row in new.rows {
            if let Some(slot) = incoming.iter_mut().find(|r| r.key() == row.key()) {
                *slot = row;
            } else {
                incoming.push(row);
            }
        }

        let existing = self.load()?.map(|t| t.rows).unwrap_or_default();
        let existing_count = existing.len();
        let new_keys: HashSet<_> = incoming.iter().map(PpfRecord::key).collect();

        let mut rows: Vec<PpfRecord> = existing
            .into_iter()
            .filter(|row| !new_keys.contains(&row.key()))
            .collect();
        let replaced = existing_count - rows.len();
        let inserted = incoming.len() - replaced;
        rows.extend(incoming);

        let table = PpfTable {
            subscale_columns: new.subscale_columns,
            rows,
        };
        self.replace(&table)?;

        let total = table.rows.len();
        info!(
            path = %self.path.display(),
            total,
            replaced,
            inserted,
            "PPF table rewritten"
        );
        Ok(UpsertOutcome::Written {
            total,
            replaced,
            inserted,
        })
    }

    /// Atomically replace the on-disk table.
    fn replace(&self, table: &PpfTable) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        let bytes = serde_json::to_vec_pretty(table).map_err(StoreError::Encode)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes).map_err(|source| StoreError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
