//! Append-only JSONL journals, one file per UTC day

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Subdirectories of the store root, one per journal.
pub const JOURNAL_KINDS: [&str; 3] = ["cycles", "executions", "events"];

#[derive(Debug, Clone)]
pub struct JournalStore {
    root: PathBuf,
}

impl JournalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the journal directories up front so a bad root fails at startup.
    pub fn prepare(&self) -> Result<()> {
        for kind in JOURNAL_KINDS {
            let dir = self.root.join(kind);
            fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        Ok(())
    }

    /// `<root>/<kind>/<prefix>_<YYYY-MM-DD>.jsonl`
    pub fn path_for(&self, kind: &str, prefix: &str, day: DateTime<Utc>) -> PathBuf {
        self.root
            .join(kind)
            .join(format!("{}_{}.jsonl", prefix, day.format("%Y-%m-%d")))
    }

    pub(crate) fn append<T: Serialize>(&self, kind: &str, prefix: &str, value: &T) -> Result<PathBuf> {
        let filename = self.path_for(kind, prefix, Utc::now());
        if let Some(dir) = filename.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&filename)
            .with_context(|| format!("Failed to open {}", filename.display()))?;

        writeln!(file, "{}", serde_json::to_string(value)?)?;
        Ok(filename)
    }
}

impl Default for JournalStore {
    fn default() -> Self {
        Self::new("output")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CycleOutcome, CycleReport, SkipReason};

    fn temp_store() -> JournalStore {
        JournalStore::new(std::env::temp_dir().join(format!("journal-{}", uuid::Uuid::new_v4())))
    }

    #[test]
    fn prepare_creates_every_journal_directory() {
        let store = temp_store();
        store.prepare().unwrap();
        for kind in JOURNAL_KINDS {
            assert!(store.root().join(kind).is_dir());
        }
    }

    #[test]
    fn appends_one_line_per_report() {
        let store = temp_store();
        for cycle in 1..=2 {
            let report = CycleReport {
                cycle,
                started_at: Utc::now(),
                duration_ms: 5,
                outcome: CycleOutcome::Skipped {
                    reason: SkipReason::DataUnavailable { reason: "cex timeout".into() },
                },
            };
            store.save_cycle_report(&report).unwrap();
        }

        let path = store.path_for("cycles", "cycles", Utc::now());
        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["cycle"], 1);
        assert_eq!(first["outcome"]["status"], "skipped");
        assert_eq!(first["outcome"]["reason"]["kind"], "data_unavailable");

        fs::remove_dir_all(store.root()).ok();
    }
}
