//! Curriculum CSV import.
//!
//! Rows are `rank,word` with a header line. Malformed rows, out-of-range
//! ranks, and rank clashes are logged and skipped; a single bad row never
//! aborts an import.

use crate::error::{PathwayError, Result};
use crate::store::PathwayStore;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{info, warn};

/// Tally of an import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

impl PathwayStore {
    /// Import a `rank,word` CSV file into the catalog.
    pub fn import_catalog_file(&self, path: &Path) -> Result<ImportReport> {
        let file = File::open(path)?;
        self.import_catalog(BufReader::new(file))
    }

    /// Import `rank,word` CSV lines from any reader. The first line is
    /// treated as a header and skipped.
    pub fn import_catalog<R: Read>(&self, reader: R) -> Result<ImportReport> {
        let mut report = ImportReport::default();

        for (idx, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            if idx == 0 {
                continue;
            }
            let row = line.trim();
            if row.is_empty() {
                continue;
            }

            let Some((rank_field, word_field)) = row.split_once(',') else {
                warn!(line = idx + 1, "skipping malformed row: {}", row);
                report.skipped += 1;
                continue;
            };
            let word = word_field.trim().trim_matches('"');
            let rank: u32 = match rank_field.trim().parse() {
                Ok(rank) => rank,
                Err(_) => {
                    warn!(line = idx + 1, "skipping row with bad rank: {}", row);
                    report.skipped += 1;
                    continue;
                }
            };

            match self.upsert_word(word, rank) {
                Ok(_) => report.imported += 1,
                Err(
                    err @ (PathwayError::RankOutOfRange(_)
                    | PathwayError::DuplicateRank { .. }
                    | PathwayError::MissingField(_)),
                ) => {
                    warn!(line = idx + 1, "skipping \"{}\": {}", word, err);
                    report.skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            imported = report.imported,
            skipped = report.skipped,
            "catalog import finished"
        );
        Ok(report)
    }
}
