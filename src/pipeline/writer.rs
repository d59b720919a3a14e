use rusqlite::Connection;

use crate::db::repository::insert_entries;
use crate::db::DatabaseError;
use crate::models::NewLedgerEntry;

/// Outcome counts of one import run, reported back to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportCounts {
    pub inserted: usize,
    pub skipped_duplicate: usize,
    pub rejected_invalid: usize,
}

/// Persists a confirmed batch. The whole batch goes through one transaction;
/// a failure on any entry leaves the ledger untouched.
pub struct LedgerWriter;

impl LedgerWriter {
    pub fn persist(
        conn: &mut Connection,
        entries: &[NewLedgerEntry],
        skipped_duplicate: usize,
        rejected_invalid: usize,
    ) -> Result<ImportCounts, DatabaseError> {
        let inserted = insert_entries(conn, entries)?;
        tracing::info!(inserted, skipped_duplicate, rejected_invalid, "batch persisted");
        Ok(ImportCounts { inserted, skipped_duplicate, rejected_invalid })
    }
}
