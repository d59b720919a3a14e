use chrono::{Duration, NaiveDate};
use rusqlite::Connection;

use crate::config::PipelineConfig;
use crate::db::repository::{count_entries_in_month, find_receipt_match, find_statement_match};
use crate::db::DatabaseError;
use crate::models::SourceKind;
use crate::pipeline::validation::ValidTransaction;

#[derive(Debug, PartialEq, Eq)]
pub enum DuplicateVerdict {
    Keep,
    Skip { reason: String },
}

/// Whole-batch decision, used for credit-card invoices where duplicates are
/// detected at the document level rather than per transaction.
#[derive(Debug, PartialEq, Eq)]
pub enum BatchVerdict {
    Proceed,
    DuplicateBatch { reason: String },
}

/// Checks candidates against the ledger. Strategy depends on the document
/// kind; given the same inputs and ledger state the verdicts are always the
/// same.
pub struct DeduplicationEngine<'a> {
    config: &'a PipelineConfig,
}

impl<'a> DeduplicationEngine<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// Document-level check, run once before per-transaction checks.
    pub fn check_batch(
        &self,
        conn: &Connection,
        kind: SourceKind,
        user_id: i64,
        account_id: i64,
        invoice_due_date: Option<&str>,
    ) -> Result<BatchVerdict, DatabaseError> {
        if kind != SourceKind::CreditCardInvoice {
            return Ok(BatchVerdict::Proceed);
        }

        let Some(due_str) = invoice_due_date else {
            tracing::warn!("invoice has no due date, skipping batch duplicate check");
            return Ok(BatchVerdict::Proceed);
        };
        let Ok(due) = NaiveDate::parse_from_str(due_str.trim(), "%d/%m/%Y") else {
            tracing::warn!(due_date = due_str, "unparseable due date, skipping batch duplicate check");
            return Ok(BatchVerdict::Proceed);
        };

        let billing = due - Duration::days(self.config.invoice_billing_offset_days);
        let year = chrono::Datelike::year(&billing);
        let month = chrono::Datelike::month(&billing);

        let existing = count_entries_in_month(conn, user_id, account_id, year, month)?;
        if existing > self.config.invoice_dup_entry_threshold {
            return Ok(BatchVerdict::DuplicateBatch {
                reason: format!(
                    "{existing} entries already recorded for {month:02}/{year} on this card"
                ),
            });
        }
        Ok(BatchVerdict::Proceed)
    }

    pub fn check_transaction(
        &self,
        conn: &Connection,
        kind: SourceKind,
        user_id: i64,
        account_id: i64,
        tx: &ValidTransaction,
    ) -> Result<DuplicateVerdict, DatabaseError> {
        match kind {
            SourceKind::BankStatement => {
                let hit = find_statement_match(
                    conn,
                    user_id,
                    account_id,
                    tx.direction,
                    tx.amount,
                    tx.occurred_at.date(),
                    &tx.description,
                )?;
                Ok(match hit {
                    Some(id) => DuplicateVerdict::Skip {
                        reason: format!("matches existing entry {id}"),
                    },
                    None => DuplicateVerdict::Keep,
                })
            }
            SourceKind::Receipt => {
                // a receipt without a fiscal id cannot be matched reliably
                let Some(fiscal_id) = tx.fiscal_document_id.as_deref() else {
                    return Ok(DuplicateVerdict::Keep);
                };
                let window = Duration::minutes(self.config.receipt_window_minutes);
                let hit = find_receipt_match(
                    conn,
                    user_id,
                    tx.amount,
                    fiscal_id,
                    tx.occurred_at - window,
                    tx.occurred_at + window,
                )?;
                Ok(match hit {
                    Some(id) => DuplicateVerdict::Skip {
                        reason: format!("matches existing receipt entry {id}"),
                    },
                    None => DuplicateVerdict::Keep,
                })
            }
            // invoices are deduplicated at the batch level only
            SourceKind::CreditCardInvoice => Ok(DuplicateVerdict::Keep),
        }
    }
}
