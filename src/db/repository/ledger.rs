use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{Direction, LedgerEntry, NewLedgerEntry};

/// Insert a batch of entries (with their line items) in one transaction.
/// Any failure rolls the whole batch back; no partial writes.
pub fn insert_entries(
    conn: &mut Connection,
    entries: &[NewLedgerEntry],
) -> Result<usize, DatabaseError> {
    let tx = conn.transaction()?;

    for entry in entries {
        tx.execute(
            "INSERT INTO ledger_entries
             (user_id, account_id, description, amount, direction, occurred_at,
              payment_method, fiscal_document_id, category_id, subcategory_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                entry.user_id,
                entry.account_id,
                entry.description,
                entry.amount,
                entry.direction.as_str(),
                entry.occurred_at,
                entry.payment_method,
                entry.fiscal_document_id,
                entry.category_id,
                entry.subcategory_id,
            ],
        )?;
        let entry_id = tx.last_insert_rowid();

        for item in &entry.line_items {
            tx.execute(
                "INSERT INTO line_items (entry_id, item_name, quantity, unit_price)
                 VALUES (?1, ?2, ?3, ?4)",
                params![entry_id, item.item_name, item.quantity, item.unit_price],
            )?;
        }
    }

    tx.commit()?;
    Ok(entries.len())
}

/// Bank-statement duplicate lookup: exact user/account/direction/amount/date
/// plus description substring overlap in either direction.
pub fn find_statement_match(
    conn: &Connection,
    user_id: i64,
    account_id: i64,
    direction: Direction,
    amount: f64,
    date: NaiveDate,
    description: &str,
) -> Result<Option<i64>, DatabaseError> {
    let id = conn
        .query_row(
            "SELECT id FROM ledger_entries
             WHERE user_id = ?1
               AND account_id = ?2
               AND direction = ?3
               AND amount = ?4
               AND date(occurred_at) = ?5
               AND (LOWER(description) LIKE '%' || LOWER(?6) || '%'
                    OR LOWER(?6) LIKE '%' || LOWER(description) || '%')
             LIMIT 1",
            params![
                user_id,
                account_id,
                direction.as_str(),
                amount,
                date.format("%Y-%m-%d").to_string(),
                description.trim(),
            ],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Receipt duplicate lookup: same user, same amount, same fiscal document id,
/// timestamp inside the given window.
pub fn find_receipt_match(
    conn: &Connection,
    user_id: i64,
    amount: f64,
    fiscal_document_id: &str,
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
) -> Result<Option<i64>, DatabaseError> {
    let id = conn
        .query_row(
            "SELECT id FROM ledger_entries
             WHERE user_id = ?1
               AND amount = ?2
               AND fiscal_document_id = ?3
               AND occurred_at BETWEEN ?4 AND ?5
             LIMIT 1",
            params![user_id, amount, fiscal_document_id, window_start, window_end],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Count a user's entries on an account within a calendar month.
/// Used by the invoice-level duplicate heuristic.
pub fn count_entries_in_month(
    conn: &Connection,
    user_id: i64,
    account_id: i64,
    year: i32,
    month: u32,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM ledger_entries
         WHERE user_id = ?1
           AND account_id = ?2
           AND CAST(strftime('%Y', occurred_at) AS INTEGER) = ?3
           AND CAST(strftime('%m', occurred_at) AS INTEGER) = ?4",
        params![user_id, account_id, year, month],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn count_all_entries(conn: &Connection, user_id: i64) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM ledger_entries WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn list_entries(conn: &Connection, user_id: i64) -> Result<Vec<LedgerEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, account_id, description, amount, direction, occurred_at,
                payment_method, fiscal_document_id, category_id, subcategory_id
         FROM ledger_entries WHERE user_id = ?1 ORDER BY occurred_at, id",
    )?;
    let rows = stmt.query_map(params![user_id], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, Option<i64>>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, f64>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, NaiveDateTime>(6)?,
            row.get::<_, Option<String>>(7)?,
            row.get::<_, Option<String>>(8)?,
            row.get::<_, Option<i64>>(9)?,
            row.get::<_, Option<i64>>(10)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (id, user_id, account_id, description, amount, direction, occurred_at,
             payment_method, fiscal_document_id, category_id, subcategory_id) = row?;
        entries.push(LedgerEntry {
            id,
            user_id,
            account_id,
            description,
            amount,
            direction: direction.parse()?,
            occurred_at,
            payment_method,
            fiscal_document_id,
            category_id,
            subcategory_id,
        });
    }
    Ok(entries)
}
