use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::AccountKind;

pub fn insert_account(
    conn: &Connection,
    user_id: i64,
    name: &str,
    kind: AccountKind,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO accounts (user_id, name, kind) VALUES (?1, ?2, ?3)",
        params![user_id, name, kind.as_str()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_account_name(conn: &Connection, account_id: i64) -> Result<String, DatabaseError> {
    conn.query_row(
        "SELECT name FROM accounts WHERE id = ?1",
        params![account_id],
        |row| row.get(0),
    )
    .optional()?
    .ok_or(DatabaseError::NotFound {
        entity_type: "account".into(),
        id: account_id,
    })
}
