use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;

/// Look a user up by the front-end's external id, creating it if missing.
pub fn get_or_create_user(
    conn: &Connection,
    external_id: i64,
    display_name: &str,
) -> Result<i64, DatabaseError> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM users WHERE external_id = ?1",
            params![external_id],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute(
        "INSERT INTO users (external_id, display_name) VALUES (?1, ?2)",
        params![external_id, display_name],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_user_display_name(conn: &Connection, user_id: i64) -> Result<String, DatabaseError> {
    conn.query_row(
        "SELECT COALESCE(display_name, '') FROM users WHERE id = ?1",
        params![user_id],
        |row| row.get(0),
    )
    .optional()?
    .ok_or(DatabaseError::NotFound {
        entity_type: "user".into(),
        id: user_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn get_or_create_is_idempotent() {
        let conn = open_memory_database().unwrap();
        let a = get_or_create_user(&conn, 42, "Ana").unwrap();
        let b = get_or_create_user(&conn, 42, "Ana").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_external_ids_get_distinct_rows() {
        let conn = open_memory_database().unwrap();
        let a = get_or_create_user(&conn, 1, "Ana").unwrap();
        let b = get_or_create_user(&conn, 2, "Bruno").unwrap();
        assert_ne!(a, b);
        assert_eq!(get_user_display_name(&conn, b).unwrap(), "Bruno");
    }
}
