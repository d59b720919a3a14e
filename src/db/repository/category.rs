use rusqlite::Connection;

use crate::db::DatabaseError;
use crate::models::{Category, CategoryCatalog, Subcategory};

/// Load the full category catalog with nested subcategories.
/// Called once per import run; the pipeline only touches the snapshot.
pub fn load_catalog(conn: &Connection) -> Result<CategoryCatalog, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY id")?;
    let mut categories: Vec<Category> = stmt
        .query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
                subcategories: Vec::new(),
            })
        })?
        .collect::<Result<_, _>>()?;

    let mut sub_stmt =
        conn.prepare("SELECT category_id, id, name FROM subcategories ORDER BY id")?;
    let subs = sub_stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            Subcategory {
                id: row.get(1)?,
                name: row.get(2)?,
            },
        ))
    })?;

    for sub in subs {
        let (category_id, sub) = sub?;
        if let Some(cat) = categories.iter_mut().find(|c| c.id == category_id) {
            cat.subcategories.push(sub);
        }
    }

    Ok(CategoryCatalog::new(categories))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn loads_seeded_catalog() {
        let conn = open_memory_database().unwrap();
        let catalog = load_catalog(&conn).unwrap();
        assert_eq!(catalog.categories().len(), 13);

        let food = catalog.find_category("Alimentação").unwrap();
        assert!(food
            .subcategories
            .iter()
            .any(|s| s.name == "Supermercado"));
    }

    #[test]
    fn catalog_order_is_stable() {
        let conn = open_memory_database().unwrap();
        let a = load_catalog(&conn).unwrap();
        let b = load_catalog(&conn).unwrap();
        let names_a: Vec<_> = a.categories().iter().map(|c| c.name.clone()).collect();
        let names_b: Vec<_> = b.categories().iter().map(|c| c.name.clone()).collect();
        assert_eq!(names_a, names_b);
        assert_eq!(names_a[0], "Moradia");
    }
}
