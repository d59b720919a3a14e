use serde::{Deserialize, Serialize};

/// One category with its nested subcategories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub subcategories: Vec<Subcategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: i64,
    pub name: String,
}

/// Read-only snapshot of the category catalog, loaded once per import run.
/// Order follows the store's insertion order so serialized prompts are stable.
#[derive(Debug, Clone, Default)]
pub struct CategoryCatalog {
    categories: Vec<Category>,
}

impl CategoryCatalog {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Case-insensitive exact-name lookup. No fuzzy matching.
    pub fn find_category(&self, name: &str) -> Option<&Category> {
        let needle = name.trim().to_lowercase();
        self.categories
            .iter()
            .find(|c| c.name.to_lowercase() == needle)
    }

    /// Subcategory lookup scoped to an already-resolved category id.
    pub fn find_subcategory(&self, category_id: i64, name: &str) -> Option<&Subcategory> {
        let needle = name.trim().to_lowercase();
        self.categories
            .iter()
            .find(|c| c.id == category_id)?
            .subcategories
            .iter()
            .find(|s| s.name.to_lowercase() == needle)
    }
}
