use crate::models::CategoryCatalog;

/// Maps the structuring service's suggested category names onto catalog ids.
/// Lookups are case-insensitive and exact; anything else resolves to `None`,
/// which is a valid outcome (the entry is stored uncategorized).
pub struct CategoryResolver<'a> {
    catalog: &'a CategoryCatalog,
}

impl<'a> CategoryResolver<'a> {
    pub fn new(catalog: &'a CategoryCatalog) -> Self {
        Self { catalog }
    }

    pub fn resolve(
        &self,
        category: Option<&str>,
        subcategory: Option<&str>,
    ) -> (Option<i64>, Option<i64>) {
        let Some(cat) = category.and_then(|name| self.catalog.find_category(name)) else {
            return (None, None);
        };
        let sub = subcategory
            .and_then(|name| self.catalog.find_subcategory(cat.id, name))
            .map(|s| s.id);
        (Some(cat.id), sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Subcategory};

    fn catalog() -> CategoryCatalog {
        CategoryCatalog::new(vec![Category {
            id: 3,
            name: "Saúde".into(),
            subcategories: vec![Subcategory { id: 31, name: "Farmácia".into() }],
        }])
    }

    #[test]
    fn resolves_known_pair_case_insensitively() {
        let catalog = catalog();
        let resolver = CategoryResolver::new(&catalog);
        assert_eq!(resolver.resolve(Some("saúde"), Some("FARMÁCIA")), (Some(3), Some(31)));
    }

    #[test]
    fn unknown_subcategory_keeps_the_category() {
        let catalog = catalog();
        let resolver = CategoryResolver::new(&catalog);
        assert_eq!(resolver.resolve(Some("Saúde"), Some("Dentista")), (Some(3), None));
    }

    #[test]
    fn unknown_category_drops_both() {
        let catalog = catalog();
        let resolver = CategoryResolver::new(&catalog);
        assert_eq!(resolver.resolve(Some("Lazer"), Some("Farmácia")), (None, None));
        assert_eq!(resolver.resolve(None, None), (None, None));
    }
}
