use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::FieldErrors;

/// Category entity - every post belongs to exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewCategory {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Partial update; absent fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Category {
    pub const NAME_MAX_CHARS: usize = 100;

    pub fn new(input: NewCategory) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = errors.required_text("name", input.name, Some(Self::NAME_MAX_CHARS));
        let slug = name.as_deref().and_then(|name| errors.derived_slug("name", name));
        let description = errors.required_text("description", input.description, None);

        match (name, slug, description) {
            (Some(name), Some(slug), Some(description)) if errors.is_empty() => Ok(Self {
                id: Uuid::new_v4(),
                name,
                slug,
                description,
            }),
            _ => Err(errors),
        }
    }

    /// Apply a partial update. A new name always re-derives the slug.
    pub fn apply(&mut self, patch: CategoryPatch) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = patch
            .name
            .and_then(|name| errors.text("name", name, Some(Self::NAME_MAX_CHARS)));
        let slug = name.as_deref().and_then(|name| errors.derived_slug("name", name));
        let description = patch
            .description
            .and_then(|description| errors.text("description", description, None));

        if !errors.is_empty() {
            return Err(errors);
        }
        if let (Some(name), Some(slug)) = (name, slug) {
            self.name = name;
            self.slug = slug;
        }
        if let Some(description) = description {
            self.description = description;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str) -> Category {
        Category::new(NewCategory {
            name: Some(name.into()),
            description: Some("Things".into()),
        })
        .unwrap()
    }

    #[test]
    fn test_slug_follows_name() {
        let mut category = category("Systems Programming");
        assert_eq!(category.slug, "systems-programming");

        category
            .apply(CategoryPatch {
                name: Some("Embedded Rust".into()),
                description: None,
            })
            .unwrap();
        assert_eq!(category.name, "Embedded Rust");
        assert_eq!(category.slug, "embedded-rust");
    }

    #[test]
    fn test_description_update_keeps_slug() {
        let mut category = category("Databases");
        category
            .apply(CategoryPatch {
                name: None,
                description: Some("Storage engines".into()),
            })
            .unwrap();
        assert_eq!(category.slug, "databases");
        assert_eq!(category.description, "Storage engines");
    }

    #[test]
    fn test_invalid_patch_changes_nothing() {
        let mut category = category("Databases");
        let errors = category
            .apply(CategoryPatch {
                name: Some("Indexes".into()),
                description: Some("  ".into()),
            })
            .unwrap_err();
        assert!(errors.contains("description"));
        assert_eq!(category.name, "Databases");
    }
}
