use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::FieldErrors;

/// Tag entity - a free-form label shared by many posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewTag {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TagPatch {
    pub name: Option<String>,
}

impl Tag {
    pub const NAME_MAX_CHARS: usize = 100;

    pub fn new(input: NewTag) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = errors.required_text("name", input.name, Some(Self::NAME_MAX_CHARS));
        let slug = name.as_deref().and_then(|name| errors.derived_slug("name", name));

        match (name, slug) {
            (Some(name), Some(slug)) => Ok(Self {
                id: Uuid::new_v4(),
                name,
                slug,
            }),
            _ => Err(errors),
        }
    }

    pub fn apply(&mut self, patch: TagPatch) -> Result<(), FieldErrors> {
        let Some(name) = patch.name else {
            return Ok(());
        };
        let mut errors = FieldErrors::new();
        let name = errors.text("name", name, Some(Self::NAME_MAX_CHARS));
        let slug = name.as_deref().and_then(|name| errors.derived_slug("name", name));

        match (name, slug) {
            (Some(name), Some(slug)) => {
                self.name = name;
                self.slug = slug;
                Ok(())
            }
            _ => Err(errors),
        }
    }
}
