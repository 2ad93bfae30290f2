use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::FieldErrors;

/// Author entity - a person who writes posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub bio: String,
}

/// Fields accepted when creating an author.
#[derive(Debug, Clone, Default)]
pub struct NewAuthor {
    pub name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
}

impl Author {
    pub const NAME_MAX_CHARS: usize = 50;

    /// Validate the input and create an author with a generated ID.
    ///
    /// Email uniqueness needs the store and is checked by the service.
    pub fn new(input: NewAuthor) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = errors.required_text("name", input.name, Some(Self::NAME_MAX_CHARS));
        let email = errors.required_email("email", input.email);
        let bio = errors.required_text("bio", input.bio, None);

        match (name, email, bio) {
            (Some(name), Some(email), Some(bio)) if errors.is_empty() => Ok(Self {
                id: Uuid::new_v4(),
                name,
                email,
                bio,
            }),
            _ => Err(errors),
        }
    }
}
