//! Application services - validation gate and orchestration over the repository ports.

mod authors;
mod comments;
mod posts;
mod taxonomy;

pub use authors::AuthorService;
pub use comments::CommentService;
pub use posts::PostService;
pub use taxonomy::TaxonomyService;

use uuid::Uuid;

use crate::error::DomainError;
use crate::validation::FieldErrors;

pub(crate) use crate::validation::missing_reference;

/// Reject a write whose unique `field` is already used by another record.
pub(crate) fn ensure_unique<T>(
    existing: Option<T>,
    own_id: Uuid,
    id_of: impl Fn(&T) -> Uuid,
    entity: &str,
    field: &str,
) -> Result<(), DomainError> {
    match existing {
        Some(other) if id_of(&other) != own_id => Err(DomainError::Validation(FieldErrors::single(
            field,
            format!("{entity} with this {field} already exists."),
        ))),
        _ => Ok(()),
    }
}
