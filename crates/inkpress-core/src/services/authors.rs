use uuid::Uuid;

use crate::domain::{Author, NewAuthor};
use crate::error::DomainError;
use crate::ports::Repositories;

use super::ensure_unique;

#[derive(Clone)]
pub struct AuthorService {
    repos: Repositories,
}

impl AuthorService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn create(&self, input: NewAuthor) -> Result<Author, DomainError> {
        let author = Author::new(input)?;
        let existing = self.repos.authors.find_by_email(&author.email).await?;
        ensure_unique(existing, author.id, |a| a.id, "author", "email")?;

        let author = self.repos.authors.save(author).await?;
        tracing::info!(author_id = %author.id, "Author created");
        Ok(author)
    }

    pub async fn get(&self, id: Uuid) -> Result<Author, DomainError> {
        self.repos
            .authors
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Author", id))
    }

    pub async fn list(&self) -> Result<Vec<Author>, DomainError> {
        Ok(self.repos.authors.list().await?)
    }
}
