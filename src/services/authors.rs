//! Author management

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::author::{Author, AuthorName},
    repository::AuthorsRepository,
};

#[derive(Clone)]
pub struct AuthorsService {
    repository: AuthorsRepository,
    list_limit: i64,
}

impl AuthorsService {
    pub fn new(repository: AuthorsRepository, list_limit: i64) -> Self {
        Self {
            repository,
            list_limit,
        }
    }

    pub async fn create(&self, created_by: Uuid, name: &str) -> AppResult<Author> {
        let name = AuthorName::new(name);
        name.validate()?;

        let author = self.repository.create(&name.name, created_by).await?;
        tracing::info!(author_id = %author.id, %created_by, "Author created");
        Ok(author)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Author> {
        self.repository.get_by_id(id).await
    }

    pub async fn list(&self, search: &str) -> AppResult<Vec<Author>> {
        self.repository.list(search, self.list_limit).await
    }

    /// Rename; an empty name leaves the author unchanged
    pub async fn update(&self, id: Uuid, name: &str) -> AppResult<Author> {
        if name.trim().is_empty() {
            return self.repository.get_by_id(id).await;
        }

        let name = AuthorName::new(name);
        name.validate()?;
        self.repository.rename(id, &name.name).await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.soft_delete(id).await?;
        tracing::info!(author_id = %id, "Author deleted");
        Ok(())
    }
}
