//! Category management

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::category::{Category, CategoryName},
    repository::CategoriesRepository,
};

#[derive(Clone)]
pub struct CategoriesService {
    repository: CategoriesRepository,
    list_limit: i64,
}

impl CategoriesService {
    pub fn new(repository: CategoriesRepository, list_limit: i64) -> Self {
        Self {
            repository,
            list_limit,
        }
    }

    pub async fn create(&self, created_by: Uuid, name: &str) -> AppResult<Category> {
        let name = CategoryName::new(name);
        name.validate()?;

        let category = self.repository.create(&name.name, created_by).await?;
        tracing::info!(category_id = %category.id, %created_by, "Category created");
        Ok(category)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Category> {
        self.repository.get_by_id(id).await
    }

    pub async fn list(&self, search: &str) -> AppResult<Vec<Category>> {
        self.repository.list(search, self.list_limit).await
    }

    /// Rename; an empty name leaves the category unchanged
    pub async fn update(&self, id: Uuid, name: &str) -> AppResult<Category> {
        if name.trim().is_empty() {
            return self.repository.get_by_id(id).await;
        }

        let name = CategoryName::new(name);
        name.validate()?;
        self.repository.rename(id, &name.name).await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.soft_delete(id).await?;
        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }
}
