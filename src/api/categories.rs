//! CategoryService handlers

use std::sync::Arc;

use tonic::{Request, Response, Status};

use super::{caller, parse_id};
use crate::{
    clients::{UserDirectory, UserSummary},
    error::AppResult,
    proto::category::{
        category_service_server::CategoryService, Category, CategoryRequest, CategoriesResponse,
        CommonCategoryResponse,
    },
    services::CategoriesService,
};

pub struct CategoryHandler {
    categories: CategoriesService,
    users: Arc<dyn UserDirectory>,
}

impl CategoryHandler {
    pub fn new(categories: CategoriesService, users: Arc<dyn UserDirectory>) -> Self {
        Self { categories, users }
    }

    /// Resolve the caller against the user service
    async fn current_user<T>(&self, request: &Request<T>) -> AppResult<UserSummary> {
        let caller = caller(request)?;
        self.users.current_user(&caller).await
    }
}

#[tonic::async_trait]
impl CategoryService for CategoryHandler {
    async fn create(&self, request: Request<Category>) -> Result<Response<CommonCategoryResponse>, Status> {
        let user = self.current_user(&request).await?;
        let category = self.categories.create(user.id, &request.get_ref().name).await?;

        Ok(Response::new(CommonCategoryResponse {
            message: "Category created successfully".to_string(),
            id: category.id.to_string(),
        }))
    }

    async fn get(&self, request: Request<Category>) -> Result<Response<Category>, Status> {
        let id = parse_id(&request.get_ref().id, "category")?;
        let category = self.categories.get(id).await?;
        Ok(Response::new(category.into()))
    }

    async fn get_list(
        &self,
        request: Request<CategoryRequest>,
    ) -> Result<Response<CategoriesResponse>, Status> {
        self.current_user(&request).await?;
        let categories = self.categories.list(&request.get_ref().search).await?;

        Ok(Response::new(CategoriesResponse {
            categories: categories.into_iter().map(Into::into).collect(),
        }))
    }

    async fn update(&self, request: Request<Category>) -> Result<Response<CommonCategoryResponse>, Status> {
        self.current_user(&request).await?;
        let id = parse_id(&request.get_ref().id, "category")?;
        let category = self.categories.update(id, &request.get_ref().name).await?;

        Ok(Response::new(CommonCategoryResponse {
            message: "Category updated successfully".to_string(),
            id: category.id.to_string(),
        }))
    }

    async fn delete(&self, request: Request<Category>) -> Result<Response<CommonCategoryResponse>, Status> {
        self.current_user(&request).await?;
        let id = parse_id(&request.get_ref().id, "category")?;
        self.categories.delete(id).await?;

        Ok(Response::new(CommonCategoryResponse {
            message: "Category deleted successfully".to_string(),
            id: id.to_string(),
        }))
    }
}
