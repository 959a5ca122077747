//! AuthorService handlers

use std::sync::Arc;

use tonic::{Request, Response, Status};

use super::{caller, parse_id};
use crate::{
    clients::{UserDirectory, UserSummary},
    error::AppResult,
    proto::author::{
        author_service_server::AuthorService, Author, AuthorRequest, AuthorsResponse,
        CommonAuthorResponse,
    },
    services::AuthorsService,
};

pub struct AuthorHandler {
    authors: AuthorsService,
    users: Arc<dyn UserDirectory>,
}

impl AuthorHandler {
    pub fn new(authors: AuthorsService, users: Arc<dyn UserDirectory>) -> Self {
        Self { authors, users }
    }

    /// Resolve the caller against the user service
    async fn current_user<T>(&self, request: &Request<T>) -> AppResult<UserSummary> {
        let caller = caller(request)?;
        self.users.current_user(&caller).await
    }
}

#[tonic::async_trait]
impl AuthorService for AuthorHandler {
    async fn create(&self, request: Request<Author>) -> Result<Response<CommonAuthorResponse>, Status> {
        let user = self.current_user(&request).await?;
        let author = self.authors.create(user.id, &request.get_ref().name).await?;

        Ok(Response::new(CommonAuthorResponse {
            message: "Author created successfully".to_string(),
            id: author.id.to_string(),
        }))
    }

    async fn get(&self, request: Request<Author>) -> Result<Response<Author>, Status> {
        let id = parse_id(&request.get_ref().id, "author")?;
        let author = self.authors.get(id).await?;
        Ok(Response::new(author.into()))
    }

    async fn get_list(
        &self,
        request: Request<AuthorRequest>,
    ) -> Result<Response<AuthorsResponse>, Status> {
        self.current_user(&request).await?;
        let authors = self.authors.list(&request.get_ref().search).await?;

        Ok(Response::new(AuthorsResponse {
            authors: authors.into_iter().map(Into::into).collect(),
        }))
    }

    async fn update(&self, request: Request<Author>) -> Result<Response<CommonAuthorResponse>, Status> {
        self.current_user(&request).await?;
        let id = parse_id(&request.get_ref().id, "author")?;
        let author = self.authors.update(id, &request.get_ref().name).await?;

        Ok(Response::new(CommonAuthorResponse {
            message: "Author updated successfully".to_string(),
            id: author.id.to_string(),
        }))
    }

    async fn delete(&self, request: Request<Author>) -> Result<Response<CommonAuthorResponse>, Status> {
        self.current_user(&request).await?;
        let id = parse_id(&request.get_ref().id, "author")?;
        self.authors.delete(id).await?;

        Ok(Response::new(CommonAuthorResponse {
            message: "Author deleted successfully".to_string(),
            id: id.to_string(),
        }))
    }
}
