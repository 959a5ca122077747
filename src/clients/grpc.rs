//! gRPC implementations of the directory traits

use async_trait::async_trait;
use tonic::{
    transport::{Channel, Endpoint},
    Code, Status,
};
use uuid::Uuid;

use super::{AuthorDirectory, Caller, CategoryDirectory, UserDirectory, UserSummary};
use crate::{
    error::{AppError, AppResult},
    proto::{
        author::{author_service_client::AuthorServiceClient, Author},
        category::{category_service_client::CategoryServiceClient, Category},
        user::{user_service_client::UserServiceClient, Empty},
    },
};

/// Channel that connects on first use, so services may start in any order
fn lazy_channel(endpoint: &str) -> AppResult<Channel> {
    let channel = Endpoint::from_shared(endpoint.to_string())
        .map_err(|e| AppError::Internal(format!("Invalid endpoint {}: {}", endpoint, e)))?
        .connect_lazy();
    Ok(channel)
}

#[derive(Clone)]
pub struct GrpcUserDirectory {
    client: UserServiceClient<Channel>,
}

impl GrpcUserDirectory {
    pub fn connect_lazy(endpoint: &str) -> AppResult<Self> {
        Ok(Self {
            client: UserServiceClient::new(lazy_channel(endpoint)?),
        })
    }
}

fn caller_status(status: Status) -> AppError {
    match status.code() {
        Code::NotFound | Code::PermissionDenied | Code::Unauthenticated => {
            AppError::Authentication(format!("Caller could not be resolved: {}", status.message()))
        }
        _ => AppError::from(status),
    }
}

#[async_trait]
impl UserDirectory for GrpcUserDirectory {
    async fn current_user(&self, caller: &Caller) -> AppResult<UserSummary> {
        let mut client = self.client.clone();
        let user = client
            .get_user(caller.forward(Empty {})?)
            .await
            .map_err(caller_status)?
            .into_inner();

        UserSummary::try_from(user)
    }
}

#[derive(Clone)]
pub struct GrpcAuthorDirectory {
    client: AuthorServiceClient<Channel>,
}

impl GrpcAuthorDirectory {
    pub fn connect_lazy(endpoint: &str) -> AppResult<Self> {
        Ok(Self {
            client: AuthorServiceClient::new(lazy_channel(endpoint)?),
        })
    }
}

#[async_trait]
impl AuthorDirectory for GrpcAuthorDirectory {
    async fn get_author(&self, caller: &Caller, id: Uuid) -> AppResult<Author> {
        let mut client = self.client.clone();
        let request = caller.forward(Author {
            id: id.to_string(),
            ..Default::default()
        })?;

        let author = client.get(request).await?.into_inner();
        Ok(author)
    }
}

#[derive(Clone)]
pub struct GrpcCategoryDirectory {
    client: CategoryServiceClient<Channel>,
}

impl GrpcCategoryDirectory {
    pub fn connect_lazy(endpoint: &str) -> AppResult<Self> {
        Ok(Self {
            client: CategoryServiceClient::new(lazy_channel(endpoint)?),
        })
    }
}

#[async_trait]
impl CategoryDirectory for GrpcCategoryDirectory {
    async fn get_category(&self, caller: &Caller, id: Uuid) -> AppResult<Category> {
        let mut client = self.client.clone();
        let request = caller.forward(Category {
            id: id.to_string(),
            ..Default::default()
        })?;

        let category = client.get(request).await?.into_inner();
        Ok(category)
    }
}
