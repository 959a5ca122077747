//! UserService handlers

use tonic::{Request, Response, Status};

use super::{caller, parse_id};
use crate::{
    models::user::{RegisterUser, UpdateUser},
    proto::user::{
        user_service_server::UserService, CommonUserResponse, Empty, LoginRequest, LoginResponse,
        RegisterRequest, RegisterResponse, User, UserIdRequest,
    },
    services::UsersService,
};

pub struct UserHandler {
    users: UsersService,
}

impl UserHandler {
    pub fn new(users: UsersService) -> Self {
        Self { users }
    }
}

#[tonic::async_trait]
impl UserService for UserHandler {
    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> Result<Response<RegisterResponse>, Status> {
        let user = self
            .users
            .register(RegisterUser::from(request.into_inner()))
            .await?;

        Ok(Response::new(RegisterResponse {
            message: "User registered successfully".to_string(),
            id: user.id.to_string(),
        }))
    }

    async fn login(&self, request: Request<LoginRequest>) -> Result<Response<LoginResponse>, Status> {
        let LoginRequest { email, password } = request.into_inner();
        let (token, user) = self.users.login(&email, &password).await?;

        Ok(Response::new(LoginResponse {
            user: Some(user.into()),
            token,
        }))
    }

    async fn get_user(&self, request: Request<Empty>) -> Result<Response<User>, Status> {
        let caller = caller(&request)?;
        let user = self.users.get_by_id(caller.id).await?;
        Ok(Response::new(user.into()))
    }

    async fn update_user(&self, request: Request<User>) -> Result<Response<CommonUserResponse>, Status> {
        let caller = caller(&request)?;
        self.users
            .update(caller.id, UpdateUser::from(request.into_inner()))
            .await?;

        Ok(Response::new(CommonUserResponse {
            message: "User updated successfully".to_string(),
        }))
    }

    async fn delete_user(&self, request: Request<Empty>) -> Result<Response<CommonUserResponse>, Status> {
        let caller = caller(&request)?;
        self.users.delete(caller.id).await?;

        Ok(Response::new(CommonUserResponse {
            message: "User deleted successfully".to_string(),
        }))
    }

    async fn get_user_by_id(&self, request: Request<UserIdRequest>) -> Result<Response<User>, Status> {
        let id = parse_id(&request.get_ref().id, "user")?;
        let user = self.users.get_by_id(id).await?;
        Ok(Response::new(user.into()))
    }
}
