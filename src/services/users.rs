//! User registration, login and self-service profile management

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Duration;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        user::{RegisterUser, UpdateUser, User},
        TokenClaims,
    },
    repository::UsersRepository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: UsersRepository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: UsersRepository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new account; a taken email is `AlreadyExists`
    pub async fn register(&self, user: RegisterUser) -> AppResult<User> {
        user.validate()?;
        let password_hash = hash_password(&user.password)?;

        let created = self.repository.create(&user, &password_hash).await?;
        tracing::info!(user_id = %created.id, "User registered");
        Ok(created)
    }

    /// Authenticate by email and password and return a signed token
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .get_by_email(email.trim())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !verify_password(&user.password_hash, password)? {
            return Err(AppError::Validation("Invalid email or password".to_string()));
        }

        let ttl = Duration::hours(self.config.token_ttl_hours as i64);
        let token = TokenClaims::new(user.id, ttl)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        tracing::debug!(user_id = %user.id, "User logged in");
        Ok((token, user))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        self.repository.get_by_id(id).await
    }

    /// Update the caller's own profile
    pub async fn update(&self, id: Uuid, update: UpdateUser) -> AppResult<User> {
        update.validate()?;
        self.repository.update(id, &update).await
    }

    /// Soft delete the caller's own account
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.soft_delete(id).await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Validation(format!("Password cannot be hashed: {}", e)))?;
    Ok(hash.to_string())
}

pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
