//! Authentication: password checks and resolving the identity behind a session

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::{
    error::{AppError, AppResult},
    models::{Identity, User},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
}

impl AuthService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// The active user matching these credentials, if any
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<Option<User>> {
        let Some(user) = self.repository.users.get_by_username(username.trim()).await? else {
            return Ok(None);
        };

        if !user.is_active {
            tracing::info!("Login refused for inactive user {}", user.id);
            return Ok(None);
        }

        if !verify_password(&user.password_hash, password)? {
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Identity for a session's user id; `None` if the user vanished or was deactivated
    pub async fn identity(&self, user_id: i32) -> AppResult<Option<Identity>> {
        let Some(user) = self.repository.users.get_by_id(user_id).await? else {
            return Ok(None);
        };
        if !user.is_active {
            return Ok(None);
        }

        let codenames = self.repository.users.permissions(user.id).await?;
        Ok(Some(Identity::new(&user, &codenames)))
    }
}

/// Check a password against a stored Argon2 hash
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}
