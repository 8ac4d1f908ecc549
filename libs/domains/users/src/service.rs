use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use email::{password_reset_email, Mailer};
use rand::{distr::Alphanumeric, Rng};
use std::sync::Arc;

use crate::error::{UserError, UserResult};
use crate::models::{
    CreateUser, NewPasswordReset, NewUser, PasswordResetConfirm, RegisterRequest, Role,
    UpdateProfileRequest, UpdateUser, User, UserFilter, UserResponse,
};
use crate::repository::UserRepository;

const RESET_TOKEN_LEN: usize = 40;
const RESET_TOKEN_TTL_HOURS: i64 = 1;

/// Service layer for user business logic
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    mailer: Arc<dyn Mailer>,
    /// Base URL for password-reset links, the token is appended as a query param
    reset_base_url: String,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R, mailer: Arc<dyn Mailer>, reset_base_url: impl Into<String>) -> Self {
        Self {
            repository: Arc::new(repository),
            mailer,
            reset_base_url: reset_base_url.into(),
        }
    }

    /// Register a self-service account (always role `user`)
    pub async fn register(&self, input: RegisterRequest) -> UserResult<UserResponse> {
        self.validate_password(&input.password)?;
        let password_hash = self.hash_password(&input.password)?;

        let created = self
            .repository
            .create(NewUser {
                full_name: input.full_name,
                email: input.email.to_lowercase(),
                password_hash,
                address: input.address,
                phone: input.phone,
                role: Role::User,
            })
            .await?;

        Ok(created.into())
    }

    /// Verify credentials for login, returning the full user so the caller
    /// can mint a token with the role claim
    pub async fn verify_credentials(&self, email: &str, password: &str) -> UserResult<User> {
        let user = self
            .repository
            .get_by_email(email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !self.verify_password(password, &user.password_hash)? {
            return Err(UserError::InvalidCredentials);
        }

        Ok(user)
    }

    pub async fn get_user(&self, id: i32) -> UserResult<UserResponse> {
        let user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;
        Ok(user.into())
    }

    pub async fn update_profile(
        &self,
        id: i32,
        input: UpdateProfileRequest,
    ) -> UserResult<UserResponse> {
        let mut user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        if let Some(full_name) = input.full_name {
            user.full_name = full_name;
        }
        if let Some(address) = input.address {
            user.address = Some(address);
        }
        if let Some(phone) = input.phone {
            user.phone = Some(phone);
        }
        if let Some(ref password) = input.password {
            self.validate_password(password)?;
            user.password_hash = self.hash_password(password)?;
        }
        user.updated_at = Utc::now();

        let updated = self.repository.update(user).await?;
        Ok(updated.into())
    }

    // Admin operations

    pub async fn create_user(&self, input: CreateUser) -> UserResult<UserResponse> {
        self.validate_password(&input.password)?;
        let password_hash = self.hash_password(&input.password)?;

        let role = match input.role.as_deref() {
            Some(r) => r
                .parse::<Role>()
                .map_err(UserError::Validation)?,
            None => Role::User,
        };

        let created = self
            .repository
            .create(NewUser {
                full_name: input.full_name,
                email: input.email.to_lowercase(),
                password_hash,
                address: input.address,
                phone: input.phone,
                role,
            })
            .await?;

        Ok(created.into())
    }

    pub async fn list_users(&self, filter: UserFilter) -> UserResult<(Vec<UserResponse>, u64)> {
        let (users, total) = self.repository.list(filter).await?;
        Ok((users.into_iter().map(Into::into).collect(), total))
    }

    pub async fn update_user(&self, id: i32, input: UpdateUser) -> UserResult<UserResponse> {
        let mut user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        if let Some(ref new_email) = input.email {
            if new_email.to_lowercase() != user.email.to_lowercase()
                && self.repository.email_exists(new_email).await?
            {
                return Err(UserError::DuplicateEmail(new_email.clone()));
            }
            user.email = new_email.to_lowercase();
        }
        if let Some(full_name) = input.full_name {
            user.full_name = full_name;
        }
        if let Some(address) = input.address {
            user.address = Some(address);
        }
        if let Some(phone) = input.phone {
            user.phone = Some(phone);
        }
        if let Some(ref role) = input.role {
            user.role = role.parse().map_err(UserError::Validation)?;
        }
        if let Some(ref password) = input.password {
            self.validate_password(password)?;
            user.password_hash = self.hash_password(password)?;
        }
        user.updated_at = Utc::now();

        let updated = self.repository.update(user).await?;
        Ok(updated.into())
    }

    pub async fn delete_user(&self, id: i32) -> UserResult<()> {
        if !self.repository.delete(id).await? {
            return Err(UserError::NotFound(id));
        }
        Ok(())
    }

    // Password reset

    /// Issue a reset token and email it.
    ///
    /// Always succeeds from the caller's perspective so the endpoint does not
    /// reveal which addresses have accounts.
    pub async fn request_password_reset(&self, email: &str) -> UserResult<()> {
        let Some(user) = self.repository.get_by_email(email).await? else {
            tracing::debug!(email, "Password reset requested for unknown email");
            return Ok(());
        };

        let token: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(RESET_TOKEN_LEN)
            .map(char::from)
            .collect();

        let reset = self
            .repository
            .create_password_reset(NewPasswordReset {
                user_id: user.id,
                token: token.clone(),
                expires_at: Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS),
            })
            .await?;

        let link = format!("{}?token={}", self.reset_base_url, token);
        let message = password_reset_email(&user.email, &user.full_name, &link);
        self.mailer
            .send(&message)
            .await
            .map_err(|e| UserError::Email(e.to_string()))?;

        tracing::info!(user_id = user.id, reset_id = reset.id, "Password reset email sent");
        Ok(())
    }

    pub async fn confirm_password_reset(&self, input: PasswordResetConfirm) -> UserResult<()> {
        let reset = self
            .repository
            .get_password_reset(&input.token)
            .await?
            .ok_or(UserError::InvalidResetToken)?;

        if reset.used || reset.expires_at < Utc::now() {
            return Err(UserError::InvalidResetToken);
        }

        self.validate_password(&input.new_password)?;

        let mut user = self
            .repository
            .get_by_id(reset.user_id)
            .await?
            .ok_or(UserError::InvalidResetToken)?;
        user.password_hash = self.hash_password(&input.new_password)?;
        user.updated_at = Utc::now();

        self.repository.update(user).await?;
        self.repository.mark_password_reset_used(reset.id).await?;

        tracing::info!(user_id = reset.user_id, "Password reset completed");
        Ok(())
    }

    // Password helpers

    fn hash_password(&self, password: &str) -> UserResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserError::PasswordHash(e.to_string()))
    }

    fn verify_password(&self, password: &str, hash: &str) -> UserResult<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn validate_password(&self, password: &str) -> UserResult<()> {
        if password.len() < 8 {
            return Err(UserError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }
        if password.len() > 128 {
            return Err(UserError::Validation(
                "Password cannot exceed 128 characters".to_string(),
            ));
        }
        Ok(())
    }
}
