use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{NewPasswordReset, NewUser, PasswordReset, User, UserFilter};

/// Repository trait for user persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> UserResult<User>;

    async fn get_by_id(&self, id: i32) -> UserResult<Option<User>>;

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// Returns the matching page plus the total count for pagination
    async fn list(&self, filter: UserFilter) -> UserResult<(Vec<User>, u64)>;

    async fn update(&self, user: User) -> UserResult<User>;

    async fn delete(&self, id: i32) -> UserResult<bool>;

    async fn email_exists(&self, email: &str) -> UserResult<bool>;

    async fn create_password_reset(&self, reset: NewPasswordReset) -> UserResult<PasswordReset>;

    async fn get_password_reset(&self, token: &str) -> UserResult<Option<PasswordReset>>;

    async fn mark_password_reset_used(&self, id: i32) -> UserResult<()>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<i32, User>>>,
    resets: Arc<RwLock<HashMap<i32, PasswordReset>>>,
    next_user_id: AtomicI32,
    next_reset_id: AtomicI32,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            resets: Arc::new(RwLock::new(HashMap::new())),
            next_user_id: AtomicI32::new(1),
            next_reset_id: AtomicI32::new(1),
        }
    }
}

fn matches(user: &User, filter: &UserFilter) -> bool {
    if let Some(ref search) = filter.search {
        let needle = search.to_lowercase();
        if !user.full_name.to_lowercase().contains(&needle)
            && !user.email.to_lowercase().contains(&needle)
        {
            return false;
        }
    }
    if let Some(role) = filter.role {
        if user.role != role {
            return false;
        }
    }
    true
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> UserResult<User> {
        let mut users = self.users.write().await;

        let email_exists = users
            .values()
            .any(|u| u.email.to_lowercase() == user.email.to_lowercase());
        if email_exists {
            return Err(UserError::DuplicateEmail(user.email));
        }

        let now = Utc::now();
        let user = User {
            id: self.next_user_id.fetch_add(1, Ordering::SeqCst),
            full_name: user.full_name,
            email: user.email,
            password_hash: user.password_hash,
            address: user.address,
            phone: user.phone,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());

        tracing::info!(user_id = user.id, email = %user.email, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: i32) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.email.to_lowercase() == email.to_lowercase())
            .cloned())
    }

    async fn list(&self, filter: UserFilter) -> UserResult<(Vec<User>, u64)> {
        let users = self.users.read().await;

        let mut result: Vec<User> = users.values().filter(|u| matches(u, &filter)).cloned().collect();
        result.sort_by_key(|u| u.id);
        let total = result.len() as u64;

        let page: Vec<User> = result
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect();

        Ok((page, total))
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id));
        }

        let email_taken = users
            .values()
            .any(|u| u.id != user.id && u.email.to_lowercase() == user.email.to_lowercase());
        if email_taken {
            return Err(UserError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());
        tracing::info!(user_id = user.id, "Updated user");
        Ok(user)
    }

    async fn delete(&self, id: i32) -> UserResult<bool> {
        let mut users = self.users.write().await;
        if users.remove(&id).is_some() {
            tracing::info!(user_id = id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .any(|u| u.email.to_lowercase() == email.to_lowercase()))
    }

    async fn create_password_reset(&self, reset: NewPasswordReset) -> UserResult<PasswordReset> {
        let mut resets = self.resets.write().await;
        let reset = PasswordReset {
            id: self.next_reset_id.fetch_add(1, Ordering::SeqCst),
            user_id: reset.user_id,
            token: reset.token,
            expires_at: reset.expires_at,
            used: false,
            created_at: Utc::now(),
        };
        resets.insert(reset.id, reset.clone());
        Ok(reset)
    }

    async fn get_password_reset(&self, token: &str) -> UserResult<Option<PasswordReset>> {
        let resets = self.resets.read().await;
        Ok(resets.values().find(|r| r.token == token).cloned())
    }

    async fn mark_password_reset_used(&self, id: i32) -> UserResult<()> {
        let mut resets = self.resets.write().await;
        if let Some(reset) = resets.get_mut(&id) {
            reset.used = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            full_name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            address: None,
            phone: None,
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = InMemoryUserRepository::new();
        let a = repo.create(new_user("a@example.com")).await.unwrap();
        let b = repo.create(new_user("b@example.com")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email_case_insensitive() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("dup@example.com")).await.unwrap();
        let err = repo.create(new_user("DUP@example.com")).await.unwrap_err();
        assert!(matches!(err, UserError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn test_list_filters_and_paginates() {
        let repo = InMemoryUserRepository::new();
        for i in 0..5 {
            repo.create(new_user(&format!("user{}@example.com", i)))
                .await
                .unwrap();
        }

        let (page, total) = repo
            .list(UserFilter {
                search: None,
                role: None,
                limit: 2,
                offset: 2,
            })
            .await
            .unwrap();
        assert_eq!(total, 5);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, 3);

        let (found, total) = repo
            .list(UserFilter {
                search: Some("user3".to_string()),
                role: None,
                limit: 10,
                offset: 0,
            })
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(found[0].email, "user3@example.com");
    }

    #[tokio::test]
    async fn test_password_reset_lifecycle() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("reset@example.com")).await.unwrap();

        let reset = repo
            .create_password_reset(NewPasswordReset {
                user_id: user.id,
                token: "tok-123".to_string(),
                expires_at: Utc::now() + chrono::Duration::hours(1),
            })
            .await
            .unwrap();
        assert!(!reset.used);

        let found = repo.get_password_reset("tok-123").await.unwrap().unwrap();
        assert_eq!(found.user_id, user.id);

        repo.mark_password_reset_used(reset.id).await.unwrap();
        let found = repo.get_password_reset("tok-123").await.unwrap().unwrap();
        assert!(found.used);
    }
}
