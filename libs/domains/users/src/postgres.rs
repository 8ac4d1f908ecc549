use async_trait::async_trait;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr,
};

use crate::entity::{password_reset, user};
use crate::error::{UserError, UserResult};
use crate::models::{NewPasswordReset, NewUser, PasswordReset, User, UserFilter};
use crate::repository::UserRepository;

pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn filter_condition(filter: &UserFilter) -> Condition {
        let mut condition = Condition::all();
        if let Some(ref search) = filter.search {
            condition = condition.add(
                Condition::any()
                    .add(user::Column::FullName.contains(search))
                    .add(user::Column::Email.contains(search)),
            );
        }
        if let Some(role) = filter.role {
            condition = condition.add(user::Column::Role.eq(role.to_string()));
        }
        condition
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, input: NewUser) -> UserResult<User> {
        let email = input.email.clone();
        let active_model: user::ActiveModel = input.into();

        let model = user::Entity::insert(active_model)
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => UserError::DuplicateEmail(email),
                _ => e.into(),
            })?;

        tracing::info!(user_id = model.id, "Created user");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i32) -> UserResult<Option<User>> {
        let model = user::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn list(&self, filter: UserFilter) -> UserResult<(Vec<User>, u64)> {
        let condition = Self::filter_condition(&filter);

        let total = user::Entity::find()
            .filter(condition.clone())
            .count(&self.db)
            .await?;

        let models = user::Entity::find()
            .filter(condition)
            .order_by_asc(user::Column::Id)
            .limit(filter.limit)
            .offset(filter.offset)
            .all(&self.db)
            .await?;

        Ok((models.into_iter().map(Into::into).collect(), total))
    }

    async fn update(&self, input: User) -> UserResult<User> {
        let email = input.email.clone();
        let active_model = user::ActiveModel {
            id: Set(input.id),
            full_name: Set(input.full_name),
            email: Set(input.email),
            password_hash: Set(input.password_hash),
            address: Set(input.address),
            phone: Set(input.phone),
            role: Set(input.role.to_string()),
            created_at: Set(input.created_at.into()),
            updated_at: Set(input.updated_at.into()),
        };

        let model = user::Entity::update(active_model)
            .exec(&self.db)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => UserError::DuplicateEmail(email),
                _ => e.into(),
            })?;

        tracing::info!(user_id = model.id, "Updated user");
        Ok(model.into())
    }

    async fn delete(&self, id: i32) -> UserResult<bool> {
        let result = user::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let count = user::Entity::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn create_password_reset(&self, input: NewPasswordReset) -> UserResult<PasswordReset> {
        let active_model: password_reset::ActiveModel = input.into();
        let model = password_reset::Entity::insert(active_model)
            .exec_with_returning(&self.db)
            .await?;
        Ok(model.into())
    }

    async fn get_password_reset(&self, token: &str) -> UserResult<Option<PasswordReset>> {
        let model = password_reset::Entity::find()
            .filter(password_reset::Column::Token.eq(token))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn mark_password_reset_used(&self, id: i32) -> UserResult<()> {
        let active_model = password_reset::ActiveModel {
            id: Set(id),
            used: Set(true),
            ..Default::default()
        };
        password_reset::Entity::update(active_model)
            .exec(&self.db)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use test_utils::TestDatabase;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            full_name: "Pg User".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            address: None,
            phone: None,
            role: Role::User,
        }
    }

    #[tokio::test]
    #[ignore] // Requires Docker for the Postgres container
    async fn test_pg_create_and_fetch() {
        let db = TestDatabase::migrated::<migration::Migrator>().await;
        let repo = PgUserRepository::new(db.connection());

        let created = repo.create(new_user("pg@example.com")).await.unwrap();
        assert!(created.id >= 1);

        let found = repo.get_by_email("pg@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    #[ignore] // Requires Docker for the Postgres container
    async fn test_pg_duplicate_email_maps_to_conflict() {
        let db = TestDatabase::migrated::<migration::Migrator>().await;
        let repo = PgUserRepository::new(db.connection());

        repo.create(new_user("dup@example.com")).await.unwrap();
        let err = repo.create(new_user("dup@example.com")).await.unwrap_err();
        assert!(matches!(err, UserError::DuplicateEmail(_)));
    }

    #[tokio::test]
    #[ignore] // Requires Docker for the Postgres container
    async fn test_pg_list_with_search() {
        let db = TestDatabase::migrated::<migration::Migrator>().await;
        let repo = PgUserRepository::new(db.connection());

        repo.create(new_user("alpha@example.com")).await.unwrap();
        repo.create(new_user("beta@example.com")).await.unwrap();

        let (users, total) = repo
            .list(UserFilter {
                search: Some("alpha".to_string()),
                role: None,
                limit: 10,
                offset: 0,
            })
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(users[0].email, "alpha@example.com");
    }
}
