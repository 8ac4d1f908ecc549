use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use crate::entity::cart;
use crate::error::CartResult;
use crate::models::{Cart, NewCart};
use crate::repository::CartRepository;

pub struct PgCartRepository {
    db: DatabaseConnection,
}

impl PgCartRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CartRepository for PgCartRepository {
    async fn add(&self, input: NewCart) -> CartResult<Cart> {
        let active_model: cart::ActiveModel = input.into();
        let model = cart::Entity::insert(active_model)
            .exec_with_returning(&self.db)
            .await?;

        tracing::info!(cart_id = model.id, user_id = model.user_id, "Added cart item");
        Ok(model.into())
    }

    async fn get(&self, id: i32) -> CartResult<Option<Cart>> {
        let model = cart::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn list_for_user(&self, user_id: i32) -> CartResult<Vec<Cart>> {
        let models = cart::Entity::find()
            .filter(cart::Column::UserId.eq(user_id))
            .order_by_asc(cart::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: i32) -> CartResult<bool> {
        let result = cart::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn clear_for_user(&self, user_id: i32) -> CartResult<u64> {
        let result = cart::Entity::delete_many()
            .filter(cart::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ConnectionTrait;
    use test_utils::TestDatabase;

    async fn seed_fixtures(db: &DatabaseConnection) {
        db.execute_unprepared(
            "INSERT INTO users (full_name, email, password_hash, role, created_at, updated_at) \
             VALUES ('Cart Tester', 'cart@example.com', 'hash', 'user', now(), now())",
        )
        .await
        .unwrap();
        db.execute_unprepared(
            "INSERT INTO products (name, price, stock, is_flash_sale, created_at, updated_at) \
             VALUES ('Kopi', 20000, 10, false, now(), now())",
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires Docker for the Postgres container
    async fn test_pg_cart_round_trip() {
        let db = TestDatabase::migrated::<migration::Migrator>().await;
        seed_fixtures(&db.connection()).await;
        let repo = PgCartRepository::new(db.connection());

        let cart = repo
            .add(NewCart {
                user_id: 1,
                product_id: 1,
                size_id: None,
                variant_id: None,
                amount: 2,
                subtotal: 40000.0,
            })
            .await
            .unwrap();

        let carts = repo.list_for_user(1).await.unwrap();
        assert_eq!(carts.len(), 1);
        assert_eq!(carts[0].subtotal, 40000.0);

        assert_eq!(repo.clear_for_user(1).await.unwrap(), 1);
        assert!(repo.get(cart.id).await.unwrap().is_none());
    }
}
