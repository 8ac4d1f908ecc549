use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::CartResult;
use crate::models::{Cart, NewCart};

/// Repository trait for cart persistence
#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn add(&self, cart: NewCart) -> CartResult<Cart>;

    async fn get(&self, id: i32) -> CartResult<Option<Cart>>;

    async fn list_for_user(&self, user_id: i32) -> CartResult<Vec<Cart>>;

    async fn delete(&self, id: i32) -> CartResult<bool>;

    /// Removes every cart row for the user, returning how many were deleted
    async fn clear_for_user(&self, user_id: i32) -> CartResult<u64>;
}

/// In-memory implementation of CartRepository (for development/testing)
#[derive(Debug, Default)]
pub struct InMemoryCartRepository {
    carts: Arc<RwLock<HashMap<i32, Cart>>>,
    next_id: AtomicI32,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self {
            carts: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicI32::new(1),
        }
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn add(&self, input: NewCart) -> CartResult<Cart> {
        let mut carts = self.carts.write().await;
        let now = Utc::now();
        let cart = Cart {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            user_id: input.user_id,
            product_id: input.product_id,
            size_id: input.size_id,
            variant_id: input.variant_id,
            amount: input.amount,
            subtotal: input.subtotal,
            created_at: now,
            updated_at: now,
        };
        carts.insert(cart.id, cart.clone());
        tracing::info!(cart_id = cart.id, user_id = cart.user_id, "Added cart item");
        Ok(cart)
    }

    async fn get(&self, id: i32) -> CartResult<Option<Cart>> {
        let carts = self.carts.read().await;
        Ok(carts.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: i32) -> CartResult<Vec<Cart>> {
        let carts = self.carts.read().await;
        let mut result: Vec<Cart> = carts
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by_key(|c| c.id);
        Ok(result)
    }

    async fn delete(&self, id: i32) -> CartResult<bool> {
        let mut carts = self.carts.write().await;
        Ok(carts.remove(&id).is_some())
    }

    async fn clear_for_user(&self, user_id: i32) -> CartResult<u64> {
        let mut carts = self.carts.write().await;
        let before = carts.len();
        carts.retain(|_, c| c.user_id != user_id);
        Ok((before - carts.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_cart(user_id: i32, subtotal: f64) -> NewCart {
        NewCart {
            user_id,
            product_id: 1,
            size_id: None,
            variant_id: None,
            amount: 1,
            subtotal,
        }
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_user() {
        let repo = InMemoryCartRepository::new();
        repo.add(new_cart(1, 10000.0)).await.unwrap();
        repo.add(new_cart(2, 20000.0)).await.unwrap();
        repo.add(new_cart(1, 30000.0)).await.unwrap();

        let carts = repo.list_for_user(1).await.unwrap();
        assert_eq!(carts.len(), 2);
        assert!(carts.iter().all(|c| c.user_id == 1));
    }

    #[tokio::test]
    async fn test_clear_for_user_removes_only_theirs() {
        let repo = InMemoryCartRepository::new();
        repo.add(new_cart(1, 10000.0)).await.unwrap();
        repo.add(new_cart(2, 20000.0)).await.unwrap();

        let removed = repo.clear_for_user(1).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(repo.list_for_user(2).await.unwrap().len(), 1);
    }
}
