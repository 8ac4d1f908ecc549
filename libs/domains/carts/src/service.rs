use std::sync::Arc;

use domain_catalog::repository::CatalogRepository;
use domain_catalog::{Size, Variant};

use crate::error::{CartError, CartResult};
use crate::models::{AddCartRequest, Cart, CartResponse, NewCart};
use crate::repository::CartRepository;

/// Cart business logic; prices come from the catalog at add time
pub struct CartService<R: CartRepository, K: CatalogRepository> {
    carts: Arc<R>,
    catalog: Arc<K>,
}

impl<R: CartRepository, K: CatalogRepository> CartService<R, K> {
    pub fn new(carts: Arc<R>, catalog: Arc<K>) -> Self {
        Self { carts, catalog }
    }

    pub async fn add_to_cart(
        &self,
        user_id: i32,
        input: AddCartRequest,
    ) -> CartResult<CartResponse> {
        let product = self
            .catalog
            .get_product(input.product_id)
            .await?
            .ok_or(CartError::ProductNotFound(input.product_id))?
            .product;

        if input.amount > product.stock {
            return Err(CartError::Validation(
                "Amount exceeds available stock".to_string(),
            ));
        }

        let size = self.resolve_size(input.size_id).await?;
        let variant = self.resolve_variant(input.variant_id).await?;

        let size_cost = size.as_ref().map_or(0.0, |s| s.size_cost);
        let variant_cost = variant.as_ref().map_or(0.0, |v| v.variant_cost);
        let subtotal =
            (product.discounted_price() + size_cost + variant_cost) * f64::from(input.amount);

        let cart = self
            .carts
            .add(NewCart {
                user_id,
                product_id: input.product_id,
                size_id: input.size_id,
                variant_id: input.variant_id,
                amount: input.amount,
                subtotal,
            })
            .await?;

        Ok(CartResponse {
            id: cart.id,
            product_id: cart.product_id,
            product_name: product.name,
            size_id: cart.size_id,
            size_name: size.map(|s| s.name),
            variant_id: cart.variant_id,
            variant_name: variant.map(|v| v.name),
            amount: cart.amount,
            subtotal: cart.subtotal,
        })
    }

    pub async fn list_carts(&self, user_id: i32) -> CartResult<Vec<CartResponse>> {
        let carts = self.carts.list_for_user(user_id).await?;

        let mut result = Vec::with_capacity(carts.len());
        for cart in carts {
            result.push(self.resolve_names(cart).await?);
        }
        Ok(result)
    }

    pub async fn delete_cart(&self, user_id: i32, id: i32) -> CartResult<()> {
        let cart = self.carts.get(id).await?.ok_or(CartError::NotFound(id))?;
        // Rows belonging to other users are indistinguishable from missing
        if cart.user_id != user_id {
            return Err(CartError::NotFound(id));
        }
        self.carts.delete(id).await?;
        Ok(())
    }

    async fn resolve_size(&self, size_id: Option<i32>) -> CartResult<Option<Size>> {
        match size_id {
            Some(id) => Ok(Some(
                self.catalog
                    .get_size(id)
                    .await?
                    .ok_or(CartError::SizeNotFound(id))?,
            )),
            None => Ok(None),
        }
    }

    async fn resolve_variant(&self, variant_id: Option<i32>) -> CartResult<Option<Variant>> {
        match variant_id {
            Some(id) => Ok(Some(
                self.catalog
                    .get_variant(id)
                    .await?
                    .ok_or(CartError::VariantNotFound(id))?,
            )),
            None => Ok(None),
        }
    }

    async fn resolve_names(&self, cart: Cart) -> CartResult<CartResponse> {
        let product = self
            .catalog
            .get_product(cart.product_id)
            .await?
            .ok_or(CartError::ProductNotFound(cart.product_id))?
            .product;

        let size_name = match cart.size_id {
            Some(id) => self.catalog.get_size(id).await?.map(|s| s.name),
            None => None,
        };
        let variant_name = match cart.variant_id {
            Some(id) => self.catalog.get_variant(id).await?.map(|v| v.name),
            None => None,
        };

        Ok(CartResponse {
            id: cart.id,
            product_id: cart.product_id,
            product_name: product.name,
            size_id: cart.size_id,
            size_name,
            variant_id: cart.variant_id,
            variant_name,
            amount: cart.amount,
            subtotal: cart.subtotal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryCartRepository;
    use domain_catalog::models::NewProduct;
    use domain_catalog::InMemoryCatalogRepository;

    async fn setup() -> (
        CartService<InMemoryCartRepository, InMemoryCatalogRepository>,
        Arc<InMemoryCatalogRepository>,
    ) {
        let catalog = Arc::new(InMemoryCatalogRepository::new());
        let service = CartService::new(Arc::new(InMemoryCartRepository::new()), Arc::clone(&catalog));
        (service, catalog)
    }

    fn product(name: &str, price: f64, discount: Option<i32>) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: None,
            price,
            stock: 10,
            is_flash_sale: discount.is_some(),
            discount_percent: discount,
            created_by: None,
            image_urls: vec![],
            category_ids: vec![],
        }
    }

    #[tokio::test]
    async fn test_subtotal_uses_plain_price() {
        let (service, catalog) = setup().await;
        let created = catalog
            .create_product(product("Kopi", 25000.0, None))
            .await
            .unwrap();

        let cart = service
            .add_to_cart(
                1,
                AddCartRequest {
                    product_id: created.product.id,
                    size_id: None,
                    variant_id: None,
                    amount: 2,
                },
            )
            .await
            .unwrap();

        assert!((cart.subtotal - 50000.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_subtotal_applies_discount_and_addons() {
        let (service, catalog) = setup().await;
        let created = catalog
            .create_product(product("Kopi", 20000.0, Some(25)))
            .await
            .unwrap();
        let size = catalog.create_size("Large".to_string(), 2000.0).await.unwrap();
        let variant = catalog
            .create_variant("Oat milk".to_string(), 1000.0)
            .await
            .unwrap();

        let cart = service
            .add_to_cart(
                1,
                AddCartRequest {
                    product_id: created.product.id,
                    size_id: Some(size.id),
                    variant_id: Some(variant.id),
                    amount: 2,
                },
            )
            .await
            .unwrap();

        // (20000 * 0.75 + 2000 + 1000) * 2
        assert!((cart.subtotal - 36000.0).abs() < 1e-9);
        assert_eq!(cart.size_name.as_deref(), Some("Large"));
        assert_eq!(cart.variant_name.as_deref(), Some("Oat milk"));
    }

    #[tokio::test]
    async fn test_amount_beyond_stock_rejected() {
        let (service, catalog) = setup().await;
        let created = catalog
            .create_product(product("Kopi", 25000.0, None))
            .await
            .unwrap();

        let err = service
            .add_to_cart(
                1,
                AddCartRequest {
                    product_id: created.product.id,
                    size_id: None,
                    variant_id: None,
                    amount: 11,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CartError::Validation(msg) if msg == "Amount exceeds available stock"
        ));
    }

    #[tokio::test]
    async fn test_unknown_product_rejected() {
        let (service, _) = setup().await;
        let err = service
            .add_to_cart(
                1,
                AddCartRequest {
                    product_id: 99,
                    size_id: None,
                    variant_id: None,
                    amount: 1,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::ProductNotFound(99)));
    }

    #[tokio::test]
    async fn test_delete_enforces_ownership() {
        let (service, catalog) = setup().await;
        let created = catalog
            .create_product(product("Kopi", 10000.0, None))
            .await
            .unwrap();

        let cart = service
            .add_to_cart(
                1,
                AddCartRequest {
                    product_id: created.product.id,
                    size_id: None,
                    variant_id: None,
                    amount: 1,
                },
            )
            .await
            .unwrap();

        let err = service.delete_cart(2, cart.id).await.unwrap_err();
        assert!(matches!(err, CartError::NotFound(_)));

        service.delete_cart(1, cart.id).await.unwrap();
        assert!(service.list_carts(1).await.unwrap().is_empty());
    }
}
