use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    Category, NewProduct, NewProductImage, Product, ProductDetail, ProductFilter, ProductImage,
    Size, Variant,
};

/// Repository trait for the catalog tables
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn create_product(&self, product: NewProduct) -> CatalogResult<ProductDetail>;

    async fn get_product(&self, id: i32) -> CatalogResult<Option<ProductDetail>>;

    /// Returns the matching page plus the total count for pagination
    async fn list_products(&self, filter: ProductFilter) -> CatalogResult<(Vec<ProductDetail>, u64)>;

    /// Updates the product row; `images`/`category_ids` replace the full sets
    /// when present
    async fn update_product(
        &self,
        product: Product,
        images: Option<Vec<NewProductImage>>,
        category_ids: Option<Vec<i32>>,
    ) -> CatalogResult<ProductDetail>;

    async fn delete_product(&self, id: i32) -> CatalogResult<bool>;

    async fn list_categories(&self) -> CatalogResult<Vec<Category>>;

    async fn get_category(&self, id: i32) -> CatalogResult<Option<Category>>;

    async fn create_category(&self, name: String) -> CatalogResult<Category>;

    async fn update_category(&self, category: Category) -> CatalogResult<Category>;

    async fn delete_category(&self, id: i32) -> CatalogResult<bool>;

    async fn list_sizes(&self) -> CatalogResult<Vec<Size>>;

    async fn get_size(&self, id: i32) -> CatalogResult<Option<Size>>;

    async fn create_size(&self, name: String, size_cost: f64) -> CatalogResult<Size>;

    async fn update_size(&self, size: Size) -> CatalogResult<Size>;

    async fn delete_size(&self, id: i32) -> CatalogResult<bool>;

    async fn list_variants(&self) -> CatalogResult<Vec<Variant>>;

    async fn get_variant(&self, id: i32) -> CatalogResult<Option<Variant>>;

    async fn create_variant(&self, name: String, variant_cost: f64) -> CatalogResult<Variant>;

    async fn update_variant(&self, variant: Variant) -> CatalogResult<Variant>;

    async fn delete_variant(&self, id: i32) -> CatalogResult<bool>;
}

#[derive(Debug, Default)]
struct CatalogState {
    products: HashMap<i32, Product>,
    images: HashMap<i32, Vec<ProductImage>>,
    categories: HashMap<i32, Category>,
    product_categories: HashMap<i32, Vec<i32>>,
    sizes: HashMap<i32, Size>,
    variants: HashMap<i32, Variant>,
}

/// In-memory implementation of CatalogRepository (for development/testing)
#[derive(Debug, Default)]
pub struct InMemoryCatalogRepository {
    state: Arc<RwLock<CatalogState>>,
    next_id: AtomicI32,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(CatalogState::default())),
            next_id: AtomicI32::new(1),
        }
    }

    fn next_id(&self) -> i32 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

fn detail(state: &CatalogState, product: &Product) -> ProductDetail {
    let images = state.images.get(&product.id).cloned().unwrap_or_default();
    let categories = state
        .product_categories
        .get(&product.id)
        .map(|ids| {
            ids.iter()
                .filter_map(|id| state.categories.get(id).cloned())
                .collect()
        })
        .unwrap_or_default();
    ProductDetail {
        product: product.clone(),
        images,
        categories,
    }
}

fn matches(state: &CatalogState, product: &Product, filter: &ProductFilter) -> bool {
    if let Some(ref search) = filter.search {
        if !product
            .name
            .to_lowercase()
            .contains(&search.to_lowercase())
        {
            return false;
        }
    }
    if let Some(flash_sale) = filter.flash_sale {
        if product.is_flash_sale != flash_sale {
            return false;
        }
    }
    if let Some(category_id) = filter.category_id {
        let in_category = state
            .product_categories
            .get(&product.id)
            .is_some_and(|ids| ids.contains(&category_id));
        if !in_category {
            return false;
        }
    }
    true
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn create_product(&self, input: NewProduct) -> CatalogResult<ProductDetail> {
        let mut state = self.state.write().await;

        for category_id in &input.category_ids {
            if !state.categories.contains_key(category_id) {
                return Err(CatalogError::CategoryNotFound(*category_id));
            }
        }

        let now = Utc::now();
        let product = Product {
            id: self.next_id(),
            name: input.name,
            description: input.description,
            price: input.price,
            stock: input.stock,
            is_flash_sale: input.is_flash_sale,
            discount_percent: input.discount_percent,
            created_by: input.created_by,
            updated_by: None,
            created_at: now,
            updated_at: now,
        };

        let images: Vec<ProductImage> = input
            .image_urls
            .into_iter()
            .map(|i| ProductImage {
                id: self.next_id(),
                product_id: product.id,
                image_url: i.image_url,
                is_primary: i.is_primary,
            })
            .collect();

        state.images.insert(product.id, images);
        state
            .product_categories
            .insert(product.id, input.category_ids);
        state.products.insert(product.id, product.clone());

        tracing::info!(product_id = product.id, "Created product");
        Ok(detail(&state, &product))
    }

    async fn get_product(&self, id: i32) -> CatalogResult<Option<ProductDetail>> {
        let state = self.state.read().await;
        Ok(state.products.get(&id).map(|p| detail(&state, p)))
    }

    async fn list_products(&self, filter: ProductFilter) -> CatalogResult<(Vec<ProductDetail>, u64)> {
        let state = self.state.read().await;

        let mut result: Vec<&Product> = state
            .products
            .values()
            .filter(|p| matches(&state, p, &filter))
            .collect();
        result.sort_by_key(|p| p.id);
        let total = result.len() as u64;

        let page = result
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .map(|p| detail(&state, p))
            .collect();

        Ok((page, total))
    }

    async fn update_product(
        &self,
        product: Product,
        images: Option<Vec<NewProductImage>>,
        category_ids: Option<Vec<i32>>,
    ) -> CatalogResult<ProductDetail> {
        let mut state = self.state.write().await;

        if !state.products.contains_key(&product.id) {
            return Err(CatalogError::ProductNotFound(product.id));
        }

        if let Some(ref ids) = category_ids {
            for category_id in ids {
                if !state.categories.contains_key(category_id) {
                    return Err(CatalogError::CategoryNotFound(*category_id));
                }
            }
        }

        if let Some(images) = images {
            let images: Vec<ProductImage> = images
                .into_iter()
                .map(|i| ProductImage {
                    id: self.next_id(),
                    product_id: product.id,
                    image_url: i.image_url,
                    is_primary: i.is_primary,
                })
                .collect();
            state.images.insert(product.id, images);
        }
        if let Some(ids) = category_ids {
            state.product_categories.insert(product.id, ids);
        }
        state.products.insert(product.id, product.clone());

        tracing::info!(product_id = product.id, "Updated product");
        Ok(detail(&state, &product))
    }

    async fn delete_product(&self, id: i32) -> CatalogResult<bool> {
        let mut state = self.state.write().await;
        let removed = state.products.remove(&id).is_some();
        if removed {
            state.images.remove(&id);
            state.product_categories.remove(&id);
            tracing::info!(product_id = id, "Deleted product");
        }
        Ok(removed)
    }

    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let state = self.state.read().await;
        let mut categories: Vec<Category> = state.categories.values().cloned().collect();
        categories.sort_by_key(|c| c.id);
        Ok(categories)
    }

    async fn get_category(&self, id: i32) -> CatalogResult<Option<Category>> {
        let state = self.state.read().await;
        Ok(state.categories.get(&id).cloned())
    }

    async fn create_category(&self, name: String) -> CatalogResult<Category> {
        let mut state = self.state.write().await;

        let name_taken = state
            .categories
            .values()
            .any(|c| c.name.to_lowercase() == name.to_lowercase());
        if name_taken {
            return Err(CatalogError::DuplicateName(name));
        }

        let category = Category {
            id: self.next_id(),
            name,
        };
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update_category(&self, category: Category) -> CatalogResult<Category> {
        let mut state = self.state.write().await;

        if !state.categories.contains_key(&category.id) {
            return Err(CatalogError::CategoryNotFound(category.id));
        }
        let name_taken = state
            .categories
            .values()
            .any(|c| c.id != category.id && c.name.to_lowercase() == category.name.to_lowercase());
        if name_taken {
            return Err(CatalogError::DuplicateName(category.name));
        }

        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete_category(&self, id: i32) -> CatalogResult<bool> {
        let mut state = self.state.write().await;
        let removed = state.categories.remove(&id).is_some();
        if removed {
            for ids in state.product_categories.values_mut() {
                ids.retain(|c| *c != id);
            }
        }
        Ok(removed)
    }

    async fn list_sizes(&self) -> CatalogResult<Vec<Size>> {
        let state = self.state.read().await;
        let mut sizes: Vec<Size> = state.sizes.values().cloned().collect();
        sizes.sort_by_key(|s| s.id);
        Ok(sizes)
    }

    async fn get_size(&self, id: i32) -> CatalogResult<Option<Size>> {
        let state = self.state.read().await;
        Ok(state.sizes.get(&id).cloned())
    }

    async fn create_size(&self, name: String, size_cost: f64) -> CatalogResult<Size> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let size = Size {
            id: self.next_id(),
            name,
            size_cost,
            created_at: now,
            updated_at: now,
        };
        state.sizes.insert(size.id, size.clone());
        Ok(size)
    }

    async fn update_size(&self, size: Size) -> CatalogResult<Size> {
        let mut state = self.state.write().await;
        if !state.sizes.contains_key(&size.id) {
            return Err(CatalogError::SizeNotFound(size.id));
        }
        state.sizes.insert(size.id, size.clone());
        Ok(size)
    }

    async fn delete_size(&self, id: i32) -> CatalogResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.sizes.remove(&id).is_some())
    }

    async fn list_variants(&self) -> CatalogResult<Vec<Variant>> {
        let state = self.state.read().await;
        let mut variants: Vec<Variant> = state.variants.values().cloned().collect();
        variants.sort_by_key(|v| v.id);
        Ok(variants)
    }

    async fn get_variant(&self, id: i32) -> CatalogResult<Option<Variant>> {
        let state = self.state.read().await;
        Ok(state.variants.get(&id).cloned())
    }

    async fn create_variant(&self, name: String, variant_cost: f64) -> CatalogResult<Variant> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let variant = Variant {
            id: self.next_id(),
            name,
            variant_cost,
            created_at: now,
            updated_at: now,
        };
        state.variants.insert(variant.id, variant.clone());
        Ok(variant)
    }

    async fn update_variant(&self, variant: Variant) -> CatalogResult<Variant> {
        let mut state = self.state.write().await;
        if !state.variants.contains_key(&variant.id) {
            return Err(CatalogError::VariantNotFound(variant.id));
        }
        state.variants.insert(variant.id, variant.clone());
        Ok(variant)
    }

    async fn delete_variant(&self, id: i32) -> CatalogResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.variants.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(name: &str, category_ids: Vec<i32>) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: None,
            price: 20000.0,
            stock: 10,
            is_flash_sale: false,
            discount_percent: None,
            created_by: None,
            image_urls: vec![],
            category_ids,
        }
    }

    #[tokio::test]
    async fn test_create_product_rejects_unknown_category() {
        let repo = InMemoryCatalogRepository::new();
        let err = repo
            .create_product(new_product("Kopi", vec![99]))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::CategoryNotFound(99)));
    }

    #[tokio::test]
    async fn test_create_product_resolves_categories_and_images() {
        let repo = InMemoryCatalogRepository::new();
        let coffee = repo.create_category("Coffee".to_string()).await.unwrap();

        let mut input = new_product("Kopi Susu", vec![coffee.id]);
        input.image_urls = vec![NewProductImage {
            image_url: "https://cdn.example/kopi.jpg".to_string(),
            is_primary: true,
        }];

        let created = repo.create_product(input).await.unwrap();
        assert_eq!(created.categories.len(), 1);
        assert_eq!(created.categories[0].name, "Coffee");
        assert_eq!(created.images.len(), 1);
        assert!(created.images[0].is_primary);
    }

    #[tokio::test]
    async fn test_list_products_filters() {
        let repo = InMemoryCatalogRepository::new();
        let coffee = repo.create_category("Coffee".to_string()).await.unwrap();

        repo.create_product(new_product("Kopi Susu", vec![coffee.id]))
            .await
            .unwrap();
        let mut flash = new_product("Es Teh", vec![]);
        flash.is_flash_sale = true;
        repo.create_product(flash).await.unwrap();

        let (page, total) = repo
            .list_products(ProductFilter {
                search: Some("kopi".to_string()),
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(page[0].product.name, "Kopi Susu");

        let (page, total) = repo
            .list_products(ProductFilter {
                flash_sale: Some(true),
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(page[0].product.name, "Es Teh");

        let (page, total) = repo
            .list_products(ProductFilter {
                category_id: Some(coffee.id),
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(page[0].product.name, "Kopi Susu");
    }

    #[tokio::test]
    async fn test_duplicate_category_name_rejected() {
        let repo = InMemoryCatalogRepository::new();
        repo.create_category("Coffee".to_string()).await.unwrap();
        let err = repo
            .create_category("coffee".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateName(_)));
    }

    #[tokio::test]
    async fn test_delete_category_detaches_products() {
        let repo = InMemoryCatalogRepository::new();
        let coffee = repo.create_category("Coffee".to_string()).await.unwrap();
        let created = repo
            .create_product(new_product("Kopi", vec![coffee.id]))
            .await
            .unwrap();

        assert!(repo.delete_category(coffee.id).await.unwrap());
        let found = repo.get_product(created.product.id).await.unwrap().unwrap();
        assert!(found.categories.is_empty());
    }
}
