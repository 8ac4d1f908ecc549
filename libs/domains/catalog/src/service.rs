use chrono::Utc;
use std::sync::Arc;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    Category, CategoryRequest, CreateProductRequest, NewProduct, ProductDetail, ProductFilter,
    Size, SizeRequest, UpdateProductRequest, Variant, VariantRequest,
};
use crate::repository::CatalogRepository;

/// Catalog business logic over a repository
pub struct CatalogService<R: CatalogRepository> {
    repository: Arc<R>,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub async fn list_products(
        &self,
        filter: ProductFilter,
    ) -> CatalogResult<(Vec<ProductDetail>, u64)> {
        self.repository.list_products(filter).await
    }

    pub async fn get_product(&self, id: i32) -> CatalogResult<ProductDetail> {
        self.repository
            .get_product(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))
    }

    pub async fn create_product(
        &self,
        input: CreateProductRequest,
        created_by: Option<i32>,
    ) -> CatalogResult<ProductDetail> {
        if input.is_flash_sale && input.discount_percent.is_none() {
            return Err(CatalogError::Validation(
                "Flash sale products require a discountPercent".to_string(),
            ));
        }

        self.repository
            .create_product(NewProduct {
                name: input.name,
                description: input.description,
                price: input.price,
                stock: input.stock,
                is_flash_sale: input.is_flash_sale,
                discount_percent: input.discount_percent,
                created_by,
                image_urls: input.images,
                category_ids: input.category_ids,
            })
            .await
    }

    pub async fn update_product(
        &self,
        id: i32,
        input: UpdateProductRequest,
        updated_by: Option<i32>,
    ) -> CatalogResult<ProductDetail> {
        let mut product = self.get_product(id).await?.product;

        if let Some(name) = input.name {
            product.name = name;
        }
        if let Some(description) = input.description {
            product.description = Some(description);
        }
        if let Some(price) = input.price {
            product.price = price;
        }
        if let Some(stock) = input.stock {
            product.stock = stock;
        }
        if let Some(is_flash_sale) = input.is_flash_sale {
            product.is_flash_sale = is_flash_sale;
        }
        if let Some(discount_percent) = input.discount_percent {
            product.discount_percent = Some(discount_percent);
        }
        if product.is_flash_sale && product.discount_percent.is_none() {
            return Err(CatalogError::Validation(
                "Flash sale products require a discountPercent".to_string(),
            ));
        }
        product.updated_by = updated_by;
        product.updated_at = Utc::now();

        self.repository
            .update_product(product, input.images, input.category_ids)
            .await
    }

    pub async fn delete_product(&self, id: i32) -> CatalogResult<()> {
        if !self.repository.delete_product(id).await? {
            return Err(CatalogError::ProductNotFound(id));
        }
        Ok(())
    }

    pub async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        self.repository.list_categories().await
    }

    pub async fn get_category(&self, id: i32) -> CatalogResult<Category> {
        self.repository
            .get_category(id)
            .await?
            .ok_or(CatalogError::CategoryNotFound(id))
    }

    pub async fn create_category(&self, input: CategoryRequest) -> CatalogResult<Category> {
        self.repository.create_category(input.name).await
    }

    pub async fn update_category(&self, id: i32, input: CategoryRequest) -> CatalogResult<Category> {
        let mut category = self.get_category(id).await?;
        category.name = input.name;
        self.repository.update_category(category).await
    }

    pub async fn delete_category(&self, id: i32) -> CatalogResult<()> {
        if !self.repository.delete_category(id).await? {
            return Err(CatalogError::CategoryNotFound(id));
        }
        Ok(())
    }

    pub async fn list_sizes(&self) -> CatalogResult<Vec<Size>> {
        self.repository.list_sizes().await
    }

    pub async fn get_size(&self, id: i32) -> CatalogResult<Size> {
        self.repository
            .get_size(id)
            .await?
            .ok_or(CatalogError::SizeNotFound(id))
    }

    pub async fn create_size(&self, input: SizeRequest) -> CatalogResult<Size> {
        self.repository.create_size(input.name, input.size_cost).await
    }

    pub async fn update_size(&self, id: i32, input: SizeRequest) -> CatalogResult<Size> {
        let mut size = self.get_size(id).await?;
        size.name = input.name;
        size.size_cost = input.size_cost;
        size.updated_at = Utc::now();
        self.repository.update_size(size).await
    }

    pub async fn delete_size(&self, id: i32) -> CatalogResult<()> {
        if !self.repository.delete_size(id).await? {
            return Err(CatalogError::SizeNotFound(id));
        }
        Ok(())
    }

    pub async fn list_variants(&self) -> CatalogResult<Vec<Variant>> {
        self.repository.list_variants().await
    }

    pub async fn get_variant(&self, id: i32) -> CatalogResult<Variant> {
        self.repository
            .get_variant(id)
            .await?
            .ok_or(CatalogError::VariantNotFound(id))
    }

    pub async fn create_variant(&self, input: VariantRequest) -> CatalogResult<Variant> {
        self.repository
            .create_variant(input.name, input.variant_cost)
            .await
    }

    pub async fn update_variant(&self, id: i32, input: VariantRequest) -> CatalogResult<Variant> {
        let mut variant = self.get_variant(id).await?;
        variant.name = input.name;
        variant.variant_cost = input.variant_cost;
        variant.updated_at = Utc::now();
        self.repository.update_variant(variant).await
    }

    pub async fn delete_variant(&self, id: i32) -> CatalogResult<()> {
        if !self.repository.delete_variant(id).await? {
            return Err(CatalogError::VariantNotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryCatalogRepository;

    fn service() -> CatalogService<InMemoryCatalogRepository> {
        CatalogService::new(InMemoryCatalogRepository::new())
    }

    fn create_request(name: &str) -> CreateProductRequest {
        CreateProductRequest {
            name: name.to_string(),
            description: None,
            price: 20000.0,
            stock: 5,
            is_flash_sale: false,
            discount_percent: None,
            images: vec![],
            category_ids: vec![],
        }
    }

    #[tokio::test]
    async fn test_flash_sale_requires_discount() {
        let service = service();
        let mut input = create_request("Kopi");
        input.is_flash_sale = true;

        let err = service.create_product(input, None).await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_product_merges_fields() {
        let service = service();
        let created = service
            .create_product(create_request("Kopi"), Some(1))
            .await
            .unwrap();

        let updated = service
            .update_product(
                created.product.id,
                UpdateProductRequest {
                    name: None,
                    description: None,
                    price: Some(25000.0),
                    stock: None,
                    is_flash_sale: None,
                    discount_percent: None,
                    images: None,
                    category_ids: None,
                },
                Some(2),
            )
            .await
            .unwrap();

        assert_eq!(updated.product.name, "Kopi");
        assert_eq!(updated.product.price, 25000.0);
        assert_eq!(updated.product.updated_by, Some(2));
    }

    #[tokio::test]
    async fn test_get_missing_product_is_not_found() {
        let err = service().get_product(42).await.unwrap_err();
        assert!(matches!(err, CatalogError::ProductNotFound(42)));
    }

    #[tokio::test]
    async fn test_size_crud_round_trip() {
        let service = service();
        let size = service
            .create_size(SizeRequest {
                name: "Large".to_string(),
                size_cost: 5000.0,
            })
            .await
            .unwrap();

        let updated = service
            .update_size(
                size.id,
                SizeRequest {
                    name: "Large".to_string(),
                    size_cost: 6000.0,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.size_cost, 6000.0);

        service.delete_size(size.id).await.unwrap();
        let err = service.get_size(size.id).await.unwrap_err();
        assert!(matches!(err, CatalogError::SizeNotFound(_)));
    }
}
