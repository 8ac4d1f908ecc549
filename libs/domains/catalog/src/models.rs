use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A product row as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i32,
    pub is_flash_sale: bool,
    pub discount_percent: Option<i32>,
    pub created_by: Option<i32>,
    pub updated_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Unit price after the percentage discount, if any
    pub fn discounted_price(&self) -> f64 {
        match self.discount_percent {
            Some(pct) => self.price * (1.0 - f64::from(pct) / 100.0),
            None => self.price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: i32,
    pub product_id: i32,
    pub image_url: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub id: i32,
    pub name: String,
    pub size_cost: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: i32,
    pub name: String,
    pub variant_cost: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product with its images and category assignments resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetail {
    pub product: Product,
    pub images: Vec<ProductImage>,
    pub categories: Vec<Category>,
}

/// Input for creating a product
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i32,
    pub is_flash_sale: bool,
    pub discount_percent: Option<i32>,
    pub created_by: Option<i32>,
    pub image_urls: Vec<NewProductImage>,
    pub category_ids: Vec<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProductImage {
    pub image_url: String,
    #[serde(default)]
    pub is_primary: bool,
}

// ---------------------------------------------------------------------------
// API payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub discount_price: Option<f64>,
    pub stock: i32,
    pub is_flash_sale: bool,
    pub discount_percent: Option<i32>,
    pub images: Vec<ProductImageResponse>,
    pub categories: Vec<Category>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImageResponse {
    pub id: i32,
    pub image_url: String,
    pub is_primary: bool,
}

impl From<ProductDetail> for ProductResponse {
    fn from(detail: ProductDetail) -> Self {
        let discount_price = detail
            .product
            .discount_percent
            .map(|_| detail.product.discounted_price());
        Self {
            id: detail.product.id,
            name: detail.product.name,
            description: detail.product.description,
            price: detail.product.price,
            discount_price,
            stock: detail.product.stock,
            is_flash_sale: detail.product.is_flash_sale,
            discount_percent: detail.product.discount_percent,
            images: detail
                .images
                .into_iter()
                .map(|i| ProductImageResponse {
                    id: i.id,
                    image_url: i.image_url,
                    is_primary: i.is_primary,
                })
                .collect(),
            categories: detail.categories,
            created_at: detail.product.created_at,
            updated_at: detail.product.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    #[validate(range(min = 0, message = "stock must not be negative"))]
    pub stock: i32,
    #[serde(default)]
    pub is_flash_sale: bool,
    #[validate(range(min = 0, max = 100, message = "discountPercent must be 0-100"))]
    pub discount_percent: Option<i32>,
    #[serde(default)]
    pub images: Vec<NewProductImage>,
    #[serde(default)]
    pub category_ids: Vec<i32>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: Option<f64>,
    #[validate(range(min = 0, message = "stock must not be negative"))]
    pub stock: Option<i32>,
    pub is_flash_sale: Option<bool>,
    #[validate(range(min = 0, max = 100, message = "discountPercent must be 0-100"))]
    pub discount_percent: Option<i32>,
    /// When present, replaces the full image set
    pub images: Option<Vec<NewProductImage>>,
    /// When present, replaces the category assignments
    pub category_ids: Option<Vec<i32>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SizeRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "sizeCost must not be negative"))]
    #[serde(default)]
    pub size_cost: f64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VariantRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "variantCost must not be negative"))]
    #[serde(default)]
    pub variant_cost: f64,
}

/// Filters for the public product listing
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category_id: Option<i32>,
    pub flash_sale: Option<bool>,
    pub limit: u64,
    pub offset: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: f64, discount: Option<i32>) -> Product {
        Product {
            id: 1,
            name: "Kopi Susu".to_string(),
            description: None,
            price,
            stock: 10,
            is_flash_sale: false,
            discount_percent: discount,
            created_by: None,
            updated_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_discounted_price_without_discount() {
        assert_eq!(product(25000.0, None).discounted_price(), 25000.0);
    }

    #[test]
    fn test_discounted_price_applies_percentage() {
        let p = product(20000.0, Some(25));
        assert!((p.discounted_price() - 15000.0).abs() < 1e-9);
    }
}
