use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: i32,
    pub user_id: i32,
    pub product_id: i32,
    pub size_id: Option<i32>,
    pub variant_id: Option<i32>,
    pub amount: i32,
    pub subtotal: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a cart row; the subtotal is computed by the service
#[derive(Debug, Clone)]
pub struct NewCart {
    pub user_id: i32,
    pub product_id: i32,
    pub size_id: Option<i32>,
    pub variant_id: Option<i32>,
    pub amount: i32,
    pub subtotal: f64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddCartRequest {
    pub product_id: i32,
    pub size_id: Option<i32>,
    pub variant_id: Option<i32>,
    #[validate(range(min = 1, message = "amount must be at least 1"))]
    pub amount: i32,
}

/// Cart line with the catalog names resolved for display
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub size_id: Option<i32>,
    pub size_name: Option<String>,
    pub variant_id: Option<i32>,
    pub variant_name: Option<String>,
    pub amount: i32,
    pub subtotal: f64,
}
