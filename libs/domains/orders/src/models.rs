use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::status::TransactionStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderMethod {
    pub id: i32,
    pub name: String,
    pub delivery_fee: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: i32,
    pub name: String,
    pub admin_fee: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i32,
    pub no_invoice: String,
    pub user_id: i32,
    pub full_name: String,
    pub email: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub payment_method_id: i32,
    pub order_method_id: i32,
    pub status_id: i32,
    pub delivery_fee: f64,
    pub admin_fee: f64,
    pub tax: f64,
    pub total_transaction: f64,
    pub date_transaction: NaiveDate,
    pub created_by: Option<i32>,
    pub updated_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionItem {
    pub id: i32,
    pub transaction_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub product_price: f64,
    pub discount_percent: Option<i32>,
    pub discount_price: Option<f64>,
    pub size: Option<String>,
    pub size_cost: f64,
    pub variant: Option<String>,
    pub variant_cost: f64,
    pub amount: i32,
    pub subtotal: f64,
}

/// Contact snapshot copied onto the transaction at checkout
#[derive(Debug, Clone, PartialEq)]
pub struct ContactInfo {
    pub full_name: String,
    pub email: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Cart line joined with catalog data, as the checkout reads it
#[derive(Debug, Clone)]
pub struct CheckoutLine {
    pub cart_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub product_price: f64,
    pub discount_percent: Option<i32>,
    pub discount_price: Option<f64>,
    pub size: Option<String>,
    pub size_cost: f64,
    pub variant: Option<String>,
    pub variant_cost: f64,
    pub amount: i32,
    pub subtotal: f64,
    pub stock: i32,
}

/// Transaction header ready for insertion
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub no_invoice: String,
    pub user_id: i32,
    pub contact: ContactInfo,
    pub payment_method_id: i32,
    pub order_method_id: i32,
    pub status_id: i32,
    pub delivery_fee: f64,
    pub admin_fee: f64,
    pub tax: f64,
    pub total_transaction: f64,
    pub date_transaction: NaiveDate,
    pub created_by: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewTransactionItem {
    pub product_id: i32,
    pub product_name: String,
    pub product_price: f64,
    pub discount_percent: Option<i32>,
    pub discount_price: Option<f64>,
    pub size: Option<String>,
    pub size_cost: f64,
    pub variant: Option<String>,
    pub variant_cost: f64,
    pub amount: i32,
    pub subtotal: f64,
}

// ---------------------------------------------------------------------------
// API payloads
// ---------------------------------------------------------------------------

/// Checkout body. The contact fields override the stored profile values for
/// this transaction only.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[validate(range(min = 1, message = "paymentMethodId is required"))]
    pub payment_method_id: i32,
    #[validate(range(min = 1, message = "orderMethodId is required"))]
    pub order_method_id: i32,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub transaction_id: i32,
    pub no_invoice: String,
    pub date_transaction: NaiveDate,
    pub delivery_fee: f64,
    pub admin_fee: f64,
    pub tax: f64,
    pub total_transaction: f64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    #[validate(range(min = 1, message = "statusId is required"))]
    pub status_id: i32,
}

/// One row of a history or admin listing
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    pub id: i32,
    pub no_invoice: String,
    pub full_name: String,
    pub date_transaction: NaiveDate,
    pub status_id: i32,
    pub status: Option<String>,
    pub total_transaction: f64,
}

impl From<Transaction> for TransactionSummary {
    fn from(t: Transaction) -> Self {
        let status = TransactionStatus::from_id(t.status_id).map(|s| s.to_string());
        Self {
            id: t.id,
            no_invoice: t.no_invoice,
            full_name: t.full_name,
            date_transaction: t.date_transaction,
            status_id: t.status_id,
            status,
            total_transaction: t.total_transaction,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionItemResponse {
    pub id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub product_price: f64,
    pub discount_percent: Option<i32>,
    pub discount_price: Option<f64>,
    pub size: Option<String>,
    pub size_cost: f64,
    pub variant: Option<String>,
    pub variant_cost: f64,
    pub amount: i32,
    pub subtotal: f64,
}

impl From<TransactionItem> for TransactionItemResponse {
    fn from(i: TransactionItem) -> Self {
        Self {
            id: i.id,
            product_id: i.product_id,
            product_name: i.product_name,
            product_price: i.product_price,
            discount_percent: i.discount_percent,
            discount_price: i.discount_price,
            size: i.size,
            size_cost: i.size_cost,
            variant: i.variant,
            variant_cost: i.variant_cost,
            amount: i.amount,
            subtotal: i.subtotal,
        }
    }
}

/// Full transaction detail with resolved method names and line items
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetailResponse {
    pub id: i32,
    pub no_invoice: String,
    pub full_name: String,
    pub email: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub payment_method: Option<String>,
    pub order_method: Option<String>,
    pub status_id: i32,
    pub status: Option<String>,
    pub delivery_fee: f64,
    pub admin_fee: f64,
    pub tax: f64,
    pub total_transaction: f64,
    pub date_transaction: NaiveDate,
    pub items: Vec<TransactionItemResponse>,
}

/// Filters for the user-facing history listing
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub date: Option<NaiveDate>,
    pub status_id: Option<i32>,
    pub limit: u64,
    pub offset: u64,
}

/// Filters for the admin transaction listing
#[derive(Debug, Clone, Default)]
pub struct AdminTransactionFilter {
    /// Matches the invoice number or the customer name
    pub search: Option<String>,
    pub status_id: Option<i32>,
    pub limit: u64,
    pub offset: u64,
}
