use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{OrderError, OrderResult};
use crate::models::{
    AdminTransactionFilter, CheckoutLine, HistoryFilter, NewTransaction, NewTransactionItem,
    OrderMethod, PaymentMethod, Status, Transaction, TransactionItem,
};

/// Repository trait for checkout and transaction persistence
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Cart lines for the user joined with current catalog data
    async fn load_checkout_lines(&self, user_id: i32) -> OrderResult<Vec<CheckoutLine>>;

    async fn get_order_method(&self, id: i32) -> OrderResult<Option<OrderMethod>>;

    async fn get_payment_method(&self, id: i32) -> OrderResult<Option<PaymentMethod>>;

    async fn list_order_methods(&self) -> OrderResult<Vec<OrderMethod>>;

    async fn list_payment_methods(&self) -> OrderResult<Vec<PaymentMethod>>;

    async fn get_status(&self, id: i32) -> OrderResult<Option<Status>>;

    /// Atomically inserts the transaction and its items, decrements product
    /// stock, and clears the user's cart. Fails with `DuplicateInvoice` when
    /// the invoice number is taken and `InsufficientStock` when a decrement
    /// would go negative; either failure leaves no partial state behind.
    async fn create_transaction(
        &self,
        transaction: NewTransaction,
        items: Vec<NewTransactionItem>,
    ) -> OrderResult<Transaction>;

    async fn get_transaction(
        &self,
        id: i32,
    ) -> OrderResult<Option<(Transaction, Vec<TransactionItem>)>>;

    async fn get_by_invoice(
        &self,
        no_invoice: &str,
    ) -> OrderResult<Option<(Transaction, Vec<TransactionItem>)>>;

    async fn list_for_user(
        &self,
        user_id: i32,
        filter: HistoryFilter,
    ) -> OrderResult<(Vec<Transaction>, u64)>;

    async fn list_admin(
        &self,
        filter: AdminTransactionFilter,
    ) -> OrderResult<(Vec<Transaction>, u64)>;

    async fn update_status(
        &self,
        id: i32,
        status_id: i32,
        updated_by: Option<i32>,
    ) -> OrderResult<Transaction>;
}

#[derive(Debug, Default)]
struct OrderState {
    products: HashMap<i32, (String, i32)>,
    cart_lines: HashMap<i32, Vec<CheckoutLine>>,
    transactions: HashMap<i32, Transaction>,
    items: HashMap<i32, Vec<TransactionItem>>,
}

/// In-memory implementation of OrderRepository, pre-seeded with the same
/// reference rows as the database migration (for development/testing)
pub struct InMemoryOrderRepository {
    state: Arc<RwLock<OrderState>>,
    order_methods: Vec<OrderMethod>,
    payment_methods: Vec<PaymentMethod>,
    statuses: Vec<Status>,
    next_id: AtomicI32,
}

impl Default for InMemoryOrderRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(OrderState::default())),
            order_methods: vec![
                OrderMethod {
                    id: 1,
                    name: "Dine-In".to_string(),
                    delivery_fee: 0.0,
                },
                OrderMethod {
                    id: 2,
                    name: "Door Delivery".to_string(),
                    delivery_fee: 5000.0,
                },
                OrderMethod {
                    id: 3,
                    name: "Pick-Up".to_string(),
                    delivery_fee: 0.0,
                },
            ],
            payment_methods: vec![
                PaymentMethod {
                    id: 1,
                    name: "Cash".to_string(),
                    admin_fee: 0.0,
                },
                PaymentMethod {
                    id: 2,
                    name: "Bank Transfer".to_string(),
                    admin_fee: 2000.0,
                },
                PaymentMethod {
                    id: 3,
                    name: "E-Wallet".to_string(),
                    admin_fee: 1500.0,
                },
            ],
            statuses: vec![
                Status {
                    id: 1,
                    name: "On Progress".to_string(),
                },
                Status {
                    id: 2,
                    name: "Sending Goods".to_string(),
                },
                Status {
                    id: 3,
                    name: "Finish Order".to_string(),
                },
            ],
            next_id: AtomicI32::new(1),
        }
    }

    /// Registers a product with a stock level for checkout tests
    pub async fn seed_product(&self, product_id: i32, name: &str, stock: i32) {
        let mut state = self.state.write().await;
        state.products.insert(product_id, (name.to_string(), stock));
    }

    /// Adds a pre-joined cart line for the user
    pub async fn seed_cart_line(&self, user_id: i32, line: CheckoutLine) {
        let mut state = self.state.write().await;
        state.cart_lines.entry(user_id).or_default().push(line);
    }

    pub async fn stock_of(&self, product_id: i32) -> Option<i32> {
        let state = self.state.read().await;
        state.products.get(&product_id).map(|(_, stock)| *stock)
    }

    fn next_id(&self) -> i32 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn load_checkout_lines(&self, user_id: i32) -> OrderResult<Vec<CheckoutLine>> {
        let state = self.state.read().await;
        Ok(state.cart_lines.get(&user_id).cloned().unwrap_or_default())
    }

    async fn get_order_method(&self, id: i32) -> OrderResult<Option<OrderMethod>> {
        Ok(self.order_methods.iter().find(|m| m.id == id).cloned())
    }

    async fn get_payment_method(&self, id: i32) -> OrderResult<Option<PaymentMethod>> {
        Ok(self.payment_methods.iter().find(|m| m.id == id).cloned())
    }

    async fn list_order_methods(&self) -> OrderResult<Vec<OrderMethod>> {
        Ok(self.order_methods.clone())
    }

    async fn list_payment_methods(&self) -> OrderResult<Vec<PaymentMethod>> {
        Ok(self.payment_methods.clone())
    }

    async fn get_status(&self, id: i32) -> OrderResult<Option<Status>> {
        Ok(self.statuses.iter().find(|s| s.id == id).cloned())
    }

    async fn create_transaction(
        &self,
        input: NewTransaction,
        items: Vec<NewTransactionItem>,
    ) -> OrderResult<Transaction> {
        let mut state = self.state.write().await;

        let invoice_taken = state
            .transactions
            .values()
            .any(|t| t.no_invoice == input.no_invoice);
        if invoice_taken {
            return Err(OrderError::DuplicateInvoice(input.no_invoice));
        }

        // Validate every decrement before mutating anything
        for item in &items {
            let (name, stock) = state
                .products
                .get(&item.product_id)
                .cloned()
                .unwrap_or((item.product_name.clone(), 0));
            if stock < item.amount {
                return Err(OrderError::InsufficientStock {
                    product: name,
                    available: stock,
                    requested: item.amount,
                });
            }
        }
        for item in &items {
            if let Some((_, stock)) = state.products.get_mut(&item.product_id) {
                *stock -= item.amount;
            }
        }

        let now = Utc::now();
        let transaction = Transaction {
            id: self.next_id(),
            no_invoice: input.no_invoice,
            user_id: input.user_id,
            full_name: input.contact.full_name,
            email: input.contact.email,
            address: input.contact.address,
            phone: input.contact.phone,
            payment_method_id: input.payment_method_id,
            order_method_id: input.order_method_id,
            status_id: input.status_id,
            delivery_fee: input.delivery_fee,
            admin_fee: input.admin_fee,
            tax: input.tax,
            total_transaction: input.total_transaction,
            date_transaction: input.date_transaction,
            created_by: input.created_by,
            updated_by: None,
            created_at: now,
            updated_at: now,
        };

        let items: Vec<TransactionItem> = items
            .into_iter()
            .map(|i| TransactionItem {
                id: self.next_id(),
                transaction_id: transaction.id,
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
            })
            .collect();

        state.items.insert(transaction.id, items);
        state.cart_lines.remove(&transaction.user_id);
        state.transactions.insert(transaction.id, transaction.clone());

        tracing::info!(
            transaction_id = transaction.id,
            no_invoice = %transaction.no_invoice,
            "Created transaction"
        );
        Ok(transaction)
    }

    async fn get_transaction(
        &self,
        id: i32,
    ) -> OrderResult<Option<(Transaction, Vec<TransactionItem>)>> {
        let state = self.state.read().await;
        Ok(state.transactions.get(&id).map(|t| {
            (
                t.clone(),
                state.items.get(&id).cloned().unwrap_or_default(),
            )
        }))
    }

    async fn get_by_invoice(
        &self,
        no_invoice: &str,
    ) -> OrderResult<Option<(Transaction, Vec<TransactionItem>)>> {
        let state = self.state.read().await;
        Ok(state
            .transactions
            .values()
            .find(|t| t.no_invoice == no_invoice)
            .map(|t| {
                (
                    t.clone(),
                    state.items.get(&t.id).cloned().unwrap_or_default(),
                )
            }))
    }

    async fn list_for_user(
        &self,
        user_id: i32,
        filter: HistoryFilter,
    ) -> OrderResult<(Vec<Transaction>, u64)> {
        let state = self.state.read().await;

        let mut result: Vec<Transaction> = state
            .transactions
            .values()
            .filter(|t| t.user_id == user_id)
            .filter(|t| filter.date.is_none_or(|d| t.date_transaction == d))
            .filter(|t| filter.status_id.is_none_or(|s| t.status_id == s))
            .cloned()
            .collect();
        result.sort_by_key(|t| std::cmp::Reverse(t.id));
        let total = result.len() as u64;

        let page = result
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn list_admin(
        &self,
        filter: AdminTransactionFilter,
    ) -> OrderResult<(Vec<Transaction>, u64)> {
        let state = self.state.read().await;

        let mut result: Vec<Transaction> = state
            .transactions
            .values()
            .filter(|t| {
                filter.search.as_ref().is_none_or(|s| {
                    let needle = s.to_lowercase();
                    t.no_invoice.to_lowercase().contains(&needle)
                        || t.full_name.to_lowercase().contains(&needle)
                })
            })
            .filter(|t| filter.status_id.is_none_or(|s| t.status_id == s))
            .cloned()
            .collect();
        result.sort_by_key(|t| std::cmp::Reverse(t.id));
        let total = result.len() as u64;

        let page = result
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn update_status(
        &self,
        id: i32,
        status_id: i32,
        updated_by: Option<i32>,
    ) -> OrderResult<Transaction> {
        let mut state = self.state.write().await;
        let transaction = state
            .transactions
            .get_mut(&id)
            .ok_or(OrderError::TransactionNotFound(id))?;

        transaction.status_id = status_id;
        transaction.updated_by = updated_by;
        transaction.updated_at = Utc::now();

        tracing::info!(transaction_id = id, status_id, "Updated transaction status");
        Ok(transaction.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn line(product_id: i32, amount: i32, subtotal: f64) -> CheckoutLine {
        CheckoutLine {
            cart_id: 1,
            product_id,
            product_name: format!("Product {}", product_id),
            product_price: subtotal / f64::from(amount),
            discount_percent: None,
            discount_price: None,
            size: None,
            size_cost: 0.0,
            variant: None,
            variant_cost: 0.0,
            amount,
            subtotal,
            stock: 0,
        }
    }

    fn new_transaction(invoice: &str, user_id: i32) -> NewTransaction {
        NewTransaction {
            no_invoice: invoice.to_string(),
            user_id,
            contact: crate::models::ContactInfo {
                full_name: "Buyer".to_string(),
                email: "buyer@example.com".to_string(),
                address: None,
                phone: None,
            },
            payment_method_id: 1,
            order_method_id: 2,
            status_id: 1,
            delivery_fee: 5000.0,
            admin_fee: 0.0,
            tax: 2000.0,
            total_transaction: 27000.0,
            date_transaction: NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
            created_by: Some(user_id),
        }
    }

    fn item(product_id: i32, amount: i32, subtotal: f64) -> NewTransactionItem {
        NewTransactionItem {
            product_id,
            product_name: format!("Product {}", product_id),
            product_price: subtotal / f64::from(amount),
            discount_percent: None,
            discount_price: None,
            size: None,
            size_cost: 0.0,
            variant: None,
            variant_cost: 0.0,
            amount,
            subtotal,
        }
    }

    #[tokio::test]
    async fn test_create_decrements_stock_and_clears_cart() {
        let repo = InMemoryOrderRepository::new();
        repo.seed_product(1, "Kopi", 10).await;
        repo.seed_cart_line(7, line(1, 2, 40000.0)).await;

        repo.create_transaction(new_transaction("INV-20240307-00001", 7), vec![item(1, 2, 40000.0)])
            .await
            .unwrap();

        assert_eq!(repo.stock_of(1).await, Some(8));
        assert!(repo.load_checkout_lines(7).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insufficient_stock_leaves_state_untouched() {
        let repo = InMemoryOrderRepository::new();
        repo.seed_product(1, "Kopi", 10).await;
        repo.seed_product(2, "Teh", 1).await;
        repo.seed_cart_line(7, line(1, 2, 40000.0)).await;

        let err = repo
            .create_transaction(
                new_transaction("INV-20240307-00002", 7),
                vec![item(1, 2, 40000.0), item(2, 5, 50000.0)],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::InsufficientStock { .. }));
        assert_eq!(repo.stock_of(1).await, Some(10));
        assert_eq!(repo.load_checkout_lines(7).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_invoice_rejected() {
        let repo = InMemoryOrderRepository::new();
        repo.seed_product(1, "Kopi", 10).await;

        repo.create_transaction(new_transaction("INV-20240307-00003", 7), vec![item(1, 1, 20000.0)])
            .await
            .unwrap();
        let err = repo
            .create_transaction(new_transaction("INV-20240307-00003", 8), vec![item(1, 1, 20000.0)])
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::DuplicateInvoice(_)));
    }

    #[tokio::test]
    async fn test_history_filters_by_date_and_status() {
        let repo = InMemoryOrderRepository::new();
        repo.seed_product(1, "Kopi", 100).await;

        repo.create_transaction(new_transaction("INV-A", 7), vec![item(1, 1, 20000.0)])
            .await
            .unwrap();
        let mut other_day = new_transaction("INV-B", 7);
        other_day.date_transaction = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        let second = repo
            .create_transaction(other_day, vec![item(1, 1, 20000.0)])
            .await
            .unwrap();
        repo.update_status(second.id, 3, None).await.unwrap();

        let (page, total) = repo
            .list_for_user(
                7,
                HistoryFilter {
                    date: NaiveDate::from_ymd_opt(2024, 3, 8),
                    limit: 10,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(page[0].no_invoice, "INV-B");

        let (page, total) = repo
            .list_for_user(
                7,
                HistoryFilter {
                    status_id: Some(3),
                    limit: 10,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(page[0].id, second.id);
    }

    #[tokio::test]
    async fn test_admin_search_matches_invoice_and_name() {
        let repo = InMemoryOrderRepository::new();
        repo.seed_product(1, "Kopi", 100).await;
        repo.create_transaction(new_transaction("INV-XYZ", 7), vec![item(1, 1, 20000.0)])
            .await
            .unwrap();

        let (page, total) = repo
            .list_admin(AdminTransactionFilter {
                search: Some("xyz".to_string()),
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(page[0].no_invoice, "INV-XYZ");

        let (_, total) = repo
            .list_admin(AdminTransactionFilter {
                search: Some("buyer".to_string()),
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(total, 1);
    }
}
