use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::error::{OrderError, OrderResult};
use crate::invoice::{generate_invoice, MAX_INVOICE_ATTEMPTS};
use crate::models::{
    AdminTransactionFilter, CheckoutRequest, CheckoutResponse, ContactInfo, HistoryFilter,
    NewTransaction, NewTransactionItem, OrderMethod, PaymentMethod, Transaction,
    TransactionDetailResponse, TransactionItem,
};
use crate::repository::OrderRepository;
use crate::status::{validate_transition, TransactionStatus};

/// Tax applied to the item total at checkout
pub const TAX_RATE: f64 = 0.10;

/// Supplies the contact snapshot copied onto new transactions
#[async_trait]
pub trait ContactProvider: Send + Sync {
    async fn contact_for(&self, user_id: i32) -> OrderResult<Option<ContactInfo>>;
}

/// Checkout and transaction business logic
pub struct OrderService<R: OrderRepository> {
    repository: Arc<R>,
    contacts: Arc<dyn ContactProvider>,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repository: Arc<R>, contacts: Arc<dyn ContactProvider>) -> Self {
        Self {
            repository,
            contacts,
        }
    }

    /// Turns the user's cart into a transaction: validates stock and methods,
    /// prices the order, and retries invoice generation on collision.
    pub async fn checkout(
        &self,
        user_id: i32,
        input: CheckoutRequest,
    ) -> OrderResult<CheckoutResponse> {
        let lines = self.repository.load_checkout_lines(user_id).await?;
        if lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        // Read-side check so the caller gets a descriptive message; the
        // conditional decrement inside create_transaction is authoritative.
        for line in &lines {
            if line.stock < line.amount {
                return Err(OrderError::InsufficientStock {
                    product: line.product_name.clone(),
                    available: line.stock,
                    requested: line.amount,
                });
            }
        }

        let order_method = self
            .repository
            .get_order_method(input.order_method_id)
            .await?
            .ok_or(OrderError::OrderMethodNotFound(input.order_method_id))?;
        let payment_method = self
            .repository
            .get_payment_method(input.payment_method_id)
            .await?
            .ok_or(OrderError::PaymentMethodNotFound(input.payment_method_id))?;

        let profile = self
            .contacts
            .contact_for(user_id)
            .await?
            .ok_or(OrderError::UserNotFound(user_id))?;
        let contact = resolve_contact(&input, profile)?;

        let item_total: f64 = lines.iter().map(|l| l.subtotal).sum();
        let tax = item_total * TAX_RATE;
        let total =
            item_total + tax + order_method.delivery_fee + payment_method.admin_fee;

        let items: Vec<NewTransactionItem> = lines
            .into_iter()
            .map(|l| NewTransactionItem {
                product_id: l.product_id,
                product_name: l.product_name,
                product_price: l.product_price,
                discount_percent: l.discount_percent,
                discount_price: l.discount_price,
                size: l.size,
                size_cost: l.size_cost,
                variant: l.variant,
                variant_cost: l.variant_cost,
                amount: l.amount,
                subtotal: l.subtotal,
            })
            .collect();

        let today = Utc::now().date_naive();
        for attempt in 1..=MAX_INVOICE_ATTEMPTS {
            let no_invoice = generate_invoice(today);
            let transaction = NewTransaction {
                no_invoice,
                user_id,
                contact: contact.clone(),
                payment_method_id: payment_method.id,
                order_method_id: order_method.id,
                status_id: TransactionStatus::OnProgress.id(),
                delivery_fee: order_method.delivery_fee,
                admin_fee: payment_method.admin_fee,
                tax,
                total_transaction: total,
                date_transaction: today,
                created_by: Some(user_id),
            };

            match self
                .repository
                .create_transaction(transaction, items.clone())
                .await
            {
                Ok(created) => {
                    return Ok(CheckoutResponse {
                        transaction_id: created.id,
                        no_invoice: created.no_invoice,
                        date_transaction: created.date_transaction,
                        delivery_fee: created.delivery_fee,
                        admin_fee: created.admin_fee,
                        tax: created.tax,
                        total_transaction: created.total_transaction,
                    });
                }
                Err(OrderError::DuplicateInvoice(no_invoice)) => {
                    tracing::warn!(%no_invoice, attempt, "Invoice collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(OrderError::InvoiceCollision)
    }

    pub async fn list_histories(
        &self,
        user_id: i32,
        filter: HistoryFilter,
    ) -> OrderResult<(Vec<Transaction>, u64)> {
        self.repository.list_for_user(user_id, filter).await
    }

    /// History detail, scoped to the requesting user's own transactions
    pub async fn history_detail(
        &self,
        user_id: i32,
        no_invoice: &str,
    ) -> OrderResult<TransactionDetailResponse> {
        let (transaction, items) = self
            .repository
            .get_by_invoice(no_invoice)
            .await?
            .filter(|(t, _)| t.user_id == user_id)
            .ok_or_else(|| OrderError::InvoiceNotFound(no_invoice.to_string()))?;

        self.build_detail(transaction, items).await
    }

    pub async fn list_admin(
        &self,
        filter: AdminTransactionFilter,
    ) -> OrderResult<(Vec<Transaction>, u64)> {
        self.repository.list_admin(filter).await
    }

    pub async fn admin_detail(&self, id: i32) -> OrderResult<TransactionDetailResponse> {
        let (transaction, items) = self
            .repository
            .get_transaction(id)
            .await?
            .ok_or(OrderError::TransactionNotFound(id))?;

        self.build_detail(transaction, items).await
    }

    /// Moves a transaction to a new status after checking the denylist
    pub async fn update_status(
        &self,
        id: i32,
        status_id: i32,
        updated_by: Option<i32>,
    ) -> OrderResult<Transaction> {
        let (transaction, _) = self
            .repository
            .get_transaction(id)
            .await?
            .ok_or(OrderError::TransactionNotFound(id))?;

        validate_transition(transaction.order_method_id, status_id)?;

        self.repository.update_status(id, status_id, updated_by).await
    }

    pub async fn list_order_methods(&self) -> OrderResult<Vec<OrderMethod>> {
        self.repository.list_order_methods().await
    }

    pub async fn list_payment_methods(&self) -> OrderResult<Vec<PaymentMethod>> {
        self.repository.list_payment_methods().await
    }

    async fn build_detail(
        &self,
        transaction: Transaction,
        items: Vec<TransactionItem>,
    ) -> OrderResult<TransactionDetailResponse> {
        let payment_method = self
            .repository
            .get_payment_method(transaction.payment_method_id)
            .await?
            .map(|m| m.name);
        let order_method = self
            .repository
            .get_order_method(transaction.order_method_id)
            .await?
            .map(|m| m.name);
        let status = TransactionStatus::from_id(transaction.status_id).map(|s| s.to_string());

        Ok(TransactionDetailResponse {
            id: transaction.id,
            no_invoice: transaction.no_invoice,
            full_name: transaction.full_name,
            email: transaction.email,
            address: transaction.address,
            phone: transaction.phone,
            payment_method,
            order_method,
            status_id: transaction.status_id,
            status,
            delivery_fee: transaction.delivery_fee,
            admin_fee: transaction.admin_fee,
            tax: transaction.tax,
            total_transaction: transaction.total_transaction,
            date_transaction: transaction.date_transaction,
            items: items.into_iter().map(Into::into).collect(),
        })
    }
}

/// Request overrides win over the stored profile. Every field must be
/// non-blank after the merge, so a profile without an address or phone can
/// still check out by supplying them in the body.
fn resolve_contact(input: &CheckoutRequest, profile: ContactInfo) -> OrderResult<ContactInfo> {
    fn merge(override_value: &Option<String>, stored: Option<String>) -> Option<String> {
        match override_value {
            Some(v) if !v.trim().is_empty() => Some(v.clone()),
            _ => stored.filter(|v| !v.trim().is_empty()),
        }
    }

    fn required(value: Option<String>, field: &str) -> OrderResult<String> {
        value.ok_or_else(|| OrderError::Validation(format!("{} is required", field)))
    }

    let full_name = required(
        merge(&input.full_name, Some(profile.full_name)),
        "fullName",
    )?;
    let email = required(merge(&input.email, Some(profile.email)), "email")?;
    let address = required(merge(&input.address, profile.address), "address")?;
    let phone = required(merge(&input.phone, profile.phone), "phone")?;

    Ok(ContactInfo {
        full_name,
        email,
        address: Some(address),
        phone: Some(phone),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CheckoutLine;
    use crate::repository::InMemoryOrderRepository;

    struct StubContacts;

    #[async_trait]
    impl ContactProvider for StubContacts {
        async fn contact_for(&self, user_id: i32) -> OrderResult<Option<ContactInfo>> {
            if user_id == 404 {
                return Ok(None);
            }
            // User 9 never filled in address or phone
            if user_id == 9 {
                return Ok(Some(ContactInfo {
                    full_name: "Buyer".to_string(),
                    email: "buyer@example.com".to_string(),
                    address: None,
                    phone: None,
                }));
            }
            Ok(Some(ContactInfo {
                full_name: "Buyer".to_string(),
                email: "buyer@example.com".to_string(),
                address: Some("Jl. Contoh 1".to_string()),
                phone: Some("0800000000".to_string()),
            }))
        }
    }

    fn service(
        repo: Arc<InMemoryOrderRepository>,
    ) -> OrderService<InMemoryOrderRepository> {
        OrderService::new(repo, Arc::new(StubContacts))
    }

    fn line(cart_id: i32, product_id: i32, amount: i32, subtotal: f64, stock: i32) -> CheckoutLine {
        CheckoutLine {
            cart_id,
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
            stock,
        }
    }

    #[tokio::test]
    async fn test_checkout_prices_the_order() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        repo.seed_product(1, "Product 1", 10).await;
        repo.seed_product(2, "Product 2", 10).await;
        repo.seed_cart_line(7, line(1, 1, 2, 50000.0, 10)).await;
        repo.seed_cart_line(7, line(2, 2, 1, 30000.0, 10)).await;

        let service = service(Arc::clone(&repo));
        let response = service
            .checkout(
                7,
                CheckoutRequest {
                    payment_method_id: 2,
                    order_method_id: 2,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // itemTotal 80000, tax 10%, Door Delivery 5000, Bank Transfer 2000
        assert!((response.tax - 8000.0).abs() < 1e-9);
        assert_eq!(response.delivery_fee, 5000.0);
        assert_eq!(response.admin_fee, 2000.0);
        assert!((response.total_transaction - 95000.0).abs() < 1e-9);
        assert!(response.no_invoice.starts_with("INV-"));
    }

    #[tokio::test]
    async fn test_checkout_snapshot_survives_later_changes() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        repo.seed_product(1, "Product 1", 10).await;
        repo.seed_cart_line(7, line(1, 1, 1, 20000.0, 10)).await;

        let service = service(Arc::clone(&repo));
        let response = service
            .checkout(
                7,
                CheckoutRequest {
                    payment_method_id: 1,
                    order_method_id: 1,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let detail = service
            .history_detail(7, &response.no_invoice)
            .await
            .unwrap();
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items[0].product_name, "Product 1");
        assert_eq!(detail.items[0].product_price, 20000.0);
        assert_eq!(detail.full_name, "Buyer");
    }

    #[tokio::test]
    async fn test_checkout_rejects_empty_cart() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let service = service(repo);
        let err = service
            .checkout(
                7,
                CheckoutRequest {
                    payment_method_id: 1,
                    order_method_id: 1,
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::EmptyCart));
    }

    #[tokio::test]
    async fn test_checkout_names_short_product() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        repo.seed_product(1, "Product 1", 1).await;
        repo.seed_cart_line(7, line(1, 1, 3, 60000.0, 1)).await;

        let service = service(repo);
        let err = service
            .checkout(
                7,
                CheckoutRequest {
                    payment_method_id: 1,
                    order_method_id: 1,
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Insufficient stock for 'Product 1': available 1, requested 3"
        );
    }

    #[tokio::test]
    async fn test_checkout_rejects_unknown_methods() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        repo.seed_product(1, "Product 1", 10).await;
        repo.seed_cart_line(7, line(1, 1, 1, 20000.0, 10)).await;

        let service = service(repo);
        let err = service
            .checkout(
                7,
                CheckoutRequest {
                    payment_method_id: 1,
                    order_method_id: 9,
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::OrderMethodNotFound(9)));
    }

    #[tokio::test]
    async fn test_checkout_missing_contact_is_not_found() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        repo.seed_product(1, "Product 1", 10).await;
        repo.seed_cart_line(404, line(1, 1, 1, 20000.0, 10)).await;

        let service = service(repo);
        let err = service
            .checkout(
                404,
                CheckoutRequest {
                    payment_method_id: 1,
                    order_method_id: 1,
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::UserNotFound(404)));
    }

    #[tokio::test]
    async fn test_checkout_contact_overrides_win() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        repo.seed_product(1, "Product 1", 10).await;
        repo.seed_cart_line(7, line(1, 1, 1, 20000.0, 10)).await;

        let service = service(Arc::clone(&repo));
        let response = service
            .checkout(
                7,
                CheckoutRequest {
                    payment_method_id: 1,
                    order_method_id: 1,
                    full_name: Some("Gift Recipient".to_string()),
                    phone: Some("0811111111".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let detail = service
            .history_detail(7, &response.no_invoice)
            .await
            .unwrap();
        assert_eq!(detail.full_name, "Gift Recipient");
        assert_eq!(detail.phone.as_deref(), Some("0811111111"));
        // Fields without an override fall back to the profile
        assert_eq!(detail.email, "buyer@example.com");
        assert_eq!(detail.address.as_deref(), Some("Jl. Contoh 1"));
    }

    #[tokio::test]
    async fn test_checkout_rejects_blank_contact_after_merge() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        repo.seed_product(1, "Product 1", 10).await;
        repo.seed_cart_line(9, line(1, 1, 1, 20000.0, 10)).await;

        let service = service(Arc::clone(&repo));
        let err = service
            .checkout(
                9,
                CheckoutRequest {
                    payment_method_id: 1,
                    order_method_id: 1,
                    full_name: Some("   ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        // Blank override falls back to the profile name; address stays empty
        assert!(matches!(err, OrderError::Validation(msg) if msg == "address is required"));

        // Supplying the missing fields in the request makes the same cart pass
        let response = service
            .checkout(
                9,
                CheckoutRequest {
                    payment_method_id: 1,
                    order_method_id: 1,
                    address: Some("Jl. Baru 2".to_string()),
                    phone: Some("0822222222".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let detail = service
            .history_detail(9, &response.no_invoice)
            .await
            .unwrap();
        assert_eq!(detail.full_name, "Buyer");
        assert_eq!(detail.address.as_deref(), Some("Jl. Baru 2"));
        assert_eq!(detail.phone.as_deref(), Some("0822222222"));
    }

    #[tokio::test]
    async fn test_update_status_enforces_denylist() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        repo.seed_product(1, "Product 1", 10).await;
        repo.seed_cart_line(7, line(1, 1, 1, 20000.0, 10)).await;

        let service = service(Arc::clone(&repo));
        // Dine-In order
        let response = service
            .checkout(
                7,
                CheckoutRequest {
                    payment_method_id: 1,
                    order_method_id: 1,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = service
            .update_status(response.transaction_id, 2, Some(1))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidTransition(_)));

        let updated = service
            .update_status(response.transaction_id, 3, Some(1))
            .await
            .unwrap();
        assert_eq!(updated.status_id, 3);
        assert_eq!(updated.updated_by, Some(1));
    }

    #[tokio::test]
    async fn test_history_detail_is_user_scoped() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        repo.seed_product(1, "Product 1", 10).await;
        repo.seed_cart_line(7, line(1, 1, 1, 20000.0, 10)).await;

        let service = service(Arc::clone(&repo));
        let response = service
            .checkout(
                7,
                CheckoutRequest {
                    payment_method_id: 1,
                    order_method_id: 1,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = service
            .history_detail(8, &response.no_invoice)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvoiceNotFound(_)));
    }
}
