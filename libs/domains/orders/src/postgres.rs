use async_trait::async_trait;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};
use std::collections::HashMap;

use domain_carts::entity::cart;
use domain_catalog::entity::product as catalog_product;
use domain_catalog::entity::size as catalog_size;
use domain_catalog::entity::variant as catalog_variant;
use domain_catalog::Product;

use crate::entity::{order_method, payment_method, status, transaction, transaction_item};
use crate::error::{OrderError, OrderResult};
use crate::models::{
    AdminTransactionFilter, CheckoutLine, HistoryFilter, NewTransaction, NewTransactionItem,
    OrderMethod, PaymentMethod, Status, Transaction, TransactionItem,
};
use crate::repository::OrderRepository;

pub struct PgOrderRepository {
    db: DatabaseConnection,
}

impl PgOrderRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn admin_condition(filter: &AdminTransactionFilter) -> Condition {
        let mut condition = Condition::all();
        if let Some(ref search) = filter.search {
            condition = condition.add(
                Condition::any()
                    .add(transaction::Column::NoInvoice.contains(search))
                    .add(transaction::Column::FullName.contains(search)),
            );
        }
        if let Some(status_id) = filter.status_id {
            condition = condition.add(transaction::Column::StatusId.eq(status_id));
        }
        condition
    }

    fn history_condition(user_id: i32, filter: &HistoryFilter) -> Condition {
        let mut condition = Condition::all().add(transaction::Column::UserId.eq(user_id));
        if let Some(date) = filter.date {
            condition = condition.add(transaction::Column::DateTransaction.eq(date));
        }
        if let Some(status_id) = filter.status_id {
            condition = condition.add(transaction::Column::StatusId.eq(status_id));
        }
        condition
    }

    async fn page(
        &self,
        condition: Condition,
        limit: u64,
        offset: u64,
    ) -> OrderResult<(Vec<Transaction>, u64)> {
        let total = transaction::Entity::find()
            .filter(condition.clone())
            .count(&self.db)
            .await?;

        let models = transaction::Entity::find()
            .filter(condition)
            .order_by_desc(transaction::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await?;

        Ok((models.into_iter().map(Into::into).collect(), total))
    }

    async fn with_items(
        &self,
        model: transaction::Model,
    ) -> OrderResult<(Transaction, Vec<TransactionItem>)> {
        let items = model
            .find_related(transaction_item::Entity)
            .order_by_asc(transaction_item::Column::Id)
            .all(&self.db)
            .await?;
        Ok((
            model.into(),
            items.into_iter().map(Into::into).collect(),
        ))
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn load_checkout_lines(&self, user_id: i32) -> OrderResult<Vec<CheckoutLine>> {
        let carts = cart::Entity::find()
            .filter(cart::Column::UserId.eq(user_id))
            .order_by_asc(cart::Column::Id)
            .all(&self.db)
            .await?;
        if carts.is_empty() {
            return Ok(vec![]);
        }

        let product_ids: Vec<i32> = carts.iter().map(|c| c.product_id).collect();
        let size_ids: Vec<i32> = carts.iter().filter_map(|c| c.size_id).collect();
        let variant_ids: Vec<i32> = carts.iter().filter_map(|c| c.variant_id).collect();

        let products: HashMap<i32, catalog_product::Model> = catalog_product::Entity::find()
            .filter(catalog_product::Column::Id.is_in(product_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        let sizes: HashMap<i32, catalog_size::Model> = catalog_size::Entity::find()
            .filter(catalog_size::Column::Id.is_in(size_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();
        let variants: HashMap<i32, catalog_variant::Model> = catalog_variant::Entity::find()
            .filter(catalog_variant::Column::Id.is_in(variant_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|v| (v.id, v))
            .collect();

        let mut lines = Vec::with_capacity(carts.len());
        for cart in carts {
            let Some(model) = products.get(&cart.product_id) else {
                continue; // product removed since the cart row was written
            };
            let product: Product = model.clone().into();
            let discount_price = product
                .discount_percent
                .map(|_| product.discounted_price());
            let size = cart.size_id.and_then(|id| sizes.get(&id));
            let variant = cart.variant_id.and_then(|id| variants.get(&id));

            lines.push(CheckoutLine {
                cart_id: cart.id,
                product_id: product.id,
                product_name: product.name,
                product_price: product.price,
                discount_percent: product.discount_percent,
                discount_price,
                size: size.map(|s| s.name.clone()),
                size_cost: size.map_or(0.0, |s| s.size_cost),
                variant: variant.map(|v| v.name.clone()),
                variant_cost: variant.map_or(0.0, |v| v.variant_cost),
                amount: cart.amount,
                subtotal: cart.subtotal,
                stock: product.stock,
            });
        }
        Ok(lines)
    }

    async fn get_order_method(&self, id: i32) -> OrderResult<Option<OrderMethod>> {
        let model = order_method::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn get_payment_method(&self, id: i32) -> OrderResult<Option<PaymentMethod>> {
        let model = payment_method::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn list_order_methods(&self) -> OrderResult<Vec<OrderMethod>> {
        let models = order_method::Entity::find()
            .order_by_asc(order_method::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list_payment_methods(&self) -> OrderResult<Vec<PaymentMethod>> {
        let models = payment_method::Entity::find()
            .order_by_asc(payment_method::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn get_status(&self, id: i32) -> OrderResult<Option<Status>> {
        let model = status::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn create_transaction(
        &self,
        input: NewTransaction,
        items: Vec<NewTransactionItem>,
    ) -> OrderResult<Transaction> {
        let txn = self.db.begin().await?;

        let no_invoice = input.no_invoice.clone();
        let user_id = input.user_id;
        let active_model: transaction::ActiveModel = input.into();
        let model = transaction::Entity::insert(active_model)
            .exec_with_returning(&txn)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    OrderError::DuplicateInvoice(no_invoice)
                }
                _ => e.into(),
            })?;

        // Conditional decrement guards against racing checkouts; zero rows
        // means the stock moved under us and the whole transaction rolls back
        for item in &items {
            let result = catalog_product::Entity::update_many()
                .col_expr(
                    catalog_product::Column::Stock,
                    Expr::col(catalog_product::Column::Stock).sub(item.amount),
                )
                .filter(
                    catalog_product::Column::Id
                        .eq(item.product_id)
                        .and(catalog_product::Column::Stock.gte(item.amount)),
                )
                .exec(&txn)
                .await?;

            if result.rows_affected == 0 {
                let available = catalog_product::Entity::find_by_id(item.product_id)
                    .one(&txn)
                    .await?
                    .map_or(0, |p| p.stock);
                return Err(OrderError::InsufficientStock {
                    product: item.product_name.clone(),
                    available,
                    requested: item.amount,
                });
            }
        }

        let item_models = items
            .into_iter()
            .map(|i| i.into_active_model(model.id));
        transaction_item::Entity::insert_many(item_models)
            .exec(&txn)
            .await?;

        cart::Entity::delete_many()
            .filter(cart::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        tracing::info!(
            transaction_id = model.id,
            no_invoice = %model.no_invoice,
            "Created transaction"
        );
        Ok(model.into())
    }

    async fn get_transaction(
        &self,
        id: i32,
    ) -> OrderResult<Option<(Transaction, Vec<TransactionItem>)>> {
        let model = transaction::Entity::find_by_id(id).one(&self.db).await?;
        match model {
            Some(model) => Ok(Some(self.with_items(model).await?)),
            None => Ok(None),
        }
    }

    async fn get_by_invoice(
        &self,
        no_invoice: &str,
    ) -> OrderResult<Option<(Transaction, Vec<TransactionItem>)>> {
        let model = transaction::Entity::find()
            .filter(transaction::Column::NoInvoice.eq(no_invoice))
            .one(&self.db)
            .await?;
        match model {
            Some(model) => Ok(Some(self.with_items(model).await?)),
            None => Ok(None),
        }
    }

    async fn list_for_user(
        &self,
        user_id: i32,
        filter: HistoryFilter,
    ) -> OrderResult<(Vec<Transaction>, u64)> {
        let condition = Self::history_condition(user_id, &filter);
        self.page(condition, filter.limit, filter.offset).await
    }

    async fn list_admin(
        &self,
        filter: AdminTransactionFilter,
    ) -> OrderResult<(Vec<Transaction>, u64)> {
        let condition = Self::admin_condition(&filter);
        self.page(condition, filter.limit, filter.offset).await
    }

    async fn update_status(
        &self,
        id: i32,
        status_id: i32,
        updated_by: Option<i32>,
    ) -> OrderResult<Transaction> {
        let active_model = transaction::ActiveModel {
            id: Set(id),
            status_id: Set(status_id),
            updated_by: Set(updated_by),
            updated_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        let model = transaction::Entity::update(active_model)
            .exec(&self.db)
            .await
            .map_err(|e| match e {
                sea_orm::DbErr::RecordNotUpdated => OrderError::TransactionNotFound(id),
                _ => e.into(),
            })?;

        tracing::info!(transaction_id = id, status_id, "Updated transaction status");
        Ok(model.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContactInfo;
    use chrono::NaiveDate;
    use sea_orm::ConnectionTrait;
    use test_utils::TestDatabase;

    async fn seed_fixtures(db: &DatabaseConnection) {
        db.execute_unprepared(
            "INSERT INTO users (full_name, email, password_hash, role, created_at, updated_at) \
             VALUES ('Order Tester', 'orders@example.com', 'hash', 'user', now(), now())",
        )
        .await
        .unwrap();
        db.execute_unprepared(
            "INSERT INTO products (name, price, stock, is_flash_sale, created_at, updated_at) \
             VALUES ('Kopi', 20000, 10, false, now(), now())",
        )
        .await
        .unwrap();
        db.execute_unprepared(
            "INSERT INTO carts (user_id, product_id, amount, subtotal, created_at, updated_at) \
             VALUES (1, 1, 2, 40000, now(), now())",
        )
        .await
        .unwrap();
    }

    fn new_transaction(invoice: &str) -> NewTransaction {
        NewTransaction {
            no_invoice: invoice.to_string(),
            user_id: 1,
            contact: ContactInfo {
                full_name: "Order Tester".to_string(),
                email: "orders@example.com".to_string(),
                address: None,
                phone: None,
            },
            payment_method_id: 1,
            order_method_id: 2,
            status_id: 1,
            delivery_fee: 5000.0,
            admin_fee: 0.0,
            tax: 4000.0,
            total_transaction: 49000.0,
            date_transaction: NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
            created_by: Some(1),
        }
    }

    fn item(amount: i32) -> NewTransactionItem {
        NewTransactionItem {
            product_id: 1,
            product_name: "Kopi".to_string(),
            product_price: 20000.0,
            discount_percent: None,
            discount_price: None,
            size: None,
            size_cost: 0.0,
            variant: None,
            variant_cost: 0.0,
            amount,
            subtotal: 20000.0 * f64::from(amount),
        }
    }

    #[tokio::test]
    #[ignore] // Requires Docker for the Postgres container
    async fn test_pg_checkout_lines_join_catalog() {
        let db = TestDatabase::migrated::<migration::Migrator>().await;
        seed_fixtures(&db.connection()).await;
        let repo = PgOrderRepository::new(db.connection());

        let lines = repo.load_checkout_lines(1).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_name, "Kopi");
        assert_eq!(lines[0].stock, 10);
        assert_eq!(lines[0].subtotal, 40000.0);
    }

    #[tokio::test]
    #[ignore] // Requires Docker for the Postgres container
    async fn test_pg_create_transaction_decrements_and_clears() {
        let db = TestDatabase::migrated::<migration::Migrator>().await;
        seed_fixtures(&db.connection()).await;
        let repo = PgOrderRepository::new(db.connection());

        let created = repo
            .create_transaction(new_transaction("INV-20240307-11111"), vec![item(2)])
            .await
            .unwrap();
        assert_eq!(created.status_id, 1);

        assert!(repo.load_checkout_lines(1).await.unwrap().is_empty());

        let product = catalog_product::Entity::find_by_id(1)
            .one(&db.connection())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.stock, 8);
    }

    #[tokio::test]
    #[ignore] // Requires Docker for the Postgres container
    async fn test_pg_oversell_rolls_back() {
        let db = TestDatabase::migrated::<migration::Migrator>().await;
        seed_fixtures(&db.connection()).await;
        let repo = PgOrderRepository::new(db.connection());

        let err = repo
            .create_transaction(new_transaction("INV-20240307-22222"), vec![item(99)])
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InsufficientStock { .. }));

        // Nothing was persisted and the cart is intact
        assert!(repo
            .get_by_invoice("INV-20240307-22222")
            .await
            .unwrap()
            .is_none());
        assert_eq!(repo.load_checkout_lines(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    #[ignore] // Requires Docker for the Postgres container
    async fn test_pg_duplicate_invoice_is_flagged() {
        let db = TestDatabase::migrated::<migration::Migrator>().await;
        seed_fixtures(&db.connection()).await;
        let repo = PgOrderRepository::new(db.connection());

        repo.create_transaction(new_transaction("INV-20240307-33333"), vec![item(1)])
            .await
            .unwrap();
        let err = repo
            .create_transaction(new_transaction("INV-20240307-33333"), vec![item(1)])
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::DuplicateInvoice(_)));
    }
}
