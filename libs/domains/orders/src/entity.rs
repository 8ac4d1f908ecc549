//! Sea-ORM entities for transactions and the seeded reference tables.

use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};

use crate::models::{
    NewTransaction, NewTransactionItem, OrderMethod, PaymentMethod, Status, Transaction,
    TransactionItem,
};

pub mod transaction {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "transactions")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        #[sea_orm(unique)]
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
        pub date_transaction: Date,
        pub created_by: Option<i32>,
        pub updated_by: Option<i32>,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::transaction_item::Entity")]
        Items,
        #[sea_orm(
            belongs_to = "super::status::Entity",
            from = "Column::StatusId",
            to = "super::status::Column::Id"
        )]
        Status,
        #[sea_orm(
            belongs_to = "super::order_method::Entity",
            from = "Column::OrderMethodId",
            to = "super::order_method::Column::Id"
        )]
        OrderMethod,
        #[sea_orm(
            belongs_to = "super::payment_method::Entity",
            from = "Column::PaymentMethodId",
            to = "super::payment_method::Column::Id"
        )]
        PaymentMethod,
    }

    impl Related<super::transaction_item::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Items.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod transaction_item {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "transaction_items")]
    pub struct Model {
        #[sea_orm(primary_key)]
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

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::transaction::Entity",
            from = "Column::TransactionId",
            to = "super::transaction::Column::Id"
        )]
        Transaction,
    }

    impl Related<super::transaction::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Transaction.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod status {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "statuses")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i32,
        pub name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod order_method {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "order_methods")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i32,
        #[sea_orm(unique)]
        pub name: String,
        pub delivery_fee: f64,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod payment_method {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "payment_methods")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        #[sea_orm(unique)]
        pub name: String,
        pub admin_fee: f64,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

impl From<transaction::Model> for Transaction {
    fn from(model: transaction::Model) -> Self {
        Self {
            id: model.id,
            no_invoice: model.no_invoice,
            user_id: model.user_id,
            full_name: model.full_name,
            email: model.email,
            address: model.address,
            phone: model.phone,
            payment_method_id: model.payment_method_id,
            order_method_id: model.order_method_id,
            status_id: model.status_id,
            delivery_fee: model.delivery_fee,
            admin_fee: model.admin_fee,
            tax: model.tax,
            total_transaction: model.total_transaction,
            date_transaction: model.date_transaction,
            created_by: model.created_by,
            updated_by: model.updated_by,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<NewTransaction> for transaction::ActiveModel {
    fn from(input: NewTransaction) -> Self {
        let now = chrono::Utc::now();
        transaction::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            no_invoice: Set(input.no_invoice),
            user_id: Set(input.user_id),
            full_name: Set(input.contact.full_name),
            email: Set(input.contact.email),
            address: Set(input.contact.address),
            phone: Set(input.contact.phone),
            payment_method_id: Set(input.payment_method_id),
            order_method_id: Set(input.order_method_id),
            status_id: Set(input.status_id),
            delivery_fee: Set(input.delivery_fee),
            admin_fee: Set(input.admin_fee),
            tax: Set(input.tax),
            total_transaction: Set(input.total_transaction),
            date_transaction: Set(input.date_transaction),
            created_by: Set(input.created_by),
            updated_by: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
    }
}

impl From<transaction_item::Model> for TransactionItem {
    fn from(model: transaction_item::Model) -> Self {
        Self {
            id: model.id,
            transaction_id: model.transaction_id,
            product_id: model.product_id,
            product_name: model.product_name,
            product_price: model.product_price,
            discount_percent: model.discount_percent,
            discount_price: model.discount_price,
            size: model.size,
            size_cost: model.size_cost,
            variant: model.variant,
            variant_cost: model.variant_cost,
            amount: model.amount,
            subtotal: model.subtotal,
        }
    }
}

impl NewTransactionItem {
    pub fn into_active_model(self, transaction_id: i32) -> transaction_item::ActiveModel {
        transaction_item::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            transaction_id: Set(transaction_id),
            product_id: Set(self.product_id),
            product_name: Set(self.product_name),
            product_price: Set(self.product_price),
            discount_percent: Set(self.discount_percent),
            discount_price: Set(self.discount_price),
            size: Set(self.size),
            size_cost: Set(self.size_cost),
            variant: Set(self.variant),
            variant_cost: Set(self.variant_cost),
            amount: Set(self.amount),
            subtotal: Set(self.subtotal),
        }
    }
}

impl From<status::Model> for Status {
    fn from(model: status::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

impl From<order_method::Model> for OrderMethod {
    fn from(model: order_method::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            delivery_fee: model.delivery_fee,
        }
    }
}

impl From<payment_method::Model> for PaymentMethod {
    fn from(model: payment_method::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            admin_fee: model.admin_fee,
        }
    }
}
