//! Sea-ORM entity for the carts table.

use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};

use crate::models::{Cart, NewCart};

pub mod cart {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "carts")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub user_id: i32,
        pub product_id: i32,
        pub size_id: Option<i32>,
        pub variant_id: Option<i32>,
        pub amount: i32,
        pub subtotal: f64,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

impl From<cart::Model> for Cart {
    fn from(model: cart::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            product_id: model.product_id,
            size_id: model.size_id,
            variant_id: model.variant_id,
            amount: model.amount,
            subtotal: model.subtotal,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<NewCart> for cart::ActiveModel {
    fn from(input: NewCart) -> Self {
        let now = chrono::Utc::now();
        cart::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            user_id: Set(input.user_id),
            product_id: Set(input.product_id),
            size_id: Set(input.size_id),
            variant_id: Set(input.variant_id),
            amount: Set(input.amount),
            subtotal: Set(input.subtotal),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
    }
}
