//! Sea-ORM entities for the users and password_resets tables.

use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};

use crate::models::{NewPasswordReset, NewUser, PasswordReset, Role, User};

pub mod user {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub full_name: String,
        #[sea_orm(unique)]
        pub email: String,
        pub password_hash: String,
        pub address: Option<String>,
        pub phone: Option<String>,
        pub role: String,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::password_reset::Entity")]
        PasswordResets,
    }

    impl Related<super::password_reset::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::PasswordResets.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod password_reset {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "password_resets")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub user_id: i32,
        #[sea_orm(unique)]
        pub token: String,
        pub expires_at: DateTimeWithTimeZone,
        pub used: bool,
        pub created_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::user::Entity",
            from = "Column::UserId",
            to = "super::user::Column::Id"
        )]
        User,
    }

    impl Related<super::user::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::User.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

impl From<user::Model> for User {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            full_name: model.full_name,
            email: model.email,
            password_hash: model.password_hash,
            address: model.address,
            phone: model.phone,
            role: model.role.parse().unwrap_or_default(),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<NewUser> for user::ActiveModel {
    fn from(input: NewUser) -> Self {
        let now = chrono::Utc::now();
        user::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            full_name: Set(input.full_name),
            email: Set(input.email),
            password_hash: Set(input.password_hash),
            address: Set(input.address),
            phone: Set(input.phone),
            role: Set(input.role.to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
    }
}

impl From<password_reset::Model> for PasswordReset {
    fn from(model: password_reset::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            token: model.token,
            expires_at: model.expires_at.into(),
            used: model.used,
            created_at: model.created_at.into(),
        }
    }
}

impl From<NewPasswordReset> for password_reset::ActiveModel {
    fn from(input: NewPasswordReset) -> Self {
        password_reset::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            user_id: Set(input.user_id),
            token: Set(input.token),
            expires_at: Set(input.expires_at.into()),
            used: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        }
    }
}

// Role is stored as plain text
impl From<Role> for sea_orm::Value {
    fn from(role: Role) -> Self {
        role.to_string().into()
    }
}
