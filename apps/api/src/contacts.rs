//! Bridges checkout to user profiles.
//!
//! The orders crate snapshots the buyer's contact details into the
//! transaction row at checkout time; this adapter reads them from the user
//! service without the orders crate depending on it.

use std::sync::Arc;

use async_trait::async_trait;
use domain_orders::{ContactInfo, ContactProvider, OrderError, OrderResult};
use domain_users::{PgUserRepository, UserError, UserService};

pub struct ProfileContacts {
    users: Arc<UserService<PgUserRepository>>,
}

impl ProfileContacts {
    pub fn new(users: Arc<UserService<PgUserRepository>>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl ContactProvider for ProfileContacts {
    async fn contact_for(&self, user_id: i32) -> OrderResult<Option<ContactInfo>> {
        match self.users.get_user(user_id).await {
            Ok(user) => Ok(Some(ContactInfo {
                full_name: user.full_name,
                email: user.email,
                address: user.address,
                phone: user.phone,
            })),
            Err(UserError::NotFound(_)) => Ok(None),
            Err(e) => Err(OrderError::Database(e.to_string())),
        }
    }
}
