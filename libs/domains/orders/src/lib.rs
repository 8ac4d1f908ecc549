//! Order processing: checkout from the cart into an immutable transaction
//! record, status progression, purchase histories, and the admin views.

pub mod entity;
pub mod error;
pub mod handlers;
pub mod invoice;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod status;

pub use error::{OrderError, OrderResult};
pub use models::{
    CheckoutRequest, CheckoutResponse, ContactInfo, OrderMethod, PaymentMethod, Status,
    Transaction, TransactionItem,
};
pub use postgres::PgOrderRepository;
pub use repository::{InMemoryOrderRepository, OrderRepository};
pub use service::{ContactProvider, OrderService};
pub use status::{validate_transition, OrderMethodKind, TransactionStatus};
