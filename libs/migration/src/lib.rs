pub use sea_orm_migration::prelude::*;

mod m20250801_000000_create_users;
mod m20250801_000001_create_catalog;
mod m20250801_000002_create_reference_tables;
mod m20250801_000003_create_carts;
mod m20250801_000004_create_transactions;
mod m20250802_000000_seed_reference_data;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250801_000000_create_users::Migration),
            Box::new(m20250801_000001_create_catalog::Migration),
            Box::new(m20250801_000002_create_reference_tables::Migration),
            Box::new(m20250801_000003_create_carts::Migration),
            Box::new(m20250801_000004_create_transactions::Migration),
            Box::new(m20250802_000000_seed_reference_data::Migration),
        ]
    }
}
