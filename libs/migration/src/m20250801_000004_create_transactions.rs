use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(pk_auto(Transactions::Id))
                    .col(string_uniq(Transactions::NoInvoice))
                    .col(integer(Transactions::UserId))
                    // contact snapshot, frozen at checkout time
                    .col(string(Transactions::FullName))
                    .col(string(Transactions::Email))
                    .col(string_null(Transactions::Address))
                    .col(string_null(Transactions::Phone))
                    .col(integer(Transactions::PaymentMethodId))
                    .col(integer(Transactions::OrderMethodId))
                    .col(integer(Transactions::StatusId).default(1))
                    .col(double(Transactions::DeliveryFee).default(0.0))
                    .col(double(Transactions::AdminFee).default(0.0))
                    .col(double(Transactions::Tax).default(0.0))
                    .col(double(Transactions::TotalTransaction))
                    .col(timestamp_with_time_zone(Transactions::DateTransaction))
                    .col(integer_null(Transactions::CreatedBy))
                    .col(integer_null(Transactions::UpdatedBy))
                    .col(
                        timestamp_with_time_zone(Transactions::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Transactions::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_user")
                            .from(Transactions::Table, Transactions::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_status")
                            .from(Transactions::Table, Transactions::StatusId)
                            .to(Statuses::Table, Statuses::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_order_method")
                            .from(Transactions::Table, Transactions::OrderMethodId)
                            .to(OrderMethods::Table, OrderMethods::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_payment_method")
                            .from(Transactions::Table, Transactions::PaymentMethodId)
                            .to(PaymentMethods::Table, PaymentMethods::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_user_id")
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_no_invoice")
                    .table(Transactions::Table)
                    .col(Transactions::NoInvoice)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_status_id")
                    .table(Transactions::Table)
                    .col(Transactions::StatusId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TransactionItems::Table)
                    .if_not_exists()
                    .col(pk_auto(TransactionItems::Id))
                    .col(integer(TransactionItems::TransactionId))
                    .col(integer(TransactionItems::ProductId))
                    // denormalized product snapshot
                    .col(string(TransactionItems::ProductName))
                    .col(double(TransactionItems::ProductPrice))
                    .col(integer_null(TransactionItems::DiscountPercent))
                    .col(double_null(TransactionItems::DiscountPrice))
                    .col(string_null(TransactionItems::Size))
                    .col(double(TransactionItems::SizeCost).default(0.0))
                    .col(string_null(TransactionItems::Variant))
                    .col(double(TransactionItems::VariantCost).default(0.0))
                    .col(integer(TransactionItems::Amount))
                    .col(double(TransactionItems::Subtotal))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transaction_items_transaction")
                            .from(TransactionItems::Table, TransactionItems::TransactionId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transaction_items_transaction_id")
                    .table(TransactionItems::Table)
                    .col(TransactionItems::TransactionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TransactionItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    NoInvoice,
    UserId,
    FullName,
    Email,
    Address,
    Phone,
    PaymentMethodId,
    OrderMethodId,
    StatusId,
    DeliveryFee,
    AdminFee,
    Tax,
    TotalTransaction,
    DateTransaction,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TransactionItems {
    Table,
    Id,
    TransactionId,
    ProductId,
    ProductName,
    ProductPrice,
    DiscountPercent,
    DiscountPrice,
    Size,
    SizeCost,
    Variant,
    VariantCost,
    Amount,
    Subtotal,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Statuses {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum OrderMethods {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum PaymentMethods {
    Table,
    Id,
}
