use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Status and order-method ids are semantic (1/2/3), so no auto pk
        manager
            .create_table(
                Table::create()
                    .table(Statuses::Table)
                    .if_not_exists()
                    .col(integer(Statuses::Id).primary_key())
                    .col(string_uniq(Statuses::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderMethods::Table)
                    .if_not_exists()
                    .col(integer(OrderMethods::Id).primary_key())
                    .col(string_uniq(OrderMethods::Name))
                    .col(double(OrderMethods::DeliveryFee).default(0.0))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PaymentMethods::Table)
                    .if_not_exists()
                    .col(pk_auto(PaymentMethods::Id))
                    .col(string_uniq(PaymentMethods::Name))
                    .col(double(PaymentMethods::AdminFee).default(0.0))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PaymentMethods::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrderMethods::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Statuses::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Statuses {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum OrderMethods {
    Table,
    Id,
    Name,
    DeliveryFee,
}

#[derive(DeriveIden)]
enum PaymentMethods {
    Table,
    Id,
    Name,
    AdminFee,
}
