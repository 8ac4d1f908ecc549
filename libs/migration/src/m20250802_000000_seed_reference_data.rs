use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                INSERT INTO statuses (id, name)
                VALUES
                    (1, 'On Progress'),
                    (2, 'Sending Goods'),
                    (3, 'Finish Order')
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                INSERT INTO order_methods (id, name, delivery_fee)
                VALUES
                    (1, 'Dine-In', 0),
                    (2, 'Door Delivery', 5000),
                    (3, 'Pick-Up', 0)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                INSERT INTO payment_methods (id, name, admin_fee)
                VALUES
                    (1, 'Cash', 0),
                    (2, 'Bank Transfer', 2000),
                    (3, 'E-Wallet', 1500)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .await?;

        // keep the serial sequence ahead of the fixed ids
        manager
            .get_connection()
            .execute_unprepared(
                "SELECT setval(pg_get_serial_sequence('payment_methods', 'id'), (SELECT MAX(id) FROM payment_methods))",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DELETE FROM payment_methods WHERE id IN (1, 2, 3)")
            .await?;
        manager
            .get_connection()
            .execute_unprepared("DELETE FROM order_methods WHERE id IN (1, 2, 3)")
            .await?;
        manager
            .get_connection()
            .execute_unprepared("DELETE FROM statuses WHERE id IN (1, 2, 3)")
            .await?;
        Ok(())
    }
}
