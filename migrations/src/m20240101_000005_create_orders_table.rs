use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_stores_table::Stores;
use super::m20240101_000002_create_customers_table::Customers;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Orders::OrderId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Orders::CustomerId).integer().not_null())
                    .col(ColumnDef::new(Orders::StoreId).integer().not_null())
                    .col(ColumnDef::new(Orders::OrderTimestamp).timestamp().not_null())
                    .col(
                        ColumnDef::new(Orders::TotalAmount)
                            .decimal_len(10, 2)
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_customer_id")
                            .from(Orders::Table, Orders::CustomerId)
                            .to(Customers::Table, Customers::CustomerId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_store_id")
                            .from(Orders::Table, Orders::StoreId)
                            .to(Stores::Table, Stores::StoreId),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Orders {
    Table,
    OrderId,
    CustomerId,
    StoreId,
    OrderTimestamp,
    TotalAmount,
}
