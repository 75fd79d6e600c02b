pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_stores_table;
mod m20240101_000002_create_customers_table;
mod m20240101_000003_create_ingredients_table;
mod m20240101_000004_create_menu_items_table;
mod m20240101_000005_create_orders_table;
mod m20240101_000006_create_order_items_table;
mod m20240101_000007_create_menu_item_ingredients_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_stores_table::Migration),
            Box::new(m20240101_000002_create_customers_table::Migration),
            Box::new(m20240101_000003_create_ingredients_table::Migration),
            Box::new(m20240101_000004_create_menu_items_table::Migration),
            Box::new(m20240101_000005_create_orders_table::Migration),
            Box::new(m20240101_000006_create_order_items_table::Migration),
            Box::new(m20240101_000007_create_menu_item_ingredients_table::Migration),
        ]
    }
}
