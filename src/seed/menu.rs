use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};
use tracing::info;

use crate::catalog::MenuItemSpec;
use crate::entities::menu_item;
use crate::errors::SeedResult;

/// Inserts the catalog menu, one row per size variant, at catalog prices
pub async fn seed_menu_items(db: &DatabaseConnection, items: &[MenuItemSpec]) -> SeedResult<u64> {
    info!("Inserting menu items...");
    let txn = db.begin().await?;

    for spec in items {
        let item = menu_item::ActiveModel {
            name: Set(spec.name.clone()),
            category: Set(spec.category),
            size: Set(spec.size.clone()),
            price: Set(spec.price),
            ..Default::default()
        };
        item.insert(&txn).await?;
    }

    txn.commit().await?;
    info!("{} menu items inserted successfully", items.len());
    Ok(items.len() as u64)
}
