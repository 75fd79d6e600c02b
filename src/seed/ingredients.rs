use rand::Rng;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};
use tracing::info;

use crate::catalog::IngredientSpec;
use crate::entities::ingredient;
use crate::errors::SeedResult;
use crate::generators;

/// Inserts every catalog ingredient with a random stock level
pub async fn seed_ingredients<R: Rng + ?Sized>(
    db: &DatabaseConnection,
    rng: &mut R,
    ingredients: &[IngredientSpec],
) -> SeedResult<u64> {
    info!("Inserting ingredients...");
    let txn = db.begin().await?;

    for spec in ingredients {
        let ingredient = ingredient::ActiveModel {
            name: Set(spec.name.clone()),
            stock_quantity: Set(generators::stock_quantity(rng)),
            unit: Set(spec.unit),
            ..Default::default()
        };
        ingredient.insert(&txn).await?;
    }

    txn.commit().await?;
    info!("{} ingredients inserted successfully", ingredients.len());
    Ok(ingredients.len() as u64)
}
