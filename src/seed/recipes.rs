use rand::Rng;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::catalog::RecipeSpec;
use crate::entities::{ingredient, menu_item, menu_item_ingredient};
use crate::errors::{SeedError, SeedResult};
use crate::generators;

/// Groups `(id, name)` rows into name -> ids, keeping every size variant.
pub fn group_by_name(rows: Vec<(i32, String)>) -> HashMap<String, Vec<i32>> {
    let mut grouped: HashMap<String, Vec<i32>> = HashMap::new();
    for (id, name) in rows {
        grouped.entry(name).or_default().push(id);
    }
    grouped
}

/// Looks up the ingredient ids of a recipe, in recipe order.
pub fn resolve_ingredients(
    recipe: &RecipeSpec,
    ingredient_ids: &HashMap<String, i32>,
) -> SeedResult<Vec<i32>> {
    recipe
        .ingredients
        .iter()
        .map(|name| {
            ingredient_ids
                .get(name)
                .copied()
                .ok_or_else(|| SeedError::missing("ingredient", name.as_str()))
        })
        .collect()
}

/// Inserts one requirement row per (menu item, recipe ingredient). A recipe
/// applies to every menu item whose name equals the recipe's base name.
/// Rows are not deduplicated against earlier runs.
pub async fn seed_recipes<R: Rng + ?Sized>(
    db: &DatabaseConnection,
    rng: &mut R,
    recipes: &[RecipeSpec],
) -> SeedResult<u64> {
    info!("Inserting menu item ingredients...");

    let ingredient_ids: HashMap<String, i32> = ingredient::Entity::find()
        .select_only()
        .column(ingredient::Column::IngredientId)
        .column(ingredient::Column::Name)
        .into_tuple::<(i32, String)>()
        .all(db)
        .await?
        .into_iter()
        .map(|(id, name)| (name, id))
        .collect();

    let variants = group_by_name(
        menu_item::Entity::find()
            .select_only()
            .column(menu_item::Column::ItemId)
            .column(menu_item::Column::Name)
            .order_by_asc(menu_item::Column::ItemId)
            .into_tuple()
            .all(db)
            .await?,
    );

    let txn = db.begin().await?;
    let mut inserted = 0u64;

    for recipe in recipes {
        let required = resolve_ingredients(recipe, &ingredient_ids)?;
        let Some(item_ids) = variants.get(&recipe.item) else {
            warn!(item = %recipe.item, "No menu item carries this recipe's name; skipping");
            continue;
        };

        for &item_id in item_ids {
            for &ingredient_id in &required {
                menu_item_ingredient::ActiveModel {
                    item_id: Set(item_id),
                    ingredient_id: Set(ingredient_id),
                    quantity_needed: Set(generators::quantity_needed(rng)),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
                inserted += 1;
            }
        }
    }

    txn.commit().await?;
    info!(rows = inserted, "Menu item ingredients inserted successfully");
    Ok(inserted)
}
