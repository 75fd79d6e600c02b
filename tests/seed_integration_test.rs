mod common;

use assert_matches::assert_matches;
use chrono::Datelike;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::{HashMap, HashSet};

use pizzeria_seed::entities::{
    customer, ingredient, menu_item, menu_item_ingredient, order, order_item, store,
};
use pizzeria_seed::seed::{seed_orders, seed_recipes};
use pizzeria_seed::verify::Violation;
use pizzeria_seed::{verify_seed, Catalog, SeedError};

use common::{fixed_now, migrated_db, seeder, small_plan};

#[tokio::test]
async fn full_run_fills_every_table() {
    let pool = migrated_db().await;
    let catalog = Catalog::builtin().unwrap();

    let report = seeder(&pool, &catalog, 7).run().await.unwrap();
    let plan = small_plan();

    assert_eq!(report.stores, u64::from(plan.store_count));
    assert_eq!(report.customers, u64::from(plan.customer_count));
    assert_eq!(report.ingredients, 48);
    assert_eq!(report.menu_items, 26);
    assert_eq!(report.orders, u64::from(plan.order_count));
    assert_eq!(report.recipe_rows, 96);

    assert_eq!(store::Entity::find().count(&pool).await.unwrap(), report.stores);
    assert_eq!(customer::Entity::find().count(&pool).await.unwrap(), report.customers);
    assert_eq!(ingredient::Entity::find().count(&pool).await.unwrap(), 48);
    assert_eq!(menu_item::Entity::find().count(&pool).await.unwrap(), 26);
    assert_eq!(order::Entity::find().count(&pool).await.unwrap(), report.orders);
    assert_eq!(order_item::Entity::find().count(&pool).await.unwrap(), report.order_items);
    assert_eq!(menu_item_ingredient::Entity::find().count(&pool).await.unwrap(), 96);

    assert!(report.order_items >= report.orders && report.order_items <= report.orders * 5);
}

#[tokio::test]
async fn seeded_data_passes_verification() {
    let pool = migrated_db().await;
    let catalog = Catalog::builtin().unwrap();
    seeder(&pool, &catalog, 11).run().await.unwrap();

    let verification = verify_seed(&pool, &catalog).await.unwrap();
    assert!(verification.is_clean(), "{:?}", verification.violations);
    assert_eq!(verification.orders_checked, small_plan().order_count as usize);
    assert_eq!(verification.recipe_rows_checked, 96);
}

#[tokio::test]
async fn order_totals_match_their_lines() {
    let pool = migrated_db().await;
    let catalog = Catalog::builtin().unwrap();
    seeder(&pool, &catalog, 3).run().await.unwrap();

    let mut sums: HashMap<i32, Decimal> = HashMap::new();
    for line in order_item::Entity::find().all(&pool).await.unwrap() {
        assert!((1..=3).contains(&line.quantity));
        *sums.entry(line.order_id).or_default() += line.line_total();
    }

    let now = fixed_now();
    for placed in order::Entity::find().all(&pool).await.unwrap() {
        let expected = sums[&placed.order_id].round_dp(2);
        assert_eq!(placed.total_amount.round_dp(2), expected, "order {}", placed.order_id);
        assert!(placed.total_amount > Decimal::ZERO);
        assert_eq!(placed.order_timestamp.year(), now.year());
        assert!(placed.order_timestamp <= now);
    }
}

#[tokio::test]
async fn contact_details_are_unique_across_stores_and_customers() {
    let pool = migrated_db().await;
    let catalog = Catalog::builtin().unwrap();
    seeder(&pool, &catalog, 5).run().await.unwrap();

    let stores = store::Entity::find().all(&pool).await.unwrap();
    let customers = customer::Entity::find().all(&pool).await.unwrap();

    let phones: HashSet<&str> = stores
        .iter()
        .map(|s| s.phone_number.as_str())
        .chain(customers.iter().map(|c| c.phone_number.as_str()))
        .collect();
    assert_eq!(phones.len(), stores.len() + customers.len());

    let emails: HashSet<&str> = customers.iter().map(|c| c.email.as_str()).collect();
    assert_eq!(emails.len(), customers.len());
}

#[tokio::test]
async fn every_size_variant_gets_the_recipe() {
    let pool = migrated_db().await;
    let catalog = Catalog::builtin().unwrap();
    seeder(&pool, &catalog, 13).run().await.unwrap();

    let margherita: Vec<menu_item::Model> = menu_item::Entity::find()
        .filter(menu_item::Column::Name.eq("Margherita Pizza"))
        .order_by_asc(menu_item::Column::ItemId)
        .all(&pool)
        .await
        .unwrap();
    assert_eq!(margherita.len(), 3);

    let recipe_len = catalog
        .recipes
        .iter()
        .find(|r| r.item == "Margherita Pizza")
        .unwrap()
        .ingredients
        .len();
    for variant in &margherita {
        let rows = menu_item_ingredient::Entity::find()
            .filter(menu_item_ingredient::Column::ItemId.eq(variant.item_id))
            .count(&pool)
            .await
            .unwrap();
        assert_eq!(rows as usize, recipe_len, "{} ({})", variant.name, variant.size);
    }

    // Exact-name matching keeps the plain garlic bread recipe off the cheesy one.
    let garlic = catalog.recipes.iter().find(|r| r.item == "Garlic Bread").unwrap();
    let cheesy = menu_item::Entity::find()
        .filter(menu_item::Column::Name.eq("Cheesy Garlic Bread"))
        .one(&pool)
        .await
        .unwrap()
        .unwrap();
    let cheesy_rows = menu_item_ingredient::Entity::find()
        .filter(menu_item_ingredient::Column::ItemId.eq(cheesy.item_id))
        .count(&pool)
        .await
        .unwrap();
    let cheesy_recipe = catalog
        .recipes
        .iter()
        .find(|r| r.item == "Cheesy Garlic Bread")
        .map_or(0, |r| r.ingredients.len());
    assert_eq!(cheesy_rows as usize, cheesy_recipe);
    assert_ne!(garlic.ingredients.len(), 0);
}

#[tokio::test]
async fn same_seed_reproduces_the_same_rows() {
    let catalog = Catalog::builtin().unwrap();

    let first = migrated_db().await;
    seeder(&first, &catalog, 21).run().await.unwrap();
    let second = migrated_db().await;
    seeder(&second, &catalog, 21).run().await.unwrap();

    let emails = |rows: Vec<customer::Model>| rows.into_iter().map(|c| c.email).collect::<Vec<_>>();
    assert_eq!(
        emails(customer::Entity::find().order_by_asc(customer::Column::CustomerId).all(&first).await.unwrap()),
        emails(customer::Entity::find().order_by_asc(customer::Column::CustomerId).all(&second).await.unwrap()),
    );
}

#[tokio::test]
async fn rerun_against_seeded_database_hits_unique_constraint() {
    let pool = migrated_db().await;
    let catalog = Catalog::builtin().unwrap();
    seeder(&pool, &catalog, 42).run().await.unwrap();

    let err = seeder(&pool, &catalog, 42).run().await.unwrap_err();
    assert!(err.is_unique_violation(), "unexpected error: {err}");

    // The failed store phase rolled back; nothing was added.
    assert_eq!(
        store::Entity::find().count(&pool).await.unwrap(),
        u64::from(small_plan().store_count)
    );
}

#[tokio::test]
async fn orders_need_customers_to_reference() {
    let pool = migrated_db().await;
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let err = seed_orders(&pool, &mut rng, 10, fixed_now()).await.unwrap_err();
    assert_matches!(err, SeedError::EmptyPool("customers"));
    assert_eq!(order::Entity::find().count(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn recipes_for_absent_menu_items_are_skipped() {
    let pool = migrated_db().await;
    let catalog = Catalog::builtin().unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(2);

    pizzeria_seed::seed::seed_ingredients(&pool, &mut rng, &catalog.ingredients)
        .await
        .unwrap();
    let inserted = seed_recipes(&pool, &mut rng, &catalog.recipes).await.unwrap();
    assert_eq!(inserted, 0);
}

#[tokio::test]
async fn recipes_with_unknown_ingredients_fail() {
    let pool = migrated_db().await;
    let catalog = Catalog::builtin().unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    pizzeria_seed::seed::seed_menu_items(&pool, &catalog.menu_items)
        .await
        .unwrap();
    let err = seed_recipes(&pool, &mut rng, &catalog.recipes).await.unwrap_err();
    assert_matches!(err, SeedError::MissingReference { kind: "ingredient", .. });
    assert_eq!(menu_item_ingredient::Entity::find().count(&pool).await.unwrap(), 0);
}

#[derive(Debug, Clone, Copy)]
enum Tamper {
    Total,
    DropLines,
    Quantity,
    LinePrice,
    Stock,
    QuantityNeeded,
    ForeignIngredient,
    MissingRecipeRow,
}

fn label(violation: &Violation) -> &'static str {
    match violation {
        Violation::TotalMismatch { .. } => "total",
        Violation::LineCount { .. } => "line_count",
        Violation::LineQuantity { .. } => "line_quantity",
        Violation::LinePrice { .. } => "line_price",
        Violation::DanglingReference { .. } => "dangling",
        Violation::StockOutOfRange { .. } => "stock",
        Violation::QuantityNeededOutOfRange { .. } => "quantity_needed",
        Violation::UnlistedIngredient { .. } => "unlisted",
        Violation::RecipeRowCount { .. } => "recipe_rows",
    }
}

async fn first_order(pool: &sea_orm::DatabaseConnection) -> order::Model {
    order::Entity::find()
        .order_by_asc(order::Column::OrderId)
        .one(pool)
        .await
        .unwrap()
        .unwrap()
}

async fn first_line(pool: &sea_orm::DatabaseConnection) -> order_item::Model {
    order_item::Entity::find()
        .order_by_asc(order_item::Column::OrderItemId)
        .one(pool)
        .await
        .unwrap()
        .unwrap()
}

async fn first_recipe_row(pool: &sea_orm::DatabaseConnection) -> menu_item_ingredient::Model {
    menu_item_ingredient::Entity::find()
        .order_by_asc(menu_item_ingredient::Column::Id)
        .one(pool)
        .await
        .unwrap()
        .unwrap()
}

async fn apply(tamper: Tamper, pool: &sea_orm::DatabaseConnection, catalog: &Catalog) {
    match tamper {
        Tamper::Total => {
            let mut placed: order::ActiveModel = first_order(pool).await.into();
            placed.total_amount = Set(dec!(0.01));
            placed.update(pool).await.unwrap();
        }
        Tamper::DropLines => {
            let placed = first_order(pool).await;
            order_item::Entity::delete_many()
                .filter(order_item::Column::OrderId.eq(placed.order_id))
                .exec(pool)
                .await
                .unwrap();
        }
        Tamper::Quantity => {
            let mut line: order_item::ActiveModel = first_line(pool).await.into();
            line.quantity = Set(4);
            line.update(pool).await.unwrap();
        }
        Tamper::LinePrice => {
            let line = first_line(pool).await;
            let charged = line.item_price + dec!(1.00);
            let mut line: order_item::ActiveModel = line.into();
            line.item_price = Set(charged);
            line.update(pool).await.unwrap();
        }
        Tamper::Stock => {
            let stocked = ingredient::Entity::find()
                .order_by_asc(ingredient::Column::IngredientId)
                .one(pool)
                .await
                .unwrap()
                .unwrap();
            let mut stocked: ingredient::ActiveModel = stocked.into();
            stocked.stock_quantity = Set(dec!(600.00));
            stocked.update(pool).await.unwrap();
        }
        Tamper::QuantityNeeded => {
            let mut row: menu_item_ingredient::ActiveModel = first_recipe_row(pool).await.into();
            row.quantity_needed = Set(dec!(5.00));
            row.update(pool).await.unwrap();
        }
        Tamper::ForeignIngredient => {
            let recipe = &catalog.recipes[0];
            let item = menu_item::Entity::find()
                .filter(menu_item::Column::Name.eq(recipe.item.as_str()))
                .one(pool)
                .await
                .unwrap()
                .unwrap();
            let outsider = catalog
                .ingredients
                .iter()
                .find(|i| !recipe.ingredients.contains(&i.name))
                .unwrap();
            let outsider = ingredient::Entity::find()
                .filter(ingredient::Column::Name.eq(outsider.name.as_str()))
                .one(pool)
                .await
                .unwrap()
                .unwrap();
            menu_item_ingredient::ActiveModel {
                item_id: Set(item.item_id),
                ingredient_id: Set(outsider.ingredient_id),
                quantity_needed: Set(dec!(1.00)),
                ..Default::default()
            }
            .insert(pool)
            .await
            .unwrap();
        }
        Tamper::MissingRecipeRow => {
            menu_item_ingredient::Entity::delete_by_id(first_recipe_row(pool).await.id)
                .exec(pool)
                .await
                .unwrap();
        }
    }
}

#[rstest]
#[case::altered_total(Tamper::Total, &["total"])]
#[case::order_without_lines(Tamper::DropLines, &["line_count", "total"])]
#[case::quantity_above_three(Tamper::Quantity, &["line_quantity", "total"])]
#[case::line_off_menu_price(Tamper::LinePrice, &["line_price", "total"])]
#[case::overstocked_ingredient(Tamper::Stock, &["stock"])]
#[case::oversized_recipe_quantity(Tamper::QuantityNeeded, &["quantity_needed"])]
#[case::ingredient_off_recipe(Tamper::ForeignIngredient, &["unlisted", "recipe_rows"])]
#[case::recipe_row_removed(Tamper::MissingRecipeRow, &["recipe_rows"])]
#[tokio::test]
async fn verification_reports_tampering(#[case] tamper: Tamper, #[case] expected: &[&str]) {
    let pool = migrated_db().await;
    let catalog = Catalog::builtin().unwrap();
    seeder(&pool, &catalog, 8).run().await.unwrap();

    apply(tamper, &pool, &catalog).await;

    let verification = verify_seed(&pool, &catalog).await.unwrap();
    let mut found: Vec<&str> = verification.violations.iter().map(label).collect();
    found.sort_unstable();
    found.dedup();
    let mut expected = expected.to_vec();
    expected.sort_unstable();
    assert_eq!(found, expected, "{tamper:?}: {:?}", verification.violations);
}
