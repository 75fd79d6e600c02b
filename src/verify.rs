//! Read-back checks over a freshly seeded database.
//!
//! Violations are collected rather than raised so one pass reports every
//! broken row. Only database failures abort the check.

use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::entities::{customer, ingredient, menu_item, menu_item_ingredient, order, order_item, store};
use crate::errors::SeedResult;
use crate::generators::{LINE_ITEMS_PER_ORDER, LINE_QUANTITY, QUANTITY_NEEDED_CENTS, STOCK_QUANTITY_CENTS};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("order {order_id} total {stored} differs from its lines ({computed})")]
    TotalMismatch {
        order_id: i32,
        stored: Decimal,
        computed: Decimal,
    },

    #[error("order {order_id} has {lines} line items")]
    LineCount { order_id: i32, lines: usize },

    #[error("order item {order_item_id} has quantity {quantity}")]
    LineQuantity { order_item_id: i32, quantity: i32 },

    #[error("order item {order_item_id} priced {charged}, menu says {listed}")]
    LinePrice {
        order_item_id: i32,
        charged: Decimal,
        listed: Decimal,
    },

    #[error("{table} row {id} references missing {target} {target_id}")]
    DanglingReference {
        table: &'static str,
        id: i32,
        target: &'static str,
        target_id: i32,
    },

    #[error("ingredient {ingredient_id} stock {quantity} out of range")]
    StockOutOfRange { ingredient_id: i32, quantity: Decimal },

    #[error("recipe row {id} needs {quantity} out of range")]
    QuantityNeededOutOfRange { id: i32, quantity: Decimal },

    #[error("recipe row {id} pairs '{item}' with '{ingredient}', which its recipe does not list")]
    UnlistedIngredient {
        id: i32,
        item: String,
        ingredient: String,
    },

    #[error("expected {expected} recipe rows, found {found}")]
    RecipeRowCount { expected: usize, found: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    pub orders_checked: usize,
    pub order_items_checked: usize,
    pub recipe_rows_checked: usize,
    pub violations: Vec<Violation>,
}

impl VerificationReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

fn cents_range(cents: &std::ops::RangeInclusive<i64>) -> (Decimal, Decimal) {
    (Decimal::new(*cents.start(), 2), Decimal::new(*cents.end(), 2))
}

/// Checks the invariants a single seeding run leaves behind: order totals,
/// line counts and quantities, foreign keys, generated quantity ranges, and
/// recipe rows against `catalog`.
pub async fn verify_seed(db: &DatabaseConnection, catalog: &Catalog) -> SeedResult<VerificationReport> {
    info!("Verifying seeded data...");

    let customers: HashSet<i32> = customer::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|c| c.customer_id)
        .collect();
    let stores: HashSet<i32> = store::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|s| s.store_id)
        .collect();
    let ingredients: HashMap<i32, ingredient::Model> = ingredient::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|i| (i.ingredient_id, i))
        .collect();
    let menu: HashMap<i32, menu_item::Model> = menu_item::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|m| (m.item_id, m))
        .collect();
    let orders = order::Entity::find()
        .order_by_asc(order::Column::OrderId)
        .all(db)
        .await?;
    let lines = order_item::Entity::find()
        .order_by_asc(order_item::Column::OrderItemId)
        .all(db)
        .await?;
    let recipe_rows = menu_item_ingredient::Entity::find()
        .order_by_asc(menu_item_ingredient::Column::Id)
        .all(db)
        .await?;

    let mut report = VerificationReport {
        orders_checked: orders.len(),
        order_items_checked: lines.len(),
        recipe_rows_checked: recipe_rows.len(),
        ..Default::default()
    };
    let violations = &mut report.violations;

    let mut by_order: HashMap<i32, Vec<&order_item::Model>> = HashMap::new();
    for line in &lines {
        by_order.entry(line.order_id).or_default().push(line);

        if !LINE_QUANTITY.contains(&line.quantity) {
            violations.push(Violation::LineQuantity {
                order_item_id: line.order_item_id,
                quantity: line.quantity,
            });
        }
        match menu.get(&line.item_id) {
            Some(item) if item.price.round_dp(2) != line.item_price.round_dp(2) => {
                violations.push(Violation::LinePrice {
                    order_item_id: line.order_item_id,
                    charged: line.item_price,
                    listed: item.price,
                });
            }
            Some(_) => {}
            None => violations.push(Violation::DanglingReference {
                table: "order_items",
                id: line.order_item_id,
                target: "menu item",
                target_id: line.item_id,
            }),
        }
    }

    for placed in &orders {
        if !customers.contains(&placed.customer_id) {
            violations.push(Violation::DanglingReference {
                table: "orders",
                id: placed.order_id,
                target: "customer",
                target_id: placed.customer_id,
            });
        }
        if !stores.contains(&placed.store_id) {
            violations.push(Violation::DanglingReference {
                table: "orders",
                id: placed.order_id,
                target: "store",
                target_id: placed.store_id,
            });
        }

        let own_lines = by_order.get(&placed.order_id).map(Vec::as_slice).unwrap_or(&[]);
        if !LINE_ITEMS_PER_ORDER.contains(&own_lines.len()) {
            violations.push(Violation::LineCount {
                order_id: placed.order_id,
                lines: own_lines.len(),
            });
        }
        let computed = own_lines
            .iter()
            .map(|line| line.line_total())
            .sum::<Decimal>()
            .round_dp(2);
        if computed != placed.total_amount.round_dp(2) {
            violations.push(Violation::TotalMismatch {
                order_id: placed.order_id,
                stored: placed.total_amount,
                computed,
            });
        }
    }
    let order_ids: HashSet<i32> = orders.iter().map(|o| o.order_id).collect();
    for line in &lines {
        if !order_ids.contains(&line.order_id) {
            violations.push(Violation::DanglingReference {
                table: "order_items",
                id: line.order_item_id,
                target: "order",
                target_id: line.order_id,
            });
        }
    }

    let (stock_min, stock_max) = cents_range(&STOCK_QUANTITY_CENTS);
    let mut stocked: Vec<&ingredient::Model> = ingredients.values().collect();
    stocked.sort_by_key(|i| i.ingredient_id);
    for item in stocked {
        let quantity = item.stock_quantity.round_dp(2);
        if quantity < stock_min || quantity > stock_max {
            violations.push(Violation::StockOutOfRange {
                ingredient_id: item.ingredient_id,
                quantity: item.stock_quantity,
            });
        }
    }

    let listed: HashMap<&str, HashSet<&str>> = catalog
        .recipes
        .iter()
        .map(|r| (r.item.as_str(), r.ingredients.iter().map(String::as_str).collect()))
        .collect();
    let (needed_min, needed_max) = cents_range(&QUANTITY_NEEDED_CENTS);
    for row in &recipe_rows {
        let quantity = row.quantity_needed.round_dp(2);
        if quantity < needed_min || quantity > needed_max {
            violations.push(Violation::QuantityNeededOutOfRange {
                id: row.id,
                quantity: row.quantity_needed,
            });
        }

        let (Some(item), Some(used)) = (menu.get(&row.item_id), ingredients.get(&row.ingredient_id))
        else {
            let (target, target_id) = if menu.contains_key(&row.item_id) {
                ("ingredient", row.ingredient_id)
            } else {
                ("menu item", row.item_id)
            };
            violations.push(Violation::DanglingReference {
                table: "menu_item_ingredients",
                id: row.id,
                target,
                target_id,
            });
            continue;
        };
        let on_recipe = listed
            .get(item.name.as_str())
            .is_some_and(|names| names.contains(used.name.as_str()));
        if !on_recipe {
            violations.push(Violation::UnlistedIngredient {
                id: row.id,
                item: item.name.clone(),
                ingredient: used.name.clone(),
            });
        }
    }

    let expected = catalog.expected_recipe_rows();
    if recipe_rows.len() != expected {
        violations.push(Violation::RecipeRowCount {
            expected,
            found: recipe_rows.len(),
        });
    }

    if report.is_clean() {
        info!(
            orders = report.orders_checked,
            order_items = report.order_items_checked,
            recipe_rows = report.recipe_rows_checked,
            "Verification passed"
        );
    } else {
        for violation in report.violations.iter().take(20) {
            warn!("{}", violation);
        }
        warn!(count = report.violations.len(), "Verification found violations");
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn generated_ranges_in_units() {
        assert_eq!(cents_range(&STOCK_QUANTITY_CENTS), (dec!(10.00), dec!(500.00)));
        assert_eq!(cents_range(&QUANTITY_NEEDED_CENTS), (dec!(0.50), dec!(3.00)));
    }

    #[test]
    fn clean_report_has_no_violations() {
        let mut report = VerificationReport::default();
        assert!(report.is_clean());
        report.violations.push(Violation::RecipeRowCount { expected: 96, found: 0 });
        assert!(!report.is_clean());
        assert_eq!(report.violations[0].to_string(), "expected 96 recipe rows, found 0");
    }
}
