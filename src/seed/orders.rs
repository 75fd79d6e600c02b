use chrono::NaiveDateTime;
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use tracing::{debug, info};

use crate::entities::{customer, menu_item, order, order_item, store};
use crate::errors::{SeedError, SeedResult};
use crate::generators;

const PROGRESS_EVERY: u64 = 1000;

/// One drawn line of an order, before it is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    pub item_id: i32,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl LineItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderStats {
    pub orders: u64,
    pub line_items: u64,
}

/// Draws 1..=5 lines, each an (item, price) pair picked with replacement and
/// a quantity of 1..=3.
pub fn draw_line_items<R: Rng + ?Sized>(
    rng: &mut R,
    menu: &[(i32, Decimal)],
) -> SeedResult<Vec<LineItem>> {
    let count = generators::line_item_count(rng);
    let mut lines = Vec::with_capacity(count);
    for _ in 0..count {
        let &(item_id, unit_price) = menu.choose(rng).ok_or(SeedError::EmptyPool("menu items"))?;
        lines.push(LineItem {
            item_id,
            quantity: generators::line_quantity(rng),
            unit_price,
        });
    }
    Ok(lines)
}

/// Sum of price x quantity over the lines, rounded to cents
pub fn order_total(lines: &[LineItem]) -> Decimal {
    lines
        .iter()
        .map(LineItem::line_total)
        .sum::<Decimal>()
        .round_dp(2)
}

/// Inserts `count` orders for random existing customers and stores. Each order
/// is written with a zero total, followed by its lines, then updated with the
/// lines' sum.
pub async fn seed_orders<R: Rng + ?Sized>(
    db: &DatabaseConnection,
    rng: &mut R,
    count: u32,
    now: NaiveDateTime,
) -> SeedResult<OrderStats> {
    info!("Fetching existing customer ids..");
    let customer_ids: Vec<i32> = customer::Entity::find()
        .select_only()
        .column(customer::Column::CustomerId)
        .order_by_asc(customer::Column::CustomerId)
        .into_tuple()
        .all(db)
        .await?;

    info!("Fetching store ids..");
    let store_ids: Vec<i32> = store::Entity::find()
        .select_only()
        .column(store::Column::StoreId)
        .order_by_asc(store::Column::StoreId)
        .into_tuple()
        .all(db)
        .await?;

    info!("Fetching item ids and prices..");
    let menu: Vec<(i32, Decimal)> = menu_item::Entity::find()
        .select_only()
        .column(menu_item::Column::ItemId)
        .column(menu_item::Column::Price)
        .order_by_asc(menu_item::Column::ItemId)
        .into_tuple()
        .all(db)
        .await?;

    if customer_ids.is_empty() {
        return Err(SeedError::EmptyPool("customers"));
    }
    if store_ids.is_empty() {
        return Err(SeedError::EmptyPool("stores"));
    }
    if menu.is_empty() {
        return Err(SeedError::EmptyPool("menu items"));
    }

    info!("Inserting orders and order items...");
    let txn = db.begin().await?;
    let mut stats = OrderStats::default();

    for _ in 0..count {
        let customer_id = *customer_ids
            .choose(rng)
            .ok_or(SeedError::EmptyPool("customers"))?;
        let store_id = *store_ids.choose(rng).ok_or(SeedError::EmptyPool("stores"))?;

        let placed = order::ActiveModel {
            customer_id: Set(customer_id),
            store_id: Set(store_id),
            order_timestamp: Set(generators::order_timestamp(rng, now)),
            total_amount: Set(Decimal::ZERO),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let lines = draw_line_items(rng, &menu)?;
        for line in &lines {
            order_item::ActiveModel {
                order_id: Set(placed.order_id),
                item_id: Set(line.item_id),
                quantity: Set(line.quantity),
                item_price: Set(line.unit_price),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        let mut placed: order::ActiveModel = placed.into();
        placed.total_amount = Set(order_total(&lines));
        placed.update(&txn).await?;

        stats.orders += 1;
        stats.line_items += lines.len() as u64;
        if stats.orders % PROGRESS_EVERY == 0 {
            debug!(inserted = stats.orders, total = count, "Order insert progress");
        }
    }

    txn.commit().await?;
    info!(
        orders = stats.orders,
        line_items = stats.line_items,
        "Orders and order items inserted successfully"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rust_decimal_macros::dec;

    fn menu() -> Vec<(i32, Decimal)> {
        vec![(1, dec!(8.99)), (2, dec!(11.99)), (3, dec!(1.49))]
    }

    #[test]
    fn line_total_is_price_times_quantity() {
        let line = LineItem {
            item_id: 1,
            quantity: 3,
            unit_price: dec!(8.99),
        };
        assert_eq!(line.line_total(), dec!(26.97));
    }

    #[test]
    fn order_total_sums_lines() {
        let lines = [
            LineItem {
                item_id: 1,
                quantity: 2,
                unit_price: dec!(8.99),
            },
            LineItem {
                item_id: 3,
                quantity: 3,
                unit_price: dec!(1.49),
            },
        ];
        assert_eq!(order_total(&lines), dec!(22.45));
    }

    #[test]
    fn drawn_lines_respect_bounds_and_prices() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let menu = menu();
        for _ in 0..500 {
            let lines = draw_line_items(&mut rng, &menu).unwrap();
            assert!((1..=5).contains(&lines.len()));
            for line in &lines {
                assert!((1..=3).contains(&line.quantity));
                assert!(menu.contains(&(line.item_id, line.unit_price)));
            }
        }
    }

    #[test]
    fn empty_menu_is_an_error() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_matches!(
            draw_line_items(&mut rng, &[]),
            Err(SeedError::EmptyPool("menu items"))
        );
    }
}
