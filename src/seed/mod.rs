//! Populates an empty schema in dependency order: stores, customers,
//! ingredients, menu items, orders with their lines, then recipe rows.
//!
//! Each phase commits on its own. A failure stops the run and leaves the
//! phases committed before it in place.

mod customers;
mod ingredients;
mod menu;
mod orders;
mod recipes;
mod stores;

pub use customers::seed_customers;
pub use ingredients::seed_ingredients;
pub use menu::seed_menu_items;
pub use orders::{draw_line_items, order_total, seed_orders, LineItem, OrderStats};
pub use recipes::{group_by_name, resolve_ingredients, seed_recipes};
pub use stores::seed_stores;

use chrono::{NaiveDateTime, Utc};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use sea_orm::DatabaseConnection;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::errors::SeedResult;
use crate::generators::{self, UniqueValues};

/// How many rows the generated tables receive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedPlan {
    pub store_count: u32,
    pub customer_count: u32,
    pub order_count: u32,
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self {
            store_count: 5,
            customer_count: 1000,
            order_count: 5000,
        }
    }
}

/// Rows inserted per table by one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub stores: u64,
    pub customers: u64,
    pub ingredients: u64,
    pub menu_items: u64,
    pub orders: u64,
    pub order_items: u64,
    pub recipe_rows: u64,
}

pub struct Seeder<'a, R: Rng = ChaCha8Rng> {
    db: &'a DatabaseConnection,
    catalog: &'a Catalog,
    plan: SeedPlan,
    rng: R,
    now: NaiveDateTime,
}

impl<'a> Seeder<'a, ChaCha8Rng> {
    /// Seeder driven by a ChaCha RNG. Without `seed` a random one is picked and
    /// logged so the run can be replayed.
    pub fn new(
        db: &'a DatabaseConnection,
        catalog: &'a Catalog,
        plan: SeedPlan,
        seed: Option<u64>,
    ) -> Self {
        let (rng, seed) = generators::seeded_rng(seed);
        info!(seed, "Random generator seeded");
        Self::with_rng(db, catalog, plan, rng)
    }
}

impl<'a, R: Rng> Seeder<'a, R> {
    pub fn with_rng(db: &'a DatabaseConnection, catalog: &'a Catalog, plan: SeedPlan, rng: R) -> Self {
        Self {
            db,
            catalog,
            plan,
            rng,
            now: Utc::now().naive_utc(),
        }
    }

    /// Pins the instant order timestamps are drawn up to
    pub fn at(mut self, now: NaiveDateTime) -> Self {
        self.now = now;
        self
    }

    pub async fn run(&mut self) -> SeedResult<SeedReport> {
        let span = info_span!("seed", run_id = %Uuid::new_v4());
        self.run_phases().instrument(span).await
    }

    async fn run_phases(&mut self) -> SeedResult<SeedReport> {
        info!(
            stores = self.plan.store_count,
            customers = self.plan.customer_count,
            orders = self.plan.order_count,
            "Starting database population"
        );
        let db = self.db;
        let rng = &mut self.rng;
        let mut report = SeedReport::default();

        // Stores and customers draw from one pool of phone numbers.
        let mut phones = UniqueValues::new("phone number");

        report.stores = seed_stores(db, rng, &mut phones, self.plan.store_count).await?;
        report.customers = seed_customers(db, rng, &mut phones, self.plan.customer_count).await?;
        report.ingredients = seed_ingredients(db, rng, &self.catalog.ingredients).await?;
        report.menu_items = seed_menu_items(db, &self.catalog.menu_items).await?;

        let stats = seed_orders(db, rng, self.plan.order_count, self.now).await?;
        report.orders = stats.orders;
        report.order_items = stats.line_items;

        report.recipe_rows = seed_recipes(db, rng, &self.catalog.recipes).await?;

        info!(?report, "Database populated successfully");
        Ok(report)
    }
}
