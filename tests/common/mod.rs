use chrono::{NaiveDate, NaiveDateTime};
use pizzeria_seed::{catalog::Catalog, db, SeedPlan, Seeder};
use sea_orm::DatabaseConnection;

/// Fixed "now" so order timestamps are reproducible
pub fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 16)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

/// Small volumes that keep a full run fast on SQLite
pub fn small_plan() -> SeedPlan {
    SeedPlan {
        store_count: 3,
        customer_count: 40,
        order_count: 120,
    }
}

/// Fresh in-memory SQLite database with the pizzeria schema applied.
pub async fn migrated_db() -> DatabaseConnection {
    let pool = db::establish_connection("sqlite::memory:")
        .await
        .expect("connect to in-memory sqlite");
    db::run_migrations(&pool).await.expect("run migrations");
    pool
}

pub fn seeder<'a>(pool: &'a DatabaseConnection, catalog: &'a Catalog, seed: u64) -> Seeder<'a> {
    Seeder::new(pool, catalog, small_plan(), Some(seed)).at(fixed_now())
}
