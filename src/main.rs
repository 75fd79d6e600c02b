use anyhow::{bail, Context};
use tracing::{error, info};

use pizzeria_seed as seeder;
use seeder::{db, Catalog, Seeder};

const DEFAULT_LOG_LEVEL: &str = "info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = match seeder::config::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            // No configured level to honour yet; report with the defaults.
            seeder::config::init_tracing(DEFAULT_LOG_LEVEL, false);
            error!("{}", e);
            return Err(e).context("failed to load configuration");
        }
    };
    seeder::config::init_tracing(cfg.log_level(), cfg.log_json);

    let catalog = Catalog::load(cfg.catalog_path.as_deref()).context("failed to load catalog")?;
    let url = cfg
        .connection_url()
        .context("failed to build database connection URL")?;

    let pool = db::establish_connection(&url)
        .await
        .context("failed to connect to database")?;

    let outcome = populate(&pool, &catalog, &cfg).await;

    // The connection is released whether or not seeding succeeded.
    if let Err(e) = db::close_connection(pool).await {
        error!("Failed to close database connection: {}", e);
    }

    outcome
}

async fn populate(
    pool: &db::DbPool,
    catalog: &Catalog,
    cfg: &seeder::config::AppConfig,
) -> anyhow::Result<()> {
    db::check_connection(pool)
        .await
        .context("database is not reachable")?;

    if cfg.auto_migrate {
        db::run_migrations(pool)
            .await
            .context("failed running migrations")?;
    }

    let report = Seeder::new(pool, catalog, cfg.plan(), cfg.rng_seed)
        .run()
        .await
        .inspect_err(|e| {
            if e.is_unique_violation() {
                error!("Unique constraint violated; the target database already holds seeded rows");
            }
        })
        .context("failed to populate database")?;
    info!(?report, "Seeding finished");

    if cfg.verify_after_seed {
        let verification = seeder::verify_seed(pool, catalog)
            .await
            .context("failed to verify seeded data")?;
        if !verification.is_clean() {
            bail!(
                "verification found {} violation(s)",
                verification.violations.len()
            );
        }
    }

    Ok(())
}
