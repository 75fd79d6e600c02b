use rand::Rng;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};
use tracing::{debug, info};

use crate::entities::customer;
use crate::errors::SeedResult;
use crate::generators::{self, UniqueValues};

const PROGRESS_EVERY: u32 = 250;

/// Inserts `count` customers with fabricated names and run-unique emails and
/// phone numbers.
pub async fn seed_customers<R: Rng + ?Sized>(
    db: &DatabaseConnection,
    rng: &mut R,
    phones: &mut UniqueValues,
    count: u32,
) -> SeedResult<u64> {
    info!("Inserting customers...");
    let mut emails = UniqueValues::new("email");
    let txn = db.begin().await?;

    for n in 1..=count {
        let name = generators::person_name(rng);
        let customer = customer::ActiveModel {
            first_name: Set(name.first),
            last_name: Set(name.last),
            email: Set(emails.next_with(rng, generators::email)?),
            phone_number: Set(phones.next_with(rng, generators::phone_number)?),
            ..Default::default()
        };
        customer.insert(&txn).await?;

        if n % PROGRESS_EVERY == 0 {
            debug!(inserted = n, total = count, "Customer insert progress");
        }
    }

    txn.commit().await?;
    info!(count, "Customers inserted successfully");
    Ok(u64::from(count))
}
