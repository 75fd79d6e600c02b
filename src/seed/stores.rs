use rand::Rng;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};
use tracing::info;

use crate::entities::store;
use crate::errors::SeedResult;
use crate::generators::{self, UniqueValues};

/// Inserts `count` stores with fabricated addresses. Phone numbers come from
/// `phones`, which the customer phase draws from as well.
pub async fn seed_stores<R: Rng + ?Sized>(
    db: &DatabaseConnection,
    rng: &mut R,
    phones: &mut UniqueValues,
    count: u32,
) -> SeedResult<u64> {
    info!("Inserting stores...");
    let txn = db.begin().await?;

    for _ in 0..count {
        let store = store::ActiveModel {
            address: Set(generators::street_address(rng)),
            city: Set(generators::city(rng)),
            phone_number: Set(phones.next_with(rng, generators::phone_number)?),
            ..Default::default()
        };
        store.insert(&txn).await?;
    }

    txn.commit().await?;
    info!(count, "Stores inserted successfully");
    Ok(u64::from(count))
}
