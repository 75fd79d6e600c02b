//! Random field values for the generated tables.
//!
//! All helpers draw from a caller-supplied RNG so that a fixed seed
//! reproduces a run exactly.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use fake::faker::address::en::{BuildingNumber, CityName, StreetName};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::{Dummy, Fake};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::ops::RangeInclusive;

use crate::errors::{SeedError, SeedResult};

/// Attempts per value before a unique generator gives up
pub const MAX_UNIQUE_ATTEMPTS: usize = 1000;

pub const LINE_ITEMS_PER_ORDER: RangeInclusive<usize> = 1..=5;
pub const LINE_QUANTITY: RangeInclusive<i32> = 1..=3;

/// Stock on hand, in hundredths of a unit (10.00 ..= 500.00)
pub const STOCK_QUANTITY_CENTS: RangeInclusive<i64> = 1_000..=50_000;
/// Recipe quantity, in hundredths of a unit (0.50 ..= 3.00)
pub const QUANTITY_NEEDED_CENTS: RangeInclusive<i64> = 50..=300;

#[derive(Debug, Clone, Dummy)]
pub struct PersonName {
    #[dummy(faker = "FirstName()")]
    pub first: String,
    #[dummy(faker = "LastName()")]
    pub last: String,
}

/// Hands out values never seen before in this run, like a faker's `unique`
/// proxy. Uniqueness is tracked in memory only; the database is not consulted.
#[derive(Debug)]
pub struct UniqueValues {
    kind: &'static str,
    seen: HashSet<String>,
}

impl UniqueValues {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            seen: HashSet::new(),
        }
    }

    pub fn next_with<R, F>(&mut self, rng: &mut R, mut generate: F) -> SeedResult<String>
    where
        R: Rng + ?Sized,
        F: FnMut(&mut R) -> String,
    {
        for _ in 0..MAX_UNIQUE_ATTEMPTS {
            let candidate = generate(rng);
            if !self.seen.contains(&candidate) {
                self.seen.insert(candidate.clone());
                return Ok(candidate);
            }
        }
        Err(SeedError::UniqueExhausted {
            kind: self.kind,
            attempts: MAX_UNIQUE_ATTEMPTS,
        })
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// RNG for a run. Without a seed one is drawn from the OS and returned so it
/// can be logged and the run replayed.
pub fn seeded_rng(seed: Option<u64>) -> (ChaCha8Rng, u64) {
    let seed = seed.unwrap_or_else(|| rand::thread_rng().next_u64());
    (ChaCha8Rng::seed_from_u64(seed), seed)
}

/// `###-###-####`
pub fn phone_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "{:03}-{:03}-{:04}",
        rng.gen_range(0..1_000),
        rng.gen_range(0..1_000),
        rng.gen_range(0..10_000)
    )
}

pub fn street_address<R: Rng + ?Sized>(rng: &mut R) -> String {
    let number: String = BuildingNumber().fake_with_rng(rng);
    let street: String = StreetName().fake_with_rng(rng);
    format!("{} {}", number, street)
}

pub fn city<R: Rng + ?Sized>(rng: &mut R) -> String {
    CityName().fake_with_rng(rng)
}

pub fn person_name<R: Rng + ?Sized>(rng: &mut R) -> PersonName {
    fake::Faker.fake_with_rng(rng)
}

pub fn email<R: Rng + ?Sized>(rng: &mut R) -> String {
    SafeEmail().fake_with_rng(rng)
}

pub fn stock_quantity<R: Rng + ?Sized>(rng: &mut R) -> Decimal {
    Decimal::new(rng.gen_range(STOCK_QUANTITY_CENTS), 2)
}

pub fn quantity_needed<R: Rng + ?Sized>(rng: &mut R) -> Decimal {
    Decimal::new(rng.gen_range(QUANTITY_NEEDED_CENTS), 2)
}

pub fn line_item_count<R: Rng + ?Sized>(rng: &mut R) -> usize {
    rng.gen_range(LINE_ITEMS_PER_ORDER)
}

pub fn line_quantity<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    rng.gen_range(LINE_QUANTITY)
}

/// Uniform whole-second timestamp between January 1st of `now`'s year and `now`.
pub fn order_timestamp<R: Rng + ?Sized>(rng: &mut R, now: NaiveDateTime) -> NaiveDateTime {
    let start = start_of_year(now);
    let span = (now - start).num_seconds();
    if span <= 0 {
        return start;
    }
    start + Duration::seconds(rng.gen_range(0..=span))
}

pub fn start_of_year(now: NaiveDateTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(now.year(), 1, 1)
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .unwrap_or(now)
}
