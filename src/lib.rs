//! Pizzeria database seeder
//!
//! Fills an empty pizzeria schema (stores, customers, ingredients, menu,
//! orders and recipes) with a realistic synthetic data set.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod catalog;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod generators;
pub mod seed;
pub mod verify;

pub use catalog::Catalog;
pub use errors::{SeedError, SeedResult};
pub use seed::{SeedPlan, SeedReport, Seeder};
pub use verify::{verify_seed, VerificationReport};
