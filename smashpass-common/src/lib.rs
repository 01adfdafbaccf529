//! # Smash or Pass Common Library
//!
//! Core state shared by every Smash or Pass front-end:
//! - Catalog loading (bundled Pokemon JSON)
//! - Verdict store with per-character mappings
//! - CSV import/export
//! - Store change events (EventBus)
//! - Configuration loading

pub mod catalog;
pub mod config;
pub mod csv_codec;
pub mod error;
pub mod events;
pub mod store;
pub mod verdict;

pub use catalog::{Catalog, Entity};
pub use error::{CsvError, Error, Result};
pub use store::{Character, Tally, VerdictStore};
pub use verdict::Verdict;
