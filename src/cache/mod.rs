//! Disk cache for accident data.
//!
//! A single JSON file holds the last fetched records together with the
//! timestamp at which they expire; [`expiry`] computes that timestamp on
//! a semi-monthly schedule.

pub mod expiry;
pub mod store;

pub use expiry::next_refresh_after;
pub use store::{CacheStore, CachedPayload};
