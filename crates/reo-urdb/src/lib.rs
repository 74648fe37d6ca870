//! Utility rate structures: validation and lookup.
//!
//! `RateStructureValidator` checks a flat URDB-style rate document (tiered
//! rate arrays, time-of-use schedules and the dependencies between them).
//! `RateLookup` resolves a rate label or a utility/rate-name pair to such a
//! document, either from the OpenEI service (`UrdbClient`) or from memory
//! (`StaticRateLookup`).

mod client;
mod error;
mod lookup;
mod rate;

pub use client::UrdbClient;
pub use error::{RateLookupError, RateStructureError};
pub use lookup::{RateLookup, RateQuery, StaticRateLookup};
pub use rate::{DEFAULT_RATE_LABEL, RateReport, RateStructureValidator};
