//! Pure domain logic for the warming & distribution scheduler.
//!
//! This crate has zero internal dependencies and performs no I/O, so it can
//! be used by the repository layer, the dispatch engine, and the API without
//! pulling in the async stack. Everything here is deterministic given its
//! inputs; randomness is always injected by the caller.

pub mod active_hours;
pub mod campaign;
pub mod distribution;
pub mod error;
pub mod progression;
pub mod schedule;
pub mod types;
pub mod warming_level;
