//! kintrack-server: authoritative presence side.
//!
//! Session store, presence service, orphan reaper, and the
//! parent-facing aggregator. The store is the single source of truth;
//! services hold no state of their own, so multiple service instances
//! over one store remain correct.

pub mod aggregator;
pub mod reaper;
pub mod service;
pub mod store;

pub use kintrack_core::types;
