//! Cache module for storing API responses to disk
//!
//! Responses are persisted as one JSON file per cache key, stamped with the
//! time they were written. Entries older than the configured TTL are treated
//! as absent and deleted on the read that discovers them. Storage faults never
//! escape this module: a broken cache behaves like an empty one.

mod clock;
mod key;
mod manager;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::{cache_key, Params};
pub use manager::CacheManager;
