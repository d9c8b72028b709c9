//! Resilient HTTP client
//!
//! Wraps `reqwest` with a per-attempt time bound, classification of failures
//! into [`FetchError`](crate::error::FetchError) kinds, and exponential
//! backoff retries for transient network failures. The client holds no
//! per-call state and is safe to share across tasks.

mod request;
mod resilient;
mod retry;

pub use request::RequestDescriptor;
pub use resilient::ResilientClient;
pub use retry::{retry_with_backoff, AttemptOutcome, RetryPolicy};
