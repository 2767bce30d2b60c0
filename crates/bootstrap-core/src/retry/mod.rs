//! Pass-level retry policy.
//!
//! Bounds the number of verify-and-repair passes and, optionally, spaces
//! them out with a capped exponential backoff.

mod policy;

pub use policy::{RetryDecision, RetryPolicy};
