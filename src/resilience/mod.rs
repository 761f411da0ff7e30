//! Resilience helpers.
//!
//! Receipt polling retries transient RPC failures with jittered exponential
//! backoff (backoff.rs) until its overall deadline.

pub mod backoff;
