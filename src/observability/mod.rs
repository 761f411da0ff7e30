//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! controller transitions, helper I/O, flow milestones
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters)
//! ```
//!
//! # Design Decisions
//! - Private keys and raw wallet payloads are never logged
//! - Metrics go through the `metrics` facade; without an installed recorder
//!   they are no-ops, so library users opt in

pub mod logging;
pub mod metrics;
