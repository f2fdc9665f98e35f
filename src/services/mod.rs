//! Service layer modules.
//!
//! Currently just the Prometheus metrics collector the CSP middleware and
//! metrics endpoint share.

pub mod metrics;

pub use metrics::*;
