//! Custom middleware implementations.
//!
//! This module contains the CSP header emission middleware and the
//! request ID middleware it cooperates with.

pub mod csp;
pub mod request_id;

pub use csp::*;
pub use request_id::*;
