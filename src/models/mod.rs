//! Data models and schemas.
//!
//! Request/response models for the demo API endpoints.

pub mod api;

pub use api::*;
