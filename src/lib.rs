//! Palisade - a Content-Security-Policy engine for actix-web
//!
//! Palisade resolves and emits `Content-Security-Policy` headers:
//! - A declarative builder for CSP directives with per-kind token
//!   rendering (quoted keywords, colon-suffixed schemes, verbatim hosts)
//! - Format-scoped policy tables selected by the response's negotiated
//!   content type
//! - Per-handler overrides that replace (never merge with) the global
//!   policy, or disable emission outright
//! - Lazily-computed, per-request-memoized nonces shared between the
//!   header and any inline content that embeds them
//! - A middleware that writes exactly one of the enforcing or report-only
//!   headers, or neither when no policy resolves
//!
//! ## Architecture
//!
//! The codebase is organized into focused modules:
//! - `policy/` - Directive model, builders, override and resolution logic
//! - `nonce` - Per-request nonce generation and memoization
//! - `middleware/` - CSP emission and request ID middleware
//! - `config/` - Configuration structures and environment loading
//! - `handlers/` - Demo HTTP endpoints
//! - `models/` - Request/response models
//! - `services/` - Metrics collection
//! - `utils/` - Response format negotiation
//!
//! ## Quick Start
//!
//! ```no_run
//! use palisade::create_base_app;
//!
//! #[actix_web::main]
//! async fn main() -> std::io::Result<()> {
//!     let app = create_base_app();
//!     // Configure and run the server
//!     Ok(())
//! }
//! ```

// Core modules
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod nonce;
pub mod policy;
pub mod services;
pub mod utils;

// Re-export commonly used types and functions for convenience
pub use config::{CspConfig, MetricsConfig};
pub use handlers::{
    create_base_app, create_openapi_spec, default_csp_config, embed, feed, get_metrics, health,
    home, version,
};
pub use middleware::{CspHeaders, CspHeadersMiddleware, RequestId, RequestIdMiddleware};
pub use nonce::{NonceGenerator, csp_nonce};
pub use policy::{
    CspExempt, CspOverride, CspRequestExt, DirectiveSet, FormatPolicies, FormatScope,
    PolicyBuilder, PolicyError, ResolvedPolicy, Source, resolve_policy,
};
pub use services::AppMetrics;
pub use utils::response_format;
