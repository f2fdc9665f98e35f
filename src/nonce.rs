//! Per-request nonce generation and memoization.

use actix_web::{HttpMessage, HttpRequest};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::middleware::RequestId;

type HmacSha256 = Hmac<Sha256>;

/// Memoization slot for the request's nonce, stored in its extensions.
/// One slot per in-flight request; never shared or pooled across requests.
#[derive(Debug, Clone)]
pub(crate) struct CspNonce(pub(crate) String);

/// A pluggable per-request nonce source.
///
/// The callable runs synchronously on the request's own task and may read
/// request-scoped identifiers; the engine treats it as a black box. Its
/// output is computed lazily (only when a resolved policy actually wants a
/// nonce) and memoized for the rest of the request, so the header and any
/// body-embedded `nonce` attribute always agree.
#[derive(Clone)]
pub struct NonceGenerator {
    inner: Arc<dyn Fn(&HttpRequest) -> String + Send + Sync>,
}

impl NonceGenerator {
    /// Wrap an arbitrary callable.
    pub fn from_fn(f: impl Fn(&HttpRequest) -> String + Send + Sync + 'static) -> Self {
        Self { inner: Arc::new(f) }
    }

    /// A fresh random value per request.
    pub fn random() -> Self {
        Self::from_fn(|_| Uuid::new_v4().simple().to_string())
    }

    /// A value derived from the request id under a process-wide secret:
    /// HMAC-SHA256 of the id, hex-encoded. Reissuing the same request id
    /// reproduces the same nonce, which gives session-token-like
    /// stability without storing anything server-side.
    pub fn derived(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        Self::from_fn(move |req| {
            let id = request_identity(req);
            let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
                .expect("HMAC accepts keys of any length");
            mac.update(id.as_bytes());
            hex::encode(mac.finalize().into_bytes())
        })
    }

    pub(crate) fn call(&self, req: &HttpRequest) -> String {
        (self.inner)(req)
    }
}

impl fmt::Debug for NonceGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NonceGenerator(..)")
    }
}

/// The identity a derived nonce is computed from: the request id placed in
/// extensions by the request-id middleware, else the bare header, else a
/// one-off random id.
fn request_identity(req: &HttpRequest) -> String {
    if let Some(id) = req.extensions().get::<RequestId>() {
        return id.0.clone();
    }
    req.headers()
        .get("X-Request-ID")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// The request's nonce, for embedding in response bodies.
///
/// Returns the same value the emitted header carries for this request,
/// computing and memoizing it on first read. `None` when no generator is
/// configured (the CSP middleware is absent or has no generator), in
/// which case no nonce will appear in the header either.
pub fn csp_nonce(req: &HttpRequest) -> Option<String> {
    let generator = req.extensions().get::<NonceGenerator>().cloned();
    memoized_nonce(req, generator.as_ref())
}

/// Memoizing nonce read shared by [`csp_nonce`] and header resolution.
pub(crate) fn memoized_nonce(
    req: &HttpRequest,
    generator: Option<&NonceGenerator>,
) -> Option<String> {
    if let Some(existing) = req.extensions().get::<CspNonce>() {
        return Some(existing.0.clone());
    }
    let generator = generator?;
    let value = generator.call(req);
    req.extensions_mut().insert(CspNonce(value.clone()));
    tracing::debug!(target: "csp", "generated per-request nonce");
    Some(value)
}
