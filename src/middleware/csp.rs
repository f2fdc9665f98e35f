//! Content-Security-Policy header emission middleware.

use crate::{
    config::CspConfig,
    nonce::{CspNonce, memoized_nonce},
    policy::{CspExempt, CspOverride, resolve_policy},
    services::AppMetrics,
    utils::response_format,
};
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{HeaderName, HeaderValue},
    web,
};
use std::{
    future::{Ready, ready},
    pin::Pin,
    sync::Arc,
};

/// CSP middleware factory
///
/// Holds the immutable global configuration (policy table, report-only
/// flag, nonce generator and nonce-directives list). The configuration is
/// shared read-only across concurrent requests; everything per-request
/// lives in the request's own extensions.
pub struct CspHeaders {
    config: Arc<CspConfig>,
}

impl CspHeaders {
    /// Create the middleware from a fully-assembled configuration.
    pub fn new(config: CspConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CspHeaders
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = CspHeadersMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CspHeadersMiddleware {
            service,
            config: Arc::clone(&self.config),
        }))
    }
}

/// The actual CSP middleware service
pub struct CspHeadersMiddleware<S> {
    service: S,
    config: Arc<CspConfig>,
}

impl<S, B> Service<ServiceRequest> for CspHeadersMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Hand the generator to the request so body templates can read
        // the nonce through `csp_nonce` before resolution runs.
        if self.config.enabled {
            if let Some(generator) = self.config.nonce_generator() {
                req.extensions_mut().insert(generator.clone());
            }
        }

        let fut = self.service.call(req);
        let config = Arc::clone(&self.config);

        Box::pin(async move {
            let mut res = fut.await?;

            if !config.enabled {
                return Ok(res);
            }

            let request = res.request().clone();
            if request.extensions().get::<CspExempt>().is_some() {
                tracing::debug!(
                    target: "csp",
                    path = %request.path(),
                    "response exempt from policy injection"
                );
                return Ok(res);
            }

            let format = response_format(res.response().headers());
            let overrides = request.extensions().get::<CspOverride>().cloned();

            let resolved = resolve_policy(
                config.policies(),
                config.report_only,
                config.nonce_directives(),
                overrides.as_ref(),
                format.as_deref().unwrap_or(""),
                &mut || memoized_nonce(&request, config.nonce_generator()),
            );

            match resolved {
                Some(policy) => match HeaderValue::from_str(&policy.header_value()) {
                    Ok(value) => {
                        res.headers_mut()
                            .insert(HeaderName::from_static(policy.header_name()), value);

                        tracing::debug!(
                            target: "csp",
                            path = %request.path(),
                            header = policy.header_name(),
                            format = format.as_deref().unwrap_or(""),
                            "content security policy emitted"
                        );

                        if let Some(metrics) = request.app_data::<web::Data<AppMetrics>>() {
                            metrics.record_policy_emitted(policy.report_only());
                            if request.extensions().get::<CspNonce>().is_some() {
                                metrics.record_nonced_response();
                            }
                        }
                    }
                    Err(_) => {
                        tracing::warn!(
                            target: "csp",
                            path = %request.path(),
                            "resolved policy is not a valid header value; skipping emission"
                        );
                    }
                },
                None => {
                    tracing::debug!(
                        target: "csp",
                        path = %request.path(),
                        "no policy resolves for this request"
                    );
                }
            }

            Ok(res)
        })
    }
}
