//! Demo endpoints exercising per-handler policy overrides.

use crate::{
    models::FeedResponse,
    policy::{CspRequestExt, Source},
};
use actix_web::{Error, HttpRequest, HttpResponse, Result, web};
use paperclip::actix::api_v2_operation;

/// Feed endpoint with a hardened per-route policy
///
/// Replaces the global policy wholesale for this route: API payloads load
/// no subresources, so everything is locked down.
#[api_v2_operation(
    summary = "Feed Endpoint",
    description = "Returns demo feed entries under a locked-down per-route policy.",
    tags("Demo"),
    responses(
        (status = 200, description = "Successful response", body = FeedResponse)
    )
)]
pub async fn feed(req: HttpRequest) -> Result<web::Json<FeedResponse>, Error> {
    req.override_content_security_policy(|csp| {
        csp.configure_default(|p| {
            p.default_src([Source::None]);
            p.frame_ancestors([Source::None]);
        })
    })
    .map_err(actix_web::error::ErrorInternalServerError)?;

    Ok(web::Json(FeedResponse {
        entries: vec![
            "first entry".to_string(),
            "second entry".to_string(),
        ],
    }))
}

/// Embeddable widget endpoint with CSP disabled
///
/// Opts out of policy emission entirely; the embedding page is expected
/// to bring its own policy.
#[api_v2_operation(
    summary = "Embed Endpoint",
    description = "Returns an embeddable HTML fragment with no CSP header.",
    tags("Demo"),
    responses(
        (status = 200, description = "Successful response")
    )
)]
pub async fn embed(req: HttpRequest) -> HttpResponse {
    req.disable_content_security_policy();

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body("<div class=\"widget\">embeddable widget</div>")
}
