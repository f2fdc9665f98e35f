//! OpenAPI specification generation and app factory.

use crate::{
    config::{CspConfig, MetricsConfig},
    handlers::{embed, feed, get_metrics, health, home, version},
    middleware::{CspHeaders, RequestIdMiddleware},
    nonce::NonceGenerator,
    policy::{PolicyError, Source},
    services::AppMetrics,
};
use actix_web::App;
use paperclip::actix::{OpenApiExt, web};
use paperclip::v2::models::{DefaultApiRaw, Info};

/// Creates the shared OpenAPI specification for the API
///
/// This documents the demo endpoints and the per-request nonce contract.
pub fn create_openapi_spec() -> DefaultApiRaw {
    DefaultApiRaw {
        info: Info {
            title: "Palisade".into(),
            version: "1.0.0".into(),
            description: Some(
                "A Content-Security-Policy engine for actix-web, with a demo API.\n\n\
                ## Policy resolution\n\
                Every response passes through the CSP middleware, which resolves the\n\
                policy to emit from three layers: the global policy table, any\n\
                format-scoped branch matching the response's negotiated format, and\n\
                any per-handler override registered for the request. Overrides\n\
                replace the global policy wholesale; they are never merged.\n\
                \n\
                **Headers:**\n\
                - `Content-Security-Policy`: the enforced policy\n\
                - `Content-Security-Policy-Report-Only`: emitted instead when\n\
                  report-only mode applies; never set together with the enforcing header\n\
                \n\
                **Nonces:**\n\
                Directives named in the nonce-directives list receive a per-request\n\
                `'nonce-…'` source when a generator is configured. The same value is\n\
                available to response bodies, so inline `<script nonce=…>` blocks\n\
                match the header.\n\
                \n\
                **Configuration:**\n\
                - Set `CSP_ENABLED=false` to pass responses through untouched\n\
                - Set `CSP_REPORT_ONLY=true` to emit the report-only variant\n\
                - Set `CSP_NONCE_DIRECTIVES` to a comma-separated directive list\n\
                  (default: `script-src,style-src`)"
                    .into(),
            ),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// The demo deployment's global policy: a conservative allow-self baseline
/// with a random per-request nonce generator.
pub fn default_csp_config() -> Result<CspConfig, PolicyError> {
    let mut config = CspConfig::from_env();
    config.set_nonce_generator(NonceGenerator::random());
    config.configure(|p| {
        p.default_src([Source::SelfOrigin]);
        p.script_src([Source::SelfOrigin]);
        p.style_src([Source::SelfOrigin, Source::UnsafeInline]);
        p.img_src([
            Source::SelfOrigin,
            Source::scheme("data"),
            Source::scheme("https"),
        ]);
        p.font_src([Source::SelfOrigin]);
        p.connect_src([Source::SelfOrigin]);
        p.object_src([Source::None]);
        p.base_uri([Source::SelfOrigin]);
        p.frame_ancestors([Source::None]);
    })?;
    Ok(config)
}

/// Creates a basic app with shared configuration
///
/// This factory function creates a pre-configured Actix Web application with:
/// - CSP header emission for every response
/// - Request ID propagation
/// - Health, version and metrics endpoints
/// - Demo routes exercising per-route overrides and nonce embedding
/// - OpenAPI specification
///
/// This can be used both for testing and as a base for the main application.
pub fn create_base_app() -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let metrics_config = MetricsConfig::from_env();
    let metrics_endpoint = metrics_config.endpoint.clone();
    let metrics = AppMetrics::new().expect("Failed to create metrics");
    let csp_config =
        default_csp_config().expect("Invalid content security policy configuration");

    App::new()
        .wrap(CspHeaders::new(csp_config))
        .wrap(RequestIdMiddleware)
        .wrap_api_with_spec(create_openapi_spec())
        .app_data(web::Data::new(metrics_config))
        .app_data(web::Data::new(metrics))
        .service(web::resource("/").route(web::get().to(home)))
        .service(web::resource("/embed").route(web::get().to(embed)))
        .service(web::resource("/api/health").route(web::get().to(health)))
        .service(web::resource("/api/version").route(web::get().to(version)))
        .service(web::resource("/api/feed").route(web::get().to(feed)))
        .service(web::resource(metrics_endpoint.as_str()).route(web::get().to(get_metrics)))
        .with_json_spec_at("/api/spec/v2")
        .build()
}
