//! End-to-end tests for CSP resolution and header emission.
//!
//! Each test assembles a small actix app around the `CspHeaders`
//! middleware with a purpose-built configuration, then asserts on the
//! exact headers the HTTP layer would send.

use actix_web::{App, HttpRequest, HttpResponse, test, web};
use palisade::{
    CspConfig, CspHeaders, CspRequestExt, NonceGenerator, Source, create_base_app, csp_nonce,
};

async fn page() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body("<p>page</p>")
}

async fn data() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/json")
        .body("{}")
}

fn csp_header(resp: &actix_web::dev::ServiceResponse) -> Option<String> {
    resp.headers()
        .get("content-security-policy")
        .map(|h| h.to_str().unwrap().to_string())
}

fn report_only_header(resp: &actix_web::dev::ServiceResponse) -> Option<String> {
    resp.headers()
        .get("content-security-policy-report-only")
        .map(|h| h.to_str().unwrap().to_string())
}

/// With no global configuration and no handler override, neither CSP
/// header of either kind is present.
#[actix_web::test]
async fn test_no_configuration_emits_no_header() {
    let app = test::init_service(
        App::new()
            .wrap(CspHeaders::new(CspConfig::new()))
            .route("/page", web::get().to(page)),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/page").to_request()).await;

    assert!(resp.status().is_success());
    assert_eq!(csp_header(&resp), None);
    assert_eq!(report_only_header(&resp), None);
}

/// A registered-but-empty policy block still emits a header, with the
/// empty string as its value; "empty policy" is not "no policy".
#[actix_web::test]
async fn test_empty_policy_block_emits_empty_header() {
    let mut config = CspConfig::new();
    config.configure(|_| {}).unwrap();

    let app = test::init_service(
        App::new()
            .wrap(CspHeaders::new(config))
            .route("/page", web::get().to(page)),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/page").to_request()).await;

    assert_eq!(csp_header(&resp), Some(String::new()));
    assert_eq!(report_only_header(&resp), None);
}

/// Exact serialization of keywords and schemes.
#[actix_web::test]
async fn test_global_policy_serialization() {
    let mut config = CspConfig::new();
    config
        .configure(|p| {
            p.default_src([Source::SelfOrigin, Source::scheme("https")]);
        })
        .unwrap();

    let app = test::init_service(
        App::new()
            .wrap(CspHeaders::new(config))
            .route("/page", web::get().to(page)),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/page").to_request()).await;

    assert_eq!(
        csp_header(&resp),
        Some("default-src 'self' https:".to_string())
    );
}

/// The report-only flag routes the policy to the report-only header; the
/// two headers are mutually exclusive.
#[actix_web::test]
async fn test_report_only_flag_selects_header() {
    let mut config = CspConfig::new();
    config.report_only = true;
    config
        .configure(|p| {
            p.default_src([Source::SelfOrigin]);
        })
        .unwrap();

    let app = test::init_service(
        App::new()
            .wrap(CspHeaders::new(config))
            .route("/page", web::get().to(page)),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/page").to_request()).await;

    assert_eq!(csp_header(&resp), None);
    assert_eq!(
        report_only_header(&resp),
        Some("default-src 'self'".to_string())
    );
}

/// A handler override replaces the global policy wholesale; no trace of
/// the global sources survives.
#[actix_web::test]
async fn test_override_replaces_global_policy() {
    async fn overridden(req: HttpRequest) -> HttpResponse {
        req.override_content_security_policy(|csp| {
            csp.configure_default(|p| {
                p.default_src(["https://example.com"]);
            })
        })
        .unwrap();
        page().await
    }

    let mut config = CspConfig::new();
    config
        .configure(|p| {
            p.default_src([Source::SelfOrigin, Source::scheme("https")]);
        })
        .unwrap();

    let app = test::init_service(
        App::new()
            .wrap(CspHeaders::new(config))
            .route("/page", web::get().to(page))
            .route("/locked", web::get().to(overridden)),
    )
    .await;

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/locked").to_request()).await;
    assert_eq!(
        csp_header(&resp),
        Some("default-src https://example.com".to_string())
    );

    // Other routes still see the global policy.
    let resp = test::call_service(&app, test::TestRequest::get().uri("/page").to_request()).await;
    assert_eq!(
        csp_header(&resp),
        Some("default-src 'self' https:".to_string())
    );
}

/// An explicit "no policy" override disables emission even with a global
/// policy configured.
#[actix_web::test]
async fn test_disabled_override_emits_nothing() {
    async fn opted_out(req: HttpRequest) -> HttpResponse {
        req.disable_content_security_policy();
        page().await
    }

    let mut config = CspConfig::new();
    config
        .configure(|p| {
            p.default_src([Source::SelfOrigin]);
        })
        .unwrap();

    let app = test::init_service(
        App::new()
            .wrap(CspHeaders::new(config))
            .route("/widget", web::get().to(opted_out)),
    )
    .await;

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/widget").to_request()).await;

    assert_eq!(csp_header(&resp), None);
    assert_eq!(report_only_header(&resp), None);
}

/// A report-only override flips the header for one route while the
/// policy itself is inherited from the global table.
#[actix_web::test]
async fn test_report_only_override_per_route() {
    async fn monitored(req: HttpRequest) -> HttpResponse {
        req.content_security_policy_report_only(true);
        page().await
    }

    let mut config = CspConfig::new();
    config
        .configure(|p| {
            p.default_src([Source::SelfOrigin]);
        })
        .unwrap();

    let app = test::init_service(
        App::new()
            .wrap(CspHeaders::new(config))
            .route("/monitored", web::get().to(monitored)),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/monitored").to_request(),
    )
    .await;

    assert_eq!(csp_header(&resp), None);
    assert_eq!(
        report_only_header(&resp),
        Some("default-src 'self'".to_string())
    );
}

/// Nonce injection appends to listed directives only, with the exact
/// `'nonce-…'` rendering.
#[actix_web::test]
async fn test_nonce_appended_to_listed_directives_only() {
    let mut config = CspConfig::new();
    config.set_nonce_generator(NonceGenerator::from_fn(|_| "iyhD0Yc0W+c=".to_string()));
    config.set_nonce_directives(["script-src"]);
    config
        .configure(|p| {
            p.default_src([Source::SelfOrigin, Source::scheme("https")]);
            p.script_src([Source::SelfOrigin, Source::scheme("https")]);
            p.style_src([Source::SelfOrigin, Source::scheme("https")]);
        })
        .unwrap();

    let app = test::init_service(
        App::new()
            .wrap(CspHeaders::new(config))
            .route("/page", web::get().to(page)),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/page").to_request()).await;

    assert_eq!(
        csp_header(&resp),
        Some(
            "default-src 'self' https:; script-src 'self' https: 'nonce-iyhD0Yc0W+c='; \
             style-src 'self' https:"
                .to_string()
        )
    );
}

/// Without a generator, nonce directives degrade gracefully to a policy
/// without nonces.
#[actix_web::test]
async fn test_missing_generator_skips_nonce_injection() {
    let mut config = CspConfig::new();
    config.set_nonce_directives(["script-src"]);
    config
        .configure(|p| {
            p.script_src([Source::SelfOrigin]);
        })
        .unwrap();

    let app = test::init_service(
        App::new()
            .wrap(CspHeaders::new(config))
            .route("/page", web::get().to(page)),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/page").to_request()).await;

    assert_eq!(csp_header(&resp), Some("script-src 'self'".to_string()));
}

/// Format-scoped policies follow the response's negotiated content type:
/// the configured branch emits, formats with no branch and no unscoped
/// fallback emit nothing.
#[actix_web::test]
async fn test_format_scoped_policy_selection() {
    let mut config = CspConfig::new();
    config
        .configure_by_format(|scope| {
            scope.on_format("json", |p| {
                p.default_src([Source::None]);
            });
        })
        .unwrap();

    let app = test::init_service(
        App::new()
            .wrap(CspHeaders::new(config))
            .route("/page", web::get().to(page))
            .route("/data", web::get().to(data)),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/data").to_request()).await;
    assert_eq!(csp_header(&resp), Some("default-src 'none'".to_string()));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/page").to_request()).await;
    assert_eq!(csp_header(&resp), None);
    assert_eq!(report_only_header(&resp), None);
}

/// Emission is independent of how the body was produced: a bare closure
/// handler gets the same header as any other route.
#[actix_web::test]
async fn test_bare_closure_handler_still_receives_header() {
    let mut config = CspConfig::new();
    config
        .configure(|p| {
            p.default_src([Source::SelfOrigin]);
        })
        .unwrap();

    let app = test::init_service(
        App::new().wrap(CspHeaders::new(config)).route(
            "/raw",
            web::get().to(|| async {
                HttpResponse::Ok()
                    .content_type("text/html; charset=utf-8")
                    .body("raw body")
            }),
        ),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/raw").to_request()).await;

    assert_eq!(csp_header(&resp), Some("default-src 'self'".to_string()));
}

/// The nonce a handler embeds in the body is byte-identical to the one
/// the header carries for the same request.
#[actix_web::test]
async fn test_nonce_shared_between_header_and_body() {
    async fn nonce_page(req: HttpRequest) -> HttpResponse {
        let nonce = csp_nonce(&req).expect("generator is configured");
        HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(nonce)
    }

    let mut config = CspConfig::new();
    config.set_nonce_generator(NonceGenerator::random());
    config.set_nonce_directives(["script-src"]);
    config
        .configure(|p| {
            p.script_src([Source::SelfOrigin]);
        })
        .unwrap();

    let app = test::init_service(
        App::new()
            .wrap(CspHeaders::new(config))
            .route("/page", web::get().to(nonce_page)),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/page").to_request()).await;
    let header = csp_header(&resp).unwrap();
    let body = test::read_body(resp).await;
    let body_nonce = std::str::from_utf8(&body).unwrap();

    assert!(!body_nonce.is_empty());
    assert_eq!(header, format!("script-src 'self' 'nonce-{body_nonce}'"));
}

/// Responses the framework marks as exempt are passed through untouched.
#[actix_web::test]
async fn test_exempt_response_is_passed_through() {
    async fn internal(req: HttpRequest) -> HttpResponse {
        req.exempt_from_content_security_policy();
        page().await
    }

    let mut config = CspConfig::new();
    config
        .configure(|p| {
            p.default_src([Source::SelfOrigin]);
        })
        .unwrap();

    let app = test::init_service(
        App::new()
            .wrap(CspHeaders::new(config))
            .route("/internal", web::get().to(internal)),
    )
    .await;

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/internal").to_request()).await;

    assert_eq!(csp_header(&resp), None);
}

/// The demo application wires the whole stack together: the feed route's
/// override replaces the global policy, the embed route opts out, and the
/// feed body is still well-formed JSON.
#[actix_web::test]
async fn test_demo_app_override_routes() {
    let app = test::init_service(create_base_app()).await;

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/api/feed").to_request()).await;
    assert_eq!(
        csp_header(&resp),
        Some("default-src 'none'; frame-ancestors 'none'".to_string())
    );

    let body = test::read_body(resp).await;
    let json: serde_json::Value =
        serde_json::from_slice(&body).expect("feed body should be JSON");
    assert!(json.get("entries").is_some(), "feed should list entries");

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/embed").to_request()).await;
    assert_eq!(csp_header(&resp), None);
    assert_eq!(report_only_header(&resp), None);
}

/// Emissions are visible through the Prometheus endpoint.
#[actix_web::test]
async fn test_demo_app_records_emission_metrics() {
    let app = test::init_service(create_base_app()).await;

    // Generate at least one enforced, nonce-carrying emission.
    let _ = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/metrics").to_request(),
    )
    .await;
    assert!(resp.status().is_success());

    let body = test::read_body(resp).await;
    let text = std::str::from_utf8(&body).unwrap();
    assert!(text.contains("csp_headers_total"));
    assert!(text.contains("mode=\"enforce\""));
    assert!(text.contains("csp_nonced_responses_total"));
}

/// The master switch disables the middleware entirely.
#[actix_web::test]
async fn test_disabled_config_passes_responses_through() {
    let mut config = CspConfig::new();
    config.enabled = false;
    config
        .configure(|p| {
            p.default_src([Source::SelfOrigin]);
        })
        .unwrap();

    let app = test::init_service(
        App::new()
            .wrap(CspHeaders::new(config))
            .route("/page", web::get().to(page)),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/page").to_request()).await;

    assert_eq!(csp_header(&resp), None);
}
