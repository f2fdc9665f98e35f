//! Landing page handler, demonstrating body-embedded nonces.

use crate::nonce::csp_nonce;
use actix_web::{HttpRequest, HttpResponse};
use paperclip::actix::api_v2_operation;

/// Landing page
///
/// Serves an HTML page whose inline script carries the same nonce the
/// emitted `Content-Security-Policy` header advertises for this request.
#[api_v2_operation(
    summary = "Landing Page",
    description = "Returns an HTML page with a nonce-carrying inline script.",
    tags("Pages"),
    responses(
        (status = 200, description = "Successful response")
    )
)]
pub async fn home(req: HttpRequest) -> HttpResponse {
    // The header emitter reuses this exact value; missing generator means
    // no nonce in the header either, so the attribute is simply omitted.
    let nonce_attr = csp_nonce(&req)
        .map(|nonce| format!(" nonce=\"{nonce}\""))
        .unwrap_or_default();

    let body = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Palisade - CSP Demo</title>
    <style{nonce_attr}>
        body {{
            font-family: Arial, sans-serif;
            margin: 0;
            padding: 0;
            background: #f5f5f5;
            color: #333;
        }}
        .container {{
            max-width: 800px;
            margin: 40px auto;
            padding: 20px;
            background: #fff;
            box-shadow: 0 2px 8px rgba(0,0,0,0.1);
            border-radius: 8px;
        }}
        h1 {{
            text-align: center;
        }}
        pre {{
            background: #eee;
            padding: 20px;
            border-radius: 4px;
            overflow-x: auto;
        }}
    </style>
</head>
<body>
    <div class="container">
        <h1>Palisade CSP Demo</h1>
        <p>The inline script below runs because its nonce matches the response header.</p>
        <pre id="version">Loading...</pre>
    </div>
    <script{nonce_attr}>
        fetch('/api/version')
            .then(response => response.json())
            .then(data => {{
                document.getElementById('version').textContent = JSON.stringify(data, null, 2);
            }})
            .catch(error => {{
                document.getElementById('version').textContent = 'Error loading version: ' + error;
            }});
    </script>
</body>
</html>"#
    );

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}
