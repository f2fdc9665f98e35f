//! Response format negotiation helper.

use actix_web::http::header::{self, HeaderMap};

/// Derive the short format name the policy table is keyed by (`html`,
/// `json`, ...) from a response's `Content-Type` header.
///
/// The subtype decides the format, with structured-syntax suffixes
/// honored (`application/ld+json` negotiates as `json`). `None` when the
/// response carries no parseable content type; such responses only ever
/// match an unscoped policy.
pub fn response_format(headers: &HeaderMap) -> Option<String> {
    let content_type = headers.get(header::CONTENT_TYPE)?.to_str().ok()?;
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim();
    let subtype = mime.split('/').nth(1)?;
    let format = subtype.rsplit('+').next().unwrap_or(subtype);
    if format.is_empty() {
        None
    } else {
        Some(format.to_ascii_lowercase())
    }
}
