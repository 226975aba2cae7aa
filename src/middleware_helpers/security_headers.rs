use axum::{
    extract::Request,
    http::{header, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

/// API responses may embed nothing at all.
const API_CSP: &str = "default-src 'none'; frame-ancestors 'none'; form-action 'none'; base-uri 'none'";

/// Rendered HTML reports carry one inline stylesheet and nothing else.
const HTML_REPORT_CSP: &str =
    "default-src 'none'; style-src 'unsafe-inline'; frame-ancestors 'none'; form-action 'none'; base-uri 'none'";

/// Adds hardening headers to every response.
///
/// HTML report pages get a policy that admits their inline stylesheet. The
/// Swagger UI is left without one.
pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    // Swagger UI ships its own scripts
    let is_docs = req.uri().path().starts_with("/swagger-ui");
    let mut res = next.run(req).await;

    let is_html = res
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("text/html"))
        .unwrap_or(false);

    let headers = res.headers_mut();

    headers.insert(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );
    headers.insert(
        HeaderName::from_static("referrer-policy"),
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    if !is_docs {
        headers.insert(
            HeaderName::from_static("content-security-policy"),
            HeaderValue::from_static(if is_html { HTML_REPORT_CSP } else { API_CSP }),
        );
    }
    headers.insert(
        HeaderName::from_static("server"),
        HeaderValue::from_static("k9ops-api"),
    );

    // Report data is sensitive
    if !headers.contains_key(header::CACHE_CONTROL) {
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, private"),
        );
    }

    res
}
