use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

/// Prefix under which uploaded files are served.
pub const FILES_PREFIX: &str = "/files/";

const COMMON_HEADERS: [(HeaderName, &str); 4] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::REFERRER_POLICY, "strict-origin-when-cross-origin"),
    (
        header::STRICT_TRANSPORT_SECURITY,
        "max-age=31536000; includeSubDomains",
    ),
];

// Uploads are user content: never let one run script in our origin.
const UPLOAD_CSP: &str = "default-src 'none'; img-src 'self'; sandbox";
const UPLOAD_CACHE: &str = "public, max-age=31536000, immutable";

pub async fn security_headers(request: Request<Body>, next: Next) -> Response {
    let is_upload = request.uri().path().starts_with(FILES_PREFIX);
    let mut response = next.run(request).await;
    let found = response.status().is_success();
    let headers = response.headers_mut();

    for (name, value) in COMMON_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }

    if is_upload {
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(UPLOAD_CSP),
        );
        // keys are random per upload, so a stored file never changes
        if found {
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(UPLOAD_CACHE));
        }
    }

    response
}
