//! Responses the gateway produces itself.

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};

const NOT_FOUND_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>404 - Page not found</title></head>
<body>
<main>
<h1>404</h1>
<p>Sorry, we couldn't find the page you're looking for.</p>
<a href="/">Go back home</a>
</main>
</body>
</html>
"#;

/// Built-in 404 page, used when the public upstream cannot serve its own.
pub fn not_found_page() -> Response {
    (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response()
}

pub fn bad_gateway() -> Response {
    (
        StatusCode::BAD_GATEWAY,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Upstream request failed",
    )
        .into_response()
}

pub fn payload_too_large() -> Response {
    (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response()
}
