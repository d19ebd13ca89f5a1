use axum::body::to_bytes;
use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Local;

use crate::shared::format::format_size;

/// Console line per HTTP request:
/// local time | duration | response size | status | method | path
///
/// Time is cyan for 2xx and yellow for everything else.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();

    // Buffer the body to learn its real size
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(
                "Failed to buffer response body of {} {}: {}",
                method,
                uri.path(),
                e
            );
            println!(
                "\x1b[33m{}\x1b[0m | {:>5}ms | {:>12} | {} {:>6} {}",
                Local::now().format("%H:%M:%S"),
                start.elapsed().as_millis(),
                "error",
                parts.status.as_u16(),
                method,
                uri.path()
            );
            return Response::from_parts(parts, Body::default());
        }
    };

    let color_code = if parts.status.is_success() {
        "36"
    } else {
        "33"
    };

    println!(
        "\x1b[{}m{}\x1b[0m | {:>5}ms | {:>12} | {} {:>6} {}",
        color_code,
        Local::now().format("%H:%M:%S"),
        start.elapsed().as_millis(),
        format_size(bytes.len()),
        parts.status.as_u16(),
        method,
        uri.path()
    );

    Response::from_parts(parts, Body::from(bytes))
}
