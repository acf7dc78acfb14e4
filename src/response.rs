//! HTTP response building module
//!
//! Builders for the responses the middleware and the demo server emit.
//! Builders never panic; a header-build failure degrades to an empty
//! response with an error log.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::logger;
use crate::mime;

/// Build the 200 response carrying pipeline output.
pub fn build_resource_response(
    mime_type: &str,
    charset: Option<&str>,
    content: Bytes,
) -> Response<Full<Bytes>> {
    let content_type = mime::content_type_value(mime_type, charset);
    let content_length = content.len();
    Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .body(Full::new(content))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(404)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("404 Not Found")))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(Full::new(Bytes::from("404 Not Found")))
        })
}

fn log_build_error(status: &str, err: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {err}"));
}
