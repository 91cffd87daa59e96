//! HTTP response building module
//!
//! Status responses for the dispatcher and the 200 response carrying an
//! encoded [`ResponseBody`].

use crate::binding::ResponseBody;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::HeaderValue;
use hyper::{Method, Response};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const APPLICATION_JSON: &str = "application/json; charset=utf-8";

const CORS_ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const CORS_ALLOW_HEADERS: &str =
    "Origin, Authorization, Access-Control-Allow-Origin, Access-Control-Allow-Headers, Content-Type";
const CORS_EXPOSE_HEADERS: &str =
    "Content-Length, Access-Control-Allow-Origin, Access-Control-Allow-Headers, Content-Type";

/// Build 200 response from an encoded action result
pub fn build_body_response(body: &ResponseBody, server_name: &str) -> Response<Full<Bytes>> {
    let content_type = if body.is_json {
        APPLICATION_JSON
    } else {
        TEXT_PLAIN
    };

    Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", body.bytes.len())
        .header("Server", server_name)
        .body(Full::new(body.bytes.clone()))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(404)
        .header("Content-Type", TEXT_PLAIN)
        .body(Full::new(Bytes::from("404 Not Found")))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(Full::new(Bytes::from("404 Not Found")))
        })
}

/// Build 405 Method Not Allowed response listing the methods the path accepts
pub fn build_405_response(allowed: &[Method]) -> Response<Full<Bytes>> {
    Response::builder()
        .status(405)
        .header("Content-Type", TEXT_PLAIN)
        .header("Allow", allow_header(allowed))
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from("405 Method Not Allowed")))
        })
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> Response<Full<Bytes>> {
    let builder = Response::builder()
        .status(204)
        .header("Allow", CORS_ALLOW_METHODS);

    let mut response = builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(Full::new(Bytes::new()))
    });
    if enable_cors {
        apply_cors(&mut response);
        response
            .headers_mut()
            .insert("Access-Control-Max-Age", HeaderValue::from_static("86400"));
    }
    response
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(413)
        .header("Content-Type", TEXT_PLAIN)
        .body(Full::new(Bytes::from("413 Payload Too Large")))
        .unwrap_or_else(|e| {
            log_build_error("413", &e);
            Response::new(Full::new(Bytes::from("413 Payload Too Large")))
        })
}

/// Add cross-origin headers to an outgoing response
pub fn apply_cors<B>(response: &mut Response<B>) {
    let headers = response.headers_mut();
    headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static(CORS_ALLOW_METHODS),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static(CORS_ALLOW_HEADERS),
    );
    headers.insert(
        "Access-Control-Expose-Headers",
        HeaderValue::from_static(CORS_EXPOSE_HEADERS),
    );
    headers.insert(
        "Access-Control-Allow-Credentials",
        HeaderValue::from_static("true"),
    );
}

fn allow_header(methods: &[Method]) -> String {
    methods
        .iter()
        .map(Method::as_str)
        .chain(std::iter::once("OPTIONS"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    tracing::error!(status, error = %error, "Failed to build response");
}
