//! Request dispatch module
//!
//! Entry point for HTTP request processing: preflight and size checks, route
//! lookup, parameter binding, action invocation and response encoding.

use crate::config::AppState;
use crate::context::HttpContext;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::error::Error;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn Error + Send + Sync>>,
{
    let started = Instant::now();
    let http_config = &state.config.http;
    debug!(method = %req.method(), uri = %req.uri(), version = ?req.version(), "Request");

    // 1. Preflight
    if req.method() == Method::OPTIONS {
        return Ok(http::build_options_response(http_config.enable_cors));
    }

    // 2. Check body size
    if let Some(resp) = check_body_size(&req, http_config.max_body_size) {
        return Ok(resp);
    }

    // 3. Drain the body once, enforcing the limit on what actually arrives
    let (parts, body) = req.into_parts();
    let limit = usize::try_from(http_config.max_body_size).unwrap_or(usize::MAX);
    let body = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<LengthLimitError>() => {
            error!(max_body_size = http_config.max_body_size, "Request body too large");
            return Ok(http::build_413_response());
        }
        Err(e) => {
            debug!(error = %e, "Failed to read request body, binding without it");
            Bytes::new()
        }
    };
    let mut ctx = HttpContext::from_parts(&parts, body, state.config.server.behind_tls);

    // 4. Look the action up and run it
    let mut response = dispatch(&mut ctx, &state);
    if http_config.enable_cors {
        http::apply_cors(&mut response);
    }

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::from_context(&ctx);
        entry.status = response.status().as_u16();
        entry.body_bytes = ctx.http_response.bytes.len();
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Resolve the route for the context and produce the response
fn dispatch(ctx: &mut HttpContext, state: &AppState) -> Response<Full<Bytes>> {
    let path = ctx.http_url.path.clone();
    let Some(route) = state.registry.get(&ctx.method, &path) else {
        let allowed = state.registry.methods_for(&path);
        if allowed.is_empty() {
            return http::build_404_response();
        }
        warn!(method = %ctx.method, path = %path, "Method not allowed");
        return http::build_405_response(&allowed);
    };

    let values = route.handle(ctx);
    debug!(
        route = %route.route_url,
        returns = values.len(),
        json = ctx.http_response.is_json,
        "Action completed"
    );
    http::build_body_response(&ctx.http_response, &state.config.http.server_name)
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            warn!("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.trim().parse::<u64>() {
            Ok(size) if size > max_body_size => {
                error!(size, max_body_size, "Request body too large");
                Some(http::build_413_response())
            }
            Err(_) => {
                warn!(value = size_str, "Invalid Content-Length value, skipping size check");
                None
            }
            _ => None,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::registry::RouteRegistry;
    use hyper::body::Frame;
    use serde::{Deserialize, Serialize};
    use std::collections::VecDeque;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Streamed body without a known length, like a chunked upload
    struct Chunked(VecDeque<Bytes>);

    impl Body for Chunked {
        type Data = Bytes;
        type Error = Infallible;

        fn poll_frame(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Frame<Bytes>, Infallible>>> {
            Poll::Ready(self.get_mut().0.pop_front().map(|chunk| Ok(Frame::data(chunk))))
        }
    }

    fn chunked(parts: &[&str]) -> Chunked {
        Chunked(parts.iter().map(|p| Bytes::from(p.to_string())).collect())
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    crate::typed_dto!(Point);

    fn state(enable_cors: bool) -> Arc<AppState> {
        let mut config = Config::load_from("does-not-exist/config").unwrap();
        config.logging.access_log = false;
        config.http.enable_cors = enable_cors;
        config.http.max_body_size = 64;

        let mut builder = RouteRegistry::builder();
        builder
            .register("", Method::GET, "/add", |a: i32, b: i32| a + b, &["a", "b"])
            .unwrap()
            .register("", Method::POST, "/flip", |p: Point| Point { x: p.y, y: p.x }, &[])
            .unwrap()
            .register("", Method::POST, "/len", |s: String| s.len(), &["s"])
            .unwrap();
        Arc::new(AppState::new(&config, builder.build()))
    }

    fn request(method: Method, uri: &str, content_type: Option<&str>, body: &str) -> Request<Full<Bytes>> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(ct) = content_type {
            builder = builder.header("Content-Type", ct);
        }
        builder.body(Full::new(Bytes::from(body.to_string()))).unwrap()
    }

    async fn body_string(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_scalar_action() {
        let req = request(Method::GET, "/add?a=2&b=40", None, "");
        let resp = handle_request(req, state(false)).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["Content-Type"], "text/plain; charset=utf-8");
        assert_eq!(body_string(resp).await, "42");
    }

    #[tokio::test]
    async fn test_model_action() {
        let req = request(Method::POST, "/flip", Some("application/json"), r#"{"x":1,"y":2}"#);
        let resp = handle_request(req, state(false)).await.unwrap();
        assert_eq!(resp.headers()["Content-Type"], "application/json; charset=utf-8");
        assert_eq!(body_string(resp).await, r#"{"x":2,"y":1}"#);
    }

    #[tokio::test]
    async fn test_not_found_and_method_not_allowed() {
        let resp = handle_request(request(Method::GET, "/nope", None, ""), state(false))
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);

        let resp = handle_request(request(Method::DELETE, "/add", None, ""), state(false))
            .await
            .unwrap();
        assert_eq!(resp.status(), 405);
        assert_eq!(resp.headers()["Allow"], "GET, OPTIONS");
    }

    #[tokio::test]
    async fn test_body_too_large() {
        let req = Request::post("/flip")
            .header("Content-Length", "1000")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let resp = handle_request(req, state(false)).await.unwrap();
        assert_eq!(resp.status(), 413);
    }

    #[tokio::test]
    async fn test_preflight_and_cors() {
        let resp = handle_request(request(Method::OPTIONS, "/add", None, ""), state(true))
            .await
            .unwrap();
        assert_eq!(resp.status(), 204);
        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");

        let resp = handle_request(request(Method::GET, "/add?a=1&b=1", None, ""), state(true))
            .await
            .unwrap();
        assert_eq!(resp.headers()["Access-Control-Allow-Credentials"], "true");
    }

    #[tokio::test]
    async fn test_streamed_body_over_limit() {
        let big = "x".repeat(100);
        let req = Request::post("/len")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(chunked(&["s=", &big, &big]))
            .unwrap();
        let resp = handle_request(req, state(false)).await.unwrap();
        assert_eq!(resp.status(), 413);
    }

    #[tokio::test]
    async fn test_streamed_body_under_limit() {
        let req = Request::post("/len")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(chunked(&["s=ab", "cd"]))
            .unwrap();
        let resp = handle_request(req, state(false)).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(body_string(resp).await, "4");
    }
}
