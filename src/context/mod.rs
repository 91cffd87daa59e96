//! Request context module
//!
//! [`HttpContext`] is the per-request snapshot handed to the binding engine.
//! The body is drained exactly once while the context is built; everything
//! downstream reads the buffered copy.

pub mod request;

pub use request::{HttpRequest, HttpUrl};

use crate::binding::{self, Arguments, ParamType, ResponseBody, ReturnValues};
use http_body_util::BodyExt;
use hyper::body::{Body, Bytes};
use hyper::header::{CONTENT_LENGTH, HOST, TRANSFER_ENCODING};
use hyper::http::request::Parts;
use hyper::{Method, Request};
use std::collections::HashMap;
use std::net::SocketAddr;

/// Snapshot of one inbound request plus its response slot
#[derive(Debug, Clone)]
pub struct HttpContext {
    pub http_request: HttpRequest,
    pub http_response: ResponseBody,
    pub http_header: HashMap<String, String>,
    pub http_url: HttpUrl,
    pub method: Method,
    pub content_length: Option<u64>,
    pub close: bool,
    pub transfer_encoding: Vec<String>,
    /// Primary media type of the body, empty when no Content-Type was sent
    pub content_type: String,
}

impl HttpContext {
    /// Build the context, draining the request body.
    ///
    /// A body that fails mid-read is treated as empty. The peer address is
    /// read from a `SocketAddr` request extension when the server put one there.
    pub async fn new<B>(req: Request<B>, is_tls: bool) -> Self
    where
        B: Body,
        B::Error: std::fmt::Display,
    {
        let (parts, body) = req.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                tracing::debug!(error = %e, "Failed to read request body, binding without it");
                Bytes::new()
            }
        };
        Self::from_parts(&parts, body, is_tls)
    }

    /// Build the context from request head and an already buffered body
    pub fn from_parts(parts: &Parts, body: Bytes, is_tls: bool) -> Self {
        let body_string = String::from_utf8_lossy(&body).into_owned();
        let query_string = parts.uri.query().unwrap_or_default().to_string();

        let mut http_request = HttpRequest {
            body_bytes: body,
            body_string,
            ..HttpRequest::default()
        };
        if parts.method == Method::GET {
            http_request.query = request::parse_urlencoded(query_string.as_bytes());
        } else {
            http_request.form = request::parse_urlencoded(&http_request.body_bytes);
        }

        let host = parts
            .headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
            .or_else(|| parts.uri.authority().map(ToString::to_string))
            .unwrap_or_default();
        let request_uri = parts
            .uri
            .path_and_query()
            .map_or_else(|| "/".to_string(), ToString::to_string);
        let scheme = if is_tls { "https" } else { "http" };

        let http_url = HttpUrl {
            path: parts.uri.path().to_string(),
            remote_addr: parts
                .extensions
                .get::<SocketAddr>()
                .map(ToString::to_string)
                .unwrap_or_default(),
            url: format!("{scheme}://{host}{request_uri}"),
            host,
            proto: request::version_string(parts.version).to_string(),
            request_uri,
            query: request::parse_urlencoded(query_string.as_bytes()),
            query_string,
        };

        let transfer_encoding = parts
            .headers
            .get_all(TRANSFER_ENCODING)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        Self {
            http_request,
            http_response: ResponseBody::default(),
            http_header: request::collect_headers(&parts.headers),
            http_url,
            method: parts.method.clone(),
            content_length: parts
                .headers
                .get(CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok()),
            close: request::wants_close(parts.version, &parts.headers),
            transfer_encoding,
            content_type: request::detect_content_type(&parts.headers),
        }
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.http_header
            .get(name)
            .or_else(|| {
                self.http_header
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value)
            })
            .map(String::as_str)
    }

    /// Bind the handler arguments for this request
    pub fn get_request_param(&self, param_types: &[ParamType], param_names: &[String]) -> Arguments {
        binding::bind(self, param_types, param_names)
    }

    /// Encode handler results into the response slot
    pub fn init_response(&mut self, return_values: &ReturnValues) {
        self.http_response = binding::encode(return_values);
    }
}
