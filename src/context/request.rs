//! Request snapshot parts
//!
//! Buffered body, URL pieces and the helpers that normalize raw transport
//! data into flat string maps.

use crate::binding::convert::MULTI_VALUE_SEPARATOR;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, CONNECTION, CONTENT_TYPE};
use hyper::Version;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Buffered request body plus the parameter map bound from it
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    pub body_bytes: Bytes,
    pub body_string: String,
    /// Query parameters, populated for GET only
    pub query: HashMap<String, String>,
    /// URL-encoded body fields, populated for every method except GET
    pub form: HashMap<String, String>,
}

/// URL pieces of the request
#[derive(Debug, Clone, Default)]
pub struct HttpUrl {
    pub path: String,
    pub remote_addr: String,
    pub host: String,
    pub proto: String,
    pub request_uri: String,
    /// Raw query string (without leading ?)
    pub query_string: String,
    /// `scheme://host/request_uri`
    pub url: String,
    /// Query parameters, populated for every method
    pub query: HashMap<String, String>,
}

/// Parse `application/x-www-form-urlencoded` data, joining repeated keys
pub fn parse_urlencoded(input: &[u8]) -> HashMap<String, String> {
    let mut params: HashMap<String, String> = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(input) {
        match params.entry(key.into_owned()) {
            Entry::Occupied(mut existing) => {
                let joined = existing.get_mut();
                joined.push(MULTI_VALUE_SEPARATOR);
                joined.push_str(&value);
            }
            Entry::Vacant(slot) => {
                slot.insert(value.into_owned());
            }
        }
    }
    params
}

/// Flatten headers into one string per name, joining repeated headers
pub fn collect_headers(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .keys()
        .map(|name| {
            let joined = headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(&MULTI_VALUE_SEPARATOR.to_string());
            (name.as_str().to_string(), joined)
        })
        .collect()
}

/// Primary media type: the first `;` segment containing `/`, parameters dropped
pub fn detect_content_type(headers: &HeaderMap) -> String {
    headers
        .get(CONTENT_TYPE)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .and_then(|raw| {
            raw.split(';')
                .map(str::trim)
                .find(|segment| segment.contains('/'))
                .map(ToString::to_string)
        })
        .unwrap_or_default()
}

/// Whether the connection should close after this request
pub fn wants_close(version: Version, headers: &HeaderMap) -> bool {
    let has_token = |token: &str| {
        headers.get_all(CONNECTION).iter().any(|v| {
            v.to_str()
                .map(|s| s.split(',').any(|t| t.trim().eq_ignore_ascii_case(token)))
                .unwrap_or(false)
        })
    };
    if version <= Version::HTTP_10 {
        !has_token("keep-alive")
    } else {
        has_token("close")
    }
}

pub fn version_string(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_2 => "HTTP/2.0",
        Version::HTTP_3 => "HTTP/3.0",
        _ => "HTTP/1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;

    #[test]
    fn test_parse_urlencoded_joins_repeats() {
        let params = parse_urlencoded(b"tag=a&tag=b&name=Al+Bo&x=%2F");
        assert_eq!(params["tag"], "a;b");
        assert_eq!(params["name"], "Al Bo");
        assert_eq!(params["x"], "/");
    }

    #[test]
    fn test_parse_urlencoded_json_body_is_harmless() {
        let params = parse_urlencoded(br#"{"a":1,"b":"x"}"#);
        assert!(params.get("a").is_none());
        assert!(params.get("b").is_none());
    }

    #[test]
    fn test_detect_content_type() {
        let mut headers = HeaderMap::new();
        assert_eq!(detect_content_type(&headers), "");

        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        assert_eq!(detect_content_type(&headers), "application/json");

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("charset=utf-8; text/plain"));
        assert_eq!(detect_content_type(&headers), "text/plain");

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("garbage"));
        assert_eq!(detect_content_type(&headers), "");
    }

    #[test]
    fn test_collect_headers_joins_values() {
        let mut headers = HeaderMap::new();
        headers.append("accept", HeaderValue::from_static("text/html"));
        headers.append("accept", HeaderValue::from_static("application/json"));
        headers.insert("x-id", HeaderValue::from_static("7"));

        let collected = collect_headers(&headers);
        assert_eq!(collected["accept"], "text/html;application/json");
        assert_eq!(collected["x-id"], "7");
    }

    #[test]
    fn test_wants_close() {
        let mut headers = HeaderMap::new();
        assert!(!wants_close(Version::HTTP_11, &headers));
        assert!(wants_close(Version::HTTP_10, &headers));

        headers.insert(CONNECTION, HeaderValue::from_static("Close"));
        assert!(wants_close(Version::HTTP_11, &headers));

        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        assert!(!wants_close(Version::HTTP_10, &headers));
    }
}
