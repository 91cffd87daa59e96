//! Response encoding
//!
//! - no return values: empty body
//! - one structured or collection value: JSON document
//! - one scalar value: its plain text rendering, unquoted
//! - several values: JSON of the first one, the rest are not part of the body

use super::convert::to_display_string;
use super::types::{ReturnValue, TypeShape};
use hyper::body::Bytes;

/// Encoded response body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseBody {
    pub bytes: Bytes,
    pub string: String,
    /// Whether the body is a JSON document rather than plain text
    pub is_json: bool,
}

impl ResponseBody {
    fn json(value: &serde_json::Value) -> Self {
        let string = value.to_string();
        Self {
            bytes: Bytes::from(string.clone()),
            string,
            is_json: true,
        }
    }

    fn text(string: String) -> Self {
        Self {
            bytes: Bytes::from(string.clone()),
            string,
            is_json: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

pub fn encode(return_values: &[ReturnValue]) -> ResponseBody {
    match return_values {
        [] => ResponseBody::default(),
        [single] => match single.shape {
            TypeShape::Structured | TypeShape::Collection => ResponseBody::json(&single.value),
            TypeShape::Scalar => ResponseBody::text(to_display_string(&single.value)),
        },
        [first, ..] => ResponseBody::json(&first.value),
    }
}
