//! Parameter binding
//!
//! Chooses the parameter source from the detected content type and maps it
//! onto the declared parameter list:
//! - `application/json`: whole body into a single DTO, or field lookup by name
//! - no content type: query parameters
//! - anything else: URL-encoded form fields
//!
//! Binding never fails. Anything missing or unconvertible stays at the
//! parameter's zero value.

use super::types::{Arguments, ParamType};
use crate::context::HttpContext;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

pub const APPLICATION_JSON: &str = "application/json";

/// Key/value source a named parameter is looked up in
trait ParamSource {
    fn lookup(&self, name: &str) -> Option<Value>;
}

impl ParamSource for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name)
            .or_else(|| {
                self.iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value)
            })
            .map(|value| Value::String(value.clone()))
    }
}

impl ParamSource for Map<String, Value> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name)
            .or_else(|| {
                self.iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value)
            })
            .cloned()
    }
}

/// Produce the handler arguments for `param_types`, aligned by position.
///
/// A zero-parameter handler never looks at the body or the query string.
pub fn bind(ctx: &HttpContext, param_types: &[ParamType], param_names: &[String]) -> Arguments {
    if param_types.is_empty() {
        return Arguments::default();
    }

    let content_type = ctx.content_type.as_str();
    if content_type.eq_ignore_ascii_case(APPLICATION_JSON) {
        bind_json(&ctx.http_request.body_bytes, param_types, param_names)
    } else if content_type.is_empty() {
        map_to_params(param_types, param_names, &ctx.http_request.query)
    } else {
        // application/x-www-form-urlencoded, multipart/form-data, ...
        map_to_params(param_types, param_names, &ctx.http_request.form)
    }
}

fn bind_json(body: &[u8], param_types: &[ParamType], param_names: &[String]) -> Arguments {
    if let [single] = param_types {
        if single.shape().is_structured() {
            let (value, ok) = single.from_body(body);
            if !ok {
                debug!(param_type = single.name(), "JSON body left at zero value");
            }
            return Arguments::new(vec![value]);
        }
    }

    let fields = match serde_json::from_slice::<Map<String, Value>>(body) {
        Ok(fields) => fields,
        Err(e) => {
            debug!(error = %e, "JSON body is not an object, binding defaults");
            Map::new()
        }
    };
    map_to_params(param_types, param_names, &fields)
}

/// Look each named parameter up under its lower-cased name and coerce it.
///
/// Positions without a name are never bound.
fn map_to_params(
    param_types: &[ParamType],
    param_names: &[String],
    source: &impl ParamSource,
) -> Arguments {
    let values = param_types
        .iter()
        .enumerate()
        .map(|(i, param)| {
            let Some(name) = param_names.get(i) else {
                return param.zero();
            };
            let name = name.to_lowercase();
            let found = source.lookup(&name);
            let (value, ok) = param.convert(found.as_ref());
            if !ok {
                debug!(
                    param = %name,
                    param_type = param.name(),
                    present = found.is_some(),
                    "Parameter left at zero value"
                );
            }
            value
        })
        .collect();
    Arguments::new(values)
}
