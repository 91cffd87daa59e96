//! Route registry module
//!
//! Routes are registered once at startup through [`RegistryBuilder`]. The
//! finished [`RouteRegistry`] is an immutable snapshot shared by every
//! connection task without locking.

pub mod handler;
mod route;

pub use handler::{Handler, IntoReturnValues};
pub use route::HttpRoute;

use hyper::Method;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Programmer errors caught while routes are registered
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error(
        "failed to register {method} {route}: {names} parameter names given for a handler with {params} parameters"
    )]
    ParamNameMismatch {
        method: Method,
        route: String,
        names: usize,
        params: usize,
    },
    #[error("failed to register {method} {route}: route already registered")]
    DuplicateRoute { method: Method, route: String },
}

/// Startup-time route collection
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    api_prefix: String,
    routes: HashMap<(Method, String), HttpRoute>,
}

impl RegistryBuilder {
    /// Prefix prepended to every route registered after this call
    pub fn api_prefix(&mut self, prefix: &str) -> &mut Self {
        self.api_prefix = prefix.trim_end_matches('/').to_string();
        self
    }

    /// Register `handler` under `prefix + area + route`.
    ///
    /// `param_names` is either empty (no parameter is bound by name) or names
    /// every handler parameter in order.
    pub fn register<H, Args>(
        &mut self,
        area: &str,
        method: Method,
        route: &str,
        handler: H,
        param_names: &[&str],
    ) -> Result<&mut Self, RegistrationError>
    where
        H: Handler<Args>,
        Args: 'static,
    {
        let route_url = format!("{}{area}{route}", self.api_prefix);
        let params = H::param_types().len();
        if !param_names.is_empty() && param_names.len() != params {
            return Err(RegistrationError::ParamNameMismatch {
                method,
                route: route_url,
                names: param_names.len(),
                params,
            });
        }

        let key = (method.clone(), route_url.clone());
        if self.routes.contains_key(&key) {
            return Err(RegistrationError::DuplicateRoute {
                method,
                route: route_url,
            });
        }

        let names = param_names.iter().map(ToString::to_string).collect();
        let entry = HttpRoute::new(route_url, method, handler, names);
        tracing::debug!(
            method = %entry.method,
            route = %entry.route_url,
            params = entry.param_types.len(),
            "Registered action"
        );
        self.routes.insert(key, entry);
        Ok(self)
    }

    pub fn build(self) -> Arc<RouteRegistry> {
        Arc::new(RouteRegistry {
            routes: self.routes,
        })
    }
}

/// Read-only route table
#[derive(Debug)]
pub struct RouteRegistry {
    routes: HashMap<(Method, String), HttpRoute>,
}

impl RouteRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Exact lookup by method and path
    pub fn get(&self, method: &Method, path: &str) -> Option<&HttpRoute> {
        self.routes.get(&(method.clone(), path.to_string()))
    }

    /// Methods registered for `path`, for `Allow` headers
    pub fn methods_for(&self, path: &str) -> Vec<Method> {
        let mut methods: Vec<Method> = self
            .routes
            .keys()
            .filter(|(_, url)| url == path)
            .map(|(method, _)| method.clone())
            .collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }

    pub fn routes(&self) -> impl Iterator<Item = &HttpRoute> {
        self.routes.values()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
