//! Bidirectional HTTP binding engine
//!
//! Plain typed functions are registered as actions. For each request the
//! engine snapshots it into an [`HttpContext`], binds the declared parameters
//! from the query string, form fields or JSON body, invokes the action, and
//! encodes its return values as JSON or plain text.
//!
//! ```no_run
//! use hyper::Method;
//! use webbind::{server, Config, RouteRegistry};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = RouteRegistry::builder();
//! builder.register("/math", Method::GET, "/add", |a: i64, b: i64| a + b, &["a", "b"])?;
//! let config = Config::load()?;
//! server::run(&config, builder.build()).await
//! # }
//! ```

pub mod binding;
pub mod config;
pub mod context;
pub mod handler;
pub mod http;
pub mod logger;
pub mod registry;
pub mod server;

pub use binding::{ResponseBody, TypeShape, Typed};
pub use config::{AppState, Config};
pub use context::HttpContext;
pub use registry::{RegistrationError, RegistryBuilder, RouteRegistry};
