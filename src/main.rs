use hyper::Method;
use serde::{Deserialize, Serialize};
use webbind::{config, logger, server, RegistrationError, RouteRegistry};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct User {
    id: u64,
    name: String,
    email: String,
}

webbind::typed_dto!(User);

fn sample_users() -> Vec<User> {
    vec![
        User {
            id: 1,
            name: "alice".to_string(),
            email: "alice@example.com".to_string(),
        },
        User {
            id: 2,
            name: "bob".to_string(),
            email: "bob@example.com".to_string(),
        },
    ]
}

fn find_user(id: u64) -> Result<User, String> {
    sample_users()
        .into_iter()
        .find(|u| u.id == id)
        .ok_or_else(|| format!("user {id} not found"))
}

fn register_routes(api_prefix: &str) -> Result<std::sync::Arc<RouteRegistry>, RegistrationError> {
    let mut builder = RouteRegistry::builder();
    builder.api_prefix(api_prefix);
    builder
        .register("/demo", Method::GET, "/hello", |name: String| format!("hello, {name}"), &["name"])?
        .register("/demo", Method::GET, "/add", |a: i64, b: i64| a + b, &["a", "b"])?
        .register("/demo", Method::POST, "/add", |a: i64, b: i64| a + b, &["a", "b"])?
        .register("/users", Method::GET, "/list", sample_users, &[])?
        .register("/users", Method::GET, "/find", find_user, &["id"])?
        .register("/users", Method::POST, "/create", |user: User| user, &[])?;
    Ok(builder.build())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = match std::env::args().nth(1) {
        Some(path) => config::Config::load_from(&path)?,
        None => config::Config::load()?,
    };
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        tracing::info!(workers, "Using configured worker threads");
    }
    let runtime = runtime_builder.build()?;

    let registry = register_routes(&cfg.http.api_prefix).inspect_err(|e| {
        tracing::error!(error = %e, "Route registration failed");
    })?;
    runtime.block_on(server::run(&cfg, registry))
}
