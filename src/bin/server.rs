use std::{env, fs::OpenOptions, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, filter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use storefront_rs::{
    AppState, OperationTimeouts, PasswordHash, build_router, graceful_shutdown, logging_middleware,
};

/// The REST API server for storefront_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DB_PATH")]
    db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, env = "SERVER_PORT", default_value_t = 8084)]
    port: u16,

    /// The port to try if `port` cannot be bound.
    #[arg(long, env = "SERVER_PORT_FALLBACK", default_value_t = 8085)]
    fallback_port: u16,

    /// The bcrypt cost used when hashing new passwords.
    #[arg(long, env = "HASH_COST", default_value_t = PasswordHash::DEFAULT_COST)]
    hash_cost: u32,

    /// Seconds before a request that touches a single record times out.
    #[arg(long, default_value_t = 5)]
    short_timeout_secs: u64,

    /// Seconds before a request that aggregates over many records times out.
    #[arg(long, default_value_t = 30)]
    long_timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let secret = env::var("SECRET").expect("The environment variable 'SECRET' must be set");

    let connection = Connection::open(&args.db_path).expect("Could not open the database");
    let state = AppState::new(
        connection,
        &secret,
        args.hash_cost,
        OperationTimeouts {
            short: Duration::from_secs(args.short_timeout_secs),
            long: Duration::from_secs(args.long_timeout_secs),
        },
    )
    .expect("Could not initialize the database");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!("HTTP server listening on {}", addr);

    let served = axum_server::bind(addr)
        .handle(handle.clone())
        .serve(router.clone().into_make_service())
        .await;

    if let Err(error) = served {
        let fallback_addr = SocketAddr::from(([0, 0, 0, 0], args.fallback_port));
        tracing::warn!("Could not serve on {addr}: {error}");
        tracing::info!("HTTP server listening on fallback address {}", fallback_addr);

        axum_server::bind(fallback_addr)
            .handle(handle)
            .serve(router.into_make_service())
            .await
            .expect("Could not serve on the main or the fallback port");
    }
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "storefront_rs=debug,server=debug,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(env_filter),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
