use std::{
    env::{self},
    fs::OpenOptions,
    net::SocketAddr,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::{Handle, tls_rustls::RustlsConfig};
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use safeledger::{
    AppState, build_router,
    fraud::{RemoteFraudChecker, build_fraud_checker},
    graceful_shutdown, logging_middleware,
};

/// The web server for SafeLedger.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// File path to an SSL certificate `cert.pem` and key `key.pem`.
    #[arg(long)]
    cert_path: String,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The URL of the fraud scoring service.
    #[arg(
        long,
        env = "FRAUD_DETECTION_URL",
        default_value = "http://127.0.0.1:5000/fraud-detection"
    )]
    fraud_endpoint: String,

    /// How long to wait for the fraud scoring service, in milliseconds.
    #[arg(long, default_value_t = RemoteFraudChecker::DEFAULT_TIMEOUT.as_millis() as u64)]
    fraud_timeout_ms: u64,

    /// Skip the fraud scoring service and only use the local rules.
    #[arg(long)]
    local_fraud_rules_only: bool,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let tls_config = RustlsConfig::from_pem_file(
        PathBuf::from(&args.cert_path).join("cert.pem"),
        PathBuf::from(&args.cert_path).join("key.pem"),
    )
    .await
    .expect("Could not open TLS certificates.");

    let secret = env::var("SECRET").expect("The environment variable 'SECRET' must be set");
    let local_timezone = env::var("TIMEZONE").unwrap_or_else(|_| {
        tracing::warn!("The environment variable 'TIMEZONE' is not set, using UTC");
        "Etc/UTC".to_owned()
    });

    let fraud_endpoint = (!args.local_fraud_rules_only).then_some(args.fraud_endpoint.as_str());
    let fraud_checker = build_fraud_checker(
        fraud_endpoint,
        Duration::from_millis(args.fraud_timeout_ms),
    )
    .expect("Could not create the fraud checker");

    let connection = Connection::open(&args.db_path).expect("Could not open the database");
    let app_state = AppState::new(connection, &secret, &local_timezone, fraud_checker)
        .expect("Could not initialize the database");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(
        build_router(app_state).layer(middleware::from_fn(logging_middleware)),
    );

    tracing::info!("HTTPS server listening on {}", addr);
    axum_server::bind_rustls(addr, tls_config)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("The server stopped unexpectedly");
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

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
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
        // Errors are already logged by the handlers.
        .on_failure(());

    router.layer(tracing_layer)
}
