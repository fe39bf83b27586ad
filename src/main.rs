use driphub::api;
use driphub::clock::SystemClock;
use driphub::custody::LedgerCustody;
use driphub::executor::FixedPriceExecutor;
use driphub::{Config, Engine};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;

    // Wire the engine and its collaborators. The standalone binary runs
    // over the in-memory ledger custody and a unit-price executor;
    // production deployments substitute their own implementations.
    let custody = Arc::new(LedgerCustody::new(config.engine_address.clone()));
    let executor = Arc::new(FixedPriceExecutor::new(
        custody.clone(),
        config.swap_proxy.clone(),
        1,
        1,
    ));
    let engine = Engine::new(
        config.engine_params(),
        custody,
        executor,
        Arc::new(SystemClock),
    );

    // Create router
    let app = api::create_router(api::AppState::new(engine));

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
