//! FlightSurety oracle server entry point.
//!
//! Startup order: authorize the app contract against the data contract,
//! register the oracle account pool, then hand the process over to the
//! event dispatcher while axum serves the liveness API.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use flightsurety_server::chain::rpc::EthereumGateway;
use flightsurety_server::chain::FlightSuretyGateway;
use flightsurety_server::config::ServerConfig;
use flightsurety_server::registry::OracleRegistry;
use flightsurety_server::routes;
use flightsurety_server::services::dispatcher::ResponseDispatcher;
use flightsurety_server::services::registration::OracleRegistrar;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;
    info!("Using RPC endpoint {}", config.rpc_url);
    info!("App contract {}", config.app_contract_address);

    let gateway: Arc<dyn FlightSuretyGateway> = Arc::new(EthereumGateway::new(&config)?);
    let registry = Arc::new(OracleRegistry::default());

    tokio::spawn(run_oracle_simulation(
        gateway,
        registry,
        config.clone(),
    ));

    let app = routes::api_routes().layer(build_cors_layer());
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    info!("Server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Authorize, register, then dispatch. Nothing here is fatal to the process:
/// the HTTP surface stays up even when the chain side misbehaves.
async fn run_oracle_simulation(
    gateway: Arc<dyn FlightSuretyGateway>,
    registry: Arc<OracleRegistry>,
    config: ServerConfig,
) {
    let accounts = match gateway.accounts().await {
        Ok(accounts) => accounts,
        Err(err) => {
            error!(error = %err, "could not fetch node accounts, oracle simulation disabled");
            return;
        }
    };

    // One-time administrative call from the first node account.
    match accounts.first() {
        Some(admin) => {
            if let Err(err) = gateway.authorize_caller(*admin).await {
                warn!(error = %err, "authorizeCaller failed, continuing anyway");
            }
        }
        None => warn!("node returned no accounts, skipping caller authorization"),
    }

    let pool = config.oracle_accounts(&accounts);
    if pool.is_empty() {
        warn!(
            available = accounts.len(),
            offset = config.oracle_account_offset,
            "no accounts left for oracle registration"
        );
    }

    let registrar = OracleRegistrar::new(gateway.clone(), registry.clone());
    registrar.register_all(&pool).await;

    let dispatcher = ResponseDispatcher::new(
        gateway,
        registry,
        config.events_from_block,
        Duration::from_secs(config.poll_interval_secs),
    );
    dispatcher.start().await;
}

fn build_cors_layer() -> CorsLayer {
    let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:8000".to_string())
        .split(',')
        .filter_map(|origin| origin.trim().parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}
