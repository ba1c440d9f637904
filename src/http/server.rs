//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, timeout, body limit, metrics)
//! - Serve on a listener until the shutdown signal

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::blockchain::client::ChainClient;
use crate::blockchain::contract::DepositContract;
use crate::blockchain::types::ChainDescriptor;
use crate::config::ServerConfig;
use crate::http::handlers;
use crate::lifecycle::shutdown_signal;
use crate::observability::metrics;
use crate::registrations::store::RegistrationStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RegistrationStore>,
    pub chain: ChainDescriptor,
    /// Contract views; `None` when no chain client is configured.
    pub contract: Option<Arc<dyn DepositContract>>,
    pub client: Option<Arc<ChainClient>>,
}

impl AppState {
    pub fn new(store: Arc<dyn RegistrationStore>, chain: ChainDescriptor) -> Self {
        Self {
            store,
            chain,
            contract: None,
            client: None,
        }
    }

    /// Serve chain endpoints from `client`, which also backs `/health`.
    pub fn with_chain_client(mut self, client: Arc<ChainClient>) -> Self {
        self.contract = Some(client.clone() as Arc<dyn DepositContract>);
        self.client = Some(client);
        self
    }

    pub fn with_contract(mut self, contract: Arc<dyn DepositContract>) -> Self {
        self.contract = Some(contract);
        self
    }
}

/// HTTP server for the registration API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &ServerConfig, state: AppState) -> Self {
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        let registrations = get(handlers::list_registrations)
            .post(handlers::upsert_registration)
            .delete(handlers::delete_registration);

        Router::new()
            .route("/registrations", registrations.clone())
            // Path used by the web front end
            .route("/api/storage", registrations)
            .route("/registrations/{wallet_address}", get(handlers::get_registration))
            .route("/contract", get(handlers::get_contract))
            .route("/deposits/{wallet_address}", get(handlers::get_deposit_status))
            .route("/redemption/{wallet_address}", get(handlers::get_redemption))
            .route("/health", get(handlers::health))
            .with_state(state)
            .layer(middleware::from_fn(track_requests))
            .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until SIGINT/SIGTERM.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_until(listener, shutdown_signal()).await
    }

    /// Serve until `signal` resolves, then drain in-flight requests.
    pub async fn run_until<F>(self, listener: TcpListener, signal: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(signal)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn track_requests(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let response = next.run(request).await;
    metrics::record_http_request(&method, response.status().as_u16());
    response
}
