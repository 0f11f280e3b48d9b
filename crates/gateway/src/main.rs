//! BrandLens API Gateway
//!
//! The HTTP entry point for brand tracking.
//! Handles:
//! - Brand and query management
//! - Analysis runs against the configured LLM (or synthetic answers)
//! - Dashboard, results and history aggregation
//! - Observability (logging, metrics)

mod handlers;
mod middleware;

use axum::{
    middleware::from_fn,
    routing::{get, post, put},
    Router,
};
use brandlens_common::{
    analysis::{LlmAnswerSource, QueryGenerator, ResponseAnalyzer, SyntheticResponder},
    config::AppConfig,
    db::{DbPool, Repository},
    llm::{create_client, CompletionOptions},
    metrics,
    pipeline::BatchRunner,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub repo: Repository,
    pub runner: Arc<BatchRunner>,
    pub generator: Arc<QueryGenerator>,
}

impl AppState {
    /// Wire the analysis pipeline over a connected pool
    pub fn new(config: Arc<AppConfig>, db: DbPool) -> brandlens_common::Result<Self> {
        let client = create_client(&config.llm)?;
        let repo = Repository::new(db.clone());

        let source = LlmAnswerSource::new(
            client.clone(),
            CompletionOptions::for_answers(&config.llm),
            SyntheticResponder::new(config.analysis.synthetic_seed),
        );
        let analyzer =
            ResponseAnalyzer::new(client.clone(), CompletionOptions::for_analysis(&config.llm));
        let generator = QueryGenerator::new(client, CompletionOptions::for_analysis(&config.llm));

        let runner = BatchRunner::new(
            Arc::new(repo.clone()),
            Arc::new(source),
            Arc::new(analyzer),
        );

        Ok(Self {
            config,
            db,
            repo,
            runner: Arc::new(runner),
            generator: Arc::new(generator),
        })
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.observability.json_logging {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

fn init_metrics(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let port = config.observability.metrics_port;
    if port == 0 {
        info!("Metrics exporter disabled");
        return Ok(());
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, port).parse()?;
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(
            Matcher::Suffix("analysis_duration_seconds".to_string()),
            metrics::ANALYSIS_BUCKETS,
        )?
        .install()?;

    metrics::register_metrics();
    info!(%addr, "Metrics exporter listening");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    init_tracing(&config);
    info!(
        service = %config.observability.service_name,
        "Starting BrandLens API Gateway v{}",
        brandlens_common::VERSION
    );

    init_metrics(&config)?;

    let config = Arc::new(config);

    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;

    let state = AppState::new(config.clone(), db)?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let timeout = middleware::request_timeout(state.config.request_timeout());

    let api_routes = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))

        // Brand endpoints
        .route(
            "/brands",
            get(handlers::brands::list_brands).post(handlers::brands::create_brand),
        )
        .route(
            "/brands/{id}",
            get(handlers::brands::get_brand)
                .put(handlers::brands::update_brand)
                .delete(handlers::brands::delete_brand),
        )

        // Query endpoints
        .route(
            "/brands/{id}/queries",
            get(handlers::queries::list_queries).post(handlers::queries::create_query),
        )
        .route(
            "/queries/{id}",
            put(handlers::queries::update_query).delete(handlers::queries::delete_query),
        )

        // Analysis and dashboards
        .route("/brands/{id}/analyze", post(handlers::analysis::analyze_brand))
        .route("/brands/{id}/dashboard", get(handlers::dashboard::dashboard))
        .route("/brands/{id}/results", get(handlers::dashboard::results))
        .route("/brands/{id}/history", get(handlers::dashboard::history));

    Router::new()
        .nest("/api", api_routes)
        .layer(from_fn(middleware::track_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(timeout)
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
