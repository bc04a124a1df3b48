use axum::{
    extract::{Json, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use game_catalog_engine::{
    default_sources, AggregatedGame, CacheStats, CatalogEngine, EngineConfig, EngineError,
    RateDecision, RateLimiter, SearchRequest,
};

#[derive(Clone)]
struct AppState {
    engine: Arc<CatalogEngine>,
    limiter: Arc<RateLimiter>,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    query: String,
    #[serde(default)]
    sources: Vec<String>,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponseBody {
    success: bool,
    results: Vec<AggregatedGame>,
    count: usize,
    total_results: usize,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    cache: CacheStats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_server=debug,game_catalog_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8090);

    let config = EngineConfig::default();
    let limiter = Arc::new(RateLimiter::new(config.rate_budget, config.rate_window));
    let engine = Arc::new(CatalogEngine::new(default_sources(), config));

    tracing::info!("🚀 Starting Game Catalog Engine Server");
    tracing::info!("📚 Sources: {}", engine.sources().len());
    tracing::info!("🔌 Port: {}", port);

    let state = AppState { engine, limiter };

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/search", post(search_handler))
        .route("/v1/stats", get(stats_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", port);
    tracing::info!("🎮 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: game_catalog_engine::VERSION.to_string(),
    })
}

async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        cache: state.engine.cache_stats(),
    })
}

async fn search_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SearchBody>,
) -> Response {
    let client = client_key(&headers);
    let decision = state.limiter.admit(&client);
    let rate_headers = rate_limit_headers(state.limiter.budget(), &decision);

    if !decision.allowed {
        let retry_after = decision.retry_after_secs();
        tracing::warn!("Rate limited client {} ({}s to reset)", client, retry_after);

        let mut response = (
            StatusCode::TOO_MANY_REQUESTS,
            rate_headers,
            Json(ErrorResponse {
                error: EngineError::RateLimited {
                    retry_after_secs: retry_after,
                }
                .to_string(),
            }),
        )
            .into_response();
        if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
            response
                .headers_mut()
                .insert(HeaderName::from_static("retry-after"), value);
        }
        return response;
    }

    let request = SearchRequest {
        query: body.query.clone(),
        sources: body.sources,
        limit: body.limit,
    };

    match state.engine.search(&request).await {
        Ok(outcome) => {
            tracing::info!(
                "✅ '{}' → {} games ({} before limit)",
                body.query,
                outcome.games.len(),
                outcome.total
            );
            let count = outcome.games.len();
            (
                StatusCode::OK,
                rate_headers,
                Json(SearchResponseBody {
                    success: true,
                    results: outcome.games,
                    count,
                    total_results: outcome.total,
                }),
            )
                .into_response()
        }
        Err(EngineError::InvalidQuery(message)) => (
            StatusCode::BAD_REQUEST,
            rate_headers,
            Json(ErrorResponse { error: message }),
        )
            .into_response(),
        Err(e) => {
            // Detail stays in the logs; callers get a generic failure
            tracing::error!("❌ Search failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                rate_headers,
                Json(ErrorResponse {
                    error: "Internal server error".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// First entry of x-forwarded-for, else the loopback fallback
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "127.0.0.1".to_string())
}

fn rate_limit_headers(budget: u32, decision: &RateDecision) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let pairs = [
        ("x-ratelimit-limit", budget.to_string()),
        ("x-ratelimit-remaining", decision.remaining.to_string()),
        (
            "x-ratelimit-reset",
            decision.reset_at.timestamp_millis().to_string(),
        ),
    ];
    for (name, value) in pairs {
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(HeaderName::from_static(name), value);
        }
    }
    headers
}
