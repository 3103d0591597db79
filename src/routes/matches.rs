use actix_web::{web, HttpResponse, Responder};
use crate::core::{MatchResult, Matcher};
use crate::models::{
    ErrorResponse, FindMatchesRequest, FindMatchesResponse, HealthResponse, RankSnapshotRequest,
};
use crate::routes::store_failure;
use crate::services::StoreClient;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StoreClient>,
    pub matcher: Matcher,
    /// Held across the read, check and write of a status decision
    pub decisions: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(store: StoreClient, matcher: Matcher) -> Self {
        Self {
            store: Arc::new(store),
            matcher,
            decisions: Arc::new(Mutex::new(())),
        }
    }
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/config", web::get().to(default_config))
        .route("/matches/find", web::post().to(find_matches))
        .route("/matches/rank", web::post().to(rank_snapshot));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.store.ping().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Default matching rules, for seeding the admin controls
async fn default_config(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.matcher.defaults())
}

/// Find matches endpoint
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "config": {
///     "bloodTypeCompatibility": true,
///     "ageRange": 15,
///     "geographicPreference": true,
///     "urgencyWeight": 8,
///     "timeWeight": 6
///   }
/// }
/// ```
/// `config` may be omitted to use the server defaults.
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate_config() {
        tracing::info!("Rejected matching configuration: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "Validation failed",
            errors.to_string(),
            400,
        ));
    }

    let (donors, requests) =
        match tokio::try_join!(state.store.list_donors(), state.store.list_requests()) {
            Ok(registry) => registry,
            Err(e) => return store_failure("Failed to load registry", &e),
        };

    let result = state
        .matcher
        .find_matches(&donors, &requests, req.config.as_ref());

    tracing::info!(
        "Ranked {} matches from {} pending requests and {} donors",
        result.matches.len(),
        result.pending_requests,
        result.total_donors
    );

    HttpResponse::Ok().json(FindMatchesResponse::from(result))
}

/// Rank a caller-supplied snapshot
///
/// POST /api/v1/matches/rank
///
/// Body carries `donors`, `requests` and an optional `config`. Nothing is
/// read from or written to the store.
async fn rank_snapshot(
    state: web::Data<AppState>,
    req: web::Json<RankSnapshotRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate_config() {
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "Validation failed",
            errors.to_string(),
            400,
        ));
    }

    let result = state
        .matcher
        .find_matches(&req.donors, &req.requests, req.config.as_ref());

    tracing::debug!(
        "Ranked snapshot: {} matches from {} requests",
        result.matches.len(),
        req.requests.len()
    );

    HttpResponse::Ok().json(FindMatchesResponse::from(result))
}

impl From<MatchResult> for FindMatchesResponse {
    fn from(result: MatchResult) -> Self {
        Self {
            matches: result.matches,
            summary: result.summary,
            pending_requests: result.pending_requests,
            total_donors: result.total_donors,
            generated_at: chrono::Utc::now(),
        }
    }
}
