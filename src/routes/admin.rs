use actix_web::{web, HttpResponse, Responder};
use crate::core::RegistryStats;
use crate::models::{ErrorResponse, StatusUpdateResponse, UpdateStatusRequest};
use crate::routes::{store_failure, AppState};

/// Configure administrative routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/requests/{request_id}/status", web::post().to(update_request_status))
        .route("/donors/{donor_id}", web::delete().to(delete_donor))
        .route("/stats", web::get().to(registry_stats));
}

/// Approve or reject a pending request
///
/// POST /api/v1/requests/{request_id}/status
///
/// Request body:
/// ```json
/// { "status": "Approved" }
/// ```
///
/// Re-sending the status a request already has succeeds with
/// `changed: false`. Changing a decided request returns 409.
///
/// Decisions are serialized within one process, so a second decision sees
/// the first one's write. The store has no conditional update; decisions
/// sent concurrently to separate instances are last-writer-wins.
async fn update_request_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<UpdateStatusRequest>,
) -> impl Responder {
    let request_id = path.into_inner();
    let _decision = state.decisions.lock().await;

    let current = match state.store.get_request(&request_id).await {
        Ok(request) => request,
        Err(e) => return store_failure("Failed to load organ request", &e),
    };

    let next = match current.status.transition_to(req.status) {
        Ok(status) => status,
        Err(e) => {
            tracing::info!("Refused status change on {}: {}", request_id, e);
            return HttpResponse::Conflict().json(ErrorResponse::new(
                "Invalid status transition",
                e.to_string(),
                409,
            ));
        }
    };

    let changed = next != current.status;
    if changed {
        if let Err(e) = state.store.update_request_status(&request_id, next).await {
            return store_failure("Failed to update organ request", &e);
        }
    }

    HttpResponse::Ok().json(StatusUpdateResponse {
        request_id,
        previous_status: current.status,
        status: next,
        changed,
    })
}

/// Remove a donor from the registry
///
/// DELETE /api/v1/donors/{donor_id}
async fn delete_donor(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let donor_id = path.into_inner();

    match state.store.delete_donor(&donor_id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => store_failure("Failed to delete donor", &e),
    }
}

/// Registry-wide counts
///
/// GET /api/v1/stats
async fn registry_stats(state: web::Data<AppState>) -> impl Responder {
    match tokio::try_join!(state.store.list_donors(), state.store.list_requests()) {
        Ok((donors, requests)) => HttpResponse::Ok().json(RegistryStats::collect(&donors, &requests)),
        Err(e) => store_failure("Failed to load registry", &e),
    }
}
