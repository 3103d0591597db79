// Route exports
pub mod admin;
pub mod matches;

pub use matches::AppState;

use actix_web::{error, http::StatusCode, web, HttpRequest, HttpResponse};
use crate::models::ErrorResponse;
use crate::services::StoreError;
use std::fmt;

/// Largest JSON body accepted; ranking snapshots carry whole donor pools
const JSON_LIMIT_BYTES: usize = 4 * 1024 * 1024;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(admin::configure),
    );
}

/// JSON extractor settings shared by the server and tests
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT_BYTES)
        .error_handler(handle_json_payload_error)
}

/// JSON error body for payloads rejected before reaching a handler
#[derive(Debug)]
pub struct JsonError(ErrorResponse);

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.0.error, self.0.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(&self.0)
    }
}

/// Handle JSON payload errors, including unknown urgency or status values
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError(ErrorResponse::new(
        "invalid_json",
        format!("Invalid JSON: {}", err),
        400,
    ))
    .into()
}

/// Map a store failure to a response; details stay in the log
pub(crate) fn store_failure(context: &str, err: &StoreError) -> HttpResponse {
    match err {
        StoreError::NotFound(what) => HttpResponse::NotFound().json(ErrorResponse::new(
            "Not found",
            format!("{} does not exist", what),
            404,
        )),
        _ => {
            tracing::error!("{}: {}", context, err);
            HttpResponse::BadGateway().json(ErrorResponse::new(
                context,
                "The registry is temporarily unavailable, please retry",
                502,
            ))
        }
    }
}
