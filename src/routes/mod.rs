// Route exports
pub mod admin;
pub mod donors;
pub mod recipients;

use actix_web::http::{header, StatusCode};
use actix_web::{error, web, HttpRequest, HttpResponse, Responder};
use std::sync::Arc;

use crate::core::{MatchError, Matchmaker};
use crate::models::{ErrorResponse, HealthResponse, Principal};
use crate::services::IdentityProvider;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub matchmaker: Matchmaker,
    pub identity: Arc<dyn IdentityProvider>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(donors::configure)
            .configure(recipients::configure)
            .configure(admin::configure),
    );
}

impl error::ResponseError for MatchError {
    fn status_code(&self) -> StatusCode {
        match self {
            MatchError::Validation(_) => StatusCode::BAD_REQUEST,
            MatchError::NotFound(_) => StatusCode::NOT_FOUND,
            MatchError::AlreadyClaimed(_)
            | MatchError::NotClaimant { .. }
            | MatchError::NotApproved(_)
            | MatchError::InvalidTransition { .. }
            | MatchError::AlreadyRegistered(_) => StatusCode::CONFLICT,
            MatchError::Unauthenticated => StatusCode::UNAUTHORIZED,
            MatchError::Forbidden(_) => StatusCode::FORBIDDEN,
            MatchError::StoreUnavailable(_) | MatchError::IdentityUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}

/// Resolve the bearer credential on `req` into a principal
pub(crate) async fn authenticate(state: &AppState, req: &HttpRequest) -> Result<Principal, MatchError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(MatchError::Unauthenticated)?;

    state
        .identity
        .current_principal(token)
        .await?
        .ok_or(MatchError::Unauthenticated)
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let healthy = state.matchmaker.health_check().await;
    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    let message = format!("Invalid JSON: {}", err);
    error::InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(ErrorResponse {
            error: "invalid_json".to_string(),
            message,
            status_code: 400,
        }),
    )
    .into()
}

/// Handle path parameter errors
pub fn handle_path_error(err: error::PathError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("Path error on {}: {}", req.path(), err);
    let message = format!("Invalid path: {}", err);
    error::InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(ErrorResponse {
            error: "invalid_path".to_string(),
            message,
            status_code: 400,
        }),
    )
    .into()
}
