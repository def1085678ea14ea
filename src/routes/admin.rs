use actix_web::{web, HttpRequest, HttpResponse};

use crate::core::MatchError;
use crate::models::PendingRecipientsResponse;
use crate::routes::{authenticate, AppState};

/// Configure admin review routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/admin/recipients/pending", web::get().to(pending_recipients))
        .route("/admin/recipients/{id}/approve", web::post().to(approve_recipient))
        .route("/admin/recipients/{id}", web::delete().to(deny_recipient));
}

/// GET /api/v1/admin/recipients/pending
async fn pending_recipients(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, MatchError> {
    let principal = authenticate(&state, &req).await?;
    let recipients = state.matchmaker.pending(&principal).await?;
    Ok(HttpResponse::Ok().json(PendingRecipientsResponse { recipients }))
}

/// POST /api/v1/admin/recipients/{id}/approve
async fn approve_recipient(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, MatchError> {
    let principal = authenticate(&state, &req).await?;
    state.matchmaker.approve(&principal, &path).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /api/v1/admin/recipients/{id}
async fn deny_recipient(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, MatchError> {
    let principal = authenticate(&state, &req).await?;
    state.matchmaker.deny(&principal, &path).await?;
    Ok(HttpResponse::NoContent().finish())
}
