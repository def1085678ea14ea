use actix_web::{web, HttpRequest, HttpResponse};

use crate::core::MatchError;
use crate::models::{
    ClaimedRecipient, ClaimedRecipientsResponse, EligibleRecipientsResponse, RecipientSummary, SetPreferenceRequest,
};
use crate::routes::{authenticate, AppState};

/// Configure all donor-facing routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/donors/me/preference", web::get().to(get_preference))
        .route("/donors/me/preference", web::put().to(set_preference))
        .route("/donors/me/eligible", web::get().to(eligible_recipients))
        .route("/donors/me/claimed", web::get().to(claimed_recipients))
        .route("/recipients/{id}/claim", web::post().to(claim_recipient))
        .route("/recipients/{id}/release", web::post().to(release_recipient));
}

/// GET /api/v1/donors/me/preference
async fn get_preference(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, MatchError> {
    let principal = authenticate(&state, &req).await?;
    let preference = state.matchmaker.preference(&principal).await?;
    Ok(HttpResponse::Ok().json(preference))
}

/// Set preferences
///
/// PUT /api/v1/donors/me/preference
///
/// Request body:
/// ```json
/// {
///   "childCount": 2,
///   "genderPref": "female",
///   "ageRange": "3-10"
/// }
/// ```
async fn set_preference(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<SetPreferenceRequest>,
) -> Result<HttpResponse, MatchError> {
    let principal = authenticate(&state, &req).await?;
    let preference = body.into_inner().into_preference()?;
    let stored = state.matchmaker.set_preference(&principal, preference).await?;
    Ok(HttpResponse::Ok().json(stored))
}

/// GET /api/v1/donors/me/eligible
async fn eligible_recipients(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, MatchError> {
    let principal = authenticate(&state, &req).await?;
    let result = state.matchmaker.eligible(&principal).await?;

    Ok(HttpResponse::Ok().json(EligibleRecipientsResponse {
        recipients: result.recipients.into_iter().map(RecipientSummary::from).collect(),
        total_candidates: result.total_candidates,
    }))
}

/// GET /api/v1/donors/me/claimed
async fn claimed_recipients(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, MatchError> {
    let principal = authenticate(&state, &req).await?;
    let claimed = state.matchmaker.claimed(&principal).await?;

    Ok(HttpResponse::Ok().json(ClaimedRecipientsResponse {
        recipients: claimed.into_iter().map(ClaimedRecipient::from).collect(),
    }))
}

/// POST /api/v1/recipients/{id}/claim
async fn claim_recipient(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, MatchError> {
    let principal = authenticate(&state, &req).await?;
    let record = state.matchmaker.claim(&principal, &path).await?;
    Ok(HttpResponse::Ok().json(ClaimedRecipient::from(record)))
}

/// POST /api/v1/recipients/{id}/release
async fn release_recipient(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, MatchError> {
    let principal = authenticate(&state, &req).await?;
    state.matchmaker.release(&principal, &path).await?;
    Ok(HttpResponse::NoContent().finish())
}
