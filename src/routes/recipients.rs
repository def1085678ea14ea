use actix_web::{web, HttpRequest, HttpResponse};

use crate::core::MatchError;
use crate::models::{
    AttachDocumentRequest, RegisterRecipientRequest, SaveWishlistsRequest, WishlistItemRequest, WishlistsResponse,
};
use crate::routes::{authenticate, AppState};

/// Configure all recipient-facing routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/recipients", web::post().to(register))
        .route("/recipients/me", web::get().to(own_record))
        .route("/recipients/me/documents", web::post().to(attach_document))
        .route("/recipients/me/wishlists", web::get().to(get_wishlists))
        .route("/recipients/me/wishlists", web::put().to(save_wishlists))
        .route("/recipients/me/wishlists/{child_id}/items", web::post().to(append_item))
        .route(
            "/recipients/me/wishlists/{child_id}/items/{index}",
            web::put().to(edit_item),
        );
}

/// Register a family
///
/// POST /api/v1/recipients
///
/// Request body:
/// ```json
/// {
///   "address": "string",
///   "zipCode": "48187",
///   "kidCount": 2,
///   "ages": [4, 6],
///   "gender": "female"
/// }
/// ```
async fn register(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<RegisterRecipientRequest>,
) -> Result<HttpResponse, MatchError> {
    let principal = authenticate(&state, &req).await?;
    let application = body.into_inner().into_application()?;
    let record = state
        .matchmaker
        .register_recipient(&principal, application)
        .await?;
    Ok(HttpResponse::Created().json(record))
}

/// GET /api/v1/recipients/me
async fn own_record(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, MatchError> {
    let principal = authenticate(&state, &req).await?;
    let record = state.matchmaker.own_record(&principal).await?;
    Ok(HttpResponse::Ok().json(record))
}

/// POST /api/v1/recipients/me/documents
async fn attach_document(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<AttachDocumentRequest>,
) -> Result<HttpResponse, MatchError> {
    let principal = authenticate(&state, &req).await?;
    let body = body.into_inner();
    validator::Validate::validate(&body)?;

    let record = state
        .matchmaker
        .attach_document(&principal, &body.label, &body.reference)
        .await?;
    Ok(HttpResponse::Ok().json(record))
}

/// GET /api/v1/recipients/me/wishlists
async fn get_wishlists(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, MatchError> {
    let principal = authenticate(&state, &req).await?;
    let wishlists = state.matchmaker.wishlists(&principal).await?;
    Ok(HttpResponse::Ok().json(WishlistsResponse { wishlists }))
}

/// PUT /api/v1/recipients/me/wishlists
async fn save_wishlists(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<SaveWishlistsRequest>,
) -> Result<HttpResponse, MatchError> {
    let principal = authenticate(&state, &req).await?;
    let wishlists = body.into_inner().into_wishlists()?;
    let wishlists = state.matchmaker.save_wishlists(&principal, wishlists).await?;
    Ok(HttpResponse::Ok().json(WishlistsResponse { wishlists }))
}

/// POST /api/v1/recipients/me/wishlists/{child_id}/items
async fn append_item(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<u32>,
    body: web::Json<WishlistItemRequest>,
) -> Result<HttpResponse, MatchError> {
    let principal = authenticate(&state, &req).await?;
    let item = body.into_inner().into_item()?;
    let wishlists = state
        .matchmaker
        .append_item(&principal, path.into_inner(), item)
        .await?;
    Ok(HttpResponse::Ok().json(WishlistsResponse { wishlists }))
}

/// PUT /api/v1/recipients/me/wishlists/{child_id}/items/{index}
async fn edit_item(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(u32, usize)>,
    body: web::Json<WishlistItemRequest>,
) -> Result<HttpResponse, MatchError> {
    let principal = authenticate(&state, &req).await?;
    let (child_id, index) = path.into_inner();
    let item = body.into_inner().into_item()?;
    let wishlists = state
        .matchmaker
        .edit_item(&principal, child_id, index, item)
        .await?;
    Ok(HttpResponse::Ok().json(WishlistsResponse { wishlists }))
}
