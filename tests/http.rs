use std::sync::Arc;

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use serde_json::{json, Value};

use goodfellows_match::core::Matchmaker;
use goodfellows_match::models::{Principal, Role};
use goodfellows_match::routes::{self, AppState};
use goodfellows_match::services::{JwtIdentityProvider, MemoryProfileStore};

const SECRET: &str = "http-test-secret";

fn state() -> (AppState, Arc<JwtIdentityProvider>) {
    let identity = Arc::new(JwtIdentityProvider::new(
        SECRET,
        vec!["lead@goodfellows.org".to_string()],
    ));
    let matchmaker = Matchmaker::new(Arc::new(MemoryProfileStore::new()), vec!["48187".to_string()]);

    (
        AppState {
            matchmaker,
            identity: identity.clone(),
        },
        identity,
    )
}

fn bearer(identity: &JwtIdentityProvider, principal: &Principal) -> (header::HeaderName, String) {
    let token = identity
        .issue(principal, chrono::Duration::hours(1))
        .expect("issue token");
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
                .app_data(web::PathConfig::default().error_handler(routes::handle_path_error))
                .configure(routes::configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn health_reports_healthy() {
    let (state, _) = state();
    let app = app!(state);

    let request = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, request).await;

    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn missing_token_is_unauthorized() {
    let (state, _) = state();
    let app = app!(state);

    let request = test::TestRequest::get().uri("/api/v1/donors/me/eligible").to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["error"], "unauthenticated");
}

#[actix_web::test]
async fn malformed_json_is_bad_request() {
    let (state, identity) = state();
    let app = app!(state);
    let donor = Principal::new("donor-1", Role::Donor);

    let request = test::TestRequest::put()
        .uri("/api/v1/donors/me/preference")
        .insert_header(bearer(&identity, &donor))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"childCount\":")
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["error"], "invalid_json");
}

#[actix_web::test]
async fn register_approve_claim_over_http() {
    let (state, identity) = state();
    let app = app!(state);

    let family = Principal::new("fam-1", Role::Recipient);
    let donor = Principal::new("donor-1", Role::Donor);
    let rival = Principal::new("donor-2", Role::Donor);
    // Elevated through the configured admin list
    let admin = Principal::new("staff-1", Role::Donor).with_email("lead@goodfellows.org");

    let request = test::TestRequest::post()
        .uri("/api/v1/recipients")
        .insert_header(bearer(&identity, &family))
        .set_json(json!({
            "address": "1150 S Canton Center Rd",
            "zipCode": "48187",
            "kidCount": 2,
            "ages": "4, 6",
            "gender": "girls"
        }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let request = test::TestRequest::get()
        .uri("/api/v1/admin/recipients/pending")
        .insert_header(bearer(&identity, &admin))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(body["recipients"].as_array().map(Vec::len), Some(1));

    let request = test::TestRequest::post()
        .uri("/api/v1/admin/recipients/fam-1/approve")
        .insert_header(bearer(&identity, &admin))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let request = test::TestRequest::put()
        .uri("/api/v1/donors/me/preference")
        .insert_header(bearer(&identity, &donor))
        .set_json(json!({ "childCount": 2, "genderPref": "female", "ageRange": "3-10" }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let request = test::TestRequest::get()
        .uri("/api/v1/donors/me/eligible")
        .insert_header(bearer(&identity, &donor))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(body["recipients"][0]["id"], "fam-1");

    let request = test::TestRequest::post()
        .uri("/api/v1/recipients/fam-1/claim")
        .insert_header(bearer(&identity, &donor))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let request = test::TestRequest::post()
        .uri("/api/v1/recipients/fam-1/claim")
        .insert_header(bearer(&identity, &rival))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["error"], "already_claimed");

    let request = test::TestRequest::post()
        .uri("/api/v1/recipients/me/wishlists/1/items")
        .insert_header(bearer(&identity, &family))
        .set_json(json!({ "name": "Art set", "link": "" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(body["wishlists"][0]["items"][0]["name"], "Art set");

    let request = test::TestRequest::get()
        .uri("/api/v1/donors/me/claimed")
        .insert_header(bearer(&identity, &donor))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(body["recipients"][0]["wishlists"][0]["items"][0]["name"], "Art set");
}

#[actix_web::test]
async fn donors_cannot_review_applications() {
    let (state, identity) = state();
    let app = app!(state);
    let donor = Principal::new("donor-1", Role::Donor);

    let request = test::TestRequest::get()
        .uri("/api/v1/admin/recipients/pending")
        .insert_header(bearer(&identity, &donor))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
