//! HTTP-level tests for the roster listing, filters, candidate options,
//! manual entry and the entry form draft.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, delete_auth, get_auth, login, post_auth, post_json_auth,
    put_json_auth, TestApp, ANA, CARLOS,
};
use roster_core::partner::{PartnerField, PartnerRecord, RawPartnerFields};
use serde_json::{json, Value};

fn record(plate: &str, state: &str, tracker: &str) -> PartnerRecord {
    RawPartnerFields::new()
        .with(PartnerField::Plate, plate)
        .with(PartnerField::State, state)
        .with(PartnerField::HasTracker, tracker)
        .into_record()
}

async fn seeded_app() -> TestApp {
    let app = build_test_app();
    app.store
        .insert_batch(&[
            record("ABC-1234", "SP", "SIM"),
            record("XYZ-9999", "RJ", "SIM"),
            record("DEF-5678", "SP", "NAO"),
            record("JKL-4321", "SP", "SIM"),
        ])
        .await
        .expect("seeding should succeed");
    app
}

fn plates(listing: &Value) -> Vec<String> {
    listing["data"]["rows"]
        .as_array()
        .expect("rows must be an array")
        .iter()
        .map(|row| row["plate"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Listing and filters
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_roster_lists_nothing() {
    let app = build_test_app();
    let token = login(&app.router, ANA).await;

    let response = get_auth(&app.router, "/api/v1/partners", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 0);
    assert_eq!(json["data"]["matched"], 0);
    assert!(json["data"]["rows"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unfiltered_listing_keeps_store_order() {
    let app = seeded_app().await;
    let token = login(&app.router, ANA).await;

    let json = body_json(get_auth(&app.router, "/api/v1/partners", &token).await).await;
    assert_eq!(json["data"]["total"], 4);
    assert_eq!(
        plates(&json),
        ["ABC-1234", "XYZ-9999", "DEF-5678", "JKL-4321"]
    );
}

#[tokio::test]
async fn filters_combine_across_columns() {
    let app = seeded_app().await;
    let token = login(&app.router, ANA).await;

    let response = put_json_auth(
        &app.router,
        "/api/v1/filters/state",
        &token,
        json!({ "values": ["SP"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Header labels resolve too, accents and case aside.
    let response = put_json_auth(
        &app.router,
        "/api/v1/filters/Rastreador",
        &token,
        json!({ "values": ["sim"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let state = body_json(response).await;
    assert_eq!(state["data"]["selections"]["has_tracker"], json!(["SIM"]));

    let json = body_json(get_auth(&app.router, "/api/v1/partners", &token).await).await;
    assert_eq!(json["data"]["total"], 4);
    assert_eq!(json["data"]["matched"], 2);
    assert_eq!(plates(&json), ["ABC-1234", "JKL-4321"]);
}

#[tokio::test]
async fn clearing_filters_restores_the_full_roster() {
    let app = seeded_app().await;
    let token = login(&app.router, ANA).await;

    put_json_auth(
        &app.router,
        "/api/v1/filters/plate",
        &token,
        json!({ "values": ["ABC-1234"] }),
    )
    .await;
    put_json_auth(
        &app.router,
        "/api/v1/filters/state",
        &token,
        json!({ "values": ["RJ"] }),
    )
    .await;
    let json = body_json(get_auth(&app.router, "/api/v1/partners", &token).await).await;
    assert_eq!(json["data"]["matched"], 0);

    let response = delete_auth(&app.router, "/api/v1/filters/state", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(get_auth(&app.router, "/api/v1/partners", &token).await).await;
    assert_eq!(plates(&json), ["ABC-1234"]);

    let response = delete_auth(&app.router, "/api/v1/filters", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(get_auth(&app.router, "/api/v1/partners", &token).await).await;
    assert_eq!(json["data"]["matched"], 4);
}

#[tokio::test]
async fn unknown_and_unfilterable_columns_are_rejected() {
    let app = build_test_app();
    let token = login(&app.router, ANA).await;

    let response = put_json_auth(
        &app.router,
        "/api/v1/filters/color",
        &token,
        json!({ "values": ["RED"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = put_json_auth(
        &app.router,
        "/api/v1/filters/brand",
        &token,
        json!({ "values": ["FIAT"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn filters_are_private_to_a_session() {
    let app = seeded_app().await;
    let ana = login(&app.router, ANA).await;
    let carlos = login(&app.router, CARLOS).await;

    put_json_auth(
        &app.router,
        "/api/v1/filters/state",
        &ana,
        json!({ "values": ["RJ"] }),
    )
    .await;

    let json = body_json(get_auth(&app.router, "/api/v1/partners", &carlos).await).await;
    assert_eq!(json["data"]["matched"], 4);
}

// ---------------------------------------------------------------------------
// Candidate options
// ---------------------------------------------------------------------------

#[tokio::test]
async fn options_are_sorted_and_distinct() {
    let app = seeded_app().await;
    let token = login(&app.router, ANA).await;

    let response = get_auth(&app.router, "/api/v1/partners/options", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["state"], json!(["RJ", "SP"]));
    assert_eq!(json["data"]["has_tracker"], json!(["NAO", "SIM"]));
    assert_eq!(json["data"]["city"], json!([]));
    assert!(json["data"].get("brand").is_none(), "brand is not filterable");
}

#[tokio::test]
async fn filtered_scope_narrows_options() {
    let app = seeded_app().await;
    let token = login(&app.router, ANA).await;
    put_json_auth(
        &app.router,
        "/api/v1/filters/has_tracker",
        &token,
        json!({ "values": ["NAO"] }),
    )
    .await;

    let all = body_json(get_auth(&app.router, "/api/v1/partners/options", &token).await).await;
    assert_eq!(all["data"]["plate"].as_array().unwrap().len(), 4);

    let filtered = body_json(
        get_auth(&app.router, "/api/v1/partners/options?scope=filtered", &token).await,
    )
    .await;
    assert_eq!(filtered["data"]["plate"], json!(["DEF-5678"]));
}

// ---------------------------------------------------------------------------
// Manual entry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn manual_save_normalizes_and_attributes() {
    let app = build_test_app();
    let token = login(&app.router, ANA).await;

    let response = post_json_auth(
        &app.router,
        "/api/v1/partners",
        &token,
        json!({
            "plate": "abc-1234",
            "city": "São Paulo ",
            "year": 2019,
            "has_tracker": "sim",
            "tag": "Sem Parar"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["plate"], "ABC-1234");
    assert_eq!(json["data"]["city"], "SAO PAULO");
    assert_eq!(json["data"]["year"], "2019");
    assert_eq!(json["data"]["tag"], "SEM PARAR");
    assert_eq!(json["data"]["created_by_user"], "ANA");
    assert_eq!(json["data"]["brand"], "");

    let stored = app.store.list().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].city, "SAO PAULO");
}

#[tokio::test]
async fn out_of_vocabulary_values_are_not_saved() {
    let app = build_test_app();
    let token = login(&app.router, ANA).await;

    let response = post_json_auth(
        &app.router,
        "/api/v1/partners",
        &token,
        json!({ "plate": "ABC-1234", "has_tracker": "talvez" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    assert!(app.store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn save_refreshes_own_view_but_not_other_sessions() {
    let app = seeded_app().await;
    let ana = login(&app.router, ANA).await;
    let carlos = login(&app.router, CARLOS).await;

    // Both sessions cache the roster.
    get_auth(&app.router, "/api/v1/partners", &ana).await;
    get_auth(&app.router, "/api/v1/partners", &carlos).await;

    let response = post_json_auth(
        &app.router,
        "/api/v1/partners",
        &ana,
        json!({ "plate": "NEW-0001" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let mine = body_json(get_auth(&app.router, "/api/v1/partners", &ana).await).await;
    assert_eq!(mine["data"]["total"], 5);

    let theirs = body_json(get_auth(&app.router, "/api/v1/partners", &carlos).await).await;
    assert_eq!(theirs["data"]["total"], 4, "other sessions keep their cache");

    let refreshed = body_json(post_auth(&app.router, "/api/v1/partners/refresh", &carlos).await).await;
    assert_eq!(refreshed["data"]["total"], 5);
}

// ---------------------------------------------------------------------------
// Entry form draft
// ---------------------------------------------------------------------------

#[tokio::test]
async fn form_starts_with_defaults() {
    let app = build_test_app();
    let token = login(&app.router, ANA).await;

    let json = body_json(get_auth(&app.router, "/api/v1/form", &token).await).await;
    assert_eq!(json["data"]["plate"], "");
    assert_eq!(json["data"]["has_tracker"], "SIM");
    assert_eq!(json["data"]["has_training"], "SIM");
    assert_eq!(json["data"]["referral"], "SIM");
    assert_eq!(json["data"]["tag"], "CONECT CAR");
}

#[tokio::test]
async fn submitted_form_is_saved_and_reset() {
    let app = build_test_app();
    let token = login(&app.router, ANA).await;

    let response = put_json_auth(
        &app.router,
        "/api/v1/form",
        &token,
        json!({ "plate": "abc-1234", "driver_name": "José", "has_tracker": "NAO" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let draft = body_json(response).await;
    assert_eq!(draft["data"]["driver_name"], "José", "drafts are kept as typed");
    assert_eq!(draft["data"]["tag"], "CONECT CAR");

    let response = post_auth(&app.router, "/api/v1/form/submit", &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let saved = body_json(response).await;
    assert_eq!(saved["data"]["driver_name"], "JOSE");
    assert_eq!(saved["data"]["has_tracker"], "NAO");
    assert_eq!(saved["data"]["created_by_user"], "ANA");

    let form = body_json(get_auth(&app.router, "/api/v1/form", &token).await).await;
    assert_eq!(form["data"]["plate"], "");
    assert_eq!(form["data"]["has_tracker"], "SIM");
    assert_eq!(app.store.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn rejected_submission_keeps_the_draft() {
    let app = build_test_app();
    let token = login(&app.router, ANA).await;

    put_json_auth(
        &app.router,
        "/api/v1/form",
        &token,
        json!({ "plate": "ABC-1234", "tag": "PEDAGIO" }),
    )
    .await;

    let response = post_auth(&app.router, "/api/v1/form/submit", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let form = body_json(get_auth(&app.router, "/api/v1/form", &token).await).await;
    assert_eq!(form["data"]["tag"], "PEDAGIO");
    assert!(app.store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn form_reset_restores_defaults() {
    let app = build_test_app();
    let token = login(&app.router, ANA).await;

    put_json_auth(
        &app.router,
        "/api/v1/form",
        &token,
        json!({ "plate": "ABC-1234", "tag": "VELOE" }),
    )
    .await;

    let json = body_json(delete_auth(&app.router, "/api/v1/form", &token).await).await;
    assert_eq!(json["data"]["plate"], "");
    assert_eq!(json["data"]["tag"], "CONECT CAR");
}
