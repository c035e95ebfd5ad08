//! HTTP-level integration tests for the `/tours` resource.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, TestApp};
use panotour_core::media::MediaKind;
use serde_json::{json, Value};
use sqlx::PgPool;

fn empty_tour(name: &str) -> Value {
    json!({"name": name, "panoramas": [], "infospots": [], "linkspots": []})
}

fn populated_tour() -> Value {
    json!({
        "name": "Campus",
        "description": "Main buildings",
        "panoramas": [
            {"panoId": "p1", "imageUrl": "u1", "name": "Gate"},
            {"panoId": "p2", "imageUrl": "u2"}
        ],
        "infospots": [
            {"infospotId": "i1", "panoId": "p1", "position": {"x": 1.0, "y": 2.0, "z": 3.0},
             "size": 300, "text": "Welcome"}
        ],
        "linkspots": [
            {"linkspotId": "l1", "panoId": "p1", "targetPanoId": "p2",
             "position": {"x": 0.0, "y": 0.0, "z": -1.0}, "size": 250, "text": "Go in"},
            {"linkspotId": "l2", "panoId": "p2", "targetPanoId": "p1",
             "position": {"x": 0.0, "y": 0.0, "z": 1.0}, "size": 250, "text": "Back"}
        ]
    })
}

async fn admin(app: &TestApp) -> String {
    app.user_with_token("curator", true).await.1
}

async fn create(app: &TestApp, token: &str, body: Value) -> Value {
    let response = app.post_json("/api/tours", body, Some(token)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Create & id allocation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn sequential_ids_on_empty_store(pool: PgPool) {
    let app = build_test_app(pool).await;
    let token = admin(&app).await;

    let first = create(&app, &token, empty_tour("Test")).await;
    assert_eq!(first["success"], true);
    assert_eq!(first["tour"]["tourId"], "tour01");

    let second = create(&app, &token, empty_tour("Test")).await;
    assert_eq!(second["tour"]["tourId"], "tour02");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn client_supplied_tour_id_is_ignored(pool: PgPool) {
    let app = build_test_app(pool).await;
    let token = admin(&app).await;

    let mut body = empty_tour("Sneaky");
    body["tourId"] = json!("tour42");
    let created = create(&app, &token, body).await;
    assert_eq!(created["tour"]["tourId"], "tour01");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn round_trip_preserves_content(pool: PgPool) {
    let app = build_test_app(pool).await;
    let token = admin(&app).await;

    let created = create(&app, &token, populated_tour()).await;
    let tour_id = created["tour"]["tourId"].as_str().unwrap().to_string();

    let response = app.get(&format!("/api/tours/{tour_id}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let tour = body_json(response).await["tour"].clone();

    let sent = populated_tour();
    assert_eq!(tour["name"], "Campus");
    assert_eq!(tour["description"], "Main buildings");
    assert_eq!(tour["panoramas"], sent["panoramas"]);
    assert_eq!(tour["linkspots"].as_array().unwrap().len(), 2);
    assert_eq!(tour["infospots"][0]["text"], "Welcome");
    assert!(tour["createdAt"].is_string());
    assert!(tour["updatedAt"].is_string());
    assert!(tour.get("id").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn dangling_references_are_rejected(pool: PgPool) {
    let app = build_test_app(pool).await;
    let token = admin(&app).await;

    let mut body = populated_tour();
    body["linkspots"][0]["targetPanoId"] = json!("nowhere");
    let response = app.post_json("/api/tours", body, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut body = populated_tour();
    body["infospots"][0]["panoId"] = json!("p9");
    let response = app.post_json("/api/tours", body, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Nothing was stored, so the next id is still the first.
    let created = create(&app, &token, empty_tour("Ok")).await;
    assert_eq!(created["tour"]["tourId"], "tour01");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_name_is_rejected(pool: PgPool) {
    let app = build_test_app(pool).await;
    let token = admin(&app).await;

    let response = app
        .post_json("/api/tours", json!({"name": "   "}), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post_json("/api/tours", json!({"panoramas": []}), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Authorization
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn writes_require_admin_reads_are_public(pool: PgPool) {
    let app = build_test_app(pool).await;
    let (_, viewer) = app.user_with_token("viewer", false).await;

    let anonymous = app.post_json("/api/tours", empty_tour("X"), None).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let non_admin = app
        .post_json("/api/tours", empty_tour("X"), Some(&viewer))
        .await;
    assert_eq!(non_admin.status(), StatusCode::FORBIDDEN);

    let list = app.get("/api/tours", None).await;
    assert_eq!(list.status(), StatusCode::OK);
    let body = body_json(list).await;
    assert_eq!(body["count"], 0);
    assert_eq!(body["tours"], json!([]));
}

// ---------------------------------------------------------------------------
// Read, update, delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_returns_tours_in_creation_order(pool: PgPool) {
    let app = build_test_app(pool).await;
    let token = admin(&app).await;
    create(&app, &token, empty_tour("First")).await;
    create(&app, &token, populated_tour()).await;

    let body = body_json(app.get("/api/tours", None).await).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["tours"][0]["tourId"], "tour01");
    assert_eq!(body["tours"][0]["description"], "");
    assert_eq!(body["tours"][0]["infospots"], json!([]));
    assert_eq!(body["tours"][1]["tourId"], "tour02");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_unknown_tour_is_404(pool: PgPool) {
    let app = build_test_app(pool).await;
    let response = app.get("/api/tours/tour77", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_replaces_snapshot(pool: PgPool) {
    let app = build_test_app(pool).await;
    let token = admin(&app).await;
    create(&app, &token, populated_tour()).await;

    let response = app
        .put_json(
            "/api/tours/tour01",
            json!({"name": "Renamed", "panoramas": [{"panoId": "p9", "imageUrl": "u9"}]}),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let tour = body_json(response).await["tour"].clone();
    assert_eq!(tour["tourId"], "tour01");
    assert_eq!(tour["name"], "Renamed");
    assert_eq!(tour["description"], "");
    assert_eq!(tour["panoramas"].as_array().unwrap().len(), 1);
    assert_eq!(tour["infospots"], json!([]));
    assert_eq!(tour["linkspots"], json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_unknown_tour_is_404(pool: PgPool) {
    let app = build_test_app(pool).await;
    let token = admin(&app).await;

    let response = app
        .put_json("/api/tours/tour05", empty_tour("Nope"), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let invalid_body = app
        .put_json("/api/tours/tour05", json!({"name": ""}), Some(&token))
        .await;
    assert_eq!(invalid_body.status(), StatusCode::NOT_FOUND);

    let list = body_json(app.get("/api/tours", None).await).await;
    assert_eq!(list["count"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_existing_tour_with_blank_name_is_400(pool: PgPool) {
    let app = build_test_app(pool).await;
    let token = admin(&app).await;
    create(&app, &token, empty_tour("Keep")).await;

    let response = app
        .put_json("/api/tours/tour01", json!({"name": ""}), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let tour = body_json(app.get("/api/tours/tour01", None).await).await;
    assert_eq!(tour["tour"]["name"], "Keep");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_removes_tour_and_its_media(pool: PgPool) {
    let app = build_test_app(pool).await;
    let token = admin(&app).await;

    let pano = app
        .state
        .media
        .store(MediaKind::Panorama, "hall.jpg", "image/jpeg", b"panorama-bytes")
        .await
        .unwrap();
    let video = app
        .state
        .media
        .store(MediaKind::Video, "clip.mp4", "video/mp4", b"video-bytes")
        .await
        .unwrap();
    let pano_path = app.state.media.resolve_url(&pano.url).unwrap();
    let video_path = app.state.media.resolve_url(&video.url).unwrap();
    assert!(pano_path.exists() && video_path.exists());

    create(
        &app,
        &token,
        json!({
            "name": "With media",
            "panoramas": [
                {"panoId": "p1", "imageUrl": pano.url},
                {"panoId": "p2", "imageUrl": "http://localhost:8000/panoramas/already-gone.jpg"}
            ],
            "infospots": [
                {"infospotId": "i1", "panoId": "p1", "position": {"x": 0, "y": 0, "z": 0},
                 "text": "clip", "video": video.url, "img": "https://elsewhere.example/x.png"}
            ]
        }),
    )
    .await;

    let response = app.delete("/api/tours/tour01", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    assert!(!pano_path.exists());
    assert!(!video_path.exists());

    let gone = app.get("/api/tours/tour01", None).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_then_create_continues_sequence(pool: PgPool) {
    let app = build_test_app(pool).await;
    let token = admin(&app).await;
    create(&app, &token, empty_tour("A")).await;
    create(&app, &token, empty_tour("B")).await;

    let deleted = app.delete("/api/tours/tour01", Some(&token)).await;
    assert_eq!(deleted.status(), StatusCode::OK);

    let next = create(&app, &token, empty_tour("C")).await;
    assert_eq!(next["tour"]["tourId"], "tour03");

    let missing = app.delete("/api/tours/tour01", Some(&token)).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
