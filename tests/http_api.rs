mod fixtures;

use fixtures::{ADMIN_PASSWORD, TestServer};
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
async fn test_health() {
    let server = TestServer::spawn().await;

    let response = reqwest::get(server.url("/api/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_join_check_room_flow() {
    // given:
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    server.create_room("Quiz Night", "abcd").await;

    // when / then: the stored key is the lower-cased trimmed name
    let check: Value = reqwest::get(server.url("/api/rooms/check/quiz%20night"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(check["exists"], true);
    assert_eq!(check["room_name"], "quiz night");

    let join = client
        .post(server.url("/api/rooms/join"))
        .json(&json!({"room_name": "QUIZ NIGHT", "password": "abcd"}))
        .send()
        .await
        .unwrap();
    assert_eq!(join.status(), StatusCode::OK);

    let wrong = client
        .post(server.url("/api/rooms/join"))
        .json(&json!({"room_name": "quiz night", "password": "wrong"}))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let body: Value = wrong.json().await.unwrap();
    assert_eq!(body["detail"], "Invalid room or password");
}

#[tokio::test]
async fn test_check_unknown_room() {
    let server = TestServer::spawn().await;

    let check: Value = reqwest::get(server.url("/api/rooms/check/ghost"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(check["exists"], false);
}

#[tokio::test]
async fn test_duplicate_room_is_conflict() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    server.create_room("quiz", "abcd").await;

    let response = client
        .post(server.url("/api/rooms/create"))
        .json(&json!({"room_name": "QUIZ", "password": "efgh"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Room already exists");
}

#[tokio::test]
async fn test_create_room_validation() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // blank name
    let response = client
        .post(server.url("/api/rooms/create"))
        .json(&json!({"room_name": "   ", "password": "abcd"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // short password
    let response = client
        .post(server.url("/api/rooms/create"))
        .json(&json!({"room_name": "quiz", "password": "abc"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Password must be at least 4 characters");
}

#[tokio::test]
async fn test_admin_auth() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let ok = client
        .post(server.url("/api/admin/auth"))
        .json(&json!({"password": ADMIN_PASSWORD}))
        .send()
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);

    let bad = client
        .post(server.url("/api/admin/auth"))
        .json(&json!({"password": "nope"}))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_room_listing_and_detail() {
    // given:
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    server.create_room("quiz", "abcd").await;

    // when:
    let listing: Value = client
        .post(server.url("/api/admin/rooms"))
        .json(&json!({"admin_password": ADMIN_PASSWORD}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then: one seeded room, no secrets in the payload
    let rooms = listing["rooms"].as_array().unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0]["name"], "quiz");
    assert_eq!(rooms[0]["player_count"], 0);
    assert_eq!(rooms[0]["status"], "stopped");
    assert!(!listing.to_string().contains("password"));

    let detail: Value = client
        .post(server.url("/api/admin/rooms/quiz"))
        .json(&json!({"admin_password": ADMIN_PASSWORD}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["name"], "quiz");
    assert_eq!(detail["track_count"], 3);

    let missing = client
        .post(server.url("/api/admin/rooms/ghost"))
        .json(&json!({"admin_password": ADMIN_PASSWORD}))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_endpoints_reject_bad_password() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    server.create_room("quiz", "abcd").await;

    for path in ["/api/admin/rooms", "/api/admin/rooms/quiz"] {
        let response = client
            .post(server.url(path))
            .json(&json!({"admin_password": "nope"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{path}");
    }
}

#[tokio::test]
async fn test_admin_close_room_frees_the_name() {
    // given:
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    server.create_room("quiz", "abcd").await;

    // when:
    let response = client
        .post(server.url("/api/admin/rooms/close"))
        .json(&json!({"room_name": "quiz", "admin_password": ADMIN_PASSWORD}))
        .send()
        .await
        .unwrap();

    // then:
    assert_eq!(response.status(), StatusCode::OK);
    let check: Value = reqwest::get(server.url("/api/rooms/check/quiz"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(check["exists"], false);

    // closing again is a 404
    let again = client
        .post(server.url("/api/admin/rooms/close"))
        .json(&json!({"room_name": "quiz", "admin_password": ADMIN_PASSWORD}))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_load_playlist_from_unsupported_source() {
    // the builtin source resolves no external playlists
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    server.create_room("quiz", "abcd").await;

    let response = client
        .post(server.url("/api/admin/tracks/load"))
        .json(&json!({
            "room_name": "quiz",
            "playlist_url": "https://example.com/playlist",
            "admin_password": ADMIN_PASSWORD
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("not supported"));
}

#[tokio::test]
async fn test_admin_ban_unknown_player() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    server.create_room("quiz", "abcd").await;

    let response = client
        .post(server.url("/api/admin/players/ban"))
        .json(&json!({
            "room_name": "quiz",
            "player_id": "ghost",
            "admin_password": ADMIN_PASSWORD
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Player not found");
}
