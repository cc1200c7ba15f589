// SPDX-License-Identifier: MIT

//! Friend-request lifecycle over the HTTP surface.

use axum::http::StatusCode;
use serde_json::json;

mod common;

async fn setup_two() -> (axum::Router, String, String) {
    let (app, state) = common::create_test_app();
    let alice = common::token_for(&state, "alice");
    let bob = common::token_for(&state, "bob");
    common::create_profile(&app, &alice, "Alice").await;
    common::create_profile(&app, &bob, "Bob").await;
    (app, alice, bob)
}

#[tokio::test]
async fn test_request_and_accept_establishes_mutual_friendship() {
    let (app, alice, bob) = setup_two().await;

    let (status, _) = common::send(
        &app,
        "POST",
        "/api/friends/requests",
        Some(&alice),
        Some(json!({"target": "bob"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The request is visible on Bob's profile
    let (_, body) = common::send(&app, "GET", "/api/profile", Some(&bob), None).await;
    assert_eq!(body["friend_requests"], json!(["alice"]));

    let (status, _) = common::send(
        &app,
        "POST",
        "/api/friends/requests/alice/accept",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Symmetric on both sides, request consumed
    let (_, alice_profile) = common::send(&app, "GET", "/api/profile", Some(&alice), None).await;
    let (_, bob_profile) = common::send(&app, "GET", "/api/profile", Some(&bob), None).await;
    assert_eq!(alice_profile["friends"], json!(["bob"]));
    assert_eq!(bob_profile["friends"], json!(["alice"]));
    assert_eq!(bob_profile["friend_requests"], json!([]));

    // Friendship does not imply following
    assert_eq!(alice_profile["following"], json!([]));
    assert_eq!(bob_profile["followers"], json!([]));
}

#[tokio::test]
async fn test_duplicate_request_leaves_one_entry() {
    let (app, alice, bob) = setup_two().await;

    for _ in 0..2 {
        let (status, _) = common::send(
            &app,
            "POST",
            "/api/friends/requests",
            Some(&alice),
            Some(json!({"target": "bob"})),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let (_, body) = common::send(&app, "GET", "/api/profile", Some(&bob), None).await;
    assert_eq!(body["friend_requests"], json!(["alice"]));
}

#[tokio::test]
async fn test_self_request_is_rejected() {
    let (app, alice, _) = setup_two().await;

    let (status, body) = common::send(
        &app,
        "POST",
        "/api/friends/requests",
        Some(&alice),
        Some(json!({"target": "alice"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_argument");
}

#[tokio::test]
async fn test_request_to_existing_friend_conflicts() {
    let (app, alice, bob) = setup_two().await;

    common::send(
        &app,
        "POST",
        "/api/friends/requests",
        Some(&alice),
        Some(json!({"target": "bob"})),
    )
    .await;
    common::send(
        &app,
        "POST",
        "/api/friends/requests/alice/accept",
        Some(&bob),
        None,
    )
    .await;

    let (status, body) = common::send(
        &app,
        "POST",
        "/api/friends/requests",
        Some(&bob),
        Some(json!({"target": "alice"})),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_friends");
}

#[tokio::test]
async fn test_decline_resets_and_allows_resend() {
    let (app, alice, bob) = setup_two().await;

    common::send(
        &app,
        "POST",
        "/api/friends/requests",
        Some(&alice),
        Some(json!({"target": "bob"})),
    )
    .await;

    let (status, _) = common::send(
        &app,
        "POST",
        "/api/friends/requests/alice/decline",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = common::send(&app, "GET", "/api/profile", Some(&bob), None).await;
    assert_eq!(body["friends"], json!([]));
    assert_eq!(body["friend_requests"], json!([]));

    // Back to the initial state: a repeat send succeeds
    let (status, _) = common::send(
        &app,
        "POST",
        "/api/friends/requests",
        Some(&alice),
        Some(json!({"target": "bob"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = common::send(&app, "GET", "/api/profile", Some(&bob), None).await;
    assert_eq!(body["friend_requests"], json!(["alice"]));
}

#[tokio::test]
async fn test_accept_without_pending_request_is_not_found() {
    let (app, _, bob) = setup_two().await;

    let (status, body) = common::send(
        &app,
        "POST",
        "/api/friends/requests/alice/accept",
        Some(&bob),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_request_to_unknown_target_is_not_found() {
    let (app, alice, _) = setup_two().await;

    let (status, _) = common::send(
        &app,
        "POST",
        "/api/friends/requests",
        Some(&alice),
        Some(json!({"target": "ghost"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
