// SPDX-License-Identifier: MIT

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use fitlink::config::Config;
use fitlink::middleware::auth::create_jwt;
use fitlink::models::Principal;
use fitlink::routes::create_router;
use fitlink::services::RelationshipEngine;
use fitlink::store::Store;
use fitlink::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Create a test app with no pre-assigned admins.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_admins(&[])
}

/// Create a test app with the given principals seeded as admins.
#[allow(dead_code)]
pub fn create_test_app_with_admins(admins: &[&str]) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let store = Store::with_admins(admins.iter().map(|p| Principal::from(*p)));
    let relationships = RelationshipEngine::new(store.clone());

    let state = Arc::new(AppState {
        config,
        store,
        relationships,
    });

    (create_router(state.clone()), state)
}

/// Mint a session token for a principal with the test signing key.
#[allow(dead_code)]
pub fn token_for(state: &AppState, principal: &str) -> String {
    create_jwt(&Principal::from(principal), &state.config.jwt_signing_key)
        .expect("JWT creation should succeed")
}

/// Drive one request through the router, returning status and parsed body
/// (Null for empty bodies).
#[allow(dead_code)]
pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Create a profile for the token's principal with sensible defaults.
#[allow(dead_code)]
pub async fn create_profile(app: &axum::Router, token: &str, name: &str) {
    let (status, _) = send(
        app,
        "POST",
        "/api/profile",
        Some(token),
        Some(json!({
            "name": name,
            "age": 30,
            "fitness_goals": "stay active",
            "selected_sport": "cycling",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT, "profile creation for {name}");
}
