// SPDX-License-Identifier: MIT

//! API routes for authenticated callers.
//!
//! Every route here sits behind the auth middleware (applied in
//! routes/mod.rs), so handlers always have an `AuthUser` extension.
//! Ownership and role checks live in the individual handlers because the
//! permitted target differs per operation.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{ActivityLog, Principal, Sport, UserProfile, UserRole};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/profile",
            post(create_profile).put(save_profile).get(get_own_profile),
        )
        .route("/api/users/{principal}/profile", get(get_user_profile))
        .route("/api/friends/requests", post(send_friend_request))
        .route(
            "/api/friends/requests/{sender}/accept",
            post(accept_friend_request),
        )
        .route(
            "/api/friends/requests/{sender}/decline",
            post(decline_friend_request),
        )
        .route("/api/follows", post(follow_user))
        .route("/api/follows/{target}", delete(unfollow_user))
        .route("/api/activity", post(log_activity).get(get_own_activity))
        .route("/api/users/{principal}/activity", get(get_user_activity))
        .route("/api/messages", post(send_message))
        .route("/api/conversations/{other}", get(get_conversation))
        .route("/api/roles/{principal}", put(assign_role))
        .route("/api/role", get(get_role))
        .route("/api/role/admin", get(is_admin))
}

fn invalid(err: validator::ValidationErrors) -> AppError {
    AppError::InvalidArgument(err.to_string())
}

// ─── Profiles ────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CreateProfileRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(range(min = 1, message = "age must be positive"))]
    pub age: u32,
    pub fitness_goals: String,
    pub selected_sport: Sport,
}

/// Create the caller's profile. One per principal, ever.
async fn create_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateProfileRequest>,
) -> Result<StatusCode> {
    payload.validate().map_err(invalid)?;

    state.store.create_profile(
        &user.principal,
        payload.name,
        payload.age,
        payload.fitness_goals,
        payload.selected_sport,
        state.config.activity_public_default,
    )?;

    tracing::info!(caller = %user.principal, "Profile created");
    Ok(StatusCode::NO_CONTENT)
}

/// Save the caller's own profile.
///
/// The payload carries the full profile shape (the client round-trips what
/// it last read), but any relation sets in it are discarded: the store
/// re-attaches its authoritative sets, so relationships cannot be forged
/// through a save.
async fn save_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UserProfile>,
) -> Result<StatusCode> {
    if payload.age == 0 {
        return Err(AppError::InvalidArgument("age must be positive".to_string()));
    }
    if payload.name.is_empty() {
        return Err(AppError::InvalidArgument("name must not be empty".to_string()));
    }

    state.store.save_profile_fields(
        &user.principal,
        payload.name,
        payload.age,
        payload.fitness_goals,
        payload.selected_sport,
        payload.activity_public,
    )?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get the caller's own profile, or `null` if not yet created (the client
/// uses the null to route to onboarding).
async fn get_own_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Option<UserProfile>>> {
    Ok(Json(state.store.get_profile(&user.principal)?))
}

/// Get any user's profile.
///
/// The full profile, relation sets included, is visible to any authenticated
/// caller; only activity logs are gated by `activity_public`.
async fn get_user_profile(
    State(state): State<Arc<AppState>>,
    Path(principal): Path<Principal>,
) -> Result<Json<UserProfile>> {
    let profile = state
        .store
        .get_profile(&principal)?
        .ok_or_else(|| AppError::NotFound(format!("no profile for {}", principal)))?;
    Ok(Json(profile))
}

// ─── Friendships & Follows ───────────────────────────────────

#[derive(Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RelationRequest {
    pub target: Principal,
}

async fn send_friend_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<RelationRequest>,
) -> Result<StatusCode> {
    state
        .relationships
        .send_friend_request(&user.principal, &payload.target)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn accept_friend_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(sender): Path<Principal>,
) -> Result<StatusCode> {
    state
        .relationships
        .accept_friend_request(&user.principal, &sender)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn decline_friend_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(sender): Path<Principal>,
) -> Result<StatusCode> {
    state
        .relationships
        .decline_friend_request(&user.principal, &sender)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn follow_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<RelationRequest>,
) -> Result<StatusCode> {
    state.relationships.follow(&user.principal, &payload.target)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn unfollow_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(target): Path<Principal>,
) -> Result<StatusCode> {
    state.relationships.unfollow(&user.principal, &target)?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Activity Logs ───────────────────────────────────────────

#[derive(Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LogActivityRequest {
    #[validate(length(min = 1, message = "date must not be empty"))]
    pub date: String,
    /// Absolute cumulative values for the date, not deltas. Unsigned, so
    /// negative values are rejected at deserialization.
    pub steps: u64,
    pub squats: u64,
    pub pushups: u64,
}

/// Upsert the caller's activity log for one date (last write wins).
async fn log_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<LogActivityRequest>,
) -> Result<StatusCode> {
    payload.validate().map_err(invalid)?;

    state.store.upsert_activity(
        &user.principal,
        ActivityLog {
            date: payload.date,
            steps: payload.steps,
            squats: payload.squats,
            pushups: payload.pushups,
        },
    );
    Ok(StatusCode::NO_CONTENT)
}

/// All of the caller's own logs; always permitted. Ordering is left to the
/// consumer.
async fn get_own_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ActivityLog>>> {
    Ok(Json(state.store.activity_logs_for(&user.principal)))
}

/// Another user's logs, gated by their `activity_public` flag unless the
/// caller is the target or an admin.
async fn get_user_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(principal): Path<Principal>,
) -> Result<Json<Vec<ActivityLog>>> {
    let target = state
        .store
        .get_profile(&principal)?
        .ok_or_else(|| AppError::NotFound(format!("no profile for {}", principal)))?;

    let permitted = principal == user.principal
        || target.activity_public
        || state.store.is_admin(&user.principal);
    if !permitted {
        return Err(AppError::PermissionDenied(format!(
            "activity logs of {} are private",
            principal
        )));
    }

    Ok(Json(state.store.activity_logs_for(&principal)))
}

// ─── Messages ────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SendMessageRequest {
    pub to: Principal,
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MessageResponse {
    pub sender: Principal,
    pub receiver: Principal,
    pub content: String,
    /// RFC 3339 server timestamp
    pub timestamp: String,
}

impl From<crate::models::Message> for MessageResponse {
    fn from(message: crate::models::Message) -> Self {
        Self {
            sender: message.sender,
            receiver: message.receiver,
            content: message.content,
            timestamp: message.timestamp.to_rfc3339(),
        }
    }
}

/// Send a direct message. The server assigns the timestamp; success is the
/// only acknowledgement.
async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<Json<MessageResponse>> {
    payload.validate().map_err(invalid)?;
    if payload.to == user.principal {
        return Err(AppError::InvalidArgument(
            "cannot message yourself".to_string(),
        ));
    }
    if state.store.get_profile(&payload.to)?.is_none() {
        return Err(AppError::NotFound(format!("no profile for {}", payload.to)));
    }

    let message = state
        .store
        .append_message(&user.principal, &payload.to, payload.content);
    Ok(Json(message.into()))
}

/// The full conversation between the caller and `other`, both directions,
/// ascending by timestamp. Unbounded: there is no pagination in the
/// contract.
async fn get_conversation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(other): Path<Principal>,
) -> Result<Json<Vec<MessageResponse>>> {
    let messages = state
        .store
        .conversation(&user.principal, &other)
        .into_iter()
        .map(MessageResponse::from)
        .collect();
    Ok(Json(messages))
}

// ─── Roles ───────────────────────────────────────────────────

#[derive(Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AssignRoleRequest {
    pub role: UserRole,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RoleResponse {
    pub role: UserRole,
    pub is_admin: bool,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AdminResponse {
    pub is_admin: bool,
}

/// Assign a role to a principal. Admin only.
async fn assign_role(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(target): Path<Principal>,
    Json(payload): Json<AssignRoleRequest>,
) -> Result<StatusCode> {
    if !state.store.is_admin(&user.principal) {
        return Err(AppError::PermissionDenied(
            "only admins may assign roles".to_string(),
        ));
    }

    state.store.assign_role(&target, payload.role);
    tracing::info!(caller = %user.principal, target = %target, role = ?payload.role, "Role assigned");
    Ok(StatusCode::NO_CONTENT)
}

/// The caller's own role (default `user` when unassigned).
async fn get_role(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<RoleResponse>> {
    let role = state.store.role(&user.principal);
    Ok(Json(RoleResponse {
        role,
        is_admin: role.is_admin(),
    }))
}

async fn is_admin(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<AdminResponse>> {
    Ok(Json(AdminResponse {
        is_admin: state.store.is_admin(&user.principal),
    }))
}
