// SPDX-License-Identifier: MIT

//! FitLink: social fitness backend.
//!
//! A single-process API over a social graph and its per-user records:
//! profiles, friend/follow relations, daily activity logs, direct messages
//! and role-based authorization.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use config::Config;
use services::RelationshipEngine;
use store::Store;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub relationships: RelationshipEngine,
}
