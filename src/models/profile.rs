// SPDX-License-Identifier: MIT

//! User profile model and the fixed sport catalogue.

use crate::models::Principal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Sport selected on a profile (fixed catalogue of ten values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Sport {
    Baseball,
    Basketball,
    Swimming,
    Volleyball,
    Football,
    Yoga,
    Cycling,
    Tennis,
    Skiing,
    Badminton,
}

/// A user's profile, keyed by their principal.
///
/// The scalar fields (name, age, goals, sport, activity_public) are owned by
/// the profile's owner. The four relation sets are owned by the relationship
/// engine: handlers and clients may read them, only the engine writes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserProfile {
    pub name: String,
    /// Age in years (always positive).
    pub age: u32,
    /// Free-text fitness goals.
    pub fitness_goals: String,
    pub selected_sport: Sport,
    /// Whether activity logs are visible to other (non-admin) users.
    pub activity_public: bool,
    /// Mutual friendships (symmetric across both profiles).
    #[serde(default)]
    pub friends: BTreeSet<Principal>,
    /// Principals this user follows.
    #[serde(default)]
    pub following: BTreeSet<Principal>,
    /// Principals following this user (inverse view of their `following`).
    #[serde(default)]
    pub followers: BTreeSet<Principal>,
    /// Incoming, unaccepted friend requests.
    #[serde(default)]
    pub friend_requests: BTreeSet<Principal>,
}

impl UserProfile {
    /// Create a fresh profile with empty relation sets.
    pub fn new(
        name: String,
        age: u32,
        fitness_goals: String,
        selected_sport: Sport,
        activity_public: bool,
    ) -> Self {
        Self {
            name,
            age,
            fitness_goals,
            selected_sport,
            activity_public,
            friends: BTreeSet::new(),
            following: BTreeSet::new(),
            followers: BTreeSet::new(),
            friend_requests: BTreeSet::new(),
        }
    }
}
