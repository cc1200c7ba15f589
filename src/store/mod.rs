// SPDX-License-Identifier: MIT

//! In-memory state store.
//!
//! One process owns all records. The profiles table sits behind a single
//! `RwLock` so that any mutation touching two profiles commits as one atomic
//! unit and readers never observe a half-applied relation. Activity logs,
//! conversations and roles live in sharded `DashMap`s keyed independently of
//! the profiles lock.

use crate::error::AppError;
use crate::models::{ActivityLog, Message, Principal, Sport, UserProfile, UserRole};
use anyhow::anyhow;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Profile table guarded by the single writer lock.
pub(crate) type ProfileTable = HashMap<Principal, UserProfile>;

struct StoreInner {
    profiles: RwLock<ProfileTable>,
    /// Keyed by (principal, date).
    activity: DashMap<(Principal, String), ActivityLog>,
    /// Keyed by the canonical (ordered) principal pair; values stay in
    /// insertion order with non-decreasing timestamps.
    conversations: DashMap<(Principal, Principal), Vec<Message>>,
    roles: DashMap<Principal, UserRole>,
    message_seq: AtomicU64,
}

/// Typed storage facade shared across handlers.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                profiles: RwLock::new(HashMap::new()),
                activity: DashMap::new(),
                conversations: DashMap::new(),
                roles: DashMap::new(),
                message_seq: AtomicU64::new(0),
            }),
        }
    }

    /// Create a store with the given principals pre-assigned the admin role.
    pub fn with_admins<I>(admins: I) -> Self
    where
        I: IntoIterator<Item = Principal>,
    {
        let store = Self::new();
        for admin in admins {
            tracing::info!(principal = %admin, "Seeding admin role");
            store.inner.roles.insert(admin, UserRole::Admin);
        }
        store
    }

    // ─── Profile Table Locks ─────────────────────────────────────

    /// Read access to the profile table.
    pub(crate) fn profiles(&self) -> Result<RwLockReadGuard<'_, ProfileTable>, AppError> {
        self.inner
            .profiles
            .read()
            .map_err(|_| AppError::Internal(anyhow!("profile table lock poisoned")))
    }

    /// Write access to the profile table. Everything mutated while this
    /// guard is held commits as one atomic unit.
    pub(crate) fn profiles_mut(&self) -> Result<RwLockWriteGuard<'_, ProfileTable>, AppError> {
        self.inner
            .profiles
            .write()
            .map_err(|_| AppError::Internal(anyhow!("profile table lock poisoned")))
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Create a profile for `caller`. Fails if one already exists.
    pub fn create_profile(
        &self,
        caller: &Principal,
        name: String,
        age: u32,
        fitness_goals: String,
        selected_sport: Sport,
        activity_public: bool,
    ) -> Result<(), AppError> {
        let mut profiles = self.profiles_mut()?;
        if profiles.contains_key(caller) {
            return Err(AppError::AlreadyExists(format!(
                "profile for {} already exists",
                caller
            )));
        }
        profiles.insert(
            caller.clone(),
            UserProfile::new(name, age, fitness_goals, selected_sport, activity_public),
        );
        Ok(())
    }

    /// Get a profile by principal.
    pub fn get_profile(&self, target: &Principal) -> Result<Option<UserProfile>, AppError> {
        Ok(self.profiles()?.get(target).cloned())
    }

    /// Update the scalar fields of the caller's own profile.
    ///
    /// The relation sets are never taken from the caller's payload: the
    /// server-held sets stay attached, so a client cannot forge
    /// relationships through a profile save.
    pub fn save_profile_fields(
        &self,
        caller: &Principal,
        name: String,
        age: u32,
        fitness_goals: String,
        selected_sport: Sport,
        activity_public: bool,
    ) -> Result<(), AppError> {
        let mut profiles = self.profiles_mut()?;
        let profile = profiles
            .get_mut(caller)
            .ok_or_else(|| AppError::NotFound(format!("no profile for {}", caller)))?;

        profile.name = name;
        profile.age = age;
        profile.fitness_goals = fitness_goals;
        profile.selected_sport = selected_sport;
        profile.activity_public = activity_public;
        Ok(())
    }

    // ─── Activity Operations ─────────────────────────────────────

    /// Upsert the activity log for (caller, date). Last write wins; the
    /// DashMap entry lock serializes racing upserts for the same key.
    pub fn upsert_activity(&self, caller: &Principal, log: ActivityLog) {
        self.inner
            .activity
            .insert((caller.clone(), log.date.clone()), log);
    }

    /// All activity logs for one user, in no contractual order.
    pub fn activity_logs_for(&self, user: &Principal) -> Vec<ActivityLog> {
        self.inner
            .activity
            .iter()
            .filter(|entry| &entry.key().0 == user)
            .map(|entry| entry.value().clone())
            .collect()
    }

    // ─── Message Operations ──────────────────────────────────────

    /// Append a message, assigning the server timestamp and sequence.
    ///
    /// The timestamp is clamped to be non-decreasing within the conversation
    /// so that sorting by (timestamp, seq) matches insertion order.
    pub fn append_message(
        &self,
        sender: &Principal,
        receiver: &Principal,
        content: String,
    ) -> Message {
        let key = Principal::canonical_pair(sender, receiver);
        let mut conversation = self.inner.conversations.entry(key).or_default();

        let mut timestamp = chrono::Utc::now();
        if let Some(last) = conversation.last() {
            if timestamp < last.timestamp {
                timestamp = last.timestamp;
            }
        }

        let message = Message {
            sender: sender.clone(),
            receiver: receiver.clone(),
            content,
            timestamp,
            seq: self.inner.message_seq.fetch_add(1, Ordering::Relaxed),
        };
        conversation.push(message.clone());
        message
    }

    /// All messages between `a` and `b`, both directions, ascending by
    /// timestamp and stable by insertion order for equal timestamps.
    pub fn conversation(&self, a: &Principal, b: &Principal) -> Vec<Message> {
        let key = Principal::canonical_pair(a, b);
        let mut messages = self
            .inner
            .conversations
            .get(&key)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        messages.sort_by(|x, y| x.timestamp.cmp(&y.timestamp).then(x.seq.cmp(&y.seq)));
        messages
    }

    // ─── Role Operations ─────────────────────────────────────────

    /// Role of a principal, defaulting to `user` when unassigned.
    pub fn role(&self, principal: &Principal) -> UserRole {
        self.inner
            .roles
            .get(principal)
            .map(|entry| *entry.value())
            .unwrap_or_default()
    }

    pub fn is_admin(&self, principal: &Principal) -> bool {
        self.role(principal).is_admin()
    }

    /// Set a principal's role, creating the record if absent. The caller is
    /// responsible for the admin check.
    pub fn assign_role(&self, target: &Principal, role: UserRole) {
        self.inner.roles.insert(target.clone(), role);
    }
}
