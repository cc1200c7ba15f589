// SPDX-License-Identifier: MIT

//! Relationship engine: friend-request lifecycle and follow/unfollow.
//!
//! This is the only writer of the relation sets on `UserProfile`. Every
//! mutation that touches two profiles runs under the store's single profile
//! write lock, so the symmetric (`friends`) and inverse
//! (`following`/`followers`) pairs can never diverge or be observed
//! half-applied.

use crate::error::AppError;
use crate::models::Principal;
use crate::store::{ProfileTable, Store};

#[derive(Clone)]
pub struct RelationshipEngine {
    store: Store,
}

impl RelationshipEngine {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    fn ensure_exists(profiles: &ProfileTable, principal: &Principal) -> Result<(), AppError> {
        if profiles.contains_key(principal) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("no profile for {}", principal)))
        }
    }

    /// Record a friend request from `caller` to `target`.
    ///
    /// Idempotent while a request is pending; fails once they are friends.
    pub fn send_friend_request(
        &self,
        caller: &Principal,
        target: &Principal,
    ) -> Result<(), AppError> {
        if caller == target {
            return Err(AppError::InvalidArgument(
                "cannot send a friend request to yourself".to_string(),
            ));
        }

        let mut profiles = self.store.profiles_mut()?;
        Self::ensure_exists(&profiles, caller)?;

        let target_profile = profiles
            .get_mut(target)
            .ok_or_else(|| AppError::NotFound(format!("no profile for {}", target)))?;

        if target_profile.friends.contains(caller) {
            return Err(AppError::AlreadyFriends);
        }
        if !target_profile.friend_requests.insert(caller.clone()) {
            tracing::debug!(caller = %caller, target = %target, "Friend request already pending");
        }
        Ok(())
    }

    /// Accept the pending request from `sender` to `caller`, establishing
    /// friendship on both profiles atomically.
    pub fn accept_friend_request(
        &self,
        caller: &Principal,
        sender: &Principal,
    ) -> Result<(), AppError> {
        let mut profiles = self.store.profiles_mut()?;
        Self::ensure_exists(&profiles, caller)?;
        Self::ensure_exists(&profiles, sender)?;

        let caller_profile = profiles
            .get_mut(caller)
            .ok_or_else(|| AppError::NotFound(format!("no profile for {}", caller)))?;
        if !caller_profile.friend_requests.remove(sender) {
            return Err(AppError::NotFound(format!(
                "no pending friend request from {}",
                sender
            )));
        }
        caller_profile.friends.insert(sender.clone());

        // Both profiles were checked above, so the symmetric side cannot fail
        // after the first half has been applied. A pending request in the
        // opposite direction is consumed too: a request may only be pending
        // while the pair is not yet friends.
        if let Some(sender_profile) = profiles.get_mut(sender) {
            sender_profile.friends.insert(caller.clone());
            sender_profile.friend_requests.remove(caller);
        }

        tracing::info!(caller = %caller, sender = %sender, "Friend request accepted");
        Ok(())
    }

    /// Decline the pending request from `sender` to `caller`.
    ///
    /// Resets the pair to its initial state; the sender may request again.
    pub fn decline_friend_request(
        &self,
        caller: &Principal,
        sender: &Principal,
    ) -> Result<(), AppError> {
        let mut profiles = self.store.profiles_mut()?;
        let caller_profile = profiles
            .get_mut(caller)
            .ok_or_else(|| AppError::NotFound(format!("no profile for {}", caller)))?;

        if !caller_profile.friend_requests.remove(sender) {
            return Err(AppError::NotFound(format!(
                "no pending friend request from {}",
                sender
            )));
        }
        Ok(())
    }

    /// Follow `target`. Idempotent; both sides updated atomically.
    pub fn follow(&self, caller: &Principal, target: &Principal) -> Result<(), AppError> {
        if caller == target {
            return Err(AppError::InvalidArgument(
                "cannot follow yourself".to_string(),
            ));
        }

        let mut profiles = self.store.profiles_mut()?;
        Self::ensure_exists(&profiles, caller)?;
        Self::ensure_exists(&profiles, target)?;

        if let Some(caller_profile) = profiles.get_mut(caller) {
            if !caller_profile.following.insert(target.clone()) {
                return Ok(()); // already following
            }
        }
        if let Some(target_profile) = profiles.get_mut(target) {
            target_profile.followers.insert(caller.clone());
        }
        Ok(())
    }

    /// Unfollow `target`. Idempotent; both sides updated atomically.
    pub fn unfollow(&self, caller: &Principal, target: &Principal) -> Result<(), AppError> {
        let mut profiles = self.store.profiles_mut()?;
        Self::ensure_exists(&profiles, caller)?;
        Self::ensure_exists(&profiles, target)?;

        if let Some(caller_profile) = profiles.get_mut(caller) {
            caller_profile.following.remove(target);
        }
        if let Some(target_profile) = profiles.get_mut(target) {
            target_profile.followers.remove(caller);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sport;

    fn p(id: &str) -> Principal {
        Principal::from(id)
    }

    fn setup(users: &[&str]) -> (Store, RelationshipEngine) {
        let store = Store::new();
        for user in users {
            store
                .create_profile(
                    &p(user),
                    user.to_string(),
                    30,
                    String::new(),
                    Sport::Cycling,
                    false,
                )
                .unwrap();
        }
        (store.clone(), RelationshipEngine::new(store))
    }

    #[test]
    fn test_accept_establishes_symmetric_friendship() {
        let (store, engine) = setup(&["alice", "bob"]);

        engine.send_friend_request(&p("alice"), &p("bob")).unwrap();
        engine.accept_friend_request(&p("bob"), &p("alice")).unwrap();

        let alice = store.get_profile(&p("alice")).unwrap().unwrap();
        let bob = store.get_profile(&p("bob")).unwrap().unwrap();
        assert!(alice.friends.contains(&p("bob")));
        assert!(bob.friends.contains(&p("alice")));
        assert!(bob.friend_requests.is_empty());
    }

    #[test]
    fn test_duplicate_request_is_idempotent() {
        let (store, engine) = setup(&["alice", "bob"]);

        engine.send_friend_request(&p("alice"), &p("bob")).unwrap();
        engine.send_friend_request(&p("alice"), &p("bob")).unwrap();

        let bob = store.get_profile(&p("bob")).unwrap().unwrap();
        assert_eq!(bob.friend_requests.len(), 1);
    }

    #[test]
    fn test_request_after_friendship_fails() {
        let (_, engine) = setup(&["alice", "bob"]);

        engine.send_friend_request(&p("alice"), &p("bob")).unwrap();
        engine.accept_friend_request(&p("bob"), &p("alice")).unwrap();

        let err = engine.send_friend_request(&p("alice"), &p("bob")).unwrap_err();
        assert!(matches!(err, AppError::AlreadyFriends));
        // Symmetric direction too
        let err = engine.send_friend_request(&p("bob"), &p("alice")).unwrap_err();
        assert!(matches!(err, AppError::AlreadyFriends));
    }

    #[test]
    fn test_self_request_is_invalid() {
        let (_, engine) = setup(&["alice"]);
        let err = engine.send_friend_request(&p("alice"), &p("alice")).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn test_decline_resets_pair_to_initial_state() {
        let (store, engine) = setup(&["alice", "bob"]);

        engine.send_friend_request(&p("alice"), &p("bob")).unwrap();
        engine.decline_friend_request(&p("bob"), &p("alice")).unwrap();

        let bob = store.get_profile(&p("bob")).unwrap().unwrap();
        assert!(!bob.friends.contains(&p("alice")));
        assert!(!bob.friend_requests.contains(&p("alice")));

        // The pair is back to its initial state, so a repeat send succeeds
        engine.send_friend_request(&p("alice"), &p("bob")).unwrap();
        let bob = store.get_profile(&p("bob")).unwrap().unwrap();
        assert!(bob.friend_requests.contains(&p("alice")));
    }

    #[test]
    fn test_accept_consumes_crossed_requests() {
        let (store, engine) = setup(&["alice", "bob"]);

        engine.send_friend_request(&p("alice"), &p("bob")).unwrap();
        engine.send_friend_request(&p("bob"), &p("alice")).unwrap();
        engine.accept_friend_request(&p("bob"), &p("alice")).unwrap();

        // Accepting one side consumes the crossed request as well: requests
        // only stay pending while the pair is not yet friends.
        let alice = store.get_profile(&p("alice")).unwrap().unwrap();
        let bob = store.get_profile(&p("bob")).unwrap().unwrap();
        assert!(alice.friend_requests.is_empty());
        assert!(bob.friend_requests.is_empty());
        assert!(alice.friends.contains(&p("bob")));
        assert!(bob.friends.contains(&p("alice")));
    }

    #[test]
    fn test_accept_without_request_fails() {
        let (_, engine) = setup(&["alice", "bob"]);
        let err = engine.accept_friend_request(&p("bob"), &p("alice")).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_follow_unfollow_round_trip() {
        let (store, engine) = setup(&["alice", "bob"]);

        let before_alice = store.get_profile(&p("alice")).unwrap().unwrap();
        let before_bob = store.get_profile(&p("bob")).unwrap().unwrap();

        engine.follow(&p("alice"), &p("bob")).unwrap();

        let alice = store.get_profile(&p("alice")).unwrap().unwrap();
        let bob = store.get_profile(&p("bob")).unwrap().unwrap();
        assert!(alice.following.contains(&p("bob")));
        assert!(bob.followers.contains(&p("alice")));
        // Following is independent of friendship
        assert!(alice.friends.is_empty());

        engine.unfollow(&p("alice"), &p("bob")).unwrap();

        let alice = store.get_profile(&p("alice")).unwrap().unwrap();
        let bob = store.get_profile(&p("bob")).unwrap().unwrap();
        assert_eq!(alice.following, before_alice.following);
        assert_eq!(bob.followers, before_bob.followers);
    }

    #[test]
    fn test_follow_is_idempotent() {
        let (store, engine) = setup(&["alice", "bob"]);

        engine.follow(&p("alice"), &p("bob")).unwrap();
        engine.follow(&p("alice"), &p("bob")).unwrap();
        engine.unfollow(&p("alice"), &p("bob")).unwrap();
        engine.unfollow(&p("alice"), &p("bob")).unwrap();

        let alice = store.get_profile(&p("alice")).unwrap().unwrap();
        assert!(alice.following.is_empty());
    }

    #[test]
    fn test_follow_self_is_invalid() {
        let (_, engine) = setup(&["alice"]);
        let err = engine.follow(&p("alice"), &p("alice")).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn test_relationship_ops_require_profiles() {
        let (_, engine) = setup(&["alice"]);

        let err = engine.send_friend_request(&p("alice"), &p("ghost")).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = engine.follow(&p("ghost"), &p("alice")).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
