// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod activity;
pub mod message;
pub mod principal;
pub mod profile;
pub mod role;

pub use activity::ActivityLog;
pub use message::Message;
pub use principal::Principal;
pub use profile::{Sport, UserProfile};
pub use role::UserRole;
