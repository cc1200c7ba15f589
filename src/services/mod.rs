// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod relationship;

pub use relationship::RelationshipEngine;
