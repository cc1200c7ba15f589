// SPDX-License-Identifier: MIT

//! Direct message model.

use crate::models::Principal;
use chrono::{DateTime, Utc};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A direct message between two principals. Immutable once stored.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Message {
    pub sender: Principal,
    pub receiver: Principal,
    pub content: String,
    /// Server-assigned send time, non-decreasing within a conversation.
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub timestamp: DateTime<Utc>,
    /// Global insertion sequence; breaks ties between equal timestamps.
    #[serde(skip)]
    pub seq: u64,
}
