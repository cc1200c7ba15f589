// SPDX-License-Identifier: MIT

//! Per-day activity log model.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Cumulative exercise counters for one user on one date.
///
/// The values are absolute totals supplied by the caller (the client computes
/// increments); a repeat log for the same date replaces the stored record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityLog {
    /// Date string as supplied by the client (e.g. "2026-08-27").
    pub date: String,
    pub steps: u64,
    pub squats: u64,
    pub pushups: u64,
}
