//! Controller state.

use serde::{Deserialize, Serialize};

/// Snapshot of a controller's playback.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub is_playing: bool,
    pub is_paused: bool,
    /// Aggregate progress in `[0, 1]`.
    pub progress: f64,
    /// Furthest element time, or the last seek position before playback.
    pub elapsed_ms: f64,
}

/// Where a controller is in its lifecycle.
///
/// ```text
/// Idle ── play ──▶ Playing ◀── resume ── Paused
///  ▲                  │  └──── pause ────▶ │
///  │                  ▼                    │
///  └──── reset ── Completed ◀──────────────┘
///
/// destroy: any ──▶ Destroyed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPhase {
    /// Built; nothing submitted to the timeline.
    #[default]
    Idle,
    Playing,
    Paused,
    /// Every element finished.
    Completed,
    /// Torn down; no further transitions.
    Destroyed,
}

impl PlaybackPhase {
    /// Handles are live and the cycle has not resolved.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }
}
