// crates/dashview-viewer/src/snapshot.rs
//
// What a presentation surface sees. The controller builds a PlaybackSnapshot
// after every state change and pushes it to each subscriber; surfaces never
// hold a reference into controller state.

use chrono::NaiveDateTime;
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::Serialize;

use dashview_core::commands::LastAction;
use dashview_core::{CameraAngle, PlaybackSpeed};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PlaybackState {
    /// No catalog loaded.
    Empty,
    Paused,
    Playing,
    /// A seek is being applied to every player.
    Seeking,
    /// Players of one event are being torn down and the next one built.
    Transitioning,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    pub state:           PlaybackState,
    /// Tag for player notifications about the current session's players.
    pub session_id:      Option<u64>,
    pub event_index:     Option<usize>,
    pub event_count:     usize,
    pub event_name:      Option<String>,
    pub event_timestamp: Option<NaiveDateTime>,
    /// Angles the current event has clips for.
    pub present_angles:  Vec<CameraAngle>,
    /// Angles with a live player.
    pub active_angles:   Vec<CameraAngle>,
    pub failed_angles:   Vec<CameraAngle>,
    pub reference_angle: Option<CameraAngle>,
    pub playing:         bool,
    pub user_speed:      PlaybackSpeed,
    /// Rate actually applied to players: `user_speed` while playing, else 0.
    pub effective_speed: f32,
    pub speed_label:     String,
    pub progress:        f64,
    pub progress_label:  String,
    pub position_secs:   f64,
    pub duration_secs:   Option<f64>,
    pub clock_label:     String,
    pub title:           String,
    pub last_action:     LastAction,
}

impl PlaybackSnapshot {
    pub fn is_empty(&self) -> bool {
        self.state == PlaybackState::Empty
    }

    /// Angles that are present but have no player (failed or not loaded).
    pub fn blank_angles(&self) -> Vec<CameraAngle> {
        self.present_angles
            .iter()
            .copied()
            .filter(|a| !self.active_angles.contains(a))
            .collect()
    }
}

/// Fan-out of snapshots. Subscribers whose receiver was dropped are pruned on
/// the next publish.
#[derive(Default)]
pub struct Subscribers {
    senders: Vec<Sender<PlaybackSnapshot>>,
}

impl Subscribers {
    pub fn subscribe(&mut self) -> Receiver<PlaybackSnapshot> {
        let (tx, rx) = unbounded();
        self.senders.push(tx);
        rx
    }

    pub fn publish(&mut self, snapshot: &PlaybackSnapshot) {
        self.senders.retain(|tx| tx.send(snapshot.clone()).is_ok());
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}
