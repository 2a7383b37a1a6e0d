// crates/dashview-core/src/commands.rs
//
// Every user action in dashview is expressed as a ViewerCommand.
// A presentation surface emits these; the Viewer processes them on its owner
// thread. Adding a feature = add a variant here + one match arm in the viewer.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::speed::PlaybackSpeed;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerCommand {
    // ── Library ──────────────────────────────────────────────────────────────
    /// Scan a folder in the background and replace the catalog with the result.
    OpenFolder(PathBuf),
    /// Drop the catalog and every player.
    Close,
    /// Irreversibly delete every clip in the catalog. Confirmation is the
    /// caller's job; nothing else in dashview deletes files.
    DeleteAllBackingFiles,

    // ── Playback ─────────────────────────────────────────────────────────────
    Play,
    Pause,
    TogglePlay,
    /// Normalised position in the current event; clamped to [0, 1].
    Seek(f64),
    Restart,
    SetSpeed(PlaybackSpeed),
    IncreaseSpeed,
    DecreaseSpeed,

    // ── Navigation ───────────────────────────────────────────────────────────
    NextEvent,
    PreviousEvent,
    JumpToEvent(usize),
}

/// Last user-visible transport action, published for toast-style feedback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LastAction {
    #[default]
    None,
    Play,
    Pause,
    IncreaseSpeed,
    DecreaseSpeed,
    NextEvent,
    PreviousEvent,
    Restart,
}
