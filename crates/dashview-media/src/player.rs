// crates/dashview-media/src/player.rs
//
// The narrow seam to whatever actually decodes and renders video. dashview
// never touches codecs; it loads one player per clip and drives it through
// these calls.

use std::path::Path;

use anyhow::Result;

/// Load state reported by a player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerStatus {
    /// Opened but duration not known yet.
    Loading,
    Ready,
    /// Decode or I/O failure after a successful load. The surface stays blank.
    Failed(String),
}

/// Notification a backend can push to the owner instead of waiting for the
/// next sample to observe a status change. The owner forwards it together with
/// the id of the session the player belongs to; ids of sessions that were torn
/// down in the meantime are ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerEvent {
    Ready,
    Failed(String),
}

/// One open clip.
pub trait MediaPlayer: Send {
    fn play(&mut self);
    fn pause(&mut self);
    fn set_rate(&mut self, rate: f32);
    /// Observed rate. May differ from the last `set_rate` if the player changed
    /// it on its own (e.g. stalled while buffering).
    fn rate(&self) -> f32;
    /// Absolute position in seconds. Out-of-range targets are clamped by the player.
    fn seek(&mut self, seconds: f64);
    fn position(&self) -> f64;
    /// `None` until the clip has loaded far enough to know.
    fn duration(&self) -> Option<f64>;
    fn status(&self) -> PlayerStatus;
}

/// Opens players. Dropping a player releases it.
pub trait MediaBackend {
    fn load(&self, path: &Path) -> Result<Box<dyn MediaPlayer>>;
}
