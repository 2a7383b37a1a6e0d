// crates/dashview-viewer/src/lib.rs
//
// Owner side of dashview: configuration, the playback controller and the
// Viewer that ties it to the background library worker. A presentation
// surface drives a Viewer with ViewerCommands and reads PlaybackSnapshots.

pub mod app;
pub mod config;
pub mod controller;
pub mod helpers;
pub mod session;
pub mod snapshot;

pub use app::{Viewer, ViewerNotice};
pub use config::ViewerConfig;
pub use controller::PlaybackController;
pub use session::PlaybackSession;
pub use snapshot::{PlaybackSnapshot, PlaybackState};
