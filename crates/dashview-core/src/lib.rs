// crates/dashview-core/src/lib.rs
//
// Pure data for dashview: no threads, no filesystem writes, no player handles.
// Used by dashview-media (scan/delete workers) and dashview-viewer (owner).

pub mod angle;
pub mod commands;
pub mod error;
pub mod grouping;
pub mod helpers;
pub mod media_types;
pub mod naming;
pub mod speed;
pub mod state;

pub use angle::CameraAngle;
pub use error::{NameError, SpeedError};
pub use grouping::group_clips;
pub use naming::{parse_clip_name, ClipName};
pub use speed::PlaybackSpeed;
pub use state::{CameraAngleClip, Event, EventCatalog};
