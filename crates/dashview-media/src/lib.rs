// crates/dashview-media/src/lib.rs
//
// Filesystem and player side of dashview. Talks to the viewer through the
// LibraryWorker channel and the MediaBackend trait only.
//
// To add a new media capability:
//   1. Create a new module file here
//   2. Add `pub mod mymodule;` below
//   3. Call it from worker.rs (start_scan / start_delete or a new job)

pub mod delete;
pub mod player;
pub mod scan;
pub mod sim;
pub mod worker;

// Re-export the main public API so viewer imports stay short.
pub use player::{MediaBackend, MediaPlayer, PlayerEvent, PlayerStatus};
pub use sim::SimBackend;
pub use worker::LibraryWorker;
pub use dashview_core::media_types::{DeleteReport, LibraryResult};
