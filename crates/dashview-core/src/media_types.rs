// crates/dashview-core/src/media_types.rs
//
// Types that flow across the channel between dashview-media workers and the
// viewer. Plain data only.

use std::path::PathBuf;

use uuid::Uuid;

use crate::state::Event;

/// Outcome of a best-effort bulk deletion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub deleted:  usize,
    /// (path, error message) for every file that could not be removed.
    pub failures: Vec<(PathBuf, String)>,
}

impl DeleteReport {
    pub fn attempted(&self) -> usize {
        self.deleted + self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Results sent from the LibraryWorker background threads to the owner.
/// Every variant carries the job id it answers so stale results can be dropped.
#[derive(Debug)]
pub enum LibraryResult {
    /// Scan finished; `events` is already grouped and sorted (possibly empty).
    ScanDone    { job_id: Uuid, root: PathBuf, events: Vec<Event> },
    /// The root itself could not be walked.
    ScanFailed  { job_id: Uuid, root: PathBuf, msg: String },
    /// Every deletion was attempted.
    DeleteDone  { job_id: Uuid, report: DeleteReport },
}
