// crates/dashview-media/src/delete.rs
//
// Best-effort bulk deletion. A failed removal is recorded and the loop moves
// on; the report always covers every path that was handed in.

use std::io;
use std::path::{Path, PathBuf};

use dashview_core::media_types::DeleteReport;

/// Remove every path with `remove`, collecting failures instead of stopping.
pub fn delete_all_with<F>(paths: &[PathBuf], mut remove: F) -> DeleteReport
where
    F: FnMut(&Path) -> io::Result<()>,
{
    let mut report = DeleteReport::default();
    for path in paths {
        match remove(path) {
            Ok(()) => report.deleted += 1,
            Err(e) => {
                log::warn!("[delete] could not remove {}: {e}", path.display());
                report.failures.push((path.clone(), e.to_string()));
            }
        }
    }
    log::info!(
        "[delete] removed {} of {} file(s), {} failure(s)",
        report.deleted,
        report.attempted(),
        report.failures.len(),
    );
    report
}

/// Remove files from disk.
pub fn delete_all(paths: &[PathBuf]) -> DeleteReport {
    delete_all_with(paths, |p| std::fs::remove_file(p))
}
