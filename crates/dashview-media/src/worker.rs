// crates/dashview-media/src/worker.rs
//
// LibraryWorker: runs folder scans and bulk deletions off the owner thread.
// All public API that dashview-viewer calls lives here.
//
// Workers only read the filesystem (scan) or remove files (delete); they never
// see playback state. Every job gets a Uuid that comes back with its result so
// the owner can drop answers it no longer cares about.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use uuid::Uuid;

use dashview_core::media_types::{DeleteReport, LibraryResult};

use crate::delete::delete_all;
use crate::scan::scan_events;

pub struct LibraryWorker {
    /// Scan and delete results. Drained by the owner with `try_recv`.
    pub rx:   Receiver<LibraryResult>,
    tx:       Sender<LibraryResult>,
    shutdown: Arc<AtomicBool>,
}

impl Default for LibraryWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl LibraryWorker {
    pub fn new() -> Self {
        let (tx, rx) = bounded(64);
        Self { rx, tx, shutdown: Arc::new(AtomicBool::new(false)) }
    }

    /// Refuse new jobs. Jobs already running finish and their results are
    /// still delivered; the owner decides whether to use them.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Walk `root` on a worker thread and send back grouped events.
    pub fn start_scan(&self, root: PathBuf, extension: String) -> Uuid {
        let job_id = Uuid::new_v4();
        let tx = self.tx.clone();
        let sd = self.shutdown.clone();

        thread::spawn(move || {
            if sd.load(Ordering::Relaxed) {
                let _ = tx.send(LibraryResult::ScanFailed {
                    job_id,
                    root,
                    msg: "worker shutting down".into(),
                });
                return;
            }
            let result = match scan_events(&root, &extension) {
                Ok(events) => LibraryResult::ScanDone { job_id, root, events },
                Err(e) => {
                    log::warn!("[worker] scan {job_id} failed: {e:#}");
                    LibraryResult::ScanFailed { job_id, root, msg: format!("{e:#}") }
                }
            };
            let _ = tx.send(result);
        });

        log::debug!("[worker] scan job {job_id} started");
        job_id
    }

    /// Delete `paths` on a worker thread. Exactly one `DeleteDone` is sent once
    /// every path has been attempted, whatever the individual outcomes.
    pub fn start_delete(&self, paths: Vec<PathBuf>) -> Uuid {
        let job_id = Uuid::new_v4();
        let tx = self.tx.clone();
        let sd = self.shutdown.clone();

        thread::spawn(move || {
            let report = if sd.load(Ordering::Relaxed) {
                DeleteReport {
                    deleted:  0,
                    failures: paths.into_iter().map(|p| (p, "worker shutting down".into())).collect(),
                }
            } else {
                delete_all(&paths)
            };
            let _ = tx.send(LibraryResult::DeleteDone { job_id, report });
        });

        log::debug!("[worker] delete job {job_id} started");
        job_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    #[test]
    fn scan_result_carries_its_job_id() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("2023-05-16_10-30-00-front.mp4"), b"").unwrap();

        let worker = LibraryWorker::new();
        let id = worker.start_scan(tmp.path().to_path_buf(), "mp4".into());
        match worker.rx.recv_timeout(Duration::from_secs(10)).unwrap() {
            LibraryResult::ScanDone { job_id, events, .. } => {
                assert_eq!(job_id, id);
                assert_eq!(events.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn scan_of_missing_root_reports_failure() {
        let worker = LibraryWorker::new();
        let id = worker.start_scan(PathBuf::from("/definitely/not/here"), "mp4".into());
        match worker.rx.recv_timeout(Duration::from_secs(10)).unwrap() {
            LibraryResult::ScanFailed { job_id, .. } => assert_eq!(job_id, id),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn delete_signals_once_even_with_failures() {
        let tmp = tempfile::tempdir().unwrap();
        let real = tmp.path().join("a.mp4");
        fs::write(&real, b"x").unwrap();
        let paths = vec![real.clone(), tmp.path().join("missing.mp4")];

        let worker = LibraryWorker::new();
        let id = worker.start_delete(paths);
        match worker.rx.recv_timeout(Duration::from_secs(10)).unwrap() {
            LibraryResult::DeleteDone { job_id, report } => {
                assert_eq!(job_id, id);
                assert_eq!(report.deleted, 1);
                assert_eq!(report.failures.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(!real.exists());
        assert!(worker.rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn shutdown_refuses_new_deletes() {
        let tmp = tempfile::tempdir().unwrap();
        let real = tmp.path().join("a.mp4");
        fs::write(&real, b"x").unwrap();

        let worker = LibraryWorker::new();
        worker.shutdown();
        worker.start_delete(vec![real.clone()]);
        match worker.rx.recv_timeout(Duration::from_secs(10)).unwrap() {
            LibraryResult::DeleteDone { report, .. } => assert_eq!(report.deleted, 0),
            other => panic!("unexpected {other:?}"),
        }
        assert!(real.exists());
    }
}
