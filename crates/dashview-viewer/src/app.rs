// crates/dashview-viewer/src/app.rs
//
// Viewer: the single owner. Holds the PlaybackController and the background
// LibraryWorker, turns ViewerCommands into controller calls, and applies
// worker results on its own thread.
//
// Host loop, in order, as often as it likes:
//   viewer.poll();            // worker results
//   viewer.tick(Instant::now()); // progress sampler, rate-limited
//   for n in viewer.take_notices() { ... }

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use uuid::Uuid;

use dashview_core::commands::ViewerCommand;
use dashview_core::media_types::{DeleteReport, LibraryResult};
use dashview_core::{CameraAngle, Event, EventCatalog};
use dashview_media::scan::scan_events;
use dashview_media::{LibraryWorker, MediaBackend, PlayerEvent};

use crate::config::ViewerConfig;
use crate::controller::PlaybackController;

/// One-shot messages for the user (toasts, status bar, CLI output).
#[derive(Clone, Debug, PartialEq)]
pub enum ViewerNotice {
    FolderLoaded { root: PathBuf, events: usize, clips: usize },
    /// The folder had no recognisable clips; the previous catalog stays.
    NoRecordingsFound { root: PathBuf },
    ScanFailed { root: PathBuf, msg: String },
    DeletionFinished { report: DeleteReport },
}

pub struct Viewer<B: MediaBackend> {
    config:         ViewerConfig,
    controller:     PlaybackController<B>,
    worker:         LibraryWorker,
    pending_scan:   Option<Uuid>,
    /// Job id and the catalog generation it was started against.
    pending_delete: Option<(Uuid, u64)>,
    notices:        Vec<ViewerNotice>,
    last_sample:    Option<Instant>,
}

impl<B: MediaBackend> Viewer<B> {
    pub fn new(backend: B, config: ViewerConfig) -> Self {
        let config = config.sanitized();
        Self {
            controller:     PlaybackController::new(backend, config.clone()),
            config,
            worker:         LibraryWorker::new(),
            pending_scan:   None,
            pending_delete: None,
            notices:        Vec::new(),
            last_sample:    None,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn controller(&self) -> &PlaybackController<B> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlaybackController<B> {
        &mut self.controller
    }

    pub fn catalog(&self) -> &EventCatalog {
        self.controller.catalog()
    }

    /// True while a scan or deletion has not reported back.
    pub fn is_busy(&self) -> bool {
        self.pending_scan.is_some() || self.pending_delete.is_some()
    }

    pub fn take_notices(&mut self) -> Vec<ViewerNotice> {
        std::mem::take(&mut self.notices)
    }

    // ── Commands ─────────────────────────────────────────────────────────────

    /// Apply one command. While a deletion is running, commands that would
    /// start playback or open players for the files being deleted are refused.
    pub fn process_command(&mut self, cmd: ViewerCommand) {
        if self.pending_delete.is_some() && touches_players(&cmd) {
            log::debug!("[viewer] {cmd:?} refused while deleting");
            return;
        }
        match cmd {
            // ── Library ──────────────────────────────────────────────────────
            ViewerCommand::OpenFolder(path) => {
                self.open_folder(path);
            }
            ViewerCommand::Close => {
                self.pending_scan = None;
                self.controller.unload();
            }
            ViewerCommand::DeleteAllBackingFiles => {
                self.delete_all_backing_files();
            }

            // ── Playback ─────────────────────────────────────────────────────
            ViewerCommand::Play          => self.controller.play(),
            ViewerCommand::Pause         => self.controller.pause(),
            ViewerCommand::TogglePlay    => self.controller.toggle_play(),
            ViewerCommand::Seek(f)       => self.controller.seek(f),
            ViewerCommand::Restart       => self.controller.restart(),
            ViewerCommand::SetSpeed(s)   => self.controller.set_speed(s),
            ViewerCommand::IncreaseSpeed => {
                self.controller.increase_speed();
            }
            ViewerCommand::DecreaseSpeed => {
                self.controller.decrease_speed();
            }

            // ── Navigation ───────────────────────────────────────────────────
            ViewerCommand::NextEvent => {
                self.controller.next_event();
            }
            ViewerCommand::PreviousEvent => {
                self.controller.previous_event();
            }
            ViewerCommand::JumpToEvent(i) => {
                if !self.controller.jump_to(i) {
                    log::debug!("[viewer] jump to #{i} ignored");
                }
            }
        }
    }

    // ── Library ──────────────────────────────────────────────────────────────

    /// Start a background scan of `root`. Only the most recent scan's result
    /// is applied; earlier ones are discarded when they arrive.
    pub fn open_folder(&mut self, root: impl Into<PathBuf>) -> Uuid {
        let root = root.into();
        let id = self.worker.start_scan(root.clone(), self.config.extension.clone());
        log::info!("[viewer] scanning {} (job {id})", root.display());
        self.pending_scan = Some(id);
        id
    }

    /// Scan `root` on the calling thread and load the result. Returns the
    /// number of events loaded (0 leaves the previous catalog in place).
    pub fn open_folder_blocking(&mut self, root: impl AsRef<Path>) -> Result<usize> {
        let root = root.as_ref();
        self.pending_scan = None;
        let events = match scan_events(root, &self.config.extension) {
            Ok(events) => events,
            Err(e) => {
                self.notices.push(ViewerNotice::ScanFailed {
                    root: root.to_path_buf(),
                    msg:  format!("{e:#}"),
                });
                return Err(e);
            }
        };
        Ok(self.apply_scan(root.to_path_buf(), events))
    }

    fn apply_scan(&mut self, root: PathBuf, events: Vec<Event>) -> usize {
        if events.is_empty() {
            log::info!("[viewer] no recordings found in {}", root.display());
            self.notices.push(ViewerNotice::NoRecordingsFound { root });
            return 0;
        }
        let catalog = EventCatalog::new(events);
        let (events, clips) = (catalog.len(), catalog.clip_count());
        self.controller.load(catalog);
        self.notices.push(ViewerNotice::FolderLoaded { root, events, clips });
        events
    }

    /// Irreversibly delete every clip in the catalog on a worker thread.
    /// Playback is paused meanwhile; once the worker reports, the catalog is
    /// cleared unless it was replaced in the meantime. None if there is nothing
    /// to delete or a deletion is already running.
    pub fn delete_all_backing_files(&mut self) -> Option<Uuid> {
        if self.pending_delete.is_some() {
            log::warn!("[viewer] deletion already in progress");
            return None;
        }
        let paths = self.controller.catalog().backing_files();
        if paths.is_empty() {
            return None;
        }
        self.controller.pause();

        let generation = self.controller.generation();
        let id = self.worker.start_delete(paths);
        log::info!("[viewer] deleting all backing files (job {id})");
        self.pending_delete = Some((id, generation));
        Some(id)
    }

    // ── Owner loop ───────────────────────────────────────────────────────────

    /// Apply every worker result that has arrived. Returns how many were handled.
    pub fn poll(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(result) = self.worker.rx.try_recv() {
            self.handle_result(result);
            handled += 1;
        }
        handled
    }

    /// Block up to `timeout` for one worker result and apply it.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        match self.worker.rx.recv_timeout(timeout) {
            Ok(result) => {
                self.handle_result(result);
                true
            }
            Err(_) => false,
        }
    }

    /// Run the progress sampler if at least `sample_interval_ms` has passed
    /// since the last run. Returns whether it ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_sample {
            if now.saturating_duration_since(last) < self.config.sample_interval() {
                return false;
            }
        }
        self.last_sample = Some(now);
        self.controller.sample();
        true
    }

    /// Forward a notification from the media backend. `session_id` is the
    /// snapshot's `session_id` at the time the player was handed out.
    pub fn player_event(&mut self, session_id: u64, angle: CameraAngle, event: PlayerEvent) {
        self.controller.handle_player_event(session_id, angle, event);
    }

    /// Stop the worker from taking new jobs.
    pub fn shutdown(&mut self) {
        self.worker.shutdown();
    }

    fn handle_result(&mut self, result: LibraryResult) {
        match result {
            LibraryResult::ScanDone { job_id, root, events } => {
                if self.pending_scan != Some(job_id) {
                    log::debug!("[viewer] stale scan {job_id} for {} dropped", root.display());
                    return;
                }
                self.pending_scan = None;
                self.apply_scan(root, events);
            }
            LibraryResult::ScanFailed { job_id, root, msg } => {
                if self.pending_scan != Some(job_id) {
                    log::debug!("[viewer] stale scan failure {job_id} dropped");
                    return;
                }
                self.pending_scan = None;
                log::warn!("[viewer] scan of {} failed: {msg}", root.display());
                self.notices.push(ViewerNotice::ScanFailed { root, msg });
            }
            LibraryResult::DeleteDone { job_id, report } => {
                let Some((pending, generation)) = self.pending_delete else {
                    log::debug!("[viewer] unexpected delete result {job_id} dropped");
                    return;
                };
                if pending != job_id {
                    log::debug!("[viewer] stale delete result {job_id} dropped");
                    return;
                }
                self.pending_delete = None;
                log::info!(
                    "[viewer] deletion finished: {}/{} removed",
                    report.deleted,
                    report.attempted(),
                );
                for (path, err) in &report.failures {
                    log::warn!("[viewer] could not delete {}: {err}", path.display());
                }
                if self.controller.generation() == generation {
                    self.controller.unload();
                } else {
                    log::info!("[viewer] catalog replaced during deletion; keeping it");
                }
                self.notices.push(ViewerNotice::DeletionFinished { report });
            }
        }
    }
}

fn touches_players(cmd: &ViewerCommand) -> bool {
    matches!(
        cmd,
        ViewerCommand::Play
            | ViewerCommand::TogglePlay
            | ViewerCommand::NextEvent
            | ViewerCommand::PreviousEvent
            | ViewerCommand::JumpToEvent(_)
    )
}

impl<B: MediaBackend> Drop for Viewer<B> {
    fn drop(&mut self) {
        self.worker.shutdown();
    }
}
