// crates/dashview-viewer/src/controller.rs
//
// PlaybackController: the event catalog plus the one live PlaybackSession for
// its current event. Everything here runs on the owner thread.
//
// Invariants:
//   - at most one session is live for playback; a second one (`staged`) may
//     exist for the next event once read-ahead kicks in
//   - every navigation drops the old session before the new one is installed
//   - `playing == false` ⇒ every player has rate 0
//   - `generation` bumps on every catalog load/unload

use dashview_core::commands::LastAction;
use dashview_core::helpers::time::{format_clock, format_progress, format_speed};
use dashview_core::{CameraAngle, EventCatalog, PlaybackSpeed};
use dashview_media::{MediaBackend, PlayerEvent};
use crossbeam_channel::Receiver;

use crate::config::ViewerConfig;
use crate::session::PlaybackSession;
use crate::snapshot::{PlaybackSnapshot, PlaybackState, Subscribers};

/// Progress within this of 1.0 counts as the end of the event.
const END_EPSILON: f64 = 1e-3;

pub struct PlaybackController<B: MediaBackend> {
    backend:     B,
    config:      ViewerConfig,
    catalog:     EventCatalog,
    generation:  u64,
    next_id:     u64,
    session:     Option<PlaybackSession>,
    staged:      Option<PlaybackSession>,
    state:       PlaybackState,
    playing:     bool,
    user_speed:  PlaybackSpeed,
    progress:    f64,
    position:    f64,
    duration:    Option<f64>,
    last_action: LastAction,
    subscribers: Subscribers,
}

impl<B: MediaBackend> PlaybackController<B> {
    pub fn new(backend: B, config: ViewerConfig) -> Self {
        let user_speed = config.initial_speed;
        Self {
            backend,
            config,
            catalog:     EventCatalog::default(),
            generation:  0,
            next_id:     1,
            session:     None,
            staged:      None,
            state:       PlaybackState::Empty,
            playing:     false,
            user_speed,
            progress:    0.0,
            position:    0.0,
            duration:    None,
            last_action: LastAction::None,
            subscribers: Subscribers::default(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn user_speed(&self) -> PlaybackSpeed {
        self.user_speed
    }

    /// Rate the players should be running at right now.
    pub fn effective_speed(&self) -> f32 {
        if self.playing { self.user_speed.rate() } else { 0.0 }
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    /// Event index of the read-ahead session, if one is staged.
    pub fn staged_index(&self) -> Option<usize> {
        self.staged.as_ref().map(PlaybackSession::event_index)
    }

    // ── Catalog ──────────────────────────────────────────────────────────────

    /// Replace the catalog. Previous players are released first.
    pub fn load(&mut self, catalog: EventCatalog) {
        self.release_players();
        self.catalog = catalog;
        self.generation += 1;
        self.playing = false;
        self.last_action = LastAction::None;

        if self.catalog.current().is_some() {
            self.install_current();
            self.state = PlaybackState::Paused;
        } else {
            self.state = PlaybackState::Empty;
        }
        log::info!(
            "[playback] loaded {} event(s), {} clip(s) (generation {})",
            self.catalog.len(),
            self.catalog.clip_count(),
            self.generation,
        );
        self.publish();
    }

    /// Release every player and forget the catalog.
    pub fn unload(&mut self) {
        self.release_players();
        self.catalog.clear();
        self.generation += 1;
        self.playing = false;
        self.state = PlaybackState::Empty;
        self.reset_timing();
        log::info!("[playback] unloaded (generation {})", self.generation);
        self.publish();
    }

    // ── Transport ────────────────────────────────────────────────────────────

    pub fn play(&mut self) {
        if self.state == PlaybackState::Empty {
            return;
        }
        // Play on the finished last event starts it over. Anywhere else the
        // next sample moves on to the following event.
        if self.progress >= 1.0 - END_EPSILON && self.catalog.is_at_end() {
            if let Some(s) = self.session.as_mut() {
                s.seek_all(0.0);
            }
            self.refresh_timing();
        }
        self.playing = true;
        self.apply_rate();
        self.state = PlaybackState::Playing;
        self.last_action = LastAction::Play;
        self.publish();
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Empty {
            return;
        }
        self.playing = false;
        self.apply_rate();
        self.state = PlaybackState::Paused;
        self.last_action = LastAction::Pause;
        self.publish();
    }

    pub fn toggle_play(&mut self) {
        if self.playing { self.pause() } else { self.play() }
    }

    /// Move every player to `fraction` of the reference duration.
    pub fn seek(&mut self, fraction: f64) {
        if self.state == PlaybackState::Empty {
            return;
        }
        let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
        let resume = self.state;
        self.state = PlaybackState::Seeking;
        self.publish();

        let min = self.config.min_reference_duration;
        if let Some(session) = self.session.as_mut() {
            match session.reference_timing(min) {
                Some(timing) => session.seek_all(fraction * timing.duration),
                None if fraction == 0.0 => session.seek_all(0.0),
                None => log::debug!("[playback] seek to {fraction:.3} ignored: no duration yet"),
            }
        }
        self.refresh_timing();
        self.state = resume;
        self.publish();
    }

    pub fn restart(&mut self) {
        self.last_action = LastAction::Restart;
        self.seek(0.0);
    }

    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        self.user_speed = speed;
        if self.playing {
            self.apply_rate();
        }
        self.publish();
    }

    /// One step up the speed table. False (and nothing published) at the top.
    pub fn increase_speed(&mut self) -> bool {
        let Some(speed) = self.user_speed.faster() else { return false };
        self.last_action = LastAction::IncreaseSpeed;
        self.set_speed(speed);
        true
    }

    pub fn decrease_speed(&mut self) -> bool {
        let Some(speed) = self.user_speed.slower() else { return false };
        self.last_action = LastAction::DecreaseSpeed;
        self.set_speed(speed);
        true
    }

    // ── Navigation ───────────────────────────────────────────────────────────

    pub fn next_event(&mut self) -> bool {
        self.navigate(LastAction::NextEvent, EventCatalog::next)
    }

    pub fn previous_event(&mut self) -> bool {
        self.navigate(LastAction::PreviousEvent, EventCatalog::previous)
    }

    pub fn jump_to(&mut self, index: usize) -> bool {
        if self.catalog.current_index() == Some(index) {
            return false;
        }
        self.navigate(LastAction::None, |c| c.jump_to(index))
    }

    fn navigate(&mut self, action: LastAction, step: impl FnOnce(&mut EventCatalog) -> bool) -> bool {
        if !step(&mut self.catalog) {
            return false;
        }
        self.transition();
        if action != LastAction::None {
            self.last_action = action;
        }
        self.publish();
        true
    }

    // ── Sampler ──────────────────────────────────────────────────────────────

    /// One tick of the progress sampler. See the module docs for the order of
    /// steps; the owner calls this every `sample_interval_ms`.
    pub fn sample(&mut self) {
        if self.state == PlaybackState::Empty {
            return;
        }
        let rate = self.effective_speed();
        let min  = self.config.min_reference_duration;
        let skew = self.config.max_skew_secs;

        if let Some(session) = self.session.as_mut() {
            session.reap_failed();
            session.synchronize(rate, min, skew);
        }
        self.refresh_timing();
        self.stage_next();

        // An event with no player left can never reach the end on its own.
        let dead = self.session.as_ref().map_or(true, PlaybackSession::is_empty);
        if self.playing && (dead || self.progress >= 1.0 - END_EPSILON) {
            if dead {
                log::warn!("[playback] no playable angle in event #{:?}, skipping", self.catalog.current_index());
            }
            self.finish_event();
        }
        self.publish();
    }

    fn finish_event(&mut self) {
        if self.catalog.is_at_end() {
            log::info!("[playback] reached the end of the last event");
            self.playing = false;
            self.apply_rate();
            self.state = PlaybackState::Paused;
            return;
        }
        self.catalog.next();
        self.transition();
    }

    /// Read-ahead: build the next event's players once progress passes the
    /// threshold, so the switch at the end of this event is instant.
    fn stage_next(&mut self) {
        let threshold = self.config.read_ahead_threshold;
        if !self.playing || self.staged.is_some() || threshold >= 1.0 || self.progress < threshold {
            return;
        }
        let Some(next) = self.catalog.current_index().map(|i| i + 1) else { return };
        let Some(event) = self.catalog.get(next) else { return };
        log::debug!("[playback] staging {} (#{next})", event.name);
        let id = self.next_id;
        self.next_id += 1;
        self.staged = Some(PlaybackSession::build(&self.backend, event, next, id));
    }

    /// Tear down the current session and install one for the cursor's event.
    fn transition(&mut self) {
        let resume = if self.playing { PlaybackState::Playing } else { PlaybackState::Paused };
        self.state = PlaybackState::Transitioning;
        self.publish();

        self.session = None;
        self.install_current();
        self.state = resume;
    }

    fn install_current(&mut self) {
        self.reset_timing();
        let Some(index) = self.catalog.current_index() else {
            self.staged = None;
            return;
        };

        let session = match self.staged.take() {
            Some(staged) if staged.event_index() == index => {
                log::debug!("[playback] adopting staged session #{index}");
                staged
            }
            other => {
                drop(other);
                let Some(event) = self.catalog.current() else { return };
                let id = self.next_id;
                self.next_id += 1;
                PlaybackSession::build(&self.backend, event, index, id)
            }
        };
        self.session = Some(session);
        self.apply_rate();
        self.refresh_timing();
    }

    // ── Player notifications ─────────────────────────────────────────────────

    /// Apply a backend notification for `angle` of session `session_id`
    /// (`PlaybackSnapshot::session_id` when the player was handed out).
    /// Notifications for a session that is gone are dropped.
    pub fn handle_player_event(&mut self, session_id: u64, angle: CameraAngle, event: PlayerEvent) {
        let rate = self.effective_speed();
        let min  = self.config.min_reference_duration;

        if let Some(staged) = self.staged.as_mut().filter(|s| s.id() == session_id) {
            // Staged players sit paused at 0 and are resynced on adoption.
            if let PlayerEvent::Failed(m) = event {
                staged.mark_failed(angle, m);
            }
            return;
        }
        let Some(session) = self.session.as_mut().filter(|s| s.id() == session_id) else {
            log::debug!("[playback] {angle} notification for stale session {session_id} dropped");
            return;
        };

        let changed = match event {
            PlayerEvent::Ready     => session.resync_player(angle, rate, min),
            PlayerEvent::Failed(m) => session.mark_failed(angle, m),
        };
        if changed {
            self.refresh_timing();
            self.publish();
        }
    }

    // ── Publication ──────────────────────────────────────────────────────────

    pub fn subscribe(&mut self) -> Receiver<PlaybackSnapshot> {
        self.subscribers.subscribe()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let event   = self.catalog.current();
        let session = self.session.as_ref();
        let min     = self.config.min_reference_duration;
        let effective = self.effective_speed();

        let clock_label = match self.duration {
            Some(d) => format!("{} / {}", format_clock(self.position), format_clock(d)),
            None    => format_clock(self.position),
        };

        PlaybackSnapshot {
            state:           self.state,
            session_id:      session.map(PlaybackSession::id),
            event_index:     self.catalog.current_index(),
            event_count:     self.catalog.len(),
            event_name:      event.map(|e| e.name.clone()),
            event_timestamp: event.map(|e| e.timestamp),
            present_angles:  event.map(|e| e.angles().collect()).unwrap_or_default(),
            active_angles:   session.map(PlaybackSession::active_angles).unwrap_or_default(),
            failed_angles:   session.map(|s| s.failed().keys().copied().collect()).unwrap_or_default(),
            reference_angle: session.and_then(|s| s.reference(min)),
            playing:         self.playing,
            user_speed:      self.user_speed,
            effective_speed: effective,
            speed_label:     format_speed(effective),
            progress:        self.progress,
            progress_label:  format_progress(self.progress),
            position_secs:   self.position,
            duration_secs:   self.duration,
            clock_label,
            title:           self.catalog.title(),
            last_action:     self.last_action,
        }
    }

    fn publish(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        self.subscribers.publish(&snapshot);
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn release_players(&mut self) {
        self.staged  = None;
        self.session = None;
    }

    fn apply_rate(&mut self) {
        let rate = self.effective_speed();
        if let Some(s) = self.session.as_mut() {
            s.apply_rate(rate);
        }
    }

    fn reset_timing(&mut self) {
        self.progress = 0.0;
        self.position = 0.0;
        self.duration = None;
    }

    fn refresh_timing(&mut self) {
        let timing = self
            .session
            .as_ref()
            .and_then(|s| s.reference_timing(self.config.min_reference_duration));
        match timing {
            Some(t) if t.duration > 0.0 => {
                self.position = t.position;
                self.duration = Some(t.duration);
                self.progress = (t.position / t.duration).clamp(0.0, 1.0);
            }
            _ => self.reset_timing(),
        }
    }
}
