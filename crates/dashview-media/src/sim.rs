// crates/dashview-media/src/sim.rs
//
// Virtual-clock backend. Players hold no decoder; `SimBackend::advance` moves
// every live player forward by rate × seconds. Used by the headless CLI and by
// tests that need load failures, slow loads, rate glitches or leak checks.
//
// All handles share one Mutex-guarded registry so the backend can reach players
// it has handed out. Players register a Weak entry; dropping a player is
// enough to release it.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use anyhow::{bail, Result};
use parking_lot::Mutex;

use crate::player::{MediaBackend, MediaPlayer, PlayerStatus};

struct SimState {
    path:     PathBuf,
    duration: f64,
    position: f64,
    rate:     f32,
    ready:    bool,
    failed:   Option<String>,
}

struct SimShared {
    default_duration: f64,
    durations:        HashMap<PathBuf, f64>,
    load_failures:    HashSet<PathBuf>,
    deferred_ready:   bool,
    live:             Vec<Weak<Mutex<SimState>>>,
    loads:            Vec<PathBuf>,
}

impl SimShared {
    fn live(&mut self) -> Vec<Arc<Mutex<SimState>>> {
        self.live.retain(|w| w.strong_count() > 0);
        self.live.iter().filter_map(Weak::upgrade).collect()
    }
}

#[derive(Clone)]
pub struct SimBackend {
    shared: Arc<Mutex<SimShared>>,
}

impl SimBackend {
    /// Every clip lasts `default_duration` seconds unless overridden.
    pub fn new(default_duration: f64) -> Self {
        Self {
            shared: Arc::new(Mutex::new(SimShared {
                default_duration,
                durations:      HashMap::new(),
                load_failures:  HashSet::new(),
                deferred_ready: false,
                live:           Vec::new(),
                loads:          Vec::new(),
            })),
        }
    }

    pub fn with_duration(self, path: impl Into<PathBuf>, seconds: f64) -> Self {
        self.shared.lock().durations.insert(path.into(), seconds);
        self
    }

    /// Future loads of `path` fail outright.
    pub fn fail_loading(&self, path: impl Into<PathBuf>) {
        self.shared.lock().load_failures.insert(path.into());
    }

    /// While on, new players stay `Loading` (no duration) until `mark_ready`.
    pub fn defer_ready(&self, on: bool) {
        self.shared.lock().deferred_ready = on;
    }

    pub fn mark_ready(&self) {
        for p in self.shared.lock().live() {
            p.lock().ready = true;
        }
    }

    /// Move virtual time forward for every live, ready player.
    pub fn advance(&self, seconds: f64) {
        for p in self.shared.lock().live() {
            let mut s = p.lock();
            if s.ready && s.failed.is_none() {
                s.position = (s.position + s.rate as f64 * seconds).clamp(0.0, s.duration);
            }
        }
    }

    /// Put live players of `path` into the failed state.
    pub fn fail_player(&self, path: &Path, msg: &str) {
        for p in self.players_for(path) {
            p.lock().failed = Some(msg.to_string());
        }
    }

    /// Change a live player's rate behind the controller's back.
    pub fn force_rate(&self, path: &Path, rate: f32) {
        for p in self.players_for(path) {
            p.lock().rate = rate;
        }
    }

    pub fn live_players(&self) -> usize {
        self.shared.lock().live().len()
    }

    pub fn live_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.shared.lock().live().iter().map(|p| p.lock().path.clone()).collect();
        paths.sort();
        paths
    }

    /// Every path ever passed to `load`, in order.
    pub fn loads(&self) -> Vec<PathBuf> {
        self.shared.lock().loads.clone()
    }

    pub fn rate_of(&self, path: &Path) -> Option<f32> {
        self.players_for(path).first().map(|p| p.lock().rate)
    }

    pub fn position_of(&self, path: &Path) -> Option<f64> {
        self.players_for(path).first().map(|p| p.lock().position)
    }

    fn players_for(&self, path: &Path) -> Vec<Arc<Mutex<SimState>>> {
        self.shared
            .lock()
            .live()
            .into_iter()
            .filter(|p| p.lock().path == path)
            .collect()
    }
}

impl MediaBackend for SimBackend {
    fn load(&self, path: &Path) -> Result<Box<dyn MediaPlayer>> {
        let mut shared = self.shared.lock();
        shared.loads.push(path.to_path_buf());
        if shared.load_failures.contains(path) {
            bail!("simulated load failure for {}", path.display());
        }

        let duration = shared.durations.get(path).copied().unwrap_or(shared.default_duration);
        let state = Arc::new(Mutex::new(SimState {
            path:     path.to_path_buf(),
            duration: duration.max(0.0),
            position: 0.0,
            rate:     0.0,
            ready:    !shared.deferred_ready,
            failed:   None,
        }));
        shared.live.push(Arc::downgrade(&state));
        Ok(Box::new(SimPlayer { state }))
    }
}

pub struct SimPlayer {
    state: Arc<Mutex<SimState>>,
}

impl MediaPlayer for SimPlayer {
    fn play(&mut self) {
        self.state.lock().rate = 1.0;
    }

    fn pause(&mut self) {
        self.state.lock().rate = 0.0;
    }

    fn set_rate(&mut self, rate: f32) {
        self.state.lock().rate = rate;
    }

    fn rate(&self) -> f32 {
        self.state.lock().rate
    }

    fn seek(&mut self, seconds: f64) {
        let mut s = self.state.lock();
        s.position = if seconds.is_finite() { seconds.clamp(0.0, s.duration) } else { 0.0 };
    }

    fn position(&self) -> f64 {
        self.state.lock().position
    }

    fn duration(&self) -> Option<f64> {
        let s = self.state.lock();
        s.ready.then_some(s.duration)
    }

    fn status(&self) -> PlayerStatus {
        let s = self.state.lock();
        match (&s.failed, s.ready) {
            (Some(msg), _) => PlayerStatus::Failed(msg.clone()),
            (None, true)   => PlayerStatus::Ready,
            (None, false)  => PlayerStatus::Loading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_moves_by_rate_and_clamps_at_end() {
        let backend = SimBackend::new(10.0);
        let mut p = backend.load(Path::new("a.mp4")).unwrap();
        p.set_rate(2.0);
        backend.advance(3.0);
        assert_eq!(p.position(), 6.0);
        backend.advance(30.0);
        assert_eq!(p.position(), 10.0);
    }

    #[test]
    fn dropping_a_player_releases_it() {
        let backend = SimBackend::new(10.0);
        let a = backend.load(Path::new("a.mp4")).unwrap();
        let _b = backend.load(Path::new("b.mp4")).unwrap();
        assert_eq!(backend.live_players(), 2);
        drop(a);
        assert_eq!(backend.live_paths(), vec![PathBuf::from("b.mp4")]);
    }

    #[test]
    fn deferred_players_report_no_duration_until_ready() {
        let backend = SimBackend::new(10.0);
        backend.defer_ready(true);
        let p = backend.load(Path::new("a.mp4")).unwrap();
        assert_eq!(p.duration(), None);
        assert_eq!(p.status(), PlayerStatus::Loading);
        backend.mark_ready();
        assert_eq!(p.duration(), Some(10.0));
        assert_eq!(p.status(), PlayerStatus::Ready);
    }

    #[test]
    fn injected_failures() {
        let backend = SimBackend::new(10.0).with_duration("short.mp4", 2.0);
        backend.fail_loading("bad.mp4");
        assert!(backend.load(Path::new("bad.mp4")).is_err());

        let p = backend.load(Path::new("short.mp4")).unwrap();
        assert_eq!(p.duration(), Some(2.0));
        backend.fail_player(Path::new("short.mp4"), "decoder died");
        assert_eq!(p.status(), PlayerStatus::Failed("decoder died".into()));
        assert_eq!(backend.loads().len(), 2);
    }
}
