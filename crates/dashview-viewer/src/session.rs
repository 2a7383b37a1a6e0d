// crates/dashview-viewer/src/session.rs
//
// PlaybackSession: the players for one event. Built in one go, dropped in one
// go, so no handle outlives the event it was opened for.
//
// An angle whose clip fails to load (or whose player later reports Failed)
// moves to `failed`; the remaining angles carry on. The Event itself is never
// touched.

use std::collections::BTreeMap;

use dashview_core::{CameraAngle, Event};
use dashview_media::{MediaBackend, MediaPlayer, PlayerStatus};

const RATE_EPSILON: f32 = 1e-3;

/// Position/duration of the player that stands in for the whole event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReferenceTiming {
    pub angle:    CameraAngle,
    pub position: f64,
    pub duration: f64,
}

/// What one `synchronize` pass had to correct.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub rates_fixed: usize,
    pub reseeked:    usize,
}

pub struct PlaybackSession {
    id:          u64,
    event_index: usize,
    event_name:  String,
    players:     BTreeMap<CameraAngle, Box<dyn MediaPlayer>>,
    failed:      BTreeMap<CameraAngle, String>,
}

impl PlaybackSession {
    /// Open one paused player per present angle of `event`. `id` tags player
    /// notifications so late ones from a torn-down session can be told apart.
    pub fn build<B: MediaBackend + ?Sized>(backend: &B, event: &Event, event_index: usize, id: u64) -> Self {
        let mut players = BTreeMap::new();
        let mut failed  = BTreeMap::new();

        for (angle, clip) in &event.clips {
            match backend.load(&clip.path) {
                Ok(mut player) => {
                    player.pause();
                    players.insert(*angle, player);
                }
                Err(e) => {
                    log::warn!("[playback] {}: {angle} failed to load: {e:#}", event.name);
                    failed.insert(*angle, format!("{e:#}"));
                }
            }
        }

        log::debug!(
            "[playback] session for {} (#{event_index}): {} player(s), {} failed",
            event.name,
            players.len(),
            failed.len(),
        );
        Self { id, event_index, event_name: event.name.clone(), players, failed }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn event_index(&self) -> usize {
        self.event_index
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    /// No player left: every clip failed to load or was reaped.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn active_angles(&self) -> Vec<CameraAngle> {
        self.players.keys().copied().collect()
    }

    pub fn failed(&self) -> &BTreeMap<CameraAngle, String> {
        &self.failed
    }

    pub fn player(&self, angle: CameraAngle) -> Option<&dyn MediaPlayer> {
        self.players.get(&angle).map(|p| p.as_ref())
    }

    /// First angle in priority order whose duration exceeds `min_duration`,
    /// else the first with any positive duration, else none.
    pub fn reference(&self, min_duration: f64) -> Option<CameraAngle> {
        let with_duration = |pred: &dyn Fn(f64) -> bool| {
            self.players
                .iter()
                .find(|(_, p)| p.duration().map_or(false, pred))
                .map(|(angle, _)| *angle)
        };
        with_duration(&|d| d > min_duration).or_else(|| with_duration(&|d| d > 0.0))
    }

    pub fn reference_timing(&self, min_duration: f64) -> Option<ReferenceTiming> {
        let angle    = self.reference(min_duration)?;
        let player   = self.players.get(&angle)?;
        let duration = player.duration()?;
        Some(ReferenceTiming { angle, position: player.position(), duration })
    }

    /// Apply one rate to every player; 0 pauses.
    pub fn apply_rate(&mut self, rate: f32) {
        for player in self.players.values_mut() {
            drive(player.as_mut(), rate);
        }
    }

    /// Put every player at the same absolute time.
    pub fn seek_all(&mut self, seconds: f64) {
        for player in self.players.values_mut() {
            player.seek(seconds);
        }
    }

    /// Bring one player in line with the rest, e.g. after it became ready.
    pub fn resync_player(&mut self, angle: CameraAngle, rate: f32, min_duration: f64) -> bool {
        let target = self
            .reference_timing(min_duration)
            .filter(|t| t.angle != angle)
            .map(|t| t.position);
        let Some(player) = self.players.get_mut(&angle) else { return false };
        if let Some(position) = target {
            player.seek(position);
        }
        drive(player.as_mut(), rate);
        true
    }

    /// Move players that report `Failed` into the failed set. Returns the
    /// angles that were dropped.
    pub fn reap_failed(&mut self) -> Vec<CameraAngle> {
        let dead: Vec<(CameraAngle, String)> = self
            .players
            .iter()
            .filter_map(|(angle, p)| match p.status() {
                PlayerStatus::Failed(msg) => Some((*angle, msg)),
                _ => None,
            })
            .collect();

        dead.into_iter()
            .map(|(angle, msg)| {
                self.mark_failed(angle, msg);
                angle
            })
            .collect()
    }

    /// Drop the player for `angle` and remember why. False if it was not active.
    pub fn mark_failed(&mut self, angle: CameraAngle, msg: String) -> bool {
        if self.players.remove(&angle).is_none() {
            return false;
        }
        log::warn!("[playback] {}: {angle} player failed: {msg}", self.event_name);
        self.failed.insert(angle, msg);
        true
    }

    /// Re-apply `rate` to any player whose observed rate drifted from it, then
    /// re-seek secondaries more than `max_skew` seconds away from the reference.
    /// A secondary that is shorter than the reference's position is left at its end.
    pub fn synchronize(&mut self, rate: f32, min_duration: f64, max_skew: f64) -> SyncReport {
        let mut report = SyncReport::default();

        for (angle, player) in self.players.iter_mut() {
            if (player.rate() - rate).abs() > RATE_EPSILON {
                log::debug!("[playback] {angle} rate {} ≠ {rate}, re-applying", player.rate());
                drive(player.as_mut(), rate);
                report.rates_fixed += 1;
            }
        }

        let Some(reference) = self.reference_timing(min_duration) else { return report };
        for (angle, player) in self.players.iter_mut() {
            if *angle == reference.angle {
                continue;
            }
            let Some(duration) = player.duration() else { continue };
            if reference.position >= duration {
                continue;
            }
            if (player.position() - reference.position).abs() > max_skew {
                log::debug!(
                    "[playback] {angle} at {:.2}s, reference {} at {:.2}s, re-seeking",
                    player.position(),
                    reference.angle,
                    reference.position,
                );
                player.seek(reference.position);
                report.reseeked += 1;
            }
        }
        report
    }
}

fn drive(player: &mut dyn MediaPlayer, rate: f32) {
    if rate > 0.0 {
        player.play();
        player.set_rate(rate);
    } else {
        player.pause();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashview_core::CameraAngleClip;
    use dashview_media::SimBackend;
    use std::path::Path;

    fn event(angles: &[&str]) -> Event {
        let key = "2023-05-16_10-00-00";
        let clips = angles
            .iter()
            .map(|a| CameraAngleClip::from_path(format!("/cam/{key}-{a}.mp4")).unwrap())
            .collect();
        Event::from_clips(key, clips).unwrap()
    }

    fn path(angle: &str) -> String {
        format!("/cam/2023-05-16_10-00-00-{angle}.mp4")
    }

    #[test]
    fn load_failure_blanks_only_that_angle() {
        let backend = SimBackend::new(60.0);
        backend.fail_loading(path("left_repeater"));
        let s = PlaybackSession::build(&backend, &event(&["front", "left_repeater", "back"]), 0, 1);
        assert_eq!(s.active_angles(), vec![CameraAngle::Front, CameraAngle::Back]);
        assert!(s.failed().contains_key(&CameraAngle::Left));
    }

    #[test]
    fn reference_prefers_priority_order_above_threshold() {
        let backend = SimBackend::new(60.0).with_duration(path("front"), 0.2);
        let s = PlaybackSession::build(&backend, &event(&["front", "right_repeater", "back"]), 0, 1);
        // Front is too short to trust; right is next in priority.
        assert_eq!(s.reference(1.0), Some(CameraAngle::Right));
    }

    #[test]
    fn reference_falls_back_to_any_loaded_player() {
        let backend = SimBackend::new(0.5);
        let s = PlaybackSession::build(&backend, &event(&["back", "left_repeater"]), 0, 1);
        assert_eq!(s.reference(1.0), Some(CameraAngle::Left));
    }

    #[test]
    fn no_reference_while_everything_is_loading() {
        let backend = SimBackend::new(60.0);
        backend.defer_ready(true);
        let s = PlaybackSession::build(&backend, &event(&["front"]), 0, 1);
        assert_eq!(s.reference_timing(1.0), None);
    }

    #[test]
    fn synchronize_fixes_rate_and_skew() {
        let backend = SimBackend::new(60.0);
        let mut s = PlaybackSession::build(&backend, &event(&["front", "back"]), 0, 1);
        s.apply_rate(2.0);
        backend.advance(5.0);
        backend.force_rate(Path::new(&path("back")), 0.0);
        backend.advance(5.0); // back stalls at 10s while front reaches 20s

        let report = s.synchronize(2.0, 1.0, 0.5);
        assert_eq!(report, SyncReport { rates_fixed: 1, reseeked: 1 });
        assert_eq!(backend.rate_of(Path::new(&path("back"))), Some(2.0));
        assert_eq!(backend.position_of(Path::new(&path("back"))), Some(20.0));
    }

    #[test]
    fn shorter_secondary_is_left_at_its_end() {
        let backend = SimBackend::new(60.0).with_duration(path("back"), 10.0);
        let mut s = PlaybackSession::build(&backend, &event(&["front", "back"]), 0, 1);
        s.apply_rate(1.0);
        backend.advance(30.0);
        assert_eq!(s.synchronize(1.0, 1.0, 0.5).reseeked, 0);
    }

    #[test]
    fn dropping_the_session_releases_players() {
        let backend = SimBackend::new(60.0);
        let s = PlaybackSession::build(&backend, &event(&["front", "left_repeater", "right_repeater", "back"]), 0, 1);
        assert_eq!(backend.live_players(), 4);
        drop(s);
        assert_eq!(backend.live_players(), 0);
    }

    #[test]
    fn reaped_players_leave_the_session() {
        let backend = SimBackend::new(60.0);
        let mut s = PlaybackSession::build(&backend, &event(&["front", "back"]), 0, 1);
        backend.fail_player(Path::new(&path("back")), "decode error");
        assert_eq!(s.reap_failed(), vec![CameraAngle::Back]);
        assert_eq!(s.active_angles(), vec![CameraAngle::Front]);
        assert_eq!(backend.live_players(), 1);

        backend.fail_player(Path::new(&path("front")), "decode error");
        s.reap_failed();
        assert!(s.is_empty());
    }
}
