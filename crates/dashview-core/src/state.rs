// crates/dashview-core/src/state.rs
//
// Clip, event and catalog data. Pure values: no player handles, no threads.
// Serializable so the CLI can print a catalog as JSON.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::angle::CameraAngle;
use crate::error::NameError;
use crate::naming::parse_clip_name;

/// One physical video file from one camera.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraAngleClip {
    pub angle:     CameraAngle,
    pub path:      PathBuf,
    pub timestamp: NaiveDateTime,
    pub event_key: String,
}

impl CameraAngleClip {
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, NameError> {
        let path = path.into();
        let name = parse_clip_name(&path)?;
        Ok(Self {
            angle:     name.angle,
            timestamp: name.timestamp,
            event_key: name.event_key,
            path,
        })
    }
}

/// A recording session: up to one clip per camera angle, all sharing one key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub name:      String,
    pub timestamp: NaiveDateTime,
    /// Angle → clip. Any angle may be missing.
    pub clips:     BTreeMap<CameraAngle, CameraAngleClip>,
}

impl Event {
    /// Builds an event from clips that share `key`. Returns `None` when no
    /// clip is given, so an empty event can never exist.
    ///
    /// Clips whose key differs from `key` are ignored. When two files claim the
    /// same angle, the one with the smaller path wins.
    pub fn from_clips(key: &str, clips: Vec<CameraAngleClip>) -> Option<Self> {
        let mut clips: Vec<_> = clips.into_iter().filter(|c| c.event_key == key).collect();
        clips.sort_by(|a, b| a.path.cmp(&b.path));

        let timestamp = clips.iter().map(|c| c.timestamp).min()?;

        let mut by_angle: BTreeMap<CameraAngle, CameraAngleClip> = BTreeMap::new();
        for clip in clips {
            if let Some(kept) = by_angle.get(&clip.angle) {
                log::warn!(
                    "[group] {key}: duplicate {} clip {} ignored, keeping {}",
                    clip.angle,
                    clip.path.display(),
                    kept.path.display(),
                );
                continue;
            }
            by_angle.insert(clip.angle, clip);
        }

        Some(Self { name: key.to_string(), timestamp, clips: by_angle })
    }

    pub fn clip(&self, angle: CameraAngle) -> Option<&CameraAngleClip> {
        self.clips.get(&angle)
    }

    /// Present angles in priority order.
    pub fn angles(&self) -> impl Iterator<Item = CameraAngle> + '_ {
        self.clips.keys().copied()
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> + '_ {
        self.clips.values().map(|c| c.path.as_path())
    }
}

/// Ordered events plus a cursor.
///
/// `current` is `None` exactly when `events` is empty; every mutation keeps it
/// inside `[0, len)`. Navigation never wraps.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventCatalog {
    events:  Vec<Event>,
    current: Option<usize>,
}

impl EventCatalog {
    pub fn new(events: Vec<Event>) -> Self {
        let mut catalog = Self::default();
        catalog.load(events);
        catalog
    }

    /// Replace the whole catalog and reset the cursor.
    pub fn load(&mut self, mut events: Vec<Event>) {
        events.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.name.cmp(&b.name)));
        self.current = if events.is_empty() { None } else { Some(0) };
        self.events  = events;
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.current = None;
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&Event> {
        self.current.and_then(|i| self.events.get(i))
    }

    /// True when the cursor sits on the last event (or the catalog is empty).
    pub fn is_at_end(&self) -> bool {
        self.current.map_or(true, |i| i + 1 >= self.events.len())
    }

    /// Advance the cursor. Returns whether it moved.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        match self.current {
            Some(i) if i + 1 < self.events.len() => {
                self.current = Some(i + 1);
                true
            }
            _ => false,
        }
    }

    /// Step the cursor back. Returns whether it moved.
    pub fn previous(&mut self) -> bool {
        match self.current {
            Some(i) if i > 0 => {
                self.current = Some(i - 1);
                true
            }
            _ => false,
        }
    }

    /// Set the cursor directly. Out-of-range indices leave it untouched.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index < self.events.len() {
            self.current = Some(index);
            true
        } else {
            false
        }
    }

    /// Number of files across every angle of every event.
    pub fn clip_count(&self) -> usize {
        self.events.iter().map(Event::clip_count).sum()
    }

    /// Every backing file, in catalog order.
    pub fn backing_files(&self) -> Vec<PathBuf> {
        self.events
            .iter()
            .flat_map(|e| e.paths().map(Path::to_path_buf))
            .collect()
    }

    /// Window title: "Video 2/7", or "No videos loaded".
    pub fn title(&self) -> String {
        match self.current {
            Some(i) => format!("Video {}/{}", i + 1, self.events.len()),
            None    => "No videos loaded".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(name: &str) -> CameraAngleClip {
        CameraAngleClip::from_path(format!("/cam/{name}")).unwrap()
    }

    fn event(key: &str, angles: &[&str]) -> Event {
        let clips = angles.iter().map(|a| clip(&format!("{key}-{a}.mp4"))).collect();
        Event::from_clips(key, clips).unwrap()
    }

    fn three_events() -> EventCatalog {
        EventCatalog::new(vec![
            event("2023-05-16_12-00-00", &["front"]),
            event("2023-05-16_10-00-00", &["front", "back"]),
            event("2023-05-16_11-00-00", &["front", "left_repeater", "right_repeater", "back"]),
        ])
    }

    #[test]
    fn empty_event_is_never_built() {
        assert!(Event::from_clips("2023-05-16_10-00-00", Vec::new()).is_none());
    }

    #[test]
    fn missing_angles_are_absent_not_assumed() {
        let e = event("2023-05-16_10-00-00", &["front", "back"]);
        assert!(e.clip(CameraAngle::Left).is_none());
        assert!(e.clip(CameraAngle::Right).is_none());
        assert_eq!(e.angles().collect::<Vec<_>>(), vec![CameraAngle::Front, CameraAngle::Back]);
    }

    #[test]
    fn duplicate_angle_keeps_smallest_path() {
        let a = CameraAngleClip::from_path("/b/2023-05-16_10-00-00-front.mp4").unwrap();
        let b = CameraAngleClip::from_path("/a/2023-05-16_10-00-00-front.mp4").unwrap();
        let e = Event::from_clips("2023-05-16_10-00-00", vec![a, b]).unwrap();
        assert_eq!(e.clip_count(), 1);
        assert_eq!(e.clip(CameraAngle::Front).unwrap().path, PathBuf::from("/a/2023-05-16_10-00-00-front.mp4"));
    }

    #[test]
    fn load_sorts_and_resets_cursor() {
        let mut c = three_events();
        assert_eq!(c.current_index(), Some(0));
        assert_eq!(c.current().unwrap().name, "2023-05-16_10-00-00");
        assert!(c.next());
        c.load(vec![event("2023-05-17_10-00-00", &["front"])]);
        assert_eq!(c.current_index(), Some(0));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn cursor_is_clamped_at_both_ends() {
        let mut c = three_events();
        assert!(!c.previous());
        assert_eq!(c.current_index(), Some(0));
        assert!(c.next());
        assert!(c.next());
        assert!(c.is_at_end());
        assert!(!c.next());
        assert_eq!(c.current_index(), Some(2));
        assert!(c.previous());
        assert_eq!(c.current_index(), Some(1));
    }

    #[test]
    fn empty_catalog_navigation_is_a_no_op() {
        let mut c = EventCatalog::default();
        assert!(!c.next());
        assert!(!c.previous());
        assert!(!c.jump_to(0));
        assert_eq!(c.current_index(), None);
        assert!(c.current().is_none());
        assert_eq!(c.title(), "No videos loaded");
    }

    #[test]
    fn jump_to_rejects_out_of_range() {
        let mut c = three_events();
        assert!(c.jump_to(2));
        assert!(!c.jump_to(3));
        assert_eq!(c.current_index(), Some(2));
        assert_eq!(c.title(), "Video 3/3");
    }

    #[test]
    fn counts_and_backing_files() {
        let mut c = three_events();
        assert_eq!(c.clip_count(), 7);
        assert_eq!(c.backing_files().len(), 7);
        c.clear();
        assert!(c.is_empty());
        assert_eq!(c.current_index(), None);
    }
}
