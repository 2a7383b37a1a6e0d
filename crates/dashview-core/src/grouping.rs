// crates/dashview-core/src/grouping.rs
//
// Event grouper: loose per-camera clips → chronologically ordered events.

use std::collections::HashMap;

use crate::state::{CameraAngleClip, Event};

/// Group clips by event key. One event per distinct key, each stamped with the
/// earliest clip timestamp, sorted ascending by (timestamp, key). Single-angle
/// events are kept.
pub fn group_clips(clips: Vec<CameraAngleClip>) -> Vec<Event> {
    let mut by_key: HashMap<String, Vec<CameraAngleClip>> = HashMap::new();
    for clip in clips {
        by_key.entry(clip.event_key.clone()).or_default().push(clip);
    }

    let mut events: Vec<Event> = by_key
        .into_iter()
        .filter_map(|(key, group)| Event::from_clips(&key, group))
        .collect();

    events.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.name.cmp(&b.name)));
    events
}
