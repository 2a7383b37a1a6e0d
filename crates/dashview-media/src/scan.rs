// crates/dashview-media/src/scan.rs
//
// Directory scanner: recursive walk → parsed per-camera clips.
//
// Per-entry walk errors and unparseable names are logged and skipped; only a
// missing or non-directory root fails the scan as a whole.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use rayon::prelude::*;
use walkdir::{DirEntry, WalkDir};

use dashview_core::{group_clips, CameraAngleClip, Event};

/// Walk `root` and return every clip whose name parses, in path order.
///
/// Hidden files and directories (leading `.`) are skipped, symlinks are not
/// followed, and only regular files whose lowercased extension equals the
/// lowercased `extension` are considered.
pub fn scan_directory(root: &Path, extension: &str) -> Result<Vec<CameraAngleClip>> {
    if !root.is_dir() {
        bail!("'{}' is not a readable directory", root.display());
    }

    let wanted = extension.trim_start_matches('.').to_lowercase();
    let mut candidates: Vec<PathBuf> = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("[scan] skipping unreadable entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if has_extension(entry.path(), &wanted) {
            candidates.push(entry.into_path());
        }
    }

    // Parsing is independent per file; collect() keeps the walk order.
    let clips: Vec<CameraAngleClip> = candidates
        .into_par_iter()
        .filter_map(|path| match CameraAngleClip::from_path(path.clone()) {
            Ok(clip) => Some(clip),
            Err(e) => {
                log::debug!("[scan] ignoring {}: {e}", path.display());
                None
            }
        })
        .collect();

    log::info!("[scan] {} clip(s) under {}", clips.len(), root.display());
    Ok(clips)
}

/// Scan and group in one step.
pub fn scan_events(root: &Path, extension: &str) -> Result<Vec<Event>> {
    let clips  = scan_directory(root, extension)?;
    let events = group_clips(clips);
    log::info!("[scan] {} event(s) under {}", events.len(), root.display());
    Ok(events)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().map_or(false, |s| s.starts_with('.'))
}

fn has_extension(path: &Path, wanted_lower: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.to_lowercase() == wanted_lower)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashview_core::CameraAngle;
    use std::fs;

    fn touch(dir: &Path, rel: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn finds_clips_recursively_and_skips_noise() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        touch(root, "SavedClips/2023-05-16_10-30-00-front.mp4");
        touch(root, "SavedClips/2023-05-16_10-30-00-left_repeater.MP4");
        touch(root, "SentryClips/2023_05_16_11_00-back.mp4");
        touch(root, "SentryClips/thumb.png");
        touch(root, "SentryClips/event.json");
        touch(root, "2023-05-16_10-30-00-pillar.mp4");        // unknown angle
        touch(root, "notes.mp4");                              // unparseable
        touch(root, ".hidden/2023-05-16_12-00-00-front.mp4");  // hidden dir
        touch(root, ".2023-05-16_12-00-00-back.mp4");          // hidden file
        fs::create_dir_all(root.join("2023-05-16_13-00-00-front.mp4")).unwrap(); // a directory

        let clips = scan_directory(root, "mp4").unwrap();
        let angles: Vec<_> = clips.iter().map(|c| c.angle).collect();
        assert_eq!(clips.len(), 3, "{clips:?}");
        assert!(angles.contains(&CameraAngle::Front));
        assert!(angles.contains(&CameraAngle::Left));
        assert!(angles.contains(&CameraAngle::Back));
    }

    #[test]
    fn extension_filter_is_case_insensitive_and_dot_tolerant() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "2023-05-16_10-30-00-front.Mp4");
        assert_eq!(scan_directory(tmp.path(), ".MP4").unwrap().len(), 1);
        assert_eq!(scan_directory(tmp.path(), "mov").unwrap().len(), 0);
    }

    #[test]
    fn missing_root_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(scan_directory(&tmp.path().join("nope"), "mp4").is_err());
    }

    #[test]
    fn scan_events_groups_by_key() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        touch(root, "a/2023-05-16_10-30-00-front.mp4");
        touch(root, "b/2023-05-16_10-30-00-back.mp4");
        touch(root, "2023-05-16_09-00-00-front.mp4");

        let events = scan_events(root, "mp4").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "2023-05-16_09-00-00");
        assert_eq!(events[1].clip_count(), 2);
    }
}
