// crates/dashview-core/src/naming.rs
//
// Filename parser. Everything we know about a clip comes from its name:
//
//   current : 2023-05-16_10-30-00-left_repeater.mp4
//   legacy  : 2019_05_05_10_30-front.mp4   (also 2019-05-05_10-30-front.mp4)
//
// The event key is the name with the `-<token>` suffix and extension removed,
// so every angle of one recording shares it. Only the stem is examined; the
// extension filter belongs to the scanner.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::angle::CameraAngle;
use crate::error::NameError;

static CURRENT_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<key>(?P<y>\d{4})-(?P<mo>\d{2})-(?P<d>\d{2})_(?P<h>\d{2})-(?P<mi>\d{2})-(?P<s>\d{2}))-(?P<token>\w+)$",
    )
    .expect("current clip-name pattern is valid")
});

// Five numeric components, `_` or `-` between them, no seconds.
static LEGACY_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<key>(?P<y>\d{4})[-_](?P<mo>\d{2})[-_](?P<d>\d{2})[-_](?P<h>\d{2})[-_](?P<mi>\d{2}))-(?P<token>\w+)$",
    )
    .expect("legacy clip-name pattern is valid")
});

/// Which naming generation a clip came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameFormat {
    Current,
    Legacy,
}

/// Everything the parser extracts from one filename.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClipName {
    pub event_key: String,
    pub angle:     CameraAngle,
    pub timestamp: NaiveDateTime,
    pub format:    NameFormat,
}

/// Parse a clip path. Never panics; any mismatch is a `NameError` the caller
/// is expected to log and skip.
///
/// ```
/// use dashview_core::{parse_clip_name, CameraAngle};
/// let front = parse_clip_name("cam/2023-05-16_10-30-00-front.mp4").unwrap();
/// let left  = parse_clip_name("cam/2023-05-16_10-30-00-left_repeater.mp4").unwrap();
/// assert_eq!(front.event_key, left.event_key);
/// assert_eq!(left.angle, CameraAngle::Left);
/// assert!(parse_clip_name("cam/holiday.mp4").is_err());
/// ```
pub fn parse_clip_name(path: impl AsRef<Path>) -> Result<ClipName, NameError> {
    let stem = path
        .as_ref()
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or(NameError::NoFileName)?;

    if let Some(caps) = CURRENT_NAME.captures(stem) {
        return from_captures(&caps, NameFormat::Current);
    }
    if let Some(caps) = LEGACY_NAME.captures(stem) {
        return from_captures(&caps, NameFormat::Legacy);
    }
    Err(NameError::Unrecognized { stem: stem.to_string() })
}

fn from_captures(caps: &Captures<'_>, format: NameFormat) -> Result<ClipName, NameError> {
    let key   = &caps["key"];
    let token = &caps["token"];

    let angle = CameraAngle::from_token(token)
        .ok_or_else(|| NameError::UnknownAngle { token: token.to_string() })?;

    let invalid = || NameError::InvalidTimestamp { key: key.to_string() };
    let num = |name: &str| -> Result<u32, NameError> {
        caps.name(name)
            .map_or(Ok(0), |m| m.as_str().parse::<u32>().map_err(|_| invalid()))
    };

    let year = i32::try_from(num("y")?).map_err(|_| invalid())?;
    let (hour, minute, second) = (num("h")?, num("mi")?, num("s")?);
    let timestamp = NaiveDate::from_ymd_opt(year, num("mo")?, num("d")?)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .ok_or_else(invalid)?;

    Ok(ClipName {
        event_key: key.to_string(),
        angle,
        timestamp,
        format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn current_names_share_key_across_angles() {
        let names = [
            ("2023-05-16_10-30-00-front.mp4",          CameraAngle::Front),
            ("2023-05-16_10-30-00-left_repeater.mp4",  CameraAngle::Left),
            ("2023-05-16_10-30-00-right_repeater.mp4", CameraAngle::Right),
            ("2023-05-16_10-30-00-back.mp4",           CameraAngle::Back),
        ];
        for (name, angle) in names {
            let parsed = parse_clip_name(name).unwrap();
            assert_eq!(parsed.event_key, "2023-05-16_10-30-00");
            assert_eq!(parsed.angle, angle);
            assert_eq!(parsed.format, NameFormat::Current);
        }
    }

    #[test]
    fn current_timestamp_is_wall_clock() {
        let parsed = parse_clip_name("/a/b/2023-05-16_23-59-58-back.mp4").unwrap();
        let ts = parsed.timestamp;
        assert_eq!((ts.year(), ts.month(), ts.day()), (2023, 5, 16));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (23, 59, 58));
    }

    #[test]
    fn legacy_underscore_form() {
        let parsed = parse_clip_name("2019_05_05_10_30-right_repeater.mp4").unwrap();
        assert_eq!(parsed.event_key, "2019_05_05_10_30");
        assert_eq!(parsed.angle, CameraAngle::Right);
        assert_eq!(parsed.format, NameFormat::Legacy);
        assert_eq!(parsed.timestamp.minute(), 30);
        assert_eq!(parsed.timestamp.second(), 0);
    }

    #[test]
    fn legacy_mixed_separator_form() {
        let a = parse_clip_name("2019-05-05_10-30-front.mp4").unwrap();
        let b = parse_clip_name("2019-05-05_10-30-left_repeater.mp4").unwrap();
        assert_eq!(a.event_key, b.event_key);
        assert_eq!(a.format, NameFormat::Legacy);
    }

    #[test]
    fn unknown_token_is_an_error() {
        assert_eq!(
            parse_clip_name("2023-05-16_10-30-00-pillar.mp4"),
            Err(NameError::UnknownAngle { token: "pillar".into() }),
        );
    }

    #[test]
    fn malformed_names_fail_without_panicking() {
        let bad = [
            "",
            "holiday.mp4",
            "2023-05-16-front.mp4",                  // no time
            "2023-05-16_10-30-front-extra.mp4",      // token in the wrong place
            "2023-05-16_10-30-00-00-front.mp4",      // too many components
            "2023_05_16_10-front.mp4",               // too few components
            "copy of 2023-05-16_10-30-00-front.mp4", // prefix text
            "2023-05-16_10-30-00.mp4",               // no token
            "2023-05-16_10-30-00-.mp4",              // empty token
        ];
        for name in bad {
            assert!(parse_clip_name(name).is_err(), "{name:?} should not parse");
        }
    }

    #[test]
    fn out_of_range_components_are_invalid_timestamps() {
        assert!(matches!(
            parse_clip_name("2023-13-16_10-30-00-front.mp4"),
            Err(NameError::InvalidTimestamp { .. })
        ));
        assert!(matches!(
            parse_clip_name("2023-02-30_10-30-00-front.mp4"),
            Err(NameError::InvalidTimestamp { .. })
        ));
        assert!(matches!(
            parse_clip_name("2019_05_05_25_30-front.mp4"),
            Err(NameError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn extension_is_not_checked_here() {
        assert!(parse_clip_name("2023-05-16_10-30-00-front.MP4").is_ok());
    }
}
