// crates/dashview-core/src/angle.rs
//
// Camera feeds recorded by the vehicle. Declaration order doubles as the
// reference-player priority (front > left > right > back), so a BTreeMap keyed
// by CameraAngle iterates in priority order for free.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CameraAngle {
    Front,
    Left,
    Right,
    Back,
}

impl CameraAngle {
    /// All angles in reference-priority order.
    pub const ALL: [CameraAngle; 4] = [
        CameraAngle::Front,
        CameraAngle::Left,
        CameraAngle::Right,
        CameraAngle::Back,
    ];

    /// Maps the trailing filename token to an angle.
    ///
    /// ```
    /// use dashview_core::CameraAngle;
    /// assert_eq!(CameraAngle::from_token("left_repeater"), Some(CameraAngle::Left));
    /// assert_eq!(CameraAngle::from_token("pillar"), None);
    /// ```
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "front"          => Some(CameraAngle::Front),
            "left_repeater"  => Some(CameraAngle::Left),
            "right_repeater" => Some(CameraAngle::Right),
            "back"           => Some(CameraAngle::Back),
            _                => None,
        }
    }

    /// The token this angle carries in a filename.
    pub fn token(self) -> &'static str {
        match self {
            CameraAngle::Front => "front",
            CameraAngle::Left  => "left_repeater",
            CameraAngle::Right => "right_repeater",
            CameraAngle::Back  => "back",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CameraAngle::Front => "front",
            CameraAngle::Left  => "left",
            CameraAngle::Right => "right",
            CameraAngle::Back  => "back",
        }
    }
}

impl std::fmt::Display for CameraAngle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
