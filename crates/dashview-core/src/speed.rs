// crates/dashview-core/src/speed.rs
//
// The fixed playback speed table. Stepping walks this list and stops at the
// ends; there is no free-form rate.

use serde::{Deserialize, Serialize};

use crate::error::SpeedError;
use crate::helpers::time::format_speed;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlaybackSpeed {
    X0,
    X0_25,
    X0_5,
    #[default]
    X1,
    X2,
    X5,
    X10,
    X20,
}

impl PlaybackSpeed {
    /// Ascending order; stepping indexes into this.
    pub const ALL: [PlaybackSpeed; 8] = [
        PlaybackSpeed::X0,
        PlaybackSpeed::X0_25,
        PlaybackSpeed::X0_5,
        PlaybackSpeed::X1,
        PlaybackSpeed::X2,
        PlaybackSpeed::X5,
        PlaybackSpeed::X10,
        PlaybackSpeed::X20,
    ];

    pub fn rate(self) -> f32 {
        match self {
            PlaybackSpeed::X0    => 0.0,
            PlaybackSpeed::X0_25 => 0.25,
            PlaybackSpeed::X0_5  => 0.5,
            PlaybackSpeed::X1    => 1.0,
            PlaybackSpeed::X2    => 2.0,
            PlaybackSpeed::X5    => 5.0,
            PlaybackSpeed::X10   => 10.0,
            PlaybackSpeed::X20   => 20.0,
        }
    }

    fn position(self) -> usize {
        self as usize
    }

    /// Next faster speed, or `None` at 20x.
    pub fn faster(self) -> Option<Self> {
        Self::ALL.get(self.position() + 1).copied()
    }

    /// Next slower speed, or `None` at 0x.
    pub fn slower(self) -> Option<Self> {
        self.position().checked_sub(1).map(|i| Self::ALL[i])
    }

    /// "0.25x", "1x", "20x".
    pub fn label(self) -> String {
        format_speed(self.rate())
    }
}

impl TryFrom<f32> for PlaybackSpeed {
    type Error = SpeedError;

    fn try_from(rate: f32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|s| (s.rate() - rate).abs() < f32::EPSILON)
            .ok_or(SpeedError::Unsupported(rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepping_up_from_1x_stops_at_20x() {
        let mut s = PlaybackSpeed::X1;
        let mut seen = Vec::new();
        for _ in 0..5 {
            s = s.faster().unwrap_or(s);
            seen.push(s.rate());
        }
        assert_eq!(seen, [2.0, 5.0, 10.0, 20.0, 20.0]);
    }

    #[test]
    fn stepping_down_from_1x_stops_at_0x() {
        let mut s = PlaybackSpeed::X1;
        let mut seen = Vec::new();
        for _ in 0..4 {
            s = s.slower().unwrap_or(s);
            seen.push(s.rate());
        }
        assert_eq!(seen, [0.5, 0.25, 0.0, 0.0]);
    }

    #[test]
    fn try_from_accepts_only_the_table() {
        assert_eq!(PlaybackSpeed::try_from(5.0), Ok(PlaybackSpeed::X5));
        assert_eq!(PlaybackSpeed::try_from(0.25), Ok(PlaybackSpeed::X0_25));
        assert_eq!(PlaybackSpeed::try_from(3.0), Err(SpeedError::Unsupported(3.0)));
    }

    #[test]
    fn labels() {
        assert_eq!(PlaybackSpeed::X0_25.label(), "0.25x");
        assert_eq!(PlaybackSpeed::X1.label(), "1x");
        assert_eq!(PlaybackSpeed::X20.label(), "20x");
    }
}
