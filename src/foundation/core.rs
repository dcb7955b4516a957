use crate::foundation::error::{SyncError, SyncResult};

pub use kurbo::{BezPath, Point, Size};

/// Absolute playback position in milliseconds from media start.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct PositionMs(pub u64);

impl PositionMs {
    /// Zero position (media start).
    pub const ZERO: Self = Self(0);

    /// Convert a seconds value (as edited in forms and encoded in IIIF
    /// fragments) into milliseconds. Negative and non-finite inputs clamp
    /// to zero.
    pub fn from_secs_f64(secs: f64) -> Self {
        if !secs.is_finite() || secs <= 0.0 {
            return Self::ZERO;
        }
        Self((secs * 1000.0).round() as u64)
    }

    /// Position expressed in seconds.
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Saturating millisecond offset.
    pub fn offset(self, delta_ms: u64) -> Self {
        Self(self.0.saturating_add(delta_ms))
    }
}

/// A time interval `[start, end]` in milliseconds, used for the timeline
/// viewport and visibility windows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TimeWindow {
    /// Inclusive window start.
    pub start: PositionMs,
    /// Inclusive window end.
    pub end: PositionMs,
}

impl TimeWindow {
    /// Create a validated window with `start <= end`.
    pub fn new(start: PositionMs, end: PositionMs) -> SyncResult<Self> {
        if start > end {
            return Err(SyncError::validation("TimeWindow start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Window length in milliseconds.
    pub fn len_ms(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Return `true` when the window spans no time.
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Return `true` when `p` lies inside `[start, end]`.
    pub fn contains(self, p: PositionMs) -> bool {
        self.start <= p && p <= self.end
    }
}

/// Straight-alpha RGBA color used for waveform stroke styling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel, straight (not premultiplied).
    pub a: u8,
}

impl Rgba8 {
    /// Construct from channel values.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Translucent black, the stock waveform stroke.
    pub const fn translucent_black() -> Self {
        Self::new(0, 0, 0, 122)
    }
}

/// Format a position as `m:ss` for list headings and time labels.
pub fn format_clock(p: PositionMs) -> String {
    let total_secs = p.0 / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secs_round_trip_and_clamping() {
        assert_eq!(PositionMs::from_secs_f64(5.0), PositionMs(5000));
        assert_eq!(PositionMs::from_secs_f64(0.0015), PositionMs(2));
        assert_eq!(PositionMs::from_secs_f64(-3.0), PositionMs::ZERO);
        assert_eq!(PositionMs::from_secs_f64(f64::NAN), PositionMs::ZERO);
        assert_eq!(PositionMs(12_500).as_secs_f64(), 12.5);
    }

    #[test]
    fn window_rejects_inverted_bounds() {
        assert!(TimeWindow::new(PositionMs(10), PositionMs(5)).is_err());
        let w = TimeWindow::new(PositionMs(5), PositionMs(10)).unwrap();
        assert_eq!(w.len_ms(), 5);
        assert!(w.contains(PositionMs(5)));
        assert!(w.contains(PositionMs(10)));
        assert!(!w.contains(PositionMs(11)));
    }

    #[test]
    fn clock_formatting_pads_seconds() {
        assert_eq!(format_clock(PositionMs(0)), "0:00");
        assert_eq!(format_clock(PositionMs(65_000)), "1:05");
        assert_eq!(format_clock(PositionMs(600_000)), "10:00");
        // Sub-second remainders truncate.
        assert_eq!(format_clock(PositionMs(5_999)), "0:05");
    }
}
