//! Waveform stroke planning.
//!
//! Maps a pre-computed peak payload to a single polyline over the currently
//! visible time window. Stateless: the bus re-plans on every viewport change
//! and surface resize, and the host strokes the returned path as-is.

use kurbo::{BezPath, Point, Size};

use crate::foundation::core::{Rgba8, TimeWindow};
use crate::foundation::error::{SyncError, SyncResult};

fn default_bits() -> u32 {
    16
}

/// Pre-computed peak data, consumed as-is (no audio decoding here).
///
/// `data` holds signed amplitude samples, one per `samples_per_pixel` source
/// frames at `sample_rate`.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct WaveformData {
    pub sample_rate: u32,
    pub samples_per_pixel: u32,
    #[serde(default = "default_bits")]
    pub bits: u32,
    pub data: Vec<i32>,
}

impl WaveformData {
    /// Parse and validate a peak payload.
    pub fn from_json(payload: &str) -> SyncResult<Self> {
        let data: Self =
            serde_json::from_str(payload).map_err(|e| SyncError::parse(e.to_string()))?;
        data.validate()?;
        Ok(data)
    }

    pub fn validate(&self) -> SyncResult<()> {
        if self.sample_rate == 0 {
            return Err(SyncError::validation("waveform sample_rate must be > 0"));
        }
        if self.samples_per_pixel == 0 {
            return Err(SyncError::validation(
                "waveform samples_per_pixel must be > 0",
            ));
        }
        if self.bits == 0 || self.bits > 32 {
            return Err(SyncError::validation("waveform bits must be in 1..=32"));
        }
        Ok(())
    }

    /// Time covered by one peak sample, in seconds.
    pub fn seconds_per_sample(&self) -> f64 {
        f64::from(self.samples_per_pixel) / f64::from(self.sample_rate)
    }
}

/// Stroke styling, independently reconfigurable at runtime.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WaveformStyle {
    pub stroke: Rgba8,
    pub stroke_width: f64,
}

impl Default for WaveformStyle {
    fn default() -> Self {
        Self {
            stroke: Rgba8::translucent_black(),
            stroke_width: 1.0,
        }
    }
}

/// A ready-to-stroke draw plan for one viewport.
#[derive(Clone, Debug)]
pub struct WaveformStroke {
    pub path: BezPath,
    pub color: Rgba8,
    pub width: f64,
}

/// Plan the polyline for `viewport` on a surface of `size`.
///
/// Viewport bounds convert to sample indices clamped to the data range;
/// amplitudes normalize by `2^(bits-1)` and scale to 80% of half the surface
/// height, centered vertically; sample times interpolate linearly across the
/// surface width.
pub fn plan_stroke(
    data: &WaveformData,
    viewport: TimeWindow,
    size: Size,
    style: &WaveformStyle,
) -> WaveformStroke {
    let mut path = BezPath::new();

    let window_ms = viewport.len_ms();
    if !data.data.is_empty() && window_ms > 0 && size.width > 0.0 && size.height > 0.0 {
        let seconds_per_sample = data.seconds_per_sample();
        let start_secs = viewport.start.as_secs_f64();
        let end_secs = viewport.end.as_secs_f64();

        let first = ((start_secs / seconds_per_sample).floor().max(0.0)) as usize;
        let last = ((end_secs / seconds_per_sample).ceil() as usize).min(data.data.len() - 1);

        let center_y = size.height / 2.0;
        let max_amplitude = f64::from(2u32.pow(data.bits - 1));
        let scale_y = (size.height / 2.0) / max_amplitude * 0.8;

        for i in first..=last {
            let time_ms = i as f64 * seconds_per_sample * 1000.0;
            let x = (time_ms - viewport.start.0 as f64) / window_ms as f64 * size.width;
            let y = center_y - f64::from(data.data[i]) * scale_y;

            let p = Point::new(x, y);
            if i == first {
                path.move_to(p);
            } else {
                path.line_to(p);
            }
        }
    }

    WaveformStroke {
        path,
        color: style.stroke,
        width: style.stroke_width,
    }
}
