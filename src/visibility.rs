//! Temporal visibility evaluation.
//!
//! Pure position-driven computation of which annotations are active, how far
//! a range annotation has progressed, and whether a point annotation is in
//! its attention pulse. Re-invoked on every position update and every store
//! mutation; cheap enough for timeupdate frequency.

use smallvec::SmallVec;

use crate::foundation::core::PositionMs;
use crate::model::{Annotation, AnnotationId, AnnotationKind};

/// Default minimum time an annotation stays visible after its start.
pub const DEFAULT_MIN_DISPLAY_MS: u64 = 15_000;

/// Default attention-pulse window for point annotations.
///
/// Deliberately independent from the list-visibility minimum; the two serve
/// different purposes and are configured separately.
pub const DEFAULT_PULSE_WINDOW_MS: u64 = 2_000;

/// Tuning for [`compute_active`].
#[derive(Clone, Copy, Debug)]
pub struct VisibilityOpts {
    /// Every annotation remains active for at least this long after `start`.
    pub min_display_ms: u64,
    /// Point annotations pulse for this long after `start`.
    pub pulse_window_ms: u64,
}

impl Default for VisibilityOpts {
    fn default() -> Self {
        Self {
            min_display_ms: DEFAULT_MIN_DISPLAY_MS,
            pulse_window_ms: DEFAULT_PULSE_WINDOW_MS,
        }
    }
}

/// One annotation's visibility state at a playback position.
#[derive(Clone, Debug)]
pub struct ActiveEntry<'a> {
    pub annotation: &'a Annotation,
    /// Inside `[start, effective_end]` at the evaluated position.
    pub is_active: bool,
    /// Range completion percentage in `[0, 100]`; 0 for points.
    pub progress: f64,
    /// Point annotation inside its pulse window.
    pub pulsing: bool,
}

/// End of the visibility window: the annotation's own end (its start, for
/// points) extended to at least `start + min_display_ms`.
pub fn effective_end(annotation: &Annotation, min_display_ms: u64) -> PositionMs {
    let own_end = annotation.end.unwrap_or(annotation.start);
    own_end.max(annotation.start.offset(min_display_ms))
}

/// Evaluate every annotation at `position`.
///
/// Output is ordered ascending by start, ties in input (insertion) order;
/// this ordering is the single source of truth for both list membership and
/// highlight state.
pub fn compute_active<'a>(
    annotations: &'a [Annotation],
    position: PositionMs,
    opts: &VisibilityOpts,
) -> Vec<ActiveEntry<'a>> {
    let mut entries: Vec<ActiveEntry<'a>> = annotations
        .iter()
        .map(|a| eval_one(a, position, opts))
        .collect();
    entries.sort_by_key(|e| e.annotation.start);
    entries
}

fn eval_one<'a>(a: &'a Annotation, position: PositionMs, opts: &VisibilityOpts) -> ActiveEntry<'a> {
    let is_active = a.start <= position && position <= effective_end(a, opts.min_display_ms);

    let progress = match (a.kind(), a.end) {
        (AnnotationKind::Range, Some(end)) => {
            let span = (end.0 - a.start.0) as f64;
            let elapsed = position.0 as f64 - a.start.0 as f64;
            (elapsed / span * 100.0).clamp(0.0, 100.0)
        }
        _ => 0.0,
    };

    let pulsing = a.kind() == AnnotationKind::Point
        && a.start <= position
        && position <= a.start.offset(opts.pulse_window_ms);

    ActiveEntry {
        annotation: a,
        is_active,
        progress,
        pulsing,
    }
}

/// Ids of the active entries, in display order. Used by the bus to decide
/// between a list rebuild and an in-place refresh.
pub fn active_ids(entries: &[ActiveEntry<'_>]) -> SmallVec<[AnnotationId; 8]> {
    entries
        .iter()
        .filter(|e| e.is_active)
        .map(|e| e.annotation.id.clone())
        .collect()
}
