//! Pointer gesture disambiguation for the shared timeline surface.
//!
//! A single click surface carries click-to-seek, drag-to-create/move, and
//! double-click-to-edit. Classification uses distance and duration
//! thresholds, and seeks are debounced so a double-click can cancel the
//! pending seek. All timing is explicit: every input carries a wall-clock
//! millisecond timestamp and due seeks are drained with [`GestureTracker::poll`].

use kurbo::Point;

use crate::foundation::core::PositionMs;
use crate::model::AnnotationId;

/// Pointer travel beyond this is a drag, not a click.
pub const DRAG_DISTANCE_PX: f64 = 5.0;

/// Press held longer than this is a long press, not a click.
pub const LONG_PRESS_MS: u64 = 500;

/// Quiet period before a scheduled seek fires; a double-click inside it
/// cancels the seek.
pub const SEEK_DEBOUNCE_MS: u64 = 250;

/// What the pointer landed on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickTarget {
    /// An existing annotation item; the widget's own item flow owns it.
    Item(AnnotationId),
    /// Empty timeline space.
    Background,
}

/// Classification of a pointer-down/click pair.
#[derive(Clone, Debug, PartialEq)]
pub enum Gesture {
    /// A seek was scheduled; it fires at `fire_at_ms` unless a double-click
    /// cancels it first.
    SeekScheduled {
        target: PositionMs,
        fire_at_ms: u64,
    },
    /// Click on an existing item; never seeks.
    ItemInteraction(AnnotationId),
    /// Drag, long press, or a click with no usable timeline position.
    Ignored,
}

#[derive(Clone, Copy, Debug)]
struct Press {
    at: Point,
    at_ms: u64,
}

#[derive(Clone, Copy, Debug)]
struct PendingSeek {
    target: PositionMs,
    fire_at_ms: u64,
}

/// Tracks one press/click sequence and at most one pending seek.
#[derive(Debug, Default)]
pub struct GestureTracker {
    press: Option<Press>,
    pending: Option<PendingSeek>,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the press position and time.
    pub fn pointer_down(&mut self, at: Point, now_ms: u64) {
        self.press = Some(Press { at, at_ms: now_ms });
    }

    /// Classify the click completing the current press.
    ///
    /// `time` is the timeline position under the pointer, when the surface
    /// can resolve one. A scheduled seek replaces any prior pending seek.
    pub fn click(
        &mut self,
        target: ClickTarget,
        time: Option<PositionMs>,
        at: Point,
        now_ms: u64,
    ) -> Gesture {
        if let ClickTarget::Item(id) = target {
            return Gesture::ItemInteraction(id);
        }

        let Some(press) = self.press else {
            return Gesture::Ignored;
        };

        let travelled = press.at.distance(at);
        let held_ms = now_ms.saturating_sub(press.at_ms);
        if travelled > DRAG_DISTANCE_PX || held_ms > LONG_PRESS_MS {
            return Gesture::Ignored;
        }

        let Some(target) = time else {
            return Gesture::Ignored;
        };

        let fire_at_ms = now_ms + SEEK_DEBOUNCE_MS;
        self.pending = Some(PendingSeek { target, fire_at_ms });
        Gesture::SeekScheduled { target, fire_at_ms }
    }

    /// A double-click on the surface cancels the pending seek; the edit
    /// flow it opens is handled elsewhere.
    pub fn double_click(&mut self, _now_ms: u64) {
        self.pending = None;
    }

    /// Yield the pending seek once its debounce deadline has passed.
    pub fn poll(&mut self, now_ms: u64) -> Option<PositionMs> {
        match self.pending {
            Some(p) if now_ms >= p.fire_at_ms => {
                self.pending = None;
                Some(p.target)
            }
            _ => None,
        }
    }

    /// Deadline of the pending seek, for hosts that arm timers.
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.map(|p| p.fire_at_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker_with_press(at: Point, at_ms: u64) -> GestureTracker {
        let mut t = GestureTracker::new();
        t.pointer_down(at, at_ms);
        t
    }

    #[test]
    fn clean_click_schedules_a_seek() {
        let mut t = tracker_with_press(Point::new(40.0, 10.0), 1000);
        let g = t.click(
            ClickTarget::Background,
            Some(PositionMs(7000)),
            Point::new(40.0, 10.0),
            1000,
        );
        assert_eq!(
            g,
            Gesture::SeekScheduled {
                target: PositionMs(7000),
                fire_at_ms: 1250,
            }
        );

        assert_eq!(t.poll(1249), None);
        assert_eq!(t.poll(1250), Some(PositionMs(7000)));
        assert_eq!(t.poll(1251), None, "seek fires exactly once");
    }

    #[test]
    fn item_clicks_pass_through_without_seeking() {
        let mut t = tracker_with_press(Point::new(0.0, 0.0), 0);
        let g = t.click(
            ClickTarget::Item(AnnotationId::new("a1")),
            Some(PositionMs(7000)),
            Point::new(0.0, 0.0),
            10,
        );
        assert_eq!(g, Gesture::ItemInteraction(AnnotationId::new("a1")));
        assert_eq!(t.poll(u64::MAX), None);
    }

    #[test]
    fn drag_distance_is_ignored() {
        let mut t = tracker_with_press(Point::new(0.0, 0.0), 0);
        let g = t.click(
            ClickTarget::Background,
            Some(PositionMs(7000)),
            Point::new(10.0, 0.0),
            10,
        );
        assert_eq!(g, Gesture::Ignored);
        assert_eq!(t.poll(u64::MAX), None);
    }

    #[test]
    fn distance_threshold_is_euclidean() {
        // 3-4-5 triangle: exactly 5px travels, still a click.
        let mut t = tracker_with_press(Point::new(0.0, 0.0), 0);
        let g = t.click(
            ClickTarget::Background,
            Some(PositionMs(1000)),
            Point::new(3.0, 4.0),
            10,
        );
        assert!(matches!(g, Gesture::SeekScheduled { .. }));
    }

    #[test]
    fn long_press_is_ignored() {
        let mut t = tracker_with_press(Point::new(0.0, 0.0), 0);
        let g = t.click(
            ClickTarget::Background,
            Some(PositionMs(7000)),
            Point::new(0.0, 0.0),
            501,
        );
        assert_eq!(g, Gesture::Ignored);
    }

    #[test]
    fn double_click_cancels_the_pending_seek() {
        let mut t = tracker_with_press(Point::new(0.0, 0.0), 1000);
        t.click(
            ClickTarget::Background,
            Some(PositionMs(7000)),
            Point::new(0.0, 0.0),
            1000,
        );
        t.double_click(1100);
        assert_eq!(t.poll(2000), None);
    }

    #[test]
    fn a_new_click_replaces_the_pending_seek() {
        let mut t = tracker_with_press(Point::new(0.0, 0.0), 1000);
        t.click(
            ClickTarget::Background,
            Some(PositionMs(7000)),
            Point::new(0.0, 0.0),
            1000,
        );
        t.pointer_down(Point::new(0.0, 0.0), 1100);
        t.click(
            ClickTarget::Background,
            Some(PositionMs(9000)),
            Point::new(0.0, 0.0),
            1100,
        );
        assert_eq!(t.poll(1400), Some(PositionMs(9000)));
        assert_eq!(t.poll(u64::MAX), None);
    }

    #[test]
    fn click_without_press_or_position_is_ignored() {
        let mut t = GestureTracker::new();
        let g = t.click(
            ClickTarget::Background,
            Some(PositionMs(1000)),
            Point::new(0.0, 0.0),
            10,
        );
        assert_eq!(g, Gesture::Ignored);

        let mut t = tracker_with_press(Point::new(0.0, 0.0), 0);
        assert_eq!(
            t.click(ClickTarget::Background, None, Point::new(0.0, 0.0), 10),
            Gesture::Ignored
        );
    }
}
