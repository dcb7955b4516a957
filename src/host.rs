//! Collaborator seams.
//!
//! The engine never touches the DOM, a canvas, or a decoder. The host hands
//! it implementations of these traits and forwards events into
//! [`SyncSession`](crate::session::SyncSession); the engine calls back out
//! through them.

use kurbo::Size;

use crate::config::DisplayFields;
use crate::foundation::core::{PositionMs, TimeWindow, format_clock};
use crate::model::{Annotation, AnnotationId, AnnotationKind};
use crate::visibility::ActiveEntry;
use crate::waveform::WaveformStroke;

/// The media playback collaborator (decode and transport are its problem).
pub trait MediaPlayer {
    fn position(&self) -> PositionMs;
    /// Total media duration, once metadata is known.
    fn duration(&self) -> Option<PositionMs>;
    fn seek(&mut self, position: PositionMs);
    fn play(&mut self);
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
}

/// One entry mirrored into the timeline widget's item store.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineItem {
    pub id: AnnotationId,
    pub start: PositionMs,
    /// Absent for point items.
    pub end: Option<PositionMs>,
    pub content: String,
}

impl TimelineItem {
    pub fn from_annotation(annotation: &Annotation) -> Self {
        Self {
            id: annotation.id.clone(),
            start: annotation.start,
            end: annotation.end,
            content: annotation.body.clone(),
        }
    }
}

/// The timeline widget collaborator: an item store, a viewport, and a
/// playback cursor marker.
pub trait TimelineSurface {
    fn replace_items(&mut self, items: &[TimelineItem]);
    fn upsert_item(&mut self, item: &TimelineItem);
    fn remove_item(&mut self, id: &AnnotationId);
    /// Move the secondary playback-position marker.
    fn set_cursor(&mut self, position: PositionMs);
    fn viewport(&self) -> TimeWindow;
    fn set_viewport(&mut self, window: TimeWindow);
    /// Constrain panning/zooming to the media duration.
    fn set_bounds(&mut self, duration: PositionMs);
    /// Zoom to fit all items.
    fn fit(&mut self);
}

/// Render model for one visible annotation card.
#[derive(Clone, Debug, PartialEq)]
pub struct ListEntry {
    pub id: AnnotationId,
    /// `m:ss` or `m:ss - m:ss`, omitted when the time field is disabled.
    pub time_label: Option<String>,
    pub text: Option<String>,
    pub author: Option<String>,
    /// Range completion percentage in `[0, 100]`.
    pub progress: f64,
    pub pulsing: bool,
}

impl ListEntry {
    /// Project one active annotation through the configured display fields.
    pub fn from_active(entry: &ActiveEntry<'_>, fields: &DisplayFields) -> Self {
        let a = entry.annotation;

        let time_label = fields.time.then(|| match (a.kind(), a.end) {
            (AnnotationKind::Range, Some(end)) => {
                format!("{} - {}", format_clock(a.start), format_clock(end))
            }
            _ => format_clock(a.start),
        });

        let author = (fields.author && !a.author.is_empty()).then(|| a.author.clone());

        Self {
            id: a.id.clone(),
            time_label,
            text: fields.text.then(|| a.body.clone()),
            author,
            progress: entry.progress,
            pulsing: entry.pulsing,
        }
    }
}

/// The scrollable annotation list collaborator.
///
/// `rebuild` replaces the card set (membership changed); `refresh` only
/// updates highlight/progress state on the cards already shown.
pub trait AnnotationListView {
    fn rebuild(&mut self, entries: &[ListEntry]);
    fn refresh(&mut self, entries: &[ListEntry]);
}

/// The canvas the waveform polyline is stroked onto.
pub trait WaveformSurface {
    fn size(&self) -> Size;
    fn draw(&mut self, stroke: &WaveformStroke);
}
