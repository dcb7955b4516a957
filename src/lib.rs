//! annosync keeps a time-based media player, an annotation timeline, an
//! audio waveform, and a scrollable annotation list mutually consistent.
//!
//! The public API is session-oriented:
//!
//! - Build a [`PlayerConfig`] and hand it, together with the host's
//!   collaborator implementations ([`MediaPlayer`], [`TimelineSurface`],
//!   [`AnnotationListView`], [`WaveformSurface`]), to a [`SyncSession`]
//! - Load IIIF annotations and waveform peaks through a [`Fetcher`]
//! - Forward player and timeline events into the session's entry points
//!
//! The engine owns the normalized annotation store, visibility evaluation,
//! gesture disambiguation, permission gating, and waveform stroke planning;
//! decoding, widget rendering, and markup stay with the host.
#![forbid(unsafe_code)]

mod foundation;

pub mod config;
pub mod fetch;
pub mod form;
pub mod gesture;
pub mod host;
pub mod iiif;
pub mod model;
pub mod permission;
pub mod session;
pub mod store;
pub mod visibility;
pub mod waveform;

pub use crate::foundation::core::{
    BezPath, Point, PositionMs, Rgba8, Size, TimeWindow, format_clock,
};
pub use crate::foundation::error::{SyncError, SyncResult};

pub use crate::config::{ConfigUpdate, DisplayFields, MediaKind, PlayerConfig, SubtitleTrack};
pub use crate::fetch::{Fetcher, HttpFetcher};
pub use crate::form::{FormFields, FormSession};
pub use crate::gesture::{ClickTarget, Gesture, GestureTracker};
pub use crate::host::{
    AnnotationListView, ListEntry, MediaPlayer, TimelineItem, TimelineSurface, WaveformSurface,
};
pub use crate::model::{Annotation, AnnotationId, AnnotationKind};
pub use crate::permission::PermissionContext;
pub use crate::session::{LoadOutcome, SyncSession};
pub use crate::store::{AnnotationStore, StoreEvent};
pub use crate::visibility::{ActiveEntry, VisibilityOpts, compute_active};
pub use crate::waveform::{WaveformData, WaveformStroke, WaveformStyle, plan_stroke};
