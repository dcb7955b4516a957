use crate::foundation::core::PositionMs;
use crate::foundation::error::{SyncError, SyncResult};

/// Stable annotation identifier, unique within a store.
///
/// IIIF payloads carry either string IRIs or nothing at all; entries without
/// an identifier fall back to their 1-based position in the source sequence,
/// and user-created annotations receive store-allocated local ids. All three
/// forms share one string-backed representation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct AnnotationId(pub String);

impl AnnotationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fallback id for the entry at 0-based `index` in a source payload.
    pub fn from_index(index: usize) -> Self {
        Self((index + 1).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether an annotation anchors to an instant or an interval.
///
/// Derived from the presence of `end`, never stored independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AnnotationKind {
    Point,
    Range,
}

/// A time-anchored annotation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    /// Anchor position in milliseconds.
    pub start: PositionMs,
    /// Interval end; present only for range annotations, strictly after
    /// `start`.
    pub end: Option<PositionMs>,
    /// Optional short heading.
    pub label: Option<String>,
    /// Primary text content.
    pub body: String,
    /// Creator display name; empty when unknown.
    pub author: String,
    /// Creation timestamp string, display-only.
    pub created: Option<String>,
}

impl Annotation {
    /// A point annotation at `start`.
    pub fn point(id: AnnotationId, start: PositionMs, body: impl Into<String>) -> Self {
        Self {
            id,
            start,
            end: None,
            label: None,
            body: body.into(),
            author: String::new(),
            created: None,
        }
    }

    /// A validated range annotation over `[start, end]`.
    pub fn range(
        id: AnnotationId,
        start: PositionMs,
        end: PositionMs,
        body: impl Into<String>,
    ) -> SyncResult<Self> {
        let a = Self {
            end: Some(end),
            ..Self::point(id, start, body)
        };
        a.validate()?;
        Ok(a)
    }

    pub fn kind(&self) -> AnnotationKind {
        if self.end.is_some() {
            AnnotationKind::Range
        } else {
            AnnotationKind::Point
        }
    }

    /// Enforce the point/range invariant: `end > start` whenever present.
    pub fn validate(&self) -> SyncResult<()> {
        if let Some(end) = self.end
            && end <= self.start
        {
            return Err(SyncError::validation(format!(
                "annotation '{}' end must be > start",
                self.id
            )));
        }
        Ok(())
    }
}
