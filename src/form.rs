//! The annotation edit form.
//!
//! Opening a form hands the host a one-shot [`FormSession`] value; the host
//! resolves it exactly once through the session's submit or cancel path.
//! Fields are edited in seconds (the authoring unit) and convert to
//! milliseconds on save, with strict validation before anything reaches the
//! store.

use crate::foundation::core::PositionMs;
use crate::foundation::error::{SyncError, SyncResult};
use crate::model::{Annotation, AnnotationId, AnnotationKind};

/// Default duration given to a range when the author switches a point to a
/// range without supplying an end, seconds.
pub const DEFAULT_RANGE_SECS: f64 = 5.0;

/// Editable form state, in authoring units (seconds).
#[derive(Clone, Debug, PartialEq)]
pub struct FormFields {
    pub kind: AnnotationKind,
    pub start_secs: f64,
    /// Present only while `kind` is `Range`.
    pub end_secs: Option<f64>,
    pub text: String,
}

impl FormFields {
    /// Prefill from an existing annotation.
    pub fn for_annotation(annotation: &Annotation) -> Self {
        Self {
            kind: annotation.kind(),
            start_secs: annotation.start.as_secs_f64(),
            end_secs: annotation.end.map(PositionMs::as_secs_f64),
            text: annotation.body.clone(),
        }
    }

    /// Blank point form anchored at `start`.
    pub fn for_new_point(start: PositionMs) -> Self {
        Self {
            kind: AnnotationKind::Point,
            start_secs: start.as_secs_f64(),
            end_secs: None,
            text: String::new(),
        }
    }

    /// Switch the annotation type. Moving to `Range` without an end defaults
    /// one to `start + 5s`; moving to `Point` clears the end.
    pub fn set_kind(&mut self, kind: AnnotationKind) {
        self.kind = kind;
        match kind {
            AnnotationKind::Point => self.end_secs = None,
            AnnotationKind::Range => {
                if self.end_secs.is_none() {
                    self.end_secs = Some(self.start_secs + DEFAULT_RANGE_SECS);
                }
            }
        }
    }

    /// Validate and convert into the `(start, end)` the store will hold.
    fn resolve_times(&self) -> SyncResult<(PositionMs, Option<PositionMs>)> {
        if !self.start_secs.is_finite() || self.start_secs < 0.0 {
            return Err(SyncError::validation("start time must be a number >= 0"));
        }
        let start = PositionMs::from_secs_f64(self.start_secs);

        match self.kind {
            AnnotationKind::Point => Ok((start, None)),
            AnnotationKind::Range => {
                let Some(end_secs) = self.end_secs else {
                    return Err(SyncError::validation("range annotations need an end time"));
                };
                if !end_secs.is_finite() {
                    return Err(SyncError::validation("end time must be a number"));
                }
                let end = PositionMs::from_secs_f64(end_secs);
                if end <= start {
                    return Err(SyncError::validation("end time must be after start time"));
                }
                Ok((start, Some(end)))
            }
        }
    }

    /// Produce a fresh annotation for the create flow.
    pub fn into_new(self, id: AnnotationId) -> SyncResult<Annotation> {
        let (start, end) = self.resolve_times()?;
        Ok(Annotation {
            id,
            start,
            end,
            label: None,
            body: self.text,
            author: String::new(),
            created: None,
        })
    }

    /// Apply the edited fields onto an existing annotation, preserving its
    /// identity and provenance (author, label, created).
    pub fn apply_to(self, original: &Annotation) -> SyncResult<Annotation> {
        let (start, end) = self.resolve_times()?;
        Ok(Annotation {
            start,
            end,
            body: self.text,
            ..original.clone()
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FormTarget {
    Create,
    Edit(AnnotationId),
}

/// A pending form interaction, resolved exactly once on save or cancel.
#[derive(Debug)]
pub struct FormSession {
    pub(crate) target: FormTarget,
    /// Initial field values to populate the modal with.
    pub fields: FormFields,
}

impl FormSession {
    pub(crate) fn create(fields: FormFields) -> Self {
        Self {
            target: FormTarget::Create,
            fields,
        }
    }

    pub(crate) fn edit(id: AnnotationId, fields: FormFields) -> Self {
        Self {
            target: FormTarget::Edit(id),
            fields,
        }
    }

    /// `true` when saving will create a new annotation.
    pub fn is_create(&self) -> bool {
        self.target == FormTarget::Create
    }

    /// Target annotation for edit sessions.
    pub fn annotation_id(&self) -> Option<&AnnotationId> {
        match &self.target {
            FormTarget::Create => None,
            FormTarget::Edit(id) => Some(id),
        }
    }
}
