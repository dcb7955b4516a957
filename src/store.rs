//! Insertion-ordered annotation store.
//!
//! The store is the single shared mutable collection behind the timeline,
//! the list, and the edit flows. Every mutation pushes a [`StoreEvent`] onto
//! a pending queue; the synchronization bus drains the queue after each
//! entry point and recomputes dependent views. Draining (rather than
//! re-entrant callbacks) is what serializes mutation-driven recomputation.

use crate::foundation::error::{SyncError, SyncResult};
use crate::model::{Annotation, AnnotationId};

/// A store mutation, as seen by dependent views.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    /// Contents were replaced wholesale (a load completed).
    Replaced,
    Added(AnnotationId),
    Updated(AnnotationId),
    Removed(AnnotationId),
}

/// Ordered-by-insertion, id-unique annotation collection.
#[derive(Debug, Default)]
pub struct AnnotationStore {
    entries: Vec<Annotation>,
    pending: Vec<StoreEvent>,
    next_local: u64,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All annotations in insertion order.
    pub fn annotations(&self) -> &[Annotation] {
        &self.entries
    }

    pub fn get(&self, id: &AnnotationId) -> Option<&Annotation> {
        self.entries.iter().find(|a| &a.id == id)
    }

    /// Predicate-filtered read, preserving insertion order.
    pub fn filter<'a>(
        &'a self,
        mut pred: impl FnMut(&Annotation) -> bool + 'a,
    ) -> impl Iterator<Item = &'a Annotation> + 'a {
        self.entries.iter().filter(move |a| pred(a))
    }

    /// Replace the whole contents, validating first so a bad batch leaves
    /// the store untouched.
    pub fn replace_all(&mut self, annotations: Vec<Annotation>) -> SyncResult<()> {
        for (i, a) in annotations.iter().enumerate() {
            a.validate()?;
            if annotations[..i].iter().any(|other| other.id == a.id) {
                return Err(SyncError::validation(format!(
                    "duplicate annotation id '{}'",
                    a.id
                )));
            }
        }
        self.entries = annotations;
        self.pending.push(StoreEvent::Replaced);
        Ok(())
    }

    pub fn add(&mut self, annotation: Annotation) -> SyncResult<()> {
        annotation.validate()?;
        if self.get(&annotation.id).is_some() {
            return Err(SyncError::validation(format!(
                "duplicate annotation id '{}'",
                annotation.id
            )));
        }
        let id = annotation.id.clone();
        self.entries.push(annotation);
        self.pending.push(StoreEvent::Added(id));
        Ok(())
    }

    /// Full replace by id, keeping the entry's insertion slot.
    pub fn update(&mut self, annotation: Annotation) -> SyncResult<()> {
        annotation.validate()?;
        let Some(slot) = self.entries.iter_mut().find(|a| a.id == annotation.id) else {
            return Err(SyncError::validation(format!(
                "unknown annotation id '{}'",
                annotation.id
            )));
        };
        let id = annotation.id.clone();
        *slot = annotation;
        self.pending.push(StoreEvent::Updated(id));
        Ok(())
    }

    pub fn remove(&mut self, id: &AnnotationId) -> Option<Annotation> {
        let index = self.entries.iter().position(|a| &a.id == id)?;
        let removed = self.entries.remove(index);
        self.pending.push(StoreEvent::Removed(removed.id.clone()));
        Some(removed)
    }

    /// Allocate a fresh id for a user-created annotation. Never collides
    /// with payload ids already in the store.
    pub fn allocate_id(&mut self) -> AnnotationId {
        loop {
            self.next_local += 1;
            let candidate = AnnotationId::new(format!("local-{}", self.next_local));
            if self.get(&candidate).is_none() {
                return candidate;
            }
        }
    }

    /// Drain the pending change events. Mutations queued while a recompute
    /// is in flight surface on the next drain.
    pub fn take_events(&mut self) -> Vec<StoreEvent> {
        std::mem::take(&mut self.pending)
    }
}
