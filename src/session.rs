//! The synchronization bus.
//!
//! [`SyncSession`] owns the annotation store, the configuration snapshot,
//! the gesture tracker, and the collaborator handles, and keeps playback
//! position, timeline cursor, waveform viewport, and the annotation list
//! mutually consistent. The host forwards player and timeline events into
//! the entry points below; the session calls back out through the
//! collaborator traits.
//!
//! Ordering rules:
//! - position-driven recomputation reads the live position and caches it;
//! - mutation-driven recomputation always uses the cached position, never
//!   the player clock;
//! - store mutations queued while a recompute pass runs are applied by the
//!   next drain iteration, so recomputation never recurses into itself.

use kurbo::Point;
use smallvec::SmallVec;

use crate::config::{ConfigUpdate, PlayerConfig};
use crate::fetch::Fetcher;
use crate::foundation::core::PositionMs;
use crate::foundation::error::{SyncError, SyncResult};
use crate::form::{FormFields, FormSession, FormTarget};
use crate::gesture::{ClickTarget, Gesture, GestureTracker};
use crate::host::{
    AnnotationListView, ListEntry, MediaPlayer, TimelineItem, TimelineSurface, WaveformSurface,
};
use crate::model::{Annotation, AnnotationId};
use crate::store::AnnotationStore;
use crate::visibility::{active_ids, compute_active};
use crate::waveform::{WaveformData, plan_stroke};

/// Handle for one in-flight annotation payload load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnnotationLoadTicket(u64);

/// Handle for one in-flight waveform payload load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveformLoadTicket(u64);

/// How a completed load was disposed of.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The payload replaced the current state.
    Applied,
    /// A newer load superseded this one; the result was dropped.
    Stale,
    /// No source URL is configured; nothing was fetched.
    NoSource,
}

/// The annotation synchronization session.
pub struct SyncSession<P, T, L, W> {
    config: PlayerConfig,
    store: AnnotationStore,
    gesture: GestureTracker,
    waveform: Option<WaveformData>,
    /// Cached playback position, fed by `on_position_update`.
    position: PositionMs,
    /// Active-set membership from the previous recompute.
    active: SmallVec<[AnnotationId; 8]>,
    annotation_gen: u64,
    waveform_gen: u64,

    player: P,
    timeline: T,
    list: L,
    surface: W,
}

impl<P, T, L, W> SyncSession<P, T, L, W>
where
    P: MediaPlayer,
    T: TimelineSurface,
    L: AnnotationListView,
    W: WaveformSurface,
{
    pub fn new(config: PlayerConfig, player: P, timeline: T, list: L, surface: W) -> Self {
        Self {
            config,
            store: AnnotationStore::new(),
            gesture: GestureTracker::new(),
            waveform: None,
            position: PositionMs::ZERO,
            active: SmallVec::new(),
            annotation_gen: 0,
            waveform_gen: 0,
            player,
            timeline,
            list,
            surface,
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// All annotations currently in the store, insertion-ordered.
    pub fn annotations(&self) -> &[Annotation] {
        self.store.annotations()
    }

    /// Cached playback position.
    pub fn position(&self) -> PositionMs {
        self.position
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    /// Direct access to the player, for host-side transport controls.
    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    pub fn timeline(&self) -> &T {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut T {
        &mut self.timeline
    }

    pub fn list(&self) -> &L {
        &self.list
    }

    pub fn surface(&self) -> &W {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut W {
        &mut self.surface
    }

    // ---- player events ----------------------------------------------------

    /// Media metadata arrived; constrain the timeline to the duration.
    pub fn on_metadata_ready(&mut self, duration: PositionMs) {
        self.timeline.set_bounds(duration);
    }

    /// Player timeupdate: move the cursor marker and refresh the list.
    pub fn on_position_update(&mut self, position: PositionMs) {
        self.position = position;
        self.timeline.set_cursor(position);
        self.recompute(false);
    }

    // ---- timeline viewport events -----------------------------------------

    /// Viewport pan/zoom only moves the waveform's drawn window; annotation
    /// visibility is position-driven and unaffected.
    pub fn on_viewport_changed(&mut self) {
        self.redraw_waveform();
    }

    /// Surface resize or other widget-internal change.
    pub fn on_surface_changed(&mut self) {
        self.redraw_waveform();
    }

    // ---- pointer events ---------------------------------------------------

    pub fn on_pointer_down(&mut self, at: Point, now_ms: u64) {
        self.gesture.pointer_down(at, now_ms);
    }

    /// Classify a click on the timeline surface. A `SeekScheduled` outcome
    /// carries the debounce deadline; the host should arm a timer and call
    /// [`Self::on_timer`] at (or after) it.
    pub fn on_click(
        &mut self,
        target: ClickTarget,
        time: Option<PositionMs>,
        at: Point,
        now_ms: u64,
    ) -> Gesture {
        self.gesture.click(target, time, at, now_ms)
    }

    /// Double-click: always cancels any pending seek; on an item it opens
    /// the edit form when permitted (silently does nothing otherwise).
    pub fn on_double_click(
        &mut self,
        target: Option<AnnotationId>,
        now_ms: u64,
    ) -> Option<FormSession> {
        self.gesture.double_click(now_ms);
        target.and_then(|id| self.open_edit(&id))
    }

    /// Fire the pending seek once its debounce deadline has passed. Seeking
    /// resumes playback only when the player was already playing.
    pub fn on_timer(&mut self, now_ms: u64) -> Option<PositionMs> {
        let target = self.gesture.poll(now_ms)?;
        self.player.seek(target);
        if !self.player.is_paused() {
            self.player.play();
        }
        Some(target)
    }

    /// Deadline of the pending seek, if any, for hosts that arm timers.
    pub fn next_gesture_deadline(&self) -> Option<u64> {
        self.gesture.next_deadline()
    }

    // ---- edit flows -------------------------------------------------------

    /// Open the edit form for an annotation, if permitted.
    pub fn open_edit(&mut self, id: &AnnotationId) -> Option<FormSession> {
        let annotation = self.store.get(id)?;
        if !self.config.permissions.can_edit(annotation) {
            tracing::debug!(id = %id, "edit denied");
            return None;
        }
        Some(FormSession::edit(
            id.clone(),
            FormFields::for_annotation(annotation),
        ))
    }

    /// The timeline widget wants to create an item at `start` (drag-create).
    pub fn on_item_add_requested(&mut self, start: PositionMs) -> Option<FormSession> {
        if !self.config.permissions.can_add {
            tracing::debug!("add denied");
            return None;
        }
        Some(FormSession::create(FormFields::for_new_point(start)))
    }

    /// The create-annotation affordance: a point form at the playhead.
    pub fn begin_create_at_playhead(&mut self) -> Option<FormSession> {
        self.on_item_add_requested(self.position)
    }

    /// The widget wants to run its own update flow on an item (e.g. an edit
    /// affordance on the item itself). Opens the form when permitted; `None`
    /// tells the widget to cancel.
    pub fn on_item_update_requested(&mut self, id: &AnnotationId) -> Option<FormSession> {
        self.open_edit(id)
    }

    /// The widget wants to move an item (drag). Returns whether the move is
    /// accepted; on `false` the widget must revert the item.
    pub fn on_item_move_requested(
        &mut self,
        id: &AnnotationId,
        start: PositionMs,
        end: Option<PositionMs>,
    ) -> bool {
        let Some(original) = self.store.get(id) else {
            return false;
        };
        if !self.config.permissions.can_edit(original) {
            tracing::debug!(id = %id, "move denied");
            return false;
        }

        let moved = Annotation {
            start,
            end,
            ..original.clone()
        };
        if self.store.update(moved.clone()).is_err() {
            return false;
        }
        self.timeline.upsert_item(&TimelineItem::from_annotation(&moved));
        self.drain_store_events();
        true
    }

    /// The widget wants to delete an item. Returns whether the removal is
    /// accepted.
    pub fn on_item_remove_requested(&mut self, id: &AnnotationId) -> bool {
        let permitted = match self.store.get(id) {
            None => return false,
            Some(annotation) => self.config.permissions.can_edit(annotation),
        };
        if !permitted {
            tracing::debug!(id = %id, "remove denied");
            return false;
        }
        self.store.remove(id);
        self.timeline.remove_item(id);
        self.drain_store_events();
        true
    }

    /// The single save path for both create and edit forms.
    ///
    /// Validation failures and permission changes since the form was opened
    /// surface as errors and leave the store untouched.
    pub fn submit_form(
        &mut self,
        form: FormSession,
        fields: FormFields,
    ) -> SyncResult<AnnotationId> {
        match form.target {
            FormTarget::Create => {
                if !self.config.permissions.can_add {
                    return Err(SyncError::PermissionDenied);
                }
                let id = self.store.allocate_id();
                let annotation = fields.into_new(id.clone())?;
                self.store.add(annotation.clone())?;
                self.timeline
                    .upsert_item(&TimelineItem::from_annotation(&annotation));
                self.drain_store_events();
                Ok(id)
            }
            FormTarget::Edit(id) => {
                let Some(original) = self.store.get(&id).cloned() else {
                    return Err(SyncError::validation(format!(
                        "annotation '{id}' no longer exists"
                    )));
                };
                if !self.config.permissions.can_edit(&original) {
                    return Err(SyncError::PermissionDenied);
                }
                let edited = fields.apply_to(&original)?;
                self.store.update(edited.clone())?;
                self.timeline
                    .upsert_item(&TimelineItem::from_annotation(&edited));
                self.drain_store_events();
                Ok(id)
            }
        }
    }

    /// Resolve a form without saving. The store and views stay untouched.
    pub fn cancel_form(&mut self, form: FormSession) {
        tracing::debug!(create = form.is_create(), "form cancelled");
    }

    // ---- loading ----------------------------------------------------------

    /// Start a new annotation load generation; any earlier in-flight load
    /// becomes stale.
    pub fn begin_annotation_load(&mut self) -> AnnotationLoadTicket {
        self.annotation_gen += 1;
        AnnotationLoadTicket(self.annotation_gen)
    }

    /// Deliver the result of an annotation load.
    ///
    /// Stale tickets are discarded. Fetch failures leave the store
    /// untouched; unrecognized payload shapes degrade to zero annotations.
    /// Both are logged and returned as errors, never panics.
    pub fn complete_annotation_load(
        &mut self,
        ticket: AnnotationLoadTicket,
        result: SyncResult<String>,
    ) -> SyncResult<LoadOutcome> {
        if ticket.0 != self.annotation_gen {
            tracing::debug!(
                ticket = ticket.0,
                current = self.annotation_gen,
                "discarding stale annotation load"
            );
            return Ok(LoadOutcome::Stale);
        }

        let payload = result.inspect_err(|e| tracing::warn!(error = %e, "annotation fetch failed"))?;

        let annotations = match crate::iiif::normalize(&payload) {
            Ok(annotations) => annotations,
            Err(e) => {
                tracing::warn!(error = %e, "annotation payload not recognized");
                self.apply_annotations(Vec::new());
                return Err(e);
            }
        };

        self.apply_annotations(annotations);
        Ok(LoadOutcome::Applied)
    }

    fn apply_annotations(&mut self, annotations: Vec<Annotation>) {
        if let Err(e) = self.store.replace_all(annotations) {
            tracing::warn!(error = %e, "annotation batch rejected");
            return;
        }
        let items: Vec<TimelineItem> = self
            .store
            .annotations()
            .iter()
            .map(TimelineItem::from_annotation)
            .collect();
        self.timeline.replace_items(&items);
        self.timeline.fit();
        self.drain_store_events();
    }

    /// Fetch and apply the configured annotation list.
    #[tracing::instrument(skip_all)]
    pub fn load_annotations(&mut self, fetcher: &dyn Fetcher) -> SyncResult<LoadOutcome> {
        let Some(url) = self.config.annotation_list_url.clone() else {
            return Ok(LoadOutcome::NoSource);
        };
        let ticket = self.begin_annotation_load();
        let result = fetcher.fetch(&url);
        self.complete_annotation_load(ticket, result)
    }

    /// Start a new waveform load generation.
    pub fn begin_waveform_load(&mut self) -> WaveformLoadTicket {
        self.waveform_gen += 1;
        WaveformLoadTicket(self.waveform_gen)
    }

    /// Deliver the result of a waveform load. Failures leave the current
    /// waveform untouched.
    pub fn complete_waveform_load(
        &mut self,
        ticket: WaveformLoadTicket,
        result: SyncResult<String>,
    ) -> SyncResult<LoadOutcome> {
        if ticket.0 != self.waveform_gen {
            tracing::debug!(
                ticket = ticket.0,
                current = self.waveform_gen,
                "discarding stale waveform load"
            );
            return Ok(LoadOutcome::Stale);
        }

        let payload = result.inspect_err(|e| tracing::warn!(error = %e, "waveform fetch failed"))?;
        let data = WaveformData::from_json(&payload)
            .inspect_err(|e| tracing::warn!(error = %e, "waveform payload rejected"))?;

        self.waveform = Some(data);
        self.redraw_waveform();
        Ok(LoadOutcome::Applied)
    }

    /// Fetch and apply the configured waveform peaks.
    #[tracing::instrument(skip_all)]
    pub fn load_waveform(&mut self, fetcher: &dyn Fetcher) -> SyncResult<LoadOutcome> {
        let Some(url) = self.config.waveform_url.clone() else {
            return Ok(LoadOutcome::NoSource);
        };
        let ticket = self.begin_waveform_load();
        let result = fetcher.fetch(&url);
        self.complete_waveform_load(ticket, result)
    }

    // ---- configuration ----------------------------------------------------

    /// Apply one configuration change. Each variant takes effect without
    /// reloading unrelated state: source URL changes start a fresh load
    /// generation, style changes redraw, visibility and field changes
    /// re-render from the cached position.
    pub fn apply_config(
        &mut self,
        update: ConfigUpdate,
        fetcher: &dyn Fetcher,
    ) -> SyncResult<()> {
        self.config = self.config.with(update.clone());

        match update {
            ConfigUpdate::AnnotationListUrl(_) => {
                self.load_annotations(fetcher)?;
            }
            ConfigUpdate::WaveformUrl(_) => {
                self.load_waveform(fetcher)?;
            }
            ConfigUpdate::WaveformStroke(_) | ConfigUpdate::WaveformStrokeWidth(_) => {
                self.redraw_waveform();
            }
            ConfigUpdate::MinDisplayMs(_) | ConfigUpdate::PulseWindowMs(_)
            | ConfigUpdate::Fields(_) => {
                self.recompute(true);
            }
            // Permission flips change what future interactions are offered;
            // media and subtitle settings are read by the host when it
            // (re)builds the player.
            ConfigUpdate::CanAdd(_)
            | ConfigUpdate::CanEditAll(_)
            | ConfigUpdate::EditableAuthor(_)
            | ConfigUpdate::MediaUrl(_)
            | ConfigUpdate::MediaKind(_)
            | ConfigUpdate::Subtitles(_) => {}
        }
        Ok(())
    }

    // ---- internals --------------------------------------------------------

    /// Re-evaluate visibility at the cached position and push the result to
    /// the list view. Membership changes (or `force_rebuild`) rebuild the
    /// card set; otherwise only highlight/progress state is refreshed.
    fn recompute(&mut self, force_rebuild: bool) {
        let opts = self.config.visibility_opts();
        let entries = compute_active(self.store.annotations(), self.position, &opts);
        let ids = active_ids(&entries);

        let cards: Vec<ListEntry> = entries
            .iter()
            .filter(|e| e.is_active)
            .map(|e| ListEntry::from_active(e, &self.config.fields))
            .collect();

        if force_rebuild || ids != self.active {
            self.list.rebuild(&cards);
        } else {
            self.list.refresh(&cards);
        }
        self.active = ids;
    }

    /// Mutation-driven recomputation: drain the store's event queue using
    /// the cached playback position. Mutations queued while a pass runs are
    /// picked up by the next iteration; recomputation itself never mutates
    /// the store, so the loop terminates.
    fn drain_store_events(&mut self) {
        while !self.store.take_events().is_empty() {
            self.recompute(true);
        }
    }

    fn redraw_waveform(&mut self) {
        let Some(data) = &self.waveform else {
            return;
        };
        let stroke = plan_stroke(
            data,
            self.timeline.viewport(),
            self.surface.size(),
            &self.config.waveform_style,
        );
        self.surface.draw(&stroke);
    }
}
