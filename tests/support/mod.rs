//! Recording collaborator doubles for session tests.
#![allow(dead_code)]

use annosync::{
    AnnotationId, AnnotationListView, Fetcher, ListEntry, MediaPlayer, PlayerConfig, PositionMs,
    Size, SyncError, SyncResult, SyncSession, TimeWindow, TimelineItem, TimelineSurface,
    WaveformStroke, WaveformSurface,
};

#[derive(Debug)]
pub struct MockPlayer {
    pub position: PositionMs,
    pub duration: Option<PositionMs>,
    pub paused: bool,
    pub seeks: Vec<PositionMs>,
    pub play_calls: usize,
    pub pause_calls: usize,
}

impl Default for MockPlayer {
    fn default() -> Self {
        Self {
            position: PositionMs::ZERO,
            duration: Some(PositionMs(180_000)),
            paused: true,
            seeks: Vec::new(),
            play_calls: 0,
            pause_calls: 0,
        }
    }
}

impl MediaPlayer for MockPlayer {
    fn position(&self) -> PositionMs {
        self.position
    }

    fn duration(&self) -> Option<PositionMs> {
        self.duration
    }

    fn seek(&mut self, position: PositionMs) {
        self.position = position;
        self.seeks.push(position);
    }

    fn play(&mut self) {
        self.play_calls += 1;
        self.paused = false;
    }

    fn pause(&mut self) {
        self.pause_calls += 1;
        self.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}

#[derive(Debug)]
pub struct MockTimeline {
    pub items: Vec<TimelineItem>,
    pub cursor: Option<PositionMs>,
    pub viewport: TimeWindow,
    pub bounds: Option<PositionMs>,
    pub fit_calls: usize,
    pub replace_calls: usize,
}

impl Default for MockTimeline {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            viewport: TimeWindow::new(PositionMs::ZERO, PositionMs(60_000)).unwrap(),
            bounds: None,
            fit_calls: 0,
            replace_calls: 0,
        }
    }
}

impl MockTimeline {
    pub fn item(&self, id: &str) -> Option<&TimelineItem> {
        self.items.iter().find(|i| i.id.as_str() == id)
    }
}

impl TimelineSurface for MockTimeline {
    fn replace_items(&mut self, items: &[TimelineItem]) {
        self.items = items.to_vec();
        self.replace_calls += 1;
    }

    fn upsert_item(&mut self, item: &TimelineItem) {
        match self.items.iter_mut().find(|i| i.id == item.id) {
            Some(slot) => *slot = item.clone(),
            None => self.items.push(item.clone()),
        }
    }

    fn remove_item(&mut self, id: &AnnotationId) {
        self.items.retain(|i| &i.id != id);
    }

    fn set_cursor(&mut self, position: PositionMs) {
        self.cursor = Some(position);
    }

    fn viewport(&self) -> TimeWindow {
        self.viewport
    }

    fn set_viewport(&mut self, window: TimeWindow) {
        self.viewport = window;
    }

    fn set_bounds(&mut self, duration: PositionMs) {
        self.bounds = Some(duration);
    }

    fn fit(&mut self) {
        self.fit_calls += 1;
    }
}

#[derive(Debug, Default)]
pub struct MockList {
    pub rebuild_calls: usize,
    pub refresh_calls: usize,
    pub entries: Vec<ListEntry>,
}

impl MockList {
    pub fn shown_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.id.as_str()).collect()
    }
}

impl AnnotationListView for MockList {
    fn rebuild(&mut self, entries: &[ListEntry]) {
        self.rebuild_calls += 1;
        self.entries = entries.to_vec();
    }

    fn refresh(&mut self, entries: &[ListEntry]) {
        self.refresh_calls += 1;
        self.entries = entries.to_vec();
    }
}

#[derive(Debug)]
pub struct MockSurface {
    pub size: Size,
    pub strokes: Vec<WaveformStroke>,
}

impl Default for MockSurface {
    fn default() -> Self {
        Self {
            size: Size::new(800.0, 140.0),
            strokes: Vec::new(),
        }
    }
}

impl WaveformSurface for MockSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn draw(&mut self, stroke: &WaveformStroke) {
        self.strokes.push(stroke.clone());
    }
}

/// Serves canned bodies keyed by URL; unknown URLs fail like the network.
#[derive(Debug, Default)]
pub struct CannedFetcher {
    pub bodies: Vec<(String, String)>,
}

impl CannedFetcher {
    pub fn with(url: &str, body: &str) -> Self {
        Self {
            bodies: vec![(url.to_owned(), body.to_owned())],
        }
    }
}

impl Fetcher for CannedFetcher {
    fn fetch(&self, url: &str) -> SyncResult<String> {
        self.bodies
            .iter()
            .find(|(u, _)| u == url)
            .map(|(_, body)| body.clone())
            .ok_or_else(|| SyncError::fetch(format!("no route to {url}")))
    }
}

pub type TestSession = SyncSession<MockPlayer, MockTimeline, MockList, MockSurface>;

pub fn session(config: PlayerConfig) -> TestSession {
    SyncSession::new(
        config,
        MockPlayer::default(),
        MockTimeline::default(),
        MockList::default(),
        MockSurface::default(),
    )
}
