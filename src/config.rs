//! Configuration snapshots.
//!
//! All tunables live in one immutable [`PlayerConfig`] value; runtime
//! changes build a fresh snapshot through [`PlayerConfig::with`] and the
//! session swaps it atomically. Components read the current snapshot and
//! never mutate it.

use crate::foundation::core::Rgba8;
use crate::permission::PermissionContext;
use crate::visibility::{DEFAULT_MIN_DISPLAY_MS, DEFAULT_PULSE_WINDOW_MS, VisibilityOpts};
use crate::waveform::WaveformStyle;

/// What the media URL points at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Audio,
    Video,
}

/// One subtitle track offered to the player.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SubtitleTrack {
    #[serde(default)]
    pub label: Option<String>,
    pub language: String,
    pub url: String,
}

/// Which annotation fields the list renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DisplayFields {
    pub time: bool,
    pub text: bool,
    pub author: bool,
}

impl Default for DisplayFields {
    fn default() -> Self {
        Self {
            time: true,
            text: true,
            author: true,
        }
    }
}

/// Full configuration snapshot.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlayerConfig {
    pub media_url: Option<String>,
    pub media_kind: MediaKind,
    pub annotation_list_url: Option<String>,
    pub waveform_url: Option<String>,
    pub subtitles: Vec<SubtitleTrack>,
    pub waveform_style: WaveformStyle,
    /// Minimum list-visibility window after an annotation's start, ms.
    pub min_display_ms: u64,
    /// Point-annotation pulse window, ms. Independent of `min_display_ms`.
    pub pulse_window_ms: u64,
    pub fields: DisplayFields,
    pub permissions: PermissionContext,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            media_url: None,
            media_kind: MediaKind::Audio,
            annotation_list_url: None,
            waveform_url: None,
            subtitles: Vec::new(),
            waveform_style: WaveformStyle::default(),
            min_display_ms: DEFAULT_MIN_DISPLAY_MS,
            pulse_window_ms: DEFAULT_PULSE_WINDOW_MS,
            fields: DisplayFields::default(),
            permissions: PermissionContext::default(),
        }
    }
}

impl PlayerConfig {
    /// Visibility tuning derived from this snapshot.
    pub fn visibility_opts(&self) -> VisibilityOpts {
        VisibilityOpts {
            min_display_ms: self.min_display_ms,
            pulse_window_ms: self.pulse_window_ms,
        }
    }

    /// Build the snapshot that results from applying one update.
    pub fn with(&self, update: ConfigUpdate) -> Self {
        let mut next = self.clone();
        match update {
            ConfigUpdate::MediaUrl(url) => next.media_url = url,
            ConfigUpdate::MediaKind(kind) => next.media_kind = kind,
            ConfigUpdate::AnnotationListUrl(url) => next.annotation_list_url = url,
            ConfigUpdate::WaveformUrl(url) => next.waveform_url = url,
            ConfigUpdate::Subtitles(tracks) => next.subtitles = tracks,
            ConfigUpdate::WaveformStroke(color) => next.waveform_style.stroke = color,
            ConfigUpdate::WaveformStrokeWidth(width) => next.waveform_style.stroke_width = width,
            ConfigUpdate::MinDisplayMs(ms) => next.min_display_ms = ms,
            ConfigUpdate::PulseWindowMs(ms) => next.pulse_window_ms = ms,
            ConfigUpdate::Fields(fields) => next.fields = fields,
            ConfigUpdate::CanAdd(v) => next.permissions.can_add = v,
            ConfigUpdate::CanEditAll(v) => next.permissions.can_edit_all = v,
            ConfigUpdate::EditableAuthor(name) => next.permissions.editable_author = name,
        }
        next
    }
}

/// One independently-applicable configuration change.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigUpdate {
    MediaUrl(Option<String>),
    MediaKind(MediaKind),
    AnnotationListUrl(Option<String>),
    WaveformUrl(Option<String>),
    Subtitles(Vec<SubtitleTrack>),
    WaveformStroke(Rgba8),
    WaveformStrokeWidth(f64),
    MinDisplayMs(u64),
    PulseWindowMs(u64),
    Fields(DisplayFields),
    CanAdd(bool),
    CanEditAll(bool),
    EditableAuthor(Option<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_behavior() {
        let config = PlayerConfig::default();
        assert_eq!(config.min_display_ms, 15_000);
        assert_eq!(config.pulse_window_ms, 2_000);
        assert_eq!(config.media_kind, MediaKind::Audio);
        assert!(config.fields.time && config.fields.text && config.fields.author);
        assert!(config.permissions.can_add);
    }

    #[test]
    fn with_leaves_unrelated_fields_untouched() {
        let base = PlayerConfig::default();
        let next = base.with(ConfigUpdate::WaveformStroke(Rgba8::new(1, 2, 3, 4)));

        assert_eq!(next.waveform_style.stroke, Rgba8::new(1, 2, 3, 4));
        assert_eq!(next.waveform_style.stroke_width, base.waveform_style.stroke_width);
        assert_eq!(next.min_display_ms, base.min_display_ms);
        assert_eq!(next.permissions, base.permissions);

        let next = next.with(ConfigUpdate::EditableAuthor(Some("alice".into())));
        assert_eq!(next.permissions.editable_author.as_deref(), Some("alice"));
        assert_eq!(next.waveform_style.stroke, Rgba8::new(1, 2, 3, 4));
    }

    #[test]
    fn subtitle_tracks_parse_with_optional_label() {
        let tracks: Vec<SubtitleTrack> = serde_json::from_str(
            r#"[{"language":"fr","url":"subs/fr.vtt"},
                {"label":"English","language":"en","url":"subs/en.vtt"}]"#,
        )
        .unwrap();
        assert_eq!(tracks[0].label, None);
        assert_eq!(tracks[1].label.as_deref(), Some("English"));
    }
}
