//! IIIF annotation payload normalization.
//!
//! Two wire shapes are accepted: the legacy Presentation 2 `sc:AnnotationList`
//! (`resources` entries with an `on` media fragment) and the Presentation 3
//! `AnnotationPage` (`items` entries with a `target`). Shape detection happens
//! once at the top level; each shape then maps through its own pure function
//! into the uniform [`Annotation`] record.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::foundation::core::PositionMs;
use crate::foundation::error::{SyncError, SyncResult};
use crate::model::{Annotation, AnnotationId};

/// Media fragment time selector: `t=start` or `t=start,end`, seconds.
static FRAGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"t=([0-9]*\.?[0-9]+)(?:,([0-9]*\.?[0-9]+))?").unwrap());

/// Parse an IIIF annotation payload into normalized annotations.
///
/// Unrecognized top-level shapes and unparsable JSON yield
/// [`SyncError::Parse`]; individual malformed entries degrade (missing
/// fragments anchor at zero) rather than failing the whole payload.
#[tracing::instrument(skip_all)]
pub fn normalize(payload: &str) -> SyncResult<Vec<Annotation>> {
    let value: Value =
        serde_json::from_str(payload).map_err(|e| SyncError::parse(e.to_string()))?;
    normalize_value(&value)
}

/// Shape-detect and map an already-parsed payload.
pub fn normalize_value(value: &Value) -> SyncResult<Vec<Annotation>> {
    if value.get("@type").and_then(Value::as_str) == Some("sc:AnnotationList")
        && let Some(resources) = value.get("resources").and_then(Value::as_array)
    {
        let annotations = resources
            .iter()
            .enumerate()
            .map(|(i, r)| map_legacy_resource(i, r))
            .collect();
        return Ok(annotations);
    }

    if let Some(items) = value.get("items").and_then(Value::as_array) {
        let annotations = items
            .iter()
            .enumerate()
            .map(|(i, item)| map_page_item(i, item))
            .collect();
        return Ok(annotations);
    }

    Err(SyncError::parse(
        "payload is neither an sc:AnnotationList nor an AnnotationPage",
    ))
}

/// Extract `(start, end)` from a media fragment string.
///
/// The end is honored only when it is strictly greater than the start and
/// greater than zero; otherwise the fragment degrades to a point. Absent or
/// malformed fragments anchor at zero.
pub fn parse_fragment(fragment: &str) -> (PositionMs, Option<PositionMs>) {
    let Some(caps) = FRAGMENT_RE.captures(fragment) else {
        return (PositionMs::ZERO, None);
    };

    let start_secs: f64 = caps[1].parse().unwrap_or(0.0);
    let start = PositionMs::from_secs_f64(start_secs);

    let end = caps
        .get(2)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|&e| e > start_secs && e > 0.0)
        .map(PositionMs::from_secs_f64);

    (start, end)
}

fn map_legacy_resource(index: usize, resource: &Value) -> Annotation {
    let (start, end) = resource
        .get("on")
        .and_then(Value::as_str)
        .map(parse_fragment)
        .unwrap_or((PositionMs::ZERO, None));

    let body = resource
        .pointer("/resource/chars")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_owned();

    Annotation {
        id: entry_id(index, resource),
        start,
        end,
        label: None,
        body,
        author: String::new(),
        created: None,
    }
}

fn map_page_item(index: usize, item: &Value) -> Annotation {
    let (start, end) = item
        .get("target")
        .and_then(target_fragment)
        .map(parse_fragment)
        .unwrap_or((PositionMs::ZERO, None));

    let body = item
        .pointer("/body/value")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_owned();
    let label = item
        .pointer("/body/label")
        .and_then(Value::as_str)
        .map(str::to_owned);
    let created = item
        .get("created")
        .and_then(Value::as_str)
        .map(str::to_owned);

    Annotation {
        id: entry_id(index, item),
        start,
        end,
        label,
        body,
        author: item.get("creator").map(creator_name).unwrap_or_default(),
        created,
    }
}

/// A `target` is either the fragment-bearing string itself or an object
/// whose `id` carries it.
fn target_fragment(target: &Value) -> Option<&str> {
    match target {
        Value::String(s) => Some(s),
        Value::Object(_) => target.get("id").and_then(Value::as_str),
        _ => None,
    }
}

/// Creator display name: language-tagged label values (joined by `", "`),
/// else a plain `name`, else an identifier, else empty.
fn creator_name(creator: &Value) -> String {
    if let Value::String(s) = creator {
        return s.clone();
    }

    if let Some(label) = creator.get("label").and_then(Value::as_object) {
        let values: Vec<&str> = label
            .values()
            .filter_map(Value::as_array)
            .flatten()
            .filter_map(Value::as_str)
            .collect();
        if !values.is_empty() {
            return values.join(", ");
        }
    }

    for key in ["name", "id", "@id"] {
        if let Some(s) = creator.get(key).and_then(Value::as_str) {
            return s.to_owned();
        }
    }

    String::new()
}

fn entry_id(index: usize, entry: &Value) -> AnnotationId {
    for key in ["id", "@id"] {
        if let Some(s) = entry.get(key).and_then(Value::as_str) {
            return AnnotationId::new(s);
        }
    }
    AnnotationId::from_index(index)
}
