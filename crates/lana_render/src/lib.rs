use std::fmt::Write as _;

use lana_core::{ChangeSet, Chapter, FieldValue, SaveRecord};
use serde_json::{Map as JsonMap, Value as JsonValue};
use time::OffsetDateTime;
use time::macros::format_description;

/// FILETIME ticks (100 ns since 1601-01-01) at the Unix epoch.
const FILETIME_UNIX_EPOCH_TICKS: i128 = 116_444_736_000_000_000;
const FILETIME_TICK_NANOS: i128 = 100;
const SHEET_LABEL_WIDTH: usize = 11;
const UNKNOWN: &str = "unknown";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FieldSelection {
    pub timestamp: bool,
    pub version: bool,
    pub elapsed: bool,
    pub deaths: bool,
    pub slot: bool,
    pub chapter: bool,
    pub scene: bool,
    pub position: bool,
}

impl FieldSelection {
    pub fn all() -> Self {
        Self {
            timestamp: true,
            version: true,
            elapsed: true,
            deaths: true,
            slot: true,
            chapter: true,
            scene: true,
            position: true,
        }
    }

    pub fn is_any_selected(&self) -> bool {
        self.timestamp
            || self.version
            || self.elapsed
            || self.deaths
            || self.slot
            || self.chapter
            || self.scene
            || self.position
    }
}

pub fn render_json_full(record: &SaveRecord) -> JsonValue {
    let mut out = JsonMap::new();

    out.insert("timestamp".to_string(), optional_json(record.timestamp));
    out.insert(
        "saved_at".to_string(),
        optional_string_json(record.timestamp.map(format_filetime)),
    );
    out.insert(
        "version".to_string(),
        optional_string_json(display_version(record)),
    );
    out.insert("elapsed".to_string(), optional_json(record.elapsed));
    out.insert(
        "deathcounter".to_string(),
        optional_json(record.death_counter),
    );
    out.insert("slot".to_string(), optional_json(record.display_slot()));
    out.insert("chapterId".to_string(), optional_json(record.chapter_id));
    out.insert(
        "chapterName".to_string(),
        optional_string_json(record.chapter().map(|chapter| chapter.to_string())),
    );
    out.insert("sceneId".to_string(), optional_json(record.scene_id));
    out.insert("position".to_string(), position_json(record.position));

    JsonValue::Object(out)
}

pub fn render_json_selected(record: &SaveRecord, fields: &FieldSelection) -> JsonValue {
    let mut out = JsonMap::new();

    if fields.timestamp {
        out.insert(
            "timestamp".to_string(),
            optional_string_json(record.timestamp.map(format_filetime)),
        );
    }
    if fields.version {
        out.insert(
            "version".to_string(),
            optional_string_json(display_version(record)),
        );
    }
    if fields.elapsed {
        out.insert(
            "elapsed".to_string(),
            optional_string_json(record.elapsed.map(format_elapsed)),
        );
    }
    if fields.deaths {
        out.insert("deaths".to_string(), optional_json(record.death_counter));
    }
    if fields.slot {
        out.insert("slot".to_string(), optional_json(record.display_slot()));
    }
    if fields.chapter {
        out.insert("chapter".to_string(), optional_json(record.chapter_id));
    }
    if fields.scene {
        out.insert("scene".to_string(), optional_json(record.scene_id));
    }
    if fields.position {
        out.insert("position".to_string(), position_json(record.position));
    }

    JsonValue::Object(out)
}

/// `key=value` pairs for the selected fields, in table order.
pub fn render_selected_pairs(
    record: &SaveRecord,
    fields: &FieldSelection,
) -> Vec<(&'static str, String)> {
    let mut out = Vec::new();

    if fields.timestamp {
        out.push(("timestamp", or_unknown(record.timestamp.map(format_filetime))));
    }
    if fields.version {
        out.push(("version", or_unknown(display_version(record))));
    }
    if fields.elapsed {
        out.push(("elapsed", or_unknown(record.elapsed.map(format_elapsed))));
    }
    if fields.deaths {
        out.push(("deaths", or_unknown(record.death_counter.map(|v| v.to_string()))));
    }
    if fields.slot {
        out.push(("slot", or_unknown(record.display_slot().map(|v| v.to_string()))));
    }
    if fields.chapter {
        out.push(("chapter", or_unknown(record.chapter_id.map(|v| v.to_string()))));
    }
    if fields.scene {
        out.push(("scene", or_unknown(record.scene_id.map(|v| v.to_string()))));
    }
    if fields.position {
        out.push((
            "position",
            or_unknown(record.position.map(|[x, y, z]| format!("{x},{y},{z}"))),
        ));
    }

    out
}

pub fn render_record_sheet(record: &SaveRecord) -> String {
    let rows = [
        ("Timestamp:", or_unknown(record.timestamp.map(format_filetime))),
        ("Version:", or_unknown(display_version(record))),
        ("Elapsed:", or_unknown(record.elapsed.map(format_elapsed))),
        (
            "Deaths:",
            or_unknown(record.death_counter.map(|v| v.to_string())),
        ),
        (
            "Slot:",
            or_unknown(record.display_slot().map(|v| v.to_string())),
        ),
        ("Chapter:", or_unknown(record.chapter_id.map(format_chapter))),
        ("Scene:", or_unknown(record.scene_id.map(|v| v.to_string()))),
        ("Position:", or_unknown(record.position.map(format_position))),
    ];

    let mut out = String::new();
    for (label, value) in rows {
        writeln!(out, "{label:<SHEET_LABEL_WIDTH$}{value}")
            .expect("writing to String cannot fail");
    }
    out
}

/// One `Field: old -> new` line per change, or `No changes`.
pub fn render_changes_text(changes: &ChangeSet) -> String {
    if changes.is_empty() {
        return "No changes\n".to_string();
    }

    let mut out = String::new();
    for change in changes.iter() {
        writeln!(
            out,
            "{}: {} -> {}",
            capitalize(change.field),
            display_value(change.old.as_ref()),
            display_value(change.new.as_ref())
        )
        .expect("writing to String cannot fail");
    }
    out
}

pub fn render_changes_json(changes: &ChangeSet) -> JsonValue {
    let mut out = JsonMap::new();
    for change in changes.iter() {
        let mut entry = JsonMap::new();
        entry.insert("old".to_string(), value_json(change.old.as_ref()));
        entry.insert("new".to_string(), value_json(change.new.as_ref()));
        out.insert(change.field.to_string(), JsonValue::Object(entry));
    }
    JsonValue::Object(out)
}

pub fn filetime_to_datetime(ticks: u64) -> Option<OffsetDateTime> {
    let nanos = (i128::from(ticks) - FILETIME_UNIX_EPOCH_TICKS) * FILETIME_TICK_NANOS;
    OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
}

/// Windows FILETIME as `YYYY/MM/DD - HH:MM:SS` (UTC).
pub fn format_filetime(ticks: u64) -> String {
    filetime_to_datetime(ticks)
        .and_then(|datetime| {
            datetime
                .format(format_description!(
                    "[year]/[month]/[day] - [hour]:[minute]:[second]"
                ))
                .ok()
        })
        .unwrap_or_else(|| format!("invalid ({ticks})"))
}

/// Elapsed play time in seconds. Hours do not wrap at a day.
pub fn format_elapsed(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds / 60) % 60;
    let seconds = seconds % 60;
    format!("{hours}h {minutes:02}m {seconds:02}s")
}

pub fn format_chapter(chapter_id: u64) -> String {
    match Chapter::from_raw(chapter_id) {
        Chapter::Unknown(_) => format!("{chapter_id} (unknown chapter)"),
        chapter => format!("{chapter_id} ({chapter})"),
    }
}

pub fn format_position([x, y, z]: [u16; 3]) -> String {
    format!("{x}, {y}, {z}")
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Text fields are NUL padded on disk; the padding is not shown.
fn trim_padding(text: &str) -> &str {
    text.trim_end_matches('\0')
}

fn display_version(record: &SaveRecord) -> Option<String> {
    record.version.as_deref().map(|v| trim_padding(v).to_string())
}

fn display_value(value: Option<&FieldValue>) -> String {
    match value {
        Some(FieldValue::Text(text)) => trim_padding(text).to_string(),
        Some(other) => other.to_string(),
        None => UNKNOWN.to_string(),
    }
}

fn or_unknown(value: Option<String>) -> String {
    value.unwrap_or_else(|| UNKNOWN.to_string())
}

fn optional_json(value: Option<u64>) -> JsonValue {
    match value {
        Some(v) => JsonValue::from(v),
        None => JsonValue::Null,
    }
}

fn optional_string_json(value: Option<String>) -> JsonValue {
    match value {
        Some(v) => JsonValue::String(v),
        None => JsonValue::Null,
    }
}

fn position_json(position: Option<[u16; 3]>) -> JsonValue {
    match position {
        Some(components) => {
            JsonValue::Array(components.iter().map(|&v| JsonValue::from(v)).collect())
        }
        None => JsonValue::Null,
    }
}

fn value_json(value: Option<&FieldValue>) -> JsonValue {
    match value {
        Some(FieldValue::Integer(v)) => JsonValue::from(*v),
        Some(FieldValue::Text(v)) => JsonValue::String(trim_padding(v).to_string()),
        Some(FieldValue::Vector3(v)) => position_json(Some(*v)),
        None => JsonValue::Null,
    }
}
