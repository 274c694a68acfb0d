//! WASM bindings for timetable-engine.
//!
//! Exposes section expansion, move checking, and facet filtering to a browser
//! calendar widget via `wasm-bindgen`. All complex types are passed as JSON
//! strings. The JavaScript side owns the store round trip: it calls
//! `checkMove`, asks the user about any conflicts, writes the new slot time to
//! its backend, and re-expands.
//!
//! Each export is a thin wrapper over a `*_json` function that reports errors as
//! plain strings, so the conversion logic can be tested on native targets.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p timetable-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir web/wasm/ \
//!   target/wasm32-unknown-unknown/release/timetable_engine_wasm.wasm
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use timetable_engine::coordinator::validate_move;
use timetable_engine::{
    expand_sections, find_conflicts, week_anchor, Conflict, ConflictKind, Facet, FacetFilter,
    FacetOptions, MoveRejection, Occurrence, OccurrenceId, SectionRow,
};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ConflictDto {
    occurrence_id: String,
    kind: ConflictKind,
    message: String,
}

impl From<&Conflict> for ConflictDto {
    fn from(c: &Conflict) -> Self {
        Self {
            occurrence_id: c.other.id.to_string(),
            kind: c.kind,
            message: c.to_string(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    /// Valid and conflict-free; safe to persist without asking.
    Clear,
    /// Valid, but the user must confirm before persisting.
    Conflicts,
    /// Refused outright; nothing may be persisted.
    Rejected,
}

#[derive(Serialize)]
struct MoveCheckDto {
    status: CheckStatus,
    /// Slot the caller should update if it goes ahead.
    #[serde(skip_serializing_if = "Option::is_none")]
    time_slot_id: Option<String>,
    conflicts: Vec<ConflictDto>,
    messages: Vec<String>,
}

impl MoveCheckDto {
    fn rejected(rejection: &MoveRejection) -> Self {
        Self {
            status: CheckStatus::Rejected,
            time_slot_id: None,
            conflicts: Vec::new(),
            messages: vec![rejection.to_string()],
        }
    }
}

/// Facet selection as sent by the filter panel. Missing keys mean "no filter".
#[derive(Deserialize, Default)]
#[serde(default)]
struct SelectionInput {
    professors: Vec<String>,
    rooms: Vec<String>,
    grade_levels: Vec<String>,
}

impl SelectionInput {
    fn into_filter(self) -> FacetFilter {
        let mut filter = FacetFilter::new();
        for (facet, values) in [
            (Facet::Professor, self.professors),
            (Facet::Room, self.rooms),
            (Facet::GradeLevel, self.grade_levels),
        ] {
            for value in values {
                filter.select(facet, value);
            }
        }
        filter
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a wall-clock datetime.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS]`, and RFC 3339. An offset, if
/// present, is dropped: the calendar works in the viewer's local wall clock.
fn parse_datetime(s: &str) -> Result<NaiveDateTime, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(ndt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|e| format!("Invalid datetime '{}': {}", s, e))
}

fn parse_occurrences_json(json: &str) -> Result<Vec<Occurrence>, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid occurrences JSON: {}", e))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

// ---------------------------------------------------------------------------
// String-error implementations
// ---------------------------------------------------------------------------

/// See [`expand_sections_wasm`].
pub fn expand_sections_json(rows_json: &str, week_of: &str) -> Result<String, String> {
    let rows: Vec<SectionRow> =
        serde_json::from_str(rows_json).map_err(|e| format!("Invalid sections JSON: {}", e))?;
    let monday = week_anchor(parse_datetime(week_of)?);
    let occurrences = expand_sections(&rows, monday).map_err(|e| e.to_string())?;
    to_json(&occurrences)
}

/// See [`check_move`].
pub fn check_move_json(
    occurrences_json: &str,
    occurrence_id: &str,
    new_start: &str,
    new_end: &str,
) -> Result<String, String> {
    let occurrences = parse_occurrences_json(occurrences_json)?;
    let new_start = parse_datetime(new_start)?;
    let new_end = parse_datetime(new_end)?;

    let id = OccurrenceId::new(occurrence_id);
    let Some(current) = occurrences.iter().find(|o| o.id == id) else {
        return to_json(&MoveCheckDto::rejected(&MoveRejection::UnknownOccurrence(id)));
    };
    if let Err(rejection) = validate_move(current, new_start, new_end) {
        return to_json(&MoveCheckDto::rejected(&rejection));
    }

    let conflicts = find_conflicts(current, new_start, new_end, &occurrences);
    let dto = MoveCheckDto {
        status: if conflicts.is_empty() {
            CheckStatus::Clear
        } else {
            CheckStatus::Conflicts
        },
        time_slot_id: Some(current.time_slot_id.to_string()),
        messages: conflicts.iter().map(ToString::to_string).collect(),
        conflicts: conflicts.iter().map(ConflictDto::from).collect(),
    };
    to_json(&dto)
}

/// See [`facet_values`].
pub fn facet_values_json(occurrences_json: &str) -> Result<String, String> {
    let occurrences = parse_occurrences_json(occurrences_json)?;
    to_json(&FacetOptions::from_occurrences(&occurrences))
}

/// See [`filter_occurrences`].
pub fn filter_occurrences_json(
    occurrences_json: &str,
    selection_json: &str,
) -> Result<String, String> {
    let occurrences = parse_occurrences_json(occurrences_json)?;
    let selection: SelectionInput = if selection_json.trim().is_empty() {
        SelectionInput::default()
    } else {
        serde_json::from_str(selection_json)
            .map_err(|e| format!("Invalid selection JSON: {}", e))?
    };
    let filter = selection.into_filter();
    to_json(&filter.apply(&occurrences))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Expand section rows into this week's occurrences.
///
/// Returns a JSON array of occurrence objects with `start`/`end` as local
/// `YYYY-MM-DDTHH:MM:SS` strings.
///
/// # Arguments
/// - `rows_json` -- JSON array of section rows as stored by the backend
/// - `week_of` -- any date or datetime in the week to show; it is anchored to
///   that week's Monday
#[wasm_bindgen(js_name = "expandSections")]
pub fn expand_sections_wasm(rows_json: &str, week_of: &str) -> Result<String, JsValue> {
    expand_sections_json(rows_json, week_of).map_err(|e| JsValue::from_str(&e))
}

/// Validate a dragged occurrence and list its conflicts.
///
/// Returns `{status, time_slot_id?, conflicts, messages}` where `status` is
/// `"clear"`, `"conflicts"`, or `"rejected"`. Nothing is mutated.
#[wasm_bindgen(js_name = "checkMove")]
pub fn check_move(
    occurrences_json: &str,
    occurrence_id: &str,
    new_start: &str,
    new_end: &str,
) -> Result<String, JsValue> {
    check_move_json(occurrences_json, occurrence_id, new_start, new_end)
        .map_err(|e| JsValue::from_str(&e))
}

/// Distinct professors, rooms, and grade levels, each sorted.
///
/// Returns `{professors, rooms, grade_levels}`.
#[wasm_bindgen(js_name = "facetValues")]
pub fn facet_values(occurrences_json: &str) -> Result<String, JsValue> {
    facet_values_json(occurrences_json).map_err(|e| JsValue::from_str(&e))
}

/// Keep the occurrences matching a facet selection
/// (`{professors?, rooms?, grade_levels?}`).
#[wasm_bindgen(js_name = "filterOccurrences")]
pub fn filter_occurrences(occurrences_json: &str, selection_json: &str) -> Result<String, JsValue> {
    filter_occurrences_json(occurrences_json, selection_json).map_err(|e| JsValue::from_str(&e))
}
