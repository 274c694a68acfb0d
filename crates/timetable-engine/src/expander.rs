//! Section expansion -- converts section rows into concrete weekly occurrences.
//!
//! Every occurrence is anchored to a single week: the Monday computed once per
//! expansion pass. The schedule is always viewed relative to "this week", so the
//! date of an occurrence only says which weekday it falls on.

use chrono::{Duration, NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::error::{Result, ScheduleError};
use crate::model::{DayCode, Occurrence, OccurrenceId, SectionRow};
use crate::time::{parse_time_of_day, week_anchor};

/// Expansion knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpandOptions {
    /// Day used when a section's day pattern is empty.
    pub default_day: DayCode,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            default_day: DayCode::Monday,
        }
    }
}

/// Expand rows into occurrences for the week containing `now`.
///
/// The week anchor is computed once, so a pass that straddles midnight on Sunday
/// still places every occurrence in the same week.
pub fn expand_for_current_week(rows: &[SectionRow], now: NaiveDateTime) -> Result<Vec<Occurrence>> {
    expand_sections(rows, week_anchor(now))
}

/// Expand rows into occurrences anchored at `monday` with default options.
pub fn expand_sections(rows: &[SectionRow], monday: NaiveDateTime) -> Result<Vec<Occurrence>> {
    expand_sections_with(rows, monday, &ExpandOptions::default())
}

/// Expand rows into occurrences anchored at `monday`.
///
/// Output order is row order, then day-pattern order within a row. Day characters
/// are matched case-insensitively; unrecognized and repeated ones are skipped.
///
/// # Errors
/// Returns `ScheduleError::InvalidSection` if a row's times do not parse or its
/// start is not strictly before its end.
pub fn expand_sections_with(
    rows: &[SectionRow],
    monday: NaiveDateTime,
    options: &ExpandOptions,
) -> Result<Vec<Occurrence>> {
    let monday = monday.date();
    let mut occurrences = Vec::with_capacity(rows.len() * 2);

    for row in rows {
        let (start, end) = section_times(row)?;

        let default_pattern = options.default_day.as_char().to_string();
        let pattern = if row.day_pattern.trim().is_empty() {
            default_pattern.as_str()
        } else {
            row.day_pattern.trim()
        };

        let mut seen: Vec<DayCode> = Vec::with_capacity(pattern.len());
        for c in pattern.chars() {
            let Some(day) = DayCode::from_char(c) else {
                debug!(section = %row.section_id, day_char = %c, "skipping unrecognized day character");
                continue;
            };
            // A repeated day would produce a second occurrence with the same identity.
            if seen.contains(&day) {
                debug!(section = %row.section_id, day_char = %c, "skipping repeated day character");
                continue;
            }
            seen.push(day);
            let date = monday + Duration::days(i64::from(day.offset_from_monday()));
            occurrences.push(Occurrence {
                id: OccurrenceId::new(format!("{}-{}", row.section_id, day.as_char())),
                section_id: row.section_id.clone(),
                pattern_slot_id: row.pattern_slot_id.clone(),
                time_slot_id: row.time_slot_id.clone(),
                day,
                title: row.course.clone(),
                professor: row.instructor.clone(),
                room: row.room.clone(),
                grade_level: row.grade_level.clone(),
                start: date.and_time(start),
                end: date.and_time(end),
            });
        }
    }

    debug!(
        sections = rows.len(),
        occurrences = occurrences.len(),
        week = %monday,
        "expanded sections"
    );
    Ok(occurrences)
}

fn section_times(row: &SectionRow) -> Result<(NaiveTime, NaiveTime)> {
    let invalid = |reason: String| ScheduleError::InvalidSection {
        section_id: row.section_id.clone(),
        reason,
    };

    let start = parse_time_of_day(&row.start_time).map_err(|e| invalid(e.to_string()))?;
    let end = parse_time_of_day(&row.end_time).map_err(|e| invalid(e.to_string()))?;
    if start >= end {
        return Err(invalid(format!(
            "start {} is not before end {}",
            row.start_time, row.end_time
        )));
    }
    Ok((start, end))
}
