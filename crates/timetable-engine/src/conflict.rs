//! Detect collisions for a moved occurrence.
//!
//! A collision needs two things: the time ranges overlap (half-open, see
//! [`crate::time::overlaps`]) and the two occurrences share a professor, a room,
//! or a grade level. Each shared attribute is reported as its own entry.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::model::Occurrence;
use crate::time::{format_time_of_day, overlaps};

/// The attribute two overlapping occurrences have in common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictKind {
    Professor,
    Room,
    GradeLevel,
}

/// One colliding occurrence, classified by one shared attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub other: Occurrence,
    pub kind: ConflictKind,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = &self.other;
        let when = format!(
            "{} {}-{}",
            o.day,
            format_time_of_day(o.start),
            format_time_of_day(o.end)
        );
        match self.kind {
            ConflictKind::Professor => write!(
                f,
                "Professor conflict: {} already teaches {} on {}",
                o.professor, o.title, when
            ),
            ConflictKind::Room => write!(
                f,
                "Room conflict: {} is booked for {} on {}",
                o.room, o.title, when
            ),
            ConflictKind::GradeLevel => write!(
                f,
                "Grade conflict: grade {} already has {} on {}",
                o.grade_level, o.title, when
            ),
        }
    }
}

/// Find every collision of `candidate`, placed at `[new_start, new_end)`, against
/// `occurrences`.
///
/// The candidate itself (matched by identity) is skipped. Results follow the
/// order of `occurrences`; within one colliding occurrence the order is
/// professor, room, grade level. Nothing is deduplicated, so one occurrence can
/// produce up to three entries.
pub fn find_conflicts<'a, I>(
    candidate: &Occurrence,
    new_start: NaiveDateTime,
    new_end: NaiveDateTime,
    occurrences: I,
) -> Vec<Conflict>
where
    I: IntoIterator<Item = &'a Occurrence>,
{
    let mut conflicts = Vec::new();

    for other in occurrences {
        if other.id == candidate.id {
            continue;
        }
        if !overlaps(new_start, new_end, other.start, other.end) {
            continue;
        }

        let shared = [
            (ConflictKind::Professor, other.professor == candidate.professor),
            (ConflictKind::Room, other.room == candidate.room),
            (
                ConflictKind::GradeLevel,
                other.grade_level == candidate.grade_level,
            ),
        ];
        for (kind, same) in shared {
            if same {
                conflicts.push(Conflict {
                    other: other.clone(),
                    kind,
                });
            }
        }
    }

    conflicts
}

/// Render conflicts as the advisory messages shown to the user.
pub fn describe_conflicts(conflicts: &[Conflict]) -> Vec<String> {
    conflicts.iter().map(ToString::to_string).collect()
}
