//! # timetable-engine
//!
//! Weekly class-schedule expansion, conflict detection, and interactive rescheduling.
//!
//! A class *section* meets on a day pattern (e.g. `"MWF"`) at a fixed time of day.
//! The engine expands every section into concrete occurrences for the current week,
//! checks a dragged occurrence against everything else that shares its professor,
//! room, or grade level, and commits the new time to every occurrence of the same
//! time slot once the store has accepted the write.
//!
//! ## Modules
//!
//! - [`time`]: time-of-day parsing/formatting, week anchoring, half-open overlap
//! - [`model`]: section rows, day codes, occurrences, identities
//! - [`expander`]: section rows → weekly occurrences
//! - [`conflict`]: classify collisions of a moved occurrence
//! - [`schedule`]: the owned occurrence set
//! - [`filter`]: facet value lists and multi-select narrowing
//! - [`store`]: the async store seam and an in-memory implementation
//! - [`coordinator`]: Validate → Detect → Confirm → Commit
//! - [`error`]: error types

pub mod conflict;
pub mod coordinator;
pub mod error;
pub mod expander;
pub mod filter;
pub mod model;
pub mod schedule;
pub mod store;
pub mod time;

pub use conflict::{find_conflicts, Conflict, ConflictKind};
pub use coordinator::{
    validate_move, ConflictResolver, Decision, LoadOutcome, MoveOutcome, MoveRejection,
    MoveRequest, Notice, Proposal, Rescheduler, Severity,
};
pub use error::ScheduleError;
pub use expander::{expand_for_current_week, expand_sections, expand_sections_with, ExpandOptions};
pub use filter::{Facet, FacetFilter, FacetOptions};
pub use model::{DayCode, GradeLevel, Occurrence, OccurrenceId, SectionRow, TimeSlotId};
pub use schedule::OccurrenceSet;
pub use store::{MemoryStore, ScheduleStore, StoreError};
pub use time::{format_time_of_day, overlaps, parse_time_of_day, week_anchor};
