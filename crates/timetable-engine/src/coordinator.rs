//! Reschedule coordination: Validate → Detect → Confirm → Commit.
//!
//! [`Rescheduler`] owns the occurrence set and the store handle. A move is split
//! into two calls so the confirmation step is an explicit suspension point:
//!
//! 1. [`Rescheduler::propose`] validates the move and detects conflicts. It never
//!    mutates anything.
//! 2. [`Rescheduler::commit`] takes the proposal plus the user's [`Decision`],
//!    writes the new time of day to the store, and only after the store accepts
//!    it retimes every occurrence sharing the moved time slot.
//!
//! [`Rescheduler::reschedule`] drives both steps with an injected
//! [`ConflictResolver`], which is asked only when conflicts exist.
//!
//! No error escapes this module: every failure path ends in a [`MoveOutcome`] or
//! [`LoadOutcome`] the display layer can turn into a [`Notice`].

use std::fmt;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::conflict::{describe_conflicts, find_conflicts, Conflict};
use crate::expander::{expand_sections_with, ExpandOptions};
use crate::model::{Occurrence, OccurrenceId, TimeSlotId};
use crate::schedule::OccurrenceSet;
use crate::store::{ScheduleStore, StoreError};
use crate::time::{format_time_of_day, week_anchor};

/// "Occurrence drag-completed" event from the calendar widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub occurrence_id: OccurrenceId,
    pub new_start: NaiveDateTime,
    pub new_end: NaiveDateTime,
    /// Carried for the display layer; the engine ignores it.
    #[serde(default)]
    pub all_day: bool,
}

/// Why a move was refused before conflict detection.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveRejection {
    UnknownOccurrence(OccurrenceId),
    /// The drag landed on a different weekday. Cross-day moves are not supported.
    DayChanged { from: Weekday, to: Weekday },
    /// Right weekday, wrong week. Only the displayed week can be edited.
    WeekChanged { from: NaiveDate, to: NaiveDate },
    /// The schedule changed after the proposal was made; it must be proposed again.
    Stale(OccurrenceId),
    /// The proposed range is empty, inverted, or crosses midnight.
    InvalidRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

impl fmt::Display for MoveRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveRejection::UnknownOccurrence(id) => write!(f, "Unknown occurrence: {}", id),
            MoveRejection::DayChanged { from, to } => write!(
                f,
                "Classes cannot be moved to a different day ({} -> {}); move it within {}",
                from, to, from
            ),
            MoveRejection::WeekChanged { from, to } => write!(
                f,
                "Classes can only be moved within the displayed week ({} -> {})",
                from, to
            ),
            MoveRejection::Stale(id) => write!(
                f,
                "The schedule changed since the move of {} was checked; try again",
                id
            ),
            MoveRejection::InvalidRange { start, end } => write!(
                f,
                "Invalid time range {} - {}: end must be after start on the same day",
                start, end
            ),
        }
    }
}

/// The user's answer to a conflict list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Accept,
    Decline,
}

/// The Confirm step: resolves a non-empty conflict list into a [`Decision`].
///
/// A UI implements this with a dialog; tests inject a scripted answer. A bare
/// [`Decision`] is itself a resolver that always gives the same answer.
#[async_trait]
pub trait ConflictResolver: Send + Sync {
    async fn confirm(&self, conflicts: &[Conflict]) -> Decision;
}

#[async_trait]
impl ConflictResolver for Decision {
    async fn confirm(&self, _conflicts: &[Conflict]) -> Decision {
        *self
    }
}

/// A validated move with its detected conflicts, waiting for a decision.
///
/// Only [`Rescheduler::propose`] builds one.
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    occurrence: Occurrence,
    new_start: NaiveDateTime,
    new_end: NaiveDateTime,
    conflicts: Vec<Conflict>,
}

impl Proposal {
    /// Snapshot of the occurrence being moved, at its time when proposed.
    pub fn occurrence(&self) -> &Occurrence {
        &self.occurrence
    }

    pub fn new_start(&self) -> NaiveDateTime {
        self.new_start
    }

    pub fn new_end(&self) -> NaiveDateTime {
        self.new_end
    }

    /// The conflicts the user is asked about.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    pub fn time_slot_id(&self) -> &TimeSlotId {
        &self.occurrence.time_slot_id
    }

    /// The advisory notice to show before asking for a decision, if any.
    pub fn notice(&self) -> Option<Notice> {
        self.has_conflicts()
            .then(|| Notice::advisory(describe_conflicts(&self.conflicts)))
    }
}

/// How a move ended.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// The store accepted the new time and every occurrence in the slot was retimed.
    Committed {
        time_slot_id: TimeSlotId,
        start: String,
        end: String,
        updated: Vec<OccurrenceId>,
        /// Conflicts the user accepted; empty for a clean move.
        overridden: Vec<Conflict>,
    },
    Rejected(MoveRejection),
    /// The user declined to override the conflicts. Nothing changed.
    Declined { conflicts: Vec<Conflict> },
    /// The store refused the write. Nothing changed in memory.
    PersistFailed { error: StoreError },
}

impl MoveOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, MoveOutcome::Committed { .. })
    }

    /// The fatal notice for aborted moves. Commits and declines need none.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            MoveOutcome::Rejected(rejection) => Some(Notice::fatal(rejection.to_string())),
            MoveOutcome::PersistFailed { error } => Some(Notice::fatal(format!(
                "The new time could not be saved: {}",
                error
            ))),
            MoveOutcome::Committed { .. } | MoveOutcome::Declined { .. } => None,
        }
    }
}

/// Result of a full store read.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded {
        sections: usize,
        occurrences: usize,
        /// Rows dropped because their times were unusable.
        skipped: Vec<String>,
    },
    /// The read failed; the schedule is empty.
    Failed { error: StoreError },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Overridable: the user may accept and continue.
    Advisory,
    /// The operation was aborted.
    Fatal,
}

/// A user-facing message list with its severity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub severity: Severity,
    pub messages: Vec<String>,
}

impl Notice {
    pub fn advisory(messages: Vec<String>) -> Self {
        Self {
            severity: Severity::Advisory,
            messages,
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Fatal,
            messages: vec![message.into()],
        }
    }
}

/// The Validate step on its own: same date as `current` (so same weekday of the
/// same week), non-empty range within that day.
pub fn validate_move(
    current: &Occurrence,
    new_start: NaiveDateTime,
    new_end: NaiveDateTime,
) -> Result<(), MoveRejection> {
    let from = current.weekday();
    let to = new_start.weekday();
    if from != to {
        return Err(MoveRejection::DayChanged { from, to });
    }
    if new_start.date() != current.date() {
        return Err(MoveRejection::WeekChanged {
            from: current.date(),
            to: new_start.date(),
        });
    }

    if new_start >= new_end || new_start.date() != new_end.date() {
        return Err(MoveRejection::InvalidRange {
            start: new_start,
            end: new_end,
        });
    }
    Ok(())
}

/// Owner of the occurrence set and the only writer to it.
pub struct Rescheduler<S> {
    store: S,
    occurrences: OccurrenceSet,
    options: ExpandOptions,
}

impl<S: ScheduleStore> Rescheduler<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, ExpandOptions::default())
    }

    pub fn with_options(store: S, options: ExpandOptions) -> Self {
        Self {
            store,
            occurrences: OccurrenceSet::default(),
            options,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The full occurrence set. Display filters are applied on top of this.
    pub fn occurrences(&self) -> &OccurrenceSet {
        &self.occurrences
    }

    /// Rebuild the occurrence set from a full store read, anchored to the week
    /// containing `now`.
    ///
    /// A failed read leaves the schedule empty and is not retried. A row whose
    /// times are unusable is dropped on its own; the rest still load.
    pub async fn load(&mut self, now: NaiveDateTime) -> LoadOutcome {
        let rows = match self.store.fetch_sections().await {
            Ok(rows) => rows,
            Err(err) => {
                error!(error = %err, "failed to load sections");
                self.occurrences.clear();
                return LoadOutcome::Failed { error: err };
            }
        };

        let monday = week_anchor(now);
        let mut occurrences = Vec::with_capacity(rows.len() * 2);
        let mut skipped = Vec::new();
        for row in &rows {
            match expand_sections_with(std::slice::from_ref(row), monday, &self.options) {
                Ok(expanded) => occurrences.extend(expanded),
                Err(err) => {
                    warn!(section = %row.section_id, error = %err, "skipping section");
                    skipped.push(row.section_id.clone());
                }
            }
        }

        let outcome = LoadOutcome::Loaded {
            sections: rows.len(),
            occurrences: occurrences.len(),
            skipped,
        };
        self.occurrences.replace(occurrences);
        info!(
            sections = rows.len(),
            occurrences = self.occurrences.len(),
            week = %monday.date(),
            "schedule loaded"
        );
        outcome
    }

    /// Validate and Detect. Pure: the set and the store are untouched.
    pub fn propose(&self, request: &MoveRequest) -> Result<Proposal, MoveRejection> {
        let occurrence = self
            .occurrences
            .get(&request.occurrence_id)
            .ok_or_else(|| MoveRejection::UnknownOccurrence(request.occurrence_id.clone()))?;

        validate_move(occurrence, request.new_start, request.new_end)?;

        let conflicts = find_conflicts(
            occurrence,
            request.new_start,
            request.new_end,
            &self.occurrences,
        );

        Ok(Proposal {
            occurrence: occurrence.clone(),
            new_start: request.new_start,
            new_end: request.new_end,
            conflicts,
        })
    }

    /// Confirm and Commit.
    ///
    /// A proposal with conflicts needs [`Decision::Accept`]; a clean proposal
    /// commits regardless of `decision`. The proposal is checked again against
    /// the current set, and one that no longer matches is rejected as stale. The
    /// store write must succeed before the in-memory set changes.
    pub async fn commit(&mut self, proposal: Proposal, decision: Decision) -> MoveOutcome {
        let recheck = MoveRequest {
            occurrence_id: proposal.occurrence.id.clone(),
            new_start: proposal.new_start,
            new_end: proposal.new_end,
            all_day: false,
        };
        match self.propose(&recheck) {
            Ok(current) if current == proposal => {}
            Ok(_) => {
                let rejection = MoveRejection::Stale(recheck.occurrence_id);
                warn!(reason = %rejection, "move rejected");
                return MoveOutcome::Rejected(rejection);
            }
            Err(rejection) => {
                warn!(occurrence = %recheck.occurrence_id, reason = %rejection, "move rejected");
                return MoveOutcome::Rejected(rejection);
            }
        }

        if proposal.has_conflicts() && decision == Decision::Decline {
            warn!(
                occurrence = %proposal.occurrence.id,
                conflicts = proposal.conflicts.len(),
                "move declined"
            );
            return MoveOutcome::Declined {
                conflicts: proposal.conflicts,
            };
        }

        let slot = proposal.occurrence.time_slot_id.clone();
        let start = format_time_of_day(proposal.new_start);
        let end = format_time_of_day(proposal.new_end);

        if let Err(err) = self.store.update_time_slot(&slot, &start, &end).await {
            error!(time_slot = %slot, error = %err, "failed to persist move");
            return MoveOutcome::PersistFailed { error: err };
        }

        let updated =
            self.occurrences
                .retime_slot(&slot, proposal.new_start.time(), proposal.new_end.time());
        info!(
            time_slot = %slot,
            %start,
            %end,
            updated = updated.len(),
            overridden = proposal.conflicts.len(),
            "move committed"
        );

        MoveOutcome::Committed {
            time_slot_id: slot,
            start,
            end,
            updated,
            overridden: proposal.conflicts,
        }
    }

    /// Run a whole move: Validate, Detect, ask `resolver` if there are conflicts,
    /// then Commit.
    pub async fn reschedule<R>(&mut self, request: &MoveRequest, resolver: &R) -> MoveOutcome
    where
        R: ConflictResolver + ?Sized,
    {
        let proposal = match self.propose(request) {
            Ok(proposal) => proposal,
            Err(rejection) => {
                warn!(occurrence = %request.occurrence_id, reason = %rejection, "move rejected");
                return MoveOutcome::Rejected(rejection);
            }
        };

        let decision = if proposal.has_conflicts() {
            resolver.confirm(&proposal.conflicts).await
        } else {
            Decision::Accept
        };

        self.commit(proposal, decision).await
    }
}
