//! The owned occurrence set.
//!
//! Readers borrow it freely. The only mutations are a wholesale [`replace`] at
//! load time and [`retime_slot`] after a successful store write, both reachable
//! only through the coordinator.
//!
//! [`replace`]: OccurrenceSet::replace
//! [`retime_slot`]: OccurrenceSet::retime_slot

use chrono::NaiveTime;

use crate::model::{Occurrence, OccurrenceId, TimeSlotId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OccurrenceSet {
    occurrences: Vec<Occurrence>,
}

impl OccurrenceSet {
    pub fn new(occurrences: Vec<Occurrence>) -> Self {
        Self { occurrences }
    }

    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    pub fn as_slice(&self) -> &[Occurrence] {
        &self.occurrences
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Occurrence> {
        self.occurrences.iter()
    }

    pub fn get(&self, id: &OccurrenceId) -> Option<&Occurrence> {
        self.occurrences.iter().find(|o| &o.id == id)
    }

    /// Every occurrence that moves together with `slot`.
    pub fn in_slot<'a>(&'a self, slot: &'a TimeSlotId) -> impl Iterator<Item = &'a Occurrence> + 'a {
        self.occurrences.iter().filter(move |o| &o.time_slot_id == slot)
    }

    pub(crate) fn replace(&mut self, occurrences: Vec<Occurrence>) {
        self.occurrences = occurrences;
    }

    pub(crate) fn clear(&mut self) {
        self.occurrences.clear();
    }

    /// Set the time of day of every occurrence in `slot`, keeping each one's date.
    /// Returns the ids that were touched.
    pub(crate) fn retime_slot(
        &mut self,
        slot: &TimeSlotId,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Vec<OccurrenceId> {
        let mut touched = Vec::new();
        for occurrence in self.occurrences.iter_mut().filter(|o| &o.time_slot_id == slot) {
            occurrence.retime(start, end);
            touched.push(occurrence.id.clone());
        }
        touched
    }
}

impl<'a> IntoIterator for &'a OccurrenceSet {
    type Item = &'a Occurrence;
    type IntoIter = std::slice::Iter<'a, Occurrence>;

    fn into_iter(self) -> Self::IntoIter {
        self.occurrences.iter()
    }
}
