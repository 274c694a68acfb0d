//! Facet projection -- distinct professor/room/grade lists and multi-select narrowing.
//!
//! This is a display concern layered on the occurrence set. Conflict checks never
//! go through a filter; they always see the full set.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::Occurrence;

/// A filterable display attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facet {
    Professor,
    Room,
    GradeLevel,
}

impl Facet {
    pub const ALL: [Facet; 3] = [Facet::Professor, Facet::Room, Facet::GradeLevel];

    pub fn value_of(self, occurrence: &Occurrence) -> &str {
        match self {
            Facet::Professor => &occurrence.professor,
            Facet::Room => &occurrence.room,
            Facet::GradeLevel => occurrence.grade_level.as_str(),
        }
    }
}

/// Distinct values of `facet` across `occurrences`, sorted.
pub fn facet_values<'a, I>(occurrences: I, facet: Facet) -> Vec<String>
where
    I: IntoIterator<Item = &'a Occurrence>,
{
    occurrences
        .into_iter()
        .map(|o| facet.value_of(o).to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The three facet value lists offered to the display layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetOptions {
    pub professors: Vec<String>,
    pub rooms: Vec<String>,
    pub grade_levels: Vec<String>,
}

impl FacetOptions {
    pub fn from_occurrences<'a, I>(occurrences: I) -> Self
    where
        I: IntoIterator<Item = &'a Occurrence>,
        I::IntoIter: Clone,
    {
        let iter = occurrences.into_iter();
        Self {
            professors: facet_values(iter.clone(), Facet::Professor),
            rooms: facet_values(iter.clone(), Facet::Room),
            grade_levels: facet_values(iter, Facet::GradeLevel),
        }
    }
}

/// Per-facet multi-select. An empty selection means "show all" for that facet;
/// the three facets combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetFilter {
    #[serde(default)]
    pub professors: BTreeSet<String>,
    #[serde(default)]
    pub rooms: BTreeSet<String>,
    #[serde(default)]
    pub grade_levels: BTreeSet<String>,
}

impl FacetFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self, facet: Facet) -> &BTreeSet<String> {
        match facet {
            Facet::Professor => &self.professors,
            Facet::Room => &self.rooms,
            Facet::GradeLevel => &self.grade_levels,
        }
    }

    fn selection_mut(&mut self, facet: Facet) -> &mut BTreeSet<String> {
        match facet {
            Facet::Professor => &mut self.professors,
            Facet::Room => &mut self.rooms,
            Facet::GradeLevel => &mut self.grade_levels,
        }
    }

    pub fn select(&mut self, facet: Facet, value: impl Into<String>) {
        self.selection_mut(facet).insert(value.into());
    }

    pub fn deselect(&mut self, facet: Facet, value: &str) {
        self.selection_mut(facet).remove(value);
    }

    /// Flip one value; returns whether it is selected afterwards.
    pub fn toggle(&mut self, facet: Facet, value: &str) -> bool {
        let selection = self.selection_mut(facet);
        if selection.remove(value) {
            false
        } else {
            selection.insert(value.to_string());
            true
        }
    }

    pub fn clear(&mut self, facet: Facet) {
        self.selection_mut(facet).clear();
    }

    pub fn is_empty(&self) -> bool {
        Facet::ALL.iter().all(|f| self.selection(*f).is_empty())
    }

    pub fn matches(&self, occurrence: &Occurrence) -> bool {
        Facet::ALL.iter().all(|facet| {
            let selection = self.selection(*facet);
            selection.is_empty() || selection.contains(facet.value_of(occurrence))
        })
    }

    /// Narrow `occurrences`, preserving their order.
    pub fn apply<'a, I>(&self, occurrences: I) -> Vec<&'a Occurrence>
    where
        I: IntoIterator<Item = &'a Occurrence>,
    {
        occurrences.into_iter().filter(|o| self.matches(o)).collect()
    }
}
