//! Section rows, day codes, and the occurrences derived from them.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

/// A store key that may arrive as an integer or a string.
///
/// Store rows are produced by whatever backs the schedule, and identifiers or
/// grade levels come through as either JSON numbers or strings. Both collapse
/// to one canonical string at ingestion.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawKey {
    Int(i64),
    Text(String),
}

impl From<RawKey> for String {
    fn from(raw: RawKey) -> Self {
        match raw {
            RawKey::Int(n) => n.to_string(),
            RawKey::Text(s) => s.trim().to_string(),
        }
    }
}

fn key_from_int_or_str<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    RawKey::deserialize(deserializer).map(String::from)
}

macro_rules! string_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(from = "RawKey", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<RawKey> for $name {
            fn from(raw: RawKey) -> Self {
                Self(String::from(raw))
            }
        }

        impl From<$name> for String {
            fn from(key: $name) -> Self {
                key.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_key!(
    /// Shared key linking every occurrence of a section that must move together.
    TimeSlotId
);

string_key!(
    /// Unique identity of one occurrence: `"{section_id}-{day_char}"`.
    ///
    /// `day_char` is the canonical uppercase code from [`DayCode::as_char`], not
    /// the character as written in the pattern, so `"mw"` and `"MW"` both give
    /// `A-M` and `A-W`.
    OccurrenceId
);

string_key!(
    /// Grade level, normalized to a trimmed string whether the store sent `9` or `"9"`.
    GradeLevel
);

/// One weekday a section can meet on.
///
/// | Char | Day |
/// |------|-----|
/// | `M` | Monday |
/// | `T` | Tuesday |
/// | `W` | Wednesday |
/// | `R` | Thursday |
/// | `F` | Friday |
/// | `S` | Saturday |
/// | `U` | Sunday |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayCode {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

const DAY_TABLE: [(char, DayCode); 7] = [
    ('M', DayCode::Monday),
    ('T', DayCode::Tuesday),
    ('W', DayCode::Wednesday),
    ('R', DayCode::Thursday),
    ('F', DayCode::Friday),
    ('S', DayCode::Saturday),
    ('U', DayCode::Sunday),
];

impl DayCode {
    /// Look up a pattern character (case-insensitive). Unknown characters map to `None`.
    pub fn from_char(c: char) -> Option<Self> {
        let upper = c.to_ascii_uppercase();
        DAY_TABLE
            .iter()
            .find(|(code, _)| *code == upper)
            .map(|(_, day)| *day)
    }

    pub fn as_char(self) -> char {
        DAY_TABLE[self.offset_from_monday() as usize].0
    }

    /// Days after Monday: Monday=0..Sunday=6.
    pub fn offset_from_monday(self) -> u32 {
        self.weekday().num_days_from_monday()
    }

    pub fn weekday(self) -> Weekday {
        match self {
            DayCode::Monday => Weekday::Mon,
            DayCode::Tuesday => Weekday::Tue,
            DayCode::Wednesday => Weekday::Wed,
            DayCode::Thursday => Weekday::Thu,
            DayCode::Friday => Weekday::Fri,
            DayCode::Saturday => Weekday::Sat,
            DayCode::Sunday => Weekday::Sun,
        }
    }

    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DayCode::Monday,
            Weekday::Tue => DayCode::Tuesday,
            Weekday::Wed => DayCode::Wednesday,
            Weekday::Thu => DayCode::Thursday,
            Weekday::Fri => DayCode::Friday,
            Weekday::Sat => DayCode::Saturday,
            Weekday::Sun => DayCode::Sunday,
        }
    }
}

impl FromStr for DayCode {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                DayCode::from_char(c).ok_or_else(|| ScheduleError::InvalidDay(s.to_string()))
            }
            _ => Err(ScheduleError::InvalidDay(s.to_string())),
        }
    }
}

impl fmt::Display for DayCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A recurring class section as read from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRow {
    #[serde(deserialize_with = "key_from_int_or_str")]
    pub section_id: String,
    #[serde(deserialize_with = "key_from_int_or_str")]
    pub pattern_slot_id: String,
    pub time_slot_id: TimeSlotId,
    /// One character per meeting day, e.g. `"MWF"`. May be empty.
    #[serde(default)]
    pub day_pattern: String,
    /// `HH:MM:SS` or `HH:MM`.
    pub start_time: String,
    pub end_time: String,
    pub course: String,
    pub instructor: String,
    pub room: String,
    pub grade_level: GradeLevel,
}

/// One concrete weekly instance of a section on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: OccurrenceId,
    pub section_id: String,
    pub pattern_slot_id: String,
    pub time_slot_id: TimeSlotId,
    pub day: DayCode,
    pub title: String,
    pub professor: String,
    pub room: String,
    pub grade_level: GradeLevel,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Occurrence {
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn weekday(&self) -> Weekday {
        self.start.weekday()
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start.time()
    }

    pub fn end_time(&self) -> NaiveTime {
        self.end.time()
    }

    /// Move to a new time of day, keeping this occurrence's own date.
    pub(crate) fn retime(&mut self, start: NaiveTime, end: NaiveTime) {
        let date = self.date();
        self.start = date.and_time(start);
        self.end = date.and_time(end);
    }
}
