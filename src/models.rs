//! The records the dashboard reads from the store and the rows it reports back.

use crate::error::{Error, Result};
use chrono::{NaiveDateTime, NaiveTime, Weekday};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// A student's roll number, unique within a single year.
pub type Roll = String;

/// The class cohorts. Every stored table belongs to exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Year {
    Se,
    Te,
    Be,
}

impl Year {
    pub const ALL: [Year; 3] = [Year::Se, Year::Te, Year::Be];

    pub fn as_str(&self) -> &'static str {
        match self {
            Year::Se => "SE",
            Year::Te => "TE",
            Year::Be => "BE",
        }
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Year {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Year::ALL
            .into_iter()
            .find(|year| year.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidYear(s.to_string()))
    }
}

#[derive(Args, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Tabled)]
pub struct Student {
    /// The student's roll number.
    #[tabled(rename = "Roll")]
    pub roll: Roll,

    /// The student's full name.
    #[tabled(rename = "Name")]
    pub name: String,
}

impl Student {
    pub fn new(roll: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            roll: roll.into(),
            name: name.into(),
        }
    }
}

/// A named lecture window in a year's timetable.
///
/// A slot without a `day` applies to every day. Construct slots with [`LectureSlot::new`], which
/// rejects windows that do not start before they end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LectureSlot {
    pub day: Option<Weekday>,
    pub subject: String,
    pub faculty: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl LectureSlot {
    pub fn new(
        day: Option<Weekday>,
        subject: impl Into<String>,
        faculty: impl Into<String>,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<Self> {
        let subject = subject.into();
        if start >= end {
            return Err(Error::InvalidSlot {
                subject,
                start: start.format("%H:%M").to_string(),
                end: end.format("%H:%M").to_string(),
            });
        }

        Ok(Self {
            day,
            subject,
            faculty: faculty.into(),
            start,
            end,
        })
    }

    /// Inclusive on both ends.
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time <= self.end
    }

    pub fn applies_on(&self, day: Weekday) -> bool {
        self.day.is_none_or(|d| d == day)
    }

    /// Whether `next` starts the minute this slot ends, on a day both are held.
    pub fn hands_over_to(&self, next: &LectureSlot) -> bool {
        self.end == next.start && self.shares_day(next)
    }

    fn shares_day(&self, other: &LectureSlot) -> bool {
        match (self.day, other.day) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }

    /// Whether the two slots can fall on the same day with intersecting windows. Back-to-back
    /// slots sharing only a boundary minute do not overlap.
    pub fn overlaps(&self, other: &LectureSlot) -> bool {
        self.shares_day(other) && self.start < other.end && other.start < self.end
    }
}

/// Parses a lecture day. Blank means "every day"; weekends are not teaching days.
pub fn parse_day(raw: &str) -> Result<Option<Weekday>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    match raw.parse::<Weekday>() {
        Ok(Weekday::Sat | Weekday::Sun) | Err(_) => Err(Error::InvalidDay(raw.to_string())),
        Ok(day) => Ok(Some(day)),
    }
}

/// Parses a lecture boundary written as `HH:MM` (seconds are tolerated).
pub fn parse_time(raw: &str) -> Result<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| Error::InvalidTime(raw.to_string()))
}

/// A single check-in event written by the capture system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInRecord {
    pub roll: Roll,
    /// Present when the attendance table carries a name column.
    pub name: Option<String>,
    pub timestamp: NaiveDateTime,
}

impl CheckInRecord {
    pub fn new(roll: impl Into<String>, timestamp: NaiveDateTime) -> Self {
        Self {
            roll: roll.into(),
            name: None,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Present,
    Absent,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Present => f.write_str("Present"),
            Status::Absent => f.write_str("Absent"),
        }
    }
}

/// One `(lecture, student)` cell of the lecture-wise report.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct LectureAttendance {
    #[serde(rename = "Roll")]
    #[tabled(rename = "Roll")]
    pub roll: Roll,
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "Subject")]
    #[tabled(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Faculty")]
    #[tabled(rename = "Faculty")]
    pub faculty: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: Status,
}

/// One student's presence within the live window.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct LiveAttendance {
    #[serde(rename = "Roll")]
    #[tabled(rename = "Roll")]
    pub roll: Roll,
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "Subject")]
    #[tabled(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: Status,
}

/// A check-in tagged with the lecture it fell into. `subject` and `faculty` are empty when no
/// lecture matched or the check-in came after the subject cutoff.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct TaggedCheckIn {
    #[serde(rename = "Roll")]
    #[tabled(rename = "Roll")]
    pub roll: Roll,
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "Time")]
    #[tabled(rename = "Time")]
    pub time: NaiveDateTime,
    #[serde(rename = "Subject")]
    #[tabled(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Faculty")]
    #[tabled(rename = "Faculty")]
    pub faculty: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct MonthlyAttendance {
    #[serde(rename = "Roll")]
    #[tabled(rename = "Roll")]
    pub roll: Roll,
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "Present Days")]
    #[tabled(rename = "Present Days")]
    pub present_days: u32,
    #[serde(rename = "Total Days")]
    #[tabled(rename = "Total Days")]
    pub total_days: u32,
    #[serde(rename = "Attendance %")]
    #[tabled(rename = "Attendance %")]
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct DayWiseAttendance {
    #[serde(rename = "Roll")]
    #[tabled(rename = "Roll")]
    pub roll: Roll,
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "Present Days")]
    #[tabled(rename = "Present Days")]
    pub present_days: usize,
    #[serde(rename = "Attendance %")]
    #[tabled(rename = "Attendance %")]
    pub percent: f64,
}

/// How many lectures of a subject one student's check-ins fell into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct LectureCount {
    #[serde(rename = "Subject")]
    #[tabled(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Lectures")]
    #[tabled(rename = "Lectures")]
    pub lectures: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(raw: &str) -> NaiveTime {
        parse_time(raw).unwrap()
    }

    #[test]
    fn slot_must_start_before_it_ends() {
        assert!(LectureSlot::new(None, "Math", "AB", t("10:00"), t("10:00")).is_err());
        assert!(LectureSlot::new(None, "Math", "AB", t("11:00"), t("10:00")).is_err());
        assert!(LectureSlot::new(None, "Math", "AB", t("09:00"), t("10:00")).is_ok());
    }

    #[test]
    fn slot_window_is_inclusive() {
        let slot = LectureSlot::new(None, "Math", "AB", t("09:00"), t("10:00")).unwrap();
        assert!(slot.contains(t("09:00")));
        assert!(slot.contains(t("10:00")));
        assert!(!slot.contains(t("10:00:01")));
        assert!(!slot.contains(t("08:59:59")));
    }

    #[test]
    fn overlap_respects_days() {
        let mon = LectureSlot::new(Some(Weekday::Mon), "A", "X", t("09:00"), t("10:00")).unwrap();
        let tue = LectureSlot::new(Some(Weekday::Tue), "B", "Y", t("09:30"), t("10:30")).unwrap();
        let any = LectureSlot::new(None, "C", "Z", t("09:45"), t("11:00")).unwrap();
        let next = LectureSlot::new(Some(Weekday::Mon), "D", "W", t("10:00"), t("11:00")).unwrap();

        assert!(!mon.overlaps(&tue));
        assert!(mon.overlaps(&any));
        assert!(tue.overlaps(&any));
        assert!(!mon.overlaps(&next));
        assert!(!next.overlaps(&mon));
    }

    #[test]
    fn back_to_back_slots_hand_over() {
        let first = LectureSlot::new(Some(Weekday::Mon), "A", "X", t("09:00"), t("10:00")).unwrap();
        let mon = LectureSlot::new(Some(Weekday::Mon), "B", "Y", t("10:00"), t("11:00")).unwrap();
        let tue = LectureSlot::new(Some(Weekday::Tue), "C", "Z", t("10:00"), t("11:00")).unwrap();
        let any = LectureSlot::new(None, "D", "W", t("10:00"), t("11:00")).unwrap();

        assert!(first.hands_over_to(&mon));
        assert!(first.hands_over_to(&any));
        assert!(!first.hands_over_to(&tue));
        assert!(!mon.hands_over_to(&first));
    }

    #[test]
    fn days_and_years_parse_loosely() {
        assert_eq!(parse_day("mon").unwrap(), Some(Weekday::Mon));
        assert_eq!(parse_day(" Friday ").unwrap(), Some(Weekday::Fri));
        assert_eq!(parse_day("").unwrap(), None);
        assert!(parse_day("Sat").is_err());
        assert!(parse_day("someday").is_err());

        assert_eq!("te".parse::<Year>().unwrap(), Year::Te);
        assert!("FE".parse::<Year>().is_err());
    }
}
