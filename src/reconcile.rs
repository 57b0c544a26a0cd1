//! Reconciles raw check-ins against the roster and the timetable.
//!
//! Every function here is pure: callers load the tables, these functions join them. Timetable
//! slots are evaluated independently, so a check-in inside two overlapping slots counts for both.
//! Overlaps are rejected when slots are stored (see [`crate::manager`]). Back-to-back slots may
//! still share a boundary minute; a check-in on it belongs to the slot that starts there.

use crate::error::{Error, Result};
use crate::models::{
    CheckInRecord, DayWiseAttendance, LectureAttendance, LectureCount, LectureSlot,
    LiveAttendance, MonthlyAttendance, Roll, Status, Student, TaggedCheckIn,
};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Marks every student present or absent for every lecture.
///
/// Produces `timetable.len() * roster.len()` rows: timetable order outside, roster order inside.
/// A student is present for a lecture if any of their check-ins falls inside the lecture's
/// window, boundaries included (see [`attends`]). Only the time of day of each check-in is
/// compared.
pub fn lecture_wise(
    records: &[CheckInRecord],
    roster: &[Student],
    timetable: &[LectureSlot],
) -> Vec<LectureAttendance> {
    let times = times_by_roll(records);

    timetable
        .iter()
        .flat_map(|slot| {
            let times = &times;
            roster.iter().map(move |student| {
                let present = times
                    .get(student.roll.as_str())
                    .is_some_and(|ts| ts.iter().any(|&t| attends(slot, timetable, t)));

                LectureAttendance {
                    roll: student.roll.clone(),
                    name: student.name.clone(),
                    subject: slot.subject.clone(),
                    faculty: slot.faculty.clone(),
                    status: status(present),
                }
            })
        })
        .collect()
}

/// Whether a check-in at `time` counts for `slot`.
///
/// Boundaries are inclusive, except that the end of a slot is handed over to a slot in
/// `timetable` starting at that same minute on the same day.
pub fn attends(slot: &LectureSlot, timetable: &[LectureSlot], time: NaiveTime) -> bool {
    slot.contains(time)
        && !(time == slot.end && timetable.iter().any(|next| slot.hands_over_to(next)))
}

/// The first slot in timetable order that a check-in at `time` counts for.
pub fn slot_at(timetable: &[LectureSlot], time: NaiveTime) -> Option<&LectureSlot> {
    timetable.iter().find(|slot| attends(slot, timetable, time))
}

/// `now - window`, or `None` when that instant is not representable.
pub fn window_start(now: NaiveDateTime, window: TimeDelta) -> Option<NaiveDateTime> {
    now.checked_sub_signed(window)
}

fn times_by_roll(records: &[CheckInRecord]) -> HashMap<&str, Vec<NaiveTime>> {
    let mut times: HashMap<&str, Vec<NaiveTime>> = HashMap::new();
    for record in records {
        times
            .entry(record.roll.as_str())
            .or_default()
            .push(record.timestamp.time());
    }
    times
}

/// Marks each student present if they checked in during `[now - window, now]`.
///
/// `subject` is the label the live page shows next to every row.
pub fn rolling_window(
    records: &[CheckInRecord],
    roster: &[Student],
    now: NaiveDateTime,
    window: TimeDelta,
    subject: &str,
) -> Vec<LiveAttendance> {
    let since = window_start(now, window).unwrap_or(NaiveDateTime::MIN);
    let present: HashSet<&str> = records
        .iter()
        .filter(|r| since <= r.timestamp && r.timestamp <= now)
        .map(|r| r.roll.as_str())
        .collect();

    roster
        .iter()
        .map(|student| LiveAttendance {
            roll: student.roll.clone(),
            name: student.name.clone(),
            subject: subject.to_string(),
            status: status(present.contains(student.roll.as_str())),
        })
        .collect()
}

/// The subject shown for a check-in outside every lecture.
pub const UNKNOWN_SUBJECT: &str = "Unknown";

/// Lists every check-in made on `day`, latest first, tagged with the lecture it fell into.
///
/// The first slot (in timetable order) containing the check-in's time wins; a check-in no slot
/// contains is labelled [`UNKNOWN_SUBJECT`]. Check-ins after `cutoff` are never attributed to a
/// lecture and keep both labels blank. One row per check-in; repeated check-ins by the same
/// student are all listed.
pub fn tag_check_ins(
    records: &[CheckInRecord],
    roster: &[Student],
    timetable: &[LectureSlot],
    day: NaiveDate,
    cutoff: NaiveTime,
) -> Vec<TaggedCheckIn> {
    let names: HashMap<&str, &str> = roster
        .iter()
        .map(|s| (s.roll.as_str(), s.name.as_str()))
        .collect();

    let mut todays: Vec<&CheckInRecord> = records
        .iter()
        .filter(|r| r.timestamp.date() == day)
        .collect();
    todays.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    todays
        .into_iter()
        .map(|record| {
            let time = record.timestamp.time();
            let (subject, faculty) = match slot_at(timetable, time) {
                _ if time > cutoff => (String::new(), String::new()),
                Some(slot) => (slot.subject.clone(), slot.faculty.clone()),
                None => (UNKNOWN_SUBJECT.to_string(), String::new()),
            };

            let name = names
                .get(record.roll.as_str())
                .copied()
                .or(record.name.as_deref())
                .unwrap_or_default();

            TaggedCheckIn {
                roll: record.roll.clone(),
                name: name.to_string(),
                time: record.timestamp,
                subject,
                faculty,
            }
        })
        .collect()
}

/// Number of days in the given month, or `None` if the month does not exist.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };

    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}

/// Every date of the given month, in order.
pub fn month_dates(year: i32, month: u32) -> Result<Vec<NaiveDate>> {
    let days = days_in_month(year, month).ok_or(Error::InvalidMonth { year, month })?;

    Ok((1..=days)
        .filter_map(|d| NaiveDate::from_ymd_opt(year, month, d))
        .collect())
}

/// Summarises one month of attendance per student.
///
/// `days` maps each date that has an attendance table to the rolls appearing in it. Dates with no
/// table do not count towards `total_days`; dates outside the month are ignored.
pub fn monthly(
    roster: &[Student],
    year: i32,
    month: u32,
    days: &BTreeMap<NaiveDate, HashSet<Roll>>,
) -> Result<Vec<MonthlyAttendance>> {
    let held: Vec<&HashSet<Roll>> = month_dates(year, month)?
        .iter()
        .filter_map(|date| days.get(date))
        .collect();

    let total_days = held.len() as u32;

    Ok(roster
        .iter()
        .map(|student| {
            let present_days = held
                .iter()
                .filter(|rolls| rolls.contains(&student.roll))
                .count() as u32;

            MonthlyAttendance {
                roll: student.roll.clone(),
                name: student.name.clone(),
                present_days,
                total_days,
                percent: percent(present_days as usize, total_days as usize),
            }
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayWiseSummary {
    pub rows: Vec<DayWiseAttendance>,
    /// Distinct dates with at least one check-in, across every student.
    pub total_days: usize,
}

/// Counts the distinct days each student checked in, over every date present in `records`.
///
/// Rows are produced for each roll that appears in `records`, ordered by roll number.
pub fn day_wise(records: &[CheckInRecord]) -> DayWiseSummary {
    let all_dates: BTreeSet<NaiveDate> = records.iter().map(|r| r.timestamp.date()).collect();
    let total_days = all_dates.len();

    let mut students: BTreeMap<RollKey<'_>, (String, HashSet<NaiveDate>)> = BTreeMap::new();
    for record in records {
        let (name, dates) = students.entry(RollKey(&record.roll)).or_default();
        if name.is_empty() {
            if let Some(n) = &record.name {
                name.clone_from(n);
            }
        }
        dates.insert(record.timestamp.date());
    }

    let rows = students
        .into_iter()
        .map(|(roll, (name, dates))| DayWiseAttendance {
            roll: roll.0.to_string(),
            name,
            present_days: dates.len(),
            percent: percent(dates.len(), total_days),
        })
        .collect();

    DayWiseSummary { rows, total_days }
}

/// For one student, counts how many lecture windows their check-ins fell into, per subject.
///
/// Only the slots held on each check-in's weekday are considered, and a check-in inside several
/// of them counts once for each. Subjects are ordered by count, most attended first; ties keep
/// the order in which subjects were first matched.
pub fn lecture_histogram(
    records: &[CheckInRecord],
    roll: &str,
    timetable: &[LectureSlot],
) -> Vec<LectureCount> {
    let mut counts: Vec<LectureCount> = Vec::new();

    for record in records.iter().filter(|r| r.roll == roll) {
        let time = record.timestamp.time();
        let held = lectures_on(timetable, record.timestamp.date());
        for slot in held.iter().filter(|slot| attends(slot, &held, time)) {
            match counts.iter_mut().find(|c| c.subject == slot.subject) {
                Some(count) => count.lectures += 1,
                None => counts.push(LectureCount {
                    subject: slot.subject.clone(),
                    lectures: 1,
                }),
            }
        }
    }

    counts.sort_by(|a, b| b.lectures.cmp(&a.lectures));
    counts
}

/// `present / total` as a percentage rounded to two decimals, or `0` when nothing was held.
pub fn percent(present: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }

    let raw = present as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

fn status(present: bool) -> Status {
    if present {
        Status::Present
    } else {
        Status::Absent
    }
}

/// Orders roll numbers numerically when both are numbers, textually otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RollKey<'a>(&'a str);

impl Ord for RollKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.parse::<u64>(), other.0.parse::<u64>()) {
            (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| self.0.cmp(other.0)),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => self.0.cmp(other.0),
        }
    }
}

impl PartialOrd for RollKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Check-ins falling on `date`'s weekday only see that day's lectures.
pub fn lectures_on(timetable: &[LectureSlot], date: NaiveDate) -> Vec<LectureSlot> {
    let weekday = date.weekday();
    timetable
        .iter()
        .filter(|slot| slot.applies_on(weekday))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn at(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn hm(raw: &str) -> NaiveTime {
        NaiveTime::parse_from_str(raw, "%H:%M").unwrap()
    }

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    fn slot(subject: &str, start: &str, end: &str) -> LectureSlot {
        LectureSlot::new(None, subject, "Prof", hm(start), hm(end)).unwrap()
    }

    fn check_in(roll: &str, raw: &str) -> CheckInRecord {
        CheckInRecord::new(roll, at(raw))
    }

    #[test]
    fn lecture_wise_single_present() {
        let roster = [Student::new("1", "A")];
        let timetable = [slot("Math", "09:00", "10:00")];
        let records = [check_in("1", "2025-01-10 09:30:00")];

        let rows = lecture_wise(&records, &roster, &timetable);
        assert_eq!(
            rows,
            vec![LectureAttendance {
                roll: "1".into(),
                name: "A".into(),
                subject: "Math".into(),
                faculty: "Prof".into(),
                status: Status::Present,
            }]
        );
    }

    #[test]
    fn lecture_wise_no_records_is_absent() {
        let roster = [Student::new("1", "A")];
        let timetable = [slot("Math", "09:00", "10:00")];

        let rows = lecture_wise(&[], &roster, &timetable);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, Status::Absent);
        assert_eq!(rows[0].subject, "Math");
    }

    #[test]
    fn lecture_wise_boundaries_are_inclusive() {
        let roster = [Student::new("1", "A"), Student::new("2", "B"), Student::new("3", "C")];
        let timetable = [slot("Math", "09:00", "10:00")];
        let records = [
            check_in("1", "2025-01-10 09:00:00"),
            check_in("2", "2025-01-10 10:00:00"),
            check_in("3", "2025-01-10 10:00:01"),
        ];

        let statuses: Vec<Status> = lecture_wise(&records, &roster, &timetable)
            .into_iter()
            .map(|r| r.status)
            .collect();
        assert_eq!(statuses, [Status::Present, Status::Present, Status::Absent]);
    }

    #[test]
    fn lecture_wise_is_a_full_cross_product_in_timetable_order() {
        let roster = [Student::new("2", "B"), Student::new("1", "A")];
        let timetable = [slot("Physics", "11:00", "12:00"), slot("Math", "09:00", "10:00")];
        let records = [
            check_in("1", "2025-01-10 09:15:00"),
            check_in("9", "2025-01-10 11:15:00"),
        ];

        let rows = lecture_wise(&records, &roster, &timetable);
        let cells: Vec<(&str, &str, Status)> = rows
            .iter()
            .map(|r| (r.subject.as_str(), r.roll.as_str(), r.status))
            .collect();

        assert_eq!(
            cells,
            [
                ("Physics", "2", Status::Absent),
                ("Physics", "1", Status::Absent),
                ("Math", "2", Status::Absent),
                ("Math", "1", Status::Present),
            ]
        );
    }

    #[test]
    fn shared_boundary_belongs_to_the_next_lecture() {
        let roster = [Student::new("1", "A"), Student::new("2", "B")];
        let timetable = [slot("Math", "09:00", "10:00"), slot("Physics", "10:00", "11:00")];
        let records = [
            check_in("1", "2025-01-10 10:00:00"),
            check_in("2", "2025-01-10 11:00:00"),
        ];

        let rows = lecture_wise(&records, &roster, &timetable);
        let cells: Vec<(&str, &str, Status)> = rows
            .iter()
            .map(|r| (r.subject.as_str(), r.roll.as_str(), r.status))
            .collect();
        assert_eq!(
            cells,
            [
                ("Math", "1", Status::Absent),
                ("Math", "2", Status::Absent),
                ("Physics", "1", Status::Present),
                ("Physics", "2", Status::Present),
            ]
        );

        assert_eq!(slot_at(&timetable, hm("10:00")).unwrap().subject, "Physics");
        assert_eq!(
            lecture_histogram(&records, "1", &timetable),
            vec![LectureCount {
                subject: "Physics".into(),
                lectures: 1,
            }]
        );
    }

    #[test]
    fn overlapping_slots_both_match() {
        let roster = [Student::new("1", "A")];
        let timetable = [slot("Math", "09:00", "10:00"), slot("Lab", "09:45", "11:00")];
        let records = [check_in("1", "2025-01-10 09:50:00")];

        let rows = lecture_wise(&records, &roster, &timetable);
        assert!(rows.iter().all(|r| r.status == Status::Present));
    }

    #[test]
    fn rolling_window_lower_bound_is_inclusive() {
        let roster = [Student::new("1", "A"), Student::new("2", "B"), Student::new("3", "C")];
        let now = at("2025-01-10 10:00:00");
        let records = [
            check_in("1", "2025-01-10 09:30:00"),
            check_in("2", "2025-01-10 09:29:59"),
            check_in("3", "2025-01-10 10:00:01"),
        ];

        let rows = rolling_window(&records, &roster, now, TimeDelta::minutes(30), "Math");
        let statuses: Vec<Status> = rows.iter().map(|r| r.status).collect();
        assert_eq!(statuses, [Status::Present, Status::Absent, Status::Absent]);
        assert!(rows.iter().all(|r| r.subject == "Math"));
    }

    #[test]
    fn rolling_window_crosses_midnight() {
        let roster = [Student::new("1", "A"), Student::new("2", "B")];
        let now = at("2025-01-11 00:15:00");
        let records = [
            check_in("1", "2025-01-10 23:45:00"),
            check_in("2", "2025-01-10 23:44:59"),
        ];

        let rows = rolling_window(&records, &roster, now, TimeDelta::minutes(30), "");
        let statuses: Vec<Status> = rows.iter().map(|r| r.status).collect();
        assert_eq!(statuses, [Status::Present, Status::Absent]);
    }

    #[test]
    fn window_start_does_not_overflow() {
        let now = at("2025-01-11 00:15:00");
        assert_eq!(window_start(now, TimeDelta::minutes(30)), Some(at("2025-01-10 23:45:00")));
        assert_eq!(window_start(now, TimeDelta::MAX), None);

        let roster = [Student::new("1", "A")];
        let records = [check_in("1", "2025-01-01 00:00:00")];
        let rows = rolling_window(&records, &roster, now, TimeDelta::MAX, "");
        assert_eq!(rows[0].status, Status::Present);
    }

    #[test]
    fn rolling_window_compares_full_dates() {
        let roster = [Student::new("1", "A")];
        let now = at("2025-01-10 10:00:00");
        let records = [check_in("1", "2025-01-09 09:45:00")];

        let rows = rolling_window(&records, &roster, now, TimeDelta::minutes(30), "");
        assert_eq!(rows[0].status, Status::Absent);
    }

    #[test]
    fn tagging_lists_latest_first_and_first_slot_wins() {
        let roster = [Student::new("1", "A")];
        let timetable = [slot("Math", "09:00", "10:00"), slot("Lab", "09:30", "11:00")];
        let day = date("2025-01-10");
        let records = [
            check_in("1", "2025-01-10 09:45:00"),
            check_in("2", "2025-01-10 10:30:00"),
            check_in("1", "2025-01-09 09:45:00"),
        ];

        let rows = tag_check_ins(&records, &roster, &timetable, day, hm("15:30"));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].roll, "2");
        assert_eq!(rows[0].subject, "Lab");
        assert_eq!(rows[0].name, "");
        assert_eq!(rows[1].roll, "1");
        assert_eq!(rows[1].subject, "Math");
        assert_eq!(rows[1].name, "A");
    }

    #[test]
    fn tagging_clears_subjects_after_cutoff() {
        let timetable = [slot("Late Lab", "15:00", "17:00")];
        let day = date("2025-01-10");
        let records = [
            check_in("1", "2025-01-10 15:30:00"),
            check_in("2", "2025-01-10 15:30:01"),
            check_in("3", "2025-01-10 18:00:00"),
        ];

        let rows = tag_check_ins(&records, &[], &timetable, day, hm("15:30"));
        let subjects: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.roll.as_str(), r.subject.as_str()))
            .collect();
        assert_eq!(subjects, [("3", ""), ("2", ""), ("1", "Late Lab")]);
    }

    #[test]
    fn check_ins_outside_every_lecture_are_unknown() {
        let timetable = [slot("Math", "09:00", "10:00")];
        let day = date("2025-01-10");
        let records = [
            check_in("1", "2025-01-10 08:30:00"),
            check_in("2", "2025-01-10 09:30:00"),
            check_in("3", "2025-01-10 17:00:00"),
        ];

        let rows = tag_check_ins(&records, &[], &timetable, day, hm("15:30"));
        let labels: Vec<(&str, &str, &str)> = rows
            .iter()
            .map(|r| (r.roll.as_str(), r.subject.as_str(), r.faculty.as_str()))
            .collect();
        assert_eq!(
            labels,
            [
                ("3", "", ""),
                ("2", "Math", "Prof"),
                ("1", UNKNOWN_SUBJECT, ""),
            ]
        );
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2025, 2), Some(28));
        assert_eq!(days_in_month(1900, 2), Some(28));
        assert_eq!(days_in_month(2000, 2), Some(29));
        assert_eq!(days_in_month(2025, 12), Some(31));
        assert_eq!(days_in_month(2025, 4), Some(30));
        assert_eq!(days_in_month(2025, 13), None);
        assert_eq!(days_in_month(2025, 0), None);
    }

    #[test]
    fn monthly_counts_only_days_with_tables() {
        let roster = [Student::new("1", "A"), Student::new("2", "B")];
        let mut days = BTreeMap::new();
        days.insert(date("2025-02-03"), HashSet::from(["1".to_string()]));
        days.insert(date("2025-02-04"), HashSet::from(["1".to_string(), "2".to_string()]));
        days.insert(date("2025-02-05"), HashSet::new());
        // Outside the month.
        days.insert(date("2025-03-01"), HashSet::from(["2".to_string()]));

        let rows = monthly(&roster, 2025, 2, &days).unwrap();
        assert_eq!(rows[0].present_days, 2);
        assert_eq!(rows[0].total_days, 3);
        assert_eq!(rows[0].percent, 66.67);
        assert_eq!(rows[1].present_days, 1);
        assert_eq!(rows[1].percent, 33.33);
    }

    #[test]
    fn monthly_without_tables_is_zero_percent() {
        let roster = [Student::new("1", "A")];
        let rows = monthly(&roster, 2025, 2, &BTreeMap::new()).unwrap();
        assert_eq!(rows[0].total_days, 0);
        assert_eq!(rows[0].percent, 0.0);

        assert!(matches!(
            monthly(&roster, 2025, 13, &BTreeMap::new()),
            Err(Error::InvalidMonth { .. })
        ));
    }

    #[test]
    fn monthly_total_never_exceeds_month_length() {
        let roster = [Student::new("1", "A")];
        // Every day from Feb 1st to Mar 2nd has a table.
        let first = date("2024-02-01");
        let days: BTreeMap<_, _> = (0..=30)
            .map(|d| first + TimeDelta::days(d))
            .map(|d| (d, HashSet::from(["1".to_string()])))
            .collect();

        let rows = monthly(&roster, 2024, 2, &days).unwrap();
        assert_eq!(rows[0].total_days, 29);
        assert_eq!(rows[0].percent, 100.0);
    }

    #[test]
    fn day_wise_deduplicates_per_date() {
        let mut records = vec![
            check_in("10", "2025-01-10 09:00:00"),
            check_in("10", "2025-01-10 14:00:00"),
            check_in("2", "2025-01-10 09:05:00"),
            check_in("10", "2025-01-11 09:00:00"),
            check_in("3", "2025-01-12 09:00:00"),
        ];
        records[0].name = Some("Ten".to_string());

        let summary = day_wise(&records);
        assert_eq!(summary.total_days, 3);

        let rows: Vec<(&str, &str, usize, f64)> = summary
            .rows
            .iter()
            .map(|r| (r.roll.as_str(), r.name.as_str(), r.present_days, r.percent))
            .collect();
        assert_eq!(
            rows,
            [
                ("2", "", 1, 33.33),
                ("3", "", 1, 33.33),
                ("10", "Ten", 2, 66.67),
            ]
        );
    }

    #[test]
    fn histogram_counts_every_matching_slot() {
        let timetable = [
            slot("Math", "09:00", "10:00"),
            slot("Lab", "09:30", "11:00"),
            slot("Physics", "11:00", "12:00"),
        ];
        let records = [
            check_in("1", "2025-01-10 09:45:00"),
            check_in("1", "2025-01-11 10:30:00"),
            check_in("1", "2025-01-11 13:00:00"),
            check_in("2", "2025-01-11 11:30:00"),
        ];

        let counts = lecture_histogram(&records, "1", &timetable);
        assert_eq!(
            counts,
            vec![
                LectureCount {
                    subject: "Lab".into(),
                    lectures: 2,
                },
                LectureCount {
                    subject: "Math".into(),
                    lectures: 1,
                },
            ]
        );
        assert!(lecture_histogram(&records, "7", &timetable).is_empty());
    }

    #[test]
    fn timetable_filtered_by_weekday() {
        let mon =
            LectureSlot::new(Some(Weekday::Mon), "Math", "P", hm("09:00"), hm("10:00")).unwrap();
        let every = slot("Lab", "11:00", "12:00");
        let timetable = [mon, every];

        // 2025-01-13 is a Monday.
        assert_eq!(lectures_on(&timetable, date("2025-01-13")).len(), 2);
        assert_eq!(lectures_on(&timetable, date("2025-01-14")).len(), 1);
    }

    #[test]
    fn percent_rounds_to_two_places() {
        assert_eq!(percent(1, 3), 33.33);
        assert_eq!(percent(2, 3), 66.67);
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(5, 5), 100.0);
    }
}
