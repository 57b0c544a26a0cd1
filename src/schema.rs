//! Column schema handling for the CSV tables kept in the record store.
//!
//! Uploaded files arrive with inconsistent headers (`Roll No`, ` roll_number`, `Student Name`...).
//! Headers are normalised once when a [`Table`] is loaded, and the roll / name / time columns are
//! located either from an explicit [`ColumnMapping`] or by substring match. Uploads are rewritten
//! with canonical headers so that later reads resolve trivially.

use crate::error::{Error, Result};
use crate::models::{CheckInRecord, LectureSlot, Roll, Student, parse_day, parse_time};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use std::collections::HashSet;
use std::io::Read;
use tracing::warn;

/// Canonical headers for a student table.
pub const STUDENT_HEADERS: [&str; 2] = ["roll", "name"];

/// Canonical headers for a timetable.
pub const TIMETABLE_HEADERS: [&str; 5] = ["day", "subject", "faculty", "start", "end"];

/// An in-memory CSV table with normalised (trimmed, lower-cased) headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl Table {
    /// Builds a table from already-split cells. Headers are normalised.
    pub fn new<H, R>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: AsRef<str>,
        R: IntoIterator<Item = Vec<String>>,
    {
        Self {
            headers: headers
                .into_iter()
                .map(|h| normalize_header(h.as_ref()))
                .collect(),
            rows: rows.into_iter().map(StringRecord::from).collect(),
        }
    }

    /// Reads a CSV document. Rows may be ragged; missing cells read as empty.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()?
            .iter()
            .map(normalize_header)
            .collect();

        let rows = reader
            .records()
            .filter(|row| !matches!(row, Ok(r) if r.iter().all(str::is_empty)))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { headers, rows })
    }

    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = WriterBuilder::new().flexible(true).from_writer(vec![]);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }

        writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    /// Iterates over `(line, row)` pairs, where `line` is the 1-indexed data row number.
    pub fn rows(&self) -> impl Iterator<Item = (u64, &StringRecord)> {
        self.rows.iter().zip(1..).map(|(row, line)| (line, row))
    }

    /// Index of the header exactly equal to `name` (after normalisation).
    pub fn column(&self, name: &str) -> Option<usize> {
        let name = normalize_header(name);
        self.headers.iter().position(|h| *h == name)
    }

    /// Index of the first header containing any of `patterns`.
    pub fn find_column(&self, patterns: &[&str]) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| patterns.iter().any(|p| h.contains(p)))
    }
}

/// Returns the cell at `index`, or an empty string for ragged rows.
pub fn cell(row: &StringRecord, index: usize) -> &str {
    row.get(index).map(str::trim).unwrap_or_default()
}

pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// The columns the dashboard needs to identify in attendance and student tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Roll,
    Name,
    Time,
}

impl ColumnRole {
    pub fn patterns(&self) -> &'static [&'static str] {
        match self {
            ColumnRole::Roll => &["roll"],
            ColumnRole::Name => &["name"],
            ColumnRole::Time => &["time", "date"],
        }
    }
}

/// Header names declared up front for a table. Roles left as `None` are located by substring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    pub roll: Option<String>,
    pub name: Option<String>,
    pub time: Option<String>,
}

impl ColumnMapping {
    fn declared(&self, role: ColumnRole) -> Option<&str> {
        match role {
            ColumnRole::Roll => self.roll.as_deref(),
            ColumnRole::Name => self.name.as_deref(),
            ColumnRole::Time => self.time.as_deref(),
        }
    }

    /// Locates the column playing `role` in `table`, failing fast when there is none.
    pub fn locate(&self, table: &Table, role: ColumnRole, table_name: &str) -> Result<usize> {
        match self.declared(role) {
            Some(header) => table.column(header).ok_or_else(|| Error::MissingColumn {
                table: table_name.to_string(),
                pattern: normalize_header(header),
            }),
            None => self.locate_optional(table, role).ok_or_else(|| Error::MissingColumn {
                table: table_name.to_string(),
                pattern: role.patterns().join("' or '"),
            }),
        }
    }

    fn locate_optional(&self, table: &Table, role: ColumnRole) -> Option<usize> {
        match self.declared(role) {
            Some(header) => table.column(header),
            None => table.find_column(role.patterns()),
        }
    }
}

pub fn parse_students(table: &Table, mapping: &ColumnMapping) -> Result<Vec<Student>> {
    let roll = mapping.locate(table, ColumnRole::Roll, "students")?;
    let name = mapping.locate(table, ColumnRole::Name, "students")?;

    Ok(table
        .rows()
        .filter(|(_, row)| !cell(row, roll).is_empty())
        .map(|(_, row)| Student::new(cell(row, roll), cell(row, name)))
        .collect())
}

pub fn students_table(students: &[Student]) -> Table {
    Table::new(
        STUDENT_HEADERS,
        students
            .iter()
            .map(|s| vec![s.roll.clone(), s.name.clone()]),
    )
}

/// Parses a timetable. Every row must describe a valid slot; the `day` column is optional.
pub fn parse_timetable(table: &Table) -> Result<Vec<LectureSlot>> {
    let required = |name: &str| {
        table.column(name).ok_or_else(|| Error::MissingColumn {
            table: "timetable".to_string(),
            pattern: name.to_string(),
        })
    };

    let subject = required("subject")?;
    let faculty = required("faculty")?;
    let start = required("start")?;
    let end = required("end")?;
    let day = table.column("day");

    let invalid = |line: u64, err: Error| Error::InvalidRow {
        table: "timetable".to_string(),
        line,
        message: err.to_string(),
    };

    table
        .rows()
        .map(|(line, row)| {
            let day = day
                .map(|i| parse_day(cell(row, i)))
                .transpose()
                .map_err(|e| invalid(line, e))?
                .flatten();
            let start = parse_time(cell(row, start)).map_err(|e| invalid(line, e))?;
            let end = parse_time(cell(row, end)).map_err(|e| invalid(line, e))?;

            LectureSlot::new(day, cell(row, subject), cell(row, faculty), start, end)
                .map_err(|e| invalid(line, e))
        })
        .collect()
}

pub fn timetable_table(slots: &[LectureSlot]) -> Table {
    Table::new(
        TIMETABLE_HEADERS,
        slots.iter().map(|slot| {
            vec![
                slot.day.map(|d| d.to_string()).unwrap_or_default(),
                slot.subject.clone(),
                slot.faculty.clone(),
                slot.start.format("%H:%M").to_string(),
                slot.end.format("%H:%M").to_string(),
            ]
        }),
    )
}

/// A check-in row that was excluded because its timestamp could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRow {
    pub line: u64,
    pub roll: Roll,
    pub raw: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCheckIns {
    pub records: Vec<CheckInRecord>,
    pub dropped: Vec<DroppedRow>,
}

/// Parses an attendance table into check-in records.
///
/// `date` is the day the table belongs to (for per-day files); it is attached to bare `HH:MM`
/// timestamps. Rows whose timestamp cannot be read are dropped and reported in
/// [`ParsedCheckIns::dropped`].
pub fn parse_check_ins(
    table: &Table,
    mapping: &ColumnMapping,
    date: Option<NaiveDate>,
) -> Result<ParsedCheckIns> {
    let roll = mapping.locate(table, ColumnRole::Roll, "attendance")?;
    let time = mapping.locate(table, ColumnRole::Time, "attendance")?;
    let name = mapping.locate_optional(table, ColumnRole::Name);

    let mut parsed = ParsedCheckIns::default();
    for (line, row) in table.rows() {
        let raw = cell(row, time);
        match parse_timestamp(raw, date) {
            Some(timestamp) => parsed.records.push(CheckInRecord {
                roll: cell(row, roll).to_string(),
                name: name
                    .map(|i| cell(row, i))
                    .filter(|n| !n.is_empty())
                    .map(str::to_string),
                timestamp,
            }),
            None => {
                warn!(line, raw, "dropping check-in with unreadable timestamp");
                parsed.dropped.push(DroppedRow {
                    line,
                    roll: cell(row, roll).to_string(),
                    raw: raw.to_string(),
                });
            }
        }
    }

    Ok(parsed)
}

/// The distinct roll numbers in an attendance table.
pub fn roll_set(table: &Table, mapping: &ColumnMapping) -> Result<HashSet<Roll>> {
    let roll = mapping.locate(table, ColumnRole::Roll, "attendance")?;

    Ok(table
        .rows()
        .map(|(_, row)| cell(row, roll))
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect())
}

const DATE_TIME_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Date-only values read as midnight; the day-wise views only need the date.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];

const TIME_FORMATS: [&str; 3] = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

/// Reads a check-in timestamp in any of the formats capture systems are known to write.
pub fn parse_timestamp(raw: &str, date: Option<NaiveDate>) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(timestamp) = DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(timestamp);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.naive_local());
    }

    if let Some(day) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    {
        return day.and_hms_opt(0, 0, 0);
    }

    let time = TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())?;

    date.map(|d| d.and_time(time))
}
