//! This module contains the command-line interface [`Cli`] parser for the attendance dashboard.

use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::manager::Month;
use crate::models::{Student, Year};

/// The command line configuration struct, where the command-line interface parser is automatically
/// derived by [`clap::Parser`].
#[derive(Parser, Debug)]
#[command(version, about = "Attendance dashboard for SE, TE and BE cohorts")]
pub struct Cli {
    #[command(flatten)]
    pub credentials: Credentials,

    /// The year to work on. Required for accounts that may view every year.
    #[arg(long, global = true, value_parser = parse_year)]
    pub year: Option<Year>,

    /// Path to the configuration file (defaults to `config.toml` if present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Also save the displayed report as CSV into the configured export directory.
    #[arg(long, global = true)]
    pub export: bool,

    /// The different pages of the dashboard.
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct Credentials {
    /// User ID.
    #[arg(long, short, env = "ATTENDANCE_USER")]
    pub user: String,

    /// Password.
    #[arg(long, short, env = "ATTENDANCE_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Lecture-wise attendance of every student for one day.
    Dashboard {
        /// The day to report on (defaults to today).
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Who checked in during the live window.
    Live {
        /// The subject to label the report with (defaults to the lecture running now).
        #[arg(long)]
        subject: Option<String>,

        /// Report as of this instant instead of now, e.g. `2025-01-10T10:00:00`.
        #[arg(long)]
        at: Option<NaiveDateTime>,
    },

    /// Every check-in of today, latest first, tagged with its lecture.
    Today {
        /// Report as of this instant instead of now.
        #[arg(long)]
        at: Option<NaiveDateTime>,
    },

    /// Present days per student over one month.
    Monthly {
        /// The calendar year, e.g. 2025.
        #[arg(value_name = "YEAR")]
        calendar_year: i32,

        /// The month, 1 to 12.
        #[arg(value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,
    },

    /// Distinct days present per student, with a percentage chart.
    DayWise {
        /// Restrict to one month, as `YYYY-MM`. Required when attendance is stored per day.
        #[arg(long, value_parser = parse_month)]
        month: Option<Month>,
    },

    /// Lectures attended per subject by one student. Lists the students without a roll number.
    LectureWise {
        roll: Option<String>,

        /// Restrict to one month, as `YYYY-MM`. Required when attendance is stored per day.
        #[arg(long, value_parser = parse_month)]
        month: Option<Month>,
    },

    /// Display the year's timetable.
    Timetable,

    /// Add a lecture to the year's timetable.
    AddSlot {
        subject: String,
        faculty: String,
        /// Start time, `HH:MM`.
        start: String,
        /// End time, `HH:MM`.
        end: String,
        /// Mon to Fri. Without it the lecture is held every day.
        #[arg(long)]
        day: Option<String>,
    },

    /// Replace the year's timetable with a CSV file.
    UploadTimetable { file_path: PathBuf },

    /// Replace the year's roster with a CSV file.
    UploadStudents {
        file_path: PathBuf,

        /// The header of the roll number column, if it does not contain "roll".
        #[arg(long)]
        roll_column: Option<String>,

        /// The header of the name column, if it does not contain "name".
        #[arg(long)]
        name_column: Option<String>,
    },

    /// Add a new student to the roster.
    AddStudent(Student),

    /// Display the year's roster.
    Students,

    /// Store a document for the year.
    UploadDocument { file_path: PathBuf },
}

pub fn parse_year(raw: &str) -> Result<Year, String> {
    raw.parse().map_err(|e: crate::Error| e.to_string())
}

/// Parses `YYYY-MM`.
pub fn parse_month(raw: &str) -> Result<Month, String> {
    let invalid = || format!("invalid month '{raw}', expected YYYY-MM");

    let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;

    if (1..=12).contains(&month) {
        Ok((year, month))
    } else {
        Err(invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn months_parse() {
        assert_eq!(parse_month("2025-02"), Ok((2025, 2)));
        assert_eq!(parse_month("2025-2"), Ok((2025, 2)));
        assert!(parse_month("2025-13").is_err());
        assert!(parse_month("2025").is_err());
    }

    #[test]
    fn subcommands_parse() {
        let cli = Cli::try_parse_from([
            "attendance",
            "--user",
            "hod",
            "--password",
            "hod123",
            "--year",
            "te",
            "monthly",
            "2025",
            "2",
        ])
        .unwrap();

        assert_eq!(cli.year, Some(Year::Te));
        assert!(matches!(
            cli.command,
            Command::Monthly {
                calendar_year: 2025,
                month: 2
            }
        ));

        assert!(
            Cli::try_parse_from(["attendance", "-u", "se", "-p", "x", "monthly", "2025", "13"])
                .is_err()
        );

        let cli = Cli::try_parse_from([
            "attendance", "-u", "se", "-p", "se123", "add-student", "42", "Ada Lovelace",
        ])
        .unwrap();
        match cli.command {
            Command::AddStudent(student) => assert_eq!(student, Student::new("42", "Ada Lovelace")),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
