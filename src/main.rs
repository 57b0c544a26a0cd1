use anyhow::Context;
use attendance_dashboard::cli::{Cli, Command};
use attendance_dashboard::display::{self, print_report};
use attendance_dashboard::manager::Report;
use attendance_dashboard::models::{LectureSlot, parse_day, parse_time};
use attendance_dashboard::schema::ColumnMapping;
use attendance_dashboard::settings::Settings;
use attendance_dashboard::{create_default_manager, init_tracing, session};
use chrono::Local;
use clap::Parser;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tabled::Tabled;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let settings =
        Settings::load(cli.config.as_deref()).context("failed to load configuration")?;

    let session = session::login(
        &settings.users,
        &cli.credentials.user,
        &cli.credentials.password,
    )?;
    let ctx = session.context(cli.year)?;

    let manager = create_default_manager(&settings)?;
    let export_dir = cli.export.then_some(settings.reports.export_dir.as_path());
    let now = Local::now().naive_local();

    match cli.command {
        Command::Dashboard { date } => {
            let report = manager.lecture_report(&ctx, date.unwrap_or(now.date()))?;
            emit(&report, export_dir)?;
        }
        Command::Live { subject, at } => {
            let report = manager.live_report(&ctx, at.unwrap_or(now), subject.as_deref())?;
            emit(&report, export_dir)?;
        }
        Command::Today { at } => {
            let report = manager.today_report(&ctx, at.unwrap_or(now))?;
            emit(&report, export_dir)?;
        }
        Command::Monthly {
            calendar_year,
            month,
        } => {
            let report = manager.monthly_report(&ctx, (calendar_year, month))?;
            emit(&report, export_dir)?;
        }
        Command::DayWise { month } => {
            let report = manager.day_wise_report(&ctx, month)?;
            emit(&report, export_dir)?;
            println!("\nAttendance %:\n{}", display::day_wise_chart(&report.rows));
        }
        Command::LectureWise { roll: None, month } => {
            let students = manager.checked_in_students(&ctx, month)?;
            display::show_students(&students);
            println!("Pick a roll number to see their lecture-wise attendance.");
        }
        Command::LectureWise {
            roll: Some(roll),
            month,
        } => {
            let report = manager.lecture_histogram(&ctx, &roll, month)?;
            emit(&report, export_dir)?;
            println!("\nLectures:\n{}", display::lecture_chart(&report.rows));
        }
        Command::Timetable => {
            display::show_timetable(&manager.timetable(&ctx)?);
        }
        Command::AddSlot {
            subject,
            faculty,
            start,
            end,
            day,
        } => {
            let day = parse_day(day.as_deref().unwrap_or_default())?;
            let (start, end) = (parse_time(&start)?, parse_time(&end)?);
            let slot = LectureSlot::new(day, subject, faculty, start, end)?;
            manager.add_slot(&ctx, slot)?;
            println!("Lecture added to the {} timetable.", ctx.year);
        }
        Command::UploadTimetable { file_path } => {
            let csv = read_upload(&file_path)?;
            let slots = manager.upload_timetable(&ctx, &csv)?;
            println!("Uploaded {slots} lecture(s) to the {} timetable.", ctx.year);
        }
        Command::UploadStudents {
            file_path,
            roll_column,
            name_column,
        } => {
            let csv = read_upload(&file_path)?;
            let mapping = ColumnMapping {
                roll: roll_column,
                name: name_column,
                time: None,
            };
            let count = manager.upload_students(&ctx, &csv, &mapping)?;
            println!("Uploaded {count} student(s) to the {} roster.", ctx.year);
        }
        Command::AddStudent(student) => {
            let roll = student.roll.clone();
            manager.add_student(&ctx, student)?;
            println!("Added roll number {roll} to the {} roster.", ctx.year);
        }
        Command::Students => {
            display::show_students(&manager.students(&ctx)?);
        }
        Command::UploadDocument { file_path } => {
            let bytes = read_upload(&file_path)?;
            let file_name = file_path
                .file_name()
                .and_then(|n| n.to_str())
                .with_context(|| format!("'{}' has no usable file name", file_path.display()))?;
            let stored = manager.upload_document(&ctx, file_name, &bytes)?;
            println!("Stored {stored}.");
        }
    }

    Ok(())
}

/// Prints a report and, when exporting, saves its rows as CSV.
fn emit<T: Tabled + Serialize>(
    report: &Report<T>,
    export_dir: Option<&Path>,
) -> anyhow::Result<()> {
    print_report(report);

    if let Some(dir) = export_dir {
        let path = display::export_csv(dir, report)?;
        println!("Saved {}", path.display());
    }

    Ok(())
}

fn read_upload(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read '{}'", path.display()))
}
