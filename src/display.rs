use crate::error::Result;
use crate::manager::Report;
use crate::models::{DayWiseAttendance, LectureCount, LectureSlot, Student};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled, settings::Style};
use tracing::info;

/// The width of the longest bar in a chart, in characters.
const CHART_WIDTH: usize = 40;

/// Renders a report as its title, summary, any data-quality warning, and the table of rows.
pub fn render_report<T: Tabled>(report: &Report<T>) -> String {
    let mut out = format!("{}\n", report.title);

    if let Some(summary) = &report.summary {
        out.push_str(summary);
        out.push('\n');
    }

    if !report.dropped.is_empty() {
        let lines: Vec<String> = report.dropped.iter().map(|d| d.line.to_string()).collect();
        out.push_str(&format!(
            "Warning: {} check-in(s) with unreadable timestamps were left out (rows {})\n",
            report.dropped.len(),
            lines.join(", ")
        ));
    }

    let mut table = Table::new(&report.rows);
    table.with(Style::modern());
    out.push_str(&table.to_string());
    out
}

/// Pretty prints a report.
pub fn print_report<T: Tabled>(report: &Report<T>) {
    println!("{}", render_report(report));
}

/// Horizontal bars, scaled so that `max` fills [`CHART_WIDTH`] characters.
pub fn bar_chart(bars: &[(String, f64)], max: f64) -> String {
    let label_width = bars.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);

    bars.iter()
        .map(|(label, value)| {
            let filled = if max > 0.0 {
                ((value / max).clamp(0.0, 1.0) * CHART_WIDTH as f64).round() as usize
            } else {
                0
            };
            format!(
                "{label:<label_width$} | {}{} {value}\n",
                "█".repeat(filled),
                " ".repeat(CHART_WIDTH - filled)
            )
        })
        .collect()
}

/// Attendance percentage per student, labelled `Name (Roll)`.
pub fn day_wise_chart(rows: &[DayWiseAttendance]) -> String {
    let bars: Vec<(String, f64)> = rows
        .iter()
        .map(|r| (format!("{} ({})", r.name, r.roll), r.percent))
        .collect();
    bar_chart(&bars, 100.0)
}

/// Lectures attended per subject.
pub fn lecture_chart(rows: &[LectureCount]) -> String {
    let max = rows.iter().map(|r| r.lectures).max().unwrap_or(0) as f64;
    let bars: Vec<(String, f64)> = rows
        .iter()
        .map(|r| (r.subject.clone(), r.lectures as f64))
        .collect();
    bar_chart(&bars, max)
}

/// Pretty prints a year's roster.
pub fn show_students(students: &[Student]) {
    let mut table = Table::new(students);
    table.with(Style::modern());
    println!("Students ({}):\n{table}", students.len());
}

/// Pretty prints a year's timetable.
pub fn show_timetable(timetable: &[LectureSlot]) {
    #[derive(Tabled)]
    struct TimetableRow {
        #[tabled(rename = "Day")]
        day: String,
        #[tabled(rename = "Subject")]
        subject: String,
        #[tabled(rename = "Faculty")]
        faculty: String,
        #[tabled(rename = "Start")]
        start: String,
        #[tabled(rename = "End")]
        end: String,
    }

    let rows: Vec<TimetableRow> = timetable
        .iter()
        .map(|slot| TimetableRow {
            day: slot
                .day
                .map(|d| d.to_string())
                .unwrap_or_else(|| "Every day".to_string()),
            subject: slot.subject.clone(),
            faculty: slot.faculty.clone(),
            start: slot.start.format("%H:%M").to_string(),
            end: slot.end.format("%H:%M").to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::modern());
    println!("Timetable:\n{table}");
}

/// Writes `rows` as CSV with a header line.
pub fn write_csv<T: Serialize, W: Write>(writer: W, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Saves the report's rows into `dir` under the report's export name.
pub fn export_csv<T: Serialize>(dir: &Path, report: &Report<T>) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(&report.export_name);

    let file = fs::File::create(&path)?;
    write_csv(file, &report.rows)?;

    info!(path = %path.display(), rows = report.rows.len(), "exported report");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LiveAttendance, Status};
    use crate::schema::DroppedRow;

    fn live_report() -> Report<LiveAttendance> {
        Report {
            title: "Live attendance, SE".to_string(),
            summary: Some("Showing from 09:30 to 10:00".to_string()),
            export_name: "SE_2025-01-10_live_attendance.csv".to_string(),
            rows: vec![LiveAttendance {
                roll: "1".to_string(),
                name: "A".to_string(),
                subject: "Math".to_string(),
                status: Status::Present,
            }],
            dropped: vec![DroppedRow {
                line: 3,
                roll: "2".to_string(),
                raw: "??".to_string(),
            }],
        }
    }

    #[test]
    fn rendering_surfaces_dropped_rows() {
        let out = render_report(&live_report());
        assert!(out.starts_with("Live attendance, SE\nShowing from 09:30 to 10:00\n"));
        assert!(out.contains("1 check-in(s) with unreadable timestamps"));
        assert!(out.contains("Present"));
    }

    #[test]
    fn export_writes_the_displayed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_csv(dir.path(), &live_report()).unwrap();

        assert_eq!(path.file_name().unwrap(), "SE_2025-01-10_live_attendance.csv");
        let written = fs::read_to_string(path).unwrap();
        assert_eq!(written, "Roll,Name,Subject,Status\n1,A,Math,Present\n");
    }

    #[test]
    fn bars_scale_to_the_maximum() {
        let chart = bar_chart(&[("a".to_string(), 100.0), ("bb".to_string(), 50.0)], 100.0);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].matches('█').count(), CHART_WIDTH);
        assert_eq!(lines[1].matches('█').count(), CHART_WIDTH / 2);
        assert!(lines[0].starts_with("a  | "));
    }
}
