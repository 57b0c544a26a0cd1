use crate::error::{Error, Result};
use crate::models::{
    DayWiseAttendance, LectureAttendance, LectureCount, LectureSlot, LiveAttendance,
    MonthlyAttendance, Roll, Student, TaggedCheckIn,
};
use crate::reconcile;
use crate::schema::{self, ColumnMapping, DroppedRow, ParsedCheckIns, Table};
use crate::session::RequestContext;
use crate::settings::{AttendanceLayout, Settings};
use crate::store::{RecordStore, paths, read_table, validate_path, write_table};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use std::collections::{BTreeMap, HashSet};
use tracing::info;

/// How reports are computed, independent of where the data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub layout: AttendanceLayout,
    pub live_window: TimeDelta,
    pub subject_cutoff: NaiveTime,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            layout: AttendanceLayout::Daily,
            live_window: TimeDelta::minutes(30),
            subject_cutoff: NaiveTime::from_hms_opt(15, 30, 0).unwrap_or_default(),
        }
    }
}

impl ReportOptions {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            layout: settings.store.layout,
            live_window: settings.reports.live_window()?,
            subject_cutoff: settings.reports.subject_cutoff()?,
        })
    }
}

/// A computed report, ready to be displayed or exported.
#[derive(Debug, Clone, PartialEq)]
pub struct Report<T> {
    pub title: String,
    /// A one-line note shown under the title, if any.
    pub summary: Option<String>,
    /// The file name an export of `rows` is saved under.
    pub export_name: String,
    pub rows: Vec<T>,
    /// Check-ins left out because their timestamp could not be read.
    pub dropped: Vec<DroppedRow>,
}

impl<T> Report<T> {
    fn new(title: String, export_name: String, rows: Vec<T>) -> Self {
        Self {
            title,
            summary: None,
            export_name,
            rows,
            dropped: Vec::new(),
        }
    }

    fn with_summary(mut self, summary: String) -> Self {
        self.summary = Some(summary);
        self
    }

    fn with_dropped(mut self, dropped: Vec<DroppedRow>) -> Self {
        self.dropped = dropped;
        self
    }
}

/// A calendar month, as `(year, month)`.
pub type Month = (i32, u32);

/// The manager for uploading, recording and reporting on attendance data.
///
/// Every operation takes the [`RequestContext`] of the user asking, and only touches tables of
/// the year that context names.
pub struct AttendanceManager<S> {
    store: S,
    options: ReportOptions,
}

impl<S: RecordStore> AttendanceManager<S> {
    pub fn new(store: S, options: ReportOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The lecture-wise report for one day: every student against every lecture held that day.
    pub fn lecture_report(
        &self,
        ctx: &RequestContext,
        date: NaiveDate,
    ) -> Result<Report<LectureAttendance>> {
        let roster = self.load_students(ctx)?;
        let timetable = reconcile::lectures_on(&self.load_timetable(ctx)?, date);
        let check_ins = self.day_check_ins(ctx, date)?;

        let rows = reconcile::lecture_wise(&check_ins.records, &roster, &timetable);
        info!(year = %ctx.year, %date, rows = rows.len(), "lecture-wise report");

        Ok(Report::new(
            format!("Lecture-wise attendance, {} on {date}", ctx.year),
            format!("{}_{date}_attendance.csv", ctx.year),
            rows,
        )
        .with_dropped(check_ins.dropped))
    }

    /// Who checked in within the live window ending at `now`.
    ///
    /// `subject` must be on the timetable. Without one, the lecture running at `now` is used.
    pub fn live_report(
        &self,
        ctx: &RequestContext,
        now: NaiveDateTime,
        subject: Option<&str>,
    ) -> Result<Report<LiveAttendance>> {
        let roster = self.load_students(ctx)?;
        let timetable = self.load_timetable(ctx)?;
        let window = self.options.live_window;
        let since = reconcile::window_start(now, window)
            .ok_or(Error::InvalidWindow(window.num_minutes()))?;
        let check_ins = self.window_check_ins(ctx, since, now)?;

        let subject = match subject {
            Some(s) if timetable.iter().any(|slot| slot.subject == s) => s.to_string(),
            Some(s) => return Err(Error::UnknownSubject(s.to_string())),
            None => {
                let todays = reconcile::lectures_on(&timetable, now.date());
                reconcile::slot_at(&todays, now.time())
                    .map(|slot| slot.subject.clone())
                    .unwrap_or_default()
            }
        };

        let rows = reconcile::rolling_window(&check_ins.records, &roster, now, window, &subject);

        Ok(Report::new(
            format!(
                "Live attendance, {} (last {} minutes)",
                ctx.year,
                window.num_minutes()
            ),
            format!("{}_{}_live_attendance.csv", ctx.year, now.date()),
            rows,
        )
        .with_summary(format!(
            "Showing from {} to {}",
            since.format("%H:%M"),
            now.format("%H:%M")
        ))
        .with_dropped(check_ins.dropped))
    }

    /// Every check-in made today, latest first, tagged with its lecture.
    pub fn today_report(
        &self,
        ctx: &RequestContext,
        now: NaiveDateTime,
    ) -> Result<Report<TaggedCheckIn>> {
        let today = now.date();
        let roster = self.load_students(ctx)?;
        let timetable = reconcile::lectures_on(&self.load_timetable(ctx)?, today);
        let check_ins = self.day_check_ins(ctx, today)?;

        let cutoff = self.options.subject_cutoff;
        let rows = reconcile::tag_check_ins(&check_ins.records, &roster, &timetable, today, cutoff);

        Ok(Report::new(
            format!("Today's check-ins, {} on {today}", ctx.year),
            format!("{}_{today}_today_attendance.csv", ctx.year),
            rows,
        )
        .with_summary(format!(
            "Check-ins after {} are not attributed to a lecture",
            cutoff.format("%H:%M")
        ))
        .with_dropped(check_ins.dropped))
    }

    /// Present and held days per student over one calendar month.
    pub fn monthly_report(
        &self,
        ctx: &RequestContext,
        (year, month): Month,
    ) -> Result<Report<MonthlyAttendance>> {
        let dates = reconcile::month_dates(year, month)?;
        let roster = self.load_students(ctx)?;
        let (days, dropped) = self.month_rolls(ctx, &dates)?;

        let rows = reconcile::monthly(&roster, year, month, &days)?;
        info!(year = %ctx.year, month, days = days.len(), "monthly report");

        Ok(Report::new(
            format!("Monthly attendance, {} for {year}-{month:02}", ctx.year),
            format!("{}_{year}_{month}_monthly_attendance.csv", ctx.year),
            rows,
        )
        .with_summary(format!("{} day(s) with attendance on record", days.len()))
        .with_dropped(dropped))
    }

    /// Distinct days present per student, over the whole record or over one month.
    pub fn day_wise_report(
        &self,
        ctx: &RequestContext,
        month: Option<Month>,
    ) -> Result<Report<DayWiseAttendance>> {
        let check_ins = self.check_ins_over(ctx, month)?;
        let summary = reconcile::day_wise(&check_ins.records);

        let context = month_label(month);
        Ok(Report::new(
            format!("Day-wise attendance, {} ({context})", ctx.year),
            format!("{}_{context}_daywise_attendance.csv", ctx.year),
            summary.rows,
        )
        .with_summary(format!("Total days: {}", summary.total_days))
        .with_dropped(check_ins.dropped))
    }

    /// The students that appear in the check-in record, for picking one to inspect.
    pub fn checked_in_students(
        &self,
        ctx: &RequestContext,
        month: Option<Month>,
    ) -> Result<Vec<Student>> {
        let check_ins = self.check_ins_over(ctx, month)?;

        let mut seen = HashSet::new();
        Ok(check_ins
            .records
            .into_iter()
            .filter(|r| seen.insert(r.roll.clone()))
            .map(|r| Student {
                name: r.name.unwrap_or_default(),
                roll: r.roll,
            })
            .collect())
    }

    /// How many lectures of each subject one student's check-ins fell into.
    pub fn lecture_histogram(
        &self,
        ctx: &RequestContext,
        roll: &str,
        month: Option<Month>,
    ) -> Result<Report<LectureCount>> {
        let timetable = self.load_timetable(ctx)?;
        let check_ins = self.check_ins_over(ctx, month)?;

        if !check_ins.records.iter().any(|r| r.roll == roll) {
            return Err(Error::UnknownStudent(roll.to_string()));
        }

        let rows = reconcile::lecture_histogram(&check_ins.records, roll, &timetable);
        if rows.is_empty() {
            return Err(Error::NoLecturesMatched(roll.to_string()));
        }

        Ok(Report::new(
            format!("Lecture-wise attendance, {} roll {roll} ({})", ctx.year, month_label(month)),
            format!("{}_{roll}_lecturewise_attendance.csv", ctx.year),
            rows,
        )
        .with_dropped(check_ins.dropped))
    }

    pub fn students(&self, ctx: &RequestContext) -> Result<Vec<Student>> {
        self.load_students(ctx)
    }

    pub fn timetable(&self, ctx: &RequestContext) -> Result<Vec<LectureSlot>> {
        self.load_timetable(ctx)
    }

    /// Replaces the year's roster with the uploaded CSV. Returns the number of students stored.
    pub fn upload_students(
        &self,
        ctx: &RequestContext,
        csv: &[u8],
        mapping: &ColumnMapping,
    ) -> Result<usize> {
        let table = Table::from_reader(csv)?;
        let students = schema::parse_students(&table, mapping)?;

        let path = paths::students(ctx.year);
        write_table(&self.store, &path, &schema::students_table(&students))?;

        info!(user = %ctx.user, path = %path, students = students.len(), "uploaded students");
        Ok(students.len())
    }

    /// Appends one student to the year's roster, refusing duplicate roll numbers.
    pub fn add_student(&self, ctx: &RequestContext, student: Student) -> Result<()> {
        let student = Student::new(student.roll.trim(), student.name.trim());
        if student.roll.is_empty() {
            return Err(Error::MissingColumn {
                table: "students".to_string(),
                pattern: "roll".to_string(),
            });
        }

        let path = paths::students(ctx.year);
        let mut roster = match self.read_existing(&path)? {
            Some(table) => schema::parse_students(&table, &ColumnMapping::default())?,
            None => Vec::new(),
        };

        if roster.iter().any(|s| s.roll == student.roll) {
            return Err(Error::DuplicateRoll(student.roll));
        }

        info!(user = %ctx.user, path = %path, roll = %student.roll, "adding student");
        roster.push(student);
        write_table(&self.store, &path, &schema::students_table(&roster))
    }

    /// Replaces the year's timetable with the uploaded CSV. Returns the number of slots stored.
    pub fn upload_timetable(&self, ctx: &RequestContext, csv: &[u8]) -> Result<usize> {
        let table = Table::from_reader(csv)?;
        let slots = schema::parse_timetable(&table)?;

        for (i, slot) in slots.iter().enumerate() {
            ensure_no_overlap(&slots[..i], slot)?;
        }

        let path = paths::timetable(ctx.year);
        write_table(&self.store, &path, &schema::timetable_table(&slots))?;

        info!(user = %ctx.user, path = %path, slots = slots.len(), "uploaded timetable");
        Ok(slots.len())
    }

    /// Appends one lecture to the year's timetable.
    pub fn add_slot(&self, ctx: &RequestContext, slot: LectureSlot) -> Result<()> {
        let path = paths::timetable(ctx.year);
        let mut timetable = match self.read_existing(&path)? {
            Some(table) => schema::parse_timetable(&table)?,
            None => Vec::new(),
        };

        ensure_no_overlap(&timetable, &slot)?;

        info!(user = %ctx.user, path = %path, subject = %slot.subject, "adding lecture");
        timetable.push(slot);
        write_table(&self.store, &path, &schema::timetable_table(&timetable))
    }

    /// Stores a raw document for the year. Returns the path it was stored under.
    pub fn upload_document(
        &self,
        ctx: &RequestContext,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String> {
        if file_name.contains('/') || file_name.contains('\\') {
            return Err(Error::InvalidPath(file_name.to_string()));
        }

        let path = paths::document(ctx.year, file_name);
        validate_path(&path)?;
        self.store.write(&path, bytes)?;

        info!(user = %ctx.user, path = %path, bytes = bytes.len(), "uploaded document");
        Ok(path)
    }

    /// Reads a table that is about to be rewritten. Unlike report reads, an unreadable table is an
    /// error here, so that appending never replaces data it could not load.
    fn read_existing(&self, path: &str) -> Result<Option<Table>> {
        match self.store.read(path)? {
            Some(bytes) => Ok(Some(Table::from_reader(bytes.as_slice())?)),
            None => Ok(None),
        }
    }

    fn require(&self, path: &str) -> Result<Table> {
        read_table(&self.store, path).ok_or_else(|| Error::MissingTable(path.to_string()))
    }

    fn load_students(&self, ctx: &RequestContext) -> Result<Vec<Student>> {
        let table = self.require(&paths::students(ctx.year))?;
        schema::parse_students(&table, &ColumnMapping::default())
    }

    fn load_timetable(&self, ctx: &RequestContext) -> Result<Vec<LectureSlot>> {
        let table = self.require(&paths::timetable(ctx.year))?;
        schema::parse_timetable(&table)
    }

    /// The check-ins of a single day. The day's table must exist.
    fn day_check_ins(&self, ctx: &RequestContext, date: NaiveDate) -> Result<ParsedCheckIns> {
        match self.options.layout {
            AttendanceLayout::Daily => {
                let table = self.require(&paths::daily_attendance(date, ctx.year))?;
                schema::parse_check_ins(&table, &ColumnMapping::default(), Some(date))
            }
            AttendanceLayout::Cumulative => {
                let mut parsed = self.cumulative_check_ins(ctx)?;
                parsed.records.retain(|r| r.timestamp.date() == date);
                Ok(parsed)
            }
        }
    }

    /// The check-ins that may fall in `[since, now]`. Every day the window touches is read; only
    /// the day of `now` is required to exist.
    fn window_check_ins(
        &self,
        ctx: &RequestContext,
        since: NaiveDateTime,
        now: NaiveDateTime,
    ) -> Result<ParsedCheckIns> {
        let mut parsed = match self.options.layout {
            AttendanceLayout::Cumulative => self.cumulative_check_ins(ctx)?,
            AttendanceLayout::Daily => {
                let mut parsed = self.day_check_ins(ctx, now.date())?;
                let earlier = since.date().iter_days().take_while(|d| *d < now.date());
                for date in earlier {
                    let path = paths::daily_attendance(date, ctx.year);
                    if let Some(table) = read_table(&self.store, &path) {
                        let day =
                            schema::parse_check_ins(&table, &ColumnMapping::default(), Some(date))?;
                        parsed.records.extend(day.records);
                        parsed.dropped.extend(day.dropped);
                    }
                }
                parsed
            }
        };

        parsed
            .records
            .retain(|r| since <= r.timestamp && r.timestamp <= now);
        Ok(parsed)
    }

    fn cumulative_check_ins(&self, ctx: &RequestContext) -> Result<ParsedCheckIns> {
        let table = self.require(&paths::cumulative_attendance(ctx.year))?;
        schema::parse_check_ins(&table, &ColumnMapping::default(), None)
    }

    /// Check-ins across a month, or across the whole cumulative file when no month is given.
    fn check_ins_over(&self, ctx: &RequestContext, month: Option<Month>) -> Result<ParsedCheckIns> {
        match (self.options.layout, month) {
            (AttendanceLayout::Cumulative, None) => self.cumulative_check_ins(ctx),
            (AttendanceLayout::Cumulative, Some((year, month))) => {
                let mut parsed = self.cumulative_check_ins(ctx)?;
                parsed
                    .records
                    .retain(|r| r.timestamp.year() == year && r.timestamp.month() == month);
                Ok(parsed)
            }
            (AttendanceLayout::Daily, None) => Err(Error::MonthRequired),
            (AttendanceLayout::Daily, Some((year, month))) => {
                let mut all = ParsedCheckIns::default();
                let mut found = false;
                for date in reconcile::month_dates(year, month)? {
                    let path = paths::daily_attendance(date, ctx.year);
                    let Some(table) = read_table(&self.store, &path) else {
                        continue;
                    };

                    found = true;
                    let parsed =
                        schema::parse_check_ins(&table, &ColumnMapping::default(), Some(date))?;
                    all.records.extend(parsed.records);
                    all.dropped.extend(parsed.dropped);
                }

                if !found {
                    return Err(Error::MissingTable(format!(
                        "attendance for {year}-{month:02}"
                    )));
                }
                Ok(all)
            }
        }
    }

    /// The rolls seen on each date that has attendance on record.
    fn month_rolls(
        &self,
        ctx: &RequestContext,
        dates: &[NaiveDate],
    ) -> Result<(BTreeMap<NaiveDate, HashSet<Roll>>, Vec<DroppedRow>)> {
        let mut days = BTreeMap::new();

        match self.options.layout {
            AttendanceLayout::Daily => {
                for &date in dates {
                    if let Some(table) =
                        read_table(&self.store, &paths::daily_attendance(date, ctx.year))
                    {
                        days.insert(date, schema::roll_set(&table, &ColumnMapping::default())?);
                    }
                }
                Ok((days, Vec::new()))
            }
            AttendanceLayout::Cumulative => {
                let Some(table) = read_table(&self.store, &paths::cumulative_attendance(ctx.year))
                else {
                    return Ok((days, Vec::new()));
                };

                let parsed = schema::parse_check_ins(&table, &ColumnMapping::default(), None)?;
                for record in parsed.records {
                    let date = record.timestamp.date();
                    if dates.contains(&date) {
                        days.entry(date)
                            .or_insert_with(HashSet::new)
                            .insert(record.roll);
                    }
                }
                Ok((days, parsed.dropped))
            }
        }
    }
}

fn ensure_no_overlap(existing: &[LectureSlot], slot: &LectureSlot) -> Result<()> {
    match existing.iter().find(|other| other.overlaps(slot)) {
        Some(other) => Err(Error::OverlappingSlot {
            subject: slot.subject.clone(),
            existing: other.subject.clone(),
        }),
        None => Ok(()),
    }
}

fn month_label(month: Option<Month>) -> String {
    match month {
        Some((year, month)) => format!("{year}-{month:02}"),
        None => "all".to_string(),
    }
}
