//! Updates the roster of students.
//!
//! This binary reads a roster CSV and compares it against the roster currently stored for the
//! year. It prints the students dropped and added, then stores the new roster in place of the
//! old one.

use anyhow::Context;
use attendance_dashboard::cli::{Credentials, parse_year};
use attendance_dashboard::models::{Student, Year};
use attendance_dashboard::schema::{self, ColumnMapping, Table};
use attendance_dashboard::settings::Settings;
use attendance_dashboard::{Error, create_default_manager, init_tracing, session};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Replace a year's roster, showing who was dropped and added")]
struct Args {
    #[command(flatten)]
    credentials: Credentials,

    #[arg(long, value_parser = parse_year)]
    year: Option<Year>,

    #[arg(long)]
    config: Option<PathBuf>,

    /// The path to the new roster of students.
    roster: PathBuf,
}

pub fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let settings =
        Settings::load(args.config.as_deref()).context("failed to load configuration")?;
    let session = session::login(
        &settings.users,
        &args.credentials.user,
        &args.credentials.password,
    )?;
    let ctx = session.context(args.year)?;
    let manager = create_default_manager(&settings)?;

    let csv = fs::read(&args.roster)
        .with_context(|| format!("failed to read '{}'", args.roster.display()))?;
    let table = Table::from_reader(csv.as_slice())?;
    let new_roster = schema::parse_students(&table, &ColumnMapping::default())?;

    let curr_roster = match manager.students(&ctx) {
        Ok(students) => students,
        Err(Error::MissingTable(_)) => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    let dropped: Vec<&Student> = curr_roster
        .iter()
        .filter(|student| !new_roster.contains(student))
        .collect();
    println!("Students dropped: {:#?}", dropped);

    let added: Vec<&Student> = new_roster
        .iter()
        .filter(|student| !curr_roster.contains(student))
        .collect();
    println!("Students added: {:#?}", added);

    let count = manager.upload_students(&ctx, &csv, &ColumnMapping::default())?;
    println!("The {} roster now has {count} student(s).", ctx.year);

    Ok(())
}
