//! `timetable` CLI: list, filter, and reschedule weekly class sections.
//!
//! ## Usage
//!
//! ```sh
//! # List this week's occurrences
//! timetable list -i schedule.json
//!
//! # Only Prof. Lee's classes in Room 101, for the week of 2026-03-16
//! timetable list -i schedule.json --professor Lee --room "Room 101" --week 2026-03-16
//!
//! # Show the professor / room / grade values available for filtering
//! timetable facets -i schedule.json
//!
//! # Move section A's Monday meeting (and every other day of its slot) to 09:30-10:30
//! timetable move -i schedule.json --occurrence A-M --start 09:30 --end 10:30
//!
//! # Same, accepting any conflicts without prompting
//! timetable move -i schedule.json --occurrence A-M --start 09:30 --end 10:30 --yes
//! ```

mod config;
mod file_store;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Args, Parser, Subcommand};
use timetable_engine::conflict::describe_conflicts;
use timetable_engine::time::local_now;
use timetable_engine::{
    format_time_of_day, parse_time_of_day, Conflict, ConflictResolver, Decision, ExpandOptions,
    Facet, FacetFilter, FacetOptions, LoadOutcome, MoveOutcome, MoveRequest, Occurrence,
    OccurrenceId, Rescheduler,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::file_store::JsonFileStore;

#[derive(Parser)]
#[command(
    name = "timetable",
    version,
    about = "Weekly class schedule: list, filter, and reschedule sections"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML config file (timezone, default_day, schedule_file)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log engine activity to stderr (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Args)]
struct ScheduleArgs {
    /// Schedule JSON file (falls back to `schedule_file` from the config)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Any date in the week to show, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    week: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// List occurrences for the week, optionally filtered by facet
    List {
        #[command(flatten)]
        schedule: ScheduleArgs,
        /// Keep only these professors (repeatable)
        #[arg(long)]
        professor: Vec<String>,
        /// Keep only these rooms (repeatable)
        #[arg(long)]
        room: Vec<String>,
        /// Keep only these grade levels (repeatable)
        #[arg(long)]
        grade: Vec<String>,
        /// Print occurrences as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show the distinct professors, rooms, and grade levels
    Facets {
        #[command(flatten)]
        schedule: ScheduleArgs,
    },
    /// Move one occurrence, and every occurrence sharing its time slot, to a new time
    Move {
        #[command(flatten)]
        schedule: ScheduleArgs,
        /// Occurrence to move, e.g. "A-M"
        #[arg(long)]
        occurrence: String,
        /// New start time, HH:MM or HH:MM:SS
        #[arg(long)]
        start: String,
        /// New end time, HH:MM or HH:MM:SS
        #[arg(long)]
        end: String,
        /// Date the occurrence was dropped on, within the listed week (defaults to its
        /// current date)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Accept conflicts without prompting
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::List {
            schedule,
            professor,
            room,
            grade,
            json,
        } => {
            let rescheduler = load_schedule(&schedule, &settings).await?;

            let mut filter = FacetFilter::new();
            for (facet, values) in [
                (Facet::Professor, professor),
                (Facet::Room, room),
                (Facet::GradeLevel, grade),
            ] {
                for value in values {
                    filter.select(facet, value);
                }
            }

            let shown = filter.apply(rescheduler.occurrences());
            if json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                for occurrence in shown {
                    println!("{}", format_occurrence(occurrence));
                }
            }
        }
        Commands::Facets { schedule } => {
            let rescheduler = load_schedule(&schedule, &settings).await?;
            let options = FacetOptions::from_occurrences(rescheduler.occurrences());
            println!("Professors:   {}", options.professors.join(", "));
            println!("Rooms:        {}", options.rooms.join(", "));
            println!("Grade levels: {}", options.grade_levels.join(", "));
        }
        Commands::Move {
            schedule,
            occurrence,
            start,
            end,
            date,
            yes,
        } => {
            let mut rescheduler = load_schedule(&schedule, &settings).await?;
            let request = build_move_request(&rescheduler, &occurrence, &start, &end, date)?;
            let resolver = PromptResolver { assume_yes: yes };

            let outcome = rescheduler.reschedule(&request, &resolver).await;
            if let Some(notice) = outcome.notice() {
                anyhow::bail!("{}", notice.messages.join("\n"));
            }
            match outcome {
                MoveOutcome::Committed {
                    start,
                    end,
                    updated,
                    overridden,
                    ..
                } => {
                    let ids: Vec<String> = updated.iter().map(ToString::to_string).collect();
                    println!("Moved {} to {}-{}", ids.join(", "), start, end);
                    if !overridden.is_empty() {
                        println!("Overrode {} conflict(s)", overridden.len());
                    }
                }
                MoveOutcome::Declined { .. } => println!("Move cancelled; schedule unchanged"),
                MoveOutcome::Rejected(_) | MoveOutcome::PersistFailed { .. } => {}
            }
        }
    }

    Ok(())
}

/// Install a stderr `fmt` subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn load_schedule(
    args: &ScheduleArgs,
    settings: &Settings,
) -> Result<Rescheduler<JsonFileStore>> {
    let path = schedule_path(args.input.as_deref(), settings)?;
    let options = ExpandOptions {
        default_day: settings.default_day,
    };
    let mut rescheduler = Rescheduler::with_options(JsonFileStore::new(path), options);

    let reference = match args.week {
        Some(day) => day.and_time(NaiveTime::MIN),
        None => local_now(settings.timezone),
    };
    debug!(%reference, path = %rescheduler.store().path().display(), "loading schedule");

    match rescheduler.load(reference).await {
        LoadOutcome::Loaded { skipped, .. } => {
            for section in skipped {
                eprintln!("warning: skipped section {} (invalid times)", section);
            }
        }
        LoadOutcome::Failed { error } => {
            return Err(error).context("Failed to load schedule");
        }
    }
    Ok(rescheduler)
}

fn schedule_path(input: Option<&Path>, settings: &Settings) -> Result<PathBuf> {
    input
        .map(Path::to_path_buf)
        .or_else(|| settings.schedule_file.clone())
        .context("No schedule file: pass -i/--input or set schedule_file in the config")
}

/// Turn CLI flags into the same drag-completed event a calendar widget emits.
fn build_move_request(
    rescheduler: &Rescheduler<JsonFileStore>,
    occurrence: &str,
    start: &str,
    end: &str,
    date: Option<NaiveDate>,
) -> Result<MoveRequest> {
    let id = OccurrenceId::new(occurrence);
    let current = rescheduler
        .occurrences()
        .get(&id)
        .with_context(|| format!("Unknown occurrence: {}", occurrence))?;

    let date = date.unwrap_or_else(|| current.date());
    let start = parse_time_of_day(start).context("Invalid --start")?;
    let end = parse_time_of_day(end).context("Invalid --end")?;

    Ok(MoveRequest {
        occurrence_id: id,
        new_start: NaiveDateTime::new(date, start),
        new_end: NaiveDateTime::new(date, end),
        all_day: false,
    })
}

fn format_occurrence(o: &Occurrence) -> String {
    format!(
        "{:<10} {:<9} {}-{}  {:<12} {:<12} {:<12} grade {}",
        o.id.as_str(),
        o.day.to_string(),
        format_time_of_day(o.start),
        format_time_of_day(o.end),
        o.title,
        o.professor,
        o.room,
        o.grade_level
    )
}

/// Confirm step backed by the terminal.
struct PromptResolver {
    assume_yes: bool,
}

#[async_trait]
impl ConflictResolver for PromptResolver {
    async fn confirm(&self, conflicts: &[Conflict]) -> Decision {
        println!("This move has {} conflict(s):", conflicts.len());
        for message in describe_conflicts(conflicts) {
            println!("  - {}", message);
        }
        if self.assume_yes {
            return Decision::Accept;
        }

        print!("Apply anyway? [y/N] ");
        let _ = io::stdout().flush();

        let mut answer = String::new();
        let read = io::stdin().read_line(&mut answer);
        match read {
            Ok(_) if matches!(answer.trim(), "y" | "Y" | "yes" | "YES") => Decision::Accept,
            _ => Decision::Decline,
        }
    }
}
