use std::fs;
use std::path::Path;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use orioks_schedule::config::Config;
use orioks_schedule::cycle::WeekCycleTable;
use orioks_schedule::error::{Result, ScheduleError};
use orioks_schedule::exams::{render_timeline, upcoming, ExamEvent};
use orioks_schedule::feed::FeedClient;
use orioks_schedule::grades::summarize;
use orioks_schedule::lesson::{RawScheduleFeed, WeekVariant};
use orioks_schedule::refresh::{self, CachedInfo, CountedSchedule, INFO_KEY};
use orioks_schedule::store::Store;
use orioks_schedule::timetable::Timetable;
use orioks_schedule::util::{moscow_now, parse_weekday, truncate};
use orioks_schedule::view::upcoming_days;

#[derive(Parser)]
#[command(name = "orioks_schedule")]
#[command(about = "Closest lesson days and exam timeline for an ORIOKS student group")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the feeds if the cache is stale and recount the schedule
    Refresh {
        /// Refetch even if the cached data is fresh
        #[arg(short, long)]
        force: bool,
    },
    /// Forget every cached feed and table
    Clear,
    /// Show the next lesson days (or the exam timeline during the session)
    Today {
        /// Current week variant, e.g. "1 числитель" (default: taken from the student page)
        #[arg(short, long)]
        week: Option<String>,
    },
    /// Show one cell of the cached week cycle table
    Table {
        /// Week variant, e.g. "2 знаменатель"
        #[arg(short, long)]
        week: String,
        /// Weekday name or Sunday-based number (0..=6)
        #[arg(short, long)]
        day: String,
    },
    /// Show the exam timeline
    Exams,
    /// Show current grades
    Grades,
    /// Build the week cycle table from a saved lesson feed
    Build {
        /// Lesson feed JSON file
        #[arg(short, long)]
        input: String,
        /// Where to write the table (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("orioks_schedule=info".parse().expect("static directive")),
        )
        .init();

    let cli = Cli::parse();

    let config = if Path::new(&cli.config).exists() {
        Config::load(&cli.config)?
    } else {
        warn!("Config file '{}' not found, using defaults", cli.config);
        Config::default()
    };

    match cli.command {
        Commands::Refresh { force } => {
            let client = FeedClient::new(&config.feed)?;
            let mut store = Store::open(&config.cache.path)?;
            let state = refresh::refresh(&config, &client, &mut store, force).await?;
            info!("Cache updated at {} for group {}", state.update_time, state.group);
        }
        Commands::Clear => {
            let mut store = Store::open(&config.cache.path)?;
            let removed = refresh::clear_cache(&mut store)?;
            info!("Removed {} cached entries from {}", removed, config.cache.path);
        }
        Commands::Today { week } => {
            let state = cached_or_refresh(&config).await?;
            match &state.counted_schedule {
                Some(CountedSchedule::Lessons(table)) => {
                    let week = match week {
                        Some(label) => label.parse::<WeekVariant>()?,
                        None => state.week.ok_or_else(|| {
                            ScheduleError::Config("Current week unknown, pass --week".to_string())
                        })?,
                    };
                    for day in upcoming_days(table, week, moscow_now())? {
                        println!("\n{}", day.title);
                        println!("{}", "-".repeat(40));
                        for block in day.text_blocks() {
                            println!("{}\n", block);
                        }
                    }
                }
                Some(CountedSchedule::Exams(events)) => print_exams(events),
                None => return Err(ScheduleError::Store("Nothing counted yet".to_string())),
            }
        }
        Commands::Table { week, day } => {
            let week = week.parse::<WeekVariant>()?;
            let weekday = parse_weekday(&day)
                .ok_or_else(|| ScheduleError::Config(format!("Unknown weekday '{}'", day)))?;

            let state = cached_or_refresh(&config).await?;
            let Some(CountedSchedule::Lessons(table)) = &state.counted_schedule else {
                return Err(ScheduleError::Store("No lesson table cached (exam session?)".to_string()));
            };
            let cell = table
                .cell(week, weekday)
                .ok_or_else(|| ScheduleError::Store(format!("No cell for {} day {}", week, weekday)))?;

            for block in cell {
                println!("\n+{} day(s)", block.date_offset);
                println!("{:<4} {:<40} {:<13} {:<12}", "#", "Lesson", "Time", "Room");
                println!("{}", "-".repeat(72));
                for lesson in &block.lessons {
                    println!(
                        "{:<4} {:<40} {:<13} {:<12}",
                        lesson.lesson_number,
                        truncate(&lesson.display_name(), 38),
                        format!("{}-{}", lesson.start_time.format("%H:%M"), lesson.end_time.format("%H:%M")),
                        truncate(&lesson.location, 12)
                    );
                }
            }
        }
        Commands::Exams => {
            let state = cached_or_refresh(&config).await?;
            match &state.counted_schedule {
                Some(CountedSchedule::Exams(events)) => print_exams(events),
                _ => println!("\nNo exam session at the moment."),
            }
        }
        Commands::Grades => {
            let client = FeedClient::new(&config.feed)?;
            let page = client.fetch_student_page().await?;
            let feed = page.disciplines()?;

            println!("\n{:<40} {:<8} {:<8} {:<20}", "Discipline", "Score", "%", "Grade");
            println!("{}", "-".repeat(78));
            for summary in summarize(&feed.dises) {
                println!(
                    "{:<40} {:<8} {:<8} {:<20}",
                    truncate(&summary.name, 38),
                    summary.sum_text(),
                    summary.percent_text(),
                    format!("{} ({})", summary.grade.label, summary.grade.score)
                );
            }
        }
        Commands::Build { input, output } => {
            let content = fs::read_to_string(&input)?;
            let feed: RawScheduleFeed = serde_json::from_str(&content)?;
            let timetable =
                Timetable::from_feed(&feed)?.with_excluded_marker(&config.timetable.excluded_teacher_marker);
            let table = WeekCycleTable::build(&timetable)?;
            let json = serde_json::to_string_pretty(&table)?;

            match output {
                Some(path) => {
                    fs::write(&path, json)?;
                    info!("Wrote week cycle table to {}", path);
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}

/// Cached state if there is any, otherwise a fresh fetch
async fn cached_or_refresh(config: &Config) -> Result<CachedInfo> {
    let mut store = Store::open(&config.cache.path)?;
    if let Some(state) = store.get::<CachedInfo>(INFO_KEY)? {
        if state.counted_schedule.is_some() {
            return Ok(state);
        }
    }

    info!("Nothing cached yet, fetching...");
    let client = FeedClient::new(&config.feed)?;
    refresh::refresh(config, &client, &mut store, false).await
}

fn print_exams(events: &[ExamEvent]) {
    let now = Utc::now();
    let events = upcoming(events.to_vec(), now);

    if events.is_empty() {
        println!("\nNo upcoming exams.");
        return;
    }

    for entry in render_timeline(&events, now) {
        println!("\n{}", entry.title);
        println!("{}", "-".repeat(40));
        println!("{}", entry.event.text_block());
    }
}
