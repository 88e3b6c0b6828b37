use std::path::PathBuf;

use anyhow::Context;
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use class_staffing::config::Config;
use class_staffing::display::{format_lesson, render_batch_report, render_day_report, write_report_to_file};
use class_staffing::schedule::{register_candidate, LessonCode};
use class_staffing::staff::{reflect_wishes, sync_priority_from_staff};
use class_staffing::staffing::{date_label, preview_lessons, run_all, run_date};
use class_staffing::workbook::Workbook;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the workbook's CSV sheets
    #[arg(long, short, env = "CLASS_STAFFING_WORKBOOK", default_value = "data", global = true)]
    workbook: PathBuf,
    /// JSON file overriding sheet names, layout and markers
    #[arg(long, short, env = "CLASS_STAFFING_CONFIG", global = true)]
    config: Option<PathBuf>,
    /// Print results as JSON instead of a report
    #[arg(long, global = true)]
    json: bool,
    /// Also write the report to this file
    #[arg(long, global = true)]
    report: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Staff a single date
    Run {
        #[arg(long)]
        date: NaiveDate,
    },
    /// Staff every date schedule in the workbook
    Batch {
        /// Year for sheets that only carry month and day
        #[arg(long)]
        year: Option<i32>,
    },
    /// List the lessons a date would have, without assigning anyone
    Lessons {
        #[arg(long)]
        date: NaiveDate,
    },
    /// Copy each teacher's wishes from their own sheet onto the date sheets
    Wishes {
        /// Year for dates that only carry month and day
        #[arg(long)]
        year: Option<i32>,
    },
    /// Add teachers to the priority lists of the lessons their own sheets mark as teachable
    SyncPriority,
    /// Add a teacher to the end of a lesson's priority list
    Register {
        #[arg(long)]
        lesson: LessonCode,
        #[arg(long)]
        teacher: String,
    },
}

#[derive(Serialize)]
struct LessonLine {
    period: u8,
    code: String,
    grade: String,
    subject: String,
    teacher: Option<String>,
}

fn emit(args: &Args, report: &str, json: impl Serialize) -> anyhow::Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        print!("{}", report);
    }
    if let Some(path) = &args.report {
        write_report_to_file(report, path)?;
        info!(path = %path.display(), "report saved");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    let mut workbook = Workbook::open(&args.workbook)
        .with_context(|| format!("opening workbook {}", args.workbook.display()))?;

    match &args.command {
        Command::Run { date } => {
            let run = run_date(&mut workbook, &config, *date)?;
            let report = render_day_report(&run.summary, &run.lessons);
            let lines: Vec<LessonLine> = run
                .lessons
                .iter()
                .map(|l| LessonLine {
                    period: l.period.number(),
                    code: l.code.to_string(),
                    grade: l.grade_name.clone(),
                    subject: l.subject_name.clone(),
                    teacher: l.assigned_teacher.clone(),
                })
                .collect();
            emit(&args, &report, serde_json::json!({ "summary": run.summary, "lessons": lines }))?;
        }
        Command::Batch { year } => {
            let year = year.unwrap_or_else(|| Local::now().year());
            let summary = run_all(&mut workbook, &config, year)?;
            emit(&args, &render_batch_report(&summary), &summary)?;
        }
        Command::Lessons { date } => {
            let lessons = preview_lessons(&workbook, &config, *date)?;
            let mut report = format!("=== Lessons on {} ===\n", date_label(*date));
            for lesson in &lessons {
                report.push_str(&format!(
                    "  period {} {} (score {})\n",
                    lesson.period,
                    format_lesson(&lesson.code.to_string(), &lesson.grade_name, &lesson.subject_name),
                    lesson.priority_score()
                ));
            }
            emit(&args, &report, &lessons)?;
        }
        Command::Wishes { year } => {
            let year = year.unwrap_or_else(|| Local::now().year());
            let reflection = reflect_wishes(&mut workbook, &config, year)?;
            emit(&args, &reflection.to_string(), &reflection)?;
        }
        Command::SyncPriority => {
            let sync = sync_priority_from_staff(&mut workbook, &config)?;
            emit(&args, &sync.to_string(), &sync)?;
        }
        Command::Register { lesson, teacher } => {
            let sheet = config.sheets.priority.clone();
            let table = workbook
                .sheet_mut(&sheet)
                .with_context(|| format!("priority table sheet `{}` not found", sheet))?;
            let added = register_candidate(*lesson, teacher, table, &config.priority)?;
            if added {
                workbook.save_sheet(&sheet)?;
            }
            let report = if added {
                format!("Added {} to the priority list of {}\n", teacher, lesson)
            } else {
                format!("{} is already on the priority list of {}\n", teacher, lesson)
            };
            emit(&args, &report, serde_json::json!({ "lesson": lesson, "teacher": teacher, "added": added }))?;
        }
    }

    Ok(())
}
