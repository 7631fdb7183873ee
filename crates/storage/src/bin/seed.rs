use std::fmt;

use chrono::{DateTime, Utc};
use study_core::model::{ChapterRef, StudyTarget, Subject};
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    subjects: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidSubjects { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidSubjects { raw } => write!(f, "invalid --subjects value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("STUDY_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut subjects = std::env::var("STUDY_SUBJECTS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(2);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--subjects" => {
                    let value = require_value(&mut args, "--subjects")?;
                    subjects = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidSubjects { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            subjects,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --subjects <n>            Number of sample subjects to upsert (default: 2)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  STUDY_DB_URL, STUDY_SUBJECTS");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);
    let today = study_core::StudyDay::from_datetime(now);

    let samples: [(&str, &[(&str, u64)]); 3] = [
        ("Math", &[("Limits", 42), ("Derivatives", 55), ("Integrals", 61)]),
        ("Physics", &[("Kinematics", 38), ("Dynamics", 47)]),
        ("History", &[("Antiquity", 70)]),
    ];

    let mut seeded = 0;
    for i in 0..args.subjects {
        let (name, chapters) = samples[(i as usize) % samples.len()];
        let mut subject = Subject::new(name, now)?;
        for (chapter, pages) in chapters {
            subject.add_chapter(*chapter, *pages)?;
        }
        subject.complete_chapter(chapters[0].0)?;
        storage.subjects.upsert_subject(&subject).await?;
        seeded += 1;
    }

    let refs = vec![
        ChapterRef::new("Math", "Limits")?,
        ChapterRef::new("Physics", "Kinematics")?,
    ];
    storage
        .targets
        .upsert_target(&StudyTarget::new(today, refs))
        .await?;

    println!(
        "Seeded {seeded} subjects and a study target for {today} into {}",
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
