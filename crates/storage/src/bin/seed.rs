use std::fmt;

use quiz_core::model::Stage;
use storage::repository::{NewQuestionRecord, Storage};
use storage::sqlite::PoolSettings;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    stages: Vec<Stage>,
    per_stage: u32,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidStages { raw: String },
    InvalidPerStage { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidStages { raw } => write!(f, "invalid --stages value: {raw}"),
            ArgsError::InvalidPerStage { raw } => write!(f, "invalid --per-stage value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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

fn parse_stages(raw: &str) -> Result<Vec<Stage>, ArgsError> {
    let stages = raw
        .split(',')
        .map(str::parse::<Stage>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ArgsError::InvalidStages {
            raw: raw.to_string(),
        })?;
    if stages.is_empty() {
        return Err(ArgsError::InvalidStages {
            raw: raw.to_string(),
        });
    }
    Ok(stages)
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("SKETCHQUIZ_DB_URL")
            .unwrap_or_else(|_| "sqlite:sketchquiz.sqlite3?mode=rwc".into());
        let mut stages = vec![Stage::new(1), Stage::new(2), Stage::new(3)];
        let mut per_stage = 5;

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
                "--stages" => {
                    let value = require_value(&mut args, "--stages")?;
                    stages = parse_stages(&value)?;
                }
                "--per-stage" => {
                    let value = require_value(&mut args, "--per-stage")?;
                    per_stage = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidPerStage { raw: value.clone() })?;
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
            stages,
            per_stage,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:sketchquiz.sqlite3?mode=rwc)");
    eprintln!("  --stages <a,b,...>        Stages to fill (default: 1,2,3)");
    eprintln!("  --per-stage <n>           Questions inserted per stage (default: 5)");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  SKETCHQUIZ_DB_URL");
}

const SAMPLES: [(&str, &str, &str); 5] = [
    (
        "Which food group gives the most energy for play?",
        r#"["Grains","Sweets","Water"]"#,
        "Grains",
    ),
    (
        "How many portions of fruit and vegetables a day are recommended?",
        r#"["1","3","5"]"#,
        "5",
    ),
    (
        "Which drink is best for staying hydrated?",
        r#"["Soda","Water","Juice"]"#,
        "Water",
    ),
    (
        "Milk and yoghurt are good sources of which mineral?",
        r#"["Iron","Calcium","Sodium"]"#,
        "Calcium",
    ),
    (
        "Which meal helps children concentrate at school?",
        r#"["Breakfast","Late snack","None"]"#,
        "Breakfast",
    ),
];

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url, PoolSettings::default()).await?;

    let mut inserted = 0_u32;
    for stage in &args.stages {
        for i in 0..args.per_stage {
            let (question, options, answer) = SAMPLES[(i as usize) % SAMPLES.len()];
            let record = NewQuestionRecord::new(*stage, format!("[stage {stage}] {question}"))
                .with_options(options)
                .with_answer(answer);
            storage.quiz.insert_question(record).await?;
            inserted += 1;
        }
    }

    println!(
        "Seeded {inserted} questions across {} stage(s) into {}",
        args.stages.len(),
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
