use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::warn;

use wp_extractor::settings::Settings;
use wp_extractor::{db, input, CallSchedule, Provenance, Record, COLUMNS};

#[derive(Parser)]
#[command(name = "wp_extractor", about = "Topic records from Horizon Europe work programmes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse work programme files (PDF or text) into topic rows
    Extract {
        /// Files to parse
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Version label attached to every row (default: from settings)
        #[arg(short, long)]
        version_label: Option<String>,
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: Format,
        /// Also store rows in the SQLite database
        #[arg(long)]
        save: bool,
        /// Max rows to display in table format
        #[arg(short = 'n', long, default_value = "100")]
        limit: usize,
    },
    /// List call opening dates and deadlines of a work programme
    Calls {
        file: PathBuf,
    },
    /// Keyword search over stored rows
    Search {
        keyword: String,
        /// Max rows to return
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
        #[arg(short, long, value_enum, default_value = "table")]
        format: Format,
    },
    /// Show database statistics
    Stats,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Json,
    /// Every column in fixed order, tab separated
    Tsv,
}

fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log_level.clone().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let result = run(cli.command, &settings);

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn run(command: Commands, settings: &Settings) -> anyhow::Result<()> {
    match command {
        Commands::Extract {
            files,
            version_label,
            format,
            save,
            limit,
        } => {
            let version = version_label.unwrap_or_else(|| settings.version_label.clone());
            let records = parse_files(&files, &version)?;
            if save {
                let conn = db::connect(&settings.db_path)?;
                db::init_schema(&conn)?;
                let saved = db::save_records(&conn, &records)?;
                eprintln!("Saved {} rows to {}", saved, settings.db_path);
            }
            print_records(&records, format, limit)
        }
        Commands::Calls { file } => {
            let text = input::load_document(&file)?;
            let schedule = wp_extractor::call_schedule(&text);
            if schedule.is_empty() {
                println!("No call opening/deadline entries found.");
            } else {
                print_schedule(&schedule);
            }
            Ok(())
        }
        Commands::Search {
            keyword,
            limit,
            format,
        } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let rows = db::search_records(&conn, &keyword, limit)?;
            if rows.is_empty() {
                println!("No topics match '{}'.", keyword);
                Ok(())
            } else {
                print_records(&rows, format, limit)
            }
        }
        Commands::Stats => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Topics:        {}", s.topics);
            println!("Documents:     {}", s.sources);
            println!("Calls:         {}", s.calls);
            println!("With deadline: {}", s.with_deadline);
            Ok(())
        }
    }
}

/// Parse files in parallel; rows keep file order, then document order.
fn parse_files(files: &[PathBuf], version: &str) -> anyhow::Result<Vec<Record>> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let results: Vec<(&PathBuf, anyhow::Result<Vec<Record>>)> = files
        .par_iter()
        .map(|path| {
            let parsed = parse_file(path, version);
            pb.inc(1);
            (path, parsed)
        })
        .collect();
    pb.finish_and_clear();

    let mut records = Vec::new();
    let mut failed = 0;
    for (path, parsed) in results {
        match parsed {
            Ok(rows) => records.extend(rows),
            Err(e) => {
                failed += 1;
                warn!(path = %path.display(), "skipped: {:#}", e);
            }
        }
    }
    if failed == files.len() {
        bail!("none of the {} input files could be read", files.len());
    }
    Ok(records)
}

fn parse_file(path: &Path, version: &str) -> anyhow::Result<Vec<Record>> {
    let text = input::load_document(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let provenance = Provenance {
        source: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
        version: version.to_string(),
        parsed_at: chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false),
    };
    Ok(wp_extractor::parse_document(&text, &provenance))
}

fn print_records(records: &[Record], format: Format, limit: usize) -> anyhow::Result<()> {
    match format {
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(records)?);
        }
        Format::Tsv => {
            println!("{}", COLUMNS.join("\t"));
            for r in records {
                let row: Vec<String> = r
                    .cells()
                    .into_iter()
                    .map(|c| c.map(|v| tsv_escape(&v)).unwrap_or_default())
                    .collect();
                println!("{}", row.join("\t"));
            }
        }
        Format::Table => {
            if records.is_empty() {
                println!("No topics found.");
                return Ok(());
            }
            println!(
                "{:>3} | {:<28} | {:<36} | {:>11} | {:>11} | {:>3} | {:<5} | {:<11} | {:<11}",
                "#", "Code", "Title", "Per project", "Total", "N", "TRL", "Opening", "Deadline"
            );
            println!("{}", "-".repeat(144));

            for (i, r) in records.iter().take(limit).enumerate() {
                println!(
                    "{:>3} | {:<28} | {:<36} | {:>11} | {:>11} | {:>3} | {:<5} | {:<11} | {:<11}",
                    i + 1,
                    truncate(&r.code, 28),
                    truncate(r.title.as_deref().unwrap_or("-"), 36),
                    cell(r.budget_per_project),
                    cell(r.indicative_total_budget),
                    cell(r.number_of_projects),
                    r.trl.as_deref().unwrap_or("-"),
                    truncate(r.opening_date.as_deref().unwrap_or("-"), 11),
                    truncate(r.deadline1.as_deref().unwrap_or("-"), 11),
                );
            }

            println!("\n{} topics", records.len());
        }
    }
    Ok(())
}

fn print_schedule(schedule: &[CallSchedule]) {
    println!(
        "{:>3} | {:<40} | {:<22} | {:<11} | {:<11} | {:<11}",
        "#", "Call", "Call ID", "Opening", "Deadline 1", "Deadline 2"
    );
    println!("{}", "-".repeat(113));
    for (i, s) in schedule.iter().enumerate() {
        println!(
            "{:>3} | {:<40} | {:<22} | {:<11} | {:<11} | {:<11}",
            i + 1,
            truncate(s.call_name.as_deref().unwrap_or("Unknown"), 40),
            truncate(s.call_id.as_deref().unwrap_or("Unknown"), 22),
            s.opening_date.as_deref().unwrap_or("-"),
            s.deadline1.as_deref().unwrap_or("-"),
            s.deadline2.as_deref().unwrap_or("-"),
        );
    }
}

fn tsv_escape(s: &str) -> String {
    s.replace(['\t', '\n', '\r'], " ")
}

fn cell(v: Option<u64>) -> String {
    v.map(|n| n.to_string()).unwrap_or_else(|| "-".into())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::default()
    }

    #[test]
    fn calls_without_schedule_completes() {
        let dir = std::env::temp_dir().join(format!("wpx-calls-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("empty.txt");
        std::fs::write(&file, "Foreword\nNo calls here.").unwrap();

        let result = run(Commands::Calls { file }, &settings());
        std::fs::remove_dir_all(&dir).unwrap();
        assert!(result.is_ok());
    }

    #[test]
    fn calls_on_fixture() {
        let file = PathBuf::from("tests/fixtures/work_programme.txt");
        assert!(run(Commands::Calls { file }, &settings()).is_ok());
    }

    #[test]
    fn search_without_matches_completes() {
        let dir = std::env::temp_dir().join(format!("wpx-search-{}", std::process::id()));
        let settings = Settings {
            db_path: dir.join("topics.sqlite").to_string_lossy().into_owned(),
            ..Settings::default()
        };
        let command = Commands::Search {
            keyword: "nothing stored".into(),
            limit: 5,
            format: Format::Table,
        };
        let result = run(command, &settings);
        std::fs::remove_dir_all(&dir).unwrap();
        assert!(result.is_ok());
    }

    #[test]
    fn missing_input_is_an_error() {
        let file = PathBuf::from("tests/fixtures/does_not_exist.txt");
        assert!(run(Commands::Calls { file }, &settings()).is_err());
    }

    #[test]
    fn truncate_and_duration() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer title", 8), "a lon...");
        assert_eq!(format_duration(std::time::Duration::from_secs(75)), "1m 15s");
        assert_eq!(format_duration(std::time::Duration::from_secs(3725)), "1h 2m 5s");
    }
}
