use std::fmt::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use swim_session_analytics::config::{DEFAULT_DATA_DIR, DEFAULT_SESSIONS};
use swim_session_analytics::{aggregate, analysis, report, AnalysisConfig, SessionRepository};

#[derive(Parser)]
#[command(name = "swim-analytics")]
#[command(about = "Per-length and per-session metrics from swim workout exports", long_about = None)]
struct Cli {
    /// Directory holding the session exports
    #[arg(long, env = "SWIM_DATA_DIR", default_value = DEFAULT_DATA_DIR, global = true)]
    data_dir: PathBuf,

    /// How many recent sessions to load (at most 100)
    #[arg(long, default_value_t = DEFAULT_SESSIONS, global = true)]
    sessions: usize,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List session exports and their embedded start times
    Sessions,
    /// Compare the latest session's KPIs with the previous one
    Kpi,
    /// Per-stroke means for the latest session
    Strokes {
        /// Use every export in the directory instead
        #[arg(long)]
        all: bool,
    },
    /// Pace against cumulative distance across all exports
    Evolution,
    /// Write a markdown report
    Report {
        #[arg(long, default_value = "swim-report.md")]
        out: PathBuf,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to encode JSON output")?;
    println!("{text}");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = AnalysisConfig::new(cli.data_dir, cli.sessions);
    let repository = SessionRepository::new(&config.data_dir);

    match cli.command {
        Commands::Sessions => {
            let mut files: Vec<_> = repository.discover().collect();
            files.sort_by(|a, b| a.path.cmp(&b.path));

            if cli.json {
                let listing: Vec<_> = files
                    .iter()
                    .map(|f| serde_json::json!({ "path": f.path, "started_at": f.started_at }))
                    .collect();
                return print_json(&listing);
            }

            if files.is_empty() {
                println!("No session exports in {}.", config.data_dir.display());
                return Ok(());
            }
            for file in &files {
                match file.started_at {
                    Some(ts) => println!("- {} ({})", file.path.display(), ts),
                    None => println!("- {} (undated)", file.path.display()),
                }
            }
        }
        Commands::Kpi => {
            let analysis = analysis::run(&config);

            if cli.json {
                return print_json(&serde_json::json!({
                    "latest": analysis.latest().map(|s| &s.kpis),
                    "previous": analysis.previous().map(|s| &s.kpis),
                    "delta": analysis.delta,
                }));
            }

            let Some(latest) = analysis.latest() else {
                println!("No dated session exports found.");
                return Ok(());
            };
            let mut output = String::new();
            let _ = writeln!(output, "Latest session: {}", latest.name);
            report::write_kpis(&mut output, &latest.kpis);
            match analysis.previous() {
                Some(previous) => {
                    let _ = writeln!(output, "Previous session: {}", previous.name);
                    report::write_kpis(&mut output, &previous.kpis);
                }
                None => {
                    let _ = writeln!(output, "No earlier session to compare against.");
                }
            }
            if let Some(delta) = &analysis.delta {
                let _ = writeln!(output, "Change:");
                report::write_delta(&mut output, delta);
            }
            print!("{output}");
        }
        Commands::Strokes { all } => {
            let sessions: Vec<_> = if all {
                repository.load_all()
            } else {
                repository.latest_n(1).into_iter().flatten().collect()
            };
            let strokes = aggregate::group_sessions_by_stroke(&sessions);

            if cli.json {
                return print_json(&strokes);
            }
            let mut output = String::new();
            report::write_strokes(&mut output, &strokes);
            print!("{output}");
        }
        Commands::Evolution => {
            let points = aggregate::group_by_stroke_and_distance(&repository.combine_all());

            if cli.json {
                return print_json(&points);
            }
            let mut output = String::new();
            report::write_evolution(&mut output, &points);
            print!("{output}");
        }
        Commands::Report { out } => {
            let analysis = analysis::run(&config);

            if cli.json {
                return print_json(&analysis);
            }
            let text = report::build_report(&analysis);
            std::fs::write(&out, text)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
