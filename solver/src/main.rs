use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use aqueduct::{BoardBuilder, Coordinator};

/// Solve a Flow Free puzzle with one A* search agent per color.
#[derive(Parser)]
#[command(name = "aqueduct-solver", version)]
struct Args {
    /// Path to a puzzle file: one row per line, `.` for free squares, every
    /// other character an endpoint appearing exactly twice.
    puzzle: PathBuf,

    /// Abort the search after this many seconds.
    #[arg(long)]
    timeout: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let contents = fs::read_to_string(&args.puzzle)
        .with_context(|| format!("reading puzzle file {}", args.puzzle.display()))?;
    let rows: Vec<&str> = contents.lines().filter(|line| !line.trim().is_empty()).collect();

    let initial = BoardBuilder::from_rows(&rows)
        .build()
        .context("puzzle file is not a valid board")?;
    println!("{initial}");

    let coordinator = Coordinator::new(initial);
    if let Some(secs) = args.timeout {
        let handle = coordinator.shutdown_handle();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            handle.shutdown();
        });
    }

    let report = coordinator.solve()?;
    println!("{}", report.board);
    for (color, expanded) in report.expanded.iter().enumerate() {
        info!(color, expanded, "agent finished");
    }
    println!("expanded {} nodes across {} agents", report.total_expanded(), report.expanded.len());

    Ok(())
}
