use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use layout_core::config::{LayoutConfig, SeedSpec};
use layout_core::layout::{DungeonLayout, generate_layout};
use layout_core::record::{load_record, record_for, replay_record, save_record};

mod seed;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a layout and optionally persist it
    Generate {
        /// Numeric or text seed; a runtime seed is generated when absent
        #[arg(short, long)]
        seed: Option<String>,
        /// Path to a layout configuration JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write the full layout JSON here
        #[arg(long)]
        layout_out: Option<PathBuf>,
        /// Write the replayable seed-plus-config record here
        #[arg(long)]
        record_out: Option<PathBuf>,
    },
    /// Replay a stored record and check it reproduces the same layout
    Verify {
        /// Path to a record JSON file
        #[arg(short, long)]
        record: PathBuf,
    },
    /// Print structural statistics for a seed
    Inspect {
        /// Numeric or text seed
        #[arg(short, long)]
        seed: String,
        /// Path to a layout configuration JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    match args.command {
        Command::Generate { seed, config, layout_out, record_out } => {
            generate(seed, config, layout_out, record_out)
        }
        Command::Verify { record } => verify(&record),
        Command::Inspect { seed, config } => inspect(&seed, config),
    }
}

fn load_config(path: Option<&Path>) -> Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: LayoutConfig =
        serde_json::from_str(&json).with_context(|| "Failed to deserialize config JSON")?;
    Ok(config)
}

/// Numeric strings resolve as numeric seeds; everything else is folded as
/// a text seed.
fn parse_seed(raw: &str) -> SeedSpec {
    match raw.parse::<u32>() {
        Ok(value) => SeedSpec::Numeric(value),
        Err(_) => SeedSpec::Text(raw.to_string()),
    }
}

fn resolve_seed(cli_seed: Option<&str>, config: &LayoutConfig) -> (u32, &'static str) {
    if let Some(raw) = cli_seed {
        return (parse_seed(raw).resolve(), "cli");
    }
    if let Some(spec) = &config.seed {
        return (spec.resolve(), "config");
    }
    (seed::generate_runtime_seed(), "generated")
}

fn generate(
    cli_seed: Option<String>,
    config_path: Option<PathBuf>,
    layout_out: Option<PathBuf>,
    record_out: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let (seed, seed_source) = resolve_seed(cli_seed.as_deref(), &config);

    let layout = generate_layout(&config, seed)
        .map_err(|error| anyhow::anyhow!("Invalid configuration: {error:?}"))?;

    println!("Seed: {seed} ({seed_source})");
    print_summary(&layout);

    if let Some(path) = layout_out {
        let json = serde_json::to_string_pretty(&layout)
            .with_context(|| "Failed to serialize layout JSON")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write layout file: {}", path.display()))?;
        println!("Layout written to {}", path.display());
    }

    if let Some(path) = record_out {
        let record = record_for(&layout, &config);
        save_record(&path, &record)
            .map_err(|error| anyhow::anyhow!("Failed to write record: {error:?}"))?;
        println!("Record written to {}", path.display());
    }

    Ok(())
}

fn verify(record_path: &Path) -> Result<()> {
    let record = load_record(record_path)
        .map_err(|error| anyhow::anyhow!("Failed to load record: {error:?}"))?;
    let layout = replay_record(&record)
        .map_err(|error| anyhow::anyhow!("Replay did not reproduce the record: {error:?}"))?;

    println!("Record verified.");
    println!("Seed: {}", record.seed);
    print_summary(&layout);
    Ok(())
}

fn inspect(raw_seed: &str, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let seed = parse_seed(raw_seed).resolve();
    let layout = generate_layout(&config, seed)
        .map_err(|error| anyhow::anyhow!("Invalid configuration: {error:?}"))?;

    println!("Seed: {seed}");
    print_summary(&layout);

    let mut histogram: Vec<(usize, usize)> = Vec::new();
    for point in &layout.graph.points {
        let degree = point.connections.len();
        match histogram.iter_mut().find(|(bucket, _)| *bucket == degree) {
            Some((_, count)) => *count += 1,
            None => histogram.push((degree, 1)),
        }
    }
    histogram.sort_unstable();
    println!("Degree histogram:");
    for (degree, count) in histogram {
        println!("  {degree}: {count}");
    }

    for (index, room) in layout.rooms.iter().enumerate() {
        let parent = room.parent.map_or("-".to_string(), |parent| parent.to_string());
        println!(
            "Room {index}: center ({:.1}, {:.1}, {:.1}) scale {:?} parent {parent}",
            room.position.x, room.position.y, room.position.z, room.scale
        );
    }
    Ok(())
}

fn print_summary(layout: &DungeonLayout) {
    let termini =
        layout.graph.points.iter().filter(|point| point.connections.len() == 1).count();
    let junctions =
        layout.graph.points.iter().filter(|point| point.connections.len() >= 3).count();
    println!("Points: {}", layout.graph.points.len());
    println!("Segments: {}", layout.graph.segments.len());
    println!("Termini: {termini}, Junctions: {junctions}");
    println!("Rooms: {}", layout.rooms.len());
    println!("Fingerprint: {:016x}", layout.fingerprint());
}
