use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use keyscroll_builder::{
    load_records, BuildJob, GeneratorConfig, HandRange, TimelineBuilder, TimelineSource,
};
use keyscroll_domain::{exporter_for, ExportFormat, Hand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Build a practice timeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Output format for the built lesson
    #[arg(short, long, value_enum, default_value_t = Format::Json, global = true)]
    format: Format,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a random exercise
    Generate {
        /// Right hand pitch range, e.g. 60:72
        #[arg(long, value_parser = parse_range)]
        right: Option<(u8, u8)>,
        /// Left hand pitch range, e.g. 48:59
        #[arg(long, value_parser = parse_range)]
        left: Option<(u8, u8)>,
        /// Notes per hand
        #[arg(short, long, default_value_t = 16)]
        count: usize,
        #[arg(short, long, default_value_t = 80.0)]
        tempo: f64,
        /// Allow non-diatonic pitches
        #[arg(long)]
        sharps: bool,
        /// Allowed durations in beats
        #[arg(long, value_delimiter = ',', default_value = "0.5,1,2")]
        durations: Vec<f64>,
        /// Gap after each note in beats
        #[arg(long, default_value_t = 0.0)]
        spacing: f64,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Normalize parsed note records (JSON or YAML)
    Normalize {
        input: PathBuf,
        #[arg(short, long, default_value_t = 80.0)]
        tempo: f64,
        /// Title used for the lesson metadata
        #[arg(long, default_value = "Imported Lesson")]
        title: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

fn parse_range(text: &str) -> Result<(u8, u8), String> {
    let (low, high) = text
        .split_once(':')
        .ok_or_else(|| format!("expected LOW:HIGH, got {text}"))?;
    let low = low.trim().parse().map_err(|_| format!("bad low pitch {low}"))?;
    let high = high.trim().parse().map_err(|_| format!("bad high pitch {high}"))?;
    Ok((low, high))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let job = match cli.command {
        Command::Generate {
            right,
            left,
            count,
            tempo,
            sharps,
            durations,
            spacing,
            seed,
        } => {
            let mut hands = Vec::new();
            if let Some((low, high)) = left {
                hands.push(HandRange {
                    hand: Hand::Left,
                    low,
                    high,
                });
            }
            if let Some((low, high)) = right {
                hands.push(HandRange {
                    hand: Hand::Right,
                    low,
                    high,
                });
            }
            let mut config = GeneratorConfig {
                count,
                tempo_bpm: tempo,
                include_sharps: sharps,
                durations,
                spacing_beats: spacing,
                seed,
                ..Default::default()
            };
            if !hands.is_empty() {
                config.hands = hands;
            }
            BuildJob {
                id: format!("generated-{}", seed.unwrap_or_default()),
                title: "Generated Exercise".into(),
                source: TimelineSource::Generated(config),
            }
        }
        Command::Normalize { input, tempo, title } => {
            let records = load_records(&input)
                .with_context(|| format!("load note records {:?}", input))?;
            BuildJob {
                id: input.display().to_string(),
                title,
                source: TimelineSource::Records {
                    tempo_bpm: tempo,
                    records,
                },
            }
        }
    };

    let lesson = TimelineBuilder::new().build(&job)?;
    let format = match cli.format {
        Format::Json => ExportFormat::Json,
        Format::Yaml => ExportFormat::Yaml,
    };
    let bytes = exporter_for(format).export(&lesson, format)?;
    println!("{}", String::from_utf8_lossy(&bytes));
    Ok(())
}
