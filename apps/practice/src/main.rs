mod replay;
mod settings;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use keyscroll_builder::{
    load_records, BuildJob, GeneratorConfig, TimelineBuilder, TimelineSource,
};
use keyscroll_domain::Lesson;
use keyscroll_tutor::{
    DeviceStatus, MidiManager, PracticeRunner, PracticeSession, RunnerCommand, RunnerEvent,
};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Practice a keyboard part against a scrolling playhead")]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Canonical lesson produced by build-timeline
    #[arg(long, conflicts_with = "records")]
    lesson: Option<PathBuf>,
    /// Raw note records (JSON or YAML) to normalize
    #[arg(long)]
    records: Option<PathBuf>,
    /// Notes per hand for a generated exercise
    #[arg(long, default_value_t = 16)]
    count: usize,
    #[arg(long)]
    seed: Option<u64>,
    /// MIDI input port name
    #[arg(short, long)]
    device: Option<String>,
    /// Scripted key events to play instead of (or alongside) a device
    #[arg(long)]
    replay: Option<PathBuf>,
    /// Override the practice speed factor
    #[arg(long)]
    speed: Option<f64>,
    /// List MIDI inputs and exit
    #[arg(long)]
    list_devices: bool,
    /// Write the effective settings back to the settings file
    #[arg(long)]
    save_settings: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if cli.list_devices {
        for device in MidiManager::list_inputs()? {
            println!("{}", device.name);
        }
        return Ok(());
    }

    let settings_path = cli.config.clone().or_else(settings::settings_path);
    let mut config = settings::load_settings(settings_path.as_deref())?;
    if let Some(speed) = cli.speed {
        config.speed_factor = speed;
    }
    config.validate()?;
    if cli.save_settings {
        match &settings_path {
            Some(path) => settings::save_settings(path, &config)?,
            None => warn!("no config directory, settings not saved"),
        }
    }

    let lesson = load_lesson(&cli, config.tempo_bpm)?;
    info!(title = %lesson.title, notes = lesson.note_count(), "lesson ready");
    let session = PracticeSession::with_timeline(config, lesson.timeline)?;

    let rt = Runtime::new()?;
    let summary = rt.block_on(async move {
        let (commands, inbox) = mpsc::channel(256);
        let (events_tx, mut events) = mpsc::unbounded_channel();

        let _connection = match &cli.device {
            Some(name) => {
                let (connection, status) = MidiManager::open(name, commands.clone());
                if let DeviceStatus::Failed(reason) = &status {
                    error!(%reason, "continuing without input");
                }
                connection
            }
            None => None,
        };

        if let Some(path) = &cli.replay {
            let keys = replay::load_script(path)?;
            tokio::spawn(replay::play_script(keys, commands.clone()));
        }

        let stopper = commands.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = stopper.send(RunnerCommand::Shutdown).await;
            }
        });

        let finisher = commands.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    RunnerEvent::Matched(outcome) => {
                        println!("[{:>7.2}] {}", outcome.position_beats, outcome.message)
                    }
                    RunnerEvent::Released { pitch, verdict } => {
                        println!("          release {pitch}: {:?}", verdict.kind)
                    }
                    RunnerEvent::Missed(indices) => {
                        println!("          missed {} note(s)", indices.len())
                    }
                    RunnerEvent::Clock(state) => info!(?state, "clock"),
                    RunnerEvent::Finished => {
                        let _ = finisher.send(RunnerCommand::Shutdown).await;
                    }
                }
            }
        });

        let runner = PracticeRunner::new(session, inbox).with_events(events_tx);
        commands.send(RunnerCommand::TogglePause(Some(false))).await?;
        anyhow::Ok(runner.run().await)
    })?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn load_lesson(cli: &Cli, tempo_bpm: f64) -> anyhow::Result<Lesson> {
    if let Some(path) = &cli.lesson {
        let data =
            std::fs::read_to_string(path).with_context(|| format!("read lesson {:?}", path))?;
        return serde_json::from_str(&data).with_context(|| format!("parse lesson {:?}", path));
    }
    let source = match &cli.records {
        Some(path) => TimelineSource::Records {
            tempo_bpm,
            records: load_records(path)?,
        },
        None => TimelineSource::Generated(GeneratorConfig {
            count: cli.count,
            tempo_bpm,
            seed: cli.seed,
            ..Default::default()
        }),
    };
    let job = BuildJob {
        id: "practice".into(),
        title: "Practice".into(),
        source,
    };
    Ok(TimelineBuilder::new().build(&job)?)
}
