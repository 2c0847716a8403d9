use anyhow::{anyhow, Context, Result};
use midir::{Ignore, MidiInput, MidiInputConnection};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use keyscroll_domain::pitch_name;

use crate::runner::RunnerCommand;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MidiDevice {
    pub name: String,
}

/// A normalized key event from any input device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    NoteOn { name: String, pitch: u8 },
    NoteOff { name: String, pitch: u8 },
}

impl From<InputEvent> for RunnerCommand {
    fn from(event: InputEvent) -> Self {
        match event {
            InputEvent::NoteOn { name, pitch } => RunnerCommand::NoteOn { name, pitch },
            InputEvent::NoteOff { name, pitch } => RunnerCommand::NoteOff { name, pitch },
        }
    }
}

/// Decode a raw MIDI message. A Note On with zero velocity is a release.
pub fn parse_message(bytes: &[u8]) -> Option<InputEvent> {
    let (&status, rest) = bytes.split_first()?;
    let pitch = *rest.first()?;
    if pitch > 127 {
        return None;
    }
    let velocity = rest.get(1).copied().unwrap_or(0);
    let name = pitch_name(pitch);
    match status & 0xF0 {
        0x90 if velocity > 0 => Some(InputEvent::NoteOn { name, pitch }),
        0x90 | 0x80 => Some(InputEvent::NoteOff { name, pitch }),
        _ => None,
    }
}

/// Readiness report for the practice front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceStatus {
    Ready(String),
    Failed(String),
}

pub struct MidiManager;

impl MidiManager {
    pub fn list_inputs() -> Result<Vec<MidiDevice>> {
        let input = MidiInput::new("keyscroll")?;
        Ok(input
            .ports()
            .iter()
            .map(|port| MidiDevice {
                name: input.port_name(port).unwrap_or_else(|_| "Unknown".into()),
            })
            .collect())
    }

    /// Open the named input and forward key events into the runner.
    pub fn connect(
        name: &str,
        commands: mpsc::Sender<RunnerCommand>,
    ) -> Result<MidiInputConnection<()>> {
        let mut input = MidiInput::new("keyscroll-input")?;
        input.ignore(Ignore::All);
        let ports = input.ports();
        let port = ports
            .iter()
            .find(|port| input.port_name(port).map(|n| n == name).unwrap_or(false))
            .cloned()
            .ok_or_else(|| anyhow!("midi port not found: {name}"))?;
        input
            .connect(
                &port,
                "keyscroll-input",
                move |_stamp, message, _| {
                    if let Some(event) = parse_message(message) {
                        if commands.try_send(event.into()).is_err() {
                            warn!("runner queue full or closed, dropping key event");
                        }
                    }
                },
                (),
            )
            .map_err(|err| anyhow!("midi connect error: {err:?}"))
            .with_context(|| format!("connect midi input {name}"))
    }

    /// Like [`MidiManager::connect`] but never fails: the session keeps
    /// running without input when the device cannot be opened.
    pub fn open(
        name: &str,
        commands: mpsc::Sender<RunnerCommand>,
    ) -> (Option<MidiInputConnection<()>>, DeviceStatus) {
        match Self::connect(name, commands) {
            Ok(connection) => {
                info!(device = name, "midi input ready");
                (Some(connection), DeviceStatus::Ready(name.to_string()))
            }
            Err(err) => {
                warn!(device = name, error = %format!("{err:#}"), "midi input unavailable");
                (None, DeviceStatus::Failed(format!("{err:#}")))
            }
        }
    }
}
