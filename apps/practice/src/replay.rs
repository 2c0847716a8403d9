use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use keyscroll_domain::pitch_name;
use keyscroll_tutor::RunnerCommand;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::warn;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KeyAction {
    On,
    Off,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptedKey {
    /// Milliseconds after playback starts.
    pub at_ms: u64,
    pub action: KeyAction,
    pub pitch: u8,
}

pub fn load_script(path: &Path) -> anyhow::Result<Vec<ScriptedKey>> {
    let data = std::fs::read_to_string(path).with_context(|| format!("read script {:?}", path))?;
    let mut keys: Vec<ScriptedKey> =
        serde_json::from_str(&data).with_context(|| format!("parse script {:?}", path))?;
    keys.sort_by_key(|key| key.at_ms);
    Ok(keys)
}

pub async fn play_script(keys: Vec<ScriptedKey>, commands: mpsc::Sender<RunnerCommand>) {
    let start = tokio::time::Instant::now();
    for key in keys {
        tokio::time::sleep_until(start + Duration::from_millis(key.at_ms)).await;
        let name = pitch_name(key.pitch);
        let command = match key.action {
            KeyAction::On => RunnerCommand::NoteOn {
                name,
                pitch: key.pitch,
            },
            KeyAction::Off => RunnerCommand::NoteOff {
                name,
                pitch: key.pitch,
            },
        };
        if commands.send(command).await.is_err() {
            warn!("runner stopped before the script finished");
            return;
        }
    }
}
