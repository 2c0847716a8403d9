use std::path::{Path, PathBuf};

use anyhow::Context;
use keyscroll_tutor::TutorConfig;
use tracing::{debug, info};

pub fn settings_path() -> Option<PathBuf> {
    let base = dirs::config_dir()?;
    let dir = base.join("keyscroll");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir.join("settings.json"))
}

pub fn save_settings(path: &Path, config: &TutorConfig) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json).with_context(|| format!("write settings {:?}", path))?;
    info!(path = %path.display(), "settings saved");
    Ok(())
}

/// Missing settings fall back to defaults; a file that exists must parse.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<TutorConfig> {
    let Some(path) = path else {
        return Ok(TutorConfig::default());
    };
    if !path.exists() {
        debug!(path = %path.display(), "no settings file, using defaults");
        return Ok(TutorConfig::default());
    }
    let data =
        std::fs::read_to_string(path).with_context(|| format!("read settings {:?}", path))?;
    let config: TutorConfig =
        serde_json::from_str(&data).with_context(|| format!("parse settings {:?}", path))?;
    config.validate()?;
    Ok(config)
}
