use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;

pub const MIB: u64 = 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub version: u32,
    pub database: Database,
    pub admin: Credentials,
    #[serde(default)]
    pub limits: UploadLimits,
    #[serde(default)]
    pub player: PlayerConfig,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path}"))?;
        toml::from_str(&contents).with_context(|| "Failed to parse config TOML")
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct Database {
    pub in_memory: bool,
    pub path: Option<PathBuf>,
}

/// Admin login for the authorization gate.
///
/// Stored and compared in plaintext. Anyone who can read the config can log
/// in, so this only keeps casual visitors away from admin actions.
#[derive(Debug, Deserialize, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct UploadLimits {
    pub audio_max_bytes: u64,
    pub video_max_bytes: u64,
    pub image_max_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            audio_max_bytes: 50 * MIB,
            video_max_bytes: 100 * MIB,
            image_max_bytes: 10 * MIB,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    pub volume: f32,
    pub artist: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            volume: 0.7,
            artist: "Rock & Stone".to_string(),
        }
    }
}
