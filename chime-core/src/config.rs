use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chime_types::{IndicatorMap, Melody, Pin, Pitch, Tempo};
use serde::Deserialize;

use crate::board::{SerialSettings, DEFAULT_BAUD_RATE};
use crate::session::PlaybackPlan;
use crate::{ChimeError, ChimeResult};

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

const DEFAULT_PORT: &str = "COM8";
const DEFAULT_SETTLE_MS: u64 = 2000;
const DEFAULT_REPEAT_PAUSE_MS: u64 = 3000;
const DEFAULT_TEMPO: Tempo = match Tempo::checked(100) {
    Some(tempo) => tempo,
    None => panic!("default tempo must be positive"),
};
const DEFAULT_SPEAKER_PIN: Pin = match Pin::checked(8) {
    Some(pin) => pin,
    None => panic!("default speaker pin out of range"),
};

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    serial: SerialConfig,
    #[serde(default)]
    playback: PlaybackConfig,
    #[serde(default)]
    indicators: BTreeMap<String, Pin>,
}

#[derive(Deserialize, Default)]
struct SerialConfig {
    port: Option<String>,
    baud_rate: Option<u32>,
    settle_ms: Option<u64>,
}

#[derive(Deserialize, Default)]
struct PlaybackConfig {
    bpm: Option<Tempo>,
    speaker_pin: Option<Pin>,
    repeat_pause_ms: Option<u64>,
}

pub struct Config {
    serial: SerialConfig,
    playback: PlaybackConfig,
    indicators: BTreeMap<String, Pin>,
}

impl Config {
    /// Embedded defaults, overridden by the user's config file if one exists.
    /// A broken user file is logged and skipped.
    pub fn load() -> Self {
        let mut base = embedded();

        if let Some(path) = user_config_path() {
            if path.exists() {
                match read_config_file(&path) {
                    Ok(user) => merge(&mut base, user),
                    Err(e) => log::warn!(target: "config", "ignoring {}", e),
                }
            }
        }

        Self::from_file(base)
    }

    /// Embedded defaults, overridden by `path`. Any problem with `path` is an error.
    pub fn load_from(path: &Path) -> ChimeResult<Self> {
        let mut base = embedded();
        merge(&mut base, read_config_file(path)?);
        Ok(Self::from_file(base))
    }

    fn from_file(file: ConfigFile) -> Self {
        Config {
            serial: file.serial,
            playback: file.playback,
            indicators: file.indicators,
        }
    }

    pub fn serial_settings(&self) -> SerialSettings {
        SerialSettings {
            port: self
                .serial
                .port
                .clone()
                .unwrap_or_else(|| DEFAULT_PORT.to_string()),
            baud_rate: self.serial.baud_rate.unwrap_or(DEFAULT_BAUD_RATE),
            settle: Duration::from_millis(self.serial.settle_ms.unwrap_or(DEFAULT_SETTLE_MS)),
            ..SerialSettings::default()
        }
    }

    pub fn tempo(&self) -> Tempo {
        self.playback.bpm.unwrap_or(DEFAULT_TEMPO)
    }

    pub fn speaker_pin(&self) -> Pin {
        self.playback.speaker_pin.unwrap_or(DEFAULT_SPEAKER_PIN)
    }

    pub fn repeat_pause(&self) -> Duration {
        Duration::from_millis(
            self.playback
                .repeat_pause_ms
                .unwrap_or(DEFAULT_REPEAT_PAUSE_MS),
        )
    }

    /// Pitch to LED table. Entries naming an unknown pitch, or a rest, are
    /// logged and skipped.
    pub fn indicators(&self) -> IndicatorMap {
        let mut map = IndicatorMap::empty();
        for (name, &pin) in &self.indicators {
            let assigned = name
                .parse::<Pitch>()
                .and_then(|pitch| map.insert(pitch, pin));
            if let Err(e) = assigned {
                log::warn!(target: "config", "skipping indicator {} = {}: {}", name, pin, e);
            }
        }
        map
    }

    /// The built-in melody with this config's tempo and wiring.
    pub fn playback_plan(&self) -> PlaybackPlan {
        PlaybackPlan {
            melody: Melody::twinkle_star(),
            tempo: self.tempo(),
            speaker: self.speaker_pin(),
            indicators: self.indicators(),
            repeat_pause: self.repeat_pause(),
        }
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("chime").join("config.toml"))
}

fn embedded() -> ConfigFile {
    toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|e| {
        log::error!(target: "config", "embedded config.toml is malformed: {}", e);
        ConfigFile::default()
    })
}

fn read_config_file(path: &Path) -> ChimeResult<ConfigFile> {
    let error = |message: String| ChimeError::Config {
        path: path.to_path_buf(),
        message,
    };
    let contents = std::fs::read_to_string(path).map_err(|e| error(e.to_string()))?;
    toml::from_str(&contents).map_err(|e| error(e.to_string()))
}

fn merge(base: &mut ConfigFile, user: ConfigFile) {
    if user.serial.port.is_some() {
        base.serial.port = user.serial.port;
    }
    if user.serial.baud_rate.is_some() {
        base.serial.baud_rate = user.serial.baud_rate;
    }
    if user.serial.settle_ms.is_some() {
        base.serial.settle_ms = user.serial.settle_ms;
    }
    if user.playback.bpm.is_some() {
        base.playback.bpm = user.playback.bpm;
    }
    if user.playback.speaker_pin.is_some() {
        base.playback.speaker_pin = user.playback.speaker_pin;
    }
    if user.playback.repeat_pause_ms.is_some() {
        base.playback.repeat_pause_ms = user.playback.repeat_pause_ms;
    }
    for (name, pin) in user.indicators {
        base.indicators.insert(name.trim().to_ascii_uppercase(), pin);
    }
}
