//! Configuration file, environment overrides and the values derived from them

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dash_dispatch::{ButtonConfig, ConfigError, DispatchOptions, Registry, RegistryBuilder, DEFAULT_WAKE_WORD};
use dash_events::DEFAULT_DEBOUNCE;
use dash_speech::VoiceOptions;
use serde::Deserialize;
use tracing::info;

/// Network interface watched when none is configured
pub const DEFAULT_INTERFACE: &str = "en3";

/// Speech backend used when none is configured
pub const DEFAULT_BACKEND: &str = "polly";

/// File name looked up in the home directory
pub const CONFIG_FILE_NAME: &str = ".dash-voice.yml";

/// Everything dash-voice needs to run, read once at start-up.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Network interface the buttons are watched on
    pub interface: String,
    /// Capture program template; `{interface}` is substituted. Stdin is read when unset.
    pub capture: Option<String>,
    /// Seconds during which repeated sightings of a button count as one press
    pub debounce: u64,
    /// Wake word put in front of every phrase; empty disables it
    pub keyword: String,
    pub backend: String,
    pub access: String,
    pub secret: String,
    pub gender: String,
    pub language: String,
    /// Polly region, e.g. "us-east-1"; the inherited AWS environment applies when empty
    pub region: String,
    /// Player template with `%s` for the audio file
    pub player: Option<String>,
    /// Reject duplicate button addresses instead of keeping the last one
    pub strict: bool,
    pub buttons: Vec<ButtonConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            interface: DEFAULT_INTERFACE.to_string(),
            capture: None,
            debounce: DEFAULT_DEBOUNCE.as_secs(),
            keyword: DEFAULT_WAKE_WORD.to_string(),
            backend: DEFAULT_BACKEND.to_string(),
            access: String::new(),
            secret: String::new(),
            gender: String::new(),
            language: String::new(),
            region: String::new(),
            player: None,
            strict: false,
            buttons: Vec::new(),
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("interface", &self.interface)
            .field("capture", &self.capture)
            .field("debounce", &self.debounce)
            .field("keyword", &self.keyword)
            .field("backend", &self.backend)
            .field("access", &self.access)
            .field("secret", &"<redacted>")
            .field("gender", &self.gender)
            .field("language", &self.language)
            .field("region", &self.region)
            .field("player", &self.player)
            .field("strict", &self.strict)
            .field("buttons", &self.buttons)
            .finish()
    }
}

impl AppConfig {
    /// `~/.dash-voice.yml`, if a home directory is known
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
    }

    /// Load from `path`, or from the default location when `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()
                .context("Cannot locate the home directory; pass --config")?,
        };
        Self::from_file(&path)
    }

    /// Parse a YAML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse YAML text. An empty document yields the defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Override settings from `lookup`, keyed by environment variable name
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(interface) = lookup("DASH_VOICE_INTERFACE") {
            self.interface = interface;
        }
        if let Some(backend) = lookup("DASH_VOICE_BACKEND") {
            self.backend = backend;
        }
        if let Some(access) = lookup("DASH_VOICE_ACCESS") {
            self.access = access;
        }
        if let Some(secret) = lookup("DASH_VOICE_SECRET") {
            self.secret = secret;
        }
        if let Some(player) = lookup("DASH_VOICE_PLAYER") {
            self.player = Some(player).filter(|player| !player.trim().is_empty());
        }
        if let Some(region) = lookup("DASH_VOICE_REGION") {
            self.region = region;
        }
        if let Some(keyword) = lookup("DASH_VOICE_KEYWORD") {
            self.keyword = keyword;
        }
    }

    /// Repeat-suppression window for the capture feed
    pub fn debounce(&self) -> Duration {
        match self.debounce {
            0 => DEFAULT_DEBOUNCE,
            secs => Duration::from_secs(secs),
        }
    }

    /// Build the address registry from the button list
    pub fn registry(&self) -> std::result::Result<Registry, ConfigError> {
        RegistryBuilder::new().strict(self.strict).build(&self.buttons)
    }

    pub fn voice_options(&self) -> VoiceOptions {
        VoiceOptions {
            access_key: self.access.clone(),
            secret_key: self.secret.clone(),
            gender: self.gender.clone(),
            language: self.language.clone(),
            region: self.region.clone(),
            backend_name: self.backend.clone(),
            player_override: self.player.clone(),
        }
    }

    pub fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions::with_wake_word(self.keyword.as_str())
    }

    /// Log the effective settings
    pub fn print_summary(&self) {
        info!("Configuration:");
        info!("  Interface: {}", self.interface);
        match &self.capture {
            Some(capture) => info!("  Capture: {}", capture),
            None => info!("  Capture: stdin"),
        }
        info!("  Debounce: {}s", self.debounce().as_secs());
        info!("  Wake word: {}", if self.keyword.trim().is_empty() { "(none)" } else { self.keyword.trim() });
        info!("  Backend: {}", self.backend);
        info!("  Player: {}", self.player.as_deref().unwrap_or("(platform default)"));
        info!("  Buttons: {}", self.buttons.len());
    }
}
