use anyhow::{ensure, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_target_fps() -> u32 {
    60
}
fn default_led_count() -> usize {
    225
}
fn default_master_brightness() -> u8 {
    255
}
fn default_speed_percent() -> u16 {
    100
}
fn default_true() -> bool {
    true
}
fn default_end_led() -> i64 {
    -1
}
fn default_input_host() -> String {
    "127.0.0.1".to_string()
}
fn default_input_port() -> u16 {
    8000
}
fn default_output_address() -> String {
    "/light/serial".to_string()
}

/// One LED output destination. `copy_mode` sends the whole strip; otherwise
/// the inclusive `start_led..=end_led` range is sent, with `end_led = -1`
/// meaning "to the end of the strip".
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DestinationConfig {
    #[serde(default)]
    pub name: String,
    pub ip: String,
    pub port: u16,
    #[serde(default = "default_true")]
    pub copy_mode: bool,
    #[serde(default)]
    pub start_led: i64,
    #[serde(default = "default_end_led")]
    pub end_led: i64,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl DestinationConfig {
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            format!("{}:{}", self.ip, self.port)
        } else {
            self.name.clone()
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OscConfig {
    #[serde(default = "default_input_host")]
    pub input_host: String,
    #[serde(default = "default_input_port")]
    pub input_port: u16,
    #[serde(default = "default_output_address")]
    pub output_address: String,
}

impl Default for OscConfig {
    fn default() -> Self {
        Self {
            input_host: default_input_host(),
            input_port: default_input_port(),
            output_address: default_output_address(),
        }
    }
}

/// Engine settings, loaded from a JSON file at startup. Every field has a
/// default so a partial (or absent) file works.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Settings {
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,
    #[serde(default = "default_led_count")]
    pub led_count: usize,
    #[serde(default = "default_master_brightness")]
    pub master_brightness: u8,
    #[serde(default = "default_speed_percent")]
    pub speed_percent: u16,
    #[serde(default)]
    pub led_destinations: Vec<DestinationConfig>,
    #[serde(default)]
    pub osc: OscConfig,
    /// Scene JSON to preload at startup.
    #[serde(default)]
    pub scene_file: Option<String>,
    /// Dissolve pattern JSON to preload at startup.
    #[serde(default)]
    pub dissolve_file: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_fps: default_target_fps(),
            led_count: default_led_count(),
            master_brightness: default_master_brightness(),
            speed_percent: default_speed_percent(),
            led_destinations: Vec::new(),
            osc: OscConfig::default(),
            scene_file: None,
            dissolve_file: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("no settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&text)
            .with_context(|| format!("parsing settings file {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            (1..=240).contains(&self.target_fps),
            "target_fps must be between 1 and 240, got {}",
            self.target_fps
        );
        ensure!(self.led_count >= 1, "led_count must be positive");
        ensure!(
            self.speed_percent <= 1023,
            "speed_percent must be at most 1023, got {}",
            self.speed_percent
        );
        for destination in &self.led_destinations {
            ensure!(
                !destination.ip.is_empty(),
                "LED destination {} is missing an IP address",
                destination.label()
            );
            ensure!(
                destination.port >= 1024,
                "LED destination {} uses reserved port {}",
                destination.label(),
                destination.port
            );
        }
        Ok(())
    }
}
