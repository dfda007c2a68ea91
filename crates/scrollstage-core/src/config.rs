use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
    #[serde(default)]
    pub sequence: SequenceConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (log files live here)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Tuning for the smoothed scroll-progress mirror
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Minimum interval between accepted scroll signals
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
    /// Smoothing factor used near a smoothing threshold
    #[serde(default = "default_near_factor")]
    pub near_factor: f64,
    /// Smoothing factor used everywhere else
    #[serde(default = "default_far_factor")]
    pub far_factor: f64,
    /// Distance from a smoothing threshold that counts as "near"
    #[serde(default = "default_threshold_band")]
    pub threshold_band: f64,
    /// Below this gap the displayed value snaps to the raw value
    #[serde(default = "default_snap_epsilon")]
    pub snap_epsilon: f64,
    /// Points around which smoothing speeds up
    #[serde(default = "default_smoothing_thresholds")]
    pub smoothing_thresholds: Vec<f64>,
    /// Named markers that emit crossing notifications
    #[serde(default = "default_markers")]
    pub markers: Vec<MarkerConfig>,
    /// Assign the first applied sample directly to the displayed value
    #[serde(default)]
    pub jump_on_first_paint: bool,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            throttle_ms: default_throttle_ms(),
            near_factor: default_near_factor(),
            far_factor: default_far_factor(),
            threshold_band: default_threshold_band(),
            snap_epsilon: default_snap_epsilon(),
            smoothing_thresholds: default_smoothing_thresholds(),
            markers: default_markers(),
            jump_on_first_paint: false,
        }
    }
}

impl ProgressConfig {
    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn validate(&self) -> Result<()> {
        for threshold in &self.smoothing_thresholds {
            check_unit(*threshold, "smoothing threshold")?;
        }
        for marker in &self.markers {
            check_unit(marker.threshold, &format!("marker '{}'", marker.name))?;
        }
        for (name, factor) in [
            ("near_factor", self.near_factor),
            ("far_factor", self.far_factor),
        ] {
            if !(factor > 0.0 && factor <= 1.0) {
                return Err(Error::Config(format!(
                    "{} must lie in (0, 1], got {}",
                    name, factor
                )));
            }
        }
        if !(self.snap_epsilon > 0.0) {
            return Err(Error::Config(format!(
                "snap_epsilon must be positive, got {}",
                self.snap_epsilon
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerConfig {
    pub name: String,
    pub threshold: f64,
}

/// What a sequencer does with a trigger that arrives mid-run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetriggerPolicy {
    /// Drop the trigger; the in-flight run completes untouched
    #[default]
    Ignore,
    /// Cancel the in-flight run and start the new one
    Restart,
}

/// Timing of one direction of a staged sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayProfile {
    /// Container movement before the first stage flips
    #[serde(default)]
    pub lead_in_ms: u64,
    /// Gap between consecutive stage flips
    pub stage_step_ms: u64,
    /// Pause after the last stage before the run completes
    #[serde(default)]
    pub settle_ms: u64,
}

impl DelayProfile {
    pub fn lead_in(&self) -> Duration {
        Duration::from_millis(self.lead_in_ms)
    }

    pub fn stage_step(&self) -> Duration {
        Duration::from_millis(self.stage_step_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// Profile with a uniform stage step and no container timing
    pub fn uniform(stage_step_ms: u64) -> Self {
        Self {
            lead_in_ms: 0,
            stage_step_ms,
            settle_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementProfiles {
    /// Control pinned inside the header region
    pub docked: DelayProfile,
    /// Control floating in its resting position
    pub floating: DelayProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceConfig {
    /// Number of stages in the fan-out group
    #[serde(default = "default_stage_count")]
    pub stage_count: usize,
    #[serde(default)]
    pub retrigger: RetriggerPolicy,
    /// Scroll offset past which the control counts as docked
    #[serde(default = "default_dock_offset")]
    pub dock_offset_px: f64,
    #[serde(default = "default_opening_profiles")]
    pub opening: PlacementProfiles,
    #[serde(default = "default_closing_profiles")]
    pub closing: PlacementProfiles,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            stage_count: default_stage_count(),
            retrigger: RetriggerPolicy::default(),
            dock_offset_px: default_dock_offset(),
            opening: default_opening_profiles(),
            closing: default_closing_profiles(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Nudge applied to the floating control while scrolling
    #[serde(default = "default_inertia_px")]
    pub inertia_px: f64,
    /// Quiet time after the last scroll before the nudge settles
    #[serde(default = "default_inertia_settle_ms")]
    pub inertia_settle_ms: u64,
    /// Length of the colour-shift window after a theme toggle
    #[serde(default = "default_theme_transition_ms")]
    pub theme_transition_ms: u64,
    /// Delay between a section entering view and its marker lighting up
    #[serde(default = "default_activation_delay_ms")]
    pub activation_delay_ms: u64,
    /// Time each gallery slide stays up during autoplay
    #[serde(default = "default_carousel_interval_ms")]
    pub carousel_interval_ms: u64,
    /// Cross-fade between slides; navigation is locked meanwhile
    #[serde(default = "default_carousel_transition_ms")]
    pub carousel_transition_ms: u64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            inertia_px: default_inertia_px(),
            inertia_settle_ms: default_inertia_settle_ms(),
            theme_transition_ms: default_theme_transition_ms(),
            activation_delay_ms: default_activation_delay_ms(),
            carousel_interval_ms: default_carousel_interval_ms(),
            carousel_transition_ms: default_carousel_transition_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Frame interval in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Starting theme
    #[serde(default)]
    pub theme: ThemeMode,
    /// Rows moved per scroll key press
    #[serde(default = "default_scroll_lines")]
    pub scroll_lines: u16,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            theme: ThemeMode::default(),
            scroll_lines: default_scroll_lines(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("scrollstage")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_throttle_ms() -> u64 {
    16 // one frame at 60fps
}

fn default_near_factor() -> f64 {
    0.02
}

fn default_far_factor() -> f64 {
    0.004
}

fn default_threshold_band() -> f64 {
    0.05
}

fn default_snap_epsilon() -> f64 {
    0.0003
}

fn default_smoothing_thresholds() -> Vec<f64> {
    vec![0.02, 0.95]
}

fn default_markers() -> Vec<MarkerConfig> {
    vec![
        MarkerConfig {
            name: "top".to_string(),
            threshold: 0.025,
        },
        MarkerConfig {
            name: "bottom".to_string(),
            threshold: 0.95,
        },
    ]
}

fn default_stage_count() -> usize {
    4
}

fn default_dock_offset() -> f64 {
    136.0
}

fn default_opening_profiles() -> PlacementProfiles {
    PlacementProfiles {
        docked: DelayProfile::uniform(250),
        floating: DelayProfile {
            lead_in_ms: 1000, // slide into position first
            stage_step_ms: 250,
            settle_ms: 0,
        },
    }
}

fn default_closing_profiles() -> PlacementProfiles {
    let profile = DelayProfile {
        lead_in_ms: 0,
        stage_step_ms: 100,
        settle_ms: 100,
    };
    PlacementProfiles {
        docked: profile,
        floating: profile,
    }
}

fn default_inertia_px() -> f64 {
    10.0
}

fn default_inertia_settle_ms() -> u64 {
    100
}

fn default_theme_transition_ms() -> u64 {
    800
}

fn default_activation_delay_ms() -> u64 {
    300
}

fn default_carousel_interval_ms() -> u64 {
    6000
}

fn default_carousel_transition_ms() -> u64 {
    1500
}

fn default_tick_rate() -> u64 {
    16
}

fn default_scroll_lines() -> u16 {
    3
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

fn check_unit(value: f64, what: &str) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::InvalidThreshold {
            value,
            reason: format!("{} must lie in [0, 1]", what),
        });
    }
    Ok(())
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate configuration text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        self.progress.validate()?;
        if self.sequence.stage_count == 0 {
            return Err(Error::InvalidStageCount(0));
        }
        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/scrollstage/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("scrollstage")
            .join("config.toml")
    }

    /// Get the log file path
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("scrollstage.log")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }
}
