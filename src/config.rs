use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Env var naming an explicit config file.
pub const CONFIG_ENV: &str = "COMPLAINTS_DASHBOARD_CONFIG";
/// Env var overriding `data_path`.
pub const DATA_ENV: &str = "COMPLAINTS_DATA";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "complaints-dashboard.json";

/// Dashboard settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Dataset loaded at startup.
    pub data_path: PathBuf,
    /// Number of equal-width bins in the description-length histogram.
    pub histogram_bins: usize,
    /// Opacity of each overlaid histogram, in (0, 1].
    pub histogram_opacity: f32,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("RECLAMEAQUI_UNIFICADO_TRATADO.csv"),
            histogram_bins: 50,
            histogram_opacity: 0.75,
            window_width: 1280.0,
            window_height: 900.0,
        }
    }
}

impl DashboardConfig {
    /// Load from `$COMPLAINTS_DASHBOARD_CONFIG`, else `./complaints-dashboard.json`,
    /// else defaults; then apply `$COMPLAINTS_DATA`.
    pub fn load() -> Result<Self> {
        Self::load_from(std::env::var_os(CONFIG_ENV), std::env::var_os(DATA_ENV))
    }

    /// [`load`](Self::load) with the two environment values passed in.
    fn load_from(config_path: Option<OsString>, data_path: Option<OsString>) -> Result<Self> {
        let mut config = match config_path.map(PathBuf::from) {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                log::info!("No config file found, using defaults");
                Self::default()
            }
        };

        if let Some(data) = data_path {
            log::info!("Data path overridden by ${DATA_ENV}");
            config.data_path = PathBuf::from(data);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON config file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.histogram_bins == 0 {
            bail!("histogram_bins must be at least 1");
        }
        if !(self.histogram_opacity > 0.0 && self.histogram_opacity <= 1.0) {
            bail!(
                "histogram_opacity must be in (0, 1], got {}",
                self.histogram_opacity
            );
        }
        if !(self.window_width > 0.0 && self.window_height > 0.0) {
            bail!(
                "window size must be positive, got {}x{}",
                self.window_width,
                self.window_height
            );
        }
        Ok(())
    }
}
