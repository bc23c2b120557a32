use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::constants::SCREEN_WAKE_SECS;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// e.g., "info" | "debug"
    pub log_level: Option<String>,
    /// Kodi endpoint
    pub server: Option<ServerConfig>,
    /// panel behavior
    pub panel: Option<PanelConfig>,
    /// output sink geometry & wiring
    pub display: Option<DisplayConfig>,
    /// per-layout lead-in/lead-out seconds for progress math
    pub progress_offsets: Option<HashMap<String, i64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    /// Kodi HTTP root, e.g. http://localhost:8080
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PanelConfig {
    /// status screen waketime after a press, in seconds
    pub screen_wake_secs: Option<u64>,
    /// default artwork assets
    pub images_dir: Option<PathBuf>,
    /// where AirPlay drops its temp thumbnails
    pub kodi_temp_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub driver: Option<DriverKind>,
    /// framebuffer device node
    pub fbdev: Option<String>,
    /// framebuffer depth, 16 or 32
    pub bpp: Option<u32>,
    /// sysfs bl_power node for backlight control
    pub backlight: Option<PathBuf>,
    /// BCM pin carrying the touch interrupt (touch-gpio builds)
    pub touch_pin: Option<u8>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    Fbdev,
    Mock,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "KodiMonS", about = "Kodi now-playing panel", disable_help_flag = false)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Kodi HTTP root, e.g. http://localhost:8080
    #[arg(long)]
    pub url: Option<String>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Shorthand for --log-level debug
    #[arg(long, short = 'v', action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long, value_enum)]
    pub driver: Option<DriverKind>,
    /// Framebuffer device node
    #[arg(long)]
    pub fbdev: Option<String>,
    /// Status screen waketime in seconds
    #[arg(long)]
    pub wake_secs: Option<u64>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();

    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, &cli);

    // 4) Validate
    validate(&cfg)?;

    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/kodimons/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/kodimons/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/kodimons.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["kodimons.yaml", "config.yaml", "config/kodimons.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some() { dst.log_level = src.log_level; }
    if src.progress_offsets.is_some() { dst.progress_offsets = src.progress_offsets; }
    match (&mut dst.server, src.server) {
        (None, Some(s)) => dst.server = Some(s),
        (Some(d), Some(s)) => {
            if s.url.is_some() { d.url = s.url; }
        }
        _ => {}
    }
    match (&mut dst.panel, src.panel) {
        (None, Some(p)) => dst.panel = Some(p),
        (Some(d), Some(s)) => merge_panel(d, s),
        _ => {}
    }
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
}

fn merge_panel(dst: &mut PanelConfig, src: PanelConfig) {
    if src.screen_wake_secs.is_some() { dst.screen_wake_secs = src.screen_wake_secs; }
    if src.images_dir.is_some()       { dst.images_dir = src.images_dir; }
    if src.kodi_temp_dir.is_some()    { dst.kodi_temp_dir = src.kodi_temp_dir; }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.width.is_some()     { dst.width = src.width; }
    if src.height.is_some()    { dst.height = src.height; }
    if src.driver.is_some()    { dst.driver = src.driver; }
    if src.fbdev.is_some()     { dst.fbdev = src.fbdev; }
    if src.bpp.is_some()       { dst.bpp = src.bpp; }
    if src.backlight.is_some() { dst.backlight = src.backlight; }
    if src.touch_pin.is_some() { dst.touch_pin = src.touch_pin; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.debug {
        cfg.log_level = Some("debug".to_string());
    } else if cli.log_level.is_some() {
        cfg.log_level = cli.log_level.clone();
    }

    if cli.url.is_some() {
        cfg.server.get_or_insert_with(ServerConfig::default).url = cli.url.clone();
    }
    if cli.wake_secs.is_some() {
        cfg.panel.get_or_insert_with(PanelConfig::default).screen_wake_secs = cli.wake_secs;
    }
    if cli.driver.is_some() || cli.fbdev.is_some() {
        let display = cfg.display.get_or_insert_with(DisplayConfig::default);
        if cli.driver.is_some() { display.driver = cli.driver; }
        if cli.fbdev.is_some()  { display.fbdev = cli.fbdev.clone(); }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(server) = cfg.server.as_ref() {
        if let Some(url) = server.url.as_ref() {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Validation(
                    "server url must start with http:// or https://".into(),
                ));
            }
        }
    }
    if let Some(display) = cfg.display.as_ref() {
        if let (Some(w), Some(h)) = (display.width, display.height) {
            if w == 0 || h == 0 {
                return Err(ConfigError::Validation("display width/height must be > 0".into()));
            }
        }
        if let Some(bpp) = display.bpp {
            if bpp != 16 && bpp != 32 {
                return Err(ConfigError::Validation("display bpp must be 16|32".into()));
            }
        }
    }
    Ok(())
}

impl Config {
    pub fn server_url(&self) -> String {
        self.server
            .as_ref()
            .and_then(|s| s.url.clone())
            .unwrap_or_else(|| "http://localhost:8080".to_string())
    }

    pub fn screen_wake(&self) -> Duration {
        let secs = self
            .panel
            .as_ref()
            .and_then(|p| p.screen_wake_secs)
            .unwrap_or(SCREEN_WAKE_SECS);
        Duration::from_secs(secs)
    }

    pub fn images_dir(&self) -> PathBuf {
        self.panel
            .as_ref()
            .and_then(|p| p.images_dir.clone())
            .unwrap_or_else(|| PathBuf::from("./images"))
    }

    pub fn kodi_temp_dir(&self) -> PathBuf {
        self.panel
            .as_ref()
            .and_then(|p| p.kodi_temp_dir.clone())
            .unwrap_or_else(|| PathBuf::from("/storage/.kodi/temp"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_then_cli_layering() {
        let mut cfg = Config::default();
        merge(
            &mut cfg,
            Config {
                log_level: Some("info".into()),
                server: Some(ServerConfig { url: Some("http://kodi:8080".into()) }),
                ..Default::default()
            },
        );

        let cli = Cli {
            config: None,
            url: Some("http://other:8080".into()),
            log_level: None,
            debug: true,
            driver: Some(DriverKind::Mock),
            fbdev: None,
            wake_secs: Some(30),
            dump_config: false,
        };
        apply_cli_overrides(&mut cfg, &cli);

        assert_eq!(cfg.server_url(), "http://other:8080");
        assert_eq!(cfg.log_level.as_deref(), Some("debug"));
        assert_eq!(cfg.display.as_ref().unwrap().driver, Some(DriverKind::Mock));
        assert_eq!(cfg.screen_wake(), Duration::from_secs(30));
    }

    #[test]
    fn defaults_apply_when_nothing_is_configured() {
        let cfg = Config::default();
        assert_eq!(cfg.server_url(), "http://localhost:8080");
        assert_eq!(cfg.screen_wake(), Duration::from_secs(SCREEN_WAKE_SECS));
        assert!(cfg.images_dir().ends_with("images"));
    }

    #[test]
    fn bad_url_fails_validation() {
        let cfg = Config {
            server: Some(ServerConfig { url: Some("ftp://kodi".into()) }),
            ..Default::default()
        };
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn bad_bpp_fails_validation() {
        let cfg = Config {
            display: Some(DisplayConfig { bpp: Some(24), ..Default::default() }),
            ..Default::default()
        };
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn display_merge_is_field_by_field() {
        let mut dst = DisplayConfig { width: Some(320), ..Default::default() };
        merge_display(
            &mut dst,
            DisplayConfig { height: Some(240), bpp: Some(16), ..Default::default() },
        );
        assert_eq!(dst.width, Some(320));
        assert_eq!(dst.height, Some(240));
        assert_eq!(dst.bpp, Some(16));
    }
}
