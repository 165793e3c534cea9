use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::core::Slot;
use crate::editor::BackendKind;
use crate::state::router::Location;

pub const DEFAULT_RUNTIME_SCRIPT: &str = "https://unpkg.com/torus-dom/dist/index.min.js";
pub const DEFAULT_ORIGIN: &str = "http://localhost:4000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Quiet period for {0} must be greater than zero")]
    ZeroQuiet(&'static str),

    #[error("Origin must be an http(s) URL: {0}")]
    InvalidOrigin(String),
}

#[derive(Debug, Parser)]
#[command(name = "livepad")]
#[command(about = "Live HTML and JavaScript playground for the terminal")]
#[command(version)]
pub struct Cli {
    /// Location to open: /welcome, /h/<html>/j/<js>/edit, or /new?html=..&js=..#javascript
    #[arg(default_value = "/")]
    pub url: String,

    /// User agent string used to pick the editor backend
    #[arg(long, default_value = "")]
    pub user_agent: String,

    /// Force an editor backend (ide or lite)
    #[arg(long)]
    pub backend: Option<BackendKind>,

    /// Directory holding stored pad contents
    #[arg(long, default_value = "pads")]
    pub store_dir: PathBuf,

    /// Origin used for saved preview URLs
    #[arg(long, default_value = DEFAULT_ORIGIN)]
    pub origin: String,

    /// Script loaded into every live preview before the pad's own script
    #[arg(long, default_value = DEFAULT_RUNTIME_SCRIPT)]
    pub runtime_script: String,

    /// Quiet period before a live render, in milliseconds
    #[arg(long, default_value_t = 750)]
    pub live_render_ms: u64,

    /// Quiet period before an editor relayout, in milliseconds
    #[arg(long, default_value_t = 250)]
    pub resize_ms: u64,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prefill {
    pub html: String,
    pub js: String,
    pub tab: Option<Slot>,
}

impl Prefill {
    pub fn from_location(location: &Location) -> Self {
        let mut prefill = Self::default();
        for (key, value) in location.query_pairs() {
            match key.as_str() {
                "html" => prefill.html = value,
                "js" => prefill.js = value,
                _ => {}
            }
        }
        prefill.tab = location
            .fragment
            .as_deref()
            .and_then(|fragment| fragment.parse().ok());
        prefill
    }

    pub fn has_content(&self) -> bool {
        !self.html.is_empty() || !self.js.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub launch: Location,
    pub prefill: Prefill,
    pub user_agent: String,
    pub backend: Option<BackendKind>,
    pub store_dir: PathBuf,
    pub origin: String,
    pub runtime_script: String,
    pub live_render_quiet: Duration,
    pub resize_quiet: Duration,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            launch: Location::path("/"),
            prefill: Prefill::default(),
            user_agent: String::new(),
            backend: None,
            store_dir: PathBuf::from("pads"),
            origin: DEFAULT_ORIGIN.to_string(),
            runtime_script: DEFAULT_RUNTIME_SCRIPT.to_string(),
            live_render_quiet: Duration::from_millis(750),
            resize_quiet: Duration::from_millis(250),
            log_file: None,
        }
    }
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        if cli.live_render_ms == 0 {
            return Err(ConfigError::ZeroQuiet("live render"));
        }
        if cli.resize_ms == 0 {
            return Err(ConfigError::ZeroQuiet("resize"));
        }
        if !(cli.origin.starts_with("http://") || cli.origin.starts_with("https://")) {
            return Err(ConfigError::InvalidOrigin(cli.origin));
        }

        let launch = Location::parse(&cli.url);
        let prefill = Prefill::from_location(&launch);
        Ok(Self {
            launch,
            prefill,
            user_agent: cli.user_agent,
            backend: cli.backend,
            store_dir: cli.store_dir,
            origin: cli.origin.trim_end_matches('/').to_string(),
            runtime_script: cli.runtime_script,
            live_render_quiet: Duration::from_millis(cli.live_render_ms),
            resize_quiet: Duration::from_millis(cli.resize_ms),
            log_file: cli.log_file,
        })
    }

    pub fn with_launch(url: &str) -> Self {
        let launch = Location::parse(url);
        let prefill = Prefill::from_location(&launch);
        Self {
            launch,
            prefill,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["livepad"]).unwrap();
        let config = Config::from_cli(cli).unwrap();
        assert_eq!(config.launch.path, "/");
        assert_eq!(config.prefill, Prefill::default());
        assert_eq!(config.live_render_quiet, Duration::from_millis(750));
        assert_eq!(config.resize_quiet, Duration::from_millis(250));
        assert_eq!(config.runtime_script, DEFAULT_RUNTIME_SCRIPT);
        assert_eq!(config.backend, None);
    }

    #[test]
    fn test_cli_prefill_from_url() {
        let cli = Cli::try_parse_from([
            "livepad",
            "/new?html=%3Ch1%3EHi%3C%2Fh1%3E&js=alert(1)&other=x#javascript",
            "--backend",
            "lite",
            "--origin",
            "https://pads.example/",
        ])
        .unwrap();
        let config = Config::from_cli(cli).unwrap();
        assert_eq!(config.prefill.html, "<h1>Hi</h1>");
        assert_eq!(config.prefill.js, "alert(1)");
        assert_eq!(config.prefill.tab, Some(Slot::Script));
        assert_eq!(config.backend, Some(BackendKind::Lite));
        assert_eq!(config.origin, "https://pads.example");
    }

    #[test]
    fn test_unknown_fragment_ignored() {
        let config = Config::with_launch("/new#settings");
        assert_eq!(config.prefill.tab, None);
        assert!(!config.prefill.has_content());
    }

    #[test]
    fn test_rejects_bad_values() {
        let cli = Cli::try_parse_from(["livepad", "--live-render-ms", "0"]).unwrap();
        assert!(matches!(
            Config::from_cli(cli),
            Err(ConfigError::ZeroQuiet("live render"))
        ));

        let cli = Cli::try_parse_from(["livepad", "--origin", "ftp://x"]).unwrap();
        assert!(matches!(Config::from_cli(cli), Err(ConfigError::InvalidOrigin(_))));

        assert!(Cli::try_parse_from(["livepad", "--backend", "vim"]).is_err());
    }
}
