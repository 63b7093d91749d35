//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! overridden by the user's file, which in turn is overridden by command-line
//! flags (see [`BuildConfig`]).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! feed_url = "https://example.com/podcast/feed.rss"
//! output_root = "site"
//! episodes_dir = "episodes"   # Per-episode pages, relative to output_root
//! artwork_file = "artwork.jpg" # Downloaded show artwork, relative to output_root
//!
//! [site]
//! recent_count = 6            # Episode cards on the home page
//! sidebar_count = 10          # Recent episodes listed in the sidebar
//! summary_length = 200        # Card summary length (characters)
//! about_title = "About"
//! about_markdown = ""         # Markdown for the about page (empty = show description)
//!
//! [fetch]
//! timeout_secs = 30
//! max_redirects = 10
//! user_agent = "podcast-site/<version>"
//!
//! [colors.light]
//! background = "#ffffff"
//! text = "#1a1a1a"
//! text_muted = "#666666"
//! border = "#e0e0e0"
//! link = "#1f4e79"
//! link_hover = "#0b2540"
//! accent = "#d94f30"
//!
//! [colors.dark]
//! background = "#121212"
//! text = "#eeeeee"
//! text_muted = "#9a9a9a"
//! border = "#333333"
//! link = "#8cb8e6"
//! link_hover = "#ffffff"
//! accent = "#ff7a59"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Feed fetched when no local document is given.
    pub feed_url: String,
    /// Root directory of the generated site.
    pub output_root: PathBuf,
    /// Subdirectory of `output_root` holding one page per episode.
    pub episodes_dir: String,
    /// Where the show artwork is downloaded to, relative to `output_root`.
    pub artwork_file: String,
    /// Page layout settings.
    pub site: LayoutConfig,
    /// Network settings for feed and artwork downloads.
    pub fetch: FetchConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            feed_url: "https://example.com/podcast/feed.rss".to_string(),
            output_root: PathBuf::from("site"),
            episodes_dir: "episodes".to_string(),
            artwork_file: "artwork.jpg".to_string(),
            site: LayoutConfig::default(),
            fetch: FetchConfig::default(),
            colors: ColorConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.recent_count == 0 {
            return Err(ConfigError::Validation(
                "site.recent_count must be at least 1".into(),
            ));
        }
        if self.site.sidebar_count == 0 {
            return Err(ConfigError::Validation(
                "site.sidebar_count must be at least 1".into(),
            ));
        }
        if self.site.summary_length == 0 {
            return Err(ConfigError::Validation(
                "site.summary_length must be at least 1".into(),
            ));
        }
        if self.fetch.max_redirects == 0 {
            return Err(ConfigError::Validation(
                "fetch.max_redirects must be at least 1".into(),
            ));
        }
        if !is_plain_relative(&self.episodes_dir) {
            return Err(ConfigError::Validation(
                "episodes_dir must be a non-empty relative path without '..'".into(),
            ));
        }
        if !is_plain_relative(&self.artwork_file) {
            return Err(ConfigError::Validation(
                "artwork_file must be a non-empty relative path without '..'".into(),
            ));
        }
        Ok(())
    }
}

/// True for paths like `episodes` or `img/art.jpg`: non-empty, relative, and
/// never climbing out of the output root.
fn is_plain_relative(path: &str) -> bool {
    !path.is_empty()
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

/// Page layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Number of episode cards below the hero on the home page.
    pub recent_count: usize,
    /// Number of episodes listed in the sidebar.
    pub sidebar_count: usize,
    /// Maximum characters of a card summary before truncation.
    pub summary_length: usize,
    /// Heading and nav label of the about page.
    pub about_title: String,
    /// Markdown body of the about page. Empty uses the show description.
    pub about_markdown: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            recent_count: 6,
            sidebar_count: 10,
            summary_length: crate::text::DEFAULT_SUMMARY_LENGTH,
            about_title: "About".to_string(),
            about_markdown: String::new(),
        }
    }
}

/// Network settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Per-request timeout covering connect and body read.
    pub timeout_secs: u64,
    /// Redirect hops followed before giving up.
    pub max_redirects: usize,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_redirects: 10,
            user_agent: concat!("podcast-site/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Dates, durations, footer.
    pub text_muted: String,
    pub border: String,
    pub link: String,
    pub link_hover: String,
    /// Episode number badges and the play button.
    pub accent: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#1a1a1a".to_string(),
            text_muted: "#666666".to_string(),
            border: "#e0e0e0".to_string(),
            link: "#1f4e79".to_string(),
            link_hover: "#0b2540".to_string(),
            accent: "#d94f30".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#121212".to_string(),
            text: "#eeeeee".to_string(),
            text_muted: "#9a9a9a".to_string(),
            border: "#333333".to_string(),
            link: "#8cb8e6".to_string(),
            link_hover: "#ffffff".to_string(),
            accent: "#ff7a59".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

/// Where the feed document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Url(String),
    Local(PathBuf),
}

impl std::fmt::Display for FeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedSource::Url(url) => write!(f, "{url}"),
            FeedSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Everything a build needs, after flags have been applied over the file.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub feed_source: FeedSource,
    pub output_root: PathBuf,
    pub site: SiteConfig,
}

impl BuildConfig {
    /// Resolve the effective build settings. Flags win over the config file.
    pub fn resolve(
        site: SiteConfig,
        local_feed: Option<PathBuf>,
        output_root: Option<PathBuf>,
    ) -> Self {
        let feed_source = match local_feed {
            Some(path) => FeedSource::Local(path),
            None => FeedSource::Url(site.feed_url.clone()),
        };
        let output_root = output_root.unwrap_or_else(|| site.output_root.clone());
        Self {
            feed_source,
            output_root,
            site,
        }
    }

    pub fn episodes_path(&self) -> PathBuf {
        self.output_root.join(&self.site.episodes_dir)
    }

    pub fn artwork_path(&self) -> PathBuf {
        self.output_root.join(&self.site.artwork_file)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file.
///
/// A missing file is not an error: the stock defaults are returned.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    if !path.exists() {
        log::debug!("no config at {}, using defaults", path.display());
        return resolve_config(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(value))
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# podcast-site configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Feed fetched on every build. Override per run with --local <file>.
feed_url = "https://example.com/podcast/feed.rss"

# Root of the generated site (override with --output).
output_root = "site"

# Subdirectory of output_root with one page per episode.
episodes_dir = "episodes"

# Show artwork is downloaded here once; delete the file to refresh it.
artwork_file = "artwork.jpg"

# ---------------------------------------------------------------------------
# Layout
# ---------------------------------------------------------------------------
[site]
# Episode cards shown below the latest episode on the home page.
recent_count = 6

# Recent episodes listed in the sidebar of episode pages.
sidebar_count = 10

# Card summaries are cut to this many characters, on a word boundary.
summary_length = 200

# About page heading and navigation label.
about_title = "About"

# Markdown for the about page. Leave empty to use the feed's description.
about_markdown = ""

# ---------------------------------------------------------------------------
# Network
# ---------------------------------------------------------------------------
[fetch]
# Per-request timeout in seconds (connect + download).
timeout_secs = 30

# Redirect hops followed before a fetch fails.
max_redirects = 10

# Defaults to "podcast-site/<version>".
# user_agent = "podcast-site"

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#1a1a1a"
text_muted = "#666666"    # Dates, durations, footer
border = "#e0e0e0"
link = "#1f4e79"
link_hover = "#0b2540"
accent = "#d94f30"        # Episode badges, play button

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#121212"
text = "#eeeeee"
text_muted = "#9a9a9a"
border = "#333333"
link = "#8cb8e6"
link_hover = "#ffffff"
accent = "#ff7a59"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
{light}
}}

@media (prefers-color-scheme: dark) {{
    :root {{
{dark}
    }}
}}"#,
        light = scheme_properties(&colors.light, "    "),
        dark = scheme_properties(&colors.dark, "        "),
    )
}

fn scheme_properties(scheme: &ColorScheme, indent: &str) -> String {
    [
        ("--color-bg", &scheme.background),
        ("--color-text", &scheme.text),
        ("--color-text-muted", &scheme.text_muted),
        ("--color-border", &scheme.border),
        ("--color-link", &scheme.link),
        ("--color-link-hover", &scheme.link_hover),
        ("--color-accent", &scheme.accent),
    ]
    .iter()
    .map(|(name, value)| format!("{indent}{name}: {value};"))
    .collect::<Vec<_>>()
    .join("\n")
}
