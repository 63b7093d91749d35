//! Site build orchestration.
//!
//! Loads the feed (over HTTP or from a local file), downloads the show
//! artwork once, and writes every page from [`templates`](crate::templates).
//!
//! ## Output Structure
//!
//! ```text
//! site/
//! ├── index.html            # Hero + recent episodes
//! ├── episodes.html         # Searchable list of all episodes
//! ├── about.html
//! ├── artwork.jpg           # Downloaded once, kept across builds
//! └── episodes/
//!     ├── 42.html           # One page per episode, named by slug
//!     └── ...
//! ```
//!
//! Any fetch or filesystem failure aborts the build; pages already written
//! stay on disk and are overwritten by the next successful run. Output is a
//! pure function of the feed and config, so rebuilding an unchanged feed
//! produces byte-identical files.

use crate::config::{self, BuildConfig, FeedSource};
use crate::feed::{self, Feed};
use crate::fetch::{FetchError, Fetcher, Transport};
use crate::templates::{self, SiteContext};
use crate::xml::XmlError;
use maud::Markup;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("Feed error: {0}")]
    Xml(#[from] XmlError),
    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl GenerateError {
    fn fs(path: &Path, source: std::io::Error) -> Self {
        GenerateError::Filesystem {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// What happened to the show artwork during a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtworkStatus {
    /// Fetched and written this run.
    Downloaded { bytes: usize },
    /// Already on disk; not fetched.
    Existing,
    /// The feed declares no artwork.
    Unavailable,
}

/// Summary of a finished build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub source: String,
    pub podcast_title: String,
    pub episode_count: usize,
    pub output_root: PathBuf,
    /// Written pages in write order.
    pub pages: Vec<GeneratedPage>,
    pub artwork: ArtworkStatus,
}

impl BuildReport {
    /// Pages belonging to individual episodes.
    pub fn episode_pages(&self) -> impl Iterator<Item = &GeneratedPage> {
        self.pages.iter().filter(|page| page.episode)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPage {
    pub title: String,
    /// Relative to the output root.
    pub path: PathBuf,
    pub episode: bool,
}

impl GeneratedPage {
    fn site(title: &str, path: &str) -> Self {
        Self {
            title: title.to_string(),
            path: PathBuf::from(path),
            episode: false,
        }
    }
}

/// Run a full build: load, parse, download artwork, render, write.
pub fn build_site<T: Transport>(
    config: &BuildConfig,
    fetcher: &Fetcher<T>,
) -> Result<BuildReport, GenerateError> {
    let document = load_feed_document(config, fetcher)?;
    let feed = feed::parse_feed(&document)?;

    let root = &config.output_root;
    fs::create_dir_all(root).map_err(|e| GenerateError::fs(root, e))?;

    let artwork = download_artwork(&feed.podcast.artwork, &config.artwork_path(), fetcher)?;
    let pages = write_pages(config, &feed, artwork != ArtworkStatus::Unavailable)?;

    log::info!(
        "Generated {} pages for {} in {}",
        pages.len(),
        feed.podcast.title,
        root.display()
    );

    Ok(BuildReport {
        source: config.feed_source.to_string(),
        podcast_title: feed.podcast.title,
        episode_count: feed.episodes.len(),
        output_root: root.clone(),
        pages,
        artwork,
    })
}

/// Load and parse the feed without writing anything.
pub fn check_feed<T: Transport>(
    config: &BuildConfig,
    fetcher: &Fetcher<T>,
) -> Result<Feed, GenerateError> {
    let document = load_feed_document(config, fetcher)?;
    Ok(feed::parse_feed(&document)?)
}

/// Read the raw feed document from its configured source.
pub fn load_feed_document<T: Transport>(
    config: &BuildConfig,
    fetcher: &Fetcher<T>,
) -> Result<String, GenerateError> {
    match &config.feed_source {
        FeedSource::Url(url) => {
            log::info!("Fetching feed from {url}");
            Ok(fetcher.fetch_text(url)?)
        }
        FeedSource::Local(path) => {
            log::info!("Reading feed from {}", path.display());
            fs::read_to_string(path).map_err(|e| GenerateError::fs(path, e))
        }
    }
}

/// Download the show artwork to `dest` unless it is already there.
pub fn download_artwork<T: Transport>(
    url: &str,
    dest: &Path,
    fetcher: &Fetcher<T>,
) -> Result<ArtworkStatus, GenerateError> {
    if dest.exists() {
        log::info!("Artwork already present at {}, skipping download", dest.display());
        return Ok(ArtworkStatus::Existing);
    }
    if url.is_empty() {
        log::warn!("Feed has no show artwork");
        return Ok(ArtworkStatus::Unavailable);
    }

    log::info!("Downloading artwork from {url}");
    let bytes = fetcher.fetch_binary(url)?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| GenerateError::fs(parent, e))?;
    }
    fs::write(dest, &bytes).map_err(|e| GenerateError::fs(dest, e))?;
    Ok(ArtworkStatus::Downloaded { bytes: bytes.len() })
}

fn write_pages(
    config: &BuildConfig,
    feed: &Feed,
    has_artwork: bool,
) -> Result<Vec<GeneratedPage>, GenerateError> {
    let site = &config.site;
    let color_css = config::generate_color_css(&site.colors);
    let artwork_href = site_path(&site.artwork_file);
    let ctx = SiteContext {
        feed,
        layout: &site.site,
        color_css: &color_css,
        episodes_dir: site.episodes_dir.trim_matches('/'),
        local_artwork: has_artwork.then_some(artwork_href.as_str()),
    };

    let mut written = Vec::new();
    let mut write = |page: GeneratedPage, markup: Markup| -> Result<(), GenerateError> {
        write_page(&config.output_root, &page.path, markup)?;
        log::debug!("Generated {}", page.path.display());
        written.push(page);
        Ok(())
    };

    write(
        GeneratedPage::site("Home", "index.html"),
        templates::render_home(&ctx),
    )?;
    write(
        GeneratedPage::site("Episodes", "episodes.html"),
        templates::render_episode_list(&ctx),
    )?;
    write(
        GeneratedPage::site(&site.site.about_title, "about.html"),
        templates::render_about(&ctx),
    )?;

    let episodes_dir = config.episodes_path();
    fs::create_dir_all(&episodes_dir).map_err(|e| GenerateError::fs(&episodes_dir, e))?;
    for (index, episode) in feed.episodes.iter().enumerate() {
        let page = GeneratedPage {
            title: episode.title.clone(),
            path: Path::new(&site.episodes_dir).join(episode.page_filename()),
            episode: true,
        };
        if let Some(markup) = templates::render_episode_page(&ctx, index) {
            write(page, markup)?;
        }
    }
    log::info!("Generated {} episode pages", feed.episodes.len());

    Ok(written)
}

fn write_page(root: &Path, relative: &Path, markup: Markup) -> Result<(), GenerateError> {
    let path = root.join(relative);
    fs::write(&path, markup.into_string()).map_err(|e| GenerateError::fs(&path, e))
}

/// Site-absolute href for a path relative to the output root.
fn site_path(relative: &str) -> String {
    format!("/{}", relative.trim_start_matches('/'))
}

// ============================================================================
// Tests
// ============================================================================
