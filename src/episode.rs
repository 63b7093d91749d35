//! Episode normalization: one feed `<item>` in, one [`Episode`] out.
//!
//! Normalization is total. Every field degrades to an empty string (or
//! `None`/`false`) when its tag is missing, so a bare `<item/>` still yields
//! an episode. The only side effect is a warning log for publish dates that
//! are present but unparseable.
//!
//! ## Field Resolution
//!
//! | Field | Source (first available wins) |
//! |-------|-------------------------------|
//! | `full_title` | `<title>`, CDATA unwrapped |
//! | `title` | `full_title` minus a leading `"N. "` |
//! | `description` | `<description>` as an HTML fragment |
//! | `number` | `<itunes:episode>` → `<podcast:episode>` → leading `"N."` of the title |
//! | `season` | `<itunes:season>` → `"1"` |
//! | `summary` | `<itunes:summary>` → `description` |
//! | `duration` | `<itunes:duration>` seconds → `"Hh Mm"` / `"M min"`, else verbatim |
//! | `explicit` | `<itunes:explicit>` is exactly `true` or `yes` |
//! | `artwork` | `<itunes:image href>` → podcast artwork |
//! | `audio_id` | digits after `/episodes/` in the enclosure URL |

use crate::text::{html_fragment, slugify, unwrap_cdata};
use crate::xml::{self, Element, attr_value, tag_content};
use chrono::{DateTime, FixedOffset};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static TITLE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\.").unwrap());

static TITLE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s+").unwrap());

static AUDIO_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/episodes/(\d+)").unwrap());

/// Season assumed when the feed doesn't say.
pub const DEFAULT_SEASON: &str = "1";

/// Channel-level information about the show.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PodcastMetadata {
    pub title: String,
    /// HTML fragment (see [`html_fragment`]).
    pub description: String,
    pub author: String,
    pub artwork: String,
    pub link: String,
}

/// A normalized feed item.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Episode {
    /// Title for display, with any leading `"N. "` removed.
    pub title: String,
    /// Title as published.
    pub full_title: String,
    /// Show notes as an HTML fragment: the publisher's markup when the feed
    /// used CDATA, escaped text otherwise. Safe to emit without escaping.
    pub description: String,
    /// Same representation as `description`.
    pub summary: String,
    pub published: Option<DateTime<FixedOffset>>,
    pub published_raw: String,
    pub duration_raw: String,
    pub duration: String,
    /// Episode number as text; empty when the feed has none.
    pub number: String,
    pub season: String,
    pub explicit: bool,
    pub audio_url: String,
    pub artwork: String,
    /// Numeric id from the audio URL path; empty when absent.
    pub audio_id: String,
    pub guid: String,
    /// Page filename stem. Unique within a feed once
    /// [`crate::feed::assign_slugs`] has run.
    pub slug: String,
}

impl Episode {
    /// Number used for ordering; anything unparseable counts as 0.
    pub fn sort_number(&self) -> u64 {
        self.number.trim().parse().unwrap_or(0)
    }

    /// Human-readable publish date, only for dates that parsed.
    pub fn display_date(&self) -> Option<String> {
        self.published
            .map(|date| date.format("%B %-d, %Y").to_string())
    }

    /// Output filename for this episode's page.
    pub fn page_filename(&self) -> String {
        format!("{}.html", self.slug)
    }
}

/// Read show metadata from the direct children of `<channel>`.
///
/// Only direct children are consulted, so an item's `<title>` or
/// `<itunes:image>` can never stand in for the show's.
pub fn parse_metadata(channel: &Element) -> PodcastMetadata {
    let child_text = |name: &str| {
        channel
            .child(name)
            .map(|e| unwrap_cdata(e.inner_text()))
            .unwrap_or_default()
    };

    let artwork = channel
        .child("itunes:image")
        .and_then(|e| e.attr("href"))
        .map(str::to_string)
        .filter(|href| !href.is_empty())
        .or_else(|| {
            channel
                .child("image")
                .and_then(|img| img.child("url"))
                .map(|url| url.inner_text().trim().to_string())
        })
        .unwrap_or_default();

    let author = Some(child_text("itunes:author"))
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| child_text("managingEditor"));

    PodcastMetadata {
        title: child_text("title"),
        description: channel
            .child("description")
            .map(|e| html_fragment(e.inner_text()))
            .unwrap_or_default(),
        author,
        artwork,
        link: child_text("link"),
    }
}

/// Normalize one `<item>` element.
///
/// `fallback_artwork` is used when the item carries no image of its own;
/// callers pass the podcast artwork URL.
pub fn parse_episode(item: &Element, fallback_artwork: &str) -> Episode {
    let full_title = unwrap_cdata(&tag_content(item, "title"));
    let description = html_fragment(&tag_content(item, "description"));
    let summary = Some(html_fragment(&tag_content(item, "itunes:summary")))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| description.clone());

    let audio_url = attr_value(item, "enclosure", "url");
    let audio_id = AUDIO_ID_RE
        .captures(&audio_url)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default();

    let number = resolve_number(item, &full_title);
    let title = display_title(&full_title);

    let duration_raw = tag_content(item, "itunes:duration");
    let duration = format_duration(&duration_raw);

    let season = Some(tag_content(item, "itunes:season"))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SEASON.to_string());

    let explicit = is_explicit(&tag_content(item, "itunes:explicit"));

    let artwork = Some(attr_value(item, "itunes:image", "href"))
        .filter(|href| !href.is_empty())
        .unwrap_or_else(|| fallback_artwork.to_string());

    let published_raw = tag_content(item, "pubDate");
    let published = parse_publish_date(&published_raw, &full_title);

    let guid = unwrap_cdata(&tag_content(item, "guid"));
    let slug = base_slug(&number, &title);

    Episode {
        title,
        full_title,
        description,
        summary,
        published,
        published_raw,
        duration_raw,
        duration,
        number,
        season,
        explicit,
        audio_url,
        artwork,
        audio_id,
        guid,
        slug,
    }
}

/// Explicit numbering field first, then a leading `"N."` in the title.
fn resolve_number(item: &Element, full_title: &str) -> String {
    for tag in ["itunes:episode", "podcast:episode"] {
        let explicit = tag_content(item, tag);
        if !explicit.is_empty() {
            return explicit;
        }
    }
    TITLE_NUMBER_RE
        .captures(full_title)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default()
}

/// Strip a leading `"N. "` from the title. Independent of where the episode
/// number came from: a title without the prefix is returned unchanged.
pub fn display_title(full_title: &str) -> String {
    TITLE_PREFIX_RE.replace(full_title, "").to_string()
}

/// Integer seconds become `"Hh Mm"` (an hour or more) or `"M min"`; anything
/// else is assumed to be preformatted and passed through.
pub fn format_duration(raw: &str) -> String {
    let Ok(seconds) = raw.trim().parse::<u64>() else {
        return raw.to_string();
    };
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes} min")
    }
}

/// Case-sensitive: only `true` and `yes` count.
pub fn is_explicit(raw: &str) -> bool {
    matches!(raw, "true" | "yes")
}

fn parse_publish_date(raw: &str, title: &str) -> Option<DateTime<FixedOffset>> {
    if raw.is_empty() {
        log::debug!("no publish date for \"{title}\"");
        return None;
    }
    match DateTime::parse_from_rfc2822(raw) {
        Ok(date) => Some(date),
        Err(err) => {
            log::warn!("invalid publish date {raw:?} for \"{title}\": {err}");
            None
        }
    }
}

/// Slug before collision handling: the episode number when there is one,
/// otherwise the slugified title.
fn base_slug(number: &str, title: &str) -> String {
    let source = if number.is_empty() { title } else { number };
    slugify(source)
}

/// Parse a standalone `<item>...</item>` fragment.
pub fn parse_item_fragment(
    fragment: &str,
    fallback_artwork: &str,
) -> Result<Episode, xml::XmlError> {
    let item = xml::parse_document(fragment)?;
    Ok(parse_episode(&item, fallback_artwork))
}
