//! CLI output formatting.
//!
//! Output is information-first: each entity is shown by its identity
//! (positional index and title) with paths and details on indented context
//! lines below it. Logging goes to stderr; this module is what lands on stdout.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! The Show
//!     Source: https://feeds.example.com/show.rss
//!     Artwork: downloaded (48213 bytes)
//! Home → index.html
//! Episodes → episodes.html
//! About → about.html
//! 001 Second → episodes/2.html
//! 002 First → episodes/1.html
//!
//! Generated 5 pages (2 episodes) in site
//! ```
//!
//! ## Check
//!
//! ```text
//! The Show
//!     Author: Host
//!     Artwork: https://cdn.example.com/show.jpg
//! Episodes (2)
//! 001 Second
//!     Number: 2 · Season 1
//!     Published: January 8, 2024
//!     Duration: 45 min
//!     Slug: 2
//! ```
//!
//! `check --json` prints [`format_check_json`] instead.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) and a
//! `print_*` wrapper that writes to stdout. Format functions do no I/O.

use crate::episode::Episode;
use crate::feed::Feed;
use crate::generate::{ArtworkStatus, BuildReport};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

fn artwork_line(status: &ArtworkStatus) -> String {
    match status {
        ArtworkStatus::Downloaded { bytes } => format!("downloaded ({bytes} bytes)"),
        ArtworkStatus::Existing => "already present".to_string(),
        ArtworkStatus::Unavailable => "none in feed".to_string(),
    }
}

pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = vec![
        report.podcast_title.clone(),
        format!("{}Source: {}", indent(1), report.source),
        format!("{}Artwork: {}", indent(1), artwork_line(&report.artwork)),
    ];

    for page in report.pages.iter().filter(|page| !page.episode) {
        lines.push(format!("{} → {}", page.title, page.path.display()));
    }
    for (i, page) in report.episode_pages().enumerate() {
        lines.push(format!(
            "{} {} → {}",
            format_index(i + 1),
            page.title,
            page.path.display()
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {} ({}) in {}",
        plural(report.pages.len(), "page", "pages"),
        plural(report.episode_count, "episode", "episodes"),
        report.output_root.display()
    ));
    lines
}

pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

fn episode_lines(index: usize, episode: &Episode) -> Vec<String> {
    let mut lines = vec![format!("{} {}", format_index(index), episode.title)];
    if !episode.number.is_empty() {
        lines.push(format!(
            "{}Number: {} · Season {}",
            indent(1),
            episode.number,
            episode.season
        ));
    }
    let published = episode
        .display_date()
        .unwrap_or_else(|| "(no valid date)".to_string());
    lines.push(format!("{}Published: {}", indent(1), published));
    if !episode.duration.is_empty() {
        lines.push(format!("{}Duration: {}", indent(1), episode.duration));
    }
    if episode.explicit {
        lines.push(format!("{}Explicit", indent(1)));
    }
    lines.push(format!("{}Slug: {}", indent(1), episode.slug));
    lines
}

pub fn format_check_output(feed: &Feed) -> Vec<String> {
    let podcast = &feed.podcast;
    let mut lines = vec![podcast.title.clone()];
    if !podcast.author.is_empty() {
        lines.push(format!("{}Author: {}", indent(1), podcast.author));
    }
    if !podcast.artwork.is_empty() {
        lines.push(format!("{}Artwork: {}", indent(1), podcast.artwork));
    }

    lines.push(format!("Episodes ({})", feed.episodes.len()));
    for (i, episode) in feed.episodes.iter().enumerate() {
        lines.extend(episode_lines(i + 1, episode));
    }
    lines
}

pub fn print_check_output(feed: &Feed) {
    for line in format_check_output(feed) {
        println!("{}", line);
    }
}

/// The parsed feed as pretty-printed JSON, for `check --json`. Missing or
/// unparseable publish dates serialize as `null`.
pub fn format_check_json(feed: &Feed) -> serde_json::Result<String> {
    serde_json::to_string_pretty(feed)
}
