//! Feed assembly: document → show metadata + ordered, uniquely-slugged episodes.
//!
//! ## Ordering
//!
//! Episodes are sorted newest-first by episode number, then by publish date.
//! The number wins over the date, and an unparseable number counts as 0, so an
//! unnumbered bonus episode sorts after every numbered one no matter when it
//! was published. Missing dates sort as oldest. The sort is stable, so items
//! that tie on both keys keep feed order.
//!
//! ## Slugs
//!
//! Each episode page is written to `<slug>.html`. Two episodes that would
//! share a slug (a repeated number, or identical unnumbered titles) are
//! disambiguated in sorted order: the first keeps the bare slug and the rest
//! get `-2`, `-3`, ... appended.

use crate::episode::{Episode, PodcastMetadata, parse_episode, parse_metadata};
use crate::xml::{self, XmlError};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Used when neither a number nor a usable title gives a slug.
const FALLBACK_SLUG: &str = "episode";

/// A fully parsed feed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Feed {
    pub podcast: PodcastMetadata,
    /// Sorted newest-first, with unique slugs.
    pub episodes: Vec<Episode>,
}

/// Parse a feed document into show metadata and sorted episodes.
pub fn parse_feed(document: &str) -> Result<Feed, XmlError> {
    let root = xml::parse_document(document)?;
    let channel = if root.is("channel") {
        &root
    } else {
        root.find("channel").unwrap_or(&root)
    };

    let podcast = parse_metadata(channel);
    let mut episodes: Vec<Episode> = xml::all_items(&root)
        .into_iter()
        .map(|item| parse_episode(item, &podcast.artwork))
        .collect();

    sort_episodes(&mut episodes);
    assign_slugs(&mut episodes);

    log::info!(
        "parsed feed \"{}\": {} episodes",
        podcast.title,
        episodes.len()
    );
    Ok(Feed { podcast, episodes })
}

/// Newest-first ordering: episode number descending, then publish date
/// descending.
pub fn compare_episodes(a: &Episode, b: &Episode) -> Ordering {
    b.sort_number()
        .cmp(&a.sort_number())
        .then_with(|| b.published.cmp(&a.published))
}

pub fn sort_episodes(episodes: &mut [Episode]) {
    episodes.sort_by(compare_episodes);
}

/// Make every slug unique and non-empty. Expects sorted input.
pub fn assign_slugs(episodes: &mut [Episode]) {
    let mut taken: HashSet<String> = HashSet::new();
    for episode in episodes.iter_mut() {
        let base = if episode.slug.is_empty() {
            FALLBACK_SLUG.to_string()
        } else {
            episode.slug.clone()
        };

        let mut candidate = base.clone();
        let mut suffix = 2;
        while taken.contains(&candidate) {
            candidate = format!("{base}-{suffix}");
            suffix += 1;
        }
        if candidate != base {
            log::warn!(
                "episode \"{}\" shares slug \"{}\"; writing it as \"{}\"",
                episode.full_title,
                base,
                candidate
            );
        }

        taken.insert(candidate.clone());
        episode.slug = candidate;
    }
}

impl Feed {
    /// The next older episode, if any.
    pub fn previous(&self, index: usize) -> Option<&Episode> {
        self.episodes.get(index + 1)
    }

    /// The next newer episode, if any.
    pub fn next(&self, index: usize) -> Option<&Episode> {
        index.checked_sub(1).and_then(|i| self.episodes.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn ep(number: &str, date: Option<&str>, slug: &str) -> Episode {
        Episode {
            number: number.to_string(),
            published: date.map(|d| DateTime::parse_from_rfc2822(d).unwrap()),
            slug: slug.to_string(),
            full_title: slug.to_string(),
            ..Episode::default()
        }
    }

    const JAN: &str = "Mon, 01 Jan 2024 00:00:00 +0000";
    const FEB: &str = "Thu, 01 Feb 2024 00:00:00 +0000";
    const MAR: &str = "Fri, 01 Mar 2024 00:00:00 +0000";

    #[test]
    fn sorts_by_number_descending() {
        let mut eps = vec![ep("1", Some(MAR), "a"), ep("3", Some(JAN), "b"), ep("2", Some(FEB), "c")];
        sort_episodes(&mut eps);
        let numbers: Vec<_> = eps.iter().map(|e| e.number.as_str()).collect();
        assert_eq!(numbers, ["3", "2", "1"]);
    }

    #[test]
    fn number_beats_date() {
        let mut eps = vec![ep("1", Some(MAR), "new"), ep("5", Some(JAN), "old")];
        sort_episodes(&mut eps);
        assert_eq!(eps[0].slug, "old");
    }

    #[test]
    fn ties_break_by_date_descending() {
        let mut eps = vec![ep("", Some(JAN), "jan"), ep("", Some(MAR), "mar"), ep("", Some(FEB), "feb")];
        sort_episodes(&mut eps);
        let slugs: Vec<_> = eps.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, ["mar", "feb", "jan"]);
    }

    #[test]
    fn unparseable_numbers_sort_as_zero() {
        let mut eps = vec![ep("bonus", Some(MAR), "bonus"), ep("1", Some(JAN), "one")];
        sort_episodes(&mut eps);
        assert_eq!(eps[0].slug, "one");
        assert_eq!(eps[1].slug, "bonus");
    }

    #[test]
    fn missing_dates_sort_last_among_ties() {
        let mut eps = vec![ep("", None, "undated"), ep("", Some(JAN), "dated")];
        sort_episodes(&mut eps);
        assert_eq!(eps[0].slug, "dated");
    }

    #[test]
    fn compare_is_antisymmetric_for_distinct_numbers() {
        let a = ep("10", Some(JAN), "a");
        let b = ep("9", Some(MAR), "b");
        assert_eq!(compare_episodes(&a, &b), Ordering::Less);
        assert_eq!(compare_episodes(&b, &a), Ordering::Greater);
    }

    #[test]
    fn duplicate_slugs_get_suffixes() {
        let mut eps = vec![ep("4", None, "4"), ep("4", None, "4"), ep("4", None, "4")];
        assign_slugs(&mut eps);
        let slugs: Vec<_> = eps.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, ["4", "4-2", "4-3"]);
    }

    #[test]
    fn suffix_skips_existing_slugs() {
        let mut eps = vec![ep("", None, "a-2"), ep("", None, "a"), ep("", None, "a")];
        assign_slugs(&mut eps);
        let slugs: Vec<_> = eps.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, ["a-2", "a", "a-3"]);
    }

    #[test]
    fn empty_slug_gets_fallback() {
        let mut eps = vec![ep("", None, ""), ep("", None, "")];
        assign_slugs(&mut eps);
        assert_eq!(eps[0].slug, "episode");
        assert_eq!(eps[1].slug, "episode-2");
    }

    #[test]
    fn parse_feed_end_to_end() {
        let feed = parse_feed(
            r#"<rss><channel>
                <title>Show</title>
                <itunes:image href="https://cdn.example.com/show.jpg"/>
                <item><title>1. First</title><pubDate>Mon, 01 Jan 2024 00:00:00 +0000</pubDate></item>
                <item><title>2. Second</title><pubDate>Thu, 01 Feb 2024 00:00:00 +0000</pubDate></item>
                <item><title>Bonus</title></item>
            </channel></rss>"#,
        )
        .unwrap();

        assert_eq!(feed.podcast.title, "Show");
        let slugs: Vec<_> = feed.episodes.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, ["2", "1", "bonus"]);
        assert!(
            feed.episodes
                .iter()
                .all(|e| e.artwork == "https://cdn.example.com/show.jpg")
        );
    }

    #[test]
    fn parse_feed_without_items() {
        let feed = parse_feed("<rss><channel><title>Empty</title></channel></rss>").unwrap();
        assert!(feed.episodes.is_empty());
    }

    #[test]
    fn adjacency() {
        let feed = Feed {
            podcast: PodcastMetadata::default(),
            episodes: vec![ep("3", None, "3"), ep("2", None, "2"), ep("1", None, "1")],
        };
        let middle = 1;
        assert_eq!(feed.previous(middle).map(|e| e.slug.as_str()), Some("1"));
        assert_eq!(feed.next(middle).map(|e| e.slug.as_str()), Some("3"));
        assert!(feed.next(0).is_none());
        assert!(feed.previous(2).is_none());
    }
}
