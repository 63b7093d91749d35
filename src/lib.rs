//! # Podcast Site
//!
//! A static site generator for a single podcast. The RSS feed is the data
//! source: every `<item>` becomes an episode page, and the channel supplies
//! the show title, description, author and artwork.
//!
//! # Pipeline
//!
//! ```text
//! 1. Fetch     feed URL or local file  →  RSS document
//! 2. Parse     RSS document            →  Feed (podcast metadata + sorted episodes)
//! 3. Generate  Feed + config           →  site/ (HTML pages + downloaded artwork)
//! ```
//!
//! Each build is a single pass with no state carried between runs apart from
//! the artwork file, which is downloaded once and reused while it exists.
//! Rendering is deterministic, so rebuilding an unchanged feed rewrites
//! byte-identical pages.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`fetch`] | HTTP GET with explicit redirect following over a pluggable [`fetch::Transport`] |
//! | [`xml`] | Lenient element tree over `quick-xml` with case-insensitive tag lookup |
//! | [`episode`] | Normalizes `<item>` and `<channel>` elements into [`episode::Episode`] and [`episode::PodcastMetadata`] |
//! | [`feed`] | Assembles the feed: ordering, slug assignment, neighbor lookup |
//! | [`text`] | CDATA unwrapping, markup stripping, truncation, slugs |
//! | [`templates`] | Maud page templates: home, episode list, episode, about |
//! | [`generate`] | Build orchestration: load, download artwork, write pages |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`output`] | CLI output formatting of build and check results |
//!
//! # Design Decisions
//!
//! ## Missing Data Is Not an Error
//!
//! Podcast feeds are produced by many hosting platforms, and few of them
//! agree on which tags are present. Every field lookup returns an empty
//! string when the tag is absent, and templates omit whatever is empty.
//! Only I/O failures and syntactically broken XML stop a build.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/): templates are
//! checked at compile time, interpolation is escaped by default, and there
//! is no template directory to ship. Show notes are the one place feed HTML
//! is emitted verbatim.
//!
//! ## Redirects Are Followed by Hand
//!
//! Feed hosts commonly move feeds behind one or more redirects. The
//! [`fetch::Fetcher`] follows them itself, resolving relative `Location`
//! headers and bounding the hop count, so the same logic runs against the
//! real HTTP client and the in-memory transport used in tests.

pub mod config;
pub mod episode;
pub mod feed;
pub mod fetch;
pub mod generate;
pub mod output;
pub mod templates;
pub mod text;
pub mod xml;
