//! HTML page templates.
//!
//! Every page is a pure function of the parsed [`Feed`] plus layout settings,
//! rendered with [maud](https://maud.lambda.xyz/). Interpolated values are
//! escaped by maud; the single opt-out is the episode show notes, emitted
//! through `PreEscaped` after the source prefix is removed. They are already
//! an HTML fragment: the publisher's CDATA markup, or escaped text (see
//! [`crate::text::html_fragment`]).
//!
//! ## Pages
//!
//! - **Home** (`/index.html`): latest episode as hero, then a grid of recent ones
//! - **Episodes** (`/episodes.html`): every episode, with a client-side search box
//! - **Episode** (`/{episodes_dir}/{slug}.html`): player, show notes,
//!   older/newer links, recent-episode sidebar
//! - **About** (`/about.html`): configured markdown or the show description
//!
//! Navigation, footer and sidebar are shared fragments. The stylesheet and
//! script are embedded at compile time and inlined into every page.

use crate::config::LayoutConfig;
use crate::episode::{Episode, PodcastMetadata};
use crate::feed::Feed;
use crate::text::{remove_source_prefix, strip_markup, truncate};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/site.js");

/// Top-level pages, for highlighting the current nav entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavPage {
    Home,
    Episodes,
    About,
}

/// Everything templates need besides the page-specific arguments.
pub struct SiteContext<'a> {
    pub feed: &'a Feed,
    pub layout: &'a LayoutConfig,
    /// Color variables, prepended to the static stylesheet.
    pub color_css: &'a str,
    /// Directory (relative to the site root) holding episode pages.
    pub episodes_dir: &'a str,
    /// Site-relative path of the downloaded artwork, when there is one.
    pub local_artwork: Option<&'a str>,
}

impl SiteContext<'_> {
    fn podcast(&self) -> &PodcastMetadata {
        &self.feed.podcast
    }

    fn episode_href(&self, episode: &Episode) -> String {
        format!("/{}/{}", self.episodes_dir, episode.page_filename())
    }
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(ctx: &SiteContext, title: &str, description: &str, content: Markup) -> Markup {
    let podcast_title = &ctx.podcast().title;
    let full_title = if title.is_empty() || title == podcast_title {
        podcast_title.clone()
    } else {
        format!("{title} | {podcast_title}")
    };

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (full_title) }
                @if !description.is_empty() {
                    meta name="description" content=(description);
                }
                @if let Some(artwork) = ctx.local_artwork {
                    link rel="icon" href=(artwork);
                }
                style { (PreEscaped(ctx.color_css)) "\n\n" (PreEscaped(CSS_STATIC)) }
            }
            body {
                (content)
                script { (PreEscaped(JS)) }
            }
        }
    }
}

/// Renders the site header: show title plus a collapsible menu
pub fn site_nav(ctx: &SiteContext, current: Option<NavPage>) -> Markup {
    let item = |page: NavPage, href: &str, label: &str| {
        let is_current = current == Some(page);
        html! {
            li class=[is_current.then_some("current")] {
                a href=(href) aria-current=[is_current.then_some("page")] { (label) }
            }
        }
    };

    html! {
        header.site-header {
            a.site-title href="/" { (ctx.podcast().title) }
            button.nav-toggle type="button" aria-expanded="false" aria-controls="site-menu" {
                span.visually-hidden { "Menu" }
                span.hamburger-line {}
                span.hamburger-line {}
                span.hamburger-line {}
            }
            nav.site-nav {
                ul.nav-links id="site-menu" {
                    (item(NavPage::Home, "/", "Home"))
                    (item(NavPage::Episodes, "/episodes.html", "Episodes"))
                    (item(NavPage::About, "/about.html", &ctx.layout.about_title))
                }
            }
        }
    }
}

/// Renders the shared footer
pub fn site_footer(ctx: &SiteContext) -> Markup {
    let podcast = ctx.podcast();
    html! {
        footer.site-footer {
            p {
                (podcast.title)
                @if !podcast.author.is_empty() {
                    " · by " (podcast.author)
                }
            }
            @if !podcast.link.is_empty() {
                p { a href=(podcast.link) rel="noopener" { "Official website" } }
            }
        }
    }
}

/// Renders the recent-episodes sidebar, marking `current_slug` if listed
pub fn sidebar(ctx: &SiteContext, current_slug: Option<&str>) -> Markup {
    html! {
        aside.sidebar {
            h2 { "Recent episodes" }
            ul.recent-list {
                @for episode in ctx.feed.episodes.iter().take(ctx.layout.sidebar_count) {
                    @let is_current = current_slug == Some(episode.slug.as_str());
                    li class=[is_current.then_some("current")] {
                        a href=(ctx.episode_href(episode)) {
                            @if !episode.number.is_empty() {
                                span.recent-number { (episode.number) ". " }
                            }
                            (episode.title)
                        }
                    }
                }
            }
            a.sidebar-all href="/episodes.html" { "All episodes →" }
        }
    }
}

/// Season/episode/explicit badges plus date and duration
fn episode_meta(episode: &Episode) -> Markup {
    html! {
        div.episode-meta {
            @if !episode.number.is_empty() {
                span.badge {
                    @if episode.season != crate::episode::DEFAULT_SEASON {
                        "S" (episode.season) " · "
                    }
                    "Ep. " (episode.number)
                }
            }
            @if episode.explicit {
                span.badge.badge-explicit title="Explicit" { "E" }
            }
            @if let (Some(label), Some(date)) = (episode.display_date(), episode.published) {
                time datetime=(date.to_rfc3339()) { (label) }
            }
            @if !episode.duration.is_empty() {
                span.duration { (episode.duration) }
            }
        }
    }
}

/// Renders a summary card linking to the episode page
fn episode_card(ctx: &SiteContext, episode: &Episode) -> Markup {
    let summary = truncate(&episode.summary, ctx.layout.summary_length);
    html! {
        article.episode-card {
            a.episode-card-link href=(ctx.episode_href(episode)) {
                @if !episode.artwork.is_empty() {
                    img.episode-card-art src=(episode.artwork) alt="" loading="lazy";
                }
                h3.episode-card-title { (episode.title) }
            }
            (episode_meta(episode))
            p.episode-card-summary { (summary) }
        }
    }
}

fn audio_player(episode: &Episode) -> Markup {
    let episode_id = (!episode.audio_id.is_empty()).then_some(episode.audio_id.as_str());
    html! {
        @if !episode.audio_url.is_empty() {
            audio.player controls preload="none" data-episode-id=[episode_id] {
                source src=(episode.audio_url) type="audio/mpeg";
                a href=(episode.audio_url) { "Download the episode" }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the home page: latest episode as hero, then the recent grid
pub fn render_home(ctx: &SiteContext) -> Markup {
    let podcast = ctx.podcast();
    let episodes = &ctx.feed.episodes;
    let description = strip_markup(&podcast.description);

    // With a single episode the grid would be empty; show the hero's card.
    let recent: Vec<&Episode> = if episodes.len() > 1 {
        episodes.iter().skip(1).take(ctx.layout.recent_count).collect()
    } else {
        episodes.iter().collect()
    };

    let content = html! {
        (site_nav(ctx, Some(NavPage::Home)))
        main.home-page {
            section.intro {
                h1 { (podcast.title) }
                @if !description.is_empty() {
                    p.intro-description { (description) }
                }
            }
            @if let Some(latest) = episodes.first() {
                section.hero {
                    @if !latest.artwork.is_empty() {
                        img.hero-art src=(latest.artwork) alt=(latest.title);
                    }
                    div.hero-body {
                        p.hero-label { "Latest episode" }
                        h2 { a href=(ctx.episode_href(latest)) { (latest.title) } }
                        (episode_meta(latest))
                        p.hero-summary { (truncate(&latest.summary, ctx.layout.summary_length)) }
                        (audio_player(latest))
                    }
                }
                section.recent {
                    h2 { "Recent episodes" }
                    div.episode-grid {
                        @for episode in &recent {
                            (episode_card(ctx, episode))
                        }
                    }
                    a.button href="/episodes.html" { "View all episodes" }
                }
            } @else {
                p.empty-state { "No episodes yet." }
            }
        }
        (site_footer(ctx))
    };

    base_document(ctx, &podcast.title, &truncate(&podcast.description, 160), content)
}

/// Renders the searchable list of every episode
pub fn render_episode_list(ctx: &SiteContext) -> Markup {
    let content = html! {
        (site_nav(ctx, Some(NavPage::Episodes)))
        main.episodes-page {
            h1 { "All episodes" }
            div.search {
                label.visually-hidden for="episode-search" { "Search episodes" }
                input id="episode-search" type="search" placeholder="Search episodes…" autocomplete="off";
            }
            div.episode-grid id="episode-list" {
                @for episode in &ctx.feed.episodes {
                    (episode_card(ctx, episode))
                }
            }
            p.empty-state id="no-results" hidden { "No episodes match your search." }
        }
        (site_footer(ctx))
    };

    let description = format!("Every episode of {}", ctx.podcast().title);
    base_document(ctx, "Episodes", &description, content)
}

/// Renders the page of the episode at `index` in the sorted collection.
///
/// "Older" is the next index, "newer" the previous one; at either end of
/// the collection the link is rendered disabled. `None` when `index` is out
/// of range.
pub fn render_episode_page(ctx: &SiteContext, index: usize) -> Option<Markup> {
    let feed = ctx.feed;
    let episode = feed.episodes.get(index)?;
    let older = feed.previous(index);
    let newer = feed.next(index);
    let show_notes = remove_source_prefix(&episode.description);

    let nav_link = |target: Option<&Episode>, rel: &str, label: &str| {
        html! {
            @if let Some(target) = target {
                a.episode-nav-link href=(ctx.episode_href(target)) rel=(rel) {
                    span.episode-nav-label { (label) }
                    span.episode-nav-title { (target.title) }
                }
            } @else {
                span.episode-nav-link.disabled aria-disabled="true" {
                    span.episode-nav-label { (label) }
                }
            }
        }
    };

    let content = html! {
        (site_nav(ctx, None))
        div.episode-layout {
            main.episode-page {
                article {
                    header.episode-header {
                        @if !episode.artwork.is_empty() {
                            img.episode-art src=(episode.artwork) alt=(episode.title);
                        }
                        h1 { (episode.title) }
                        (episode_meta(episode))
                    }
                    (audio_player(episode))
                    div.show-notes {
                        (PreEscaped(show_notes))
                    }
                }
                nav.episode-nav aria-label="More episodes" {
                    (nav_link(older, "prev", "← Older"))
                    (nav_link(newer, "next", "Newer →"))
                }
            }
            (sidebar(ctx, Some(&episode.slug)))
        }
        (site_footer(ctx))
    };

    Some(base_document(
        ctx,
        &episode.title,
        &truncate(&episode.summary, 160),
        content,
    ))
}

/// Renders the about page from configured markdown, or the show description
pub fn render_about(ctx: &SiteContext) -> Markup {
    let podcast = ctx.podcast();
    let layout = ctx.layout;

    let body = if layout.about_markdown.trim().is_empty() {
        html! {
            p { (strip_markup(&podcast.description)) }
            @if !podcast.author.is_empty() {
                p.about-author { "Hosted by " (podcast.author) "." }
            }
        }
    } else {
        let parser = Parser::new(&layout.about_markdown);
        let mut body_html = String::new();
        md_html::push_html(&mut body_html, parser);
        html! { (PreEscaped(body_html)) }
    };

    let content = html! {
        (site_nav(ctx, Some(NavPage::About)))
        main.about-page {
            article.about-content {
                h1 { (layout.about_title) }
                @if let Some(artwork) = ctx.local_artwork {
                    img.about-art src=(artwork) alt=(podcast.title);
                }
                (body)
            }
        }
        (site_footer(ctx))
    };

    base_document(ctx, &layout.about_title, &truncate(&podcast.description, 160), content)
}

// ============================================================================
// Tests
// ============================================================================
