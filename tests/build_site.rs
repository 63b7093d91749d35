//! End-to-end builds against the fixture feed, over an in-memory transport.

use podcast_site::config::{BuildConfig, SiteConfig};
use podcast_site::fetch::{FetchError, Fetcher, RawResponse, Transport};
use podcast_site::generate::{self, ArtworkStatus, GenerateError};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FEED_URL: &str = "https://feeds.example.com/openmic.rss";
const ARTWORK_URL: &str = "https://cdn.example.com/shows/openmic/artwork.jpg";
const ARTWORK_BYTES: &[u8] = b"\xff\xd8\xff\xe0fake-jpeg";

fn fixture_feed() -> String {
    fs::read_to_string(fixture_path()).unwrap()
}

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/feed.xml")
}

/// Canned responses keyed by URL; every request is recorded.
#[derive(Default)]
struct FakeHttp {
    responses: HashMap<String, RawResponse>,
    requests: RefCell<Vec<String>>,
}

impl FakeHttp {
    fn serving_fixture() -> Self {
        Self::default()
            .with(FEED_URL, RawResponse::ok(fixture_feed()))
            .with(ARTWORK_URL, RawResponse::ok(ARTWORK_BYTES))
    }

    fn with(mut self, url: &str, response: RawResponse) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    fn count(&self, url: &str) -> usize {
        self.requests.borrow().iter().filter(|r| *r == url).count()
    }
}

impl Transport for FakeHttp {
    fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
        self.requests.borrow_mut().push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Network {
                url: url.to_string(),
                message: "no route to host".to_string(),
            })
    }
}

fn url_config(output: &Path) -> BuildConfig {
    let site = SiteConfig {
        feed_url: FEED_URL.to_string(),
        ..SiteConfig::default()
    };
    BuildConfig::resolve(site, None, Some(output.to_path_buf()))
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative))
        .unwrap_or_else(|e| panic!("reading {relative}: {e}"))
}

fn snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut files = Vec::new();
    let mut dirs = vec![root.to_path_buf()];
    while let Some(dir) = dirs.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                dirs.push(path);
            } else {
                let bytes = fs::read(&path).unwrap();
                files.push((path.strip_prefix(root).unwrap().to_path_buf(), bytes));
            }
        }
    }
    files.sort();
    files
}

#[test]
fn builds_full_site_from_fetched_feed() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let fetcher = Fetcher::new(FakeHttp::serving_fixture(), 10);

    let report = generate::build_site(&url_config(root), &fetcher).unwrap();

    assert_eq!(report.podcast_title, "Open Mic Recovery");
    assert_eq!(report.episode_count, 4);
    assert_eq!(
        report.artwork,
        ArtworkStatus::Downloaded {
            bytes: ARTWORK_BYTES.len()
        }
    );
    assert_eq!(fs::read(root.join("artwork.jpg")).unwrap(), ARTWORK_BYTES);

    for page in [
        "index.html",
        "episodes.html",
        "about.html",
        "episodes/12.html",
        "episodes/11.html",
        "episodes/10.html",
        "episodes/bonus-behind-the-scenes.html",
    ] {
        assert!(root.join(page).is_file(), "missing {page}");
    }
}

#[test]
fn episodes_are_ordered_newest_number_first() {
    let tmp = TempDir::new().unwrap();
    let fetcher = Fetcher::new(FakeHttp::serving_fixture(), 10);
    let report = generate::build_site(&url_config(tmp.path()), &fetcher).unwrap();

    let titles: Vec<&str> = report.episode_pages().map(|p| p.title.as_str()).collect();
    assert_eq!(
        titles,
        [
            "Season Finale",
            "Finding Your Voice",
            "First Steps",
            "Bonus: Behind the Scenes"
        ]
    );
}

#[test]
fn episode_page_content() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let fetcher = Fetcher::new(FakeHttp::serving_fixture(), 10);
    generate::build_site(&url_config(root), &fetcher).unwrap();

    let html = read(root, "episodes/11.html");
    assert!(html.contains("<h1>Finding Your Voice</h1>"));
    assert!(html.contains(r#"data-episode-id="9011""#));
    assert!(html.contains("March 5, 2024"));
    assert!(html.contains("1h 2m"));
    assert!(html.contains(r#"title="Explicit""#));
    // Show notes keep their markup, minus the call-to-action prefix.
    assert!(html.contains(r#"<p>We talk with <a href="https://example.com">Jo</a>"#));
    assert!(!html.contains("Send us a text"));
    // No artwork of its own: the show artwork is used.
    assert!(html.contains(&format!(r#"class="episode-art" src="{ARTWORK_URL}""#)));
    // Neighbors: 10 is older, 12 is newer.
    assert!(html.contains(r#"href="/episodes/10.html" rel="prev""#));
    assert!(html.contains(r#"href="/episodes/12.html" rel="next""#));

    let finale = read(root, "episodes/12.html");
    assert!(finale.contains("S2 · Ep. 12"));
    assert!(finale.contains("https://cdn.example.com/episodes/9012/cover.jpg"));
    assert!(!finale.contains(r#"rel="next""#));
}

#[test]
fn bonus_episode_without_number_or_valid_date() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let fetcher = Fetcher::new(FakeHttp::serving_fixture(), 10);
    generate::build_site(&url_config(root), &fetcher).unwrap();

    let html = read(root, "episodes/bonus-behind-the-scenes.html");
    assert!(html.contains("Bonus: Behind the Scenes"));
    assert!(html.contains("12:34"));
    assert!(!html.contains("<time"));
    // Not from /episodes/<id>/, so no episode id on the player.
    assert!(!html.contains("data-episode-id"));
    assert!(!html.contains(r#"rel="prev""#));
}

#[test]
fn home_and_list_pages() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let fetcher = Fetcher::new(FakeHttp::serving_fixture(), 10);
    generate::build_site(&url_config(root), &fetcher).unwrap();

    let home = read(root, "index.html");
    assert!(home.contains("Latest episode"));
    assert!(home.contains("Conversations about recovery, music &amp; community."));
    assert_eq!(home.matches(r#"class="episode-card""#).count(), 3);

    let list = read(root, "episodes.html");
    assert!(list.contains(r#"id="episode-search""#));
    assert_eq!(list.matches(r#"class="episode-card""#).count(), 4);
    assert!(list.contains("Wrapping up the season with listener stories."));

    let about = read(root, "about.html");
    assert!(about.contains("Hosted by Sam Rivera."));
    assert!(about.contains(r#"src="/artwork.jpg""#));
}

#[test]
fn rebuild_is_byte_identical_and_fetches_artwork_once() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let config = url_config(root);
    let fetcher = Fetcher::new(FakeHttp::serving_fixture(), 10);

    generate::build_site(&config, &fetcher).unwrap();
    let first = snapshot(root);
    let report = generate::build_site(&config, &fetcher).unwrap();
    let second = snapshot(root);

    assert_eq!(first, second);
    assert_eq!(report.artwork, ArtworkStatus::Existing);
    assert_eq!(fetcher.transport().count(ARTWORK_URL), 1);
    assert_eq!(fetcher.transport().count(FEED_URL), 2);
}

#[test]
fn local_feed_is_read_instead_of_fetched() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("out");
    let config = BuildConfig::resolve(
        SiteConfig::default(),
        Some(fixture_path()),
        Some(root.clone()),
    );
    let fetcher = Fetcher::new(
        FakeHttp::default().with(ARTWORK_URL, RawResponse::ok(ARTWORK_BYTES)),
        10,
    );

    let report = generate::build_site(&config, &fetcher).unwrap();
    assert_eq!(report.episode_count, 4);
    assert_eq!(*fetcher.transport().requests.borrow(), [ARTWORK_URL]);
    assert!(root.join("episodes/12.html").is_file());
}

#[test]
fn feed_behind_redirects() {
    let tmp = TempDir::new().unwrap();
    let http = FakeHttp::serving_fixture()
        .with(
            "http://old.example.com/feed",
            RawResponse::redirect(301, "https://feeds.example.com/moved"),
        )
        .with(
            "https://feeds.example.com/moved",
            RawResponse::redirect(302, "/openmic.rss"),
        );
    let site = SiteConfig {
        feed_url: "http://old.example.com/feed".to_string(),
        ..SiteConfig::default()
    };
    let config = BuildConfig::resolve(site, None, Some(tmp.path().to_path_buf()));

    let report = generate::build_site(&config, &Fetcher::new(http, 10)).unwrap();
    assert_eq!(report.episode_count, 4);
}

#[test]
fn http_error_aborts_build() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("site");
    let fetcher = Fetcher::new(
        FakeHttp::default().with(FEED_URL, RawResponse::status(503)),
        10,
    );

    let err = generate::build_site(&url_config(&root), &fetcher).unwrap_err();
    match err {
        GenerateError::Fetch(FetchError::Status { status, url }) => {
            assert_eq!(status, 503);
            assert_eq!(url, FEED_URL);
        }
        other => panic!("expected HTTP status error, got {other:?}"),
    }
    assert!(!root.exists());
}

#[test]
fn network_failure_aborts_build() {
    let tmp = TempDir::new().unwrap();
    let fetcher = Fetcher::new(FakeHttp::default(), 10);
    let err = generate::build_site(&url_config(tmp.path()), &fetcher).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Fetch(FetchError::Network { .. })
    ));
    assert!(err.to_string().contains(FEED_URL));
}

#[test]
fn single_episode_feed() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let feed = r#"<rss><channel><title>Solo</title>
        <item><title>1. Only One</title><description>Just this.</description></item>
        </channel></rss>"#;
    let fetcher = Fetcher::new(FakeHttp::default().with(FEED_URL, RawResponse::ok(feed)), 10);

    let report = generate::build_site(&url_config(root), &fetcher).unwrap();
    assert_eq!(report.episode_count, 1);
    assert_eq!(report.artwork, ArtworkStatus::Unavailable);

    let home = read(root, "index.html");
    assert_eq!(home.matches(r#"class="episode-card""#).count(), 1);

    let page = read(root, "episodes/1.html");
    assert!(!page.contains(r#"rel="prev""#));
    assert!(!page.contains(r#"rel="next""#));
}

#[test]
fn malformed_feed_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let fetcher = Fetcher::new(
        FakeHttp::default().with(FEED_URL, RawResponse::ok("<rss><channel></item></rss>")),
        10,
    );
    let err = generate::build_site(&url_config(tmp.path()), &fetcher).unwrap_err();
    assert!(matches!(err, GenerateError::Xml(_)));
}
