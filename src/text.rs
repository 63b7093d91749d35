//! Plain-text cleanup for feed content.
//!
//! Feed titles and descriptions arrive as anything from plain text to full
//! HTML wrapped in CDATA. These helpers reduce them to what the templates
//! need:
//!
//! - [`unwrap_cdata`]: take the body of a CDATA section, or strip markup
//! - [`html_fragment`]: a rich-text field as HTML that is safe to emit as-is
//! - [`strip_markup`]: drop tags and decode the handful of entities feeds use
//! - [`remove_source_prefix`]: drop the hosting platform's boilerplate lead-in
//! - [`truncate`]: word-boundary summary for episode cards
//! - [`slugify`]: filename-safe identifier for episodes without a number

use regex::Regex;
use std::sync::LazyLock;

/// Boilerplate the hosting platform prepends to every episode description.
pub const SOURCE_PREFIX: &str = "Send us a text";

/// Default length for card summaries.
pub const DEFAULT_SUMMARY_LENGTH: usize = 200;

/// Appended to truncated text.
pub const ELLIPSIS: &str = "...";

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

static CDATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").unwrap());

static SOURCE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^\s*{}\s*", regex::escape(SOURCE_PREFIX))).unwrap()
});

static NON_ALNUM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Return the inner content of a CDATA section when present, otherwise the
/// input with all markup tags removed. Either way the result is trimmed.
pub fn unwrap_cdata(text: &str) -> String {
    match CDATA_RE.captures(text) {
        Some(caps) => caps[1].trim().to_string(),
        None => TAG_RE.replace_all(text, "").trim().to_string(),
    }
}

/// Whether `text` carries a CDATA section, i.e. markup shipped verbatim.
pub fn is_cdata(text: &str) -> bool {
    CDATA_RE.is_match(text)
}

/// Normalize a rich-text feed field to an HTML fragment.
///
/// CDATA content is the publisher's own markup and passes through. Anything
/// else was entity-escaped in the feed and has already been decoded by the
/// XML reader, so after stripping complete tags it is escaped again: an
/// unclosed `<img` or a decoded `&lt;` stays text. The result decodes exactly
/// once through [`strip_markup`].
pub fn html_fragment(text: &str) -> String {
    let unwrapped = unwrap_cdata(text);
    if is_cdata(text) {
        unwrapped
    } else {
        maud::html! { (unwrapped) }.into_string()
    }
}

/// Remove all `<...>` tags and decode `&nbsp; &amp; &lt; &gt; &#39; &quot;`.
///
/// Deliberately not a general entity decoder. `&amp;` is decoded last so
/// `&amp;lt;` comes out as the literal text `&lt;`.
pub fn strip_markup(text: &str) -> String {
    TAG_RE
        .replace_all(text, "")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// Remove [`SOURCE_PREFIX`] (any case) from the very start of `text`.
///
/// Only a leading occurrence is removed, and only once.
pub fn remove_source_prefix(text: &str) -> String {
    SOURCE_PREFIX_RE.replace(text, "").to_string()
}

/// Summarize `text` to at most `max_length` characters plus [`ELLIPSIS`].
///
/// Markup and the source prefix are removed first. Text that already fits is
/// returned as-is; longer text is cut back to the last whitespace so no word
/// is split.
pub fn truncate(text: &str, max_length: usize) -> String {
    let clean = remove_source_prefix(&strip_markup(text));
    if clean.chars().count() <= max_length {
        return clean;
    }

    let cut_end = clean
        .char_indices()
        .nth(max_length)
        .map(|(idx, _)| idx)
        .unwrap_or(clean.len());
    let (head, rest) = clean.split_at(cut_end);

    // A cut that lands right before whitespace already ends on a word.
    let kept = if rest.starts_with(char::is_whitespace) {
        head
    } else {
        match head.rfind(char::is_whitespace) {
            Some(idx) => &head[..idx],
            None => "",
        }
    };

    format!("{}{}", kept.trim_end(), ELLIPSIS)
}

/// Lowercase, collapse every run of non-alphanumerics to `-`, trim edge dashes.
///
/// ```
/// use podcast_site::text::slugify;
/// assert_eq!(slugify("Recovery Talk: Part 2!"), "recovery-talk-part-2");
/// ```
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    NON_ALNUM_RE
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}
