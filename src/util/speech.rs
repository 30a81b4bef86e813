use crate::news::FeedItem;
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

const WRAP_WIDTH: usize = 80;

static TAG: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"<[^>]*>").ok());
// Anchors are unwrapped before rendering so link text reads as ordinary text
static ANCHOR: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?i)</?a(\s[^>]*)?>").ok());
// Heading and quote markers the renderer puts at the start of a line
static LINE_MARKER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?m)^(?:(?:#+|>) ?)+").ok());
// Greedy: first `[` to last `]` on a line.
static BRACKETED: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\[.*\]").ok());

fn replace(re: &LazyLock<Option<Regex>>, s: &str, with: &str) -> String {
    match LazyLock::force(re) {
        Some(r) => r.replace_all(s, with).into_owned(),
        None => s.to_string(),
    }
}

/// Drop every tag and keep the text between them.
pub fn strip_tags(html: &str) -> String {
    replace(&TAG, html, "")
}

/// Convert an HTML fragment to plain text suitable for speech.
pub fn html_to_plain(html: &str) -> String {
    let unlinked = replace(&ANCHOR, html, "");
    let rendered = match html2text::config::plain_no_decorate()
        .string_from_read(unlinked.as_bytes(), WRAP_WIDTH)
    {
        Ok(text) => replace(&LINE_MARKER, &text, ""),
        Err(err) => {
            warn!("html2text failed ({}), falling back to tag stripping", err);
            strip_tags(&unlinked)
        }
    };
    rendered.trim_end().to_string()
}

/// Remove bracketed spans. Over-deletes across multiple spans on the same
/// line: `"a [x] b [y]"` becomes `"a "`.
pub fn strip_bracketed(text: &str) -> String {
    replace(&BRACKETED, text, "")
}

pub fn compose_utterance(item: &FeedItem) -> String {
    format!(
        "New article: {}. {}\n",
        item.title,
        strip_bracketed(&html_to_plain(&item.description))
    )
}
