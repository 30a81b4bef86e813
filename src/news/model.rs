use feed_rs::model::Entry;

/// One syndication entry, as much of it as the skill ever reads.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub title: String,
    /// Raw HTML, converted to speech text later.
    pub description: String,
}

impl From<Entry> for FeedItem {
    fn from(entry: Entry) -> Self {
        let title = entry
            .title
            .map(|t| t.content)
            .unwrap_or_else(|| "(untitled)".into());
        // RSS <description> lands in summary; Atom-only feeds may carry just content
        let description = entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body))
            .unwrap_or_default();
        FeedItem { title, description }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status code: {0}")]
    HttpStatus(u16),
    #[error("feed too large (>{0} bytes)")]
    TooLarge(usize),
    #[error("feed parse error: {0}")]
    Parse(#[from] feed_rs::parser::ParseFeedError),
    #[error("feed has no items")]
    Empty,
}

impl FeedError {
    /// Short diagnostic label; never shown to the user.
    pub fn cause(&self) -> &'static str {
        match self {
            FeedError::Request(_) | FeedError::HttpStatus(_) | FeedError::TooLarge(_) => {
                "network error"
            }
            FeedError::Parse(_) => "parse error",
            FeedError::Empty => "no content",
        }
    }
}

/// Result of one fetch: exactly one of these per call.
#[derive(Debug)]
pub enum FetchOutcome {
    Success(String),
    Failure(FeedError),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    /// Collapse to what gets spoken; every failure reads the same.
    pub fn into_utterance(self, apology: &str) -> String {
        match self {
            FetchOutcome::Success(text) => text,
            FetchOutcome::Failure(_) => apology.to_string(),
        }
    }
}

/// Parses a feed body into a lazy sequence of items.
///
/// A document that fails to parse yields a single terminal `Err`; entries are
/// converted only as the sequence is pulled.
pub fn parse_items(body: &[u8]) -> impl Iterator<Item = Result<FeedItem, FeedError>> {
    let (entries, terminal) = match feed_rs::parser::parse(body) {
        Ok(feed) => (feed.entries, None),
        Err(err) => (Vec::new(), Some(FeedError::Parse(err))),
    };
    entries
        .into_iter()
        .map(|entry| Ok(FeedItem::from(entry)))
        .chain(terminal.map(Err))
}

/// Takes the first successful item and stops pulling; otherwise returns the
/// terminal error, or `FeedError::Empty` when the sequence simply ends.
pub fn first_item<I>(items: I) -> Result<FeedItem, FeedError>
where
    I: IntoIterator<Item = Result<FeedItem, FeedError>>,
{
    let mut last_err = None;
    for item in items {
        match item {
            Ok(it) => return Ok(it),
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or(FeedError::Empty))
}
