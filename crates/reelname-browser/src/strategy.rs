use crate::{PageDriver, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

/// Selector matches must be longer than this many characters once trimmed.
pub const MIN_TEXT_CHARS: usize = 5;

/// Rendered description element, most specific first.
const DEFAULT_SELECTORS: &[&str] = &[
    "h1[data-e2e='browse-video-desc']",
    "div[data-e2e='browse-video-desc']",
    "[data-e2e='video-desc']",
    "span[data-e2e='new-desc-span']",
];

/// Description fields embedded in the page's hydration JSON and meta tags.
const DEFAULT_PATTERNS: &[(&str, Unescape)] = &[
    (r#""desc"\s*:\s*"((?:[^"\\]|\\.)*)""#, Unescape::Json),
    (r#""description"\s*:\s*"((?:[^"\\]|\\.)*)""#, Unescape::Json),
    (
        r#"<meta\s+(?:property|name)="og:description"\s+content="([^"]*)""#,
        Unescape::Html,
    ),
];

lazy_static! {
    static ref DEFAULT_PATTERN_REGEXES: Vec<(Regex, Unescape)> = DEFAULT_PATTERNS
        .iter()
        .map(|(p, unescape)| (Regex::new(p).unwrap(), *unescape))
        .collect();
}

/// How a captured group is turned back into plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unescape {
    /// Capture sits inside a JSON string literal.
    Json,
    /// Capture is an HTML attribute value.
    Html,
}

impl Unescape {
    fn apply(self, raw: &str) -> String {
        match self {
            Unescape::Json => decode_json_string(raw),
            Unescape::Html => html_escape::decode_html_entities(raw).into_owned(),
        }
    }
}

/// One way of locating the description on a page.
#[derive(Clone)]
pub enum Strategy {
    /// CSS selector evaluated against the rendered DOM.
    Selector(String),
    /// Pattern over the raw page source; capture group 1 is the result.
    SourcePattern { regex: Regex, unescape: Unescape },
}

impl Strategy {
    pub fn selector(css: impl Into<String>) -> Self {
        Strategy::Selector(css.into())
    }

    /// Pattern whose capture is a JSON string body.
    pub fn pattern(pattern: &str) -> std::result::Result<Self, regex::Error> {
        Self::pattern_with(pattern, Unescape::Json)
    }

    pub fn pattern_with(
        pattern: &str,
        unescape: Unescape,
    ) -> std::result::Result<Self, regex::Error> {
        Ok(Strategy::SourcePattern {
            regex: Regex::new(pattern)?,
            unescape,
        })
    }

    /// Selectors first, then source patterns.
    pub fn defaults() -> Vec<Strategy> {
        DEFAULT_SELECTORS
            .iter()
            .map(|css| Strategy::selector(*css))
            .chain(
                DEFAULT_PATTERN_REGEXES
                    .iter()
                    .map(|(regex, unescape)| Strategy::SourcePattern {
                        regex: regex.clone(),
                        unescape: *unescape,
                    }),
            )
            .collect()
    }

    /// Try this strategy against `page`. `Ok(None)` means no match.
    pub async fn attempt(&self, page: &mut PageView<'_>) -> Result<Option<String>> {
        match self {
            Strategy::Selector(css) => {
                let texts = match page.driver.texts(css).await {
                    Ok(texts) => texts,
                    Err(e) => {
                        tracing::debug!("Selector {} failed: {}", css, e);
                        return Ok(None);
                    }
                };
                Ok(first_plausible(css, texts))
            }
            Strategy::SourcePattern { regex, unescape } => {
                let source = page.source().await?;
                Ok(regex
                    .captures(source)
                    .and_then(|c| c.get(1))
                    .map(|m| unescape.apply(m.as_str()))
                    .map(|text| text.trim().to_string())
                    .filter(|text| !text.is_empty()))
            }
        }
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Selector(css) => write!(f, "Selector({})", css),
            Strategy::SourcePattern { regex, .. } => {
                write!(f, "SourcePattern({})", regex.as_str())
            }
        }
    }
}

/// A page plus its source, fetched at most once and only when a pattern needs it.
pub struct PageView<'a> {
    driver: &'a dyn PageDriver,
    source: Option<String>,
}

impl<'a> PageView<'a> {
    pub fn new(driver: &'a dyn PageDriver) -> Self {
        Self {
            driver,
            source: None,
        }
    }

    async fn source(&mut self) -> Result<&str> {
        if self.source.is_none() {
            self.source = Some(self.driver.source().await?);
        }
        Ok(self.source.as_deref().unwrap_or_default())
    }
}

/// Run `strategies` in order and stop at the first match.
pub async fn run_strategies(
    strategies: &[Strategy],
    driver: &dyn PageDriver,
) -> Result<Option<String>> {
    let mut page = PageView::new(driver);

    for (index, strategy) in strategies.iter().enumerate() {
        if let Some(text) = strategy.attempt(&mut page).await? {
            tracing::info!("Description found by strategy {} ({:?})", index, strategy);
            return Ok(Some(text));
        }
        tracing::debug!("No match for {:?}", strategy);
    }

    Ok(None)
}

/// First element text long enough to be a description. Unreadable elements
/// are skipped.
fn first_plausible(css: &str, texts: Vec<Result<String>>) -> Option<String> {
    for (index, text) in texts.into_iter().enumerate() {
        match text {
            Ok(text) => {
                let trimmed = text.trim();
                if trimmed.chars().count() > MIN_TEXT_CHARS {
                    return Some(trimmed.to_string());
                }
            }
            Err(e) => tracing::debug!("Skipping element {} of {}: {}", index, css, e),
        }
    }
    None
}

/// Undo JSON string escaping; text that is not valid JSON is returned as-is.
fn decode_json_string(raw: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{}\"", raw)).unwrap_or_else(|_| raw.to_string())
}
