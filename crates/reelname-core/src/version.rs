use lazy_static::lazy_static;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;

lazy_static! {
    static ref CHROME_VERSION: Regex =
        Regex::new(r"(?:Chrome|Chromium)(?: for Testing)?\s+(\d+(?:\.\d+){1,3})").unwrap();
    static ref DRIVER_VERSION: Regex =
        Regex::new(r"ChromeDriver\s+(\d+\.\d+\.\d+(?:\.\d+)?)").unwrap();
    static ref BARE_VERSION: Regex = Regex::new(r"\b(\d+\.\d+\.\d+(?:\.\d+)?)\b").unwrap();
}

/// Dotted version string such as `120.0.6099.109`.
///
/// Ordering compares numeric segments, so `9.0.0 < 10.0.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BrowserVersion {
    raw: String,
    segments: Vec<u64>,
}

impl BrowserVersion {
    /// Parse a dotted version. Every segment must be numeric.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let segments = raw
            .split('.')
            .map(|s| s.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;

        Some(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Extract a browser version from `chrome --version` style output.
    pub fn from_browser_output(output: &str) -> Option<Self> {
        CHROME_VERSION
            .captures(output)
            .and_then(|c| c.get(1))
            .and_then(|m| Self::parse(m.as_str()))
    }

    /// Extract a driver version from `chromedriver --version` output.
    pub fn from_driver_output(output: &str) -> Option<Self> {
        DRIVER_VERSION
            .captures(output)
            .and_then(|c| c.get(1))
            .and_then(|m| Self::parse(m.as_str()))
    }

    /// First dotted version found anywhere in `text`.
    pub fn find_in(text: &str) -> Option<Self> {
        BARE_VERSION
            .captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| Self::parse(m.as_str()))
    }

    /// Leading segment, the compatibility unit between browser and driver.
    pub fn major(&self) -> &str {
        self.raw.split('.').next().unwrap_or(&self.raw)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Ord for BrowserVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.segments
            .cmp(&other.segments)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for BrowserVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BrowserVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
