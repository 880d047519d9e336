//! Netscape `cookies.txt` parsing.
//!
//! Each cookie is one line of seven tab-separated fields:
//! `domain  include_subdomains  path  secure  expiry  name  value`.
//! Lines starting with `#` are comments, except the curl convention
//! `#HttpOnly_<domain>` which marks an HTTP-only cookie.

use crate::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieRecord {
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    /// Epoch seconds. `None` for session cookies.
    pub expiry: Option<i64>,
    pub name: String,
    pub value: String,
}

impl CookieRecord {
    /// Parse one line. Returns `None` for anything that is not a cookie.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return None;
        }

        let (line, http_only) = match line.strip_prefix(HTTP_ONLY_PREFIX) {
            Some(rest) => (rest, true),
            None if line.starts_with('#') => return None,
            None => (line, false),
        };

        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 7 {
            return None;
        }

        let domain = parts[0].trim();
        let name = parts[5].trim();
        if domain.is_empty() || name.is_empty() {
            return None;
        }

        let expiry = parts[4]
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|&secs| secs > 0);

        Some(Self {
            domain: domain.to_string(),
            path: parts[2].trim().to_string(),
            secure: parts[3].trim().eq_ignore_ascii_case("TRUE"),
            http_only,
            expiry,
            name: name.to_string(),
            value: parts[6].to_string(),
        })
    }

    /// Whether this cookie would be sent to `host`.
    pub fn matches_host(&self, host: &str) -> bool {
        let domain = self.domain.trim_start_matches('.').to_lowercase();
        let host = host.to_lowercase();
        host == domain || host.ends_with(&format!(".{}", domain))
    }
}

fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || (trimmed.starts_with('#') && !trimmed.starts_with(HTTP_ONLY_PREFIX))
}

/// Lazy, single-pass sequence of the cookies in a file that apply to one host.
///
/// Malformed lines and cookies for other hosts are dropped and counted.
pub struct CookieRecords<R> {
    lines: std::io::Split<R>,
    target_host: String,
    malformed: usize,
    out_of_scope: usize,
}

impl<R: BufRead> CookieRecords<R> {
    pub fn from_reader(reader: R, target_host: &str) -> Self {
        Self {
            lines: reader.split(b'\n'),
            target_host: target_host.to_string(),
            malformed: 0,
            out_of_scope: 0,
        }
    }

    /// Non-comment lines that could not be parsed so far.
    pub fn malformed(&self) -> usize {
        self.malformed
    }

    /// Well-formed cookies skipped because they belong to another domain.
    pub fn out_of_scope(&self) -> usize {
        self.out_of_scope
    }
}

impl<R: BufRead> Iterator for CookieRecords<R> {
    type Item = CookieRecord;

    fn next(&mut self) -> Option<CookieRecord> {
        loop {
            let bytes = match self.lines.next()? {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!("Stopped reading cookie file: {}", e);
                    return None;
                }
            };
            let line = String::from_utf8_lossy(&bytes);

            if is_skippable(&line) {
                continue;
            }

            match CookieRecord::parse_line(&line) {
                Some(record) if record.matches_host(&self.target_host) => return Some(record),
                Some(record) => {
                    tracing::debug!(
                        "Skipping cookie {} for {} (target {})",
                        record.name,
                        record.domain,
                        self.target_host
                    );
                    self.out_of_scope += 1;
                }
                None => self.malformed += 1,
            }
        }
    }
}

pub struct CookieLoader;

impl CookieLoader {
    /// Open `path` and stream the cookies that apply to `target_host`.
    ///
    /// Only an unreadable file is an error; bad content is skipped.
    pub fn load(path: &Path, target_host: &str) -> Result<CookieRecords<BufReader<File>>> {
        tracing::debug!("Reading cookies from: {}", path.display());

        let file = File::open(path).map_err(|source| Error::FileUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(CookieRecords::from_reader(BufReader::new(file), target_host))
    }
}
