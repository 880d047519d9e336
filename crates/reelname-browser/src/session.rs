use crate::{CookieRecord, DriverService, Error, Result};
use async_trait::async_trait;
use fantoccini::cookies::Cookie;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use time::OffsetDateTime;

/// Desktop Chrome user agent sent by the headless session.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_BACKOFF: Duration = Duration::from_millis(500);

/// The operations extraction needs from a driven page.
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn goto(&self, url: &str) -> Result<()>;

    /// Requires the page to already be on the cookie's domain.
    async fn add_cookie(&self, cookie: &CookieRecord) -> Result<()>;

    /// Visible text of every element matching the CSS `selector`, in
    /// document order. An element that cannot be read (stale, detached)
    /// fails in its own slot without affecting the others.
    async fn texts(&self, selector: &str) -> Result<Vec<Result<String>>>;

    /// Raw HTML source of the current page.
    async fn source(&self) -> Result<String>;

    /// End the session and release the browser.
    async fn close(&self) -> Result<()>;
}

/// Chrome flags for a headless session that looks less like automation.
pub fn chrome_args(user_agent: &str) -> Vec<String> {
    vec![
        "--headless".to_string(),
        "--disable-blink-features=AutomationControlled".to_string(),
        "--disable-gpu".to_string(),
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        format!("--user-agent={}", user_agent),
    ]
}

fn capabilities(user_agent: &str) -> Map<String, Value> {
    let mut caps = Map::new();
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({
            "args": chrome_args(user_agent),
            "excludeSwitches": ["enable-automation"],
            "useAutomationExtension": false,
        }),
    );
    caps
}

/// Headless Chrome driven through a private chromedriver process.
pub struct BrowserSession {
    client: Client,
    /// Taken on close; dropping it stops chromedriver.
    service: Mutex<Option<DriverService>>,
}

impl BrowserSession {
    /// Start chromedriver from `driver_path` and open a headless session on it.
    pub async fn launch(driver_path: PathBuf, user_agent: &str) -> Result<Self> {
        let mut service = DriverService::spawn(driver_path)?;
        let url = service.url();
        let caps = capabilities(user_agent);

        // chromedriver may not be listening yet.
        let mut attempts = 0;
        let client = loop {
            attempts += 1;
            tracing::debug!("Connecting to chromedriver at {} (attempt {})", url, attempts);
            match ClientBuilder::native()
                .capabilities(caps.clone())
                .connect(&url)
                .await
            {
                Ok(client) => break client,
                Err(e) => {
                    if attempts >= CONNECT_ATTEMPTS || service.has_exited() {
                        return Err(Error::Launch(format!(
                            "could not open a session after {} attempts: {}",
                            attempts, e
                        )));
                    }
                    tokio::time::sleep(CONNECT_BACKOFF).await;
                }
            }
        };

        tracing::info!("Headless Chrome session established");
        Ok(Self {
            client,
            service: Mutex::new(Some(service)),
        })
    }
}

#[async_trait]
impl PageDriver for BrowserSession {
    async fn goto(&self, url: &str) -> Result<()> {
        tracing::debug!("Navigating to {}", url);
        self.client.goto(url).await?;
        Ok(())
    }

    async fn add_cookie(&self, cookie: &CookieRecord) -> Result<()> {
        self.client.add_cookie(to_webdriver_cookie(cookie)).await?;
        Ok(())
    }

    async fn texts(&self, selector: &str) -> Result<Vec<Result<String>>> {
        let elements = self.client.find_all(Locator::Css(selector)).await?;
        let mut texts = Vec::with_capacity(elements.len());
        for element in elements {
            texts.push(element.text().await.map_err(Error::from));
        }
        Ok(texts)
    }

    async fn source(&self) -> Result<String> {
        Ok(self.client.source().await?)
    }

    /// End the WebDriver session and stop chromedriver. Later calls only
    /// report the already-closed session.
    async fn close(&self) -> Result<()> {
        let result = self.client.clone().close().await;
        let service = self.service.lock().ok().and_then(|mut guard| guard.take());
        drop(service);
        result.map_err(Error::from)
    }
}

fn to_webdriver_cookie(record: &CookieRecord) -> Cookie<'static> {
    let mut cookie = Cookie::new(record.name.clone(), record.value.clone());
    cookie.set_domain(record.domain.clone());
    cookie.set_path(if record.path.is_empty() {
        "/".to_string()
    } else {
        record.path.clone()
    });
    cookie.set_secure(record.secure);
    cookie.set_http_only(record.http_only);
    if let Some(expires) = record
        .expiry
        .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
    {
        cookie.set_expires(expires);
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrome_args_include_stability_flags() {
        let args = chrome_args("TestAgent/1.0");

        assert!(args.contains(&"--headless".to_string()));
        assert!(args.contains(&"--disable-gpu".to_string()));
        assert!(args.contains(&"--no-sandbox".to_string()));
        assert!(args.contains(&"--disable-blink-features=AutomationControlled".to_string()));
        assert!(args.contains(&"--user-agent=TestAgent/1.0".to_string()));
    }

    #[test]
    fn test_capabilities_hide_automation_switch() {
        let caps = capabilities(DEFAULT_USER_AGENT);
        let options = &caps["goog:chromeOptions"];

        assert_eq!(options["excludeSwitches"][0], "enable-automation");
        assert_eq!(options["args"][0], "--headless");
    }

    #[test]
    fn test_cookie_conversion() {
        let record = CookieRecord {
            domain: ".tiktok.com".to_string(),
            path: String::new(),
            secure: true,
            http_only: true,
            expiry: Some(1767225600),
            name: "sessionid".to_string(),
            value: "abc".to_string(),
        };

        let cookie = to_webdriver_cookie(&record);

        assert_eq!(cookie.name(), "sessionid");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(
            cookie.expires_datetime().map(|t| t.unix_timestamp()),
            Some(1767225600)
        );
    }
}
