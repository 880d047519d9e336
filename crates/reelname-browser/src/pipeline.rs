//! Description extraction from a rendered video page.
//!
//! [`ExtractionPipeline::extract_description`] makes sure a compatible
//! chromedriver exists, opens a headless session, authenticates it with the
//! user's cookies, loads the page, waits for it to settle and then walks the
//! configured [`Strategy`] list until one produces text.

use crate::cookies::CookieRecords;
use crate::{
    BrowserSession, CookieLoader, DEFAULT_USER_AGENT, Error, PageDriver, Result, Strategy,
    run_strategies,
};
use reelname_core::{CompatibilityChecker, InstallConfig};
use std::io::BufRead;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Time given to client-side rendering before extraction starts.
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub settle: Duration,
    /// Tried in order; earlier entries win.
    pub strategies: Vec<Strategy>,
    pub user_agent: String,
    /// Page visited before cookies are injected. Defaults to the target's origin.
    pub cookie_origin: Option<Url>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            settle: DEFAULT_SETTLE,
            strategies: Strategy::defaults(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cookie_origin: None,
        }
    }
}

/// Counts from one cookie injection pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InjectionReport {
    pub injected: usize,
    pub rejected: usize,
    pub malformed: usize,
    pub out_of_scope: usize,
}

pub struct ExtractionPipeline {
    install: InstallConfig,
    config: ExtractionConfig,
}

impl ExtractionPipeline {
    pub fn new(install: InstallConfig, config: ExtractionConfig) -> Self {
        Self { install, config }
    }

    /// Extract the description of the video at `url`.
    ///
    /// `Ok(None)` when the page loaded but no strategy matched. Driver
    /// installation and session failures are errors. The browser is shut
    /// down on every path once it has been launched.
    pub async fn extract_description(
        &self,
        url: &str,
        cookie_file: Option<&Path>,
    ) -> Result<Option<String>> {
        let target = parse_target(url)?;

        let checker = CompatibilityChecker::new(self.install.clone())?;
        let outcome = checker.ensure().await?;
        tracing::debug!(
            "Using chromedriver at {} ({:?})",
            outcome.driver.path.display(),
            outcome.action
        );

        let session = BrowserSession::launch(outcome.driver.path, &self.config.user_agent).await?;
        self.extract_and_close(&session, &target, cookie_file).await
    }

    /// Run [`Self::extract_from`] on `page` and close it afterwards, whether
    /// extraction succeeded, found nothing or failed.
    pub async fn extract_and_close(
        &self,
        page: &dyn PageDriver,
        target: &Url,
        cookie_file: Option<&Path>,
    ) -> Result<Option<String>> {
        let result = self.extract_from(page, target, cookie_file).await;

        if let Err(e) = page.close().await {
            tracing::warn!("Failed to close browser session: {}", e);
        }

        result
    }

    /// Run the extraction steps on an already-open page.
    pub async fn extract_from(
        &self,
        page: &dyn PageDriver,
        target: &Url,
        cookie_file: Option<&Path>,
    ) -> Result<Option<String>> {
        if let Some(cookie_file) = cookie_file {
            let origin = self.cookie_origin(target)?;
            let host = origin
                .host_str()
                .ok_or_else(|| Error::InvalidUrl(origin.to_string()))?
                .to_string();

            // Cookies can only be set for the domain the page is currently on.
            page.goto(origin.as_str()).await?;
            let mut records = CookieLoader::load(cookie_file, &host)?;
            let report = inject_cookies(page, &mut records).await;
            tracing::info!(
                "Injected {} cookies for {} ({} rejected, {} malformed, {} for other domains)",
                report.injected,
                host,
                report.rejected,
                report.malformed,
                report.out_of_scope
            );
        }

        page.goto(target.as_str()).await?;
        if !self.config.settle.is_zero() {
            tracing::debug!("Waiting {:?} for the page to settle", self.config.settle);
            tokio::time::sleep(self.config.settle).await;
        }

        let description = run_strategies(&self.config.strategies, page).await?;
        if description.is_none() {
            tracing::info!("No description found on {}", target);
        }
        Ok(description)
    }

    fn cookie_origin(&self, target: &Url) -> Result<Url> {
        if let Some(origin) = &self.config.cookie_origin {
            return Ok(origin.clone());
        }
        let host = target
            .host_str()
            .ok_or_else(|| Error::InvalidUrl(target.to_string()))?;
        Url::parse(&format!("{}://{}/", target.scheme(), host))
            .map_err(|e| Error::InvalidUrl(e.to_string()))
    }
}

/// Add every record to `page`, skipping the ones the browser refuses.
pub async fn inject_cookies<R: BufRead>(
    page: &dyn PageDriver,
    records: &mut CookieRecords<R>,
) -> InjectionReport {
    let mut report = InjectionReport::default();

    for record in records.by_ref() {
        match page.add_cookie(&record).await {
            Ok(()) => report.injected += 1,
            Err(e) => {
                tracing::warn!("Cookie {} rejected: {}", record.name, e);
                report.rejected += 1;
            }
        }
    }

    report.malformed = records.malformed();
    report.out_of_scope = records.out_of_scope();
    report
}

/// Accept only absolute `http`/`https` URLs with a host.
pub fn parse_target(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(Error::InvalidUrl(url.to_string()));
    }

    Ok(parsed)
}
