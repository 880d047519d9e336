//! Keeps the installed chromedriver on the same major version as Chrome.
//!
//! The check walks a small state machine:
//!
//! - `Absent`: nothing at the canonical path, install.
//! - `InstalledUnknownVersion`: the binary exists but `--version` could not be
//!   parsed. Treated like an incompatible driver and replaced.
//! - `InstalledIncompatible`: major versions differ, replace.
//! - `InstalledCompatible`: major versions match, done without touching the
//!   network.

use crate::probe::run_captured;
use crate::{
    BrowserVersion, DriverInstaller, DriverRegistry, Error, InstallConfig, InstalledDriver,
    PlatformKey, Result, VersionProbe,
};
use std::path::Path;

/// Observed condition of the canonical driver path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverState {
    Absent,
    InstalledUnknownVersion,
    InstalledCompatible(BrowserVersion),
    InstalledIncompatible(BrowserVersion),
}

/// What [`CompatibilityChecker::ensure`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureAction {
    AlreadyCompatible,
    Installed,
    Replaced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsureOutcome {
    pub driver: InstalledDriver,
    pub browser: BrowserVersion,
    pub action: EnsureAction,
}

pub struct CompatibilityChecker {
    config: InstallConfig,
    platform: PlatformKey,
    probe: VersionProbe,
    registry: DriverRegistry,
    installer: DriverInstaller,
}

impl CompatibilityChecker {
    /// Build a checker for the local platform.
    pub fn new(config: InstallConfig) -> Result<Self> {
        let platform = PlatformKey::current()?;
        Ok(Self::for_platform(config, platform, reqwest::Client::new()))
    }

    pub fn for_platform(
        config: InstallConfig,
        platform: PlatformKey,
        client: reqwest::Client,
    ) -> Self {
        Self {
            probe: VersionProbe::new(config.browser_path.clone(), platform),
            registry: DriverRegistry::new(client.clone(), config.manifest_url.clone()),
            installer: DriverInstaller::new(client, config.clone()),
            config,
            platform,
        }
    }

    pub fn platform(&self) -> PlatformKey {
        self.platform
    }

    pub fn driver_path(&self) -> std::path::PathBuf {
        self.config.driver_path(self.platform)
    }

    /// Guarantee a driver matching the installed browser is present.
    pub async fn ensure(&self) -> Result<EnsureOutcome> {
        let browser = self
            .probe
            .probe_browser_version()
            .ok_or(Error::BrowserNotFound)?;
        tracing::info!("Detected Chrome version: {}", browser);

        let state = self.state(&browser);
        let action = match state {
            DriverState::InstalledCompatible(driver_version) => {
                tracing::info!(
                    "chromedriver {} is compatible with Chrome {}",
                    driver_version,
                    browser
                );
                return Ok(EnsureOutcome {
                    driver: InstalledDriver {
                        path: self.driver_path(),
                        version: Some(driver_version),
                    },
                    browser,
                    action: EnsureAction::AlreadyCompatible,
                });
            }
            DriverState::Absent => {
                tracing::info!("chromedriver not found, downloading");
                EnsureAction::Installed
            }
            DriverState::InstalledIncompatible(driver_version) => {
                tracing::info!(
                    "chromedriver {} is not compatible with Chrome {}, downloading",
                    driver_version,
                    browser
                );
                EnsureAction::Replaced
            }
            DriverState::InstalledUnknownVersion => {
                tracing::info!("Could not verify chromedriver version, downloading");
                EnsureAction::Replaced
            }
        };

        let artifact = self
            .registry
            .find_driver(browser.major(), self.platform)
            .await?;
        let driver = self.installer.install(&artifact).await?;

        Ok(EnsureOutcome {
            driver,
            browser,
            action,
        })
    }

    /// Inspect the canonical driver path against `browser`.
    pub fn state(&self, browser: &BrowserVersion) -> DriverState {
        let path = self.driver_path();
        if !path.exists() {
            return DriverState::Absent;
        }

        match query_driver_version(&path) {
            None => DriverState::InstalledUnknownVersion,
            Some(version) if version.major() == browser.major() => {
                DriverState::InstalledCompatible(version)
            }
            Some(version) => DriverState::InstalledIncompatible(version),
        }
    }
}

/// Run `<driver> --version` and parse the reported version.
pub fn query_driver_version(path: &Path) -> Option<BrowserVersion> {
    let stdout = run_captured(path, &["--version"])?;
    BrowserVersion::from_driver_output(&stdout)
}
