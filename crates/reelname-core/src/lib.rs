//! Driver management: keeps a local chromedriver on the same major version
//! as the installed Chrome.

mod chrome_finder;
pub mod compat;
mod config;
mod error;
mod installer;
mod platform;
mod probe;
mod registry;
mod version;

#[cfg(test)]
mod test_support;

pub use chrome_finder::ChromeFinder;
pub use compat::{
    CompatibilityChecker, DriverState, EnsureAction, EnsureOutcome, query_driver_version,
};
pub use config::{DEFAULT_MANIFEST_URL, InstallConfig};
pub use error::{Error, Result};
pub use installer::{DriverInstaller, InstalledDriver};
pub use platform::{PlatformKey, resolve_platform};
pub use probe::VersionProbe;
pub use registry::{DriverArtifact, DriverRegistry, Manifest};
pub use version::BrowserVersion;
