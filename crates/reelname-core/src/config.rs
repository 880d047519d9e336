use crate::PlatformKey;
use std::path::PathBuf;

/// Chrome-for-Testing manifest listing every known-good build with downloads.
pub const DEFAULT_MANIFEST_URL: &str =
    "https://googlechromelabs.github.io/chrome-for-testing/known-good-versions-with-downloads.json";

/// Filesystem roots and endpoints shared by the driver components.
#[derive(Debug, Clone)]
pub struct InstallConfig {
    /// Directory holding one subdirectory per platform.
    pub install_root: PathBuf,
    /// Where downloads and extractions are staged. `None` uses the OS temp dir.
    pub temp_root: Option<PathBuf>,
    pub manifest_url: String,
    /// Explicit Chrome binary; `None` searches the platform defaults.
    pub browser_path: Option<PathBuf>,
}

impl InstallConfig {
    pub fn new(install_root: impl Into<PathBuf>) -> Self {
        Self {
            install_root: install_root.into(),
            temp_root: None,
            manifest_url: DEFAULT_MANIFEST_URL.to_string(),
            browser_path: None,
        }
    }

    /// `~/.reelname/chromedriver`, falling back to a relative directory when
    /// no home directory is known.
    pub fn default_install_root() -> PathBuf {
        dirs::home_dir()
            .map(|home| home.join(".reelname").join("chromedriver"))
            .unwrap_or_else(|| PathBuf::from("chromedriver"))
    }

    pub fn with_temp_root(mut self, temp_root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(temp_root.into());
        self
    }

    pub fn with_manifest_url(mut self, url: impl Into<String>) -> Self {
        self.manifest_url = url.into();
        self
    }

    pub fn with_browser_path(mut self, path: Option<PathBuf>) -> Self {
        self.browser_path = path;
        self
    }

    /// Directory the driver for `platform` lives in.
    pub fn driver_dir(&self, platform: PlatformKey) -> PathBuf {
        self.install_root.join(platform.install_dir_name())
    }

    /// Canonical destination of the driver executable for `platform`.
    pub fn driver_path(&self, platform: PlatformKey) -> PathBuf {
        self.driver_dir(platform).join(platform.driver_file_name())
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.temp_root.clone().unwrap_or_else(std::env::temp_dir)
    }
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self::new(Self::default_install_root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_layout() {
        let config = InstallConfig::new("/opt/reelname");

        assert_eq!(
            config.driver_path(PlatformKey::LinuxX64),
            PathBuf::from("/opt/reelname/chromedriver-linux64/chromedriver")
        );
        assert_eq!(
            config.driver_path(PlatformKey::WindowsX64),
            PathBuf::from("/opt/reelname/chromedriver-win64/chromedriver.exe")
        );
    }

    #[test]
    fn test_temp_root_override() {
        let config = InstallConfig::new("/opt/reelname").with_temp_root("/scratch");
        assert_eq!(config.temp_dir(), PathBuf::from("/scratch"));

        let config = InstallConfig::new("/opt/reelname");
        assert_eq!(config.temp_dir(), std::env::temp_dir());
        assert_eq!(config.manifest_url, DEFAULT_MANIFEST_URL);
    }
}
