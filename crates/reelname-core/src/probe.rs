use crate::{BrowserVersion, ChromeFinder, PlatformKey};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Per-user key Chrome writes its current version to on Windows.
const BLBEACON_KEY: &str = r"HKCU\Software\Google\Chrome\BLBeacon";

/// Determines the version of the installed Chrome.
pub struct VersionProbe {
    finder: ChromeFinder,
    platform: PlatformKey,
}

impl VersionProbe {
    pub fn new(browser_path: Option<PathBuf>, platform: PlatformKey) -> Self {
        Self {
            finder: ChromeFinder::new(browser_path),
            platform,
        }
    }

    /// Probe the browser version, trying the executable first and, on
    /// Windows, the per-user registry entry second.
    ///
    /// Never fails: every invocation or parse problem collapses to `None`.
    pub fn probe_browser_version(&self) -> Option<BrowserVersion> {
        if let Some(version) = self.probe_executable() {
            tracing::debug!("Chrome version {} from executable", version);
            return Some(version);
        }

        if self.platform.is_windows() {
            if let Some(version) = probe_registry() {
                tracing::debug!("Chrome version {} from registry", version);
                return Some(version);
            }
        }

        tracing::debug!("Could not determine Chrome version");
        None
    }

    fn probe_executable(&self) -> Option<BrowserVersion> {
        let chrome = match self.finder.find() {
            Ok(path) => path,
            Err(e) => {
                tracing::debug!("Chrome lookup failed: {}", e);
                return None;
            }
        };

        if self.platform.is_windows() {
            // chrome.exe does not print its version on Windows.
            let query = format!(
                "(Get-Item '{}').VersionInfo.ProductVersion",
                chrome.display()
            );
            let stdout =
                run_captured(Path::new("powershell"), &["-NoProfile", "-Command", &query])?;
            BrowserVersion::parse(stdout.trim())
        } else {
            let stdout = run_captured(&chrome, &["--version"])?;
            BrowserVersion::from_browser_output(&stdout)
        }
    }
}

fn probe_registry() -> Option<BrowserVersion> {
    let stdout = run_captured(
        Path::new("reg"),
        &["query", BLBEACON_KEY, "/v", "version"],
    )?;
    BrowserVersion::find_in(&stdout)
}

/// Run `program` with `args` and return stdout if it exited successfully.
pub(crate) fn run_captured(program: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| tracing::debug!("Failed to run {}: {}", program.display(), e))
        .ok()?;

    if !output.status.success() {
        tracing::debug!(
            "{} exited with {}: {}",
            program.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return None;
    }

    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::test_support::write_script;

    #[test]
    fn test_probe_parses_browser_output() {
        let dir = tempfile::tempdir().unwrap();
        let chrome = write_script(dir.path(), "chrome", "echo 'Google Chrome 120.0.6099.109 '");

        let probe = VersionProbe::new(Some(chrome), PlatformKey::LinuxX64);
        let version = probe.probe_browser_version().unwrap();

        assert_eq!(version.as_str(), "120.0.6099.109");
        assert_eq!(version.major(), "120");
    }

    #[test]
    fn test_probe_unparseable_output_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let chrome = write_script(dir.path(), "chrome", "echo 'something unexpected'");

        let probe = VersionProbe::new(Some(chrome), PlatformKey::LinuxX64);
        assert!(probe.probe_browser_version().is_none());
    }

    #[test]
    fn test_probe_failing_binary_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let chrome = write_script(dir.path(), "chrome", "echo 'Google Chrome 120.0.1.2'; exit 3");

        let probe = VersionProbe::new(Some(chrome), PlatformKey::LinuxX64);
        assert!(probe.probe_browser_version().is_none());
    }

    #[test]
    fn test_probe_missing_binary_is_not_found() {
        let probe = VersionProbe::new(
            Some(PathBuf::from("/nonexistent/chrome")),
            PlatformKey::LinuxX64,
        );
        assert!(probe.probe_browser_version().is_none());
    }
}
