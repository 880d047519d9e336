use crate::{Error, Result};
use std::fmt;
use std::sync::OnceLock;

/// Operating system and CPU family the driver is built for.
///
/// Used both as the registry's download tag and as the name of the
/// per-platform install directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformKey {
    WindowsX64,
    LinuxX64,
    MacX64,
    MacArm64,
}

static CURRENT: OnceLock<std::result::Result<PlatformKey, (String, String)>> = OnceLock::new();

impl PlatformKey {
    /// Resolve a platform from an OS name and CPU architecture.
    ///
    /// OS names are matched case-insensitively against the Windows, Linux and
    /// macOS families. The architecture only distinguishes Apple Silicon from
    /// Intel Macs.
    pub fn from_os_arch(os: &str, arch: &str) -> Result<Self> {
        let os_lower = os.to_lowercase();
        let arch_lower = arch.to_lowercase();

        match os_lower.as_str() {
            "windows" => Ok(PlatformKey::WindowsX64),
            "linux" => Ok(PlatformKey::LinuxX64),
            "macos" | "darwin" => {
                if arch_lower.contains("arm") || arch_lower.contains("aarch64") {
                    Ok(PlatformKey::MacArm64)
                } else {
                    Ok(PlatformKey::MacX64)
                }
            }
            _ => Err(Error::UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            }),
        }
    }

    /// Platform of the running process, resolved once and cached.
    pub fn current() -> Result<Self> {
        let resolved = CURRENT.get_or_init(|| {
            let os = std::env::consts::OS;
            let arch = std::env::consts::ARCH;
            Self::from_os_arch(os, arch).map_err(|_| (os.to_string(), arch.to_string()))
        });

        resolved
            .clone()
            .map_err(|(os, arch)| Error::UnsupportedPlatform { os, arch })
    }

    /// Tag used by the Chrome-for-Testing manifest.
    pub fn manifest_tag(&self) -> &'static str {
        match self {
            PlatformKey::WindowsX64 => "win64",
            PlatformKey::LinuxX64 => "linux64",
            PlatformKey::MacX64 => "mac-x64",
            PlatformKey::MacArm64 => "mac-arm64",
        }
    }

    /// Subdirectory of the install root holding this platform's driver.
    pub fn install_dir_name(&self) -> &'static str {
        match self {
            PlatformKey::WindowsX64 => "chromedriver-win64",
            PlatformKey::LinuxX64 => "chromedriver-linux64",
            PlatformKey::MacX64 => "chromedriver-mac-x64",
            PlatformKey::MacArm64 => "chromedriver-mac-arm64",
        }
    }

    /// File name of the driver executable on this platform.
    pub fn driver_file_name(&self) -> &'static str {
        match self {
            PlatformKey::WindowsX64 => "chromedriver.exe",
            _ => "chromedriver",
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, PlatformKey::WindowsX64)
    }
}

/// Resolve the platform of the local machine.
pub fn resolve_platform() -> Result<PlatformKey> {
    PlatformKey::current()
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.manifest_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_supported_families() {
        assert_eq!(
            PlatformKey::from_os_arch("windows", "x86_64").unwrap(),
            PlatformKey::WindowsX64
        );
        assert_eq!(
            PlatformKey::from_os_arch("linux", "x86_64").unwrap(),
            PlatformKey::LinuxX64
        );
        assert_eq!(
            PlatformKey::from_os_arch("macos", "x86_64").unwrap(),
            PlatformKey::MacX64
        );
        assert_eq!(
            PlatformKey::from_os_arch("Darwin", "arm64").unwrap(),
            PlatformKey::MacArm64
        );
        assert_eq!(
            PlatformKey::from_os_arch("macos", "aarch64").unwrap(),
            PlatformKey::MacArm64
        );
    }

    #[test]
    fn test_unknown_os_is_unsupported() {
        let result = PlatformKey::from_os_arch("freebsd", "x86_64");

        match result {
            Err(Error::UnsupportedPlatform { os, arch }) => {
                assert_eq!(os, "freebsd");
                assert_eq!(arch, "x86_64");
            }
            other => panic!("expected UnsupportedPlatform, got {:?}", other),
        }
    }

    #[test]
    fn test_current_is_stable() {
        let first = PlatformKey::current();
        let second = PlatformKey::current();
        assert_eq!(first.is_ok(), second.is_ok());
        if let (Ok(a), Ok(b)) = (first, second) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_layout_names() {
        assert_eq!(PlatformKey::MacArm64.manifest_tag(), "mac-arm64");
        assert_eq!(PlatformKey::LinuxX64.install_dir_name(), "chromedriver-linux64");
        assert_eq!(PlatformKey::WindowsX64.driver_file_name(), "chromedriver.exe");
        assert_eq!(PlatformKey::MacX64.driver_file_name(), "chromedriver");
        assert_eq!(PlatformKey::WindowsX64.to_string(), "win64");
    }
}
