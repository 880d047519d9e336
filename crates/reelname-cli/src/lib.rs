use clap::Args;
use reelname_core::InstallConfig;
use std::path::PathBuf;

pub mod commands;

/// Where the driver lives and how to find the browser and manifest.
#[derive(Args, Debug, Clone, Default)]
pub struct InstallArgs {
    /// Root directory for installed chromedriver binaries
    #[arg(long, value_name = "DIR", env = "REELNAME_INSTALL_ROOT")]
    pub install_root: Option<PathBuf>,

    /// Path to the Chrome executable (auto-detected if omitted)
    #[arg(long, value_name = "PATH", env = "REELNAME_CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Chrome for Testing manifest URL
    #[arg(long, value_name = "URL", env = "REELNAME_MANIFEST_URL")]
    pub manifest_url: Option<String>,
}

impl InstallArgs {
    pub fn to_config(&self) -> InstallConfig {
        let root = self
            .install_root
            .clone()
            .unwrap_or_else(InstallConfig::default_install_root);

        let mut config = InstallConfig::new(root).with_browser_path(self.chrome_path.clone());
        if let Some(url) = &self.manifest_url {
            config = config.with_manifest_url(url.clone());
        }
        config
    }
}
