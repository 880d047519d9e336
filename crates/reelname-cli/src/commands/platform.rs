use crate::InstallArgs;
use anyhow::Result;
use console::style;
use reelname_core::{VersionProbe, resolve_platform};

pub fn execute(install: &InstallArgs) -> Result<()> {
    let platform = resolve_platform()?;
    let config = install.to_config();
    let probe = VersionProbe::new(config.browser_path.clone(), platform);

    let browser = match probe.probe_browser_version() {
        Some(version) => style(version.to_string()).green(),
        None => style("not found".to_string()).yellow(),
    };

    println!("{}", style("Platform").bold());
    println!("  Key:         {}", platform);
    println!("  Driver path: {}", config.driver_path(platform).display());
    println!("  Chrome:      {}", browser);
    Ok(())
}
