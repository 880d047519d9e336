use crate::InstallArgs;
use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use reelname_core::{CompatibilityChecker, EnsureAction, EnsureOutcome, PlatformKey};
use std::time::Duration;

pub fn execute(install: &InstallArgs) -> Result<()> {
    let checker = CompatibilityChecker::new(install.to_config())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message("Checking chromedriver...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = runtime.block_on(checker.ensure());
    spinner.finish_and_clear();
    runtime.shutdown_timeout(Duration::from_millis(100));

    print_outcome(checker.platform(), &result?);
    Ok(())
}

fn print_outcome(platform: PlatformKey, outcome: &EnsureOutcome) {
    let driver_version = outcome
        .driver
        .version
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let status = match outcome.action {
        EnsureAction::AlreadyCompatible => style("Already compatible").green().bold(),
        EnsureAction::Installed => style("Installed").cyan().bold(),
        EnsureAction::Replaced => style("Replaced").yellow().bold(),
    };

    println!("{}", status);
    println!("  Platform:     {}", platform);
    println!("  Chrome:       {}", outcome.browser);
    println!("  chromedriver: {}", driver_version);
    println!("  Path:         {}", outcome.driver.path.display());
}
