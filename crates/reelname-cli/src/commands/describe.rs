use crate::InstallArgs;
use anyhow::Result;
use console::style;
use reelname_browser::{ExtractionConfig, ExtractionPipeline, parse_target};
use std::path::Path;
use std::time::Duration;
use url::Url;

pub fn execute(
    url: &str,
    cookies: Option<&Path>,
    settle: Duration,
    install: &InstallArgs,
) -> Result<()> {
    // Reject bad input before touching the driver or browser.
    let target: Url = parse_target(url)?;
    tracing::debug!("Extracting description from {}", target);

    let pipeline = ExtractionPipeline::new(
        install.to_config(),
        ExtractionConfig {
            settle,
            ..ExtractionConfig::default()
        },
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(pipeline.extract_description(target.as_str(), cookies));
    runtime.shutdown_timeout(Duration::from_millis(100));

    match result? {
        Some(description) => println!("{}", description),
        None => eprintln!(
            "{}",
            style(format!("No description found for {}", target)).yellow()
        ),
    }

    Ok(())
}
