use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use reelname_cli::{InstallArgs, commands};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "reelname")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Keep chromedriver in step with Chrome and extract video descriptions",
    long_about = "reelname keeps a local chromedriver on the same major version as the installed \
                  Chrome and uses it to pull the description text from a rendered video page."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Make sure a chromedriver matching the installed Chrome is present
    Driver {
        #[command(flatten)]
        install: InstallArgs,
    },

    /// Extract the description of a video page
    Describe {
        /// URL of the video page (http or https)
        #[arg(value_name = "URL")]
        url: String,

        /// Netscape-format cookies.txt used to authenticate the session
        #[arg(long, value_name = "FILE", env = "REELNAME_COOKIES")]
        cookies: Option<PathBuf>,

        /// Seconds to wait for the page to render before extracting
        #[arg(long, value_name = "SECS", default_value_t = 5)]
        settle: u64,

        #[command(flatten)]
        install: InstallArgs,
    },

    /// Show the detected platform, driver location and Chrome version
    Platform {
        #[command(flatten)]
        install: InstallArgs,
    },

    /// Generate shell completion scripts
    #[command(after_help = "SUPPORTED SHELLS:\n  \
                            bash, zsh, fish, powershell, elvish\n\n\
                            INSTALLATION:\n  \
                            bash:  reelname completion --shell bash >> ~/.bashrc\n  \
                            zsh:   reelname completion --shell zsh > ~/.zfunc/_reelname\n         \
                            (add `fpath=(~/.zfunc $fpath)` to ~/.zshrc)\n  \
                            fish:  reelname completion --shell fish > ~/.config/fish/completions/reelname.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    match cli.command {
        Commands::Driver { install } => commands::driver::execute(&install),
        Commands::Describe {
            url,
            cookies,
            settle,
            install,
        } => commands::describe::execute(
            &url,
            cookies.as_deref(),
            Duration::from_secs(settle),
            &install,
        ),
        Commands::Platform { install } => commands::platform::execute(&install),
        Commands::Completion { shell } => {
            commands::completion::execute(shell, &mut Cli::command())
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("reelname=debug,reelname_core=debug,reelname_browser=debug")
    } else {
        EnvFilter::new("reelname=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
