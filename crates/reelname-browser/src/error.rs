use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot read cookie file {}: {source}", path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Driver(#[from] reelname_core::Error),

    #[error("Failed to start chromedriver: {0}")]
    Launch(String),

    #[error("WebDriver error: {0}")]
    Session(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<fantoccini::error::CmdError> for Error {
    fn from(err: fantoccini::error::CmdError) -> Self {
        Error::Session(err.to_string())
    }
}

impl From<fantoccini::error::NewSessionError> for Error {
    fn from(err: fantoccini::error::NewSessionError) -> Self {
        Error::Session(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
