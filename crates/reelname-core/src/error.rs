use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported platform: {os} ({arch})")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("Chrome not found or its version could not be determined")]
    BrowserNotFound,

    #[error("No chromedriver build published for Chrome {major}")]
    NoMatchingVersion { major: String },

    #[error("chromedriver {version} has no download for platform {platform}")]
    NoMatchingPlatform { version: String, platform: String },

    #[error("Driver registry error: {0}")]
    Registry(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Archive is corrupt: {0}")]
    ArchiveCorrupt(String),

    #[error("Driver binary not found in archive: {0}")]
    BinaryNotFound(String),

    #[error("Failed to write driver to {}: {source}", path.display())]
    DestinationWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
