use crate::{BrowserVersion, DriverArtifact, Error, InstallConfig, Result};
use futures::StreamExt;
use std::fs::{self, File};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

/// A driver binary at its canonical location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledDriver {
    pub path: PathBuf,
    /// `None` when the binary could not report its own version.
    pub version: Option<BrowserVersion>,
}

/// Downloads a driver archive and places the binary at the canonical path.
pub struct DriverInstaller {
    client: reqwest::Client,
    config: InstallConfig,
}

impl DriverInstaller {
    pub fn new(client: reqwest::Client, config: InstallConfig) -> Self {
        Self { client, config }
    }

    /// Install `artifact`, replacing any driver already at the destination.
    ///
    /// The destination is only touched after the archive downloaded and the
    /// binary was extracted; staging files live in scoped temporaries that are
    /// removed on every exit path.
    pub async fn install(&self, artifact: &DriverArtifact) -> Result<InstalledDriver> {
        let temp_root = self.config.temp_dir();
        fs::create_dir_all(&temp_root).map_err(staging_err)?;

        tracing::info!(
            "Downloading chromedriver {} from {}",
            artifact.version,
            artifact.download_url
        );
        let mut archive = tempfile::Builder::new()
            .prefix("chromedriver-download-")
            .suffix(".zip")
            .tempfile_in(&temp_root)
            .map_err(staging_err)?;
        self.download(&artifact.download_url, archive.as_file_mut())
            .await?;

        let extract_dir = tempfile::Builder::new()
            .prefix("chromedriver-extract-")
            .tempdir_in(&temp_root)
            .map_err(extract_err)?;
        extract_archive(archive.as_file_mut(), extract_dir.path())?;

        let file_name = artifact.platform.driver_file_name();
        let extracted = find_binary(extract_dir.path(), file_name)?
            .ok_or_else(|| Error::BinaryNotFound(file_name.to_string()))?;

        let destination = self.config.driver_path(artifact.platform);
        place_binary(&extracted, &destination)?;

        tracing::info!(
            "Installed chromedriver {} to {}",
            artifact.version,
            destination.display()
        );

        drop_scoped(archive, extract_dir);

        Ok(InstalledDriver {
            path: destination,
            version: Some(artifact.version.clone()),
        })
    }

    /// Stream `url` into `file` chunk by chunk.
    async fn download(&self, url: &str, file: &mut File) -> Result<()> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::DownloadFailed(e.to_string()))?;

        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::DownloadFailed(e.to_string()))?;
            file.write_all(&chunk)
                .map_err(|e| Error::DownloadFailed(format!("write failed: {}", e)))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .map_err(|e| Error::DownloadFailed(format!("write failed: {}", e)))?;

        tracing::debug!("Downloaded {} bytes", written);
        Ok(())
    }
}

fn staging_err(e: io::Error) -> Error {
    Error::DownloadFailed(format!("could not stage download: {}", e))
}

fn extract_err(e: io::Error) -> Error {
    Error::ArchiveCorrupt(format!("could not extract: {}", e))
}

/// Temporaries clean themselves up when dropped; surface failures in the log.
fn drop_scoped(archive: NamedTempFile, extract_dir: TempDir) {
    if let Err(e) = archive.close() {
        tracing::warn!("Could not remove downloaded archive: {}", e);
    }
    if let Err(e) = extract_dir.close() {
        tracing::warn!("Could not remove extraction directory: {}", e);
    }
}

/// Unpack every entry of the zip in `file` below `destination`.
fn extract_archive(file: &mut File, destination: &Path) -> Result<()> {
    file.seek(SeekFrom::Start(0)).map_err(extract_err)?;
    let mut archive =
        zip::ZipArchive::new(&*file).map_err(|e| Error::ArchiveCorrupt(e.to_string()))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| Error::ArchiveCorrupt(e.to_string()))?;
        let Some(safe_path) = entry.enclosed_name() else {
            tracing::debug!("Skipping unsafe archive entry {}", entry.name());
            continue;
        };
        let out_path = destination.join(safe_path);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(extract_err)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(extract_err)?;
        }
        let mut out = File::create(&out_path).map_err(extract_err)?;
        io::copy(&mut entry, &mut out).map_err(|e| Error::ArchiveCorrupt(e.to_string()))?;
    }

    Ok(())
}

/// Depth-first search for a regular file named exactly `file_name`.
fn find_binary(dir: &Path, file_name: &str) -> Result<Option<PathBuf>> {
    let mut subdirs = Vec::new();

    for entry in fs::read_dir(dir).map_err(extract_err)? {
        let entry = entry.map_err(extract_err)?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(extract_err)?;

        if file_type.is_dir() {
            subdirs.push(path);
        } else if file_type.is_file() && entry.file_name() == file_name {
            return Ok(Some(path));
        }
    }

    for subdir in subdirs {
        if let Some(found) = find_binary(&subdir, file_name)? {
            return Ok(Some(found));
        }
    }

    Ok(None)
}

/// Copy `source` next to `destination`, mark it executable, then rename it
/// into place so the canonical path never holds a partial binary.
fn place_binary(source: &Path, destination: &Path) -> Result<()> {
    let write_err = |source: io::Error| Error::DestinationWriteError {
        path: destination.to_path_buf(),
        source,
    };

    let dest_dir = destination
        .parent()
        .ok_or_else(|| write_err(io::Error::other("destination has no parent directory")))?;
    fs::create_dir_all(dest_dir).map_err(write_err)?;

    let mut staged = tempfile::Builder::new()
        .prefix(".chromedriver-staged-")
        .tempfile_in(dest_dir)
        .map_err(write_err)?;
    let mut input = File::open(source).map_err(write_err)?;
    io::copy(&mut input, staged.as_file_mut()).map_err(write_err)?;
    staged.as_file_mut().sync_all().map_err(write_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(staged.path(), fs::Permissions::from_mode(0o755))
            .map_err(write_err)?;
    }

    staged
        .persist(destination)
        .map_err(|e| write_err(e.error))?;

    Ok(())
}
