use crate::{Error, Result};
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

/// A running chromedriver process. The process is killed on drop.
pub struct DriverService {
    child: Child,
    port: u16,
}

impl DriverService {
    /// Start `driver_path` listening on a free local port.
    pub fn spawn(driver_path: PathBuf) -> Result<Self> {
        let port = free_port()?;
        let args = build_args(port);

        tracing::debug!("Starting {} {}", driver_path.display(), args.join(" "));

        let child = Command::new(&driver_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                Error::Launch(format!("could not run {}: {}", driver_path.display(), e))
            })?;

        tracing::info!("chromedriver started on port {} (pid {})", port, child.id());

        Ok(Self { child, port })
    }

    /// WebDriver endpoint of this service.
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }

    /// Whether the process has exited on its own.
    pub fn has_exited(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(Some(_)))
    }

    fn kill(&mut self) {
        if self.has_exited() {
            return;
        }
        if let Err(e) = self.child.kill() {
            tracing::warn!("Failed to stop chromedriver: {}", e);
        }
        let _ = self.child.wait();
    }
}

impl Drop for DriverService {
    fn drop(&mut self) {
        tracing::debug!("Stopping chromedriver on port {}", self.port);
        self.kill();
    }
}

/// Build chromedriver command-line arguments
fn build_args(port: u16) -> Vec<String> {
    vec![format!("--port={}", port), "--silent".to_string()]
}

/// Ask the OS for an unused port. The listener is released before the
/// driver binds it.
fn free_port() -> Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|e| Error::Launch(format!("no free port: {}", e)))?;
    let port = listener
        .local_addr()
        .map_err(|e| Error::Launch(format!("no free port: {}", e)))?
        .port();
    Ok(port)
}
