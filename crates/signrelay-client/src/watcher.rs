//! Watch-directory scanning and write-settlement detection
//!
//! The watcher polls the watch directory at the configured interval. A
//! regular file with a signable extension that has not been seen before
//! becomes a [`PendingFile`] and is handed to its own task, so one slow
//! sign never blocks detection of the next file. A file is considered
//! fully written once its size holds steady across one settle interval.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use signrelay_core::ClientConfig;

use crate::error::Result;
use crate::uploader::Uploader;

/// Interval between size polls while waiting for a file to settle
const SETTLE_POLL: Duration = Duration::from_millis(200);

/// A file observed in the watch directory, waiting to settle
#[derive(Debug)]
pub struct PendingFile {
    /// Path in the watch directory
    pub path: PathBuf,
    /// Size at the most recent poll
    pub last_size: Option<u64>,
    /// Set once two consecutive size reads agreed
    pub stable: bool,
}

impl PendingFile {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            last_size: None,
            stable: false,
        }
    }

    /// Poll the file size until two consecutive reads are equal.
    ///
    /// A file written in one atomic syscall settles on the first poll
    /// after a sleep. A file that disappears mid-wait surfaces the stat
    /// error to the caller.
    pub async fn wait_until_settled(&mut self) -> Result<u64> {
        loop {
            let size = tokio::fs::metadata(&self.path).await?.len();
            if self.last_size == Some(size) {
                self.stable = true;
                debug!(path = %self.path.display(), size, "file settled");
                return Ok(size);
            }
            self.last_size = Some(size);
            tokio::time::sleep(SETTLE_POLL).await;
        }
    }
}

/// Polls the watch directory and dispatches new files for upload
pub struct Watcher {
    config: Arc<ClientConfig>,
    uploader: Uploader,
    seen: HashSet<PathBuf>,
}

impl Watcher {
    pub fn new(config: Arc<ClientConfig>) -> Result<Self> {
        let uploader = Uploader::new(config.clone())?;
        Ok(Self {
            config,
            uploader,
            seen: HashSet::new(),
        })
    }

    /// Scan until the task is cancelled.
    ///
    /// Errors scanning the watch directory itself (missing directory,
    /// permissions) propagate and end the process, per the relay's
    /// fail-fast stance on filesystem errors.
    pub async fn run(mut self) -> Result<()> {
        info!(watch_dir = %self.config.watch_dir.display(), "watching for new files");
        let mut ticker = tokio::time::interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.scan_once().await?;
        }
    }

    /// One pass over the watch directory; dispatches unseen signable files
    pub async fn scan_once(&mut self) -> Result<()> {
        let mut entries = tokio::fs::read_dir(&self.config.watch_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if !self.config.is_signable(&path) {
                continue;
            }
            if !self.seen.insert(path.clone()) {
                continue;
            }

            info!(path = %path.display(), "new file detected");
            let uploader = self.uploader.clone();
            tokio::spawn(async move {
                if let Err(err) = process_file(uploader, path.clone()).await {
                    warn!(path = %path.display(), error = %err, "processing failed");
                }
            });
        }

        // A file that was consumed and later recreated counts as new again
        self.seen.retain(|path| path.exists());
        Ok(())
    }
}

/// Wait for a detected file to settle, then run its upload sequence
async fn process_file(uploader: Uploader, path: PathBuf) -> Result<()> {
    let mut pending = PendingFile::new(path);
    pending.wait_until_settled().await?;
    uploader.upload_with_retries(&pending.path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderName;
    use axum::routing::post;
    use axum::Router;
    use signrelay_core::digest::sha256_hex;
    use tempfile::TempDir;

    const SIGNED_BODY: &[u8] = b"stub signed output";

    async fn spawn_signing_stub() -> String {
        let app = Router::new().route(
            "/sign",
            post(|| async {
                (
                    [(
                        HeaderName::from_static("x-file-sha256"),
                        sha256_hex(SIGNED_BODY),
                    )],
                    SIGNED_BODY.to_vec(),
                )
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn test_config(server_url: String, temp: &TempDir) -> Arc<ClientConfig> {
        Arc::new(ClientConfig {
            server_url,
            watch_dir: temp.path().join("watch"),
            output_dir: temp.path().join("out"),
            poll_interval_sec: 0.05,
            retry_count: 3,
            retry_backoff_sec: 0.05,
            request_timeout_sec: 5,
            ..ClientConfig::default()
        })
    }

    #[tokio::test]
    async fn test_settled_file_reports_final_size() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app.exe");
        std::fs::write(&path, b"0123456789").unwrap();

        let mut pending = PendingFile::new(path);
        let size = pending.wait_until_settled().await.unwrap();
        assert_eq!(size, 10);
        assert!(pending.stable);
    }

    #[tokio::test]
    async fn test_settle_waits_for_slow_writer() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app.exe");
        std::fs::write(&path, b"start").unwrap();

        let writer_path = path.clone();
        tokio::spawn(async move {
            for _ in 0..3 {
                tokio::time::sleep(Duration::from_millis(60)).await;
                let mut content = std::fs::read(&writer_path).unwrap();
                content.extend_from_slice(b"-more");
                std::fs::write(&writer_path, content).unwrap();
            }
        });

        let mut pending = PendingFile::new(path.clone());
        let size = pending.wait_until_settled().await.unwrap();
        assert_eq!(size, std::fs::metadata(&path).unwrap().len());
        assert_eq!(size, 20);
    }

    #[tokio::test]
    async fn test_end_to_end_watch_sign_publish() {
        let temp = TempDir::new().unwrap();
        let base = spawn_signing_stub().await;
        let config = test_config(base, &temp);
        std::fs::create_dir_all(&config.watch_dir).unwrap();

        let watcher = Watcher::new(config.clone()).unwrap();
        tokio::spawn(async move {
            watcher.run().await.unwrap();
        });

        // Drop a file into the watch directory after the watcher is up
        tokio::time::sleep(Duration::from_millis(100)).await;
        std::fs::write(config.watch_dir.join("sample.exe"), b"ten bytes!").unwrap();

        let published = config.output_dir.join("sample.exe");
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while !published.exists() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        assert_eq!(std::fs::read(&published).unwrap(), SIGNED_BODY);
    }

    #[tokio::test]
    async fn test_scan_ignores_unsignable_and_already_seen() {
        let temp = TempDir::new().unwrap();
        let base = spawn_signing_stub().await;
        let config = test_config(base, &temp);
        std::fs::create_dir_all(&config.watch_dir).unwrap();
        std::fs::write(config.watch_dir.join("readme.md"), b"docs").unwrap();
        std::fs::create_dir_all(config.watch_dir.join("nested.exe")).unwrap();

        let mut watcher = Watcher::new(config.clone()).unwrap();
        watcher.scan_once().await.unwrap();
        watcher.scan_once().await.unwrap();

        // Neither the markdown file nor the directory was picked up
        assert!(watcher.seen.is_empty());
    }
}
