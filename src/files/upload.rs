//! Simulated upload: read, check JSON syntax, then report progress on a timer.

use super::schema::UploadProgress;
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

pub const DEFAULT_PROGRESS_STEP: u8 = 10;
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(80);
/// Longest accepted tick period; larger values would overflow the timer deadline.
pub const MAX_PROGRESS_INTERVAL: Duration = Duration::from_secs(3600);

/// Terminal failure of an upload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("Unable to read file.")]
    Read,
    #[error("Invalid JSON content.")]
    InvalidJson,
    #[error("Upload interrupted.")]
    Interrupted,
}

/// A named file whose text can be read asynchronously.
#[async_trait]
pub trait FileSource: Send + Sync {
    fn name(&self) -> &str;
    async fn read_text(&self) -> std::io::Result<String>;
}

/// A file on the local filesystem.
pub struct LocalFile {
    path: PathBuf,
    name: String,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FileSource for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_text(&self) -> std::io::Result<String> {
        tokio::fs::read_to_string(&self.path).await
    }
}

/// A file held in memory. `None` content reads as an I/O error.
#[derive(Debug, Clone)]
pub struct InMemoryFile {
    name: String,
    content: Option<String>,
}

impl InMemoryFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Some(content.into()),
        }
    }

    pub fn unreadable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: None,
        }
    }
}

#[async_trait]
impl FileSource for InMemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_text(&self) -> std::io::Result<String> {
        self.content.clone().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "file not readable")
        })
    }
}

/// Produces progress sequences with a fixed step and interval.
#[derive(Debug, Clone, Copy)]
pub struct UploadSimulator {
    step: u8,
    interval: Duration,
}

impl UploadSimulator {
    /// `step` is clamped to `1..=100`, `interval` to 1 ms..=[`MAX_PROGRESS_INTERVAL`].
    pub fn new(step: u8, interval: Duration) -> Self {
        Self {
            step: step.clamp(1, 100),
            interval: interval.clamp(Duration::from_millis(1), MAX_PROGRESS_INTERVAL),
        }
    }

    pub fn step(&self) -> u8 {
        self.step
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts an upload on the current tokio runtime.
    ///
    /// Dropping or cancelling the returned stream stops the producer.
    pub fn upload<S>(&self, source: S) -> UploadStream
    where
        S: FileSource + 'static,
    {
        let (tx, rx) = mpsc::channel(8);
        let token = CancellationToken::new();
        tokio::spawn(produce(
            source,
            self.step,
            self.interval,
            tx,
            token.clone(),
        ));
        UploadStream {
            rx,
            _guard: token.clone().drop_guard(),
            token,
        }
    }
}

impl Default for UploadSimulator {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_STEP, DEFAULT_PROGRESS_INTERVAL)
    }
}

type Event = Result<UploadProgress, UploadError>;

async fn produce<S: FileSource>(
    source: S,
    step: u8,
    interval: Duration,
    tx: mpsc::Sender<Event>,
    token: CancellationToken,
) {
    let read = tokio::select! {
        _ = token.cancelled() => return,
        read = source.read_text() => read,
    };
    let text = match read {
        Ok(text) => text,
        Err(e) => {
            debug!(file = source.name(), error = %e, "upload read failed");
            let _ = tx.send(Err(UploadError::Read)).await;
            return;
        }
    };
    if serde_json::from_str::<serde::de::IgnoredAny>(&text).is_err() {
        debug!(file = source.name(), "upload content is not JSON");
        let _ = tx.send(Err(UploadError::InvalidJson)).await;
        return;
    }

    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    let mut progress = 0u8;
    while progress < 100 {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = ticker.tick() => {}
        }
        progress = progress.saturating_add(step).min(100);
        let event = UploadProgress {
            progress,
            content: text.clone(),
        };
        if tx.send(Ok(event)).await.is_err() {
            return;
        }
    }
}

/// Progress events of one upload.
///
/// Ends after the 100% event on success, or after a single error.
pub struct UploadStream {
    rx: mpsc::Receiver<Event>,
    token: CancellationToken,
    _guard: DropGuard,
}

impl UploadStream {
    /// Stops the upload. No event is yielded afterwards.
    pub fn cancel(&mut self) {
        self.token.cancel();
        self.rx.close();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Drains the stream and returns the uploaded text.
    pub async fn finish(
        mut self,
        mut on_progress: impl FnMut(&UploadProgress),
    ) -> Result<String, UploadError> {
        let mut last: Option<UploadProgress> = None;
        while let Some(event) = self.next().await {
            let event = event?;
            on_progress(&event);
            last = Some(event);
        }
        match last {
            Some(done) if done.progress == 100 => Ok(done.content),
            _ => Err(UploadError::Interrupted),
        }
    }
}

impl Stream for UploadStream {
    type Item = Event;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.token.is_cancelled() {
            return Poll::Ready(None);
        }
        self.rx.poll_recv(cx)
    }
}
