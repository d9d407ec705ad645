use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, trace};

use crate::event::{FsEvent, FsEventKind, RawNotifyEvent};
use crate::platform::{EventHandler, PlatformHandler};
use crate::{Result, WatcherError};

const HUNDRED_MILLIS: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// How often buffered events get a chance to be flushed
    pub tick_interval: Duration,
    pub recursive: bool,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            tick_interval: HUNDRED_MILLIS,
            recursive: false,
        }
    }
}

/// A running watch on a single path.
///
/// Dropping the watcher stops the native watch and the processing task.
#[derive(Debug)]
pub struct FsWatcher {
    root: PathBuf,
    events_rx: mpsc::UnboundedReceiver<FsEvent>,
    stop_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
    // Kept alive for as long as we want native notifications
    _native: RecommendedWatcher,
}

impl FsWatcher {
    /// Start watching `path`. Must be called from within a tokio runtime.
    pub fn watch(path: impl AsRef<Path>, config: WatcherConfig) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        if !root.exists() {
            return Err(WatcherError::PathNotFound(root));
        }

        let (raw_tx, raw_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = oneshot::channel();

        let mut native = notify::recommended_watcher(move |result| {
            if raw_tx.send(result).is_err() {
                trace!("Dropping native event, watcher task is gone");
            }
        })?;

        let mode = if config.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        native
            .watch(&root, mode)
            .map_err(|source| WatcherError::Watch {
                path: root.clone(),
                source,
            })?;

        let handle = tokio::spawn(run(
            PlatformHandler::new(),
            raw_rx,
            events_tx,
            stop_rx,
            config.tick_interval,
        ));

        debug!(root = %root.display(), "Started filesystem watcher");

        Ok(Self {
            root,
            events_rx,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
            _native: native,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Next normalized event, `None` once the watcher stopped
    pub async fn recv(&mut self) -> Option<FsEvent> {
        self.events_rx.recv().await
    }

    pub async fn stop(mut self) {
        self.signal_stop();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!(?e, "Filesystem watcher task failed to shut down;");
            }
        }
    }

    fn signal_stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            // The task may already be gone, nothing to do then
            let _ = stop_tx.send(());
        }
    }
}

impl Drop for FsWatcher {
    fn drop(&mut self) {
        self.signal_stop();
        debug!(root = %self.root.display(), "Stopped filesystem watcher");
    }
}

async fn run(
    handler: impl EventHandler,
    mut raw_rx: mpsc::UnboundedReceiver<notify::Result<notify::Event>>,
    events_tx: mpsc::UnboundedSender<FsEvent>,
    mut stop_rx: oneshot::Receiver<()>,
    tick_interval: Duration,
) {
    let mut ticker = interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let processed = tokio::select! {
            Some(result) = raw_rx.recv() => match result {
                Ok(event) => handler.process(RawNotifyEvent::from(event)).await,
                Err(e) => {
                    error!(?e, "Native watcher error;");
                    continue;
                }
            },
            _ = ticker.tick() => handler.tick().await,
            _ = &mut stop_rx => break,
        };

        let events = match processed {
            Ok(events) => events,
            Err(e) => {
                error!(?e, "Failed to process filesystem event;");
                continue;
            }
        };

        for event in events {
            let event = with_directory_flag(event).await;
            if events_tx.send(event).is_err() {
                debug!("Event receiver dropped, stopping watcher task");
                handler.reset().await;
                return;
            }
        }
    }

    handler.reset().await;
}

async fn with_directory_flag(event: FsEvent) -> FsEvent {
    if matches!(event.kind, FsEventKind::Remove) {
        return event;
    }

    let is_directory = tokio::fs::metadata(&event.path)
        .await
        .map(|metadata| metadata.is_dir())
        .ok();

    event.with_is_directory(is_directory)
}
