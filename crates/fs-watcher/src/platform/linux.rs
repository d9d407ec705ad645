//! Linux-specific event handler
//!
//! inotify reports a rename inside a watched directory three times: the `From`
//! half, the `To` half and a combined event with both paths. Moves across the
//! watch boundary only produce one half. Halves and modifications are buffered
//! and resolved against the filesystem once they stabilize.

use crate::event::{FsEvent, RawEventKind, RawNotifyEvent};
use crate::platform::EventHandler;
use crate::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::trace;

/// Timeout for event stabilization
const STABILIZATION_TIMEOUT_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Modify,
    RenameHalf,
}

/// Linux event handler
pub struct LinuxHandler {
    pending: RwLock<HashMap<PathBuf, (Pending, Instant)>>,
}

impl LinuxHandler {
    pub fn new() -> Self {
        Self {
            pending: RwLock::new(HashMap::new()),
        }
    }

    async fn buffer(&self, path: PathBuf, kind: Pending) {
        let mut pending = self.pending.write().await;
        match pending.get_mut(&path) {
            // A rename half is more informative than a later content change
            Some((Pending::RenameHalf, at)) => *at = Instant::now(),
            _ => {
                pending.insert(path, (kind, Instant::now()));
            }
        }
    }

    /// Resolve buffered paths that have not been touched for `timeout`
    async fn evict(&self, timeout: Duration) -> Vec<FsEvent> {
        let stabilized = {
            let mut pending = self.pending.write().await;
            let paths = pending
                .iter()
                .filter(|(_, (_, at))| at.elapsed() >= timeout)
                .map(|(path, (kind, _))| (path.clone(), *kind))
                .collect::<Vec<_>>();

            for (path, _) in &paths {
                pending.remove(path);
            }

            paths
        };

        let mut events = Vec::with_capacity(stabilized.len());
        for (path, kind) in stabilized {
            let exists = tokio::fs::try_exists(&path).await.unwrap_or(false);
            trace!(?kind, exists, "Evicting stabilized path: {}", path.display());

            events.push(match (kind, exists) {
                (_, false) => FsEvent::remove(path),
                (Pending::Modify, true) => FsEvent::modify(path),
                (Pending::RenameHalf, true) => FsEvent::create(path),
            });
        }

        events
    }
}

impl Default for LinuxHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl EventHandler for LinuxHandler {
    async fn process(&self, event: RawNotifyEvent) -> Result<Vec<FsEvent>> {
        let Some(path) = event.primary_path().cloned() else {
            return Ok(vec![]);
        };

        match event.kind {
            RawEventKind::Create => Ok(vec![FsEvent::create(path)]),
            RawEventKind::Remove => {
                self.pending.write().await.remove(&path);
                Ok(vec![FsEvent::remove(path)])
            }
            RawEventKind::Modify => {
                self.buffer(path, Pending::Modify).await;
                Ok(vec![])
            }
            RawEventKind::Rename if event.paths.len() >= 2 => {
                let from = event.paths[0].clone();
                let to = event.paths[1].clone();

                // The combined event supersedes both halves
                let mut pending = self.pending.write().await;
                pending.remove(&from);
                pending.remove(&to);

                Ok(vec![FsEvent::rename(from, to)])
            }
            RawEventKind::Rename => {
                self.buffer(path, Pending::RenameHalf).await;
                Ok(vec![])
            }
            RawEventKind::Other(ref kind) => {
                trace!("Ignoring unknown event kind: {}", kind);
                Ok(vec![])
            }
        }
    }

    async fn tick(&self) -> Result<Vec<FsEvent>> {
        let timeout = Duration::from_millis(STABILIZATION_TIMEOUT_MS);
        Ok(self.evict(timeout).await)
    }

    async fn reset(&self) {
        self.pending.write().await.clear();
    }
}
