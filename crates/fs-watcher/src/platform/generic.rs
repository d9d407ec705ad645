//! Fallback event handler for platforms without a dedicated one
//!
//! Rename halves are resolved immediately by checking whether the reported
//! path still exists, modifications are forwarded untouched.

use crate::event::{FsEvent, RawEventKind, RawNotifyEvent};
use crate::platform::EventHandler;
use crate::Result;
use tracing::trace;

#[derive(Debug, Default)]
pub struct GenericHandler;

impl GenericHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl EventHandler for GenericHandler {
    async fn process(&self, event: RawNotifyEvent) -> Result<Vec<FsEvent>> {
        let Some(path) = event.primary_path().cloned() else {
            return Ok(vec![]);
        };

        match event.kind {
            RawEventKind::Create => Ok(vec![FsEvent::create(path)]),
            RawEventKind::Remove => Ok(vec![FsEvent::remove(path)]),
            RawEventKind::Modify => Ok(vec![FsEvent::modify(path)]),
            RawEventKind::Rename if event.paths.len() >= 2 => Ok(vec![FsEvent::rename(
                event.paths[0].clone(),
                event.paths[1].clone(),
            )]),
            RawEventKind::Rename => {
                if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                    Ok(vec![FsEvent::create(path)])
                } else {
                    Ok(vec![FsEvent::remove(path)])
                }
            }
            RawEventKind::Other(ref kind) => {
                trace!("Ignoring unknown event kind: {}", kind);
                Ok(vec![])
            }
        }
    }

    async fn tick(&self) -> Result<Vec<FsEvent>> {
        Ok(vec![])
    }

    async fn reset(&self) {}
}
