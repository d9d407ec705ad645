//! Platform specific event handling

use async_trait::async_trait;

use crate::event::{FsEvent, RawNotifyEvent};
use crate::Result;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(not(target_os = "linux"))]
mod generic;

#[cfg(target_os = "linux")]
pub use linux::LinuxHandler as PlatformHandler;

#[cfg(not(target_os = "linux"))]
pub use generic::GenericHandler as PlatformHandler;

/// Turns raw notifications into normalized events.
///
/// Handlers keep some inner state, so the watcher calls [`EventHandler::tick`]
/// periodically to let them flush whatever stabilized in the meantime.
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    async fn process(&self, event: RawNotifyEvent) -> Result<Vec<FsEvent>>;

    async fn tick(&self) -> Result<Vec<FsEvent>>;

    async fn reset(&self);
}
