//! Platform-agnostic filesystem watcher.
//!
//! Wraps [`notify`] and turns its raw, platform-flavoured notifications into a
//! small set of normalized [`FsEvent`]s: create, modify, remove and rename.
//!
//! Each platform gets an [`EventHandler`](platform::EventHandler) that may buffer
//! events which are not complete yet (a rename reported as two halves, a burst
//! of writes on the same file) and flush them later from a periodic tick.
//!
//! ```no_run
//! use tagdeck_fs_watcher::{FsWatcher, WatcherConfig};
//!
//! # async fn run() -> tagdeck_fs_watcher::Result<()> {
//! let mut watcher = FsWatcher::watch("/tmp", WatcherConfig::default())?;
//!
//! while let Some(event) = watcher.recv().await {
//!     println!("{:?} {}", event.kind, event.path.display());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(
    clippy::all,
    clippy::correctness,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::complexity,
    clippy::unwrap_used,
    unused_qualifications,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unused_allocation,
    clippy::dbg_macro,
    deprecated
)]

mod error;
mod event;
pub mod platform;
mod watcher;

pub use error::{Result, WatcherError};
pub use event::{FsEvent, FsEventKind, RawEventKind, RawNotifyEvent};
pub use watcher::{FsWatcher, WatcherConfig};
