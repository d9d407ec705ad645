#![warn(
	clippy::all,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::unwrap_used,
	clippy::expect_used,
	clippy::dbg_macro,
	rust_2018_idioms,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	deprecated
)]
#![forbid(deprecated_in_future)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]
//! Tagdeck core
//!
//! An in-memory explorer session. Directory listings, opened entries and the
//! search index stay consistent across user actions, filesystem watcher events
//! and thumbnail generation, all funnelled through a single session store.

pub mod config;
pub mod domain;
pub mod error;
pub mod explorer;
pub mod file_types;
pub mod index;
pub mod loader;
pub mod location;
pub mod logging;
pub mod ops;
pub mod reflect;
pub mod session;
pub mod sidecar;
pub mod storage;
pub mod thumbnail;

pub use config::{AppConfig, ExplorerSettings};
pub use error::SessionError;
pub use explorer::{Explorer, ExplorerBuilder};
pub use location::{should_rebuild_index, LocationSession, SessionPhase};
pub use session::{SessionEvent, SessionState, SessionStore};
