//! Storage gateway
//!
//! Every byte the session reads or writes goes through [`StorageGateway`]. The
//! session never keeps anything it got from here besides plain values.

use crate::{domain::Location, sidecar::SidecarMeta};

use std::{
	fmt, io,
	path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

mod local;

pub use local::LocalStorage;

#[derive(Debug, Error)]
pub enum StorageError {
	#[error("{context}: '{}'; {source}", .path.display())]
	FileIO {
		path: PathBuf,
		#[source]
		source: io::Error,
		context: &'static str,
	},
	#[error("path not found: '{}'", .0.display())]
	NotFound(PathBuf),
	#[error("path already exists: '{}'", .0.display())]
	AlreadyExists(PathBuf),
	#[error("object store activation failed for location <id='{location_id}'>: {reason}")]
	ObjectStore { location_id: Uuid, reason: String },
	#[error("operation not supported by this storage: {0}")]
	Unsupported(&'static str),
	#[error(transparent)]
	Watcher(#[from] tagdeck_fs_watcher::WatcherError),
}

impl StorageError {
	pub fn io(path: impl Into<PathBuf>, source: io::Error, context: &'static str) -> Self {
		let path = path.into();
		match source.kind() {
			io::ErrorKind::NotFound => Self::NotFound(path),
			io::ErrorKind::AlreadyExists => Self::AlreadyExists(path),
			_ => Self::FileIO {
				path,
				source,
				context,
			},
		}
	}
}

/// A listing row as storage reports it, before any enrichment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
	pub path: PathBuf,
	pub is_file: bool,
	pub size: u64,
	pub last_modified: DateTime<Utc>,
	/// The entry sidecar, when the storage already read it
	pub sidecar: Option<SidecarMeta>,
}

impl RawEntry {
	pub fn file(path: impl Into<PathBuf>, size: u64) -> Self {
		Self {
			path: path.into(),
			is_file: true,
			size,
			last_modified: Utc::now(),
			sidecar: None,
		}
	}

	pub fn folder(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			is_file: false,
			size: 0,
			last_modified: Utc::now(),
			sidecar: None,
		}
	}

	#[must_use]
	pub fn with_sidecar(mut self, sidecar: SidecarMeta) -> Self {
		self.sidecar = Some(sidecar);
		self
	}
}

/// External change under a watched directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
	Created { path: PathBuf, is_dir: bool },
	Removed { path: PathBuf },
	Renamed { from: PathBuf, to: PathBuf },
	Modified { path: PathBuf },
}

/// A running watch, dropping it stops the watch
pub trait WatcherHandle: fmt::Debug + Send + Sync {
	fn root(&self) -> &Path;
}

#[async_trait]
pub trait StorageGateway: Send + Sync + 'static {
	/// Non-recursive listing of `path`
	async fn list(&self, path: &Path) -> Result<Vec<RawEntry>, StorageError>;

	async fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError>;

	async fn write(&self, path: &Path, content: &[u8]) -> Result<(), StorageError>;

	async fn create_directory(&self, path: &Path) -> Result<(), StorageError>;

	/// Removes a file, or a folder with everything inside it
	async fn delete(&self, path: &Path) -> Result<(), StorageError>;

	async fn rename(&self, from: &Path, to: &Path) -> Result<(), StorageError>;

	async fn enable_object_store(&self, location: &Location) -> Result<(), StorageError>;

	async fn disable_object_store(&self);

	fn is_object_store_active(&self) -> bool;

	/// Start watching `path`, events are pushed into `events_tx`.
	/// Must be called from within a tokio runtime.
	fn watch(
		&self,
		path: &Path,
		events_tx: mpsc::UnboundedSender<WatchEvent>,
	) -> Result<Box<dyn WatcherHandle>, StorageError>;
}
