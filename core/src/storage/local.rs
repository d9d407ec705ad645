use crate::{
	domain::{paths, Location},
	sidecar::SidecarMeta,
};

use std::{
	io,
	path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tagdeck_fs_watcher::{FsEvent, FsEventKind, FsWatcher, WatcherConfig};
use tokio::{fs, sync::mpsc, task::JoinHandle};
use tracing::{debug, trace, warn};

use super::{RawEntry, StorageError, StorageGateway, WatchEvent, WatcherHandle};

/// Plain local filesystem storage, without object store support
#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
	watcher_config: WatcherConfig,
}

impl LocalStorage {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_watcher_config(watcher_config: WatcherConfig) -> Self {
		Self { watcher_config }
	}
}

async fn read_sidecar(path: &Path) -> Option<SidecarMeta> {
	let sidecar_path = paths::sidecar_path(path)?;

	match fs::read(&sidecar_path).await {
		Ok(bytes) => SidecarMeta::from_slice(&bytes)
			.map_err(|e| {
				warn!(
					?e,
					sidecar = %sidecar_path.display(),
					"Ignoring malformed sidecar file;"
				);
			})
			.ok(),
		Err(e) if e.kind() == io::ErrorKind::NotFound => None,
		Err(e) => {
			warn!(?e, sidecar = %sidecar_path.display(), "Failed to read sidecar file;");
			None
		}
	}
}

#[async_trait]
impl StorageGateway for LocalStorage {
	async fn list(&self, path: &Path) -> Result<Vec<RawEntry>, StorageError> {
		let mut read_dir = fs::read_dir(path)
			.await
			.map_err(|e| StorageError::io(path, e, "failed to read directory"))?;

		let mut entries = vec![];

		while let Some(entry) = read_dir
			.next_entry()
			.await
			.map_err(|e| StorageError::io(path, e, "failed to read directory entry"))?
		{
			let entry_path = entry.path();

			let metadata = match entry.metadata().await {
				Ok(metadata) => metadata,
				Err(e) => {
					warn!(?e, path = %entry_path.display(), "Skipping entry without metadata;");
					continue;
				}
			};

			let last_modified = metadata
				.modified()
				.map(DateTime::<Utc>::from)
				.unwrap_or_else(|_| Utc::now());

			let is_file = !metadata.is_dir();
			let sidecar = if paths::is_hidden_path(&entry_path) {
				None
			} else {
				read_sidecar(&entry_path).await
			};

			entries.push(RawEntry {
				size: if is_file { metadata.len() } else { 0 },
				path: entry_path,
				is_file,
				last_modified,
				sidecar,
			});
		}

		// Folders first, then by name
		entries.sort_by(|a, b| a.is_file.cmp(&b.is_file).then_with(|| a.path.cmp(&b.path)));

		trace!(path = %path.display(), count = entries.len(), "Listed directory");

		Ok(entries)
	}

	async fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
		fs::read(path)
			.await
			.map_err(|e| StorageError::io(path, e, "failed to read file"))
	}

	async fn write(&self, path: &Path, content: &[u8]) -> Result<(), StorageError> {
		fs::write(path, content)
			.await
			.map_err(|e| StorageError::io(path, e, "failed to write file"))
	}

	async fn create_directory(&self, path: &Path) -> Result<(), StorageError> {
		fs::create_dir(path)
			.await
			.map_err(|e| StorageError::io(path, e, "failed to create directory"))
	}

	async fn delete(&self, path: &Path) -> Result<(), StorageError> {
		let metadata = fs::symlink_metadata(path)
			.await
			.map_err(|e| StorageError::io(path, e, "failed to read metadata"))?;

		if metadata.is_dir() {
			fs::remove_dir_all(path)
				.await
				.map_err(|e| StorageError::io(path, e, "failed to delete directory"))
		} else {
			fs::remove_file(path)
				.await
				.map_err(|e| StorageError::io(path, e, "failed to delete file"))
		}
	}

	async fn rename(&self, from: &Path, to: &Path) -> Result<(), StorageError> {
		// Best effort: a target appearing between this check and the rename is
		// replaced wherever the platform rename overwrites
		if fs::try_exists(to)
			.await
			.map_err(|e| StorageError::io(to, e, "failed to check rename target"))?
		{
			return Err(StorageError::AlreadyExists(to.to_path_buf()));
		}

		fs::rename(from, to).await.map_err(|e| match e.kind() {
			io::ErrorKind::AlreadyExists => StorageError::AlreadyExists(to.to_path_buf()),
			_ => StorageError::io(from, e, "failed to rename"),
		})
	}

	async fn enable_object_store(&self, location: &Location) -> Result<(), StorageError> {
		debug!(location_id = %location.id, "Object store requested from local storage");
		Err(StorageError::Unsupported("object store"))
	}

	async fn disable_object_store(&self) {}

	fn is_object_store_active(&self) -> bool {
		false
	}

	fn watch(
		&self,
		path: &Path,
		events_tx: mpsc::UnboundedSender<WatchEvent>,
	) -> Result<Box<dyn WatcherHandle>, StorageError> {
		let watcher = FsWatcher::watch(path, self.watcher_config.clone())?;

		Ok(Box::new(LocalWatcherHandle {
			root: path.to_path_buf(),
			task: tokio::spawn(forward_events(watcher, events_tx)),
		}))
	}
}

#[derive(Debug)]
struct LocalWatcherHandle {
	root: PathBuf,
	task: JoinHandle<()>,
}

impl WatcherHandle for LocalWatcherHandle {
	fn root(&self) -> &Path {
		&self.root
	}
}

impl Drop for LocalWatcherHandle {
	fn drop(&mut self) {
		// Aborting drops the FsWatcher, which stops the native watch
		self.task.abort();
	}
}

async fn forward_events(mut watcher: FsWatcher, events_tx: mpsc::UnboundedSender<WatchEvent>) {
	while let Some(event) = watcher.recv().await {
		if events_tx.send(into_watch_event(event)).is_err() {
			debug!(root = %watcher.root().display(), "Watch event receiver dropped");
			break;
		}
	}

	watcher.stop().await;
}

fn into_watch_event(event: FsEvent) -> WatchEvent {
	let FsEvent {
		kind,
		path,
		is_directory,
	} = event;

	match kind {
		FsEventKind::Create => WatchEvent::Created {
			path,
			is_dir: is_directory.unwrap_or(false),
		},
		FsEventKind::Modify => WatchEvent::Modified { path },
		FsEventKind::Remove => WatchEvent::Removed { path },
		FsEventKind::Rename { from } => WatchEvent::Renamed { from, to: path },
	}
}
