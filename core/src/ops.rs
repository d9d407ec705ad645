//! User initiated file operations
//!
//! Each operation goes through the storage gateway first and is then reflected
//! into the session, no directory gets listed again. Successful changes are
//! announced with a notification shown before the reflection lands.

use crate::{
	config::ExplorerSettings,
	domain::{paths, OpenedEntry},
	error::SessionError,
	file_types::FileTypeRegistry,
	reflect::EntryReflector,
	session::{selectors, Notification, SessionEvent, SessionState, SessionStore},
	storage::{StorageError, StorageGateway},
};

use std::{
	path::{Path, PathBuf},
	sync::Arc,
};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};

const HTML_BODY: &str = "<body></body>";

/// Kinds of files [`FileOperations::create_file_advanced`] knows how to create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NewFileKind {
	Md,
	Txt,
	Html,
}

impl NewFileKind {
	pub fn extension(self) -> &'static str {
		match self {
			Self::Md => "md",
			Self::Txt => "txt",
			Self::Html => "html",
		}
	}
}

#[derive(Clone)]
pub struct FileOperations {
	store: SessionStore,
	storage: Arc<dyn StorageGateway>,
	reflector: EntryReflector,
	file_types: Arc<FileTypeRegistry>,
	settings: Arc<ExplorerSettings>,
}

impl std::fmt::Debug for FileOperations {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FileOperations")
			.field("file_types", &self.file_types.len())
			.finish_non_exhaustive()
	}
}

impl FileOperations {
	pub fn new(
		store: SessionStore,
		storage: Arc<dyn StorageGateway>,
		reflector: EntryReflector,
		file_types: Arc<FileTypeRegistry>,
		settings: Arc<ExplorerSettings>,
	) -> Self {
		Self {
			store,
			storage,
			reflector,
			file_types,
			settings,
		}
	}

	fn notify(&self, notification: Notification) {
		self.store
			.dispatch(SessionEvent::NotificationShown(notification));
	}

	fn ensure_writable(&self) -> Result<(), SessionError> {
		if self.store.snapshot().is_read_only {
			warn!("Refusing to change a read-only location");
			self.notify(Notification::warning("The current location is read-only"));
			return Err(SessionError::ReadOnly);
		}

		Ok(())
	}

	fn storage_failure(&self, e: StorageError, text: impl Into<String>) -> SessionError {
		error!(?e, "File operation failed;");
		self.notify(Notification::error(text));
		SessionError::FileOperationFailure(e)
	}

	#[instrument(skip_all, fields(path = %path.display()))]
	pub async fn create_directory(&self, path: &Path) -> Result<Arc<SessionState>, SessionError> {
		self.ensure_writable()?;

		self.storage
			.create_directory(path)
			.await
			.map_err(|e| {
				self.storage_failure(
					e,
					format!("Failed to create directory {}", paths::entry_name(path)),
				)
			})?;

		self.notify(Notification::success(format!(
			"Creating directory {} successful",
			paths::entry_name(path)
		)));

		self.reflector.reflect_create(path, false).await
	}

	/// Create an empty, timestamped text file in the current directory and open it
	pub async fn create_file(&self) -> Result<PathBuf, SessionError> {
		self.ensure_writable()?;

		let Some(directory) = self.store.snapshot().current_directory_path.clone() else {
			warn!("No directory to create the file in");
			self.notify(Notification::warning("Open a folder first"));
			return Err(SessionError::NoDirectoryOpened);
		};

		let path = directory.join(format!(
			"textfile[{}].txt",
			Local::now().format("%Y%m%d~%H%M%S")
		));

		self.write_new_file(&path, b"").await?;
		self.open_entry(&path, true, false).await?;

		Ok(path)
	}

	#[instrument(skip_all, fields(target = %target.display(), name = %name, kind = %kind))]
	pub async fn create_file_advanced(
		&self,
		target: &Path,
		name: &str,
		content: &str,
		kind: NewFileKind,
	) -> Result<PathBuf, SessionError> {
		self.ensure_writable()?;

		let path = target.join(format!("{name}.{}", kind.extension()));

		let content = match kind {
			NewFileKind::Html => self
				.settings
				.new_html_file_content
				.replacen(HTML_BODY, &format!("<body>{content}</body>"), 1),
			NewFileKind::Md | NewFileKind::Txt => content.to_string(),
		};

		self.write_new_file(&path, content.as_bytes()).await?;
		self.open_entry(&path, true, true).await?;
		self.set_selected_entries(vec![path.clone()]).await?;

		Ok(path)
	}

	async fn write_new_file(&self, path: &Path, content: &[u8]) -> Result<(), SessionError> {
		self.storage.write(path, content).await.map_err(|e| {
			self.storage_failure(e, format!("Failed to create file {}", paths::entry_name(path)))
		})?;

		self.notify(Notification::success(format!(
			"File '{}' created",
			paths::entry_name(path)
		)));

		self.reflector.reflect_create(path, true).await?;

		Ok(())
	}

	#[instrument(skip_all, fields(path = %path.display()))]
	pub async fn delete_file(&self, path: &Path) -> Result<Arc<SessionState>, SessionError> {
		self.ensure_writable()?;

		self.storage.delete(path).await.map_err(|e| {
			self.storage_failure(e, format!("Failed to delete file {}", paths::entry_name(path)))
		})?;

		self.notify(Notification::success(format!(
			"Deleting file {} successful",
			paths::entry_name(path)
		)));

		let state = self.reflector.reflect_delete(path).await?;

		for meta in [paths::sidecar_path(path), paths::thumbnail_path(path)]
			.into_iter()
			.flatten()
		{
			if let Err(e) = self.storage.delete(&meta).await {
				debug!(?e, meta = %meta.display(), "No meta file to delete;");
			}
		}

		Ok(state)
	}

	#[instrument(skip_all, fields(path = %path.display()))]
	pub async fn delete_directory(&self, path: &Path) -> Result<Arc<SessionState>, SessionError> {
		self.ensure_writable()?;

		self.storage.delete(path).await.map_err(|e| {
			self.storage_failure(
				e,
				format!("Failed to delete directory {}", paths::entry_name(path)),
			)
		})?;

		self.notify(Notification::success(format!(
			"Deleting directory {} successful",
			paths::entry_name(path)
		)));

		self.reflector.reflect_delete(path).await
	}

	#[instrument(skip_all, fields(from = %from.display(), to = %to.display()))]
	pub async fn rename_file(&self, from: &Path, to: &Path) -> Result<Arc<SessionState>, SessionError> {
		self.ensure_writable()?;

		self.storage.rename(from, to).await.map_err(|e| {
			self.storage_failure(e, format!("Failed to rename file {}", paths::entry_name(from)))
		})?;

		self.notify(Notification::success(format!(
			"Renaming file {} successful",
			paths::entry_name(from)
		)));

		let meta_moves = [
			(paths::sidecar_path(from), paths::sidecar_path(to)),
			(paths::thumbnail_path(from), paths::thumbnail_path(to)),
		];

		for (meta_from, meta_to) in meta_moves {
			let (Some(meta_from), Some(meta_to)) = (meta_from, meta_to) else {
				continue;
			};

			if let Err(e) = self.storage.rename(&meta_from, &meta_to).await {
				debug!(?e, meta = %meta_from.display(), "Meta file not renamed;");
			}
		}

		self.reflector.reflect_rename(from, to).await
	}

	/// Rename a directory inside its parent, returning the new path
	#[instrument(skip_all, fields(path = %path.display(), new_name = %new_name))]
	pub async fn rename_directory(&self, path: &Path, new_name: &str) -> Result<PathBuf, SessionError> {
		self.ensure_writable()?;

		if new_name.is_empty() || new_name.contains(['/', '\\']) || new_name == "." || new_name == ".." {
			warn!("Invalid directory name");
			self.notify(Notification::warning(format!(
				"'{new_name}' is not a valid name"
			)));
			return Err(SessionError::InvalidName(new_name.to_string()));
		}

		let new_path = path
			.parent()
			.map_or_else(|| PathBuf::from(new_name), |parent| parent.join(new_name));

		self.storage.rename(path, &new_path).await.map_err(|e| {
			self.storage_failure(
				e,
				format!("Failed to rename directory {}", paths::entry_name(path)),
			)
		})?;

		self.notify(Notification::success(format!(
			"Renaming directory {} successful",
			paths::entry_name(path)
		)));

		self.reflector.reflect_rename(path, &new_path).await?;

		Ok(new_path)
	}

	/// Open `path` in its viewer, or in its editor when asked for and there is one
	pub async fn open_entry(
		&self,
		path: &Path,
		is_file: bool,
		edit_mode: bool,
	) -> Result<Arc<SessionState>, SessionError> {
		let capability = self
			.file_types
			.resolve(&paths::entry_extension(path, is_file), is_file);

		let color = self
			.store
			.snapshot()
			.entry(path)
			.and_then(|entry| entry.color.clone())
			.or(capability.color);

		let entry = OpenedEntry {
			path: path.to_path_buf(),
			is_file,
			edit_mode: edit_mode && capability.editor.is_some(),
			viewer: capability.viewer,
			editor: capability.editor,
			changed: false,
			should_reload: false,
			color,
		};

		debug!(path = %path.display(), viewer = %entry.viewer.id, edit_mode = entry.edit_mode, "Opening entry");

		self.store.dispatch(SessionEvent::EntryOpened { entry });
		self.set_last_selected_entry(Some(path.to_path_buf())).await
	}

	pub async fn close_all_entries(&self) -> Result<Arc<SessionState>, SessionError> {
		self.store.apply(SessionEvent::AllEntriesClosed).await
	}

	pub async fn set_selected_entries(&self, paths: Vec<PathBuf>) -> Result<Arc<SessionState>, SessionError> {
		self.store
			.apply(SessionEvent::SelectionChanged { paths })
			.await
	}

	pub async fn set_last_selected_entry(
		&self,
		path: Option<PathBuf>,
	) -> Result<Arc<SessionState>, SessionError> {
		self.store
			.apply(SessionEvent::LastSelectedEntrySet { path })
			.await
	}

	/// Open the file after `pivot`, wrapping around, `None` when there is nothing to open
	pub async fn open_next_entry(&self, pivot: Option<&Path>) -> Result<Option<PathBuf>, SessionError> {
		let state = self.store.snapshot();
		let next = selectors::next_file(&state, pivot).map(|entry| entry.path.clone());
		self.open_step(next).await
	}

	pub async fn open_prev_entry(&self, pivot: Option<&Path>) -> Result<Option<PathBuf>, SessionError> {
		let state = self.store.snapshot();
		let prev = selectors::prev_file(&state, pivot).map(|entry| entry.path.clone());
		self.open_step(prev).await
	}

	async fn open_step(&self, path: Option<PathBuf>) -> Result<Option<PathBuf>, SessionError> {
		let Some(path) = path else {
			return Ok(None);
		};

		self.open_entry(&path, true, false).await?;
		self.set_selected_entries(vec![path.clone()]).await?;

		Ok(Some(path))
	}
}
