//! Directory loading
//!
//! Every load gets a token. Whatever finishes after a newer load started gets
//! discarded by the reducer, so racing loads never overwrite each other.

use crate::{
	config::ExplorerSettings,
	domain::{paths, DirectoryEntry, TagSyntax},
	error::SessionError,
	session::{LoadToken, Notification, SessionEvent, SessionState, SessionStore},
	sidecar::SidecarMeta,
	storage::StorageGateway,
	thumbnail::{ThumbnailCoordinator, ThumbnailJob},
};

use std::{
	path::{Path, PathBuf},
	sync::{
		atomic::{AtomicU64, Ordering},
		Arc,
	},
};

use tracing::{debug, instrument, trace, warn};

/// Outcome of [`DirectoryLoader::load_directory`]
#[derive(Debug)]
pub struct DirectoryLoad {
	pub token: LoadToken,
	pub path: PathBuf,
	/// False when a newer load took over before this one finished
	pub committed: bool,
	pub state: Arc<SessionState>,
	pub thumbnails: Option<ThumbnailJob>,
}

impl DirectoryLoad {
	pub fn entries(&self) -> &[DirectoryEntry] {
		&self.state.entries
	}
}

#[derive(Clone)]
pub struct DirectoryLoader {
	store: SessionStore,
	storage: Arc<dyn StorageGateway>,
	thumbnails: ThumbnailCoordinator,
	settings: Arc<ExplorerSettings>,
	syntax: TagSyntax,
	last_token: Arc<AtomicU64>,
}

impl std::fmt::Debug for DirectoryLoader {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DirectoryLoader")
			.field("last_token", &self.last_token)
			.finish_non_exhaustive()
	}
}

impl DirectoryLoader {
	pub fn new(
		store: SessionStore,
		storage: Arc<dyn StorageGateway>,
		thumbnails: ThumbnailCoordinator,
		settings: Arc<ExplorerSettings>,
	) -> Self {
		Self {
			syntax: TagSyntax::with_delimiter(&settings.tag_delimiter),
			store,
			storage,
			thumbnails,
			settings,
			last_token: Arc::new(AtomicU64::new(0)),
		}
	}

	fn next_token(&self) -> LoadToken {
		LoadToken::new(self.last_token.fetch_add(1, Ordering::SeqCst) + 1)
	}

	#[instrument(skip_all, fields(path = %path.as_ref().display()))]
	pub async fn load_directory(&self, path: impl AsRef<Path>) -> Result<DirectoryLoad, SessionError> {
		let path = path.as_ref().to_path_buf();
		let token = self.next_token();

		// Shows the empty listing right away, the color lands whenever it is read
		self.store.dispatch(SessionEvent::DirectoryLoadStarted {
			token,
			path: path.clone(),
		});
		self.spawn_directory_color(path.clone());

		let raw_entries = match self.storage.list(&path).await {
			Ok(raw_entries) => raw_entries,
			Err(e) => {
				warn!(?e, "Failed to list directory;");
				let state = self
					.store
					.apply(SessionEvent::DirectoryLoadFailed {
						token,
						path: path.clone(),
						reason: e.to_string(),
					})
					.await?;

				return Ok(DirectoryLoad {
					committed: is_committed(&state, token, &path),
					token,
					path,
					state,
					thumbnails: None,
				});
			}
		};

		let show_hidden = self.settings.show_unix_hidden_entries;
		let entries = raw_entries
			.into_iter()
			.filter(|raw| show_hidden || !paths::is_hidden_path(&raw.path))
			.map(|raw| DirectoryEntry::from_raw(raw, &self.syntax))
			.collect::<Vec<_>>();

		let eligible = if self.thumbnails_enabled() {
			entries
				.iter()
				.filter(|entry| entry.is_file)
				.map(|entry| entry.path.clone())
				.collect()
		} else {
			vec![]
		};

		let state = self
			.store
			.apply(SessionEvent::DirectoryLoaded {
				token,
				path: path.clone(),
				entries,
			})
			.await?;

		let committed = is_committed(&state, token, &path);
		if !committed {
			debug!(%token, "Discarding superseded directory load");
		}

		// Started after the commit so results always find their entries
		let thumbnails = committed
			.then(|| self.thumbnails.generate(eligible))
			.flatten();

		Ok(DirectoryLoad {
			token,
			path,
			committed,
			state,
			thumbnails,
		})
	}

	/// Load the parent of the current directory, as long as it stays inside the location
	pub async fn load_parent_directory(&self) -> Result<DirectoryLoad, SessionError> {
		let state = self.store.snapshot();

		let Some(current) = state.current_directory_path.as_deref() else {
			self.store
				.dispatch(SessionEvent::NotificationShown(Notification::warning(
					"Open a folder first",
				)));
			return Err(SessionError::NoDirectoryOpened);
		};

		let parent = current.parent().filter(|parent| {
			state
				.current_location
				.as_ref()
				.is_some_and(|location| location.contains(parent))
		});

		match parent {
			Some(parent) => self.load_directory(parent).await,
			None => {
				warn!(current = %current.display(), "Parent directory is not in the location");
				self.store
					.dispatch(SessionEvent::NotificationShown(Notification::warning(
						"The parent directory is not in the current location",
					)));
				Err(SessionError::ParentOutsideLocation(
					current.parent().unwrap_or(current).to_path_buf(),
				))
			}
		}
	}

	/// Show search results in place of the directory listing
	pub async fn show_search_results(
		&self,
		entries: Vec<DirectoryEntry>,
	) -> Result<Arc<SessionState>, SessionError> {
		self.store
			.apply(SessionEvent::SearchResultsShown { entries })
			.await
	}

	fn thumbnails_enabled(&self) -> bool {
		self.settings.use_generate_thumbnails
			&& self.thumbnails.has_backend()
			&& !self.storage.is_object_store_active()
	}

	fn spawn_directory_color(&self, path: PathBuf) {
		let storage = Arc::clone(&self.storage);
		let store = self.store.clone();

		tokio::spawn(async move {
			let meta_path = paths::folder_meta_path(&path);

			let color = match storage.read(&meta_path).await {
				Ok(bytes) => match SidecarMeta::from_slice(&bytes) {
					Ok(meta) => meta.color,
					Err(e) => {
						debug!(?e, meta = %meta_path.display(), "Malformed folder sidecar;");
						return;
					}
				},
				Err(e) => {
					trace!(?e, meta = %meta_path.display(), "No folder sidecar;");
					return;
				}
			};

			store.dispatch(SessionEvent::DirectoryColorLoaded { path, color });
		});
	}
}

fn is_committed(state: &SessionState, token: LoadToken, path: &Path) -> bool {
	state.load_token == token && state.is_current_directory(path)
}
