//! Location sessions
//!
//! Opening a location switches storage modes, loads the root directory, brings
//! the index up to date and starts watching local roots for changes. Only one
//! location is active at a time.

use crate::{
	config::ExplorerSettings,
	domain::{ActiveLocation, Location, LocationKind},
	error::SessionError,
	index::IndexService,
	loader::{DirectoryLoad, DirectoryLoader},
	reflect::EntryReflector,
	session::{Notification, SessionEvent, SessionState, SessionStore},
	storage::StorageGateway,
};

use std::{collections::HashMap, path::Path, sync::Arc};

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

mod watcher;

use watcher::{bridge_events, ActiveWatcher};

/// Where the session stands, derived from the open location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SessionPhase {
	NoLocation,
	LocalActive,
	CloudActive,
}

impl From<&SessionState> for SessionPhase {
	fn from(state: &SessionState) -> Self {
		match state.current_location.as_ref().map(|location| location.kind) {
			None => Self::NoLocation,
			Some(LocationKind::Local) => Self::LocalActive,
			Some(LocationKind::Cloud) => Self::CloudActive,
		}
	}
}

/// Only switching to another location needs a new index
pub fn should_rebuild_index(previous: Option<Uuid>, new: Uuid) -> bool {
	previous != Some(new)
}

pub struct LocationSession {
	store: SessionStore,
	storage: Arc<dyn StorageGateway>,
	index: Arc<dyn IndexService>,
	loader: DirectoryLoader,
	reflector: EntryReflector,
	settings: Arc<ExplorerSettings>,
	locations: RwLock<HashMap<Uuid, Location>>,
	watcher: Mutex<Option<ActiveWatcher>>,
}

impl std::fmt::Debug for LocationSession {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LocationSession")
			.field("loader", &self.loader)
			.finish_non_exhaustive()
	}
}

impl LocationSession {
	pub fn new(
		store: SessionStore,
		storage: Arc<dyn StorageGateway>,
		index: Arc<dyn IndexService>,
		loader: DirectoryLoader,
		reflector: EntryReflector,
		settings: Arc<ExplorerSettings>,
	) -> Self {
		Self {
			store,
			storage,
			index,
			loader,
			reflector,
			settings,
			locations: RwLock::default(),
			watcher: Mutex::default(),
		}
	}

	pub fn phase(&self) -> SessionPhase {
		SessionPhase::from(self.store.snapshot().as_ref())
	}

	pub async fn register_location(&self, location: Location) {
		debug!(location_id = %location.id, name = %location.name, "Registering location");
		self.locations.write().await.insert(location.id, location);
	}

	pub async fn locations(&self) -> Vec<Location> {
		self.locations.read().await.values().cloned().collect()
	}

	pub async fn open_location_by_id(&self, id: Uuid) -> Result<DirectoryLoad, SessionError> {
		let location = self.locations.read().await.get(&id).cloned();

		match location {
			Some(location) => self.open_location(&location).await,
			None => {
				warn!(location_id = %id, "Tried to open an unknown location");
				self.notify(Notification::warning("Location not found"));
				Err(SessionError::LocationNotFound(id))
			}
		}
	}

	#[instrument(skip_all, fields(location_id = %location.id, kind = %location.kind))]
	pub async fn open_location(&self, location: &Location) -> Result<DirectoryLoad, SessionError> {
		self.stop_watcher().await;

		let Some(root) = location.root() else {
			warn!("Location has no root path");
			self.notify(Notification::warning(format!(
				"Location {} has no path",
				location.name
			)));
			return Err(SessionError::MissingRootPath(location.id));
		};

		let previous = self.store.snapshot().current_location_id();

		match location.kind {
			LocationKind::Cloud => {
				if let Err(e) = self.storage.enable_object_store(location).await {
					error!(?e, "Failed to activate object store;");
					self.storage.disable_object_store().await;
					self.notify(Notification::error(format!(
						"Could not connect to location {}",
						location.name
					)));
					return Err(SessionError::ObjectStoreActivationFailure {
						location_id: location.id,
						source: e,
					});
				}
			}
			LocationKind::Local => self.storage.disable_object_store().await,
		}

		self.store
			.apply(SessionEvent::LocationOpened {
				location: ActiveLocation {
					id: location.id,
					kind: location.kind,
					root: root.to_path_buf(),
				},
				is_read_only: location.is_read_only,
			})
			.await?;

		let rebuild_index = should_rebuild_index(previous, location.id);

		let (load, ()) = futures::join!(self.loader.load_directory(root), async {
			if rebuild_index {
				self.refresh_index(location, root).await;
			}
		});

		// Only when nothing more important is on screen
		if location.kind == LocationKind::Cloud
			&& load.is_ok()
			&& self.store.sync().await?.notification.is_none()
		{
			self.notify(Notification::success("Connected to object store"));
		}

		if location.kind == LocationKind::Local && location.watch_for_changes {
			self.start_watcher(root).await;
		}

		info!(rebuild_index, "Opened location");

		load
	}

	/// Close the location if it is the open one, returns whether anything happened
	#[instrument(skip(self))]
	pub async fn close_location(&self, id: Uuid) -> Result<bool, SessionError> {
		if self.store.snapshot().current_location_id() != Some(id) {
			debug!("Location is not the open one, nothing to close");
			return Ok(false);
		}

		self.store
			.apply(SessionEvent::LocationClosed { id })
			.await?;

		if let Err(e) = self.index.clear().await {
			warn!(?e, "Failed to clear the index;");
			self.notify(Notification::warning("Search index could not be cleared"));
		}

		self.stop_watcher().await;

		info!("Closed location");

		Ok(true)
	}

	async fn refresh_index(&self, location: &Location, root: &Path) {
		let result = if location.persist_index {
			self.index.load(root).await
		} else {
			self.index.build(root, location.full_text_index).await
		};

		if let Err(e) = result {
			warn!(?e, persist_index = location.persist_index, "Failed to prepare the index;");
			self.notify(Notification::warning("Search index could not be prepared"));
		}
	}

	/// Replaces the running watcher, if any
	pub async fn start_watcher(&self, root: &Path) {
		let (events_tx, events_rx) = mpsc::unbounded_channel();

		let handle = match self.storage.watch(root, events_tx) {
			Ok(handle) => handle,
			Err(e) => {
				error!(?e, root = %root.display(), "Failed to watch location;");
				self.notify(Notification::warning("Changes in this location are not tracked"));
				return;
			}
		};

		let bridge = tokio::spawn(bridge_events(
			events_rx,
			self.reflector.clone(),
			self.settings.show_unix_hidden_entries,
		));

		// The previous watcher stops when dropped here
		*self.watcher.lock().await = Some(ActiveWatcher { handle, bridge });
		debug!(root = %root.display(), "Watching location");
	}

	pub async fn stop_watcher(&self) {
		if self.watcher.lock().await.take().is_some() {
			debug!("Stopped location watcher");
		}
	}

	pub async fn is_watching(&self) -> bool {
		self.watcher.lock().await.is_some()
	}

	fn notify(&self, notification: Notification) {
		self.store
			.dispatch(SessionEvent::NotificationShown(notification));
	}
}
