use crate::{
	config::ExplorerSettings,
	domain::TagSyntax,
	file_types::FileTypeRegistry,
	index::{IndexService, NullIndex},
	loader::DirectoryLoader,
	location::{LocationSession, SessionPhase},
	ops::FileOperations,
	reflect::EntryReflector,
	session::{SessionState, SessionStore},
	storage::StorageGateway,
	thumbnail::{
		BlockingThumbnailer, ThumbnailBackend, ThumbnailCoordinator, ThumbnailGenerator,
		ThumbnailWorkerPool,
	},
};

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

/// Wires the session store to its collaborators
pub struct ExplorerBuilder {
	storage: Arc<dyn StorageGateway>,
	index: Arc<dyn IndexService>,
	thumbnails: Option<Arc<dyn ThumbnailBackend>>,
	generator: Option<Arc<dyn ThumbnailGenerator>>,
	settings: ExplorerSettings,
}

impl ExplorerBuilder {
	pub fn new(storage: Arc<dyn StorageGateway>) -> Self {
		Self {
			storage,
			index: Arc::new(NullIndex),
			thumbnails: None,
			generator: None,
			settings: ExplorerSettings::default(),
		}
	}

	#[must_use]
	pub fn with_index(mut self, index: Arc<dyn IndexService>) -> Self {
		self.index = index;
		self
	}

	#[must_use]
	pub fn with_thumbnails(mut self, backend: Arc<dyn ThumbnailBackend>) -> Self {
		self.thumbnails = Some(backend);
		self
	}

	/// Thumbnails from `generator`, on a pool of `thumbnail_workers` workers or
	/// one task per file when that setting is 0. A backend given through
	/// [`ExplorerBuilder::with_thumbnails`] takes precedence.
	#[must_use]
	pub fn with_thumbnail_generator(mut self, generator: impl ThumbnailGenerator) -> Self {
		self.generator = Some(Arc::new(generator));
		self
	}

	#[must_use]
	pub fn with_settings(mut self, settings: ExplorerSettings) -> Self {
		self.settings = settings;
		self
	}

	/// Must be called from within a tokio runtime
	pub fn build(self) -> Explorer {
		let Self {
			storage,
			index,
			thumbnails,
			generator,
			settings,
		} = self;

		let thumbnails = thumbnails.or_else(|| {
			generator.map(|generator| thumbnail_backend(generator, settings.thumbnail_workers))
		});

		let settings = Arc::new(settings);
		let store = SessionStore::spawn(SessionState::default());
		let syntax = TagSyntax::with_delimiter(&settings.tag_delimiter);
		let file_types = Arc::new(FileTypeRegistry::from_settings(
			&settings.supported_file_types,
		));

		let loader = DirectoryLoader::new(
			store.clone(),
			Arc::clone(&storage),
			ThumbnailCoordinator::new(store.clone(), thumbnails),
			Arc::clone(&settings),
		);
		let reflector = EntryReflector::new(store.clone(), Arc::clone(&index), syntax);
		let files = FileOperations::new(
			store.clone(),
			Arc::clone(&storage),
			reflector.clone(),
			file_types,
			Arc::clone(&settings),
		);
		let locations = LocationSession::new(
			store.clone(),
			storage,
			index,
			loader.clone(),
			reflector.clone(),
			Arc::clone(&settings),
		);

		debug!("Explorer session ready");

		Explorer {
			store,
			loader,
			reflector,
			locations,
			files,
			settings,
		}
	}
}

fn thumbnail_backend(
	generator: Arc<dyn ThumbnailGenerator>,
	workers_count: usize,
) -> Arc<dyn ThumbnailBackend> {
	if workers_count == 0 {
		debug!("Generating thumbnails without a worker pool");
		Arc::new(BlockingThumbnailer::with_shared_generator(generator))
	} else {
		Arc::new(ThumbnailWorkerPool::with_shared_generator(
			generator,
			workers_count,
		))
	}
}

/// One explorer session: the state plus every operation that changes it
#[derive(Debug)]
pub struct Explorer {
	store: SessionStore,
	loader: DirectoryLoader,
	reflector: EntryReflector,
	locations: LocationSession,
	files: FileOperations,
	settings: Arc<ExplorerSettings>,
}

impl Explorer {
	pub fn builder(storage: Arc<dyn StorageGateway>) -> ExplorerBuilder {
		ExplorerBuilder::new(storage)
	}

	pub fn store(&self) -> &SessionStore {
		&self.store
	}

	pub fn snapshot(&self) -> Arc<SessionState> {
		self.store.snapshot()
	}

	pub fn subscribe(&self) -> watch::Receiver<Arc<SessionState>> {
		self.store.subscribe()
	}

	pub fn phase(&self) -> SessionPhase {
		self.locations.phase()
	}

	pub fn loader(&self) -> &DirectoryLoader {
		&self.loader
	}

	pub fn reflector(&self) -> &EntryReflector {
		&self.reflector
	}

	pub fn locations(&self) -> &LocationSession {
		&self.locations
	}

	pub fn files(&self) -> &FileOperations {
		&self.files
	}

	pub fn settings(&self) -> &ExplorerSettings {
		&self.settings
	}
}
