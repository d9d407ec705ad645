//! Fakes shared by the integration tests
#![allow(dead_code)]

use std::{
	collections::{HashMap, HashSet},
	io,
	path::{Path, PathBuf},
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc, Mutex,
	},
};

use async_trait::async_trait;
use tagdeck_core::{
	config::ExplorerSettings,
	domain::{paths, DirectoryEntry, EntryMetaPatch, Location, Tag},
	index::{IndexError, IndexService},
	storage::{RawEntry, StorageError, StorageGateway, WatchEvent, WatcherHandle},
	thumbnail::{ThumbnailBackend, ThumbnailError, ThumbnailOutcome, ThumbnailResult},
	Explorer, SessionState,
};
use tokio::sync::{mpsc, Notify};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
	Write(PathBuf, String),
	CreateDirectory(PathBuf),
	Delete(PathBuf),
	Rename(PathBuf, PathBuf),
	EnableObjectStore(Uuid),
	DisableObjectStore,
}

/// In-memory storage with scripted listings
#[derive(Debug, Default)]
pub struct MockStorage {
	listings: Mutex<HashMap<PathBuf, Vec<RawEntry>>>,
	files: Mutex<HashMap<PathBuf, Vec<u8>>>,
	failing: Mutex<HashSet<PathBuf>>,
	gates: Mutex<HashMap<PathBuf, Arc<Notify>>>,
	calls: Mutex<Vec<StorageCall>>,
	watch_tx: Mutex<Option<mpsc::UnboundedSender<WatchEvent>>>,
	fail_object_store: AtomicBool,
	object_store_active: AtomicBool,
}

impl MockStorage {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn set_listing(&self, dir: impl Into<PathBuf>, entries: Vec<RawEntry>) {
		self.listings.lock().unwrap().insert(dir.into(), entries);
	}

	pub fn set_file(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
		self.files.lock().unwrap().insert(path.into(), content.into());
	}

	/// Every operation touching `path` fails from now on
	pub fn fail_on(&self, path: impl Into<PathBuf>) {
		self.failing.lock().unwrap().insert(path.into());
	}

	pub fn fail_object_store(&self) {
		self.fail_object_store.store(true, Ordering::SeqCst);
	}

	/// Listing `dir` blocks until [`MockStorage::release`] is called
	pub fn gate(&self, dir: impl Into<PathBuf>) {
		self.gates
			.lock()
			.unwrap()
			.insert(dir.into(), Arc::new(Notify::new()));
	}

	pub fn release(&self, dir: impl AsRef<Path>) {
		if let Some(gate) = self.gates.lock().unwrap().get(dir.as_ref()) {
			gate.notify_one();
		}
	}

	pub fn calls(&self) -> Vec<StorageCall> {
		self.calls.lock().unwrap().clone()
	}

	pub fn file(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
		self.files.lock().unwrap().get(path.as_ref()).cloned()
	}

	/// Sends a watch event as if it came from the filesystem
	pub fn emit(&self, event: WatchEvent) {
		let watch_tx = self.watch_tx.lock().unwrap();
		watch_tx
			.as_ref()
			.expect("nothing is watched")
			.send(event)
			.expect("watch bridge is gone");
	}

	pub fn is_watched(&self) -> bool {
		self.watch_tx
			.lock()
			.unwrap()
			.as_ref()
			.is_some_and(|watch_tx| !watch_tx.is_closed())
	}

	fn record(&self, call: StorageCall) {
		self.calls.lock().unwrap().push(call);
	}

	fn check(&self, path: &Path) -> Result<(), StorageError> {
		if self.failing.lock().unwrap().contains(path) {
			return Err(StorageError::io(
				path,
				io::Error::new(io::ErrorKind::PermissionDenied, "mock failure"),
				"Mock storage refused",
			));
		}

		Ok(())
	}
}

#[derive(Debug)]
struct MockWatcher {
	root: PathBuf,
}

impl WatcherHandle for MockWatcher {
	fn root(&self) -> &Path {
		&self.root
	}
}

#[async_trait]
impl StorageGateway for MockStorage {
	async fn list(&self, path: &Path) -> Result<Vec<RawEntry>, StorageError> {
		let gate = self.gates.lock().unwrap().get(path).cloned();
		if let Some(gate) = gate {
			gate.notified().await;
		}

		self.check(path)?;

		self.listings
			.lock()
			.unwrap()
			.get(path)
			.cloned()
			.ok_or_else(|| StorageError::NotFound(path.to_path_buf()))
	}

	async fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
		self.check(path)?;
		self.file(path)
			.ok_or_else(|| StorageError::NotFound(path.to_path_buf()))
	}

	async fn write(&self, path: &Path, content: &[u8]) -> Result<(), StorageError> {
		self.check(path)?;
		self.record(StorageCall::Write(
			path.to_path_buf(),
			String::from_utf8_lossy(content).to_string(),
		));
		self.set_file(path, content);
		Ok(())
	}

	async fn create_directory(&self, path: &Path) -> Result<(), StorageError> {
		self.check(path)?;
		self.record(StorageCall::CreateDirectory(path.to_path_buf()));
		Ok(())
	}

	async fn delete(&self, path: &Path) -> Result<(), StorageError> {
		self.check(path)?;
		self.record(StorageCall::Delete(path.to_path_buf()));
		self.files.lock().unwrap().remove(path);
		Ok(())
	}

	async fn rename(&self, from: &Path, to: &Path) -> Result<(), StorageError> {
		self.check(from)?;
		self.record(StorageCall::Rename(from.to_path_buf(), to.to_path_buf()));
		Ok(())
	}

	async fn enable_object_store(&self, location: &Location) -> Result<(), StorageError> {
		self.record(StorageCall::EnableObjectStore(location.id));
		// Half way through, like a client that connected but got rejected
		self.object_store_active.store(true, Ordering::SeqCst);

		if self.fail_object_store.load(Ordering::SeqCst) {
			return Err(StorageError::ObjectStore {
				location_id: location.id,
				reason: "access denied".to_string(),
			});
		}

		Ok(())
	}

	async fn disable_object_store(&self) {
		self.record(StorageCall::DisableObjectStore);
		self.object_store_active.store(false, Ordering::SeqCst);
	}

	fn is_object_store_active(&self) -> bool {
		self.object_store_active.load(Ordering::SeqCst)
	}

	fn watch(
		&self,
		path: &Path,
		events_tx: mpsc::UnboundedSender<WatchEvent>,
	) -> Result<Box<dyn WatcherHandle>, StorageError> {
		self.check(path)?;
		*self.watch_tx.lock().unwrap() = Some(events_tx);
		Ok(Box::new(MockWatcher {
			root: path.to_path_buf(),
		}))
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexCall {
	Build { root: PathBuf, full_text: bool },
	Load(PathBuf),
	Clear,
	Create(PathBuf),
	Rename(PathBuf, PathBuf),
	Delete(PathBuf),
	TagsUpdated(PathBuf, Vec<String>),
	MetaUpdated(PathBuf),
}

/// Index that only remembers what it was told
#[derive(Debug, Default)]
pub struct RecordingIndex {
	calls: Mutex<Vec<IndexCall>>,
	failing: AtomicBool,
}

impl RecordingIndex {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn calls(&self) -> Vec<IndexCall> {
		self.calls.lock().unwrap().clone()
	}

	pub fn fail(&self) {
		self.failing.store(true, Ordering::SeqCst);
	}

	fn record(&self, call: IndexCall) -> Result<(), IndexError> {
		self.calls.lock().unwrap().push(call);

		if self.failing.load(Ordering::SeqCst) {
			return Err(IndexError::Update("mock failure".to_string()));
		}

		Ok(())
	}
}

#[async_trait]
impl IndexService for RecordingIndex {
	async fn build(&self, root: &Path, full_text: bool) -> Result<(), IndexError> {
		self.record(IndexCall::Build {
			root: root.to_path_buf(),
			full_text,
		})
	}

	async fn load(&self, root: &Path) -> Result<(), IndexError> {
		self.record(IndexCall::Load(root.to_path_buf()))
	}

	async fn clear(&self) -> Result<(), IndexError> {
		self.record(IndexCall::Clear)
	}

	async fn on_create(&self, entry: &DirectoryEntry) -> Result<(), IndexError> {
		self.record(IndexCall::Create(entry.path.clone()))
	}

	async fn on_rename(&self, from: &Path, to: &Path) -> Result<(), IndexError> {
		self.record(IndexCall::Rename(from.to_path_buf(), to.to_path_buf()))
	}

	async fn on_delete(&self, path: &Path) -> Result<(), IndexError> {
		self.record(IndexCall::Delete(path.to_path_buf()))
	}

	async fn on_tags_updated(&self, path: &Path, tags: &[Tag]) -> Result<(), IndexError> {
		self.record(IndexCall::TagsUpdated(
			path.to_path_buf(),
			tags.iter().map(|tag| tag.title.clone()).collect(),
		))
	}

	async fn on_meta_updated(&self, path: &Path, _patch: &EntryMetaPatch) -> Result<(), IndexError> {
		self.record(IndexCall::MetaUpdated(path.to_path_buf()))
	}
}

/// Thumbnails written next to the entry, with scripted failures
#[derive(Debug, Default)]
pub struct MockThumbnails {
	worker_pool: bool,
	fail_batch: bool,
	failing: HashSet<PathBuf>,
	panicking: HashSet<PathBuf>,
	empty: HashSet<PathBuf>,
	gate: Option<Arc<Notify>>,
	requested: Mutex<Vec<PathBuf>>,
}

impl MockThumbnails {
	pub fn pooled() -> Self {
		Self {
			worker_pool: true,
			..Default::default()
		}
	}

	pub fn one_by_one() -> Self {
		Self::default()
	}

	pub fn failing_for(mut self, path: impl Into<PathBuf>) -> Self {
		self.failing.insert(path.into());
		self
	}

	pub fn panicking_for(mut self, path: impl Into<PathBuf>) -> Self {
		self.panicking.insert(path.into());
		self
	}

	pub fn empty_for(mut self, path: impl Into<PathBuf>) -> Self {
		self.empty.insert(path.into());
		self
	}

	pub fn failing_batch(mut self) -> Self {
		self.fail_batch = true;
		self
	}

	/// Generation waits for a `notify_one` on the returned gate
	pub fn gated(mut self) -> (Self, Arc<Notify>) {
		let gate = Arc::new(Notify::new());
		self.gate = Some(Arc::clone(&gate));
		(self, gate)
	}

	pub fn requested(&self) -> Vec<PathBuf> {
		self.requested.lock().unwrap().clone()
	}

	fn outcome(&self, path: PathBuf) -> ThumbnailOutcome {
		self.requested.lock().unwrap().push(path.clone());

		if self.panicking.contains(&path) {
			panic!("decoder crashed on {}", path.display());
		}

		if self.failing.contains(&path) {
			return Err(ThumbnailError::Generation {
				path,
				reason: "unsupported format".to_string(),
			});
		}

		if self.empty.contains(&path) {
			return Ok(ThumbnailResult::new(path, PathBuf::new()));
		}

		let thumb_path = paths::thumbnail_path(&path).unwrap_or_default();
		Ok(ThumbnailResult::new(path, thumb_path))
	}
}

#[async_trait]
impl ThumbnailBackend for MockThumbnails {
	fn has_worker_pool(&self) -> bool {
		self.worker_pool
	}

	async fn generate_batch(&self, paths: Vec<PathBuf>) -> Result<Vec<ThumbnailOutcome>, ThumbnailError> {
		if let Some(gate) = &self.gate {
			gate.notified().await;
		}

		if self.fail_batch {
			return Err(ThumbnailError::Batch("worker crashed".to_string()));
		}

		Ok(paths.into_iter().map(|path| self.outcome(path)).collect())
	}

	async fn generate_one(&self, path: PathBuf) -> ThumbnailOutcome {
		self.outcome(path)
	}
}

pub fn settings() -> ExplorerSettings {
	ExplorerSettings {
		use_generate_thumbnails: false,
		..Default::default()
	}
}

pub fn explorer(storage: &Arc<MockStorage>) -> Explorer {
	Explorer::builder(Arc::clone(storage) as Arc<dyn StorageGateway>)
		.with_settings(settings())
		.build()
}

pub fn explorer_with_index(storage: &Arc<MockStorage>, index: &Arc<RecordingIndex>) -> Explorer {
	Explorer::builder(Arc::clone(storage) as Arc<dyn StorageGateway>)
		.with_index(Arc::clone(index) as Arc<dyn IndexService>)
		.with_settings(settings())
		.build()
}

pub fn names(state: &SessionState) -> Vec<&str> {
	state.entry_names()
}
