//! Thumbnail generation coordination
//!
//! A backend either owns a worker pool, in which case a whole batch is handed
//! over at once, or it only knows how to do one file at a time and we spawn one
//! task per file. Either way every item settles on its own: whatever got
//! generated is merged into the listing even when other items failed.

use crate::session::{Notification, SessionEvent, SessionStore};

use std::{
	path::PathBuf,
	sync::{Arc, Mutex},
};

use async_trait::async_trait;
use futures::future::join_all;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, instrument, warn};

mod pool;

pub use pool::{BlockingThumbnailer, ThumbnailGenerator, ThumbnailWorkerPool};

#[derive(Debug, Error)]
pub enum ThumbnailError {
	#[error("failed to generate thumbnail for '{}': {reason}", .path.display())]
	Generation { path: PathBuf, reason: String },
	#[error("thumbnail batch failed: {0}")]
	Batch(String),
	#[error("thumbnail worker pool is shut down")]
	PoolClosed,
	#[error("thumbnail task panicked or got cancelled: {0}")]
	Join(#[from] JoinError),
}

/// A generated thumbnail for the entry at `path`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThumbnailResult {
	pub path: PathBuf,
	pub thumb_path: PathBuf,
}

impl ThumbnailResult {
	pub fn new(path: impl Into<PathBuf>, thumb_path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			thumb_path: thumb_path.into(),
		}
	}
}

pub type ThumbnailOutcome = Result<ThumbnailResult, ThumbnailError>;

#[async_trait]
pub trait ThumbnailBackend: Send + Sync + 'static {
	/// Whether [`ThumbnailBackend::generate_batch`] runs items in parallel
	fn has_worker_pool(&self) -> bool;

	/// One outcome per path. An `Err` means the batch as a whole failed.
	async fn generate_batch(
		&self,
		paths: Vec<PathBuf>,
	) -> Result<Vec<ThumbnailOutcome>, ThumbnailError>;

	async fn generate_one(&self, path: PathBuf) -> ThumbnailOutcome;
}

/// How a thumbnail job went
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThumbnailReport {
	pub generated: usize,
	pub failed: usize,
	pub batch_failed: bool,
}

/// Handle to a running thumbnail job
#[derive(Debug)]
pub struct ThumbnailJob {
	handle: JoinHandle<ThumbnailReport>,
}

impl ThumbnailJob {
	pub async fn wait(self) -> Result<ThumbnailReport, ThumbnailError> {
		Ok(self.handle.await?)
	}

	pub fn abort(&self) {
		self.handle.abort();
	}
}

#[derive(Clone)]
pub struct ThumbnailCoordinator {
	backend: Option<Arc<dyn ThumbnailBackend>>,
	store: SessionStore,
	running_jobs: Arc<Mutex<usize>>,
}

impl std::fmt::Debug for ThumbnailCoordinator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ThumbnailCoordinator")
			.field("has_backend", &self.backend.is_some())
			.finish_non_exhaustive()
	}
}

impl ThumbnailCoordinator {
	pub fn new(store: SessionStore, backend: Option<Arc<dyn ThumbnailBackend>>) -> Self {
		Self {
			backend,
			store,
			running_jobs: Arc::new(Mutex::new(0)),
		}
	}

	pub fn has_backend(&self) -> bool {
		self.backend.is_some()
	}

	/// Start generating thumbnails for `paths`, `None` when there is nothing to do
	pub fn generate(&self, paths: Vec<PathBuf>) -> Option<ThumbnailJob> {
		let backend = Arc::clone(self.backend.as_ref()?);
		if paths.is_empty() {
			return None;
		}

		let running = self.job_started();
		let store = self.store.clone();

		let handle = tokio::spawn(async move {
			// Lowered however the task ends, aborted and panicked jobs included
			let _running = running;
			run_job(&backend, &store, paths).await
		});

		Some(ThumbnailJob { handle })
	}

	// The flag follows the number of running jobs, toggled under the lock so
	// dispatch order matches counter order
	fn job_started(&self) -> RunningJob {
		let mut running = self.running_jobs.lock().unwrap_or_else(|e| e.into_inner());
		*running += 1;
		if *running == 1 {
			self.store
				.dispatch(SessionEvent::ThumbnailGenerationToggled(true));
		}

		RunningJob(self.clone())
	}

	fn job_finished(&self) {
		let mut running = self.running_jobs.lock().unwrap_or_else(|e| e.into_inner());
		*running = running.saturating_sub(1);
		if *running == 0 {
			self.store
				.dispatch(SessionEvent::ThumbnailGenerationToggled(false));
		}
	}
}

/// Counted in the running jobs until dropped
struct RunningJob(ThumbnailCoordinator);

impl Drop for RunningJob {
	fn drop(&mut self) {
		self.0.job_finished();
	}
}

/// One task per path, a panicking item only loses its own thumbnail
async fn generate_each(
	backend: &Arc<dyn ThumbnailBackend>,
	paths: Vec<PathBuf>,
) -> Vec<ThumbnailOutcome> {
	let handles = paths
		.into_iter()
		.map(|path| {
			let backend = Arc::clone(backend);
			tokio::spawn(async move { backend.generate_one(path).await })
		})
		.collect::<Vec<_>>();

	join_all(handles)
		.await
		.into_iter()
		.map(|joined| joined.unwrap_or_else(|e| Err(ThumbnailError::from(e))))
		.collect()
}

#[instrument(skip_all, fields(count = paths.len(), worker_pool = backend.has_worker_pool()))]
async fn run_job(
	backend: &Arc<dyn ThumbnailBackend>,
	store: &SessionStore,
	paths: Vec<PathBuf>,
) -> ThumbnailReport {
	let outcomes = if backend.has_worker_pool() {
		backend.generate_batch(paths).await
	} else {
		Ok(generate_each(backend, paths).await)
	};

	let outcomes = match outcomes {
		Ok(outcomes) => outcomes,
		Err(e) => {
			error!(?e, "Thumbnail batch failed;");
			store.dispatch(SessionEvent::NotificationShown(Notification::warning(
				"Generating thumbnails failed",
			)));
			return ThumbnailReport {
				batch_failed: true,
				..Default::default()
			};
		}
	};

	let mut results = Vec::with_capacity(outcomes.len());
	let mut failed = 0;

	for outcome in outcomes {
		match outcome {
			Ok(result) if result.thumb_path.as_os_str().is_empty() => {
				debug!(path = %result.path.display(), "No thumbnail produced");
			}
			Ok(result) => results.push(result),
			Err(e) => {
				warn!(?e, "Failed to generate thumbnail;");
				failed += 1;
			}
		}
	}

	let generated = results.len();
	if !results.is_empty() {
		store.dispatch(SessionEvent::ThumbnailsGenerated { results });
	}

	if failed > 0 {
		store.dispatch(SessionEvent::NotificationShown(Notification::warning(format!(
			"{failed} thumbnail(s) could not be generated"
		))));
	}

	debug!(generated, failed, "Thumbnail job settled");

	ThumbnailReport {
		generated,
		failed,
		batch_failed: false,
	}
}
