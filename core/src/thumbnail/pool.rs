use std::{
	path::{Path, PathBuf},
	sync::Arc,
};

use async_channel as chan;
use async_trait::async_trait;
use futures::future::join_all;
use tokio::{
	sync::oneshot,
	task::{spawn_blocking, JoinHandle},
};
use tracing::{debug, trace};

use super::{ThumbnailBackend, ThumbnailError, ThumbnailOutcome, ThumbnailResult};

/// Produces the thumbnail pixels. Runs on blocking threads.
pub trait ThumbnailGenerator: Send + Sync + 'static {
	/// Generate a thumbnail for `path` and return where it got written, an
	/// empty path means there is nothing to show for this file.
	fn generate(&self, path: &Path) -> Result<PathBuf, ThumbnailError>;
}

impl<F> ThumbnailGenerator for F
where
	F: Fn(&Path) -> Result<PathBuf, ThumbnailError> + Send + Sync + 'static,
{
	fn generate(&self, path: &Path) -> Result<PathBuf, ThumbnailError> {
		self(path)
	}
}

struct WorkItem {
	path: PathBuf,
	reply_tx: oneshot::Sender<ThumbnailOutcome>,
}

/// Fixed set of workers sharing one queue
#[derive(Debug)]
pub struct ThumbnailWorkerPool {
	items_tx: chan::Sender<WorkItem>,
	workers: Vec<JoinHandle<()>>,
}

impl ThumbnailWorkerPool {
	/// Must be called from within a tokio runtime, at least one worker is spawned
	pub fn new(generator: impl ThumbnailGenerator, workers_count: usize) -> Self {
		Self::with_shared_generator(Arc::new(generator), workers_count)
	}

	pub fn with_shared_generator(generator: Arc<dyn ThumbnailGenerator>, workers_count: usize) -> Self {
		let workers_count = workers_count.max(1);
		let (items_tx, items_rx) = chan::bounded(workers_count * 4);

		let workers = (0..workers_count)
			.map(|worker_id| {
				tokio::spawn(run_worker(
					worker_id,
					Arc::clone(&generator),
					items_rx.clone(),
				))
			})
			.collect();

		debug!(workers_count, "Started thumbnail worker pool");

		Self { items_tx, workers }
	}

	pub fn workers_count(&self) -> usize {
		self.workers.len()
	}

	async fn submit(&self, path: PathBuf) -> Result<oneshot::Receiver<ThumbnailOutcome>, ThumbnailError> {
		let (reply_tx, reply_rx) = oneshot::channel();

		self.items_tx
			.send(WorkItem { path, reply_tx })
			.await
			.map_err(|_| ThumbnailError::PoolClosed)?;

		Ok(reply_rx)
	}
}

impl Drop for ThumbnailWorkerPool {
	fn drop(&mut self) {
		// Workers finish their current item and leave once the queue is closed
		self.items_tx.close();
	}
}

async fn run_worker(
	worker_id: usize,
	generator: Arc<dyn ThumbnailGenerator>,
	items_rx: chan::Receiver<WorkItem>,
) {
	while let Ok(WorkItem { path, reply_tx }) = items_rx.recv().await {
		trace!(worker_id, path = %path.display(), "Generating thumbnail");

		let outcome = generate_blocking(Arc::clone(&generator), path).await;

		// Nobody waiting anymore is fine, the batch got dropped
		let _ = reply_tx.send(outcome);
	}

	trace!(worker_id, "Thumbnail worker stopped");
}

async fn generate_blocking(generator: Arc<dyn ThumbnailGenerator>, path: PathBuf) -> ThumbnailOutcome {
	spawn_blocking(move || -> ThumbnailOutcome {
		let thumb_path = generator.generate(&path)?;
		Ok(ThumbnailResult { path, thumb_path })
	})
	.await
	.unwrap_or_else(|e| Err(ThumbnailError::from(e)))
}

async fn settle(reply_rx: oneshot::Receiver<ThumbnailOutcome>) -> ThumbnailOutcome {
	reply_rx.await.unwrap_or(Err(ThumbnailError::PoolClosed))
}

#[async_trait]
impl ThumbnailBackend for ThumbnailWorkerPool {
	fn has_worker_pool(&self) -> bool {
		true
	}

	async fn generate_batch(
		&self,
		paths: Vec<PathBuf>,
	) -> Result<Vec<ThumbnailOutcome>, ThumbnailError> {
		let mut replies = Vec::with_capacity(paths.len());
		for path in paths {
			replies.push(self.submit(path).await?);
		}

		Ok(join_all(replies.into_iter().map(settle)).await)
	}

	async fn generate_one(&self, path: PathBuf) -> ThumbnailOutcome {
		settle(self.submit(path).await?).await
	}
}

/// No pool, the coordinator runs one task per file and each one goes to the
/// blocking threads on its own
#[derive(Clone)]
pub struct BlockingThumbnailer {
	generator: Arc<dyn ThumbnailGenerator>,
}

impl BlockingThumbnailer {
	pub fn new(generator: impl ThumbnailGenerator) -> Self {
		Self::with_shared_generator(Arc::new(generator))
	}

	pub fn with_shared_generator(generator: Arc<dyn ThumbnailGenerator>) -> Self {
		Self { generator }
	}
}

impl std::fmt::Debug for BlockingThumbnailer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BlockingThumbnailer").finish_non_exhaustive()
	}
}

#[async_trait]
impl ThumbnailBackend for BlockingThumbnailer {
	fn has_worker_pool(&self) -> bool {
		false
	}

	async fn generate_batch(
		&self,
		paths: Vec<PathBuf>,
	) -> Result<Vec<ThumbnailOutcome>, ThumbnailError> {
		Ok(join_all(paths.into_iter().map(|path| self.generate_one(path))).await)
	}

	async fn generate_one(&self, path: PathBuf) -> ThumbnailOutcome {
		generate_blocking(Arc::clone(&self.generator), path).await
	}
}
