//! Search index seam
//!
//! The index itself lives elsewhere, the session only tells it what changed.

use crate::domain::{DirectoryEntry, EntryMetaPatch, Tag};

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum IndexError {
	#[error("failed to build index for '{}': {reason}", .root.display())]
	Build { root: PathBuf, reason: String },
	#[error("failed to load index for '{}': {reason}", .root.display())]
	Load { root: PathBuf, reason: String },
	#[error("index update failed: {0}")]
	Update(String),
}

#[async_trait]
pub trait IndexService: Send + Sync + 'static {
	/// Index everything below `root`, content included when `full_text` is set
	async fn build(&self, root: &Path, full_text: bool) -> Result<(), IndexError>;

	/// Load a previously persisted index for `root`
	async fn load(&self, root: &Path) -> Result<(), IndexError>;

	async fn clear(&self) -> Result<(), IndexError>;

	async fn on_create(&self, entry: &DirectoryEntry) -> Result<(), IndexError>;

	async fn on_rename(&self, from: &Path, to: &Path) -> Result<(), IndexError>;

	async fn on_delete(&self, path: &Path) -> Result<(), IndexError>;

	async fn on_tags_updated(&self, path: &Path, tags: &[Tag]) -> Result<(), IndexError>;

	async fn on_meta_updated(&self, path: &Path, patch: &EntryMetaPatch) -> Result<(), IndexError>;
}

/// Index that keeps nothing, for sessions without search
#[derive(Debug, Clone, Copy, Default)]
pub struct NullIndex;

#[async_trait]
impl IndexService for NullIndex {
	async fn build(&self, root: &Path, full_text: bool) -> Result<(), IndexError> {
		debug!(root = %root.display(), full_text, "Skipping index build");
		Ok(())
	}

	async fn load(&self, root: &Path) -> Result<(), IndexError> {
		debug!(root = %root.display(), "Skipping index load");
		Ok(())
	}

	async fn clear(&self) -> Result<(), IndexError> {
		Ok(())
	}

	async fn on_create(&self, _entry: &DirectoryEntry) -> Result<(), IndexError> {
		Ok(())
	}

	async fn on_rename(&self, _from: &Path, _to: &Path) -> Result<(), IndexError> {
		Ok(())
	}

	async fn on_delete(&self, _path: &Path) -> Result<(), IndexError> {
		Ok(())
	}

	async fn on_tags_updated(&self, _path: &Path, _tags: &[Tag]) -> Result<(), IndexError> {
		Ok(())
	}

	async fn on_meta_updated(
		&self,
		_path: &Path,
		_patch: &EntryMetaPatch,
	) -> Result<(), IndexError> {
		Ok(())
	}
}
