use crate::{index::IndexError, storage::StorageError, thumbnail::ThumbnailError};

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// Failures of session operations.
///
/// Each of these has already been logged and turned into a notification by the
/// time a caller sees it, the session itself stays usable.
#[derive(Debug, Error)]
pub enum SessionError {
	#[error("failed to list directory '{}'", .path.display())]
	ListingFailure {
		path: PathBuf,
		#[source]
		source: StorageError,
	},
	#[error(transparent)]
	ThumbnailBatchFailure(#[from] ThumbnailError),
	#[error("file operation failed: {0}")]
	FileOperationFailure(#[from] StorageError),
	#[error("failed to activate object store for location <id='{location_id}'>")]
	ObjectStoreActivationFailure {
		location_id: Uuid,
		#[source]
		source: StorageError,
	},
	#[error(transparent)]
	IndexFailure(#[from] IndexError),

	#[error("the current location is read-only")]
	ReadOnly,
	#[error("no directory is opened")]
	NoDirectoryOpened,
	#[error("parent directory '{}' is not in the current location", .0.display())]
	ParentOutsideLocation(PathBuf),
	#[error("location not found <id='{0}'>")]
	LocationNotFound(Uuid),
	#[error("location <id='{0}'> has no root path")]
	MissingRootPath(Uuid),
	#[error("invalid entry name: '{0}'")]
	InvalidName(String),
	#[error("session store is not running")]
	StoreClosed,
}
