use crate::{
	domain::{ActiveLocation, DirectoryEntry, EntryMetaPatch, OpenedEntry, Tag, TagSyntax},
	thumbnail::ThumbnailResult,
};

use std::path::PathBuf;

use uuid::Uuid;

use super::state::{LoadToken, Notification};

/// Every change the session state can go through
#[derive(Debug, Clone, PartialEq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum SessionEvent {
	LocationOpened {
		location: ActiveLocation,
		is_read_only: bool,
	},
	/// Ignored unless `id` is the open location
	LocationClosed {
		id: Uuid,
	},

	DirectoryLoadStarted {
		token: LoadToken,
		path: PathBuf,
	},
	DirectoryLoaded {
		token: LoadToken,
		path: PathBuf,
		entries: Vec<DirectoryEntry>,
	},
	DirectoryLoadFailed {
		token: LoadToken,
		path: PathBuf,
		reason: String,
	},
	DirectoryColorLoaded {
		path: PathBuf,
		color: Option<String>,
	},
	SearchResultsShown {
		entries: Vec<DirectoryEntry>,
	},

	ThumbnailGenerationToggled(bool),
	ThumbnailsGenerated {
		results: Vec<ThumbnailResult>,
	},

	EntryCreated {
		entry: DirectoryEntry,
	},
	EntryDeleted {
		path: PathBuf,
	},
	EntryRenamed {
		from: PathBuf,
		to: PathBuf,
		syntax: TagSyntax,
	},
	SidecarTagsUpdated {
		path: PathBuf,
		tags: Vec<Tag>,
	},
	SidecarMetaUpdated {
		path: PathBuf,
		patch: EntryMetaPatch,
	},

	EntryOpened {
		entry: OpenedEntry,
	},
	AllEntriesClosed,
	SelectionChanged {
		paths: Vec<PathBuf>,
	},
	LastSelectedEntrySet {
		path: Option<PathBuf>,
	},

	NotificationShown(Notification),
	/// Hides the current notification, only when its key matches if one is given
	NotificationHidden {
		key: Option<String>,
	},
}

impl SessionEvent {
	pub fn name(&self) -> &'static str {
		self.into()
	}
}
