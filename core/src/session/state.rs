use crate::domain::{ActiveLocation, DirectoryEntry, OpenedEntry};

use std::{
	fmt,
	path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Key of the notification shown while a directory loads
pub const LOADING_NOTIFICATION_KEY: &str = "loading";

/// Identifies one directory load. Later loads always get bigger tokens.
#[derive(
	Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LoadToken(u64);

impl LoadToken {
	pub const fn new(value: u64) -> Self {
		Self(value)
	}

	pub const fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for LoadToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
	Info,
	Default,
	Warning,
	Error,
}

/// Transient message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
	pub text: String,
	pub kind: NotificationKind,
	pub autohide: bool,
	/// Lets a later update hide this notification and not another one
	pub key: Option<String>,
}

impl Notification {
	pub fn new(text: impl Into<String>, kind: NotificationKind, autohide: bool) -> Self {
		Self {
			text: text.into(),
			kind,
			autohide,
			key: None,
		}
	}

	pub fn info(text: impl Into<String>) -> Self {
		Self::new(text, NotificationKind::Info, true)
	}

	pub fn success(text: impl Into<String>) -> Self {
		Self::new(text, NotificationKind::Default, true)
	}

	pub fn warning(text: impl Into<String>) -> Self {
		Self::new(text, NotificationKind::Warning, true)
	}

	pub fn error(text: impl Into<String>) -> Self {
		Self::new(text, NotificationKind::Error, false)
	}

	pub fn loading(path: &Path) -> Self {
		Self {
			key: Some(LOADING_NOTIFICATION_KEY.to_string()),
			..Self::new(
				format!("Loading {}", path.display()),
				NotificationKind::Info,
				false,
			)
		}
	}

	pub fn has_key(&self, key: &str) -> bool {
		self.key.as_deref() == Some(key)
	}
}

/// Everything the explorer shows, owned by the session store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
	pub current_location: Option<ActiveLocation>,
	pub current_directory_path: Option<PathBuf>,
	pub current_directory_color: Option<String>,
	/// Storage listing order
	pub entries: Vec<DirectoryEntry>,
	/// At most one entry for now
	pub opened_entries: Vec<OpenedEntry>,
	pub is_read_only: bool,
	pub is_generating_thumbnails: bool,
	pub is_loading: bool,
	/// Latest load started, older loads never commit
	pub load_token: LoadToken,
	pub notification: Option<Notification>,
	pub last_selected_entry: Option<PathBuf>,
	pub selected_entries: Vec<PathBuf>,
}

impl SessionState {
	pub fn current_location_id(&self) -> Option<Uuid> {
		self.current_location.as_ref().map(|location| location.id)
	}

	pub fn entry(&self, path: impl AsRef<Path>) -> Option<&DirectoryEntry> {
		let path = path.as_ref();
		self.entries.iter().find(|entry| entry.path == path)
	}

	pub fn opened_entry(&self) -> Option<&OpenedEntry> {
		self.opened_entries.first()
	}

	pub fn entry_names(&self) -> Vec<&str> {
		self.entries.iter().map(|entry| entry.name.as_str()).collect()
	}

	pub fn is_current_directory(&self, path: impl AsRef<Path>) -> bool {
		self.current_directory_path.as_deref() == Some(path.as_ref())
	}
}
