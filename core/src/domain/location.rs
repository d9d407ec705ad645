use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LocationKind {
	Local,
	/// Backed by an object storage service
	Cloud,
}

/// A browsable root, selected by id. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
	pub id: Uuid,
	pub name: String,
	pub kind: LocationKind,
	/// The first path is the active root
	pub paths: Vec<PathBuf>,
	pub is_read_only: bool,
	pub persist_index: bool,
	pub full_text_index: bool,
	pub watch_for_changes: bool,
}

impl Location {
	pub fn new(name: impl Into<String>, kind: LocationKind, root: impl Into<PathBuf>) -> Self {
		Self {
			id: Uuid::new_v4(),
			name: name.into(),
			kind,
			paths: vec![root.into()],
			is_read_only: false,
			persist_index: false,
			full_text_index: false,
			watch_for_changes: false,
		}
	}

	pub fn local(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
		Self::new(name, LocationKind::Local, root)
	}

	pub fn cloud(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
		Self::new(name, LocationKind::Cloud, root)
	}

	pub fn root(&self) -> Option<&Path> {
		self.paths.first().map(PathBuf::as_path)
	}

	pub fn is_cloud(&self) -> bool {
		self.kind == LocationKind::Cloud
	}
}

/// What the session remembers about the open location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveLocation {
	pub id: Uuid,
	pub kind: LocationKind,
	pub root: PathBuf,
}

impl ActiveLocation {
	pub fn contains(&self, path: impl AsRef<Path>) -> bool {
		path.as_ref().starts_with(&self.root)
	}
}
