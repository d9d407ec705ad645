use crate::{file_types::ExtensionBinding, storage::RawEntry};

use std::{
	collections::BTreeMap,
	path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{
	paths,
	tag::{replace_sidecar_tags, Tag, TagSyntax},
};

/// A file or folder of the displayed listing, keyed by its path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
	pub id: Uuid,
	pub path: PathBuf,
	pub name: String,
	/// Lower-cased, empty for folders
	pub extension: String,
	pub is_file: bool,
	pub size: u64,
	pub last_modified: DateTime<Utc>,
	pub tags: Vec<Tag>,
	pub color: Option<String>,
	pub description: Option<String>,
	pub thumb_path: Option<PathBuf>,
	/// Extra sidecar fields merged in by meta updates
	#[serde(default)]
	pub meta: BTreeMap<String, Value>,
}

impl DirectoryEntry {
	/// Enrich a raw storage entry, every call hands out a fresh id
	pub fn from_raw(raw: RawEntry, syntax: &TagSyntax) -> Self {
		let RawEntry {
			path,
			is_file,
			size,
			last_modified,
			sidecar,
		} = raw;

		let mut tags = syntax.parse(&path);
		let (color, description) = match sidecar {
			Some(sidecar) => {
				tags.extend(sidecar.tags());
				(sidecar.color, sidecar.description)
			}
			None => (None, None),
		};

		Self {
			id: Uuid::new_v4(),
			name: paths::entry_name(&path),
			extension: paths::entry_extension(&path, is_file),
			is_file,
			size,
			last_modified,
			tags,
			color,
			description,
			thumb_path: None,
			meta: BTreeMap::new(),
			path,
		}
	}

	/// Entry for something that was just created and never listed
	pub fn synthesize(path: impl AsRef<Path>, is_file: bool, syntax: &TagSyntax) -> Self {
		let path = path.as_ref();
		Self::from_raw(
			RawEntry {
				path: path.to_path_buf(),
				is_file,
				size: 0,
				last_modified: Utc::now(),
				sidecar: None,
			},
			syntax,
		)
	}

	pub fn is_hidden(&self) -> bool {
		paths::is_hidden_name(&self.name)
	}

	#[must_use]
	pub fn renamed(&self, new_path: impl AsRef<Path>, syntax: &TagSyntax) -> Self {
		let new_path = new_path.as_ref();
		Self {
			path: new_path.to_path_buf(),
			name: paths::entry_name(new_path),
			extension: paths::entry_extension(new_path, self.is_file),
			tags: syntax.retag_for_rename(&self.tags, new_path),
			..self.clone()
		}
	}

	#[must_use]
	pub fn with_sidecar_tags(&self, sidecar_tags: &[Tag]) -> Self {
		Self {
			tags: replace_sidecar_tags(&self.tags, sidecar_tags),
			..self.clone()
		}
	}

	#[must_use]
	pub fn with_meta(&self, patch: &EntryMetaPatch) -> Self {
		let mut entry = self.clone();
		patch.apply_to(&mut entry);
		entry
	}
}

/// Partial sidecar metadata, `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryMetaPatch {
	pub color: Option<String>,
	pub description: Option<String>,
	pub thumb_path: Option<PathBuf>,
	#[serde(default)]
	pub extra: BTreeMap<String, Value>,
}

impl EntryMetaPatch {
	pub fn thumbnail(thumb_path: impl Into<PathBuf>) -> Self {
		Self {
			thumb_path: Some(thumb_path.into()),
			..Default::default()
		}
	}

	pub fn color(color: impl Into<String>) -> Self {
		Self {
			color: Some(color.into()),
			..Default::default()
		}
	}

	pub fn description(description: impl Into<String>) -> Self {
		Self {
			description: Some(description.into()),
			..Default::default()
		}
	}

	#[must_use]
	pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.extra.insert(key.into(), value.into());
		self
	}

	pub fn is_empty(&self) -> bool {
		self.color.is_none()
			&& self.description.is_none()
			&& self.thumb_path.is_none()
			&& self.extra.is_empty()
	}

	fn apply_to(&self, entry: &mut DirectoryEntry) {
		if let Some(color) = &self.color {
			entry.color = Some(color.clone());
		}
		if let Some(description) = &self.description {
			entry.description = Some(description.clone());
		}
		if let Some(thumb_path) = &self.thumb_path {
			entry.thumb_path = Some(thumb_path.clone());
		}
		entry.meta.extend(
			self.extra
				.iter()
				.map(|(key, value)| (key.clone(), value.clone())),
		);
	}
}

/// The entry currently shown in the content view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenedEntry {
	pub path: PathBuf,
	pub is_file: bool,
	pub viewer: ExtensionBinding,
	pub editor: Option<ExtensionBinding>,
	pub edit_mode: bool,
	pub changed: bool,
	pub should_reload: bool,
	pub color: Option<String>,
}

impl OpenedEntry {
	#[must_use]
	pub fn moved_to(&self, new_path: impl Into<PathBuf>) -> Self {
		Self {
			path: new_path.into(),
			should_reload: true,
			..self.clone()
		}
	}

	#[must_use]
	pub fn needing_reload(&self) -> Self {
		Self {
			should_reload: true,
			..self.clone()
		}
	}
}
