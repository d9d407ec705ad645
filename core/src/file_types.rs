//! File type registry
//!
//! Maps a normalized extension to the extensions able to show or edit it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Viewer used for files whose type is not registered
pub const DEFAULT_FILE_VIEWER: &str = "@tagspaces/text-viewer";

/// Viewer used for folders
pub const FOLDER_VIEWER: &str = "about:blank";

const EXTENSIONS_FOLDER: &str = "node_modules";

/// A resolved viewer or editor extension
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtensionBinding {
	/// Extension package id, e.g. `@tagspaces/image-viewer`
	pub id: String,

	/// Where the extension gets loaded from
	pub path: String,
}

impl ExtensionBinding {
	pub fn new(id: impl Into<String>) -> Self {
		let id = id.into();
		let path = if id == FOLDER_VIEWER {
			id.clone()
		} else {
			format!("{EXTENSIONS_FOLDER}/{id}")
		};

		Self { id, path }
	}
}

/// One row of the user configurable file type table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTypeSetting {
	/// Extension without the dot
	#[serde(rename = "type")]
	pub extension: String,

	pub viewer: String,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub editor: Option<String>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub color: Option<String>,
}

impl FileTypeSetting {
	pub fn new(extension: impl Into<String>, viewer: impl Into<String>) -> Self {
		Self {
			extension: extension.into(),
			viewer: viewer.into(),
			editor: None,
			color: None,
		}
	}

	#[must_use]
	pub fn with_editor(mut self, editor: impl Into<String>) -> Self {
		self.editor = Some(editor.into());
		self
	}

	#[must_use]
	pub fn with_color(mut self, color: impl Into<String>) -> Self {
		self.color = Some(color.into());
		self
	}
}

/// What can be done with a file type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTypeCapability {
	pub viewer: ExtensionBinding,
	pub editor: Option<ExtensionBinding>,
	pub color: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FileTypeRegistry {
	types: HashMap<String, FileTypeCapability>,
}

fn normalize(extension: &str) -> String {
	extension.trim().trim_start_matches('.').to_lowercase()
}

impl FileTypeRegistry {
	/// Later rows win when the same extension is listed twice
	pub fn from_settings(settings: &[FileTypeSetting]) -> Self {
		let types = settings
			.iter()
			.filter(|setting| !normalize(&setting.extension).is_empty())
			.map(|setting| {
				(
					normalize(&setting.extension),
					FileTypeCapability {
						viewer: ExtensionBinding::new(&setting.viewer),
						editor: setting
							.editor
							.as_deref()
							.filter(|editor| !editor.is_empty())
							.map(ExtensionBinding::new),
						color: setting.color.clone(),
					},
				)
			})
			.collect();

		Self { types }
	}

	pub fn lookup(&self, extension: &str) -> Option<&FileTypeCapability> {
		self.types.get(&normalize(extension))
	}

	/// Capabilities for an entry, falling back to the default viewers
	pub fn resolve(&self, extension: &str, is_file: bool) -> FileTypeCapability {
		if !is_file {
			return FileTypeCapability {
				viewer: ExtensionBinding::new(FOLDER_VIEWER),
				editor: None,
				color: None,
			};
		}

		self.lookup(extension)
			.cloned()
			.unwrap_or_else(|| FileTypeCapability {
				viewer: ExtensionBinding::new(DEFAULT_FILE_VIEWER),
				editor: None,
				color: None,
			})
	}

	pub fn len(&self) -> usize {
		self.types.len()
	}

	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}
}

/// The file types known out of the box
pub fn default_file_types() -> Vec<FileTypeSetting> {
	const IMAGE_VIEWER: &str = "@tagspaces/image-viewer";
	const MEDIA_PLAYER: &str = "@tagspaces/media-player";
	const TEXT_EDITOR: &str = "@tagspaces/text-editor";
	const MD_VIEWER: &str = "@tagspaces/md-viewer";
	const HTML_VIEWER: &str = "@tagspaces/html-viewer";
	const HTML_EDITOR: &str = "@tagspaces/html-editor";
	const PDF_VIEWER: &str = "@tagspaces/pdf-viewer";

	let mut types = ["jpg", "jpeg", "png", "gif", "webp", "bmp", "svg"]
		.into_iter()
		.map(|extension| FileTypeSetting::new(extension, IMAGE_VIEWER).with_color("#2196f3"))
		.chain(
			["mp3", "ogg", "flac", "mp4", "webm", "mkv"]
				.into_iter()
				.map(|extension| FileTypeSetting::new(extension, MEDIA_PLAYER).with_color("#9c27b0")),
		)
		.collect::<Vec<_>>();

	types.extend([
		FileTypeSetting::new("txt", DEFAULT_FILE_VIEWER).with_editor(TEXT_EDITOR),
		FileTypeSetting::new("json", DEFAULT_FILE_VIEWER).with_editor(TEXT_EDITOR),
		FileTypeSetting::new("md", MD_VIEWER)
			.with_editor(TEXT_EDITOR)
			.with_color("#4caf50"),
		FileTypeSetting::new("html", HTML_VIEWER)
			.with_editor(HTML_EDITOR)
			.with_color("#ff9800"),
		FileTypeSetting::new("pdf", PDF_VIEWER).with_color("#f44336"),
	]);

	types
}
