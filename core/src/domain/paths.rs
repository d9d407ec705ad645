//! Entry naming and sidecar path helpers
//!
//! Sidecars live in a `.ts` folder next to the entry they describe:
//! `<dir>/.ts/<name>.json` for files, `<dir>/.ts/tsm.json` for the folder itself
//! and `<dir>/.ts/<name>.jpg` for generated thumbnails.

use std::path::{Path, PathBuf};

pub const META_FOLDER: &str = ".ts";
pub const META_FILE_EXTENSION: &str = "json";
pub const THUMBNAIL_EXTENSION: &str = "jpg";
pub const FOLDER_META_FILE: &str = "tsm.json";

/// Last component of `path`, or the whole path for roots like `/`
pub fn entry_name(path: impl AsRef<Path>) -> String {
	let path = path.as_ref();
	path.file_name().map_or_else(
		|| path.to_string_lossy().into_owned(),
		|name| name.to_string_lossy().into_owned(),
	)
}

/// Lower-cased extension of a file, always empty for folders
pub fn entry_extension(path: impl AsRef<Path>, is_file: bool) -> String {
	if !is_file {
		return String::new();
	}

	path.as_ref()
		.extension()
		.map(|extension| extension.to_string_lossy().to_lowercase())
		.unwrap_or_default()
}

pub fn is_hidden_name(name: &str) -> bool {
	name.starts_with('.')
}

pub fn is_hidden_path(path: impl AsRef<Path>) -> bool {
	path.as_ref()
		.file_name()
		.is_some_and(|name| is_hidden_name(&name.to_string_lossy()))
}

fn meta_folder_of(path: &Path) -> Option<PathBuf> {
	path.parent().map(|parent| parent.join(META_FOLDER))
}

/// `<dir>/.ts/<name>.json`
pub fn sidecar_path(path: impl AsRef<Path>) -> Option<PathBuf> {
	let path = path.as_ref();
	let name = path.file_name()?.to_string_lossy();
	meta_folder_of(path).map(|folder| folder.join(format!("{name}.{META_FILE_EXTENSION}")))
}

/// `<dir>/.ts/<name>.jpg`
pub fn thumbnail_path(path: impl AsRef<Path>) -> Option<PathBuf> {
	let path = path.as_ref();
	let name = path.file_name()?.to_string_lossy();
	meta_folder_of(path).map(|folder| folder.join(format!("{name}.{THUMBNAIL_EXTENSION}")))
}

/// `<dir>/.ts/tsm.json`
pub fn folder_meta_path(dir: impl AsRef<Path>) -> PathBuf {
	dir.as_ref().join(META_FOLDER).join(FOLDER_META_FILE)
}

/// Whether `path` sits directly inside `dir`
pub fn is_direct_child(dir: impl AsRef<Path>, path: impl AsRef<Path>) -> bool {
	path.as_ref().parent() == Some(dir.as_ref())
}
