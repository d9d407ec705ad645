//! Read-only view of the sidecar JSON format
//!
//! Only the fields the session needs are modelled, anything else in the file is
//! ignored.

use crate::domain::Tag;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidecarMeta {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(default)]
	pub tags: Vec<SidecarTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidecarTag {
	pub title: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub color: Option<String>,
	#[serde(default, rename = "textcolor", skip_serializing_if = "Option::is_none")]
	pub text_color: Option<String>,
}

impl SidecarMeta {
	pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
		// Sidecars written on Windows may start with a BOM
		let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
		serde_json::from_slice(bytes)
	}

	/// Sidecar tags as session tags, empty titles skipped
	pub fn tags(&self) -> Vec<Tag> {
		self.tags
			.iter()
			.filter(|tag| !tag.title.trim().is_empty())
			.map(|tag| Tag {
				color: tag.color.clone(),
				text_color: tag.text_color.clone(),
				..Tag::sidecar(tag.title.trim())
			})
			.collect()
	}
}
