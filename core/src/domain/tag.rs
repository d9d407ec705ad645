use std::path::Path;

use serde::{Deserialize, Serialize};

use super::paths;

/// Where a tag came from
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TagProvenance {
	/// Parsed out of the entry name, e.g. `report[draft].pdf`
	Filename,
	/// Stored in the entry sidecar file
	Sidecar,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
	pub title: String,
	pub provenance: TagProvenance,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub text_color: Option<String>,
}

impl Tag {
	pub fn filename(title: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			provenance: TagProvenance::Filename,
			color: None,
			text_color: None,
		}
	}

	pub fn sidecar(title: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			provenance: TagProvenance::Sidecar,
			color: None,
			text_color: None,
		}
	}

	#[must_use]
	pub fn with_color(mut self, color: impl Into<String>) -> Self {
		self.color = Some(color.into());
		self
	}

	pub fn is_from_filename(&self) -> bool {
		self.provenance == TagProvenance::Filename
	}

	pub fn is_from_sidecar(&self) -> bool {
		self.provenance == TagProvenance::Sidecar
	}
}

/// The tag container syntax embedded in entry names: `name[tag1 tag2].ext`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSyntax {
	pub delimiter: String,
	pub begin_container: char,
	pub end_container: char,
}

impl Default for TagSyntax {
	fn default() -> Self {
		Self {
			delimiter: " ".to_string(),
			begin_container: '[',
			end_container: ']',
		}
	}
}

impl TagSyntax {
	pub fn with_delimiter(delimiter: impl Into<String>) -> Self {
		Self {
			delimiter: delimiter.into(),
			..Default::default()
		}
	}

	/// Tags found in the name of `path`, all with [`TagProvenance::Filename`]
	pub fn parse(&self, path: impl AsRef<Path>) -> Vec<Tag> {
		let name = paths::entry_name(path);

		// Only strip what really is an extension, a dot inside the container is a tag
		let stem = match (name.rfind('.'), name.rfind(self.end_container)) {
			(Some(dot), Some(end)) if dot > end => &name[..dot],
			(Some(dot), None) => &name[..dot],
			_ => name.as_str(),
		};

		let (Some(begin), Some(end)) = (
			stem.find(self.begin_container),
			stem.rfind(self.end_container),
		) else {
			return vec![];
		};

		if begin >= end {
			return vec![];
		}

		let container = &stem[begin + self.begin_container.len_utf8()..end];
		let delimiter = if self.delimiter.is_empty() {
			" "
		} else {
			self.delimiter.as_str()
		};

		let mut tags: Vec<Tag> = Vec::new();
		for title in container.split(delimiter).map(str::trim) {
			if !title.is_empty() && !tags.iter().any(|tag| tag.title == title) {
				tags.push(Tag::filename(title));
			}
		}

		tags
	}

	/// Tags of an entry after it got renamed to `new_path`: sidecar tags survive,
	/// filename tags are parsed again from the new name.
	pub fn retag_for_rename(&self, tags: &[Tag], new_path: impl AsRef<Path>) -> Vec<Tag> {
		tags.iter()
			.filter(|tag| tag.is_from_sidecar())
			.cloned()
			.chain(self.parse(new_path))
			.collect()
	}
}

/// Replace every sidecar tag in `tags` with `sidecar_tags`, keeping filename tags
pub fn replace_sidecar_tags(tags: &[Tag], sidecar_tags: &[Tag]) -> Vec<Tag> {
	tags.iter()
		.filter(|tag| tag.is_from_filename())
		.cloned()
		.chain(sidecar_tags.iter().cloned().map(|mut tag| {
			tag.provenance = TagProvenance::Sidecar;
			tag
		}))
		.collect()
}
