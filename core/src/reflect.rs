//! Entry reflection
//!
//! Local mutations are patched into the session and mirrored to the index
//! instead of listing the directory again. The patches themselves are applied
//! by the session reducer.

use crate::{
	domain::{DirectoryEntry, EntryMetaPatch, Tag, TagSyntax},
	error::SessionError,
	index::{IndexError, IndexService},
	session::{Notification, SessionEvent, SessionState, SessionStore},
};

use std::{path::Path, sync::Arc};

use tracing::{instrument, trace, warn};

#[derive(Clone)]
pub struct EntryReflector {
	store: SessionStore,
	index: Arc<dyn IndexService>,
	syntax: TagSyntax,
}

impl std::fmt::Debug for EntryReflector {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EntryReflector")
			.field("syntax", &self.syntax)
			.finish_non_exhaustive()
	}
}

impl EntryReflector {
	pub fn new(store: SessionStore, index: Arc<dyn IndexService>, syntax: TagSyntax) -> Self {
		Self {
			store,
			index,
			syntax,
		}
	}

	pub fn syntax(&self) -> &TagSyntax {
		&self.syntax
	}

	#[instrument(skip_all, fields(path = %path.display()))]
	pub async fn reflect_delete(&self, path: &Path) -> Result<Arc<SessionState>, SessionError> {
		let state = self
			.store
			.apply(SessionEvent::EntryDeleted {
				path: path.to_path_buf(),
			})
			.await?;

		self.mirror(self.index.on_delete(path).await);

		Ok(state)
	}

	#[instrument(skip_all, fields(path = %path.display()))]
	pub async fn reflect_create(
		&self,
		path: &Path,
		is_file: bool,
	) -> Result<Arc<SessionState>, SessionError> {
		let entry = DirectoryEntry::synthesize(path, is_file, &self.syntax);

		let state = self
			.store
			.apply(SessionEvent::EntryCreated {
				entry: entry.clone(),
			})
			.await?;

		// Listed under another id, the index already knows about it
		if state.entry(path).is_some_and(|listed| listed.id != entry.id) {
			trace!("Entry already listed");
			return Ok(state);
		}

		self.mirror(self.index.on_create(&entry).await);

		Ok(state)
	}

	#[instrument(skip_all, fields(from = %from.display(), to = %to.display()))]
	pub async fn reflect_rename(&self, from: &Path, to: &Path) -> Result<Arc<SessionState>, SessionError> {
		let state = self
			.store
			.apply(SessionEvent::EntryRenamed {
				from: from.to_path_buf(),
				to: to.to_path_buf(),
				syntax: self.syntax.clone(),
			})
			.await?;

		self.mirror(self.index.on_rename(from, to).await);

		Ok(state)
	}

	/// `update_index` is false when the change came from the index itself
	#[instrument(skip_all, fields(path = %path.display(), tags = tags.len()))]
	pub async fn reflect_update_sidecar_tags(
		&self,
		path: &Path,
		tags: Vec<Tag>,
		update_index: bool,
	) -> Result<Arc<SessionState>, SessionError> {
		let state = self
			.store
			.apply(SessionEvent::SidecarTagsUpdated {
				path: path.to_path_buf(),
				tags: tags.clone(),
			})
			.await?;

		if update_index {
			self.mirror(self.index.on_tags_updated(path, &tags).await);
		}

		Ok(state)
	}

	#[instrument(skip_all, fields(path = %path.display()))]
	pub async fn reflect_update_sidecar_meta(
		&self,
		path: &Path,
		patch: EntryMetaPatch,
	) -> Result<Arc<SessionState>, SessionError> {
		let state = self
			.store
			.apply(SessionEvent::SidecarMetaUpdated {
				path: path.to_path_buf(),
				patch: patch.clone(),
			})
			.await?;

		self.mirror(self.index.on_meta_updated(path, &patch).await);

		Ok(state)
	}

	// The local patch stays applied whatever the index says
	fn mirror(&self, result: Result<(), IndexError>) {
		if let Err(e) = result {
			warn!(?e, "Failed to mirror change to the index;");
			self.store
				.dispatch(SessionEvent::NotificationShown(Notification::warning(
					"Search index could not be updated",
				)));
		}
	}
}
