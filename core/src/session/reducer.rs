//! The one place where session state changes
//!
//! [`reduce`] never mutates its input. When an event changes nothing the very
//! same `Arc` comes back, so subscribers can tell no-ops apart with
//! [`Arc::ptr_eq`].

use crate::{
	domain::{paths, ActiveLocation, DirectoryEntry, EntryMetaPatch, OpenedEntry, Tag, TagSyntax},
	thumbnail::ThumbnailResult,
};

use std::{
	path::{Path, PathBuf},
	sync::Arc,
};

use uuid::Uuid;

use super::{
	event::SessionEvent,
	state::{LoadToken, Notification, SessionState, LOADING_NOTIFICATION_KEY},
};

pub fn reduce(state: &Arc<SessionState>, event: SessionEvent) -> Arc<SessionState> {
	let next = match event {
		SessionEvent::LocationOpened {
			location,
			is_read_only,
		} => location_opened(state, location, is_read_only),
		SessionEvent::LocationClosed { id } => location_closed(state, id),

		SessionEvent::DirectoryLoadStarted { token, path } => load_started(state, token, &path),
		SessionEvent::DirectoryLoaded {
			token,
			path,
			entries,
		} => load_committed(state, token, &path, entries, None),
		SessionEvent::DirectoryLoadFailed {
			token,
			path,
			reason,
		} => load_committed(
			state,
			token,
			&path,
			vec![],
			Some(Notification::warning(format!(
				"Failed to load {}: {reason}",
				path.display()
			))),
		),
		SessionEvent::DirectoryColorLoaded { path, color } => directory_color(state, &path, color),
		SessionEvent::SearchResultsShown { entries } => Some(SessionState {
			entries,
			is_loading: false,
			notification: without_loading_notification(state),
			..SessionState::clone(state)
		}),

		SessionEvent::ThumbnailGenerationToggled(is_generating) => {
			(state.is_generating_thumbnails != is_generating).then(|| SessionState {
				is_generating_thumbnails: is_generating,
				..SessionState::clone(state)
			})
		}
		SessionEvent::ThumbnailsGenerated { results } => merge_thumbnails(state, &results),

		SessionEvent::EntryCreated { entry } => entry_created(state, entry),
		SessionEvent::EntryDeleted { path } => entry_deleted(state, &path),
		SessionEvent::EntryRenamed { from, to, syntax } => entry_renamed(state, &from, &to, &syntax),
		SessionEvent::SidecarTagsUpdated { path, tags } => sidecar_tags_updated(state, &path, &tags),
		SessionEvent::SidecarMetaUpdated { path, patch } => sidecar_meta_updated(state, &path, &patch),

		SessionEvent::EntryOpened { entry } => Some(SessionState {
			opened_entries: vec![entry],
			..SessionState::clone(state)
		}),
		SessionEvent::AllEntriesClosed => (!state.opened_entries.is_empty()).then(|| SessionState {
			opened_entries: vec![],
			..SessionState::clone(state)
		}),
		SessionEvent::SelectionChanged { paths } => {
			(state.selected_entries != paths).then(|| SessionState {
				selected_entries: paths,
				..SessionState::clone(state)
			})
		}
		SessionEvent::LastSelectedEntrySet { path } => {
			(state.last_selected_entry != path).then(|| SessionState {
				last_selected_entry: path,
				..SessionState::clone(state)
			})
		}

		SessionEvent::NotificationShown(notification) => Some(SessionState {
			notification: Some(notification),
			..SessionState::clone(state)
		}),
		SessionEvent::NotificationHidden { key } => {
			let matches = match (&state.notification, key.as_deref()) {
				(None, _) => false,
				(Some(_), None) => true,
				(Some(notification), Some(key)) => notification.has_key(key),
			};

			matches.then(|| SessionState {
				notification: None,
				..SessionState::clone(state)
			})
		}
	};

	next.map_or_else(|| Arc::clone(state), Arc::new)
}

fn without_loading_notification(state: &SessionState) -> Option<Notification> {
	state
		.notification
		.clone()
		.filter(|notification| !notification.has_key(LOADING_NOTIFICATION_KEY))
}

fn location_opened(
	state: &SessionState,
	location: ActiveLocation,
	is_read_only: bool,
) -> Option<SessionState> {
	if state.current_location.as_ref() == Some(&location) && state.is_read_only == is_read_only {
		return None;
	}

	Some(SessionState {
		current_location: Some(location),
		is_read_only,
		..state.clone()
	})
}

fn location_closed(state: &SessionState, id: Uuid) -> Option<SessionState> {
	if state.current_location_id() != Some(id) {
		return None;
	}

	Some(SessionState {
		current_location: None,
		current_directory_path: None,
		current_directory_color: None,
		entries: vec![],
		opened_entries: vec![],
		is_read_only: false,
		is_loading: false,
		notification: without_loading_notification(state),
		last_selected_entry: None,
		selected_entries: vec![],
		..state.clone()
	})
}

fn load_started(state: &SessionState, token: LoadToken, path: &Path) -> Option<SessionState> {
	if token <= state.load_token {
		return None;
	}

	Some(SessionState {
		load_token: token,
		current_directory_path: Some(path.to_path_buf()),
		current_directory_color: None,
		entries: vec![],
		is_loading: true,
		notification: Some(Notification::loading(path)),
		last_selected_entry: None,
		selected_entries: vec![],
		..state.clone()
	})
}

fn load_committed(
	state: &SessionState,
	token: LoadToken,
	path: &Path,
	entries: Vec<DirectoryEntry>,
	failure: Option<Notification>,
) -> Option<SessionState> {
	if token != state.load_token || !state.is_current_directory(path) {
		return None;
	}

	Some(SessionState {
		entries,
		is_loading: false,
		notification: failure.or_else(|| without_loading_notification(state)),
		..state.clone()
	})
}

fn directory_color(state: &SessionState, path: &Path, color: Option<String>) -> Option<SessionState> {
	(state.is_current_directory(path) && state.current_directory_color != color).then(|| {
		SessionState {
			current_directory_color: color,
			..state.clone()
		}
	})
}

fn merge_thumbnails(state: &SessionState, results: &[ThumbnailResult]) -> Option<SessionState> {
	let mut changed = false;

	let entries = state
		.entries
		.iter()
		.map(|entry| {
			match results.iter().find(|result| result.path == entry.path) {
				Some(result) if entry.thumb_path.as_ref() != Some(&result.thumb_path) => {
					changed = true;
					DirectoryEntry {
						thumb_path: Some(result.thumb_path.clone()),
						..entry.clone()
					}
				}
				_ => entry.clone(),
			}
		})
		.collect::<Vec<_>>();

	changed.then(|| SessionState {
		entries,
		..state.clone()
	})
}

fn entry_created(state: &SessionState, entry: DirectoryEntry) -> Option<SessionState> {
	let current_directory = state.current_directory_path.as_deref()?;

	if !paths::is_direct_child(current_directory, &entry.path) || state.entry(&entry.path).is_some() {
		return None;
	}

	let mut entries = state.entries.clone();
	entries.push(entry);

	Some(SessionState {
		entries,
		..state.clone()
	})
}

fn entry_deleted(state: &SessionState, path: &Path) -> Option<SessionState> {
	let entries = state
		.entries
		.iter()
		.filter(|entry| entry.path != path)
		.cloned()
		.collect::<Vec<_>>();
	let opened_entries = state
		.opened_entries
		.iter()
		.filter(|opened| opened.path != path)
		.cloned()
		.collect::<Vec<_>>();

	if entries.len() == state.entries.len() && opened_entries.len() == state.opened_entries.len() {
		return None;
	}

	Some(SessionState {
		entries,
		opened_entries,
		selected_entries: state
			.selected_entries
			.iter()
			.filter(|selected| selected.as_path() != path)
			.cloned()
			.collect(),
		last_selected_entry: state
			.last_selected_entry
			.clone()
			.filter(|last| last.as_path() != path),
		..state.clone()
	})
}

fn entry_renamed(state: &SessionState, from: &Path, to: &Path, syntax: &TagSyntax) -> Option<SessionState> {
	let matches_entries = state.entries.iter().any(|entry| entry.path == from);
	let matches_opened = state.opened_entries.iter().any(|opened| opened.path == from);

	if !matches_entries && !matches_opened {
		return None;
	}

	let moved = |path: &PathBuf| {
		if path == from {
			to.to_path_buf()
		} else {
			path.clone()
		}
	};

	Some(SessionState {
		entries: state
			.entries
			.iter()
			.map(|entry| {
				if entry.path == from {
					entry.renamed(to, syntax)
				} else {
					entry.clone()
				}
			})
			.collect(),
		opened_entries: map_opened(&state.opened_entries, from, |opened| opened.moved_to(to)),
		selected_entries: state.selected_entries.iter().map(moved).collect(),
		last_selected_entry: state.last_selected_entry.as_ref().map(moved),
		..state.clone()
	})
}

fn sidecar_tags_updated(state: &SessionState, path: &Path, tags: &[Tag]) -> Option<SessionState> {
	update_entry_and_reload(state, path, |entry| entry.with_sidecar_tags(tags))
}

fn sidecar_meta_updated(state: &SessionState, path: &Path, patch: &EntryMetaPatch) -> Option<SessionState> {
	update_entry_and_reload(state, path, |entry| entry.with_meta(patch))
}

fn update_entry_and_reload(
	state: &SessionState,
	path: &Path,
	update: impl Fn(&DirectoryEntry) -> DirectoryEntry,
) -> Option<SessionState> {
	let matches_entries = state.entries.iter().any(|entry| entry.path == path);
	let matches_opened = state.opened_entries.iter().any(|opened| opened.path == path);

	if !matches_entries && !matches_opened {
		return None;
	}

	Some(SessionState {
		entries: state
			.entries
			.iter()
			.map(|entry| {
				if entry.path == path {
					update(entry)
				} else {
					entry.clone()
				}
			})
			.collect(),
		opened_entries: map_opened(&state.opened_entries, path, OpenedEntry::needing_reload),
		..state.clone()
	})
}

fn map_opened(
	opened_entries: &[OpenedEntry],
	path: &Path,
	update: impl Fn(&OpenedEntry) -> OpenedEntry,
) -> Vec<OpenedEntry> {
	opened_entries
		.iter()
		.map(|opened| {
			if opened.path == path {
				update(opened)
			} else {
				opened.clone()
			}
		})
		.collect()
}
