//! Read-only queries over a session snapshot

use crate::domain::DirectoryEntry;

use std::path::Path;

use super::state::SessionState;

pub fn file_entries(state: &SessionState) -> impl Iterator<Item = &DirectoryEntry> {
	state.entries.iter().filter(|entry| entry.is_file)
}

/// The file after `pivot`, wrapping around at the end of the listing.
///
/// Without a pivot the last selected entry is used, then the first file.
pub fn next_file<'a>(state: &'a SessionState, pivot: Option<&Path>) -> Option<&'a DirectoryEntry> {
	step_file(state, pivot, |index, len| (index + 1) % len)
}

/// The file before `pivot`, wrapping around at the start of the listing
pub fn prev_file<'a>(state: &'a SessionState, pivot: Option<&Path>) -> Option<&'a DirectoryEntry> {
	step_file(state, pivot, |index, len| (index + len - 1) % len)
}

fn step_file<'a>(
	state: &'a SessionState,
	pivot: Option<&Path>,
	step: impl Fn(usize, usize) -> usize,
) -> Option<&'a DirectoryEntry> {
	let files = file_entries(state).collect::<Vec<_>>();

	let pivot = match pivot.or(state.last_selected_entry.as_deref()) {
		Some(pivot) => pivot,
		None => files.first()?.path.as_path(),
	};

	let index = files.iter().position(|entry| entry.path == pivot)?;
	files.get(step(index, files.len())).copied()
}
