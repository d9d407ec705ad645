use crate::{
	domain::paths,
	reflect::EntryReflector,
	storage::{WatchEvent, WatcherHandle},
};

use std::path::Path;

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{error, trace};

/// The one watcher of a session, dropping it stops both the watch and the bridge
#[derive(Debug)]
pub(super) struct ActiveWatcher {
	pub(super) handle: Box<dyn WatcherHandle>,
	pub(super) bridge: JoinHandle<()>,
}

impl Drop for ActiveWatcher {
	fn drop(&mut self) {
		trace!(root = %self.handle.root().display(), "Stopping location watcher");
		self.bridge.abort();
	}
}

/// Turn watch events into reflections until the watch goes away
pub(super) async fn bridge_events(
	mut events_rx: mpsc::UnboundedReceiver<WatchEvent>,
	reflector: EntryReflector,
	show_hidden: bool,
) {
	while let Some(event) = events_rx.recv().await {
		let skip = |path: &Path| !show_hidden && paths::is_hidden_path(path);

		let result = match event {
			WatchEvent::Created { path, .. } | WatchEvent::Removed { path } if skip(&path) => {
				trace!(path = %path.display(), "Ignoring hidden entry");
				continue;
			}
			WatchEvent::Created { path, is_dir } => reflector.reflect_create(&path, !is_dir).await,
			WatchEvent::Removed { path } => reflector.reflect_delete(&path).await,
			WatchEvent::Renamed { from, to } => match (skip(&from), skip(&to)) {
				(false, false) => reflector.reflect_rename(&from, &to).await,
				// Hidden away, gone as far as the listing is concerned
				(false, true) => reflector.reflect_delete(&from).await,
				_ => {
					trace!(from = %from.display(), to = %to.display(), "Ignoring hidden rename");
					continue;
				}
			},
			WatchEvent::Modified { path } => {
				trace!(path = %path.display(), "Ignoring modification");
				continue;
			}
		};

		if let Err(e) = result {
			error!(?e, "Failed to reflect watcher event;");
			break;
		}
	}

	trace!("Watch event bridge stopped");
}
