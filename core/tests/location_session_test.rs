//! Opening and closing locations

mod helpers;

use helpers::*;

use std::{path::PathBuf, sync::Arc, time::Duration};

use pretty_assertions::assert_eq;
use tagdeck_core::{
	domain::Location,
	index::IndexService,
	session::NotificationKind,
	storage::{RawEntry, StorageGateway, WatchEvent},
	Explorer, ExplorerSettings, SessionError, SessionPhase, SessionState,
};
use tokio::time::timeout;
use tracing_test::traced_test;
use uuid::Uuid;

fn scripted_storage() -> Arc<MockStorage> {
	let storage = MockStorage::new();
	storage.set_listing("/home", vec![RawEntry::file("/home/notes.md", 12)]);
	storage.set_listing("/bucket", vec![RawEntry::file("/bucket/photo.jpg", 2048)]);
	storage
}

#[tokio::test]
#[traced_test]
async fn failed_object_store_activation_keeps_the_previous_location() {
	let storage = scripted_storage();
	storage.fail_object_store();
	let explorer = explorer(&storage);

	let home = Location::local("home", "/home");
	explorer.locations().open_location(&home).await.unwrap();

	let cloud = Location::cloud("bucket", "/bucket");
	let result = explorer.locations().open_location(&cloud).await;

	assert!(matches!(
		result,
		Err(SessionError::ObjectStoreActivationFailure { location_id, .. }) if location_id == cloud.id
	));

	let state = explorer.store().sync().await.unwrap();
	assert_eq!(state.current_location_id(), Some(home.id));
	assert!(!storage.is_object_store_active());
	assert_eq!(
		state.notification.as_ref().map(|notification| notification.kind),
		Some(NotificationKind::Error)
	);
	assert!(logs_contain("Failed to activate object store"));
}

#[tokio::test]
async fn cloud_locations_enable_the_object_store() {
	let storage = scripted_storage();
	let explorer = explorer(&storage);

	let cloud = Location::cloud("bucket", "/bucket");
	let load = explorer.locations().open_location(&cloud).await.unwrap();

	assert!(load.committed);
	assert_eq!(names(&load.state), vec!["photo.jpg"]);
	assert!(storage.is_object_store_active());
	assert_eq!(explorer.phase(), SessionPhase::CloudActive);
	assert!(storage.calls().contains(&StorageCall::EnableObjectStore(cloud.id)));

	let notification = explorer.store().sync().await.unwrap().notification.clone().unwrap();
	assert_eq!(notification.kind, NotificationKind::Default);
	assert_eq!(notification.text, "Connected to object store");

	let home = Location::local("home", "/home");
	explorer.locations().open_location(&home).await.unwrap();

	assert!(!storage.is_object_store_active());
	assert_eq!(explorer.phase(), SessionPhase::LocalActive);
}

#[tokio::test]
async fn index_is_built_or_loaded_once_per_location() {
	let storage = scripted_storage();
	let index = RecordingIndex::new();
	let explorer = explorer_with_index(&storage, &index);

	let mut home = Location::local("home", "/home");
	home.full_text_index = true;
	let mut bucket = Location::cloud("bucket", "/bucket");
	bucket.persist_index = true;

	explorer.locations().open_location(&home).await.unwrap();
	explorer.locations().open_location(&home).await.unwrap();
	explorer.locations().open_location(&bucket).await.unwrap();

	assert_eq!(
		index.calls(),
		vec![
			IndexCall::Build {
				root: PathBuf::from("/home"),
				full_text: true,
			},
			IndexCall::Load(PathBuf::from("/bucket")),
		]
	);
}

#[tokio::test]
async fn index_failure_does_not_stop_the_location_from_opening() {
	let storage = scripted_storage();
	let index = RecordingIndex::new();
	index.fail();
	let explorer = explorer_with_index(&storage, &index);

	let home = Location::local("home", "/home");
	let load = explorer.locations().open_location(&home).await.unwrap();

	assert!(load.committed);
	assert_eq!(names(&load.state), vec!["notes.md"]);

	let state = explorer.store().sync().await.unwrap();
	assert_eq!(
		state.notification.as_ref().map(|notification| notification.kind),
		Some(NotificationKind::Warning)
	);
}

#[tokio::test]
async fn closing_clears_the_session_and_the_index() {
	let storage = scripted_storage();
	let index = RecordingIndex::new();
	let explorer = explorer_with_index(&storage, &index);

	let home = Location::local("home", "/home");
	explorer.locations().open_location(&home).await.unwrap();

	assert!(!explorer.locations().close_location(Uuid::new_v4()).await.unwrap());
	assert!(explorer.locations().close_location(home.id).await.unwrap());

	let state = explorer.snapshot();
	assert_eq!(state.current_location, None);
	assert_eq!(state.current_directory_path, None);
	assert!(state.entries.is_empty());
	assert_eq!(explorer.phase(), SessionPhase::NoLocation);
	assert_eq!(index.calls().last(), Some(&IndexCall::Clear));

	// Opening it again needs a fresh index
	explorer.locations().open_location(&home).await.unwrap();
	assert_eq!(
		index
			.calls()
			.iter()
			.filter(|call| matches!(call, IndexCall::Build { .. }))
			.count(),
		2
	);
}

#[tokio::test]
async fn registered_locations_open_by_id() {
	let storage = scripted_storage();
	let explorer = explorer(&storage);

	let home = Location::local("home", "/home");
	explorer.locations().register_location(home.clone()).await;
	assert_eq!(explorer.locations().locations().await, vec![home.clone()]);

	let load = explorer.locations().open_location_by_id(home.id).await.unwrap();
	assert_eq!(load.path, PathBuf::from("/home"));

	let unknown = Uuid::new_v4();
	let result = explorer.locations().open_location_by_id(unknown).await;
	assert!(matches!(result, Err(SessionError::LocationNotFound(id)) if id == unknown));
}

#[tokio::test]
async fn location_without_paths_is_refused() {
	let storage = scripted_storage();
	let explorer = explorer(&storage);

	let mut empty = Location::local("empty", "/nowhere");
	empty.paths.clear();

	let result = explorer.locations().open_location(&empty).await;

	assert!(matches!(result, Err(SessionError::MissingRootPath(id)) if id == empty.id));
	assert_eq!(explorer.phase(), SessionPhase::NoLocation);
}

#[tokio::test]
async fn read_only_flag_follows_the_location() {
	let storage = scripted_storage();
	let explorer = explorer(&storage);

	let mut home = Location::local("home", "/home");
	home.is_read_only = true;
	explorer.locations().open_location(&home).await.unwrap();

	assert!(explorer.snapshot().is_read_only);
}

#[tokio::test]
async fn watched_locations_reflect_external_changes() {
	let storage = scripted_storage();
	let index = RecordingIndex::new();
	let explorer = explorer_with_index(&storage, &index);

	let mut home = Location::local("home", "/home");
	home.watch_for_changes = true;
	explorer.locations().open_location(&home).await.unwrap();
	assert!(explorer.locations().is_watching().await);

	storage.emit(WatchEvent::Created {
		path: PathBuf::from("/home/.cache"),
		is_dir: true,
	});
	storage.emit(WatchEvent::Created {
		path: PathBuf::from("/home/todo.txt"),
		is_dir: false,
	});
	storage.emit(WatchEvent::Modified {
		path: PathBuf::from("/home/todo.txt"),
	});
	storage.emit(WatchEvent::Renamed {
		from: PathBuf::from("/home/notes.md"),
		to: PathBuf::from("/home/.notes.md"),
	});
	storage.emit(WatchEvent::Created {
		path: PathBuf::from("/home/done.txt"),
		is_dir: false,
	});

	let mut state_rx = explorer.subscribe();
	let state = timeout(
		Duration::from_secs(5),
		state_rx.wait_for(|state| state.entry("/home/done.txt").is_some()),
	)
	.await
	.expect("watch events were not reflected")
	.unwrap()
	.clone();

	assert_eq!(names(&state), vec!["todo.txt", "done.txt"]);
	assert!(index.calls().contains(&IndexCall::Delete(PathBuf::from("/home/notes.md"))));

	explorer.locations().close_location(home.id).await.unwrap();
	assert!(!explorer.locations().is_watching().await);
}

async fn watched_home(show_hidden: bool) -> (Arc<MockStorage>, Arc<RecordingIndex>, Explorer) {
	let storage = MockStorage::new();
	storage.set_listing(
		"/home",
		vec![
			RawEntry::file("/home/.profile", 3),
			RawEntry::file("/home/notes.md", 12),
		],
	);

	let index = RecordingIndex::new();
	let explorer = Explorer::builder(Arc::clone(&storage) as Arc<dyn StorageGateway>)
		.with_index(Arc::clone(&index) as Arc<dyn IndexService>)
		.with_settings(ExplorerSettings {
			show_unix_hidden_entries: show_hidden,
			..settings()
		})
		.build();

	let mut home = Location::local("home", "/home");
	home.watch_for_changes = true;
	explorer.locations().open_location(&home).await.unwrap();

	(storage, index, explorer)
}

/// Events go through the bridge in order, so once `path` shows up every
/// earlier event got handled
async fn settled_after(explorer: &Explorer, storage: &MockStorage, path: &str) -> Arc<SessionState> {
	storage.emit(WatchEvent::Created {
		path: PathBuf::from(path),
		is_dir: false,
	});

	let mut state_rx = explorer.subscribe();
	let state = timeout(
		Duration::from_secs(5),
		state_rx.wait_for(|state| state.entry(path).is_some()),
	)
	.await
	.expect("watch events were not reflected")
	.unwrap()
	.clone();
	state
}

#[tokio::test]
async fn hidden_watch_events_are_skipped() {
	let (storage, index, explorer) = watched_home(false).await;
	assert_eq!(names(&explorer.snapshot()), vec!["notes.md"]);

	storage.emit(WatchEvent::Created {
		path: PathBuf::from("/home/.cache"),
		is_dir: true,
	});
	storage.emit(WatchEvent::Removed {
		path: PathBuf::from("/home/.profile"),
	});
	storage.emit(WatchEvent::Renamed {
		from: PathBuf::from("/home/.draft.md"),
		to: PathBuf::from("/home/draft.md"),
	});

	let state = settled_after(&explorer, &storage, "/home/done.txt").await;

	assert_eq!(names(&state), vec!["notes.md", "done.txt"]);
	assert!(!index.calls().iter().any(|call| matches!(
		call,
		IndexCall::Create(path) | IndexCall::Delete(path) | IndexCall::Rename(path, _)
			if path != &PathBuf::from("/home/done.txt")
	)));
}

#[tokio::test]
async fn renaming_to_a_hidden_name_removes_the_entry() {
	let (storage, index, explorer) = watched_home(false).await;

	storage.emit(WatchEvent::Renamed {
		from: PathBuf::from("/home/notes.md"),
		to: PathBuf::from("/home/.notes.md"),
	});

	let state = settled_after(&explorer, &storage, "/home/done.txt").await;

	assert_eq!(names(&state), vec!["done.txt"]);
	let calls = index.calls();
	assert!(calls.contains(&IndexCall::Delete(PathBuf::from("/home/notes.md"))));
	assert!(!calls.iter().any(|call| matches!(call, IndexCall::Rename(..))));
}

#[tokio::test]
async fn hidden_entries_are_tracked_when_shown() {
	let (storage, index, explorer) = watched_home(true).await;
	assert_eq!(names(&explorer.snapshot()), vec![".profile", "notes.md"]);

	storage.emit(WatchEvent::Removed {
		path: PathBuf::from("/home/.profile"),
	});
	storage.emit(WatchEvent::Renamed {
		from: PathBuf::from("/home/notes.md"),
		to: PathBuf::from("/home/.notes.md"),
	});

	let state = settled_after(&explorer, &storage, "/home/.done").await;

	assert_eq!(names(&state), vec![".notes.md", ".done"]);
	assert!(index.calls().contains(&IndexCall::Rename(
		PathBuf::from("/home/notes.md"),
		PathBuf::from("/home/.notes.md")
	)));
}

#[tokio::test]
async fn cloud_locations_are_not_watched() {
	let storage = scripted_storage();
	let explorer = explorer(&storage);

	let mut bucket = Location::cloud("bucket", "/bucket");
	bucket.watch_for_changes = true;
	explorer.locations().open_location(&bucket).await.unwrap();

	assert!(!explorer.locations().is_watching().await);
}
