//! Directory loading against scripted storage

mod helpers;

use helpers::*;

use std::{path::PathBuf, sync::Arc};

use pretty_assertions::assert_eq;
use tagdeck_core::{
	domain::{Location, TagProvenance},
	session::NotificationKind,
	sidecar::{SidecarMeta, SidecarTag},
	storage::{RawEntry, StorageGateway},
	Explorer, ExplorerSettings, SessionError,
};
use tracing_test::traced_test;

fn docs_listing() -> Vec<RawEntry> {
	vec![
		RawEntry::folder("/docs/.git"),
		RawEntry::file("/docs/a.txt", 3),
		RawEntry::file("/docs/b.txt", 5),
	]
}

#[tokio::test]
#[traced_test]
async fn hidden_entries_are_left_out() {
	let storage = MockStorage::new();
	storage.set_listing("/docs", docs_listing());
	let explorer = explorer(&storage);

	let load = explorer.loader().load_directory("/docs").await.unwrap();

	assert!(load.committed);
	assert_eq!(names(&load.state), vec!["a.txt", "b.txt"]);
	assert!(!load.state.is_loading);
	assert_eq!(load.state.notification, None);
}

#[tokio::test]
async fn hidden_entries_are_listed_when_enabled() {
	let storage = MockStorage::new();
	storage.set_listing("/docs", docs_listing());
	let explorer = Explorer::builder(Arc::clone(&storage) as Arc<dyn StorageGateway>)
		.with_settings(ExplorerSettings {
			show_unix_hidden_entries: true,
			..settings()
		})
		.build();

	let load = explorer.loader().load_directory("/docs").await.unwrap();

	assert_eq!(names(&load.state), vec![".git", "a.txt", "b.txt"]);
}

#[tokio::test]
async fn entries_are_enriched_with_tags_and_sidecars() {
	let storage = MockStorage::new();
	storage.set_listing(
		"/docs",
		vec![RawEntry::file("/docs/report[draft 2024].pdf", 10).with_sidecar(SidecarMeta {
			color: Some("#ff0000".to_string()),
			description: Some("quarterly".to_string()),
			tags: vec![SidecarTag {
				title: "work".to_string(),
				color: None,
				text_color: None,
			}],
		})],
	);
	let explorer = explorer(&storage);

	let load = explorer.loader().load_directory("/docs").await.unwrap();
	let entry = &load.entries()[0];

	assert_eq!(entry.extension, "pdf");
	assert_eq!(entry.color.as_deref(), Some("#ff0000"));
	assert_eq!(entry.description.as_deref(), Some("quarterly"));
	assert_eq!(
		entry
			.tags
			.iter()
			.map(|tag| (tag.title.as_str(), tag.provenance))
			.collect::<Vec<_>>(),
		vec![
			("draft", TagProvenance::Filename),
			("2024", TagProvenance::Filename),
			("work", TagProvenance::Sidecar),
		]
	);
}

#[tokio::test]
#[traced_test]
async fn listing_failure_leaves_an_empty_listing_and_a_warning() {
	let storage = MockStorage::new();
	storage.set_listing("/docs", docs_listing());
	storage.fail_on("/docs");
	let explorer = explorer(&storage);

	let load = explorer.loader().load_directory("/docs").await.unwrap();

	assert!(load.committed);
	assert!(load.entries().is_empty());
	assert!(!load.state.is_loading);
	assert_eq!(
		load.state.notification.as_ref().map(|notification| notification.kind),
		Some(NotificationKind::Warning)
	);
	assert!(logs_contain("Failed to list directory"));
}

#[tokio::test]
async fn superseded_load_does_not_commit() {
	let storage = MockStorage::new();
	storage.set_listing("/slow", vec![RawEntry::file("/slow/old.txt", 1)]);
	storage.set_listing("/fast", vec![RawEntry::file("/fast/new.txt", 1)]);
	storage.gate("/slow");
	let explorer = explorer(&storage);

	let loader = explorer.loader().clone();
	let slow = tokio::spawn(async move { loader.load_directory("/slow").await });

	// Wait for the slow load to get its token
	let mut state_rx = explorer.subscribe();
	state_rx
		.wait_for(|state| state.current_directory_path == Some(PathBuf::from("/slow")))
		.await
		.unwrap();

	let fast = explorer.loader().load_directory("/fast").await.unwrap();
	assert!(fast.committed);

	storage.release("/slow");
	let slow = slow.await.unwrap().unwrap();

	assert!(!slow.committed);
	assert!(slow.token < fast.token);

	let state = explorer.snapshot();
	assert_eq!(state.current_directory_path, Some(PathBuf::from("/fast")));
	assert_eq!(names(&state), vec!["new.txt"]);
}

#[tokio::test]
async fn parent_directory_stays_inside_the_location() {
	let storage = MockStorage::new();
	storage.set_listing("/root", vec![RawEntry::folder("/root/sub")]);
	storage.set_listing("/root/sub", vec![RawEntry::file("/root/sub/a.txt", 1)]);
	let explorer = explorer(&storage);

	let location = Location::local("root", "/root");
	explorer.locations().open_location(&location).await.unwrap();
	explorer.loader().load_directory("/root/sub").await.unwrap();

	let parent = explorer.loader().load_parent_directory().await.unwrap();
	assert_eq!(parent.path, PathBuf::from("/root"));
	assert_eq!(names(&parent.state), vec!["sub"]);

	let outside = explorer.loader().load_parent_directory().await;
	assert!(matches!(outside, Err(SessionError::ParentOutsideLocation(_))));
	assert_eq!(
		explorer.snapshot().current_directory_path,
		Some(PathBuf::from("/root"))
	);
}

#[tokio::test]
async fn parent_directory_needs_an_open_directory() {
	let storage = MockStorage::new();
	let explorer = explorer(&storage);

	let result = explorer.loader().load_parent_directory().await;

	assert!(matches!(result, Err(SessionError::NoDirectoryOpened)));
}

#[tokio::test]
async fn directory_color_comes_from_the_folder_sidecar() {
	let storage = MockStorage::new();
	storage.set_listing("/docs", docs_listing());
	storage.set_file("/docs/.ts/tsm.json", br##"{"color":"#00ff00","tags":[]}"##.to_vec());
	let explorer = explorer(&storage);

	explorer.loader().load_directory("/docs").await.unwrap();

	let mut state_rx = explorer.subscribe();
	let state = state_rx
		.wait_for(|state| state.current_directory_color.is_some())
		.await
		.unwrap()
		.clone();

	assert_eq!(state.current_directory_color.as_deref(), Some("#00ff00"));
}

#[tokio::test]
async fn search_results_replace_the_listing() {
	let storage = MockStorage::new();
	storage.set_listing("/docs", docs_listing());
	let explorer = explorer(&storage);

	let load = explorer.loader().load_directory("/docs").await.unwrap();
	let found = load.entries()[1..].to_vec();

	let state = explorer.loader().show_search_results(found).await.unwrap();

	assert_eq!(names(&state), vec!["b.txt"]);
}
