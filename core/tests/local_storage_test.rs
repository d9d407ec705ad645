//! The explorer on top of a real directory

mod helpers;

use helpers::settings;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tagdeck_core::{
	domain::{Location, TagProvenance},
	ops::NewFileKind,
	storage::{LocalStorage, StorageError},
	Explorer, SessionError,
};
use tempfile::TempDir;
use tokio::fs;

async fn workspace() -> TempDir {
	let temp_dir = TempDir::new().unwrap();
	let root = temp_dir.path();

	fs::create_dir_all(root.join(".git")).await.unwrap();
	fs::create_dir_all(root.join(".ts")).await.unwrap();
	fs::create_dir_all(root.join("sub/nested")).await.unwrap();
	fs::write(root.join("sub/nested/deep.txt"), "deep").await.unwrap();
	fs::write(root.join("a[x y].txt"), "alpha").await.unwrap();
	fs::write(root.join("b.txt"), "bravo!").await.unwrap();
	fs::write(
		root.join(".ts/a[x y].txt.json"),
		r##"{"color":"#ff00ff","tags":[{"title":"starred","textcolor":"#fff"}],"appVersion":"5.0"}"##,
	)
	.await
	.unwrap();

	temp_dir
}

fn local_explorer() -> Explorer {
	Explorer::builder(Arc::new(LocalStorage::new()))
		.with_settings(settings())
		.build()
}

#[tokio::test]
async fn lists_a_real_directory() {
	let temp_dir = workspace().await;
	let explorer = local_explorer();

	let load = explorer
		.loader()
		.load_directory(temp_dir.path())
		.await
		.unwrap();

	assert!(load.committed);
	assert_eq!(names(&load), vec!["sub", "a[x y].txt", "b.txt"]);

	let tagged = &load.entries()[1];
	assert_eq!(tagged.size, 5);
	assert_eq!(tagged.color.as_deref(), Some("#ff00ff"));
	assert_eq!(
		tagged
			.tags
			.iter()
			.map(|tag| (tag.title.as_str(), tag.provenance))
			.collect::<Vec<_>>(),
		vec![
			("x", TagProvenance::Filename),
			("y", TagProvenance::Filename),
			("starred", TagProvenance::Sidecar),
		]
	);
}

fn names(load: &tagdeck_core::loader::DirectoryLoad) -> Vec<&str> {
	load.entries().iter().map(|entry| entry.name.as_str()).collect()
}

#[tokio::test]
async fn file_operations_touch_the_disk() {
	let temp_dir = workspace().await;
	let root = temp_dir.path();
	let explorer = local_explorer();

	explorer
		.locations()
		.open_location(&Location::local("workspace", root))
		.await
		.unwrap();

	let notes = explorer
		.files()
		.create_file_advanced(root, "notes", "# Notes", NewFileKind::Md)
		.await
		.unwrap();
	assert_eq!(fs::read_to_string(&notes).await.unwrap(), "# Notes");

	let renamed = root.join("a[z].txt");
	explorer
		.files()
		.rename_file(&root.join("a[x y].txt"), &renamed)
		.await
		.unwrap();
	assert!(fs::try_exists(&renamed).await.unwrap());
	assert!(fs::try_exists(root.join(".ts/a[z].txt.json")).await.unwrap());

	let state = explorer
		.files()
		.delete_directory(&root.join("sub"))
		.await
		.unwrap();
	assert!(!fs::try_exists(root.join("sub")).await.unwrap());

	assert_eq!(state.entry_names(), vec!["a[z].txt", "b.txt", "notes.md"]);
	assert_eq!(
		state
			.entry(&renamed)
			.unwrap()
			.tags
			.iter()
			.map(|tag| tag.title.as_str())
			.collect::<Vec<_>>(),
		vec!["starred", "z"]
	);
}

#[tokio::test]
async fn renaming_onto_an_existing_file_fails() {
	let temp_dir = workspace().await;
	let root = temp_dir.path();
	let explorer = local_explorer();

	explorer.loader().load_directory(root).await.unwrap();

	let result = explorer
		.files()
		.rename_file(&root.join("b.txt"), &root.join("a[x y].txt"))
		.await;

	assert!(matches!(
		result,
		Err(SessionError::FileOperationFailure(StorageError::AlreadyExists(_)))
	));
	assert_eq!(fs::read_to_string(root.join("b.txt")).await.unwrap(), "bravo!");
}

#[tokio::test]
async fn cloud_locations_are_unsupported_locally() {
	let temp_dir = workspace().await;
	let explorer = local_explorer();

	let result = explorer
		.locations()
		.open_location(&Location::cloud("bucket", temp_dir.path()))
		.await;

	assert!(matches!(
		result,
		Err(SessionError::ObjectStoreActivationFailure {
			source: StorageError::Unsupported(_),
			..
		})
	));
}
