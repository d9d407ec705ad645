use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_BORDERS_ONLY, Table};
use tagdeck_core::{
	domain::{DirectoryEntry, Location},
	logging::init_logging,
	storage::LocalStorage,
	AppConfig, Explorer, SessionState,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "tagdeck", about = "Browse tagged directories from the terminal")]
struct Cli {
	/// Path to the tagdeck data directory
	#[arg(long, env = "TAGDECK_DATA_DIR")]
	data_dir: Option<PathBuf>,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// List a directory with its tags
	Ls {
		dir: PathBuf,
		/// Also list entries starting with a dot
		#[arg(long, default_value_t = false)]
		hidden: bool,
	},
	/// Open a directory as a watched location and print it on every change
	Watch { dir: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	let config = match &cli.data_dir {
		Some(data_dir) => AppConfig::load_from(data_dir)?,
		None => AppConfig::load()?,
	};
	let _guard = init_logging(&config)?;

	match cli.command {
		Commands::Ls { dir, hidden } => {
			let dir = dir
				.canonicalize()
				.with_context(|| format!("no such directory: {}", dir.display()))?;

			let mut settings = config.explorer.clone();
			settings.show_unix_hidden_entries |= hidden;
			// Nothing would look at them
			settings.use_generate_thumbnails = false;

			let explorer = Explorer::builder(Arc::new(LocalStorage::new()))
				.with_settings(settings)
				.build();

			let load = explorer.loader().load_directory(&dir).await?;
			if let Some(notification) = &load.state.notification {
				bail!("{}", notification.text);
			}

			println!("{}", entries_table(load.entries()));
		}
		Commands::Watch { dir } => {
			let dir = dir
				.canonicalize()
				.with_context(|| format!("no such directory: {}", dir.display()))?;

			let explorer = Explorer::builder(Arc::new(LocalStorage::new()))
				.with_settings(config.explorer.clone())
				.build();

			let mut location = Location::local(
				dir.file_name()
					.map_or_else(|| dir.display().to_string(), |name| name.to_string_lossy().to_string()),
				&dir,
			);
			location.watch_for_changes = true;

			let mut state_rx = explorer.subscribe();
			explorer.locations().open_location(&location).await?;
			info!(dir = %dir.display(), "Watching, press Ctrl+C to stop");

			print_state(&explorer.snapshot());

			loop {
				tokio::select! {
					changed = state_rx.changed() => {
						if changed.is_err() {
							break;
						}
						let state = Arc::clone(&state_rx.borrow_and_update());
						print_state(&state);
					}
					_ = tokio::signal::ctrl_c() => {
						info!("Stopping");
						break;
					}
				}
			}

			explorer.locations().close_location(location.id).await?;
		}
	}

	Ok(())
}

fn print_state(state: &SessionState) {
	if state.is_loading {
		return;
	}

	if let Some(notification) = &state.notification {
		println!("[{}] {}", notification.kind, notification.text);
	}

	println!("{}", entries_table(&state.entries));
}

fn entries_table(entries: &[DirectoryEntry]) -> Table {
	let mut table = Table::new();
	table.load_preset(UTF8_BORDERS_ONLY);
	table.set_header(vec!["Name", "Kind", "Size", "Modified", "Tags"]);

	for entry in entries {
		let tags = entry
			.tags
			.iter()
			.map(|tag| tag.title.as_str())
			.collect::<Vec<_>>()
			.join(", ");

		table.add_row(vec![
			entry.name.clone(),
			if entry.is_file { entry.extension.clone() } else { "folder".to_string() },
			entry.size.to_string(),
			entry.last_modified.format("%Y-%m-%d %H:%M").to_string(),
			tags,
		]);
	}

	table
}
