//! Application configuration

use crate::file_types::{default_file_types, FileTypeSetting};

use std::{
	fs,
	path::{Path, PathBuf},
};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const CONFIG_FILE_NAME: &str = "tagdeck.json";
const CONFIG_VERSION: u32 = 1;

pub const DEFAULT_HTML_FILE_CONTENT: &str = "<!DOCTYPE html><html><head>\
	<meta http-equiv=\"Content-Type\" content=\"text/html; charset=UTF-8\">\
	<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
	</head><body></body></html>";

/// Platform-specific data directory resolution
pub fn default_data_dir() -> Result<PathBuf> {
	#[cfg(target_os = "linux")]
	let dir = dirs::data_local_dir();

	#[cfg(not(target_os = "linux"))]
	let dir = dirs::data_dir();

	let dir = dir
		.ok_or_else(|| anyhow!("Could not determine data directory"))?
		.join("tagdeck");

	fs::create_dir_all(&dir)?;

	Ok(dir)
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
	/// Config schema version
	pub version: u32,

	/// Data directory path
	pub data_dir: PathBuf,

	/// Default tracing directive, `RUST_LOG` takes precedence
	pub log_level: String,

	#[serde(default)]
	pub explorer: ExplorerSettings,
}

/// Settings of the directory explorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerSettings {
	/// Show entries whose name starts with a dot
	pub show_unix_hidden_entries: bool,

	/// Generate thumbnails for loaded directories
	pub use_generate_thumbnails: bool,

	/// Separates tags inside the filename tag container
	pub tag_delimiter: String,

	/// Workers of the thumbnail pool, 0 generates one file per task without a pool
	pub thumbnail_workers: usize,

	pub supported_file_types: Vec<FileTypeSetting>,

	/// Template for new html files, content goes between `<body></body>`
	pub new_html_file_content: String,
}

impl Default for ExplorerSettings {
	fn default() -> Self {
		Self {
			show_unix_hidden_entries: false,
			use_generate_thumbnails: true,
			tag_delimiter: " ".to_string(),
			thumbnail_workers: std::thread::available_parallelism()
				.map(|workers| workers.get().min(4))
				.unwrap_or(1),
			supported_file_types: default_file_types(),
			new_html_file_content: DEFAULT_HTML_FILE_CONTENT.to_string(),
		}
	}
}

impl AppConfig {
	/// Load configuration from the default location
	pub fn load() -> Result<Self> {
		let data_dir = default_data_dir()?;
		Self::load_from(&data_dir)
	}

	/// Load configuration from a specific data directory, creating a default one if missing
	pub fn load_from(data_dir: impl AsRef<Path>) -> Result<Self> {
		let data_dir = data_dir.as_ref();
		let config_path = data_dir.join(CONFIG_FILE_NAME);

		if config_path.exists() {
			info!("Loading config from {:?}", config_path);
			let json = fs::read_to_string(&config_path)?;
			let config: AppConfig = serde_json::from_str(&json)?;

			if config.version > CONFIG_VERSION {
				return Err(anyhow!("Unknown config version: {}", config.version));
			}

			Ok(config)
		} else {
			warn!("No config found, creating default at {:?}", config_path);
			let config = Self::default_with_dir(data_dir.to_path_buf());
			config.save()?;
			Ok(config)
		}
	}

	pub fn default_with_dir(data_dir: PathBuf) -> Self {
		Self {
			version: CONFIG_VERSION,
			data_dir,
			log_level: "info".to_string(),
			explorer: ExplorerSettings::default(),
		}
	}

	/// Save configuration to disk
	pub fn save(&self) -> Result<()> {
		fs::create_dir_all(&self.data_dir)?;

		let config_path = self.data_dir.join(CONFIG_FILE_NAME);
		let json = serde_json::to_string_pretty(self)?;
		fs::write(&config_path, json)?;
		info!("Saved config to {:?}", config_path);
		Ok(())
	}

	pub fn logs_dir(&self) -> PathBuf {
		self.data_dir.join("logs")
	}
}
