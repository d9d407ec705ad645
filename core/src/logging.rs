use crate::config::AppConfig;

use std::fs;

use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
	filter::LevelFilter,
	fmt::{self, Layer},
	prelude::*,
	EnvFilter,
};

#[cfg(debug_assertions)]
const CONSOLE_LOG_FILTER: LevelFilter = LevelFilter::DEBUG;

#[cfg(not(debug_assertions))]
const CONSOLE_LOG_FILTER: LevelFilter = LevelFilter::INFO;

/// Install the global subscriber: console output plus a daily rolling file in
/// `<data_dir>/logs`. Keep the returned guard alive or buffered lines get lost.
pub fn init_logging(config: &AppConfig) -> anyhow::Result<WorkerGuard> {
	let logs_dir = config.logs_dir();
	fs::create_dir_all(&logs_dir)?;

	let (non_blocking, guard) = tracing_appender::non_blocking(rolling::daily(logs_dir, "log"));

	let filter = EnvFilter::builder()
		.with_default_directive(config.log_level.parse().unwrap_or(LevelFilter::INFO.into()))
		.from_env_lossy()
		// Dependencies stay quiet unless asked for
		.add_directive("notify=warn".parse()?);

	tracing_subscriber::registry()
		.with(filter)
		.with(fmt::layer().with_filter(CONSOLE_LOG_FILTER))
		.with(
			Layer::default()
				.with_writer(non_blocking)
				.with_ansi(false)
				.with_filter(LevelFilter::DEBUG),
		)
		.try_init()?;

	Ok(guard)
}
