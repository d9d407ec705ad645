use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WatcherError>;

#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("failed to create native watcher: {0}")]
    Notify(#[from] notify::Error),

    #[error("failed to watch path <path='{}'>: {source}", .path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("watch path does not exist <path='{}'>", .0.display())]
    PathNotFound(PathBuf),
}
