//! Raw and normalized event types

use std::path::PathBuf;
use std::time::SystemTime;

use notify::event::{ModifyKind, RenameMode};
use notify::EventKind;
use serde::{Deserialize, Serialize};

/// Coarse classification of a native notification, before platform handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEventKind {
    Create,
    Modify,
    Remove,
    /// A rename, either with both paths or only one half of it
    Rename,
    Other(String),
}

/// A native notification stripped down to what the handlers need
#[derive(Debug, Clone)]
pub struct RawNotifyEvent {
    pub kind: RawEventKind,
    pub paths: Vec<PathBuf>,
    pub timestamp: SystemTime,
}

impl RawNotifyEvent {
    pub fn primary_path(&self) -> Option<&PathBuf> {
        self.paths.first()
    }
}

impl From<notify::Event> for RawNotifyEvent {
    fn from(event: notify::Event) -> Self {
        let kind = match event.kind {
            EventKind::Create(_) => RawEventKind::Create,
            EventKind::Remove(_) => RawEventKind::Remove,
            EventKind::Modify(ModifyKind::Name(
                RenameMode::Both | RenameMode::From | RenameMode::To | RenameMode::Any,
            )) => RawEventKind::Rename,
            EventKind::Modify(_) => RawEventKind::Modify,
            other => RawEventKind::Other(format!("{other:?}")),
        };

        Self {
            kind,
            paths: event.paths,
            timestamp: SystemTime::now(),
        }
    }
}

/// Normalized event kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FsEventKind {
    Create,
    Modify,
    Remove,
    /// `path` on the event is the destination
    Rename { from: PathBuf },
}

impl FsEventKind {
    pub fn is_create(&self) -> bool {
        matches!(self, Self::Create)
    }

    pub fn is_modify(&self) -> bool {
        matches!(self, Self::Modify)
    }

    pub fn is_remove(&self) -> bool {
        matches!(self, Self::Remove)
    }

    pub fn is_rename(&self) -> bool {
        matches!(self, Self::Rename { .. })
    }
}

/// A normalized filesystem event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsEvent {
    pub kind: FsEventKind,
    pub path: PathBuf,
    /// Filled in by the watcher when the path could be inspected
    pub is_directory: Option<bool>,
}

impl FsEvent {
    pub fn create(path: PathBuf) -> Self {
        Self {
            kind: FsEventKind::Create,
            path,
            is_directory: None,
        }
    }

    pub fn modify(path: PathBuf) -> Self {
        Self {
            kind: FsEventKind::Modify,
            path,
            is_directory: None,
        }
    }

    pub fn remove(path: PathBuf) -> Self {
        Self {
            kind: FsEventKind::Remove,
            path,
            is_directory: None,
        }
    }

    pub fn rename(from: PathBuf, to: PathBuf) -> Self {
        Self {
            kind: FsEventKind::Rename { from },
            path: to,
            is_directory: None,
        }
    }

    pub fn with_is_directory(mut self, is_directory: Option<bool>) -> Self {
        self.is_directory = is_directory;
        self
    }
}
