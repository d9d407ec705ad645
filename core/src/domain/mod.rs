//! Plain data the session is made of

pub mod entry;
pub mod location;
pub mod paths;
pub mod tag;

pub use entry::{DirectoryEntry, EntryMetaPatch, OpenedEntry};
pub use location::{ActiveLocation, Location, LocationKind};
pub use tag::{Tag, TagProvenance, TagSyntax};
