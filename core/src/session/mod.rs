//! Session state and the store that owns it

mod event;
mod reducer;
pub mod selectors;
mod state;
mod store;

pub use event::SessionEvent;
pub use reducer::reduce;
pub use state::{LoadToken, Notification, NotificationKind, SessionState, LOADING_NOTIFICATION_KEY};
pub use store::SessionStore;
