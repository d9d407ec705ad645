use crate::error::SessionError;

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, trace};

use super::{event::SessionEvent, reducer::reduce, state::SessionState};

enum StoreMessage {
	Dispatch {
		event: SessionEvent,
		ack: Option<oneshot::Sender<Arc<SessionState>>>,
	},
	Sync {
		ack: oneshot::Sender<Arc<SessionState>>,
	},
}

/// Owner of the session state.
///
/// Events go through an unbounded queue into a single task that applies them in
/// order, publishing a new snapshot only when something changed. Clones share
/// the same task, which stops once the last clone is dropped.
#[derive(Debug, Clone)]
pub struct SessionStore {
	messages_tx: mpsc::UnboundedSender<StoreMessage>,
	state_rx: watch::Receiver<Arc<SessionState>>,
}

impl SessionStore {
	/// Must be called from within a tokio runtime
	pub fn spawn(initial: SessionState) -> Self {
		let (messages_tx, messages_rx) = mpsc::unbounded_channel();
		let (state_tx, state_rx) = watch::channel(Arc::new(initial));

		tokio::spawn(run(messages_rx, state_tx));

		Self {
			messages_tx,
			state_rx,
		}
	}

	/// Queue `event` without waiting for it to be applied
	pub fn dispatch(&self, event: SessionEvent) {
		trace!(event = event.name(), "Dispatching session event");

		if self
			.messages_tx
			.send(StoreMessage::Dispatch { event, ack: None })
			.is_err()
		{
			error!("Session store is gone, dropping event;");
		}
	}

	/// Queue `event` and wait until it went through the reducer
	pub async fn apply(&self, event: SessionEvent) -> Result<Arc<SessionState>, SessionError> {
		let (ack_tx, ack_rx) = oneshot::channel();

		self.messages_tx
			.send(StoreMessage::Dispatch {
				event,
				ack: Some(ack_tx),
			})
			.map_err(|_| SessionError::StoreClosed)?;

		ack_rx.await.map_err(|_| SessionError::StoreClosed)
	}

	/// Wait until every event dispatched before this call has been applied
	pub async fn sync(&self) -> Result<Arc<SessionState>, SessionError> {
		let (ack_tx, ack_rx) = oneshot::channel();

		self.messages_tx
			.send(StoreMessage::Sync { ack: ack_tx })
			.map_err(|_| SessionError::StoreClosed)?;

		ack_rx.await.map_err(|_| SessionError::StoreClosed)
	}

	/// Latest published state
	pub fn snapshot(&self) -> Arc<SessionState> {
		Arc::clone(&self.state_rx.borrow())
	}

	/// Receiver notified on every published change
	pub fn subscribe(&self) -> watch::Receiver<Arc<SessionState>> {
		self.state_rx.clone()
	}
}

async fn run(
	mut messages_rx: mpsc::UnboundedReceiver<StoreMessage>,
	state_tx: watch::Sender<Arc<SessionState>>,
) {
	let mut state = Arc::clone(&state_tx.borrow());

	while let Some(message) = messages_rx.recv().await {
		match message {
			StoreMessage::Dispatch { event, ack } => {
				let name = event.name();
				let next = reduce(&state, event);

				if Arc::ptr_eq(&state, &next) {
					trace!(event = name, "Session event changed nothing");
				} else {
					trace!(event = name, "Session state changed");
					state = next;
					state_tx.send_replace(Arc::clone(&state));
				}

				if let Some(ack) = ack {
					// The caller may have stopped waiting
					let _ = ack.send(Arc::clone(&state));
				}
			}
			StoreMessage::Sync { ack } => {
				let _ = ack.send(Arc::clone(&state));
			}
		}
	}

	debug!("Session store stopped");
}
