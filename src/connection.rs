//! Connection manager: owns the remote session and its retry state machine
//!
//! States: `Disconnected → Connecting → Connected`, back to `Disconnected`
//! on a drop, and `Failed` once the retry budget is spent. The retry count
//! is monotonic for the process lifetime; it never resets on a successful
//! reconnect. `Failed` is terminal and doubles as the process termination
//! signal, observable through the state watch channel.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::watch;

use crate::logging::*;
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
	Disconnected,
	Connecting,
	Connected,
	Failed,
}

pub struct ConnectionManager<T> {
	transport: T,
	max_retries: u32,
	retry_delay: Duration,
	retry_count: AtomicU32,
	state_tx: watch::Sender<ConnState>,
}

impl<T: Transport> ConnectionManager<T> {
	pub fn new(transport: T, max_retries: u32, retry_delay: Duration) -> Self {
		let (state_tx, _) = watch::channel(ConnState::Disconnected);
		ConnectionManager {
			transport,
			max_retries: max_retries.max(1),
			retry_delay,
			retry_count: AtomicU32::new(0),
			state_tx,
		}
	}

	pub fn state(&self) -> ConnState {
		*self.state_tx.borrow()
	}

	pub fn is_connected(&self) -> bool {
		self.state() == ConnState::Connected
	}

	pub fn retry_count(&self) -> u32 {
		self.retry_count.load(Ordering::SeqCst)
	}

	/// Watch channel over the connection state. `Connected` is the cue to
	/// drain; `Failed` is the termination signal.
	pub fn subscribe(&self) -> watch::Receiver<ConnState> {
		self.state_tx.subscribe()
	}

	/// Transport primitives, for the dispatcher.
	pub fn transport(&self) -> &T {
		&self.transport
	}

	fn set_state(&self, state: ConnState) {
		self.state_tx.send_replace(state);
	}

	/// Connect with bounded retry. Returns true once connected, false when
	/// the retry budget is exhausted and the manager has gone terminal.
	pub async fn connect(&self) -> bool {
		loop {
			if self.state() == ConnState::Failed {
				return false;
			}
			self.set_state(ConnState::Connecting);
			let attempt = self.retry_count() + 1;
			info!("connecting ({} of {})", attempt, self.max_retries);
			match self.transport.connect().await {
				Ok(()) => {
					info!("connected");
					self.set_state(ConnState::Connected);
					return true;
				}
				Err(e) => {
					warn!("connect failed: {}", e);
					if !self.register_close() {
						return false;
					}
					tokio::time::sleep(self.retry_delay).await;
				}
			}
		}
	}

	/// Handle a session drop observed mid-operation: tear the session down
	/// and run the bounded reconnect loop.
	pub async fn handle_closed(&self) {
		if self.state() != ConnState::Connected {
			return;
		}
		warn!("connection closed");
		self.transport.close().await;
		if self.register_close() {
			tokio::time::sleep(self.retry_delay).await;
			self.connect().await;
		}
	}

	/// Record a dropped session. Returns false when retries are exhausted,
	/// in which case the manager is terminal and the done signal has fired.
	fn register_close(&self) -> bool {
		let closes = self.retry_count.fetch_add(1, Ordering::SeqCst) + 1;
		if closes >= self.max_retries {
			error!("connection retries exhausted ({} of {})", closes, self.max_retries);
			self.set_state(ConnState::Failed);
			false
		} else {
			self.set_state(ConnState::Disconnected);
			true
		}
	}
}

// vim: ts=4
