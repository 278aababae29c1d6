/// Connection manager state machine: bounded retry, terminal failure with
/// no further connect attempts, and the termination signal.
use async_trait::async_trait;
use pushr::connection::{ConnState, ConnectionManager};
use pushr::error::TransportError;
use pushr::transport::Transport;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

struct FlakyTransport {
	/// Number of connect attempts that fail before one succeeds.
	fail_first: usize,
	connect_calls: AtomicUsize,
}

impl FlakyTransport {
	fn failing_forever() -> Self {
		FlakyTransport { fail_first: usize::MAX, connect_calls: AtomicUsize::new(0) }
	}

	fn failing(fail_first: usize) -> Self {
		FlakyTransport { fail_first, connect_calls: AtomicUsize::new(0) }
	}
}

#[async_trait]
impl Transport for FlakyTransport {
	async fn connect(&self) -> Result<(), TransportError> {
		let attempt = self.connect_calls.fetch_add(1, Ordering::SeqCst) + 1;
		if attempt <= self.fail_first {
			Err(TransportError::ConnectFailed {
				host: "example.com".into(),
				source: Box::new(io::Error::new(io::ErrorKind::ConnectionRefused, "refused")),
			})
		} else {
			Ok(())
		}
	}

	async fn ensure_dir(&self, _remote: &str) -> Result<(), TransportError> {
		Ok(())
	}

	async fn upload(&self, _local: &Path, _remote: &str) -> Result<(), TransportError> {
		Ok(())
	}

	async fn remove_file(&self, _remote: &str) -> Result<(), TransportError> {
		Ok(())
	}

	async fn remove_dir(&self, _remote: &str) -> Result<(), TransportError> {
		Ok(())
	}

	async fn close(&self) {}
}

#[tokio::test(start_paused = true)]
async fn test_retry_exhaustion_is_terminal() {
	let manager =
		ConnectionManager::new(FlakyTransport::failing_forever(), 3, Duration::from_millis(100));
	let state_rx = manager.subscribe();

	assert!(!manager.connect().await);
	assert_eq!(manager.state(), ConnState::Failed);
	assert_eq!(manager.retry_count(), 3);
	assert_eq!(manager.transport().connect_calls.load(Ordering::SeqCst), 3);

	// The termination signal is observable without polling.
	assert_eq!(*state_rx.borrow(), ConnState::Failed);

	// Terminal means terminal: no fourth attempt.
	assert!(!manager.connect().await);
	assert_eq!(manager.transport().connect_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_connect_succeeds_after_transient_failures() {
	let manager = ConnectionManager::new(FlakyTransport::failing(2), 5, Duration::from_millis(100));

	assert!(manager.connect().await);
	assert_eq!(manager.state(), ConnState::Connected);
	assert!(manager.is_connected());
	assert_eq!(manager.retry_count(), 2);
	assert_eq!(manager.transport().connect_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_handle_closed_reconnects() {
	let manager = ConnectionManager::new(FlakyTransport::failing(0), 3, Duration::from_millis(100));
	assert!(manager.connect().await);

	manager.handle_closed().await;

	assert!(manager.is_connected());
	assert_eq!(manager.retry_count(), 1);
	assert_eq!(manager.transport().connect_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_handle_closed_respects_retry_budget() {
	let manager = ConnectionManager::new(FlakyTransport::failing(0), 1, Duration::from_millis(100));
	assert!(manager.connect().await);

	manager.handle_closed().await;

	assert_eq!(manager.state(), ConnState::Failed);
	assert_eq!(manager.transport().connect_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_handle_closed_when_not_connected_is_noop() {
	let manager =
		ConnectionManager::new(FlakyTransport::failing_forever(), 3, Duration::from_millis(100));

	manager.handle_closed().await;

	assert_eq!(manager.state(), ConnState::Disconnected);
	assert_eq!(manager.retry_count(), 0);
	assert_eq!(manager.transport().connect_calls.load(Ordering::SeqCst), 0);
}

// vim: ts=4
