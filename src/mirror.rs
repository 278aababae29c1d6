//! Top-level mirror run loop
//!
//! Wires the watcher, queue, connection manager and dispatcher together.
//! One `select!` loop owns all scheduling: watcher events reset the
//! debounce sleeper, sleeper expiry spawns a drain, a connection state
//! change either spawns a drain (connected) or ends the run (failed).
//! Drains run as spawned tasks so late events keep accumulating into a
//! fresh pending set while a batch is in flight.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{sleep, Sleep};

use crate::action::Action;
use crate::config::Config;
use crate::connection::{ConnState, ConnectionManager};
use crate::dispatch::Dispatcher;
use crate::error::MirrorError;
use crate::logging::*;
use crate::queue::ActionQueue;
use crate::transport::Transport;
use crate::watch;

/// Run the mirror until the connection goes terminal or ctrl-c.
pub async fn run<T: Transport>(config: Config, transport: T) -> Result<(), MirrorError> {
	let base = config.base().to_path_buf();
	info!("using base path {}", base.display());

	let manager = Arc::new(ConnectionManager::new(
		transport,
		config.connection.retry,
		Duration::from_millis(config.connection.retry_delay_ms),
	));
	let queue = Arc::new(Mutex::new(ActionQueue::new()));
	let dispatcher = Arc::new(Dispatcher::new(
		manager.clone(),
		queue.clone(),
		base.clone(),
		config.paths.remote.clone(),
		config.connection.parallel,
	));

	let ignored = watch::compile_ignored(&config.watch.ignored)?;

	if !config.watch.ignore_initial {
		let mut q = queue.lock().await;
		for action in watch::initial_actions(&config.paths.source, &base, &ignored) {
			q.record(action);
		}
		if !q.is_empty() {
			info!("initial scan queued {} uploads", q.len());
		}
	}

	let (tx, rx) = mpsc::channel(1024);
	let _watcher = watch::spawn_watcher(&config.paths.source, base, ignored, tx)?;

	// Connect in the background; the watcher accumulates while we retry.
	let connector = manager.clone();
	tokio::spawn(async move {
		connector.connect().await;
	});

	let debounce = Duration::from_millis(config.connection.debounce_ms);
	tokio::select! {
		_ = event_loop(rx, queue, dispatcher, manager.clone(), debounce) => {}
		_ = tokio::signal::ctrl_c() => {
			info!("interrupted");
		}
	}

	manager.transport().close().await;
	Ok(())
}

/// Core scheduling loop, separated from `run` so tests can drive it with a
/// plain channel and a scripted transport.
pub async fn event_loop<T: Transport>(
	mut rx: mpsc::Receiver<Action>,
	queue: Arc<Mutex<ActionQueue>>,
	dispatcher: Arc<Dispatcher<T>>,
	manager: Arc<ConnectionManager<T>>,
	debounce: Duration,
) {
	let mut state_rx = manager.subscribe();
	let mut sleeper: Option<Pin<Box<Sleep>>> = if queue.lock().await.is_empty() {
		None
	} else {
		Some(Box::pin(sleep(debounce)))
	};

	loop {
		tokio::select! {
			Some(action) = rx.recv() => {
				if queue.lock().await.record(action) {
					// True debounce: every change restarts the quiet window.
					sleeper = Some(Box::pin(sleep(debounce)));
				}
			}
			_ = async { if let Some(s) = sleeper.as_mut() { s.as_mut().await } }, if sleeper.is_some() => {
				sleeper = None;
				spawn_drain(&dispatcher);
			}
			changed = state_rx.changed() => {
				if changed.is_err() {
					break;
				}
				match *state_rx.borrow_and_update() {
					ConnState::Connected => spawn_drain(&dispatcher),
					ConnState::Failed => {
						info!("giving up");
						break;
					}
					_ => {}
				}
			}
		}
	}
}

fn spawn_drain<T: Transport>(dispatcher: &Arc<Dispatcher<T>>) {
	let dispatcher = dispatcher.clone();
	tokio::spawn(async move {
		dispatcher.drain().await;
	});
}

// vim: ts=4
