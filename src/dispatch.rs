//! Dispatcher: drains batches of actions with bounded concurrency
//!
//! At most one drain runs at a time, guarded by `processing`. Within a
//! batch, up to `parallel` ensure-directory-then-operate sequences are in
//! flight at once; no ordering is guaranteed between distinct paths. A
//! failed action is logged and dropped, never retried — it reappears only
//! if a new watcher event records it again. Connection-class failures are
//! collected and handed to the connection manager once the batch settles.

use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::action::Action;
use crate::connection::ConnectionManager;
use crate::error::TransportError;
use crate::logging::*;
use crate::pathmap;
use crate::queue::ActionQueue;
use crate::transport::Transport;

pub struct Dispatcher<T> {
	manager: Arc<ConnectionManager<T>>,
	queue: Arc<Mutex<ActionQueue>>,
	base: PathBuf,
	remote_root: String,
	parallel: usize,
	processing: AtomicBool,
}

impl<T: Transport> Dispatcher<T> {
	pub fn new(
		manager: Arc<ConnectionManager<T>>,
		queue: Arc<Mutex<ActionQueue>>,
		base: PathBuf,
		remote_root: String,
		parallel: usize,
	) -> Self {
		Dispatcher {
			manager,
			queue,
			base,
			remote_root,
			parallel: parallel.max(1),
			processing: AtomicBool::new(false),
		}
	}

	pub fn is_processing(&self) -> bool {
		self.processing.load(Ordering::SeqCst)
	}

	/// Drain the queue. No-op when disconnected or when a drain is already
	/// in flight; the in-flight drain picks up anything recorded meanwhile
	/// before it lets go of the guard.
	pub async fn drain(&self) {
		if !self.manager.is_connected() {
			return;
		}
		if self.processing.swap(true, Ordering::SeqCst) {
			return;
		}

		loop {
			let batch = self.queue.lock().await.take_batch();
			if batch.is_empty() {
				break;
			}
			debug!("draining {} actions", batch.len());

			let lost = AtomicBool::new(false);
			stream::iter(batch)
				.for_each_concurrent(self.parallel, |action| {
					let lost = &lost;
					async move {
						if let Err(e) = self.run_action(&action).await {
							error!("{} failed for {}: {}", action.verb(), action.path().display(), e);
							if e.is_connection_lost() {
								lost.store(true, Ordering::SeqCst);
							}
						}
					}
				})
				.await;

			if lost.load(Ordering::SeqCst) {
				self.processing.store(false, Ordering::SeqCst);
				self.manager.handle_closed().await;
				return;
			}
		}

		self.processing.store(false, Ordering::SeqCst);
	}

	async fn run_action(&self, action: &Action) -> Result<(), TransportError> {
		let transport = self.manager.transport();
		let dir = pathmap::remote_dir(action, &self.base, &self.remote_root);
		transport.ensure_dir(&dir).await?;

		let rel = pathmap::display_path(action.path(), &self.base);
		match action {
			Action::Upload(local) => {
				info!("uploading {}", rel);
				let remote = pathmap::remote_path(local, &self.base, &self.remote_root);
				transport.upload(local, &remote).await?;
				info!("upload complete: {}", rel);
			}
			Action::DeleteFile(local) => {
				info!("deleting {}", rel);
				let remote = pathmap::remote_path(local, &self.base, &self.remote_root);
				transport.remove_file(&remote).await?;
				info!("delete complete: {}", rel);
			}
			Action::DeleteDirectory(local) => {
				info!("deleting {}/", rel);
				let remote = pathmap::remote_path(local, &self.base, &self.remote_root);
				transport.remove_dir(&remote).await?;
				info!("delete complete: {}/", rel);
			}
		}
		Ok(())
	}
}

// vim: ts=4
