//! Pending action set with dedup and directory-delete reconciliation
//!
//! The queue owns the pending set exclusively. Watcher events are recorded
//! into it, deduplicated by path, and handed to the dispatcher as a by-value
//! batch once the debounce window has elapsed. The swap in `take_batch` is
//! atomic with respect to the single event loop, so events arriving during a
//! drain start a fresh set instead of racing with the batch in flight.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::action::Action;

#[derive(Debug, Default)]
pub struct ActionQueue {
	pending: BTreeMap<PathBuf, Action>,
}

impl ActionQueue {
	pub fn new() -> Self {
		ActionQueue { pending: BTreeMap::new() }
	}

	/// Record an action, replacing any pending action for the same path.
	///
	/// Last event wins: a Delete recorded after a pending Upload for the
	/// same path drops the upload entirely. Returns true when the pending
	/// set changed, which is the caller's cue to restart the debounce
	/// timer; recording an action identical to the pending one is a no-op.
	pub fn record(&mut self, action: Action) -> bool {
		let path = action.path().to_path_buf();
		if self.pending.get(&path) == Some(&action) {
			return false;
		}
		self.pending.insert(path, action);
		true
	}

	pub fn is_empty(&self) -> bool {
		self.pending.is_empty()
	}

	pub fn len(&self) -> usize {
		self.pending.len()
	}

	/// Reconcile and drain the pending set.
	///
	/// Directory-delete cascade filtering runs first: a pending file delete
	/// whose parent directory is itself pending deletion is dropped, since
	/// the remote directory removal is recursive. The pending set is then
	/// swapped for an empty one and returned as the batch.
	pub fn take_batch(&mut self) -> Vec<Action> {
		let dirs: BTreeSet<PathBuf> = self
			.pending
			.values()
			.filter_map(|a| match a {
				Action::DeleteDirectory(p) => Some(p.clone()),
				_ => None,
			})
			.collect();

		if !dirs.is_empty() {
			self.pending.retain(|path, action| {
				let subsumed = matches!(action, Action::DeleteFile(_))
					&& path.parent().map_or(false, |parent| dirs.contains(parent));
				!subsumed
			});
		}

		std::mem::take(&mut self.pending).into_values().collect()
	}
}


// vim: ts=4
