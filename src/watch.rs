//! Filesystem watcher glue
//!
//! Raw notify events are mapped to actions and pushed into the event
//! channel; the queue does all reconciliation. Directory creations are not
//! mirrored directly, remote directories materialize through the
//! ensure-directory step on upload.

use globset::{Glob, GlobSet, GlobSetBuilder};
use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use walkdir::WalkDir;

use crate::action::Action;
use crate::error::{ConfigError, MirrorError};
use crate::logging::*;

/// Compile the configured ignore patterns.
pub fn compile_ignored(patterns: &[String]) -> Result<Option<GlobSet>, ConfigError> {
	if patterns.is_empty() {
		return Ok(None);
	}
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		let glob = Glob::new(pattern).map_err(|e| ConfigError::BadPattern {
			pattern: pattern.clone(),
			message: e.to_string(),
		})?;
		builder.add(glob);
	}
	builder.build().map(Some).map_err(|e| ConfigError::BadPattern {
		pattern: patterns.join(", "),
		message: e.to_string(),
	})
}

/// Match a path against the ignore set, preferring its base-relative form.
pub fn is_ignored(set: &Option<GlobSet>, base: &Path, path: &Path) -> bool {
	match set {
		Some(set) => {
			let rel = path.strip_prefix(base).unwrap_or(path);
			set.is_match(rel) || set.is_match(path)
		}
		None => false,
	}
}

/// Map one notify event to zero or more actions.
pub fn event_actions(event: notify::Event) -> Vec<Action> {
	let mut actions = Vec::new();
	match event.kind {
		EventKind::Create(CreateKind::File) | EventKind::Create(CreateKind::Any) => {
			for p in event.paths {
				actions.push(Action::Upload(p));
			}
		}
		EventKind::Modify(ModifyKind::Data(_))
		| EventKind::Modify(ModifyKind::Metadata(_))
		| EventKind::Modify(ModifyKind::Any) => {
			for p in event.paths {
				actions.push(Action::Upload(p));
			}
		}
		EventKind::Modify(ModifyKind::Name(mode)) => match mode {
			RenameMode::Both if event.paths.len() == 2 => {
				let mut paths = event.paths;
				let to = paths.pop();
				let from = paths.pop();
				if let (Some(from), Some(to)) = (from, to) {
					actions.push(Action::DeleteFile(from));
					actions.push(Action::Upload(to));
				}
			}
			RenameMode::From => {
				for p in event.paths {
					actions.push(Action::DeleteFile(p));
				}
			}
			RenameMode::To => {
				for p in event.paths {
					actions.push(Action::Upload(p));
				}
			}
			_ => {}
		},
		EventKind::Remove(RemoveKind::Folder) => {
			for p in event.paths {
				actions.push(Action::DeleteDirectory(p));
			}
		}
		EventKind::Remove(_) => {
			for p in event.paths {
				actions.push(Action::DeleteFile(p));
			}
		}
		_ => {}
	}
	actions
}

/// Start watching the given roots recursively. The returned watcher must be
/// kept alive for the lifetime of the mirror.
pub fn spawn_watcher(
	roots: &[PathBuf],
	base: PathBuf,
	ignored: Option<GlobSet>,
	tx: mpsc::Sender<Action>,
) -> Result<RecommendedWatcher, MirrorError> {
	let mut watcher = RecommendedWatcher::new(
		move |res: Result<notify::Event, notify::Error>| match res {
			Ok(event) => {
				for action in event_actions(event) {
					if is_ignored(&ignored, &base, action.path()) {
						continue;
					}
					if tx.blocking_send(action).is_err() {
						// Event loop is gone; nothing left to notify.
						return;
					}
				}
			}
			Err(e) => error!("watcher error: {}", e),
		},
		notify::Config::default(),
	)?;
	for root in roots {
		watcher.watch(root, RecursiveMode::Recursive)?;
	}
	Ok(watcher)
}

/// Upload actions for everything already under the watch roots, mirroring
/// the initial pass the watcher itself would report on a cold start.
pub fn initial_actions(roots: &[PathBuf], base: &Path, ignored: &Option<GlobSet>) -> Vec<Action> {
	let mut actions = Vec::new();
	for root in roots {
		for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
			if !entry.file_type().is_file() {
				continue;
			}
			let path = entry.into_path();
			if !is_ignored(ignored, base, &path) {
				actions.push(Action::Upload(path));
			}
		}
	}
	actions
}


// vim: ts=4
