//! Pending remote operations derived from filesystem events

use std::path::{Path, PathBuf};

/// A queued intent to upload or delete a specific remote path.
///
/// Actions are immutable once created. The pending set keys them by local
/// path with last-event-wins replacement, so at most one action is ever
/// pending per path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
	/// Upload a local file to its mapped remote path
	Upload(PathBuf),

	/// Delete the remote file mapped from this local path
	DeleteFile(PathBuf),

	/// Recursively delete the remote directory mapped from this local path
	DeleteDirectory(PathBuf),
}

impl Action {
	/// Local path this action refers to.
	pub fn path(&self) -> &Path {
		match self {
			Action::Upload(p) | Action::DeleteFile(p) | Action::DeleteDirectory(p) => p,
		}
	}

	pub fn is_directory(&self) -> bool {
		matches!(self, Action::DeleteDirectory(_))
	}

	pub fn is_delete(&self) -> bool {
		matches!(self, Action::DeleteFile(_) | Action::DeleteDirectory(_))
	}

	/// Verb used for status lines.
	pub fn verb(&self) -> &'static str {
		match self {
			Action::Upload(_) => "upload",
			Action::DeleteFile(_) | Action::DeleteDirectory(_) => "delete",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_path_accessor() {
		let a = Action::Upload(PathBuf::from("/base/a.txt"));
		assert_eq!(a.path(), Path::new("/base/a.txt"));
		assert!(!a.is_directory());
		assert!(!a.is_delete());
	}

	#[test]
	fn test_directory_flag() {
		assert!(Action::DeleteDirectory(PathBuf::from("/base/dir")).is_directory());
		assert!(!Action::DeleteFile(PathBuf::from("/base/dir")).is_directory());
		assert!(Action::DeleteFile(PathBuf::from("/base/dir")).is_delete());
	}

	#[test]
	fn test_equality_is_kind_and_path() {
		let upload = Action::Upload(PathBuf::from("/base/a.txt"));
		let delete = Action::DeleteFile(PathBuf::from("/base/a.txt"));
		assert_eq!(upload, Action::Upload(PathBuf::from("/base/a.txt")));
		assert_ne!(upload, delete);
	}
}

// vim: ts=4
