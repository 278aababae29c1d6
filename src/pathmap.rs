//! Local-to-remote path translation

use std::path::Path;

use crate::action::Action;

/// Map a local path under `base` to its remote counterpart under
/// `remote_root`, with forward slashes.
pub fn remote_path(local: &Path, base: &Path, remote_root: &str) -> String {
	let rel = local.strip_prefix(base).unwrap_or(local);
	let joined = Path::new(remote_root).join(rel);
	joined.to_string_lossy().replace('\\', "/")
}

/// Remote directory that must exist before an action runs: the parent for
/// file actions, the mapped path itself for directory deletes.
pub fn remote_dir(action: &Action, base: &Path, remote_root: &str) -> String {
	let mapped = remote_path(action.path(), base, remote_root);
	if action.is_directory() {
		return mapped;
	}
	match Path::new(&mapped).parent() {
		Some(parent) if !parent.as_os_str().is_empty() => {
			parent.to_string_lossy().replace('\\', "/")
		}
		_ => "/".to_string(),
	}
}

/// Path relative to the local base, for status lines.
pub fn display_path(local: &Path, base: &Path) -> String {
	local.strip_prefix(base).unwrap_or(local).to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::path::PathBuf;

	#[test]
	fn test_remote_path_mapping() {
		let local = Path::new("/home/site/dir/file.txt");
		assert_eq!(remote_path(local, Path::new("/home/site"), "/pub"), "/pub/dir/file.txt");
	}

	#[test]
	fn test_remote_path_outside_base() {
		// Paths outside the base are joined as-is rather than dropped.
		let local = Path::new("/elsewhere/file.txt");
		let mapped = remote_path(local, Path::new("/home/site"), "/pub");
		assert!(mapped.starts_with("/pub"));
		assert!(mapped.ends_with("file.txt"));
	}

	#[test]
	fn test_remote_dir_for_file() {
		let action = Action::Upload(PathBuf::from("/home/site/dir/file.txt"));
		assert_eq!(remote_dir(&action, Path::new("/home/site"), "/pub"), "/pub/dir");
	}

	#[test]
	fn test_remote_dir_for_directory_delete() {
		let action = Action::DeleteDirectory(PathBuf::from("/home/site/dir"));
		assert_eq!(remote_dir(&action, Path::new("/home/site"), "/pub"), "/pub/dir");
	}

	#[test]
	fn test_remote_dir_at_root() {
		let action = Action::Upload(PathBuf::from("/home/site/file.txt"));
		assert_eq!(remote_dir(&action, Path::new("/home/site"), "/"), "/");
	}

	#[test]
	fn test_display_path() {
		assert_eq!(
			display_path(Path::new("/home/site/dir/file.txt"), Path::new("/home/site")),
			"dir/file.txt"
		);
	}
}

// vim: ts=4
