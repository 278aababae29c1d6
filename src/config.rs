//! Profile configuration for pushr
//!
//! A profile is a TOML file named `<profile>.pushr` in the working
//! directory. Every field has a built-in default; only the remote
//! credentials and the remote root are required. Defaults apply through
//! `#[serde(default)]`, so a minimal profile is four lines long.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// File extension for profile files.
pub const PROFILE_EXT: &str = "pushr";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
	pub remote: RemoteConfig,
	pub paths: PathsConfig,
	pub connection: ConnectionConfig,
	pub watch: WatchConfig,
}

/// Remote server endpoint and credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RemoteConfig {
	pub host: String,
	pub port: u16,
	pub user: String,
	pub password: String,
}

impl Default for RemoteConfig {
	fn default() -> Self {
		RemoteConfig { host: String::new(), port: 22, user: String::new(), password: String::new() }
	}
}

/// Local base, remote root and watch targets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PathsConfig {
	/// Local root used to compute relative remote paths. Defaults to the
	/// working directory.
	pub base: Option<PathBuf>,

	/// Remote root the local tree is mirrored under.
	pub remote: String,

	/// Watch targets. Defaults to the base path.
	pub source: Vec<PathBuf>,
}

/// Retry and concurrency tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectionConfig {
	/// Maximum connect attempts over the process lifetime.
	pub retry: u32,

	/// Delay between reconnect attempts in milliseconds.
	pub retry_delay_ms: u64,

	/// Number of transfers in flight at once.
	pub parallel: usize,

	/// Quiet window before a batch is drained, in milliseconds.
	pub debounce_ms: u64,
}

impl Default for ConnectionConfig {
	fn default() -> Self {
		ConnectionConfig { retry: 3, retry_delay_ms: 1000, parallel: 2, debounce_ms: 250 }
	}
}

/// Watcher tuning
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WatchConfig {
	/// Glob patterns excluded from watching and the initial scan.
	pub ignored: Vec<String>,

	/// Skip the initial upload of everything already present.
	pub ignore_initial: bool,
}

impl Config {
	/// Load and validate a profile file, resolving relative paths against
	/// the working directory.
	pub fn load(path: &Path) -> Result<Config, ConfigError> {
		let text = fs::read_to_string(path)?;
		let mut config: Config = toml::from_str(&text).map_err(|e| ConfigError::Parse {
			path: path.display().to_string(),
			message: e.to_string(),
		})?;
		config.validate()?;
		config.resolve_paths()?;
		Ok(config)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		let mut missing = Vec::new();
		if self.remote.host.is_empty() {
			missing.push("remote.host".to_string());
		}
		if self.remote.user.is_empty() {
			missing.push("remote.user".to_string());
		}
		if self.remote.password.is_empty() {
			missing.push("remote.password".to_string());
		}
		if self.paths.remote.is_empty() {
			missing.push("paths.remote".to_string());
		}
		if missing.is_empty() {
			Ok(())
		} else {
			Err(ConfigError::MissingKeys(missing))
		}
	}

	fn resolve_paths(&mut self) -> Result<(), ConfigError> {
		let cwd = env::current_dir()?;
		let base = match self.paths.base.take() {
			Some(p) if p.is_absolute() => p,
			Some(p) => cwd.join(p),
			None => cwd.clone(),
		};
		if self.paths.source.is_empty() {
			self.paths.source = vec![base.clone()];
		} else {
			self.paths.source = self
				.paths
				.source
				.iter()
				.map(|p| if p.is_absolute() { p.clone() } else { cwd.join(p) })
				.collect();
		}
		self.paths.base = Some(base);
		Ok(())
	}

	/// Resolved local base path. Only valid after `load`.
	pub fn base(&self) -> &Path {
		self.paths.base.as_deref().unwrap_or_else(|| Path::new("."))
	}
}

/// Find profile files in the given directory.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
	let pattern = dir.join(format!("*.{}", PROFILE_EXT));
	let mut found = Vec::new();
	for entry in glob::glob(&pattern.to_string_lossy())? {
		match entry {
			Ok(path) => found.push(path),
			Err(e) => return Err(ConfigError::Io(e.into_error())),
		}
	}
	found.sort();
	Ok(found)
}

/// Pick the discovered profile matching a `-c` argument, with or without
/// the extension.
pub fn select_named(found: &[PathBuf], name: &str) -> Result<PathBuf, ConfigError> {
	let suffix = format!(".{}", PROFILE_EXT);
	let want = name.strip_suffix(suffix.as_str()).unwrap_or(name);
	found
		.iter()
		.find(|p| p.file_stem().map_or(false, |stem| stem.to_string_lossy() == want))
		.cloned()
		.ok_or_else(|| ConfigError::NoSuchProfile { name: name.to_string() })
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	fn write_profile(dir: &Path, name: &str, body: &str) -> PathBuf {
		let path = dir.join(format!("{}.{}", name, PROFILE_EXT));
		let mut f = fs::File::create(&path).expect("create profile");
		f.write_all(body.as_bytes()).expect("write profile");
		path
	}

	#[test]
	fn test_defaults() {
		let config = Config::default();
		assert_eq!(config.remote.port, 22);
		assert_eq!(config.connection.retry, 3);
		assert_eq!(config.connection.parallel, 2);
		assert_eq!(config.connection.debounce_ms, 250);
		assert!(!config.watch.ignore_initial);
	}

	#[test]
	fn test_load_minimal_profile() {
		let dir = tempfile::tempdir().expect("tempdir");
		let path = write_profile(
			dir.path(),
			"site",
			"[remote]\nhost = \"example.com\"\nuser = \"deploy\"\npassword = \"s3cret\"\n\n[paths]\nremote = \"/pub\"\n",
		);
		let config = Config::load(&path).expect("load");
		assert_eq!(config.remote.host, "example.com");
		assert_eq!(config.paths.remote, "/pub");
		assert!(config.base().is_absolute());
		assert_eq!(config.paths.source, vec![config.base().to_path_buf()]);
	}

	#[test]
	fn test_missing_keys_reported_together() {
		let dir = tempfile::tempdir().expect("tempdir");
		let path = write_profile(dir.path(), "bad", "[remote]\nhost = \"example.com\"\n");
		match Config::load(&path) {
			Err(ConfigError::MissingKeys(keys)) => {
				assert!(keys.contains(&"remote.user".to_string()));
				assert!(keys.contains(&"remote.password".to_string()));
				assert!(keys.contains(&"paths.remote".to_string()));
				assert!(!keys.contains(&"remote.host".to_string()));
			}
			other => panic!("expected MissingKeys, got {:?}", other),
		}
	}

	#[test]
	fn test_parse_error() {
		let dir = tempfile::tempdir().expect("tempdir");
		let path = write_profile(dir.path(), "broken", "not toml at all [");
		assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
	}

	#[test]
	fn test_discover_and_select() {
		let dir = tempfile::tempdir().expect("tempdir");
		write_profile(dir.path(), "alpha", "");
		write_profile(dir.path(), "beta", "");
		let found = discover(dir.path()).expect("discover");
		assert_eq!(found.len(), 2);
		let picked = select_named(&found, "beta").expect("select");
		assert!(picked.ends_with("beta.pushr"));
		let picked = select_named(&found, "beta.pushr").expect("select with ext");
		assert!(picked.ends_with("beta.pushr"));
		assert!(matches!(
			select_named(&found, "gamma"),
			Err(ConfigError::NoSuchProfile { .. })
		));
	}

	#[test]
	fn test_camel_case_keys() {
		let dir = tempfile::tempdir().expect("tempdir");
		let path = write_profile(
			dir.path(),
			"tuned",
			"[remote]\nhost = \"h\"\nuser = \"u\"\npassword = \"p\"\n\n[paths]\nremote = \"/pub\"\n\n[connection]\nretryDelayMs = 50\ndebounceMs = 100\n\n[watch]\nignoreInitial = true\n",
		);
		let config = Config::load(&path).expect("load");
		assert_eq!(config.connection.retry_delay_ms, 50);
		assert_eq!(config.connection.debounce_ms, 100);
		assert!(config.watch.ignore_initial);
	}
}

// vim: ts=4
