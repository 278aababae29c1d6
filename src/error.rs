//! Error types for pushr operations

use std::error::Error;
use std::fmt;
use std::io;

/// Main error type for the mirror process
#[derive(Debug)]
pub enum MirrorError {
	/// Invalid or missing configuration
	Config(ConfigError),

	/// Remote transport failure
	Transport(TransportError),

	/// Filesystem watcher failure
	Watch(notify::Error),

	/// Interactive prompt failure
	Prompt(dialoguer::Error),

	/// I/O error
	Io(io::Error),

	/// Generic error message
	Other { message: String },
}

impl fmt::Display for MirrorError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			MirrorError::Config(e) => write!(f, "Configuration error: {}", e),
			MirrorError::Transport(e) => write!(f, "Transport error: {}", e),
			MirrorError::Watch(e) => write!(f, "Watcher error: {}", e),
			MirrorError::Prompt(e) => write!(f, "Prompt error: {}", e),
			MirrorError::Io(e) => write!(f, "I/O error: {}", e),
			MirrorError::Other { message } => write!(f, "{}", message),
		}
	}
}

impl Error for MirrorError {}

impl From<ConfigError> for MirrorError {
	fn from(e: ConfigError) -> Self {
		MirrorError::Config(e)
	}
}

impl From<TransportError> for MirrorError {
	fn from(e: TransportError) -> Self {
		MirrorError::Transport(e)
	}
}

impl From<notify::Error> for MirrorError {
	fn from(e: notify::Error) -> Self {
		MirrorError::Watch(e)
	}
}

impl From<dialoguer::Error> for MirrorError {
	fn from(e: dialoguer::Error) -> Self {
		MirrorError::Prompt(e)
	}
}

impl From<io::Error> for MirrorError {
	fn from(e: io::Error) -> Self {
		MirrorError::Io(e)
	}
}

impl From<String> for MirrorError {
	fn from(message: String) -> Self {
		MirrorError::Other { message }
	}
}

/// Configuration loading and discovery errors
#[derive(Debug)]
pub enum ConfigError {
	/// No profile file found in the working directory
	NotFound,

	/// The profile named on the command line does not exist
	NoSuchProfile { name: String },

	/// Required keys are missing from the profile
	MissingKeys(Vec<String>),

	/// Profile file could not be parsed
	Parse { path: String, message: String },

	/// Invalid glob pattern in the watch ignore list
	BadPattern { pattern: String, message: String },

	/// Invalid discovery pattern
	Pattern(glob::PatternError),

	/// I/O error while reading the profile
	Io(io::Error),
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfigError::NotFound => {
				write!(f, "No profile file found. Run `pushr init` to create one.")
			}
			ConfigError::NoSuchProfile { name } => {
				write!(f, "No profile named '{}' found", name)
			}
			ConfigError::MissingKeys(keys) => {
				write!(f, "Required config values missing: '{}'", keys.join("', '"))
			}
			ConfigError::Parse { path, message } => {
				write!(f, "Cannot parse {}: {}", path, message)
			}
			ConfigError::BadPattern { pattern, message } => {
				write!(f, "Invalid ignore pattern '{}': {}", pattern, message)
			}
			ConfigError::Pattern(e) => write!(f, "Invalid profile pattern: {}", e),
			ConfigError::Io(e) => write!(f, "I/O error: {}", e),
		}
	}
}

impl Error for ConfigError {}

impl From<io::Error> for ConfigError {
	fn from(e: io::Error) -> Self {
		ConfigError::Io(e)
	}
}

impl From<glob::PatternError> for ConfigError {
	fn from(e: glob::PatternError) -> Self {
		ConfigError::Pattern(e)
	}
}

/// Remote transport errors
///
/// Connection-class errors drive the connection manager's retry state
/// machine; everything else is terminal for the single action that
/// triggered it and nothing more.
#[derive(Debug)]
pub enum TransportError {
	/// Could not establish a session
	ConnectFailed { host: String, source: Box<dyn Error + Send + Sync> },

	/// Server rejected the credentials
	AuthFailed { user: String },

	/// The established session dropped or misbehaved
	SessionLost { message: String },

	/// The server refused a single operation
	Remote { path: String, message: String },

	/// Local file error (missing source file, permissions)
	Local { path: String, source: io::Error },

	/// I/O error on the session stream
	Io(io::Error),
}

impl TransportError {
	/// Whether this error means the session itself is gone.
	pub fn is_connection_lost(&self) -> bool {
		matches!(
			self,
			TransportError::ConnectFailed { .. }
				| TransportError::AuthFailed { .. }
				| TransportError::SessionLost { .. }
				| TransportError::Io(_)
		)
	}
}

impl fmt::Display for TransportError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TransportError::ConnectFailed { host, source } => {
				write!(f, "Failed to connect to {}: {}", host, source)
			}
			TransportError::AuthFailed { user } => {
				write!(f, "Authentication failed for user {}", user)
			}
			TransportError::SessionLost { message } => {
				write!(f, "Session lost: {}", message)
			}
			TransportError::Remote { path, message } => {
				write!(f, "Remote operation failed on {}: {}", path, message)
			}
			TransportError::Local { path, source } => {
				write!(f, "Cannot read {}: {}", path, source)
			}
			TransportError::Io(e) => write!(f, "I/O error: {}", e),
		}
	}
}

impl Error for TransportError {}

impl From<io::Error> for TransportError {
	fn from(e: io::Error) -> Self {
		TransportError::Io(e)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_connection_class_errors() {
		assert!(TransportError::SessionLost { message: "gone".into() }.is_connection_lost());
		assert!(TransportError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "pipe"))
			.is_connection_lost());
		assert!(!TransportError::Remote { path: "/pub/a".into(), message: "denied".into() }
			.is_connection_lost());
		assert!(!TransportError::Local {
			path: "/tmp/a".into(),
			source: io::Error::new(io::ErrorKind::NotFound, "missing"),
		}
		.is_connection_lost());
	}

	#[test]
	fn test_missing_keys_display() {
		let e = ConfigError::MissingKeys(vec!["remote.host".into(), "remote.user".into()]);
		assert_eq!(e.to_string(), "Required config values missing: 'remote.host', 'remote.user'");
	}
}

// vim: ts=4
