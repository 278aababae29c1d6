//! Remote transport abstraction
//!
//! The dispatcher only ever talks to the remote side through this trait,
//! and the connection manager is the sole owner of the live session. Tests
//! substitute a scripted implementation; production uses the SFTP transport
//! in `crate::sftp`.

use async_trait::async_trait;
use std::path::Path;

use crate::error::TransportError;

#[async_trait]
pub trait Transport: Send + Sync + 'static {
	/// Establish (or re-establish) the remote session.
	async fn connect(&self) -> Result<(), TransportError>;

	/// Idempotent create of a remote directory, parents included.
	async fn ensure_dir(&self, remote: &str) -> Result<(), TransportError>;

	/// Upload a local file to the given remote path.
	async fn upload(&self, local: &Path, remote: &str) -> Result<(), TransportError>;

	/// Remove a single remote file.
	async fn remove_file(&self, remote: &str) -> Result<(), TransportError>;

	/// Remove a remote directory and everything beneath it.
	async fn remove_dir(&self, remote: &str) -> Result<(), TransportError>;

	/// Tear down the session. Never fails; a session that is already gone
	/// needs no teardown.
	async fn close(&self);
}

// vim: ts=4
