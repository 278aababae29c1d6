//! SFTP transport over russh
//!
//! One logical session per process. The dispatcher's concurrency bound
//! governs how many logical operations are in flight; the SFTP layer
//! multiplexes them over the single channel.

use async_trait::async_trait;
use russh::client::AuthResult;
use russh_sftp::client::error::Error as SftpError;
use russh_sftp::client::SftpSession;
use russh_sftp::protocol::StatusCode;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::config::RemoteConfig;
use crate::error::TransportError;
use crate::logging::*;
use crate::transport::Transport;

struct ClientHandler;

impl russh::client::Handler for ClientHandler {
	type Error = russh::Error;

	async fn check_server_key(
		&mut self,
		_server_public_key: &russh::keys::PublicKey,
	) -> Result<bool, Self::Error> {
		Ok(true)
	}
}

struct Session {
	handle: russh::client::Handle<ClientHandler>,
	sftp: SftpSession,
}

pub struct SftpTransport {
	host: String,
	port: u16,
	user: String,
	password: String,
	session: RwLock<Option<Session>>,
}

impl SftpTransport {
	pub fn new(remote: &RemoteConfig) -> Self {
		SftpTransport {
			host: remote.host.clone(),
			port: remote.port,
			user: remote.user.clone(),
			password: remote.password.clone(),
			session: RwLock::new(None),
		}
	}

	fn connect_failed<E>(&self, e: E) -> TransportError
	where
		E: std::error::Error + Send + Sync + 'static,
	{
		TransportError::ConnectFailed { host: self.host.clone(), source: Box::new(e) }
	}
}

fn sftp_error(path: &str, e: SftpError) -> TransportError {
	match e {
		SftpError::Status(status) => {
			TransportError::Remote { path: path.to_string(), message: status.error_message }
		}
		other => TransportError::SessionLost { message: other.to_string() },
	}
}

fn is_no_such_file(e: &SftpError) -> bool {
	matches!(e, SftpError::Status(status) if status.status_code == StatusCode::NoSuchFile)
}

#[async_trait]
impl Transport for SftpTransport {
	async fn connect(&self) -> Result<(), TransportError> {
		let config = Arc::new(russh::client::Config::default());
		let mut handle =
			russh::client::connect(config, (self.host.as_str(), self.port), ClientHandler)
				.await
				.map_err(|e| self.connect_failed(e))?;

		let auth = handle
			.authenticate_password(self.user.as_str(), self.password.as_str())
			.await
			.map_err(|e| self.connect_failed(e))?;
		if !matches!(auth, AuthResult::Success) {
			return Err(TransportError::AuthFailed { user: self.user.clone() });
		}

		let channel =
			handle.channel_open_session().await.map_err(|e| self.connect_failed(e))?;
		channel
			.request_subsystem(true, "sftp")
			.await
			.map_err(|e| self.connect_failed(e))?;
		let sftp = SftpSession::new(channel.into_stream())
			.await
			.map_err(|e| self.connect_failed(e))?;

		// Server greeting equivalent: log where the session landed.
		if let Ok(cwd) = sftp.canonicalize(".").await {
			info!("remote session opened at {}", cwd);
		}

		*self.session.write().await = Some(Session { handle, sftp });
		Ok(())
	}

	async fn ensure_dir(&self, remote: &str) -> Result<(), TransportError> {
		let guard = self.session.read().await;
		let session = guard
			.as_ref()
			.ok_or_else(|| TransportError::SessionLost { message: "not connected".into() })?;

		if let Ok(attrs) = session.sftp.metadata(remote.to_string()).await {
			if attrs.is_dir() {
				return Ok(());
			}
			return Err(TransportError::Remote {
				path: remote.to_string(),
				message: "a file with this name already exists".into(),
			});
		}

		let ancestors: Vec<PathBuf> =
			Path::new(remote).ancestors().map(|p| p.to_path_buf()).collect();
		for part in ancestors.iter().rev() {
			if part.as_os_str().is_empty() || part.as_os_str() == "/" {
				continue;
			}
			let target = part.to_string_lossy().replace('\\', "/");
			if let Err(e) = session.sftp.create_dir(target.clone()).await {
				// create_dir fails when the directory already exists; a
				// stat decides whether that failure was benign.
				match session.sftp.metadata(target.clone()).await {
					Ok(attrs) if attrs.is_dir() => {}
					Ok(_) => {
						return Err(TransportError::Remote {
							path: target,
							message: "path component is not a directory".into(),
						});
					}
					Err(_) => return Err(sftp_error(&target, e)),
				}
			}
		}
		Ok(())
	}

	async fn upload(&self, local: &Path, remote: &str) -> Result<(), TransportError> {
		let guard = self.session.read().await;
		let session = guard
			.as_ref()
			.ok_or_else(|| TransportError::SessionLost { message: "not connected".into() })?;

		let mut reader = tokio::fs::File::open(local).await.map_err(|e| {
			TransportError::Local { path: local.to_string_lossy().into_owned(), source: e }
		})?;
		let mut writer = session
			.sftp
			.create(remote.to_string())
			.await
			.map_err(|e| sftp_error(remote, e))?;
		tokio::io::copy(&mut reader, &mut writer).await?;
		writer.shutdown().await?;
		Ok(())
	}

	async fn remove_file(&self, remote: &str) -> Result<(), TransportError> {
		let guard = self.session.read().await;
		let session = guard
			.as_ref()
			.ok_or_else(|| TransportError::SessionLost { message: "not connected".into() })?;
		session.sftp.remove_file(remote.to_string()).await.map_err(|e| sftp_error(remote, e))
	}

	async fn remove_dir(&self, remote: &str) -> Result<(), TransportError> {
		let guard = self.session.read().await;
		let session = guard
			.as_ref()
			.ok_or_else(|| TransportError::SessionLost { message: "not connected".into() })?;
		let sftp = &session.sftp;

		let root = PathBuf::from(remote);
		match sftp.metadata(remote.to_string()).await {
			Ok(attrs) if attrs.is_dir() => {}
			Ok(_) => {
				return Err(TransportError::Remote {
					path: remote.to_string(),
					message: "path is not a directory".into(),
				});
			}
			Err(e) if is_no_such_file(&e) => return Ok(()),
			Err(e) => return Err(sftp_error(remote, e)),
		}

		// Post-order walk: children first, the directory itself last.
		let mut stack: Vec<(PathBuf, bool)> = vec![(root, false)];
		while let Some((dir, visited)) = stack.pop() {
			let dir_str = dir.to_string_lossy().replace('\\', "/");
			if visited {
				if let Err(e) = sftp.remove_dir(dir_str.clone()).await {
					if !is_no_such_file(&e) {
						return Err(sftp_error(&dir_str, e));
					}
				}
				continue;
			}
			stack.push((dir.clone(), true));
			let entries = match sftp.read_dir(dir_str.clone()).await {
				Ok(entries) => entries,
				Err(e) if is_no_such_file(&e) => continue,
				Err(e) => return Err(sftp_error(&dir_str, e)),
			};
			for entry in entries {
				let name = entry.file_name();
				if name == "." || name == ".." {
					continue;
				}
				let child = dir.join(&name);
				if entry.metadata().is_dir() {
					stack.push((child, false));
				} else {
					let child_str = child.to_string_lossy().replace('\\', "/");
					if let Err(e) = sftp.remove_file(child_str.clone()).await {
						if !is_no_such_file(&e) {
							return Err(sftp_error(&child_str, e));
						}
					}
				}
			}
		}
		Ok(())
	}

	async fn close(&self) {
		if let Some(session) = self.session.write().await.take() {
			let _ = session
				.handle
				.disconnect(russh::Disconnect::ByApplication, "closing", "en")
				.await;
		}
	}
}

// vim: ts=4
