//! # pushr - One-way Directory Mirror
//!
//! pushr watches a local directory tree and mirrors every change (uploads
//! and deletions) to a remote server over SFTP. Noisy bursts of filesystem
//! events are collapsed into a minimal batch of remote operations:
//! duplicates are deduplicated per path, file deletes subsumed by a
//! directory delete are dropped, and the batch is executed with a bounded
//! number of concurrent transfers over a single remote session.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pushr::config::Config;
//! use pushr::sftp::SftpTransport;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("site.pushr".as_ref())?;
//!     let transport = SftpTransport::new(&config.remote);
//!     pushr::mirror::run(config, transport).await?;
//!     Ok(())
//! }
//! ```

pub mod action;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod mirror;
pub mod pathmap;
pub mod queue;
pub mod setup;
pub mod sftp;
pub mod transport;
pub mod watch;

// Re-export commonly used types
pub use action::Action;
pub use config::Config;
pub use connection::{ConnState, ConnectionManager};
pub use dispatch::Dispatcher;
pub use error::{ConfigError, MirrorError, TransportError};
pub use queue::ActionQueue;
pub use transport::Transport;

// vim: ts=4
