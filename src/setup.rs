//! Interactive first-run setup: `pushr init`

use dialoguer::{Input, Password};
use std::fs;
use std::path::Path;

use crate::config::{Config, PROFILE_EXT};
use crate::error::MirrorError;
use crate::logging::*;

/// Prompt for the remote details and write a fresh profile file into `dir`.
/// Refuses to overwrite an existing profile.
pub fn run_init(dir: &Path) -> Result<(), MirrorError> {
	let host: String = Input::new().with_prompt("Remote host").interact_text()?;
	let user: String = Input::new().with_prompt("Remote user").interact_text()?;
	let password: String = Password::new().with_prompt("Remote password").interact()?;
	let remote: String = Input::new().with_prompt("Remote directory").interact_text()?;

	let default_name = dir
		.file_name()
		.map(|n| n.to_string_lossy().into_owned())
		.unwrap_or_else(|| "default".to_string());
	let profile: String = Input::new()
		.with_prompt("Profile name")
		.default(default_name)
		.interact_text()?;

	let mut config = Config::default();
	config.remote.host = host;
	config.remote.user = user;
	config.remote.password = password;
	config.paths.remote = remote;

	let suffix = format!(".{}", PROFILE_EXT);
	let name = profile.strip_suffix(suffix.as_str()).unwrap_or(&profile);
	let path = dir.join(format!("{}.{}", name, PROFILE_EXT));
	if path.exists() {
		return Err(MirrorError::Other {
			message: format!("{} already exists", path.display()),
		});
	}

	let text = toml::to_string_pretty(&config)
		.map_err(|e| MirrorError::Other { message: e.to_string() })?;
	fs::write(&path, text)?;
	info!("wrote {}. Run `pushr -c {}` to start mirroring.", path.display(), name);
	Ok(())
}

// vim: ts=4
