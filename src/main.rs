use clap::{Arg, Command};
use dialoguer::Select;
use std::env;
use std::error::Error;

use pushr::config::{self, Config};
use pushr::logging;
use pushr::sftp::SftpTransport;
use pushr::{mirror, setup};

use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
	logging::init_tracing();

	let matches = Command::new("pushr")
		.version(env!("CARGO_PKG_VERSION"))
		.about("Watch a local directory tree and mirror changes to a remote server")
		.arg(
			Arg::new("config")
				.short('c')
				.long("config")
				.value_name("PROFILE")
				.help("Profile file to use"),
		)
		.subcommand(Command::new("init").about("Create a new profile in the current directory"))
		.get_matches();

	let cwd = env::current_dir()?;

	if matches.subcommand_matches("init").is_some() {
		setup::run_init(&cwd)?;
		return Ok(());
	}

	let found = config::discover(&cwd)?;
	if found.is_empty() {
		return Err(Box::new(pushr::ConfigError::NotFound) as Box<dyn Error>);
	}

	let mut found = found;
	let path = match matches.get_one::<String>("config") {
		Some(name) => config::select_named(&found, name)?,
		None if found.len() == 1 => found.remove(0),
		None => {
			let names: Vec<String> = found
				.iter()
				.map(|p| {
					p.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
				})
				.collect();
			let choice = Select::new()
				.with_prompt("Multiple profiles found. Which one would you like to use?")
				.items(&names)
				.default(0)
				.interact()?;
			found.remove(choice)
		}
	};

	info!("using profile {}", path.display());
	let config = Config::load(&path)?;
	let transport = SftpTransport::new(&config.remote);
	mirror::run(config, transport).await?;
	Ok(())
}

// vim: ts=4
