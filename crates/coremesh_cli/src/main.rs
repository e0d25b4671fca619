#![allow(missing_docs)]

use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "coremesh", about = "Decima .core mesh inspection tools")]
struct Cli {
	/// Raise log verbosity (-v debug, -vv trace); `RUST_LOG` overrides.
	#[arg(short, long, action = ArgAction::Count, global = true)]
	verbose: u8,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// List block records with decoded details.
	Inspect(cmd::inspect::Args),
	/// Resolve meshes into per-primitive attribute streams.
	Resolve(cmd::resolve::Args),
}

fn main() -> ExitCode {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	match run(cli.command) {
		Ok(code) => code,
		Err(err) => {
			eprintln!("error: {err}");
			ExitCode::FAILURE
		}
	}
}

fn run(command: Commands) -> coremesh::decima::Result<ExitCode> {
	match command {
		Commands::Inspect(args) => cmd::inspect::run(args).map(|()| ExitCode::SUCCESS),
		Commands::Resolve(args) => cmd::resolve::run(args),
	}
}

fn init_tracing(verbose: u8) {
	let default = match verbose {
		0 => "warn",
		1 => "debug",
		_ => "trace",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
	let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).try_init();
}
