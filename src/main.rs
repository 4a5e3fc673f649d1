use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use reroute_cli::config::{DEFAULT_CONFIG_FILE, load_rules_text, read_rules_file};
use reroute_cli::rules::{RulePath, Transformer};

#[derive(Parser)]
#[command(name = "reroute")]
#[command(
	author,
	version,
	about = "Rewrite and filter file paths with an ordered list of arrow rules"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Read rules from a plain rule file
	#[arg(long, global = true, value_name = "FILE", conflicts_with = "config")]
	rules: Option<PathBuf>,

	/// Read rules from a TOML config file (default: ./.reroute.toml)
	#[arg(long, global = true, value_name = "FILE")]
	config: Option<PathBuf>,

	/// Increase log verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, global = true, action = ArgAction::Count)]
	verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
	/// Check the rules for errors without transforming anything
	Check,
	/// Print every parsed rule in normalized form
	Show,
	/// Transform paths given as arguments, or one per line on stdin
	Apply {
		/// Also print dropped paths as `PATH -> !`
		#[arg(long)]
		show_dropped: bool,

		/// Paths to transform
		paths: Vec<String>,
	},
}

fn main() -> ExitCode {
	let cli = Cli::parse();
	init_logger(cli.verbose);

	match run(cli) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn init_logger(verbose: u8) {
	let level = match verbose {
		0 => log::LevelFilter::Warn,
		1 => log::LevelFilter::Info,
		2 => log::LevelFilter::Debug,
		_ => log::LevelFilter::Trace,
	};

	env_logger::Builder::new()
		.filter_level(level)
		.parse_default_env()
		.format_timestamp(None)
		.init();
}

fn run(cli: Cli) -> Result<ExitCode> {
	let text = load_text(cli.rules.as_deref(), cli.config.as_deref())?;

	let transformer = match Transformer::new(&text) {
		Ok(transformer) => transformer,
		Err(err) => {
			eprintln!("{}", err.pretty_print());
			return Ok(ExitCode::FAILURE);
		}
	};

	match cli.command {
		Commands::Check => handle_check(&transformer),
		Commands::Show => handle_show(&transformer),
		Commands::Apply {
			show_dropped,
			paths,
		} => handle_apply(&transformer, &paths, show_dropped),
	}
}

fn load_text(rules: Option<&Path>, config: Option<&Path>) -> Result<String> {
	if let Some(path) = rules {
		log::info!("Reading rules from {}", path.display());
		return read_rules_file(path).context("Failed to load rules");
	}

	let config_path = config.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);
	log::info!("Reading config from {}", config_path.display());
	load_rules_text(&config_path).context("Failed to load configuration")
}

fn handle_check(transformer: &Transformer) -> Result<ExitCode> {
	println!("All rules are valid ({} rules)", transformer.len());
	Ok(ExitCode::SUCCESS)
}

fn handle_show(transformer: &Transformer) -> Result<ExitCode> {
	if transformer.is_empty() {
		println!("No rules defined.");
		return Ok(ExitCode::SUCCESS);
	}

	for (i, rule) in transformer.rules().iter().enumerate() {
		println!("{:>3}: {}", i + 1, rule);
	}
	Ok(ExitCode::SUCCESS)
}

fn handle_apply(transformer: &Transformer, paths: &[String], show_dropped: bool) -> Result<ExitCode> {
	let mut out = io::stdout().lock();

	let result = if paths.is_empty() {
		apply_paths(transformer, io::stdin().lock().lines(), show_dropped, &mut out)
	} else {
		let lines = paths.iter().map(|path| Ok(path.clone()));
		apply_paths(transformer, lines, show_dropped, &mut out)
	};

	match result {
		// The reader went away (e.g. `| head`); nothing left to do.
		Err(e) if is_broken_pipe(&e) => Ok(ExitCode::SUCCESS),
		Err(e) => Err(e),
		Ok(()) => Ok(ExitCode::SUCCESS),
	}
}

/// Transform every non-empty line and write the kept paths to `out`.
fn apply_paths<I, W>(transformer: &Transformer, lines: I, show_dropped: bool, out: &mut W) -> Result<()>
where
	I: IntoIterator<Item = io::Result<String>>,
	W: Write,
{
	for line in lines {
		let line = line.context("Failed to read paths from stdin")?;
		let raw = line.trim_end_matches('\r');
		if raw.is_empty() {
			continue;
		}

		let path = RulePath::from(raw);
		let result = transformer
			.transform(&path)
			.with_context(|| format!("Failed to transform {raw}"))?;

		match result {
			Some(new_path) => writeln!(out, "{new_path}")?,
			None if show_dropped => writeln!(out, "{path} -> !")?,
			None => log::info!("Dropped {path}"),
		}
	}

	out.flush()?;
	Ok(())
}

fn is_broken_pipe(err: &anyhow::Error) -> bool {
	err.downcast_ref::<io::Error>()
		.is_some_and(|e| e.kind() == io::ErrorKind::BrokenPipe)
}
