use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::process;
use std::time::Duration;

use clap::Parser;
use embedmd_cli::CliError;
use embedmd_cli::EmbedCli;
use embedmd_core::DefaultFetcher;
use embedmd_core::EmbedConfig;
use embedmd_core::EmbedError;
use embedmd_core::Embedder;
use embedmd_core::parse_mount;
use owo_colors::OwoColorize;
use similar::TextDiff;
use supports_color::Stream;
use tracing_subscriber::EnvFilter;

/// Color for diffs, which go to stdout.
static STDOUT_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);
/// Color for errors and logs, which go to stderr.
static STDERR_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled(stream: Stream) -> bool {
	let flag = if matches!(stream, Stream::Stdout) {
		&STDOUT_COLOR
	} else {
		&STDERR_COLOR
	};
	flag.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled for `$stream`.
macro_rules! colored {
	($text:expr, $color:ident, $stream:expr) => {
		if color_enabled($stream) {
			format!("{}", $text.$color())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = EmbedCli::parse();

	// Respect NO_COLOR env var, --no-color flag and terminal support of
	// each stream.
	let allow_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	let stdout_color = allow_color && supports_color::on(Stream::Stdout).is_some();
	let use_color = allow_color && supports_color::on(Stream::Stderr).is_some();
	STDOUT_COLOR.store(stdout_color, std::sync::atomic::Ordering::Relaxed);
	STDERR_COLOR.store(use_color, std::sync::atomic::Ordering::Relaxed);

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	match run(&args) {
		Ok(found_diff) => {
			if found_diff {
				process::exit(2);
			}
		}
		Err(e) => {
			report_error(e);
			process::exit(2);
		}
	}
}

/// `RUST_LOG` wins; otherwise `--verbose` selects debug and the default is
/// warnings only. Logs go to stderr so they never mix with the document.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.try_init()
		.ok();
}

fn report_error(error: CliError) {
	match error {
		CliError::Embed(inner) => {
			let report: miette::Report = inner.into();
			eprintln!("{report:?}");
		}
		other => {
			eprintln!("{} {other}", colored!("error:", red, Stream::Stderr));
			if let Some(help) = other.embed_help() {
				eprintln!("  {} {help}", colored!("help:", cyan, Stream::Stderr));
			}
		}
	}
}

/// Returns `true` when `--diff` found a difference.
fn run(args: &EmbedCli) -> Result<bool, CliError> {
	if args.write && args.diff {
		return Err(CliError::WriteWithDiff);
	}
	if args.write && args.reads_stdin() {
		return Err(CliError::WriteStdin);
	}

	let embedder = build_embedder(args)?;

	if args.reads_stdin() {
		return run_stdin(args, &embedder);
	}

	let mut found_diff = false;
	for path in &args.paths {
		found_diff |= run_file(args, &embedder, path)?;
	}

	Ok(found_diff)
}

fn build_embedder(args: &EmbedCli) -> Result<Embedder, CliError> {
	let config = match &args.config {
		Some(path) => EmbedConfig::load_file(path)?,
		None => EmbedConfig::load(&std::env::current_dir()?)?.unwrap_or_default(),
	};

	let mut mounts = config.mounts();
	for definition in &args.mounts {
		let (name, prefix) = parse_mount(definition)?;
		mounts.insert(name, prefix);
	}

	let timeout = args
		.timeout
		.map_or_else(|| config.http.timeout(), Duration::from_secs);
	tracing::debug!(mounts = mounts.len(), timeout_secs = timeout.as_secs(), "configured embedder");

	Ok(Embedder::new()
		.with_fetcher(DefaultFetcher::new(timeout))
		.with_mounts(mounts))
}

fn run_stdin(args: &EmbedCli, embedder: &Embedder) -> Result<bool, CliError> {
	let mut input = Vec::new();
	std::io::stdin().read_to_end(&mut input)?;

	let output = embedder.process_bytes(&input)?;

	if args.diff {
		return Ok(print_diff("stdin", &input, &output));
	}

	std::io::stdout().write_all(&output)?;
	Ok(false)
}

fn run_file(args: &EmbedCli, embedder: &Embedder, path: &Path) -> Result<bool, CliError> {
	let shown = path.display().to_string();

	if path.extension().and_then(|ext| ext.to_str()) != Some("md") {
		return Err(CliError::NotMarkdown { path: shown });
	}

	let file_error = |error: EmbedError| {
		CliError::File {
			path: shown.clone(),
			error,
		}
	};

	let input = std::fs::read(path).map_err(|e| file_error(EmbedError::Io(e)))?;
	let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
	let output = embedder
		.clone()
		.with_base_dir(base_dir)
		.process_bytes(&input)
		.map_err(file_error)?;

	if args.diff {
		return Ok(print_diff(&shown, &input, &output));
	}

	if args.write {
		if input == output {
			tracing::debug!(path = %shown, "already up to date");
		} else {
			std::fs::write(path, &output).map_err(|error| {
				CliError::Write {
					path: shown.clone(),
					error,
				}
			})?;
			tracing::info!(path = %shown, "updated");
		}
		return Ok(false);
	}

	std::io::stdout().write_all(&output)?;
	Ok(false)
}

/// Print a unified diff of `current` against `expected`. Returns whether the
/// two differ. Invalid UTF-8 is shown as `U+FFFD`.
fn print_diff(path: &str, current: &[u8], expected: &[u8]) -> bool {
	if current == expected {
		return false;
	}

	let current = String::from_utf8_lossy(current);
	let expected = String::from_utf8_lossy(expected);
	let diff = TextDiff::from_lines(current.as_ref(), expected.as_ref());
	let unified = diff
		.unified_diff()
		.context_radius(3)
		.header(&format!("a/{path}"), &format!("b/{path}"))
		.to_string();

	for line in unified.lines() {
		if line.starts_with("+++") || line.starts_with("---") {
			println!("{line}");
		} else if line.starts_with('+') {
			println!("{}", colored!(line, green, Stream::Stdout));
		} else if line.starts_with('-') {
			println!("{}", colored!(line, red, Stream::Stdout));
		} else if line.starts_with("@@") {
			println!("{}", colored!(line, yellow, Stream::Stdout));
		} else {
			println!("{line}");
		}
	}

	true
}
