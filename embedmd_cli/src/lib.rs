use std::path::PathBuf;

use clap::Parser;
use embedmd_core::EmbedError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Parser)]
#[command(
	name = "embedmd",
	author,
	version,
	about = "Embed files or fractions of files into markdown.",
	long_about = "embedmd embeds files or fractions of files into markdown files. It does so by \
	              searching embedmd commands, which are a subset of the markdown syntax for \
	              comments, so they stay invisible when the markdown is rendered.\n\nCommands look \
	              like:\n  [embedmd]:# (pathOrURL language /start regexp/ /end regexp/)\n\nWhen no \
	              path is given the document is read from standard input."
)]
#[allow(clippy::struct_excessive_bools)]
pub struct EmbedCli {
	/// Markdown files to process. Reads standard input when empty.
	pub paths: Vec<PathBuf>,

	/// Write the result to the (markdown) file instead of stdout.
	#[arg(long, short, default_value_t = false)]
	pub write: bool,

	/// Display a unified diff instead of the result. Exits with status 2
	/// when any file would change.
	#[arg(long, short, default_value_t = false)]
	pub diff: bool,

	/// Mount a path or url prefix as `$NAME`, e.g.
	/// `-m otel=https://raw.githubusercontent.com/open-telemetry/opentelemetry-go/main`.
	/// Can be repeated and overrides mounts from the config file.
	#[arg(long = "mount", short = 'm', value_name = "NAME=URL")]
	pub mounts: Vec<String>,

	/// Config file to use instead of discovering `embedmd.toml`.
	#[arg(long, short)]
	pub config: Option<PathBuf>,

	/// Timeout in seconds for fetching urls.
	#[arg(long, value_name = "SECS")]
	pub timeout: Option<u64>,

	/// Enable verbose output.
	#[arg(long, short, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,
}

impl EmbedCli {
	/// Processing from standard input.
	pub fn reads_stdin(&self) -> bool {
		self.paths.is_empty()
	}
}

/// Errors reported by the command line front end.
#[derive(Debug, Diagnostic, Error)]
pub enum CliError {
	#[error("cannot use -w and -d simultaneously")]
	#[diagnostic(code(embedmd::cli::write_with_diff))]
	WriteWithDiff,

	#[error("cannot use -w with standard input")]
	#[diagnostic(
		code(embedmd::cli::write_stdin),
		help("pass the markdown files to rewrite as arguments")
	)]
	WriteStdin,

	#[error("{path}:not a markdown file")]
	#[diagnostic(code(embedmd::cli::not_markdown))]
	NotMarkdown { path: String },

	/// Processing a file failed. The inner error is kept out of the source
	/// chain so the message is not repeated.
	#[error("{path}:{error}")]
	#[diagnostic(code(embedmd::cli::file))]
	File { path: String, error: EmbedError },

	#[error("{path}:could not write: {error}")]
	#[diagnostic(code(embedmd::cli::write))]
	Write {
		path: String,
		error: std::io::Error,
	},

	#[error(transparent)]
	#[diagnostic(transparent)]
	Embed(#[from] EmbedError),

	#[error(transparent)]
	#[diagnostic(code(embedmd::io_error))]
	Io(#[from] std::io::Error),
}

impl CliError {
	/// Help text of the underlying embed error, if any.
	pub fn embed_help(&self) -> Option<String> {
		match self {
			Self::File {
				error: EmbedError::Document { kind, .. },
				..
			} => kind.help().map(|help| help.to_string()),
			Self::File { error, .. } => error.help().map(|help| help.to_string()),
			_ => None,
		}
	}
}
