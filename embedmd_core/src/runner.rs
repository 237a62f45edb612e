use std::io::BufRead;
use std::io::Write;
use std::path::PathBuf;

use crate::Command;
use crate::CommandSyntax;
use crate::DefaultFetcher;
use crate::EmbedError;
use crate::EmbedResult;
use crate::FormatError;
use crate::Fetcher;
use crate::RunError;
use crate::extract;
use crate::format;
use crate::scanner;

/// Executes one parsed command, writing the generated block to `out`.
///
/// The scanner only depends on this trait, so document handling can be
/// tested with closures that never touch the filesystem.
pub trait CommandRunner {
	fn run(&self, out: &mut dyn Write, command: &Command) -> Result<(), RunError>;
}

impl<F> CommandRunner for F
where
	F: Fn(&mut dyn Write, &Command) -> Result<(), RunError>,
{
	fn run(&self, out: &mut dyn Write, command: &Command) -> Result<(), RunError> {
		self(out, command)
	}
}

/// Placeholder tokens rewritten in a command's path before it is fetched.
///
/// Each token (`$name`) is replaced by its prefix wherever it occurs in the
/// path. Longer tokens are applied first so `$otel` never clobbers
/// `$otel_go`; tokens of equal length keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mounts {
	entries: Vec<(String, String)>,
}

impl Mounts {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register `name`, adding the leading `$` when missing. Registering the
	/// same name again replaces its prefix.
	pub fn insert(&mut self, name: impl AsRef<str>, prefix: impl Into<String>) {
		let name = name.as_ref();
		let token = if name.starts_with('$') {
			name.to_string()
		} else {
			format!("${name}")
		};
		let prefix = prefix.into();

		match self.entries.iter_mut().find(|(existing, _)| *existing == token) {
			Some(entry) => entry.1 = prefix,
			None => self.entries.push((token, prefix)),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Rewrite every registered token in `path`.
	pub fn resolve(&self, path: &str) -> String {
		let mut ordered: Vec<&(String, String)> = self.entries.iter().collect();
		ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

		ordered
			.into_iter()
			.fold(path.to_string(), |path, (token, prefix)| {
				path.replace(token.as_str(), prefix)
			})
	}
}

impl<N: AsRef<str>, P: Into<String>> FromIterator<(N, P)> for Mounts {
	fn from_iter<I: IntoIterator<Item = (N, P)>>(iter: I) -> Self {
		let mut mounts = Self::new();
		for (name, prefix) in iter {
			mounts.insert(name, prefix);
		}
		mounts
	}
}

/// Parse a `name=prefix` mount definition as given on the command line.
pub fn parse_mount(definition: &str) -> EmbedResult<(String, String)> {
	let (name, prefix) = definition
		.split_once('=')
		.ok_or_else(|| EmbedError::InvalidMount(definition.to_string()))?;
	let name = name.trim();

	if name.is_empty() || name == "$" {
		return Err(EmbedError::InvalidMount(definition.to_string()));
	}

	Ok((name.to_string(), prefix.to_string()))
}

/// The command runner used for real documents: resolves mounts, fetches,
/// extracts, formats and writes the block.
#[derive(Clone, Default)]
pub struct Embedder<F = DefaultFetcher> {
	fetcher: F,
	base_dir: PathBuf,
	mounts: Mounts,
}

impl Embedder {
	pub fn new() -> Self {
		Self::default()
	}
}

impl<F: Fetcher> Embedder<F> {
	/// Replace the fetcher, keeping the base directory and mounts.
	pub fn with_fetcher<G: Fetcher>(self, fetcher: G) -> Embedder<G> {
		Embedder {
			fetcher,
			base_dir: self.base_dir,
			mounts: self.mounts,
		}
	}

	/// Directory relative paths are resolved against.
	pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
		self.base_dir = base_dir.into();
		self
	}

	pub fn with_mounts(mut self, mounts: Mounts) -> Self {
		self.mounts = mounts;
		self
	}

	/// Run a single command.
	pub fn run_command(&self, out: &mut dyn Write, command: &Command) -> Result<(), RunError> {
		let path = self.mounts.resolve(&command.path);
		tracing::debug!(path = %path, language = %command.language, "embedding content");

		let content = self
			.fetcher
			.fetch(&self.base_dir, &path)
			.map_err(|source| {
				RunError::CouldNotRead {
					path: path.clone(),
					source,
				}
			})?;

		let content = extract(&content, command)
			.map_err(|source| {
				RunError::CouldNotExtract {
					path: path.clone(),
					source,
				}
			})?
			.to_vec();

		let content = format(content, command).map_err(|source| {
			match source {
				FormatError::Template(_) => {
					RunError::CouldNotApplyTemplate {
						path: path.clone(),
						source,
					}
				}
				FormatError::InvalidSubstitution { .. } => {
					RunError::CouldNotReplace {
						path: path.clone(),
						source,
					}
				}
			}
		})?;

		if command.is_code() {
			writeln!(out, "```{}", command.language)?;
		}
		out.write_all(&content)?;
		if (command.is_code() || command.syntax == CommandSyntax::Yaml)
			&& !content.ends_with(b"\n")
		{
			out.write_all(b"\n")?;
		}
		if command.is_code() {
			writeln!(out, "```")?;
		}

		Ok(())
	}

	/// Process a whole markdown document from `input` into `out`.
	pub fn process<R: BufRead, W: Write>(&self, out: &mut W, input: R) -> EmbedResult<()> {
		scanner::process(out, input, self)
	}

	/// Process a document held in memory. Embedded bytes are copied
	/// verbatim whatever their encoding.
	pub fn process_bytes(&self, input: &[u8]) -> EmbedResult<Vec<u8>> {
		let mut out = Vec::new();
		self.process(&mut out, input)?;

		Ok(out)
	}

	/// Like [`Embedder::process_bytes`] for text. Invalid UTF-8 in embedded
	/// content is replaced with `U+FFFD`.
	pub fn process_to_string(&self, input: &str) -> EmbedResult<String> {
		let out = self.process_bytes(input.as_bytes())?;

		Ok(String::from_utf8_lossy(&out).into_owned())
	}
}

impl<F: Fetcher> CommandRunner for Embedder<F> {
	fn run(&self, out: &mut dyn Write, command: &Command) -> Result<(), RunError> {
		self.run_command(out, command)
	}
}
