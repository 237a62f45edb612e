use miette::Diagnostic;
use thiserror::Error;

/// Malformed directive syntax, inline or YAML.
#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum ParseError {
	#[error("argument list should be in parenthesis")]
	#[diagnostic(
		code(embedmd::arguments_not_parenthesized),
		help("write the directive as `[embedmd]:# (path lang /start/ /end/)`")
	)]
	ArgumentsNotParenthesized,

	#[error("unbalanced /")]
	#[diagnostic(
		code(embedmd::unbalanced_delimiter),
		help("close the regular expression with `/`, or escape a literal slash as `\\/`")
	)]
	UnbalancedDelimiter,

	#[error("missing file name")]
	#[diagnostic(code(embedmd::missing_file_name))]
	MissingFileName,

	#[error("language is required when file has no extension")]
	#[diagnostic(
		code(embedmd::language_required),
		help("add the language after the path, e.g. `(Makefile make)`")
	)]
	LanguageRequired,

	#[error("too many arguments")]
	#[diagnostic(
		code(embedmd::too_many_arguments),
		help("a directive accepts at most a start and an end expression")
	)]
	TooManyArguments,

	#[error("substitution `{0}` must come before the start and end expressions")]
	#[diagnostic(code(embedmd::misplaced_substitution))]
	MisplacedSubstitution(String),

	#[error("invalid yaml command: {0}")]
	#[diagnostic(code(embedmd::yaml))]
	Yaml(String),
}

/// Failure to read the content a directive points at.
#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum FetchError {
	#[error("file does not exist")]
	#[diagnostic(code(embedmd::not_found))]
	NotFound,

	#[error(transparent)]
	#[diagnostic(code(embedmd::io_error))]
	Io(#[from] std::io::Error),

	#[error("invalid url `{url}`: {reason}")]
	#[diagnostic(code(embedmd::invalid_url))]
	InvalidUrl { url: String, reason: String },

	#[error("status {0}")]
	#[diagnostic(code(embedmd::http_status))]
	Status(String),

	#[error("http request failed: {0}")]
	#[diagnostic(code(embedmd::http))]
	Http(String),
}

/// Failure to extract the requested range from fetched content.
#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum ExtractError {
	#[error("missing slashes (/) around {0:?}")]
	#[diagnostic(
		code(embedmd::missing_slashes),
		help("inline start and end expressions are written as `/regexp/`")
	)]
	MissingSlashes(String),

	#[error("invalid regular expression `{pattern}`: {reason}")]
	#[diagnostic(code(embedmd::invalid_pattern))]
	InvalidPattern { pattern: String, reason: String },

	#[error("could not match {0:?}")]
	#[diagnostic(code(embedmd::no_match))]
	NoMatch(String),
}

/// Failure while applying substitutions or the template.
#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum FormatError {
	#[error("invalid substitution pattern `{pattern}`: {reason}")]
	#[diagnostic(code(embedmd::invalid_substitution))]
	InvalidSubstitution { pattern: String, reason: String },

	#[error("template rendering failed: {0}")]
	#[diagnostic(
		code(embedmd::template),
		help("the embedded text is available to the template as `{{{{ content }}}}`")
	)]
	Template(String),
}

/// Structural problems found while scanning a document.
#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum ScanError {
	#[error("unbalanced code section")]
	#[diagnostic(
		code(embedmd::unbalanced_code_section),
		help("close the fenced code block with a line starting with ```")
	)]
	UnbalancedCodeSection,

	#[error("unbalanced yaml section")]
	#[diagnostic(
		code(embedmd::unbalanced_yaml_section),
		help("terminate the `embed:` front matter with a `---` line")
	)]
	UnbalancedYamlSection,
}

/// Failure while running a single command.
#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum RunError {
	#[error("could not read {path}: {source}")]
	#[diagnostic(code(embedmd::could_not_read))]
	CouldNotRead { path: String, source: FetchError },

	#[error("could not extract content from {path}: {source}")]
	#[diagnostic(code(embedmd::could_not_extract))]
	CouldNotExtract { path: String, source: ExtractError },

	#[error("could not replace content from {path}: {source}")]
	#[diagnostic(code(embedmd::could_not_replace))]
	CouldNotReplace { path: String, source: FormatError },

	#[error("could not apply template to content from {path}: {source}")]
	#[diagnostic(code(embedmd::could_not_apply_template))]
	CouldNotApplyTemplate { path: String, source: FormatError },

	#[error("could not write output: {0}")]
	#[diagnostic(code(embedmd::write))]
	Write(#[from] std::io::Error),
}

/// The reason a document pass stopped, without the line number.
#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum DocumentErrorKind {
	#[error(transparent)]
	#[diagnostic(transparent)]
	Parse(#[from] ParseError),

	#[error(transparent)]
	#[diagnostic(transparent)]
	Run(#[from] RunError),

	#[error(transparent)]
	#[diagnostic(transparent)]
	Scan(#[from] ScanError),

	#[error(transparent)]
	#[diagnostic(code(embedmd::io_error))]
	Io(#[from] std::io::Error),
}

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum EmbedError {
	#[error("{line}: {kind}")]
	#[diagnostic(code(embedmd::document))]
	Document {
		/// 1-indexed line at which processing stopped.
		line: usize,
		kind: DocumentErrorKind,
	},

	#[error(transparent)]
	#[diagnostic(code(embedmd::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(embedmd::config_parse),
		help("check that embedmd.toml is valid TOML with [mounts] and/or [http] sections")
	)]
	ConfigParse(String),

	#[error("invalid mount: {0}")]
	#[diagnostic(
		code(embedmd::invalid_mount),
		help("mounts are written as `name=prefix`, e.g. `-m otel=https://example.com/otel`")
	)]
	InvalidMount(String),
}

impl EmbedError {
	/// The line number for document errors.
	pub fn line(&self) -> Option<usize> {
		match self {
			Self::Document { line, .. } => Some(*line),
			_ => None,
		}
	}
}

pub type EmbedResult<T> = Result<T, EmbedError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
