use serde::Deserialize;
use serde::Serialize;

use crate::ParseError;

/// Marker that introduces an inline directive. Everything after it on the
/// same line is the parenthesized argument list.
pub const DIRECTIVE_MARKER: &str = "[embedmd]:#";

/// Escape tokens replaced before an inline argument list is tokenized, so
/// newlines and parentheses can appear inside values.
const SPECIAL_TOKENS: [(&str, &str); 3] = [
	("$embed:{newline}", "\n"),
	("$embed:{braceOpen}", "("),
	("$embed:{braceClose}", ")"),
];

/// Whether embedded content is wrapped in a fenced code block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
	#[default]
	Code,
	Plain,
}

/// The syntax a command was written in. Default values differ between the
/// two, so the origin travels with the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSyntax {
	/// `[embedmd]:# (...)` comment directive.
	Inline,
	/// `embed:` front-matter block.
	Yaml,
}

/// A start or end boundary of the embedded range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Boundary {
	/// A regular expression. Inline commands keep the surrounding slashes,
	/// which are checked and removed at extraction time. May be empty.
	Pattern(String),
	/// The `$` sentinel: the range runs to the end of the content.
	EndOfContent,
}

impl Boundary {
	fn from_raw(raw: impl Into<String>) -> Self {
		let raw = raw.into();
		if raw == "$" {
			Self::EndOfContent
		} else {
			Self::Pattern(raw)
		}
	}

	/// The boundary as it was written.
	pub fn as_str(&self) -> &str {
		match self {
			Self::Pattern(pattern) => pattern,
			Self::EndOfContent => "$",
		}
	}
}

/// A regular expression rewrite applied to the extracted content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Substitution {
	pub pattern: String,
	pub replacement: String,
}

impl Substitution {
	pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
		Self {
			pattern: pattern.into(),
			replacement: replacement.into(),
		}
	}
}

/// The parsed intent of one embed directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
	/// Relative path (forward slashes) or `http(s)://` url of the content.
	pub path: String,
	/// Language tag written after the opening fence.
	pub language: String,
	pub r#type: CommandType,
	pub start: Option<Boundary>,
	pub end: Option<Boundary>,
	/// Keep the text matched by `start`.
	pub include_start: bool,
	/// Keep the text matched by `end`.
	pub include_end: bool,
	/// Rewrites applied in order after extraction.
	pub substitutions: Vec<Substitution>,
	pub trim: bool,
	pub trim_prefix: String,
	pub trim_suffix: String,
	/// Template rendered with the final content bound to `content`.
	pub template: Option<String>,
	pub syntax: CommandSyntax,
}

impl Command {
	/// A command with the inline defaults: fenced, boundaries included.
	pub fn inline(path: impl Into<String>, language: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			language: language.into(),
			r#type: CommandType::Code,
			start: None,
			end: None,
			include_start: true,
			include_end: true,
			substitutions: Vec::new(),
			trim: false,
			trim_prefix: String::new(),
			trim_suffix: String::new(),
			template: None,
			syntax: CommandSyntax::Inline,
		}
	}

	/// A command with the YAML defaults: fenced, boundaries excluded unless
	/// the author asks for them.
	pub fn yaml(path: impl Into<String>, language: impl Into<String>) -> Self {
		Self {
			include_start: false,
			include_end: false,
			syntax: CommandSyntax::Yaml,
			..Self::inline(path, language)
		}
	}

	pub fn with_start(mut self, start: impl Into<String>) -> Self {
		self.start = Some(Boundary::from_raw(start));
		self
	}

	pub fn with_end(mut self, end: impl Into<String>) -> Self {
		self.end = Some(Boundary::from_raw(end));
		self
	}

	pub fn with_type(mut self, r#type: CommandType) -> Self {
		self.r#type = r#type;
		self
	}

	pub fn with_substitution(mut self, substitution: Substitution) -> Self {
		self.substitutions.push(substitution);
		self
	}

	pub fn is_code(&self) -> bool {
		self.r#type == CommandType::Code
	}
}

/// One tokenized field of an inline argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Field {
	Plain(String),
	Substitution(Substitution),
}

impl Field {
	fn as_plain(&self) -> Option<&str> {
		match self {
			Self::Plain(text) => Some(text),
			Self::Substitution(_) => None,
		}
	}
}

/// Parse the argument list of an inline directive, e.g.
/// `(code.go go s/old/new/ /start/ /end/)`.
///
/// The grammar is `(path flags* language? substitutions* start? end?)`:
///
/// - flags are `noCode`, `noStart`, `noEnd`, `trim`, `trimPrefix:<text>`,
///   `trimSuffix:<text>`, `template:<text>` and `lang:<language>`;
/// - the language defaults to the extension of `path`;
/// - substitutions are written `s/pattern/replacement/` with `\/` escapes;
/// - `start` and `end` are `/regexp/`, and `end` may be `$`.
pub fn parse_command(args: &str) -> Result<Command, ParseError> {
	let args = replace_special_tokens(args.trim());
	let args = args.trim();
	let interior = args
		.strip_prefix('(')
		.and_then(|rest| rest.strip_suffix(')'))
		.ok_or(ParseError::ArgumentsNotParenthesized)?;

	let fields = tokenize(interior)?;
	let mut fields = fields.into_iter().peekable();

	let path = match fields.next() {
		Some(Field::Plain(path)) if !path.is_empty() => path,
		_ => return Err(ParseError::MissingFileName),
	};

	let mut command = Command::inline(path, "");
	let mut explicit_language = None;

	while let Some(Field::Plain(text)) = fields.peek() {
		if !apply_flag(&mut command, &mut explicit_language, text) {
			break;
		}
		fields.next();
	}

	let language_field = fields
		.next_if(|field| field.as_plain().is_some_and(|text| !text.starts_with('/')));
	command.language = match (language_field, explicit_language) {
		(Some(Field::Plain(language)), _) | (None, Some(language)) => language,
		_ => {
			extension_language(&command.path)
				.ok_or(ParseError::LanguageRequired)?
				.to_string()
		}
	};

	while let Some(Field::Substitution(substitution)) =
		fields.next_if(|field| matches!(field, Field::Substitution(_)))
	{
		command.substitutions.push(substitution);
	}

	let boundaries: Vec<Field> = fields.collect();
	if boundaries.len() > 2 {
		return Err(ParseError::TooManyArguments);
	}

	let mut boundaries = boundaries.into_iter().map(|field| {
		match field {
			Field::Plain(text) => Ok(Boundary::from_raw(text)),
			Field::Substitution(substitution) => {
				Err(ParseError::MisplacedSubstitution(substitution.pattern))
			}
		}
	});
	command.start = boundaries.next().transpose()?;
	command.end = boundaries.next().transpose()?;

	Ok(command)
}

/// Apply a flag token to the command. Returns `false` when the token is not
/// a flag.
fn apply_flag(command: &mut Command, language: &mut Option<String>, token: &str) -> bool {
	match token {
		"noCode" => command.r#type = CommandType::Plain,
		"noStart" => command.include_start = false,
		"noEnd" => command.include_end = false,
		"trim" => command.trim = true,
		_ => {
			let Some((name, value)) = token.split_once(':') else {
				return false;
			};

			match name {
				"trimPrefix" => command.trim_prefix = value.to_string(),
				"trimSuffix" => command.trim_suffix = value.to_string(),
				"template" => command.template = Some(value.to_string()),
				"lang" => *language = Some(value.to_string()),
				_ => return false,
			}
		}
	}

	true
}

fn replace_special_tokens(text: &str) -> String {
	SPECIAL_TOKENS
		.iter()
		.fold(text.to_string(), |text, (token, value)| {
			text.replace(token, value)
		})
}

/// Split the inside of an argument list into fields. Text between slashes is
/// kept together even when it contains blanks.
fn tokenize(text: &str) -> Result<Vec<Field>, ParseError> {
	let mut fields = Vec::new();
	let mut rest = text.trim();

	while !rest.is_empty() {
		if let Some(body) = rest.strip_prefix("s/") {
			let pattern_len = next_slash(body).ok_or(ParseError::UnbalancedDelimiter)?;
			let after_pattern = &body[pattern_len + 1..];
			let replacement_len =
				next_slash(after_pattern).ok_or(ParseError::UnbalancedDelimiter)?;

			fields.push(Field::Substitution(Substitution::new(
				unescape_slash(&body[..pattern_len]),
				unescape_slash(&after_pattern[..replacement_len]),
			)));
			rest = &after_pattern[replacement_len + 1..];
		} else if let Some(body) = rest.strip_prefix('/') {
			let len = next_slash(body).ok_or(ParseError::UnbalancedDelimiter)?;
			fields.push(Field::Plain(rest[..len + 2].to_string()));
			rest = &body[len + 1..];
		} else if let Some(end) = rest.find(char::is_whitespace) {
			fields.push(Field::Plain(rest[..end].to_string()));
			rest = &rest[end..];
		} else {
			fields.push(Field::Plain(rest.to_string()));
			break;
		}

		rest = rest.trim_start();
	}

	Ok(fields)
}

/// Byte index of the next `/` that is not escaped with a backslash.
fn next_slash(text: &str) -> Option<usize> {
	let bytes = text.as_bytes();
	let mut from = 0;

	loop {
		let index = from + text[from..].find('/')?;
		if index == 0 || bytes[index - 1] != b'\\' {
			return Some(index);
		}
		from = index + 1;
	}
}

fn unescape_slash(text: &str) -> String {
	text.replace("\\/", "/")
}

/// The extension of the last path segment. The first character is skipped so
/// that a leading dot (`.bashrc`) is not mistaken for an extension.
pub(crate) fn extension_language(path: &str) -> Option<&str> {
	let (offset, _) = path.char_indices().nth(1)?;
	let name = path[offset..].rsplit('/').next()?;
	let (_, extension) = name.rsplit_once('.')?;

	(!extension.is_empty()).then_some(extension)
}

/// Schema of the `embed:` front-matter block.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YamlCommand {
	#[serde(default)]
	src: String,
	lang: Option<String>,
	#[serde(default, rename = "type")]
	r#type: CommandType,
	start: Option<String>,
	end: Option<String>,
	#[serde(default)]
	include_start: bool,
	#[serde(default)]
	include_end: bool,
	#[serde(default)]
	trim: bool,
	#[serde(default)]
	trim_prefix: String,
	#[serde(default)]
	trim_suffix: String,
	template: Option<String>,
	#[serde(default)]
	replace: Vec<Substitution>,
}

#[derive(Debug, Deserialize)]
struct FrontMatter {
	embed: YamlCommand,
}

/// Decode the lines that follow an `embed:` front-matter line into a command.
/// Keys outside the `embed` mapping (at the top level of the front matter)
/// are ignored.
pub fn decode_yaml_command<S: AsRef<str>>(lines: &[S]) -> Result<Command, ParseError> {
	let mut document = String::from("embed:\n");
	for line in lines {
		document.push_str(line.as_ref());
		document.push('\n');
	}

	let FrontMatter { embed } =
		serde_yaml_ng::from_str(&document).map_err(|e| ParseError::Yaml(e.to_string()))?;

	if embed.src.is_empty() {
		return Err(ParseError::MissingFileName);
	}

	let language = match embed.lang.filter(|lang| !lang.is_empty()) {
		Some(language) => language,
		None => {
			match extension_language(&embed.src) {
				Some(extension) => extension.to_string(),
				None if embed.r#type == CommandType::Plain => String::new(),
				None => return Err(ParseError::LanguageRequired),
			}
		}
	};

	let mut command = Command::yaml(embed.src, language).with_type(embed.r#type);
	command.start = embed.start.map(Boundary::from_raw);
	command.end = embed.end.map(Boundary::from_raw);
	command.include_start = embed.include_start;
	command.include_end = embed.include_end;
	command.substitutions = embed.replace;
	command.trim = embed.trim;
	command.trim_prefix = embed.trim_prefix;
	command.trim_suffix = embed.trim_suffix;
	command.template = embed.template.filter(|template| !template.is_empty());

	Ok(command)
}
