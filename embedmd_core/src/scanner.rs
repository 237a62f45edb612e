use std::io::BufRead;
use std::io::Write;

use crate::CommandRunner;
use crate::DIRECTIVE_MARKER;
use crate::DocumentErrorKind;
use crate::EmbedError;
use crate::EmbedResult;
use crate::ScanError;
use crate::decode_yaml_command;
use crate::parse_command;

const CODE_FENCE: &str = "```";
const YAML_TRIGGER: &str = "embed:";
const YAML_TERMINATOR: &str = "---";

#[derive(Debug)]
enum State {
	ScanningText,
	/// The current line holds an inline directive.
	ParsingDirective,
	/// Inside a fenced code block. `echo` is false for a block that directly
	/// follows a directive, since it is regenerated.
	InCodeBlock { echo: bool },
	/// Inside `embed:` front matter.
	InYamlBlock { buffered: Vec<String>, dropping: bool },
	Done,
}

struct Scanner<'a, R, W, C: ?Sized> {
	input: R,
	/// 1-indexed number of the current line, 0 before the first read.
	line: usize,
	/// The current line without its `\n` or `\r\n` terminator. Lines are
	/// kept as bytes so documents in any encoding pass through unchanged.
	current: Vec<u8>,
	out: &'a mut W,
	runner: &'a C,
}

impl<R, W, C> Scanner<'_, R, W, C>
where
	R: BufRead,
	W: Write,
	C: CommandRunner + ?Sized,
{
	/// Read the next line into `current`. Returns `false` at the end of input.
	fn advance(&mut self) -> Result<bool, DocumentErrorKind> {
		self.current.clear();
		if self.input.read_until(b'\n', &mut self.current)? == 0 {
			return Ok(false);
		}

		if self.current.ends_with(b"\n") {
			self.current.pop();
			if self.current.ends_with(b"\r") {
				self.current.pop();
			}
		}
		self.line += 1;

		Ok(true)
	}

	fn emit(&mut self) -> Result<(), DocumentErrorKind> {
		self.out.write_all(&self.current)?;
		self.out.write_all(b"\n")?;
		Ok(())
	}

	fn current_starts_with(&self, prefix: &str) -> bool {
		self.current.starts_with(prefix.as_bytes())
	}

	fn step(&mut self, state: State) -> Result<State, DocumentErrorKind> {
		match state {
			State::ScanningText => self.scan_text(),
			State::ParsingDirective => self.parse_directive(),
			State::InCodeBlock { echo } => self.code_block(echo),
			State::InYamlBlock { buffered, dropping } => self.yaml_block(buffered, dropping),
			State::Done => Ok(State::Done),
		}
	}

	fn scan_text(&mut self) -> Result<State, DocumentErrorKind> {
		if !self.advance()? {
			return Ok(State::Done);
		}

		if self.line == 2 && self.current == YAML_TRIGGER.as_bytes() {
			return Ok(State::InYamlBlock {
				buffered: Vec::new(),
				dropping: false,
			});
		}

		if self.current_starts_with(DIRECTIVE_MARKER) {
			return Ok(State::ParsingDirective);
		}

		self.emit()?;
		if self.current_starts_with(CODE_FENCE) {
			return Ok(State::InCodeBlock { echo: true });
		}

		Ok(State::ScanningText)
	}

	fn parse_directive(&mut self) -> Result<State, DocumentErrorKind> {
		self.emit()?;
		let args = String::from_utf8_lossy(&self.current[DIRECTIVE_MARKER.len()..]);
		let command = parse_command(&args)?;
		tracing::trace!(line = self.line, path = %command.path, "found directive");
		self.runner.run(&mut *self.out, &command)?;

		if !self.advance()? {
			return Ok(State::Done);
		}

		// A fenced block right after the directive is the previous output.
		if self.current_starts_with(CODE_FENCE) {
			return Ok(State::InCodeBlock { echo: false });
		}

		self.emit()?;
		Ok(State::ScanningText)
	}

	fn code_block(&mut self, echo: bool) -> Result<State, DocumentErrorKind> {
		if !self.advance()? {
			return Err(ScanError::UnbalancedCodeSection.into());
		}

		if echo {
			self.emit()?;
		}

		if self.current_starts_with(CODE_FENCE) {
			Ok(State::ScanningText)
		} else {
			Ok(State::InCodeBlock { echo })
		}
	}

	fn yaml_block(
		&mut self,
		mut buffered: Vec<String>,
		dropping: bool,
	) -> Result<State, DocumentErrorKind> {
		// Everything after the front matter is the previous output.
		if dropping {
			while self.advance()? {}
			return Ok(State::Done);
		}

		self.emit()?;
		if !self.advance()? {
			return Err(ScanError::UnbalancedYamlSection.into());
		}

		if self.current != YAML_TERMINATOR.as_bytes() {
			buffered.push(String::from_utf8_lossy(&self.current).into_owned());
			return Ok(State::InYamlBlock {
				buffered,
				dropping: false,
			});
		}

		write!(self.out, "{YAML_TERMINATOR}\n\n")?;
		let command = decode_yaml_command(&buffered)?;
		tracing::trace!(line = self.line, path = %command.path, "found front matter command");
		self.runner.run(&mut *self.out, &command)?;

		Ok(State::InYamlBlock {
			buffered: Vec::new(),
			dropping: true,
		})
	}
}

/// Copy the markdown document in `input` to `out`, running every embed
/// directive through `runner` and replacing the code block that follows it.
///
/// Directives inside fenced code blocks are left alone. When line 2 of the
/// document is exactly `embed:`, the front matter up to the next `---` line
/// describes a single command whose output replaces the rest of the document.
///
/// Errors carry the 1-indexed line at which processing stopped.
pub fn process<R, W, C>(out: &mut W, input: R, runner: &C) -> EmbedResult<()>
where
	R: BufRead,
	W: Write,
	C: CommandRunner + ?Sized,
{
	let mut scanner = Scanner {
		input,
		line: 0,
		current: Vec::new(),
		out,
		runner,
	};

	let mut state = State::ScanningText;
	loop {
		state = match scanner.step(state) {
			Ok(State::Done) => return Ok(()),
			Ok(next) => next,
			Err(kind) => {
				return Err(EmbedError::Document {
					line: scanner.line,
					kind,
				});
			}
		};
	}
}
