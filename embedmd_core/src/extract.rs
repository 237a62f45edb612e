use std::ops::Range;

use regex::bytes::Regex;
use regex::bytes::RegexBuilder;
use regex_automata::Anchored;
use regex_automata::Input;
use regex_automata::MatchKind;
use regex_automata::hybrid::dfa::DFA;
use regex_automata::nfa::thompson::pikevm::PikeVM;
use regex_automata::util::syntax;

use crate::Boundary;
use crate::Command;
use crate::CommandSyntax;
use crate::ExtractError;

/// Return the part of `content` selected by the command's start and end
/// boundaries.
///
/// - With neither boundary the content is returned unchanged.
/// - With only a start, the result is exactly the text the start matched.
/// - With both, the content is cut after (or at) the start match and the end
///   expression is searched in what remains; `$` runs to the end.
pub fn extract<'a>(content: &'a [u8], command: &Command) -> Result<&'a [u8], ExtractError> {
	if command.start.is_none() && command.end.is_none() {
		return Ok(content);
	}

	let mut content = content;

	if let Some(start) = command
		.start
		.as_ref()
		.map(Boundary::as_str)
		.filter(|start| !start.is_empty())
	{
		let found = find_boundary(start, content, command.syntax)?;
		if command.end.is_none() {
			return Ok(&content[found]);
		}

		let from = if command.include_start {
			found.start
		} else {
			found.end
		};
		content = &content[from..];
	}

	if let Some(Boundary::Pattern(end)) = &command.end {
		let found = find_boundary(end, content, command.syntax)?;
		let to = if command.include_end {
			found.end
		} else {
			found.start
		};
		content = &content[..to];
	}

	Ok(content)
}

fn find_boundary(
	raw: &str,
	haystack: &[u8],
	syntax: CommandSyntax,
) -> Result<Range<usize>, ExtractError> {
	let pattern = match syntax {
		CommandSyntax::Inline => {
			strip_slashes(raw).ok_or_else(|| ExtractError::MissingSlashes(raw.to_string()))?
		}
		CommandSyntax::Yaml => raw,
	};

	LongestMatcher::new(pattern)?
		.find(haystack)
		.ok_or_else(|| ExtractError::NoMatch(raw.to_string()))
}

fn strip_slashes(raw: &str) -> Option<&str> {
	if raw.len() <= 2 {
		return None;
	}

	raw.strip_prefix('/')?.strip_suffix('/')
}

/// A regular expression searched with POSIX leftmost-longest semantics: of
/// all matches starting at the leftmost possible position, the longest one
/// wins. `^` and `$` match at line boundaries.
pub struct LongestMatcher {
	/// Locates the leftmost match start, which is the same under both
	/// leftmost-first and leftmost-longest rules.
	leftmost: Regex,
	/// Reports the end of the longest anchored match. `None` when the lazy
	/// DFA cannot be built for the pattern.
	longest: Option<DFA>,
	/// Same search without the lazy DFA's limits, used when it gives up.
	fallback: PikeVM,
}

impl LongestMatcher {
	pub fn new(pattern: &str) -> Result<Self, ExtractError> {
		let leftmost = RegexBuilder::new(pattern)
			.multi_line(true)
			.build()
			.map_err(|e| {
				ExtractError::InvalidPattern {
					pattern: pattern.to_string(),
					reason: e.to_string(),
				}
			})?;

		let longest = DFA::builder()
			.configure(
				DFA::config()
					.match_kind(MatchKind::All)
					.unicode_word_boundary(true),
			)
			.syntax(syntax::Config::new().multi_line(true))
			.build(pattern)
			.ok();

		let fallback = PikeVM::builder()
			.configure(PikeVM::config().match_kind(MatchKind::All))
			.syntax(syntax::Config::new().multi_line(true))
			.build(pattern)
			.map_err(|e| {
				ExtractError::InvalidPattern {
					pattern: pattern.to_string(),
					reason: e.to_string(),
				}
			})?;

		Ok(Self {
			leftmost,
			longest,
			fallback,
		})
	}

	/// Byte range of the leftmost-longest match in `haystack`.
	pub fn find(&self, haystack: &[u8]) -> Option<Range<usize>> {
		let first = self.leftmost.find(haystack)?;
		let end = self
			.longest_end(haystack, first.start())
			.map_or(first.end(), |end| end.max(first.end()));

		Some(first.start()..end)
	}

	fn longest_end(&self, haystack: &[u8], start: usize) -> Option<usize> {
		let input = Input::new(haystack).range(start..).anchored(Anchored::Yes);

		if let Some(dfa) = &self.longest {
			let mut cache = dfa.create_cache();
			// The DFA gives up on non-ASCII text around Unicode word
			// boundaries.
			if let Ok(found) = dfa.try_search_fwd(&mut cache, &input) {
				return found.map(|found| found.offset());
			}
		}

		let mut cache = self.fallback.create_cache();
		self.fallback
			.find(&mut cache, input)
			.map(|found| found.end())
	}
}
