use std::borrow::Cow;
use std::sync::LazyLock;

use regex::bytes::Regex;

use crate::Command;
use crate::FormatError;
use crate::Substitution;

const TEMPLATE_NAME: &str = "embed";

/// A `{{ ... }}` action, including trim markers.
static TEMPLATE_ACTION: LazyLock<regex::Regex> =
	LazyLock::new(|| regex::Regex::new(r"(?s)\{\{.*?\}\}").expect("valid action pattern"));

/// A `.Content` field reference that is not itself a field of something else.
static CONTENT_FIELD: LazyLock<regex::Regex> = LazyLock::new(|| {
	regex::Regex::new(r"(^|[^\w.)\]])\.Content\b").expect("valid field pattern")
});

/// Post-process extracted content: trailing newline, substitutions, trimming
/// and finally the template. Every step runs; an unset option is a no-op.
pub fn format(content: Vec<u8>, command: &Command) -> Result<Vec<u8>, FormatError> {
	let content = ensure_trailing_newline(content);
	let content = apply_substitutions(content, &command.substitutions)?;
	let content = trim_content(content, command);

	match &command.template {
		Some(template) => Ok(render_template(&content, template)?.into_bytes()),
		None => Ok(content),
	}
}

/// Append `\n` to non-empty content that does not already end with one.
pub fn ensure_trailing_newline(mut content: Vec<u8>) -> Vec<u8> {
	if !content.is_empty() && !content.ends_with(b"\n") {
		content.push(b'\n');
	}

	content
}

/// Apply each substitution in order, replacing every non-overlapping match.
/// Replacements may refer to capture groups as `$1` or `${name}`.
pub fn apply_substitutions(
	mut content: Vec<u8>,
	substitutions: &[Substitution],
) -> Result<Vec<u8>, FormatError> {
	for substitution in substitutions {
		let regex = Regex::new(&substitution.pattern).map_err(|e| {
			FormatError::InvalidSubstitution {
				pattern: substitution.pattern.clone(),
				reason: e.to_string(),
			}
		})?;

		content = regex
			.replace_all(&content, substitution.replacement.as_bytes())
			.into_owned();
	}

	Ok(content)
}

fn trim_content(content: Vec<u8>, command: &Command) -> Vec<u8> {
	let mut content = content.as_slice();

	if command.trim {
		content = trim_space(content);
	}
	if !command.trim_prefix.is_empty() {
		content = content
			.strip_prefix(command.trim_prefix.as_bytes())
			.unwrap_or(content);
	}
	if !command.trim_suffix.is_empty() {
		content = content
			.strip_suffix(command.trim_suffix.as_bytes())
			.unwrap_or(content);
	}
	// Removing the prefix or suffix can expose more whitespace.
	if command.trim {
		content = trim_space(content);
	}

	content.to_vec()
}

/// Strip leading and trailing Unicode white space. Invalid UTF-8 stops the
/// trimming at that end.
pub fn trim_space(content: &[u8]) -> &[u8] {
	let leading = content.utf8_chunks().next().map_or(0, |chunk| {
		chunk.valid().len() - chunk.valid().trim_start().len()
	});
	let content = &content[leading..];

	let trailing = content
		.utf8_chunks()
		.last()
		.filter(|chunk| chunk.invalid().is_empty())
		.map_or(0, |chunk| chunk.valid().len() - chunk.valid().trim_end().len());

	&content[..content.len() - trailing]
}

/// Rewrite `.Content` field references inside template actions to the
/// bound `content` variable, so `{{ .Content }}` templates keep working.
fn rewrite_field_references(template: &str) -> Cow<'_, str> {
	TEMPLATE_ACTION.replace_all(template, |caps: &regex::Captures<'_>| {
		CONTENT_FIELD.replace_all(&caps[0], "${1}content").into_owned()
	})
}

/// Render `template` with the content bound to `content` (and `Content`).
/// `{{ .Content }}` is accepted as well. Undefined variables are an error.
pub fn render_template(content: &[u8], template: &str) -> Result<String, FormatError> {
	let text = String::from_utf8_lossy(content).into_owned();
	let source = rewrite_field_references(template);

	let mut env = minijinja::Environment::new();
	env.set_keep_trailing_newline(true);
	env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
	env.add_template(TEMPLATE_NAME, &source)
		.map_err(|e| FormatError::Template(e.to_string()))?;

	let template = env
		.get_template(TEMPLATE_NAME)
		.map_err(|e| FormatError::Template(e.to_string()))?;

	template
		.render(minijinja::context! { content => text.clone(), Content => text })
		.map_err(|e| FormatError::Template(e.to_string()))
}
