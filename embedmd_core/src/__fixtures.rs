use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use crate::Command;
use crate::FetchError;
use crate::Fetcher;
use crate::RunError;
use crate::is_url;
use crate::resolve_local_path;

/// Go program used as the embedded source in most tests.
pub const CONTENT: &str = "
package main

import \"fmt\"

func main() {
        fmt.Println(\"hello, test\")
}
";

/// Front matter passed to a fake runner. Line 2 of a document built from it
/// is `embed:`.
pub const YAML_COMMAND: &str = r#"embed:
  src: https://raw.githubusercontent.com/grafana/docker-otel-lgtm/main/examples/go/go.mod
  type: plain
  start: require (
  end: )
  includeStart: false
  includeEnd: false
  trim: true
  trimSuffix: \
  template: |
    ```sh
    go get {{ .Content }}
    ```
  replace:
    - pattern: \s+(\S+) \S+
      replacement: |
        $1" \
"#;

pub const GO_MOD: &str = "module example.com/demo

go 1.22

require (
	go.opentelemetry.io/otel v1.28.0
	go.opentelemetry.io/otel/sdk v1.28.0
)
";

/// Front matter that turns the `require` block of [`GO_MOD`] into a
/// `go get` command.
pub const GO_GET_COMMAND: &str = r#"embed:
  src: go.mod
  type: plain
  start: 'require \('
  end: '^\)'
  trim: true
  trimSuffix: \
  template: |
    ```sh
    go get {{ .Content }}
    ```
  replace:
    - pattern: '\s+(\S+) \S+'
      replacement: "$1 \\\n"
"#;

/// In-memory content keyed by resolved path or url. Unknown files are
/// reported as missing and unknown urls as a 404.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
	files: HashMap<PathBuf, Vec<u8>>,
	urls: HashMap<String, Vec<u8>>,
}

impl MemoryFetcher {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn file(mut self, path: impl Into<PathBuf>, content: &str) -> Self {
		self.files.insert(path.into(), content.as_bytes().to_vec());
		self
	}

	pub fn url(mut self, url: &str, content: &str) -> Self {
		self.urls.insert(url.to_string(), content.as_bytes().to_vec());
		self
	}
}

impl Fetcher for MemoryFetcher {
	fn fetch(&self, base_dir: &Path, path_or_url: &str) -> Result<Vec<u8>, FetchError> {
		if is_url(path_or_url) {
			return self
				.urls
				.get(path_or_url)
				.cloned()
				.ok_or_else(|| FetchError::Status("404 Not Found".to_string()));
		}

		self.files
			.get(&resolve_local_path(base_dir, path_or_url))
			.cloned()
			.ok_or(FetchError::NotFound)
	}
}

/// Writes `OK` for commands that embed `code.go` and fails for anything else.
pub fn code_go_runner(out: &mut dyn Write, command: &Command) -> Result<(), RunError> {
	if command.path != "code.go" {
		return Err(RunError::CouldNotRead {
			path: command.path.clone(),
			source: FetchError::NotFound,
		});
	}

	writeln!(out, "OK")?;
	Ok(())
}

/// Writes the source of every command it receives.
pub fn echo_path_runner(out: &mut dyn Write, command: &Command) -> Result<(), RunError> {
	writeln!(out, "received: {}", command.path)?;
	Ok(())
}
