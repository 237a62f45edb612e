#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;

pub const CODE: &str = "package main

import \"fmt\"

func main() {
	fmt.Println(\"hello\")
}
";

pub fn embedmd_cmd() -> Command {
	let mut cmd = Command::cargo_bin("embedmd").unwrap();
	cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
	cmd
}

/// Write `code.go` and a `docs.md` that embeds its `main` function.
pub fn write_project(root: &Path) -> std::io::Result<()> {
	std::fs::write(root.join("code.go"), CODE)?;
	std::fs::write(
		root.join("docs.md"),
		"# Docs\n\n[embedmd]:# (code.go /func main/ $)\n",
	)
}

pub fn expected_docs() -> String {
	"# Docs\n\n[embedmd]:# (code.go /func main/ $)\n```go\nfunc main() {\n\tfmt.Println(\"hello\")\n}\n```\n"
		.to_string()
}
