mod common;

use embedmd_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;

#[test]
fn diff_reports_changes_with_exit_code() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path())?;
	let path = tmp.path().join("docs.md");

	common::embedmd_cmd()
		.arg("-d")
		.arg(&path)
		.assert()
		.code(2)
		.stdout(
			predicates::str::contains(format!("--- a/{}", path.display()))
				.and(predicates::str::contains(format!("+++ b/{}", path.display())))
				.and(predicates::str::contains("@@"))
				.and(predicates::str::contains("+```go"))
				.and(predicates::str::contains("+func main() {")),
		);

	// The document itself is untouched.
	let content = std::fs::read_to_string(&path)?;
	assert!(!content.contains("```go"));

	Ok(())
}

#[test]
fn diff_is_silent_when_up_to_date() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path())?;
	std::fs::write(tmp.path().join("docs.md"), common::expected_docs())?;

	common::embedmd_cmd()
		.arg("--diff")
		.arg(tmp.path().join("docs.md"))
		.assert()
		.success()
		.stdout("");

	Ok(())
}

#[test]
fn diff_shows_removed_stale_lines() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path())?;
	std::fs::write(
		tmp.path().join("docs.md"),
		"# Docs\n\n[embedmd]:# (code.go /func main/ $)\n```go\nfunc old() {}\n```\n",
	)?;

	common::embedmd_cmd()
		.arg("-d")
		.arg(tmp.path().join("docs.md"))
		.assert()
		.code(2)
		.stdout(
			predicates::str::contains("-func old() {}")
				.and(predicates::str::contains("+\tfmt.Println(\"hello\")")),
		);

	Ok(())
}

#[test]
fn diff_from_standard_input() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path())?;

	common::embedmd_cmd()
		.arg("-d")
		.current_dir(tmp.path())
		.write_stdin("[embedmd]:# (code.go /func main/ $)\n")
		.assert()
		.code(2)
		.stdout(
			predicates::str::contains("--- a/stdin")
				.and(predicates::str::contains("+}")),
		);

	Ok(())
}

#[test]
fn piped_diff_has_no_color_codes() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path())?;

	common::embedmd_cmd()
		.env_remove("NO_COLOR")
		.env_remove("FORCE_COLOR")
		.env_remove("CLICOLOR_FORCE")
		.env_remove("IGNORE_IS_TERMINAL")
		.arg("-d")
		.arg(tmp.path().join("docs.md"))
		.assert()
		.code(2)
		.stdout(predicates::str::contains("+```go").and(predicates::str::contains("\u{1b}[").not()));

	Ok(())
}
