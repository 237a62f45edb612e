mod common;

use embedmd_core::AnyEmptyResult;
use similar_asserts::assert_eq;

#[test]
fn prints_result_to_stdout() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path())?;

	let output = common::embedmd_cmd()
		.arg(tmp.path().join("docs.md"))
		.assert()
		.success()
		.get_output()
		.stdout
		.clone();

	assert_eq!(String::from_utf8(output)?, common::expected_docs());

	// Without -w the file is left alone.
	let content = std::fs::read_to_string(tmp.path().join("docs.md"))?;
	assert!(!content.contains("```go"));

	Ok(())
}

#[test]
fn rewrites_files_in_place() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path())?;

	common::embedmd_cmd()
		.arg("-w")
		.arg(tmp.path().join("docs.md"))
		.assert()
		.success()
		.stdout("");

	let content = std::fs::read_to_string(tmp.path().join("docs.md"))?;
	assert_eq!(content, common::expected_docs());

	// A second run leaves the document unchanged.
	common::embedmd_cmd()
		.arg("--write")
		.arg(tmp.path().join("docs.md"))
		.assert()
		.success();

	let again = std::fs::read_to_string(tmp.path().join("docs.md"))?;
	assert_eq!(again, content);

	Ok(())
}

#[test]
fn resolves_paths_relative_to_the_document() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let docs = tmp.path().join("docs");
	std::fs::create_dir_all(docs.join("src"))?;
	std::fs::write(docs.join("src/code.go"), common::CODE)?;
	std::fs::write(docs.join("guide.md"), "[embedmd]:# (src/code.go /import/ /\\n/)\n")?;

	common::embedmd_cmd()
		.arg("-w")
		.arg(docs.join("guide.md"))
		.current_dir(tmp.path())
		.assert()
		.success();

	let content = std::fs::read_to_string(docs.join("guide.md"))?;
	assert_eq!(
		content,
		"[embedmd]:# (src/code.go /import/ /\\n/)\n```go\nimport \"fmt\"\n```\n".to_string()
	);

	Ok(())
}

#[test]
fn reads_standard_input() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path())?;

	common::embedmd_cmd()
		.current_dir(tmp.path())
		.write_stdin("# Docs\n\n[embedmd]:# (code.go /func main/ $)\n")
		.assert()
		.success()
		.stdout(common::expected_docs());

	Ok(())
}

#[test]
fn processes_multiple_files() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path())?;
	std::fs::write(tmp.path().join("other.md"), "[embedmd]:# (code.go noCode /func/ /\\{/)\n")?;

	common::embedmd_cmd()
		.arg("-w")
		.arg(tmp.path().join("docs.md"))
		.arg(tmp.path().join("other.md"))
		.assert()
		.success();

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("docs.md"))?,
		common::expected_docs()
	);
	assert_eq!(
		std::fs::read_to_string(tmp.path().join("other.md"))?,
		"[embedmd]:# (code.go noCode /func/ /\\{/)\nfunc main() {\n".to_string()
	);

	Ok(())
}

#[test]
fn front_matter_documents() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("code.go"), common::CODE)?;
	std::fs::write(
		tmp.path().join("snippet.md"),
		"---\nembed:\n  src: code.go\n  start: 'func main\\(\\) \\{'\n  end: '^\\}'\n  trim: true\n---\nold\n",
	)?;

	common::embedmd_cmd()
		.arg("-w")
		.arg(tmp.path().join("snippet.md"))
		.assert()
		.success();

	let content = std::fs::read_to_string(tmp.path().join("snippet.md"))?;
	assert_eq!(
		content,
		"---\nembed:\n  src: code.go\n  start: 'func main\\(\\) \\{'\n  end: '^\\}'\n  trim: true\n---\n\n```go\nfmt.Println(\"hello\")\n```\n"
			.to_string()
	);

	Ok(())
}

#[test]
fn keeps_non_utf8_bytes() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("latin.txt"), b"caf\xe9\n")?;
	std::fs::write(tmp.path().join("docs.md"), b"# Caf\xe9\n[embedmd]:# (latin.txt)\n")?;

	common::embedmd_cmd()
		.arg("-w")
		.arg(tmp.path().join("docs.md"))
		.assert()
		.success();

	assert_eq!(
		std::fs::read(tmp.path().join("docs.md"))?,
		b"# Caf\xe9\n[embedmd]:# (latin.txt)\n```txt\ncaf\xe9\n```\n".to_vec()
	);

	common::embedmd_cmd()
		.arg(tmp.path().join("docs.md"))
		.assert()
		.success()
		.stdout(&b"# Caf\xe9\n[embedmd]:# (latin.txt)\n```txt\ncaf\xe9\n```\n"[..]);

	Ok(())
}
