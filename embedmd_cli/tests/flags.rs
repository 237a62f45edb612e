mod common;

use std::path::PathBuf;

use clap::Parser;
use embedmd_cli::EmbedCli;
use embedmd_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;

#[test]
fn parses_short_flags() -> AnyEmptyResult {
	let cli = EmbedCli::try_parse_from([
		"embedmd", "-w", "-v", "-m", "a=b", "-m", "c=d", "-c", "x.toml", "one.md", "two.md",
	])?;

	assert!(cli.write);
	assert!(!cli.diff);
	assert!(cli.verbose);
	assert_eq!(cli.mounts, vec!["a=b".to_string(), "c=d".to_string()]);
	assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
	assert_eq!(cli.paths, vec![PathBuf::from("one.md"), PathBuf::from("two.md")]);
	assert!(!cli.reads_stdin());

	Ok(())
}

#[test]
fn parses_long_flags() -> AnyEmptyResult {
	let cli = EmbedCli::try_parse_from([
		"embedmd",
		"--diff",
		"--mount",
		"a=b",
		"--timeout",
		"5",
		"--no-color",
	])?;

	assert!(cli.diff);
	assert!(cli.no_color);
	assert_eq!(cli.timeout, Some(5));
	assert!(cli.reads_stdin());

	Ok(())
}

#[test]
fn prints_version() {
	common::embedmd_cmd()
		.arg("--version")
		.assert()
		.success()
		.stdout(
			predicates::str::starts_with("embedmd")
				.and(predicates::str::contains(env!("CARGO_PKG_VERSION"))),
		);
}

#[test]
fn verbose_logging_goes_to_stderr() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path())?;

	common::embedmd_cmd()
		.arg("-v")
		.arg(tmp.path().join("docs.md"))
		.assert()
		.success()
		.stdout(common::expected_docs())
		.stderr(predicates::str::contains("embedding content"));

	Ok(())
}
