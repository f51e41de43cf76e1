/*!
 * Tests for the command line interface
 */

use anyhow::Result;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use crate::common;

/// Test that exit codes report whether anything changed
#[test]
fn test_cli_runTwice_shouldExitChangedThenUnchanged() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "book.tex", &common::book_document())?;
    let output_dir = temp_dir.path().join("out");

    cargo_bin_cmd!("latex-autosplit")
        .arg("-o")
        .arg(&output_dir)
        .arg(&input)
        .assert()
        .code(0);
    assert!(output_dir.join("boundary-2.tex").exists());

    cargo_bin_cmd!("latex-autosplit")
        .arg("-o")
        .arg(&output_dir)
        .arg(&input)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Nothing changed"));
    Ok(())
}

/// Test the boundary and environment options
#[test]
fn test_cli_withSplitOptions_shouldOverrideDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "talk.tex", common::TALK_DOCUMENT)?;
    let output_dir = temp_dir.path().join("out");

    cargo_bin_cmd!("latex-autosplit")
        .args(["-b", "\\section", "-e", "frame,block", "-o"])
        .arg(&output_dir)
        .arg(&input)
        .assert()
        .success();

    assert_eq!(
        common::file_names(&output_dir)?,
        vec!["boundary-0.tex", "boundary-1.tex", "environment-0.tex", "environment-1.tex", "flattened.tex"]
    );
    Ok(())
}

/// Test that the debug flag prints the resolved options
#[test]
fn test_cli_withDebug_shouldPrintOptions() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "book.tex", &common::book_document())?;

    cargo_bin_cmd!("latex-autosplit")
        .arg("--debug")
        .arg("-o")
        .arg(temp_dir.path().join("out"))
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("Options:").and(predicate::str::contains("\"boundaries\"")));
    Ok(())
}

/// Test compiling with a shell command
#[cfg(unix)]
#[test]
fn test_cli_withAutocompile_shouldRunCommand() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "book.tex", &common::book_document())?;

    cargo_bin_cmd!("latex-autosplit")
        .args(["-a", "--raw-output", "-c", "echo compiled"])
        .arg("-o")
        .arg(temp_dir.path().join("out"))
        .arg(&input)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("compiled -output-directory="));
    Ok(())
}

/// Test that compile failures do not fail the run
#[cfg(unix)]
#[test]
fn test_cli_withFailingCompiler_shouldStillReportChanges() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "book.tex", &common::book_document())?;

    cargo_bin_cmd!("latex-autosplit")
        .args(["-a", "-c", "false"])
        .arg("-o")
        .arg(temp_dir.path().join("out"))
        .arg(&input)
        .assert()
        .code(0)
        .stderr(predicate::str::contains("failed to compile"));
    Ok(())
}

/// Test that a configuration file is honored
#[test]
fn test_cli_withConfigFile_shouldUseIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "book.tex", &common::book_document())?;
    let output_dir = temp_dir.path().join("from-config");
    let config = common::create_test_file(
        temp_dir.path(),
        "autosplit.json",
        &format!("{{ \"output_dir\": {:?}, \"split\": {{ \"environments\": [] }} }}", output_dir.display().to_string()),
    )?;

    cargo_bin_cmd!("latex-autosplit")
        .arg("--config")
        .arg(&config)
        .arg(&input)
        .assert()
        .success();

    assert!(output_dir.join("boundary-0.tex").exists());
    Ok(())
}

/// Test that invalid options are errors
#[test]
fn test_cli_withInvalidOptions_shouldExitWithError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "book.tex", &common::book_document())?;

    cargo_bin_cmd!("latex-autosplit")
        .args(["-b", " ", "-o"])
        .arg(temp_dir.path().join("out"))
        .arg(&input)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration validation failed"));

    cargo_bin_cmd!("latex-autosplit").assert().code(1);
    Ok(())
}

/// Test shell completion generation
#[test]
fn test_cli_completions_shouldPrintScript() {
    cargo_bin_cmd!("latex-autosplit")
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("latex-autosplit"));
}
