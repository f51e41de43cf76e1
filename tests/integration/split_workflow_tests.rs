/*!
 * End-to-end tests of the split workflow through the controller
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use latex_autosplit::compiler::MockCompiler;
use latex_autosplit::{AppError, Controller};
use crate::common::{self, BOOK_CHAPTERS, BOOK_POSTAMBLE, BOOK_PREAMBLE};

const MAIN_FILE: &str = "\\documentclass{book}
\\usepackage{amsmath}
\\begin{document}
\\input{chapters/intro}
\\input{chapters/method}
\\input{chapters/results}
%autosplit start region postamble
\\appendix
\\chapter{Extra material}
More things.
\\bibliography{refs}
%autosplit end region
\\end{document}
";

/// Write the sample book as a main file with one included file per chapter
fn write_book(dir: &Path) -> Result<PathBuf> {
    common::create_test_file(dir, "chapters/intro.tex", BOOK_CHAPTERS[0])?;
    common::create_test_file(dir, "chapters/method.tex", BOOK_CHAPTERS[1])?;
    common::create_test_file(dir, "chapters/results.tex", BOOK_CHAPTERS[2])?;
    common::create_test_file(dir, "book.tex", MAIN_FILE)
}

fn compiling_controller(output_dir: &Path) -> Result<Controller, AppError> {
    common::init_test_logging();
    let mut config = common::test_config(output_dir);
    config.compile.enabled = true;
    Controller::with_config(config)
}

/// Test that the first run writes and compiles every fragment
#[test]
fn test_run_withFreshOutput_shouldWriteAndCompileAll() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = write_book(temp_dir.path())?;
    let output_dir = temp_dir.path().join("tmp");

    let compiler = MockCompiler::succeeding();
    let report = compiling_controller(&output_dir)?.run(&input, &compiler)?;

    let expected: Vec<PathBuf> = (0..3).map(|i| output_dir.join(format!("boundary-{}.tex", i))).collect();
    assert_eq!(report.written, expected);
    assert!(report.unchanged.is_empty());
    assert!(report.compile_failures.is_empty());
    assert!(report.removed.is_empty());
    assert!(report.flattened_changed);
    assert!(report.any_changed());
    assert_eq!(compiler.calls(), expected);

    for (i, chapter) in BOOK_CHAPTERS.iter().enumerate() {
        let content = fs::read_to_string(&expected[i])?;
        // The newline after each \input line follows the inlined chapter
        assert_eq!(content, format!("{}{}\n{}\\end{{document}}\n", BOOK_PREAMBLE, chapter, BOOK_POSTAMBLE));
    }

    let flattened = fs::read_to_string(output_dir.join("flattened.tex"))?;
    assert!(flattened.contains("\\chapter{Method}"));
    assert!(!flattened.contains("\\input"));
    Ok(())
}

/// Test that a second run over the same input changes nothing
#[test]
fn test_run_twice_shouldNotRewriteOrRecompile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = write_book(temp_dir.path())?;
    let output_dir = temp_dir.path().join("tmp");
    let controller = compiling_controller(&output_dir)?;
    let compiler = MockCompiler::succeeding();

    controller.run(&input, &compiler)?;
    let second = controller.run(&input, &compiler)?;

    assert!(second.written.is_empty());
    assert_eq!(second.unchanged.len(), 3);
    assert!(!second.flattened_changed);
    assert!(!second.any_changed());
    assert_eq!(compiler.call_count(), 3);
    Ok(())
}

/// Test that editing one chapter rewrites only its fragment
#[test]
fn test_run_afterEditingOneChapter_shouldRewriteOnlyThatFragment() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = write_book(temp_dir.path())?;
    let output_dir = temp_dir.path().join("tmp");
    let controller = compiling_controller(&output_dir)?;
    let compiler = MockCompiler::succeeding();

    controller.run(&input, &compiler)?;
    common::create_test_file(temp_dir.path(), "chapters/method.tex", "\\chapter{Method}\nWe do other things.\n")?;
    let report = controller.run(&input, &compiler)?;

    assert_eq!(report.written, vec![output_dir.join("boundary-1.tex")]);
    assert_eq!(report.unchanged, vec![output_dir.join("boundary-0.tex"), output_dir.join("boundary-2.tex")]);
    assert!(report.flattened_changed);
    assert_eq!(compiler.call_count(), 4);
    assert_eq!(compiler.calls().last(), Some(&output_dir.join("boundary-1.tex")));
    Ok(())
}

/// Test that fragments which no longer exist are removed
#[test]
fn test_run_afterRemovingChapter_shouldRemoveStaleFragment() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = write_book(temp_dir.path())?;
    let output_dir = temp_dir.path().join("tmp");
    let controller = compiling_controller(&output_dir)?;
    let compiler = MockCompiler::succeeding();

    controller.run(&input, &compiler)?;
    common::create_test_file(temp_dir.path(), "book.tex", &MAIN_FILE.replace("\\input{chapters/results}\n", ""))?;
    let report = controller.run(&input, &compiler)?;

    assert!(report.written.is_empty());
    assert_eq!(report.removed, vec![output_dir.join("boundary-2.tex")]);
    assert!(report.any_changed());
    assert_eq!(common::file_names(&output_dir)?, vec!["boundary-0.tex", "boundary-1.tex", "flattened.tex"]);
    Ok(())
}

/// Test that an empty boundary list leaves the document unfragmented
#[test]
fn test_run_withoutBoundaryMarkers_shouldWriteNoBoundaryFragments() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = write_book(temp_dir.path())?;
    let output_dir = temp_dir.path().join("tmp");

    Controller::with_config(common::test_config(&output_dir))?.run(&input, &MockCompiler::succeeding())?;

    let mut config = common::test_config(&output_dir);
    config.split.boundaries.clear();
    let report = Controller::with_config(config)?.run(&input, &MockCompiler::succeeding())?;

    assert_eq!(report.fragment_count(), 0);
    assert_eq!(
        report.removed,
        (0..3).map(|i| output_dir.join(format!("boundary-{}.tex", i))).collect::<Vec<_>>()
    );
    assert_eq!(common::file_names(&output_dir)?, vec!["flattened.tex"]);
    Ok(())
}

/// Test that both splitters run over the same flattened document
#[test]
fn test_run_withTalk_shouldWriteBoundaryAndEnvironmentFragments() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "talk.tex", common::TALK_DOCUMENT)?;
    let output_dir = temp_dir.path().join("tmp");

    let controller = Controller::with_config(common::test_config(&output_dir))?;
    let compiler = MockCompiler::succeeding();
    let report = controller.run(&input, &compiler)?;

    assert_eq!(
        common::file_names(&output_dir)?,
        vec!["boundary-0.tex", "environment-0.tex", "environment-1.tex", "flattened.tex"]
    );
    assert_eq!(report.fragment_count(), 3);
    assert_eq!(compiler.call_count(), 0);

    let environment = fs::read_to_string(output_dir.join("environment-0.tex"))?;
    assert!(environment.contains("First."));
    assert!(!environment.contains("Second."));
    Ok(())
}

/// Test that compile failures are reported without aborting the run
#[test]
fn test_run_withFailingCompiler_shouldRecordFailures() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = write_book(temp_dir.path())?;
    let output_dir = temp_dir.path().join("tmp");

    let compiler = MockCompiler::failing();
    let report = compiling_controller(&output_dir)?.run(&input, &compiler)?;

    assert_eq!(report.written.len(), 3);
    assert_eq!(report.compile_failures, report.written);
    assert_eq!(compiler.call_count(), 3);
    Ok(())
}

/// Test that only the failing calls of an intermittent compiler are recorded
#[test]
fn test_run_withIntermittentCompiler_shouldRecordEverySecondFragment() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = write_book(temp_dir.path())?;
    let output_dir = temp_dir.path().join("tmp");

    let compiler = MockCompiler::intermittent(2);
    let report = compiling_controller(&output_dir)?.run(&input, &compiler)?;

    assert_eq!(report.compile_failures, vec![output_dir.join("boundary-1.tex")]);
    Ok(())
}

/// Test that a compiler that cannot start counts as a failure
#[test]
fn test_run_withUnstartableCompiler_shouldContainError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = write_book(temp_dir.path())?;
    let output_dir = temp_dir.path().join("tmp");

    let compiler = MockCompiler::unstartable();
    let report = compiling_controller(&output_dir)?.run(&input, &compiler)?;

    assert_eq!(report.written.len(), 3);
    assert_eq!(report.compile_failures.len(), 3);
    Ok(())
}

/// Test that inclusion cycles abort the run
#[test]
fn test_run_withCircularInclude_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "main.tex", "\\begin{document}\n\\input{main}\n\\end{document}\n")?;

    let controller = Controller::with_config(common::test_config(&temp_dir.path().join("tmp")))?;
    let result = controller.run(&input, &MockCompiler::succeeding());
    assert!(matches!(result, Err(AppError::Resolve(_))));
    Ok(())
}

/// Test that a missing input produces no fragments
#[test]
fn test_run_withMissingInput_shouldWriteOnlyFlattenedCopy() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().join("tmp");

    let controller = Controller::with_config(common::test_config(&output_dir))?;
    let report = controller.run(&temp_dir.path().join("missing.tex"), &MockCompiler::succeeding())?;

    assert_eq!(report.fragment_count(), 0);
    assert!(!report.any_changed());
    assert_eq!(common::file_names(&output_dir)?, vec!["flattened.tex"]);
    Ok(())
}

/// Test that invalid configurations are rejected up front
#[test]
fn test_with_config_withInvalidConfig_shouldFail() {
    let mut config = latex_autosplit::Config::default();
    config.markers.document_begin = String::new();
    assert!(matches!(Controller::with_config(config), Err(AppError::Config(_))));

    assert!(Controller::new_for_test().is_ok());
}
