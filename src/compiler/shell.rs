use std::path::Path;
use std::process::Command;

use log::debug;

use crate::compiler::{CompileOutput, Compiler};
use crate::errors::CompileError;

/// Compiler driven by a shell command template.
///
/// The command is run through `sh -c` with two extra arguments: the output
/// directory flag and an `\input` directive naming the fragment. They are
/// passed as positional parameters, so paths never need shell quoting.
#[derive(Debug, Clone)]
pub struct ShellCompiler {
    command: String,
}

impl ShellCompiler {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    // @returns: Arguments appended to the template
    pub fn extra_arguments(fragment: &Path, output_dir: &Path) -> [String; 2] {
        [
            format!("-output-directory={}", output_dir.display()),
            format!("\\input{{{}}}", fragment.display()),
        ]
    }
}

impl Compiler for ShellCompiler {
    fn compile(&self, fragment: &Path, output_dir: &Path) -> Result<CompileOutput, CompileError> {
        let script = format!("{} \"$@\"", self.command);
        let [output_flag, input_directive] = Self::extra_arguments(fragment, output_dir);
        debug!("Running: {} {} '{}'", self.command, output_flag, input_directive);

        let output = Command::new("sh")
            .arg("-c")
            .arg(&script)
            .arg("sh")
            .arg(&output_flag)
            .arg(&input_directive)
            .output()
            .map_err(|source| CompileError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CompileOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            output: text,
        })
    }
}
