//! Compiled external tool invocation.

use clipforge_core::ArtifactRef;
use std::fmt;
use std::path::PathBuf;

/// Which external tool a command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalTool {
    /// General-purpose media transcoder (ffmpeg).
    Transcoder,
    /// Face anonymization tool (deface).
    FaceAnonymizer,
}

impl fmt::Display for ExternalTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternalTool::Transcoder => f.write_str("transcoder"),
            ExternalTool::FaceAnonymizer => f.write_str("face_anonymizer"),
        }
    }
}

/// A fully specified invocation: program, argument vector and the output it writes.
///
/// Arguments are passed to the child process as-is; no shell ever interprets them.
/// A command is built for exactly one execution.
#[derive(Debug)]
pub struct CompiledCommand {
    pub tool: ExternalTool,
    pub program: String,
    pub args: Vec<String>,
    pub output: ArtifactRef,
    pub output_path: PathBuf,
}

impl CompiledCommand {
    /// Shell-quoted rendering for logs and dry runs.
    pub fn display_line(&self) -> String {
        shell_words::join(std::iter::once(&self.program).chain(self.args.iter()))
    }

    /// Index of the first occurrence of `arg`.
    pub fn position(&self, arg: &str) -> Option<usize> {
        self.args.iter().position(|a| a == arg)
    }

    pub fn contains(&self, arg: &str) -> bool {
        self.position(arg).is_some()
    }

    /// Value following the first occurrence of `flag`.
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.position(flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}
