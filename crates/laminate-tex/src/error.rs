//! Error types for checklist generation and compilation

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type for generation and compilation
pub type Result<T> = std::result::Result<T, ChecklistError>;

/// Upper bound on diagnostic text handed out for display
const MAX_DISPLAY_CHARS: usize = 4000;

/// Errors that can occur while turning a checklist into a PDF
#[derive(Error, Debug)]
pub enum ChecklistError {
    /// A phase or item lacks a structurally required field
    #[error("Malformed checklist: {location} is missing required field `{field}`")]
    MalformedChecklist {
        /// Human-readable position, e.g. "phase 2, item 1" (1-based)
        location: String,
        /// Name of the missing field
        field: &'static str,
    },

    /// The compiler binary cannot be located or executed
    #[error("Toolchain unavailable: `{program}` {reason}")]
    ToolchainUnavailable {
        /// Program name or path that was looked up
        program: String,
        /// What went wrong while locating or starting it
        reason: String,
    },

    /// The compiler ran but did not produce a usable artifact
    #[error("Compilation failed: {failure}")]
    CompilationFailed {
        /// Which part of the protocol failed
        failure: CompileFailure,
        /// Output captured from the compiler passes
        diagnostics: Diagnostics,
    },

    /// Writing into the scratch directory failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChecklistError {
    /// True for errors caused by the submitted checklist itself
    pub fn is_client_error(&self) -> bool {
        matches!(self, ChecklistError::MalformedChecklist { .. })
    }

    /// True for errors caused by the environment rather than the content
    pub fn is_infrastructure_error(&self) -> bool {
        matches!(
            self,
            ChecklistError::ToolchainUnavailable { .. } | ChecklistError::Io(_)
        )
    }

    /// Captured compiler output, if this error carries any
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            ChecklistError::CompilationFailed { diagnostics, .. } => Some(diagnostics),
            _ => None,
        }
    }
}

/// The way a compilation attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileFailure {
    /// A pass exited with a non-zero status (`None` when killed by a signal)
    ExitStatus { pass: u8, code: Option<i32> },
    /// A pass exceeded its wall-clock limit and was killed
    TimedOut { pass: u8, limit: Duration },
    /// Both passes succeeded but the artifact is not where it should be
    MissingArtifact { path: PathBuf },
}

impl fmt::Display for CompileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileFailure::ExitStatus {
                pass,
                code: Some(code),
            } => write!(f, "pass {} exited with status {}", pass, code),
            CompileFailure::ExitStatus { pass, code: None } => {
                write!(f, "pass {} was terminated by a signal", pass)
            }
            CompileFailure::TimedOut { pass, limit } => {
                write!(f, "pass {} timed out after {}s", pass, limit.as_secs_f64())
            }
            CompileFailure::MissingArtifact { path } => {
                write!(f, "artifact not produced at {}", path.display())
            }
        }
    }
}

/// Captured output of the compiler passes
///
/// The text comes from an external process fed with user content, so it is
/// not safe to display as-is. Use [`Diagnostics::sanitized`] for that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Standard output of every pass that ran, in order
    pub stdout: String,
    /// Standard error of every pass that ran, in order
    pub stderr: String,
}

impl Diagnostics {
    /// Create diagnostics from captured streams
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Check if nothing was captured
    pub fn is_empty(&self) -> bool {
        self.stdout.trim().is_empty() && self.stderr.trim().is_empty()
    }

    /// Append the output of one pass
    pub(crate) fn append(&mut self, pass: u8, stdout: &[u8], stderr: &[u8]) {
        for (buffer, bytes) in [(&mut self.stdout, stdout), (&mut self.stderr, stderr)] {
            if bytes.is_empty() {
                continue;
            }
            buffer.push_str(&format!("--- pass {} ---\n", pass));
            buffer.push_str(&String::from_utf8_lossy(bytes));
            if !buffer.ends_with('\n') {
                buffer.push('\n');
            }
        }
    }

    /// LaTeX error lines (those starting with `!`), in order of appearance,
    /// with control characters removed
    pub fn error_lines(&self) -> Vec<String> {
        self.stdout
            .lines()
            .chain(self.stderr.lines())
            .filter(|line| line.starts_with('!'))
            .map(strip_controls)
            .collect()
    }

    /// Display-safe rendition: control characters other than newline and tab
    /// are dropped and only the tail is kept, since TeX reports the fatal
    /// error last
    pub fn sanitized(&self) -> String {
        let combined = if self.stderr.trim().is_empty() {
            self.stdout.clone()
        } else {
            format!("{}{}", self.stdout, self.stderr)
        };

        let cleaned = strip_controls(&combined);

        let count = cleaned.chars().count();
        if count <= MAX_DISPLAY_CHARS {
            return cleaned;
        }
        let tail: String = cleaned.chars().skip(count - MAX_DISPLAY_CHARS).collect();
        format!("[... {} characters omitted ...]\n{}", count - MAX_DISPLAY_CHARS, tail)
    }
}

fn strip_controls(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}
