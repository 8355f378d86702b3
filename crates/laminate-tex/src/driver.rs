//! External compiler driver
//!
//! Writes a [`MarkupDocument`] into a scratch directory, runs the LaTeX
//! compiler over it twice and hands back the path of the produced PDF.
//!
//! The scratch directory belongs to the caller: it must be empty, used by
//! this compilation only, and removed by the caller afterwards (a
//! `tempfile::TempDir` does all three). Two compilations sharing a directory
//! overwrite each other's intermediate files.
//!
//! Exactly [`Toolchain::PASSES`] passes run, whatever the document contains.
//! The second pass lets LaTeX pick up layout information written by the
//! first. Documents needing a third pass are not supported.
//!
//! # Example
//!
//! ```no_run
//! use laminate_tex::{generate, Toolchain};
//!
//! let markup = generate("CHECKLIST", "(demo)", &[])?;
//! let work_dir = std::env::temp_dir().join("laminate-demo");
//! std::fs::create_dir_all(&work_dir)?;
//! let pdf = Toolchain::new().compile(&markup, &work_dir)?;
//! println!("PDF at {}", pdf.display());
//! # Ok::<(), laminate_tex::ChecklistError>(())
//! ```

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{ChecklistError, CompileFailure, Diagnostics, Result};
use crate::markup::MarkupDocument;

/// Compiler used when none is configured
pub const DEFAULT_PROGRAM: &str = "xelatex";

/// Wall-clock limit for a single pass
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Name of the source file written into the scratch directory
pub const SOURCE_FILE: &str = "checklist.tex";

/// Name of the artifact the compiler derives from [`SOURCE_FILE`]
pub const ARTIFACT_FILE: &str = "checklist.pdf";

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How long to keep reading output once the compiler has exited or been killed
const OUTPUT_GRACE: Duration = Duration::from_millis(500);

/// What `--version` reported about the compiler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainInfo {
    /// Resolved path of the binary
    pub path: PathBuf,
    /// First line of the version output
    pub version: String,
}

/// An external LaTeX compiler and its invocation contract
#[derive(Debug, Clone)]
pub struct Toolchain {
    program: PathBuf,
    timeout: Duration,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Toolchain {
    /// Number of compiler passes per compilation
    pub const PASSES: u8 = 2;

    /// Use `xelatex` from `PATH`
    pub fn new() -> Self {
        Self::with_program(DEFAULT_PROGRAM)
    }

    /// Use a specific compiler, either a bare name looked up in `PATH` or a
    /// path to the binary
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the per-pass timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The configured program
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The per-pass timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Locate the compiler binary
    pub fn resolve(&self) -> Result<PathBuf> {
        which::which(&self.program).map_err(|e| self.unavailable(format!("cannot be located: {}", e)))
    }

    /// Check that the compiler can be started, without compiling anything
    ///
    /// Runs `<program> --version`. Any failure is reported as
    /// [`ChecklistError::ToolchainUnavailable`].
    pub fn probe(&self) -> Result<ToolchainInfo> {
        let path = self.resolve()?;

        let mut command = Command::new(&path);
        command.arg("--version");
        let child = spawn_captured(&mut command)
            .map_err(|e| self.unavailable(format!("cannot be executed: {}", e)))?;
        let captured = wait_captured(child, self.timeout)?;

        let status = match captured.status {
            Some(status) => status,
            None => {
                return Err(self.unavailable(format!(
                    "did not answer --version within {}s",
                    self.timeout.as_secs_f64()
                )))
            }
        };
        let stdout = String::from_utf8_lossy(&captured.stdout);
        if !status.success() {
            let stderr = String::from_utf8_lossy(&captured.stderr);
            return Err(self.unavailable(format!(
                "--version exited with {}: {}",
                status,
                stderr.trim()
            )));
        }

        let version = stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_string();
        tracing::debug!(path = %path.display(), version = %version, "toolchain probed");
        Ok(ToolchainInfo { path, version })
    }

    /// Compile `markup` inside `work_dir` and return the artifact path
    pub fn compile(&self, markup: &MarkupDocument, work_dir: &Path) -> Result<PathBuf> {
        let binary = self.resolve()?;
        let work_dir = work_dir.canonicalize()?;

        let source = work_dir.join(SOURCE_FILE);
        fs::write(&source, markup.as_bytes())?;
        tracing::debug!(source = %source.display(), bytes = markup.len(), "wrote markup");

        let mut diagnostics = Diagnostics::default();
        for pass in 1..=Self::PASSES {
            self.run_pass(&binary, pass, &work_dir, &source, &mut diagnostics)?;
        }

        let artifact = work_dir.join(ARTIFACT_FILE);
        if !artifact.is_file() {
            tracing::warn!(artifact = %artifact.display(), "compiler succeeded without producing an artifact");
            return Err(ChecklistError::CompilationFailed {
                failure: CompileFailure::MissingArtifact { path: artifact },
                diagnostics,
            });
        }

        tracing::debug!(artifact = %artifact.display(), "compilation finished");
        Ok(artifact)
    }

    fn run_pass(
        &self,
        binary: &Path,
        pass: u8,
        work_dir: &Path,
        source: &Path,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        tracing::debug!(pass, program = %binary.display(), "running compiler pass");

        // nonstopmode plus a closed stdin: a malformed document must fail,
        // never sit at TeX's interactive error prompt
        let mut command = Command::new(binary);
        command
            .arg("-interaction=nonstopmode")
            .arg("-output-directory")
            .arg(work_dir)
            .arg(source)
            .current_dir(work_dir);

        let started = Instant::now();
        let child = spawn_captured(&mut command)
            .map_err(|e| self.unavailable(format!("cannot be executed: {}", e)))?;
        let captured = wait_captured(child, self.timeout)?;
        diagnostics.append(pass, &captured.stdout, &captured.stderr);

        let failure = match captured.status {
            None => CompileFailure::TimedOut {
                pass,
                limit: self.timeout,
            },
            Some(status) if !status.success() => CompileFailure::ExitStatus {
                pass,
                code: status.code(),
            },
            Some(_) => {
                tracing::debug!(pass, elapsed_ms = started.elapsed().as_millis() as u64, "pass succeeded");
                return Ok(());
            }
        };

        tracing::warn!(%failure, "compiler pass failed");
        Err(ChecklistError::CompilationFailed {
            failure,
            diagnostics: diagnostics.clone(),
        })
    }

    fn unavailable(&self, reason: String) -> ChecklistError {
        tracing::warn!(program = %self.program.display(), %reason, "toolchain unavailable");
        ChecklistError::ToolchainUnavailable {
            program: self.program.display().to_string(),
            reason,
        }
    }
}

/// Output of a finished or killed child process
struct Captured {
    /// `None` when the process was killed at the timeout
    status: Option<ExitStatus>,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

fn spawn_captured(command: &mut Command) -> io::Result<Child> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
}

/// Wait for `child`, killing it once `timeout` has elapsed
///
/// Both pipes are drained on their own threads so a chatty compiler cannot
/// block on a full pipe while we wait for it to exit. A grandchild that
/// inherited the pipes can keep them open after the child is gone, so output
/// is collected for at most [`OUTPUT_GRACE`] past the exit or the deadline.
fn wait_captured(mut child: Child, timeout: Duration) -> io::Result<Captured> {
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break Some(status);
        }
        if Instant::now() >= deadline {
            // The process may exit between the check and the kill
            let _ = child.kill();
            child.wait()?;
            break None;
        }
        thread::sleep(POLL_INTERVAL);
    };

    let cutoff = Instant::now() + OUTPUT_GRACE;
    Ok(Captured {
        status,
        stdout: collect(stdout, cutoff),
        stderr: collect(stderr, cutoff),
    })
}

/// Output read so far, plus a signal sent once the pipe reaches EOF
struct Drain {
    buffer: Arc<Mutex<Vec<u8>>>,
    done: mpsc::Receiver<()>,
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> Drain {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let (tx, done) = mpsc::channel();
    let shared = Arc::clone(&buffer);
    thread::spawn(move || {
        let mut chunk = [0u8; 8192];
        loop {
            match reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => match shared.lock() {
                    Ok(mut buffer) => buffer.extend_from_slice(&chunk[..n]),
                    Err(_) => break,
                },
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        let _ = tx.send(());
    });
    Drain { buffer, done }
}

/// Take whatever `drain` has read, waiting for EOF until `cutoff`
fn collect(drain: Option<Drain>, cutoff: Instant) -> Vec<u8> {
    let Some(drain) = drain else {
        return Vec::new();
    };
    let remaining = cutoff.saturating_duration_since(Instant::now());
    if drain.done.recv_timeout(remaining).is_err() {
        tracing::warn!("compiler output still open after exit, keeping what was read");
    }
    let bytes = match drain.buffer.lock() {
        Ok(buffer) => buffer.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let toolchain = Toolchain::new();
        assert_eq!(toolchain.program(), Path::new("xelatex"));
        assert_eq!(toolchain.timeout(), Duration::from_secs(60));
        assert_eq!(Toolchain::PASSES, 2);
    }

    #[test]
    fn test_with_timeout() {
        let toolchain = Toolchain::with_program("lualatex").with_timeout(Duration::from_secs(5));
        assert_eq!(toolchain.program(), Path::new("lualatex"));
        assert_eq!(toolchain.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_resolve_missing_program() {
        let toolchain = Toolchain::with_program("laminate-no-such-compiler");
        let err = toolchain.resolve().unwrap_err();
        assert!(matches!(err, ChecklistError::ToolchainUnavailable { .. }));
        assert!(err.to_string().contains("laminate-no-such-compiler"));
    }

    #[test]
    fn test_probe_missing_program() {
        let toolchain = Toolchain::with_program("/nonexistent/dir/xelatex");
        assert!(matches!(
            toolchain.probe(),
            Err(ChecklistError::ToolchainUnavailable { .. })
        ));
    }
}
