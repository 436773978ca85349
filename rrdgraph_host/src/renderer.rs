//! Renderer backed by the `rrdtool` executable

use rrdgraph_compiler::host::Renderer;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

/// Runs `rrdtool graph - <args...>` and returns the image from stdout
#[derive(Debug, Clone)]
pub struct RrdtoolRenderer {
    program: PathBuf,
    timeout: Duration,
}

impl Default for RrdtoolRenderer {
    fn default() -> Self {
        Self {
            program: PathBuf::from("rrdtool"),
            timeout: Duration::from_secs(30),
        }
    }
}

impl RrdtoolRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the renderer, with the program name dropped from `args`
    pub fn run(&self, args: &[String]) -> Result<Vec<u8>, RendererError> {
        let program = self.program.display().to_string();
        let start = Instant::now();

        let mut child = Command::new(&self.program)
            .arg("graph")
            .args(args.iter().skip(1))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RendererError::ProgramNotFound {
                        program: program.clone(),
                    }
                } else {
                    RendererError::ExecutionFailed {
                        program: program.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

        // Drain both pipes while waiting; an image larger than the pipe
        // buffer would otherwise block the child
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                kill(&mut child);
                return Err(RendererError::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                });
            }
            Err(e) => {
                kill(&mut child);
                return Err(RendererError::ExecutionFailed {
                    program,
                    reason: e.to_string(),
                });
            }
        };

        let read_failed = |e: io::Error| RendererError::ExecutionFailed {
            program: program.clone(),
            reason: format!("failed to read renderer output: {}", e),
        };
        let stdout = collect(stdout).map_err(read_failed)?;
        let stderr = collect(stderr).map_err(read_failed)?;
        let stderr = String::from_utf8_lossy(&stderr).trim().to_string();

        if !status.success() {
            return Err(RendererError::Failed {
                exit_code: status.code().unwrap_or(-1),
                stderr,
            });
        }

        rrdgraph_compiler::log_debug!("rrdtool finished",
            "bytes" => stdout.len(),
            "duration_ms" => start.elapsed().as_millis()
        );

        Ok(stdout)
    }
}

impl Renderer for RrdtoolRenderer {
    fn render(&self, args: &[String]) -> Result<Vec<u8>, String> {
        self.run(args).map_err(|e| e.to_string())
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<io::Result<Vec<u8>>>> {
    pipe.map(|pipe| thread::spawn(move || read_all(pipe)))
}

fn read_all<R: Read>(mut pipe: R) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    pipe.read_to_end(&mut buffer)?;
    Ok(buffer)
}

fn collect(handle: Option<JoinHandle<io::Result<Vec<u8>>>>) -> io::Result<Vec<u8>> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "pipe reader panicked"))?,
        None => Ok(Vec::new()),
    }
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Renderer process errors
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("Program not found: {program}")]
    ProgramNotFound { program: String },

    #[error("Execution failed for '{program}': {reason}")]
    ExecutionFailed { program: String, reason: String },

    #[error("Renderer timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Renderer exited with status {exit_code}: {stderr}")]
    Failed { exit_code: i32, stderr: String },
}
