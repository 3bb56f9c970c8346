//! `latexmk` compiler backend.
//!
//! Each request gets a fresh temp directory holding `main.tex`; latexmk runs
//! there on the blocking pool and the resulting `main.pdf` is returned
//! base64-encoded. Output goes to files instead of pipes so a chatty run can
//! never stall on a full pipe while we poll for the deadline.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::config::CompilerConfig;
use crate::preview::{CompileError, Compiler};

const SOURCE_NAME: &str = "main.tex";
const OUTPUT_NAME: &str = "main.pdf";
const STDOUT_NAME: &str = "latexmk.stdout";
const STDERR_NAME: &str = "latexmk.stderr";

const POLL_INTERVAL: Duration = Duration::from_millis(25);
/// Lines after `! message` searched for the `l.<n>` location line
const ERROR_CONTEXT_LINES: usize = 8;
/// Lines of raw output kept when no TeX error could be extracted
const TAIL_LINES: usize = 20;

#[derive(Debug, Clone)]
pub struct LatexmkCompiler {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl LatexmkCompiler {
    pub fn new(program: PathBuf, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program,
            args,
            timeout,
        }
    }

    /// Resolve the configured command on `PATH`.
    pub fn from_config(config: &CompilerConfig) -> Result<Self> {
        let program = which::which(&config.command)
            .with_context(|| format!("`{}` not found in PATH", config.command))?;
        crate::debug!("compile"; "using {}", program.display());

        Ok(Self::new(program, config.args.clone(), config.timeout()))
    }
}

#[async_trait]
impl Compiler for LatexmkCompiler {
    async fn compile(&self, source: &str) -> Result<String, CompileError> {
        let job = self.clone();
        let source = source.to_owned();

        tokio::task::spawn_blocking(move || job.run(&source))
            .await
            .map_err(|e| CompileError::new(format!("compile task failed: {e}")))?
    }
}

impl LatexmkCompiler {
    fn run(&self, source: &str) -> Result<String, CompileError> {
        let workdir = tempfile::Builder::new()
            .prefix("livetex-")
            .tempdir()
            .map_err(|e| io_error("create temp dir", e))?;
        let dir = workdir.path();

        std::fs::write(dir.join(SOURCE_NAME), source)
            .map_err(|e| io_error("write source", e))?;
        let stdout = File::create(dir.join(STDOUT_NAME)).map_err(|e| io_error("create log", e))?;
        let stderr = File::create(dir.join(STDERR_NAME)).map_err(|e| io_error("create log", e))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(SOURCE_NAME)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .spawn()
            .map_err(|e| io_error(&format!("run {}", self.program.display()), e))?;

        let status = wait_with_deadline(&mut child, self.timeout)?;
        if !status.success() {
            return Err(CompileError::new(failure_detail(dir)));
        }

        let pdf = std::fs::read(dir.join(OUTPUT_NAME))
            .map_err(|e| io_error("read produced PDF", e))?;
        crate::debug!("compile"; "produced {} bytes", pdf.len());

        Ok(STANDARD.encode(pdf))
    }
}

/// Wait for `child`, killing it once `timeout` has passed.
fn wait_with_deadline(child: &mut Child, timeout: Duration) -> Result<ExitStatus, CompileError> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CompileError::new(format!(
                    "timed out after {:.1}s",
                    timeout.as_secs_f32()
                )));
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => return Err(io_error("wait for compiler", e)),
        }
    }
}

fn io_error(action: &str, err: std::io::Error) -> CompileError {
    CompileError::new(format!("failed to {action}: {err}"))
}

/// Best description of a failed run: TeX errors, else stderr, else output tail.
fn failure_detail(dir: &Path) -> String {
    let stdout = std::fs::read(dir.join(STDOUT_NAME)).unwrap_or_default();
    let stdout = String::from_utf8_lossy(&stdout);
    if let Some(errors) = extract_tex_errors(&stdout) {
        return errors;
    }

    let stderr = std::fs::read(dir.join(STDERR_NAME)).unwrap_or_default();
    let stderr = String::from_utf8_lossy(&stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }

    let lines: Vec<&str> = stdout.lines().collect();
    let tail = lines[lines.len().saturating_sub(TAIL_LINES)..].join("\n");
    if tail.trim().is_empty() {
        "compiler exited with an error".to_string()
    } else {
        tail
    }
}

/// Collect `! message (l.N ...)` entries from TeX terminal output.
fn extract_tex_errors(log: &str) -> Option<String> {
    let lines: Vec<&str> = log.lines().collect();
    let mut errors = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let Some(message) = line.strip_prefix("! ") else {
            continue;
        };
        let location = lines[i + 1..]
            .iter()
            .take(ERROR_CONTEXT_LINES)
            .find(|l| l.starts_with("l."))
            .map(|l| l.trim_end());

        errors.push(match location {
            Some(location) => format!("{} ({})", message.trim_end(), location),
            None => message.trim_end().to_string(),
        });
    }

    (!errors.is_empty()).then(|| errors.join("\n"))
}
