//! The external formatter boundary.
//!
//! `clang-format` is invoked as a pure function: the candidate style goes
//! in through `--style={...}` (inline flow YAML), the source goes in
//! through stdin, and the reformatted text comes back on stdout. Input
//! files are never touched and no `.clang-format` file is ever written
//! during the search.

use std::fmt;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::string::FromUtf8Error;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::{StyleConfig, KEY_DELIMITER};

const DEFAULT_PROGRAM: &str = "clang-format";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Error type for a single formatter invocation. Recovered locally by the
/// cost evaluator as a sentinel maximal cost; one bad (config, file) pair
/// never aborts a run.
#[derive(Debug)]
pub enum FormatterError {
    /// The formatter executable could not be started
    Spawn(io::Error),
    /// Reading from or writing to the formatter process failed
    Io(io::Error),
    /// The formatter did not finish within the configured timeout
    Timeout(Duration),
    /// The formatter exited with a non-zero status
    Exit { code: Option<i32>, stderr: String },
    /// The formatter produced non-UTF-8 output
    Utf8(FromUtf8Error),
}

impl fmt::Display for FormatterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatterError::Spawn(e) => write!(f, "failed to start formatter: {e}"),
            FormatterError::Io(e) => write!(f, "formatter io error: {e}"),
            FormatterError::Timeout(limit) => {
                write!(f, "formatter timed out after {}s", limit.as_secs_f64())
            }
            FormatterError::Exit { code, stderr } => match code {
                Some(code) => write!(f, "formatter exited with status {code}: {}", stderr.trim()),
                None => write!(f, "formatter killed by signal: {}", stderr.trim()),
            },
            FormatterError::Utf8(e) => write!(f, "formatter produced invalid UTF-8: {e}"),
        }
    }
}

impl std::error::Error for FormatterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormatterError::Spawn(e) | FormatterError::Io(e) => Some(e),
            FormatterError::Utf8(e) => Some(e),
            _ => None,
        }
    }
}

/// The single external dependency of the search: an opaque
/// `format(text, config) -> text` function. `Sync` because cost
/// evaluations fan out across worker threads.
pub trait Formatter: Sync {
    /// Reformat `source` under `config`. `path` is only a language hint
    /// (`--assume-filename`); the file itself is never read or written.
    fn format(&self, path: &Path, source: &str, config: &StyleConfig)
        -> Result<String, FormatterError>;
}

/// Render a total configuration as the inline flow-YAML form accepted by
/// `clang-format --style='{...}'`, rebuilding nested sections from the
/// flattened keys.
pub fn inline_style(config: &StyleConfig) -> String {
    let mut parts: Vec<String> = vec![];
    let mut sections: Vec<(String, usize)> = vec![];

    for (key, value) in config.iter() {
        match key.split_once(KEY_DELIMITER) {
            None => parts.push(format!("{key}: {value}")),
            Some((section, sub_key)) => {
                match sections.iter().find(|(name, _)| name == section) {
                    Some(&(_, index)) => {
                        let inner = parts[index]
                            .trim_end_matches('}')
                            .trim_end()
                            .to_string();
                        parts[index] = format!("{inner}, {sub_key}: {value}}}");
                    }
                    None => {
                        sections.push((section.to_string(), parts.len()));
                        parts.push(format!("{section}: {{{sub_key}: {value}}}"));
                    }
                }
            }
        }
    }
    format!("{{{}}}", parts.join(", "))
}

/// Subprocess-backed clang-format invocation.
pub struct ClangFormat {
    program: PathBuf,
    timeout: Duration,
}

impl Default for ClangFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl ClangFormat {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// First line of `clang-format --version`, used to warn when the
    /// catalog (extracted from the version 13 docs) may not match the
    /// installed formatter.
    pub fn version(&self) -> Result<String, FormatterError> {
        let output = self.run(&["--version".to_string()], "")?;
        Ok(output.lines().next().unwrap_or_default().to_string())
    }

    fn run(&self, args: &[String], stdin_text: &str) -> Result<String, FormatterError> {
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(FormatterError::Spawn)?;

        // Writer and readers run on their own threads so a large file can
        // not deadlock on a full pipe while the child is blocked writing.
        let writer = child.stdin.take().map(|mut stdin| {
            let text = stdin_text.to_string();
            thread::spawn(move || stdin.write_all(text.as_bytes()))
        });
        let stdout_reader = child.stdout.take().map(|mut stdout| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                stdout.read_to_end(&mut buf).map(|_| buf)
            })
        });
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                stderr.read_to_end(&mut buf).map(|_| buf)
            })
        });

        let status = self.wait_with_deadline(&mut child)?;

        if let Some(handle) = writer {
            // a broken pipe here just means the child exited early
            let _ = handle.join();
        }
        let stdout = join_reader(stdout_reader)?;
        let stderr = join_reader(stderr_reader)?;

        if !status.success() {
            return Err(FormatterError::Exit {
                code: status.code(),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
            });
        }
        String::from_utf8(stdout).map_err(FormatterError::Utf8)
    }

    fn wait_with_deadline(&self, child: &mut Child) -> Result<std::process::ExitStatus, FormatterError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait().map_err(FormatterError::Io)? {
                Some(status) => return Ok(status),
                None => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(FormatterError::Timeout(self.timeout));
                    }
                    thread::sleep(WAIT_POLL_INTERVAL);
                }
            }
        }
    }
}

fn join_reader(
    handle: Option<thread::JoinHandle<io::Result<Vec<u8>>>>,
) -> Result<Vec<u8>, FormatterError> {
    match handle {
        Some(handle) => match handle.join() {
            Ok(result) => result.map_err(FormatterError::Io),
            Err(_) => Err(FormatterError::Io(io::Error::other("reader thread panicked"))),
        },
        None => Ok(Vec::new()),
    }
}

impl Formatter for ClangFormat {
    fn format(
        &self,
        path: &Path,
        source: &str,
        config: &StyleConfig,
    ) -> Result<String, FormatterError> {
        let args = vec![
            format!("--style={}", inline_style(config)),
            format!("--assume-filename={}", path.display()),
        ];
        self.run(&args, source)
    }
}
