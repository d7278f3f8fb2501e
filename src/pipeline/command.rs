use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Command as ProcessCommand, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};

use crate::error::ScaffoldError;

/// Runs external programs on behalf of the pipeline.
pub trait CommandRunner {
    /// Run `argv` to completion with `cwd` as its working directory.
    ///
    /// A non-zero exit must surface as [`ScaffoldError::ExternalToolFailure`].
    fn run(&self, cwd: &Utf8Path, argv: &[String]) -> Result<()>;
}

/// Spawns real child processes, relaying their output line by line.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    log: Option<RunLog>,
}

impl ProcessRunner {
    pub fn new(log_file: Option<Utf8PathBuf>) -> Self {
        Self {
            log: log_file.map(RunLog::new),
        }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, cwd: &Utf8Path, argv: &[String]) -> Result<()> {
        if argv.is_empty() {
            bail!("invalid command: empty argv");
        }
        let render = format_command(argv);
        println!("  -> {}", render);

        let start = Instant::now();
        let captured = run_streaming(cwd, argv)?;
        tracing::debug!(command = %render, elapsed = ?start.elapsed(), status = %captured.status, "command finished");

        if let Some(log) = &self.log {
            log.record(&render, &captured);
        }

        if captured.status.success() {
            println!("     [ok]");
            Ok(())
        } else {
            Err(ScaffoldError::ExternalToolFailure {
                command: render,
                code: captured.status.code(),
            }
            .into())
        }
    }
}

struct Captured {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

fn run_streaming(cwd: &Utf8Path, argv: &[String]) -> Result<Captured> {
    let mut command = ProcessCommand::new(&argv[0]);
    command
        .args(&argv[1..])
        .current_dir(cwd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command
        .spawn()
        .with_context(|| format!("executing `{}`", format_command(argv)))?;

    let stdout = child.stdout.take().map(|pipe| relay(pipe, "stdout"));
    let stderr = child.stderr.take().map(|pipe| relay(pipe, "stderr"));

    let status = child
        .wait()
        .with_context(|| format!("waiting on `{}`", format_command(argv)))?;

    Ok(Captured {
        status,
        stdout: stdout.map(collect).unwrap_or_default(),
        stderr: stderr.map(collect).unwrap_or_default(),
    })
}

type Relay = (thread::JoinHandle<()>, Arc<Mutex<String>>);

fn relay(pipe: impl Read + Send + 'static, label: &'static str) -> Relay {
    let buffer = Arc::new(Mutex::new(String::new()));
    let sink = Arc::clone(&buffer);
    let handle = thread::spawn(move || {
        for line in BufReader::new(pipe).lines().map_while(|line| line.ok()) {
            println!("     {} | {}", label, line);
            if let Ok(mut sink) = sink.lock() {
                sink.push_str(&line);
                sink.push('\n');
            }
        }
    });
    (handle, buffer)
}

fn collect((handle, buffer): Relay) -> String {
    let _ = handle.join();
    let text = buffer.lock().map(|text| text.clone()).unwrap_or_default();
    text
}

/// Appends one record per executed command to a log file.
#[derive(Debug, Clone)]
pub struct RunLog {
    path: Utf8PathBuf,
}

impl RunLog {
    pub fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }

    fn record(&self, command: &str, captured: &Captured) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let status = if captured.status.success() { "ok" } else { "error" };
        let mut content = format!(
            "\n== command: {} ==\ntime: {}\nstatus: {}\n",
            command, timestamp, status
        );
        if !captured.stdout.is_empty() {
            content.push_str(&format!("stdout:\n{}", captured.stdout));
        }
        if !captured.stderr.is_empty() {
            content.push_str(&format!("stderr:\n{}", captured.stderr));
        }

        let appended = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(content.as_bytes()));
        if let Err(err) = appended {
            tracing::warn!(path = %self.path, error = %err, "could not append to run log");
        }
    }
}

pub fn format_command(argv: &[String]) -> String {
    argv.iter()
        .map(|arg| {
            if arg.chars().any(|c| c.is_whitespace()) {
                let escaped = arg.replace('"', "\\\"");
                format!("\"{}\"", escaped)
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
pub mod fake {
    use std::cell::RefCell;

    use super::*;

    /// Records invocations instead of spawning processes.
    #[derive(Default)]
    pub struct RecordingRunner {
        pub calls: RefCell<Vec<(Utf8PathBuf, Vec<String>)>>,
        /// Zero-based invocation index that exits non-zero.
        pub fail_at: Option<usize>,
        /// Write a minimal `package.json` when `init` runs, as npm would.
        pub write_manifest: bool,
    }

    impl RecordingRunner {
        pub fn with_manifest() -> Self {
            Self {
                write_manifest: true,
                ..Self::default()
            }
        }

        pub fn argvs(&self) -> Vec<Vec<String>> {
            self.calls.borrow().iter().map(|(_, argv)| argv.clone()).collect()
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, cwd: &Utf8Path, argv: &[String]) -> Result<()> {
            let index = self.calls.borrow().len();
            self.calls.borrow_mut().push((cwd.to_owned(), argv.to_vec()));

            if self.fail_at == Some(index) {
                return Err(ScaffoldError::ExternalToolFailure {
                    command: format_command(argv),
                    code: Some(1),
                }
                .into());
            }

            if self.write_manifest && argv.get(1).map(String::as_str) == Some("init") {
                let name = cwd.file_name().unwrap_or("project");
                let manifest = serde_json::json!({
                    "name": name,
                    "version": "1.0.0",
                    "main": "index.js",
                    "scripts": { "test": "echo \"Error: no test specified\" && exit 1" },
                    "license": "ISC",
                });
                let text = serde_json::to_string_pretty(&manifest)?;
                std::fs::write(cwd.join("package.json"), text)?;
            }
            Ok(())
        }
    }
}
