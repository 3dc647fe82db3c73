//! Process worker protocol.
//!
//! A worker downloads a single URL and prints one JSON [`WorkerReport`] as
//! the last line of its stdout:
//!
//! - exit 0 with a `done` report
//! - exit 2 with a `network`, `http_status` or `filesystem` report
//!
//! Anything else (other exit codes, death by signal, a report that does not
//! parse or does not match the exit code) is a crash. Logs go to stderr.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::fetcher::{fetch_blocking, Download, FetchResult};
use crate::storage::Destination;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FETCH_FAILED: i32 = 2;

/// What a worker tells its parent about its one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum WorkerReport {
    Done {
        path: PathBuf,
        bytes: u64,
        elapsed_ms: u64,
    },
    Network {
        message: String,
        timed_out: bool,
    },
    HttpStatus {
        code: u32,
    },
    Filesystem {
        path: PathBuf,
        /// `io::ErrorKind` name, e.g. `PermissionDenied`.
        io_kind: String,
        message: String,
    },
}

impl WorkerReport {
    pub fn from_result(result: &FetchResult) -> Self {
        match result {
            Ok(d) => WorkerReport::Done {
                path: d.path.clone(),
                bytes: d.bytes,
                elapsed_ms: u64::try_from(d.elapsed.as_millis()).unwrap_or(u64::MAX),
            },
            Err(FetchError::Network { message, timed_out }) => WorkerReport::Network {
                message: message.clone(),
                timed_out: *timed_out,
            },
            Err(FetchError::HttpStatus(code)) => WorkerReport::HttpStatus { code: *code },
            Err(FetchError::Filesystem { path, source }) => WorkerReport::Filesystem {
                path: path.clone(),
                io_kind: format!("{:?}", source.kind()),
                message: source.to_string(),
            },
            // fetch_blocking never yields these; keep the text at least.
            Err(e @ (FetchError::WorkerCrash { .. } | FetchError::Spawn(_))) => {
                WorkerReport::Network {
                    message: e.to_string(),
                    timed_out: false,
                }
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, WorkerReport::Done { .. })
    }

    /// Converts back into the URL's result.
    pub fn into_result(self, url: &str) -> FetchResult {
        match self {
            WorkerReport::Done {
                path,
                bytes,
                elapsed_ms,
            } => Ok(Download {
                url: url.to_string(),
                path,
                bytes,
                elapsed: Duration::from_millis(elapsed_ms),
            }),
            WorkerReport::Network { message, timed_out } => {
                Err(FetchError::Network { message, timed_out })
            }
            WorkerReport::HttpStatus { code } => Err(FetchError::HttpStatus(code)),
            WorkerReport::Filesystem {
                path,
                io_kind,
                message,
            } => Err(FetchError::filesystem(
                path,
                io::Error::new(io_kind_from_name(&io_kind), message),
            )),
        }
    }

    /// Single-line JSON.
    pub fn to_line(&self) -> String {
        // Fails only for non-UTF-8 paths.
        serde_json::to_string(self).unwrap_or_else(|e| {
            let fallback = WorkerReport::Network {
                message: format!("unencodable worker report: {}", e),
                timed_out: false,
            };
            serde_json::to_string(&fallback).unwrap_or_default()
        })
    }

    /// Parses the last non-empty line of `stdout`.
    pub fn parse(stdout: &[u8]) -> Option<Self> {
        let line = last_line(stdout)?;
        serde_json::from_str(&line).ok()
    }
}

fn io_kind_from_name(name: &str) -> io::ErrorKind {
    use io::ErrorKind::*;
    match name {
        "NotFound" => NotFound,
        "PermissionDenied" => PermissionDenied,
        "AlreadyExists" => AlreadyExists,
        "InvalidInput" => InvalidInput,
        "InvalidData" => InvalidData,
        "WriteZero" => WriteZero,
        "Interrupted" => Interrupted,
        "UnexpectedEof" => UnexpectedEof,
        "OutOfMemory" => OutOfMemory,
        "Unsupported" => Unsupported,
        _ => Other,
    }
}

/// Runs the worker side: fetch into `dest_dir`, print the report on stdout,
/// return the exit code.
pub fn run_worker(url: &str, dest_dir: &Path, cfg: &FetchConfig) -> i32 {
    let result = Destination::existing(dest_dir).and_then(|dest| fetch_blocking(url, &dest, cfg));
    if let Err(e) = &result {
        tracing::warn!("worker fetch of {} failed: {}", url, e);
    }
    let report = WorkerReport::from_result(&result);
    println!("{}", report.to_line());
    if report.is_success() {
        EXIT_OK
    } else {
        EXIT_FETCH_FAILED
    }
}

fn last_line(bytes: &[u8]) -> Option<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

/// Turns a finished worker's exit status and output into the URL's result.
pub fn decode(url: &str, status: &ExitStatus, stdout: &[u8], stderr: &[u8]) -> FetchResult {
    let report = WorkerReport::parse(stdout);
    let expected_success = match status.code() {
        Some(EXIT_OK) => true,
        Some(EXIT_FETCH_FAILED) => false,
        _ => {
            let stderr_tail = last_line(stderr).unwrap_or_default();
            let detail = if stderr_tail.is_empty() {
                status.to_string()
            } else {
                format!("{}: {}", status, stderr_tail)
            };
            return Err(FetchError::crash(detail));
        }
    };
    match report {
        Some(report) if report.is_success() == expected_success => report.into_result(url),
        Some(report) => Err(FetchError::crash(format!(
            "worker report {:?} does not match {}",
            report, status
        ))),
        None => Err(FetchError::crash(format!("{} without a worker report", status))),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::FetchErrorKind;
    use std::os::unix::process::ExitStatusExt;

    fn exited(code: i32) -> ExitStatus {
        ExitStatus::from_raw(code << 8)
    }

    fn failed_with(error: FetchError) -> FetchError {
        let line = WorkerReport::from_result(&Err(error)).to_line();
        let stdout = format!("{}\n", line);
        decode("https://x/a.png", &exited(2), stdout.as_bytes(), b"").unwrap_err()
    }

    #[test]
    fn success_report_roundtrip() {
        let d = Download {
            url: "https://x/a.png".into(),
            path: PathBuf::from("/images/a.png"),
            bytes: 1234,
            elapsed: Duration::from_millis(56),
        };
        let out = format!("{}\n", WorkerReport::from_result(&Ok(d)).to_line());
        let decoded = decode("https://x/a.png", &exited(0), out.as_bytes(), b"").unwrap();
        assert_eq!(decoded.url, "https://x/a.png");
        assert_eq!(decoded.bytes, 1234);
        assert_eq!(decoded.elapsed, Duration::from_millis(56));
        assert_eq!(decoded.path, PathBuf::from("/images/a.png"));
    }

    #[test]
    fn http_failure_keeps_status() {
        assert!(matches!(
            failed_with(FetchError::HttpStatus(404)),
            FetchError::HttpStatus(404)
        ));
    }

    #[test]
    fn timeout_kind_survives() {
        let e = failed_with(FetchError::timeout("took too long"));
        assert_eq!(e.kind(), FetchErrorKind::Timeout);
    }

    #[test]
    fn filesystem_failure_keeps_path_and_io_kind() {
        let e = failed_with(FetchError::filesystem(
            "/ro/a.png.123-0.part",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied\nread-only mount"),
        ));
        match e {
            FetchError::Filesystem { path, source } => {
                assert_eq!(path, PathBuf::from("/ro/a.png.123-0.part"));
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
                assert_eq!(source.to_string(), "denied\nread-only mount");
            }
            other => panic!("expected filesystem error, got {:?}", other),
        }
    }

    #[test]
    fn missing_destination_is_filesystem_failure() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let code = run_worker("http://127.0.0.1:1/a.png", &missing, &FetchConfig::default());
        assert_eq!(code, EXIT_FETCH_FAILED);
        assert!(!missing.exists());
    }

    #[test]
    fn report_must_match_exit_code() {
        let line = WorkerReport::HttpStatus { code: 500 }.to_line();
        let e = decode("https://x/a.png", &exited(0), line.as_bytes(), b"").unwrap_err();
        assert_eq!(e.kind(), FetchErrorKind::WorkerCrash);
    }

    #[test]
    fn unexpected_exit_is_crash() {
        let e = decode("https://x/a.png", &exited(101), b"", b"thread 'main' panicked").unwrap_err();
        match e {
            FetchError::WorkerCrash { detail } => assert!(detail.contains("panicked"), "{}", detail),
            other => panic!("expected crash, got {:?}", other),
        }
    }

    #[test]
    fn killed_by_signal_is_crash() {
        let e = decode("https://x/a.png", &ExitStatus::from_raw(9), b"", b"").unwrap_err();
        assert_eq!(e.kind(), FetchErrorKind::WorkerCrash);
    }

    #[test]
    fn garbage_output_is_crash() {
        let e = decode("https://x/a.png", &exited(0), b"hello\n", b"").unwrap_err();
        assert_eq!(e.kind(), FetchErrorKind::WorkerCrash);
        let e = decode("https://x/a.png", &exited(2), b"", b"error http 404").unwrap_err();
        assert_eq!(e.kind(), FetchErrorKind::WorkerCrash);
    }
}
