//! Process-per-URL strategy.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::events::{BatchEvent, EventSink};
use crate::fetcher::FetchResult;
use crate::runner::task_outcome;
use crate::storage::Destination;

use super::{worker, Strategy};

/// How to start one worker process. The worker receives
/// `<args> --dest <dir> [--connect-timeout S] [--timeout S] [--user-agent UA] <url>`
/// and must speak the protocol in [`worker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl WorkerCommand {
    /// `program worker ...`
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: vec![OsString::from("worker")],
        }
    }

    /// Re-invokes the running executable as a worker.
    pub fn current_exe() -> io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?))
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub(crate) fn command(&self, url: &str, dest: &Destination, cfg: &FetchConfig) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("--dest")
            .arg(dest.path());
        if let Some(t) = cfg.connect_timeout_secs {
            cmd.arg("--connect-timeout").arg(t.to_string());
        }
        if let Some(t) = cfg.timeout_secs {
            cmd.arg("--timeout").arg(t.to_string());
        }
        if let Some(ua) = cfg.user_agent.as_deref() {
            cmd.arg("--user-agent").arg(ua);
        }
        cmd.arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

/// Spawns every worker first, then waits for each one in order. Every exit
/// status is inspected: a worker that crashed, was killed or printed garbage
/// is recorded as `WorkerCrash` for its URL.
pub(super) fn run(
    urls: &[String],
    dest: &Destination,
    cfg: &FetchConfig,
    worker_cmd: Option<&WorkerCommand>,
    events: &EventSink,
) -> Vec<FetchResult> {
    let worker_cmd = match worker_cmd {
        Some(w) => w.clone(),
        None => match WorkerCommand::current_exe() {
            Ok(w) => w,
            Err(e) => {
                tracing::warn!("cannot locate worker executable: {}", e);
                return urls
                    .iter()
                    .map(|_| Err(FetchError::Spawn(io::Error::new(e.kind(), e.to_string()))))
                    .collect();
            }
        },
    };

    let children: Vec<Result<Child, FetchError>> = urls
        .iter()
        .enumerate()
        .map(|(index, url)| -> Result<Child, FetchError> {
            events.emit(BatchEvent::TaskStarted {
                strategy: Strategy::Processes,
                index,
            });
            let child = worker_cmd
                .command(url, dest, cfg)
                .spawn()
                .map_err(FetchError::Spawn)?;
            tracing::debug!(pid = child.id(), %url, "worker started");
            Ok(child)
        })
        .collect();

    children
        .into_iter()
        .zip(urls)
        .enumerate()
        .map(|(index, (child, url))| {
            let result = child.and_then(|child| wait_for(child, url));
            events.emit(BatchEvent::TaskFinished {
                strategy: Strategy::Processes,
                index,
                outcome: task_outcome(&result),
            });
            result
        })
        .collect()
}

fn wait_for(child: Child, url: &str) -> FetchResult {
    let output = child
        .wait_with_output()
        .map_err(|e| FetchError::crash(format!("wait failed: {}", e)))?;
    worker::decode(url, &output.status, &output.stdout, &output.stderr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_carries_config() {
        let dir = tempfile::tempdir().unwrap();
        let dest = Destination::existing(dir.path()).unwrap();
        let cfg = FetchConfig {
            connect_timeout_secs: Some(7),
            timeout_secs: Some(9),
            user_agent: Some("ua/1".into()),
            ..FetchConfig::default()
        };
        let cmd = WorkerCommand::new("/usr/bin/fetchbench").command("https://x/a.png", &dest, &cfg);
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args[0], "worker");
        assert_eq!(args[1], "--dest");
        assert_eq!(args[2], dir.path().to_string_lossy());
        assert!(args.windows(2).any(|w| w == ["--connect-timeout", "7"]));
        assert!(args.windows(2).any(|w| w == ["--timeout", "9"]));
        assert!(args.windows(2).any(|w| w == ["--user-agent", "ua/1"]));
        assert_eq!(args.last().map(String::as_str), Some("https://x/a.png"));

        let plain = WorkerCommand::new("/usr/bin/fetchbench").command(
            "https://x/a.png",
            &dest,
            &FetchConfig::default(),
        );
        assert!(!plain.get_args().any(|a| a == "--connect-timeout" || a == "--timeout"));
    }

    #[test]
    fn missing_program_is_spawn_error_per_url() {
        let dir = tempfile::tempdir().unwrap();
        let dest = Destination::existing(dir.path()).unwrap();
        let worker = WorkerCommand::new(dir.path().join("no-such-binary"));
        let urls = vec!["https://x/a.png".to_string(), "https://x/b.png".to_string()];
        let (tx, rx) = std::sync::mpsc::channel();
        let results = run(&urls, &dest, &FetchConfig::default(), Some(&worker), &EventSink::new(tx));
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| matches!(r, Err(FetchError::Spawn(_)))));

        // Every finished task was announced first, even though none started.
        let mut started = Vec::new();
        for event in rx.try_iter() {
            match event {
                BatchEvent::TaskStarted { index, .. } => started.push(index),
                BatchEvent::TaskFinished { index, .. } => {
                    assert!(started.contains(&index), "task {} finished before starting", index)
                }
                _ => {}
            }
        }
        assert_eq!(started, vec![0, 1]);
    }

    #[cfg(unix)]
    #[test]
    fn crashing_worker_is_recorded_not_hung() {
        let dir = tempfile::tempdir().unwrap();
        let dest = Destination::existing(dir.path()).unwrap();
        // `sh -c 'kill -9 $$' <rest...>`: every worker dies from a signal.
        let worker = WorkerCommand::new("/bin/sh").with_args(["-c", "kill -9 $$"]);
        let urls = vec!["https://x/a.png".to_string()];
        let results = run(&urls, &dest, &FetchConfig::default(), Some(&worker), &EventSink::none());
        assert!(matches!(results[0], Err(FetchError::WorkerCrash { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn fake_worker_success_is_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let dest = Destination::existing(dir.path()).unwrap();
        let path = dir.path().join("a.png");
        let report = worker::WorkerReport::Done {
            path: path.clone(),
            bytes: 42,
            elapsed_ms: 10,
        };
        let script = format!("echo '{}'", report.to_line());
        let worker = WorkerCommand::new("/bin/sh").with_args(["-c", script.as_str()]);
        let urls = vec!["https://x/a.png".to_string()];
        let results = run(&urls, &dest, &FetchConfig::default(), Some(&worker), &EventSink::none());
        let d = results[0].as_ref().unwrap();
        assert_eq!(d.bytes, 42);
        assert_eq!(d.path, path);
    }
}
