//! Per-URL fetch errors.
//!
//! A `FetchError` always belongs to exactly one URL; it is recorded in the
//! batch result and never aborts sibling downloads.

use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// DNS, connect, TLS, read or timeout failure.
    #[error("network error: {message}")]
    Network { message: String, timed_out: bool },

    /// The server answered with a non-2xx status.
    #[error("HTTP {0}")]
    HttpStatus(u32),

    /// The destination file could not be created, written or renamed.
    #[error("filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The worker (thread, task or process) died without reporting a result.
    #[error("worker crashed: {detail}")]
    WorkerCrash { detail: String },

    /// The worker could not be started at all.
    #[error("failed to start worker: {0}")]
    Spawn(#[source] io::Error),
}

/// Coarse error category, used in logs and the process-worker protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Network,
    Timeout,
    HttpStatus,
    Filesystem,
    WorkerCrash,
    Spawn,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FetchErrorKind::Network => "network",
            FetchErrorKind::Timeout => "timeout",
            FetchErrorKind::HttpStatus => "http",
            FetchErrorKind::Filesystem => "filesystem",
            FetchErrorKind::WorkerCrash => "crash",
            FetchErrorKind::Spawn => "spawn",
        };
        f.write_str(s)
    }
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Network { timed_out: true, .. } => FetchErrorKind::Timeout,
            FetchError::Network { .. } => FetchErrorKind::Network,
            FetchError::HttpStatus(_) => FetchErrorKind::HttpStatus,
            FetchError::Filesystem { .. } => FetchErrorKind::Filesystem,
            FetchError::WorkerCrash { .. } => FetchErrorKind::WorkerCrash,
            FetchError::Spawn(_) => FetchErrorKind::Spawn,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        FetchError::Network {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        FetchError::Network {
            message: message.into(),
            timed_out: true,
        }
    }

    pub fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FetchError::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub fn crash(detail: impl Into<String>) -> Self {
        FetchError::WorkerCrash {
            detail: detail.into(),
        }
    }
}

impl From<curl::Error> for FetchError {
    fn from(e: curl::Error) -> Self {
        if e.is_operation_timedout() {
            FetchError::timeout(e.to_string())
        } else {
            FetchError::network(e.to_string())
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return FetchError::HttpStatus(u32::from(status.as_u16()));
        }
        if e.is_timeout() {
            FetchError::timeout(e.to_string())
        } else {
            FetchError::network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_separates_timeouts() {
        assert_eq!(FetchError::timeout("slow").kind(), FetchErrorKind::Timeout);
        assert_eq!(FetchError::network("refused").kind(), FetchErrorKind::Network);
        assert_eq!(FetchError::HttpStatus(404).kind(), FetchErrorKind::HttpStatus);
    }

    #[test]
    fn display_includes_path_and_cause() {
        let e = FetchError::filesystem(
            "/nope/a.png",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let s = e.to_string();
        assert!(s.contains("/nope/a.png"), "{}", s);
        assert!(s.contains("denied"), "{}", s);
        assert_eq!(FetchError::HttpStatus(503).to_string(), "HTTP 503");
    }

    #[test]
    fn curl_timeout_maps_to_timeout_kind() {
        // CURLE_OPERATION_TIMEDOUT = 28, CURLE_COULDNT_CONNECT = 7
        assert_eq!(FetchError::from(curl::Error::new(28)).kind(), FetchErrorKind::Timeout);
        assert_eq!(FetchError::from(curl::Error::new(7)).kind(), FetchErrorKind::Network);
    }
}
