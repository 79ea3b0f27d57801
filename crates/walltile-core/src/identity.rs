//! Process identity, captured once from the environment.

use crate::error::{Error, Result};
use std::ffi::OsString;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

pub const RANK_VAR: &str = "RANK";
pub const DISPLAY_VAR: &str = "DISPLAY";
pub const HOSTNAME_TIMEOUT_VAR: &str = "WALLTILE_HOSTNAME_TIMEOUT_MS";

pub const DEFAULT_HOSTNAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Launcher value meaning "no rank assigned".
const UNSET_RANK: i64 = -1;

/// Who this process is, as far as the configuration document is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessIdentity {
    /// `None` selects the hostname + display lookup.
    pub rank: Option<u32>,
    pub hostname: String,
    pub display: String,
}

/// Values supplied explicitly (e.g. on the command line) that take precedence over the
/// environment. Anything set here is never read from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityOverrides {
    /// Raw rank, interpreted like `RANK`.
    pub rank: Option<String>,
    pub hostname: Option<String>,
    pub display: Option<String>,
}

impl ProcessIdentity {
    pub fn new(rank: Option<u32>, hostname: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            rank,
            hostname: hostname.into(),
            display: display.into(),
        }
    }

    pub fn with_rank(rank: u32) -> Self {
        Self {
            rank: Some(rank),
            ..Default::default()
        }
    }

    pub fn with_host(hostname: impl Into<String>, display: impl Into<String>) -> Self {
        Self::new(None, hostname, display)
    }

    /// Reads `RANK`, `DISPLAY` and, when no rank is set, the local hostname.
    ///
    /// The hostname lookup is bounded by `WALLTILE_HOSTNAME_TIMEOUT_MS` (default 5s).
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(&IdentityOverrides::default())
    }

    /// Like [`ProcessIdentity::from_env`], with `overrides` taking precedence.
    pub fn from_env_with(overrides: &IdentityOverrides) -> Result<Self> {
        capture(
            overrides,
            |name| std::env::var(name).ok(),
            || local_hostname(hostname_timeout(std::env::var(HOSTNAME_TIMEOUT_VAR).ok())),
        )
    }
}

/// Builds an identity from `overrides`, falling back to `var` for unset values.
///
/// `lookup_hostname` only runs on the hostname path: a process with a rank never needs it.
pub fn capture(
    overrides: &IdentityOverrides,
    var: impl Fn(&str) -> Option<String>,
    lookup_hostname: impl FnOnce() -> String,
) -> Result<ProcessIdentity> {
    let rank = match overrides.rank.as_deref() {
        Some(raw) => parse_rank(Some(raw))?,
        None => parse_rank(var(RANK_VAR).as_deref())?,
    };
    let display = match &overrides.display {
        Some(display) => display.clone(),
        None => var(DISPLAY_VAR).unwrap_or_default(),
    };
    let hostname = match (&overrides.hostname, rank) {
        (Some(hostname), _) => hostname.clone(),
        (None, Some(_)) => String::new(),
        (None, None) => lookup_hostname(),
    };
    Ok(ProcessIdentity {
        rank,
        hostname,
        display,
    })
}

/// Interprets a raw `RANK` value.
///
/// Unset, empty and `-1` (the launcher's sentinel) mean "no rank"; any other value must be a
/// non-negative integer.
pub fn parse_rank(raw: Option<&str>) -> Result<Option<u32>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let invalid = || Error::InvalidRank {
        value: raw.to_string(),
    };
    let value = raw.parse::<i64>().map_err(|_| invalid())?;
    if value == UNSET_RANK {
        return Ok(None);
    }
    u32::try_from(value).map(Some).map_err(|_| invalid())
}

fn hostname_timeout(raw: Option<String>) -> Duration {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_HOSTNAME_TIMEOUT)
}

/// Resolves the local hostname, giving up after `timeout`.
///
/// Failures are not fatal: the empty hostname never matches an entry, so a process that
/// needs it ends up with an unresolved identity instead.
pub fn local_hostname(timeout: Duration) -> String {
    hostname_within(hostname::get, timeout)
}

/// Runs `lookup` on a helper thread and waits at most `timeout` for it.
pub fn hostname_within<F>(lookup: F, timeout: Duration) -> String
where
    F: FnOnce() -> std::io::Result<OsString> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let spawned = std::thread::Builder::new()
        .name("walltile-hostname".to_string())
        .spawn(move || {
            let _ = tx.send(lookup());
        });
    if let Err(err) = spawned {
        tracing::warn!("I can't determine my hostname: {err}");
        return String::new();
    }

    match rx.recv_timeout(timeout) {
        Ok(Ok(name)) => name.to_string_lossy().into_owned(),
        Ok(Err(err)) => {
            tracing::warn!("I can't determine my hostname: {err}");
            String::new()
        }
        Err(RecvTimeoutError::Timeout) => {
            tracing::warn!(
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                "hostname lookup timed out"
            );
            String::new()
        }
        Err(RecvTimeoutError::Disconnected) => {
            tracing::warn!("hostname lookup ended without a result");
            String::new()
        }
    }
}
