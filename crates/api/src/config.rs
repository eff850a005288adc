use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use salereg_core::lock::LockScope;

/// Where the lock actors persist their key sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockBackend {
    /// `imei_locks` table in the application database.
    Postgres,
    /// Process memory. Locks are lost on restart; development only.
    Memory,
}

impl FromStr for LockBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => anyhow::bail!("Unknown lock backend '{other}'. Must be one of: postgres, memory"),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on draining lock actors after the server stops (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Lock namespace partitioning (default: `global`).
    pub lock_scope: LockScope,
    /// Lock key set persistence (default: `postgres`).
    pub lock_backend: LockBackend,
    /// Bound on a single sale insert in milliseconds (default: `5000`).
    pub store_timeout_ms: u64,
    /// Mailbox size of each namespace actor (default: `256`).
    pub actor_mailbox_capacity: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                    |
    /// |--------------------------|----------------------------|
    /// | `HOST`                   | `0.0.0.0`                  |
    /// | `PORT`                   | `3000`                     |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`  | `30`                       |
    /// | `LOCK_SCOPE`             | `global`                   |
    /// | `LOCK_BACKEND`           | `postgres`                 |
    /// | `STORE_TIMEOUT_MS`       | `5000`                     |
    /// | `ACTOR_MAILBOX_CAPACITY` | `256`                      |
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env_or("HOST", "0.0.0.0");

        let port: u16 = env_or("PORT", "3000")
            .parse()
            .context("PORT must be a valid u16")?;

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .context("REQUEST_TIMEOUT_SECS must be a valid u64")?;

        let shutdown_timeout_secs: u64 = env_or("SHUTDOWN_TIMEOUT_SECS", "30")
            .parse()
            .context("SHUTDOWN_TIMEOUT_SECS must be a valid u64")?;

        let lock_scope: LockScope = env_or("LOCK_SCOPE", "global")
            .parse()
            .map_err(|e| anyhow::anyhow!("LOCK_SCOPE: {e}"))?;

        let lock_backend: LockBackend = env_or("LOCK_BACKEND", "postgres").parse()?;

        let store_timeout_ms: u64 = env_or("STORE_TIMEOUT_MS", "5000")
            .parse()
            .context("STORE_TIMEOUT_MS must be a valid u64")?;
        anyhow::ensure!(store_timeout_ms > 0, "STORE_TIMEOUT_MS must be greater than zero");

        let actor_mailbox_capacity: usize = env_or("ACTOR_MAILBOX_CAPACITY", "256")
            .parse()
            .context("ACTOR_MAILBOX_CAPACITY must be a valid usize")?;
        anyhow::ensure!(
            actor_mailbox_capacity > 0,
            "ACTOR_MAILBOX_CAPACITY must be greater than zero"
        );

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            lock_scope,
            lock_backend,
            store_timeout_ms,
            actor_mailbox_capacity,
        })
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
