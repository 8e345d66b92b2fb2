//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;

use crate::domain::Destination;

/// Log output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable text lines.
    Text,
    /// One JSON object per line.
    Json,
}

/// Top-level relay configuration.
///
/// Loaded once at startup via [`ChatConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:8080`).
    pub listen_addr: SocketAddr,

    /// Shared topic that JOIN, CHAT and LEAVE events are broadcast on.
    pub shared_topic: Destination,

    /// Private sub-queue used for per-user delivery (under `/user`).
    pub private_queue: String,

    /// Capacity of each connection's outbound mailbox. A full mailbox
    /// drops further deliveries for that connection only.
    pub mailbox_capacity: usize,

    /// Timeout in seconds for REST requests.
    pub request_timeout_secs: u64,

    /// Log output format.
    pub log_format: LogFormat,
}

impl ChatConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set. Calls
    /// `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` cannot be parsed as a
    /// [`SocketAddr`], or if `SHARED_TOPIC` / `PRIVATE_QUEUE` are not valid
    /// destination paths.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()?;

        let shared_topic = Destination::parse(
            &std::env::var("SHARED_TOPIC").unwrap_or_else(|_| "/topic/public".to_string()),
        )?;
        let private_queue =
            std::env::var("PRIVATE_QUEUE").unwrap_or_else(|_| "/queue/messages".to_string());
        Destination::user_queue(&private_queue)?;

        let log_format = match std::env::var("LOG_FORMAT").ok().as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            listen_addr,
            shared_topic,
            private_queue,
            mailbox_capacity: parse_env("MAILBOX_CAPACITY", 256),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 10),
            log_format,
        })
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            shared_topic: Destination::from_static("/topic/public"),
            private_queue: "/queue/messages".to_string(),
            mailbox_capacity: 256,
            request_timeout_secs: 10,
            log_format: LogFormat::Text,
        }
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
