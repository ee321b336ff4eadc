use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connecting,
    Connected {
        last_update: DateTime<Local>,
    },
    Disconnected {
        failures: u32,
        retry_in: Duration,
        reason: String,
    },
}

impl ConnectionStatus {
    pub fn connected_now() -> ConnectionStatus {
        ConnectionStatus::Connected { last_update: Local::now() }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected { .. })
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Connecting => write!(f, "connecting..."),
            ConnectionStatus::Connected { last_update } => {
                write!(f, "connected, updated {}", last_update.format("%H:%M:%S"))
            }
            ConnectionStatus::Disconnected { failures, retry_in, reason } => {
                write!(f, "disconnected ({reason}), attempt {failures}, retrying in {}ms", retry_in.as_millis())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disconnected_text_names_reason_and_retry() {
        let status = ConnectionStatus::Disconnected {
            failures: 3,
            retry_in: Duration::from_millis(2000),
            reason: "request timed out".to_string(),
        };
        let text = status.to_string();
        assert!(text.starts_with("disconnected"));
        assert!(text.contains("request timed out"));
        assert!(text.contains("2000ms"));
        assert!(!status.is_connected());
    }

    #[test]
    fn connected_now_is_connected() {
        assert!(ConnectionStatus::connected_now().is_connected());
        assert!(!ConnectionStatus::Connecting.is_connected());
    }
}
