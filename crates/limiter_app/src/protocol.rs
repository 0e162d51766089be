//! JSON control protocol.
//!
//! The settings editor drives the monitor with small JSON messages tagged by
//! an `action` field; every message gets exactly one JSON reply. Unknown or
//! malformed messages are answered with a failure acknowledgement rather
//! than dropped, so the editor never hangs waiting.

use limiter_core::Settings;
use serde::{Deserialize, Serialize};

/// Wire shape of the settings, decoupled from [`Settings`] so the core
/// stays free of serde and the wire names can stay camelCase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDto {
    pub enabled: bool,
    pub max_retained: u32,
    pub poll_interval_ms: u64,
}

impl From<Settings> for SettingsDto {
    fn from(settings: Settings) -> Self {
        Self {
            enabled: settings.enabled,
            max_retained: settings.max_retained,
            poll_interval_ms: settings.poll_interval_ms,
        }
    }
}

impl From<SettingsDto> for Settings {
    fn from(dto: SettingsDto) -> Self {
        Self {
            enabled: dto.enabled,
            max_retained: dto.max_retained,
            poll_interval_ms: dto.poll_interval_ms,
        }
    }
}

/// Inbound control message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    /// Replace the settings and restart monitoring under them.
    UpdateSettings { settings: SettingsDto },
    /// Ask for the current best-effort message count.
    GetCurrentCount,
}

impl Request {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Outbound reply, one per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Ack { success: bool },
    Count { count: usize },
}

impl Reply {
    pub fn to_json(self) -> String {
        match serde_json::to_string(&self) {
            Ok(json) => json,
            // Unreachable for these shapes; answer something parseable anyway.
            Err(_) => r#"{"success":false}"#.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_an_update_settings_message() {
        let raw = r#"{
            "action": "updateSettings",
            "settings": {"enabled": true, "maxRetained": 150, "pollIntervalMs": 2000}
        }"#;

        let request = Request::parse(raw).expect("valid message");
        assert_eq!(
            request,
            Request::UpdateSettings {
                settings: SettingsDto {
                    enabled: true,
                    max_retained: 150,
                    poll_interval_ms: 2_000,
                },
            }
        );
    }

    #[test]
    fn parses_a_count_query() {
        let request = Request::parse(r#"{"action": "getCurrentCount"}"#).expect("valid message");
        assert_eq!(request, Request::GetCurrentCount);
    }

    #[test]
    fn rejects_unknown_actions_and_malformed_json() {
        assert!(Request::parse(r#"{"action": "selfDestruct"}"#).is_err());
        assert!(Request::parse("not json").is_err());
        assert!(Request::parse(r#"{"action": "updateSettings"}"#).is_err());
    }

    #[test]
    fn replies_serialize_to_the_wire_shapes() {
        assert_eq!(Reply::Ack { success: true }.to_json(), r#"{"success":true}"#);
        assert_eq!(Reply::Ack { success: false }.to_json(), r#"{"success":false}"#);
        assert_eq!(Reply::Count { count: 42 }.to_json(), r#"{"count":42}"#);
    }

    #[test]
    fn settings_round_trip_through_the_dto() {
        let settings = Settings {
            enabled: true,
            max_retained: 75,
            poll_interval_ms: 900,
        };
        assert_eq!(Settings::from(SettingsDto::from(settings)), settings);
    }
}
