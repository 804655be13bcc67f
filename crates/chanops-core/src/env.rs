use crate::status::ChannelStatus;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const ENV_PREFIX: &str = "REPAYMENT_";
pub const ENV_SUFFIX: &str = "_DISABLED";

/// One name/value pair from the workload's container environment.
/// Names of the form `REPAYMENT_<channel>_DISABLED` are channel entries;
/// everything else is opaque and passes through reconciliation untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvEntry {
    pub name: String,
    pub value: String,
}

impl EnvEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// The entry that pins `channel` to `status`.
    pub fn for_channel(channel: &str, status: ChannelStatus) -> Self {
        Self {
            name: channel_env_name(channel),
            value: status.as_str().to_string(),
        }
    }
}

pub fn channel_env_name(channel: &str) -> String {
    format!("{ENV_PREFIX}{channel}{ENV_SUFFIX}")
}

/// Extract the channel identifier from an env name, or `None` for opaque
/// entries. Fixed prefix/suffix match, not a pattern: channel names may
/// themselves contain underscores.
pub fn parse_channel_name(name: &str) -> Option<&str> {
    let channel = name.strip_prefix(ENV_PREFIX)?.strip_suffix(ENV_SUFFIX)?;
    if channel.is_empty() {
        None
    } else {
        Some(channel)
    }
}

/// Baseline status for `channel` as derived from the live environment:
/// the channel's entry value when present and recognized, otherwise open.
pub fn seed_baseline(channel: &str, live: &[EnvEntry]) -> ChannelStatus {
    let name = channel_env_name(channel);
    live.iter()
        .find(|e| e.name == name)
        .and_then(|e| ChannelStatus::from_str(&e.value).ok())
        .unwrap_or(ChannelStatus::Open)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_channel_names() {
        assert_eq!(parse_channel_name("REPAYMENT_ALIPAY_DISABLED"), Some("ALIPAY"));
        assert_eq!(
            parse_channel_name("REPAYMENT_WX_PAY_DISABLED"),
            Some("WX_PAY")
        );
        assert_eq!(parse_channel_name("REPAYMENT__DISABLED"), None);
        assert_eq!(parse_channel_name("UNRELATED"), None);
        assert_eq!(parse_channel_name("REPAYMENT_X"), None);
        assert_eq!(parse_channel_name("X_DISABLED"), None);
    }

    #[test]
    fn env_name_roundtrip() {
        let name = channel_env_name("BANK_OF_TEST");
        assert_eq!(name, "REPAYMENT_BANK_OF_TEST_DISABLED");
        assert_eq!(parse_channel_name(&name), Some("BANK_OF_TEST"));
    }

    #[test]
    fn seeds_from_recognized_value() {
        let live = vec![
            EnvEntry::new("REPAYMENT_A_DISABLED", "CONSUME"),
            EnvEntry::new("UNRELATED", "x"),
        ];
        assert_eq!(seed_baseline("A", &live), ChannelStatus::ConsumeClosed);
    }

    #[test]
    fn seeds_open_when_absent_or_garbage() {
        let live = vec![EnvEntry::new("REPAYMENT_B_DISABLED", "garbage")];
        assert_eq!(seed_baseline("A", &live), ChannelStatus::Open);
        assert_eq!(seed_baseline("B", &live), ChannelStatus::Open);
    }
}
