use crate::status::ChannelStatus;
use serde::{Deserialize, Serialize};

/// One row of the channel metadata source: identifier plus display
/// nickname. Identifiers are unique (primary key upstream).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMeta {
    pub channel: String,
    pub nickname: String,
}

/// A known channel with its current in-session status. Created once per
/// channel at startup, mutated in place, never removed during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRecord {
    pub channel: String,
    pub nickname: String,
    pub status: ChannelStatus,
}

impl ChannelRecord {
    pub fn new(meta: ChannelMeta, status: ChannelStatus) -> Self {
        Self {
            channel: meta.channel,
            nickname: meta.nickname,
            status,
        }
    }

    /// List-row form: `<channel> <=> <nickname> <=> <label>`.
    pub fn display_row(&self) -> String {
        format!(
            "{} <=> {} <=> {}",
            self.channel,
            self.nickname,
            self.status.label()
        )
    }
}

/// The channel identifier leads each list row; everything after the
/// first separator is display-only.
pub fn channel_from_row(row: &str) -> &str {
    row.split(" <=> ").next().unwrap_or(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_row_format() {
        let rec = ChannelRecord::new(
            ChannelMeta {
                channel: "ALIPAY".to_string(),
                nickname: "alipay main".to_string(),
            },
            ChannelStatus::ConsumeClosed,
        );
        assert_eq!(rec.display_row(), "ALIPAY <=> alipay main <=> consume closed");
    }

    #[test]
    fn row_roundtrip() {
        let rec = ChannelRecord::new(
            ChannelMeta {
                channel: "WX_PAY".to_string(),
                nickname: "wechat <=> primary".to_string(),
            },
            ChannelStatus::Open,
        );
        assert_eq!(channel_from_row(&rec.display_row()), "WX_PAY");
    }
}
