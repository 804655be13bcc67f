use anyhow::{Context, Result};
use chanops_core::channel::ChannelMeta;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;

const CHANNEL_QUERY: &str =
    "select repayment_channel, channel_nickname from repayment_channel_config order by repayment_channel";

#[derive(sqlx::FromRow)]
struct ChannelRow {
    repayment_channel: String,
    channel_nickname: String,
}

pub async fn connect(database_url: &str) -> Result<MySqlPool> {
    MySqlPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("failed to connect to channel metadata database")
}

/// All known channels, in channel order. Read once at startup; the tool
/// never writes to the metadata table.
pub async fn fetch_channel_meta(pool: &MySqlPool) -> Result<Vec<ChannelMeta>> {
    let rows: Vec<ChannelRow> = sqlx::query_as(CHANNEL_QUERY)
        .fetch_all(pool)
        .await
        .context("failed to query repayment_channel_config")?;
    Ok(rows
        .into_iter()
        .map(|r| ChannelMeta {
            channel: r.repayment_channel,
            nickname: r.channel_nickname,
        })
        .collect())
}
