use crate::channel::{ChannelMeta, ChannelRecord};
use crate::env::{self, EnvEntry};
use crate::error::{ChanopsError, Result};
use crate::status::{ChannelStatus, Operation};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// In-memory state for one interactive run: the per-channel records and
/// the set of channels an effective transition has been applied to.
///
/// A transition back to a channel's seeded status still leaves the
/// channel in the pending set. The set records "was touched", not
/// "differs from baseline"; re-opening a closed channel must flow
/// through reconciliation so its env entry is removed.
#[derive(Debug, Default)]
pub struct Session {
    records: BTreeMap<String, ChannelRecord>,
    pending: BTreeMap<String, ChannelStatus>,
}

impl Session {
    /// Build one record per metadata row, seeded from the live
    /// environment.
    pub fn seed(metas: Vec<ChannelMeta>, live: &[EnvEntry]) -> Self {
        let records = metas
            .into_iter()
            .map(|meta| {
                let status = env::seed_baseline(&meta.channel, live);
                (meta.channel.clone(), ChannelRecord::new(meta, status))
            })
            .collect();
        Self {
            records,
            pending: BTreeMap::new(),
        }
    }

    /// Apply an operator action to one channel. A no-op (the target
    /// flags already hold) changes nothing and is not recorded; an
    /// effective transition updates the record and marks the channel
    /// pending with its new status.
    pub fn apply(&mut self, op: Operation, channel: &str) -> Result<()> {
        let record = self
            .records
            .get_mut(channel)
            .ok_or_else(|| ChanopsError::UnknownChannel(channel.to_string()))?;
        let next = op.apply(record.status);
        if next == record.status {
            return Ok(());
        }
        record.status = next;
        self.pending.insert(channel.to_string(), next);
        Ok(())
    }

    /// Current list rows, sorted lexicographically.
    pub fn display_rows(&self) -> Vec<String> {
        let mut rows: Vec<String> = self.records.values().map(|r| r.display_row()).collect();
        rows.sort();
        rows
    }

    pub fn record(&self, channel: &str) -> Option<&ChannelRecord> {
        self.records.get(channel)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending(&self) -> &BTreeMap<String, ChannelStatus> {
        &self.pending
    }

    /// Hand the pending set to a commit, leaving it empty. The set is
    /// consumed whether or not the downstream write succeeds.
    pub fn take_pending(&mut self) -> BTreeMap<String, ChannelStatus> {
        std::mem::take(&mut self.pending)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
