use crate::env::{self, EnvEntry};
use crate::status::ChannelStatus;
use std::collections::BTreeMap;

/// Compute the replacement environment list for one commit.
///
/// Walks `live` in order. Opaque entries pass through untouched. A
/// channel entry is kept only when it already says what it should:
/// either its channel is untouched and the value is a recognized
/// status, or the value equals the channel's pending target (which is
/// then satisfied and dropped from `pending`). Anything else, whether a
/// stale value for a touched channel or garbage on an untouched one, is
/// removed from the list. Channels still pending after the walk get a
/// fresh entry appended, except those targeting open: an absent entry
/// is the canonical spelling of "open".
///
/// Pure; cannot fail. The caller owns applying the result atomically.
pub fn reconcile(
    live: &[EnvEntry],
    pending: &mut BTreeMap<String, ChannelStatus>,
) -> Vec<EnvEntry> {
    let mut next = Vec::with_capacity(live.len());
    for entry in live {
        let Some(channel) = env::parse_channel_name(&entry.name) else {
            next.push(entry.clone());
            continue;
        };
        match pending.get(channel).copied() {
            Some(target) if entry.value == target.as_str() => {
                next.push(entry.clone());
                pending.remove(channel);
            }
            Some(_) => {
                // Stale or unreadable value; the trailing pass emits the
                // replacement for non-open targets.
            }
            None => {
                if ChannelStatus::is_recognized(&entry.value) {
                    next.push(entry.clone());
                }
                // Untouched entries with garbage values are purged.
            }
        }
    }
    for (channel, target) in pending.iter() {
        if *target != ChannelStatus::Open {
            next.push(EnvEntry::for_channel(channel, *target));
        }
    }
    next
}

/// `reconcile` bound to a session-style flow: hand in the pending set
/// by value, get the new list back. Used by callers that clear pending
/// unconditionally after a commit attempt.
pub fn reconcile_owned(
    live: &[EnvEntry],
    mut pending: BTreeMap<String, ChannelStatus>,
) -> Vec<EnvEntry> {
    reconcile(live, &mut pending)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::status::Operation;

    fn entries(pairs: &[(&str, &str)]) -> Vec<EnvEntry> {
        pairs.iter().map(|(n, v)| EnvEntry::new(*n, *v)).collect()
    }

    fn pending(pairs: &[(&str, ChannelStatus)]) -> BTreeMap<String, ChannelStatus> {
        pairs
            .iter()
            .map(|(c, s)| (c.to_string(), *s))
            .collect()
    }

    #[test]
    fn empty_pending_is_identity() {
        let live = entries(&[
            ("SPRING_PROFILES_ACTIVE", "prod"),
            ("REPAYMENT_A_DISABLED", "CONSUME"),
            ("JAVA_OPTS", "-Xmx512m"),
        ]);
        let mut p = BTreeMap::new();
        assert_eq!(reconcile(&live, &mut p), live);
    }

    #[test]
    fn opening_drops_entry() {
        let live = entries(&[("REPAYMENT_A_DISABLED", "CONSUME"), ("UNRELATED", "x")]);
        let mut p = pending(&[("A", ChannelStatus::Open)]);
        let next = reconcile(&live, &mut p);
        assert_eq!(next, entries(&[("UNRELATED", "x")]));
    }

    #[test]
    fn garbage_value_is_replaced_for_pending_channel() {
        let live = entries(&[("REPAYMENT_B_DISABLED", "garbage")]);
        let mut p = pending(&[("B", ChannelStatus::AllClosed)]);
        let next = reconcile(&live, &mut p);
        assert_eq!(next, entries(&[("REPAYMENT_B_DISABLED", "ALL")]));
    }

    #[test]
    fn untouched_garbage_is_purged() {
        let live = entries(&[("REPAYMENT_C_DISABLED", "garbage")]);
        let mut p = BTreeMap::new();
        assert!(reconcile(&live, &mut p).is_empty());
    }

    #[test]
    fn satisfied_entry_is_kept_and_consumed() {
        let live = entries(&[("REPAYMENT_A_DISABLED", "ALL")]);
        let mut p = pending(&[("A", ChannelStatus::AllClosed)]);
        let next = reconcile(&live, &mut p);
        assert_eq!(next, live);
        assert!(p.is_empty());
    }

    #[test]
    fn stale_value_is_rewritten() {
        let live = entries(&[("REPAYMENT_A_DISABLED", "CONSUME"), ("KEEP", "1")]);
        let mut p = pending(&[("A", ChannelStatus::RepaymentClosed)]);
        let next = reconcile(&live, &mut p);
        assert_eq!(
            next,
            entries(&[("KEEP", "1"), ("REPAYMENT_A_DISABLED", "REPAYMENT")])
        );
    }

    #[test]
    fn fresh_closure_appends_after_carried_entries() {
        let live = entries(&[("OPAQUE_ONE", "1"), ("OPAQUE_TWO", "2")]);
        let mut p = pending(&[("NEW", ChannelStatus::ConsumeClosed)]);
        let next = reconcile(&live, &mut p);
        assert_eq!(next[0], EnvEntry::new("OPAQUE_ONE", "1"));
        assert_eq!(next[1], EnvEntry::new("OPAQUE_TWO", "2"));
        assert_eq!(next[2], EnvEntry::new("REPAYMENT_NEW_DISABLED", "CONSUME"));
    }

    #[test]
    fn open_target_with_no_entry_emits_nothing() {
        let live = entries(&[("OPAQUE", "x")]);
        let mut p = pending(&[("A", ChannelStatus::Open)]);
        assert_eq!(reconcile(&live, &mut p), entries(&[("OPAQUE", "x")]));
    }

    #[test]
    fn multiple_channels_reconcile_together() {
        let live = entries(&[
            ("REPAYMENT_A_DISABLED", "ALL"),
            ("DB_URL", "mysql://..."),
            ("REPAYMENT_B_DISABLED", "CONSUME"),
            ("REPAYMENT_C_DISABLED", "junk"),
        ]);
        let mut p = pending(&[
            ("A", ChannelStatus::Open),
            ("B", ChannelStatus::AllClosed),
            ("D", ChannelStatus::RepaymentClosed),
        ]);
        let next = reconcile(&live, &mut p);
        // A dropped (open), B rewritten, C purged (untouched garbage),
        // D appended, opaque entry carried in place.
        assert_eq!(next[0], EnvEntry::new("DB_URL", "mysql://..."));
        let tail: Vec<&EnvEntry> = next[1..].iter().collect();
        assert_eq!(tail.len(), 2);
        assert!(tail.contains(&&EnvEntry::new("REPAYMENT_B_DISABLED", "ALL")));
        assert!(tail.contains(&&EnvEntry::new("REPAYMENT_D_DISABLED", "REPAYMENT")));
    }

    #[test]
    fn session_commit_flow() {
        use crate::channel::ChannelMeta;

        let live = entries(&[
            ("REPAYMENT_A_DISABLED", "CONSUME"),
            ("UNRELATED", "x"),
        ]);
        let metas = vec![
            ChannelMeta {
                channel: "A".to_string(),
                nickname: "alpha".to_string(),
            },
            ChannelMeta {
                channel: "B".to_string(),
                nickname: "beta".to_string(),
            },
        ];
        let mut session = Session::seed(metas, &live);
        session.apply(Operation::OpenConsume, "A").unwrap();
        session.apply(Operation::CloseAll, "B").unwrap();

        let next = reconcile_owned(&live, session.take_pending());
        assert_eq!(
            next,
            entries(&[("UNRELATED", "x"), ("REPAYMENT_B_DISABLED", "ALL")])
        );
        assert!(!session.has_pending());
    }
}
