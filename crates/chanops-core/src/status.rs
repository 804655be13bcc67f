use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ChannelStatus
// ---------------------------------------------------------------------------

/// Open/closed state of a payment channel's two traffic directions.
///
/// The four variants are a view over two independent flags,
/// `consume_closed` and `repayment_closed`. Every transition is expressed
/// as setting or clearing those flags, so adding an operation never
/// requires enumerating status pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStatus {
    Open,
    ConsumeClosed,
    RepaymentClosed,
    AllClosed,
}

impl ChannelStatus {
    pub fn all() -> &'static [ChannelStatus] {
        &[
            ChannelStatus::Open,
            ChannelStatus::ConsumeClosed,
            ChannelStatus::RepaymentClosed,
            ChannelStatus::AllClosed,
        ]
    }

    pub fn from_flags(consume_closed: bool, repayment_closed: bool) -> Self {
        match (consume_closed, repayment_closed) {
            (false, false) => ChannelStatus::Open,
            (true, false) => ChannelStatus::ConsumeClosed,
            (false, true) => ChannelStatus::RepaymentClosed,
            (true, true) => ChannelStatus::AllClosed,
        }
    }

    /// `(consume_closed, repayment_closed)`, inverse of [`from_flags`].
    ///
    /// [`from_flags`]: ChannelStatus::from_flags
    pub fn flags(self) -> (bool, bool) {
        match self {
            ChannelStatus::Open => (false, false),
            ChannelStatus::ConsumeClosed => (true, false),
            ChannelStatus::RepaymentClosed => (false, true),
            ChannelStatus::AllClosed => (true, true),
        }
    }

    /// The exact spelling stored in environment-variable values.
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelStatus::Open => "OPEN",
            ChannelStatus::ConsumeClosed => "CONSUME",
            ChannelStatus::RepaymentClosed => "REPAYMENT",
            ChannelStatus::AllClosed => "ALL",
        }
    }

    /// Whether a raw env value round-trips through [`as_str`]. Anything
    /// else is conventionally read as "open", never an error.
    ///
    /// [`as_str`]: ChannelStatus::as_str
    pub fn is_recognized(s: &str) -> bool {
        Self::all().iter().any(|st| st.as_str() == s)
    }

    /// Human-readable label shown in the channel list.
    pub fn label(self) -> &'static str {
        match self {
            ChannelStatus::ConsumeClosed => "consume closed",
            ChannelStatus::RepaymentClosed => "repayment closed",
            ChannelStatus::AllClosed => "all trading closed",
            ChannelStatus::Open => "trading normally",
        }
    }
}

impl fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChannelStatus {
    type Err = crate::error::ChanopsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(ChannelStatus::Open),
            "CONSUME" => Ok(ChannelStatus::ConsumeClosed),
            "REPAYMENT" => Ok(ChannelStatus::RepaymentClosed),
            "ALL" => Ok(ChannelStatus::AllClosed),
            _ => Err(crate::error::ChanopsError::UnrecognizedStatus(
                s.to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// The six operator actions. The first four own exactly one flag; the
/// last two set or clear both uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    OpenConsume,
    CloseConsume,
    OpenRepayment,
    CloseRepayment,
    OpenAll,
    CloseAll,
}

impl Operation {
    pub fn all() -> &'static [Operation] {
        &[
            Operation::OpenConsume,
            Operation::CloseConsume,
            Operation::OpenRepayment,
            Operation::CloseRepayment,
            Operation::OpenAll,
            Operation::CloseAll,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::OpenConsume => "open_consume",
            Operation::CloseConsume => "close_consume",
            Operation::OpenRepayment => "open_repayment",
            Operation::CloseRepayment => "close_repayment",
            Operation::OpenAll => "open_all",
            Operation::CloseAll => "close_all",
        }
    }

    /// The digit bound to this operation in the interactive list.
    pub fn key(self) -> char {
        match self {
            Operation::OpenConsume => '1',
            Operation::CloseConsume => '2',
            Operation::OpenRepayment => '3',
            Operation::CloseRepayment => '4',
            Operation::OpenAll => '5',
            Operation::CloseAll => '6',
        }
    }

    pub fn from_key(c: char) -> Option<Operation> {
        Self::all().iter().copied().find(|op| op.key() == c)
    }

    pub fn help_text(self) -> &'static str {
        match self {
            Operation::OpenConsume => "open consume",
            Operation::CloseConsume => "close consume",
            Operation::OpenRepayment => "open repayment",
            Operation::CloseRepayment => "close repayment",
            Operation::OpenAll => "open all",
            Operation::CloseAll => "close all",
        }
    }

    /// Apply this operation to a status via the flag decomposition.
    /// A result equal to the input means the action is a no-op.
    pub fn apply(self, status: ChannelStatus) -> ChannelStatus {
        let (consume_closed, repayment_closed) = status.flags();
        let (consume_closed, repayment_closed) = match self {
            Operation::OpenConsume => (false, repayment_closed),
            Operation::CloseConsume => (true, repayment_closed),
            Operation::OpenRepayment => (consume_closed, false),
            Operation::CloseRepayment => (consume_closed, true),
            Operation::OpenAll => (false, false),
            Operation::CloseAll => (true, true),
        };
        ChannelStatus::from_flags(consume_closed, repayment_closed)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_roundtrip() {
        for status in ChannelStatus::all() {
            let (c, r) = status.flags();
            assert_eq!(ChannelStatus::from_flags(c, r), *status);
        }
    }

    #[test]
    fn recognized_spellings() {
        assert!(ChannelStatus::is_recognized("OPEN"));
        assert!(ChannelStatus::is_recognized("CONSUME"));
        assert!(ChannelStatus::is_recognized("REPAYMENT"));
        assert!(ChannelStatus::is_recognized("ALL"));
        assert!(!ChannelStatus::is_recognized("all"));
        assert!(!ChannelStatus::is_recognized("OPEN "));
        assert!(!ChannelStatus::is_recognized(""));
        assert!(!ChannelStatus::is_recognized("garbage"));
    }

    #[test]
    fn status_string_roundtrip() {
        use std::str::FromStr;
        for status in ChannelStatus::all() {
            assert_eq!(ChannelStatus::from_str(status.as_str()).unwrap(), *status);
        }
        assert!(ChannelStatus::from_str("bogus").is_err());
    }

    #[test]
    fn transition_table() {
        use ChannelStatus::*;
        use Operation::*;
        // Rows: starting status. Columns: the six operations in key order.
        let table = [
            (Open, [Open, ConsumeClosed, Open, RepaymentClosed, Open, AllClosed]),
            (
                ConsumeClosed,
                [Open, ConsumeClosed, ConsumeClosed, AllClosed, Open, AllClosed],
            ),
            (
                RepaymentClosed,
                [RepaymentClosed, AllClosed, Open, RepaymentClosed, Open, AllClosed],
            ),
            (
                AllClosed,
                [RepaymentClosed, AllClosed, ConsumeClosed, AllClosed, Open, AllClosed],
            ),
        ];
        for (from, expected) in table {
            for (op, want) in Operation::all().iter().zip(expected) {
                assert_eq!(op.apply(from), want, "{from} -> {op}");
            }
        }
    }

    #[test]
    fn apply_is_idempotent() {
        for status in ChannelStatus::all() {
            for op in Operation::all() {
                let once = op.apply(*status);
                assert_eq!(op.apply(once), once, "{status} -> {op}");
            }
        }
    }

    #[test]
    fn close_both_matches_close_all() {
        let step = Operation::CloseRepayment.apply(Operation::CloseConsume.apply(ChannelStatus::Open));
        assert_eq!(step, Operation::CloseAll.apply(ChannelStatus::Open));
        assert_eq!(step, ChannelStatus::AllClosed);
    }

    #[test]
    fn key_bindings() {
        assert_eq!(Operation::from_key('1'), Some(Operation::OpenConsume));
        assert_eq!(Operation::from_key('6'), Some(Operation::CloseAll));
        assert_eq!(Operation::from_key('7'), None);
        assert_eq!(Operation::from_key('q'), None);
    }
}
