//! Lifecycle of one answered question.
//!
//! ```text
//! Idle -> Requesting -> Streaming -> Committed
//!              |            |------> Failed
//!              |            '------> Cancelled
//!              '-------------------> Failed
//! ```
//!
//! Each terminal state commits exactly one assistant message.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    Idle,
    Requesting,
    Streaming,
    Committed,
    Failed,
    Cancelled,
}

impl TurnState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed | Self::Failed | Self::Cancelled)
    }
}

/// How a turn ended, with the sequence number of the committed answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// The provider signalled end of stream.
    Completed { sequence: u64, fragments: usize },

    /// The request or the stream failed; the answer ends with an error notice.
    Failed {
        sequence: u64,
        fragments: usize,
        error: String,
    },

    /// The consumer stopped early; the answer ends with an interruption marker.
    Cancelled { sequence: u64, fragments: usize },
}

impl TurnOutcome {
    /// Name of the terminal state, as used in logs.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Completed { .. } => "completed",
            Self::Failed { .. } => "failed",
            Self::Cancelled { .. } => "cancelled",
        }
    }

    pub fn state(&self) -> TurnState {
        match self {
            Self::Completed { .. } => TurnState::Committed,
            Self::Failed { .. } => TurnState::Failed,
            Self::Cancelled { .. } => TurnState::Cancelled,
        }
    }

    /// Sequence number of the committed assistant message.
    pub fn sequence(&self) -> u64 {
        match self {
            Self::Completed { sequence, .. }
            | Self::Failed { sequence, .. }
            | Self::Cancelled { sequence, .. } => *sequence,
        }
    }

    /// Text fragments delivered to the consumer before the turn ended.
    pub fn fragments(&self) -> usize {
        match self {
            Self::Completed { fragments, .. }
            | Self::Failed { fragments, .. }
            | Self::Cancelled { fragments, .. } => *fragments,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}
