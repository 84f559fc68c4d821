//! Replay script format
//!
//! A script is a JSON array of steps. Each step names an operation in `op`,
//! may wait `after_ms` on the simulated clock before running, and carries the
//! operation's arguments:
//!
//! ```json
//! [
//!   { "op": "propose", "council": "deployer", "caller": "0x01..", "candidate": "0xaa.." },
//!   { "op": "approve", "council": "deployer", "caller": "0x01.." },
//!   { "op": "advance", "ms": 86400000 },
//!   { "op": "execute", "council": "deployer", "after_ms": 1000 }
//! ]
//! ```
//!
//! Owner operations default `caller` to the configured owner.

use serde::{Deserialize, Serialize};
use warden_core::{Address, CouncilId};

/// One timed script entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Clock advance applied before the action
    #[serde(default)]
    pub after_ms: u64,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Action {
    Propose {
        council: CouncilId,
        caller: Address,
        candidate: Address,
    },
    Approve {
        council: CouncilId,
        caller: Address,
    },
    Revoke {
        council: CouncilId,
        caller: Address,
    },
    Execute {
        council: CouncilId,
    },
    LastHonestReset {
        council: CouncilId,
        caller: Address,
        members: Vec<Address>,
        threshold: usize,
    },
    OwnerReset {
        council: CouncilId,
        #[serde(default)]
        caller: Option<Address>,
        members: Vec<Address>,
        threshold: usize,
    },
    AddGuardian {
        council: CouncilId,
        #[serde(default)]
        caller: Option<Address>,
        guardian: Address,
    },
    RemoveGuardian {
        council: CouncilId,
        #[serde(default)]
        caller: Option<Address>,
        guardian: Address,
    },
    SetGuardian {
        council: CouncilId,
        #[serde(default)]
        caller: Option<Address>,
        index: usize,
        guardian: Address,
    },
    SetThreshold {
        council: CouncilId,
        #[serde(default)]
        caller: Option<Address>,
        threshold: usize,
    },
    Advance {
        ms: u64,
    },
}

impl Action {
    /// The `op` tag as written in scripts
    pub fn name(&self) -> &'static str {
        match self {
            Action::Propose { .. } => "propose",
            Action::Approve { .. } => "approve",
            Action::Revoke { .. } => "revoke",
            Action::Execute { .. } => "execute",
            Action::LastHonestReset { .. } => "last-honest-reset",
            Action::OwnerReset { .. } => "owner-reset",
            Action::AddGuardian { .. } => "add-guardian",
            Action::RemoveGuardian { .. } => "remove-guardian",
            Action::SetGuardian { .. } => "set-guardian",
            Action::SetThreshold { .. } => "set-threshold",
            Action::Advance { .. } => "advance",
        }
    }
}

/// Parse a script from JSON text.
pub fn parse(text: &str) -> serde_json::Result<Vec<Step>> {
    serde_json::from_str(text)
}
