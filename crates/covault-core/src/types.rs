use serde::{Deserialize, Serialize};
use std::fmt;

/// Hard cap on the owner set.
pub const MAX_OWNERS: usize = 50;

/// Largest accepted call payload in bytes.
pub const MAX_PAYLOAD_BYTES: usize = 100_000;

/// Seconds per rolling-limit day.
pub const SECS_PER_DAY: u64 = 86_400;

/// Fixed resource ceiling forwarded with every external invocation.
///
/// The engine does no resource accounting of its own; this value is handed to
/// the host environment verbatim so the callee runs under a bounded budget.
pub const CALL_RESOURCE_CEILING: u64 = 2_300_000;

/// Opaque principal identity.
///
/// The engine never inspects the identity beyond equality; the host
/// environment decides what an identity means. The empty string is the
/// "null" identity and is rejected wherever a principal is required.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(String);

impl PrincipalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_null(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PrincipalId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Owner-set and policy mutations reachable only through quorate execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GovernanceAction {
    AddOwner { owner: PrincipalId },
    RemoveOwner { owner: PrincipalId },
    ChangeThreshold { threshold: usize },
    ChangeDailyLimit { daily_limit_minor: u64 },
}

/// The action a transaction proposes.
///
/// External calls move value and invoke a target through the host
/// environment; governance actions apply to the engine itself and carry no
/// value. Both flow through the same submit/confirm/execute machinery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProposedAction {
    Call {
        target: PrincipalId,
        value_minor: u64,
        payload: Vec<u8>,
    },
    Governance { action: GovernanceAction },
}

impl ProposedAction {
    /// Value released by executing this action, in minor units.
    pub fn value_minor(&self) -> u64 {
        match self {
            Self::Call { value_minor, .. } => *value_minor,
            Self::Governance { .. } => 0,
        }
    }
}

/// A proposed action tracked through Pending -> { Executed | Cancelled }.
///
/// `executed` and `cancelled` are mutually exclusive and permanent once set.
/// `confirmation_count` is the stored running counter: it reflects cumulative
/// confirm/revoke calls and is deliberately not corrected when an owner is
/// later removed (see the cancellation recount in the engine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: u64,
    pub action: ProposedAction,
    pub submitted_by: PrincipalId,
    pub executed: bool,
    pub cancelled: bool,
    pub confirmation_count: usize,
    pub created_at_secs: u64,
}

impl Transaction {
    pub fn is_pending(&self) -> bool {
        !self.executed && !self.cancelled
    }
}

/// Wire shape of one external invocation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    pub transaction_id: u64,
    pub target: PrincipalId,
    pub value_minor: u64,
    pub payload: Vec<u8>,
    pub resource_ceiling: u64,
}

/// Result of one external invocation, reported as a value.
///
/// The host never raises a fault for a failed callee; it returns
/// `success = false` with whatever diagnostic bytes the callee produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOutcome {
    pub success: bool,
    pub diagnostic: Vec<u8>,
}

impl CallOutcome {
    pub fn success() -> Self {
        Self {
            success: true,
            diagnostic: Vec::new(),
        }
    }

    pub fn failure(diagnostic: impl Into<Vec<u8>>) -> Self {
        Self {
            success: false,
            diagnostic: diagnostic.into(),
        }
    }

    /// Lossy textual rendering of the diagnostic bytes.
    pub fn diagnostic_text(&self) -> String {
        String::from_utf8_lossy(&self.diagnostic).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_principal_is_detected() {
        assert!(PrincipalId::new("").is_null());
        assert!(!PrincipalId::new("owner-a").is_null());
    }

    #[test]
    fn governance_actions_carry_no_value() {
        let action = ProposedAction::Governance {
            action: GovernanceAction::ChangeThreshold { threshold: 2 },
        };
        assert_eq!(action.value_minor(), 0);

        let call = ProposedAction::Call {
            target: PrincipalId::new("payee"),
            value_minor: 500,
            payload: vec![1, 2, 3],
        };
        assert_eq!(call.value_minor(), 500);
    }

    #[test]
    fn proposed_action_serde_roundtrip() {
        let call = ProposedAction::Call {
            target: PrincipalId::new("payee"),
            value_minor: 42,
            payload: vec![0xde, 0xad],
        };
        let json = serde_json::to_value(&call).expect("serializable");
        assert_eq!(json["kind"], "call");
        let back: ProposedAction = serde_json::from_value(json).expect("deserializable");
        assert_eq!(back, call);
    }
}
