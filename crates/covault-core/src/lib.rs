//! Covault core: a self-custodial, multi-party authorization vault.
//!
//! One engine instance owns a shared pool of value and a privileged
//! external-call capability. Proposed actions move through
//! Pending -> { Executed | Cancelled } under an independently verified
//! quorum of owner confirmations, a rolling daily spending cap, and a
//! reentrancy-safe execution path with compensating rollback on failure.
//! Owner-set and policy changes flow through the same quorum machinery as a
//! dedicated governance transaction kind.

#![deny(unsafe_code)]

pub mod confirmations;
pub mod engine;
pub mod env;
pub mod error;
pub mod events;
pub mod governance;
pub mod ledger;
pub mod limiter;
pub mod owners;
pub mod types;

pub use confirmations::ConfirmationTracker;
pub use engine::{Vault, VaultConfig};
pub use env::LedgerEnvironment;
pub use error::VaultError;
pub use events::{EventLog, EventRecord, VaultEvent};
pub use ledger::TransactionLedger;
pub use limiter::SpendingLimiter;
pub use owners::OwnerRegistry;
pub use types::{
    CallOutcome, CallRequest, GovernanceAction, PrincipalId, ProposedAction, Transaction,
    CALL_RESOURCE_CEILING, MAX_OWNERS, MAX_PAYLOAD_BYTES, SECS_PER_DAY,
};
