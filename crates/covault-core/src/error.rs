use crate::types::PrincipalId;
use thiserror::Error;

/// Vault engine errors.
///
/// Every operation reports failures synchronously with enough context
/// (ids, amounts, thresholds) to act on; nothing is silently discarded.
#[derive(Debug, Error)]
pub enum VaultError {
    // Authorization
    #[error("caller '{caller}' is not an owner")]
    NotOwner { caller: PrincipalId },

    // Not found
    #[error("transaction {id} does not exist")]
    UnknownTransaction { id: u64 },

    #[error("'{owner}' is not a member of the owner set")]
    UnknownOwner { owner: PrincipalId },

    // State conflicts
    #[error("transaction {id} is already executed")]
    AlreadyExecuted { id: u64 },

    #[error("transaction {id} is cancelled")]
    AlreadyCancelled { id: u64 },

    #[error("'{owner}' already confirmed transaction {id}")]
    AlreadyConfirmed { id: u64, owner: PrincipalId },

    #[error("'{owner}' has no confirmation on transaction {id} to revoke")]
    NotConfirmed { id: u64, owner: PrincipalId },

    #[error("transaction {id} has {have} of {required} required confirmations")]
    QuorumNotReached { id: u64, have: usize, required: usize },

    #[error("vault is paused")]
    VaultPaused,

    #[error("vault is not paused")]
    NotPaused,

    // Validation
    #[error("principal identity must not be null")]
    NullPrincipal,

    #[error("owner set must not be empty")]
    EmptyOwnerSet,

    #[error("payload of {size} bytes exceeds the {max} byte limit")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("threshold {requested} is invalid for {owner_count} owner(s)")]
    InvalidThreshold { requested: usize, owner_count: usize },

    #[error("'{owner}' is already an owner")]
    DuplicateOwner { owner: PrincipalId },

    #[error("owner set is at its limit of {max}")]
    OwnerLimitReached { max: usize },

    #[error("removal would leave {remaining} owner(s) below the threshold of {required}")]
    OwnerBelowThreshold { remaining: usize, required: usize },

    #[error("calls targeting the vault itself must be governance proposals")]
    SelfTargetedCall,

    // Resources
    #[error("requested {requested} exceeds available balance {available}")]
    InsufficientBalance { requested: u64, available: u64 },

    #[error("requested {requested} exceeds remaining daily allowance {remaining}")]
    DailyLimitExceeded { requested: u64, remaining: u64 },

    // External call
    #[error("external call for transaction {id} failed: {diagnostic}")]
    ExternalCallFailed { id: u64, diagnostic: String },

    // Concurrency
    #[error("transaction {id} cannot execute inside an in-flight execution")]
    ReentrantExecution { id: u64 },

    // Ambient
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("event log error: {0}")]
    EventLog(String),
}
