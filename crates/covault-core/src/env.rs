use crate::engine::Vault;
use crate::types::{CallOutcome, CallRequest};

/// Host execution environment consumed, not implemented, by the engine.
///
/// The host supplies the monotonic clock the rolling daily limit runs on,
/// custody of the vault's own balance, and the primitive that invokes an
/// arbitrary external endpoint under a bounded resource ceiling.
///
/// Contract for `invoke`:
///
/// - Failure is a value: a failed callee yields `success = false` plus its
///   diagnostic bytes, never a panic. Once issued the call cannot be
///   aborted; only the engine's own bookkeeping is rolled back afterward.
/// - Value moves out of the vault's balance if and only if the outcome is
///   successful.
/// - The callee receives `&mut Vault` and may re-enter the vault's public
///   surface while the original `execute` is still on the stack. The engine
///   rejects nested `execute` via its reentrancy lock; nested
///   submit/confirm/revoke/cancel are part of the contract and permitted.
pub trait LedgerEnvironment {
    /// Current time in seconds since the epoch. Must be monotonic between
    /// operations; the engine derives the limiter's day index from it.
    fn now_secs(&self) -> u64;

    /// The vault's own balance in minor units.
    fn balance_minor(&self) -> u64;

    /// Invoke an external endpoint with value and payload.
    fn invoke(&mut self, vault: &mut Vault, request: &CallRequest) -> CallOutcome;
}
