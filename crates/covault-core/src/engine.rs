use crate::confirmations::ConfirmationTracker;
use crate::env::LedgerEnvironment;
use crate::error::VaultError;
use crate::events::{EventLog, EventRecord, VaultEvent};
use crate::ledger::TransactionLedger;
use crate::limiter::SpendingLimiter;
use crate::owners::OwnerRegistry;
use crate::types::{
    CallRequest, GovernanceAction, PrincipalId, ProposedAction, Transaction, CALL_RESOURCE_CEILING,
    MAX_PAYLOAD_BYTES,
};
use tracing::{debug, info, warn};

/// Binary guard over the execution operation.
///
/// Only `execute` takes the lock; nested submit/confirm/revoke/cancel during
/// an in-flight external call are an explicit part of the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExecutionLock {
    Idle,
    Active,
}

/// Vault construction parameters.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// The engine's own principal identity, used to reject call proposals
    /// that try to bypass the governance transaction kind.
    pub vault_id: PrincipalId,
    pub owners: Vec<PrincipalId>,
    pub threshold: usize,
    /// Rolling daily cap in minor units; 0 means unlimited.
    pub daily_limit_minor: u64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            vault_id: PrincipalId::new("covault"),
            owners: Vec::new(),
            threshold: 1,
            daily_limit_minor: 0,
        }
    }
}

/// The authorization vault engine.
///
/// One instance owns all mutable state: registry, ledger, confirmation
/// bits, limiter, event log, nonce, pause flag and reentrancy lock. Every
/// operation takes the host environment and the calling principal as
/// explicit parameters; nothing is ambient.
pub struct Vault {
    vault_id: PrincipalId,
    pub(crate) owners: OwnerRegistry,
    pub(crate) threshold: usize,
    pub(crate) ledger: TransactionLedger,
    pub(crate) confirmations: ConfirmationTracker,
    pub(crate) limiter: SpendingLimiter,
    pub(crate) events: EventLog,
    execution_nonce: u64,
    paused: bool,
    lock: ExecutionLock,
}

impl Vault {
    /// Construct a vault.
    ///
    /// Requires `1 <= threshold <= |owners| <= 50` and a non-null,
    /// duplicate-free owner list.
    pub fn new(config: VaultConfig, now_secs: u64) -> Result<Self, VaultError> {
        if config.vault_id.is_null() {
            return Err(VaultError::NullPrincipal);
        }
        let owners = OwnerRegistry::new(config.owners)?;
        if config.threshold == 0 || config.threshold > owners.len() {
            return Err(VaultError::InvalidThreshold {
                requested: config.threshold,
                owner_count: owners.len(),
            });
        }

        Ok(Self {
            vault_id: config.vault_id,
            owners,
            threshold: config.threshold,
            ledger: TransactionLedger::new(),
            confirmations: ConfirmationTracker::new(),
            limiter: SpendingLimiter::new(config.daily_limit_minor, now_secs),
            events: EventLog::new(),
            execution_nonce: 0,
            paused: false,
            lock: ExecutionLock::Idle,
        })
    }

    // ── Proposal lifecycle ──────────────────────────────────────────────

    /// Propose an action and return its dense id.
    pub fn submit(
        &mut self,
        env: &dyn LedgerEnvironment,
        caller: &PrincipalId,
        action: ProposedAction,
    ) -> Result<u64, VaultError> {
        self.require_active()?;
        self.require_owner(caller)?;
        self.validate_action(&action)?;

        let now = env.now_secs();
        let id = self.ledger.append(action, caller.clone(), now);
        self.events.append(
            VaultEvent::Submitted {
                id,
                by: caller.clone(),
            },
            Some(id),
            now,
        )?;
        info!(id, caller = %caller, "transaction submitted");
        Ok(id)
    }

    /// Record the caller's approval of a pending transaction.
    pub fn confirm(
        &mut self,
        env: &dyn LedgerEnvironment,
        caller: &PrincipalId,
        id: u64,
    ) -> Result<(), VaultError> {
        self.require_active()?;
        self.require_owner(caller)?;
        self.require_pending(id)?;
        if self.confirmations.is_confirmed_by(id, caller) {
            return Err(VaultError::AlreadyConfirmed {
                id,
                owner: caller.clone(),
            });
        }

        self.confirmations.confirm(id, caller);
        if let Some(tx) = self.ledger.get_mut(id) {
            tx.confirmation_count += 1;
        }
        self.events.append(
            VaultEvent::Confirmed {
                id,
                owner: caller.clone(),
            },
            Some(id),
            env.now_secs(),
        )?;
        debug!(id, owner = %caller, "confirmation recorded");
        Ok(())
    }

    /// Withdraw a previously recorded approval.
    pub fn revoke(
        &mut self,
        env: &dyn LedgerEnvironment,
        caller: &PrincipalId,
        id: u64,
    ) -> Result<(), VaultError> {
        self.require_active()?;
        self.require_owner(caller)?;
        self.require_pending(id)?;
        if !self.confirmations.revoke(id, caller) {
            return Err(VaultError::NotConfirmed {
                id,
                owner: caller.clone(),
            });
        }

        if let Some(tx) = self.ledger.get_mut(id) {
            tx.confirmation_count -= 1;
        }
        self.events.append(
            VaultEvent::Revoked {
                id,
                owner: caller.clone(),
            },
            Some(id),
            env.now_secs(),
        )?;
        debug!(id, owner = %caller, "confirmation revoked");
        Ok(())
    }

    /// Void a still-pending transaction.
    ///
    /// Eligibility is recomputed over the *current* owner set's confirmation
    /// bits, not the stored counter: an owner removed after confirming
    /// silently loses their vote here, while `execute` keeps trusting the
    /// counter until someone revokes. Deliberately permitted while paused so
    /// stale quorate proposals can still be voided.
    pub fn cancel(
        &mut self,
        env: &dyn LedgerEnvironment,
        caller: &PrincipalId,
        id: u64,
    ) -> Result<(), VaultError> {
        self.require_owner(caller)?;
        self.require_pending(id)?;

        let live = self.confirmations.live_count(id, &self.owners);
        if live < self.threshold {
            return Err(VaultError::QuorumNotReached {
                id,
                have: live,
                required: self.threshold,
            });
        }

        if let Some(tx) = self.ledger.get_mut(id) {
            tx.cancelled = true;
        }
        self.events.append(
            VaultEvent::Cancelled {
                id,
                by: caller.clone(),
            },
            Some(id),
            env.now_secs(),
        )?;
        info!(id, caller = %caller, "transaction cancelled");
        Ok(())
    }

    /// Execute a quorate transaction.
    ///
    /// Checks-effects-interactions: the executed flag, the daily spend and
    /// the nonce are all written before the external call, and restored from
    /// a snapshot if the call fails. The failed transaction stays pending
    /// and retryable.
    pub fn execute(
        &mut self,
        env: &mut dyn LedgerEnvironment,
        caller: &PrincipalId,
        id: u64,
    ) -> Result<(), VaultError> {
        self.require_active()?;
        self.require_owner(caller)?;
        self.require_pending(id)?;

        if self.lock == ExecutionLock::Active {
            return Err(VaultError::ReentrantExecution { id });
        }
        self.lock = ExecutionLock::Active;
        let result = self.execute_locked(env, caller, id);
        self.lock = ExecutionLock::Idle;
        result
    }

    fn execute_locked(
        &mut self,
        env: &mut dyn LedgerEnvironment,
        caller: &PrincipalId,
        id: u64,
    ) -> Result<(), VaultError> {
        let tx = self
            .ledger
            .get(id)
            .ok_or(VaultError::UnknownTransaction { id })?;
        if tx.confirmation_count < self.threshold {
            return Err(VaultError::QuorumNotReached {
                id,
                have: tx.confirmation_count,
                required: self.threshold,
            });
        }
        let action = tx.action.clone();
        let value = action.value_minor();

        let available = env.balance_minor();
        if value > available {
            return Err(VaultError::InsufficientBalance {
                requested: value,
                available,
            });
        }
        let now = env.now_secs();
        self.limiter.authorize(now, value)?;

        // Snapshot for compensating rollback. The lock guarantees no other
        // execution can consume the limiter or bump the nonce while the
        // external call is in flight, so restoring is sound.
        let limiter_snapshot = self.limiter;
        let nonce_snapshot = self.execution_nonce;

        if let Some(tx) = self.ledger.get_mut(id) {
            tx.executed = true;
        }
        self.limiter.consume(value);
        self.execution_nonce += 1;

        match action {
            ProposedAction::Call {
                target,
                value_minor,
                payload,
            } => {
                let request = CallRequest {
                    transaction_id: id,
                    target,
                    value_minor,
                    payload,
                    resource_ceiling: CALL_RESOURCE_CEILING,
                };
                let outcome = env.invoke(self, &request);
                let now = env.now_secs();
                if outcome.success {
                    self.events.append(
                        VaultEvent::Executed {
                            id,
                            by: caller.clone(),
                        },
                        Some(id),
                        now,
                    )?;
                    info!(id, value, caller = %caller, "transaction executed");
                    Ok(())
                } else {
                    let diagnostic = outcome.diagnostic_text();
                    self.rollback_attempt(id, limiter_snapshot, nonce_snapshot);
                    self.events.append(
                        VaultEvent::ExecutionFailed {
                            id,
                            by: caller.clone(),
                            diagnostic: diagnostic.clone(),
                        },
                        Some(id),
                        now,
                    )?;
                    warn!(id, %diagnostic, "external call failed, attempt rolled back");
                    Err(VaultError::ExternalCallFailed { id, diagnostic })
                }
            }
            ProposedAction::Governance { action } => match self.apply_governance(&action, now) {
                Ok(()) => {
                    self.events.append(
                        VaultEvent::Executed {
                            id,
                            by: caller.clone(),
                        },
                        Some(id),
                        now,
                    )?;
                    info!(id, caller = %caller, "governance transaction executed");
                    Ok(())
                }
                Err(err) => {
                    self.rollback_attempt(id, limiter_snapshot, nonce_snapshot);
                    self.events.append(
                        VaultEvent::ExecutionFailed {
                            id,
                            by: caller.clone(),
                            diagnostic: err.to_string(),
                        },
                        Some(id),
                        now,
                    )?;
                    warn!(id, error = %err, "governance apply failed, attempt rolled back");
                    Err(err)
                }
            },
        }
    }

    fn rollback_attempt(
        &mut self,
        id: u64,
        limiter_snapshot: SpendingLimiter,
        nonce_snapshot: u64,
    ) {
        self.limiter = limiter_snapshot;
        self.execution_nonce = nonce_snapshot;
        if let Some(tx) = self.ledger.get_mut(id) {
            tx.executed = false;
        }
    }

    // ── Pause toggles ───────────────────────────────────────────────────

    /// Block submit/confirm/revoke/execute. Cancellation stays available.
    pub fn pause(
        &mut self,
        env: &dyn LedgerEnvironment,
        caller: &PrincipalId,
    ) -> Result<(), VaultError> {
        self.require_owner(caller)?;
        if self.paused {
            return Err(VaultError::VaultPaused);
        }
        self.paused = true;
        self.events.append(
            VaultEvent::Paused { by: caller.clone() },
            None,
            env.now_secs(),
        )?;
        info!(caller = %caller, "vault paused");
        Ok(())
    }

    pub fn unpause(
        &mut self,
        env: &dyn LedgerEnvironment,
        caller: &PrincipalId,
    ) -> Result<(), VaultError> {
        self.require_owner(caller)?;
        if !self.paused {
            return Err(VaultError::NotPaused);
        }
        self.paused = false;
        self.events.append(
            VaultEvent::Unpaused { by: caller.clone() },
            None,
            env.now_secs(),
        )?;
        info!(caller = %caller, "vault unpaused");
        Ok(())
    }

    // ── Query surface ───────────────────────────────────────────────────

    pub fn vault_id(&self) -> &PrincipalId {
        &self.vault_id
    }

    pub fn owners(&self) -> &[PrincipalId] {
        self.owners.owners()
    }

    pub fn is_owner(&self, id: &PrincipalId) -> bool {
        self.owners.contains(id)
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn daily_limit_minor(&self) -> u64 {
        self.limiter.daily_limit_minor()
    }

    pub fn spent_today_minor(&self) -> u64 {
        self.limiter.spent_today_minor()
    }

    /// Amount still releasable under the daily cap at the host's current
    /// time, without materializing a rollover.
    pub fn max_withdrawable_minor(&self, env: &dyn LedgerEnvironment) -> u64 {
        self.limiter.max_withdrawable_minor(env.now_secs())
    }

    pub fn transaction(&self, id: u64) -> Option<&Transaction> {
        self.ledger.get(id)
    }

    pub fn transaction_count(&self) -> usize {
        self.ledger.len()
    }

    pub fn pending_count(&self) -> usize {
        self.ledger.pending_count()
    }

    pub fn transaction_ids(&self, include_pending: bool, include_executed: bool) -> Vec<u64> {
        self.ledger.ids(include_pending, include_executed)
    }

    /// Principals with a set confirmation bit, stale bits included.
    pub fn confirmations_of(&self, id: u64) -> Vec<PrincipalId> {
        self.confirmations.confirmers(id)
    }

    pub fn is_confirmed_by(&self, id: u64, owner: &PrincipalId) -> bool {
        self.confirmations.is_confirmed_by(id, owner)
    }

    /// The stored running counter `execute` trusts.
    pub fn confirmation_count(&self, id: u64) -> Option<usize> {
        self.ledger.get(id).map(|tx| tx.confirmation_count)
    }

    /// The recount over current owners that `cancel` requires.
    pub fn live_confirmation_count(&self, id: u64) -> usize {
        self.confirmations.live_count(id, &self.owners)
    }

    /// Count of execution attempts not rolled back. Advisory bookkeeping
    /// only; nothing consumes this as a replay guard.
    pub fn execution_nonce(&self) -> u64 {
        self.execution_nonce
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn events(&self) -> &[EventRecord] {
        self.events.records()
    }

    pub fn verify_event_chain(&self) -> bool {
        self.events.verify_chain()
    }

    // ── Guards ──────────────────────────────────────────────────────────

    fn require_owner(&self, caller: &PrincipalId) -> Result<(), VaultError> {
        if !self.owners.contains(caller) {
            return Err(VaultError::NotOwner {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    fn require_active(&self) -> Result<(), VaultError> {
        if self.paused {
            return Err(VaultError::VaultPaused);
        }
        Ok(())
    }

    fn require_pending(&self, id: u64) -> Result<(), VaultError> {
        let tx = self
            .ledger
            .get(id)
            .ok_or(VaultError::UnknownTransaction { id })?;
        if tx.executed {
            return Err(VaultError::AlreadyExecuted { id });
        }
        if tx.cancelled {
            return Err(VaultError::AlreadyCancelled { id });
        }
        Ok(())
    }

    fn validate_action(&self, action: &ProposedAction) -> Result<(), VaultError> {
        match action {
            ProposedAction::Call {
                target, payload, ..
            } => {
                if target.is_null() {
                    return Err(VaultError::NullPrincipal);
                }
                if *target == self.vault_id {
                    return Err(VaultError::SelfTargetedCall);
                }
                if payload.len() > MAX_PAYLOAD_BYTES {
                    return Err(VaultError::PayloadTooLarge {
                        size: payload.len(),
                        max: MAX_PAYLOAD_BYTES,
                    });
                }
            }
            ProposedAction::Governance { action } => match action {
                GovernanceAction::AddOwner { owner } | GovernanceAction::RemoveOwner { owner }
                    if owner.is_null() =>
                {
                    return Err(VaultError::NullPrincipal);
                }
                GovernanceAction::ChangeThreshold { threshold: 0 } => {
                    return Err(VaultError::InvalidThreshold {
                        requested: 0,
                        owner_count: self.owners.len(),
                    });
                }
                _ => {}
            },
        }
        Ok(())
    }
}
