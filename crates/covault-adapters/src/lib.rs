//! Host-environment adapters for Covault.
//!
//! Everything here is deterministic: a controllable clock, explicit balance
//! accounting, and scripted call targets, so engine behavior under external
//! success, failure, and reentrancy can be pinned down in tests.

#![deny(unsafe_code)]

use covault_core::{
    CallOutcome, CallRequest, LedgerEnvironment, PrincipalId, Vault, VaultError, SECS_PER_DAY,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Pluggable external endpoint.
///
/// Implementations receive the vault back so they can exercise the
/// reentrancy contract: nested `execute` is rejected by the engine's lock,
/// nested submit/confirm/revoke/cancel are permitted.
pub trait CallTarget: Send + Sync {
    fn call(
        &self,
        vault: &mut Vault,
        env: &mut InMemoryLedgerEnvironment,
        request: &CallRequest,
    ) -> CallOutcome;
}

/// In-memory ledger environment.
///
/// Owns the clock, the vault's balance, per-target credit accounting, and a
/// registry of scripted call targets. A target without a registration
/// behaves like a passive endpoint: the call succeeds and only value moves.
/// Value moves if and only if the outcome is successful.
pub struct InMemoryLedgerEnvironment {
    now_secs: u64,
    vault_balance_minor: u64,
    credited: BTreeMap<PrincipalId, u64>,
    targets: HashMap<PrincipalId, Arc<dyn CallTarget>>,
    invocations: usize,
}

impl InMemoryLedgerEnvironment {
    pub fn new(now_secs: u64, vault_balance_minor: u64) -> Self {
        Self {
            now_secs,
            vault_balance_minor,
            credited: BTreeMap::new(),
            targets: HashMap::new(),
            invocations: 0,
        }
    }

    /// Register (or replace) the scripted endpoint behind a target identity.
    pub fn register_target(&mut self, target: PrincipalId, endpoint: Arc<dyn CallTarget>) {
        self.targets.insert(target, endpoint);
    }

    /// Value transferred into the vault from outside. Deposits are a host
    /// primitive; the engine itself never observes them.
    pub fn deposit(&mut self, amount_minor: u64) {
        self.vault_balance_minor = self.vault_balance_minor.saturating_add(amount_minor);
    }

    pub fn advance_secs(&mut self, secs: u64) {
        self.now_secs += secs;
    }

    pub fn advance_days(&mut self, days: u64) {
        self.advance_secs(days * SECS_PER_DAY);
    }

    /// Total external invocations issued, nested ones included.
    pub fn invocation_count(&self) -> usize {
        self.invocations
    }

    /// Cumulative value successfully delivered to a target.
    pub fn credited_to(&self, target: &PrincipalId) -> u64 {
        self.credited.get(target).copied().unwrap_or(0)
    }
}

impl LedgerEnvironment for InMemoryLedgerEnvironment {
    fn now_secs(&self) -> u64 {
        self.now_secs
    }

    fn balance_minor(&self) -> u64 {
        self.vault_balance_minor
    }

    fn invoke(&mut self, vault: &mut Vault, request: &CallRequest) -> CallOutcome {
        self.invocations += 1;
        debug!(
            transaction_id = request.transaction_id,
            target = %request.target,
            value = request.value_minor,
            "external invocation issued"
        );

        let outcome = match self.targets.get(&request.target).cloned() {
            Some(endpoint) => endpoint.call(vault, self, request),
            None => CallOutcome::success(),
        };

        if outcome.success {
            self.vault_balance_minor = self.vault_balance_minor.saturating_sub(request.value_minor);
            *self.credited.entry(request.target.clone()).or_default() += request.value_minor;
        }
        outcome
    }
}

/// Endpoint that accepts every call.
#[derive(Debug, Clone, Default)]
pub struct AcceptingTarget;

impl CallTarget for AcceptingTarget {
    fn call(
        &self,
        _vault: &mut Vault,
        _env: &mut InMemoryLedgerEnvironment,
        _request: &CallRequest,
    ) -> CallOutcome {
        CallOutcome::success()
    }
}

/// Endpoint that fails every call with a fixed diagnostic.
#[derive(Debug, Clone)]
pub struct AlwaysFailTarget {
    diagnostic: String,
}

impl AlwaysFailTarget {
    pub fn new(diagnostic: impl Into<String>) -> Self {
        Self {
            diagnostic: diagnostic.into(),
        }
    }
}

impl CallTarget for AlwaysFailTarget {
    fn call(
        &self,
        _vault: &mut Vault,
        _env: &mut InMemoryLedgerEnvironment,
        _request: &CallRequest,
    ) -> CallOutcome {
        CallOutcome::failure(self.diagnostic.as_bytes().to_vec())
    }
}

/// Endpoint that counts how often it is reached.
#[derive(Debug, Default)]
pub struct CountingTarget {
    calls: AtomicUsize,
}

impl CountingTarget {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CallTarget for CountingTarget {
    fn call(
        &self,
        _vault: &mut Vault,
        _env: &mut InMemoryLedgerEnvironment,
        _request: &CallRequest,
    ) -> CallOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        CallOutcome::success()
    }
}

/// Operations a reentrant endpoint attempts against the vault while the
/// original `execute` is still on the stack.
#[derive(Debug, Clone)]
pub enum ReentrantAttempt {
    Execute(u64),
    Confirm(u64),
    Revoke(u64),
    Cancel(u64),
    SubmitCall { target: PrincipalId, value_minor: u64 },
}

/// Endpoint that re-enters the vault's public surface mid-call.
///
/// Each attempt's result is recorded for the test to inspect afterwards;
/// the call itself still reports success so the outer execution completes.
pub struct ReentrantTarget {
    caller: PrincipalId,
    attempts: Vec<ReentrantAttempt>,
    observed: Mutex<Vec<Result<(), VaultError>>>,
}

impl ReentrantTarget {
    pub fn new(caller: PrincipalId, attempts: Vec<ReentrantAttempt>) -> Self {
        Self {
            caller,
            attempts,
            observed: Mutex::new(Vec::new()),
        }
    }

    /// Results of the nested attempts, in attempt order.
    pub fn observed(&self) -> Vec<Result<(), VaultError>> {
        std::mem::take(&mut *self.observed.lock().expect("observer lock poisoned"))
    }
}

impl CallTarget for ReentrantTarget {
    fn call(
        &self,
        vault: &mut Vault,
        env: &mut InMemoryLedgerEnvironment,
        _request: &CallRequest,
    ) -> CallOutcome {
        let mut observed = Vec::with_capacity(self.attempts.len());
        for attempt in &self.attempts {
            let result = match attempt {
                ReentrantAttempt::Execute(id) => vault.execute(&mut *env, &self.caller, *id),
                ReentrantAttempt::Confirm(id) => vault.confirm(&*env, &self.caller, *id),
                ReentrantAttempt::Revoke(id) => vault.revoke(&*env, &self.caller, *id),
                ReentrantAttempt::Cancel(id) => vault.cancel(&*env, &self.caller, *id),
                ReentrantAttempt::SubmitCall {
                    target,
                    value_minor,
                } => vault
                    .submit(
                        &*env,
                        &self.caller,
                        covault_core::ProposedAction::Call {
                            target: target.clone(),
                            value_minor: *value_minor,
                            payload: Vec::new(),
                        },
                    )
                    .map(|_| ()),
            };
            observed.push(result);
        }
        self.observed
            .lock()
            .expect("observer lock poisoned")
            .extend(observed);
        CallOutcome::success()
    }
}
