use crate::engine::Vault;
use crate::error::VaultError;
use crate::events::VaultEvent;
use crate::types::GovernanceAction;
use tracing::info;

/// Governance gateway.
///
/// Mutating the owner set, the threshold, or the daily cap is reachable only
/// from the engine's own quorate execution step: the whole surface is
/// crate-private, so the original "caller is myself" runtime comparison is
/// replaced by type-level privacy plus the `ProposedAction::Governance`
/// transaction kind.
impl Vault {
    /// Apply a quorate governance action.
    ///
    /// A validation failure here rolls back like a failed external call in
    /// the execution path: the proposal stays pending and retryable, and no
    /// partial mutation survives because each arm validates before writing.
    pub(crate) fn apply_governance(
        &mut self,
        action: &GovernanceAction,
        now_secs: u64,
    ) -> Result<(), VaultError> {
        match action {
            GovernanceAction::AddOwner { owner } => {
                self.owners.add(owner.clone())?;
                self.events
                    .append(VaultEvent::OwnerAdded { owner: owner.clone() }, None, now_secs)?;
                info!(owner = %owner, owner_count = self.owners.len(), "owner added");
            }
            GovernanceAction::RemoveOwner { owner } => {
                if !self.owners.contains(owner) {
                    return Err(VaultError::UnknownOwner {
                        owner: owner.clone(),
                    });
                }
                let remaining = self.owners.len() - 1;
                if remaining < self.threshold {
                    return Err(VaultError::OwnerBelowThreshold {
                        remaining,
                        required: self.threshold,
                    });
                }
                self.owners.remove(owner)?;
                // Confirmation bits of the removed owner stay set; only the
                // live recount used for cancellation stops seeing them.
                self.events.append(
                    VaultEvent::OwnerRemoved { owner: owner.clone() },
                    None,
                    now_secs,
                )?;
                info!(owner = %owner, owner_count = self.owners.len(), "owner removed");
            }
            GovernanceAction::ChangeThreshold { threshold } => {
                if *threshold == 0 || *threshold > self.owners.len() {
                    return Err(VaultError::InvalidThreshold {
                        requested: *threshold,
                        owner_count: self.owners.len(),
                    });
                }
                self.threshold = *threshold;
                self.events.append(
                    VaultEvent::ThresholdChanged { threshold: *threshold },
                    None,
                    now_secs,
                )?;
                info!(threshold = *threshold, "threshold changed");
            }
            GovernanceAction::ChangeDailyLimit { daily_limit_minor } => {
                self.limiter.set_daily_limit(*daily_limit_minor);
                self.events.append(
                    VaultEvent::DailyLimitChanged {
                        daily_limit_minor: *daily_limit_minor,
                    },
                    None,
                    now_secs,
                )?;
                info!(daily_limit_minor = *daily_limit_minor, "daily limit changed");
            }
        }
        Ok(())
    }
}
