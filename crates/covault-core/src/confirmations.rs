use crate::owners::OwnerRegistry;
use crate::types::PrincipalId;
use std::collections::{BTreeSet, HashMap};

/// Per-transaction, per-owner approval bits.
///
/// The tracker stores raw bits only; the running counter lives on the
/// transaction record. The two can diverge on purpose: removing an owner
/// leaves their bit set and the counter untouched, and only the live recount
/// below looks at the bits through the lens of the *current* owner set.
#[derive(Debug, Default, Clone)]
pub struct ConfirmationTracker {
    by_transaction: HashMap<u64, BTreeSet<PrincipalId>>,
}

impl ConfirmationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an owner's bit. Returns false if it was already set.
    pub(crate) fn confirm(&mut self, id: u64, owner: &PrincipalId) -> bool {
        self.by_transaction
            .entry(id)
            .or_default()
            .insert(owner.clone())
    }

    /// Clear an owner's bit. Returns false if no bit was set.
    pub(crate) fn revoke(&mut self, id: u64, owner: &PrincipalId) -> bool {
        self.by_transaction
            .get_mut(&id)
            .map(|bits| bits.remove(owner))
            .unwrap_or(false)
    }

    pub fn is_confirmed_by(&self, id: u64, owner: &PrincipalId) -> bool {
        self.by_transaction
            .get(&id)
            .map(|bits| bits.contains(owner))
            .unwrap_or(false)
    }

    /// All principals with a set bit, including ones no longer in the owner
    /// set, in lexicographic order.
    pub fn confirmers(&self, id: u64) -> Vec<PrincipalId> {
        self.by_transaction
            .get(&id)
            .map(|bits| bits.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Recount confirmations over the *current* owner set.
    ///
    /// This is the stricter count used for cancellation eligibility: a
    /// removed owner's stale bit does not contribute here even though the
    /// stored counter still reflects it.
    pub fn live_count(&self, id: u64, registry: &OwnerRegistry) -> usize {
        let Some(bits) = self.by_transaction.get(&id) else {
            return 0;
        };
        registry
            .owners()
            .iter()
            .filter(|owner| bits.contains(owner))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(names: &[&str]) -> OwnerRegistry {
        OwnerRegistry::new(names.iter().map(|n| PrincipalId::new(*n)).collect()).unwrap()
    }

    #[test]
    fn confirm_and_revoke_toggle_bits() {
        let mut tracker = ConfirmationTracker::new();
        let a = PrincipalId::new("a");

        assert!(tracker.confirm(7, &a));
        assert!(!tracker.confirm(7, &a));
        assert!(tracker.is_confirmed_by(7, &a));

        assert!(tracker.revoke(7, &a));
        assert!(!tracker.revoke(7, &a));
        assert!(!tracker.is_confirmed_by(7, &a));
    }

    #[test]
    fn live_count_ignores_stale_bits_of_removed_owners() {
        let mut registry = registry(&["a", "b", "c"]);
        let mut tracker = ConfirmationTracker::new();
        tracker.confirm(0, &PrincipalId::new("a"));
        tracker.confirm(0, &PrincipalId::new("b"));
        assert_eq!(tracker.live_count(0, &registry), 2);

        registry.remove(&PrincipalId::new("b")).unwrap();
        assert_eq!(tracker.live_count(0, &registry), 1);

        // The stale bit itself is still visible to auditors.
        assert!(tracker.is_confirmed_by(0, &PrincipalId::new("b")));
        assert_eq!(tracker.confirmers(0).len(), 2);
    }

    #[test]
    fn unknown_transaction_has_no_confirmations() {
        let tracker = ConfirmationTracker::new();
        let registry = registry(&["a"]);
        assert_eq!(tracker.live_count(99, &registry), 0);
        assert!(tracker.confirmers(99).is_empty());
    }
}
