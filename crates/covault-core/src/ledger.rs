use crate::types::{PrincipalId, ProposedAction, Transaction};

/// Append-only store of proposed actions.
///
/// Ids are dense and monotonic from 0; a transaction's slot in the backing
/// vector is its id. Lifecycle fields (`executed`, `cancelled`,
/// `confirmation_count`) are mutated in place by the engine; records are
/// never removed.
#[derive(Debug, Default, Clone)]
pub struct TransactionLedger {
    transactions: Vec<Transaction>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new pending transaction and return its id.
    pub(crate) fn append(
        &mut self,
        action: ProposedAction,
        submitted_by: PrincipalId,
        now_secs: u64,
    ) -> u64 {
        let id = self.transactions.len() as u64;
        self.transactions.push(Transaction {
            id,
            action,
            submitted_by,
            executed: false,
            cancelled: false,
            confirmation_count: 0,
            created_at_secs: now_secs,
        });
        id
    }

    pub fn get(&self, id: u64) -> Option<&Transaction> {
        self.transactions.get(id as usize)
    }

    pub(crate) fn get_mut(&mut self, id: u64) -> Option<&mut Transaction> {
        self.transactions.get_mut(id as usize)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.transactions.iter().filter(|tx| tx.is_pending()).count()
    }

    /// Ids filtered by lifecycle state, in submission order.
    ///
    /// Cancelled transactions are neither pending nor executed and never
    /// appear here; they remain reachable by id.
    pub fn ids(&self, include_pending: bool, include_executed: bool) -> Vec<u64> {
        self.transactions
            .iter()
            .filter(|tx| (include_pending && tx.is_pending()) || (include_executed && tx.executed))
            .map(|tx| tx.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(target: &str, value: u64) -> ProposedAction {
        ProposedAction::Call {
            target: PrincipalId::new(target),
            value_minor: value,
            payload: Vec::new(),
        }
    }

    #[test]
    fn ids_are_dense_and_monotonic_from_zero() {
        let mut ledger = TransactionLedger::new();
        for n in 0..5u64 {
            let id = ledger.append(call("payee", n), PrincipalId::new("a"), 1_000);
            assert_eq!(id, n);
        }
        assert_eq!(ledger.len(), 5);

        let tx = ledger.get(3).expect("exists");
        assert!(tx.is_pending());
        assert_eq!(tx.confirmation_count, 0);
        assert_eq!(tx.created_at_secs, 1_000);
    }

    #[test]
    fn lifecycle_filters_partition_transactions() {
        let mut ledger = TransactionLedger::new();
        ledger.append(call("p", 1), PrincipalId::new("a"), 0);
        ledger.append(call("p", 2), PrincipalId::new("a"), 0);
        ledger.append(call("p", 3), PrincipalId::new("a"), 0);

        ledger.get_mut(0).unwrap().executed = true;
        ledger.get_mut(2).unwrap().cancelled = true;

        assert_eq!(ledger.pending_count(), 1);
        assert_eq!(ledger.ids(true, false), vec![1]);
        assert_eq!(ledger.ids(false, true), vec![0]);
        assert_eq!(ledger.ids(true, true), vec![0, 1]);
        assert!(ledger.ids(false, false).is_empty());
    }

    #[test]
    fn unknown_id_is_none() {
        let ledger = TransactionLedger::new();
        assert!(ledger.get(0).is_none());
    }
}
