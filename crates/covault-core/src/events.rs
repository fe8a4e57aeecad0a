use crate::error::VaultError;
use crate::types::PrincipalId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Everything an auditor needs to reconstruct engine state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VaultEvent {
    Submitted { id: u64, by: PrincipalId },
    Confirmed { id: u64, owner: PrincipalId },
    Revoked { id: u64, owner: PrincipalId },
    Executed { id: u64, by: PrincipalId },
    ExecutionFailed { id: u64, by: PrincipalId, diagnostic: String },
    Cancelled { id: u64, by: PrincipalId },
    OwnerAdded { owner: PrincipalId },
    OwnerRemoved { owner: PrincipalId },
    ThresholdChanged { threshold: usize },
    DailyLimitChanged { daily_limit_minor: u64 },
    Paused { by: PrincipalId },
    Unpaused { by: PrincipalId },
}

/// Hash-chained event record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub entry_id: String,
    pub index: u64,
    pub transaction_id: Option<u64>,
    pub timestamp: DateTime<Utc>,
    pub event: VaultEvent,
    pub previous_hash: Option<String>,
    pub entry_hash: String,
}

/// Append-only event stream with hash-chain proofs.
///
/// No in-place mutation APIs are exposed; every lifecycle transition becomes
/// an additional record, so the stream plus the query surface is sufficient
/// for auditors and UIs to rebuild state.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from persisted records and verify chain integrity.
    pub fn from_records(records: Vec<EventRecord>) -> Result<Self, VaultError> {
        let log = Self { records };

        for (expected_index, record) in log.records.iter().enumerate() {
            if record.index != expected_index as u64 {
                return Err(VaultError::EventLog(format!(
                    "index gap at position {} (found {})",
                    expected_index, record.index
                )));
            }
        }
        if !log.verify_chain() {
            return Err(VaultError::EventLog(
                "persisted event hash-chain verification failed".to_string(),
            ));
        }
        Ok(log)
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub(crate) fn append(
        &mut self,
        event: VaultEvent,
        transaction_id: Option<u64>,
        now_secs: u64,
    ) -> Result<(), VaultError> {
        let index = self.records.len() as u64;
        let timestamp = DateTime::<Utc>::from_timestamp(now_secs as i64, 0)
            .ok_or_else(|| VaultError::EventLog(format!("invalid timestamp {now_secs}")))?;
        let previous_hash = self.records.last().map(|record| record.entry_hash.clone());
        let entry_hash = compute_entry_hash(
            index,
            transaction_id,
            timestamp,
            &event,
            previous_hash.as_deref(),
        )?;

        self.records.push(EventRecord {
            entry_id: Uuid::new_v4().to_string(),
            index,
            transaction_id,
            timestamp,
            event,
            previous_hash,
            entry_hash,
        });
        Ok(())
    }

    pub fn verify_chain(&self) -> bool {
        let mut previous_hash: Option<String> = None;
        for record in &self.records {
            let expected = compute_entry_hash(
                record.index,
                record.transaction_id,
                record.timestamp,
                &record.event,
                previous_hash.as_deref(),
            );
            match expected {
                Ok(hash) if hash == record.entry_hash => {}
                _ => return false,
            }
            if record.previous_hash != previous_hash {
                return false;
            }
            previous_hash = Some(record.entry_hash.clone());
        }
        true
    }
}

fn compute_entry_hash(
    index: u64,
    transaction_id: Option<u64>,
    timestamp: DateTime<Utc>,
    event: &VaultEvent,
    previous_hash: Option<&str>,
) -> Result<String, VaultError> {
    let material = serde_json::json!({
        "index": index,
        "transaction_id": transaction_id,
        "timestamp": timestamp,
        "event": event,
        "previous_hash": previous_hash,
    });

    let bytes =
        serde_json::to_vec(&material).map_err(|e| VaultError::Serialization(e.to_string()))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_hash_chain() {
        let mut log = EventLog::new();
        log.append(
            VaultEvent::Submitted {
                id: 0,
                by: PrincipalId::new("a"),
            },
            Some(0),
            1_000,
        )
        .unwrap();
        log.append(
            VaultEvent::Confirmed {
                id: 0,
                owner: PrincipalId::new("b"),
            },
            Some(0),
            1_010,
        )
        .unwrap();

        assert!(log.verify_chain());
        assert_eq!(log.records()[1].previous_hash, Some(log.records()[0].entry_hash.clone()));
    }

    #[test]
    fn detects_tampered_records() {
        let mut log = EventLog::new();
        log.append(
            VaultEvent::Paused {
                by: PrincipalId::new("a"),
            },
            None,
            500,
        )
        .unwrap();

        let mut tampered = log.clone();
        tampered.records[0].event = VaultEvent::Unpaused {
            by: PrincipalId::new("a"),
        };
        assert!(!tampered.verify_chain());
        assert!(log.verify_chain());
    }

    #[test]
    fn from_records_rejects_index_gaps() {
        let mut log = EventLog::new();
        log.append(
            VaultEvent::Paused {
                by: PrincipalId::new("a"),
            },
            None,
            500,
        )
        .unwrap();
        log.append(
            VaultEvent::Unpaused {
                by: PrincipalId::new("a"),
            },
            None,
            501,
        )
        .unwrap();

        let mut records = log.records().to_vec();
        records.remove(0);
        assert!(matches!(
            EventLog::from_records(records),
            Err(VaultError::EventLog(_))
        ));

        let intact = EventLog::from_records(log.records().to_vec()).unwrap();
        assert!(intact.verify_chain());
    }
}
