//! Pending-settlement buffer.
//!
//! Commitments that the ledger has posted are admitted here and wait for a
//! counterpart. Entries keep admission order; the matcher walks them
//! front to back, so earlier arrivals are always paired first.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use gridsettle_types::{CommitmentRef, GridsettleError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One buffered commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferEntry {
    pub commitment: CommitmentRef,
    pub is_production: bool,
    /// Quantity not yet matched. Starts at the commitment's energy amount.
    pub remaining: Decimal,
    pub expires_at: DateTime<Utc>,
    /// Admission sequence number, strictly increasing.
    pub sequence: u64,
    pub admitted_at: DateTime<Utc>,
}

impl BufferEntry {
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// FIFO of [`BufferEntry`] with at most one entry per commitment.
#[derive(Debug, Clone, Default)]
pub struct PendingBuffer {
    /// Entries in admission order.
    entries: Vec<BufferEntry>,
    index: HashSet<CommitmentRef>,
    next_sequence: u64,
}

impl PendingBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a buffer from persisted entries.
    ///
    /// # Errors
    /// Returns `AlreadyBuffered` if the same commitment appears twice.
    pub fn restore(mut entries: Vec<BufferEntry>, next_sequence: u64) -> Result<Self> {
        entries.sort_by_key(|e| e.sequence);
        let mut index = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !index.insert(entry.commitment) {
                return Err(GridsettleError::AlreadyBuffered(entry.commitment));
            }
        }
        let next_sequence = entries
            .last()
            .map_or(next_sequence, |e| next_sequence.max(e.sequence + 1));
        Ok(Self {
            entries,
            index,
            next_sequence,
        })
    }

    /// Append a commitment at the back of the queue and return its
    /// sequence number.
    ///
    /// # Errors
    /// Returns `AlreadyBuffered` if the commitment already has an entry.
    pub fn push(
        &mut self,
        commitment: CommitmentRef,
        is_production: bool,
        remaining: Decimal,
        expires_at: DateTime<Utc>,
        admitted_at: DateTime<Utc>,
    ) -> Result<u64> {
        if !self.index.insert(commitment) {
            return Err(GridsettleError::AlreadyBuffered(commitment));
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.entries.push(BufferEntry {
            commitment,
            is_production,
            remaining,
            expires_at,
            sequence,
            admitted_at,
        });
        Ok(sequence)
    }

    #[must_use]
    pub fn contains(&self, commitment: CommitmentRef) -> bool {
        self.index.contains(&commitment)
    }

    #[must_use]
    pub fn get(&self, commitment: CommitmentRef) -> Option<&BufferEntry> {
        if !self.contains(commitment) {
            return None;
        }
        self.entries.iter().find(|e| e.commitment == commitment)
    }

    /// Remove a commitment's entry, preserving the order of the rest.
    pub fn remove(&mut self, commitment: CommitmentRef) -> Option<BufferEntry> {
        if !self.index.remove(&commitment) {
            return None;
        }
        let pos = self.entries.iter().position(|e| e.commitment == commitment)?;
        Some(self.entries.remove(pos))
    }

    /// Overwrite the unmatched quantity of a buffered commitment.
    ///
    /// # Errors
    /// Returns `NotBuffered` if the commitment has no entry.
    pub fn set_remaining(&mut self, commitment: CommitmentRef, remaining: Decimal) -> Result<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.commitment == commitment)
            .ok_or(GridsettleError::NotBuffered(commitment))?;
        entry.remaining = remaining;
        Ok(())
    }

    /// Remove and return every entry whose window has closed at `now`,
    /// in admission order.
    pub fn drain_expired(&mut self, now: DateTime<Utc>) -> Vec<BufferEntry> {
        let (expired, live): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| e.is_expired_at(now));
        self.entries = live;
        for entry in &expired {
            self.index.remove(&entry.commitment);
        }
        expired
    }

    /// Entries still inside their window at `now`, in admission order.
    pub fn live(&self, now: DateTime<Utc>) -> impl Iterator<Item = &BufferEntry> + '_ {
        self.entries.iter().filter(move |e| !e.is_expired_at(now))
    }

    /// All entries in admission order, expired ones included.
    #[must_use]
    pub fn entries(&self) -> &[BufferEntry] {
        &self.entries
    }

    #[must_use]
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use gridsettle_types::ProfileId;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn r(profile: u64, index: usize) -> CommitmentRef {
        CommitmentRef::new(ProfileId(profile), index)
    }

    #[test]
    fn push_keeps_admission_order() {
        let mut buf = PendingBuffer::new();
        assert_eq!(buf.push(r(2, 0), true, Decimal::ONE, at(100), at(0)).unwrap(), 0);
        assert_eq!(buf.push(r(1, 0), false, Decimal::TWO, at(100), at(0)).unwrap(), 1);
        let order: Vec<_> = buf.entries().iter().map(|e| e.commitment).collect();
        assert_eq!(order, vec![r(2, 0), r(1, 0)]);
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn duplicate_push_rejected() {
        let mut buf = PendingBuffer::new();
        buf.push(r(1, 0), true, Decimal::ONE, at(100), at(0)).unwrap();
        let err = buf
            .push(r(1, 0), true, Decimal::ONE, at(100), at(0))
            .unwrap_err();
        assert!(matches!(err, GridsettleError::AlreadyBuffered(_)));
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn remove_then_readmit_gets_new_sequence() {
        let mut buf = PendingBuffer::new();
        buf.push(r(1, 0), true, Decimal::ONE, at(100), at(0)).unwrap();
        buf.push(r(1, 1), true, Decimal::ONE, at(100), at(0)).unwrap();
        assert!(buf.remove(r(1, 0)).is_some());
        assert!(buf.remove(r(1, 0)).is_none());
        assert!(!buf.contains(r(1, 0)));
        let seq = buf.push(r(1, 0), true, Decimal::ONE, at(100), at(0)).unwrap();
        assert_eq!(seq, 2);
        assert_eq!(buf.entries()[0].commitment, r(1, 1));
    }

    #[test]
    fn drain_expired_splits_by_window() {
        let mut buf = PendingBuffer::new();
        buf.push(r(1, 0), true, Decimal::ONE, at(50), at(0)).unwrap();
        buf.push(r(1, 1), false, Decimal::ONE, at(200), at(0)).unwrap();
        buf.push(r(1, 2), true, Decimal::ONE, at(100), at(0)).unwrap();

        assert_eq!(buf.live(at(100)).count(), 1);
        let expired = buf.drain_expired(at(100));
        let refs: Vec<_> = expired.iter().map(|e| e.commitment).collect();
        assert_eq!(refs, vec![r(1, 0), r(1, 2)]);
        assert_eq!(buf.len(), 1);
        assert!(buf.contains(r(1, 1)));
        assert!(!buf.contains(r(1, 2)));
    }

    #[test]
    fn set_remaining_requires_entry() {
        let mut buf = PendingBuffer::new();
        buf.push(r(1, 0), true, Decimal::TEN, at(100), at(0)).unwrap();
        buf.set_remaining(r(1, 0), Decimal::ONE).unwrap();
        assert_eq!(buf.get(r(1, 0)).unwrap().remaining, Decimal::ONE);
        assert!(matches!(
            buf.set_remaining(r(9, 0), Decimal::ONE),
            Err(GridsettleError::NotBuffered(_))
        ));
    }

    #[test]
    fn restore_sorts_and_rejects_duplicates() {
        let mut buf = PendingBuffer::new();
        buf.push(r(1, 0), true, Decimal::ONE, at(100), at(0)).unwrap();
        buf.push(r(2, 0), false, Decimal::ONE, at(100), at(0)).unwrap();
        let mut entries = buf.entries().to_vec();
        entries.reverse();

        let restored = PendingBuffer::restore(entries.clone(), 0).unwrap();
        assert_eq!(restored.entries(), buf.entries());
        assert_eq!(restored.next_sequence(), 2);

        entries.push(entries[0].clone());
        assert!(PendingBuffer::restore(entries, 2).is_err());
    }
}
