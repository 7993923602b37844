//! Output owner sets: locktime, threshold, and sorted unique addresses.
//!
//! Every spendable output carries one of these. The serialized form is
//! `locktime(8) ‖ threshold(4) ‖ count(4) ‖ addresses`, with addresses in
//! raw-byte-ascending order. An output is locked while `as_of <= locktime`.

use std::fmt;

use crate::address::Address;
use crate::bytes::{ByteReader, ByteWriter};
use crate::error::CodecError;

/// The owner set of a spendable output.
#[derive(Clone, PartialEq, Eq)]
pub struct OutputOwners {
    locktime: u64,
    threshold: u32,
    /// Ascending, no duplicates.
    addresses: Vec<Address>,
}

impl OutputOwners {
    /// Build an owner set. Addresses are sorted and de-duplicated; the
    /// threshold must not exceed the resulting address count.
    pub fn new(
        locktime: u64,
        threshold: u32,
        mut addresses: Vec<Address>,
    ) -> Result<Self, CodecError> {
        addresses.sort_unstable();
        addresses.dedup();
        if threshold as usize > addresses.len() {
            return Err(CodecError::InvalidThreshold {
                threshold,
                addresses: addresses.len(),
            });
        }
        Ok(Self {
            locktime,
            threshold,
            addresses,
        })
    }

    pub fn locktime(&self) -> u64 {
        self.locktime
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Position of `address` in the owner list.
    pub fn address_index(&self, address: &Address) -> Option<u32> {
        self.addresses
            .iter()
            .position(|a| a == address)
            .map(|i| i as u32)
    }

    /// Whether the output is still locked at `as_of`.
    pub fn is_locked(&self, as_of: u64) -> bool {
        as_of <= self.locktime
    }

    /// Select the spenders among `candidates` at time `as_of`.
    ///
    /// Walks the owner list in stored order, collecting owners that appear
    /// in `candidates`, and stops once `threshold` matches are found. The
    /// walk order makes the returned indices ascending. Returns empty while
    /// the output is locked.
    pub fn spenders(&self, candidates: &[Address], as_of: u64) -> Vec<(u32, Address)> {
        if self.is_locked(as_of) {
            return Vec::new();
        }
        let mut selected = Vec::new();
        for (idx, addr) in self.addresses.iter().enumerate() {
            if selected.len() >= self.threshold as usize {
                break;
            }
            if candidates.contains(addr) {
                selected.push((idx as u32, *addr));
            }
        }
        selected
    }

    /// Whether `candidates` can produce `threshold` signatures at `as_of`.
    pub fn meets_threshold(&self, candidates: &[Address], as_of: u64) -> bool {
        !self.is_locked(as_of) && self.spenders(candidates, as_of).len() >= self.threshold as usize
    }

    pub fn encode(&self, w: &mut ByteWriter) {
        w.put_u64(self.locktime);
        w.put_u32(self.threshold);
        w.put_u32(self.addresses.len() as u32);
        for addr in &self.addresses {
            w.put_bytes(addr.as_bytes());
        }
    }

    pub fn decode(r: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        let locktime = r.read_u64()?;
        let threshold = r.read_u32()?;
        let count = r.read_u32()? as usize;
        let mut addresses = Vec::with_capacity(count);
        for _ in 0..count {
            addresses.push(Address::new(r.read_fixed()?));
        }
        // Canonical input is already sorted; re-sorting keeps decode total.
        Self::new(locktime, threshold, addresses)
    }
}

impl fmt::Debug for OutputOwners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputOwners")
            .field("locktime", &self.locktime)
            .field("threshold", &self.threshold)
            .field("addresses", &self.addresses.len())
            .finish()
    }
}
