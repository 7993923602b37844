//! An indexed collection of UTXOs.
//!
//! The primary map is keyed by UTXO id and is the source of truth; asset
//! and address indices are advisory accelerators. Iteration follows UTXO-id
//! order, which keeps coin selection deterministic across insertion orders.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use avax_transactions::{Codec, UtxoId};
use avax_types::{Address, AssetId};

use crate::error::WalletError;
use crate::utxo::Utxo;

/// Set-algebra rules for [`UtxoSet::merge_by_rule`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeRule {
    /// Everything from both sets.
    Union,
    /// UTXOs present in both sets.
    Intersection,
    /// UTXOs in `self` that the other set lacks.
    DifferenceSelf,
    /// UTXOs in exactly one of the two sets.
    SymDifference,
    /// The union minus the other set's members — `self − other`.
    UnionMinusNew,
    /// The union minus this set's members — `other − self`.
    UnionMinusSelf,
}

/// An indexed UTXO collection bound to one chain's codec.
#[derive(Clone, Debug)]
pub struct UtxoSet {
    codec: Codec,
    utxos: BTreeMap<UtxoId, Utxo>,
    asset_index: HashMap<AssetId, BTreeSet<UtxoId>>,
    address_index: HashMap<Address, BTreeSet<UtxoId>>,
}

impl UtxoSet {
    pub fn new(codec: Codec) -> Self {
        Self {
            codec,
            utxos: BTreeMap::new(),
            asset_index: HashMap::new(),
            address_index: HashMap::new(),
        }
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// Insert a UTXO. An existing entry under the same id is replaced only
    /// when `overwrite` is set. Returns whether the set changed.
    pub fn add(&mut self, utxo: Utxo, overwrite: bool) -> bool {
        let id = utxo.utxo_id();
        if self.utxos.contains_key(&id) && !overwrite {
            return false;
        }
        if let Some(old) = self.utxos.remove(&id) {
            self.unindex(&id, &old);
        }
        self.index(&id, &utxo);
        self.utxos.insert(id, utxo);
        true
    }

    /// Bulk insert. Returns how many entries changed the set.
    pub fn add_array(&mut self, utxos: Vec<Utxo>, overwrite: bool) -> usize {
        utxos
            .into_iter()
            .filter(|u| self.add(u.clone(), overwrite))
            .count()
    }

    pub fn remove(&mut self, id: &UtxoId) -> Option<Utxo> {
        let utxo = self.utxos.remove(id)?;
        self.unindex(id, &utxo);
        Some(utxo)
    }

    pub fn get(&self, id: &UtxoId) -> Option<&Utxo> {
        self.utxos.get(id)
    }

    pub fn contains(&self, id: &UtxoId) -> bool {
        self.utxos.contains_key(id)
    }

    /// All UTXOs in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Utxo> {
        self.utxos.values()
    }

    pub fn all_utxos(&self) -> Vec<Utxo> {
        self.utxos.values().cloned().collect()
    }

    /// UTXO ids, optionally restricted to outputs owned by any of `addresses`.
    pub fn utxo_ids(&self, addresses: Option<&[Address]>) -> Vec<UtxoId> {
        match addresses {
            None => self.utxos.keys().copied().collect(),
            Some(addrs) => {
                let mut ids = BTreeSet::new();
                for addr in addrs {
                    if let Some(owned) = self.address_index.get(addr) {
                        ids.extend(owned.iter().copied());
                    }
                }
                ids.into_iter().collect()
            }
        }
    }

    /// Asset ids present in the set.
    pub fn assets(&self) -> Vec<AssetId> {
        let mut assets: Vec<AssetId> = self.asset_index.keys().copied().collect();
        assets.sort_unstable();
        assets
    }

    /// Total spendable amount of one asset held by `addresses` at `as_of`.
    pub fn balance(&self, addresses: &[Address], asset_id: &AssetId, as_of: u64) -> u128 {
        self.iter()
            .filter(|u| u.asset_id == *asset_id)
            .filter_map(|u| {
                let amount = u.output.amount()?;
                u.output
                    .owners()
                    .meets_threshold(addresses, as_of)
                    .then_some(amount as u128)
            })
            .sum()
    }

    /// Parse a cb58 UTXO string with this set's codec. Always returns a
    /// fresh copy, never a reference into the set.
    pub fn parse_utxo(&self, s: &str) -> Result<Utxo, WalletError> {
        Ok(Utxo::from_cb58(s, self.codec)?)
    }

    /// Combine with another set under a merge rule, producing a new set.
    pub fn merge_by_rule(&self, other: &UtxoSet, rule: MergeRule) -> UtxoSet {
        let mut merged = UtxoSet::new(self.codec);
        let in_other = |id: &UtxoId| other.contains(id);
        let in_self = |id: &UtxoId| self.contains(id);

        match rule {
            MergeRule::Union => {
                for utxo in self.iter().chain(other.iter()) {
                    merged.add(utxo.clone(), true);
                }
            }
            MergeRule::Intersection => {
                for utxo in self.iter().filter(|u| in_other(&u.utxo_id())) {
                    merged.add(utxo.clone(), true);
                }
            }
            MergeRule::DifferenceSelf | MergeRule::UnionMinusNew => {
                for utxo in self.iter().filter(|u| !in_other(&u.utxo_id())) {
                    merged.add(utxo.clone(), true);
                }
            }
            MergeRule::SymDifference => {
                for utxo in self.iter().filter(|u| !in_other(&u.utxo_id())) {
                    merged.add(utxo.clone(), true);
                }
                for utxo in other.iter().filter(|u| !in_self(&u.utxo_id())) {
                    merged.add(utxo.clone(), true);
                }
            }
            MergeRule::UnionMinusSelf => {
                for utxo in other.iter().filter(|u| !in_self(&u.utxo_id())) {
                    merged.add(utxo.clone(), true);
                }
            }
        }
        merged
    }

    fn index(&mut self, id: &UtxoId, utxo: &Utxo) {
        self.asset_index
            .entry(utxo.asset_id)
            .or_default()
            .insert(*id);
        for addr in utxo.output.owners().addresses() {
            self.address_index.entry(*addr).or_default().insert(*id);
        }
    }

    fn unindex(&mut self, id: &UtxoId, utxo: &Utxo) {
        if let Some(ids) = self.asset_index.get_mut(&utxo.asset_id) {
            ids.remove(id);
            if ids.is_empty() {
                self.asset_index.remove(&utxo.asset_id);
            }
        }
        for addr in utxo.output.owners().addresses() {
            if let Some(ids) = self.address_index.get_mut(addr) {
                ids.remove(id);
                if ids.is_empty() {
                    self.address_index.remove(addr);
                }
            }
        }
    }
}

/// Flat persisted form: the chain name plus cb58 UTXO strings.
#[derive(Serialize, Deserialize)]
struct StoredUtxoSet {
    chain: String,
    utxos: Vec<String>,
}

impl UtxoSet {
    /// Serialize for a key-value store.
    pub fn to_json(&self) -> String {
        let stored = StoredUtxoSet {
            chain: match self.codec {
                Codec::Avm => "avm".into(),
                Codec::Platform => "platform".into(),
            },
            utxos: self.iter().map(|u| u.to_cb58()).collect(),
        };
        // The stored form contains only strings; serialization cannot fail.
        serde_json::to_string(&stored).unwrap_or_default()
    }

    /// Restore a persisted set.
    pub fn from_json(json: &str) -> Result<Self, WalletError> {
        let stored: StoredUtxoSet =
            serde_json::from_str(json).map_err(|e| WalletError::Persistence(e.to_string()))?;
        let codec = match stored.chain.as_str() {
            "avm" => Codec::Avm,
            "platform" => Codec::Platform,
            other => {
                return Err(WalletError::Persistence(format!("unknown chain {other}")));
            }
        };
        let mut set = UtxoSet::new(codec);
        for s in &stored.utxos {
            let utxo = set.parse_utxo(s)?;
            set.add(utxo, true);
        }
        Ok(set)
    }
}
