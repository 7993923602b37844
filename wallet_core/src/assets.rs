//! Per-asset spend accumulators and the selection state.

use avax_transactions::{TransferableInput, TransferableOutput};
use avax_types::{Address, AssetId};

/// Targets and progress for one asset during coin selection.
///
/// Incoming value fills the `amount` target first, overflows into the
/// `burn` target, and anything beyond both accumulates as change.
#[derive(Clone, Debug)]
pub struct AssetAmount {
    asset_id: AssetId,
    amount: u64,
    burn: u64,
    spent: u64,
    burned: u64,
    change: u64,
}

impl AssetAmount {
    pub fn new(asset_id: AssetId, amount: u64, burn: u64) -> Self {
        Self {
            asset_id,
            amount,
            burn,
            spent: 0,
            burned: 0,
            change: 0,
        }
    }

    pub fn asset_id(&self) -> AssetId {
        self.asset_id
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn burn(&self) -> u64 {
        self.burn
    }

    pub fn spent(&self) -> u64 {
        self.spent
    }

    pub fn burned(&self) -> u64 {
        self.burned
    }

    pub fn change(&self) -> u64 {
        self.change
    }

    /// Apply `incoming` value: amount target first, then burn, then change.
    pub fn spend(&mut self, incoming: u64) {
        let to_amount = incoming.min(self.amount - self.spent);
        self.spent += to_amount;
        let rest = incoming - to_amount;

        let to_burn = rest.min(self.burn - self.burned);
        self.burned += to_burn;
        self.change += rest - to_burn;
    }

    /// Both targets fully funded.
    pub fn satisfied(&self) -> bool {
        self.spent >= self.amount && self.burned >= self.burn
    }

    /// Unfunded remainder across both targets.
    pub fn shortfall(&self) -> u64 {
        (self.amount - self.spent) + (self.burn - self.burned)
    }
}

/// The in-progress selection state: per-asset accumulators plus the
/// inputs and outputs assembled so far.
///
/// `senders` prove spendability on inputs, `destinations` receive paid
/// outputs, and `change_addresses` receive the remainder.
#[derive(Clone, Debug)]
pub struct AssetAmountDestination {
    destinations: Vec<Address>,
    senders: Vec<Address>,
    change_addresses: Vec<Address>,
    /// Insertion order is preserved so output order is caller-controlled
    /// until the final canonical sort.
    amounts: Vec<AssetAmount>,
    pub ins: Vec<TransferableInput>,
    pub outs: Vec<TransferableOutput>,
    pub change_outs: Vec<TransferableOutput>,
    pub stake_outs: Vec<TransferableOutput>,
}

impl AssetAmountDestination {
    pub fn new(
        destinations: Vec<Address>,
        senders: Vec<Address>,
        change_addresses: Vec<Address>,
    ) -> Self {
        Self {
            destinations,
            senders,
            change_addresses,
            amounts: Vec::new(),
            ins: Vec::new(),
            outs: Vec::new(),
            change_outs: Vec::new(),
            stake_outs: Vec::new(),
        }
    }

    pub fn destinations(&self) -> &[Address] {
        &self.destinations
    }

    pub fn senders(&self) -> &[Address] {
        &self.senders
    }

    pub fn change_addresses(&self) -> &[Address] {
        &self.change_addresses
    }

    /// Register a target for an asset. A second registration for the same
    /// asset folds into the existing entry.
    pub fn add_asset_amount(&mut self, asset_id: AssetId, amount: u64, burn: u64) {
        if let Some(existing) = self.amounts.iter_mut().find(|a| a.asset_id == asset_id) {
            existing.amount += amount;
            existing.burn += burn;
            return;
        }
        self.amounts.push(AssetAmount::new(asset_id, amount, burn));
    }

    pub fn asset_amounts(&self) -> &[AssetAmount] {
        &self.amounts
    }

    pub fn asset_amount_mut(&mut self, asset_id: &AssetId) -> Option<&mut AssetAmount> {
        self.amounts.iter_mut().find(|a| a.asset_id == *asset_id)
    }

    /// Whether the asset is registered and still unfunded.
    pub fn needs(&self, asset_id: &AssetId) -> bool {
        self.amounts
            .iter()
            .any(|a| a.asset_id == *asset_id && !a.satisfied())
    }

    /// Every registered asset has met its amount and burn targets.
    pub fn can_complete(&self) -> bool {
        self.amounts.iter().all(|a| a.satisfied())
    }

    /// The first asset that still needs funding, if any.
    pub fn first_unsatisfied(&self) -> Option<&AssetAmount> {
        self.amounts.iter().find(|a| !a.satisfied())
    }
}
