//! UTXO tracking, coin selection, and transaction building.
//!
//! The flow for every build: callers describe targets in an
//! [`AssetAmountDestination`], coin selection walks the [`UtxoSet`]
//! draining those targets into inputs and outputs, and a builder wires the
//! result into the right transaction body with everything canonically
//! sorted, ready for signing.

pub mod assets;
pub mod builders;
pub mod error;
pub mod persistence;
pub mod spend;
pub mod utxo;
pub mod utxo_set;

pub use assets::{AssetAmount, AssetAmountDestination};
pub use error::WalletError;
pub use persistence::{KeyValueStore, MemoryStore, PersistenceOptions};
pub use spend::min_spendable;
pub use utxo::Utxo;
pub use utxo_set::{MergeRule, UtxoSet};
