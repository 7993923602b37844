//! JSON-RPC client and the chain-flavored facades.
//!
//! [`AvmApi`] and [`PlatformApi`] pair the wallet builders with a node:
//! they resolve the fee asset, fetch UTXOs, run the goose-egg sanity check
//! on every built transaction, and submit signed transactions. The HTTP
//! transport sits behind [`JsonRpcClient`] so tests inject a mock.

pub mod avm;
pub mod client;
pub mod error;
pub mod platform;

pub use avm::AvmApi;
pub use client::{HttpClient, JsonRpcClient};
pub use error::RpcError;
pub use platform::PlatformApi;

use avax_transactions::UnsignedTx;
use avax_types::network::{chain_params, ONE_AVAX};
use avax_types::{AssetId, ChainId};

/// Resolve a chain alias to its blockchain id within a network. The
/// platform chain's id is the all-zero id on every network.
pub fn chain_id_for_alias(network_id: u32, alias: &str) -> Result<ChainId, RpcError> {
    if alias == "P" {
        return Ok(ChainId::PLATFORM);
    }
    let chain = chain_params(network_id, alias).ok_or_else(|| {
        RpcError::State(format!("no chain {alias} configured for network {network_id}"))
    })?;
    Ok(chain.blockchain_id.parse()?)
}

/// Reject transactions whose fee is implausibly large: the fee must be at
/// most ten whole coins, or no larger than the total value the
/// transaction pays out.
pub fn check_goose_egg(tx: &UnsignedTx, avax_asset_id: &AssetId) -> Result<(), RpcError> {
    let fee = tx.burned(avax_asset_id);
    let output_total = tx.output_total(avax_asset_id);
    if fee <= 10 * ONE_AVAX as u128 || fee <= output_total {
        Ok(())
    } else {
        Err(RpcError::GooseEgg { fee })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avax_transactions::{
        BaseTx, Input, Output, SecpTransferInput, SigIdx, TransferableInput, TransferableOutput,
    };
    use avax_types::{Address, ChainId, OutputOwners, TxId};

    fn tx_with(inputs: u64, outputs: u64) -> (UnsignedTx, AssetId) {
        let asset = AssetId::new([1; 32]);
        let owners = OutputOwners::new(0, 1, vec![Address::new([1; 20])]).unwrap();
        let outs = if outputs > 0 {
            vec![TransferableOutput::new(
                asset,
                Output::new_secp_transfer(outputs, owners),
            )]
        } else {
            vec![]
        };
        let ins = vec![TransferableInput::new(
            TxId::new([1; 32]),
            0,
            asset,
            Input::SecpTransfer(SecpTransferInput::new(
                inputs,
                vec![SigIdx::new(0, Address::new([1; 20]))],
            )),
        )];
        let base = BaseTx::new(1, ChainId::new([0; 32]), outs, ins, vec![]).unwrap();
        (UnsignedTx::Base(base), asset)
    }

    #[test]
    fn small_fee_passes() {
        let (tx, asset) = tx_with(1_000_000, 900_000);
        assert!(check_goose_egg(&tx, &asset).is_ok());
    }

    #[test]
    fn large_fee_with_larger_outputs_passes() {
        // fee = 11 AVAX but outputs dwarf it.
        let eleven = 11 * ONE_AVAX;
        let (tx, asset) = tx_with(100 * ONE_AVAX + eleven, 100 * ONE_AVAX);
        assert!(check_goose_egg(&tx, &asset).is_ok());
    }

    #[test]
    fn absurd_fee_rejected() {
        // Outputs total 1, fee is 11 AVAX.
        let (tx, asset) = tx_with(11 * ONE_AVAX + 1, 1);
        assert!(matches!(
            check_goose_egg(&tx, &asset),
            Err(RpcError::GooseEgg { .. })
        ));
    }

    #[test]
    fn exactly_ten_avax_fee_passes() {
        let (tx, asset) = tx_with(10 * ONE_AVAX + 1, 1);
        assert!(check_goose_egg(&tx, &asset).is_ok());
    }
}
