//! Coin selection: drain an [`AssetAmountDestination`] against a UTXO set.

use tracing::{debug, trace};

use avax_transactions::{
    Input, Output, SecpTransferInput, SigIdx, TransferableInput, TransferableOutput,
};
use avax_types::OutputOwners;

use crate::assets::AssetAmountDestination;
use crate::error::WalletError;
use crate::utxo_set::UtxoSet;

/// Walk the set in its iteration order, consuming spendable amount-bearing
/// UTXOs until every registered asset meets its amount and burn targets,
/// then mint destination and change outputs.
///
/// Destination outputs carry `(locktime, threshold, destinations)`; change
/// outputs always carry `(0, 1, change addresses)`. When `to_stake` is set
/// the destination outputs land in `stake_outs` instead of `outs`.
///
/// UTXOs whose output is not amount-bearing are skipped silently, as are
/// outputs still locked at `as_of` or not spendable by the senders.
pub fn min_spendable(
    set: &UtxoSet,
    aad: &mut AssetAmountDestination,
    as_of: u64,
    locktime: u64,
    threshold: u32,
    to_stake: bool,
) -> Result<(), WalletError> {
    let senders = aad.senders().to_vec();
    for utxo in set.iter() {
        if aad.can_complete() {
            break;
        }
        if !aad.needs(&utxo.asset_id) {
            continue;
        }
        let Output::SecpTransfer(ref out) = utxo.output else {
            trace!(utxo = %utxo.tx_id, "skipping non-amount output");
            continue;
        };
        if !out.owners.meets_threshold(&senders, as_of) {
            continue;
        }

        let spenders = out.owners.spenders(&senders, as_of);
        let mut sig_idxs = Vec::with_capacity(spenders.len());
        for (index, address) in spenders {
            if out.owners.address_index(&address) != Some(index) {
                return Err(WalletError::SpenderMismatch);
            }
            sig_idxs.push(SigIdx::new(index, address));
        }

        if let Some(asset_amount) = aad.asset_amount_mut(&utxo.asset_id) {
            asset_amount.spend(out.amount);
        }
        aad.ins.push(TransferableInput::new(
            utxo.tx_id,
            utxo.output_index,
            utxo.asset_id,
            Input::SecpTransfer(SecpTransferInput::new(out.amount, sig_idxs)),
        ));
    }

    if !aad.can_complete() {
        let (asset, shortfall) = aad
            .first_unsatisfied()
            .map(|a| (a.asset_id().to_string(), a.shortfall()))
            .unwrap_or((String::new(), 0));
        return Err(WalletError::InsufficientFunds { asset, shortfall });
    }

    debug!(
        inputs = aad.ins.len(),
        assets = aad.asset_amounts().len(),
        "selection complete"
    );

    let destinations = aad.destinations().to_vec();
    let change_addresses = aad.change_addresses().to_vec();
    for asset_amount in aad.asset_amounts().to_vec() {
        if asset_amount.amount() > 0 {
            let owners = OutputOwners::new(locktime, threshold, destinations.clone())?;
            let out = TransferableOutput::new(
                asset_amount.asset_id(),
                Output::new_secp_transfer(asset_amount.amount(), owners),
            );
            if to_stake {
                aad.stake_outs.push(out);
            } else {
                aad.outs.push(out);
            }
        }
        if asset_amount.change() > 0 {
            let owners = OutputOwners::new(0, 1, change_addresses.clone())?;
            aad.change_outs.push(TransferableOutput::new(
                asset_amount.asset_id(),
                Output::new_secp_transfer(asset_amount.change(), owners),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utxo::Utxo;
    use avax_transactions::{Codec, SecpMintOutput};
    use avax_types::{Address, AssetId, TxId};

    fn addr(tag: u8) -> Address {
        Address::new([tag; 20])
    }

    fn asset(tag: u8) -> AssetId {
        AssetId::new([tag; 32])
    }

    fn transfer_utxo(txid: u8, amount: u64, asset_tag: u8, owner: u8) -> Utxo {
        let owners = OutputOwners::new(0, 1, vec![addr(owner)]).unwrap();
        Utxo::new(
            TxId::new([txid; 32]),
            0,
            asset(asset_tag),
            Output::new_secp_transfer(amount, owners),
        )
    }

    fn aad_for(amount: u64, burn: u64) -> AssetAmountDestination {
        let mut aad =
            AssetAmountDestination::new(vec![addr(0xD0)], vec![addr(1)], vec![addr(0xC0)]);
        aad.add_asset_amount(asset(1), amount, burn);
        aad
    }

    #[test]
    fn exact_cover_has_no_change() {
        // Two UTXOs of 600 and 500; target 1000 with fee 100.
        let mut set = UtxoSet::new(Codec::Avm);
        set.add(transfer_utxo(1, 600, 1, 1), false);
        set.add(transfer_utxo(2, 500, 1, 1), false);

        let mut aad = aad_for(1_000, 100);
        min_spendable(&set, &mut aad, 1, 0, 1, false).unwrap();

        assert_eq!(aad.ins.len(), 2);
        assert_eq!(aad.outs.len(), 1);
        assert_eq!(aad.outs[0].output.amount(), Some(1_000));
        assert!(aad.change_outs.is_empty());
        for input in &aad.ins {
            let indices: Vec<u32> = input.input.sig_idxs().iter().map(|s| s.index).collect();
            assert_eq!(indices, vec![0]);
        }
    }

    #[test]
    fn overflow_becomes_change() {
        let mut set = UtxoSet::new(Codec::Avm);
        set.add(transfer_utxo(1, 2_000, 1, 1), false);

        let mut aad = aad_for(1_000, 100);
        min_spendable(&set, &mut aad, 1, 0, 1, false).unwrap();

        assert_eq!(aad.outs[0].output.amount(), Some(1_000));
        assert_eq!(aad.change_outs.len(), 1);
        assert_eq!(aad.change_outs[0].output.amount(), Some(900));
        // Change owners are always (0, 1, change addresses).
        let change_owners = aad.change_outs[0].output.owners();
        assert_eq!(change_owners.locktime(), 0);
        assert_eq!(change_owners.threshold(), 1);
        assert_eq!(change_owners.addresses(), &[addr(0xC0)]);
    }

    #[test]
    fn insufficient_funds_reports_shortfall() {
        let mut set = UtxoSet::new(Codec::Avm);
        set.add(transfer_utxo(1, 500, 1, 1), false);

        let mut aad = aad_for(1_000, 100);
        let err = min_spendable(&set, &mut aad, 1, 0, 1, false).unwrap_err();
        match err {
            WalletError::InsufficientFunds { shortfall, .. } => assert_eq!(shortfall, 600),
            other => panic!("expected InsufficientFunds, got {other}"),
        }
    }

    #[test]
    fn locked_utxos_are_never_selected() {
        let mut set = UtxoSet::new(Codec::Avm);
        let owners = OutputOwners::new(100, 1, vec![addr(1)]).unwrap();
        set.add(
            Utxo::new(
                TxId::new([1; 32]),
                0,
                asset(1),
                Output::new_secp_transfer(5_000, owners),
            ),
            false,
        );

        let mut aad = aad_for(1_000, 0);
        // as_of == locktime is still locked.
        assert!(min_spendable(&set, &mut aad, 100, 0, 1, false).is_err());

        let mut aad = aad_for(1_000, 0);
        min_spendable(&set, &mut aad, 101, 0, 1, false).unwrap();
        assert_eq!(aad.ins.len(), 1);
    }

    #[test]
    fn mint_outputs_are_skipped_for_amount_targets() {
        let mut set = UtxoSet::new(Codec::Avm);
        let owners = OutputOwners::new(0, 1, vec![addr(1)]).unwrap();
        set.add(
            Utxo::new(
                TxId::new([1; 32]),
                0,
                asset(1),
                Output::SecpMint(SecpMintOutput { owners }),
            ),
            false,
        );
        set.add(transfer_utxo(2, 1_000, 1, 1), false);

        let mut aad = aad_for(1_000, 0);
        min_spendable(&set, &mut aad, 1, 0, 1, false).unwrap();
        // Only the transfer UTXO is consumed; the mint output is skipped.
        assert_eq!(aad.ins.len(), 1);
        assert_eq!(aad.ins[0].tx_id, TxId::new([2; 32]));
    }

    #[test]
    fn two_asset_selection_covers_fee_asset_separately() {
        let mut set = UtxoSet::new(Codec::Avm);
        set.add(transfer_utxo(1, 50, 1, 1), false);
        set.add(transfer_utxo(2, 10, 2, 1), false);

        let mut aad =
            AssetAmountDestination::new(vec![addr(0xD0)], vec![addr(1)], vec![addr(0xC0)]);
        aad.add_asset_amount(asset(1), 50, 0);
        aad.add_asset_amount(asset(2), 0, 10);
        min_spendable(&set, &mut aad, 1, 0, 1, false).unwrap();

        assert_eq!(aad.ins.len(), 2);
        // The fee asset burns fully: no output for it.
        assert_eq!(aad.outs.len(), 1);
        assert_eq!(aad.outs[0].asset_id, asset(1));
        assert!(aad.change_outs.is_empty());
    }

    #[test]
    fn stake_flag_routes_destination_outputs() {
        let mut set = UtxoSet::new(Codec::Platform);
        set.add(transfer_utxo(1, 3_000, 1, 1), false);

        let mut aad = aad_for(2_000, 0);
        min_spendable(&set, &mut aad, 1, 0, 1, true).unwrap();
        assert!(aad.outs.is_empty());
        assert_eq!(aad.stake_outs.len(), 1);
        assert_eq!(aad.stake_outs[0].output.amount(), Some(2_000));
        assert_eq!(aad.change_outs[0].output.amount(), Some(1_000));
    }

    #[test]
    fn multisig_selection_respects_threshold_and_order() {
        let mut set = UtxoSet::new(Codec::Avm);
        let owners =
            OutputOwners::new(0, 2, vec![addr(1), addr(2), addr(3)]).unwrap();
        set.add(
            Utxo::new(
                TxId::new([1; 32]),
                0,
                asset(1),
                Output::new_secp_transfer(1_000, owners),
            ),
            false,
        );

        // Senders hold keys 3 and 1; spender order follows the owner list.
        let mut aad =
            AssetAmountDestination::new(vec![addr(0xD0)], vec![addr(3), addr(1)], vec![addr(0xC0)]);
        aad.add_asset_amount(asset(1), 1_000, 0);
        min_spendable(&set, &mut aad, 1, 0, 1, false).unwrap();

        let sig_idxs = aad.ins[0].input.sig_idxs();
        let indices: Vec<u32> = sig_idxs.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(sig_idxs[0].address, Some(addr(1)));
        assert_eq!(sig_idxs[1].address, Some(addr(3)));
    }

    #[test]
    fn sender_below_threshold_cannot_spend() {
        let mut set = UtxoSet::new(Codec::Avm);
        let owners = OutputOwners::new(0, 2, vec![addr(1), addr(2)]).unwrap();
        set.add(
            Utxo::new(
                TxId::new([1; 32]),
                0,
                asset(1),
                Output::new_secp_transfer(1_000, owners),
            ),
            false,
        );

        let mut aad =
            AssetAmountDestination::new(vec![addr(0xD0)], vec![addr(1)], vec![addr(0xC0)]);
        aad.add_asset_amount(asset(1), 100, 0);
        assert!(matches!(
            min_spendable(&set, &mut aad, 1, 0, 1, false),
            Err(WalletError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn selection_stops_once_complete() {
        let mut set = UtxoSet::new(Codec::Avm);
        set.add(transfer_utxo(1, 1_000, 1, 1), false);
        set.add(transfer_utxo(2, 1_000, 1, 1), false);
        set.add(transfer_utxo(3, 1_000, 1, 1), false);

        let mut aad = aad_for(900, 0);
        min_spendable(&set, &mut aad, 1, 0, 1, false).unwrap();
        assert_eq!(aad.ins.len(), 1);
    }
}
