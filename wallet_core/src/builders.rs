//! Transaction building helpers.
//!
//! One builder per transaction kind. Each wires an
//! [`AssetAmountDestination`] through coin selection, attaches the
//! kind-specific payload, and returns an [`UnsignedTx`] with inputs,
//! outputs, and operations in canonical order, ready for signing.
//!
//! Builders are all-or-nothing: any validation or selection failure
//! discards the partial build.

use std::collections::BTreeMap;

use avax_transactions::{
    AddDelegatorTx, AddSubnetValidatorTx, AddValidatorTx, BaseTx, Codec, CreateAssetTx, ExportTx,
    ImportTx, InitialState, Input, NftMintOp, NftTransferOp, Operation, OperationTx, Output,
    SecpInput, SecpMintOp, SecpTransferInput, SecpTransferOutput, SigIdx, TransferableInput,
    TransferableOperation, TransferableOutput, UnsignedTx, Validator,
};
use avax_transactions::create_asset::NFT_FX_ID;
use avax_types::network::{
    MAX_DELEGATION_SHARES, MAX_STAKE_DURATION_SECS, MIN_STAKE_DURATION_SECS,
};
use avax_types::{Address, AssetId, ChainId, NodeId, OutputOwners};

use crate::assets::AssetAmountDestination;
use crate::error::WalletError;
use crate::spend::min_spendable;
use crate::utxo::Utxo;
use crate::utxo_set::UtxoSet;

/// Build a standard multi-asset transfer.
///
/// Returns `Ok(None)` when `amount` is zero — there is nothing to send.
#[allow(clippy::too_many_arguments)]
pub fn build_base_tx(
    set: &UtxoSet,
    network_id: u32,
    blockchain_id: ChainId,
    amount: u64,
    asset_id: AssetId,
    to: &[Address],
    from: &[Address],
    change: &[Address],
    fee: u64,
    fee_asset_id: AssetId,
    memo: Vec<u8>,
    as_of: u64,
    locktime: u64,
    threshold: u32,
) -> Result<Option<UnsignedTx>, WalletError> {
    if amount == 0 {
        return Ok(None);
    }
    let mut aad =
        AssetAmountDestination::new(to.to_vec(), from.to_vec(), change.to_vec());
    if asset_id == fee_asset_id {
        aad.add_asset_amount(asset_id, amount, fee);
    } else {
        aad.add_asset_amount(asset_id, amount, 0);
        if fee > 0 {
            aad.add_asset_amount(fee_asset_id, 0, fee);
        }
    }
    min_spendable(set, &mut aad, as_of, locktime, threshold, false)?;

    let mut outs = aad.outs;
    outs.extend(aad.change_outs);
    let base = BaseTx::new(network_id, blockchain_id, outs, aad.ins, memo)?;
    Ok(Some(UnsignedTx::Base(base)))
}

/// Build a fungible-asset creation transaction.
#[allow(clippy::too_many_arguments)]
pub fn build_create_asset_tx(
    set: &UtxoSet,
    network_id: u32,
    blockchain_id: ChainId,
    from: &[Address],
    change: &[Address],
    name: String,
    symbol: String,
    denomination: u8,
    initial_states: Vec<InitialState>,
    fee: u64,
    fee_asset_id: AssetId,
    memo: Vec<u8>,
    as_of: u64,
) -> Result<UnsignedTx, WalletError> {
    let (ins, outs) = burn_fee(set, from, change, fee, fee_asset_id, as_of)?;
    let base = BaseTx::new(network_id, blockchain_id, outs, ins, memo)?;
    let tx = CreateAssetTx::new(base, name, symbol, denomination, initial_states)?;
    Ok(UnsignedTx::CreateAsset(tx))
}

/// Build an NFT-family creation transaction. Each minter set becomes an
/// NFT mint output whose group id is its position in the list.
#[allow(clippy::too_many_arguments)]
pub fn build_create_nft_asset_tx(
    set: &UtxoSet,
    network_id: u32,
    blockchain_id: ChainId,
    from: &[Address],
    change: &[Address],
    name: String,
    symbol: String,
    minter_sets: Vec<OutputOwners>,
    fee: u64,
    fee_asset_id: AssetId,
    memo: Vec<u8>,
    as_of: u64,
) -> Result<UnsignedTx, WalletError> {
    if minter_sets.is_empty() {
        return Err(WalletError::InvalidInput(
            "an NFT asset needs at least one minter set".into(),
        ));
    }
    let outputs = minter_sets
        .into_iter()
        .enumerate()
        .map(|(group_id, owners)| {
            Output::NftMint(avax_transactions::NftMintOutput {
                group_id: group_id as u32,
                owners,
            })
        })
        .collect();
    let initial_states = vec![InitialState::new(NFT_FX_ID, outputs)];

    let (ins, outs) = burn_fee(set, from, change, fee, fee_asset_id, as_of)?;
    let base = BaseTx::new(network_id, blockchain_id, outs, ins, memo)?;
    // NFTs are indivisible: denomination is always zero.
    let tx = CreateAssetTx::new(base, name, symbol, 0, initial_states)?;
    Ok(UnsignedTx::CreateAsset(tx))
}

/// Build an operation transaction minting further supply of a fungible
/// asset against one of its mint-authority UTXOs. The authority output is
/// reproduced so it can be used again.
#[allow(clippy::too_many_arguments)]
pub fn build_secp_mint_tx(
    set: &UtxoSet,
    network_id: u32,
    blockchain_id: ChainId,
    mint_utxo: &Utxo,
    amount: u64,
    to: &[Address],
    from: &[Address],
    change: &[Address],
    fee: u64,
    fee_asset_id: AssetId,
    memo: Vec<u8>,
    as_of: u64,
) -> Result<UnsignedTx, WalletError> {
    let Output::SecpMint(ref mint_out) = mint_utxo.output else {
        return Err(WalletError::InvalidInput(
            "UTXO does not hold a mint output".into(),
        ));
    };
    if amount == 0 {
        return Err(WalletError::InvalidInput("mint amount must be positive".into()));
    }
    let input = operation_input(&mint_out.owners, from, as_of)?;
    let op = Operation::SecpMint(SecpMintOp {
        input,
        mint_output: mint_out.clone(),
        transfer_output: SecpTransferOutput {
            amount,
            owners: OutputOwners::new(0, 1, to.to_vec())?,
        },
    });
    let ops = vec![TransferableOperation::new(
        mint_utxo.asset_id,
        vec![mint_utxo.utxo_id()],
        op,
    )];

    let (ins, outs) = burn_fee(set, from, change, fee, fee_asset_id, as_of)?;
    let base = BaseTx::new(network_id, blockchain_id, outs, ins, memo)?;
    Ok(UnsignedTx::Operation(OperationTx::new(base, ops)))
}

/// Build an operation transaction minting NFTs in a group.
#[allow(clippy::too_many_arguments)]
pub fn build_nft_mint_tx(
    set: &UtxoSet,
    network_id: u32,
    blockchain_id: ChainId,
    mint_utxo: &Utxo,
    payload: Vec<u8>,
    owners: Vec<OutputOwners>,
    from: &[Address],
    change: &[Address],
    fee: u64,
    fee_asset_id: AssetId,
    memo: Vec<u8>,
    as_of: u64,
) -> Result<UnsignedTx, WalletError> {
    let Output::NftMint(ref mint_out) = mint_utxo.output else {
        return Err(WalletError::InvalidInput(
            "UTXO does not hold an NFT mint output".into(),
        ));
    };
    if owners.is_empty() {
        return Err(WalletError::InvalidInput(
            "minting an NFT needs at least one owner set".into(),
        ));
    }
    let input = operation_input(&mint_out.owners, from, as_of)?;
    let op = Operation::NftMint(NftMintOp {
        input,
        group_id: mint_out.group_id,
        payload,
        outputs: owners,
    });
    let ops = vec![TransferableOperation::new(
        mint_utxo.asset_id,
        vec![mint_utxo.utxo_id()],
        op,
    )];

    let (ins, outs) = burn_fee(set, from, change, fee, fee_asset_id, as_of)?;
    let base = BaseTx::new(network_id, blockchain_id, outs, ins, memo)?;
    Ok(UnsignedTx::Operation(OperationTx::new(base, ops)))
}

/// Build an operation transaction transferring an NFT to new owners. The
/// group id and payload travel unchanged.
#[allow(clippy::too_many_arguments)]
pub fn build_nft_transfer_tx(
    set: &UtxoSet,
    network_id: u32,
    blockchain_id: ChainId,
    nft_utxo: &Utxo,
    to: &[Address],
    from: &[Address],
    change: &[Address],
    fee: u64,
    fee_asset_id: AssetId,
    memo: Vec<u8>,
    as_of: u64,
    locktime: u64,
    threshold: u32,
) -> Result<UnsignedTx, WalletError> {
    let Output::NftTransfer(ref nft_out) = nft_utxo.output else {
        return Err(WalletError::InvalidInput(
            "UTXO does not hold an NFT transfer output".into(),
        ));
    };
    let input = operation_input(&nft_out.owners, from, as_of)?;
    let op = Operation::NftTransfer(NftTransferOp {
        input,
        output: avax_transactions::NftTransferOutput {
            group_id: nft_out.group_id,
            payload: nft_out.payload.clone(),
            owners: OutputOwners::new(locktime, threshold, to.to_vec())?,
        },
    });
    let ops = vec![TransferableOperation::new(
        nft_utxo.asset_id,
        vec![nft_utxo.utxo_id()],
        op,
    )];

    let (ins, outs) = burn_fee(set, from, change, fee, fee_asset_id, as_of)?;
    let base = BaseTx::new(network_id, blockchain_id, outs, ins, memo)?;
    Ok(UnsignedTx::Operation(OperationTx::new(base, ops)))
}

/// Build an import consuming UTXOs another chain exported to these owners.
///
/// The fee comes out of the imported value where possible; any remainder
/// is selected from the local set.
#[allow(clippy::too_many_arguments)]
pub fn build_import_tx(
    set: &UtxoSet,
    network_id: u32,
    blockchain_id: ChainId,
    atomics: &[Utxo],
    source_chain: ChainId,
    to: &[Address],
    from: &[Address],
    change: &[Address],
    fee: u64,
    fee_asset_id: AssetId,
    memo: Vec<u8>,
    as_of: u64,
    locktime: u64,
    threshold: u32,
) -> Result<UnsignedTx, WalletError> {
    let mut import_ins = Vec::new();
    let mut totals: BTreeMap<AssetId, u64> = BTreeMap::new();
    for utxo in atomics {
        let Output::SecpTransfer(ref out) = utxo.output else {
            continue;
        };
        if !out.owners.meets_threshold(from, as_of) {
            continue;
        }
        let sig_idxs = spender_sig_idxs(&out.owners, from, as_of)?;
        import_ins.push(TransferableInput::new(
            utxo.tx_id,
            utxo.output_index,
            utxo.asset_id,
            Input::SecpTransfer(SecpTransferInput::new(out.amount, sig_idxs)),
        ));
        *totals.entry(utxo.asset_id).or_default() += out.amount;
    }
    if import_ins.is_empty() {
        return Err(WalletError::InvalidInput(
            "no importable UTXOs for the given owners".into(),
        ));
    }

    let mut outs = Vec::new();
    let mut fee_remaining = fee;
    for (asset_id, total) in totals {
        let mut amount = total;
        if asset_id == fee_asset_id && fee_remaining > 0 {
            let paid = amount.min(fee_remaining);
            amount -= paid;
            fee_remaining -= paid;
        }
        if amount > 0 {
            let owners = OutputOwners::new(locktime, threshold, to.to_vec())?;
            outs.push(TransferableOutput::new(
                asset_id,
                Output::new_secp_transfer(amount, owners),
            ));
        }
    }

    let mut base_ins = Vec::new();
    if fee_remaining > 0 {
        let mut aad =
            AssetAmountDestination::new(to.to_vec(), from.to_vec(), change.to_vec());
        aad.add_asset_amount(fee_asset_id, 0, fee_remaining);
        min_spendable(set, &mut aad, as_of, locktime, threshold, false)?;
        base_ins = aad.ins;
        outs.extend(aad.change_outs);
    }

    let base = BaseTx::new(network_id, blockchain_id, outs, base_ins, memo)?;
    let tx = ImportTx::new(base, source_chain, import_ins);
    Ok(match set.codec() {
        Codec::Avm => UnsignedTx::AvmImport(tx),
        Codec::Platform => UnsignedTx::PlatformImport(tx),
    })
}

/// Build an export locking value into the atomic memory for another chain.
///
/// The exported asset must be the fee asset, on both chains.
#[allow(clippy::too_many_arguments)]
pub fn build_export_tx(
    set: &UtxoSet,
    network_id: u32,
    blockchain_id: ChainId,
    amount: u64,
    asset_id: AssetId,
    fee_asset_id: AssetId,
    destination_chain: ChainId,
    to: &[Address],
    from: &[Address],
    change: &[Address],
    fee: u64,
    memo: Vec<u8>,
    as_of: u64,
    locktime: u64,
    threshold: u32,
) -> Result<UnsignedTx, WalletError> {
    if asset_id != fee_asset_id {
        return Err(WalletError::InvalidInput(
            "exported asset must equal the fee asset".into(),
        ));
    }
    if amount == 0 {
        return Err(WalletError::InvalidInput("export amount must be positive".into()));
    }
    let mut aad =
        AssetAmountDestination::new(to.to_vec(), from.to_vec(), change.to_vec());
    aad.add_asset_amount(asset_id, amount, fee);
    min_spendable(set, &mut aad, as_of, locktime, threshold, false)?;

    let base = BaseTx::new(network_id, blockchain_id, aad.change_outs, aad.ins, memo)?;
    let tx = ExportTx::new(base, destination_chain, aad.outs);
    Ok(match set.codec() {
        Codec::Avm => UnsignedTx::AvmExport(tx),
        Codec::Platform => UnsignedTx::PlatformExport(tx),
    })
}

/// Build an add-validator transaction staking on the primary network.
///
/// `delegation_fee_percent` is the share of delegator rewards kept by this
/// validator, in percent with four decimals of precision.
#[allow(clippy::too_many_arguments)]
pub fn build_add_validator_tx(
    set: &UtxoSet,
    network_id: u32,
    avax_asset_id: AssetId,
    to: &[Address],
    from: &[Address],
    change: &[Address],
    node_id: NodeId,
    start_time: u64,
    end_time: u64,
    stake_amount: u64,
    min_stake: u64,
    reward_addresses: &[Address],
    delegation_fee_percent: f64,
    memo: Vec<u8>,
    as_of: u64,
) -> Result<UnsignedTx, WalletError> {
    validate_stake_window(start_time, end_time, as_of)?;
    if stake_amount < min_stake {
        return Err(WalletError::InvalidInput(format!(
            "stake {stake_amount} is below the minimum {min_stake}"
        )));
    }
    let shares = delegation_shares(delegation_fee_percent)?;

    let (ins, change_outs, stake_outs) =
        select_stake(set, avax_asset_id, stake_amount, to, from, change, as_of)?;
    let base = BaseTx::new(network_id, ChainId::PLATFORM, change_outs, ins, memo)?;
    let tx = AddValidatorTx::new(
        base,
        Validator {
            node_id,
            start_time,
            end_time,
            weight: stake_amount,
        },
        stake_outs,
        OutputOwners::new(0, 1, reward_addresses.to_vec())?,
        shares,
    );
    Ok(UnsignedTx::AddValidator(tx))
}

/// Build an add-delegator transaction staking behind a validator.
#[allow(clippy::too_many_arguments)]
pub fn build_add_delegator_tx(
    set: &UtxoSet,
    network_id: u32,
    avax_asset_id: AssetId,
    to: &[Address],
    from: &[Address],
    change: &[Address],
    node_id: NodeId,
    start_time: u64,
    end_time: u64,
    stake_amount: u64,
    min_stake: u64,
    reward_addresses: &[Address],
    memo: Vec<u8>,
    as_of: u64,
) -> Result<UnsignedTx, WalletError> {
    validate_stake_window(start_time, end_time, as_of)?;
    if stake_amount < min_stake {
        return Err(WalletError::InvalidInput(format!(
            "stake {stake_amount} is below the minimum {min_stake}"
        )));
    }

    let (ins, change_outs, stake_outs) =
        select_stake(set, avax_asset_id, stake_amount, to, from, change, as_of)?;
    let base = BaseTx::new(network_id, ChainId::PLATFORM, change_outs, ins, memo)?;
    let tx = AddDelegatorTx::new(
        base,
        Validator {
            node_id,
            start_time,
            end_time,
            weight: stake_amount,
        },
        stake_outs,
        OutputOwners::new(0, 1, reward_addresses.to_vec())?,
    );
    Ok(UnsignedTx::AddDelegator(tx))
}

/// Build an add-subnet-validator transaction. The subnet auth indices must
/// index the subnet's owner set and carry their signer addresses.
#[allow(clippy::too_many_arguments)]
pub fn build_add_subnet_validator_tx(
    set: &UtxoSet,
    network_id: u32,
    node_id: NodeId,
    start_time: u64,
    end_time: u64,
    weight: u64,
    subnet_id: ChainId,
    subnet_auth: Vec<SigIdx>,
    from: &[Address],
    change: &[Address],
    fee: u64,
    fee_asset_id: AssetId,
    memo: Vec<u8>,
    as_of: u64,
) -> Result<UnsignedTx, WalletError> {
    validate_stake_window(start_time, end_time, as_of)?;
    if weight == 0 {
        return Err(WalletError::InvalidInput("weight must be positive".into()));
    }

    let (ins, outs) = burn_fee(set, from, change, fee, fee_asset_id, as_of)?;
    let base = BaseTx::new(network_id, ChainId::PLATFORM, outs, ins, memo)?;
    let tx = AddSubnetValidatorTx {
        base,
        validator: Validator {
            node_id,
            start_time,
            end_time,
            weight,
        },
        subnet_id,
        subnet_auth: SecpInput::new(subnet_auth),
    };
    Ok(UnsignedTx::AddSubnetValidator(tx))
}

/// Select inputs to cover only a fee, returning `(ins, change outs)`.
fn burn_fee(
    set: &UtxoSet,
    from: &[Address],
    change: &[Address],
    fee: u64,
    fee_asset_id: AssetId,
    as_of: u64,
) -> Result<(Vec<TransferableInput>, Vec<TransferableOutput>), WalletError> {
    if fee == 0 {
        return Ok((Vec::new(), Vec::new()));
    }
    let mut aad =
        AssetAmountDestination::new(from.to_vec(), from.to_vec(), change.to_vec());
    aad.add_asset_amount(fee_asset_id, 0, fee);
    min_spendable(set, &mut aad, as_of, 0, 1, false)?;
    let mut outs = aad.outs;
    outs.extend(aad.change_outs);
    Ok((aad.ins, outs))
}

/// Select inputs to cover a stake plus zero fee, returning
/// `(ins, change outs, stake outs)`.
fn select_stake(
    set: &UtxoSet,
    avax_asset_id: AssetId,
    stake_amount: u64,
    to: &[Address],
    from: &[Address],
    change: &[Address],
    as_of: u64,
) -> Result<
    (
        Vec<TransferableInput>,
        Vec<TransferableOutput>,
        Vec<TransferableOutput>,
    ),
    WalletError,
> {
    let mut aad =
        AssetAmountDestination::new(to.to_vec(), from.to_vec(), change.to_vec());
    aad.add_asset_amount(avax_asset_id, stake_amount, 0);
    min_spendable(set, &mut aad, as_of, 0, 1, true)?;
    Ok((aad.ins, aad.change_outs, aad.stake_outs))
}

/// Signature slots for spending `owners` with the given candidate
/// addresses, failing when the threshold cannot be met.
fn operation_input(
    owners: &OutputOwners,
    from: &[Address],
    as_of: u64,
) -> Result<SecpInput, WalletError> {
    if !owners.meets_threshold(from, as_of) {
        return Err(WalletError::InvalidInput(
            "owners cannot satisfy the output threshold".into(),
        ));
    }
    Ok(SecpInput::new(spender_sig_idxs(owners, from, as_of)?))
}

fn spender_sig_idxs(
    owners: &OutputOwners,
    from: &[Address],
    as_of: u64,
) -> Result<Vec<SigIdx>, WalletError> {
    let mut sig_idxs = Vec::new();
    for (index, address) in owners.spenders(from, as_of) {
        if owners.address_index(&address) != Some(index) {
            return Err(WalletError::SpenderMismatch);
        }
        sig_idxs.push(SigIdx::new(index, address));
    }
    Ok(sig_idxs)
}

fn validate_stake_window(start_time: u64, end_time: u64, as_of: u64) -> Result<(), WalletError> {
    if start_time <= as_of {
        return Err(WalletError::InvalidInput(
            "staking start time must be in the future".into(),
        ));
    }
    if end_time <= start_time {
        return Err(WalletError::InvalidInput(
            "staking end time must be after the start time".into(),
        ));
    }
    let duration = end_time - start_time;
    if !(MIN_STAKE_DURATION_SECS..=MAX_STAKE_DURATION_SECS).contains(&duration) {
        return Err(WalletError::InvalidInput(format!(
            "staking duration {duration}s is outside \
             [{MIN_STAKE_DURATION_SECS}, {MAX_STAKE_DURATION_SECS}]"
        )));
    }
    Ok(())
}

/// Convert a percentage with four decimals of precision into shares out
/// of [`MAX_DELEGATION_SHARES`].
fn delegation_shares(percent: f64) -> Result<u32, WalletError> {
    if !(0.0..=100.0).contains(&percent) {
        return Err(WalletError::InvalidInput(format!(
            "delegation fee {percent} is outside [0, 100]"
        )));
    }
    let shares = (percent * 10_000.0).round() as u32;
    Ok(shares.min(MAX_DELEGATION_SHARES))
}
