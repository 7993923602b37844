use proptest::prelude::*;

use avax_transactions::{
    BaseTx, Input, Output, SecpTransferInput, SigIdx, TransferableInput, TransferableOutput,
    UnsignedTx,
};
use avax_types::{Address, AssetId, ChainId, OutputOwners, TxId};

fn owners(tag: u8, locktime: u64) -> OutputOwners {
    OutputOwners::new(locktime, 1, vec![Address::new([tag; 20])]).unwrap()
}

fn base_tx(
    amounts_out: &[(u8, u64)],
    amounts_in: &[(u8, u64)],
    memo: Vec<u8>,
) -> UnsignedTx {
    let asset = AssetId::new([1; 32]);
    let outs = amounts_out
        .iter()
        .map(|(tag, amount)| {
            TransferableOutput::new(asset, Output::new_secp_transfer(*amount, owners(*tag, 0)))
        })
        .collect();
    let ins = amounts_in
        .iter()
        .enumerate()
        .map(|(i, (tag, amount))| {
            TransferableInput::new(
                TxId::new([i as u8 + 1; 32]),
                *tag as u32,
                asset,
                Input::SecpTransfer(SecpTransferInput::new(
                    *amount,
                    vec![SigIdx::new(0, Address::new([*tag; 20]))],
                )),
            )
        })
        .collect();
    UnsignedTx::Base(BaseTx::new(1, ChainId::new([7; 32]), outs, ins, memo).unwrap())
}

proptest! {
    /// decode(encode(tx)) re-encodes to identical bytes.
    #[test]
    fn unsigned_tx_bytes_roundtrip(
        outs in proptest::collection::vec((0u8..50, 1u64..1_000_000), 0..6),
        ins in proptest::collection::vec((0u8..50, 1u64..1_000_000), 0..6),
        memo in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        let tx = base_tx(&outs, &ins, memo);
        let bytes = tx.to_bytes();
        let decoded = UnsignedTx::from_bytes(&bytes).unwrap();
        prop_assert_eq!(decoded.to_bytes(), bytes);
    }

    /// Serialized bytes are independent of the order outputs and inputs
    /// were handed to the builder.
    #[test]
    fn bytes_independent_of_insertion_order(
        outs in proptest::collection::vec((0u8..50, 1u64..1_000_000), 1..6),
        ins in proptest::collection::vec((0u8..50, 1u64..1_000_000), 1..6),
    ) {
        let forward = base_tx(&outs, &ins, vec![]);
        let rev_outs: Vec<_> = outs.iter().rev().copied().collect();
        let reversed = {
            // Inputs must keep their (txid, index) identities; only the
            // output list order varies here.
            base_tx(&rev_outs, &ins, vec![])
        };
        prop_assert_eq!(forward.to_bytes(), reversed.to_bytes());
    }

    /// Truncating canonical bytes anywhere never panics, and dropping
    /// trailing bytes fails decoding.
    #[test]
    fn truncation_is_detected(
        cut in 1usize..50,
        outs in proptest::collection::vec((0u8..50, 1u64..1_000), 1..3),
    ) {
        let bytes = base_tx(&outs, &[(0, 5)], vec![]).to_bytes();
        let cut = cut.min(bytes.len() - 1);
        let truncated = &bytes[..bytes.len() - cut];
        prop_assert!(UnsignedTx::from_bytes(truncated).is_err());
    }

    /// The transaction digest commits to every byte.
    #[test]
    fn digest_changes_with_any_flip(
        outs in proptest::collection::vec((0u8..50, 1u64..1_000_000), 1..4),
        flip in any::<usize>(),
    ) {
        let tx = base_tx(&outs, &[(0, 5)], vec![]);
        let bytes = tx.to_bytes();
        let mut mutated = bytes.clone();
        let at = flip % mutated.len();
        mutated[at] ^= 0x01;
        if let Ok(other) = UnsignedTx::from_bytes(&mutated) {
            prop_assert_ne!(other.digest(), tx.digest());
        }
    }
}
