//! The unsigned transaction envelope and the signing pipeline.
//!
//! An unsigned transaction serializes as `codecVersion(2) ‖ typeID(4) ‖
//! body`. Signing hashes those bytes with SHA-256 and produces one
//! credential per input, using the signature indices (and their signer
//! addresses) recorded when the inputs were selected. Because the indices
//! travel with the inputs, the mapping survives any sorting done before
//! the digest is taken.

use sha2::{Digest, Sha256};

use avax_keychain::KeyChain;
use avax_types::{AssetId, ByteReader, ByteWriter, CodecError};

use crate::base::BaseTx;
use crate::codec::{avm, platform, unknown, Codec, CODEC_VERSION};
use crate::create_asset::CreateAssetTx;
use crate::credential::Credential;
use crate::cross_chain::{ExportTx, ImportTx};
use crate::error::TxError;
use crate::input::SigIdx;
use crate::op::OperationTx;
use crate::staking::{AddDelegatorTx, AddSubnetValidatorTx, AddValidatorTx};
use crate::tx::Tx;

/// One credential to be produced, with the slots it must cover.
enum CredSlot<'a> {
    Secp(&'a [SigIdx]),
    Nft(&'a [SigIdx]),
}

/// An unsigned transaction of any kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnsignedTx {
    Base(BaseTx),
    CreateAsset(CreateAssetTx),
    Operation(OperationTx),
    AvmImport(ImportTx),
    AvmExport(ExportTx),
    PlatformImport(ImportTx),
    PlatformExport(ExportTx),
    AddValidator(AddValidatorTx),
    AddDelegator(AddDelegatorTx),
    AddSubnetValidator(AddSubnetValidatorTx),
}

impl UnsignedTx {
    /// The chain codec governing this transaction's tagged payloads.
    pub fn codec(&self) -> Codec {
        match self {
            Self::Base(_)
            | Self::CreateAsset(_)
            | Self::Operation(_)
            | Self::AvmImport(_)
            | Self::AvmExport(_) => Codec::Avm,
            Self::PlatformImport(_)
            | Self::PlatformExport(_)
            | Self::AddValidator(_)
            | Self::AddDelegator(_)
            | Self::AddSubnetValidator(_) => Codec::Platform,
        }
    }

    pub fn type_id(&self) -> u32 {
        match self {
            Self::Base(_) => avm::BASE_TX,
            Self::CreateAsset(_) => avm::CREATE_ASSET_TX,
            Self::Operation(_) => avm::OPERATION_TX,
            Self::AvmImport(_) => avm::IMPORT_TX,
            Self::AvmExport(_) => avm::EXPORT_TX,
            Self::PlatformImport(_) => platform::IMPORT_TX,
            Self::PlatformExport(_) => platform::EXPORT_TX,
            Self::AddValidator(_) => platform::ADD_VALIDATOR_TX,
            Self::AddDelegator(_) => platform::ADD_DELEGATOR_TX,
            Self::AddSubnetValidator(_) => platform::ADD_SUBNET_VALIDATOR_TX,
        }
    }

    pub fn base(&self) -> &BaseTx {
        match self {
            Self::Base(tx) => tx,
            Self::CreateAsset(tx) => &tx.base,
            Self::Operation(tx) => &tx.base,
            Self::AvmImport(tx) | Self::PlatformImport(tx) => &tx.base,
            Self::AvmExport(tx) | Self::PlatformExport(tx) => &tx.base,
            Self::AddValidator(tx) => &tx.base,
            Self::AddDelegator(tx) => &tx.base,
            Self::AddSubnetValidator(tx) => &tx.base,
        }
    }

    /// Sum of all inputs of one asset, imported inputs included.
    pub fn input_total(&self, asset_id: &AssetId) -> u128 {
        let mut total = self.base().input_total(asset_id);
        if let Self::AvmImport(tx) | Self::PlatformImport(tx) = self {
            total += tx
                .import_ins
                .iter()
                .filter(|i| i.asset_id == *asset_id)
                .map(|i| i.input.amount() as u128)
                .sum::<u128>();
        }
        total
    }

    /// Sum of all outputs of one asset, exported and staked outputs included.
    pub fn output_total(&self, asset_id: &AssetId) -> u128 {
        let mut total = self.base().output_total(asset_id);
        let extra: &[crate::output::TransferableOutput] = match self {
            Self::AvmExport(tx) | Self::PlatformExport(tx) => &tx.exported_outs,
            Self::AddValidator(tx) => &tx.stake_outs,
            Self::AddDelegator(tx) => &tx.stake_outs,
            _ => &[],
        };
        total += extra
            .iter()
            .filter(|o| o.asset_id == *asset_id)
            .filter_map(|o| o.output.amount())
            .map(|a| a as u128)
            .sum::<u128>();
        total
    }

    /// Inputs minus outputs for one asset — the amount the transaction burns.
    pub fn burned(&self, asset_id: &AssetId) -> u128 {
        self.input_total(asset_id)
            .saturating_sub(self.output_total(asset_id))
    }

    /// Canonical bytes: `codecVersion(2) ‖ typeID(4) ‖ body`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::with_capacity(512);
        w.put_u16(CODEC_VERSION);
        w.put_u32(self.type_id());
        match self {
            Self::Base(tx) => tx.encode(&mut w),
            Self::CreateAsset(tx) => tx.encode(&mut w),
            Self::Operation(tx) => tx.encode(&mut w),
            Self::AvmImport(tx) | Self::PlatformImport(tx) => tx.encode(&mut w),
            Self::AvmExport(tx) | Self::PlatformExport(tx) => tx.encode(&mut w),
            Self::AddValidator(tx) => tx.encode(&mut w),
            Self::AddDelegator(tx) => tx.encode(&mut w),
            Self::AddSubnetValidator(tx) => tx.encode(&mut w),
        }
        w.into_bytes()
    }

    /// Decode from canonical bytes, dispatching on the type id.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut r = ByteReader::new(bytes);
        let decoded = Self::decode(&mut r)?;
        r.expect_done()?;
        Ok(decoded)
    }

    pub(crate) fn decode(r: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        let version = r.read_u16()?;
        if version != CODEC_VERSION {
            return Err(CodecError::UnsupportedCodec(version));
        }
        let type_id = r.read_u32()?;
        match type_id {
            avm::BASE_TX => Ok(Self::Base(BaseTx::decode(r, Codec::Avm)?)),
            avm::CREATE_ASSET_TX => Ok(Self::CreateAsset(CreateAssetTx::decode(r, Codec::Avm)?)),
            avm::OPERATION_TX => Ok(Self::Operation(OperationTx::decode(r, Codec::Avm)?)),
            avm::IMPORT_TX => Ok(Self::AvmImport(ImportTx::decode(r, Codec::Avm)?)),
            avm::EXPORT_TX => Ok(Self::AvmExport(ExportTx::decode(r, Codec::Avm)?)),
            platform::IMPORT_TX => {
                Ok(Self::PlatformImport(ImportTx::decode(r, Codec::Platform)?))
            }
            platform::EXPORT_TX => {
                Ok(Self::PlatformExport(ExportTx::decode(r, Codec::Platform)?))
            }
            platform::ADD_VALIDATOR_TX => {
                Ok(Self::AddValidator(AddValidatorTx::decode(r, Codec::Platform)?))
            }
            platform::ADD_DELEGATOR_TX => {
                Ok(Self::AddDelegator(AddDelegatorTx::decode(r, Codec::Platform)?))
            }
            platform::ADD_SUBNET_VALIDATOR_TX => Ok(Self::AddSubnetValidator(
                AddSubnetValidatorTx::decode(r, Codec::Platform)?,
            )),
            other => Err(unknown(other)),
        }
    }

    /// The credentials this transaction needs, in order: base inputs first,
    /// then the kind's extra slots (imported inputs, operations, or the
    /// subnet auth).
    fn credential_slots(&self) -> Vec<CredSlot<'_>> {
        let mut slots: Vec<CredSlot<'_>> = self
            .base()
            .ins
            .iter()
            .map(|i| CredSlot::Secp(i.input.sig_idxs()))
            .collect();
        match self {
            Self::AvmImport(tx) | Self::PlatformImport(tx) => {
                slots.extend(
                    tx.import_ins
                        .iter()
                        .map(|i| CredSlot::Secp(i.input.sig_idxs())),
                );
            }
            Self::Operation(tx) => {
                slots.extend(tx.ops.iter().map(|op| {
                    let sig_idxs = &op.op.input().sig_idxs;
                    if op.op.is_nft() {
                        CredSlot::Nft(sig_idxs)
                    } else {
                        CredSlot::Secp(sig_idxs)
                    }
                }));
            }
            Self::AddSubnetValidator(tx) => {
                slots.push(CredSlot::Secp(&tx.subnet_auth.sig_idxs));
            }
            _ => {}
        }
        slots
    }

    /// Number of credentials a signed form of this transaction carries.
    pub fn credential_count(&self) -> usize {
        self.credential_slots().len()
    }

    /// SHA-256 over the canonical bytes.
    pub fn digest(&self) -> [u8; 32] {
        let hash = Sha256::digest(self.to_bytes());
        let mut out = [0u8; 32];
        out.copy_from_slice(&hash);
        out
    }

    /// Sign every input, producing a transaction ready for submission.
    ///
    /// Visits credential slots in input order; within a slot, signatures
    /// follow the ascending signature-index order recorded at selection
    /// time.
    pub fn sign(self, keychain: &impl KeyChain) -> Result<Tx, TxError> {
        let digest = self.digest();
        let mut credentials = Vec::with_capacity(self.credential_count());
        for slot in self.credential_slots() {
            let (sig_idxs, nft) = match slot {
                CredSlot::Secp(s) => (s, false),
                CredSlot::Nft(s) => (s, true),
            };
            let mut sigs = Vec::with_capacity(sig_idxs.len());
            for sig_idx in sig_idxs {
                let address = sig_idx.address.ok_or_else(|| {
                    TxError::State("input carries no signer address; was it parsed from bytes?".into())
                })?;
                sigs.push(keychain.sign(&address, &digest)?);
            }
            credentials.push(if nft {
                Credential::Nft(sigs)
            } else {
                Credential::Secp(sigs)
            });
        }
        Ok(Tx::new(self, credentials))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Input, SecpTransferInput, TransferableInput};
    use crate::output::{Output, TransferableOutput};
    use avax_keychain::SecpKeyChain;
    use avax_types::{Address, ChainId, OutputOwners, TxId};

    fn keychain_with_addr() -> (SecpKeyChain, Address) {
        let mut kc = SecpKeyChain::new();
        let pair = avax_keychain::KeyPair::from_secret_bytes(&[0x11; 32]).unwrap();
        let addr = kc.import_key(&pair.private_key_string()).unwrap();
        (kc, addr)
    }

    fn transfer_tx(addr: Address, amounts: &[u64]) -> UnsignedTx {
        let asset = AssetId::new([1; 32]);
        let owners = OutputOwners::new(0, 1, vec![addr]).unwrap();
        let ins: Vec<TransferableInput> = amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| {
                TransferableInput::new(
                    TxId::new([i as u8 + 1; 32]),
                    0,
                    asset,
                    Input::SecpTransfer(SecpTransferInput::new(
                        *amount,
                        vec![SigIdx::new(0, addr)],
                    )),
                )
            })
            .collect();
        let total: u64 = amounts.iter().sum();
        let outs = vec![TransferableOutput::new(
            asset,
            Output::new_secp_transfer(total - 100, owners),
        )];
        UnsignedTx::Base(BaseTx::new(1, ChainId::new([0xEE; 32]), outs, ins, vec![]).unwrap())
    }

    #[test]
    fn bytes_start_with_codec_and_type() {
        let (_, addr) = keychain_with_addr();
        let bytes = transfer_tx(addr, &[500]).to_bytes();
        assert_eq!(&bytes[..2], &[0, 0]); // codec version 0
        assert_eq!(&bytes[2..6], &[0, 0, 0, 0]); // base tx type id
    }

    #[test]
    fn from_bytes_roundtrips_canonical_form() {
        let (_, addr) = keychain_with_addr();
        let tx = transfer_tx(addr, &[600, 500]);
        let bytes = tx.to_bytes();
        let decoded = UnsignedTx::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.to_bytes(), bytes);
    }

    #[test]
    fn unsupported_codec_version_rejected() {
        let (_, addr) = keychain_with_addr();
        let mut bytes = transfer_tx(addr, &[500]).to_bytes();
        bytes[1] = 9;
        assert_eq!(
            UnsignedTx::from_bytes(&bytes).unwrap_err(),
            CodecError::UnsupportedCodec(9)
        );
    }

    #[test]
    fn unknown_type_id_rejected() {
        let mut w = ByteWriter::new();
        w.put_u16(CODEC_VERSION);
        w.put_u32(55);
        assert_eq!(
            UnsignedTx::from_bytes(&w.into_bytes()).unwrap_err(),
            CodecError::UnknownTypeId(55)
        );
    }

    #[test]
    fn burned_is_inputs_minus_outputs() {
        let (_, addr) = keychain_with_addr();
        let tx = transfer_tx(addr, &[600, 500]);
        let asset = AssetId::new([1; 32]);
        assert_eq!(tx.input_total(&asset), 1100);
        assert_eq!(tx.output_total(&asset), 1000);
        assert_eq!(tx.burned(&asset), 100);
    }

    #[test]
    fn sign_produces_one_credential_per_input() {
        let (kc, addr) = keychain_with_addr();
        let tx = transfer_tx(addr, &[600, 500]);
        assert_eq!(tx.credential_count(), 2);
        let signed = tx.sign(&kc).unwrap();
        assert_eq!(signed.credentials.len(), 2);
        assert_eq!(signed.credentials[0].signatures().len(), 1);
    }

    #[test]
    fn signing_is_deterministic_over_bytes() {
        let (kc, addr) = keychain_with_addr();
        let a = transfer_tx(addr, &[600, 500]).sign(&kc).unwrap();
        let b = transfer_tx(addr, &[600, 500]).sign(&kc).unwrap();
        assert_eq!(a.to_bytes(), b.to_bytes());
    }

    #[test]
    fn sign_fails_without_key() {
        let (kc, _) = keychain_with_addr();
        let stranger = Address::new([0xDD; 20]);
        let tx = transfer_tx(stranger, &[500]);
        assert!(matches!(tx.sign(&kc), Err(TxError::Keychain(_))));
    }

    #[test]
    fn sign_fails_on_parsed_inputs() {
        let (kc, addr) = keychain_with_addr();
        let parsed = UnsignedTx::from_bytes(&transfer_tx(addr, &[500]).to_bytes()).unwrap();
        assert!(matches!(parsed.sign(&kc), Err(TxError::State(_))));
    }
}
