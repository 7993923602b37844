//! P-chain staking transactions.

use avax_types::{ByteReader, ByteWriter, ChainId, CodecError, NodeId, OutputOwners};

use crate::base::BaseTx;
use crate::codec::{platform, unknown, Codec};
use crate::input::SecpInput;
use crate::output::{sort_transferable_outputs, TransferableOutput};

/// A validator description: `nodeID(20) ‖ start(8) ‖ end(8) ‖ weight(8)`.
///
/// For primary-network validators and delegators the weight is the stake
/// amount in nanoAVAX; for subnet validators it is the sampling weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Validator {
    pub node_id: NodeId,
    pub start_time: u64,
    pub end_time: u64,
    pub weight: u64,
}

impl Validator {
    pub fn encode(&self, w: &mut ByteWriter) {
        w.put_bytes(self.node_id.as_bytes());
        w.put_u64(self.start_time);
        w.put_u64(self.end_time);
        w.put_u64(self.weight);
    }

    pub fn decode(r: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            node_id: NodeId::new(r.read_fixed()?),
            start_time: r.read_u64()?,
            end_time: r.read_u64()?,
            weight: r.read_u64()?,
        })
    }
}

/// Write a reward-owner set with its standalone type tag.
fn encode_rewards_owner(owners: &OutputOwners, w: &mut ByteWriter) {
    w.put_u32(platform::SECP_OWNER_OUTPUT);
    owners.encode(w);
}

fn decode_rewards_owner(r: &mut ByteReader<'_>) -> Result<OutputOwners, CodecError> {
    let tag = r.read_u32()?;
    if tag != platform::SECP_OWNER_OUTPUT {
        return Err(unknown(tag));
    }
    OutputOwners::decode(r)
}

/// Add a primary-network validator:
/// `base ‖ validator ‖ stake outs ‖ rewards owner ‖ shares(4)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddValidatorTx {
    pub base: BaseTx,
    pub validator: Validator,
    pub stake_outs: Vec<TransferableOutput>,
    pub rewards_owner: OutputOwners,
    /// Delegation-fee shares out of 1_000_000.
    pub shares: u32,
}

impl AddValidatorTx {
    pub fn new(
        base: BaseTx,
        validator: Validator,
        mut stake_outs: Vec<TransferableOutput>,
        rewards_owner: OutputOwners,
        shares: u32,
    ) -> Self {
        sort_transferable_outputs(&mut stake_outs);
        Self {
            base,
            validator,
            stake_outs,
            rewards_owner,
            shares,
        }
    }

    pub fn encode(&self, w: &mut ByteWriter) {
        self.base.encode(w);
        self.validator.encode(w);
        w.put_u32(self.stake_outs.len() as u32);
        for out in &self.stake_outs {
            out.encode(w);
        }
        encode_rewards_owner(&self.rewards_owner, w);
        w.put_u32(self.shares);
    }

    pub fn decode(r: &mut ByteReader<'_>, codec: Codec) -> Result<Self, CodecError> {
        let base = BaseTx::decode(r, codec)?;
        let validator = Validator::decode(r)?;
        let count = r.read_u32()? as usize;
        let mut stake_outs = Vec::with_capacity(count);
        for _ in 0..count {
            stake_outs.push(TransferableOutput::decode(r, codec)?);
        }
        let rewards_owner = decode_rewards_owner(r)?;
        let shares = r.read_u32()?;
        Ok(Self {
            base,
            validator,
            stake_outs,
            rewards_owner,
            shares,
        })
    }
}

/// Delegate stake to an existing validator:
/// `base ‖ validator ‖ stake outs ‖ rewards owner`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddDelegatorTx {
    pub base: BaseTx,
    pub validator: Validator,
    pub stake_outs: Vec<TransferableOutput>,
    pub rewards_owner: OutputOwners,
}

impl AddDelegatorTx {
    pub fn new(
        base: BaseTx,
        validator: Validator,
        mut stake_outs: Vec<TransferableOutput>,
        rewards_owner: OutputOwners,
    ) -> Self {
        sort_transferable_outputs(&mut stake_outs);
        Self {
            base,
            validator,
            stake_outs,
            rewards_owner,
        }
    }

    pub fn encode(&self, w: &mut ByteWriter) {
        self.base.encode(w);
        self.validator.encode(w);
        w.put_u32(self.stake_outs.len() as u32);
        for out in &self.stake_outs {
            out.encode(w);
        }
        encode_rewards_owner(&self.rewards_owner, w);
    }

    pub fn decode(r: &mut ByteReader<'_>, codec: Codec) -> Result<Self, CodecError> {
        let base = BaseTx::decode(r, codec)?;
        let validator = Validator::decode(r)?;
        let count = r.read_u32()? as usize;
        let mut stake_outs = Vec::with_capacity(count);
        for _ in 0..count {
            stake_outs.push(TransferableOutput::decode(r, codec)?);
        }
        let rewards_owner = decode_rewards_owner(r)?;
        Ok(Self {
            base,
            validator,
            stake_outs,
            rewards_owner,
        })
    }
}

/// Add a validator to a subnet:
/// `base ‖ validator ‖ subnetID(32) ‖ subnet auth`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddSubnetValidatorTx {
    pub base: BaseTx,
    pub validator: Validator,
    pub subnet_id: ChainId,
    /// Signature slots against the subnet's owner set.
    pub subnet_auth: SecpInput,
}

impl AddSubnetValidatorTx {
    pub fn encode(&self, w: &mut ByteWriter) {
        self.base.encode(w);
        self.validator.encode(w);
        w.put_bytes(self.subnet_id.as_bytes());
        w.put_u32(platform::SECP_INPUT);
        self.subnet_auth.encode(w);
    }

    pub fn decode(r: &mut ByteReader<'_>, codec: Codec) -> Result<Self, CodecError> {
        let base = BaseTx::decode(r, codec)?;
        let validator = Validator::decode(r)?;
        let subnet_id = ChainId::new(r.read_fixed()?);
        let tag = r.read_u32()?;
        if tag != platform::SECP_INPUT {
            return Err(unknown(tag));
        }
        let subnet_auth = SecpInput::decode(r)?;
        Ok(Self {
            base,
            validator,
            subnet_id,
            subnet_auth,
        })
    }
}
