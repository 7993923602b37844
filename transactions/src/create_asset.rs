//! Asset creation on the X chain.
//!
//! Wire form: `base ‖ name(u16 str) ‖ symbol(u16 str) ‖ denomination(1) ‖
//! initial states`. Name and symbol use the short (u16) string prefix the
//! chain has always used for them.

use avax_types::network::{MAX_ASSET_NAME_LEN, MAX_DENOMINATION, MAX_SYMBOL_LEN};
use avax_types::{ByteReader, ByteWriter, CodecError};

use crate::base::BaseTx;
use crate::codec::Codec;
use crate::error::TxError;
use crate::output::Output;

/// Feature-extension index for SECP outputs in an initial state.
pub const SECP_FX_ID: u32 = 0;
/// Feature-extension index for NFT outputs in an initial state.
pub const NFT_FX_ID: u32 = 1;

/// The outputs a new asset starts with, grouped by feature extension.
///
/// Wire form: `fxID(4) ‖ numOuts(4) ‖ tagged outputs`, outputs in
/// canonical sort order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitialState {
    pub fx_id: u32,
    pub outputs: Vec<Output>,
}

impl InitialState {
    pub fn new(fx_id: u32, mut outputs: Vec<Output>) -> Self {
        outputs.sort_by_cached_key(|o| o.sort_key());
        Self { fx_id, outputs }
    }

    pub fn encode(&self, w: &mut ByteWriter) {
        w.put_u32(self.fx_id);
        w.put_u32(self.outputs.len() as u32);
        for out in &self.outputs {
            out.encode(w);
        }
    }

    pub fn decode(r: &mut ByteReader<'_>, codec: Codec) -> Result<Self, CodecError> {
        let fx_id = r.read_u32()?;
        let count = r.read_u32()? as usize;
        let mut outputs = Vec::with_capacity(count);
        for _ in 0..count {
            outputs.push(Output::decode(r, codec)?);
        }
        Ok(Self { fx_id, outputs })
    }
}

/// Create a new asset family.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateAssetTx {
    pub base: BaseTx,
    pub name: String,
    pub symbol: String,
    pub denomination: u8,
    pub initial_states: Vec<InitialState>,
}

impl CreateAssetTx {
    /// Assemble and validate an asset creation body.
    pub fn new(
        base: BaseTx,
        name: String,
        symbol: String,
        denomination: u8,
        mut initial_states: Vec<InitialState>,
    ) -> Result<Self, TxError> {
        if name.is_empty() || name.len() > MAX_ASSET_NAME_LEN {
            return Err(TxError::InvalidInput(format!(
                "asset name must be 1..={MAX_ASSET_NAME_LEN} bytes"
            )));
        }
        if symbol.is_empty() || symbol.len() > MAX_SYMBOL_LEN || !symbol.is_ascii() {
            return Err(TxError::InvalidInput(format!(
                "asset symbol must be 1..={MAX_SYMBOL_LEN} ASCII bytes"
            )));
        }
        if denomination > MAX_DENOMINATION {
            return Err(TxError::InvalidInput(format!(
                "denomination {denomination} exceeds {MAX_DENOMINATION}"
            )));
        }
        initial_states.sort_by_key(|s| s.fx_id);
        Ok(Self {
            base,
            name,
            symbol,
            denomination,
            initial_states,
        })
    }

    pub fn encode(&self, w: &mut ByteWriter) {
        self.base.encode(w);
        w.put_short_string(&self.name);
        w.put_short_string(&self.symbol);
        w.put_u8(self.denomination);
        w.put_u32(self.initial_states.len() as u32);
        for state in &self.initial_states {
            state.encode(w);
        }
    }

    pub fn decode(r: &mut ByteReader<'_>, codec: Codec) -> Result<Self, CodecError> {
        let base = BaseTx::decode(r, codec)?;
        let name = r.read_short_string()?;
        let symbol = r.read_short_string()?;
        let denomination = r.read_u8()?;
        let count = r.read_u32()? as usize;
        let mut initial_states = Vec::with_capacity(count);
        for _ in 0..count {
            initial_states.push(InitialState::decode(r, codec)?);
        }
        Ok(Self {
            base,
            name,
            symbol,
            denomination,
            initial_states,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avax_types::{Address, ChainId, OutputOwners};

    fn base() -> BaseTx {
        BaseTx::new(1, ChainId::new([0; 32]), vec![], vec![], vec![]).unwrap()
    }

    fn secp_state(amount: u64) -> InitialState {
        let owners = OutputOwners::new(0, 1, vec![Address::new([1; 20])]).unwrap();
        InitialState::new(SECP_FX_ID, vec![Output::new_secp_transfer(amount, owners)])
    }

    #[test]
    fn valid_asset_roundtrip() {
        let tx = CreateAssetTx::new(
            base(),
            "Wrapped Token".into(),
            "WTKN".into(),
            9,
            vec![secp_state(1_000_000)],
        )
        .unwrap();

        let mut w = ByteWriter::new();
        tx.encode(&mut w);
        let bytes = w.into_bytes();
        let mut r = ByteReader::new(&bytes);
        let decoded = CreateAssetTx::decode(&mut r, Codec::Avm).unwrap();
        r.expect_done().unwrap();
        assert_eq!(decoded.name, "Wrapped Token");
        assert_eq!(decoded.symbol, "WTKN");
        assert_eq!(decoded.denomination, 9);
        assert_eq!(decoded.initial_states.len(), 1);
    }

    #[test]
    fn name_and_symbol_use_short_prefix() {
        let tx = CreateAssetTx::new(base(), "N".into(), "S".into(), 0, vec![]).unwrap();
        let mut w = ByteWriter::new();
        tx.encode(&mut w);
        let bytes = w.into_bytes();
        // base is network(4) + chain(32) + outs(4) + ins(4) + memo len(4) = 48
        assert_eq!(&bytes[48..50], &[0, 1]); // u16 name length
        assert_eq!(bytes[50], b'N');
    }

    #[test]
    fn long_name_rejected() {
        let name = "x".repeat(129);
        assert!(matches!(
            CreateAssetTx::new(base(), name, "OK".into(), 0, vec![]),
            Err(TxError::InvalidInput(_))
        ));
    }

    #[test]
    fn bad_symbol_rejected() {
        assert!(CreateAssetTx::new(base(), "n".into(), "TOOLONG".into(), 0, vec![]).is_err());
        assert!(CreateAssetTx::new(base(), "n".into(), "".into(), 0, vec![]).is_err());
        assert!(CreateAssetTx::new(base(), "n".into(), "é".into(), 0, vec![]).is_err());
    }

    #[test]
    fn denomination_over_32_rejected() {
        assert!(CreateAssetTx::new(base(), "n".into(), "S".into(), 33, vec![]).is_err());
        assert!(CreateAssetTx::new(base(), "n".into(), "S".into(), 32, vec![]).is_ok());
    }

    #[test]
    fn initial_states_sorted_by_fx() {
        let tx = CreateAssetTx::new(
            base(),
            "n".into(),
            "S".into(),
            0,
            vec![
                InitialState::new(NFT_FX_ID, vec![]),
                InitialState::new(SECP_FX_ID, vec![]),
            ],
        )
        .unwrap();
        assert_eq!(tx.initial_states[0].fx_id, SECP_FX_ID);
        assert_eq!(tx.initial_states[1].fx_id, NFT_FX_ID);
    }
}
