//! X-chain facade: build-and-submit helpers plus RPC passthroughs.

use std::sync::OnceLock;

use serde_json::{json, Value};
use tracing::debug;

use avax_transactions::{Codec, Tx, UnsignedTx};
use avax_types::network::{chain_params, hrp_for_network};
use avax_types::{Address, AssetId, ChainId, OutputOwners, TxId};
use avax_wallet_core::{builders, KeyValueStore, PersistenceOptions, Utxo, UtxoSet};

use crate::client::{decimal_field, string_field, JsonRpcClient};
use crate::error::RpcError;
use crate::{chain_id_for_alias, check_goose_egg};

/// UTXOs fetched per `getUTXOs` page.
const UTXO_PAGE_LIMIT: u64 = 1024;

/// A described asset, from `avm.getAssetDescription`.
#[derive(Clone, Debug)]
pub struct AssetDescription {
    pub asset_id: AssetId,
    pub name: String,
    pub symbol: String,
    pub denomination: u8,
}

/// The X-chain API facade.
///
/// Fees come from the static network table; the AVAX asset id is
/// discovered once per facade and cached (write-once — build a new facade
/// to reset it).
pub struct AvmApi<C> {
    client: C,
    network_id: u32,
    blockchain_id: ChainId,
    endpoint: String,
    tx_fee: u64,
    creation_tx_fee: u64,
    avax_asset: OnceLock<AssetId>,
}

impl<C: JsonRpcClient> AvmApi<C> {
    /// Facade for a known network id.
    pub fn new(client: C, network_id: u32) -> Result<Self, RpcError> {
        let chain = chain_params(network_id, "X").ok_or_else(|| {
            RpcError::State(format!("no X-chain configuration for network {network_id}"))
        })?;
        let blockchain_id: ChainId = chain.blockchain_id.parse()?;
        Ok(Self::with_chain(
            client,
            network_id,
            blockchain_id,
            chain.tx_fee,
            chain.creation_tx_fee,
        ))
    }

    /// Facade for a custom network or chain.
    pub fn with_chain(
        client: C,
        network_id: u32,
        blockchain_id: ChainId,
        tx_fee: u64,
        creation_tx_fee: u64,
    ) -> Self {
        Self {
            client,
            network_id,
            blockchain_id,
            endpoint: "/ext/bc/X".into(),
            tx_fee,
            creation_tx_fee,
            avax_asset: OnceLock::new(),
        }
    }

    pub fn network_id(&self) -> u32 {
        self.network_id
    }

    pub fn blockchain_id(&self) -> ChainId {
        self.blockchain_id
    }

    /// Flat fee for standard transactions.
    pub fn tx_fee(&self) -> u64 {
        self.tx_fee
    }

    /// Fee for asset creation.
    pub fn creation_tx_fee(&self) -> u64 {
        self.creation_tx_fee
    }

    /// Render an address in this chain's text form.
    pub fn format_address(&self, address: &Address) -> Result<String, RpcError> {
        Ok(address.to_bech32("X", hrp_for_network(self.network_id))?)
    }

    /// Describe an asset by alias or cb58 id.
    pub async fn get_asset_description(
        &self,
        asset: &str,
    ) -> Result<AssetDescription, RpcError> {
        let result = self
            .client
            .call(
                &self.endpoint,
                "avm.getAssetDescription",
                json!({ "assetID": asset }),
            )
            .await?;
        Ok(AssetDescription {
            asset_id: string_field(&result, "assetID")?.parse()?,
            name: string_field(&result, "name")?,
            symbol: string_field(&result, "symbol")?,
            denomination: decimal_field(&result, "denomination")? as u8,
        })
    }

    /// The AVAX asset id, discovered on first use and cached.
    pub async fn avax_asset_id(&self) -> Result<AssetId, RpcError> {
        if let Some(id) = self.avax_asset.get() {
            return Ok(*id);
        }
        let description = self.get_asset_description("AVAX").await?;
        let _ = self.avax_asset.set(description.asset_id);
        Ok(description.asset_id)
    }

    /// Balance of one asset under an address.
    pub async fn get_balance(&self, address: &Address, asset: &str) -> Result<u64, RpcError> {
        let result = self
            .client
            .call(
                &self.endpoint,
                "avm.getBalance",
                json!({
                    "address": self.format_address(address)?,
                    "assetID": asset,
                }),
            )
            .await?;
        decimal_field(&result, "balance")
    }

    /// Fetch all UTXOs owned by the addresses, following pagination.
    /// `source_chain` selects the atomic memory of another chain instead
    /// of this chain's own set.
    pub async fn get_utxos(
        &self,
        addresses: &[Address],
        source_chain: Option<&str>,
    ) -> Result<UtxoSet, RpcError> {
        let formatted: Vec<String> = addresses
            .iter()
            .map(|a| self.format_address(a))
            .collect::<Result<_, _>>()?;
        fetch_utxo_pages(
            &self.client,
            &self.endpoint,
            "avm.getUTXOs",
            &formatted,
            source_chain,
            Codec::Avm,
        )
        .await
    }

    /// Fetch UTXOs and reconcile them with a persisted set.
    pub async fn get_utxos_with_persistence(
        &self,
        store: &mut dyn KeyValueStore,
        options: &PersistenceOptions,
        addresses: &[Address],
        source_chain: Option<&str>,
    ) -> Result<UtxoSet, RpcError> {
        let fetched = self.get_utxos(addresses, source_chain).await?;
        let merged = match store.get(&options.name) {
            Some(json) => UtxoSet::from_json(&json)?.merge_by_rule(&fetched, options.merge_rule),
            None => fetched,
        };
        store
            .set(&options.name, merged.to_json(), options.overwrite)
            .map_err(RpcError::Wallet)?;
        Ok(merged)
    }

    /// Signed-transaction submission. Returns the node-assigned tx id.
    pub async fn issue_tx(&self, tx: &Tx) -> Result<TxId, RpcError> {
        debug!(tx_id = %tx.id(), "issuing transaction");
        let result = self
            .client
            .call(
                &self.endpoint,
                "avm.issueTx",
                json!({ "tx": tx.to_cb58(), "encoding": "cb58" }),
            )
            .await?;
        Ok(string_field(&result, "txID")?.parse()?)
    }

    /// A transaction's bytes by id (cb58).
    pub async fn get_tx(&self, tx_id: &TxId) -> Result<String, RpcError> {
        let result = self
            .client
            .call(
                &self.endpoint,
                "avm.getTx",
                json!({ "txID": tx_id, "encoding": "cb58" }),
            )
            .await?;
        string_field(&result, "tx")
    }

    /// A transaction's status by id.
    pub async fn get_tx_status(&self, tx_id: &TxId) -> Result<String, RpcError> {
        let result = self
            .client
            .call(&self.endpoint, "avm.getTxStatus", json!({ "txID": tx_id }))
            .await?;
        string_field(&result, "status")
    }

    /// Build a standard transfer paying the flat fee in AVAX.
    #[allow(clippy::too_many_arguments)]
    pub async fn build_base_tx(
        &self,
        set: &UtxoSet,
        amount: u64,
        asset_id: AssetId,
        to: &[Address],
        from: &[Address],
        change: &[Address],
        memo: Vec<u8>,
        as_of: u64,
        locktime: u64,
        threshold: u32,
    ) -> Result<Option<UnsignedTx>, RpcError> {
        let fee_asset = self.avax_asset_id().await?;
        let tx = builders::build_base_tx(
            set,
            self.network_id,
            self.blockchain_id,
            amount,
            asset_id,
            to,
            from,
            change,
            self.tx_fee,
            fee_asset,
            memo,
            as_of,
            locktime,
            threshold,
        )?;
        if let Some(ref tx) = tx {
            check_goose_egg(tx, &fee_asset)?;
        }
        Ok(tx)
    }

    /// Build a fungible-asset creation transaction.
    #[allow(clippy::too_many_arguments)]
    pub async fn build_create_asset_tx(
        &self,
        set: &UtxoSet,
        from: &[Address],
        change: &[Address],
        name: String,
        symbol: String,
        denomination: u8,
        initial_states: Vec<avax_transactions::InitialState>,
        memo: Vec<u8>,
        as_of: u64,
    ) -> Result<UnsignedTx, RpcError> {
        let fee_asset = self.avax_asset_id().await?;
        let tx = builders::build_create_asset_tx(
            set,
            self.network_id,
            self.blockchain_id,
            from,
            change,
            name,
            symbol,
            denomination,
            initial_states,
            self.creation_tx_fee,
            fee_asset,
            memo,
            as_of,
        )?;
        check_goose_egg(&tx, &fee_asset)?;
        Ok(tx)
    }

    /// Build an NFT-family creation transaction.
    #[allow(clippy::too_many_arguments)]
    pub async fn build_create_nft_asset_tx(
        &self,
        set: &UtxoSet,
        from: &[Address],
        change: &[Address],
        name: String,
        symbol: String,
        minter_sets: Vec<OutputOwners>,
        memo: Vec<u8>,
        as_of: u64,
    ) -> Result<UnsignedTx, RpcError> {
        let fee_asset = self.avax_asset_id().await?;
        let tx = builders::build_create_nft_asset_tx(
            set,
            self.network_id,
            self.blockchain_id,
            from,
            change,
            name,
            symbol,
            minter_sets,
            self.creation_tx_fee,
            fee_asset,
            memo,
            as_of,
        )?;
        check_goose_egg(&tx, &fee_asset)?;
        Ok(tx)
    }

    /// Build a mint of further fungible supply.
    #[allow(clippy::too_many_arguments)]
    pub async fn build_secp_mint_tx(
        &self,
        set: &UtxoSet,
        mint_utxo: &Utxo,
        amount: u64,
        to: &[Address],
        from: &[Address],
        change: &[Address],
        memo: Vec<u8>,
        as_of: u64,
    ) -> Result<UnsignedTx, RpcError> {
        let fee_asset = self.avax_asset_id().await?;
        let tx = builders::build_secp_mint_tx(
            set,
            self.network_id,
            self.blockchain_id,
            mint_utxo,
            amount,
            to,
            from,
            change,
            self.tx_fee,
            fee_asset,
            memo,
            as_of,
        )?;
        check_goose_egg(&tx, &fee_asset)?;
        Ok(tx)
    }

    /// Build an NFT mint.
    #[allow(clippy::too_many_arguments)]
    pub async fn build_nft_mint_tx(
        &self,
        set: &UtxoSet,
        mint_utxo: &Utxo,
        payload: Vec<u8>,
        owners: Vec<OutputOwners>,
        from: &[Address],
        change: &[Address],
        memo: Vec<u8>,
        as_of: u64,
    ) -> Result<UnsignedTx, RpcError> {
        let fee_asset = self.avax_asset_id().await?;
        let tx = builders::build_nft_mint_tx(
            set,
            self.network_id,
            self.blockchain_id,
            mint_utxo,
            payload,
            owners,
            from,
            change,
            self.tx_fee,
            fee_asset,
            memo,
            as_of,
        )?;
        check_goose_egg(&tx, &fee_asset)?;
        Ok(tx)
    }

    /// Build an NFT transfer.
    #[allow(clippy::too_many_arguments)]
    pub async fn build_nft_transfer_tx(
        &self,
        set: &UtxoSet,
        nft_utxo: &Utxo,
        to: &[Address],
        from: &[Address],
        change: &[Address],
        memo: Vec<u8>,
        as_of: u64,
        locktime: u64,
        threshold: u32,
    ) -> Result<UnsignedTx, RpcError> {
        let fee_asset = self.avax_asset_id().await?;
        let tx = builders::build_nft_transfer_tx(
            set,
            self.network_id,
            self.blockchain_id,
            nft_utxo,
            to,
            from,
            change,
            self.tx_fee,
            fee_asset,
            memo,
            as_of,
            locktime,
            threshold,
        )?;
        check_goose_egg(&tx, &fee_asset)?;
        Ok(tx)
    }

    /// Build an import consuming UTXOs exported here from `source_chain`
    /// (a chain alias, usually `"P"`). Fetches the atomic UTXOs itself.
    #[allow(clippy::too_many_arguments)]
    pub async fn build_import_tx(
        &self,
        set: &UtxoSet,
        source_chain: &str,
        to: &[Address],
        from: &[Address],
        change: &[Address],
        memo: Vec<u8>,
        as_of: u64,
        locktime: u64,
        threshold: u32,
    ) -> Result<UnsignedTx, RpcError> {
        let fee_asset = self.avax_asset_id().await?;
        let source_chain_id = chain_id_for_alias(self.network_id, source_chain)?;
        let atomics = self.get_utxos(from, Some(source_chain)).await?.all_utxos();
        let tx = builders::build_import_tx(
            set,
            self.network_id,
            self.blockchain_id,
            &atomics,
            source_chain_id,
            to,
            from,
            change,
            self.tx_fee,
            fee_asset,
            memo,
            as_of,
            locktime,
            threshold,
        )?;
        check_goose_egg(&tx, &fee_asset)?;
        Ok(tx)
    }

    /// Build an export of AVAX to `destination_chain` (a chain alias).
    #[allow(clippy::too_many_arguments)]
    pub async fn build_export_tx(
        &self,
        set: &UtxoSet,
        amount: u64,
        asset_id: AssetId,
        destination_chain: &str,
        to: &[Address],
        from: &[Address],
        change: &[Address],
        memo: Vec<u8>,
        as_of: u64,
        locktime: u64,
        threshold: u32,
    ) -> Result<UnsignedTx, RpcError> {
        let fee_asset = self.avax_asset_id().await?;
        let destination = chain_id_for_alias(self.network_id, destination_chain)?;
        let tx = builders::build_export_tx(
            set,
            self.network_id,
            self.blockchain_id,
            amount,
            asset_id,
            fee_asset,
            destination,
            to,
            from,
            change,
            self.tx_fee,
            memo,
            as_of,
            locktime,
            threshold,
        )?;
        check_goose_egg(&tx, &fee_asset)?;
        Ok(tx)
    }
}

/// Follow `getUTXOs` pagination until a short page arrives.
pub(crate) async fn fetch_utxo_pages<C: JsonRpcClient>(
    client: &C,
    endpoint: &str,
    method: &str,
    addresses: &[String],
    source_chain: Option<&str>,
    codec: Codec,
) -> Result<UtxoSet, RpcError> {
    let mut set = UtxoSet::new(codec);
    let mut start_index: Option<Value> = None;
    loop {
        let mut params = json!({
            "addresses": addresses,
            "limit": UTXO_PAGE_LIMIT,
            "encoding": "cb58",
        });
        if let Some(chain) = source_chain {
            params["sourceChain"] = json!(chain);
        }
        if let Some(ref index) = start_index {
            params["startIndex"] = index.clone();
        }

        let result = client.call(endpoint, method, params).await?;
        let utxos = result
            .get("utxos")
            .and_then(Value::as_array)
            .ok_or_else(|| RpcError::InvalidResponse("missing utxos array".into()))?;
        for entry in utxos {
            let s = entry
                .as_str()
                .ok_or_else(|| RpcError::InvalidResponse("utxo entry is not a string".into()))?;
            let utxo = set.parse_utxo(s)?;
            set.add(utxo, true);
        }

        let fetched = decimal_field(&result, "numFetched")?;
        if fetched < UTXO_PAGE_LIMIT {
            break;
        }
        start_index = Some(result.get("endIndex").cloned().unwrap_or(Value::Null));
    }
    debug!(count = set.len(), "fetched UTXO set");
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use avax_transactions::Output;
    use avax_types::TxId;
    use avax_wallet_core::{MemoryStore, MergeRule};

    /// Mock transport: canned responses by method name, with call capture.
    struct MockClient {
        responses: HashMap<String, Value>,
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl MockClient {
        fn new(responses: Vec<(&str, Value)>) -> Self {
            Self {
                responses: responses
                    .into_iter()
                    .map(|(m, v)| (m.to_string(), v))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl JsonRpcClient for MockClient {
        async fn call(
            &self,
            _endpoint: &str,
            method: &str,
            params: Value,
        ) -> Result<Value, RpcError> {
            self.calls
                .lock()
                .unwrap()
                .push((method.to_string(), params));
            self.responses
                .get(method)
                .cloned()
                .ok_or_else(|| RpcError::Node {
                    code: -32601,
                    message: format!("method not found: {method}"),
                })
        }
    }

    fn addr(tag: u8) -> Address {
        Address::new([tag; 20])
    }

    fn avax_asset() -> AssetId {
        AssetId::new([0xA0; 32])
    }

    fn asset_description_response() -> (&'static str, Value) {
        (
            "avm.getAssetDescription",
            json!({
                "assetID": avax_asset().to_string(),
                "name": "Avalanche",
                "symbol": "AVAX",
                "denomination": "9",
            }),
        )
    }

    fn funded_utxo(amount: u64) -> Utxo {
        let owners = OutputOwners::new(0, 1, vec![addr(1)]).unwrap();
        Utxo::new(
            TxId::new([1; 32]),
            0,
            avax_asset(),
            Output::new_secp_transfer(amount, owners),
        )
    }

    #[tokio::test]
    async fn avax_asset_id_is_cached() {
        let client = MockClient::new(vec![asset_description_response()]);
        let api = AvmApi::new(client, 1).unwrap();

        assert_eq!(api.avax_asset_id().await.unwrap(), avax_asset());
        assert_eq!(api.avax_asset_id().await.unwrap(), avax_asset());
        // Only one discovery call despite two lookups.
        assert_eq!(api.client.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn get_utxos_follows_pagination_contract() {
        let utxo = funded_utxo(500);
        let client = MockClient::new(vec![(
            "avm.getUTXOs",
            json!({
                "numFetched": "1",
                "utxos": [utxo.to_cb58()],
                "endIndex": {"address": "X-avax1...", "utxo": ""},
            }),
        )]);
        let api = AvmApi::new(client, 1).unwrap();

        let set = api.get_utxos(&[addr(1)], None).await.unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.codec(), Codec::Avm);
    }

    #[tokio::test]
    async fn build_base_tx_applies_fee_and_goose_egg() {
        let utxo = funded_utxo(5_000_000);
        let client = MockClient::new(vec![asset_description_response()]);
        let api = AvmApi::new(client, 1).unwrap();

        let mut set = UtxoSet::new(Codec::Avm);
        set.add(utxo, false);

        let tx = api
            .build_base_tx(
                &set,
                1_000_000,
                avax_asset(),
                &[addr(0xD0)],
                &[addr(1)],
                &[addr(0xC0)],
                vec![],
                1,
                0,
                1,
            )
            .await
            .unwrap()
            .unwrap();
        // Mainnet X-chain flat fee.
        assert_eq!(tx.burned(&avax_asset()), 1_000_000);
    }

    #[tokio::test]
    async fn absurd_fee_build_is_rejected() {
        use avax_types::network::ONE_AVAX;
        // Outputs total ~9 AVAX while the configured fee is 11 AVAX.
        let owners = OutputOwners::new(0, 1, vec![addr(1)]).unwrap();
        let utxo = Utxo::new(
            TxId::new([1; 32]),
            0,
            avax_asset(),
            Output::new_secp_transfer(20 * ONE_AVAX, owners),
        );
        let client = MockClient::new(vec![asset_description_response()]);
        let api = AvmApi::with_chain(
            client,
            1,
            ChainId::new([0xEE; 32]),
            11 * ONE_AVAX, // pathological flat fee
            11 * ONE_AVAX,
        );

        let mut set = UtxoSet::new(Codec::Avm);
        set.add(utxo, false);

        let err = api
            .build_base_tx(
                &set,
                1,
                avax_asset(),
                &[addr(0xD0)],
                &[addr(1)],
                &[addr(0xC0)],
                vec![],
                1,
                0,
                1,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::GooseEgg { .. }));
    }

    #[tokio::test]
    async fn issue_tx_submits_cb58() {
        use avax_keychain::{KeyPair, SecpKeyChain};

        let mut kc = SecpKeyChain::new();
        let pair = KeyPair::from_secret_bytes(&[0x21; 32]).unwrap();
        let owner = kc.import_key(&pair.private_key_string()).unwrap();

        let owners = OutputOwners::new(0, 1, vec![owner]).unwrap();
        let utxo = Utxo::new(
            TxId::new([1; 32]),
            0,
            avax_asset(),
            Output::new_secp_transfer(5_000_000, owners),
        );
        let mut set = UtxoSet::new(Codec::Avm);
        set.add(utxo, false);

        let node_tx_id = TxId::new([0x37; 32]);
        let client = MockClient::new(vec![
            asset_description_response(),
            ("avm.issueTx", json!({"txID": node_tx_id})),
        ]);
        let api = AvmApi::new(client, 1).unwrap();
        let unsigned = api
            .build_base_tx(
                &set,
                1_000_000,
                avax_asset(),
                &[addr(0xD0)],
                &[owner],
                &[addr(0xC0)],
                vec![],
                1,
                0,
                1,
            )
            .await
            .unwrap()
            .unwrap();
        let signed = unsigned.sign(&kc).unwrap();

        let tx_id = api.issue_tx(&signed).await.unwrap();
        assert_eq!(tx_id, node_tx_id);

        let calls = api.client.calls.lock().unwrap();
        let (method, params) = calls.last().unwrap();
        assert_eq!(method, "avm.issueTx");
        assert_eq!(params["encoding"], "cb58");
        assert_eq!(params["tx"], json!(signed.to_cb58()));
    }

    #[tokio::test]
    async fn persistence_merges_with_stored_set() {
        let fresh = funded_utxo(500);
        let client = MockClient::new(vec![(
            "avm.getUTXOs",
            json!({
                "numFetched": "1",
                "utxos": [fresh.to_cb58()],
                "endIndex": {},
            }),
        )]);
        let api = AvmApi::new(client, 1).unwrap();

        // Seed the store with a different UTXO.
        let mut stored = UtxoSet::new(Codec::Avm);
        let old = {
            let owners = OutputOwners::new(0, 1, vec![addr(1)]).unwrap();
            Utxo::new(
                TxId::new([9; 32]),
                0,
                avax_asset(),
                Output::new_secp_transfer(100, owners),
            )
        };
        stored.add(old, false);
        let mut store = MemoryStore::new();
        store.set("utxos", stored.to_json(), true).unwrap();

        let options = PersistenceOptions::new("utxos", true, MergeRule::Union);
        let merged = api
            .get_utxos_with_persistence(&mut store, &options, &[addr(1)], None)
            .await
            .unwrap();
        assert_eq!(merged.len(), 2);

        let restored = UtxoSet::from_json(&store.get("utxos").unwrap()).unwrap();
        assert_eq!(restored.len(), 2);
    }

    #[tokio::test]
    async fn node_errors_surface_verbatim() {
        let client = MockClient::new(vec![]);
        let api = AvmApi::new(client, 1).unwrap();
        let err = api.get_tx_status(&TxId::new([1; 32])).await.unwrap_err();
        match err {
            RpcError::Node { code, message } => {
                assert_eq!(code, -32601);
                assert!(message.contains("avm.getTxStatus"));
            }
            other => panic!("expected Node error, got {other}"),
        }
    }
}
