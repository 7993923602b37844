//! P-chain facade: staking and cross-chain builders plus RPC passthroughs.

use std::sync::OnceLock;

use serde_json::{json, Value};
use tracing::debug;

use avax_transactions::{Codec, SigIdx, Tx, UnsignedTx};
use avax_types::network::{chain_params, hrp_for_network};
use avax_types::{Address, AssetId, ChainId, NodeId, TxId};
use avax_wallet_core::{builders, UtxoSet};

use crate::avm::fetch_utxo_pages;
use crate::client::{decimal_field, string_field, JsonRpcClient};
use crate::error::RpcError;
use crate::{chain_id_for_alias, check_goose_egg};

/// Minimum stakes reported by the node.
#[derive(Clone, Copy, Debug)]
pub struct MinStake {
    pub validator: u64,
    pub delegator: u64,
}

/// The P-chain API facade.
///
/// The platform blockchain id is the all-zero id on every network and is
/// pinned at construction; it cannot be changed. The staking asset id is
/// discovered once per facade and cached.
pub struct PlatformApi<C> {
    client: C,
    network_id: u32,
    endpoint: String,
    tx_fee: u64,
    staking_asset: OnceLock<AssetId>,
}

impl<C: JsonRpcClient> PlatformApi<C> {
    pub fn new(client: C, network_id: u32) -> Self {
        let tx_fee = chain_params(network_id, "P").map_or(0, |c| c.tx_fee);
        Self {
            client,
            network_id,
            endpoint: "/ext/P".into(),
            tx_fee,
            staking_asset: OnceLock::new(),
        }
    }

    pub fn network_id(&self) -> u32 {
        self.network_id
    }

    /// Always [`ChainId::PLATFORM`].
    pub fn blockchain_id(&self) -> ChainId {
        ChainId::PLATFORM
    }

    pub fn tx_fee(&self) -> u64 {
        self.tx_fee
    }

    pub fn format_address(&self, address: &Address) -> Result<String, RpcError> {
        Ok(address.to_bech32("P", hrp_for_network(self.network_id))?)
    }

    /// The asset staked on this network, discovered once and cached.
    pub async fn get_staking_asset_id(&self) -> Result<AssetId, RpcError> {
        if let Some(id) = self.staking_asset.get() {
            return Ok(*id);
        }
        let result = self
            .client
            .call(&self.endpoint, "platform.getStakingAssetID", json!({}))
            .await?;
        let id: AssetId = string_field(&result, "assetID")?.parse()?;
        let _ = self.staking_asset.set(id);
        Ok(id)
    }

    /// Current minimum validator and delegator stakes.
    pub async fn get_min_stake(&self) -> Result<MinStake, RpcError> {
        let result = self
            .client
            .call(&self.endpoint, "platform.getMinStake", json!({}))
            .await?;
        Ok(MinStake {
            validator: decimal_field(&result, "minValidatorStake")?,
            delegator: decimal_field(&result, "minDelegatorStake")?,
        })
    }

    /// Current P-chain height.
    pub async fn get_height(&self) -> Result<u64, RpcError> {
        let result = self
            .client
            .call(&self.endpoint, "platform.getHeight", json!({}))
            .await?;
        decimal_field(&result, "height")
    }

    /// The current validator set of a subnet (the primary network when
    /// `subnet_id` is `None`), as raw JSON.
    pub async fn get_current_validators(
        &self,
        subnet_id: Option<&str>,
    ) -> Result<Value, RpcError> {
        let mut params = json!({});
        if let Some(id) = subnet_id {
            params["subnetID"] = json!(id);
        }
        self.client
            .call(&self.endpoint, "platform.getCurrentValidators", params)
            .await
    }

    /// Fetch all UTXOs owned by the addresses, following pagination.
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
            "platform.getUTXOs",
            &formatted,
            source_chain,
            Codec::Platform,
        )
        .await
    }

    /// Signed-transaction submission. Returns the node-assigned tx id.
    pub async fn issue_tx(&self, tx: &Tx) -> Result<TxId, RpcError> {
        debug!(tx_id = %tx.id(), "issuing transaction");
        let result = self
            .client
            .call(
                &self.endpoint,
                "platform.issueTx",
                json!({ "tx": tx.to_cb58(), "encoding": "cb58" }),
            )
            .await?;
        Ok(string_field(&result, "txID")?.parse()?)
    }

    /// A transaction's status by id.
    pub async fn get_tx_status(&self, tx_id: &TxId) -> Result<String, RpcError> {
        let result = self
            .client
            .call(
                &self.endpoint,
                "platform.getTxStatus",
                json!({ "txID": tx_id }),
            )
            .await?;
        // Older nodes return the bare status string.
        match result {
            Value::String(status) => Ok(status),
            other => string_field(&other, "status"),
        }
    }

    /// Build an import consuming UTXOs exported here from `source_chain`.
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
        let fee_asset = self.get_staking_asset_id().await?;
        let source_chain_id = chain_id_for_alias(self.network_id, source_chain)?;
        let atomics = self.get_utxos(from, Some(source_chain)).await?.all_utxos();
        let tx = builders::build_import_tx(
            set,
            self.network_id,
            ChainId::PLATFORM,
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

    /// Build an export of the staking asset to `destination_chain`.
    #[allow(clippy::too_many_arguments)]
    pub async fn build_export_tx(
        &self,
        set: &UtxoSet,
        amount: u64,
        destination_chain: &str,
        to: &[Address],
        from: &[Address],
        change: &[Address],
        memo: Vec<u8>,
        as_of: u64,
        locktime: u64,
        threshold: u32,
    ) -> Result<UnsignedTx, RpcError> {
        let fee_asset = self.get_staking_asset_id().await?;
        let destination = chain_id_for_alias(self.network_id, destination_chain)?;
        let tx = builders::build_export_tx(
            set,
            self.network_id,
            ChainId::PLATFORM,
            amount,
            fee_asset,
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

    /// Build an add-validator transaction. Staking transactions carry no
    /// fee; the stake itself is the only value consumed.
    #[allow(clippy::too_many_arguments)]
    pub async fn build_add_validator_tx(
        &self,
        set: &UtxoSet,
        to: &[Address],
        from: &[Address],
        change: &[Address],
        node_id: NodeId,
        start_time: u64,
        end_time: u64,
        stake_amount: u64,
        reward_addresses: &[Address],
        delegation_fee_percent: f64,
        memo: Vec<u8>,
        as_of: u64,
    ) -> Result<UnsignedTx, RpcError> {
        let staking_asset = self.get_staking_asset_id().await?;
        let min_stake = self.get_min_stake().await?;
        let tx = builders::build_add_validator_tx(
            set,
            self.network_id,
            staking_asset,
            to,
            from,
            change,
            node_id,
            start_time,
            end_time,
            stake_amount,
            min_stake.validator,
            reward_addresses,
            delegation_fee_percent,
            memo,
            as_of,
        )?;
        check_goose_egg(&tx, &staking_asset)?;
        Ok(tx)
    }

    /// Build an add-delegator transaction.
    #[allow(clippy::too_many_arguments)]
    pub async fn build_add_delegator_tx(
        &self,
        set: &UtxoSet,
        to: &[Address],
        from: &[Address],
        change: &[Address],
        node_id: NodeId,
        start_time: u64,
        end_time: u64,
        stake_amount: u64,
        reward_addresses: &[Address],
        memo: Vec<u8>,
        as_of: u64,
    ) -> Result<UnsignedTx, RpcError> {
        let staking_asset = self.get_staking_asset_id().await?;
        let min_stake = self.get_min_stake().await?;
        let tx = builders::build_add_delegator_tx(
            set,
            self.network_id,
            staking_asset,
            to,
            from,
            change,
            node_id,
            start_time,
            end_time,
            stake_amount,
            min_stake.delegator,
            reward_addresses,
            memo,
            as_of,
        )?;
        check_goose_egg(&tx, &staking_asset)?;
        Ok(tx)
    }

    /// Build an add-subnet-validator transaction.
    #[allow(clippy::too_many_arguments)]
    pub async fn build_add_subnet_validator_tx(
        &self,
        set: &UtxoSet,
        from: &[Address],
        change: &[Address],
        node_id: NodeId,
        start_time: u64,
        end_time: u64,
        weight: u64,
        subnet_id: ChainId,
        subnet_auth: Vec<SigIdx>,
        memo: Vec<u8>,
        as_of: u64,
    ) -> Result<UnsignedTx, RpcError> {
        let fee_asset = self.get_staking_asset_id().await?;
        let tx = builders::build_add_subnet_validator_tx(
            set,
            self.network_id,
            node_id,
            start_time,
            end_time,
            weight,
            subnet_id,
            subnet_auth,
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
}
