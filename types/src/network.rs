//! Static network configuration: chain aliases, fees, and protocol constants.

/// One nanoAVAX-denominated whole coin.
pub const ONE_AVAX: u64 = 1_000_000_000;

/// Minimum primary-network validator stake.
pub const MIN_STAKE: u64 = 2_000 * ONE_AVAX;

/// Delegation shares denominator: 1_000_000 shares = 100%.
pub const MAX_DELEGATION_SHARES: u32 = 1_000_000;

/// Length of an asset id in bytes.
pub const ASSET_ID_LEN: usize = 32;

/// Maximum asset name length in bytes.
pub const MAX_ASSET_NAME_LEN: usize = 128;
/// Maximum asset symbol length in bytes (ASCII).
pub const MAX_SYMBOL_LEN: usize = 4;
/// Maximum asset denomination (decimal places).
pub const MAX_DENOMINATION: u8 = 32;
/// Maximum memo length in bytes.
pub const MEMO_MAX_LEN: usize = 256;

/// Latest transaction codec version.
pub const LATEST_CODEC: u16 = 0;
/// Recoverable signature length: r(32) ‖ s(32) ‖ v(1).
pub const SIGNATURE_LEN: usize = 65;

/// Minimum staking window length.
pub const MIN_STAKE_DURATION_SECS: u64 = 14 * 24 * 3600;
/// Maximum staking window length.
pub const MAX_STAKE_DURATION_SECS: u64 = 365 * 24 * 3600;

/// Per-chain configuration within a network.
#[derive(Clone, Copy, Debug)]
pub struct ChainParams {
    /// Canonical alias ("X", "P").
    pub alias: &'static str,
    /// cb58 blockchain id. Empty for the platform chain, whose id is the
    /// all-zero id on every network.
    pub blockchain_id: &'static str,
    /// Flat fee for standard transactions, in nanoAVAX.
    pub tx_fee: u64,
    /// Fee for asset-creation transactions, in nanoAVAX.
    pub creation_tx_fee: u64,
}

/// Per-network configuration.
#[derive(Clone, Copy, Debug)]
pub struct NetworkParams {
    pub network_id: u32,
    /// bech32 human-readable part for addresses.
    pub hrp: &'static str,
    pub chains: &'static [ChainParams],
}

const MILLI_AVAX: u64 = ONE_AVAX / 1_000;
const CENTI_AVAX: u64 = ONE_AVAX / 100;

const MAINNET_CHAINS: &[ChainParams] = &[
    ChainParams {
        alias: "X",
        blockchain_id: "2oYMBNV4eNHyqk2fjjV5nVQLDbtmNJzq5s3qs3Lo6ftnC6FByM",
        tx_fee: MILLI_AVAX,
        creation_tx_fee: CENTI_AVAX,
    },
    ChainParams {
        alias: "P",
        blockchain_id: "",
        tx_fee: MILLI_AVAX,
        creation_tx_fee: CENTI_AVAX,
    },
];

const FUJI_CHAINS: &[ChainParams] = &[
    ChainParams {
        alias: "X",
        blockchain_id: "2JVSBoinj9C2J33VntvzYtVJNZdN2NKiwwKjcumHUWEb5DbBrm",
        tx_fee: MILLI_AVAX,
        creation_tx_fee: CENTI_AVAX,
    },
    ChainParams {
        alias: "P",
        blockchain_id: "",
        tx_fee: MILLI_AVAX,
        creation_tx_fee: CENTI_AVAX,
    },
];

const LOCAL_CHAINS: &[ChainParams] = &[
    ChainParams {
        alias: "X",
        blockchain_id: "qzfF3A11KzpcHkkqznEyQgupQrCNS6WV6fTUTwZpEKqhj1QE7",
        tx_fee: MILLI_AVAX,
        creation_tx_fee: CENTI_AVAX,
    },
    ChainParams {
        alias: "P",
        blockchain_id: "",
        tx_fee: MILLI_AVAX,
        creation_tx_fee: CENTI_AVAX,
    },
];

const NETWORKS: &[NetworkParams] = &[
    NetworkParams {
        network_id: 1,
        hrp: "avax",
        chains: MAINNET_CHAINS,
    },
    NetworkParams {
        network_id: 5,
        hrp: "fuji",
        chains: FUJI_CHAINS,
    },
    NetworkParams {
        network_id: 12345,
        hrp: "local",
        chains: LOCAL_CHAINS,
    },
];

/// Look up the parameters of a known network.
pub fn network_params(network_id: u32) -> Option<&'static NetworkParams> {
    NETWORKS.iter().find(|n| n.network_id == network_id)
}

/// bech32 prefix for a network; unknown networks fall back to "custom".
pub fn hrp_for_network(network_id: u32) -> &'static str {
    network_params(network_id).map_or("custom", |n| n.hrp)
}

/// Chain parameters by alias within a network.
pub fn chain_params(network_id: u32, alias: &str) -> Option<&'static ChainParams> {
    network_params(network_id)?.chains.iter().find(|c| c.alias == alias)
}
