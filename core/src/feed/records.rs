//! Item shapes returned by the two indexers.
//!
//! Each struct carries only the fields the queries select. BigInt columns
//! arrive as decimal strings, Int columns as JSON numbers. Every struct is
//! `#[serde(default)]` so a query selecting a subset of fields still decodes.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// JuiceSwap
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GovernorProposal {
    pub id: String,
    pub chain_id: u64,
    pub proposal_id: String,
    pub proposer: String,
    pub target: String,
    pub execute_after: String,
    pub description: Option<String>,
    pub status: String,
    pub executed_by: Option<String>,
    pub vetoed_by: Option<String>,
    pub created_at: String,
    pub resolved_at: Option<String>,
    pub tx_hash: String,
    pub resolved_tx_hash: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct FactoryOwnerChange {
    pub id: String,
    pub chain_id: u64,
    pub old_owner: String,
    pub new_owner: String,
    pub block_timestamp: String,
    pub tx_hash: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct FeeCollectorOwnerUpdate {
    pub id: String,
    pub chain_id: u64,
    pub new_owner: String,
    pub block_timestamp: String,
    pub tx_hash: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct FeeCollectorRouterUpdate {
    pub id: String,
    pub chain_id: u64,
    pub old_router: String,
    pub new_router: String,
    pub block_timestamp: String,
    pub tx_hash: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct FeeCollectorCollectorUpdate {
    pub id: String,
    pub chain_id: u64,
    pub old_collector: String,
    pub new_collector: String,
    pub block_timestamp: String,
    pub tx_hash: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct FeeCollectorProtectionUpdate {
    pub id: String,
    pub chain_id: u64,
    pub twap_period: u64,
    pub max_slippage_bps: String,
    pub block_timestamp: String,
    pub tx_hash: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgedTokenRegistration {
    pub id: String,
    pub chain_id: u64,
    pub token: String,
    pub bridge: String,
    pub registered_by: String,
    pub decimals: u32,
    pub block_timestamp: String,
    pub tx_hash: String,
}

// ---------------------------------------------------------------------------
// JuiceDollar
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Position {
    pub id: String,
    pub tx_hash: String,
    pub position: String,
    pub owner: String,
    pub collateral: String,
    pub price: String,
    pub created: String,
    pub cooldown: String,
    pub collateral_symbol: String,
    pub collateral_decimals: u32,
    pub stablecoin_symbol: String,
    pub stablecoin_decimals: u32,
    pub minimum_collateral: String,
    pub limit_for_clones: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Minter {
    pub id: String,
    pub tx_hash: String,
    pub minter: String,
    pub application_period: String,
    pub application_fee: String,
    pub apply_message: Option<String>,
    pub apply_date: String,
    pub suggestor: String,
    pub deny_message: Option<String>,
    pub deny_date: Option<String>,
    pub deny_tx_hash: Option<String>,
    pub vetor: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SavingsRateProposed {
    pub id: String,
    pub created: String,
    pub tx_hash: String,
    pub proposer: String,
    pub next_rate: u64,
    pub next_change: u64,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SavingsRateChanged {
    pub id: String,
    pub created: String,
    pub tx_hash: String,
    pub approved_rate: u64,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RateChanges {
    pub id: String,
    pub who: String,
    pub next_fee_rate: u64,
    pub next_savings_fee_rate: u64,
    pub next_minting_fee_rate: u64,
    /// Only present on proposals.
    pub next_change: Option<String>,
    pub timestamp: String,
    pub tx_hash: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EmergencyStop {
    pub id: String,
    pub bridge_address: String,
    pub caller: String,
    pub message: Option<String>,
    pub timestamp: String,
    pub tx_hash: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ForcedSale {
    pub id: String,
    pub position: String,
    pub amount: String,
    pub timestamp: String,
    pub tx_hash: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PositionDenial {
    pub id: String,
    pub position: String,
    pub denier: String,
    pub message: Option<String>,
    pub timestamp: String,
    pub tx_hash: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Challenge {
    pub id: String,
    pub tx_hash: String,
    pub position: String,
    pub number: String,
    pub challenger: String,
    pub created: String,
    pub duration: u64,
    pub size: String,
    pub liq_price: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ChallengeBid {
    pub id: String,
    pub tx_hash: String,
    pub position: String,
    pub number: String,
    pub number_bid: String,
    pub bidder: String,
    pub created: String,
    pub bid_type: String,
    pub bid: String,
    pub price: String,
    pub filled_size: String,
    pub acquired_collateral: String,
    pub challenge_size: String,
}
