//! GraphQL documents for both indexers.
//!
//! Every query takes a single `$watermark: BigInt!`, filters strictly after it
//! on the category's cursor field, orders ascending and caps the page at
//! [`PAGE_LIMIT`] items.

/// Maximum items returned per query.
pub const PAGE_LIMIT: usize = 50;

/// A named query and the root field its page lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuerySpec {
    /// GraphQL operation name.
    pub name: &'static str,
    pub root_field: &'static str,
    pub document: &'static str,
}

impl QuerySpec {
    /// Find the query whose document is `document`.
    pub fn by_document(document: &str) -> Option<&'static QuerySpec> {
        ALL.iter().find(|q| q.document == document)
    }

    pub fn by_name(name: &str) -> Option<&'static QuerySpec> {
        ALL.iter().find(|q| q.name == name)
    }
}

// ---------------------------------------------------------------------------
// JuiceSwap
// ---------------------------------------------------------------------------

pub const GOVERNOR_PROPOSALS_NEW: QuerySpec = QuerySpec {
    name: "GovernorProposalsNew",
    root_field: "governorProposals",
    document: r#"query GovernorProposalsNew($watermark: BigInt!) {
  governorProposals(where: { createdAt_gt: $watermark, status: "active" }, orderBy: "createdAt", orderDirection: "asc", limit: 50) {
    items { id chainId proposalId proposer target executeAfter description status createdAt txHash }
  }
}"#,
};

pub const GOVERNOR_PROPOSALS_RESOLVED: QuerySpec = QuerySpec {
    name: "GovernorProposalsResolved",
    root_field: "governorProposals",
    document: r#"query GovernorProposalsResolved($watermark: BigInt!) {
  governorProposals(where: { resolvedAt_gt: $watermark, status_in: ["executed", "vetoed"] }, orderBy: "resolvedAt", orderDirection: "asc", limit: 50) {
    items { id chainId proposalId proposer target description status executedBy vetoedBy createdAt resolvedAt txHash resolvedTxHash }
  }
}"#,
};

pub const FACTORY_OWNER_CHANGES: QuerySpec = QuerySpec {
    name: "FactoryOwnerChanges",
    root_field: "factoryOwnerChanges",
    document: r#"query FactoryOwnerChanges($watermark: BigInt!) {
  factoryOwnerChanges(where: { blockTimestamp_gt: $watermark }, orderBy: "blockTimestamp", orderDirection: "asc", limit: 50) {
    items { id chainId oldOwner newOwner blockTimestamp txHash }
  }
}"#,
};

pub const FEE_COLLECTOR_OWNER_UPDATES: QuerySpec = QuerySpec {
    name: "FeeCollectorOwnerUpdates",
    root_field: "feeCollectorOwnerUpdates",
    document: r#"query FeeCollectorOwnerUpdates($watermark: BigInt!) {
  feeCollectorOwnerUpdates(where: { blockTimestamp_gt: $watermark }, orderBy: "blockTimestamp", orderDirection: "asc", limit: 50) {
    items { id chainId newOwner blockTimestamp txHash }
  }
}"#,
};

pub const FEE_COLLECTOR_ROUTER_UPDATES: QuerySpec = QuerySpec {
    name: "FeeCollectorRouterUpdates",
    root_field: "feeCollectorRouterUpdates",
    document: r#"query FeeCollectorRouterUpdates($watermark: BigInt!) {
  feeCollectorRouterUpdates(where: { blockTimestamp_gt: $watermark }, orderBy: "blockTimestamp", orderDirection: "asc", limit: 50) {
    items { id chainId oldRouter newRouter blockTimestamp txHash }
  }
}"#,
};

pub const FEE_COLLECTOR_COLLECTOR_UPDATES: QuerySpec = QuerySpec {
    name: "FeeCollectorCollectorUpdates",
    root_field: "feeCollectorCollectorUpdates",
    document: r#"query FeeCollectorCollectorUpdates($watermark: BigInt!) {
  feeCollectorCollectorUpdates(where: { blockTimestamp_gt: $watermark }, orderBy: "blockTimestamp", orderDirection: "asc", limit: 50) {
    items { id chainId oldCollector newCollector blockTimestamp txHash }
  }
}"#,
};

pub const FEE_COLLECTOR_PROTECTION_UPDATES: QuerySpec = QuerySpec {
    name: "FeeCollectorProtectionUpdates",
    root_field: "feeCollectorProtectionUpdates",
    document: r#"query FeeCollectorProtectionUpdates($watermark: BigInt!) {
  feeCollectorProtectionUpdates(where: { blockTimestamp_gt: $watermark }, orderBy: "blockTimestamp", orderDirection: "asc", limit: 50) {
    items { id chainId twapPeriod maxSlippageBps blockTimestamp txHash }
  }
}"#,
};

pub const BRIDGED_TOKEN_REGISTRATIONS: QuerySpec = QuerySpec {
    name: "GatewayBridgedTokenRegistrations",
    root_field: "gatewayBridgedTokenRegistrations",
    document: r#"query GatewayBridgedTokenRegistrations($watermark: BigInt!) {
  gatewayBridgedTokenRegistrations(where: { blockTimestamp_gt: $watermark }, orderBy: "blockTimestamp", orderDirection: "asc", limit: 50) {
    items { id chainId token bridge registeredBy decimals blockTimestamp txHash }
  }
}"#,
};

// ---------------------------------------------------------------------------
// JuiceDollar
// ---------------------------------------------------------------------------

pub const POSITIONS_NEW: QuerySpec = QuerySpec {
    name: "PositionV2sNew",
    root_field: "positionV2s",
    document: r#"query PositionV2sNew($watermark: BigInt!) {
  positionV2s(where: { created_gt: $watermark, isOriginal: true, denied: false }, orderBy: "created", orderDirection: "asc", limit: 50) {
    items { id txHash position owner collateral price created cooldown collateralSymbol collateralDecimals stablecoinSymbol stablecoinDecimals minimumCollateral limitForClones }
  }
}"#,
};

pub const MINTERS_NEW: QuerySpec = QuerySpec {
    name: "MintersNew",
    root_field: "minters",
    document: r#"query MintersNew($watermark: BigInt!) {
  minters(where: { applyDate_gt: $watermark }, orderBy: "applyDate", orderDirection: "asc", limit: 50) {
    items { id txHash minter applicationPeriod applicationFee applyMessage applyDate suggestor denyDate denyMessage vetor }
  }
}"#,
};

pub const MINTERS_DENIED: QuerySpec = QuerySpec {
    name: "MintersDenied",
    root_field: "minters",
    document: r#"query MintersDenied($watermark: BigInt!) {
  minters(where: { denyDate_gt: $watermark }, orderBy: "denyDate", orderDirection: "asc", limit: 50) {
    items { id txHash minter applyMessage applyDate suggestor denyDate denyMessage denyTxHash vetor }
  }
}"#,
};

pub const SAVINGS_RATE_PROPOSEDS: QuerySpec = QuerySpec {
    name: "SavingsRateProposeds",
    root_field: "savingsRateProposeds",
    document: r#"query SavingsRateProposeds($watermark: BigInt!) {
  savingsRateProposeds(where: { created_gt: $watermark }, orderBy: "created", orderDirection: "asc", limit: 50) {
    items { id created txHash proposer nextRate nextChange }
  }
}"#,
};

pub const SAVINGS_RATE_CHANGEDS: QuerySpec = QuerySpec {
    name: "SavingsRateChangeds",
    root_field: "savingsRateChangeds",
    document: r#"query SavingsRateChangeds($watermark: BigInt!) {
  savingsRateChangeds(where: { created_gt: $watermark }, orderBy: "created", orderDirection: "asc", limit: 50) {
    items { id created txHash approvedRate }
  }
}"#,
};

pub const RATE_CHANGES_PROPOSEDS: QuerySpec = QuerySpec {
    name: "RateChangesProposeds",
    root_field: "rateChangesProposeds",
    document: r#"query RateChangesProposeds($watermark: BigInt!) {
  rateChangesProposeds(where: { timestamp_gt: $watermark }, orderBy: "timestamp", orderDirection: "asc", limit: 50) {
    items { id who nextFeeRate nextSavingsFeeRate nextMintingFeeRate nextChange timestamp txHash }
  }
}"#,
};

pub const RATE_CHANGES_EXECUTEDS: QuerySpec = QuerySpec {
    name: "RateChangesExecuteds",
    root_field: "rateChangesExecuteds",
    document: r#"query RateChangesExecuteds($watermark: BigInt!) {
  rateChangesExecuteds(where: { timestamp_gt: $watermark }, orderBy: "timestamp", orderDirection: "asc", limit: 50) {
    items { id who nextFeeRate nextSavingsFeeRate nextMintingFeeRate timestamp txHash }
  }
}"#,
};

pub const EMERGENCY_STOPPEDS: QuerySpec = QuerySpec {
    name: "EmergencyStoppeds",
    root_field: "emergencyStoppeds",
    document: r#"query EmergencyStoppeds($watermark: BigInt!) {
  emergencyStoppeds(where: { timestamp_gt: $watermark }, orderBy: "timestamp", orderDirection: "asc", limit: 50) {
    items { id bridgeAddress caller message timestamp txHash }
  }
}"#,
};

pub const FORCED_SALES: QuerySpec = QuerySpec {
    name: "ForcedSales",
    root_field: "forcedSales",
    document: r#"query ForcedSales($watermark: BigInt!) {
  forcedSales(where: { timestamp_gt: $watermark }, orderBy: "timestamp", orderDirection: "asc", limit: 50) {
    items { id position amount timestamp txHash }
  }
}"#,
};

pub const POSITION_DENIALS: QuerySpec = QuerySpec {
    name: "PositionDeniedByGovernances",
    root_field: "positionDeniedByGovernances",
    document: r#"query PositionDeniedByGovernances($watermark: BigInt!) {
  positionDeniedByGovernances(where: { timestamp_gt: $watermark }, orderBy: "timestamp", orderDirection: "asc", limit: 50) {
    items { id position denier message timestamp txHash }
  }
}"#,
};

pub const CHALLENGES: QuerySpec = QuerySpec {
    name: "ChallengeV2s",
    root_field: "challengeV2s",
    document: r#"query ChallengeV2s($watermark: BigInt!) {
  challengeV2s(where: { created_gt: $watermark }, orderBy: "created", orderDirection: "asc", limit: 50) {
    items { id txHash position number challenger created duration size liqPrice }
  }
}"#,
};

pub const CHALLENGE_BIDS_SUCCEEDED: QuerySpec = QuerySpec {
    name: "ChallengeBidV2sSucceeded",
    root_field: "challengeBidV2s",
    document: r#"query ChallengeBidV2sSucceeded($watermark: BigInt!) {
  challengeBidV2s(where: { created_gt: $watermark, bidType: "Succeeded" }, orderBy: "created", orderDirection: "asc", limit: 50) {
    items { id txHash position number numberBid bidder created bidType bid price filledSize acquiredCollateral challengeSize }
  }
}"#,
};

pub const CHALLENGE_BIDS_AVERTED: QuerySpec = QuerySpec {
    name: "ChallengeBidV2sAverted",
    root_field: "challengeBidV2s",
    document: r#"query ChallengeBidV2sAverted($watermark: BigInt!) {
  challengeBidV2s(where: { created_gt: $watermark, bidType: "Averted" }, orderBy: "created", orderDirection: "asc", limit: 50) {
    items { id txHash position number numberBid bidder created bidType bid price filledSize acquiredCollateral challengeSize }
  }
}"#,
};

/// Every query, JuiceSwap first.
pub const ALL: [QuerySpec; 21] = [
    GOVERNOR_PROPOSALS_NEW,
    GOVERNOR_PROPOSALS_RESOLVED,
    FACTORY_OWNER_CHANGES,
    FEE_COLLECTOR_OWNER_UPDATES,
    FEE_COLLECTOR_ROUTER_UPDATES,
    FEE_COLLECTOR_COLLECTOR_UPDATES,
    FEE_COLLECTOR_PROTECTION_UPDATES,
    BRIDGED_TOKEN_REGISTRATIONS,
    POSITIONS_NEW,
    MINTERS_NEW,
    MINTERS_DENIED,
    SAVINGS_RATE_PROPOSEDS,
    SAVINGS_RATE_CHANGEDS,
    RATE_CHANGES_PROPOSEDS,
    RATE_CHANGES_EXECUTEDS,
    EMERGENCY_STOPPEDS,
    FORCED_SALES,
    POSITION_DENIALS,
    CHALLENGES,
    CHALLENGE_BIDS_SUCCEEDED,
    CHALLENGE_BIDS_AVERTED,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique_and_match_documents() {
        let mut names: Vec<&str> = ALL.iter().map(|q| q.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ALL.len());
        for q in ALL.iter() {
            assert!(q.document.starts_with(&format!("query {}(", q.name)), "{}", q.name);
            assert!(q.document.contains(&format!("{}(", q.root_field)), "{}", q.name);
        }
    }

    #[test]
    fn every_query_is_paged_and_parameterized() {
        for q in ALL.iter() {
            assert!(q.document.contains("$watermark: BigInt!"), "{}", q.name);
            assert!(q.document.contains(&format!("limit: {}", PAGE_LIMIT)), "{}", q.name);
            assert!(q.document.contains("orderDirection: \"asc\""), "{}", q.name);
        }
    }

    #[test]
    fn lookup_by_document_and_name() {
        let spec = QuerySpec::by_document(MINTERS_DENIED.document).unwrap();
        assert_eq!(spec.name, "MintersDenied");
        assert_eq!(QuerySpec::by_name("ForcedSales"), Some(&FORCED_SALES));
        assert!(QuerySpec::by_document("query Nope { x }").is_none());
    }
}
