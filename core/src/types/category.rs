use std::fmt;

use serde::{Deserialize, Serialize};

/// The two upstream GraphQL indexers the monitor polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    JuiceSwap,
    JuiceDollar,
}

impl Feed {
    pub const ALL: [Feed; 2] = [Feed::JuiceSwap, Feed::JuiceDollar];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feed::JuiceSwap => "juiceswap",
            Feed::JuiceDollar => "juicedollar",
        }
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every protocol occurrence the monitor tracks a watermark for.
///
/// The set is closed: the serialized tags are the keys of the persisted
/// watermark file, and an unknown tag fails deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventCategory {
    GovernorProposalCreated,
    MinterApplication,
    NewOriginalPosition,
    SavingsRateProposed,
    FeeRateChangesProposed,
    EmergencyStop,
    ForcedLiquidation,
    GovernorProposalExecuted,
    GovernorProposalVetoed,
    FactoryOwnerChanged,
    FeeCollectorOwnerUpdated,
    SwapRouterUpdated,
    FeeCollectorUpdated,
    ProtectionParamsUpdated,
    BridgedTokenRegistered,
    PositionDenied,
    MinterDenied,
    ChallengeStarted,
    ChallengeSucceeded,
    ChallengeAverted,
    SavingsRateChanged,
    FeeRateChangesExecuted,
}

impl EventCategory {
    pub const COUNT: usize = 22;

    /// Declaration order; `ALL[i] as usize == i`.
    pub const ALL: [EventCategory; EventCategory::COUNT] = [
        EventCategory::GovernorProposalCreated,
        EventCategory::MinterApplication,
        EventCategory::NewOriginalPosition,
        EventCategory::SavingsRateProposed,
        EventCategory::FeeRateChangesProposed,
        EventCategory::EmergencyStop,
        EventCategory::ForcedLiquidation,
        EventCategory::GovernorProposalExecuted,
        EventCategory::GovernorProposalVetoed,
        EventCategory::FactoryOwnerChanged,
        EventCategory::FeeCollectorOwnerUpdated,
        EventCategory::SwapRouterUpdated,
        EventCategory::FeeCollectorUpdated,
        EventCategory::ProtectionParamsUpdated,
        EventCategory::BridgedTokenRegistered,
        EventCategory::PositionDenied,
        EventCategory::MinterDenied,
        EventCategory::ChallengeStarted,
        EventCategory::ChallengeSucceeded,
        EventCategory::ChallengeAverted,
        EventCategory::SavingsRateChanged,
        EventCategory::FeeRateChangesExecuted,
    ];

    /// The serialized tag, identical to the key used in the watermark file.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::GovernorProposalCreated => "governorProposalCreated",
            EventCategory::MinterApplication => "minterApplication",
            EventCategory::NewOriginalPosition => "newOriginalPosition",
            EventCategory::SavingsRateProposed => "savingsRateProposed",
            EventCategory::FeeRateChangesProposed => "feeRateChangesProposed",
            EventCategory::EmergencyStop => "emergencyStop",
            EventCategory::ForcedLiquidation => "forcedLiquidation",
            EventCategory::GovernorProposalExecuted => "governorProposalExecuted",
            EventCategory::GovernorProposalVetoed => "governorProposalVetoed",
            EventCategory::FactoryOwnerChanged => "factoryOwnerChanged",
            EventCategory::FeeCollectorOwnerUpdated => "feeCollectorOwnerUpdated",
            EventCategory::SwapRouterUpdated => "swapRouterUpdated",
            EventCategory::FeeCollectorUpdated => "feeCollectorUpdated",
            EventCategory::ProtectionParamsUpdated => "protectionParamsUpdated",
            EventCategory::BridgedTokenRegistered => "bridgedTokenRegistered",
            EventCategory::PositionDenied => "positionDenied",
            EventCategory::MinterDenied => "minterDenied",
            EventCategory::ChallengeStarted => "challengeStarted",
            EventCategory::ChallengeSucceeded => "challengeSucceeded",
            EventCategory::ChallengeAverted => "challengeAverted",
            EventCategory::SavingsRateChanged => "savingsRateChanged",
            EventCategory::FeeRateChangesExecuted => "feeRateChangesExecuted",
        }
    }

    /// The feed whose queries produce this category.
    pub fn feed(&self) -> Feed {
        match self {
            EventCategory::GovernorProposalCreated
            | EventCategory::GovernorProposalExecuted
            | EventCategory::GovernorProposalVetoed
            | EventCategory::FactoryOwnerChanged
            | EventCategory::FeeCollectorOwnerUpdated
            | EventCategory::SwapRouterUpdated
            | EventCategory::FeeCollectorUpdated
            | EventCategory::ProtectionParamsUpdated
            | EventCategory::BridgedTokenRegistered => Feed::JuiceSwap,

            EventCategory::MinterApplication
            | EventCategory::NewOriginalPosition
            | EventCategory::SavingsRateProposed
            | EventCategory::FeeRateChangesProposed
            | EventCategory::EmergencyStop
            | EventCategory::ForcedLiquidation
            | EventCategory::PositionDenied
            | EventCategory::MinterDenied
            | EventCategory::ChallengeStarted
            | EventCategory::ChallengeSucceeded
            | EventCategory::ChallengeAverted
            | EventCategory::SavingsRateChanged
            | EventCategory::FeeRateChangesExecuted => Feed::JuiceDollar,
        }
    }

    /// Name of the item field the feed orders and filters this category by.
    pub fn cursor_field(&self) -> &'static str {
        match self {
            EventCategory::GovernorProposalCreated => "createdAt",
            EventCategory::GovernorProposalExecuted | EventCategory::GovernorProposalVetoed => {
                "resolvedAt"
            }
            EventCategory::FactoryOwnerChanged
            | EventCategory::FeeCollectorOwnerUpdated
            | EventCategory::SwapRouterUpdated
            | EventCategory::FeeCollectorUpdated
            | EventCategory::ProtectionParamsUpdated
            | EventCategory::BridgedTokenRegistered => "blockTimestamp",
            EventCategory::NewOriginalPosition
            | EventCategory::SavingsRateProposed
            | EventCategory::SavingsRateChanged
            | EventCategory::ChallengeStarted
            | EventCategory::ChallengeSucceeded
            | EventCategory::ChallengeAverted => "created",
            EventCategory::MinterApplication => "applyDate",
            EventCategory::MinterDenied => "denyDate",
            EventCategory::FeeRateChangesProposed
            | EventCategory::FeeRateChangesExecuted
            | EventCategory::EmergencyStop
            | EventCategory::ForcedLiquidation
            | EventCategory::PositionDenied => "timestamp",
        }
    }

    /// All categories owned by `feed`, in declaration order.
    pub fn owned_by(feed: Feed) -> impl Iterator<Item = EventCategory> {
        Self::ALL.into_iter().filter(move |c| c.feed() == feed)
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
