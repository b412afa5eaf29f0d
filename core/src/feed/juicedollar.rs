//! JuiceDollar indexer poller: positions, minters, savings and fee rates,
//! bridge emergencies, liquidations and challenges.

use std::sync::Arc;

use async_trait::async_trait;

use super::queries;
use super::records::{
    Challenge, ChallengeBid, EmergencyStop, ForcedSale, Minter, Position, PositionDenial,
    RateChanges, SavingsRateChanged, SavingsRateProposed,
};
use super::{fetch_page, PollBuilder, SourcePoller};
use crate::infrastructure::FeedClient;
use crate::render::{templates, RenderContext};
use crate::snapshot::watermark::WatermarkSet;
use crate::types::alert::PollResult;
use crate::types::category::{EventCategory, Feed};

pub struct JuiceDollarPoller {
    client: Arc<dyn FeedClient>,
}

impl JuiceDollarPoller {
    pub fn new(client: Arc<dyn FeedClient>) -> Self {
        JuiceDollarPoller { client }
    }
}

/// A minter application is only news while it has not been denied.
fn is_pending(m: &Minter) -> bool {
    m.deny_date.as_deref().map_or(true, str::is_empty)
}

#[async_trait]
impl SourcePoller for JuiceDollarPoller {
    fn feed(&self) -> Feed {
        Feed::JuiceDollar
    }

    async fn poll(&self, w: &WatermarkSet, ctx: &RenderContext) -> PollResult {
        let client = self.client.as_ref();
        let mut b = PollBuilder::new(Feed::JuiceDollar);

        let page = fetch_page::<Position>(
            client,
            &queries::POSITIONS_NEW,
            w.get(EventCategory::NewOriginalPosition),
        )
        .await;
        b.page(
            EventCategory::NewOriginalPosition,
            page,
            |e| Some(e.created.as_str()),
            |e| Some(templates::new_original_position(e, ctx)),
        );

        // Denied applications still advance the cursor.
        let page = fetch_page::<Minter>(
            client,
            &queries::MINTERS_NEW,
            w.get(EventCategory::MinterApplication),
        )
        .await;
        b.page(
            EventCategory::MinterApplication,
            page,
            |e| Some(e.apply_date.as_str()),
            |e| is_pending(e).then(|| templates::minter_application(e, ctx)),
        );

        let page = fetch_page::<Minter>(
            client,
            &queries::MINTERS_DENIED,
            w.get(EventCategory::MinterDenied),
        )
        .await;
        b.page(
            EventCategory::MinterDenied,
            page,
            |e| e.deny_date.as_deref(),
            |e| Some(templates::minter_denied(e, ctx)),
        );

        let page = fetch_page::<SavingsRateProposed>(
            client,
            &queries::SAVINGS_RATE_PROPOSEDS,
            w.get(EventCategory::SavingsRateProposed),
        )
        .await;
        b.page(
            EventCategory::SavingsRateProposed,
            page,
            |e| Some(e.created.as_str()),
            |e| Some(templates::savings_rate_proposed(e, ctx)),
        );

        let page = fetch_page::<SavingsRateChanged>(
            client,
            &queries::SAVINGS_RATE_CHANGEDS,
            w.get(EventCategory::SavingsRateChanged),
        )
        .await;
        b.page(
            EventCategory::SavingsRateChanged,
            page,
            |e| Some(e.created.as_str()),
            |e| Some(templates::savings_rate_changed(e, ctx)),
        );

        let page = fetch_page::<RateChanges>(
            client,
            &queries::RATE_CHANGES_PROPOSEDS,
            w.get(EventCategory::FeeRateChangesProposed),
        )
        .await;
        b.page(
            EventCategory::FeeRateChangesProposed,
            page,
            |e| Some(e.timestamp.as_str()),
            |e| Some(templates::fee_rate_changes_proposed(e, ctx)),
        );

        let page = fetch_page::<RateChanges>(
            client,
            &queries::RATE_CHANGES_EXECUTEDS,
            w.get(EventCategory::FeeRateChangesExecuted),
        )
        .await;
        b.page(
            EventCategory::FeeRateChangesExecuted,
            page,
            |e| Some(e.timestamp.as_str()),
            |e| Some(templates::fee_rate_changes_executed(e, ctx)),
        );

        let page = fetch_page::<EmergencyStop>(
            client,
            &queries::EMERGENCY_STOPPEDS,
            w.get(EventCategory::EmergencyStop),
        )
        .await;
        b.page(
            EventCategory::EmergencyStop,
            page,
            |e| Some(e.timestamp.as_str()),
            |e| Some(templates::emergency_stop(e, ctx)),
        );

        let page = fetch_page::<ForcedSale>(
            client,
            &queries::FORCED_SALES,
            w.get(EventCategory::ForcedLiquidation),
        )
        .await;
        b.page(
            EventCategory::ForcedLiquidation,
            page,
            |e| Some(e.timestamp.as_str()),
            |e| Some(templates::forced_liquidation(e, ctx)),
        );

        let page = fetch_page::<PositionDenial>(
            client,
            &queries::POSITION_DENIALS,
            w.get(EventCategory::PositionDenied),
        )
        .await;
        b.page(
            EventCategory::PositionDenied,
            page,
            |e| Some(e.timestamp.as_str()),
            |e| Some(templates::position_denied(e, ctx)),
        );

        let page = fetch_page::<Challenge>(
            client,
            &queries::CHALLENGES,
            w.get(EventCategory::ChallengeStarted),
        )
        .await;
        b.page(
            EventCategory::ChallengeStarted,
            page,
            |e| Some(e.created.as_str()),
            |e| Some(templates::challenge_started(e, ctx)),
        );

        let page = fetch_page::<ChallengeBid>(
            client,
            &queries::CHALLENGE_BIDS_SUCCEEDED,
            w.get(EventCategory::ChallengeSucceeded),
        )
        .await;
        b.page(
            EventCategory::ChallengeSucceeded,
            page,
            |e| Some(e.created.as_str()),
            |e| Some(templates::challenge_succeeded(e, ctx)),
        );

        let page = fetch_page::<ChallengeBid>(
            client,
            &queries::CHALLENGE_BIDS_AVERTED,
            w.get(EventCategory::ChallengeAverted),
        )
        .await;
        b.page(
            EventCategory::ChallengeAverted,
            page,
            |e| Some(e.created.as_str()),
            |e| Some(templates::challenge_averted(e, ctx)),
        );

        b.finish()
    }
}
