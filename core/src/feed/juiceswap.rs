//! JuiceSwap indexer poller: governor proposals, factory and fee collector
//! administration, bridged token registrations.

use std::sync::Arc;

use async_trait::async_trait;

use super::queries;
use super::records::{
    BridgedTokenRegistration, FactoryOwnerChange, FeeCollectorCollectorUpdate,
    FeeCollectorOwnerUpdate, FeeCollectorProtectionUpdate, FeeCollectorRouterUpdate,
    GovernorProposal,
};
use super::{fetch_page, last_cursor, PollBuilder, SourcePoller};
use crate::infrastructure::FeedClient;
use crate::render::{templates, RenderContext};
use crate::snapshot::watermark::{Cursor, WatermarkSet};
use crate::types::alert::{Alert, PollResult};
use crate::types::category::{EventCategory, Feed};

pub struct JuiceSwapPoller {
    client: Arc<dyn FeedClient>,
}

impl JuiceSwapPoller {
    pub fn new(client: Arc<dyn FeedClient>) -> Self {
        JuiceSwapPoller { client }
    }

    /// Executed and vetoed proposals share one query. It runs from the lower
    /// of the two watermarks; an item only alerts for the category whose own
    /// watermark it passes.
    async fn resolved_proposals(&self, b: &mut PollBuilder, w: &WatermarkSet, ctx: &RenderContext) {
        const PAIR: [EventCategory; 2] = [
            EventCategory::GovernorProposalExecuted,
            EventCategory::GovernorProposalVetoed,
        ];
        let executed_mark = w.get(EventCategory::GovernorProposalExecuted);
        let vetoed_mark = w.get(EventCategory::GovernorProposalVetoed);
        let lower = if vetoed_mark.is_after(executed_mark) {
            executed_mark
        } else {
            vetoed_mark
        };

        let items = match fetch_page::<GovernorProposal>(
            self.client.as_ref(),
            &queries::GOVERNOR_PROPOSALS_RESOLVED,
            lower,
        )
        .await
        {
            Ok(items) => items,
            Err(e) => {
                b.failed(&PAIR, &e);
                return;
            }
        };
        b.answered();

        for p in &items {
            let Some(resolved) = p.resolved_at.as_deref().map(Cursor::new) else {
                continue;
            };
            match p.status.as_str() {
                "executed" if resolved.is_after(executed_mark) => b.alert(Alert::new(
                    EventCategory::GovernorProposalExecuted,
                    templates::governor_proposal_executed(p, ctx),
                )),
                "vetoed" if resolved.is_after(vetoed_mark) => b.alert(Alert::new(
                    EventCategory::GovernorProposalVetoed,
                    templates::governor_proposal_vetoed(p, ctx),
                )),
                _ => {}
            }
        }

        let candidate = last_cursor(&items, |p| p.resolved_at.as_deref());
        for category in PAIR {
            b.propose(category, candidate.clone());
        }
    }
}

#[async_trait]
impl SourcePoller for JuiceSwapPoller {
    fn feed(&self) -> Feed {
        Feed::JuiceSwap
    }

    async fn poll(&self, w: &WatermarkSet, ctx: &RenderContext) -> PollResult {
        let client = self.client.as_ref();
        let mut b = PollBuilder::new(Feed::JuiceSwap);

        let page = fetch_page::<GovernorProposal>(
            client,
            &queries::GOVERNOR_PROPOSALS_NEW,
            w.get(EventCategory::GovernorProposalCreated),
        )
        .await;
        b.page(
            EventCategory::GovernorProposalCreated,
            page,
            |p| Some(p.created_at.as_str()),
            |p| Some(templates::governor_proposal_created(p, ctx)),
        );

        self.resolved_proposals(&mut b, w, ctx).await;

        let page = fetch_page::<FactoryOwnerChange>(
            client,
            &queries::FACTORY_OWNER_CHANGES,
            w.get(EventCategory::FactoryOwnerChanged),
        )
        .await;
        b.page(
            EventCategory::FactoryOwnerChanged,
            page,
            |e| Some(e.block_timestamp.as_str()),
            |e| Some(templates::factory_owner_changed(e, ctx)),
        );

        let page = fetch_page::<FeeCollectorOwnerUpdate>(
            client,
            &queries::FEE_COLLECTOR_OWNER_UPDATES,
            w.get(EventCategory::FeeCollectorOwnerUpdated),
        )
        .await;
        b.page(
            EventCategory::FeeCollectorOwnerUpdated,
            page,
            |e| Some(e.block_timestamp.as_str()),
            |e| Some(templates::fee_collector_owner_updated(e, ctx)),
        );

        let page = fetch_page::<FeeCollectorRouterUpdate>(
            client,
            &queries::FEE_COLLECTOR_ROUTER_UPDATES,
            w.get(EventCategory::SwapRouterUpdated),
        )
        .await;
        b.page(
            EventCategory::SwapRouterUpdated,
            page,
            |e| Some(e.block_timestamp.as_str()),
            |e| Some(templates::swap_router_updated(e, ctx)),
        );

        let page = fetch_page::<FeeCollectorCollectorUpdate>(
            client,
            &queries::FEE_COLLECTOR_COLLECTOR_UPDATES,
            w.get(EventCategory::FeeCollectorUpdated),
        )
        .await;
        b.page(
            EventCategory::FeeCollectorUpdated,
            page,
            |e| Some(e.block_timestamp.as_str()),
            |e| Some(templates::fee_collector_updated(e, ctx)),
        );

        let page = fetch_page::<FeeCollectorProtectionUpdate>(
            client,
            &queries::FEE_COLLECTOR_PROTECTION_UPDATES,
            w.get(EventCategory::ProtectionParamsUpdated),
        )
        .await;
        b.page(
            EventCategory::ProtectionParamsUpdated,
            page,
            |e| Some(e.block_timestamp.as_str()),
            |e| Some(templates::protection_params_updated(e, ctx)),
        );

        let page = fetch_page::<BridgedTokenRegistration>(
            client,
            &queries::BRIDGED_TOKEN_REGISTRATIONS,
            w.get(EventCategory::BridgedTokenRegistered),
        )
        .await;
        b.page(
            EventCategory::BridgedTokenRegistered,
            page,
            |e| Some(e.block_timestamp.as_str()),
            |e| Some(templates::bridged_token_registered(e, ctx)),
        );

        b.finish()
    }
}
