//! Poll cycle orchestrator.
//!
//! # Phases
//!
//! 1. **Init**: load the watermark set, announce startup.
//! 2. **CatchUp** (first run only): poll back to back until a cycle yields
//!    no alert outside the categories held by failed sends, persisting after
//!    every iteration.
//! 3. **Steady**: poll all sources in parallel every interval, deliver,
//!    commit the categories that delivered cleanly, persist.
//! 4. **Shutdown**: persist one final time.
//!
//! The watermark set is owned here. Sources and the delivery engine only
//! read it or return values. Cancellation is checked before each cycle,
//! before each catch-up iteration and during every wait.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::cycle::{aggregate, CycleOutcome};
use super::health::HealthStats;
use crate::delivery::{DeliveryEngine, DeliveryPolicy};
use crate::error::{ConfigError, StoreError};
use crate::feed::juicedollar::JuiceDollarPoller;
use crate::feed::juiceswap::JuiceSwapPoller;
use crate::feed::SourcePoller;
use crate::infrastructure::graphql::HttpFeedClient;
use crate::infrastructure::telegram::TelegramTransport;
use crate::infrastructure::REQUEST_TIMEOUT;
use crate::render::RenderContext;
use crate::snapshot::store::WatermarkStore;
use crate::snapshot::watermark::{Cursor, WatermarkSet};
use crate::types::config::{CatchUpPolicy, InitMode, Settings};
use crate::types::health::HealthSnapshot;

/// Pause between catch-up iterations.
pub const CATCH_UP_THROTTLE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    CatchUp,
    Steady,
    Shutdown,
}

/// Orchestrator knobs derived from `Settings`.
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    pub poll_interval: Duration,
    pub init_mode: InitMode,
    pub catch_up_policy: CatchUpPolicy,
    pub catch_up_throttle: Duration,
    pub explorer_url: String,
    /// Stop after this many steady cycles; `None` runs until cancelled.
    pub max_steady_cycles: Option<u64>,
    pub startup_message: String,
}

impl MonitorOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        MonitorOptions {
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
            init_mode: settings.init_mode,
            catch_up_policy: settings.catch_up_policy,
            catch_up_throttle: CATCH_UP_THROTTLE,
            explorer_url: settings.citrea_explorer_url.clone(),
            max_steady_cycles: None,
            startup_message: startup_message(settings),
        }
    }

    /// Run a single steady cycle, then shut down.
    pub fn once(mut self) -> Self {
        self.max_steady_cycles = Some(1);
        self
    }
}

pub fn startup_message(settings: &Settings) -> String {
    format!(
        "<b>Juice Monitor Started</b>\n\n\
         JuiceSwap: {}\n\
         JuiceDollar: {}\n\
         Poll interval: {}s\n\
         Init mode: {}",
        settings.juiceswap_graphql_url,
        settings.juicedollar_graphql_url,
        settings.poll_interval_ms as f64 / 1000.0,
        settings.init_mode.as_str(),
    )
}

/// What catch-up did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatchUpSummary {
    pub cycles: u64,
    /// Historical alerts observed, whether or not they were sent.
    pub events: usize,
    /// False when cancellation cut the phase short.
    pub completed: bool,
}

/// What a whole run did, returned once the monitor has shut down.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub catch_up: Option<CatchUpSummary>,
    pub steady_cycles: u64,
    pub health: HealthSnapshot,
    pub watermarks: WatermarkSet,
}

// ---------------------------------------------------------------------------
// Monitor
// ---------------------------------------------------------------------------

pub struct Monitor {
    store: WatermarkStore,
    sources: Vec<Arc<dyn SourcePoller>>,
    delivery: DeliveryEngine,
    options: MonitorOptions,
    cancel: CancellationToken,
    health: HealthStats,
    phase: Phase,
}

impl Monitor {
    pub fn new(
        store: WatermarkStore,
        sources: Vec<Arc<dyn SourcePoller>>,
        delivery: DeliveryEngine,
        options: MonitorOptions,
        cancel: CancellationToken,
    ) -> Self {
        Monitor {
            store,
            sources,
            delivery,
            options,
            cancel,
            health: HealthStats::new(Instant::now()),
            phase: Phase::Init,
        }
    }

    /// Wire the HTTP feed clients and the Telegram transport from settings.
    pub fn connect(
        settings: &Settings,
        options: MonitorOptions,
        cancel: CancellationToken,
    ) -> Result<Self, ConfigError> {
        let swap = HttpFeedClient::new(settings.juiceswap_graphql_url.clone(), REQUEST_TIMEOUT)?;
        let dollar = HttpFeedClient::new(settings.juicedollar_graphql_url.clone(), REQUEST_TIMEOUT)?;
        let transport = TelegramTransport::new(
            &settings.telegram_api_url,
            &settings.telegram_bot_token,
            settings.telegram_chat_id.clone(),
            REQUEST_TIMEOUT,
        )?;
        let sources: Vec<Arc<dyn SourcePoller>> = vec![
            Arc::new(JuiceSwapPoller::new(Arc::new(swap))),
            Arc::new(JuiceDollarPoller::new(Arc::new(dollar))),
        ];
        Ok(Monitor::new(
            WatermarkStore::new(settings.watermark_path.clone()),
            sources,
            DeliveryEngine::new(Arc::new(transport), DeliveryPolicy::default()),
            options,
            cancel,
        ))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run every phase to completion. Only a failure to load the watermark
    /// file is returned; everything after that is contained and logged.
    pub async fn run(mut self) -> Result<RunSummary, StoreError> {
        let default = self.default_cursor();
        let loaded = self.store.load(&default)?;
        let mut watermarks = loaded.watermarks.clone();
        info!(
            path = %self.store.path().display(),
            origin = ?loaded.origin,
            first_run = loaded.is_first_run(),
            "watermarks loaded"
        );

        let startup = self.options.startup_message.clone();
        self.delivery.notify(&startup).await;

        let catch_up = if loaded.is_first_run() {
            Some(self.catch_up(&mut watermarks).await)
        } else {
            None
        };

        let steady_cycles = self.steady(&mut watermarks).await;

        self.enter(Phase::Shutdown);
        self.persist(&watermarks);
        info!("monitor stopped");

        Ok(RunSummary {
            catch_up,
            steady_cycles,
            health: self.health.snapshot(Instant::now()),
            watermarks,
        })
    }

    fn default_cursor(&self) -> Cursor {
        match self.options.init_mode {
            InitMode::Now => Cursor::from_epoch_secs(chrono::Utc::now().timestamp()),
            InitMode::Genesis => Cursor::genesis(),
        }
    }

    fn enter(&mut self, phase: Phase) {
        debug!(from = ?self.phase, to = ?phase, "phase transition");
        self.phase = phase;
    }

    // ---- catch-up ----

    async fn catch_up(&mut self, watermarks: &mut WatermarkSet) -> CatchUpSummary {
        self.enter(Phase::CatchUp);
        info!(policy = self.options.catch_up_policy.as_str(), "catch-up started");
        let mut summary = CatchUpSummary::default();

        loop {
            if self.cancel.is_cancelled() {
                info!(cycles = summary.cycles, "catch-up interrupted");
                return summary;
            }

            let mut outcome = self.poll_all(watermarks).await;
            summary.cycles += 1;
            summary.events += outcome.alerts.len();

            match self.options.catch_up_policy {
                CatchUpPolicy::LogOnly => {
                    for alert in &outcome.alerts {
                        info!(category = %alert.category, "historical event, not sent");
                    }
                }
                CatchUpPolicy::Deliver => self.deliver(&mut outcome).await,
            }
            self.commit(watermarks, &outcome);
            self.persist(watermarks);
            self.health.record_cycle(&outcome, Instant::now());

            debug!(
                cycle = summary.cycles,
                alerts = outcome.alerts.len(),
                "catch-up cycle finished"
            );
            // Alerts of held categories come back unchanged on the next poll.
            if outcome
                .alerts
                .iter()
                .all(|a| outcome.failed.contains(&a.category))
            {
                if !outcome.failed.is_empty() {
                    warn!(held = ?outcome.failed, "catch-up ending with undelivered categories");
                }
                break;
            }

            if self.cancellable_sleep(self.options.catch_up_throttle).await {
                info!(cycles = summary.cycles, "catch-up interrupted");
                return summary;
            }
        }

        summary.completed = true;
        info!(cycles = summary.cycles, events = summary.events, "catch-up complete");
        let text = format!(
            "<b>Catch-up Complete</b>\n\n\
             Cycles: {}\n\
             Historical events: {}",
            summary.cycles, summary.events
        );
        self.delivery.notify(&text).await;
        summary
    }

    // ---- steady state ----

    async fn steady(&mut self, watermarks: &mut WatermarkSet) -> u64 {
        self.enter(Phase::Steady);
        let mut cycles = 0u64;

        while !self.cancel.is_cancelled() {
            let started = Instant::now();
            self.run_cycle(watermarks).await;
            cycles += 1;

            if self.options.max_steady_cycles.is_some_and(|max| cycles >= max) {
                break;
            }
            let wait = self.options.poll_interval.saturating_sub(started.elapsed());
            if self.cancellable_sleep(wait).await {
                break;
            }
        }
        cycles
    }

    /// One steady cycle: poll, deliver, gated commit, persist, count.
    pub async fn run_cycle(&mut self, watermarks: &mut WatermarkSet) -> CycleOutcome {
        let mut outcome = self.poll_all(watermarks).await;
        self.deliver(&mut outcome).await;
        self.commit(watermarks, &outcome);
        if outcome.produced_result() {
            self.persist(watermarks);
        } else {
            warn!("no source answered, watermarks not persisted this cycle");
        }

        let now = Instant::now();
        self.health.record_cycle(&outcome, now);
        self.health.log_if_due(now);
        outcome
    }

    // ---- steps ----

    async fn poll_all(&self, watermarks: &WatermarkSet) -> CycleOutcome {
        let ctx = RenderContext::now(self.options.explorer_url.clone());
        let polls = self.sources.iter().map(|source| source.poll(watermarks, &ctx));
        aggregate(join_all(polls).await)
    }

    async fn deliver(&self, outcome: &mut CycleOutcome) {
        if outcome.alerts.is_empty() {
            return;
        }
        info!(alerts = outcome.alerts.len(), "sending alerts");
        let report = self.delivery.send_all(&outcome.alerts).await;
        if report.failures > 0 {
            warn!(
                failures = report.failures,
                categories = ?report.failed_categories,
                "some alerts were not delivered"
            );
        }
        outcome.record_delivery(&report);
    }

    fn commit(&self, watermarks: &mut WatermarkSet, outcome: &CycleOutcome) {
        let committed = outcome.commit(watermarks);
        for category in &committed.advanced {
            debug!(
                category = %category,
                cursor = %committed.watermarks.get(*category),
                "watermark advanced"
            );
        }
        if !committed.withheld.is_empty() {
            warn!(
                categories = ?committed.withheld,
                "watermarks held back for retry next cycle"
            );
        }
        *watermarks = committed.watermarks;
    }

    fn persist(&self, watermarks: &WatermarkSet) {
        if let Err(e) = self.store.save(watermarks) {
            error!(error = %e, "failed to persist watermarks");
        }
    }

    /// Sleep for `duration` unless cancelled first. Returns true on cancel.
    async fn cancellable_sleep(&self, duration: Duration) -> bool {
        tokio::select! {
            () = self.cancel.cancelled() => true,
            () = tokio::time::sleep(duration) => self.cancel.is_cancelled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mock::{MockSource, MockTransport};
    use crate::types::alert::{Alert, PollResult};
    use crate::types::category::{EventCategory, Feed};
    use tempfile::TempDir;

    fn options(policy: CatchUpPolicy) -> MonitorOptions {
        MonitorOptions {
            poll_interval: Duration::from_secs(30),
            init_mode: InitMode::Genesis,
            catch_up_policy: policy,
            catch_up_throttle: CATCH_UP_THROTTLE,
            explorer_url: "https://citreascan.com".into(),
            max_steady_cycles: Some(1),
            startup_message: "started".into(),
        }
    }

    fn result_with(feed: Feed, category: EventCategory, cursor: &str, alerts: usize) -> PollResult {
        let mut r = MockSource::quiet_result(feed);
        for i in 0..alerts {
            r.alerts.push(Alert::new(category, format!("event {} at {}", i, cursor)));
        }
        r.candidates.propose(category, Cursor::new(cursor));
        r
    }

    struct Harness {
        _dir: TempDir,
        store: WatermarkStore,
        swap: Arc<MockSource>,
        dollar: Arc<MockSource>,
        transport: Arc<MockTransport>,
        cancel: CancellationToken,
    }

    impl Harness {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let store = WatermarkStore::new(dir.path().join("wm.json"));
            Harness {
                _dir: dir,
                store,
                swap: Arc::new(MockSource::new(Feed::JuiceSwap)),
                dollar: Arc::new(MockSource::new(Feed::JuiceDollar)),
                transport: Arc::new(MockTransport::default()),
                cancel: CancellationToken::new(),
            }
        }

        fn monitor(&self, options: MonitorOptions) -> Monitor {
            let sources: Vec<Arc<dyn SourcePoller>> = vec![
                self.swap.clone() as Arc<dyn SourcePoller>,
                self.dollar.clone() as Arc<dyn SourcePoller>,
            ];
            Monitor::new(
                self.store.clone(),
                sources,
                DeliveryEngine::new(self.transport.clone(), DeliveryPolicy::default()),
                options,
                self.cancel.clone(),
            )
        }
    }

    #[test]
    fn startup_message_lists_feeds() {
        let mut settings = Settings::default();
        settings.poll_interval_ms = 15_000;
        let text = startup_message(&settings);
        assert!(text.contains("Juice Monitor Started"));
        assert!(text.contains("https://dev.ponder.juiceswap.com/graphql"));
        assert!(text.contains("Poll interval: 15s"));
        assert!(text.contains("Init mode: now"));
    }

    #[tokio::test(start_paused = true)]
    async fn log_only_catch_up_drains_without_sending() {
        let h = Harness::new();
        h.dollar.push(result_with(
            Feed::JuiceDollar,
            EventCategory::ForcedLiquidation,
            "500",
            3,
        ));
        h.dollar.push(result_with(
            Feed::JuiceDollar,
            EventCategory::ForcedLiquidation,
            "900",
            2,
        ));

        let summary = h.monitor(options(CatchUpPolicy::LogOnly)).run().await.unwrap();

        let catch_up = summary.catch_up.unwrap();
        assert_eq!(catch_up.cycles, 3);
        assert_eq!(catch_up.events, 5);
        assert!(catch_up.completed);
        // Startup and catch-up summary only.
        assert_eq!(h.transport.post_count(), 2);
        assert_eq!(
            summary.watermarks.get(EventCategory::ForcedLiquidation),
            &Cursor::new("900")
        );
        let persisted = h.store.load(&Cursor::genesis()).unwrap().watermarks;
        assert_eq!(persisted, summary.watermarks);
    }

    #[tokio::test(start_paused = true)]
    async fn deliver_catch_up_sends_and_gates_commit() {
        let h = Harness::new();
        h.transport.reject_containing("at 700");
        h.swap.push(result_with(
            Feed::JuiceSwap,
            EventCategory::FactoryOwnerChanged,
            "700",
            1,
        ));

        let summary = h.monitor(options(CatchUpPolicy::Deliver)).run().await.unwrap();

        let catch_up = summary.catch_up.unwrap();
        assert_eq!(catch_up.cycles, 1);
        assert!(catch_up.completed);
        assert_eq!(
            summary.watermarks.get(EventCategory::FactoryOwnerChanged),
            &Cursor::genesis()
        );
        assert_eq!(summary.health.delivery_errors, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn deliver_catch_up_stops_once_only_held_alerts_remain() {
        let h = Harness::new();
        h.transport.reject_containing("at 700");
        let held = result_with(Feed::JuiceSwap, EventCategory::FactoryOwnerChanged, "700", 1);
        // The held category is served again from its unchanged cursor.
        for _ in 0..3 {
            h.swap.push(held.clone());
        }
        h.dollar.push(result_with(
            Feed::JuiceDollar,
            EventCategory::ForcedLiquidation,
            "500",
            1,
        ));

        let summary = h.monitor(options(CatchUpPolicy::Deliver)).run().await.unwrap();

        let catch_up = summary.catch_up.unwrap();
        assert_eq!(catch_up.cycles, 2);
        assert!(catch_up.completed);
        assert_eq!(
            summary.watermarks.get(EventCategory::ForcedLiquidation),
            &Cursor::new("500")
        );
        assert_eq!(
            summary.watermarks.get(EventCategory::FactoryOwnerChanged),
            &Cursor::genesis()
        );
        assert_eq!(h.swap.seen()[1].get(EventCategory::FactoryOwnerChanged), &Cursor::genesis());
        // Two catch-up cycles and one steady cycle, three attempts each.
        assert_eq!(summary.health.delivery_errors, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn existing_file_skips_catch_up() {
        let h = Harness::new();
        h.store
            .save(&WatermarkSet::uniform(Cursor::new("100")))
            .unwrap();

        let summary = h.monitor(options(CatchUpPolicy::LogOnly)).run().await.unwrap();
        assert!(summary.catch_up.is_none());
        assert_eq!(summary.steady_cycles, 1);
        assert_eq!(h.swap.poll_count(), 1);
        assert_eq!(h.swap.seen()[0], WatermarkSet::uniform(Cursor::new("100")));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_start_still_persists() {
        let h = Harness::new();
        h.cancel.cancel();
        let mut opts = options(CatchUpPolicy::LogOnly);
        opts.max_steady_cycles = None;

        let summary = h.monitor(opts).run().await.unwrap();
        let catch_up = summary.catch_up.unwrap();
        assert_eq!(catch_up.cycles, 0);
        assert!(!catch_up.completed);
        assert_eq!(summary.steady_cycles, 0);
        assert_eq!(h.swap.poll_count(), 0);
        assert!(h.store.path().exists());
        assert!(!h.store.tmp_path().exists());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_during_wait_stops_steady_loop() {
        let h = Harness::new();
        h.store.save(&WatermarkSet::uniform(Cursor::new("1"))).unwrap();
        let mut opts = options(CatchUpPolicy::LogOnly);
        opts.max_steady_cycles = None;
        let monitor = h.monitor(opts);

        let cancel = h.cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(75)).await;
            cancel.cancel();
        });
        let summary = monitor.run().await.unwrap();
        // Cycles at t=0, 30 and 60; cancelled while waiting for t=90.
        assert_eq!(summary.steady_cycles, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn total_poll_outage_is_not_persisted() {
        let h = Harness::new();
        let mut down = PollResult::empty(Feed::JuiceSwap);
        down.queries = 8;
        down.query_failures = 8;
        h.swap.push(down);
        let mut down = PollResult::empty(Feed::JuiceDollar);
        down.queries = 13;
        down.query_failures = 13;
        h.dollar.push(down);

        let mut monitor = h.monitor(options(CatchUpPolicy::LogOnly));
        let mut watermarks = WatermarkSet::uniform(Cursor::new("5"));
        let outcome = monitor.run_cycle(&mut watermarks).await;
        assert!(!outcome.produced_result());
        assert_eq!(outcome.poll_errors_for(Feed::JuiceDollar), 13);
        assert!(!h.store.path().exists());
        assert_eq!(monitor.phase(), Phase::Init);
    }
}
