//! Health counters.
//!
//! Pure bookkeeping: nothing here influences polling, delivery or commits.
//! A snapshot is logged every `HEALTH_LOG_INTERVAL_CYCLES` cycles.

use tokio::time::Instant;
use tracing::info;

use super::cycle::CycleOutcome;
use crate::types::category::Feed;
use crate::types::health::HealthSnapshot;

pub const HEALTH_LOG_INTERVAL_CYCLES: u64 = 20;

#[derive(Debug, Clone)]
pub struct HealthStats {
    started: Instant,
    cycles: u64,
    alerts_sent: u64,
    juiceswap_poll_errors: u64,
    juicedollar_poll_errors: u64,
    delivery_errors: u64,
    last_successful_poll: Option<Instant>,
}

impl HealthStats {
    pub fn new(started: Instant) -> Self {
        HealthStats {
            started,
            cycles: 0,
            alerts_sent: 0,
            juiceswap_poll_errors: 0,
            juicedollar_poll_errors: 0,
            delivery_errors: 0,
            last_successful_poll: None,
        }
    }

    /// Count one finished cycle.
    pub fn record_cycle(&mut self, outcome: &CycleOutcome, now: Instant) {
        self.cycles += 1;
        self.alerts_sent += outcome.delivered as u64;
        self.delivery_errors += outcome.delivery_failures as u64;
        self.juiceswap_poll_errors += u64::from(outcome.poll_errors_for(Feed::JuiceSwap));
        self.juicedollar_poll_errors += u64::from(outcome.poll_errors_for(Feed::JuiceDollar));
        if outcome.produced_result() {
            self.last_successful_poll = Some(now);
        }
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn delivery_errors(&self) -> u64 {
        self.delivery_errors
    }

    pub fn is_due(&self) -> bool {
        self.cycles > 0 && self.cycles % HEALTH_LOG_INTERVAL_CYCLES == 0
    }

    pub fn snapshot(&self, now: Instant) -> HealthSnapshot {
        HealthSnapshot {
            uptime_secs: now.saturating_duration_since(self.started).as_secs(),
            cycles: self.cycles,
            alerts_sent: self.alerts_sent,
            juiceswap_poll_errors: self.juiceswap_poll_errors,
            juicedollar_poll_errors: self.juicedollar_poll_errors,
            delivery_errors: self.delivery_errors,
            last_successful_poll_secs_ago: self
                .last_successful_poll
                .map(|t| now.saturating_duration_since(t).as_secs()),
        }
    }

    /// Log a snapshot when the cycle count hits the interval.
    pub fn log_if_due(&self, now: Instant) -> Option<HealthSnapshot> {
        if !self.is_due() {
            return None;
        }
        let s = self.snapshot(now);
        info!(
            uptime_secs = s.uptime_secs,
            cycles = s.cycles,
            alerts_sent = s.alerts_sent,
            juiceswap_poll_errors = s.juiceswap_poll_errors,
            juicedollar_poll_errors = s.juicedollar_poll_errors,
            delivery_errors = s.delivery_errors,
            last_successful_poll_secs_ago = ?s.last_successful_poll_secs_ago,
            "health"
        );
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::delivery::DeliveryReport;
    use crate::monitor::cycle::aggregate;
    use crate::types::alert::PollResult;

    fn outcome(swap_failures: u32, dollar_failures: u32) -> CycleOutcome {
        let mut swap = PollResult::empty(Feed::JuiceSwap);
        swap.queries = 8;
        swap.query_failures = swap_failures;
        let mut dollar = PollResult::empty(Feed::JuiceDollar);
        dollar.queries = 13;
        dollar.query_failures = dollar_failures;
        aggregate(vec![swap, dollar])
    }

    #[test]
    fn fresh_stats_never_polled() {
        let start = Instant::now();
        let stats = HealthStats::new(start);
        let s = stats.snapshot(start);
        assert_eq!(s.cycles, 0);
        assert_eq!(s.last_successful_poll_secs_ago, None);
        assert!(!stats.is_due());
    }

    #[test]
    fn counters_accumulate() {
        let start = Instant::now();
        let mut stats = HealthStats::new(start);

        let mut first = outcome(1, 0);
        let mut report = DeliveryReport::default();
        report.sent = 3;
        report.failures = 1;
        first.record_delivery(&report);
        stats.record_cycle(&first, start + Duration::from_secs(10));
        stats.record_cycle(&outcome(0, 2), start + Duration::from_secs(40));

        let s = stats.snapshot(start + Duration::from_secs(45));
        assert_eq!(s.cycles, 2);
        assert_eq!(s.alerts_sent, 3);
        assert_eq!(s.delivery_errors, 1);
        assert_eq!(s.juiceswap_poll_errors, 1);
        assert_eq!(s.juicedollar_poll_errors, 2);
        assert_eq!(s.uptime_secs, 45);
        assert_eq!(s.last_successful_poll_secs_ago, Some(5));
    }

    #[test]
    fn total_outage_keeps_last_success() {
        let start = Instant::now();
        let mut stats = HealthStats::new(start);
        stats.record_cycle(&outcome(0, 0), start + Duration::from_secs(1));
        stats.record_cycle(&outcome(8, 13), start + Duration::from_secs(31));
        let s = stats.snapshot(start + Duration::from_secs(31));
        assert_eq!(s.last_successful_poll_secs_ago, Some(30));
    }

    #[test]
    fn logs_every_twenty_cycles() {
        let start = Instant::now();
        let mut stats = HealthStats::new(start);
        let mut logged = 0;
        for _ in 0..45 {
            stats.record_cycle(&outcome(0, 0), start);
            if stats.log_if_due(start).is_some() {
                logged += 1;
            }
        }
        assert_eq!(logged, 2);
    }
}
