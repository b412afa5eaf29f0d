//! Delivery engine.
//!
//! Sends alerts one at a time through a `ChatTransport`. Transient failures
//! (network errors, timeouts, non-429 statuses) spend the attempt budget of
//! the `RetryPolicy`; provider rate limiting spends a separate cumulative
//! wait budget. Exhausting either one fails the send.

pub mod retry;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::error::{DeliveryError, TransportError};
use crate::infrastructure::{ChatTransport, OutboundMessage, SendStatus, REQUEST_TIMEOUT};
use crate::types::alert::Alert;
use crate::types::category::EventCategory;

use self::retry::RetryPolicy;

/// Telegram's message length ceiling, in characters.
pub const MAX_MESSAGE_LEN: usize = 4096;
pub const TRUNCATION_MARKER: &str = "\n\n[truncated]";

/// Tunables for the delivery engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryPolicy {
    pub retry: RetryPolicy,
    pub max_message_len: usize,
    /// Wait used when a rate-limit answer carries no `retry_after`.
    pub default_rate_limit_wait: Duration,
    /// Upper bound on cumulative rate-limit waiting within one send.
    pub rate_limit_cap: Duration,
    pub request_timeout: Duration,
    /// Pause between consecutive messages of a batch.
    pub inter_message_delay: Duration,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        DeliveryPolicy {
            retry: RetryPolicy::default(),
            max_message_len: MAX_MESSAGE_LEN,
            default_rate_limit_wait: Duration::from_secs(5),
            rate_limit_cap: Duration::from_secs(60),
            request_timeout: REQUEST_TIMEOUT,
            inter_message_delay: Duration::from_millis(100),
        }
    }
}

/// Bookkeeping for a successful send.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendStats {
    /// Total posts made, rate-limited ones included.
    pub posts: u32,
    /// Attempts charged against the retry budget.
    pub failed_attempts: u32,
    pub rate_limit_wait: Duration,
}

/// Outcome of `send_all`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sent: usize,
    pub failures: usize,
    /// Categories with at least one failed alert.
    pub failed_categories: BTreeSet<EventCategory>,
}

/// Cut `text` to at most `max_len` characters, marker included.
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let keep = max_len.saturating_sub(TRUNCATION_MARKER.chars().count());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

pub struct DeliveryEngine {
    transport: Arc<dyn ChatTransport>,
    policy: DeliveryPolicy,
}

impl DeliveryEngine {
    pub fn new(transport: Arc<dyn ChatTransport>, policy: DeliveryPolicy) -> Self {
        DeliveryEngine { transport, policy }
    }

    pub fn policy(&self) -> &DeliveryPolicy {
        &self.policy
    }

    /// Deliver one payload, retrying under both budgets.
    pub async fn send(&self, payload: &str, silent: bool) -> Result<SendStats, DeliveryError> {
        let message = OutboundMessage {
            text: truncate(payload, self.policy.max_message_len),
            silent,
        };
        let mut stats = SendStats::default();

        loop {
            stats.posts += 1;
            let outcome = match tokio::time::timeout(
                self.policy.request_timeout,
                self.transport.post(&message),
            )
            .await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(TransportError::Timeout(self.policy.request_timeout)),
            };

            let last_error = match outcome {
                Ok(SendStatus::Delivered) => return Ok(stats),
                Ok(SendStatus::RateLimited { retry_after }) => {
                    let wait = retry_after.unwrap_or(self.policy.default_rate_limit_wait);
                    stats.rate_limit_wait += wait;
                    if stats.rate_limit_wait > self.policy.rate_limit_cap {
                        error!(
                            waited = ?stats.rate_limit_wait,
                            cap = ?self.policy.rate_limit_cap,
                            "rate-limit budget exhausted, giving up"
                        );
                        return Err(DeliveryError::RateLimitBudgetExceeded {
                            waited: stats.rate_limit_wait,
                            cap: self.policy.rate_limit_cap,
                        });
                    }
                    warn!(wait = ?wait, "rate limited, waiting before retry");
                    tokio::time::sleep(wait).await;
                    continue;
                }
                Ok(SendStatus::Rejected { status, body }) => format!("HTTP {}: {}", status, body),
                Err(e) => e.to_string(),
            };

            stats.failed_attempts += 1;
            warn!(attempt = stats.failed_attempts, error = %last_error, "send attempt failed");
            if !self.policy.retry.should_retry(stats.failed_attempts) {
                return Err(DeliveryError::RetriesExhausted {
                    attempts: stats.failed_attempts,
                    last_error,
                });
            }
            tokio::time::sleep(self.policy.retry.delay_after(stats.failed_attempts)).await;
        }
    }

    /// Send `alerts` in order, pausing between messages. Every alert is
    /// attempted regardless of earlier failures.
    pub async fn send_all(&self, alerts: &[Alert]) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for (i, alert) in alerts.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.policy.inter_message_delay).await;
            }
            match self.send(&alert.message, alert.silent).await {
                Ok(stats) => {
                    report.sent += 1;
                    debug!(category = %alert.category, posts = stats.posts, "alert delivered");
                }
                Err(e) => {
                    report.failures += 1;
                    report.failed_categories.insert(alert.category);
                    error!(category = %alert.category, error = %e, "alert delivery failed");
                }
            }
        }
        report
    }

    /// Send an operational message. Failures are logged, never returned.
    pub async fn notify(&self, text: &str) -> bool {
        match self.send(text, false).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "operational notification not delivered");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mock::MockTransport;

    fn engine(transport: &Arc<MockTransport>) -> DeliveryEngine {
        DeliveryEngine::new(transport.clone(), DeliveryPolicy::default())
    }

    // ---- truncate ----

    #[test]
    fn truncate_leaves_short_text() {
        let text = "a".repeat(4095);
        assert_eq!(truncate(&text, MAX_MESSAGE_LEN), text);
    }

    #[test]
    fn truncate_leaves_exact_length() {
        let text = "a".repeat(4096);
        assert_eq!(truncate(&text, MAX_MESSAGE_LEN).chars().count(), 4096);
        assert!(!truncate(&text, MAX_MESSAGE_LEN).contains("[truncated]"));
    }

    #[test]
    fn truncate_hits_ceiling_exactly() {
        let text = "a".repeat(4097);
        let out = truncate(&text, MAX_MESSAGE_LEN);
        assert_eq!(out.chars().count(), 4096);
        assert!(out.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        let text = "é".repeat(5000);
        assert_eq!(truncate(&text, MAX_MESSAGE_LEN).chars().count(), 4096);
    }

    // ---- send ----

    #[tokio::test(start_paused = true)]
    async fn delivers_first_try() {
        let t = Arc::new(MockTransport::new());
        let stats = engine(&t).send("hello", true).await.unwrap();
        assert_eq!(stats.posts, 1);
        let posts = t.posts();
        assert_eq!(posts[0].text, "hello");
        assert!(posts[0].silent);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limits_do_not_spend_attempts() {
        let t = Arc::new(MockTransport::new());
        t.script_rate_limit(Some(0));
        t.script_rate_limit(Some(0));
        t.script_rate_limit(Some(0));
        let stats = engine(&t).send("hello", false).await.unwrap();
        assert_eq!(stats.posts, 4);
        assert_eq!(stats.failed_attempts, 0);
        assert_eq!(t.post_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_cap_fails_after_two_posts() {
        let t = Arc::new(MockTransport::new());
        t.script_rate_limit(Some(35));
        t.script_rate_limit(Some(35));
        let err = engine(&t).send("hello", false).await.unwrap_err();
        assert!(matches!(err, DeliveryError::RateLimitBudgetExceeded { .. }));
        assert_eq!(t.post_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_retry_after_uses_default_wait() {
        let t = Arc::new(MockTransport::new());
        t.script_rate_limit(None);
        let start = tokio::time::Instant::now();
        let stats = engine(&t).send("hello", false).await.unwrap();
        assert_eq!(stats.rate_limit_wait, Duration::from_secs(5));
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_exhaust_attempt_budget() {
        let t = Arc::new(MockTransport::new());
        t.reject_containing("hello");
        let start = tokio::time::Instant::now();
        let err = engine(&t).send("hello", false).await.unwrap_err();
        match err {
            DeliveryError::RetriesExhausted { attempts, last_error } => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("500"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(t.post_count(), 3);
        // 1s + 2s of backoff between the three attempts
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_posts_time_out_and_spend_attempts() {
        let t = Arc::new(MockTransport::new());
        t.hang_containing("hello");
        let start = tokio::time::Instant::now();
        let err = engine(&t).send("hello", false).await.unwrap_err();
        match err {
            DeliveryError::RetriesExhausted { attempts, last_error } => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("timed out"), "{}", last_error);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(t.post_count(), 3);
        // three 30s timeouts plus 1s + 2s of backoff
        assert!(start.elapsed() >= Duration::from_secs(93));
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_network_error() {
        let t = Arc::new(MockTransport::new());
        t.script_network_error("connection reset");
        let stats = engine(&t).send("hello", false).await.unwrap();
        assert_eq!(stats.posts, 2);
        assert_eq!(stats.failed_attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limits_and_failures_use_separate_budgets() {
        let t = Arc::new(MockTransport::new());
        t.script_network_error("a");
        t.script_rate_limit(Some(1));
        t.script_network_error("b");
        t.script_rate_limit(Some(1));
        let stats = engine(&t).send("hello", false).await.unwrap();
        assert_eq!(stats.failed_attempts, 2);
        assert_eq!(stats.posts, 5);
        assert_eq!(stats.rate_limit_wait, Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_payload_is_truncated_before_posting() {
        let t = Arc::new(MockTransport::new());
        engine(&t).send(&"x".repeat(10_000), false).await.unwrap();
        assert_eq!(t.posts()[0].text.chars().count(), MAX_MESSAGE_LEN);
    }

    // ---- send_all ----

    #[tokio::test(start_paused = true)]
    async fn send_all_reports_failed_categories() {
        let t = Arc::new(MockTransport::new());
        t.reject_containing("boom");
        let alerts = vec![
            Alert::new(EventCategory::MinterApplication, "ok 1"),
            Alert::new(EventCategory::ForcedLiquidation, "boom 1"),
            Alert::new(EventCategory::ForcedLiquidation, "boom 2"),
            Alert::new(EventCategory::EmergencyStop, "ok 2"),
        ];
        let report = engine(&t).send_all(&alerts).await;
        assert_eq!(report.sent, 2);
        assert_eq!(report.failures, 2);
        assert_eq!(
            report.failed_categories,
            BTreeSet::from([EventCategory::ForcedLiquidation])
        );
    }

    #[tokio::test(start_paused = true)]
    async fn send_all_preserves_order() {
        let t = Arc::new(MockTransport::new());
        let alerts = vec![
            Alert::new(EventCategory::MinterApplication, "first"),
            Alert::new(EventCategory::MinterDenied, "second"),
        ];
        engine(&t).send_all(&alerts).await;
        let texts: Vec<String> = t.posts().into_iter().map(|p| p.text).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn send_all_empty_is_a_noop() {
        let t = Arc::new(MockTransport::new());
        let report = engine(&t).send_all(&[]).await;
        assert_eq!(report, DeliveryReport::default());
        assert_eq!(t.post_count(), 0);
    }
}
