use serde::{Deserialize, Serialize};

/// Point-in-time copy of the monitor's health counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthSnapshot {
    pub uptime_secs: u64,
    pub cycles: u64,
    pub alerts_sent: u64,
    pub juiceswap_poll_errors: u64,
    pub juicedollar_poll_errors: u64,
    pub delivery_errors: u64,
    /// Seconds since the last cycle in which any source answered, if ever.
    pub last_successful_poll_secs_ago: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_round_trip() {
        let snapshot = HealthSnapshot {
            uptime_secs: 3600,
            cycles: 120,
            alerts_sent: 7,
            juiceswap_poll_errors: 1,
            juicedollar_poll_errors: 0,
            delivery_errors: 2,
            last_successful_poll_secs_ago: Some(30),
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"delivery_errors\":2"));
        let back: HealthSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn never_polled_serializes_null() {
        let snapshot = HealthSnapshot {
            uptime_secs: 0,
            cycles: 0,
            alerts_sent: 0,
            juiceswap_poll_errors: 0,
            juicedollar_poll_errors: 0,
            delivery_errors: 0,
            last_successful_poll_secs_ago: None,
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"last_successful_poll_secs_ago\":null"));
    }
}
