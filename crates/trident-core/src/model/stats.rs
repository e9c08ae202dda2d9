// ── Aggregate statistics ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate snapshot summed across interfaces. Not a delta series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub packets_in: u64,
    pub packets_out: u64,
    pub active_connections: u64,
    pub timestamp: DateTime<Utc>,
}

impl NetworkStats {
    /// All-zero snapshot stamped `now`.
    pub fn empty() -> Self {
        Self {
            bytes_in: 0,
            bytes_out: 0,
            packets_in: 0,
            packets_out: 0,
            active_connections: 0,
            timestamp: Utc::now(),
        }
    }

    /// Fold one interface's counters in. Saturates instead of wrapping.
    pub fn add_counters(
        &mut self,
        bytes_in: u64,
        bytes_out: u64,
        packets_in: u64,
        packets_out: u64,
    ) {
        self.bytes_in = self.bytes_in.saturating_add(bytes_in);
        self.bytes_out = self.bytes_out.saturating_add(bytes_out);
        self.packets_in = self.packets_in.saturating_add(packets_in);
        self.packets_out = self.packets_out.saturating_add(packets_out);
    }

    pub fn add_connections(&mut self, count: u64) {
        self.active_connections = self.active_connections.saturating_add(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_and_saturate() {
        let mut stats = NetworkStats::empty();
        stats.add_counters(10, 20, 1, 2);
        stats.add_counters(5, 5, 1, 1);
        assert_eq!((stats.bytes_in, stats.bytes_out), (15, 25));
        assert_eq!((stats.packets_in, stats.packets_out), (2, 3));

        stats.add_counters(u64::MAX, 0, 0, 0);
        assert_eq!(stats.bytes_in, u64::MAX);
    }
}
