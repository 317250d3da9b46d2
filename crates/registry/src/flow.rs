//! Flow records scraped from stats replies.

use std::time::Duration;

use sluice_openflow::{FlowStats, Match};

/// One flow-table entry as last reported by its switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEntry {
    pub table_id: u8,
    pub priority: u16,
    pub cookie: u64,
    pub idle_timeout: u16,
    pub hard_timeout: u16,
    /// How long the flow has been installed.
    pub duration: Duration,
    pub packet_count: u64,
    pub byte_count: u64,
    pub flow_match: Match,
}

impl FlowEntry {
    pub fn from_stats(stats: &FlowStats) -> Self {
        Self {
            table_id: stats.table_id,
            priority: stats.priority,
            cookie: stats.cookie,
            idle_timeout: stats.idle_timeout,
            hard_timeout: stats.hard_timeout,
            duration: Duration::new(stats.duration_sec.into(), stats.duration_nsec),
            packet_count: stats.packet_count,
            byte_count: stats.byte_count,
            flow_match: stats.flow_match.clone(),
        }
    }
}
