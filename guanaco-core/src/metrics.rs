// ABOUTME: Counters emitted through the `metrics` facade by agents and workers
// ABOUTME: No exporter is installed here; without a recorder these calls are no-ops

pub const REPLIES_SENT: &str = "guanaco_replies_sent_total";
pub const CHANNELS_SKIPPED: &str = "guanaco_channels_skipped_total";
pub const WORK_CYCLES: &str = "guanaco_work_cycles_total";
pub const WORKER_FAILURES: &str = "guanaco_worker_failures_total";

pub fn record_reply_sent(agent: &str) {
    metrics::counter!(REPLIES_SENT, "agent" => agent.to_string()).increment(1);
}

pub fn record_channel_skipped(agent: &str) {
    metrics::counter!(CHANNELS_SKIPPED, "agent" => agent.to_string()).increment(1);
}

pub fn record_work_cycle(agent: &str) {
    metrics::counter!(WORK_CYCLES, "agent" => agent.to_string()).increment(1);
}

pub fn record_worker_failure(agent: &str) {
    metrics::counter!(WORKER_FAILURES, "agent" => agent.to_string()).increment(1);
}
