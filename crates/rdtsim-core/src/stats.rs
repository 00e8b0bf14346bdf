use serde::{Deserialize, Serialize};

/// Snapshot of the simulator's counters, suitable for the CLI's summary
/// report or for assertions in tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    pub n_sim: u32,
    pub n_sim_max: u32,
    pub time: f64,
    pub interarrival_time: f64,
    pub loss_prob: f64,
    pub corrupt_prob: f64,
    pub seqnum_limit: u32,
    pub random_seed: u64,
    pub n_to_layer3_a: u64,
    pub n_to_layer3_b: u64,
    pub n_lost: u64,
    pub n_corrupt: u64,
    pub n_to_layer5_a: u64,
    pub n_to_layer5_b: u64,
}

impl Stats {
    /// Messages delivered to B per elapsed time unit, or 0.0 before any time has elapsed.
    pub fn throughput_b(&self) -> f64 {
        if self.time > 0.0 {
            self.n_to_layer5_b as f64 / self.time
        } else {
            0.0
        }
    }
}
