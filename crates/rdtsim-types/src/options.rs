use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which sender/receiver personality the simulator should load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Stop-and-wait with a one-bit sequence number.
    Abp,
    /// Sliding window with cumulative ACKs.
    Gbn,
}

impl Default for Protocol {
    fn default() -> Self {
        Protocol::Gbn
    }
}

/// Everything the simulator needs to run one simulation. Analogous to the
/// `options` record the original CLI hands to `Simulator::new`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationOptions {
    /// Number of layer-5 messages to inject (`-n`).
    pub num_msgs: u32,
    /// Mean interarrival time; actual arrivals are uniform in `[0, 2*d]` (`-d`).
    pub interarrival_time: f64,
    /// Sequence/ack number modulus (`-z`).
    pub seqnum_limit: u32,
    /// Per-packet loss probability (`-l`).
    pub loss_prob: f64,
    /// Per-packet corruption probability (`-c`).
    pub corrupt_prob: f64,
    /// PRNG seed; `None` derives a nonce from the wall clock (`-s`).
    pub random_seed: Option<u64>,
    /// Trace verbosity, 0-3 (`-v`).
    pub trace: u8,
    /// Which protocol personality to simulate.
    pub protocol: Protocol,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            num_msgs: 10,
            interarrival_time: 100.0,
            seqnum_limit: 16,
            loss_prob: 0.0,
            corrupt_prob: 0.0,
            random_seed: None,
            trace: 0,
            protocol: Protocol::default(),
        }
    }
}

impl SimulationOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seqnum_limit < 1 {
            return Err(ConfigError::SeqnumLimitTooSmall(self.seqnum_limit));
        }
        if !(0.0..=1.0).contains(&self.loss_prob) {
            return Err(ConfigError::ProbabilityOutOfRange {
                name: "loss_prob",
                value: self.loss_prob,
            });
        }
        if !(0.0..=1.0).contains(&self.corrupt_prob) {
            return Err(ConfigError::ProbabilityOutOfRange {
                name: "corrupt_prob",
                value: self.corrupt_prob,
            });
        }
        if self.interarrival_time < 0.0 {
            return Err(ConfigError::NegativeInterarrivalTime(
                self.interarrival_time,
            ));
        }
        Ok(())
    }

    /// `⌈log2(seqnum_limit)⌉` for `seqnum_limit >= 2`, else `0`.
    pub fn seqnum_limit_n_bits(&self) -> u32 {
        if self.seqnum_limit < 2 {
            0
        } else {
            (self.seqnum_limit - 1).ilog2() + 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_valid() {
        assert!(SimulationOptions::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_seqnum_limit() {
        let opts = SimulationOptions {
            seqnum_limit: 0,
            ..Default::default()
        };
        assert_eq!(
            opts.validate(),
            Err(ConfigError::SeqnumLimitTooSmall(0))
        );
    }

    #[test]
    fn rejects_out_of_range_loss_prob() {
        let opts = SimulationOptions {
            loss_prob: 1.5,
            ..Default::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn n_bits_matches_ceil_log2() {
        let mk = |z| SimulationOptions {
            seqnum_limit: z,
            ..Default::default()
        };
        assert_eq!(mk(1).seqnum_limit_n_bits(), 0);
        assert_eq!(mk(2).seqnum_limit_n_bits(), 1);
        assert_eq!(mk(3).seqnum_limit_n_bits(), 2);
        assert_eq!(mk(4).seqnum_limit_n_bits(), 2);
        assert_eq!(mk(8).seqnum_limit_n_bits(), 3);
        assert_eq!(mk(16).seqnum_limit_n_bits(), 4);
    }
}
