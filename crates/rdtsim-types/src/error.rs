use thiserror::Error;

/// Configuration problems caught once, at the CLI boundary, before a
/// `Simulator` is ever constructed. The simulator core assumes validated
/// input past this point.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("seqnum_limit must be >= 1, got {0}")]
    SeqnumLimitTooSmall(u32),

    #[error("{name} must be a probability in [0.0, 1.0], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },

    #[error("interarrival_time must be >= 0.0, got {0}")]
    NegativeInterarrivalTime(f64),
}
