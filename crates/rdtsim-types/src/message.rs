use serde::{Deserialize, Serialize};

/// A fixed-length application-layer payload handed to a sender's `output`,
/// or delivered to a receiver's `to_layer5`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub data: Vec<u8>,
}

impl Message {
    /// The only payload length the simulator and protocols ever produce or accept.
    pub const MSG_SIZE: usize = 20;

    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn is_valid(&self) -> bool {
        self.data.len() == Self::MSG_SIZE
    }
}
