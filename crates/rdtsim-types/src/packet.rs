use serde::{Deserialize, Serialize};

use crate::message::Message;

/// A transport-layer packet: `(seqnum, acknum, checksum, payload)`.
///
/// Packets are value objects. The medium clones any packet it schedules so
/// that later mutation or corruption of the original never leaks across the
/// delivery boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    pub seqnum: u32,
    pub acknum: u32,
    pub checksum: u32,
    pub payload: Vec<u8>,
}

impl Packet {
    pub fn new(seqnum: u32, acknum: u32, payload: Vec<u8>) -> Self {
        Self {
            seqnum,
            acknum,
            checksum: 0,
            payload,
        }
    }

    pub fn is_valid(&self, seqnum_limit: u32) -> bool {
        self.seqnum < seqnum_limit
            && self.acknum < seqnum_limit
            && self.payload.len() == Message::MSG_SIZE
    }
}
