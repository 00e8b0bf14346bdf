use crate::packet::Packet;

/// CRC-32 over the big-endian 4-byte encodings of `seqnum` and `acknum`,
/// followed by the raw payload bytes. This is a corruption detector, not a
/// cryptographic integrity check.
pub fn compute_checksum(packet: &Packet) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&packet.seqnum.to_be_bytes());
    hasher.update(&packet.acknum.to_be_bytes());
    hasher.update(&packet.payload);
    hasher.finalize()
}

pub fn insert_checksum(packet: &mut Packet) {
    packet.checksum = compute_checksum(packet);
}

pub fn is_corrupt(packet: &Packet) -> bool {
    compute_checksum(packet) != packet.checksum
}
