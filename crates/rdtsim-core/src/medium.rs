use rand::rngs::StdRng;
use rand::Rng;
use rdtsim_types::Packet;

/// The unreliable channel: a single shared PRNG stream drives loss, then
/// corruption, then (if corrupting) the corruption sub-case, then arrival
/// jitter, in that fixed order. Within one implementation and a fixed seed
/// this order must stay stable for runs to be reproducible.
pub struct Medium {
    rng: StdRng,
    loss_prob: f64,
    corrupt_prob: f64,
}

impl Medium {
    pub fn new(rng: StdRng, loss_prob: f64, corrupt_prob: f64) -> Self {
        Self {
            rng,
            loss_prob,
            corrupt_prob,
        }
    }

    pub fn roll_loss(&mut self) -> bool {
        self.rng.random::<f64>() < self.loss_prob
    }

    pub fn roll_corruption(&mut self) -> bool {
        self.rng.random::<f64>() < self.corrupt_prob
    }

    /// Corrupt `packet` in place. `seqnum_limit_n_bits` is `0` when
    /// `seqnum_limit < 2`, in which case header-bit corruption degenerates
    /// to payload corruption (there are no header bits to flip).
    pub fn corrupt(&mut self, packet: &mut Packet, seqnum_limit_n_bits: u32) {
        let x: f64 = self.rng.random();
        if x < 0.75 || seqnum_limit_n_bits == 0 {
            if let Some(first) = packet.payload.first_mut() {
                *first = b'Z';
            }
        } else if x < 0.875 {
            let k = self.rng.random_range(0..seqnum_limit_n_bits);
            packet.seqnum ^= 1u32 << k;
        } else {
            let k = self.rng.random_range(0..seqnum_limit_n_bits);
            packet.acknum ^= 1u32 << k;
        }
    }

    /// Uniform delay added on top of `last_time` so the medium never reorders.
    pub fn arrival_jitter(&mut self) -> f64 {
        1.0 + 8.0 * self.rng.random::<f64>()
    }

    /// Uniform interarrival jitter in `[0, 2*mean)`.
    pub fn interarrival_jitter(&mut self, mean: f64) -> f64 {
        mean * 2.0 * self.rng.random::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn zero_loss_prob_never_drops() {
        let mut m = Medium::new(StdRng::seed_from_u64(1), 0.0, 0.0);
        for _ in 0..1000 {
            assert!(!m.roll_loss());
        }
    }

    #[test]
    fn certain_loss_prob_always_drops() {
        let mut m = Medium::new(StdRng::seed_from_u64(1), 1.0, 0.0);
        for _ in 0..1000 {
            assert!(m.roll_loss());
        }
    }

    #[test]
    fn corruption_with_zero_bits_always_hits_payload() {
        let mut m = Medium::new(StdRng::seed_from_u64(7), 0.0, 0.0);
        let mut p = Packet::new(0, 0, vec![b'A'; 20]);
        m.corrupt(&mut p, 0);
        assert_eq!(p.payload[0], b'Z');
        assert_eq!(p.seqnum, 0);
        assert_eq!(p.acknum, 0);
    }
}
