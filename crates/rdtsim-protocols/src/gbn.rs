use std::collections::VecDeque;

use tracing::debug;

use rdtsim_core::{Endpoint, EndpointApi};
use rdtsim_types::{checksum, Entity, Message, Packet};

/// Sliding-window sender. Up to `window_size` packets may be outstanding at
/// once; a single timer, armed on the window base, retransmits the whole
/// window on expiry.
pub struct GbnSender {
    entity: Entity,
    seqnum_limit: u32,
    window_size: u32,
    wait_time: f64,

    base: u32,
    in_flight: VecDeque<Packet>,
    pending: VecDeque<Message>,
    made_progress: bool,
    n_no_progress: u32,
}

impl GbnSender {
    pub fn new(entity: Entity, seqnum_limit: u32) -> Self {
        Self {
            entity,
            seqnum_limit,
            window_size: seqnum_limit / 2,
            wait_time: 10.0 + 2.0 * seqnum_limit as f64,
            base: 0,
            in_flight: VecDeque::new(),
            pending: VecDeque::new(),
            made_progress: true,
            n_no_progress: 0,
        }
    }

    fn next_seqnum(&self) -> u32 {
        (self.base + self.in_flight.len() as u32) % self.seqnum_limit
    }

    fn maybe_output_from_queue(&mut self, ctx: &mut dyn EndpointApi) {
        while !self.pending.is_empty() && (self.in_flight.len() as u32) < self.window_size {
            let msg = self.pending.pop_front().expect("checked non-empty above");
            let s = self.next_seqnum();
            let mut packet = Packet::new(s, 0, msg.data);
            checksum::insert_checksum(&mut packet);
            self.in_flight.push_back(packet.clone());
            ctx.to_layer3(self.entity, packet);
            if self.in_flight.len() == 1 {
                ctx.start_timer(self.entity, self.wait_time);
            }
        }
    }
}

impl Endpoint for GbnSender {
    fn output(&mut self, ctx: &mut dyn EndpointApi, msg: Message) {
        self.pending.push_back(msg);
        self.maybe_output_from_queue(ctx);
    }

    fn input(&mut self, ctx: &mut dyn EndpointApi, packet: Packet) {
        if checksum::is_corrupt(&packet) {
            return;
        }

        let Some(i) = self.in_flight.iter().position(|p| p.seqnum == packet.acknum) else {
            return;
        };

        // Packets 0..=i are all acked; cumulative ack semantics.
        self.base += i as u32 + 1;
        self.in_flight.drain(..=i);

        if self.n_no_progress > 0 && !self.made_progress {
            debug!(base = self.base, "finally made some progress");
        }
        self.made_progress = true;
        self.n_no_progress = 0;

        ctx.stop_timer(self.entity);
        if !self.in_flight.is_empty() {
            ctx.start_timer(self.entity, self.wait_time);
        }
        self.maybe_output_from_queue(ctx);
    }

    fn timer_interrupt(&mut self, ctx: &mut dyn EndpointApi) {
        if !self.made_progress {
            self.n_no_progress += 1;
            debug!(base = self.base, n_no_progress = self.n_no_progress, "no progress for this many timeouts");
        }
        self.made_progress = false;
        for p in &self.in_flight {
            ctx.to_layer3(self.entity, p.clone());
        }
        ctx.start_timer(self.entity, self.wait_time * (self.n_no_progress + 1) as f64);
    }
}

/// Cumulative-ack receiver: only accepts the next expected sequence number
/// in order, discarding anything out of order and re-acking the last
/// correctly received packet.
pub struct GbnReceiver {
    entity: Entity,
    seqnum_limit: u32,
    expected_seqnum: u32,
    last_acked: u32,
}

impl GbnReceiver {
    pub fn new(entity: Entity, seqnum_limit: u32) -> Self {
        Self {
            entity,
            seqnum_limit,
            expected_seqnum: 0,
            last_acked: seqnum_limit - 1,
        }
    }

    fn next_expected_seqnum(&self) -> u32 {
        (self.expected_seqnum + 1) % self.seqnum_limit
    }
}

impl Endpoint for GbnReceiver {
    fn input(&mut self, ctx: &mut dyn EndpointApi, packet: Packet) {
        if checksum::is_corrupt(&packet) || packet.seqnum != self.expected_seqnum {
            let mut ack = Packet::new(0, self.last_acked, packet.payload);
            checksum::insert_checksum(&mut ack);
            ctx.to_layer3(self.entity, ack);
            return;
        }

        ctx.to_layer5(self.entity, Message::new(packet.payload.clone()));

        let mut ack = Packet::new(0, self.expected_seqnum, packet.payload);
        checksum::insert_checksum(&mut ack);
        ctx.to_layer3(self.entity, ack);

        self.last_acked = self.expected_seqnum;
        self.expected_seqnum = self.next_expected_seqnum();
    }

    fn timer_interrupt(&mut self, _ctx: &mut dyn EndpointApi) {}
}
