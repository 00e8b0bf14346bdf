use std::collections::VecDeque;

use tracing::warn;

use rdtsim_core::{Endpoint, EndpointApi};
use rdtsim_types::{checksum, Entity, Message, Packet};

const WAIT_TIME: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AState {
    WaitForCall,
    WaitForAck,
}

/// Stop-and-wait sender: one outstanding packet at a time, alternating
/// between sequence numbers 0 and 1.
pub struct AbpSender {
    entity: Entity,
    state: AState,
    bit: u32,
    sent_pkt: Option<Packet>,
    pending: VecDeque<Message>,
}

impl AbpSender {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            state: AState::WaitForCall,
            bit: 0,
            sent_pkt: None,
            pending: VecDeque::new(),
        }
    }

    fn try_send(&mut self, ctx: &mut dyn EndpointApi) {
        if self.state != AState::WaitForCall {
            return;
        }
        let Some(msg) = self.pending.pop_front() else {
            return;
        };

        let mut packet = Packet::new(self.bit, 0, msg.data);
        checksum::insert_checksum(&mut packet);

        ctx.to_layer3(self.entity, packet.clone());
        self.sent_pkt = Some(packet);
        ctx.start_timer(self.entity, WAIT_TIME);
        self.state = AState::WaitForAck;
    }
}

impl Endpoint for AbpSender {
    fn output(&mut self, ctx: &mut dyn EndpointApi, msg: Message) {
        self.pending.push_back(msg);
        self.try_send(ctx);
    }

    fn input(&mut self, ctx: &mut dyn EndpointApi, packet: Packet) {
        if self.state != AState::WaitForAck {
            return;
        }
        if checksum::is_corrupt(&packet) || packet.acknum != self.bit {
            return;
        }
        ctx.stop_timer(self.entity);
        self.bit = 1 - self.bit;
        self.state = AState::WaitForCall;
        self.try_send(ctx);
    }

    fn timer_interrupt(&mut self, ctx: &mut dyn EndpointApi) {
        match self.state {
            AState::WaitForCall => warn!("abp sender: timer fired while waiting for call, ignoring"),
            AState::WaitForAck => {
                if let Some(pkt) = &self.sent_pkt {
                    ctx.to_layer3(self.entity, pkt.clone());
                    ctx.start_timer(self.entity, WAIT_TIME);
                }
            }
        }
    }
}

/// Stop-and-wait receiver: accepts the expected bit, NAKs (re-ACKs the last
/// good packet) on corruption or sequence mismatch.
pub struct AbpReceiver {
    entity: Entity,
    expecting_bit: u32,
}

impl AbpReceiver {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            expecting_bit: 0,
        }
    }
}

impl Endpoint for AbpReceiver {
    fn input(&mut self, ctx: &mut dyn EndpointApi, packet: Packet) {
        if packet.seqnum != self.expecting_bit || checksum::is_corrupt(&packet) {
            let mut ack = Packet::new(0, 1 - self.expecting_bit, packet.payload);
            checksum::insert_checksum(&mut ack);
            ctx.to_layer3(self.entity, ack);
            return;
        }

        ctx.to_layer5(self.entity, Message::new(packet.payload.clone()));

        let mut ack = Packet::new(0, self.expecting_bit, packet.payload);
        checksum::insert_checksum(&mut ack);
        ctx.to_layer3(self.entity, ack);

        self.expecting_bit = 1 - self.expecting_bit;
    }

    fn timer_interrupt(&mut self, _ctx: &mut dyn EndpointApi) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdtsim_types::Message;

    /// Records every action invoked on it, in order, without touching a real simulator.
    #[derive(Default)]
    struct Recorder {
        time: f64,
        to_layer3: Vec<(Entity, Packet)>,
        to_layer5: Vec<(Entity, Message)>,
        timers_started: Vec<(Entity, f64)>,
        timers_stopped: Vec<Entity>,
    }

    impl EndpointApi for Recorder {
        fn start_timer(&mut self, entity: Entity, increment: f64) {
            self.timers_started.push((entity, increment));
        }
        fn stop_timer(&mut self, entity: Entity) {
            self.timers_stopped.push(entity);
        }
        fn to_layer3(&mut self, entity: Entity, packet: Packet) {
            self.to_layer3.push((entity, packet));
        }
        fn to_layer5(&mut self, entity: Entity, message: Message) {
            self.to_layer5.push((entity, message));
        }
        fn get_time(&self, _entity: Entity) -> f64 {
            self.time
        }
    }

    fn msg() -> Message {
        Message::new(vec![b'a'; 20])
    }

    #[test]
    fn sender_queues_second_message_while_waiting_for_ack() {
        let mut sender = AbpSender::new(Entity::A);
        let mut ctx = Recorder::default();

        sender.output(&mut ctx, msg());
        assert_eq!(ctx.to_layer3.len(), 1);

        sender.output(&mut ctx, msg());
        assert_eq!(ctx.to_layer3.len(), 1, "second message stays queued");
    }

    #[test]
    fn sender_sends_queued_message_immediately_after_ack() {
        let mut sender = AbpSender::new(Entity::A);
        let mut ctx = Recorder::default();

        sender.output(&mut ctx, msg());
        sender.output(&mut ctx, msg());

        let mut ack = Packet::new(0, 0, ctx.to_layer3[0].1.payload.clone());
        checksum::insert_checksum(&mut ack);
        sender.input(&mut ctx, ack);

        assert_eq!(ctx.to_layer3.len(), 2, "queued message sent right after ack");
        assert_eq!(ctx.to_layer3[1].1.seqnum, 1);
    }

    #[test]
    fn sender_retransmits_on_timeout() {
        let mut sender = AbpSender::new(Entity::A);
        let mut ctx = Recorder::default();
        sender.output(&mut ctx, msg());
        sender.timer_interrupt(&mut ctx);
        assert_eq!(ctx.to_layer3.len(), 2);
        assert_eq!(ctx.to_layer3[0].1, ctx.to_layer3[1].1);
    }

    #[test]
    fn receiver_reacks_last_good_packet_on_mismatch() {
        let mut receiver = AbpReceiver::new(Entity::B);
        let mut ctx = Recorder::default();

        let mut p0 = Packet::new(0, 0, vec![b'x'; 20]);
        checksum::insert_checksum(&mut p0);
        receiver.input(&mut ctx, p0);
        assert_eq!(ctx.to_layer5.len(), 1);
        assert_eq!(ctx.to_layer3[0].1.acknum, 0);

        // Duplicate of the same packet (sender didn't see the ack).
        let mut dup = Packet::new(0, 0, vec![b'x'; 20]);
        checksum::insert_checksum(&mut dup);
        receiver.input(&mut ctx, dup);

        assert_eq!(ctx.to_layer5.len(), 1, "duplicate is not delivered again");
        assert_eq!(ctx.to_layer3[1].1.acknum, 0, "re-acks the last good bit");
    }
}
