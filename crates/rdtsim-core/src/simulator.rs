use std::time::{SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use tracing::{debug, trace, warn};

use rdtsim_types::{Entity, Message, Packet, SimulationOptions};

use crate::event::{Event, EventKind, EventQueue};
use crate::interface::{Endpoint, EndpointApi};
use crate::medium::Medium;
use crate::stats::Stats;

/// Actions an endpoint queued during one call, in the order it queued them.
/// Buffering (rather than mutating the simulator directly through a live
/// borrow) is what lets an `&mut dyn Endpoint` call back into
/// `&mut dyn EndpointApi` without fighting the borrow checker.
enum Action {
    StartTimer(f64),
    StopTimer,
    ToLayer3(Packet),
    ToLayer5(Message),
}

struct ActionBuffer {
    entity: Entity,
    now: f64,
    actions: Vec<Action>,
}

impl EndpointApi for ActionBuffer {
    fn start_timer(&mut self, entity: Entity, increment: f64) {
        debug_assert_eq!(entity, self.entity);
        self.actions.push(Action::StartTimer(increment));
    }

    fn stop_timer(&mut self, entity: Entity) {
        debug_assert_eq!(entity, self.entity);
        self.actions.push(Action::StopTimer);
    }

    fn to_layer3(&mut self, entity: Entity, packet: Packet) {
        debug_assert_eq!(entity, self.entity);
        self.actions.push(Action::ToLayer3(packet));
    }

    fn to_layer5(&mut self, entity: Entity, message: Message) {
        debug_assert_eq!(entity, self.entity);
        self.actions.push(Action::ToLayer5(message));
    }

    fn get_time(&self, _entity: Entity) -> f64 {
        self.now
    }
}

/// The discrete-event simulator: owns the clock, the event queue, the
/// medium, both endpoints, and every counter in `Stats`.
pub struct Simulator {
    time: f64,
    events: EventQueue,
    medium: Medium,

    seqnum_limit: u32,
    seqnum_limit_n_bits: u32,
    interarrival_time: f64,
    loss_prob: f64,
    corrupt_prob: f64,
    random_seed: u64,
    trace: u8,

    n_sim: u32,
    n_sim_max: u32,

    n_to_layer3_a: u64,
    n_to_layer3_b: u64,
    n_lost: u64,
    n_corrupt: u64,
    n_to_layer5_a: u64,
    n_to_layer5_b: u64,

    // `Option` only so `dispatch_*` can briefly move the endpoint out of
    // `self` to call it with `self` borrowed mutably as the context.
    entity_a: Option<Box<dyn Endpoint>>,
    entity_b: Option<Box<dyn Endpoint>>,

    cb_a: Option<Box<dyn FnMut(&[u8])>>,
    cb_b: Option<Box<dyn FnMut(&[u8])>>,
}

impl Simulator {
    pub fn new(
        options: &SimulationOptions,
        entity_a: Box<dyn Endpoint>,
        entity_b: Box<dyn Endpoint>,
    ) -> Self {
        Self::with_callbacks(options, entity_a, entity_b, None, None)
    }

    pub fn with_callbacks(
        options: &SimulationOptions,
        entity_a: Box<dyn Endpoint>,
        entity_b: Box<dyn Endpoint>,
        cb_a: Option<Box<dyn FnMut(&[u8])>>,
        cb_b: Option<Box<dyn FnMut(&[u8])>>,
    ) -> Self {
        let random_seed = options.random_seed.unwrap_or_else(Self::nonce_seed);
        let rng = rand::rngs::StdRng::seed_from_u64(random_seed);

        Self {
            time: 0.0,
            events: EventQueue::new(),
            medium: Medium::new(rng, options.loss_prob, options.corrupt_prob),
            seqnum_limit: options.seqnum_limit,
            seqnum_limit_n_bits: options.seqnum_limit_n_bits(),
            interarrival_time: options.interarrival_time,
            loss_prob: options.loss_prob,
            corrupt_prob: options.corrupt_prob,
            random_seed,
            trace: options.trace,
            n_sim: 0,
            n_sim_max: options.num_msgs,
            n_to_layer3_a: 0,
            n_to_layer3_b: 0,
            n_lost: 0,
            n_corrupt: 0,
            n_to_layer5_a: 0,
            n_to_layer5_b: 0,
            entity_a: Some(entity_a),
            entity_b: Some(entity_b),
            cb_a,
            cb_b,
        }
    }

    fn nonce_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }

    pub fn stats(&self) -> Stats {
        Stats {
            n_sim: self.n_sim,
            n_sim_max: self.n_sim_max,
            time: self.time,
            interarrival_time: self.interarrival_time,
            loss_prob: self.loss_prob,
            corrupt_prob: self.corrupt_prob,
            seqnum_limit: self.seqnum_limit,
            random_seed: self.random_seed,
            n_to_layer3_a: self.n_to_layer3_a,
            n_to_layer3_b: self.n_to_layer3_b,
            n_lost: self.n_lost,
            n_corrupt: self.n_corrupt,
            n_to_layer5_a: self.n_to_layer5_a,
            n_to_layer5_b: self.n_to_layer5_b,
        }
    }

    /// Run until the event queue empties or `n_sim` reaches `n_sim_max`.
    /// Pending events after the last injected message are deliberately left
    /// undrained; see the main-loop edge case in the design notes.
    pub fn run(&mut self) {
        if self.trace > 0 {
            debug!("===== SIMULATION BEGINS");
        }

        self.generate_next_arrival();

        while !self.events.is_empty() && self.n_sim < self.n_sim_max {
            let ev = self.events.pop_front().expect("checked non-empty above");
            self.time = ev.time;

            if self.trace > 2 {
                trace!(time = self.time, entity = %ev.entity, kind = ?ev.kind, "event");
            }

            match ev.kind {
                EventKind::FromLayer5 => {
                    self.generate_next_arrival();
                    let j = (self.n_sim % 26) as u8;
                    let payload = vec![97 + j; Message::MSG_SIZE];
                    if self.trace > 2 {
                        trace!("application data handed to A: {:?}", payload);
                    }
                    self.n_sim += 1;
                    self.dispatch_output(Entity::A, Message::new(payload));
                }
                EventKind::FromLayer3(packet) => {
                    self.dispatch_input(ev.entity, packet.clone());
                }
                EventKind::TimerInterrupt => {
                    self.dispatch_timer_interrupt(ev.entity);
                }
            }
        }

        if self.trace > 0 {
            debug!("===== SIMULATION ENDS");
        }
    }

    fn generate_next_arrival(&mut self) {
        let x = self.medium.interarrival_jitter(self.interarrival_time);
        self.events.insert(Event {
            time: self.time + x,
            kind: EventKind::FromLayer5,
            entity: Entity::A,
        });
    }

    fn endpoint_mut(&mut self, entity: Entity) -> Box<dyn Endpoint> {
        match entity {
            Entity::A => self.entity_a.take().expect("entity A always present between dispatches"),
            Entity::B => self.entity_b.take().expect("entity B always present between dispatches"),
        }
    }

    fn restore_endpoint(&mut self, entity: Entity, endpoint: Box<dyn Endpoint>) {
        match entity {
            Entity::A => self.entity_a = Some(endpoint),
            Entity::B => self.entity_b = Some(endpoint),
        }
    }

    fn dispatch_output(&mut self, entity: Entity, msg: Message) {
        let mut endpoint = self.endpoint_mut(entity);
        let mut buffer = ActionBuffer {
            entity,
            now: self.time,
            actions: Vec::new(),
        };
        endpoint.output(&mut buffer, msg);
        self.restore_endpoint(entity, endpoint);
        self.apply_actions(entity, buffer.actions);
    }

    fn dispatch_input(&mut self, entity: Entity, packet: Packet) {
        let mut endpoint = self.endpoint_mut(entity);
        let mut buffer = ActionBuffer {
            entity,
            now: self.time,
            actions: Vec::new(),
        };
        endpoint.input(&mut buffer, packet);
        self.restore_endpoint(entity, endpoint);
        self.apply_actions(entity, buffer.actions);
    }

    fn dispatch_timer_interrupt(&mut self, entity: Entity) {
        let mut endpoint = self.endpoint_mut(entity);
        let mut buffer = ActionBuffer {
            entity,
            now: self.time,
            actions: Vec::new(),
        };
        endpoint.timer_interrupt(&mut buffer);
        self.restore_endpoint(entity, endpoint);
        self.apply_actions(entity, buffer.actions);
    }

    fn apply_actions(&mut self, entity: Entity, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::StartTimer(increment) => self.apply_start_timer(entity, increment),
                Action::StopTimer => self.apply_stop_timer(entity),
                Action::ToLayer3(packet) => self.apply_to_layer3(entity, packet),
                Action::ToLayer5(message) => self.apply_to_layer5(entity, message),
            }
        }
    }

    fn apply_start_timer(&mut self, entity: Entity, increment: f64) {
        if increment < 0.0 {
            warn!(%entity, increment, "start_timer: invalid increment, call ignored");
            return;
        }
        if self
            .events
            .any(|e| e.entity == entity && matches!(e.kind, EventKind::TimerInterrupt))
        {
            warn!(%entity, "start_timer: a timer is already armed, call ignored");
            return;
        }
        if self.trace > 2 {
            trace!(%entity, time = self.time, "start_timer");
        }
        self.events.insert(Event {
            time: self.time + increment,
            kind: EventKind::TimerInterrupt,
            entity,
        });
    }

    fn apply_stop_timer(&mut self, entity: Entity) {
        if self.trace > 2 {
            trace!(%entity, time = self.time, "stop_timer");
        }
        let removed = self
            .events
            .remove_where(|e| e.entity == entity && matches!(e.kind, EventKind::TimerInterrupt));
        if !removed {
            warn!(%entity, "stop_timer: no timer was running, call ignored");
        }
    }

    fn apply_to_layer3(&mut self, entity: Entity, packet: Packet) {
        if !packet.is_valid(self.seqnum_limit) {
            warn!(%entity, ?packet, "to_layer3: invalid packet, call ignored");
            return;
        }

        match entity {
            Entity::A => self.n_to_layer3_a += 1,
            Entity::B => self.n_to_layer3_b += 1,
        }

        if self.medium.roll_loss() {
            self.n_lost += 1;
            if self.trace > 0 {
                debug!(%entity, "to_layer3: packet being lost");
            }
            return;
        }

        let mut packet = packet;
        if self.medium.roll_corruption() {
            self.n_corrupt += 1;
            self.medium.corrupt(&mut packet, self.seqnum_limit_n_bits);
            if self.trace > 0 {
                debug!(%entity, "to_layer3: packet being corrupted");
            }
        }

        let receiver = entity.peer();
        let last_time = self
            .events
            .latest_arrival_for(receiver)
            .unwrap_or(self.time)
            .max(self.time);
        let arrival_time = last_time + self.medium.arrival_jitter();

        if self.trace > 2 {
            trace!(%receiver, arrival_time, "to_layer3: scheduling arrival on other side");
        }
        self.events.insert(Event {
            time: arrival_time,
            kind: EventKind::FromLayer3(packet),
            entity: receiver,
        });
    }

    fn apply_to_layer5(&mut self, entity: Entity, message: Message) {
        if !message.is_valid() {
            warn!(%entity, len = message.data.len(), "to_layer5: invalid message, call ignored");
            return;
        }

        match entity {
            Entity::A => {
                self.n_to_layer5_a += 1;
                if let Some(cb) = &mut self.cb_a {
                    cb(&message.data);
                }
            }
            Entity::B => {
                self.n_to_layer5_b += 1;
                if let Some(cb) = &mut self.cb_b {
                    cb(&message.data);
                }
            }
        }
        if self.trace > 2 {
            trace!(%entity, data = ?message.data, "to_layer5: data received");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdtsim_types::Protocol;

    /// A sender that does nothing; used to probe simulator mechanics in
    /// isolation from any real protocol.
    #[derive(Default)]
    struct Mute;

    impl Endpoint for Mute {
        fn input(&mut self, _ctx: &mut dyn EndpointApi, _packet: Packet) {}
        fn timer_interrupt(&mut self, _ctx: &mut dyn EndpointApi) {}
    }

    fn options(num_msgs: u32, seed: u64) -> SimulationOptions {
        SimulationOptions {
            num_msgs,
            random_seed: Some(seed),
            protocol: Protocol::Gbn,
            ..Default::default()
        }
    }

    #[test]
    fn empty_run_drains_nothing_when_n_sim_max_is_zero() {
        let opts = options(0, 1);
        let mut sim = Simulator::new(&opts, Box::new(Mute), Box::new(Mute));
        sim.run();
        let stats = sim.stats();
        assert_eq!(stats.n_sim, 0);
        assert_eq!(stats.n_to_layer3_a, 0);
    }

    #[test]
    fn duplicate_start_timer_is_ignored_and_warned() {
        let opts = options(0, 1);
        let mut sim = Simulator::new(&opts, Box::new(Mute), Box::new(Mute));
        sim.apply_start_timer(Entity::A, 5.0);
        assert!(
            sim.events
                .any(|e| e.entity == Entity::A && matches!(e.kind, EventKind::TimerInterrupt))
        );
        sim.apply_start_timer(Entity::A, 5.0);
        // Still exactly one timer event for A.
        let count = {
            let mut c = 0;
            while sim
                .events
                .remove_where(|e| e.entity == Entity::A && matches!(e.kind, EventKind::TimerInterrupt))
            {
                c += 1;
            }
            c
        };
        assert_eq!(count, 1);
    }

    #[test]
    fn stop_timer_without_start_warns_but_does_not_panic() {
        let opts = options(0, 1);
        let mut sim = Simulator::new(&opts, Box::new(Mute), Box::new(Mute));
        sim.apply_stop_timer(Entity::A);
    }

    #[test]
    fn invalid_packet_to_layer3_is_dropped_without_scheduling() {
        let opts = options(0, 1);
        let mut sim = Simulator::new(&opts, Box::new(Mute), Box::new(Mute));
        let bad = Packet::new(999, 0, vec![b'A'; 20]); // seqnum out of range
        sim.apply_to_layer3(Entity::A, bad);
        assert_eq!(sim.stats().n_to_layer3_a, 0);
        assert!(sim.events.is_empty());
    }
}
