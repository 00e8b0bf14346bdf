use rdtsim_types::{Entity, Message, Packet};

/// The capability the simulator exposes to endpoints. This is the only way
/// an endpoint can touch simulator state; endpoints hold no back-reference
/// to the simulator itself.
pub trait EndpointApi {
    /// Start a timer for `entity`, firing `increment` time units from now.
    /// Fails noisily (logged, ignored) if `increment < 0` or a timer is
    /// already armed for `entity`.
    fn start_timer(&mut self, entity: Entity, increment: f64);

    /// Cancel the pending timer for `entity`. Warns if none is armed.
    fn stop_timer(&mut self, entity: Entity);

    /// Hand a packet to the unreliable medium, addressed from `entity`.
    fn to_layer3(&mut self, entity: Entity, packet: Packet);

    /// Deliver a message to the application layer on behalf of `entity`.
    fn to_layer5(&mut self, entity: Entity, message: Message);

    /// Current virtual time.
    fn get_time(&self, entity: Entity) -> f64;
}

/// The interface a protocol's sender or receiver half implements.
///
/// `output` is only ever called on the sender (`A`); the simulator never
/// calls it on `B`, so receivers can leave it at its no-op default.
pub trait Endpoint {
    fn output(&mut self, _ctx: &mut dyn EndpointApi, _msg: Message) {}

    fn input(&mut self, ctx: &mut dyn EndpointApi, packet: Packet);

    fn timer_interrupt(&mut self, ctx: &mut dyn EndpointApi);
}
