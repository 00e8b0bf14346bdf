pub mod abp;
pub mod gbn;

pub use abp::{AbpReceiver, AbpSender};
pub use gbn::{GbnReceiver, GbnSender};

use rdtsim_core::Endpoint;
use rdtsim_types::{Entity, Protocol};

/// Build the sender/receiver pair for the requested protocol.
pub fn build_endpoints(protocol: Protocol, seqnum_limit: u32) -> (Box<dyn Endpoint>, Box<dyn Endpoint>) {
    match protocol {
        Protocol::Abp => (
            Box::new(AbpSender::new(Entity::A)),
            Box::new(AbpReceiver::new(Entity::B)),
        ),
        Protocol::Gbn => (
            Box::new(GbnSender::new(Entity::A, seqnum_limit)),
            Box::new(GbnReceiver::new(Entity::B, seqnum_limit)),
        ),
    }
}
