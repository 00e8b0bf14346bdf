pub mod checksum;
pub mod entity;
pub mod error;
pub mod message;
pub mod options;
pub mod packet;

pub use entity::Entity;
pub use error::ConfigError;
pub use message::Message;
pub use options::{Protocol, SimulationOptions};
pub use packet::Packet;
