pub mod event;
pub mod interface;
pub mod medium;
pub mod simulator;
pub mod stats;

pub use event::{Event, EventKind, EventQueue};
pub use interface::{Endpoint, EndpointApi};
pub use medium::Medium;
pub use simulator::Simulator;
pub use stats::Stats;
