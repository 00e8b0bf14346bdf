use std::fmt;

/// The fixed pair of transport-layer endpoints the simulator drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    A,
    B,
}

impl Entity {
    pub fn peer(self) -> Entity {
        match self {
            Entity::A => Entity::B,
            Entity::B => Entity::A,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::A => write!(f, "A"),
            Entity::B => write!(f, "B"),
        }
    }
}
