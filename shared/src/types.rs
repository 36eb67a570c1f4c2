use std::fmt;

pub type ReservationId = u64;

// TravelerId
/// Stable identity of a traveler object as handed out by the host world.
/// Riders keep the same identity across nodes; vehicles do not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TravelerId(u64);

impl TravelerId {
    pub fn from_u64(value: u64) -> Self {
        Self(value)
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TravelerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// NodeId
/// Name of a server process taking part in cross-node transfers.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// GateKey
/// Fully qualified gate name, unique across every node that can link to it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GateKey(String);

impl GateKey {
    pub fn new(full_name: &str) -> Self {
        Self(full_name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TravelDirection {
    Departing,
    Arriving,
}
