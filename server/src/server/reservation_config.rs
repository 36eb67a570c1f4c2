use std::{default::Default, time::Duration};

use transit_shared::NodeId;

/// Contains Config properties which will be used by the reservation context
#[derive(Clone, Debug)]
pub struct ReservationConfig {
    /// Name of this node, stamped on outgoing departure requests so replies
    /// can be routed back.
    pub local_node: NodeId,
    /// How long a traveler is kept from starting another transfer after it
    /// was locked.
    pub gate_lock_expiration: Duration,
    /// How long a cross-node reservation may wait for its outcome before
    /// `check_timeouts` times it out. Also bounds how long a pending arrival
    /// waits for its rider to join.
    pub arrival_timeout: Duration,
    /// Prepended to a gate key to name the capability needed to use it.
    pub permission_prefix: String,
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            local_node: NodeId::new("local"),
            gate_lock_expiration: Duration::from_secs(2),
            arrival_timeout: Duration::from_secs(30),
            permission_prefix: "use.".to_string(),
        }
    }
}
