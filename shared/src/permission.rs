use thiserror::Error;

use crate::TravelerId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("permission '{permission}' denied: {reason}")]
pub struct PermissionDenied {
    pub permission: String,
    pub reason: String,
}

impl PermissionDenied {
    pub fn new(permission: &str, reason: &str) -> Self {
        Self {
            permission: permission.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Capability check consulted before a departure or arrival is committed
pub trait Permissions {
    fn require(&self, traveler: &TravelerId, permission: &str) -> Result<(), PermissionDenied>;
}

/// Grants everything. Used when the host has no permission system.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl Permissions for AllowAll {
    fn require(&self, _: &TravelerId, _: &str) -> Result<(), PermissionDenied> {
        Ok(())
    }
}
