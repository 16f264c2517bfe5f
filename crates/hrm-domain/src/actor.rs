//! The identity performing a request.

use crate::id::{EmployeeId, IdentityId};
use crate::role::{Capability, Role};

/// Acting identity, passed explicitly into every use case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub identity_id: IdentityId,
    pub role: Role,
    /// Employee record linked to this identity, if any.
    pub employee_id: Option<EmployeeId>,
}

impl Actor {
    pub fn new(identity_id: IdentityId, role: Role, employee_id: Option<EmployeeId>) -> Self {
        Self {
            identity_id,
            role,
            employee_id,
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.role.can(capability)
    }
}
