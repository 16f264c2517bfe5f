//! Mock identity helpers for integration tests.
//!
//! Services behind the gateway receive `x-hrm-identity-id`, `x-hrm-role-id` and
//! optionally `x-hrm-employee-id`. `MockAuth` produces these headers directly
//! so no real gateway is needed.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use hrm_auth_types::identity::{EMPLOYEE_ID_HEADER, IDENTITY_ID_HEADER, ROLE_ID_HEADER};
use hrm_domain::actor::Actor;
use hrm_domain::id::{EmployeeId, IdentityId};
use hrm_domain::role::Role;

/// Configurable identity injected into test requests.
#[derive(Debug, Clone, Copy)]
pub struct MockAuth {
    pub identity_id: IdentityId,
    pub role_id: u8,
    pub employee_id: Option<EmployeeId>,
}

impl MockAuth {
    pub fn new(role_id: u8, employee_id: Option<EmployeeId>) -> Self {
        Self {
            identity_id: IdentityId::new(),
            role_id,
            employee_id,
        }
    }

    /// HR identity without a linked employee.
    pub fn hr() -> Self {
        Self::new(Role::HR_ID, None)
    }

    pub fn manager(employee_id: EmployeeId) -> Self {
        Self::new(Role::MANAGER_ID, Some(employee_id))
    }

    pub fn staff(employee_id: EmployeeId) -> Self {
        Self::new(3, Some(employee_id))
    }

    /// The actor the service will derive from [`MockAuth::headers`].
    pub fn actor(&self) -> Actor {
        Actor::new(self.identity_id, Role::from_id(self.role_id), self.employee_id)
    }

    /// Return headers as if the gateway injected them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            HeaderName::from_static(IDENTITY_ID_HEADER),
            HeaderValue::from_str(&self.identity_id.to_string()).unwrap(),
        );
        map.insert(
            HeaderName::from_static(ROLE_ID_HEADER),
            HeaderValue::from(u16::from(self.role_id)),
        );
        if let Some(employee_id) = self.employee_id {
            map.insert(
                HeaderName::from_static(EMPLOYEE_ID_HEADER),
                HeaderValue::from_str(&employee_id.to_string()).unwrap(),
            );
        }
        map
    }
}
