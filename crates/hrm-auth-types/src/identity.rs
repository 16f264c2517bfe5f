//! Gateway-injected identity headers extractor.

use axum::extract::FromRequestParts;
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

use hrm_domain::actor::Actor;
use hrm_domain::id::{EmployeeId, IdentityId};
use hrm_domain::role::Role;

pub const IDENTITY_ID_HEADER: &str = "x-hrm-identity-id";
pub const ROLE_ID_HEADER: &str = "x-hrm-role-id";
pub const EMPLOYEE_ID_HEADER: &str = "x-hrm-employee-id";

/// Identity injected by the gateway via `x-hrm-identity-id`, `x-hrm-role-id`
/// and the optional `x-hrm-employee-id` header.
///
/// Returns 401 if the identity id or role id is absent or unparseable, or if
/// an employee id is present but not a UUID. Role enforcement (403) is done
/// by use cases after extraction.
#[derive(Debug, Clone)]
pub struct IdentityHeaders {
    pub identity_id: IdentityId,
    pub role_id: u8,
    pub employee_id: Option<EmployeeId>,
}

impl IdentityHeaders {
    pub fn actor(&self) -> Actor {
        Actor::new(self.identity_id, Role::from_id(self.role_id), self.employee_id)
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

impl<S> FromRequestParts<S> for IdentityHeaders
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // Values are read synchronously so the returned future is 'static.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let identity_id = header(parts, IDENTITY_ID_HEADER).and_then(|s| s.parse::<Uuid>().ok());
        let role_id = header(parts, ROLE_ID_HEADER).and_then(|s| s.parse::<u8>().ok());
        let employee_id = header(parts, EMPLOYEE_ID_HEADER).map(|s| s.parse::<Uuid>());

        async move {
            let (Some(identity_id), Some(role_id)) = (identity_id, role_id) else {
                tracing::debug!("missing or malformed identity headers");
                return Err(StatusCode::UNAUTHORIZED);
            };
            let employee_id = match employee_id {
                None => None,
                Some(Ok(id)) => Some(EmployeeId(id)),
                Some(Err(_)) => {
                    tracing::debug!("malformed employee id header");
                    return Err(StatusCode::UNAUTHORIZED);
                }
            };
            Ok(Self {
                identity_id: IdentityId(identity_id),
                role_id,
                employee_id,
            })
        }
    }
}
