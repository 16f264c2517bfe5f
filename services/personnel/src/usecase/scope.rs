use hrm_domain::actor::Actor;
use hrm_domain::id::EmployeeId;
use hrm_domain::role::Capability;
use hrm_domain::scope::EmployeeScope;

use crate::domain::repository::EmployeeRepository;
use crate::error::PersonnelServiceError;

/// Compute the employees `actor` may see. Loads the direct reports only for
/// roles that can see them.
pub async fn resolve_scope<R: EmployeeRepository>(
    repo: &R,
    actor: &Actor,
) -> Result<EmployeeScope, PersonnelServiceError> {
    let reports = match EmployeeScope::reports_needed_for(actor) {
        Some(manager_id) => repo
            .active_direct_reports(manager_id)
            .await?
            .into_iter()
            .map(|e| e.id)
            .collect(),
        None => Vec::new(),
    };
    Ok(EmployeeScope::resolve(actor, reports))
}

pub fn ensure_in_scope(scope: &EmployeeScope, id: EmployeeId) -> Result<(), PersonnelServiceError> {
    if scope.contains(id) {
        Ok(())
    } else {
        Err(PersonnelServiceError::Forbidden)
    }
}

pub fn require(actor: &Actor, capability: Capability) -> Result<(), PersonnelServiceError> {
    if actor.can(capability) {
        Ok(())
    } else {
        Err(PersonnelServiceError::Forbidden)
    }
}
