use anyhow::anyhow;
use chrono::Utc;
use tracing::info;

use hrm_domain::actor::Actor;
use hrm_domain::id::{EmployeeId, LaborRequestId};
use hrm_domain::pagination::{Page, PageRequest};
use hrm_domain::role::Capability;

use crate::domain::repository::{EmployeeRepository, LaborRequestRepository, Stamp};
use crate::domain::types::{LaborRequest, LaborRequestDetails, LaborRequestFilter, LaborRequestKind};
use crate::error::PersonnelServiceError;
use crate::usecase::scope::{ensure_in_scope, require, resolve_scope};

// ── ListLaborRequests ────────────────────────────────────────────────────────

pub struct ListLaborRequestsUseCase<E: EmployeeRepository, L: LaborRequestRepository> {
    pub employees: E,
    pub requests: L,
}

impl<E: EmployeeRepository, L: LaborRequestRepository> ListLaborRequestsUseCase<E, L> {
    pub async fn execute(
        &self,
        actor: &Actor,
        filter: LaborRequestFilter,
        page: PageRequest,
    ) -> Result<Page<LaborRequest>, PersonnelServiceError> {
        let scope = resolve_scope(&self.employees, actor).await?;
        let page = page.clamped();
        let (requests, total) = self.requests.list(&scope, &filter, page).await?;
        Ok(Page::new(requests, page, total))
    }
}

// ── GetLaborRequest ──────────────────────────────────────────────────────────

pub struct GetLaborRequestUseCase<E: EmployeeRepository, L: LaborRequestRepository> {
    pub employees: E,
    pub requests: L,
}

impl<E: EmployeeRepository, L: LaborRequestRepository> GetLaborRequestUseCase<E, L> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: LaborRequestId,
    ) -> Result<LaborRequest, PersonnelServiceError> {
        find_in_scope(&self.employees, &self.requests, actor, id).await
    }
}

async fn find_in_scope<E: EmployeeRepository, L: LaborRequestRepository>(
    employees: &E,
    requests: &L,
    actor: &Actor,
    id: LaborRequestId,
) -> Result<LaborRequest, PersonnelServiceError> {
    let request = requests
        .find_by_id(id)
        .await?
        .ok_or(PersonnelServiceError::LaborRequestNotFound)?;
    let scope = resolve_scope(employees, actor).await?;
    ensure_in_scope(&scope, request.employee_id)?;
    Ok(request)
}

// ── CreateLaborRequest ───────────────────────────────────────────────────────

pub struct CreateLaborRequestInput {
    /// Subject employee. Defaults to the actor's linked employee.
    pub employee_id: Option<EmployeeId>,
    pub kind: String,
    pub details: LaborRequestDetails,
}

pub struct CreateLaborRequestUseCase<E: EmployeeRepository, L: LaborRequestRepository> {
    pub employees: E,
    pub requests: L,
}

impl<E: EmployeeRepository, L: LaborRequestRepository> CreateLaborRequestUseCase<E, L> {
    pub async fn execute(
        &self,
        actor: &Actor,
        input: CreateLaborRequestInput,
    ) -> Result<LaborRequest, PersonnelServiceError> {
        let kind =
            LaborRequestKind::parse(&input.kind).ok_or(PersonnelServiceError::MissingField("kind"))?;
        input.details.validate()?;
        let subject = input
            .employee_id
            .or(actor.employee_id)
            .ok_or(PersonnelServiceError::MissingField("employee_id"))?;
        if Some(subject) != actor.employee_id && !actor.can(Capability::FileRequestsForOthers) {
            return Err(PersonnelServiceError::Forbidden);
        }
        match self.employees.find_by_id(subject).await? {
            Some(employee) if employee.active => {}
            _ => return Err(PersonnelServiceError::InvalidField("employee_id")),
        }

        let request = LaborRequest {
            id: LaborRequestId::new(),
            employee_id: subject,
            kind,
            details: input.details,
            approved_by: None,
            approved_at: None,
            validated_by: None,
            validated_at: None,
            active: true,
            created_by: actor.identity_id,
            created_at: Utc::now(),
            updated_by: None,
            updated_at: None,
        };
        self.requests.create(&request).await?;
        info!(
            labor_request_id = %request.id,
            employee_id = %request.employee_id,
            kind = %request.kind,
            "labor request filed"
        );
        Ok(request)
    }
}

// ── UpdateLaborRequest ───────────────────────────────────────────────────────

pub struct UpdateLaborRequestUseCase<E: EmployeeRepository, L: LaborRequestRepository> {
    pub employees: E,
    pub requests: L,
}

impl<E: EmployeeRepository, L: LaborRequestRepository> UpdateLaborRequestUseCase<E, L> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: LaborRequestId,
        details: LaborRequestDetails,
    ) -> Result<LaborRequest, PersonnelServiceError> {
        details.validate()?;
        find_in_scope(&self.employees, &self.requests, actor, id).await?;
        let updated = self
            .requests
            .update_details_if_pending(id, &details, Stamp::now(actor.identity_id))
            .await?;
        let current = self.reload(id).await?;
        if updated {
            return Ok(current);
        }
        Err(current
            .edit_conflict()
            .unwrap_or_else(|| anyhow!("labor request {id} edit matched no rows").into()))
    }

    async fn reload(&self, id: LaborRequestId) -> Result<LaborRequest, PersonnelServiceError> {
        self.requests
            .find_by_id(id)
            .await?
            .ok_or(PersonnelServiceError::LaborRequestNotFound)
    }
}

// ── ApproveLaborRequest ──────────────────────────────────────────────────────

/// First stage: a manager approves a pending request. Approval is not
/// narrowed to the approver's scope; HR validation is the second check.
pub struct ApproveLaborRequestUseCase<L: LaborRequestRepository> {
    pub requests: L,
}

impl<L: LaborRequestRepository> ApproveLaborRequestUseCase<L> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: LaborRequestId,
    ) -> Result<LaborRequest, PersonnelServiceError> {
        require(actor, Capability::ApproveRequests)?;
        let approved = self
            .requests
            .approve_if_pending(id, Stamp::now(actor.identity_id))
            .await?;
        let current = self
            .requests
            .find_by_id(id)
            .await?
            .ok_or(PersonnelServiceError::LaborRequestNotFound)?;
        if approved {
            info!(labor_request_id = %id, approved_by = %actor.identity_id, "labor request approved");
            return Ok(current);
        }
        Err(current
            .approve_conflict()
            .unwrap_or_else(|| anyhow!("labor request {id} approval matched no rows").into()))
    }
}

// ── ValidateLaborRequest ─────────────────────────────────────────────────────

/// Second stage: HR validates an approved request.
pub struct ValidateLaborRequestUseCase<L: LaborRequestRepository> {
    pub requests: L,
}

impl<L: LaborRequestRepository> ValidateLaborRequestUseCase<L> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: LaborRequestId,
    ) -> Result<LaborRequest, PersonnelServiceError> {
        require(actor, Capability::ValidateRequests)?;
        let validated = self
            .requests
            .validate_if_approved(id, Stamp::now(actor.identity_id))
            .await?;
        let current = self
            .requests
            .find_by_id(id)
            .await?
            .ok_or(PersonnelServiceError::LaborRequestNotFound)?;
        if validated {
            info!(labor_request_id = %id, validated_by = %actor.identity_id, "labor request validated");
            return Ok(current);
        }
        Err(current
            .validate_conflict()
            .unwrap_or_else(|| anyhow!("labor request {id} validation matched no rows").into()))
    }
}

// ── DeactivateLaborRequest ───────────────────────────────────────────────────

/// Terminal and idempotent; also the denial path, since there is no reject.
pub struct DeactivateLaborRequestUseCase<E: EmployeeRepository, L: LaborRequestRepository> {
    pub employees: E,
    pub requests: L,
}

impl<E: EmployeeRepository, L: LaborRequestRepository> DeactivateLaborRequestUseCase<E, L> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: LaborRequestId,
    ) -> Result<LaborRequest, PersonnelServiceError> {
        find_in_scope(&self.employees, &self.requests, actor, id).await?;
        if !self
            .requests
            .deactivate(id, Stamp::now(actor.identity_id))
            .await?
        {
            return Err(PersonnelServiceError::LaborRequestNotFound);
        }
        info!(labor_request_id = %id, "labor request deactivated");
        self.requests
            .find_by_id(id)
            .await?
            .ok_or(PersonnelServiceError::LaborRequestNotFound)
    }
}
