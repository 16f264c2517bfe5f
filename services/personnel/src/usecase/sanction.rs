use chrono::Utc;
use tracing::info;

use hrm_domain::actor::Actor;
use hrm_domain::id::{EmployeeId, SanctionId};
use hrm_domain::pagination::{Page, PageRequest};
use hrm_domain::role::Capability;

use crate::domain::repository::{EmployeeRepository, SanctionRepository, Stamp};
use crate::domain::types::{Sanction, SanctionDetails, SanctionFilter};
use crate::error::PersonnelServiceError;
use crate::usecase::scope::{ensure_in_scope, require, resolve_scope};

// ── ListSanctions ────────────────────────────────────────────────────────────

pub struct ListSanctionsUseCase<E: EmployeeRepository, S: SanctionRepository> {
    pub employees: E,
    pub sanctions: S,
}

impl<E: EmployeeRepository, S: SanctionRepository> ListSanctionsUseCase<E, S> {
    pub async fn execute(
        &self,
        actor: &Actor,
        filter: SanctionFilter,
        page: PageRequest,
    ) -> Result<Page<Sanction>, PersonnelServiceError> {
        let scope = resolve_scope(&self.employees, actor).await?;
        let page = page.clamped();
        let (sanctions, total) = self.sanctions.list(&scope, &filter, page).await?;
        Ok(Page::new(sanctions, page, total))
    }
}

// ── GetSanction ──────────────────────────────────────────────────────────────

pub struct GetSanctionUseCase<E: EmployeeRepository, S: SanctionRepository> {
    pub employees: E,
    pub sanctions: S,
}

impl<E: EmployeeRepository, S: SanctionRepository> GetSanctionUseCase<E, S> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: SanctionId,
    ) -> Result<Sanction, PersonnelServiceError> {
        let sanction = find(&self.sanctions, id).await?;
        let scope = resolve_scope(&self.employees, actor).await?;
        ensure_in_scope(&scope, sanction.employee_id())?;
        Ok(sanction)
    }
}

// ── CreateSanction ───────────────────────────────────────────────────────────

pub struct CreateSanctionUseCase<E: EmployeeRepository, S: SanctionRepository> {
    pub employees: E,
    pub sanctions: S,
}

impl<E: EmployeeRepository, S: SanctionRepository> CreateSanctionUseCase<E, S> {
    pub async fn execute(
        &self,
        actor: &Actor,
        details: SanctionDetails,
    ) -> Result<Sanction, PersonnelServiceError> {
        require(actor, Capability::ManageSanctions)?;
        let details = details.normalized();
        details.validate()?;
        ensure_active_employee(&self.employees, details.employee_id).await?;

        let sanction = Sanction {
            id: SanctionId::new(),
            details,
            active: true,
            created_by: actor.identity_id,
            created_at: Utc::now(),
            updated_by: None,
            updated_at: None,
        };
        self.sanctions.create(&sanction).await?;
        info!(
            sanction_id = %sanction.id,
            employee_id = %sanction.employee_id(),
            "sanction recorded"
        );
        Ok(sanction)
    }
}

// ── UpdateSanction ───────────────────────────────────────────────────────────

pub struct UpdateSanctionUseCase<E: EmployeeRepository, S: SanctionRepository> {
    pub employees: E,
    pub sanctions: S,
}

impl<E: EmployeeRepository, S: SanctionRepository> UpdateSanctionUseCase<E, S> {
    /// `active` restores or retires the sanction in the same write when given.
    pub async fn execute(
        &self,
        actor: &Actor,
        id: SanctionId,
        details: SanctionDetails,
        active: Option<bool>,
    ) -> Result<Sanction, PersonnelServiceError> {
        require(actor, Capability::ManageSanctions)?;
        let details = details.normalized();
        details.validate()?;
        let current = find(&self.sanctions, id).await?;
        if current.employee_id() != details.employee_id {
            ensure_active_employee(&self.employees, details.employee_id).await?;
        }
        if !self
            .sanctions
            .update(id, &details, active, Stamp::now(actor.identity_id))
            .await?
        {
            return Err(PersonnelServiceError::SanctionNotFound);
        }
        find(&self.sanctions, id).await
    }
}

// ── DeactivateSanction ───────────────────────────────────────────────────────

/// Soft delete. Repeating it is harmless.
pub struct DeactivateSanctionUseCase<S: SanctionRepository> {
    pub sanctions: S,
}

impl<S: SanctionRepository> DeactivateSanctionUseCase<S> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: SanctionId,
    ) -> Result<Sanction, PersonnelServiceError> {
        require(actor, Capability::ManageSanctions)?;
        if !self
            .sanctions
            .deactivate(id, Stamp::now(actor.identity_id))
            .await?
        {
            return Err(PersonnelServiceError::SanctionNotFound);
        }
        info!(sanction_id = %id, "sanction deactivated");
        find(&self.sanctions, id).await
    }
}

async fn find<S: SanctionRepository>(
    sanctions: &S,
    id: SanctionId,
) -> Result<Sanction, PersonnelServiceError> {
    sanctions
        .find_by_id(id)
        .await?
        .ok_or(PersonnelServiceError::SanctionNotFound)
}

async fn ensure_active_employee<E: EmployeeRepository>(
    employees: &E,
    id: EmployeeId,
) -> Result<(), PersonnelServiceError> {
    match employees.find_by_id(id).await? {
        Some(employee) if employee.active => Ok(()),
        _ => Err(PersonnelServiceError::InvalidField("employee_id")),
    }
}
