use std::collections::HashSet;

use anyhow::anyhow;
use chrono::Utc;
use tracing::info;

use hrm_domain::actor::Actor;
use hrm_domain::id::{EmployeeId, IdentityId};
use hrm_domain::pagination::{Page, PageRequest};
use hrm_domain::role::Capability;

use crate::domain::repository::{EmployeeRepository, Stamp};
use crate::domain::types::{Employee, EmployeeFilter, EmployeeProfile, Identity, non_blank};
use crate::error::PersonnelServiceError;
use crate::usecase::scope::{ensure_in_scope, require, resolve_scope};

// ── ListEmployees ────────────────────────────────────────────────────────────

pub struct ListEmployeesUseCase<R: EmployeeRepository> {
    pub repo: R,
}

impl<R: EmployeeRepository> ListEmployeesUseCase<R> {
    pub async fn execute(
        &self,
        actor: &Actor,
        filter: EmployeeFilter,
        page: PageRequest,
    ) -> Result<Page<Employee>, PersonnelServiceError> {
        let scope = resolve_scope(&self.repo, actor).await?;
        let page = page.clamped();
        let (employees, total) = self.repo.list(&scope, &filter, page).await?;
        Ok(Page::new(employees, page, total))
    }
}

// ── GetEmployee ──────────────────────────────────────────────────────────────

pub struct GetEmployeeUseCase<R: EmployeeRepository> {
    pub repo: R,
}

impl<R: EmployeeRepository> GetEmployeeUseCase<R> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: EmployeeId,
    ) -> Result<Employee, PersonnelServiceError> {
        let employee = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(PersonnelServiceError::EmployeeNotFound)?;
        let scope = resolve_scope(&self.repo, actor).await?;
        ensure_in_scope(&scope, employee.id)?;
        Ok(employee)
    }
}

// ── CreateEmployee ───────────────────────────────────────────────────────────

pub struct CreateEmployeeInput {
    pub profile: EmployeeProfile,
    pub manager_id: Option<EmployeeId>,
    pub username: String,
    /// Defaults to the employee's full name.
    pub display_name: Option<String>,
    pub role_id: u8,
}

pub struct CreateEmployeeUseCase<R: EmployeeRepository> {
    pub repo: R,
}

impl<R: EmployeeRepository> CreateEmployeeUseCase<R> {
    pub async fn execute(
        &self,
        actor: &Actor,
        input: CreateEmployeeInput,
    ) -> Result<Employee, PersonnelServiceError> {
        require(actor, Capability::ManageEmployees)?;
        let profile = input.profile.normalized();
        profile.validate()?;
        let username = input.username.trim().to_owned();
        if username.is_empty() {
            return Err(PersonnelServiceError::MissingField("username"));
        }
        if let Some(manager_id) = input.manager_id {
            ensure_assignable_manager(&self.repo, manager_id).await?;
        }

        let now = Utc::now();
        let identity = Identity {
            id: IdentityId::new(),
            username,
            display_name: non_blank(input.display_name).unwrap_or_else(|| profile.full_name()),
            role_id: input.role_id,
            created_at: now,
            updated_at: now,
        };
        let employee = Employee {
            id: EmployeeId::new(),
            identity_id: Some(identity.id),
            manager_id: input.manager_id,
            profile,
            active: true,
            created_by: actor.identity_id,
            created_at: now,
            updated_by: None,
            updated_at: None,
        };
        self.repo.create_with_identity(&identity, &employee).await?;
        info!(employee_id = %employee.id, identity_id = %identity.id, "employee created");
        Ok(employee)
    }
}

// ── UpdateEmployee ───────────────────────────────────────────────────────────

pub struct UpdateEmployeeInput {
    pub profile: EmployeeProfile,
    /// New role for the linked identity, if it should change.
    pub role_id: Option<u8>,
}

pub struct UpdateEmployeeUseCase<R: EmployeeRepository> {
    pub repo: R,
}

impl<R: EmployeeRepository> UpdateEmployeeUseCase<R> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: EmployeeId,
        input: UpdateEmployeeInput,
    ) -> Result<Employee, PersonnelServiceError> {
        require(actor, Capability::ManageEmployees)?;
        let profile = input.profile.normalized();
        profile.validate()?;
        let updated = self
            .repo
            .update_profile(id, &profile, input.role_id, Stamp::now(actor.identity_id))
            .await?;
        if !updated {
            return Err(PersonnelServiceError::EmployeeNotFound);
        }
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(PersonnelServiceError::EmployeeNotFound)
    }
}

// ── SetManager ───────────────────────────────────────────────────────────────

pub struct SetManagerUseCase<R: EmployeeRepository> {
    pub repo: R,
}

impl<R: EmployeeRepository> SetManagerUseCase<R> {
    /// `None` clears the manager.
    pub async fn execute(
        &self,
        actor: &Actor,
        id: EmployeeId,
        manager_id: Option<EmployeeId>,
    ) -> Result<Employee, PersonnelServiceError> {
        require(actor, Capability::ManageEmployees)?;
        if manager_id == Some(id) {
            return Err(PersonnelServiceError::SelfManager);
        }
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(PersonnelServiceError::EmployeeNotFound);
        }
        if let Some(manager_id) = manager_id {
            let manager = ensure_assignable_manager(&self.repo, manager_id).await?;
            self.ensure_acyclic(id, manager).await?;
        }

        let updated = self
            .repo
            .set_manager(id, manager_id, Stamp::now(actor.identity_id))
            .await?;
        if !updated {
            return Err(PersonnelServiceError::EmployeeNotFound);
        }
        info!(employee_id = %id, manager_id = ?manager_id, "manager assigned");
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(PersonnelServiceError::EmployeeNotFound)
    }

    /// Walk up from the new manager; reaching `id` means the assignment
    /// would close a loop.
    async fn ensure_acyclic(
        &self,
        id: EmployeeId,
        manager: Employee,
    ) -> Result<(), PersonnelServiceError> {
        let mut seen = HashSet::from([manager.id]);
        let mut cursor = manager.manager_id;
        while let Some(ancestor) = cursor {
            if ancestor == id {
                return Err(PersonnelServiceError::ManagerCycle);
            }
            if !seen.insert(ancestor) {
                break;
            }
            cursor = self
                .repo
                .find_by_id(ancestor)
                .await?
                .and_then(|e| e.manager_id);
        }
        Ok(())
    }
}

async fn ensure_assignable_manager<R: EmployeeRepository>(
    repo: &R,
    manager_id: EmployeeId,
) -> Result<Employee, PersonnelServiceError> {
    match repo.find_by_id(manager_id).await? {
        Some(manager) if manager.active => Ok(manager),
        _ => Err(PersonnelServiceError::InvalidField("manager_id")),
    }
}

// ── DeactivateEmployee ───────────────────────────────────────────────────────

pub struct DeactivateEmployeeUseCase<R: EmployeeRepository> {
    pub repo: R,
}

impl<R: EmployeeRepository> DeactivateEmployeeUseCase<R> {
    pub async fn execute(&self, actor: &Actor, id: EmployeeId) -> Result<(), PersonnelServiceError> {
        require(actor, Capability::ManageEmployees)?;
        if self
            .repo
            .deactivate_if_no_active_reports(id, Stamp::now(actor.identity_id))
            .await?
        {
            info!(employee_id = %id, "employee deactivated");
            return Ok(());
        }
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(PersonnelServiceError::EmployeeNotFound);
        }
        if !self.repo.active_direct_reports(id).await?.is_empty() {
            return Err(PersonnelServiceError::HasActiveSubordinates);
        }
        Err(anyhow!("employee {id} deactivation matched no rows").into())
    }
}

// ── ListSubordinates ─────────────────────────────────────────────────────────

pub struct ListSubordinatesUseCase<R: EmployeeRepository> {
    pub repo: R,
}

impl<R: EmployeeRepository> ListSubordinatesUseCase<R> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: EmployeeId,
    ) -> Result<Vec<Employee>, PersonnelServiceError> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(PersonnelServiceError::EmployeeNotFound);
        }
        let scope = resolve_scope(&self.repo, actor).await?;
        ensure_in_scope(&scope, id)?;
        self.repo.active_direct_reports(id).await
    }
}

// ── ListPossibleManagers ─────────────────────────────────────────────────────

pub struct ListPossibleManagersUseCase<R: EmployeeRepository> {
    pub repo: R,
}

impl<R: EmployeeRepository> ListPossibleManagersUseCase<R> {
    pub async fn execute(
        &self,
        exclude: Option<EmployeeId>,
    ) -> Result<Vec<Employee>, PersonnelServiceError> {
        self.repo.list_active(exclude).await
    }
}
