#![allow(async_fn_in_trait)]

use chrono::{DateTime, NaiveDate, Utc};

use hrm_domain::id::{ContractId, EmployeeId, IdentityId, LaborRequestId, SanctionId};
use hrm_domain::pagination::PageRequest;
use hrm_domain::scope::EmployeeScope;

use crate::domain::types::{
    Contract, ContractFilter, ContractStats, ContractTerms, Employee, EmployeeFilter,
    EmployeeProfile, Identity, LaborRequest, LaborRequestDetails, LaborRequestFilter, Sanction,
    SanctionDetails, SanctionFilter,
};
use crate::error::PersonnelServiceError;

/// Who performed a mutation, and when.
#[derive(Debug, Clone, Copy)]
pub struct Stamp {
    pub by: IdentityId,
    pub at: DateTime<Utc>,
}

impl Stamp {
    pub fn now(by: IdentityId) -> Self {
        Self { by, at: Utc::now() }
    }
}

/// Repository for the employee directory.
pub trait EmployeeRepository: Send + Sync {
    async fn find_by_id(&self, id: EmployeeId) -> Result<Option<Employee>, PersonnelServiceError>;

    /// One page of employees inside `scope`, ordered by last then first name,
    /// plus the total match count.
    async fn list(
        &self,
        scope: &EmployeeScope,
        filter: &EmployeeFilter,
        page: PageRequest,
    ) -> Result<(Vec<Employee>, u64), PersonnelServiceError>;

    /// Active employees whose manager is `manager_id`.
    async fn active_direct_reports(
        &self,
        manager_id: EmployeeId,
    ) -> Result<Vec<Employee>, PersonnelServiceError>;

    /// Active employees, optionally without `exclude`.
    async fn list_active(
        &self,
        exclude: Option<EmployeeId>,
    ) -> Result<Vec<Employee>, PersonnelServiceError>;

    /// Insert the identity and its employee atomically. Fails with
    /// `AlreadyInUse` on a duplicate username or identification number.
    async fn create_with_identity(
        &self,
        identity: &Identity,
        employee: &Employee,
    ) -> Result<(), PersonnelServiceError>;

    /// Replace the profile and, when given, the linked identity's role in one
    /// transaction. Returns `false` if the employee does not exist.
    async fn update_profile(
        &self,
        id: EmployeeId,
        profile: &EmployeeProfile,
        role_id: Option<u8>,
        stamp: Stamp,
    ) -> Result<bool, PersonnelServiceError>;

    /// Returns `false` if the employee does not exist.
    async fn set_manager(
        &self,
        id: EmployeeId,
        manager_id: Option<EmployeeId>,
        stamp: Stamp,
    ) -> Result<bool, PersonnelServiceError>;

    /// Deactivate unless an active employee reports to `id`, as one
    /// conditional update. Returns `false` if no row was changed.
    async fn deactivate_if_no_active_reports(
        &self,
        id: EmployeeId,
        stamp: Stamp,
    ) -> Result<bool, PersonnelServiceError>;
}

/// Repository for labor requests. Transitions are conditional updates that
/// return `false` when the guard did not hold.
pub trait LaborRequestRepository: Send + Sync {
    async fn find_by_id(
        &self,
        id: LaborRequestId,
    ) -> Result<Option<LaborRequest>, PersonnelServiceError>;

    /// Newest first.
    async fn list(
        &self,
        scope: &EmployeeScope,
        filter: &LaborRequestFilter,
        page: PageRequest,
    ) -> Result<(Vec<LaborRequest>, u64), PersonnelServiceError>;

    async fn create(&self, request: &LaborRequest) -> Result<(), PersonnelServiceError>;

    /// Guard: pending and active.
    async fn update_details_if_pending(
        &self,
        id: LaborRequestId,
        details: &LaborRequestDetails,
        stamp: Stamp,
    ) -> Result<bool, PersonnelServiceError>;

    /// Guard: not yet approved and active.
    async fn approve_if_pending(
        &self,
        id: LaborRequestId,
        stamp: Stamp,
    ) -> Result<bool, PersonnelServiceError>;

    /// Guard: approved, not yet validated, and active.
    async fn validate_if_approved(
        &self,
        id: LaborRequestId,
        stamp: Stamp,
    ) -> Result<bool, PersonnelServiceError>;

    /// Unconditional; returns `false` only if the request does not exist.
    async fn deactivate(
        &self,
        id: LaborRequestId,
        stamp: Stamp,
    ) -> Result<bool, PersonnelServiceError>;
}

/// Repository for contracts.
pub trait ContractRepository: Send + Sync {
    async fn find_by_id(&self, id: ContractId) -> Result<Option<Contract>, PersonnelServiceError>;

    /// Newest first.
    async fn list(
        &self,
        scope: &EmployeeScope,
        filter: &ContractFilter,
        page: PageRequest,
    ) -> Result<(Vec<Contract>, u64), PersonnelServiceError>;

    async fn create(&self, contract: &Contract) -> Result<(), PersonnelServiceError>;

    /// Replace the terms; `attachment` replaces the stored path when `Some`.
    async fn update(
        &self,
        id: ContractId,
        terms: &ContractTerms,
        attachment: Option<&str>,
        stamp: Stamp,
    ) -> Result<bool, PersonnelServiceError>;

    async fn set_attachment(
        &self,
        id: ContractId,
        attachment: &str,
        stamp: Stamp,
    ) -> Result<bool, PersonnelServiceError>;

    async fn set_active(
        &self,
        id: ContractId,
        active: bool,
        stamp: Stamp,
    ) -> Result<bool, PersonnelServiceError>;

    async fn delete(&self, id: ContractId) -> Result<bool, PersonnelServiceError>;

    /// In one transaction, deactivate `id` if it is still active and insert
    /// `successor`. Returns `false`, inserting nothing, if `id` was not active.
    async fn renew(
        &self,
        id: ContractId,
        successor: &Contract,
        stamp: Stamp,
    ) -> Result<bool, PersonnelServiceError>;

    async fn statistics(
        &self,
        scope: &EmployeeScope,
        today: NaiveDate,
    ) -> Result<ContractStats, PersonnelServiceError>;
}

/// Repository for disciplinary sanctions.
pub trait SanctionRepository: Send + Sync {
    async fn find_by_id(&self, id: SanctionId) -> Result<Option<Sanction>, PersonnelServiceError>;

    /// Newest first.
    async fn list(
        &self,
        scope: &EmployeeScope,
        filter: &SanctionFilter,
        page: PageRequest,
    ) -> Result<(Vec<Sanction>, u64), PersonnelServiceError>;

    async fn create(&self, sanction: &Sanction) -> Result<(), PersonnelServiceError>;

    /// Replace the details; `active` changes the status only when `Some`.
    /// Returns `false` if the sanction does not exist.
    async fn update(
        &self,
        id: SanctionId,
        details: &SanctionDetails,
        active: Option<bool>,
        stamp: Stamp,
    ) -> Result<bool, PersonnelServiceError>;

    async fn deactivate(&self, id: SanctionId, stamp: Stamp) -> Result<bool, PersonnelServiceError>;
}

/// Port for attachment file storage. Paths are relative to the store root.
pub trait AttachmentStore: Send + Sync {
    /// Write `bytes` under `path` and return the stored path.
    async fn store(&self, path: &str, bytes: &[u8]) -> Result<String, PersonnelServiceError>;

    async fn exists(&self, path: &str) -> Result<bool, PersonnelServiceError>;

    async fn retrieve(&self, path: &str) -> Result<Vec<u8>, PersonnelServiceError>;

    /// Missing files are not an error.
    async fn delete(&self, path: &str) -> Result<(), PersonnelServiceError>;
}
