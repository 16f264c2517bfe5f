use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use hrm_domain::actor::Actor;
use hrm_domain::id::{ContractId, EmployeeId};
use hrm_domain::pagination::{Page, PageRequest};
use hrm_domain::role::Capability;

use crate::domain::repository::{AttachmentStore, ContractRepository, EmployeeRepository, Stamp};
use crate::domain::types::{
    AttachmentUpload, Contract, ContractFilter, ContractStats, ContractTerms, RenewalTerms,
};
use crate::error::PersonnelServiceError;
use crate::usecase::scope::{ensure_in_scope, require, resolve_scope};

// ── ListContracts ────────────────────────────────────────────────────────────

pub struct ListContractsUseCase<E: EmployeeRepository, C: ContractRepository> {
    pub employees: E,
    pub contracts: C,
}

impl<E: EmployeeRepository, C: ContractRepository> ListContractsUseCase<E, C> {
    pub async fn execute(
        &self,
        actor: &Actor,
        mut filter: ContractFilter,
        page: PageRequest,
    ) -> Result<Page<Contract>, PersonnelServiceError> {
        let scope = resolve_scope(&self.employees, actor).await?;
        if !scope.is_unrestricted() {
            filter.employee_id = None;
        }
        let page = page.clamped();
        let (contracts, total) = self.contracts.list(&scope, &filter, page).await?;
        Ok(Page::new(contracts, page, total))
    }
}

// ── GetContract ──────────────────────────────────────────────────────────────

pub struct GetContractUseCase<E: EmployeeRepository, C: ContractRepository> {
    pub employees: E,
    pub contracts: C,
}

impl<E: EmployeeRepository, C: ContractRepository> GetContractUseCase<E, C> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: ContractId,
    ) -> Result<Contract, PersonnelServiceError> {
        let contract = find(&self.contracts, id).await?;
        let scope = resolve_scope(&self.employees, actor).await?;
        ensure_in_scope(&scope, contract.employee_id)?;
        Ok(contract)
    }
}

async fn find<C: ContractRepository>(
    contracts: &C,
    id: ContractId,
) -> Result<Contract, PersonnelServiceError> {
    contracts
        .find_by_id(id)
        .await?
        .ok_or(PersonnelServiceError::ContractNotFound)
}

// ── ContractStatistics ───────────────────────────────────────────────────────

pub struct ContractStatisticsUseCase<E: EmployeeRepository, C: ContractRepository> {
    pub employees: E,
    pub contracts: C,
}

impl<E: EmployeeRepository, C: ContractRepository> ContractStatisticsUseCase<E, C> {
    pub async fn execute(
        &self,
        actor: &Actor,
        today: NaiveDate,
    ) -> Result<ContractStats, PersonnelServiceError> {
        let scope = resolve_scope(&self.employees, actor).await?;
        self.contracts.statistics(&scope, today).await
    }
}

// ── CreateContract ───────────────────────────────────────────────────────────

pub struct CreateContractInput {
    pub employee_id: EmployeeId,
    pub terms: ContractTerms,
    pub attachment: Option<AttachmentUpload>,
}

pub struct CreateContractUseCase<E: EmployeeRepository, C: ContractRepository, A: AttachmentStore> {
    pub employees: E,
    pub contracts: C,
    pub attachments: A,
    pub max_attachment_bytes: usize,
}

impl<E: EmployeeRepository, C: ContractRepository, A: AttachmentStore>
    CreateContractUseCase<E, C, A>
{
    pub async fn execute(
        &self,
        actor: &Actor,
        input: CreateContractInput,
    ) -> Result<Contract, PersonnelServiceError> {
        require(actor, Capability::ManageContracts)?;
        input.terms.validate()?;
        if self.employees.find_by_id(input.employee_id).await?.is_none() {
            return Err(PersonnelServiceError::InvalidField("employee_id"));
        }
        let attachment = match &input.attachment {
            Some(upload) => {
                Some(store_upload(&self.attachments, upload, self.max_attachment_bytes).await?)
            }
            None => None,
        };

        let contract = Contract {
            id: ContractId::new(),
            employee_id: input.employee_id,
            terms: input.terms,
            attachment,
            active: true,
            created_by: actor.identity_id,
            created_at: Utc::now(),
            updated_by: None,
            updated_at: None,
        };
        if let Err(e) = self.contracts.create(&contract).await {
            discard(&self.attachments, contract.attachment.as_deref()).await;
            return Err(e);
        }
        info!(contract_id = %contract.id, employee_id = %contract.employee_id, "contract created");
        Ok(contract)
    }
}

// ── UpdateContract ───────────────────────────────────────────────────────────

pub struct UpdateContractUseCase<C: ContractRepository, A: AttachmentStore> {
    pub contracts: C,
    pub attachments: A,
    pub max_attachment_bytes: usize,
}

impl<C: ContractRepository, A: AttachmentStore> UpdateContractUseCase<C, A> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: ContractId,
        terms: ContractTerms,
        attachment: Option<AttachmentUpload>,
    ) -> Result<Contract, PersonnelServiceError> {
        require(actor, Capability::ManageContracts)?;
        terms.validate()?;
        let previous = find(&self.contracts, id).await?;
        let stored = match &attachment {
            Some(upload) => {
                Some(store_upload(&self.attachments, upload, self.max_attachment_bytes).await?)
            }
            None => None,
        };

        let result = self
            .contracts
            .update(id, &terms, stored.as_deref(), Stamp::now(actor.identity_id))
            .await;
        settle_replacement(&self.attachments, result, stored.as_deref(), &previous).await?;
        find(&self.contracts, id).await
    }
}

// ── ReplaceAttachment ────────────────────────────────────────────────────────

pub struct ReplaceAttachmentUseCase<C: ContractRepository, A: AttachmentStore> {
    pub contracts: C,
    pub attachments: A,
    pub max_attachment_bytes: usize,
}

impl<C: ContractRepository, A: AttachmentStore> ReplaceAttachmentUseCase<C, A> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: ContractId,
        upload: AttachmentUpload,
    ) -> Result<Contract, PersonnelServiceError> {
        require(actor, Capability::ManageContracts)?;
        let previous = find(&self.contracts, id).await?;
        let stored = store_upload(&self.attachments, &upload, self.max_attachment_bytes).await?;
        let result = self
            .contracts
            .set_attachment(id, &stored, Stamp::now(actor.identity_id))
            .await;
        settle_replacement(&self.attachments, result, Some(&stored), &previous).await?;
        info!(contract_id = %id, "contract attachment replaced");
        find(&self.contracts, id).await
    }
}

/// After a row update that may have swapped the attachment: on failure drop
/// the new file, on success drop the superseded one.
async fn settle_replacement<A: AttachmentStore>(
    attachments: &A,
    result: Result<bool, PersonnelServiceError>,
    stored: Option<&str>,
    previous: &Contract,
) -> Result<(), PersonnelServiceError> {
    match result {
        Ok(true) => {
            if stored.is_some() {
                discard(attachments, previous.attachment.as_deref()).await;
            }
            Ok(())
        }
        Ok(false) => {
            discard(attachments, stored).await;
            Err(PersonnelServiceError::ContractNotFound)
        }
        Err(e) => {
            discard(attachments, stored).await;
            Err(e)
        }
    }
}

// ── SetContractActive ────────────────────────────────────────────────────────

pub struct SetContractActiveUseCase<C: ContractRepository> {
    pub contracts: C,
}

impl<C: ContractRepository> SetContractActiveUseCase<C> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: ContractId,
        active: bool,
    ) -> Result<Contract, PersonnelServiceError> {
        require(actor, Capability::ManageContracts)?;
        if !self
            .contracts
            .set_active(id, active, Stamp::now(actor.identity_id))
            .await?
        {
            return Err(PersonnelServiceError::ContractNotFound);
        }
        info!(contract_id = %id, active, "contract status changed");
        find(&self.contracts, id).await
    }
}

// ── RenewContract ────────────────────────────────────────────────────────────

pub struct RenewContractUseCase<C: ContractRepository> {
    pub contracts: C,
}

impl<C: ContractRepository> RenewContractUseCase<C> {
    /// Returns the new active contract.
    pub async fn execute(
        &self,
        actor: &Actor,
        id: ContractId,
        terms: RenewalTerms,
    ) -> Result<Contract, PersonnelServiceError> {
        require(actor, Capability::ManageContracts)?;
        terms.validate()?;
        let current = find(&self.contracts, id).await?;
        if !current.active {
            return Err(PersonnelServiceError::ContractInactive);
        }
        let stamp = Stamp::now(actor.identity_id);
        let successor = current.renewal(&terms, actor.identity_id, stamp.at);
        if !self.contracts.renew(id, &successor, stamp).await? {
            // Lost a race with another deactivation or a delete.
            return match self.contracts.find_by_id(id).await? {
                Some(_) => Err(PersonnelServiceError::ContractInactive),
                None => Err(PersonnelServiceError::ContractNotFound),
            };
        }
        info!(contract_id = %id, successor_id = %successor.id, "contract renewed");
        Ok(successor)
    }
}

// ── DeleteContract ───────────────────────────────────────────────────────────

pub struct DeleteContractUseCase<C: ContractRepository, A: AttachmentStore> {
    pub contracts: C,
    pub attachments: A,
}

impl<C: ContractRepository, A: AttachmentStore> DeleteContractUseCase<C, A> {
    pub async fn execute(&self, actor: &Actor, id: ContractId) -> Result<(), PersonnelServiceError> {
        require(actor, Capability::ManageContracts)?;
        let contract = find(&self.contracts, id).await?;
        if !self.contracts.delete(id).await? {
            return Err(PersonnelServiceError::ContractNotFound);
        }
        discard(&self.attachments, contract.attachment.as_deref()).await;
        info!(contract_id = %id, "contract deleted");
        Ok(())
    }
}

// ── DownloadAttachment ───────────────────────────────────────────────────────

pub struct DownloadedAttachment {
    pub path: String,
    pub bytes: Vec<u8>,
}

pub struct DownloadAttachmentUseCase<E: EmployeeRepository, C: ContractRepository, A: AttachmentStore>
{
    pub employees: E,
    pub contracts: C,
    pub attachments: A,
}

impl<E: EmployeeRepository, C: ContractRepository, A: AttachmentStore>
    DownloadAttachmentUseCase<E, C, A>
{
    pub async fn execute(
        &self,
        actor: &Actor,
        id: ContractId,
    ) -> Result<DownloadedAttachment, PersonnelServiceError> {
        let contract = find(&self.contracts, id).await?;
        let scope = resolve_scope(&self.employees, actor).await?;
        ensure_in_scope(&scope, contract.employee_id)?;
        let path = contract
            .attachment
            .ok_or(PersonnelServiceError::AttachmentNotFound)?;
        if !self.attachments.exists(&path).await? {
            return Err(PersonnelServiceError::AttachmentNotFound);
        }
        let bytes = self.attachments.retrieve(&path).await?;
        Ok(DownloadedAttachment { path, bytes })
    }
}

// ── helpers ──────────────────────────────────────────────────────────────────

async fn store_upload<A: AttachmentStore>(
    attachments: &A,
    upload: &AttachmentUpload,
    max_bytes: usize,
) -> Result<String, PersonnelServiceError> {
    let extension = upload.validate(max_bytes)?;
    attachments
        .store(&AttachmentUpload::storage_key(&extension), &upload.bytes)
        .await
}

/// Best-effort removal; a leftover file is logged, never surfaced.
async fn discard<A: AttachmentStore>(attachments: &A, path: Option<&str>) {
    let Some(path) = path else {
        return;
    };
    if let Err(e) = attachments.delete(path).await {
        warn!(path, error = ?e, "failed to delete attachment");
    }
}
