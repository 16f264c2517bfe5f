use axum::{
    Json,
    extract::{
        Multipart, Path, Query, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use hrm_auth_types::identity::IdentityHeaders;
use hrm_domain::actor::Actor;
use hrm_domain::id::{ContractId, EmployeeId, IdentityId};
use hrm_domain::pagination::Page;
use hrm_domain::role::Capability;

use crate::domain::types::{
    AttachmentUpload, Contract, ContractFilter, ContractStats, ContractTerms, RenewalTerms,
    attachment_content_type, non_blank,
};
use crate::error::PersonnelServiceError;
use crate::handlers::{JsonBody, page_request, search_term};
use crate::state::AppState;
use crate::usecase::contract::{
    ContractStatisticsUseCase, CreateContractInput, CreateContractUseCase, DeleteContractUseCase,
    DownloadAttachmentUseCase, GetContractUseCase, ListContractsUseCase, RenewContractUseCase,
    ReplaceAttachmentUseCase, SetContractActiveUseCase, UpdateContractUseCase,
};
use crate::usecase::scope::require;

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ContractResponse {
    pub id: ContractId,
    pub employee_id: EmployeeId,
    pub contract_type: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub template: Option<String>,
    pub attachment: Option<String>,
    pub active: bool,
    pub created_by: IdentityId,
    #[serde(serialize_with = "hrm_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    pub updated_by: Option<IdentityId>,
    #[serde(serialize_with = "hrm_core::serde::opt_to_rfc3339_ms")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Contract> for ContractResponse {
    fn from(c: Contract) -> Self {
        Self {
            id: c.id,
            employee_id: c.employee_id,
            contract_type: c.terms.contract_type,
            start_date: c.terms.start_date,
            end_date: c.terms.end_date,
            template: c.terms.template,
            attachment: c.attachment,
            active: c.active,
            created_by: c.created_by,
            created_at: c.created_at,
            updated_by: c.updated_by,
            updated_at: c.updated_at,
        }
    }
}

// ── Request types ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ContractListQuery {
    pub per_page: Option<u32>,
    pub page: Option<u32>,
    pub active: Option<bool>,
    pub employee_id: Option<Uuid>,
    pub search: Option<String>,
}

#[derive(Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

#[derive(Deserialize)]
pub struct RenewContractRequest {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub contract_type: Option<String>,
}

/// Multipart body of contract create/update. Text parts are trimmed and
/// blanks dropped; the document comes in a `file` (or `attachment`) part.
#[derive(Default)]
struct ContractForm {
    employee_id: Option<String>,
    contract_type: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    template: Option<String>,
    attachment: Option<AttachmentUpload>,
}

fn malformed(e: MultipartError) -> PersonnelServiceError {
    debug!(error = %e, "malformed multipart body");
    PersonnelServiceError::InvalidField("multipart")
}

/// Contract writes are checked before the body is read, so a caller without
/// the capability gets 403 whatever it sent.
fn contract_manager(identity: &IdentityHeaders) -> Result<Actor, PersonnelServiceError> {
    let actor = identity.actor();
    require(&actor, Capability::ManageContracts)?;
    Ok(actor)
}

impl ContractForm {
    async fn read(
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<Self, PersonnelServiceError> {
        let mut multipart = multipart.map_err(|e| {
            debug!(error = %e, "request is not multipart");
            PersonnelServiceError::InvalidField("multipart")
        })?;
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = field.name().unwrap_or_default().to_owned();
            if name == "file" || name == "attachment" {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await.map_err(malformed)?;
                // Browsers send an empty part when no file was picked.
                if !(file_name.is_empty() && bytes.is_empty()) {
                    form.attachment = Some(AttachmentUpload { file_name, bytes });
                }
                continue;
            }
            let value = non_blank(Some(field.text().await.map_err(malformed)?));
            match name.as_str() {
                "employee_id" => form.employee_id = value,
                "contract_type" => form.contract_type = value,
                "start_date" => form.start_date = value,
                "end_date" => form.end_date = value,
                "template" => form.template = value,
                _ => {}
            }
        }
        Ok(form)
    }

    fn employee_id(&self) -> Result<EmployeeId, PersonnelServiceError> {
        self.employee_id
            .as_deref()
            .ok_or(PersonnelServiceError::MissingField("employee_id"))?
            .parse::<Uuid>()
            .map(EmployeeId)
            .map_err(|_| PersonnelServiceError::InvalidField("employee_id"))
    }

    fn terms(&mut self) -> Result<ContractTerms, PersonnelServiceError> {
        let start_date = parse_date("start_date", self.start_date.take())?
            .ok_or(PersonnelServiceError::MissingField("start_date"))?;
        Ok(ContractTerms {
            contract_type: self.contract_type.take().unwrap_or_default(),
            start_date,
            end_date: parse_date("end_date", self.end_date.take())?,
            template: self.template.take(),
        })
    }
}

fn parse_date(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<NaiveDate>, PersonnelServiceError> {
    value
        .map(|v| {
            v.parse::<NaiveDate>()
                .map_err(|_| PersonnelServiceError::InvalidField(field))
        })
        .transpose()
}

// ── GET /contracts ───────────────────────────────────────────────────────────

pub async fn list_contracts(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<ContractListQuery>,
) -> Result<Json<Page<ContractResponse>>, PersonnelServiceError> {
    let uc = ListContractsUseCase {
        employees: state.employee_repo(),
        contracts: state.contract_repo(),
    };
    let filter = ContractFilter {
        active: query.active,
        employee_id: query.employee_id.map(EmployeeId),
        search: search_term(query.search),
    };
    let page = uc
        .execute(
            &identity.actor(),
            filter,
            page_request(query.page, query.per_page),
        )
        .await?;
    Ok(Json(page.map(ContractResponse::from)))
}

// ── POST /contracts ──────────────────────────────────────────────────────────

pub async fn create_contract(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ContractResponse>), PersonnelServiceError> {
    let actor = contract_manager(&identity)?;
    let mut form = ContractForm::read(multipart).await?;
    let input = CreateContractInput {
        employee_id: form.employee_id()?,
        terms: form.terms()?,
        attachment: form.attachment.take(),
    };
    let uc = CreateContractUseCase {
        employees: state.employee_repo(),
        contracts: state.contract_repo(),
        attachments: state.attachment_store(),
        max_attachment_bytes: state.attachment_max_bytes,
    };
    let contract = uc.execute(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(contract.into())))
}

// ── GET /contracts/statistics ────────────────────────────────────────────────

pub async fn contract_statistics(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<ContractStats>, PersonnelServiceError> {
    let uc = ContractStatisticsUseCase {
        employees: state.employee_repo(),
        contracts: state.contract_repo(),
    };
    let stats = uc
        .execute(&identity.actor(), Utc::now().date_naive())
        .await?;
    Ok(Json(stats))
}

// ── GET /contracts/{id} ──────────────────────────────────────────────────────

pub async fn get_contract(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContractResponse>, PersonnelServiceError> {
    let uc = GetContractUseCase {
        employees: state.employee_repo(),
        contracts: state.contract_repo(),
    };
    let contract = uc.execute(&identity.actor(), ContractId(id)).await?;
    Ok(Json(contract.into()))
}

// ── PUT /contracts/{id} ──────────────────────────────────────────────────────

pub async fn update_contract(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ContractResponse>, PersonnelServiceError> {
    let actor = contract_manager(&identity)?;
    let mut form = ContractForm::read(multipart).await?;
    let terms = form.terms()?;
    let uc = UpdateContractUseCase {
        contracts: state.contract_repo(),
        attachments: state.attachment_store(),
        max_attachment_bytes: state.attachment_max_bytes,
    };
    let contract = uc
        .execute(&actor, ContractId(id), terms, form.attachment)
        .await?;
    Ok(Json(contract.into()))
}

// ── DELETE /contracts/{id} ───────────────────────────────────────────────────

pub async fn delete_contract(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, PersonnelServiceError> {
    let uc = DeleteContractUseCase {
        contracts: state.contract_repo(),
        attachments: state.attachment_store(),
    };
    uc.execute(&identity.actor(), ContractId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── PUT /contracts/{id}/status ───────────────────────────────────────────────

pub async fn set_contract_status(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<JsonBody<SetActiveRequest>, PersonnelServiceError>,
) -> Result<Json<ContractResponse>, PersonnelServiceError> {
    let actor = contract_manager(&identity)?;
    let JsonBody(body) = body?;
    let uc = SetContractActiveUseCase {
        contracts: state.contract_repo(),
    };
    let contract = uc.execute(&actor, ContractId(id), body.active).await?;
    Ok(Json(contract.into()))
}

// ── PUT /contracts/{id}/deactivate ───────────────────────────────────────────

pub async fn deactivate_contract(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContractResponse>, PersonnelServiceError> {
    let uc = SetContractActiveUseCase {
        contracts: state.contract_repo(),
    };
    let contract = uc.execute(&identity.actor(), ContractId(id), false).await?;
    Ok(Json(contract.into()))
}

// ── POST /contracts/{id}/renew ───────────────────────────────────────────────

pub async fn renew_contract(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<JsonBody<RenewContractRequest>, PersonnelServiceError>,
) -> Result<(StatusCode, Json<ContractResponse>), PersonnelServiceError> {
    let actor = contract_manager(&identity)?;
    let JsonBody(body) = body?;
    let uc = RenewContractUseCase {
        contracts: state.contract_repo(),
    };
    let terms = RenewalTerms {
        start_date: body.start_date,
        end_date: body.end_date,
        contract_type: non_blank(body.contract_type),
    };
    let successor = uc.execute(&actor, ContractId(id), terms).await?;
    Ok((StatusCode::CREATED, Json(successor.into())))
}

// ── PUT /contracts/{id}/attachment ───────────────────────────────────────────

pub async fn replace_attachment(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ContractResponse>, PersonnelServiceError> {
    let actor = contract_manager(&identity)?;
    let upload = ContractForm::read(multipart)
        .await?
        .attachment
        .ok_or(PersonnelServiceError::MissingField("attachment"))?;
    let uc = ReplaceAttachmentUseCase {
        contracts: state.contract_repo(),
        attachments: state.attachment_store(),
        max_attachment_bytes: state.attachment_max_bytes,
    };
    let contract = uc.execute(&actor, ContractId(id), upload).await?;
    Ok(Json(contract.into()))
}

// ── GET /contracts/{id}/download ─────────────────────────────────────────────

pub async fn download_attachment(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, PersonnelServiceError> {
    let uc = DownloadAttachmentUseCase {
        employees: state.employee_repo(),
        contracts: state.contract_repo(),
        attachments: state.attachment_store(),
    };
    let file = uc.execute(&identity.actor(), ContractId(id)).await?;
    let extension = file.path.rsplit('.').next().unwrap_or("bin");
    let disposition = format!("attachment; filename=\"contract-{id}.{extension}\"");
    Ok((
        [
            (header::CONTENT_TYPE, attachment_content_type(&file.path).to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    ))
}
