use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hrm_auth_types::identity::IdentityHeaders;
use hrm_domain::id::{EmployeeId, IdentityId, LaborRequestId};
use hrm_domain::pagination::Page;

use crate::domain::types::{
    ApprovalStage, LaborRequest, LaborRequestDetails, LaborRequestFilter, LaborRequestKind,
    non_blank,
};
use crate::error::PersonnelServiceError;
use crate::handlers::{JsonBody, page_request, search_term};
use crate::state::AppState;
use crate::usecase::labor_request::{
    ApproveLaborRequestUseCase, CreateLaborRequestInput, CreateLaborRequestUseCase,
    DeactivateLaborRequestUseCase, GetLaborRequestUseCase, ListLaborRequestsUseCase,
    UpdateLaborRequestUseCase, ValidateLaborRequestUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct LaborRequestResponse {
    pub id: LaborRequestId,
    pub employee_id: EmployeeId,
    pub kind: LaborRequestKind,
    pub stage: ApprovalStage,
    pub motive: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub days_taken: Option<i32>,
    pub leave_type: Option<String>,
    pub document_url: Option<String>,
    pub notes: Option<String>,
    pub approved_by: Option<IdentityId>,
    #[serde(serialize_with = "hrm_core::serde::opt_to_rfc3339_ms")]
    pub approved_at: Option<DateTime<Utc>>,
    pub validated_by: Option<IdentityId>,
    #[serde(serialize_with = "hrm_core::serde::opt_to_rfc3339_ms")]
    pub validated_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_by: IdentityId,
    #[serde(serialize_with = "hrm_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "hrm_core::serde::opt_to_rfc3339_ms")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<LaborRequest> for LaborRequestResponse {
    fn from(r: LaborRequest) -> Self {
        let stage = r.stage();
        let d = r.details;
        Self {
            id: r.id,
            employee_id: r.employee_id,
            kind: r.kind,
            stage,
            motive: d.motive,
            start_date: d.start_date,
            end_date: d.end_date,
            days_taken: d.days_taken,
            leave_type: d.leave_type,
            document_url: d.document_url,
            notes: d.notes,
            approved_by: r.approved_by,
            approved_at: r.approved_at,
            validated_by: r.validated_by,
            validated_at: r.validated_at,
            active: r.active,
            created_by: r.created_by,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

// ── Request types ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct LaborRequestListQuery {
    pub per_page: Option<u32>,
    pub page: Option<u32>,
    pub kind: Option<String>,
    pub active: Option<bool>,
    pub employee_id: Option<Uuid>,
    pub search: Option<String>,
}

#[derive(Deserialize)]
pub struct LaborRequestFields {
    #[serde(default)]
    pub motive: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub days_taken: Option<i32>,
    pub leave_type: Option<String>,
    pub document_url: Option<String>,
    pub notes: Option<String>,
}

impl LaborRequestFields {
    fn into_details(self) -> Result<LaborRequestDetails, PersonnelServiceError> {
        let start_date = self
            .start_date
            .ok_or(PersonnelServiceError::MissingField("start_date"))?;
        Ok(LaborRequestDetails {
            motive: self.motive.trim().to_owned(),
            start_date,
            end_date: self.end_date,
            days_taken: self.days_taken,
            leave_type: non_blank(self.leave_type),
            document_url: non_blank(self.document_url),
            notes: non_blank(self.notes),
        })
    }
}

#[derive(Deserialize)]
pub struct CreateLaborRequestRequest {
    pub employee_id: Option<Uuid>,
    #[serde(default)]
    pub kind: String,
    #[serde(flatten)]
    pub fields: LaborRequestFields,
}

// ── GET /labor-requests ──────────────────────────────────────────────────────

pub async fn list_labor_requests(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<LaborRequestListQuery>,
) -> Result<Json<Page<LaborRequestResponse>>, PersonnelServiceError> {
    let uc = ListLaborRequestsUseCase {
        employees: state.employee_repo(),
        requests: state.labor_request_repo(),
    };
    let filter = LaborRequestFilter {
        kind: query.kind.as_deref().and_then(LaborRequestKind::parse),
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
    Ok(Json(page.map(LaborRequestResponse::from)))
}

// ── POST /labor-requests ─────────────────────────────────────────────────────

pub async fn create_labor_request(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateLaborRequestRequest>,
) -> Result<(StatusCode, Json<LaborRequestResponse>), PersonnelServiceError> {
    let uc = CreateLaborRequestUseCase {
        employees: state.employee_repo(),
        requests: state.labor_request_repo(),
    };
    let request = uc
        .execute(
            &identity.actor(),
            CreateLaborRequestInput {
                employee_id: body.employee_id.map(EmployeeId),
                kind: body.kind,
                details: body.fields.into_details()?,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(request.into())))
}

// ── GET /labor-requests/{id} ─────────────────────────────────────────────────

pub async fn get_labor_request(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LaborRequestResponse>, PersonnelServiceError> {
    let uc = GetLaborRequestUseCase {
        employees: state.employee_repo(),
        requests: state.labor_request_repo(),
    };
    let request = uc.execute(&identity.actor(), LaborRequestId(id)).await?;
    Ok(Json(request.into()))
}

// ── PUT /labor-requests/{id} ─────────────────────────────────────────────────

pub async fn update_labor_request(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(body): JsonBody<LaborRequestFields>,
) -> Result<Json<LaborRequestResponse>, PersonnelServiceError> {
    let uc = UpdateLaborRequestUseCase {
        employees: state.employee_repo(),
        requests: state.labor_request_repo(),
    };
    let request = uc
        .execute(&identity.actor(), LaborRequestId(id), body.into_details()?)
        .await?;
    Ok(Json(request.into()))
}

// ── PUT /labor-requests/{id}/approve ─────────────────────────────────────────

pub async fn approve_labor_request(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LaborRequestResponse>, PersonnelServiceError> {
    let uc = ApproveLaborRequestUseCase {
        requests: state.labor_request_repo(),
    };
    let request = uc.execute(&identity.actor(), LaborRequestId(id)).await?;
    Ok(Json(request.into()))
}

// ── PUT /labor-requests/{id}/validate ────────────────────────────────────────

pub async fn validate_labor_request(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LaborRequestResponse>, PersonnelServiceError> {
    let uc = ValidateLaborRequestUseCase {
        requests: state.labor_request_repo(),
    };
    let request = uc.execute(&identity.actor(), LaborRequestId(id)).await?;
    Ok(Json(request.into()))
}

// ── PUT /labor-requests/{id}/deactivate ──────────────────────────────────────

pub async fn deactivate_labor_request(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LaborRequestResponse>, PersonnelServiceError> {
    let uc = DeactivateLaborRequestUseCase {
        employees: state.employee_repo(),
        requests: state.labor_request_repo(),
    };
    let request = uc.execute(&identity.actor(), LaborRequestId(id)).await?;
    Ok(Json(request.into()))
}
