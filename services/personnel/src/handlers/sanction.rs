use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hrm_auth_types::identity::IdentityHeaders;
use hrm_domain::id::{EmployeeId, IdentityId, SanctionId};
use hrm_domain::pagination::Page;

use crate::domain::types::{Sanction, SanctionDetails, SanctionFilter};
use crate::error::PersonnelServiceError;
use crate::handlers::{JsonBody, page_request, search_term};
use crate::state::AppState;
use crate::usecase::sanction::{
    CreateSanctionUseCase, DeactivateSanctionUseCase, GetSanctionUseCase, ListSanctionsUseCase,
    UpdateSanctionUseCase,
};

#[derive(Serialize)]
pub struct SanctionResponse {
    pub id: SanctionId,
    pub employee_id: EmployeeId,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_by: IdentityId,
    #[serde(serialize_with = "hrm_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    pub updated_by: Option<IdentityId>,
    #[serde(serialize_with = "hrm_core::serde::opt_to_rfc3339_ms")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Sanction> for SanctionResponse {
    fn from(s: Sanction) -> Self {
        Self {
            id: s.id,
            employee_id: s.details.employee_id,
            name: s.details.name,
            description: s.details.description,
            active: s.active,
            created_by: s.created_by,
            created_at: s.created_at,
            updated_by: s.updated_by,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct SanctionListQuery {
    pub per_page: Option<u32>,
    pub page: Option<u32>,
    pub employee_id: Option<Uuid>,
    pub search: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Deserialize)]
pub struct SanctionRequest {
    pub employee_id: Uuid,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    /// Honoured on update only.
    pub active: Option<bool>,
}

impl SanctionRequest {
    fn details(&self) -> SanctionDetails {
        SanctionDetails {
            employee_id: EmployeeId(self.employee_id),
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

// ── GET /sanctions ───────────────────────────────────────────────────────────

pub async fn list_sanctions(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<SanctionListQuery>,
) -> Result<Json<Page<SanctionResponse>>, PersonnelServiceError> {
    let uc = ListSanctionsUseCase {
        employees: state.employee_repo(),
        sanctions: state.sanction_repo(),
    };
    let filter = SanctionFilter {
        include_inactive: query.include_inactive,
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
    Ok(Json(page.map(SanctionResponse::from)))
}

// ── POST /sanctions ──────────────────────────────────────────────────────────

pub async fn create_sanction(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SanctionRequest>,
) -> Result<(StatusCode, Json<SanctionResponse>), PersonnelServiceError> {
    let uc = CreateSanctionUseCase {
        employees: state.employee_repo(),
        sanctions: state.sanction_repo(),
    };
    let sanction = uc.execute(&identity.actor(), body.details()).await?;
    Ok((StatusCode::CREATED, Json(sanction.into())))
}

// ── GET /sanctions/{id} ──────────────────────────────────────────────────────

pub async fn get_sanction(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SanctionResponse>, PersonnelServiceError> {
    let uc = GetSanctionUseCase {
        employees: state.employee_repo(),
        sanctions: state.sanction_repo(),
    };
    let sanction = uc.execute(&identity.actor(), SanctionId(id)).await?;
    Ok(Json(sanction.into()))
}

// ── PUT /sanctions/{id} ──────────────────────────────────────────────────────

pub async fn update_sanction(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(body): JsonBody<SanctionRequest>,
) -> Result<Json<SanctionResponse>, PersonnelServiceError> {
    let uc = UpdateSanctionUseCase {
        employees: state.employee_repo(),
        sanctions: state.sanction_repo(),
    };
    let sanction = uc
        .execute(&identity.actor(), SanctionId(id), body.details(), body.active)
        .await?;
    Ok(Json(sanction.into()))
}

// ── PUT /sanctions/{id}/deactivate ───────────────────────────────────────────

pub async fn deactivate_sanction(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SanctionResponse>, PersonnelServiceError> {
    let uc = DeactivateSanctionUseCase {
        sanctions: state.sanction_repo(),
    };
    let sanction = uc.execute(&identity.actor(), SanctionId(id)).await?;
    Ok(Json(sanction.into()))
}
