use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hrm_auth_types::identity::IdentityHeaders;
use hrm_domain::id::{EmployeeId, IdentityId};
use hrm_domain::pagination::Page;

use crate::domain::types::{Employee, EmployeeFilter, EmployeeProfile};
use crate::error::PersonnelServiceError;
use crate::handlers::{JsonBody, page_request, search_term};
use crate::state::AppState;
use crate::usecase::employee::{
    CreateEmployeeInput, CreateEmployeeUseCase, DeactivateEmployeeUseCase, GetEmployeeUseCase,
    ListEmployeesUseCase, ListPossibleManagersUseCase, ListSubordinatesUseCase, SetManagerUseCase,
    UpdateEmployeeInput, UpdateEmployeeUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct EmployeeResponse {
    pub id: EmployeeId,
    pub identity_id: Option<IdentityId>,
    pub manager_id: Option<EmployeeId>,
    pub first_name: String,
    pub last_name: String,
    pub identification_number: String,
    pub birth_date: Option<NaiveDate>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub department_id: Option<i32>,
    pub position_id: Option<i32>,
    pub active: bool,
    #[serde(serialize_with = "hrm_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "hrm_core::serde::opt_to_rfc3339_ms")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Employee> for EmployeeResponse {
    fn from(e: Employee) -> Self {
        let p = e.profile;
        Self {
            id: e.id,
            identity_id: e.identity_id,
            manager_id: e.manager_id,
            first_name: p.first_name,
            last_name: p.last_name,
            identification_number: p.identification_number,
            birth_date: p.birth_date,
            phone: p.phone,
            address: p.address,
            gender: p.gender,
            department_id: p.department_id,
            position_id: p.position_id,
            active: e.active,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

/// Minimal row for manager pickers.
#[derive(Serialize)]
pub struct EmployeeSummary {
    pub id: EmployeeId,
    pub full_name: String,
}

impl From<Employee> for EmployeeSummary {
    fn from(e: Employee) -> Self {
        Self {
            id: e.id,
            full_name: e.profile.full_name(),
        }
    }
}

// ── Request types ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct EmployeeListQuery {
    pub per_page: Option<u32>,
    pub page: Option<u32>,
    pub search: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
}

/// Profile fields shared by create and update bodies. Blank required fields
/// are reported by validation rather than by the JSON extractor.
#[derive(Deserialize)]
pub struct EmployeeFields {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub identification_number: String,
    pub birth_date: Option<NaiveDate>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub department_id: Option<i32>,
    pub position_id: Option<i32>,
}

impl From<EmployeeFields> for EmployeeProfile {
    fn from(f: EmployeeFields) -> Self {
        Self {
            first_name: f.first_name,
            last_name: f.last_name,
            identification_number: f.identification_number,
            birth_date: f.birth_date,
            phone: f.phone,
            address: f.address,
            gender: f.gender,
            department_id: f.department_id,
            position_id: f.position_id,
        }
    }
}

#[derive(Deserialize)]
pub struct CreateEmployeeRequest {
    #[serde(flatten)]
    pub fields: EmployeeFields,
    pub manager_id: Option<Uuid>,
    #[serde(default)]
    pub username: String,
    pub display_name: Option<String>,
    pub role_id: u8,
}

#[derive(Deserialize)]
pub struct UpdateEmployeeRequest {
    #[serde(flatten)]
    pub fields: EmployeeFields,
    pub role_id: Option<u8>,
}

#[derive(Deserialize)]
pub struct SetManagerRequest {
    pub manager_id: Option<Uuid>,
}

#[derive(Deserialize, Default)]
pub struct PossibleManagersQuery {
    pub exclude: Option<Uuid>,
}

// ── GET /employees ───────────────────────────────────────────────────────────

pub async fn list_employees(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<EmployeeListQuery>,
) -> Result<Json<Page<EmployeeResponse>>, PersonnelServiceError> {
    let uc = ListEmployeesUseCase {
        repo: state.employee_repo(),
    };
    let filter = EmployeeFilter {
        search: search_term(query.search),
        include_inactive: query.include_inactive,
    };
    let page = uc
        .execute(
            &identity.actor(),
            filter,
            page_request(query.page, query.per_page),
        )
        .await?;
    Ok(Json(page.map(EmployeeResponse::from)))
}

// ── POST /employees ──────────────────────────────────────────────────────────

pub async fn create_employee(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateEmployeeRequest>,
) -> Result<(StatusCode, Json<EmployeeResponse>), PersonnelServiceError> {
    let uc = CreateEmployeeUseCase {
        repo: state.employee_repo(),
    };
    let employee = uc
        .execute(
            &identity.actor(),
            CreateEmployeeInput {
                profile: body.fields.into(),
                manager_id: body.manager_id.map(EmployeeId),
                username: body.username,
                display_name: body.display_name,
                role_id: body.role_id,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(employee.into())))
}

// ── GET /employees/{id} ──────────────────────────────────────────────────────

pub async fn get_employee(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EmployeeResponse>, PersonnelServiceError> {
    let uc = GetEmployeeUseCase {
        repo: state.employee_repo(),
    };
    let employee = uc.execute(&identity.actor(), EmployeeId(id)).await?;
    Ok(Json(employee.into()))
}

// ── PUT /employees/{id} ──────────────────────────────────────────────────────

pub async fn update_employee(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(body): JsonBody<UpdateEmployeeRequest>,
) -> Result<Json<EmployeeResponse>, PersonnelServiceError> {
    let uc = UpdateEmployeeUseCase {
        repo: state.employee_repo(),
    };
    let employee = uc
        .execute(
            &identity.actor(),
            EmployeeId(id),
            UpdateEmployeeInput {
                profile: body.fields.into(),
                role_id: body.role_id,
            },
        )
        .await?;
    Ok(Json(employee.into()))
}

// ── PUT /employees/{id}/manager ──────────────────────────────────────────────

pub async fn set_manager(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(body): JsonBody<SetManagerRequest>,
) -> Result<Json<EmployeeResponse>, PersonnelServiceError> {
    let uc = SetManagerUseCase {
        repo: state.employee_repo(),
    };
    let employee = uc
        .execute(
            &identity.actor(),
            EmployeeId(id),
            body.manager_id.map(EmployeeId),
        )
        .await?;
    Ok(Json(employee.into()))
}

// ── PUT /employees/{id}/deactivate ───────────────────────────────────────────

pub async fn deactivate_employee(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, PersonnelServiceError> {
    let uc = DeactivateEmployeeUseCase {
        repo: state.employee_repo(),
    };
    uc.execute(&identity.actor(), EmployeeId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /employees/{id}/subordinates ─────────────────────────────────────────

pub async fn list_subordinates(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<EmployeeResponse>>, PersonnelServiceError> {
    let uc = ListSubordinatesUseCase {
        repo: state.employee_repo(),
    };
    let reports = uc.execute(&identity.actor(), EmployeeId(id)).await?;
    Ok(Json(reports.into_iter().map(EmployeeResponse::from).collect()))
}

// ── GET /possible-managers ───────────────────────────────────────────────────

pub async fn list_possible_managers(
    _identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<PossibleManagersQuery>,
) -> Result<Json<Vec<EmployeeSummary>>, PersonnelServiceError> {
    let uc = ListPossibleManagersUseCase {
        repo: state.employee_repo(),
    };
    let managers = uc.execute(query.exclude.map(EmployeeId)).await?;
    Ok(Json(managers.into_iter().map(EmployeeSummary::from).collect()))
}
