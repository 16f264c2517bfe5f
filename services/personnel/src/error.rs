use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Personnel service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum PersonnelServiceError {
    #[error("employee not found")]
    EmployeeNotFound,
    #[error("labor request not found")]
    LaborRequestNotFound,
    #[error("contract not found")]
    ContractNotFound,
    #[error("attachment not found")]
    AttachmentNotFound,
    #[error("sanction not found")]
    SanctionNotFound,
    #[error("forbidden")]
    Forbidden,
    #[error("invalid field: {0}")]
    InvalidField(&'static str),
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("invalid body: {0}")]
    InvalidBody(String),
    #[error("invalid date range")]
    InvalidDateRange,
    #[error("employee cannot be its own manager")]
    SelfManager,
    #[error("manager assignment would create a cycle")]
    ManagerCycle,
    #[error("{0} already in use")]
    AlreadyInUse(&'static str),
    #[error("labor request already approved")]
    AlreadyApproved,
    #[error("labor request not yet approved")]
    NotYetApproved,
    #[error("labor request already validated")]
    AlreadyValidated,
    #[error("labor request inactive")]
    RequestInactive,
    #[error("employee has active subordinates")]
    HasActiveSubordinates,
    #[error("contract inactive")]
    ContractInactive,
    #[error("storage error")]
    Storage(anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl PersonnelServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmployeeNotFound => "EMPLOYEE_NOT_FOUND",
            Self::LaborRequestNotFound => "LABOR_REQUEST_NOT_FOUND",
            Self::ContractNotFound => "CONTRACT_NOT_FOUND",
            Self::AttachmentNotFound => "ATTACHMENT_NOT_FOUND",
            Self::SanctionNotFound => "SANCTION_NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::InvalidField(_) => "INVALID_FIELD",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::InvalidBody(_) => "INVALID_BODY",
            Self::InvalidDateRange => "INVALID_DATE_RANGE",
            Self::SelfManager => "SELF_MANAGER",
            Self::ManagerCycle => "MANAGER_CYCLE",
            Self::AlreadyInUse(_) => "ALREADY_IN_USE",
            Self::AlreadyApproved => "ALREADY_APPROVED",
            Self::NotYetApproved => "NOT_YET_APPROVED",
            Self::AlreadyValidated => "ALREADY_VALIDATED",
            Self::RequestInactive => "REQUEST_INACTIVE",
            Self::HasActiveSubordinates => "HAS_ACTIVE_SUBORDINATES",
            Self::ContractInactive => "CONTRACT_INACTIVE",
            Self::Storage(_) => "STORAGE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::EmployeeNotFound
            | Self::LaborRequestNotFound
            | Self::ContractNotFound
            | Self::AttachmentNotFound
            | Self::SanctionNotFound => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::InvalidField(_)
            | Self::MissingField(_)
            | Self::InvalidBody(_)
            | Self::InvalidDateRange
            | Self::SelfManager
            | Self::ManagerCycle
            | Self::AlreadyInUse(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::AlreadyApproved
            | Self::NotYetApproved
            | Self::AlreadyValidated
            | Self::RequestInactive
            | Self::HasActiveSubordinates
            | Self::ContractInactive => StatusCode::BAD_REQUEST,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PersonnelServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Self::Storage(ref e) | Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = self.kind(), "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

impl From<JsonRejection> for PersonnelServiceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}
