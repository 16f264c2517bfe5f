use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use hrm_domain::id::{ContractId, EmployeeId, IdentityId, LaborRequestId, SanctionId};

use crate::error::PersonnelServiceError;

// ── Identity / Employee ──────────────────────────────────────────────────────

/// Login identity created alongside an employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: IdentityId,
    pub username: String,
    pub display_name: String,
    pub role_id: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Descriptive employee fields. Department and position ids belong to the
/// catalog services and are opaque here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmployeeProfile {
    pub first_name: String,
    pub last_name: String,
    pub identification_number: String,
    pub birth_date: Option<NaiveDate>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub department_id: Option<i32>,
    pub position_id: Option<i32>,
}

impl EmployeeProfile {
    /// Trim text fields, turning blank optionals into `None`.
    pub fn normalized(self) -> Self {
        Self {
            first_name: self.first_name.trim().to_owned(),
            last_name: self.last_name.trim().to_owned(),
            identification_number: self.identification_number.trim().to_owned(),
            phone: non_blank(self.phone),
            address: non_blank(self.address),
            gender: non_blank(self.gender),
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), PersonnelServiceError> {
        require("first_name", &self.first_name)?;
        require("last_name", &self.last_name)?;
        require("identification_number", &self.identification_number)?;
        Ok(())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    pub id: EmployeeId,
    pub identity_id: Option<IdentityId>,
    pub manager_id: Option<EmployeeId>,
    pub profile: EmployeeProfile,
    pub active: bool,
    pub created_by: IdentityId,
    pub created_at: DateTime<Utc>,
    pub updated_by: Option<IdentityId>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    /// Case-insensitive match on first name, last name or identification number.
    pub search: Option<String>,
    pub include_inactive: bool,
}

// ── Labor requests ───────────────────────────────────────────────────────────

/// Labor request tag. The set is open; the known kinds are constants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaborRequestKind(String);

impl LaborRequestKind {
    pub const PERMIT: &'static str = "permit";
    pub const LEAVE: &'static str = "leave";
    pub const VACATION: &'static str = "vacation";
    pub const SUSPENSION: &'static str = "suspension";

    /// Lowercased, trimmed tag. `None` when blank.
    pub fn parse(raw: &str) -> Option<Self> {
        let tag = raw.trim().to_lowercase();
        (!tag.is_empty()).then_some(Self(tag))
    }

    /// Wrap a tag read back from storage, where it was already normalized.
    pub fn from_stored(tag: String) -> Self {
        Self(tag)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LaborRequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position in the two-stage approval workflow. Orthogonal to `active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApprovalStage {
    Pending,
    ApprovedByManager,
    ValidatedByHr,
}

/// Editable part of a labor request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaborRequestDetails {
    pub motive: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub days_taken: Option<i32>,
    pub leave_type: Option<String>,
    pub document_url: Option<String>,
    pub notes: Option<String>,
}

impl LaborRequestDetails {
    pub fn validate(&self) -> Result<(), PersonnelServiceError> {
        require("motive", &self.motive)?;
        ensure_ordered(self.start_date, self.end_date)?;
        if self.days_taken.is_some_and(|days| days < 0) {
            return Err(PersonnelServiceError::InvalidField("days_taken"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaborRequest {
    pub id: LaborRequestId,
    pub employee_id: EmployeeId,
    pub kind: LaborRequestKind,
    pub details: LaborRequestDetails,
    pub approved_by: Option<IdentityId>,
    pub approved_at: Option<DateTime<Utc>>,
    pub validated_by: Option<IdentityId>,
    pub validated_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_by: IdentityId,
    pub created_at: DateTime<Utc>,
    pub updated_by: Option<IdentityId>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl LaborRequest {
    pub fn stage(&self) -> ApprovalStage {
        match (self.approved_by, self.validated_by) {
            (_, Some(_)) => ApprovalStage::ValidatedByHr,
            (Some(_), None) => ApprovalStage::ApprovedByManager,
            (None, None) => ApprovalStage::Pending,
        }
    }

    /// Why an approval would be refused in the current state, if at all.
    pub fn approve_conflict(&self) -> Option<PersonnelServiceError> {
        if self.approved_by.is_some() {
            Some(PersonnelServiceError::AlreadyApproved)
        } else if !self.active {
            Some(PersonnelServiceError::RequestInactive)
        } else {
            None
        }
    }

    /// Why a validation would be refused in the current state, if at all.
    pub fn validate_conflict(&self) -> Option<PersonnelServiceError> {
        if self.validated_by.is_some() {
            Some(PersonnelServiceError::AlreadyValidated)
        } else if self.approved_by.is_none() {
            Some(PersonnelServiceError::NotYetApproved)
        } else if !self.active {
            Some(PersonnelServiceError::RequestInactive)
        } else {
            None
        }
    }

    /// Details are editable only while pending and active.
    pub fn edit_conflict(&self) -> Option<PersonnelServiceError> {
        match self.stage() {
            ApprovalStage::ValidatedByHr => Some(PersonnelServiceError::AlreadyValidated),
            ApprovalStage::ApprovedByManager => Some(PersonnelServiceError::AlreadyApproved),
            ApprovalStage::Pending if !self.active => Some(PersonnelServiceError::RequestInactive),
            ApprovalStage::Pending => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LaborRequestFilter {
    pub kind: Option<LaborRequestKind>,
    pub active: Option<bool>,
    pub employee_id: Option<EmployeeId>,
    /// Case-insensitive match on the motive.
    pub search: Option<String>,
}

// ── Contracts ────────────────────────────────────────────────────────────────

/// Contract fields supplied on create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractTerms {
    pub contract_type: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub template: Option<String>,
}

impl ContractTerms {
    pub fn validate(&self) -> Result<(), PersonnelServiceError> {
        require("contract_type", &self.contract_type)?;
        ensure_ordered(self.start_date, self.end_date)
    }
}

/// Terms of a renewal. Type falls back to the renewed contract's type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewalTerms {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub contract_type: Option<String>,
}

impl RenewalTerms {
    pub fn validate(&self) -> Result<(), PersonnelServiceError> {
        if let Some(contract_type) = &self.contract_type {
            require("contract_type", contract_type)?;
        }
        match self.end_date {
            Some(end) if end <= self.start_date => Err(PersonnelServiceError::InvalidDateRange),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    pub id: ContractId,
    pub employee_id: EmployeeId,
    pub terms: ContractTerms,
    /// Storage path of the signed document, relative to the attachment root.
    pub attachment: Option<String>,
    pub active: bool,
    pub created_by: IdentityId,
    pub created_at: DateTime<Utc>,
    pub updated_by: Option<IdentityId>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Contract {
    /// The active successor created when this contract is renewed.
    pub fn renewal(&self, terms: &RenewalTerms, actor: IdentityId, now: DateTime<Utc>) -> Self {
        Self {
            id: ContractId::new(),
            employee_id: self.employee_id,
            terms: ContractTerms {
                contract_type: terms
                    .contract_type
                    .clone()
                    .unwrap_or_else(|| self.terms.contract_type.clone()),
                start_date: terms.start_date,
                end_date: terms.end_date,
                template: self.terms.template.clone(),
            },
            attachment: None,
            active: true,
            created_by: actor,
            created_at: now,
            updated_by: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContractFilter {
    pub active: Option<bool>,
    pub employee_id: Option<EmployeeId>,
    /// Case-insensitive match on contract type or template.
    pub search: Option<String>,
}

/// Counts over the contracts visible to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ContractStats {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    /// Active, ending between today and today + [`EXPIRY_WINDOW_DAYS`].
    pub expiring_soon: u64,
    /// Active, ended before today.
    pub expired: u64,
}

pub const EXPIRY_WINDOW_DAYS: i64 = 30;

// ── Sanctions ────────────────────────────────────────────────────────────────

pub const SANCTION_NAME_MAX_CHARS: usize = 100;

/// Editable part of a sanction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanctionDetails {
    pub employee_id: EmployeeId,
    pub name: String,
    pub description: Option<String>,
}

impl SanctionDetails {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_owned(),
            description: non_blank(self.description),
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), PersonnelServiceError> {
        require("name", &self.name)?;
        if self.name.chars().count() > SANCTION_NAME_MAX_CHARS {
            return Err(PersonnelServiceError::InvalidField("name"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanction {
    pub id: SanctionId,
    pub details: SanctionDetails,
    pub active: bool,
    pub created_by: IdentityId,
    pub created_at: DateTime<Utc>,
    pub updated_by: Option<IdentityId>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Sanction {
    pub fn employee_id(&self) -> EmployeeId {
        self.details.employee_id
    }
}

#[derive(Debug, Clone, Default)]
pub struct SanctionFilter {
    pub include_inactive: bool,
    pub employee_id: Option<EmployeeId>,
    /// Case-insensitive match on name or description.
    pub search: Option<String>,
}

// ── Attachments ──────────────────────────────────────────────────────────────

pub const ATTACHMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];

/// Uploaded contract document as received from the client.
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    pub file_name: String,
    pub bytes: Bytes,
}

impl AttachmentUpload {
    /// Check extension and size; returns the lowercased extension.
    pub fn validate(&self, max_bytes: usize) -> Result<String, PersonnelServiceError> {
        let extension = std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if !ATTACHMENT_EXTENSIONS.contains(&extension.as_str()) {
            return Err(PersonnelServiceError::InvalidField("attachment"));
        }
        if self.bytes.is_empty() || self.bytes.len() > max_bytes {
            return Err(PersonnelServiceError::InvalidField("attachment"));
        }
        Ok(extension)
    }

    /// Storage key for a fresh upload: `contracts/<uuid>.<ext>`.
    pub fn storage_key(extension: &str) -> String {
        format!("contracts/{}.{extension}", uuid::Uuid::now_v7())
    }
}

/// MIME type served for a stored attachment path.
pub fn attachment_content_type(path: &str) -> &'static str {
    match path.rsplit('.').next().map(str::to_lowercase).as_deref() {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn require(field: &'static str, value: &str) -> Result<(), PersonnelServiceError> {
    if value.trim().is_empty() {
        return Err(PersonnelServiceError::MissingField(field));
    }
    Ok(())
}

fn ensure_ordered(start: NaiveDate, end: Option<NaiveDate>) -> Result<(), PersonnelServiceError> {
    match end {
        Some(end) if end < start => Err(PersonnelServiceError::InvalidDateRange),
        _ => Ok(()),
    }
}

pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
