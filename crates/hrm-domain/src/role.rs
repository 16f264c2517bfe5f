//! Roles and the authoritative role → capability table.

use serde::{Deserialize, Serialize};

/// Something an identity is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// See every employee, contract and labor request.
    ViewAllEmployees,
    /// See the linked employee plus its active direct reports.
    ViewDirectReports,
    /// Create, edit, re-parent and deactivate employees.
    ManageEmployees,
    /// Create, edit, renew, toggle and delete contracts.
    ManageContracts,
    /// First approval stage of a labor request.
    ApproveRequests,
    /// Second (final) approval stage of a labor request.
    ValidateRequests,
    /// File labor requests on behalf of other employees.
    FileRequestsForOthers,
    /// Record, edit and deactivate disciplinary sanctions.
    ManageSanctions,
}

/// Coarse role carried by every identity.
///
/// Stored as a numeric role id; ids other than HR and manager are
/// ordinary staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Hr,
    Manager,
    Staff,
}

const HR_CAPABILITIES: &[Capability] = &[
    Capability::ViewAllEmployees,
    Capability::ManageEmployees,
    Capability::ManageContracts,
    Capability::ValidateRequests,
    Capability::FileRequestsForOthers,
    Capability::ManageSanctions,
];

const MANAGER_CAPABILITIES: &[Capability] =
    &[Capability::ViewDirectReports, Capability::ApproveRequests];

const STAFF_CAPABILITIES: &[Capability] = &[];

impl Role {
    pub const HR_ID: u8 = 1;
    pub const MANAGER_ID: u8 = 2;

    pub fn from_id(role_id: u8) -> Self {
        match role_id {
            Self::HR_ID => Self::Hr,
            Self::MANAGER_ID => Self::Manager,
            _ => Self::Staff,
        }
    }

    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            Self::Hr => HR_CAPABILITIES,
            Self::Manager => MANAGER_CAPABILITIES,
            Self::Staff => STAFF_CAPABILITIES,
        }
    }

    pub fn can(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}
