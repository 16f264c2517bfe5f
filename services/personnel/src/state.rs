use sea_orm::DatabaseConnection;

use crate::infra::db::{
    DbContractRepository, DbEmployeeRepository, DbLaborRequestRepository, DbSanctionRepository,
};
use crate::infra::storage::LocalAttachmentStore;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub attachments: LocalAttachmentStore,
    pub attachment_max_bytes: usize,
}

impl AppState {
    pub fn employee_repo(&self) -> DbEmployeeRepository {
        DbEmployeeRepository {
            db: self.db.clone(),
        }
    }

    pub fn labor_request_repo(&self) -> DbLaborRequestRepository {
        DbLaborRequestRepository {
            db: self.db.clone(),
        }
    }

    pub fn contract_repo(&self) -> DbContractRepository {
        DbContractRepository {
            db: self.db.clone(),
        }
    }

    pub fn sanction_repo(&self) -> DbSanctionRepository {
        DbSanctionRepository {
            db: self.db.clone(),
        }
    }

    pub fn attachment_store(&self) -> LocalAttachmentStore {
        self.attachments.clone()
    }
}
