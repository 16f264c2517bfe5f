use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};

use hrm_core::health::{check_database, healthz};
use hrm_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    contract::{
        contract_statistics, create_contract, deactivate_contract, delete_contract,
        download_attachment, get_contract, list_contracts, renew_contract, replace_attachment,
        set_contract_status, update_contract,
    },
    employee::{
        create_employee, deactivate_employee, get_employee, list_employees,
        list_possible_managers, list_subordinates, set_manager, update_employee,
    },
    labor_request::{
        approve_labor_request, create_labor_request, deactivate_labor_request,
        get_labor_request, list_labor_requests, update_labor_request, validate_labor_request,
    },
    sanction::{
        create_sanction, deactivate_sanction, get_sanction, list_sanctions, update_sanction,
    },
};
use crate::state::AppState;

/// Room for multipart boundaries and the text parts around an attachment.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

async fn readyz(State(state): State<AppState>) -> StatusCode {
    check_database(&state.db).await
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.attachment_max_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Employees
        .route("/employees", get(list_employees))
        .route("/employees", post(create_employee))
        .route("/employees/{id}", get(get_employee))
        .route("/employees/{id}", put(update_employee))
        .route("/employees/{id}/manager", put(set_manager))
        .route("/employees/{id}/deactivate", put(deactivate_employee))
        .route("/employees/{id}/subordinates", get(list_subordinates))
        .route("/possible-managers", get(list_possible_managers))
        // Labor requests
        .route("/labor-requests", get(list_labor_requests))
        .route("/labor-requests", post(create_labor_request))
        .route("/labor-requests/{id}", get(get_labor_request))
        .route("/labor-requests/{id}", put(update_labor_request))
        .route("/labor-requests/{id}/approve", put(approve_labor_request))
        .route("/labor-requests/{id}/validate", put(validate_labor_request))
        .route("/labor-requests/{id}/deactivate", put(deactivate_labor_request))
        // Contracts
        .route("/contracts", get(list_contracts))
        .route("/contracts", post(create_contract))
        .route("/contracts/statistics", get(contract_statistics))
        .route("/contracts/{id}", get(get_contract))
        .route("/contracts/{id}", put(update_contract))
        .route("/contracts/{id}", delete(delete_contract))
        .route("/contracts/{id}/status", put(set_contract_status))
        .route("/contracts/{id}/deactivate", put(deactivate_contract))
        .route("/contracts/{id}/renew", post(renew_contract))
        .route("/contracts/{id}/attachment", put(replace_attachment))
        .route("/contracts/{id}/download", get(download_attachment))
        // Sanctions
        .route("/sanctions", get(list_sanctions))
        .route("/sanctions", post(create_sanction))
        .route("/sanctions/{id}", get(get_sanction))
        .route("/sanctions/{id}", put(update_sanction))
        .route("/sanctions/{id}/deactivate", put(deactivate_sanction))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(propagate_request_id_layer())
        .layer(trace_layer())
        .layer(request_id_layer())
        .with_state(state)
}
