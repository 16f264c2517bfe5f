pub mod contract;
pub mod employee;
pub mod labor_request;
pub mod sanction;

use axum::extract::FromRequest;

use hrm_domain::pagination::PageRequest;

use crate::domain::types::non_blank;
use crate::error::PersonnelServiceError;

/// JSON request body. Rejections render as a `{kind, message}` error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(PersonnelServiceError))]
pub struct JsonBody<T>(pub T);

/// Build a page request from the `page` / `per-page` query params.
pub(crate) fn page_request(page: Option<u32>, per_page: Option<u32>) -> PageRequest {
    let defaults = PageRequest::default();
    PageRequest {
        per_page: per_page.unwrap_or(defaults.per_page),
        page: page.unwrap_or(defaults.page),
    }
    .clamped()
}

pub(crate) fn search_term(search: Option<String>) -> Option<String> {
    non_blank(search)
}
