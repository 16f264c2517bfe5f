mod contract_test;
mod employee_test;
mod labor_request_test;
mod scope_test;
