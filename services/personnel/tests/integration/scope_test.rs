use std::collections::BTreeSet;

use hrm_domain::pagination::PageRequest;
use hrm_domain::scope::EmployeeScope;
use hrm_personnel::domain::types::EmployeeFilter;
use hrm_personnel::error::PersonnelServiceError;
use hrm_personnel::usecase::employee::{GetEmployeeUseCase, ListEmployeesUseCase};
use hrm_personnel::usecase::scope::resolve_scope;
use hrm_testing::auth::MockAuth;

use crate::helpers::{MockEmployeeRepo, employee, reporting_to};

#[tokio::test]
async fn should_scope_manager_to_self_and_direct_reports_only() {
    let m = employee("Marta", "Quispe");
    let b = reporting_to(employee("Bruno", "Salas"), &m);
    let c = reporting_to(employee("Carla", "Rojas"), &b);
    let repo = MockEmployeeRepo::new(vec![m.clone(), b.clone(), c.clone()]);

    let scope = resolve_scope(&repo, &MockAuth::manager(m.id).actor())
        .await
        .unwrap();

    assert_eq!(scope, EmployeeScope::Only(BTreeSet::from([m.id, b.id])));
    assert!(!scope.contains(c.id), "grand-reports must not be visible");
}

#[tokio::test]
async fn should_leave_inactive_reports_out_of_manager_scope() {
    let m = employee("Marta", "Quispe");
    let mut gone = reporting_to(employee("Bruno", "Salas"), &m);
    gone.active = false;
    let repo = MockEmployeeRepo::new(vec![m.clone(), gone.clone()]);

    let scope = resolve_scope(&repo, &MockAuth::manager(m.id).actor())
        .await
        .unwrap();

    assert!(!scope.contains(gone.id));
}

#[tokio::test]
async fn should_give_hr_every_employee() {
    let repo = MockEmployeeRepo::new(vec![employee("Ana", "Paz")]);
    let scope = resolve_scope(&repo, &MockAuth::hr().actor()).await.unwrap();
    assert!(scope.is_unrestricted());
}

#[tokio::test]
async fn should_limit_staff_to_own_record() {
    let own = employee("Ana", "Paz");
    let report = reporting_to(employee("Luis", "Vega"), &own);
    let repo = MockEmployeeRepo::new(vec![own.clone(), report]);

    let scope = resolve_scope(&repo, &MockAuth::staff(own.id).actor())
        .await
        .unwrap();

    assert_eq!(scope, EmployeeScope::Only(BTreeSet::from([own.id])));
}

#[tokio::test]
async fn should_see_nothing_without_a_linked_employee() {
    let repo = MockEmployeeRepo::new(vec![employee("Ana", "Paz")]);
    let auth = MockAuth::new(2, None);
    let scope = resolve_scope(&repo, &auth.actor()).await.unwrap();
    assert_eq!(scope, EmployeeScope::none());
}

#[tokio::test]
async fn should_list_only_scoped_employees_for_manager() {
    let m = employee("Marta", "Quispe");
    let b = reporting_to(employee("Bruno", "Salas"), &m);
    let outsider = employee("Olga", "Ayala");
    let repo = MockEmployeeRepo::new(vec![m.clone(), b.clone(), outsider]);

    let uc = ListEmployeesUseCase { repo };
    let page = uc
        .execute(
            &MockAuth::manager(m.id).actor(),
            EmployeeFilter::default(),
            PageRequest::default(),
        )
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    let ids: Vec<_> = page.data.iter().map(|e| e.id).collect();
    assert!(ids.contains(&m.id) && ids.contains(&b.id));
}

#[tokio::test]
async fn should_forbid_showing_employee_outside_scope() {
    let m = employee("Marta", "Quispe");
    let outsider = employee("Olga", "Ayala");
    let uc = GetEmployeeUseCase {
        repo: MockEmployeeRepo::new(vec![m.clone(), outsider.clone()]),
    };

    let result = uc.execute(&MockAuth::manager(m.id).actor(), outsider.id).await;

    assert!(
        matches!(result, Err(PersonnelServiceError::Forbidden)),
        "expected Forbidden, got {result:?}"
    );
}
