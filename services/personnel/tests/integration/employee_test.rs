use hrm_domain::role::Role;
use hrm_personnel::domain::types::EmployeeProfile;
use hrm_personnel::error::PersonnelServiceError;
use hrm_personnel::usecase::employee::{
    CreateEmployeeInput, CreateEmployeeUseCase, DeactivateEmployeeUseCase,
    ListPossibleManagersUseCase, ListSubordinatesUseCase, SetManagerUseCase, UpdateEmployeeInput,
    UpdateEmployeeUseCase,
};
use hrm_testing::auth::MockAuth;

use crate::helpers::{MockEmployeeRepo, employee, reporting_to};

fn profile(first_name: &str, last_name: &str, identification_number: &str) -> EmployeeProfile {
    EmployeeProfile {
        first_name: first_name.to_owned(),
        last_name: last_name.to_owned(),
        identification_number: identification_number.to_owned(),
        ..Default::default()
    }
}

fn new_hire(username: &str, identification_number: &str) -> CreateEmployeeInput {
    CreateEmployeeInput {
        profile: profile(" Lucia ", "Mendez", identification_number),
        manager_id: None,
        username: username.to_owned(),
        display_name: None,
        role_id: 3,
    }
}

// ── deactivate ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_refuse_deactivation_while_an_active_report_exists() {
    let boss = employee("Marta", "Quispe");
    let report = reporting_to(employee("Bruno", "Salas"), &boss);
    let repo = MockEmployeeRepo::new(vec![boss.clone(), report]);
    let uc = DeactivateEmployeeUseCase { repo: repo.clone() };

    let result = uc.execute(&MockAuth::hr().actor(), boss.id).await;

    assert!(
        matches!(result, Err(PersonnelServiceError::HasActiveSubordinates)),
        "expected HasActiveSubordinates, got {result:?}"
    );
    assert!(repo.get(boss.id).unwrap().active);
}

#[tokio::test]
async fn should_deactivate_when_every_report_is_inactive() {
    let boss = employee("Marta", "Quispe");
    let mut report = reporting_to(employee("Bruno", "Salas"), &boss);
    report.active = false;
    let repo = MockEmployeeRepo::new(vec![boss.clone(), report]);
    let uc = DeactivateEmployeeUseCase { repo: repo.clone() };

    uc.execute(&MockAuth::hr().actor(), boss.id).await.unwrap();

    let stored = repo.get(boss.id).unwrap();
    assert!(!stored.active);
    assert!(stored.updated_by.is_some());
}

#[tokio::test]
async fn should_return_not_found_when_deactivating_unknown_employee() {
    let uc = DeactivateEmployeeUseCase {
        repo: MockEmployeeRepo::empty(),
    };
    let result = uc
        .execute(&MockAuth::hr().actor(), hrm_domain::id::EmployeeId::new())
        .await;
    assert!(
        matches!(result, Err(PersonnelServiceError::EmployeeNotFound)),
        "expected EmployeeNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_forbid_deactivation_by_manager() {
    let boss = employee("Marta", "Quispe");
    let uc = DeactivateEmployeeUseCase {
        repo: MockEmployeeRepo::new(vec![boss.clone()]),
    };
    let result = uc.execute(&MockAuth::manager(boss.id).actor(), boss.id).await;
    assert!(matches!(result, Err(PersonnelServiceError::Forbidden)));
}

// ── set manager ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_persist_assigned_manager() {
    let boss = employee("Marta", "Quispe");
    let worker = employee("Bruno", "Salas");
    let repo = MockEmployeeRepo::new(vec![boss.clone(), worker.clone()]);
    let uc = SetManagerUseCase { repo: repo.clone() };

    let updated = uc
        .execute(&MockAuth::hr().actor(), worker.id, Some(boss.id))
        .await
        .unwrap();

    assert_eq!(updated.manager_id, Some(boss.id));
    assert_eq!(repo.get(worker.id).unwrap().manager_id, Some(boss.id));
}

#[tokio::test]
async fn should_clear_manager_with_none() {
    let boss = employee("Marta", "Quispe");
    let worker = reporting_to(employee("Bruno", "Salas"), &boss);
    let repo = MockEmployeeRepo::new(vec![boss, worker.clone()]);
    let uc = SetManagerUseCase { repo: repo.clone() };

    uc.execute(&MockAuth::hr().actor(), worker.id, None)
        .await
        .unwrap();

    assert_eq!(repo.get(worker.id).unwrap().manager_id, None);
}

#[tokio::test]
async fn should_reject_self_management_before_any_write() {
    let worker = employee("Bruno", "Salas");
    let repo = MockEmployeeRepo::new(vec![worker.clone()]);
    let uc = SetManagerUseCase { repo: repo.clone() };

    let result = uc
        .execute(&MockAuth::hr().actor(), worker.id, Some(worker.id))
        .await;

    assert!(
        matches!(result, Err(PersonnelServiceError::SelfManager)),
        "expected SelfManager, got {result:?}"
    );
    let stored = repo.get(worker.id).unwrap();
    assert_eq!(stored.manager_id, None);
    assert!(stored.updated_at.is_none(), "no write may happen");
}

#[tokio::test]
async fn should_reject_assignment_that_closes_a_cycle() {
    let top = employee("Marta", "Quispe");
    let mid = reporting_to(employee("Bruno", "Salas"), &top);
    let low = reporting_to(employee("Carla", "Rojas"), &mid);
    let repo = MockEmployeeRepo::new(vec![top.clone(), mid, low.clone()]);
    let uc = SetManagerUseCase { repo: repo.clone() };

    let result = uc
        .execute(&MockAuth::hr().actor(), top.id, Some(low.id))
        .await;

    assert!(
        matches!(result, Err(PersonnelServiceError::ManagerCycle)),
        "expected ManagerCycle, got {result:?}"
    );
    assert_eq!(repo.get(top.id).unwrap().manager_id, None);
}

#[tokio::test]
async fn should_reject_inactive_manager() {
    let mut retired = employee("Marta", "Quispe");
    retired.active = false;
    let worker = employee("Bruno", "Salas");
    let uc = SetManagerUseCase {
        repo: MockEmployeeRepo::new(vec![retired.clone(), worker.clone()]),
    };

    let result = uc
        .execute(&MockAuth::hr().actor(), worker.id, Some(retired.id))
        .await;

    assert!(
        matches!(result, Err(PersonnelServiceError::InvalidField("manager_id"))),
        "expected InvalidField(manager_id), got {result:?}"
    );
}

// ── create / update ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_employee_with_linked_identity() {
    let repo = MockEmployeeRepo::empty();
    let uc = CreateEmployeeUseCase { repo: repo.clone() };

    let created = uc
        .execute(&MockAuth::hr().actor(), new_hire("lmendez", "0912345678"))
        .await
        .unwrap();

    assert!(created.active);
    assert_eq!(created.profile.first_name, "Lucia");
    let identities = repo.identities.lock().unwrap();
    assert_eq!(identities.len(), 1);
    assert_eq!(Some(identities[0].id), created.identity_id);
    assert_eq!(identities[0].display_name, "Lucia Mendez");
    assert_eq!(identities[0].role_id, 3);
}

#[tokio::test]
async fn should_reject_duplicate_username() {
    let repo = MockEmployeeRepo::empty();
    let uc = CreateEmployeeUseCase { repo: repo.clone() };
    let hr = MockAuth::hr().actor();
    uc.execute(&hr, new_hire("lmendez", "0912345678"))
        .await
        .unwrap();

    let result = uc.execute(&hr, new_hire("lmendez", "0999999999")).await;

    assert!(
        matches!(result, Err(PersonnelServiceError::AlreadyInUse("username"))),
        "expected AlreadyInUse(username), got {result:?}"
    );
    assert_eq!(repo.employees.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_require_identification_number() {
    let uc = CreateEmployeeUseCase {
        repo: MockEmployeeRepo::empty(),
    };
    let result = uc
        .execute(&MockAuth::hr().actor(), new_hire("lmendez", "   "))
        .await;
    assert!(
        matches!(
            result,
            Err(PersonnelServiceError::MissingField("identification_number"))
        ),
        "got {result:?}"
    );
}

#[tokio::test]
async fn should_forbid_employee_creation_by_staff() {
    let own = employee("Ana", "Paz");
    let uc = CreateEmployeeUseCase {
        repo: MockEmployeeRepo::new(vec![own.clone()]),
    };
    let result = uc
        .execute(&MockAuth::staff(own.id).actor(), new_hire("x", "1"))
        .await;
    assert!(matches!(result, Err(PersonnelServiceError::Forbidden)));
}

#[tokio::test]
async fn should_update_profile_and_identity_role_together() {
    let repo = MockEmployeeRepo::empty();
    let hr = MockAuth::hr().actor();
    let created = CreateEmployeeUseCase { repo: repo.clone() }
        .execute(&hr, new_hire("lmendez", "0912345678"))
        .await
        .unwrap();

    let updated = UpdateEmployeeUseCase { repo: repo.clone() }
        .execute(
            &hr,
            created.id,
            UpdateEmployeeInput {
                profile: profile("Lucia", "Mendez Ortiz", "0912345678"),
                role_id: Some(Role::MANAGER_ID),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.profile.last_name, "Mendez Ortiz");
    assert_eq!(updated.updated_by, Some(hr.identity_id));
    assert_eq!(
        repo.identities.lock().unwrap()[0].role_id,
        Role::MANAGER_ID
    );
}

// ── listings ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_only_active_direct_reports() {
    let boss = employee("Marta", "Quispe");
    let active = reporting_to(employee("Bruno", "Salas"), &boss);
    let mut inactive = reporting_to(employee("Carla", "Rojas"), &boss);
    inactive.active = false;
    let uc = ListSubordinatesUseCase {
        repo: MockEmployeeRepo::new(vec![boss.clone(), active.clone(), inactive]),
    };

    let reports = uc
        .execute(&MockAuth::manager(boss.id).actor(), boss.id)
        .await
        .unwrap();

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].id, active.id);
}

#[tokio::test]
async fn should_exclude_requested_employee_from_possible_managers() {
    let a = employee("Marta", "Quispe");
    let b = employee("Bruno", "Salas");
    let mut retired = employee("Carla", "Rojas");
    retired.active = false;
    let uc = ListPossibleManagersUseCase {
        repo: MockEmployeeRepo::new(vec![a.clone(), b.clone(), retired]),
    };

    let managers = uc.execute(Some(a.id)).await.unwrap();

    assert_eq!(managers.len(), 1);
    assert_eq!(managers[0].id, b.id);
}
