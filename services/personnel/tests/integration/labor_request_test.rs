use hrm_domain::pagination::PageRequest;
use hrm_personnel::domain::types::{ApprovalStage, LaborRequestFilter, LaborRequestKind};
use hrm_personnel::error::PersonnelServiceError;
use hrm_personnel::usecase::labor_request::{
    ApproveLaborRequestUseCase, CreateLaborRequestInput, CreateLaborRequestUseCase,
    DeactivateLaborRequestUseCase, GetLaborRequestUseCase, ListLaborRequestsUseCase,
    UpdateLaborRequestUseCase, ValidateLaborRequestUseCase,
};
use hrm_testing::auth::MockAuth;

use crate::helpers::{
    MockEmployeeRepo, MockLaborRequestRepo, date, details, employee, pending_request,
    reporting_to,
};

fn filing(kind: &str) -> CreateLaborRequestInput {
    CreateLaborRequestInput {
        employee_id: None,
        kind: kind.to_owned(),
        details: details("medical appointment"),
    }
}

// ── create ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_file_request_for_own_employee_by_default() {
    let own = employee("Ana", "Paz");
    let requests = MockLaborRequestRepo::empty();
    let uc = CreateLaborRequestUseCase {
        employees: MockEmployeeRepo::new(vec![own.clone()]),
        requests: requests.clone(),
    };

    let created = uc
        .execute(&MockAuth::staff(own.id).actor(), filing(" Permit "))
        .await
        .unwrap();

    assert_eq!(created.employee_id, own.id);
    assert_eq!(created.kind.as_str(), LaborRequestKind::PERMIT);
    assert_eq!(created.stage(), ApprovalStage::Pending);
    assert!(created.active);
    assert!(requests.get(created.id).is_some());
}

#[tokio::test]
async fn should_forbid_staff_filing_for_someone_else() {
    let own = employee("Ana", "Paz");
    let other = employee("Luis", "Vega");
    let uc = CreateLaborRequestUseCase {
        employees: MockEmployeeRepo::new(vec![own.clone(), other.clone()]),
        requests: MockLaborRequestRepo::empty(),
    };

    let result = uc
        .execute(
            &MockAuth::staff(own.id).actor(),
            CreateLaborRequestInput {
                employee_id: Some(other.id),
                ..filing("leave")
            },
        )
        .await;

    assert!(
        matches!(result, Err(PersonnelServiceError::Forbidden)),
        "expected Forbidden, got {result:?}"
    );
}

#[tokio::test]
async fn should_let_hr_file_for_any_active_employee() {
    let other = employee("Luis", "Vega");
    let uc = CreateLaborRequestUseCase {
        employees: MockEmployeeRepo::new(vec![other.clone()]),
        requests: MockLaborRequestRepo::empty(),
    };

    let created = uc
        .execute(
            &MockAuth::hr().actor(),
            CreateLaborRequestInput {
                employee_id: Some(other.id),
                ..filing("suspension")
            },
        )
        .await
        .unwrap();

    assert_eq!(created.employee_id, other.id);
}

#[tokio::test]
async fn should_reject_inactive_subject() {
    let mut gone = employee("Luis", "Vega");
    gone.active = false;
    let uc = CreateLaborRequestUseCase {
        employees: MockEmployeeRepo::new(vec![gone.clone()]),
        requests: MockLaborRequestRepo::empty(),
    };

    let result = uc
        .execute(
            &MockAuth::hr().actor(),
            CreateLaborRequestInput {
                employee_id: Some(gone.id),
                ..filing("leave")
            },
        )
        .await;

    assert!(
        matches!(result, Err(PersonnelServiceError::InvalidField("employee_id"))),
        "got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_blank_kind_and_reversed_dates() {
    let own = employee("Ana", "Paz");
    let uc = CreateLaborRequestUseCase {
        employees: MockEmployeeRepo::new(vec![own.clone()]),
        requests: MockLaborRequestRepo::empty(),
    };
    let actor = MockAuth::staff(own.id).actor();

    let blank = uc.execute(&actor, filing("  ")).await;
    assert!(
        matches!(blank, Err(PersonnelServiceError::MissingField("kind"))),
        "got {blank:?}"
    );

    let mut reversed = filing("vacation");
    reversed.details.end_date = Some(date(2025, 3, 1));
    let reversed = uc.execute(&actor, reversed).await;
    assert!(
        matches!(reversed, Err(PersonnelServiceError::InvalidDateRange)),
        "got {reversed:?}"
    );
}

// ── approval workflow ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_refuse_validation_before_approval() {
    let subject = employee("Ana", "Paz");
    let request = pending_request(subject.id);
    let requests = MockLaborRequestRepo::new(vec![request.clone()]);
    let uc = ValidateLaborRequestUseCase {
        requests: requests.clone(),
    };

    let result = uc.execute(&MockAuth::hr().actor(), request.id).await;

    assert!(
        matches!(result, Err(PersonnelServiceError::NotYetApproved)),
        "expected NotYetApproved, got {result:?}"
    );
    assert!(requests.get(request.id).unwrap().validated_by.is_none());
}

#[tokio::test]
async fn should_keep_first_approver_when_approved_twice() {
    let subject = employee("Ana", "Paz");
    let request = pending_request(subject.id);
    let requests = MockLaborRequestRepo::new(vec![request.clone()]);
    let uc = ApproveLaborRequestUseCase {
        requests: requests.clone(),
    };
    let first = MockAuth::manager(employee("Marta", "Quispe").id);
    let second = MockAuth::manager(employee("Raul", "Cano").id);

    let approved = uc.execute(&first.actor(), request.id).await.unwrap();
    assert_eq!(approved.stage(), ApprovalStage::ApprovedByManager);

    for actor in [first.actor(), second.actor()] {
        let result = uc.execute(&actor, request.id).await;
        assert!(
            matches!(result, Err(PersonnelServiceError::AlreadyApproved)),
            "expected AlreadyApproved, got {result:?}"
        );
    }
    assert_eq!(
        requests.get(request.id).unwrap().approved_by,
        Some(first.identity_id)
    );
}

#[tokio::test]
async fn should_let_any_manager_approve_including_own_request() {
    let boss = employee("Marta", "Quispe");
    let outsider = employee("Olga", "Ayala");
    let theirs = pending_request(outsider.id);
    let own = pending_request(boss.id);
    let uc = ApproveLaborRequestUseCase {
        requests: MockLaborRequestRepo::new(vec![theirs.clone(), own.clone()]),
    };
    let manager = MockAuth::manager(boss.id).actor();

    for id in [theirs.id, own.id] {
        let approved = uc.execute(&manager, id).await.unwrap();
        assert_eq!(approved.approved_by, Some(manager.identity_id));
    }
}

#[tokio::test]
async fn should_validate_once_after_approval() {
    let subject = employee("Ana", "Paz");
    let request = pending_request(subject.id);
    let requests = MockLaborRequestRepo::new(vec![request.clone()]);
    let hr = MockAuth::hr();
    let other_hr = MockAuth::hr();

    ApproveLaborRequestUseCase {
        requests: requests.clone(),
    }
    .execute(&MockAuth::manager(employee("Marta", "Quispe").id).actor(), request.id)
    .await
    .unwrap();

    let validate = ValidateLaborRequestUseCase {
        requests: requests.clone(),
    };
    let validated = validate.execute(&hr.actor(), request.id).await.unwrap();
    assert_eq!(validated.stage(), ApprovalStage::ValidatedByHr);
    assert!(validated.validated_at.is_some());

    let again = validate.execute(&other_hr.actor(), request.id).await;
    assert!(
        matches!(again, Err(PersonnelServiceError::AlreadyValidated)),
        "expected AlreadyValidated, got {again:?}"
    );
    assert_eq!(
        requests.get(request.id).unwrap().validated_by,
        Some(hr.identity_id)
    );
}

#[tokio::test]
async fn should_forbid_each_stage_to_the_wrong_role() {
    let subject = employee("Ana", "Paz");
    let request = pending_request(subject.id);
    let requests = MockLaborRequestRepo::new(vec![request.clone()]);

    let approve = ApproveLaborRequestUseCase {
        requests: requests.clone(),
    };
    for auth in [MockAuth::staff(subject.id), MockAuth::hr()] {
        let result = approve.execute(&auth.actor(), request.id).await;
        assert!(matches!(result, Err(PersonnelServiceError::Forbidden)));
    }

    let validate = ValidateLaborRequestUseCase { requests };
    let result = validate
        .execute(&MockAuth::manager(subject.id).actor(), request.id)
        .await;
    assert!(matches!(result, Err(PersonnelServiceError::Forbidden)));
}

#[tokio::test]
async fn should_refuse_approving_a_deactivated_request() {
    let subject = employee("Ana", "Paz");
    let mut request = pending_request(subject.id);
    request.active = false;
    let uc = ApproveLaborRequestUseCase {
        requests: MockLaborRequestRepo::new(vec![request.clone()]),
    };

    let result = uc
        .execute(&MockAuth::manager(subject.id).actor(), request.id)
        .await;

    assert!(
        matches!(result, Err(PersonnelServiceError::RequestInactive)),
        "expected RequestInactive, got {result:?}"
    );
}

#[tokio::test]
async fn should_return_not_found_for_unknown_request() {
    let uc = ApproveLaborRequestUseCase {
        requests: MockLaborRequestRepo::empty(),
    };
    let result = uc
        .execute(
            &MockAuth::manager(employee("Marta", "Quispe").id).actor(),
            hrm_domain::id::LaborRequestId::new(),
        )
        .await;
    assert!(matches!(
        result,
        Err(PersonnelServiceError::LaborRequestNotFound)
    ));
}

// ── edit / deactivate ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_edit_pending_request_but_not_approved_one() {
    let own = employee("Ana", "Paz");
    let request = pending_request(own.id);
    let employees = MockEmployeeRepo::new(vec![own.clone()]);
    let requests = MockLaborRequestRepo::new(vec![request.clone()]);
    let edit = UpdateLaborRequestUseCase {
        employees: employees.clone(),
        requests: requests.clone(),
    };
    let actor = MockAuth::staff(own.id).actor();

    let edited = edit
        .execute(&actor, request.id, details("moved dates"))
        .await
        .unwrap();
    assert_eq!(edited.details.motive, "moved dates");

    ApproveLaborRequestUseCase {
        requests: requests.clone(),
    }
    .execute(&MockAuth::manager(own.id).actor(), request.id)
    .await
    .unwrap();

    let result = edit.execute(&actor, request.id, details("too late")).await;
    assert!(
        matches!(result, Err(PersonnelServiceError::AlreadyApproved)),
        "expected AlreadyApproved, got {result:?}"
    );
    assert_eq!(requests.get(request.id).unwrap().details.motive, "moved dates");
}

#[tokio::test]
async fn should_deactivate_idempotently_in_any_stage() {
    let own = employee("Ana", "Paz");
    let mut request = pending_request(own.id);
    request.approved_by = Some(MockAuth::hr().identity_id);
    let requests = MockLaborRequestRepo::new(vec![request.clone()]);
    let uc = DeactivateLaborRequestUseCase {
        employees: MockEmployeeRepo::new(vec![own.clone()]),
        requests: requests.clone(),
    };
    let actor = MockAuth::staff(own.id).actor();

    let first = uc.execute(&actor, request.id).await.unwrap();
    let second = uc.execute(&actor, request.id).await.unwrap();

    assert!(!first.active && !second.active);
    assert_eq!(second.approved_by, request.approved_by);
}

#[tokio::test]
async fn should_forbid_deactivating_request_outside_scope() {
    let own = employee("Ana", "Paz");
    let other = employee("Luis", "Vega");
    let request = pending_request(other.id);
    let requests = MockLaborRequestRepo::new(vec![request.clone()]);
    let uc = DeactivateLaborRequestUseCase {
        employees: MockEmployeeRepo::new(vec![own.clone(), other]),
        requests: requests.clone(),
    };

    let result = uc.execute(&MockAuth::staff(own.id).actor(), request.id).await;

    assert!(matches!(result, Err(PersonnelServiceError::Forbidden)));
    assert!(requests.get(request.id).unwrap().active);
}

// ── read ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_requests_of_manager_and_reports_only() {
    let boss = employee("Marta", "Quispe");
    let report = reporting_to(employee("Bruno", "Salas"), &boss);
    let outsider = employee("Olga", "Ayala");
    let employees = MockEmployeeRepo::new(vec![boss.clone(), report.clone(), outsider.clone()]);
    let requests = MockLaborRequestRepo::new(vec![
        pending_request(boss.id),
        pending_request(report.id),
        pending_request(outsider.id),
    ]);
    let uc = ListLaborRequestsUseCase {
        employees,
        requests,
    };

    let page = uc
        .execute(
            &MockAuth::manager(boss.id).actor(),
            LaborRequestFilter::default(),
            PageRequest::default(),
        )
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    assert!(page.data.iter().all(|r| r.employee_id != outsider.id));
}

#[tokio::test]
async fn should_filter_requests_by_kind() {
    let worker = employee("Rosa", "Tapia");
    let of_kind = |tag: &str| {
        let mut request = pending_request(worker.id);
        request.kind = LaborRequestKind::parse(tag).unwrap();
        request
    };
    let uc = ListLaborRequestsUseCase {
        employees: MockEmployeeRepo::new(vec![worker.clone()]),
        requests: MockLaborRequestRepo::new(vec![
            of_kind(LaborRequestKind::LEAVE),
            of_kind(LaborRequestKind::SUSPENSION),
            of_kind(LaborRequestKind::VACATION),
            of_kind(LaborRequestKind::LEAVE),
        ]),
    };

    let page = uc
        .execute(
            &MockAuth::hr().actor(),
            LaborRequestFilter {
                kind: LaborRequestKind::parse("LEAVE"),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    assert!(
        page.data
            .iter()
            .all(|r| r.kind.as_str() == LaborRequestKind::LEAVE)
    );
}

#[tokio::test]
async fn should_forbid_showing_request_outside_scope() {
    let own = employee("Ana", "Paz");
    let other = employee("Luis", "Vega");
    let request = pending_request(other.id);
    let uc = GetLaborRequestUseCase {
        employees: MockEmployeeRepo::new(vec![own.clone(), other]),
        requests: MockLaborRequestRepo::new(vec![request.clone()]),
    };

    let result = uc.execute(&MockAuth::staff(own.id).actor(), request.id).await;

    assert!(matches!(result, Err(PersonnelServiceError::Forbidden)));
}
