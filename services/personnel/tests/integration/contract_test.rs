use hrm_domain::id::EmployeeId;
use hrm_domain::pagination::PageRequest;
use hrm_personnel::domain::types::{ContractFilter, RenewalTerms};
use hrm_personnel::error::PersonnelServiceError;
use hrm_personnel::usecase::contract::{
    ContractStatisticsUseCase, CreateContractInput, CreateContractUseCase, DeleteContractUseCase,
    DownloadAttachmentUseCase, GetContractUseCase, ListContractsUseCase, RenewContractUseCase,
    ReplaceAttachmentUseCase, SetContractActiveUseCase, UpdateContractUseCase,
};
use hrm_testing::auth::MockAuth;

use crate::helpers::{
    MemoryAttachmentStore, MockContractRepo, MockEmployeeRepo, contract, date, days_from,
    employee, reporting_to, terms, upload,
};

const MAX_BYTES: usize = 1024;

fn renewal(contract_type: Option<&str>) -> RenewalTerms {
    RenewalTerms {
        start_date: date(2026, 1, 1),
        end_date: Some(date(2026, 12, 31)),
        contract_type: contract_type.map(str::to_owned),
    }
}

// ── renew ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_renew_into_a_fresh_active_contract() {
    let holder = employee("Ana", "Paz");
    let mut current = contract(holder.id, Some(date(2025, 12, 31)));
    current.attachment = Some("contracts/old.pdf".to_owned());
    let contracts = MockContractRepo::new(vec![current.clone()]);
    let uc = RenewContractUseCase {
        contracts: contracts.clone(),
    };

    let successor = uc
        .execute(&MockAuth::hr().actor(), current.id, renewal(None))
        .await
        .unwrap();

    let old = contracts.get(current.id).unwrap();
    assert!(!old.active);
    assert!(successor.active);
    assert_ne!(successor.id, current.id);
    assert_eq!(successor.employee_id, holder.id);
    assert_eq!(successor.attachment, None);
    assert_eq!(successor.terms.contract_type, current.terms.contract_type);
    assert_eq!(successor.terms.template, current.terms.template);
    assert_eq!(successor.terms.start_date, date(2026, 1, 1));
    assert_eq!(contracts.all().len(), 2);
}

#[tokio::test]
async fn should_take_new_type_on_renewal_when_given() {
    let current = contract(EmployeeId::new(), None);
    let uc = RenewContractUseCase {
        contracts: MockContractRepo::new(vec![current.clone()]),
    };

    let successor = uc
        .execute(&MockAuth::hr().actor(), current.id, renewal(Some("indefinite")))
        .await
        .unwrap();

    assert_eq!(successor.terms.contract_type, "indefinite");
}

#[tokio::test]
async fn should_refuse_renewing_an_inactive_contract() {
    let mut current = contract(EmployeeId::new(), None);
    current.active = false;
    let contracts = MockContractRepo::new(vec![current.clone()]);
    let uc = RenewContractUseCase {
        contracts: contracts.clone(),
    };

    let result = uc
        .execute(&MockAuth::hr().actor(), current.id, renewal(None))
        .await;

    assert!(
        matches!(result, Err(PersonnelServiceError::ContractInactive)),
        "expected ContractInactive, got {result:?}"
    );
    assert_eq!(contracts.all().len(), 1);
}

#[tokio::test]
async fn should_require_renewal_end_after_start() {
    let current = contract(EmployeeId::new(), None);
    let uc = RenewContractUseCase {
        contracts: MockContractRepo::new(vec![current.clone()]),
    };
    let same_day = RenewalTerms {
        end_date: Some(date(2026, 1, 1)),
        ..renewal(None)
    };

    let result = uc
        .execute(&MockAuth::hr().actor(), current.id, same_day)
        .await;

    assert!(
        matches!(result, Err(PersonnelServiceError::InvalidDateRange)),
        "got {result:?}"
    );
}

#[tokio::test]
async fn should_forbid_contract_management_to_managers() {
    let boss = employee("Marta", "Quispe");
    let current = contract(boss.id, None);
    let contracts = MockContractRepo::new(vec![current.clone()]);
    let actor = MockAuth::manager(boss.id).actor();

    let renew = RenewContractUseCase {
        contracts: contracts.clone(),
    }
    .execute(&actor, current.id, renewal(None))
    .await;
    assert!(matches!(renew, Err(PersonnelServiceError::Forbidden)));

    let toggle = SetContractActiveUseCase {
        contracts: contracts.clone(),
    }
    .execute(&actor, current.id, false)
    .await;
    assert!(matches!(toggle, Err(PersonnelServiceError::Forbidden)));
    assert!(contracts.get(current.id).unwrap().active);
}

#[tokio::test]
async fn should_toggle_active_flag_with_stamp() {
    let current = contract(EmployeeId::new(), None);
    let contracts = MockContractRepo::new(vec![current.clone()]);
    let uc = SetContractActiveUseCase {
        contracts: contracts.clone(),
    };
    let hr = MockAuth::hr().actor();

    let off = uc.execute(&hr, current.id, false).await.unwrap();
    assert!(!off.active);
    assert_eq!(off.updated_by, Some(hr.identity_id));

    let on = uc.execute(&hr, current.id, true).await.unwrap();
    assert!(on.active);
}

// ── create / attachments ─────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_contract_and_store_attachment() {
    let holder = employee("Ana", "Paz");
    let contracts = MockContractRepo::empty();
    let files = MemoryAttachmentStore::default();
    let uc = CreateContractUseCase {
        employees: MockEmployeeRepo::new(vec![holder.clone()]),
        contracts: contracts.clone(),
        attachments: files.clone(),
        max_attachment_bytes: MAX_BYTES,
    };

    let created = uc
        .execute(
            &MockAuth::hr().actor(),
            CreateContractInput {
                employee_id: holder.id,
                terms: terms("fixed-term"),
                attachment: Some(upload("Signed Contract.PDF")),
            },
        )
        .await
        .unwrap();

    assert!(created.active);
    let path = created.attachment.clone().unwrap();
    assert!(path.starts_with("contracts/") && path.ends_with(".pdf"), "{path}");
    assert_eq!(files.paths(), vec![path]);
    assert!(contracts.get(created.id).is_some());
}

#[tokio::test]
async fn should_reject_disallowed_attachment_without_storing_it() {
    let holder = employee("Ana", "Paz");
    let files = MemoryAttachmentStore::default();
    let uc = CreateContractUseCase {
        employees: MockEmployeeRepo::new(vec![holder.clone()]),
        contracts: MockContractRepo::empty(),
        attachments: files.clone(),
        max_attachment_bytes: MAX_BYTES,
    };

    let result = uc
        .execute(
            &MockAuth::hr().actor(),
            CreateContractInput {
                employee_id: holder.id,
                terms: terms("fixed-term"),
                attachment: Some(upload("payload.exe")),
            },
        )
        .await;

    assert!(
        matches!(result, Err(PersonnelServiceError::InvalidField("attachment"))),
        "got {result:?}"
    );
    assert!(files.paths().is_empty());
}

#[tokio::test]
async fn should_discard_stored_file_when_insert_fails() {
    let holder = employee("Ana", "Paz");
    let files = MemoryAttachmentStore::default();
    let uc = CreateContractUseCase {
        employees: MockEmployeeRepo::new(vec![holder.clone()]),
        contracts: MockContractRepo::failing(),
        attachments: files.clone(),
        max_attachment_bytes: MAX_BYTES,
    };

    let result = uc
        .execute(
            &MockAuth::hr().actor(),
            CreateContractInput {
                employee_id: holder.id,
                terms: terms("fixed-term"),
                attachment: Some(upload("contract.docx")),
            },
        )
        .await;

    assert!(matches!(result, Err(PersonnelServiceError::Internal(_))));
    assert!(files.paths().is_empty(), "orphaned file left behind");
}

#[tokio::test]
async fn should_reject_contract_for_unknown_employee() {
    let uc = CreateContractUseCase {
        employees: MockEmployeeRepo::empty(),
        contracts: MockContractRepo::empty(),
        attachments: MemoryAttachmentStore::default(),
        max_attachment_bytes: MAX_BYTES,
    };

    let result = uc
        .execute(
            &MockAuth::hr().actor(),
            CreateContractInput {
                employee_id: EmployeeId::new(),
                terms: terms("fixed-term"),
                attachment: None,
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(PersonnelServiceError::InvalidField("employee_id"))
    ));
}

#[tokio::test]
async fn should_replace_attachment_and_drop_previous_file() {
    let mut current = contract(EmployeeId::new(), None);
    current.attachment = Some("contracts/old.pdf".to_owned());
    let files = MemoryAttachmentStore::with_file("contracts/old.pdf", b"old");
    let contracts = MockContractRepo::new(vec![current.clone()]);
    let uc = ReplaceAttachmentUseCase {
        contracts: contracts.clone(),
        attachments: files.clone(),
        max_attachment_bytes: MAX_BYTES,
    };

    let updated = uc
        .execute(&MockAuth::hr().actor(), current.id, upload("v2.doc"))
        .await
        .unwrap();

    let path = updated.attachment.unwrap();
    assert!(path.ends_with(".doc"));
    assert_eq!(files.paths(), vec![path]);
}

#[tokio::test]
async fn should_keep_attachment_when_update_carries_no_file() {
    let mut current = contract(EmployeeId::new(), None);
    current.attachment = Some("contracts/keep.pdf".to_owned());
    let files = MemoryAttachmentStore::with_file("contracts/keep.pdf", b"keep");
    let uc = UpdateContractUseCase {
        contracts: MockContractRepo::new(vec![current.clone()]),
        attachments: files.clone(),
        max_attachment_bytes: MAX_BYTES,
    };

    let updated = uc
        .execute(&MockAuth::hr().actor(), current.id, terms("seasonal"), None)
        .await
        .unwrap();

    assert_eq!(updated.terms.contract_type, "seasonal");
    assert_eq!(updated.attachment.as_deref(), Some("contracts/keep.pdf"));
    assert_eq!(files.paths(), vec!["contracts/keep.pdf".to_owned()]);
}

#[tokio::test]
async fn should_store_nothing_when_replacing_on_missing_contract() {
    let files = MemoryAttachmentStore::default();
    let uc = ReplaceAttachmentUseCase {
        contracts: MockContractRepo::empty(),
        attachments: files.clone(),
        max_attachment_bytes: MAX_BYTES,
    };

    let result = uc
        .execute(
            &MockAuth::hr().actor(),
            hrm_domain::id::ContractId::new(),
            upload("v2.pdf"),
        )
        .await;

    assert!(matches!(result, Err(PersonnelServiceError::ContractNotFound)));
    assert!(files.paths().is_empty());
}

#[tokio::test]
async fn should_delete_row_and_file() {
    let mut current = contract(EmployeeId::new(), None);
    current.attachment = Some("contracts/gone.pdf".to_owned());
    let files = MemoryAttachmentStore::with_file("contracts/gone.pdf", b"bye");
    let contracts = MockContractRepo::new(vec![current.clone()]);
    let uc = DeleteContractUseCase {
        contracts: contracts.clone(),
        attachments: files.clone(),
    };

    uc.execute(&MockAuth::hr().actor(), current.id)
        .await
        .unwrap();

    assert!(contracts.get(current.id).is_none());
    assert!(files.paths().is_empty());
}

// ── download ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_download_attachment_in_scope() {
    let own = employee("Ana", "Paz");
    let mut current = contract(own.id, None);
    current.attachment = Some("contracts/mine.pdf".to_owned());
    let uc = DownloadAttachmentUseCase {
        employees: MockEmployeeRepo::new(vec![own.clone()]),
        contracts: MockContractRepo::new(vec![current.clone()]),
        attachments: MemoryAttachmentStore::with_file("contracts/mine.pdf", b"%PDF"),
    };

    let file = uc
        .execute(&MockAuth::staff(own.id).actor(), current.id)
        .await
        .unwrap();

    assert_eq!(file.path, "contracts/mine.pdf");
    assert_eq!(file.bytes, b"%PDF".to_vec());
}

#[tokio::test]
async fn should_report_missing_attachment_as_not_found() {
    let without = contract(EmployeeId::new(), None);
    let mut dangling = contract(EmployeeId::new(), None);
    dangling.attachment = Some("contracts/lost.pdf".to_owned());
    let uc = DownloadAttachmentUseCase {
        employees: MockEmployeeRepo::empty(),
        contracts: MockContractRepo::new(vec![without.clone(), dangling.clone()]),
        attachments: MemoryAttachmentStore::default(),
    };
    let hr = MockAuth::hr().actor();

    for id in [without.id, dangling.id] {
        let result = uc.execute(&hr, id).await;
        assert!(
            matches!(result, Err(PersonnelServiceError::AttachmentNotFound)),
            "expected AttachmentNotFound, got {:?}",
            result.map(|f| f.path)
        );
    }
}

#[tokio::test]
async fn should_forbid_download_outside_scope() {
    let own = employee("Ana", "Paz");
    let mut foreign = contract(EmployeeId::new(), None);
    foreign.attachment = Some("contracts/theirs.pdf".to_owned());
    let uc = DownloadAttachmentUseCase {
        employees: MockEmployeeRepo::new(vec![own.clone()]),
        contracts: MockContractRepo::new(vec![foreign.clone()]),
        attachments: MemoryAttachmentStore::with_file("contracts/theirs.pdf", b"x"),
    };

    let result = uc.execute(&MockAuth::staff(own.id).actor(), foreign.id).await;

    assert!(matches!(result, Err(PersonnelServiceError::Forbidden)));
}

// ── read ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_ignore_employee_filter_for_non_hr() {
    let boss = employee("Marta", "Quispe");
    let report = reporting_to(employee("Bruno", "Salas"), &boss);
    let outsider = employee("Olga", "Ayala");
    let uc = ListContractsUseCase {
        employees: MockEmployeeRepo::new(vec![boss.clone(), report.clone(), outsider.clone()]),
        contracts: MockContractRepo::new(vec![
            contract(boss.id, None),
            contract(report.id, None),
            contract(outsider.id, None),
        ]),
    };
    let filter = ContractFilter {
        employee_id: Some(outsider.id),
        ..Default::default()
    };

    let page = uc
        .execute(
            &MockAuth::manager(boss.id).actor(),
            filter,
            PageRequest::default(),
        )
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    assert!(page.data.iter().all(|c| c.employee_id != outsider.id));
}

#[tokio::test]
async fn should_filter_by_employee_for_hr() {
    let a = employee("Ana", "Paz");
    let b = employee("Luis", "Vega");
    let uc = ListContractsUseCase {
        employees: MockEmployeeRepo::new(vec![a.clone(), b.clone()]),
        contracts: MockContractRepo::new(vec![contract(a.id, None), contract(b.id, None)]),
    };
    let filter = ContractFilter {
        employee_id: Some(b.id),
        ..Default::default()
    };

    let page = uc
        .execute(&MockAuth::hr().actor(), filter, PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].employee_id, b.id);
}

#[tokio::test]
async fn should_forbid_showing_contract_outside_scope() {
    let own = employee("Ana", "Paz");
    let foreign = contract(EmployeeId::new(), None);
    let uc = GetContractUseCase {
        employees: MockEmployeeRepo::new(vec![own.clone()]),
        contracts: MockContractRepo::new(vec![foreign.clone()]),
    };

    let result = uc.execute(&MockAuth::staff(own.id).actor(), foreign.id).await;

    assert!(matches!(result, Err(PersonnelServiceError::Forbidden)));
}

#[tokio::test]
async fn should_count_expiring_and_expired_contracts() {
    let today = date(2025, 6, 1);
    let holder = employee("Ana", "Paz");
    let mut retired = contract(holder.id, Some(days_from(today, 5)));
    retired.active = false;
    let uc = ContractStatisticsUseCase {
        employees: MockEmployeeRepo::new(vec![holder.clone()]),
        contracts: MockContractRepo::new(vec![
            contract(holder.id, Some(today)),
            contract(holder.id, Some(days_from(today, 30))),
            contract(holder.id, Some(days_from(today, 31))),
            contract(holder.id, Some(date(2025, 5, 31))),
            contract(holder.id, None),
            retired,
        ]),
    };

    let stats = uc.execute(&MockAuth::hr().actor(), today).await.unwrap();

    assert_eq!(stats.total, 6);
    assert_eq!(stats.active, 5);
    assert_eq!(stats.inactive, 1);
    assert_eq!(stats.expiring_soon, 2);
    assert_eq!(stats.expired, 1);
}
