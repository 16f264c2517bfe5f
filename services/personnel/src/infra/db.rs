use anyhow::Context as _;
use chrono::{Duration, NaiveDate};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, IntoActiveModel as _, PaginatorTrait, QueryFilter, QueryOrder, SqlErr,
    TransactionError, TransactionTrait, UpdateMany,
    sea_query::{Expr, Func, Query, SimpleExpr},
};

use hrm_core::sea_ext::ScopeFilter;
use hrm_domain::id::{ContractId, EmployeeId, IdentityId, LaborRequestId, SanctionId};
use hrm_domain::pagination::PageRequest;
use hrm_domain::scope::EmployeeScope;
use hrm_personnel_schema::{contracts, employees, identities, labor_requests, sanctions};

use crate::domain::repository::{
    ContractRepository, EmployeeRepository, LaborRequestRepository, SanctionRepository, Stamp,
};
use crate::domain::types::{
    Contract, ContractFilter, ContractStats, ContractTerms, EXPIRY_WINDOW_DAYS, Employee,
    EmployeeFilter, EmployeeProfile, Identity, LaborRequest, LaborRequestDetails,
    LaborRequestFilter, LaborRequestKind, Sanction, SanctionDetails, SanctionFilter,
};
use crate::error::PersonnelServiceError;

/// Case-insensitive substring match on a text column.
fn contains_ci<C: ColumnTrait>(column: C, needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(format!("%{}%", needle.trim().to_lowercase()))
}

/// Result of a write that checks uniqueness inside its transaction.
enum Written {
    Done,
    Missing,
    Conflict(&'static str),
}

fn written(
    result: Result<Written, TransactionError<DbErr>>,
    context: &'static str,
) -> Result<bool, PersonnelServiceError> {
    match result {
        Ok(Written::Done) => Ok(true),
        Ok(Written::Missing) => Ok(false),
        Ok(Written::Conflict(field)) => Err(PersonnelServiceError::AlreadyInUse(field)),
        Err(TransactionError::Connection(e) | TransactionError::Transaction(e)) => {
            // Lost a race with a concurrent insert of the same key.
            if let Some(SqlErr::UniqueConstraintViolation(detail)) = e.sql_err() {
                let field = if detail.contains("username") {
                    "username"
                } else {
                    "identification_number"
                };
                return Err(PersonnelServiceError::AlreadyInUse(field));
            }
            Err(anyhow::Error::new(e).context(context).into())
        }
    }
}

// ── Employee repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbEmployeeRepository {
    pub db: DatabaseConnection,
}

impl EmployeeRepository for DbEmployeeRepository {
    async fn find_by_id(&self, id: EmployeeId) -> Result<Option<Employee>, PersonnelServiceError> {
        let model = employees::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find employee by id")?;
        Ok(model.map(employee_from_model))
    }

    async fn list(
        &self,
        scope: &EmployeeScope,
        filter: &EmployeeFilter,
        page: PageRequest,
    ) -> Result<(Vec<Employee>, u64), PersonnelServiceError> {
        let mut query = employees::Entity::find().filter_scope(employees::Column::Id, scope);
        if !filter.include_inactive {
            query = query.filter(employees::Column::Active.eq(true));
        }
        if let Some(search) = &filter.search {
            query = query.filter(
                Condition::any()
                    .add(contains_ci(employees::Column::FirstName, search))
                    .add(contains_ci(employees::Column::LastName, search))
                    .add(contains_ci(employees::Column::IdentificationNumber, search)),
            );
        }
        let paginator = query
            .order_by_asc(employees::Column::LastName)
            .order_by_asc(employees::Column::FirstName)
            .order_by_asc(employees::Column::Id)
            .paginate(&self.db, u64::from(page.per_page));
        let total = paginator.num_items().await.context("count employees")?;
        let models = paginator
            .fetch_page(page.index())
            .await
            .context("list employees")?;
        Ok((models.into_iter().map(employee_from_model).collect(), total))
    }

    async fn active_direct_reports(
        &self,
        manager_id: EmployeeId,
    ) -> Result<Vec<Employee>, PersonnelServiceError> {
        let models = employees::Entity::find()
            .filter(employees::Column::ManagerId.eq(manager_id.0))
            .filter(employees::Column::Active.eq(true))
            .order_by_asc(employees::Column::LastName)
            .all(&self.db)
            .await
            .context("list active direct reports")?;
        Ok(models.into_iter().map(employee_from_model).collect())
    }

    async fn list_active(
        &self,
        exclude: Option<EmployeeId>,
    ) -> Result<Vec<Employee>, PersonnelServiceError> {
        let mut query = employees::Entity::find().filter(employees::Column::Active.eq(true));
        if let Some(exclude) = exclude {
            query = query.filter(employees::Column::Id.ne(exclude.0));
        }
        let models = query
            .order_by_asc(employees::Column::LastName)
            .order_by_asc(employees::Column::FirstName)
            .all(&self.db)
            .await
            .context("list active employees")?;
        Ok(models.into_iter().map(employee_from_model).collect())
    }

    async fn create_with_identity(
        &self,
        identity: &Identity,
        employee: &Employee,
    ) -> Result<(), PersonnelServiceError> {
        let identity = identity.clone();
        let employee = employee.clone();
        let result = self
            .db
            .transaction::<_, Written, DbErr>(|txn| {
                Box::pin(async move {
                    let username_taken = identities::Entity::find()
                        .filter(identities::Column::Username.eq(identity.username.as_str()))
                        .one(txn)
                        .await?
                        .is_some();
                    if username_taken {
                        return Ok(Written::Conflict("username"));
                    }
                    let number_taken = employees::Entity::find()
                        .filter(
                            employees::Column::IdentificationNumber
                                .eq(employee.profile.identification_number.as_str()),
                        )
                        .one(txn)
                        .await?
                        .is_some();
                    if number_taken {
                        return Ok(Written::Conflict("identification_number"));
                    }

                    identities::ActiveModel {
                        id: Set(identity.id.0),
                        username: Set(identity.username.clone()),
                        display_name: Set(identity.display_name.clone()),
                        role_id: Set(i16::from(identity.role_id)),
                        created_at: Set(identity.created_at),
                        updated_at: Set(identity.updated_at),
                    }
                    .insert(txn)
                    .await?;
                    employee_to_active_model(&employee).insert(txn).await?;
                    Ok(Written::Done)
                })
            })
            .await;
        written(result, "create employee with identity").map(|_| ())
    }

    async fn update_profile(
        &self,
        id: EmployeeId,
        profile: &EmployeeProfile,
        role_id: Option<u8>,
        stamp: Stamp,
    ) -> Result<bool, PersonnelServiceError> {
        let profile = profile.clone();
        let result = self
            .db
            .transaction::<_, Written, DbErr>(|txn| {
                Box::pin(async move {
                    let Some(model) = employees::Entity::find_by_id(id.0).one(txn).await? else {
                        return Ok(Written::Missing);
                    };
                    let number_taken = employees::Entity::find()
                        .filter(
                            employees::Column::IdentificationNumber
                                .eq(profile.identification_number.as_str()),
                        )
                        .filter(employees::Column::Id.ne(id.0))
                        .one(txn)
                        .await?
                        .is_some();
                    if number_taken {
                        return Ok(Written::Conflict("identification_number"));
                    }

                    let identity_id = model.identity_id;
                    let mut am = model.into_active_model();
                    apply_profile(&mut am, &profile);
                    am.updated_by = Set(Some(stamp.by.0));
                    am.updated_at = Set(Some(stamp.at));
                    am.update(txn).await?;

                    if let (Some(role_id), Some(identity_id)) = (role_id, identity_id) {
                        identities::Entity::update_many()
                            .col_expr(identities::Column::RoleId, Expr::value(i16::from(role_id)))
                            .col_expr(identities::Column::UpdatedAt, Expr::value(stamp.at))
                            .filter(identities::Column::Id.eq(identity_id))
                            .exec(txn)
                            .await?;
                    }
                    Ok(Written::Done)
                })
            })
            .await;
        written(result, "update employee profile")
    }

    async fn set_manager(
        &self,
        id: EmployeeId,
        manager_id: Option<EmployeeId>,
        stamp: Stamp,
    ) -> Result<bool, PersonnelServiceError> {
        let result = employees::Entity::update_many()
            .col_expr(
                employees::Column::ManagerId,
                Expr::value(manager_id.map(|m| m.0)),
            )
            .col_expr(employees::Column::UpdatedBy, Expr::value(Some(stamp.by.0)))
            .col_expr(employees::Column::UpdatedAt, Expr::value(Some(stamp.at)))
            .filter(employees::Column::Id.eq(id.0))
            .exec(&self.db)
            .await
            .context("set employee manager")?;
        Ok(result.rows_affected > 0)
    }

    async fn deactivate_if_no_active_reports(
        &self,
        id: EmployeeId,
        stamp: Stamp,
    ) -> Result<bool, PersonnelServiceError> {
        let result = guarded_deactivation(id, stamp)
            .exec(&self.db)
            .await
            .context("deactivate employee")?;
        Ok(result.rows_affected > 0)
    }
}

/// `UPDATE employees SET active = false ... WHERE id = ? AND id NOT IN
/// (SELECT manager_id FROM employees WHERE active)`.
fn guarded_deactivation(id: EmployeeId, stamp: Stamp) -> UpdateMany<employees::Entity> {
    employees::Entity::update_many()
        .col_expr(employees::Column::Active, Expr::value(false))
        .col_expr(employees::Column::UpdatedBy, Expr::value(Some(stamp.by.0)))
        .col_expr(employees::Column::UpdatedAt, Expr::value(Some(stamp.at)))
        .filter(employees::Column::Id.eq(id.0))
        .filter(
            employees::Column::Id.not_in_subquery(
                Query::select()
                    .column(employees::Column::ManagerId)
                    .from(employees::Entity)
                    .and_where(Expr::col(employees::Column::Active).eq(true))
                    .and_where(Expr::col(employees::Column::ManagerId).is_not_null())
                    .to_owned(),
            ),
        )
}

fn apply_profile(am: &mut employees::ActiveModel, profile: &EmployeeProfile) {
    am.first_name = Set(profile.first_name.clone());
    am.last_name = Set(profile.last_name.clone());
    am.identification_number = Set(profile.identification_number.clone());
    am.birth_date = Set(profile.birth_date);
    am.phone = Set(profile.phone.clone());
    am.address = Set(profile.address.clone());
    am.gender = Set(profile.gender.clone());
    am.department_id = Set(profile.department_id);
    am.position_id = Set(profile.position_id);
}

fn employee_to_active_model(employee: &Employee) -> employees::ActiveModel {
    let mut am = employees::ActiveModel {
        id: Set(employee.id.0),
        identity_id: Set(employee.identity_id.map(|i| i.0)),
        manager_id: Set(employee.manager_id.map(|m| m.0)),
        active: Set(employee.active),
        created_by: Set(employee.created_by.0),
        created_at: Set(employee.created_at),
        updated_by: Set(employee.updated_by.map(|i| i.0)),
        updated_at: Set(employee.updated_at),
        ..Default::default()
    };
    apply_profile(&mut am, &employee.profile);
    am
}

fn employee_from_model(model: employees::Model) -> Employee {
    Employee {
        id: EmployeeId(model.id),
        identity_id: model.identity_id.map(IdentityId),
        manager_id: model.manager_id.map(EmployeeId),
        profile: EmployeeProfile {
            first_name: model.first_name,
            last_name: model.last_name,
            identification_number: model.identification_number,
            birth_date: model.birth_date,
            phone: model.phone,
            address: model.address,
            gender: model.gender,
            department_id: model.department_id,
            position_id: model.position_id,
        },
        active: model.active,
        created_by: IdentityId(model.created_by),
        created_at: model.created_at,
        updated_by: model.updated_by.map(IdentityId),
        updated_at: model.updated_at,
    }
}

// ── Labor request repository ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbLaborRequestRepository {
    pub db: DatabaseConnection,
}

impl LaborRequestRepository for DbLaborRequestRepository {
    async fn find_by_id(
        &self,
        id: LaborRequestId,
    ) -> Result<Option<LaborRequest>, PersonnelServiceError> {
        let model = labor_requests::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find labor request by id")?;
        Ok(model.map(labor_request_from_model))
    }

    async fn list(
        &self,
        scope: &EmployeeScope,
        filter: &LaborRequestFilter,
        page: PageRequest,
    ) -> Result<(Vec<LaborRequest>, u64), PersonnelServiceError> {
        let mut query = labor_requests::Entity::find()
            .filter_scope(labor_requests::Column::EmployeeId, scope);
        if let Some(kind) = &filter.kind {
            query = query.filter(labor_requests::Column::Kind.eq(kind.as_str()));
        }
        if let Some(active) = filter.active {
            query = query.filter(labor_requests::Column::Active.eq(active));
        }
        if let Some(employee_id) = filter.employee_id {
            query = query.filter(labor_requests::Column::EmployeeId.eq(employee_id.0));
        }
        if let Some(search) = &filter.search {
            query = query.filter(contains_ci(labor_requests::Column::Motive, search));
        }
        let paginator = query
            .order_by_desc(labor_requests::Column::CreatedAt)
            .order_by_desc(labor_requests::Column::Id)
            .paginate(&self.db, u64::from(page.per_page));
        let total = paginator
            .num_items()
            .await
            .context("count labor requests")?;
        let models = paginator
            .fetch_page(page.index())
            .await
            .context("list labor requests")?;
        Ok((models.into_iter().map(labor_request_from_model).collect(), total))
    }

    async fn create(&self, request: &LaborRequest) -> Result<(), PersonnelServiceError> {
        let details = &request.details;
        labor_requests::ActiveModel {
            id: Set(request.id.0),
            employee_id: Set(request.employee_id.0),
            kind: Set(request.kind.as_str().to_owned()),
            motive: Set(details.motive.clone()),
            start_date: Set(details.start_date),
            end_date: Set(details.end_date),
            days_taken: Set(details.days_taken),
            leave_type: Set(details.leave_type.clone()),
            document_url: Set(details.document_url.clone()),
            notes: Set(details.notes.clone()),
            approved_by: Set(request.approved_by.map(|i| i.0)),
            approved_at: Set(request.approved_at),
            validated_by: Set(request.validated_by.map(|i| i.0)),
            validated_at: Set(request.validated_at),
            active: Set(request.active),
            created_by: Set(request.created_by.0),
            created_at: Set(request.created_at),
            updated_by: Set(request.updated_by.map(|i| i.0)),
            updated_at: Set(request.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create labor request")?;
        Ok(())
    }

    async fn update_details_if_pending(
        &self,
        id: LaborRequestId,
        details: &LaborRequestDetails,
        stamp: Stamp,
    ) -> Result<bool, PersonnelServiceError> {
        let result = guarded_edit(id, details, stamp)
            .exec(&self.db)
            .await
            .context("update pending labor request")?;
        Ok(result.rows_affected > 0)
    }

    async fn approve_if_pending(
        &self,
        id: LaborRequestId,
        stamp: Stamp,
    ) -> Result<bool, PersonnelServiceError> {
        let result = guarded_approval(id, stamp)
            .exec(&self.db)
            .await
            .context("approve labor request")?;
        Ok(result.rows_affected > 0)
    }

    async fn validate_if_approved(
        &self,
        id: LaborRequestId,
        stamp: Stamp,
    ) -> Result<bool, PersonnelServiceError> {
        let result = guarded_validation(id, stamp)
            .exec(&self.db)
            .await
            .context("validate labor request")?;
        Ok(result.rows_affected > 0)
    }

    async fn deactivate(
        &self,
        id: LaborRequestId,
        stamp: Stamp,
    ) -> Result<bool, PersonnelServiceError> {
        use labor_requests::Column;

        let result = labor_requests::Entity::update_many()
            .col_expr(Column::Active, Expr::value(false))
            .col_expr(Column::UpdatedBy, Expr::value(Some(stamp.by.0)))
            .col_expr(Column::UpdatedAt, Expr::value(Some(stamp.at)))
            .filter(Column::Id.eq(id.0))
            .exec(&self.db)
            .await
            .context("deactivate labor request")?;
        Ok(result.rows_affected > 0)
    }
}

/// Details change only while the request is pending and active.
fn guarded_edit(
    id: LaborRequestId,
    details: &LaborRequestDetails,
    stamp: Stamp,
) -> UpdateMany<labor_requests::Entity> {
    use labor_requests::Column;

    labor_requests::Entity::update_many()
        .col_expr(Column::Motive, Expr::value(details.motive.clone()))
        .col_expr(Column::StartDate, Expr::value(details.start_date))
        .col_expr(Column::EndDate, Expr::value(details.end_date))
        .col_expr(Column::DaysTaken, Expr::value(details.days_taken))
        .col_expr(Column::LeaveType, Expr::value(details.leave_type.clone()))
        .col_expr(Column::DocumentUrl, Expr::value(details.document_url.clone()))
        .col_expr(Column::Notes, Expr::value(details.notes.clone()))
        .col_expr(Column::UpdatedBy, Expr::value(Some(stamp.by.0)))
        .col_expr(Column::UpdatedAt, Expr::value(Some(stamp.at)))
        .filter(Column::Id.eq(id.0))
        .filter(Column::ApprovedBy.is_null())
        .filter(Column::Active.eq(true))
}

/// `UPDATE labor_requests SET approved_by = ? ... WHERE id = ? AND approved_by
/// IS NULL AND active`.
fn guarded_approval(id: LaborRequestId, stamp: Stamp) -> UpdateMany<labor_requests::Entity> {
    use labor_requests::Column;

    labor_requests::Entity::update_many()
        .col_expr(Column::ApprovedBy, Expr::value(Some(stamp.by.0)))
        .col_expr(Column::ApprovedAt, Expr::value(Some(stamp.at)))
        .filter(Column::Id.eq(id.0))
        .filter(Column::ApprovedBy.is_null())
        .filter(Column::Active.eq(true))
}

/// Validation needs an approval and no prior validation.
fn guarded_validation(id: LaborRequestId, stamp: Stamp) -> UpdateMany<labor_requests::Entity> {
    use labor_requests::Column;

    labor_requests::Entity::update_many()
        .col_expr(Column::ValidatedBy, Expr::value(Some(stamp.by.0)))
        .col_expr(Column::ValidatedAt, Expr::value(Some(stamp.at)))
        .filter(Column::Id.eq(id.0))
        .filter(Column::ApprovedBy.is_not_null())
        .filter(Column::ValidatedBy.is_null())
        .filter(Column::Active.eq(true))
}

fn labor_request_from_model(model: labor_requests::Model) -> LaborRequest {
    LaborRequest {
        id: LaborRequestId(model.id),
        employee_id: EmployeeId(model.employee_id),
        kind: LaborRequestKind::from_stored(model.kind),
        details: LaborRequestDetails {
            motive: model.motive,
            start_date: model.start_date,
            end_date: model.end_date,
            days_taken: model.days_taken,
            leave_type: model.leave_type,
            document_url: model.document_url,
            notes: model.notes,
        },
        approved_by: model.approved_by.map(IdentityId),
        approved_at: model.approved_at,
        validated_by: model.validated_by.map(IdentityId),
        validated_at: model.validated_at,
        active: model.active,
        created_by: IdentityId(model.created_by),
        created_at: model.created_at,
        updated_by: model.updated_by.map(IdentityId),
        updated_at: model.updated_at,
    }
}

// ── Contract repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbContractRepository {
    pub db: DatabaseConnection,
}

impl ContractRepository for DbContractRepository {
    async fn find_by_id(&self, id: ContractId) -> Result<Option<Contract>, PersonnelServiceError> {
        let model = contracts::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find contract by id")?;
        Ok(model.map(contract_from_model))
    }

    async fn list(
        &self,
        scope: &EmployeeScope,
        filter: &ContractFilter,
        page: PageRequest,
    ) -> Result<(Vec<Contract>, u64), PersonnelServiceError> {
        let mut query =
            contracts::Entity::find().filter_scope(contracts::Column::EmployeeId, scope);
        if let Some(active) = filter.active {
            query = query.filter(contracts::Column::Active.eq(active));
        }
        if let Some(employee_id) = filter.employee_id {
            query = query.filter(contracts::Column::EmployeeId.eq(employee_id.0));
        }
        if let Some(search) = &filter.search {
            query = query.filter(
                Condition::any()
                    .add(contains_ci(contracts::Column::ContractType, search))
                    .add(contains_ci(contracts::Column::Template, search)),
            );
        }
        let paginator = query
            .order_by_desc(contracts::Column::CreatedAt)
            .order_by_desc(contracts::Column::Id)
            .paginate(&self.db, u64::from(page.per_page));
        let total = paginator.num_items().await.context("count contracts")?;
        let models = paginator
            .fetch_page(page.index())
            .await
            .context("list contracts")?;
        Ok((models.into_iter().map(contract_from_model).collect(), total))
    }

    async fn create(&self, contract: &Contract) -> Result<(), PersonnelServiceError> {
        contract_to_active_model(contract)
            .insert(&self.db)
            .await
            .context("create contract")?;
        Ok(())
    }

    async fn update(
        &self,
        id: ContractId,
        terms: &ContractTerms,
        attachment: Option<&str>,
        stamp: Stamp,
    ) -> Result<bool, PersonnelServiceError> {
        use contracts::Column;

        let mut update = contracts::Entity::update_many()
            .col_expr(Column::ContractType, Expr::value(terms.contract_type.clone()))
            .col_expr(Column::StartDate, Expr::value(terms.start_date))
            .col_expr(Column::EndDate, Expr::value(terms.end_date))
            .col_expr(Column::Template, Expr::value(terms.template.clone()))
            .col_expr(Column::UpdatedBy, Expr::value(Some(stamp.by.0)))
            .col_expr(Column::UpdatedAt, Expr::value(Some(stamp.at)));
        if let Some(path) = attachment {
            update = update.col_expr(Column::Attachment, Expr::value(Some(path.to_owned())));
        }
        let result = update
            .filter(Column::Id.eq(id.0))
            .exec(&self.db)
            .await
            .context("update contract")?;
        Ok(result.rows_affected > 0)
    }

    async fn set_attachment(
        &self,
        id: ContractId,
        attachment: &str,
        stamp: Stamp,
    ) -> Result<bool, PersonnelServiceError> {
        use contracts::Column;

        let result = contracts::Entity::update_many()
            .col_expr(Column::Attachment, Expr::value(Some(attachment.to_owned())))
            .col_expr(Column::UpdatedBy, Expr::value(Some(stamp.by.0)))
            .col_expr(Column::UpdatedAt, Expr::value(Some(stamp.at)))
            .filter(Column::Id.eq(id.0))
            .exec(&self.db)
            .await
            .context("set contract attachment")?;
        Ok(result.rows_affected > 0)
    }

    async fn set_active(
        &self,
        id: ContractId,
        active: bool,
        stamp: Stamp,
    ) -> Result<bool, PersonnelServiceError> {
        use contracts::Column;

        let result = contracts::Entity::update_many()
            .col_expr(Column::Active, Expr::value(active))
            .col_expr(Column::UpdatedBy, Expr::value(Some(stamp.by.0)))
            .col_expr(Column::UpdatedAt, Expr::value(Some(stamp.at)))
            .filter(Column::Id.eq(id.0))
            .exec(&self.db)
            .await
            .context("set contract active")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete(&self, id: ContractId) -> Result<bool, PersonnelServiceError> {
        let result = contracts::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .context("delete contract")?;
        Ok(result.rows_affected > 0)
    }

    async fn renew(
        &self,
        id: ContractId,
        successor: &Contract,
        stamp: Stamp,
    ) -> Result<bool, PersonnelServiceError> {
        let successor = contract_to_active_model(successor);
        let renewed = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                Box::pin(async move {
                    use contracts::Column;

                    let retired = contracts::Entity::update_many()
                        .col_expr(Column::Active, Expr::value(false))
                        .col_expr(Column::UpdatedBy, Expr::value(Some(stamp.by.0)))
                        .col_expr(Column::UpdatedAt, Expr::value(Some(stamp.at)))
                        .filter(Column::Id.eq(id.0))
                        .filter(Column::Active.eq(true))
                        .exec(txn)
                        .await?;
                    if retired.rows_affected == 0 {
                        return Ok(false);
                    }
                    successor.insert(txn).await?;
                    Ok(true)
                })
            })
            .await
            .context("renew contract")?;
        Ok(renewed)
    }

    async fn statistics(
        &self,
        scope: &EmployeeScope,
        today: NaiveDate,
    ) -> Result<ContractStats, PersonnelServiceError> {
        use contracts::Column;

        let scoped = contracts::Entity::find().filter_scope(Column::EmployeeId, scope);
        let active = scoped.clone().filter(Column::Active.eq(true));

        let total = scoped.count(&self.db).await.context("count contracts")?;
        let active_count = active
            .clone()
            .count(&self.db)
            .await
            .context("count active contracts")?;
        let expiring_soon = active
            .clone()
            .filter(Column::EndDate.between(today, today + Duration::days(EXPIRY_WINDOW_DAYS)))
            .count(&self.db)
            .await
            .context("count expiring contracts")?;
        let expired = active
            .filter(Column::EndDate.lt(today))
            .count(&self.db)
            .await
            .context("count expired contracts")?;

        Ok(ContractStats {
            total,
            active: active_count,
            inactive: total.saturating_sub(active_count),
            expiring_soon,
            expired,
        })
    }
}

fn contract_to_active_model(contract: &Contract) -> contracts::ActiveModel {
    contracts::ActiveModel {
        id: Set(contract.id.0),
        employee_id: Set(contract.employee_id.0),
        contract_type: Set(contract.terms.contract_type.clone()),
        start_date: Set(contract.terms.start_date),
        end_date: Set(contract.terms.end_date),
        template: Set(contract.terms.template.clone()),
        attachment: Set(contract.attachment.clone()),
        active: Set(contract.active),
        created_by: Set(contract.created_by.0),
        created_at: Set(contract.created_at),
        updated_by: Set(contract.updated_by.map(|i| i.0)),
        updated_at: Set(contract.updated_at),
    }
}

fn contract_from_model(model: contracts::Model) -> Contract {
    Contract {
        id: ContractId(model.id),
        employee_id: EmployeeId(model.employee_id),
        terms: ContractTerms {
            contract_type: model.contract_type,
            start_date: model.start_date,
            end_date: model.end_date,
            template: model.template,
        },
        attachment: model.attachment,
        active: model.active,
        created_by: IdentityId(model.created_by),
        created_at: model.created_at,
        updated_by: model.updated_by.map(IdentityId),
        updated_at: model.updated_at,
    }
}

// ── Sanction repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSanctionRepository {
    pub db: DatabaseConnection,
}

impl SanctionRepository for DbSanctionRepository {
    async fn find_by_id(&self, id: SanctionId) -> Result<Option<Sanction>, PersonnelServiceError> {
        let model = sanctions::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find sanction by id")?;
        Ok(model.map(sanction_from_model))
    }

    async fn list(
        &self,
        scope: &EmployeeScope,
        filter: &SanctionFilter,
        page: PageRequest,
    ) -> Result<(Vec<Sanction>, u64), PersonnelServiceError> {
        use sanctions::Column;

        let mut query = sanctions::Entity::find().filter_scope(Column::EmployeeId, scope);
        if !filter.include_inactive {
            query = query.filter(Column::Active.eq(true));
        }
        if let Some(employee_id) = filter.employee_id {
            query = query.filter(Column::EmployeeId.eq(employee_id.0));
        }
        if let Some(search) = &filter.search {
            query = query.filter(
                Condition::any()
                    .add(contains_ci(Column::Name, search))
                    .add(contains_ci(Column::Description, search)),
            );
        }
        let paginator = query
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, u64::from(page.per_page));
        let total = paginator.num_items().await.context("count sanctions")?;
        let models = paginator
            .fetch_page(page.index())
            .await
            .context("list sanctions")?;
        Ok((models.into_iter().map(sanction_from_model).collect(), total))
    }

    async fn create(&self, sanction: &Sanction) -> Result<(), PersonnelServiceError> {
        sanctions::ActiveModel {
            id: Set(sanction.id.0),
            employee_id: Set(sanction.details.employee_id.0),
            name: Set(sanction.details.name.clone()),
            description: Set(sanction.details.description.clone()),
            active: Set(sanction.active),
            created_by: Set(sanction.created_by.0),
            created_at: Set(sanction.created_at),
            updated_by: Set(sanction.updated_by.map(|i| i.0)),
            updated_at: Set(sanction.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create sanction")?;
        Ok(())
    }

    async fn update(
        &self,
        id: SanctionId,
        details: &SanctionDetails,
        active: Option<bool>,
        stamp: Stamp,
    ) -> Result<bool, PersonnelServiceError> {
        use sanctions::Column;

        let mut update = sanctions::Entity::update_many()
            .col_expr(Column::EmployeeId, Expr::value(details.employee_id.0))
            .col_expr(Column::Name, Expr::value(details.name.clone()))
            .col_expr(Column::Description, Expr::value(details.description.clone()))
            .col_expr(Column::UpdatedBy, Expr::value(Some(stamp.by.0)))
            .col_expr(Column::UpdatedAt, Expr::value(Some(stamp.at)));
        if let Some(active) = active {
            update = update.col_expr(Column::Active, Expr::value(active));
        }
        let result = update
            .filter(Column::Id.eq(id.0))
            .exec(&self.db)
            .await
            .context("update sanction")?;
        Ok(result.rows_affected > 0)
    }

    async fn deactivate(&self, id: SanctionId, stamp: Stamp) -> Result<bool, PersonnelServiceError> {
        use sanctions::Column;

        let result = sanctions::Entity::update_many()
            .col_expr(Column::Active, Expr::value(false))
            .col_expr(Column::UpdatedBy, Expr::value(Some(stamp.by.0)))
            .col_expr(Column::UpdatedAt, Expr::value(Some(stamp.at)))
            .filter(Column::Id.eq(id.0))
            .exec(&self.db)
            .await
            .context("deactivate sanction")?;
        Ok(result.rows_affected > 0)
    }
}

fn sanction_from_model(model: sanctions::Model) -> Sanction {
    Sanction {
        id: SanctionId(model.id),
        details: SanctionDetails {
            employee_id: EmployeeId(model.employee_id),
            name: model.name,
            description: model.description,
        },
        active: model.active,
        created_by: IdentityId(model.created_by),
        created_at: model.created_at,
        updated_by: model.updated_by.map(IdentityId),
        updated_at: model.updated_at,
    }
}
