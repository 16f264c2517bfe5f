use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LaborRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LaborRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LaborRequests::EmployeeId).uuid().not_null())
                    .col(ColumnDef::new(LaborRequests::Kind).string().not_null())
                    .col(ColumnDef::new(LaborRequests::Motive).text().not_null())
                    .col(ColumnDef::new(LaborRequests::StartDate).date().not_null())
                    .col(ColumnDef::new(LaborRequests::EndDate).date())
                    .col(ColumnDef::new(LaborRequests::DaysTaken).integer())
                    .col(ColumnDef::new(LaborRequests::LeaveType).string())
                    .col(ColumnDef::new(LaborRequests::DocumentUrl).string())
                    .col(ColumnDef::new(LaborRequests::Notes).text())
                    .col(ColumnDef::new(LaborRequests::ApprovedBy).uuid())
                    .col(ColumnDef::new(LaborRequests::ApprovedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(LaborRequests::ValidatedBy).uuid())
                    .col(ColumnDef::new(LaborRequests::ValidatedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(LaborRequests::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(LaborRequests::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(LaborRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(LaborRequests::UpdatedBy).uuid())
                    .col(ColumnDef::new(LaborRequests::UpdatedAt).timestamp_with_time_zone())
                    // validated implies approved
                    .check(
                        Expr::col(LaborRequests::ValidatedBy)
                            .is_null()
                            .or(Expr::col(LaborRequests::ApprovedBy).is_not_null()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(LaborRequests::Table, LaborRequests::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(LaborRequests::Table)
                    .col(LaborRequests::EmployeeId)
                    .name("idx_labor_requests_employee_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LaborRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum LaborRequests {
    Table,
    Id,
    EmployeeId,
    Kind,
    Motive,
    StartDate,
    EndDate,
    DaysTaken,
    LeaveType,
    DocumentUrl,
    Notes,
    ApprovedBy,
    ApprovedAt,
    ValidatedBy,
    ValidatedAt,
    Active,
    CreatedBy,
    CreatedAt,
    UpdatedBy,
    UpdatedAt,
}

#[derive(Iden)]
enum Employees {
    Table,
    Id,
}
