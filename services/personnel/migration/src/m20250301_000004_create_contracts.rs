use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Contracts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Contracts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Contracts::EmployeeId).uuid().not_null())
                    .col(ColumnDef::new(Contracts::ContractType).string().not_null())
                    .col(ColumnDef::new(Contracts::StartDate).date().not_null())
                    .col(ColumnDef::new(Contracts::EndDate).date())
                    .col(ColumnDef::new(Contracts::Template).text())
                    .col(ColumnDef::new(Contracts::Attachment).string())
                    .col(
                        ColumnDef::new(Contracts::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Contracts::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(Contracts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Contracts::UpdatedBy).uuid())
                    .col(ColumnDef::new(Contracts::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Contracts::Table, Contracts::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Contracts::Table)
                    .col(Contracts::EmployeeId)
                    .name("idx_contracts_employee_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Contracts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Contracts {
    Table,
    Id,
    EmployeeId,
    ContractType,
    StartDate,
    EndDate,
    Template,
    Attachment,
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
