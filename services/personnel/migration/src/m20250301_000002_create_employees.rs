use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Employees::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Employees::IdentityId).uuid().unique_key())
                    .col(ColumnDef::new(Employees::ManagerId).uuid())
                    .col(ColumnDef::new(Employees::FirstName).string().not_null())
                    .col(ColumnDef::new(Employees::LastName).string().not_null())
                    .col(
                        ColumnDef::new(Employees::IdentificationNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Employees::BirthDate).date())
                    .col(ColumnDef::new(Employees::Phone).string())
                    .col(ColumnDef::new(Employees::Address).string())
                    .col(ColumnDef::new(Employees::Gender).string())
                    .col(ColumnDef::new(Employees::DepartmentId).integer())
                    .col(ColumnDef::new(Employees::PositionId).integer())
                    .col(
                        ColumnDef::new(Employees::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Employees::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(Employees::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Employees::UpdatedBy).uuid())
                    .col(ColumnDef::new(Employees::UpdatedAt).timestamp_with_time_zone())
                    .check(
                        Expr::col(Employees::ManagerId)
                            .is_null()
                            .or(Expr::col(Employees::ManagerId).ne(Expr::col(Employees::Id))),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Employees::Table, Employees::IdentityId)
                            .to(Identities::Table, Identities::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Employees::Table, Employees::ManagerId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Employees::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Employees {
    Table,
    Id,
    IdentityId,
    ManagerId,
    FirstName,
    LastName,
    IdentificationNumber,
    BirthDate,
    Phone,
    Address,
    Gender,
    DepartmentId,
    PositionId,
    Active,
    CreatedBy,
    CreatedAt,
    UpdatedBy,
    UpdatedAt,
}

#[derive(Iden)]
enum Identities {
    Table,
    Id,
}
