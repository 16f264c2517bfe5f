use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Sanctions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sanctions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Sanctions::EmployeeId).uuid().not_null())
                    .col(ColumnDef::new(Sanctions::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Sanctions::Description).text())
                    .col(
                        ColumnDef::new(Sanctions::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Sanctions::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(Sanctions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Sanctions::UpdatedBy).uuid())
                    .col(ColumnDef::new(Sanctions::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Sanctions::Table, Sanctions::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Sanctions::Table)
                    .col(Sanctions::EmployeeId)
                    .name("idx_sanctions_employee_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Sanctions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Sanctions {
    Table,
    Id,
    EmployeeId,
    Name,
    Description,
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
