use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .table(Employees::Table)
                    .col(Employees::ManagerId)
                    .name("idx_employees_manager_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Employees::Table)
                    .col(Employees::Active)
                    .col(Employees::LastName)
                    .name("idx_employees_active_last_name")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_employees_active_last_name")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(Index::drop().name("idx_employees_manager_id").to_owned())
            .await
    }
}

#[derive(Iden)]
enum Employees {
    Table,
    ManagerId,
    Active,
    LastName,
}
