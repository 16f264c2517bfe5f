use sea_orm_migration::prelude::*;

mod m20250301_000001_create_identities;
mod m20250301_000002_create_employees;
mod m20250301_000003_create_labor_requests;
mod m20250301_000004_create_contracts;
mod m20250301_000005_add_employee_indexes;
mod m20250301_000006_create_sanctions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_identities::Migration),
            Box::new(m20250301_000002_create_employees::Migration),
            Box::new(m20250301_000003_create_labor_requests::Migration),
            Box::new(m20250301_000004_create_contracts::Migration),
            Box::new(m20250301_000005_add_employee_indexes::Migration),
            Box::new(m20250301_000006_create_sanctions::Migration),
        ]
    }
}
