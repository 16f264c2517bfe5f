use sea_orm::entity::prelude::*;

/// Employee record. `manager_id` points back into this table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub identity_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub identification_number: String,
    pub birth_date: Option<Date>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub department_id: Option<i32>,
    pub position_id: Option<i32>,
    pub active: bool,
    pub created_by: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_by: Option<Uuid>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::identities::Entity",
        from = "Column::IdentityId",
        to = "super::identities::Column::Id"
    )]
    Identity,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ManagerId",
        to = "Column::Id"
    )]
    Manager,
    #[sea_orm(has_many = "super::labor_requests::Entity")]
    LaborRequests,
    #[sea_orm(has_many = "super::contracts::Entity")]
    Contracts,
}

impl Related<super::identities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Identity.def()
    }
}

impl Related<super::labor_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LaborRequests.def()
    }
}

impl Related<super::contracts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contracts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
