use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Select};

use hrm_domain::scope::EmployeeScope;

/// Push an [`EmployeeScope`] down into a query as a filter on the column that
/// holds the employee id.
pub trait ScopeFilter {
    fn filter_scope<C: ColumnTrait>(self, column: C, scope: &EmployeeScope) -> Self;
}

impl<E> ScopeFilter for Select<E>
where
    E: EntityTrait,
{
    fn filter_scope<C: ColumnTrait>(self, column: C, scope: &EmployeeScope) -> Self {
        match scope {
            EmployeeScope::All => self,
            // An empty IN list renders as a false predicate, which is what an
            // empty scope means.
            EmployeeScope::Only(ids) => self.filter(column.is_in(ids.iter().map(|id| id.0))),
        }
    }
}
