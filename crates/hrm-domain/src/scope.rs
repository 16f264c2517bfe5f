//! Access scope: the set of employees an actor may view or act upon.

use std::collections::BTreeSet;

use crate::actor::Actor;
use crate::id::EmployeeId;
use crate::role::Capability;

/// Employee-id predicate produced by the scope resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmployeeScope {
    /// Matches every employee.
    All,
    /// Matches exactly these ids. Empty denies everything.
    Only(BTreeSet<EmployeeId>),
}

impl EmployeeScope {
    pub fn none() -> Self {
        Self::Only(BTreeSet::new())
    }

    pub fn contains(&self, id: EmployeeId) -> bool {
        match self {
            Self::All => true,
            Self::Only(ids) => ids.contains(&id),
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Returns the manager whose direct reports must be loaded before
    /// [`EmployeeScope::resolve`] can run, if any.
    pub fn reports_needed_for(actor: &Actor) -> Option<EmployeeId> {
        if actor.can(Capability::ViewAllEmployees) {
            return None;
        }
        actor
            .employee_id
            .filter(|_| actor.can(Capability::ViewDirectReports))
    }

    /// Resolve the scope of `actor`. `direct_reports` are the active employees
    /// whose manager is the actor's linked employee; ignored unless the role
    /// may see direct reports. One level only, never the transitive subtree.
    pub fn resolve(actor: &Actor, direct_reports: impl IntoIterator<Item = EmployeeId>) -> Self {
        if actor.can(Capability::ViewAllEmployees) {
            return Self::All;
        }
        let Some(own) = actor.employee_id else {
            return Self::none();
        };
        let mut ids = BTreeSet::from([own]);
        if actor.can(Capability::ViewDirectReports) {
            ids.extend(direct_reports);
        }
        Self::Only(ids)
    }
}
