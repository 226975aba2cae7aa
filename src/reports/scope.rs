//! Which projects a user may see in a given report.

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

use super::error::ReportError;
use super::kinds::ReportType;
use crate::auth::{consts, permission_matches, AuthUser};
use crate::entities::{project_assignment, user_permission};

/// Projects whose rows a report may include.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "project_ids", rename_all = "snake_case")]
pub enum ProjectScope {
    /// Every row, including rows not attached to any project
    All,
    /// Only rows of these projects
    Projects(BTreeSet<i32>),
}

impl ProjectScope {
    pub fn single(project_id: i32) -> Self {
        ProjectScope::Projects(BTreeSet::from([project_id]))
    }

    pub fn project_ids(&self) -> Option<&BTreeSet<i32>> {
        match self {
            ProjectScope::All => None,
            ProjectScope::Projects(ids) => Some(ids),
        }
    }
}

/// A `user_permissions` row, reduced to what scoping needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionGrant {
    /// `None` applies to every assigned project
    pub project_id: Option<i32>,
    pub permission: String,
}

/// Everything that decides a user's report visibility.
#[derive(Debug, Clone, Default)]
pub struct UserGrants {
    pub role: String,
    pub unrestricted: bool,
    pub assigned: BTreeSet<i32>,
    pub grants: Vec<PermissionGrant>,
}

impl UserGrants {
    /// Loads assignments and explicit grants for an authenticated user.
    pub async fn load<C>(db: &C, user: &AuthUser) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if user.is_general_admin() {
            return Ok(Self {
                role: user.role.clone(),
                unrestricted: true,
                ..Default::default()
            });
        }

        let assigned: Vec<i32> = project_assignment::Entity::find()
            .select_only()
            .column(project_assignment::Column::ProjectId)
            .filter(project_assignment::Column::UserId.eq(user.user_id))
            .into_tuple()
            .all(db)
            .await?;

        let rows: Vec<(Option<i32>, String)> = user_permission::Entity::find()
            .select_only()
            .column(user_permission::Column::ProjectId)
            .column(user_permission::Column::Permission)
            .filter(user_permission::Column::UserId.eq(user.user_id))
            .into_tuple()
            .all(db)
            .await?;

        let unrestricted = rows
            .iter()
            .any(|(project, perm)| project.is_none() && perm.trim() == consts::ALL);

        debug!(
            user_id = user.user_id,
            assignments = assigned.len(),
            grants = rows.len(),
            "Loaded report grants"
        );

        Ok(Self {
            role: user.role.clone(),
            unrestricted,
            assigned: assigned.into_iter().collect(),
            grants: rows
                .into_iter()
                .map(|(project_id, permission)| PermissionGrant {
                    project_id,
                    permission,
                })
                .collect(),
        })
    }

    fn role_grants(&self, permission: &str) -> bool {
        crate::auth::RbacService::new().role_grants(&self.role, permission)
    }

    /// Projects on which `permission` is held.
    ///
    /// Role grants and unscoped rows cover the assigned projects; a row bound
    /// to a project covers that project even without an assignment.
    pub fn projects_with(&self, permission: &str) -> BTreeSet<i32> {
        let mut allowed = BTreeSet::new();

        let covers_assigned = self.role_grants(permission)
            || self
                .grants
                .iter()
                .any(|g| g.project_id.is_none() && permission_matches(&g.permission, permission));
        if covers_assigned {
            allowed.extend(self.assigned.iter().copied());
        }

        allowed.extend(
            self.grants
                .iter()
                .filter(|g| permission_matches(&g.permission, permission))
                .filter_map(|g| g.project_id),
        );

        allowed
    }

    /// Resolves the scope for `report_type`, optionally narrowed to one project.
    pub fn resolve_scope(
        &self,
        report_type: ReportType,
        requested_project: Option<i32>,
    ) -> Result<ProjectScope, ReportError> {
        if self.unrestricted {
            return Ok(requested_project
                .map(ProjectScope::single)
                .unwrap_or(ProjectScope::All));
        }

        let allowed = self.projects_with(report_type.read_permission());

        match requested_project {
            Some(project_id) if allowed.contains(&project_id) => {
                Ok(ProjectScope::single(project_id))
            }
            Some(project_id) => Err(ReportError::ProjectForbidden(project_id)),
            None if allowed.is_empty() => Err(ReportError::ReportForbidden {
                report: report_type.slug(),
            }),
            None => Ok(ProjectScope::Projects(allowed)),
        }
    }

    /// File exports need the export permission on every project in scope.
    pub fn can_export(&self, scope: &ProjectScope) -> bool {
        if self.unrestricted {
            return true;
        }
        match scope {
            ProjectScope::All => false,
            ProjectScope::Projects(ids) => {
                let exportable = self.projects_with(consts::REPORTS_EXPORT);
                ids.is_subset(&exportable)
            }
        }
    }

    /// Report types the user can open on at least one project.
    pub fn readable_report_types(&self) -> Vec<ReportType> {
        ReportType::all()
            .filter(|rt| self.unrestricted || !self.projects_with(rt.read_permission()).is_empty())
            .collect()
    }
}
