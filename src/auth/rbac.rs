/*!
 * # Role-Based Access Control (RBAC) Module
 *
 * Static role table. Role grants apply to every project a user is assigned
 * to; per-project grants live in the `user_permissions` table.
 */

use super::permissions::{consts, permission_matches};
use lazy_static::lazy_static;
use std::collections::HashMap;

/// Role that bypasses project scoping entirely
pub const GENERAL_ADMIN: &str = "general_admin";
pub const PROJECT_MANAGER: &str = "project_manager";
pub const VETERINARIAN: &str = "veterinarian";
pub const TRAINER: &str = "trainer";
pub const VIEWER: &str = "viewer";

/// Role definition with associated permissions
#[derive(Debug, Clone)]
pub struct Role {
    pub name: &'static str,
    pub description: &'static str,
    pub permissions: Vec<&'static str>,
}

lazy_static! {
    pub static ref ROLES: HashMap<&'static str, Role> = {
        let mut roles = HashMap::new();

        roles.insert(
            GENERAL_ADMIN,
            Role {
                name: GENERAL_ADMIN,
                description: "Organisation-wide administrator",
                permissions: vec![consts::ALL],
            },
        );

        roles.insert(
            PROJECT_MANAGER,
            Role {
                name: PROJECT_MANAGER,
                description: "Runs one or more projects; sees every report for them",
                permissions: vec![consts::REPORTS_ALL],
            },
        );

        roles.insert(
            VETERINARIAN,
            Role {
                name: VETERINARIAN,
                description: "Clinical staff",
                permissions: vec![
                    consts::REPORTS_VETERINARY_READ,
                    consts::REPORTS_CHECKUP_READ,
                    consts::REPORTS_EXPORT,
                ],
            },
        );

        roles.insert(
            TRAINER,
            Role {
                name: TRAINER,
                description: "Handlers and trainers",
                permissions: vec![
                    consts::REPORTS_TRAINING_READ,
                    consts::REPORTS_FEEDING_READ,
                ],
            },
        );

        // Viewers only see what user_permissions rows grant them
        roles.insert(
            VIEWER,
            Role {
                name: VIEWER,
                description: "Read access through explicit grants only",
                permissions: vec![],
            },
        );

        roles
    };
}

/// RBAC lookups over the static role table
#[derive(Clone, Debug, Default)]
pub struct RbacService;

impl RbacService {
    pub fn new() -> Self {
        Self
    }

    /// Whether the role alone grants `required`
    pub fn role_grants(&self, role_name: &str, required: &str) -> bool {
        ROLES
            .get(role_name)
            .map(|role| {
                role.permissions
                    .iter()
                    .any(|granted| permission_matches(granted, required))
            })
            .unwrap_or(false)
    }

    /// Roles that see every project regardless of assignments
    pub fn is_unrestricted(&self, role_name: &str) -> bool {
        role_name == GENERAL_ADMIN || self.role_grants(role_name, consts::ALL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_admin_is_unrestricted() {
        let rbac = RbacService::new();
        assert!(rbac.is_unrestricted(GENERAL_ADMIN));
        assert!(!rbac.is_unrestricted(PROJECT_MANAGER));
        assert!(!rbac.is_unrestricted("unknown"));
    }

    #[test]
    fn role_grants_follow_wildcards() {
        let rbac = RbacService::new();
        assert!(rbac.role_grants(PROJECT_MANAGER, consts::REPORTS_FEEDING_READ));
        assert!(rbac.role_grants(PROJECT_MANAGER, consts::REPORTS_EXPORT));
        assert!(rbac.role_grants(VETERINARIAN, consts::REPORTS_CHECKUP_READ));
        assert!(!rbac.role_grants(VETERINARIAN, consts::REPORTS_TRAINING_READ));
        assert!(!rbac.role_grants(TRAINER, consts::REPORTS_EXPORT));
        assert!(!rbac.role_grants(VIEWER, consts::REPORTS_VETERINARY_READ));
    }
}
