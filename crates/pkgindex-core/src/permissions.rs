//! Permission vocabulary and ordered permission sets

use serde::{Deserialize, Serialize};
use std::fmt;

/// Individual permission a principal may be granted on a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    /// See the admin dashboard sidebar
    #[serde(rename = "admin:dashboard-sidebar:read")]
    AdminDashboardSidebarRead,
    /// Read observations filed against the project
    #[serde(rename = "admin:observations:read")]
    AdminObservationsRead,
    /// Act on observations filed against the project
    #[serde(rename = "admin:observations:write")]
    AdminObservationsWrite,
    /// Prohibit project names
    #[serde(rename = "admin:prohibited-project-names:write")]
    AdminProhibitedProjectsWrite,
    /// Prohibit usernames
    #[serde(rename = "admin:prohibited-usernames:write")]
    AdminProhibitedUsernameWrite,
    /// Delete the project
    #[serde(rename = "admin:projects:delete")]
    AdminProjectsDelete,
    /// Read project administration pages
    #[serde(rename = "admin:projects:read")]
    AdminProjectsRead,
    /// Change upload and total size limits
    #[serde(rename = "admin:projects:set-limit")]
    AdminProjectsSetLimit,
    /// Change project administrative state
    #[serde(rename = "admin:projects:write")]
    AdminProjectsWrite,
    /// Add collaborator roles as an administrator
    #[serde(rename = "admin:role:add")]
    AdminRoleAdd,
    /// Remove collaborator roles as an administrator
    #[serde(rename = "admin:role:delete")]
    AdminRoleDelete,
    /// File observations through the API
    #[serde(rename = "api:observations:add")]
    APIObservationsAdd,
    /// Report the project as malware
    #[serde(rename = "observations:submit-malware")]
    SubmitMalwareObservation,
    /// Read project settings
    #[serde(rename = "projects:read")]
    ProjectsRead,
    /// Upload new files and releases
    #[serde(rename = "projects:upload")]
    ProjectsUpload,
    /// Change project settings and collaborators
    #[serde(rename = "projects:write")]
    ProjectsWrite,
}

impl Permission {
    /// Stable string name, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdminDashboardSidebarRead => "admin:dashboard-sidebar:read",
            Self::AdminObservationsRead => "admin:observations:read",
            Self::AdminObservationsWrite => "admin:observations:write",
            Self::AdminProhibitedProjectsWrite => "admin:prohibited-project-names:write",
            Self::AdminProhibitedUsernameWrite => "admin:prohibited-usernames:write",
            Self::AdminProjectsDelete => "admin:projects:delete",
            Self::AdminProjectsRead => "admin:projects:read",
            Self::AdminProjectsSetLimit => "admin:projects:set-limit",
            Self::AdminProjectsWrite => "admin:projects:write",
            Self::AdminRoleAdd => "admin:role:add",
            Self::AdminRoleDelete => "admin:role:delete",
            Self::APIObservationsAdd => "api:observations:add",
            Self::SubmitMalwareObservation => "observations:submit-malware",
            Self::ProjectsRead => "projects:read",
            Self::ProjectsUpload => "projects:upload",
            Self::ProjectsWrite => "projects:write",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Insertion-ordered set of permissions.
///
/// Order is part of the ACL's observable output, so this is a vector with
/// set semantics rather than a hash set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(Vec<Permission>);

impl PermissionSet {
    /// Empty set
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Build from a list, dropping repeated entries but keeping first positions.
    pub fn from_permissions(permissions: impl IntoIterator<Item = Permission>) -> Self {
        let mut set = Self::new();
        for permission in permissions {
            set.insert(permission);
        }
        set
    }

    /// Append a permission if not already present. Returns whether it was added.
    pub fn insert(&mut self, permission: Permission) -> bool {
        if self.contains(permission) {
            return false;
        }
        self.0.push(permission);
        true
    }

    /// Remove a permission. Returns whether it was present.
    pub fn remove(&mut self, permission: Permission) -> bool {
        let before = self.0.len();
        self.0.retain(|p| *p != permission);
        self.0.len() != before
    }

    /// Membership test
    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of permissions
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }

    /// Borrow as a slice
    pub fn as_slice(&self) -> &[Permission] {
        &self.0
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self::from_permissions(iter)
    }
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, permission) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{permission}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_first_position() {
        let set = PermissionSet::from_permissions([
            Permission::ProjectsRead,
            Permission::ProjectsUpload,
            Permission::ProjectsRead,
        ]);
        assert_eq!(
            set.as_slice(),
            &[Permission::ProjectsRead, Permission::ProjectsUpload]
        );
    }

    #[test]
    fn test_remove() {
        let mut set: PermissionSet = [Permission::ProjectsUpload].into_iter().collect();
        assert!(set.remove(Permission::ProjectsUpload));
        assert!(!set.remove(Permission::ProjectsUpload));
        assert!(set.is_empty());
    }

    #[test]
    fn test_serialized_name_matches_as_str() {
        let json = serde_json::to_string(&Permission::ProjectsUpload).unwrap();
        assert_eq!(json, "\"projects:upload\"");
        let json = serde_json::to_string(&Permission::SubmitMalwareObservation).unwrap();
        assert_eq!(
            json,
            format!("\"{}\"", Permission::SubmitMalwareObservation.as_str())
        );
    }

    #[test]
    fn test_display_set() {
        let set = PermissionSet::from_permissions([
            Permission::ProjectsRead,
            Permission::ProjectsWrite,
        ]);
        assert_eq!(set.to_string(), "{projects:read, projects:write}");
    }
}
