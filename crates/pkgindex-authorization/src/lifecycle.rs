//! Lifecycle rules for project permissions
//!
//! Maps a project's [`LifecycleState`] and a user's [`RoleLevel`] to the
//! permissions that user effectively holds, and decides whether trusted
//! publishers may act on the project at all. Transitions between states are
//! driven elsewhere; only the current state matters here.

use pkgindex_core::{LifecycleState, Permission, PermissionSet, ProjectRoleName};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse permission level a user holds on a project.
///
/// Variant order is the lexical order of the level names, which is the
/// ACL sort order: `Administer` sorts before `Upload`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoleLevel {
    /// Owners: read, upload and change settings
    Administer,
    /// Maintainers: upload only
    Upload,
}

impl RoleLevel {
    /// Level conferred by a project role, direct or through a team.
    pub fn for_role(role_name: ProjectRoleName) -> Self {
        match role_name {
            ProjectRoleName::Owner => Self::Administer,
            ProjectRoleName::Maintainer => Self::Upload,
        }
    }

    /// Level name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Administer => "Administer",
            Self::Upload => "Upload",
        }
    }

    /// Whether this level covers everything `other` grants.
    pub fn dominates(&self, other: RoleLevel) -> bool {
        matches!((self, other), (Self::Administer, _) | (Self::Upload, Self::Upload))
    }
}

impl fmt::Display for RoleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permissions a user at `level` holds on a project in `state`.
///
/// Quarantine is decided before the level branch and withholds Write from
/// administrators. Archived states strip Upload from whatever the level
/// branch produced. An empty result means the user gets no entry.
pub fn effective_permissions(state: LifecycleState, level: RoleLevel) -> PermissionSet {
    let mut permissions = match (state, level) {
        (LifecycleState::QuarantineEnter, RoleLevel::Administer) => {
            PermissionSet::from_permissions([Permission::ProjectsRead, Permission::ProjectsUpload])
        }
        (_, RoleLevel::Administer) => PermissionSet::from_permissions([
            Permission::ProjectsRead,
            Permission::ProjectsUpload,
            Permission::ProjectsWrite,
        ]),
        (_, RoleLevel::Upload) => PermissionSet::from_permissions([Permission::ProjectsUpload]),
    };

    if strips_upload(state) {
        permissions.remove(Permission::ProjectsUpload);
    }
    permissions
}

/// Whether OIDC publishers bound to the project receive upload grants.
pub fn admits_publishers(state: LifecycleState) -> bool {
    !strips_upload(state)
}

fn strips_upload(state: LifecycleState) -> bool {
    match state {
        LifecycleState::Archived | LifecycleState::ArchivedNoindex => true,
        LifecycleState::Active | LifecycleState::QuarantineEnter | LifecycleState::QuarantineExit => {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [LifecycleState; 5] = [
        LifecycleState::Active,
        LifecycleState::QuarantineEnter,
        LifecycleState::QuarantineExit,
        LifecycleState::Archived,
        LifecycleState::ArchivedNoindex,
    ];

    fn set(permissions: &[Permission]) -> PermissionSet {
        PermissionSet::from_permissions(permissions.iter().copied())
    }

    #[test]
    fn test_level_order_is_lexical() {
        assert!(RoleLevel::Administer < RoleLevel::Upload);
        assert!(RoleLevel::Administer.as_str() < RoleLevel::Upload.as_str());
    }

    #[test]
    fn test_role_to_level() {
        assert_eq!(RoleLevel::for_role(ProjectRoleName::Owner), RoleLevel::Administer);
        assert_eq!(RoleLevel::for_role(ProjectRoleName::Maintainer), RoleLevel::Upload);
    }

    #[test]
    fn test_effect_table() {
        use Permission::*;
        for state in [LifecycleState::Active, LifecycleState::QuarantineExit] {
            assert_eq!(
                effective_permissions(state, RoleLevel::Administer),
                set(&[ProjectsRead, ProjectsUpload, ProjectsWrite])
            );
            assert_eq!(
                effective_permissions(state, RoleLevel::Upload),
                set(&[ProjectsUpload])
            );
        }

        assert_eq!(
            effective_permissions(LifecycleState::QuarantineEnter, RoleLevel::Administer),
            set(&[ProjectsRead, ProjectsUpload])
        );
        assert_eq!(
            effective_permissions(LifecycleState::QuarantineEnter, RoleLevel::Upload),
            set(&[ProjectsUpload])
        );

        for state in [LifecycleState::Archived, LifecycleState::ArchivedNoindex] {
            assert_eq!(
                effective_permissions(state, RoleLevel::Administer),
                set(&[ProjectsRead, ProjectsWrite])
            );
            assert!(effective_permissions(state, RoleLevel::Upload).is_empty());
        }
    }

    #[test]
    fn test_publisher_eligibility() {
        for state in ALL_STATES {
            assert_eq!(admits_publishers(state), !state.is_archived());
        }
    }

    #[test]
    fn test_administer_dominates_upload() {
        assert!(RoleLevel::Administer.dominates(RoleLevel::Upload));
        assert!(RoleLevel::Administer.dominates(RoleLevel::Administer));
        assert!(!RoleLevel::Upload.dominates(RoleLevel::Administer));
        for state in ALL_STATES {
            let admin = effective_permissions(state, RoleLevel::Administer);
            for permission in effective_permissions(state, RoleLevel::Upload).iter() {
                assert!(admin.contains(permission), "{state}: {permission}");
            }
        }
    }
}
