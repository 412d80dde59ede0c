//! Project ACL resolution
//!
//! [`resolve`] is the pure core: a project record plus an already-fetched
//! [`IdentitySnapshot`] in, an ordered [`Acl`] out. [`PermissionResolver`]
//! wraps it for callers that hold an [`IdentitySource`] and want the fetch
//! done for them.
//!
//! Output order:
//! 1. fixed group grants (`group:admins`, `group:moderators`,
//!    `group:observers`, `Authenticated`)
//! 2. `oidc:<id>` upload grants, unless the project is archived
//! 3. `user:<id>` grants sorted by (level, user id)

use crate::acl::Acl;
use crate::identity::{IdentitySnapshot, IdentitySource};
use crate::lifecycle::{admits_publishers, effective_permissions, RoleLevel};
use crate::principal::{Group, Principal};
use pkgindex_core::{Permission, PermissionSet, PkgIndexResult, ProjectRecord, UserId};
use std::collections::{BTreeMap, BTreeSet};

/// Permissions granted to `group:admins` on every project.
pub const ADMIN_PERMISSIONS: [Permission; 11] = [
    Permission::AdminDashboardSidebarRead,
    Permission::AdminObservationsRead,
    Permission::AdminObservationsWrite,
    Permission::AdminProhibitedProjectsWrite,
    Permission::AdminProhibitedUsernameWrite,
    Permission::AdminProjectsDelete,
    Permission::AdminProjectsRead,
    Permission::AdminProjectsSetLimit,
    Permission::AdminProjectsWrite,
    Permission::AdminRoleAdd,
    Permission::AdminRoleDelete,
];

/// Permissions granted to `group:moderators` on every project.
pub const MODERATOR_PERMISSIONS: [Permission; 7] = [
    Permission::AdminDashboardSidebarRead,
    Permission::AdminObservationsRead,
    Permission::AdminObservationsWrite,
    Permission::AdminProjectsRead,
    Permission::AdminProjectsSetLimit,
    Permission::AdminRoleAdd,
    Permission::AdminRoleDelete,
];

fn push_fixed_grants(acl: &mut Acl) {
    acl.push(
        Principal::Group(Group::Admins),
        PermissionSet::from_permissions(ADMIN_PERMISSIONS),
    );
    acl.push(
        Principal::Group(Group::Moderators),
        PermissionSet::from_permissions(MODERATOR_PERMISSIONS),
    );
    acl.push(
        Principal::Group(Group::Observers),
        PermissionSet::from_permissions([Permission::APIObservationsAdd]),
    );
    acl.push(
        Principal::Authenticated,
        PermissionSet::from_permissions([Permission::SubmitMalwareObservation]),
    );
}

/// Merge every source into one level per user, Administer winning over Upload.
///
/// Returned pairs are sorted by (level, user id).
pub fn role_levels(identities: &IdentitySnapshot) -> Vec<(RoleLevel, UserId)> {
    let mut levels: BTreeMap<UserId, RoleLevel> = BTreeMap::new();
    let mut raise = |user_id: UserId, level: RoleLevel| {
        levels
            .entry(user_id)
            .and_modify(|current| {
                if level.dominates(*current) {
                    *current = level;
                }
            })
            .or_insert(level);
    };

    for role in &identities.roles {
        raise(role.user_id, RoleLevel::for_role(role.role_name));
    }
    for grant in &identities.team_roles {
        raise(grant.user_id, RoleLevel::for_role(grant.role_name));
    }
    for user_id in &identities.organization_owners {
        raise(*user_id, RoleLevel::Administer);
    }

    let pairs: BTreeSet<(RoleLevel, UserId)> = levels
        .into_iter()
        .map(|(user_id, level)| (level, user_id))
        .collect();
    pairs.into_iter().collect()
}

/// Compute the ordered ACL for `project` from a fetched identity snapshot.
///
/// Total over well-formed input. The same inputs always yield the same ACL,
/// entry for entry.
pub fn resolve(project: &ProjectRecord, identities: &IdentitySnapshot) -> Acl {
    let state = project.lifecycle();
    let mut acl = Acl::new();
    push_fixed_grants(&mut acl);

    if admits_publishers(state) {
        let publishers: BTreeSet<_> = identities.oidc_publishers.iter().copied().collect();
        for publisher_id in publishers {
            acl.push(
                Principal::Oidc(publisher_id),
                PermissionSet::from_permissions([Permission::ProjectsUpload]),
            );
        }
    }

    let mut withheld = 0usize;
    for (level, user_id) in role_levels(identities) {
        let permissions = effective_permissions(state, level);
        if permissions.is_empty() {
            withheld += 1;
            continue;
        }
        acl.push(Principal::User(user_id), permissions);
    }

    tracing::debug!(
        project = %project.id(),
        lifecycle = %state,
        entries = acl.len(),
        withheld,
        "resolved project acl"
    );
    acl
}

/// Resolves ACLs against an [`IdentitySource`].
#[derive(Debug, Clone)]
pub struct PermissionResolver<S> {
    source: S,
}

impl<S: IdentitySource> PermissionResolver<S> {
    /// Create a resolver over `source`
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// The underlying identity source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Re-read `project` from the source, fetch its identities, then resolve.
    ///
    /// Only the id of `project` is used. Lifecycle state and organization
    /// come from the source, the same view the identities are read from.
    pub fn resolve(&self, project: &ProjectRecord) -> PkgIndexResult<Acl> {
        let current = self.source.project(project.id())?;
        if current.lifecycle() != project.lifecycle() {
            tracing::debug!(
                project = %current.id(),
                given = %project.lifecycle(),
                current = %current.lifecycle(),
                "resolving against current lifecycle state"
            );
        }
        let identities = IdentitySnapshot::fetch(&self.source, &current)?;
        Ok(resolve(&current, &identities))
    }
}
