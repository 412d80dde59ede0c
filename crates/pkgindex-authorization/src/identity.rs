//! Identity sources feeding project ACLs
//!
//! Four independent origins grant users and publishers access to a project:
//! direct roles, team roles, organization ownership and OIDC publisher
//! bindings. [`IdentitySource`] is the read-only query contract over them.
//!
//! Implementations must answer all four queries from one consistent view of
//! the underlying data. Callers fetch everything up front into an
//! [`IdentitySnapshot`] so resolution never goes back to the source halfway
//! through.

use pkgindex_core::{
    PkgIndexResult, ProjectId, ProjectRecord, ProjectRoleName, PublisherId, RoleGrant,
    TeamMemberGrant, UserId,
};
use serde::{Deserialize, Serialize};

/// Read-only queries over the identity stores for one consistent view.
pub trait IdentitySource {
    /// The project as this view holds it, including lifecycle state and
    /// organization.
    fn project(&self, project_id: ProjectId) -> PkgIndexResult<ProjectRecord>;

    /// Direct user roles on the project.
    fn roles_for(&self, project: &ProjectRecord) -> PkgIndexResult<Vec<RoleGrant>>;

    /// Team roles on the project, expanded to one entry per team member.
    fn team_roles_for(&self, project: &ProjectRecord) -> PkgIndexResult<Vec<TeamMemberGrant>>;

    /// Owners of the project's organization. Empty when the project has none.
    fn organization_owners_for(&self, project: &ProjectRecord) -> PkgIndexResult<Vec<UserId>>;

    /// OIDC publishers bound to the project.
    fn oidc_publishers_for(&self, project: &ProjectRecord) -> PkgIndexResult<Vec<PublisherId>>;
}

/// Results of all four identity queries for one project, fetched together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySnapshot {
    /// Direct user roles
    pub roles: Vec<RoleGrant>,
    /// Team roles expanded to members
    pub team_roles: Vec<TeamMemberGrant>,
    /// Organization owners
    pub organization_owners: Vec<UserId>,
    /// Bound OIDC publishers
    pub oidc_publishers: Vec<PublisherId>,
}

impl IdentitySnapshot {
    /// Run all four queries against `source` for `project`.
    pub fn fetch<S>(source: &S, project: &ProjectRecord) -> PkgIndexResult<Self>
    where
        S: IdentitySource + ?Sized,
    {
        let snapshot = Self {
            roles: source.roles_for(project)?,
            team_roles: source.team_roles_for(project)?,
            organization_owners: source.organization_owners_for(project)?,
            oidc_publishers: source.oidc_publishers_for(project)?,
        };
        tracing::trace!(
            project = %project.id(),
            roles = snapshot.roles.len(),
            team_roles = snapshot.team_roles.len(),
            organization_owners = snapshot.organization_owners.len(),
            oidc_publishers = snapshot.oidc_publishers.len(),
            "fetched identity snapshot"
        );
        Ok(snapshot)
    }

    /// Whether no source contributed anything
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
            && self.team_roles.is_empty()
            && self.organization_owners.is_empty()
            && self.oidc_publishers.is_empty()
    }

    /// Users holding the direct Owner role, sorted.
    pub fn owners(&self) -> Vec<UserId> {
        self.direct_holders(ProjectRoleName::Owner)
    }

    /// Users holding the direct Maintainer role, sorted.
    pub fn maintainers(&self) -> Vec<UserId> {
        self.direct_holders(ProjectRoleName::Maintainer)
    }

    fn direct_holders(&self, role_name: ProjectRoleName) -> Vec<UserId> {
        let mut users: Vec<UserId> = self
            .roles
            .iter()
            .filter(|role| role.role_name == role_name)
            .map(|role| role.user_id)
            .collect();
        users.sort();
        users.dedup();
        users
    }
}
