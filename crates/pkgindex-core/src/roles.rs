//! Role vocabulary and the raw grant records held by identity stores

use crate::identifiers::{OrganizationId, ProjectId, TeamId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Collaborator role on a project, either granted directly or through a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProjectRoleName {
    /// Full control of the project
    Owner,
    /// May upload releases
    Maintainer,
}

impl fmt::Display for ProjectRoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => f.write_str("Owner"),
            Self::Maintainer => f.write_str("Maintainer"),
        }
    }
}

/// Role a user holds inside an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrganizationRoleType {
    /// Organization owner; administers every project of the organization
    Owner,
    /// Billing contact
    BillingManager,
    /// Manages teams and members
    Manager,
    /// Plain member
    Member,
}

/// Direct user role on one project. Unique per (user, project).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleGrant {
    /// Project the role is bound to
    pub project_id: ProjectId,
    /// User holding the role
    pub user_id: UserId,
    /// Role name
    pub role_name: ProjectRoleName,
}

/// Team role on one project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamRoleGrant {
    /// Project the role is bound to
    pub project_id: ProjectId,
    /// Team holding the role
    pub team_id: TeamId,
    /// Role name
    pub role_name: ProjectRoleName,
}

/// One team member's share of a [`TeamRoleGrant`], after member expansion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamMemberGrant {
    /// Team through which the role is held
    pub team_id: TeamId,
    /// Member of that team
    pub user_id: UserId,
    /// Role name of the team grant
    pub role_name: ProjectRoleName,
}

/// User role inside an organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrganizationRole {
    /// Organization
    pub organization_id: OrganizationId,
    /// Member user
    pub user_id: UserId,
    /// Role type
    pub role_name: OrganizationRoleType,
}
