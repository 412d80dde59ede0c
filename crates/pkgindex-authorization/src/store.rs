//! In-memory identity store with snapshot reads
//!
//! Mutations replace the shared state wholesale (copy-on-write behind a
//! `parking_lot::RwLock`), so a [`IdentityStoreSnapshot`] taken before a
//! mutation keeps answering from the old state. Every query on one snapshot
//! therefore observes the same version of all four identity sources.

use crate::identity::IdentitySource;
use parking_lot::RwLock;
use pkgindex_core::{
    normalize_project_name, OrganizationId, OrganizationRole, OrganizationRoleType,
    PkgIndexError, PkgIndexResult, ProjectId, ProjectRecord, ProjectRoleName, PublisherId,
    RoleGrant, TeamId, TeamMemberGrant, TeamRoleGrant, UserId,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
struct IdentityState {
    projects: BTreeMap<ProjectId, ProjectRecord>,
    project_names: HashMap<String, ProjectId>,
    roles: Vec<RoleGrant>,
    team_roles: Vec<TeamRoleGrant>,
    team_members: BTreeMap<TeamId, BTreeSet<UserId>>,
    organization_roles: Vec<OrganizationRole>,
    publishers: BTreeMap<ProjectId, BTreeSet<PublisherId>>,
}

impl IdentityState {
    fn project(&self, project_id: ProjectId) -> PkgIndexResult<&ProjectRecord> {
        self.projects
            .get(&project_id)
            .ok_or_else(|| PkgIndexError::not_found(format!("project {project_id}")))
    }
}

/// Shared, mutable identity store.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    state: RwLock<Arc<IdentityState>>,
}

impl InMemoryIdentityStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Consistent read view of the current state.
    pub fn snapshot(&self) -> IdentityStoreSnapshot {
        IdentityStoreSnapshot {
            state: Arc::clone(&self.state.read()),
        }
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut IdentityState) -> PkgIndexResult<T>) -> PkgIndexResult<T> {
        let mut guard = self.state.write();
        let mut next = (**guard).clone();
        let value = f(&mut next)?;
        *guard = Arc::new(next);
        Ok(value)
    }

    /// Register a project. Normalized names must be unique.
    pub fn add_project(&self, project: ProjectRecord) -> PkgIndexResult<()> {
        self.mutate(|state| {
            let normalized = project.normalized_name().to_string();
            if state.project_names.contains_key(&normalized) {
                return Err(PkgIndexError::invalid(format!(
                    "project name {normalized:?} already registered"
                )));
            }
            if state.projects.contains_key(&project.id()) {
                return Err(PkgIndexError::invalid(format!(
                    "project {} already registered",
                    project.id()
                )));
            }
            state.project_names.insert(normalized, project.id());
            state.projects.insert(project.id(), project);
            Ok(())
        })
    }

    /// Replace a stored project record (rename, lifecycle change).
    pub fn update_project(&self, project: ProjectRecord) -> PkgIndexResult<()> {
        self.mutate(|state| {
            let previous = state.project(project.id())?.normalized_name().to_string();
            let normalized = project.normalized_name().to_string();
            if previous != normalized {
                if state.project_names.contains_key(&normalized) {
                    return Err(PkgIndexError::invalid(format!(
                        "project name {normalized:?} already registered"
                    )));
                }
                state.project_names.remove(&previous);
                state.project_names.insert(normalized, project.id());
            }
            state.projects.insert(project.id(), project);
            Ok(())
        })
    }

    /// Remove a project together with its roles, team roles and publisher bindings.
    pub fn remove_project(&self, project_id: ProjectId) -> PkgIndexResult<ProjectRecord> {
        self.mutate(|state| {
            let project = state
                .projects
                .remove(&project_id)
                .ok_or_else(|| PkgIndexError::not_found(format!("project {project_id}")))?;
            state.project_names.remove(project.normalized_name());
            state.roles.retain(|role| role.project_id != project_id);
            state.team_roles.retain(|role| role.project_id != project_id);
            state.publishers.remove(&project_id);
            tracing::debug!(project = %project_id, "removed project and its grants");
            Ok(project)
        })
    }

    /// Grant a user a direct role. One role per (user, project).
    pub fn add_role(
        &self,
        project_id: ProjectId,
        user_id: UserId,
        role_name: ProjectRoleName,
    ) -> PkgIndexResult<()> {
        self.mutate(|state| {
            state.project(project_id)?;
            if state
                .roles
                .iter()
                .any(|role| role.project_id == project_id && role.user_id == user_id)
            {
                return Err(PkgIndexError::invalid(format!(
                    "user {user_id} already has a role on project {project_id}"
                )));
            }
            state.roles.push(RoleGrant {
                project_id,
                user_id,
                role_name,
            });
            Ok(())
        })
    }

    /// Revoke a user's direct role.
    pub fn remove_role(&self, project_id: ProjectId, user_id: UserId) -> PkgIndexResult<()> {
        self.mutate(|state| {
            let before = state.roles.len();
            state
                .roles
                .retain(|role| !(role.project_id == project_id && role.user_id == user_id));
            if state.roles.len() == before {
                return Err(PkgIndexError::not_found(format!(
                    "role for user {user_id} on project {project_id}"
                )));
            }
            Ok(())
        })
    }

    /// Add a user to a team.
    pub fn add_team_member(&self, team_id: TeamId, user_id: UserId) -> PkgIndexResult<()> {
        self.mutate(|state| {
            state.team_members.entry(team_id).or_default().insert(user_id);
            Ok(())
        })
    }

    /// Remove a user from a team.
    pub fn remove_team_member(&self, team_id: TeamId, user_id: UserId) -> PkgIndexResult<()> {
        self.mutate(|state| {
            let removed = state
                .team_members
                .get_mut(&team_id)
                .is_some_and(|members| members.remove(&user_id));
            if !removed {
                return Err(PkgIndexError::not_found(format!(
                    "user {user_id} in team {team_id}"
                )));
            }
            Ok(())
        })
    }

    /// Grant a team a role on a project.
    pub fn add_team_role(
        &self,
        project_id: ProjectId,
        team_id: TeamId,
        role_name: ProjectRoleName,
    ) -> PkgIndexResult<()> {
        self.mutate(|state| {
            state.project(project_id)?;
            state.team_roles.push(TeamRoleGrant {
                project_id,
                team_id,
                role_name,
            });
            Ok(())
        })
    }

    /// Give a user a role inside an organization.
    pub fn add_organization_role(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
        role_name: OrganizationRoleType,
    ) -> PkgIndexResult<()> {
        self.mutate(|state| {
            state.organization_roles.push(OrganizationRole {
                organization_id,
                user_id,
                role_name,
            });
            Ok(())
        })
    }

    /// Bind a trusted publisher to a project.
    pub fn bind_publisher(&self, project_id: ProjectId, publisher_id: PublisherId) -> PkgIndexResult<()> {
        self.mutate(|state| {
            state.project(project_id)?;
            state
                .publishers
                .entry(project_id)
                .or_default()
                .insert(publisher_id);
            Ok(())
        })
    }

    /// Unbind a trusted publisher from a project.
    pub fn unbind_publisher(
        &self,
        project_id: ProjectId,
        publisher_id: PublisherId,
    ) -> PkgIndexResult<()> {
        self.mutate(|state| {
            let removed = state
                .publishers
                .get_mut(&project_id)
                .is_some_and(|bound| bound.remove(&publisher_id));
            if !removed {
                return Err(PkgIndexError::not_found(format!(
                    "publisher {publisher_id} on project {project_id}"
                )));
            }
            Ok(())
        })
    }
}

/// Immutable view of an [`InMemoryIdentityStore`] at one point in time.
#[derive(Debug, Clone)]
pub struct IdentityStoreSnapshot {
    state: Arc<IdentityState>,
}

impl IdentityStoreSnapshot {
    /// Project by name; any spelling with the same normalized form matches.
    pub fn project_by_name(&self, name: &str) -> PkgIndexResult<ProjectRecord> {
        let normalized = normalize_project_name(name);
        self.state
            .project_names
            .get(&normalized)
            .and_then(|project_id| self.state.projects.get(project_id))
            .cloned()
            .ok_or_else(|| PkgIndexError::not_found(format!("project named {name:?}")))
    }

    /// Number of registered projects
    pub fn project_count(&self) -> usize {
        self.state.projects.len()
    }
}

impl IdentitySource for IdentityStoreSnapshot {
    fn project(&self, project_id: ProjectId) -> PkgIndexResult<ProjectRecord> {
        self.state.project(project_id).cloned()
    }

    fn roles_for(&self, project: &ProjectRecord) -> PkgIndexResult<Vec<RoleGrant>> {
        self.state.project(project.id())?;
        Ok(self
            .state
            .roles
            .iter()
            .filter(|role| role.project_id == project.id())
            .cloned()
            .collect())
    }

    fn team_roles_for(&self, project: &ProjectRecord) -> PkgIndexResult<Vec<TeamMemberGrant>> {
        self.state.project(project.id())?;
        let mut grants = Vec::new();
        for team_role in self
            .state
            .team_roles
            .iter()
            .filter(|role| role.project_id == project.id())
        {
            let Some(members) = self.state.team_members.get(&team_role.team_id) else {
                continue;
            };
            grants.extend(members.iter().map(|user_id| TeamMemberGrant {
                team_id: team_role.team_id,
                user_id: *user_id,
                role_name: team_role.role_name,
            }));
        }
        Ok(grants)
    }

    fn organization_owners_for(&self, project: &ProjectRecord) -> PkgIndexResult<Vec<UserId>> {
        let stored = self.state.project(project.id())?;
        let Some(organization_id) = stored.organization_id() else {
            return Ok(Vec::new());
        };
        Ok(self
            .state
            .organization_roles
            .iter()
            .filter(|role| {
                role.organization_id == organization_id
                    && role.role_name == OrganizationRoleType::Owner
            })
            .map(|role| role.user_id)
            .collect())
    }

    fn oidc_publishers_for(&self, project: &ProjectRecord) -> PkgIndexResult<Vec<PublisherId>> {
        self.state.project(project.id())?;
        Ok(self
            .state
            .publishers
            .get(&project.id())
            .map(|bound| bound.iter().copied().collect())
            .unwrap_or_default())
    }
}
