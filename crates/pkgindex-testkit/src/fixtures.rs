//! Project fixtures
//!
//! [`ProjectFixture`] describes a project and every grant on it, then installs
//! the whole description into an [`InMemoryIdentityStore`] in one call.
//!
//! ```rust
//! use pkgindex_testkit::{test_user, ProjectFixture};
//!
//! let fixture = ProjectFixture::new(1, "sampleproject").owner(test_user(1));
//! let installed = fixture.install_fresh();
//! assert_eq!(installed.project.name(), "sampleproject");
//! ```

use crate::ids::{test_organization, test_project_id, test_team};
use pkgindex_authorization::{IdentitySnapshot, InMemoryIdentityStore, IdentityStoreSnapshot};
use pkgindex_core::{
    LifecycleState, OrganizationId, OrganizationRoleType, PkgIndexResult, ProjectRecord,
    ProjectRoleName, PublisherId, TeamId, UserId,
};

#[derive(Debug, Clone)]
struct TeamFixture {
    team_id: TeamId,
    role_name: ProjectRoleName,
    members: Vec<UserId>,
}

/// Builder for a project and its grants.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    seed: u64,
    name: String,
    lifecycle: LifecycleState,
    roles: Vec<(UserId, ProjectRoleName)>,
    teams: Vec<TeamFixture>,
    organization: Option<OrganizationId>,
    organization_roles: Vec<(UserId, OrganizationRoleType)>,
    publishers: Vec<PublisherId>,
}

impl ProjectFixture {
    /// Active project with no grants. `seed` fixes its id.
    pub fn new(seed: u64, name: impl Into<String>) -> Self {
        Self {
            seed,
            name: name.into(),
            lifecycle: LifecycleState::Active,
            roles: Vec::new(),
            teams: Vec::new(),
            organization: None,
            organization_roles: Vec::new(),
            publishers: Vec::new(),
        }
    }

    /// Set the lifecycle state
    pub fn lifecycle(mut self, lifecycle: LifecycleState) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Add a direct Owner
    pub fn owner(mut self, user_id: UserId) -> Self {
        self.roles.push((user_id, ProjectRoleName::Owner));
        self
    }

    /// Add a direct Maintainer
    pub fn maintainer(mut self, user_id: UserId) -> Self {
        self.roles.push((user_id, ProjectRoleName::Maintainer));
        self
    }

    /// Add a team with `members` holding `role_name` on the project.
    pub fn team(mut self, team_seed: u64, role_name: ProjectRoleName, members: &[UserId]) -> Self {
        self.teams.push(TeamFixture {
            team_id: test_team(team_seed),
            role_name,
            members: members.to_vec(),
        });
        self
    }

    /// Put the project in an organization derived from `organization_seed`.
    pub fn organization(mut self, organization_seed: u64) -> Self {
        self.organization = Some(test_organization(organization_seed));
        self
    }

    /// Add an organization owner (requires [`ProjectFixture::organization`]).
    pub fn organization_owner(mut self, user_id: UserId) -> Self {
        self.organization_roles
            .push((user_id, OrganizationRoleType::Owner));
        self
    }

    /// Add an organization member with a non-owner role.
    pub fn organization_member(mut self, user_id: UserId, role_name: OrganizationRoleType) -> Self {
        self.organization_roles.push((user_id, role_name));
        self
    }

    /// Bind an OIDC publisher
    pub fn publisher(mut self, publisher_id: PublisherId) -> Self {
        self.publishers.push(publisher_id);
        self
    }

    /// Project record described by this fixture
    pub fn record(&self) -> PkgIndexResult<ProjectRecord> {
        let mut record =
            ProjectRecord::new(test_project_id(self.seed), self.name.clone())?.with_lifecycle(self.lifecycle);
        if let Some(organization_id) = self.organization {
            record = record.with_organization(organization_id);
        }
        Ok(record)
    }

    /// Write the project and all grants into `store`.
    pub fn install(&self, store: &InMemoryIdentityStore) -> PkgIndexResult<ProjectRecord> {
        let record = self.record()?;
        store.add_project(record.clone())?;
        for (user_id, role_name) in &self.roles {
            store.add_role(record.id(), *user_id, *role_name)?;
        }
        for team in &self.teams {
            for member in &team.members {
                store.add_team_member(team.team_id, *member)?;
            }
            store.add_team_role(record.id(), team.team_id, team.role_name)?;
        }
        if let Some(organization_id) = self.organization {
            for (user_id, role_name) in &self.organization_roles {
                store.add_organization_role(organization_id, *user_id, *role_name)?;
            }
        }
        for publisher_id in &self.publishers {
            store.bind_publisher(record.id(), *publisher_id)?;
        }
        Ok(record)
    }

    /// Install into a new store and take a snapshot.
    ///
    /// Panics if the fixture is malformed; meant for tests only.
    pub fn install_fresh(&self) -> InstalledProject {
        let store = InMemoryIdentityStore::new();
        let project = self.install(&store).expect("fixture installs cleanly");
        let snapshot = store.snapshot();
        InstalledProject {
            store,
            project,
            snapshot,
        }
    }
}

/// A fixture installed into its own store.
#[derive(Debug)]
pub struct InstalledProject {
    /// Store holding the fixture
    pub store: InMemoryIdentityStore,
    /// Installed project
    pub project: ProjectRecord,
    /// Snapshot taken right after installation
    pub snapshot: IdentityStoreSnapshot,
}

impl InstalledProject {
    /// Fetch all four identity sources for the project from the snapshot.
    pub fn identities(&self) -> IdentitySnapshot {
        IdentitySnapshot::fetch(&self.snapshot, &self.project).expect("project is in its snapshot")
    }
}
