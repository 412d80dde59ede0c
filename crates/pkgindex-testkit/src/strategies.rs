//! Property test strategies for pkgindex types
//!
//! User seeds are drawn from a small range on purpose so that generated
//! identity snapshots often name the same user through several sources.

use crate::ids::{test_project_id, test_publisher, test_team, test_user};
use pkgindex_authorization::IdentitySnapshot;
use pkgindex_core::{
    LifecycleState, ProjectRecord, ProjectRoleName, PublisherId, RoleGrant, TeamMemberGrant,
    UserId,
};
use proptest::prelude::*;

// Re-export proptest for convenience
pub use proptest;

/// Any lifecycle state
pub fn arb_lifecycle_state() -> impl Strategy<Value = LifecycleState> {
    prop_oneof![
        Just(LifecycleState::Active),
        Just(LifecycleState::QuarantineEnter),
        Just(LifecycleState::QuarantineExit),
        Just(LifecycleState::Archived),
        Just(LifecycleState::ArchivedNoindex),
    ]
}

/// Either project role
pub fn arb_project_role() -> impl Strategy<Value = ProjectRoleName> {
    prop_oneof![Just(ProjectRoleName::Owner), Just(ProjectRoleName::Maintainer)]
}

/// User from a pool of 16
pub fn arb_user_id() -> impl Strategy<Value = UserId> {
    (0u64..16).prop_map(test_user)
}

/// Publisher from a pool of 8
pub fn arb_publisher_id() -> impl Strategy<Value = PublisherId> {
    (0u64..8).prop_map(test_publisher)
}

/// Project record with seed 0 in any lifecycle state
pub fn arb_project() -> impl Strategy<Value = ProjectRecord> {
    arb_lifecycle_state().prop_filter_map("valid project", |lifecycle| {
        ProjectRecord::new(test_project_id(0), "sampleproject")
            .ok()
            .map(|record| record.with_lifecycle(lifecycle))
    })
}

/// Identity snapshot for the seed-0 project.
///
/// Direct roles respect the one-role-per-user rule; the other sources may
/// repeat users freely.
pub fn arb_identity_snapshot() -> impl Strategy<Value = IdentitySnapshot> {
    (
        proptest::collection::btree_map(0u64..16, arb_project_role(), 0..8),
        proptest::collection::vec((0u64..4, arb_user_id(), arb_project_role()), 0..8),
        proptest::collection::vec(arb_user_id(), 0..4),
        proptest::collection::vec(arb_publisher_id(), 0..4),
    )
        .prop_map(|(roles, team_roles, organization_owners, oidc_publishers)| {
            let project_id = test_project_id(0);
            IdentitySnapshot {
                roles: roles
                    .into_iter()
                    .map(|(seed, role_name)| RoleGrant {
                        project_id,
                        user_id: test_user(seed),
                        role_name,
                    })
                    .collect(),
                team_roles: team_roles
                    .into_iter()
                    .map(|(team_seed, user_id, role_name)| TeamMemberGrant {
                        team_id: test_team(team_seed),
                        user_id,
                        role_name,
                    })
                    .collect(),
                organization_owners,
                oidc_publishers,
            }
        })
}
