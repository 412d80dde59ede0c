//! Property tests for ACL resolution over generated identity snapshots.

#![allow(clippy::unwrap_used, missing_docs)]

use pkgindex_authorization::{resolve, role_levels, Principal, RoleLevel};
use pkgindex_core::{LifecycleState, Permission};
use pkgindex_testkit::strategies::{arb_identity_snapshot, arb_lifecycle_state, arb_project};
use proptest::prelude::*;
use std::collections::BTreeSet;

proptest! {
    #[test]
    fn archived_projects_grant_no_upload(
        identities in arb_identity_snapshot(),
        archived in prop_oneof![
            Just(LifecycleState::Archived),
            Just(LifecycleState::ArchivedNoindex),
        ],
    ) {
        let project = pkgindex_core::ProjectRecord::new(
            pkgindex_testkit::test_project_id(0),
            "sampleproject",
        )
        .unwrap()
        .with_lifecycle(archived);
        let acl = resolve(&project, &identities);

        for entry in &acl {
            prop_assert!(!matches!(entry.principal, Principal::Oidc(_)));
            prop_assert!(!entry.grants(Permission::ProjectsUpload));
        }
    }

    #[test]
    fn quarantined_administrators_get_read_and_upload(identities in arb_identity_snapshot()) {
        let project = pkgindex_core::ProjectRecord::new(
            pkgindex_testkit::test_project_id(0),
            "sampleproject",
        )
        .unwrap()
        .with_lifecycle(LifecycleState::QuarantineEnter);
        let acl = resolve(&project, &identities);

        for (level, user_id) in role_levels(&identities) {
            let entry = acl.entry_for(&Principal::User(user_id)).unwrap();
            match level {
                RoleLevel::Administer => {
                    prop_assert!(entry.grants(Permission::ProjectsRead));
                    prop_assert!(entry.grants(Permission::ProjectsUpload));
                    prop_assert_eq!(entry.permissions.len(), 2);
                }
                RoleLevel::Upload => {
                    prop_assert_eq!(entry.permissions.as_slice(), &[Permission::ProjectsUpload]);
                }
            }
        }
    }

    #[test]
    fn resolution_is_deterministic(
        project in arb_project(),
        identities in arb_identity_snapshot(),
    ) {
        let first = resolve(&project, &identities);
        let second = resolve(&project, &identities.clone());
        prop_assert_eq!(first.to_canonical_json().unwrap(), second.to_canonical_json().unwrap());
        prop_assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());
    }

    #[test]
    fn every_principal_appears_at_most_once(
        project in arb_project(),
        identities in arb_identity_snapshot(),
    ) {
        let acl = resolve(&project, &identities);
        let mut seen = BTreeSet::new();
        for entry in &acl {
            prop_assert!(seen.insert(entry.principal.to_string()));
        }
    }

    #[test]
    fn user_entries_follow_level_then_id_order(
        project in arb_project(),
        identities in arb_identity_snapshot(),
    ) {
        let acl = resolve(&project, &identities);
        let users: Vec<_> = acl
            .iter()
            .filter_map(|entry| match entry.principal {
                Principal::User(user_id) => Some(user_id),
                _ => None,
            })
            .collect();
        let expected: Vec<_> = role_levels(&identities)
            .into_iter()
            .filter(|(level, _)| {
                !pkgindex_authorization::effective_permissions(project.lifecycle(), *level).is_empty()
            })
            .map(|(_, user_id)| user_id)
            .collect();
        prop_assert_eq!(users, expected);
    }

    #[test]
    fn fixed_groups_lead_and_publishers_precede_users(
        state in arb_lifecycle_state(),
        identities in arb_identity_snapshot(),
    ) {
        let project = pkgindex_core::ProjectRecord::new(
            pkgindex_testkit::test_project_id(0),
            "sampleproject",
        )
        .unwrap()
        .with_lifecycle(state);
        let acl = resolve(&project, &identities);

        let rank = |principal: &Principal| match principal {
            Principal::Group(_) | Principal::Authenticated => 0,
            Principal::Oidc(_) => 1,
            Principal::User(_) => 2,
        };
        let ranks: Vec<_> = acl.iter().map(|entry| rank(&entry.principal)).collect();
        prop_assert!(ranks.windows(2).all(|pair| pair[0] <= pair[1]));
        prop_assert!(acl.len() >= 4);
    }
}
