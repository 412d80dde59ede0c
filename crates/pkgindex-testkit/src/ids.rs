//! Deterministic identifiers for tests
//!
//! Ids are derived from a label and a seed through BLAKE3, so the same seed
//! always yields the same id and different kinds never collide.

use pkgindex_core::{OrganizationId, ProjectId, PublisherId, TeamId, UserId};
use uuid::Uuid;

fn derived_uuid(kind: &str, seed: u64) -> Uuid {
    let digest = blake3::hash(format!("{kind}-{seed}").as_bytes());
    let mut uuid_bytes = [0u8; 16];
    uuid_bytes.copy_from_slice(&digest.as_bytes()[..16]);
    Uuid::from_bytes(uuid_bytes)
}

/// Deterministic user id
pub fn test_user(seed: u64) -> UserId {
    UserId(derived_uuid("user", seed))
}

/// Deterministic team id
pub fn test_team(seed: u64) -> TeamId {
    TeamId(derived_uuid("team", seed))
}

/// Deterministic organization id
pub fn test_organization(seed: u64) -> OrganizationId {
    OrganizationId(derived_uuid("organization", seed))
}

/// Deterministic project id
pub fn test_project_id(seed: u64) -> ProjectId {
    ProjectId(derived_uuid("project", seed))
}

/// Deterministic publisher id
pub fn test_publisher(seed: u64) -> PublisherId {
    PublisherId(derived_uuid("publisher", seed))
}
