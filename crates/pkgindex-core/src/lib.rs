//! pkgindex Core - shared vocabulary for access control and journal sequencing
//!
//! This crate holds the types every other pkgindex crate agrees on. It has no
//! storage or locking of its own.
//!
//! # Contents
//!
//! - Identifiers: `UserId`, `TeamId`, `OrganizationId`, `ProjectId`, `PublisherId`
//! - `Permission` and insertion-ordered `PermissionSet`
//! - `LifecycleState`, parsed strictly from the persisted status column
//! - Role vocabulary and raw grant records
//! - `ProjectRecord` with its derived normalized name
//! - `PkgIndexConfig`, layered from defaults, TOML and environment
//! - `PkgIndexError`, the unified error type

#![forbid(unsafe_code)]

/// Layered configuration
pub mod config;

/// Unified error handling
pub mod errors;

/// Opaque entity identifiers
pub mod identifiers;

/// Project lifecycle states
pub mod lifecycle;

/// Permission vocabulary
pub mod permissions;

/// Project records and name normalization
pub mod project;

/// Role vocabulary and grant records
pub mod roles;

pub use config::{JournalConfig, PkgIndexConfig};
pub use errors::{PkgIndexError, Result as PkgIndexResult};
pub use identifiers::{OrganizationId, ProjectId, PublisherId, TeamId, UserId};
pub use lifecycle::LifecycleState;
pub use permissions::{Permission, PermissionSet};
pub use project::{normalize_project_name, ProjectRecord, ProjectRow};
pub use roles::{
    OrganizationRole, OrganizationRoleType, ProjectRoleName, RoleGrant, TeamMemberGrant,
    TeamRoleGrant,
};
