//! Project access control for pkgindex
//!
//! Computes the authoritative, ordered ACL of a project from four identity
//! sources (direct roles, team roles, organization owners, OIDC publishers)
//! and the project's lifecycle state. Enforcement of the ACL happens
//! elsewhere; this crate only decides what it contains.
//!
//! # Example
//!
//! ```rust
//! use pkgindex_authorization::{InMemoryIdentityStore, PermissionResolver, Principal};
//! use pkgindex_core::{Permission, ProjectId, ProjectRecord, ProjectRoleName, UserId};
//!
//! let store = InMemoryIdentityStore::new();
//! let project = ProjectRecord::new(ProjectId::new_random(), "sampleproject").unwrap();
//! let owner = UserId::new_random();
//! store.add_project(project.clone()).unwrap();
//! store.add_role(project.id(), owner, ProjectRoleName::Owner).unwrap();
//!
//! let acl = PermissionResolver::new(store.snapshot()).resolve(&project).unwrap();
//! let entry = acl.entry_for(&Principal::User(owner)).unwrap();
//! assert!(entry.grants(Permission::ProjectsWrite));
//! ```

#![forbid(unsafe_code)]

/// Ordered access control lists
pub mod acl;

/// Identity source contract and snapshots
pub mod identity;

/// Lifecycle rules for permissions
pub mod lifecycle;

/// ACL principals
pub mod principal;

/// ACL resolution
pub mod resolver;

/// In-memory identity store
pub mod store;

pub use acl::{Acl, AclEntry};
pub use identity::{IdentitySnapshot, IdentitySource};
pub use lifecycle::{admits_publishers, effective_permissions, RoleLevel};
pub use principal::{Group, Principal};
pub use resolver::{resolve, role_levels, PermissionResolver};
pub use store::{IdentityStoreSnapshot, InMemoryIdentityStore};
