//! pkgindex Testing Infrastructure
//!
//! Shared fixtures for the pkgindex crates' integration tests: deterministic
//! ids, a project fixture builder, proptest strategies and a tracing
//! subscriber.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! pkgindex-testkit = { path = "../pkgindex-testkit" }
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod fixtures;
pub mod ids;
pub mod strategies;
pub mod tracing_setup;

pub use fixtures::{InstalledProject, ProjectFixture};
pub use ids::{test_organization, test_project_id, test_publisher, test_team, test_user};
pub use tracing_setup::init_test_tracing;
