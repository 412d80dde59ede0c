//! Project records
//!
//! A [`ProjectRecord`] is the slice of a persisted project that the
//! authorization and journal cores need: identity, names, owning
//! organization and lifecycle metadata. Releases, files and the rest of the
//! project live with external collaborators.

use crate::errors::{PkgIndexError, Result};
use crate::identifiers::{OrganizationId, ProjectId};
use crate::lifecycle::LifecycleState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalize a project name: lowercase, with every run of `-`, `_` and `.`
/// collapsed into a single `-`.
pub fn normalize_project_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut in_separator_run = false;
    for ch in name.chars() {
        if matches!(ch, '-' | '_' | '.') {
            if !in_separator_run {
                normalized.push('-');
            }
            in_separator_run = true;
        } else {
            normalized.extend(ch.to_lowercase());
            in_separator_run = false;
        }
    }
    normalized
}

/// Validate a project name: ASCII alphanumerics, with `.`, `_` and `-`
/// allowed only between them.
pub fn validate_project_name(name: &str) -> Result<()> {
    let bytes = name.as_bytes();
    let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
        return Err(PkgIndexError::invalid("project name must not be empty"));
    };
    let inner_ok = bytes
        .iter()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'));
    if !first.is_ascii_alphanumeric() || !last.is_ascii_alphanumeric() || !inner_ok {
        return Err(PkgIndexError::invalid(format!(
            "invalid project name {name:?}"
        )));
    }
    Ok(())
}

/// Persisted row shape of a project, with the raw lifecycle status column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRow {
    /// Project id
    pub id: ProjectId,
    /// Display name
    pub name: String,
    /// Owning organization
    #[serde(default)]
    pub organization_id: Option<OrganizationId>,
    /// Raw lifecycle status column
    #[serde(default)]
    pub lifecycle_status: Option<String>,
    /// When the lifecycle status last changed
    #[serde(default)]
    pub lifecycle_status_changed: Option<DateTime<Utc>>,
    /// Note recorded with the last lifecycle change
    #[serde(default)]
    pub lifecycle_status_note: Option<String>,
}

/// A project as seen by the authorization and journal cores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProjectRow", into = "ProjectRow")]
pub struct ProjectRecord {
    id: ProjectId,
    name: String,
    normalized_name: String,
    organization_id: Option<OrganizationId>,
    lifecycle: LifecycleState,
    lifecycle_status_changed: Option<DateTime<Utc>>,
    lifecycle_status_note: Option<String>,
}

impl ProjectRecord {
    /// Create an active project without an organization.
    pub fn new(id: ProjectId, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_project_name(&name)?;
        Ok(Self {
            id,
            normalized_name: normalize_project_name(&name),
            name,
            organization_id: None,
            lifecycle: LifecycleState::Active,
            lifecycle_status_changed: None,
            lifecycle_status_note: None,
        })
    }

    /// Attach the project to an organization.
    pub fn with_organization(mut self, organization_id: OrganizationId) -> Self {
        self.organization_id = Some(organization_id);
        self
    }

    /// Start the record in a given lifecycle state.
    pub fn with_lifecycle(mut self, lifecycle: LifecycleState) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Project id
    pub fn id(&self) -> ProjectId {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized name, derived from [`ProjectRecord::name`]
    pub fn normalized_name(&self) -> &str {
        &self.normalized_name
    }

    /// Owning organization, if any
    pub fn organization_id(&self) -> Option<OrganizationId> {
        self.organization_id
    }

    /// Current lifecycle state
    pub fn lifecycle(&self) -> LifecycleState {
        self.lifecycle
    }

    /// When the lifecycle state last changed
    pub fn lifecycle_status_changed(&self) -> Option<DateTime<Utc>> {
        self.lifecycle_status_changed
    }

    /// Note recorded with the last lifecycle change
    pub fn lifecycle_status_note(&self) -> Option<&str> {
        self.lifecycle_status_note.as_deref()
    }

    /// Rename the project. The normalized name follows.
    pub fn rename(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        validate_project_name(&name)?;
        self.normalized_name = normalize_project_name(&name);
        self.name = name;
        Ok(())
    }

    /// The normalized name is derived and cannot be assigned.
    pub fn set_normalized_name(&mut self, _normalized_name: impl Into<String>) -> Result<()> {
        Err(PkgIndexError::invalid_mutation(format!(
            "normalized_name of project {} is derived from its name",
            self.id
        )))
    }

    /// Record a lifecycle transition.
    pub fn set_lifecycle_status(
        &mut self,
        lifecycle: LifecycleState,
        note: Option<String>,
        at: DateTime<Utc>,
    ) {
        tracing::debug!(
            project = %self.id,
            from = %self.lifecycle,
            to = %lifecycle,
            "lifecycle status changed"
        );
        self.lifecycle = lifecycle;
        self.lifecycle_status_changed = Some(at);
        self.lifecycle_status_note = note;
    }
}

impl TryFrom<ProjectRow> for ProjectRecord {
    type Error = PkgIndexError;

    fn try_from(row: ProjectRow) -> Result<Self> {
        let lifecycle = LifecycleState::from_status_column(row.lifecycle_status.as_deref())?;
        let mut record = ProjectRecord::new(row.id, row.name)?.with_lifecycle(lifecycle);
        record.organization_id = row.organization_id;
        record.lifecycle_status_changed = row.lifecycle_status_changed;
        record.lifecycle_status_note = row.lifecycle_status_note;
        Ok(record)
    }
}

impl From<ProjectRecord> for ProjectRow {
    fn from(record: ProjectRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            organization_id: record.organization_id,
            lifecycle_status: record.lifecycle.as_status_column().map(str::to_owned),
            lifecycle_status_changed: record.lifecycle_status_changed,
            lifecycle_status_note: record.lifecycle_status_note,
        }
    }
}
