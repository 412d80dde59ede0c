//! Ordered access control lists
//!
//! An [`Acl`] is what the resolver hands to the enforcement layer. Entries are
//! evaluated first-match-wins downstream, so the order of entries is part of
//! the value: two ACLs with the same entries in a different order are
//! different ACLs and have different fingerprints.

use crate::principal::Principal;
use pkgindex_core::{Permission, PermissionSet, PkgIndexResult};
use serde::{Deserialize, Serialize};

/// One `Allow` entry: a principal and the permissions granted to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclEntry {
    /// Subject of the grant
    pub principal: Principal,
    /// Granted permissions, in grant order
    pub permissions: PermissionSet,
}

impl AclEntry {
    /// Create an entry
    pub fn new(principal: Principal, permissions: PermissionSet) -> Self {
        Self {
            principal,
            permissions,
        }
    }

    /// Whether this entry grants `permission`
    pub fn grants(&self, permission: Permission) -> bool {
        self.permissions.contains(permission)
    }
}

/// Ordered list of ACL entries for one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Acl {
    entries: Vec<AclEntry>,
}

impl Acl {
    /// Empty ACL
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, principal: Principal, permissions: PermissionSet) {
        self.entries.push(AclEntry::new(principal, permissions));
    }

    /// Entries in evaluation order
    pub fn entries(&self) -> &[AclEntry] {
        &self.entries
    }

    /// Iterate entries in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = &AclEntry> {
        self.entries.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry for `principal`, if any.
    pub fn entry_for(&self, principal: &Principal) -> Option<&AclEntry> {
        self.entries.iter().find(|entry| &entry.principal == principal)
    }

    /// Number of entries naming `principal`.
    pub fn count_for(&self, principal: &Principal) -> usize {
        self.entries
            .iter()
            .filter(|entry| &entry.principal == principal)
            .count()
    }

    /// Canonical JSON encoding of the entries.
    pub fn to_canonical_json(&self) -> PkgIndexResult<Vec<u8>> {
        Ok(serde_json::to_vec(&self.entries)?)
    }

    /// Hex BLAKE3 digest of the canonical encoding, usable as a cache key.
    pub fn fingerprint(&self) -> PkgIndexResult<String> {
        let encoded = self.to_canonical_json()?;
        Ok(hex::encode(blake3::hash(&encoded).as_bytes()))
    }
}

impl<'a> IntoIterator for &'a Acl {
    type Item = &'a AclEntry;
    type IntoIter = std::slice::Iter<'a, AclEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::principal::Group;

    fn sample() -> Acl {
        let mut acl = Acl::new();
        acl.push(
            Principal::Group(Group::Observers),
            PermissionSet::from_permissions([Permission::APIObservationsAdd]),
        );
        acl.push(
            Principal::Authenticated,
            PermissionSet::from_permissions([Permission::SubmitMalwareObservation]),
        );
        acl
    }

    #[test]
    fn test_entry_for_returns_first_match() {
        let acl = sample();
        let entry = acl.entry_for(&Principal::Authenticated).unwrap();
        assert!(entry.grants(Permission::SubmitMalwareObservation));
        assert!(acl.entry_for(&Principal::Group(Group::Admins)).is_none());
    }

    #[test]
    fn test_json_shape() {
        let json = String::from_utf8(sample().to_canonical_json().unwrap()).unwrap();
        assert_eq!(
            json,
            r#"[{"principal":"group:observers","permissions":["api:observations:add"]},{"principal":"Authenticated","permissions":["observations:submit-malware"]}]"#
        );
    }

    #[test]
    fn test_fingerprint_depends_on_order() {
        let acl = sample();
        let mut reversed = Acl::new();
        for entry in acl.entries().iter().rev() {
            reversed.push(entry.principal, entry.permissions.clone());
        }
        assert_eq!(acl.fingerprint().unwrap(), sample().fingerprint().unwrap());
        assert_ne!(acl.fingerprint().unwrap(), reversed.fingerprint().unwrap());
        assert_eq!(acl.fingerprint().unwrap().len(), 64);
    }
}
