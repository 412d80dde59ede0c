//! Principals named by ACL entries

use pkgindex_core::{PkgIndexError, PublisherId, UserId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Site-wide groups that receive fixed grants on every project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Group {
    /// Site administrators
    Admins,
    /// Site moderators
    Moderators,
    /// Malware observers with API access
    Observers,
}

impl Group {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Admins => "admins",
            Self::Moderators => "moderators",
            Self::Observers => "observers",
        }
    }
}

/// Subject of an ACL entry.
///
/// Renders to the principal strings consumed by the enforcement layer:
/// `group:<name>`, `Authenticated`, `user:<id>` and `oidc:<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Principal {
    /// Fixed site group
    Group(Group),
    /// Any logged-in identity
    Authenticated,
    /// A specific user
    User(UserId),
    /// A trusted OIDC publisher
    Oidc(PublisherId),
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(group) => write!(f, "group:{}", group.as_str()),
            Self::Authenticated => f.write_str("Authenticated"),
            Self::User(user_id) => write!(f, "user:{user_id}"),
            Self::Oidc(publisher_id) => write!(f, "oidc:{publisher_id}"),
        }
    }
}

impl FromStr for Principal {
    type Err = PkgIndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PkgIndexError::invalid(format!("invalid principal {s:?}"));
        if s == "Authenticated" {
            return Ok(Self::Authenticated);
        }
        let (prefix, rest) = s.split_once(':').ok_or_else(invalid)?;
        match prefix {
            "group" => match rest {
                "admins" => Ok(Self::Group(Group::Admins)),
                "moderators" => Ok(Self::Group(Group::Moderators)),
                "observers" => Ok(Self::Group(Group::Observers)),
                _ => Err(invalid()),
            },
            "user" => rest.parse().map(Self::User).map_err(|_| invalid()),
            "oidc" => rest.parse().map(Self::Oidc).map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
