//! Identifier types for the entities the access-control and journal cores touch
//!
//! All identifiers are opaque UUID newtypes. `Display` renders the bare UUID,
//! which is what principal strings (`user:<id>`, `oidc:<id>`) embed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier
            pub fn new_random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create from a UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Create from raw bytes (for fixtures)
            pub fn from_bytes(bytes: [u8; 16]) -> Self {
                Self(Uuid::from_bytes(bytes))
            }

            /// Get the inner UUID
            pub fn uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_identifier!(
    /// Registered user account
    UserId
);

uuid_identifier!(
    /// Team inside an organization
    TeamId
);

uuid_identifier!(
    /// Organization that may own projects
    OrganizationId
);

uuid_identifier!(
    /// Package-index project
    ProjectId
);

uuid_identifier!(
    /// Trusted (OIDC) publisher registered against one or more projects
    PublisherId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_bare_uuid() {
        let uuid = Uuid::from_bytes([7u8; 16]);
        let user = UserId::from_uuid(uuid);
        assert_eq!(user.to_string(), uuid.to_string());
    }

    #[test]
    fn test_from_str_roundtrip() {
        let publisher = PublisherId::from_bytes([3u8; 16]);
        let parsed: PublisherId = publisher.to_string().parse().unwrap();
        assert_eq!(parsed, publisher);
        assert!("not-a-uuid".parse::<PublisherId>().is_err());
    }

    #[test]
    fn test_ordering_follows_uuid_bytes() {
        let low = UserId::from_bytes([1u8; 16]);
        let high = UserId::from_bytes([2u8; 16]);
        assert!(low < high);
    }
}
