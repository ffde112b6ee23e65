use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A registered REMEAL user, as identified by the backend.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(#[serde(deserialize_with = "opaque_id")] pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which side of a reservation the current user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// The user who asked for the food ("my reservations").
    Requester,
    /// The user who listed the product ("reservations of my products").
    Owner,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Requester => f.write_str("requester"),
            Role::Owner => f.write_str("owner"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

/// Backend ids are opaque: some endpoints send them as JSON numbers, others as
/// strings. Both collapse to the string form.
pub fn opaque_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match RawId::deserialize(deserializer)? {
        RawId::Text(s) if s.is_empty() => Err(serde::de::Error::custom("empty id")),
        RawId::Text(s) => Ok(s),
        RawId::Number(n) => Ok(n.to_string()),
    }
}
