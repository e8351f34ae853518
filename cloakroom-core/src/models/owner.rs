use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Durable numeric handle of a user's catalog. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct OwnerId(i64);

impl OwnerId {
    pub fn new(id: i64) -> Option<Self> {
        (id > 0).then_some(Self(id))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OwnerId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .ok()
            .and_then(OwnerId::new)
            .ok_or_else(|| format!("Invalid owner id '{}': expected a positive integer", s))
    }
}

impl<'de> Deserialize<'de> for OwnerId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = i64::deserialize(deserializer)?;
        OwnerId::new(raw)
            .ok_or_else(|| serde::de::Error::custom(format!("owner id must be positive, got {}", raw)))
    }
}

/// Body of `POST /api/users/bootstrap`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BootstrapRequest {
    pub email: String,
    pub full_name: String,
    pub avatar_image_url: Option<String>,
}

/// The owner identity returned by the bootstrap endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwnerIdentity {
    pub id: OwnerId,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub avatar_image_url: Option<String>,
}
