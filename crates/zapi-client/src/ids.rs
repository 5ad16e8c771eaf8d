//! Server-assigned resource identifiers
//!
//! Jira and ZAPI are inconsistent about ID encoding: the same field may be a
//! JSON string in one endpoint and a number in another. All IDs are kept in
//! their string form and are only meaningful against the remote system's
//! current state.

use serde::{Deserialize, Deserializer, Serialize};

macro_rules! resource_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(s)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                LooseId::deserialize(deserializer).map(|id| $name(id.into_string()))
            }
        }
    };
}

resource_id!(
    /// Jira project ID
    ProjectId
);
resource_id!(
    /// Jira fix-version ID
    VersionId
);
resource_id!(
    /// ZAPI test cycle ID
    CycleId
);
resource_id!(
    /// Jira issue ID (not the human-readable key)
    IssueId
);
resource_id!(
    /// ZAPI execution ID
    ExecutionId
);

/// An identifier or code the server may send as either a string or a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum LooseId {
    Text(String),
    Int(i64),
}

impl LooseId {
    pub(crate) fn into_string(self) -> String {
        match self {
            LooseId::Text(s) => s,
            LooseId::Int(n) => n.to_string(),
        }
    }

    /// Integer value, parsing numeric strings.
    pub(crate) fn as_i64(&self) -> Option<i64> {
        match self {
            LooseId::Text(s) => s.trim().parse().ok(),
            LooseId::Int(n) => Some(*n),
        }
    }
}
